//! Run configuration.
//!
//! Every knob that used to be a process-wide constant is a field here, passed
//! explicitly to the components that need it.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Opening part of a placeholder token.
pub const PLACEHOLDER_PREFIX: &str = "%VAR_";
/// Closing part of a placeholder token.
pub const PLACEHOLDER_SUFFIX: &str = "%";
/// Marks the point where the next buffered record starts being substituted.
pub const NEXT_RECORD_MARKER: &str = "%SG_NEXT-RECORD%";
/// Marker syntax used by older templates; only handled by the offline migration.
pub const LEGACY_NEXT_RECORD_MARKER: &str = "%VAR_NEXT-RECORD%";
/// Synthetic field available to output-name patterns: the zero-padded unit counter.
pub const COUNTER_FIELD: &str = "COUNT";
/// Name of the container element holding persisted settings inside a template.
pub const SETTINGS_STORAGE_NAME: &str = "ScribusGeneratorDefaultSettings";
/// Appended to the document comment field of merged output.
pub const CONTRIBUTION_TEXT: &str = "\ngenerated with slagen";

/// Builds the placeholder token for a field name: `name` -> `%VAR_name%`.
pub fn placeholder(name: &str) -> String {
    format!("{}{}{}", PLACEHOLDER_PREFIX, name, PLACEHOLDER_SUFFIX)
}

/// Final output format of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Generated layout documents only.
    #[default]
    Sla,
    /// Layout documents exported to PDF through the host application.
    Pdf,
}

impl OutputFormat {
    /// Name used in persisted settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Sla => "Scribus",
            OutputFormat::Pdf => "PDF",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "scribus" | "sla" => Ok(OutputFormat::Sla),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Controls how placeholders are replaced and cleaned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionOptions {
    /// Remove placeholders that had no value in the record in scope.
    pub clean_unused: bool,
    /// When cleaning, also remove the separator run (`,;-` and whitespace) before the token.
    pub remove_cleaned_prefix: bool,
    /// Convert tabs and line breaks in values into dedicated layout elements.
    /// When disabled they are flattened to spaces.
    pub keep_tabs_and_linebreaks: bool,
    /// Token that advances to the next buffered record.
    pub next_record_marker: String,
}

impl Default for SubstitutionOptions {
    fn default() -> Self {
        Self {
            clean_unused: true,
            remove_cleaned_prefix: true,
            keep_tabs_and_linebreaks: true,
            next_record_marker: NEXT_RECORD_MARKER.to_string(),
        }
    }
}

/// Controls the removal of text runs emptied by placeholder cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupOptions {
    pub enabled: bool,
    /// Also remove the paragraph break directly preceding a removed text run.
    pub remove_preceding_paragraph: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            remove_preceding_paragraph: true,
        }
    }
}

/// Engine-wide options that stay fixed across the jobs of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub substitution: SubstitutionOptions,
    pub cleanup: CleanupOptions,
    /// Pretty-print generated documents.
    pub indent_output: bool,
    /// Text appended to the comment field of merged documents.
    pub contribution_text: String,
    /// `NAME` of the element that stores settings inside a template.
    pub settings_storage_name: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            substitution: SubstitutionOptions::default(),
            cleanup: CleanupOptions::default(),
            indent_output: true,
            contribution_text: CONTRIBUTION_TEXT.to_string(),
            settings_storage_name: SETTINGS_STORAGE_NAME.to_string(),
        }
    }
}

/// One template/data pair to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub template: PathBuf,
    pub data_file: PathBuf,
    pub output_dir: PathBuf,
    /// Output name pattern; empty means "use the unit counter".
    pub output_name: String,
    pub format: OutputFormat,
    /// Keep generated layout documents after PDF export.
    pub keep_intermediate: bool,
    /// Field delimiter of delimited-text sources.
    pub delimiter: char,
    /// Text encoding of delimited-text sources.
    pub encoding: String,
    /// Merge all units into one document.
    pub single_output: bool,
    /// Raw 1-based first row bound, as typed by the user.
    pub first_row: Option<String>,
    /// Raw 1-based last row bound, as typed by the user.
    pub last_row: Option<String>,
    /// Persist this job's settings into the template before generating.
    pub save_settings: bool,
    /// Carried through persisted settings for the graphical front end.
    pub close_dialog: bool,
}

impl Default for Job {
    fn default() -> Self {
        Self {
            template: PathBuf::new(),
            data_file: PathBuf::new(),
            output_dir: PathBuf::new(),
            output_name: String::new(),
            format: OutputFormat::Sla,
            keep_intermediate: true,
            delimiter: ',',
            encoding: "utf-8".to_string(),
            single_output: false,
            first_row: None,
            last_row: None,
            save_settings: false,
            close_dialog: false,
        }
    }
}

impl Job {
    pub fn new(template: impl Into<PathBuf>, data_file: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            data_file: data_file.into(),
            ..Default::default()
        }
    }
}
