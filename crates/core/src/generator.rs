//! Run orchestration: records in, generated documents out.

use crate::error::GeneratorError;
use crate::export::export_documents;
use crate::naming::{OutputNamer, merged_name};
use crate::output::write_document;
use crate::settings::store_settings_in_file;
use log::{debug, info, warn};
use slagen_composer::{MergeBuffer, remove_empty_texts};
use slagen_document::Document;
use slagen_source::{DataSource, SourceOptions, VecDataSource, load_records, resolve_range};
use slagen_template::{PlaceholderEngine, Template};
use slagen_traits::HostApplication;
use slagen_types::{Diagnostic, DiagnosticKind, GeneratorOptions, Job, OutputFormat, Record, Settings};
use std::path::{Path, PathBuf};

/// What a finished run produced.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Layout documents written, in unit order. With PDF output these may
    /// have been deleted again.
    pub outputs: Vec<PathBuf>,
    /// PDFs exported by the host application.
    pub exported: Vec<PathBuf>,
    /// Output units generated.
    pub units: usize,
    /// Records consumed after applying the row range.
    pub records: usize,
    pub records_per_unit: usize,
    /// Text runs removed by the cleanup pass.
    pub removed_texts: usize,
    /// Recoverable problems met during the run.
    pub diagnostics: Vec<Diagnostic>,
}

/// Generates documents from a template and a data file.
///
/// # Example
///
/// ```ignore
/// let mut generator = Generator::new(GeneratorOptions::default());
/// let report = generator.run(&Job::new("cards.sla", "cards.csv"))?;
/// println!("{} documents", report.outputs.len());
/// ```
pub struct Generator {
    options: GeneratorOptions,
    host: Option<Box<dyn HostApplication>>,
    multiple_templates: bool,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            host: None,
            multiple_templates: false,
        }
    }

    /// Sets the host application used for PDF export.
    pub fn with_host(mut self, host: Box<dyn HostApplication>) -> Self {
        self.host = Some(host);
        self
    }

    /// Marks the run as part of a batch over several templates, which
    /// changes how merged outputs are named.
    pub fn with_multiple_templates(mut self, multiple: bool) -> Self {
        self.multiple_templates = multiple;
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn host(&self) -> Option<&dyn HostApplication> {
        self.host.as_deref()
    }

    /// Runs one template/data pair to completion.
    ///
    /// Output written before a failure stays on disk.
    pub fn run(&mut self, job: &Job) -> Result<GenerationReport, GeneratorError> {
        if job.format == OutputFormat::Pdf && self.host.is_none() {
            return Err(GeneratorError::Config(
                "PDF output needs a host application to export with".to_string(),
            ));
        }
        if !job.template.exists() {
            return Err(GeneratorError::TemplateNotFound(job.template.clone()));
        }
        info!(
            "Generating from template {} with data {}",
            job.template.display(),
            job.data_file.display()
        );

        if job.save_settings {
            store_settings_in_file(
                &job.template,
                &Settings::from_job(job),
                &self.options.settings_storage_name,
                self.options.indent_output,
            )?;
        }

        let template = Template::load(&job.template, &self.options.substitution.next_record_marker)?;
        let mut report = GenerationReport {
            records_per_unit: template.records_per_unit(),
            diagnostics: template.diagnostics().to_vec(),
            ..Default::default()
        };

        let source_options = SourceOptions {
            delimiter: job.delimiter,
            encoding: job.encoding.clone(),
            require_data_rows: true,
        };
        let mut set = load_records(&job.data_file, &source_options)?;
        let range = resolve_range(set.len(), job.first_row.as_deref(), job.last_row.as_deref());
        report.diagnostics.extend(
            range
                .warnings
                .iter()
                .map(|w| Diagnostic::new(DiagnosticKind::RowRange, w.as_str())),
        );
        set.retain_range(&range);
        report.records = set.len();

        let engine = PlaceholderEngine::new(&set.fields, self.options.substitution.clone())?
            .protect_script(self.options.settings_storage_name.clone());
        let output_dir = output_dir(job);
        let records_per_unit = template.records_per_unit();
        let total_units = set.len().div_ceil(records_per_unit);
        info!(
            "{} record(s), {} per unit, {} unit(s)",
            set.len(),
            records_per_unit,
            total_units
        );

        let mut source = VecDataSource::new(set.records);
        if job.single_output {
            self.generate_merged(job, &template, &engine, &mut source, &output_dir, &mut report)?;
        } else {
            let namer = OutputNamer::new(&job.output_name, &set.fields, &self.options.substitution)?;
            self.generate_each(&template, &engine, &mut source, &namer, total_units, &output_dir, &mut report)?;
        }

        if job.format == OutputFormat::Pdf
            && let Some(host) = self.host.as_deref_mut()
        {
            report.exported = export_documents(host, &report.outputs, job.keep_intermediate)?;
        }

        for diagnostic in &report.diagnostics {
            debug!("{}", diagnostic);
        }
        info!(
            "Generated {} document(s) from {}",
            report.outputs.len(),
            job.template.display()
        );
        Ok(report)
    }

    /// One output document per unit, written as soon as it is substituted.
    #[allow(clippy::too_many_arguments)]
    fn generate_each(
        &self,
        template: &Template,
        engine: &PlaceholderEngine,
        source: &mut VecDataSource,
        namer: &OutputNamer,
        total_units: usize,
        output_dir: &Path,
        report: &mut GenerationReport,
    ) -> Result<(), GeneratorError> {
        loop {
            let unit = next_unit(source, template.records_per_unit());
            if unit.is_empty() {
                break;
            }
            report.units += 1;

            let mut fragment = substitute_unit(template, engine, &unit);
            report.removed_texts += remove_empty_texts(&mut fragment, self.options.cleanup).removed_texts;

            let name = namer.name(report.units, total_units, &unit);
            let path = write_document(&fragment, output_dir, &name, self.options.indent_output)?;
            report.outputs.push(path);
        }
        Ok(())
    }

    /// All units stacked into a single document.
    fn generate_merged(
        &self,
        job: &Job,
        template: &Template,
        engine: &PlaceholderEngine,
        source: &mut VecDataSource,
        output_dir: &Path,
        report: &mut GenerationReport,
    ) -> Result<(), GeneratorError> {
        let mut buffer: Option<MergeBuffer> = None;
        loop {
            let unit = next_unit(source, template.records_per_unit());
            if unit.is_empty() {
                break;
            }
            report.units += 1;

            let fragment = substitute_unit(template, engine, &unit);
            match buffer.as_mut() {
                Some(buffer) => buffer.append(fragment)?,
                None => buffer = Some(MergeBuffer::new(fragment, &self.options.contribution_text)?),
            }
        }

        let Some(buffer) = buffer else {
            warn!("no records to merge for {}", job.template.display());
            return Ok(());
        };
        let mut merged = buffer.finish()?;
        report.diagnostics.append(&mut merged.diagnostics);
        report.removed_texts += remove_empty_texts(&mut merged.document, self.options.cleanup).removed_texts;

        let name = merged_name(&job.output_name, &job.template, self.multiple_templates);
        let path = write_document(&merged.document, output_dir, &name, self.options.indent_output)?;
        report.outputs.push(path);
        Ok(())
    }
}

/// Takes the records of the next unit; fewer only at the end of the data.
fn next_unit(source: &mut dyn DataSource, records_per_unit: usize) -> Vec<Record> {
    let mut unit = Vec::with_capacity(records_per_unit);
    while unit.len() < records_per_unit {
        match source.next() {
            Some(record) => unit.push(record),
            None => break,
        }
    }
    unit
}

fn substitute_unit(template: &Template, engine: &PlaceholderEngine, records: &[Record]) -> Document {
    let mut fragment = template.fragment();
    engine.substitute_document(&mut fragment, records);
    fragment
}

/// The job's output directory, or the template's directory when unset.
fn output_dir(job: &Job) -> PathBuf {
    if !job.output_dir.as_os_str().is_empty() {
        return job.output_dir.clone();
    }
    job.template
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slagen_traits::RecordingHost;
    use tempfile::TempDir;

    const TEMPLATE: &str = r#"<SCRIBUSUTF8NEW Version="1.5.8"><DOCUMENT ANZPAGES="1" PAGEHEIGHT="800" GapVertical="40">
<COLOR NAME="Black" SPACE="CMYK"/>
<PAGE NUM="0" PAGEYPOS="20"/>
<PAGEOBJECT ItemID="10" YPOS="100" OwnPage="0" NEXTITEM="-1" BACKITEM="-1"><StoryText><ITEXT CH="%VAR_name% &lt;%VAR_email%&gt;"/></StoryText></PAGEOBJECT>
</DOCUMENT></SCRIBUSUTF8NEW>"#;

    struct Fixture {
        dir: TempDir,
        job: Job,
    }

    fn fixture(template: &str, csv: &str) -> Fixture {
        let dir = TempDir::new().unwrap();
        let template_path = dir.path().join("cards.sla");
        let data_path = dir.path().join("cards.csv");
        std::fs::write(&template_path, template).unwrap();
        std::fs::write(&data_path, csv).unwrap();
        let mut job = Job::new(template_path, data_path);
        job.output_dir = dir.path().join("out");
        Fixture { dir, job }
    }

    fn texts(path: &Path) -> Vec<String> {
        Document::from_file(path)
            .unwrap()
            .root
            .descendants()
            .filter_map(|e| e.attr("CH").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_one_document_per_record() {
        let f = fixture(TEMPLATE, "name,email\nAda,ada@x\nBob,bob@x\n");
        let report = Generator::new(GeneratorOptions::default()).run(&f.job).unwrap();

        assert_eq!(report.units, 2);
        assert_eq!(report.outputs, vec![f.job.output_dir.join("1.sla"), f.job.output_dir.join("2.sla")]);
        assert_eq!(texts(&report.outputs[1]), vec!["Bob <bob@x>"]);
    }

    #[test]
    fn test_merged_document() {
        let mut f = fixture(TEMPLATE, "name,email\nAda,ada@x\nBob,bob@x\nCy,cy@x\n");
        f.job.single_output = true;
        let report = Generator::new(GeneratorOptions::default()).run(&f.job).unwrap();

        assert_eq!(report.units, 3);
        assert_eq!(report.outputs, vec![f.job.output_dir.join("cards__single.sla")]);
        let merged = Document::from_file(&report.outputs[0]).unwrap();
        assert_eq!(merged.properties().unwrap().attr("ANZPAGES"), Some("3"));
        assert_eq!(texts(&report.outputs[0]), vec!["Ada <ada@x>", "Bob <bob@x>", "Cy <cy@x>"]);
    }

    #[test]
    fn test_row_range_and_diagnostics() {
        let mut f = fixture(TEMPLATE, "name,email\nAda,a\nBob,b\nCy,c\n");
        f.job.first_row = Some("2".to_string());
        f.job.last_row = Some("lots".to_string());
        let report = Generator::new(GeneratorOptions::default()).run(&f.job).unwrap();

        assert_eq!(report.records, 2);
        assert_eq!(texts(&report.outputs[0]), vec!["Bob <b>"]);
        assert!(
            report
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::RowRange)
        );
    }

    #[test]
    fn test_output_next_to_template_by_default() {
        let mut f = fixture(TEMPLATE, "name,email\nAda,a\n");
        f.job.output_dir = PathBuf::new();
        let report = Generator::new(GeneratorOptions::default()).run(&f.job).unwrap();
        assert_eq!(report.outputs, vec![f.dir.path().join("1.sla")]);
    }

    #[test]
    fn test_slash_in_output_name_makes_subdirectories() {
        let mut f = fixture(TEMPLATE, "name,email,city\nAda,a,Ghent\nBob,b,Paris\n");
        f.job.output_name = "%VAR_city%/%VAR_name%".to_string();
        let report = Generator::new(GeneratorOptions::default()).run(&f.job).unwrap();

        let out = &f.job.output_dir;
        assert_eq!(report.outputs, vec![out.join("Ghent").join("Ada.sla"), out.join("Paris").join("Bob.sla")]);
        assert_eq!(texts(&report.outputs[1]), vec!["Bob <b>"]);
    }

    #[test]
    fn test_pdf_needs_host() {
        let mut f = fixture(TEMPLATE, "name,email\nAda,a\n");
        f.job.format = OutputFormat::Pdf;
        let err = Generator::new(GeneratorOptions::default()).run(&f.job).unwrap_err();
        assert!(matches!(err, GeneratorError::Config(_)));
    }

    #[test]
    fn test_pdf_export_through_host() {
        let mut f = fixture(TEMPLATE, "name,email\nAda,a\nBob,b\n");
        f.job.format = OutputFormat::Pdf;
        f.job.keep_intermediate = false;
        let mut generator = Generator::new(GeneratorOptions::default()).with_host(Box::new(RecordingHost::new(1)));
        let report = generator.run(&f.job).unwrap();

        assert_eq!(report.exported.len(), 2);
        assert!(report.outputs.iter().all(|p| !p.exists()));
        assert_eq!(generator.host().map(|h| h.name()), Some("RecordingHost"));
    }

    #[test]
    fn test_missing_template() {
        let mut f = fixture(TEMPLATE, "name,email\nAda,a\n");
        f.job.template = f.dir.path().join("nope.sla");
        let err = Generator::new(GeneratorOptions::default()).run(&f.job).unwrap_err();
        assert!(matches!(err, GeneratorError::TemplateNotFound(_)));
    }

    #[test]
    fn test_saved_settings_are_not_substituted() {
        let mut f = fixture(TEMPLATE, "name,email\nAda,a\n");
        f.job.save_settings = true;
        f.job.output_name = "%VAR_name%".to_string();
        let report = Generator::new(GeneratorOptions::default()).run(&f.job).unwrap();
        assert_eq!(report.outputs, vec![f.job.output_dir.join("Ada.sla")]);

        let stored = crate::settings::load_settings_from_file(&report.outputs[0], "ScribusGeneratorDefaultSettings")
            .unwrap()
            .unwrap();
        assert_eq!(stored.output_name, "%VAR_name%");
    }
}
