pub mod fixtures;

use slagen::document::Document;
use slagen::{GenerationReport, Generator, GeneratorError, GeneratorOptions, Job};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A scratch directory holding one template and one data file.
pub struct Workspace {
    pub dir: TempDir,
    pub template: PathBuf,
    pub data: PathBuf,
}

impl Workspace {
    pub fn new(template: &str, data: &str) -> std::io::Result<Self> {
        Self::with_data_name(template, data, "data.csv")
    }

    pub fn with_data_name(template: &str, data: &str, data_name: &str) -> std::io::Result<Self> {
        let dir = TempDir::new()?;
        let template_path = dir.path().join("template.sla");
        let data_path = dir.path().join(data_name);
        std::fs::write(&template_path, template)?;
        std::fs::write(&data_path, data)?;
        Ok(Self {
            dir,
            template: template_path,
            data: data_path,
        })
    }

    pub fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    /// A job writing into `out/`.
    pub fn job(&self) -> Job {
        let mut job = Job::new(&self.template, &self.data);
        job.output_dir = self.out_dir();
        job
    }

    pub fn generate(&self, job: &Job) -> Result<GenerationReport, GeneratorError> {
        self.generate_with(GeneratorOptions::default(), job)
    }

    pub fn generate_with(&self, options: GeneratorOptions, job: &Job) -> Result<GenerationReport, GeneratorError> {
        Generator::new(options).run(job)
    }

    /// File names in `out/`, sorted.
    pub fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.out_dir())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

/// A generated document with inspection helpers.
pub struct GeneratedSla {
    pub text: String,
    pub doc: Document,
}

impl GeneratedSla {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)?;
        let doc = Document::parse(&text)?;
        Ok(Self { text, doc })
    }

    pub fn property(&self, name: &str) -> Option<String> {
        self.doc.properties().ok()?.attr(name).map(str::to_string)
    }

    /// `CH` of every text run, in document order.
    pub fn texts(&self) -> Vec<String> {
        self.doc
            .root
            .descendants()
            .filter(|e| e.name == "ITEXT")
            .filter_map(|e| e.attr("CH").map(str::to_string))
            .collect()
    }

    pub fn page_ys(&self) -> Vec<f64> {
        self.attr_values("PAGE", "PAGEYPOS")
            .iter()
            .map(|v| v.parse().unwrap_or(f64::NAN))
            .collect()
    }

    pub fn item_ids(&self) -> Vec<String> {
        self.attr_values("PAGEOBJECT", "ItemID")
    }

    pub fn attr_values(&self, element: &str, attribute: &str) -> Vec<String> {
        self.doc
            .root
            .descendants()
            .filter(|e| e.name == element)
            .filter_map(|e| e.attr(attribute).map(str::to_string))
            .collect()
    }
}

#[macro_export]
macro_rules! assert_sla_contains_text {
    ($sla:expr, $text:expr) => {
        assert!(
            $sla.texts().iter().any(|t| t.contains($text)),
            "expected a text run containing {:?}, found {:?}",
            $text,
            $sla.texts()
        )
    };
}

#[macro_export]
macro_rules! assert_no_placeholders {
    ($sla:expr) => {
        assert!(
            $sla.texts().iter().all(|t| !t.contains("%VAR_")),
            "placeholders left in {:?}",
            $sla.texts()
        )
    };
}
