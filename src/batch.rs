//! Batch runs over several templates.
//!
//! Every template becomes its own job. A job starts from the defaults,
//! optionally takes the settings stored in its template, and finally takes
//! whatever was given explicitly on the command line.

use log::{error, info, warn};
use slagen_core::settings::load_settings_from_file;
use slagen_core::{GenerationReport, Generator, GeneratorError, Job, OutputFormat};
use std::path::{Path, PathBuf};

/// Extension of the data file looked up next to a template.
pub const DEFAULT_DATA_EXTENSION: &str = "csv";

/// Values given explicitly for every job of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOverrides {
    pub data_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub output_name: Option<String>,
    pub delimiter: Option<char>,
    pub encoding: Option<String>,
    pub single_output: Option<bool>,
    pub first_row: Option<String>,
    pub last_row: Option<String>,
    pub format: Option<OutputFormat>,
    pub keep_intermediate: Option<bool>,
    pub save_settings: bool,
}

impl JobOverrides {
    pub fn apply(&self, job: &mut Job) {
        if let Some(data_file) = &self.data_file {
            job.data_file = data_file.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            job.output_dir = output_dir.clone();
        }
        if let Some(output_name) = &self.output_name {
            job.output_name = output_name.clone();
        }
        if let Some(delimiter) = self.delimiter {
            job.delimiter = delimiter;
        }
        if let Some(encoding) = &self.encoding {
            job.encoding = encoding.clone();
        }
        if let Some(single) = self.single_output {
            job.single_output = single;
        }
        if let Some(first) = &self.first_row {
            job.first_row = Some(first.clone());
        }
        if let Some(last) = &self.last_row {
            job.last_row = Some(last.clone());
        }
        if let Some(format) = self.format {
            job.format = format;
        }
        if let Some(keep) = self.keep_intermediate {
            job.keep_intermediate = keep;
        }
        job.save_settings = self.save_settings;
    }
}

/// The data file used when none is configured: the template path with a
/// `.csv` extension.
pub fn default_data_file(template: &Path) -> PathBuf {
    template.with_extension(DEFAULT_DATA_EXTENSION)
}

/// Builds the job for `template`.
///
/// Returns `Ok(None)` when the job has to be skipped because no data file
/// was configured and the default one does not exist.
pub fn build_job(
    template: &Path,
    overrides: &JobOverrides,
    load_settings: bool,
    storage_name: &str,
) -> Result<Option<Job>, GeneratorError> {
    let mut job = Job::new(template, PathBuf::new());
    if load_settings {
        match load_settings_from_file(template, storage_name)? {
            Some(settings) => {
                info!("Loaded stored settings from {}", template.display());
                settings.apply_to(&mut job);
            }
            None => info!("{} has no stored settings", template.display()),
        }
    }
    overrides.apply(&mut job);

    if job.data_file.as_os_str().is_empty() {
        let data_file = default_data_file(template);
        if !data_file.exists() {
            warn!(
                "No data file given for {} and {} does not exist, skipping",
                template.display(),
                data_file.display()
            );
            return Ok(None);
        }
        job.data_file = data_file;
    }
    Ok(Some(job))
}

/// How one template of a batch ended.
#[derive(Debug)]
pub enum JobStatus {
    Done(GenerationReport),
    Skipped,
    Failed(GeneratorError),
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub template: PathBuf,
    pub status: JobStatus,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, JobStatus::Failed(_)))
            .count()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, JobStatus::Done(_)))
            .count()
    }
}

/// Runs every template independently. A failure is logged with advice and
/// the batch moves on to the next template.
pub fn run_batch(
    generator: &mut Generator,
    templates: &[PathBuf],
    overrides: &JobOverrides,
    load_settings: bool,
) -> BatchSummary {
    let storage_name = generator.options().settings_storage_name.clone();
    let mut summary = BatchSummary::default();

    for template in templates {
        let status = match build_job(template, overrides, load_settings, &storage_name) {
            Ok(None) => JobStatus::Skipped,
            Ok(Some(job)) => match generator.run(&job) {
                Ok(report) => JobStatus::Done(report),
                Err(e) => JobStatus::Failed(e),
            },
            Err(e) => JobStatus::Failed(e),
        };
        if let JobStatus::Failed(e) = &status {
            error!("Generating from {} failed: {}", template.display(), e);
            error!("{}", e.category().guidance());
        }
        summary.outcomes.push(BatchOutcome {
            template: template.clone(),
            status,
        });
    }

    info!(
        "{} of {} template(s) generated, {} failed",
        summary.succeeded(),
        templates.len(),
        summary.failed()
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use slagen_core::settings::store_settings_in_file;
    use slagen_core::{GeneratorOptions, Settings};
    use tempfile::TempDir;

    const TEMPLATE: &str = r#"<SCRIBUSUTF8NEW Version="1.5.8"><DOCUMENT ANZPAGES="1" PAGEHEIGHT="100">
        <PAGE NUM="0" PAGEYPOS="0"/>
        <PAGEOBJECT ItemID="1" YPOS="10"><StoryText><ITEXT CH="%VAR_name%"/></StoryText></PAGEOBJECT>
    </DOCUMENT></SCRIBUSUTF8NEW>"#;
    const STORAGE: &str = "ScribusGeneratorDefaultSettings";

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_data_file() {
        assert_eq!(default_data_file(Path::new("a/cards.sla")), PathBuf::from("a/cards.csv"));
    }

    #[test]
    fn test_missing_default_data_file_skips() {
        let dir = TempDir::new().unwrap();
        let template = write(&dir, "cards.sla", TEMPLATE);
        assert_eq!(build_job(&template, &JobOverrides::default(), false, STORAGE).unwrap(), None);

        write(&dir, "cards.csv", "name\nAda\n");
        let job = build_job(&template, &JobOverrides::default(), false, STORAGE)
            .unwrap()
            .unwrap();
        assert_eq!(job.data_file, dir.path().join("cards.csv"));
    }

    #[test]
    fn test_overrides_win_over_stored_settings() {
        let dir = TempDir::new().unwrap();
        let template = write(&dir, "cards.sla", TEMPLATE);
        let mut stored = Job::new(&template, "stored.csv");
        stored.output_name = "stored_%VAR_name%".to_string();
        stored.delimiter = ';';
        store_settings_in_file(&template, &Settings::from_job(&stored), STORAGE, true).unwrap();

        let overrides = JobOverrides {
            output_name: Some("cli".to_string()),
            ..Default::default()
        };
        let job = build_job(&template, &overrides, true, STORAGE).unwrap().unwrap();
        assert_eq!(job.data_file, PathBuf::from("stored.csv"));
        assert_eq!(job.delimiter, ';');
        assert_eq!(job.output_name, "cli");
        assert_eq!(job.template, template);
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "good.sla", TEMPLATE);
        write(&dir, "good.csv", "name\nAda\nBob\n");
        let bad = write(&dir, "bad.sla", TEMPLATE);
        write(&dir, "bad.csv", "name\n");
        let skipped = write(&dir, "lonely.sla", TEMPLATE);

        let mut generator = Generator::new(GeneratorOptions::default());
        let summary = run_batch(
            &mut generator,
            &[bad, good, skipped],
            &JobOverrides::default(),
            false,
        );

        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.succeeded(), 1);
        assert!(matches!(
            summary.outcomes[0].status,
            JobStatus::Failed(GeneratorError::DataSource(_))
        ));
        match &summary.outcomes[1].status {
            JobStatus::Done(report) => assert_eq!(report.outputs.len(), 2),
            other => panic!("unexpected status {:?}", other),
        }
        assert!(matches!(summary.outcomes[2].status, JobStatus::Skipped));
    }
}
