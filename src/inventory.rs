//! The placeholders a template references.

use serde_json::{Value, json};
use slagen_core::template::{PlaceholderUse, Template, TemplateError};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    pub template: PathBuf,
    pub records_per_unit: usize,
    pub placeholders: Vec<PlaceholderUse>,
}

impl Inventory {
    pub fn load(template: &Path, marker: &str) -> Result<Self, TemplateError> {
        let loaded = Template::load(template, marker)?;
        Ok(Self {
            template: template.to_path_buf(),
            records_per_unit: loaded.records_per_unit(),
            placeholders: loaded.placeholders(),
        })
    }

    /// One `template,variable,kind` line per placeholder.
    pub fn csv_lines(&self) -> Vec<String> {
        let template = csv_field(&self.template.to_string_lossy());
        self.placeholders
            .iter()
            .map(|p| format!("{},{},{}", template, csv_field(&p.name), p.kind))
            .collect()
    }

    pub fn to_json(&self) -> Value {
        let placeholders: Vec<Value> = self
            .placeholders
            .iter()
            .map(|p| json!({ "variable": p.name, "kind": p.kind.to_string() }))
            .collect();
        json!({
            "template": self.template.to_string_lossy(),
            "recordsPerUnit": self.records_per_unit,
            "placeholders": placeholders,
        })
    }
}

/// Quotes a field holding a comma, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
