//! Output file names.

use crate::error::GeneratorError;
use log::warn;
use slagen_template::PlaceholderEngine;
use slagen_types::options::COUNTER_FIELD;
use slagen_types::{Record, SubstitutionOptions};
use std::path::Path;

/// Characters that are illegal in file names on common file systems.
const ILLEGAL_CHARS: [char; 8] = ['<', '>', '?', '"', ':', '|', '\\', '*'];

/// Number of digits of `total`, at least one.
pub fn counter_width(total: usize) -> usize {
    total.max(1).to_string().len()
}

/// The 1-based `number` zero-padded to the width of `total`.
pub fn counter(number: usize, total: usize) -> String {
    format!("{:0width$}", number, width = counter_width(total))
}

pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Names the output units of one run.
///
/// Without a pattern every unit is named by its counter. A pattern is
/// substituted against the unit's records, which additionally carry the
/// counter as the `COUNT` field.
pub struct OutputNamer {
    pattern: String,
    engine: Option<PlaceholderEngine>,
}

impl OutputNamer {
    pub fn new<I, S>(pattern: &str, fields: I, options: &SubstitutionOptions) -> Result<Self, GeneratorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pattern = pattern.trim().to_string();
        let engine = if pattern.is_empty() {
            None
        } else {
            let mut names: Vec<String> = fields.into_iter().map(|f| f.as_ref().to_string()).collect();
            names.push(COUNTER_FIELD.to_string());
            Some(PlaceholderEngine::new(names, options.clone())?)
        };
        Ok(Self { pattern, engine })
    }

    /// Name of unit `number` (1-based) out of `total`, without extension.
    pub fn name(&self, number: usize, total: usize, records: &[Record]) -> String {
        let count = counter(number, total);
        let Some(engine) = &self.engine else {
            return count;
        };

        let records: Vec<Record> = records
            .iter()
            .map(|r| r.clone().with_field(COUNTER_FIELD, count.as_str()))
            .collect();
        let name = sanitize_file_name(engine.substitute_plain(&self.pattern, &records).trim());
        if name.is_empty() {
            warn!(
                "output name pattern '{}' produced an empty name, using {}",
                self.pattern, count
            );
            return count;
        }
        name
    }
}

/// Name of the merged document of `template`.
///
/// An empty pattern becomes `<template stem>__single`. When several
/// templates are processed in one batch the template file name is appended
/// so their merged outputs do not overwrite each other.
pub fn merged_name(pattern: &str, template: &Path, multiple_templates: bool) -> String {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        let stem = template
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        return format!("{}__single", stem);
    }
    if multiple_templates {
        let file_name = template
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        return format!("{}__{}", pattern, file_name);
    }
    pattern.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> Record {
        Record::new().with_field("name", name).with_field("email", "x@y")
    }

    #[test]
    fn test_counter_is_zero_padded() {
        assert_eq!(counter(3, 5), "3");
        assert_eq!(counter(3, 12), "03");
        assert_eq!(counter(7, 100), "007");
        assert_eq!(counter(1, 0), "1");
    }

    #[test]
    fn test_default_names_are_counters() {
        let namer = OutputNamer::new("", ["name"], &SubstitutionOptions::default()).unwrap();
        assert_eq!(namer.name(2, 3, &[record("Ada")]), "2");
    }

    #[test]
    fn test_pattern_uses_record_and_counter() {
        let namer = OutputNamer::new("card_%VAR_name%_%VAR_COUNT%", ["name", "email"], &SubstitutionOptions::default())
            .unwrap();
        assert_eq!(namer.name(4, 10, &[record("Ada")]), "card_Ada_04");
    }

    #[test]
    fn test_illegal_characters_replaced() {
        let namer = OutputNamer::new("%VAR_name%", ["name"], &SubstitutionOptions::default()).unwrap();
        assert_eq!(namer.name(1, 1, &[record("a<b>:c|d*")]), "a_b__c_d_");
        assert_eq!(sanitize_file_name(r#"x\y?"z""#), "x_y__z_");
    }

    #[test]
    fn test_empty_result_falls_back_to_counter() {
        let namer = OutputNamer::new("%VAR_missing%", ["name"], &SubstitutionOptions::default()).unwrap();
        assert_eq!(namer.name(2, 2, &[record("Ada")]), "2");
    }

    #[test]
    fn test_merged_names() {
        let template = Path::new("/tmp/cards.sla");
        assert_eq!(merged_name("", template, false), "cards__single");
        assert_eq!(merged_name("", template, true), "cards__single");
        assert_eq!(merged_name("all", template, false), "all");
        assert_eq!(merged_name("all", template, true), "all__cards.sla");
    }
}
