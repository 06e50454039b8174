//! Offline rewrites of legacy template syntax.
//!
//! These run on the raw file text, line by line, and are never applied while
//! generating. The file is backed up as `<name>.bak` before it is rewritten.

use crate::error::TemplateError;
use log::info;
use regex::Regex;
use slagen_types::options::{LEGACY_NEXT_RECORD_MARKER, NEXT_RECORD_MARKER};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static LEGACY_CARRIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<ItemAttribute .+?)Type="SGAttribute"(.+?)Parameter="([^"]*?)"(.+)?RelationshipTo="""#)
        .expect("BUG: invalid LEGACY_CARRIER regex literal")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    /// `%VAR_NEXT-RECORD%` becomes `%SG_NEXT-RECORD%`.
    NextRecord,
    /// Carriers typed `SGAttribute` with the reference in `Parameter` become
    /// carriers with `Parameter="SGAttribute"` and the reference in `RelationshipTo`.
    Attributes,
}

impl Migration {
    pub fn apply(&self, text: &str) -> (String, usize) {
        match self {
            Migration::NextRecord => migrate_next_record(text),
            Migration::Attributes => migrate_attribute_carriers(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub changed_lines: usize,
    pub backup: PathBuf,
}

pub fn migrate_next_record(text: &str) -> (String, usize) {
    rewrite_lines(text, |line| {
        line.contains(LEGACY_NEXT_RECORD_MARKER)
            .then(|| line.replace(LEGACY_NEXT_RECORD_MARKER, NEXT_RECORD_MARKER))
    })
}

pub fn migrate_attribute_carriers(text: &str) -> (String, usize) {
    rewrite_lines(text, |line| {
        LEGACY_CARRIER.is_match(line).then(|| {
            LEGACY_CARRIER
                .replace_all(
                    line,
                    r#"${1}Type="none"${2}Parameter="SGAttribute"${4}RelationshipTo="${3}""#,
                )
                .into_owned()
        })
    })
}

/// Applies `rewrite` to every line, keeping line endings as they were.
fn rewrite_lines<F>(text: &str, mut rewrite: F) -> (String, usize)
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut changed = 0;
    for line in text.split_inclusive('\n') {
        let (body, ending) = match line.strip_suffix("\r\n") {
            Some(body) => (body, "\r\n"),
            None => match line.strip_suffix('\n') {
                Some(body) => (body, "\n"),
                None => (line, ""),
            },
        };
        match rewrite(body) {
            Some(new) if new != body => {
                changed += 1;
                out.push_str(&new);
            }
            _ => out.push_str(body),
        }
        out.push_str(ending);
    }
    (out, changed)
}

/// Rewrites `path` in place after copying it to `<path>.bak`.
pub fn migrate_file(path: &Path, migration: Migration) -> Result<MigrationReport, TemplateError> {
    if !path.is_file() {
        return Err(TemplateError::NotFound(path.to_path_buf()));
    }
    let io_err = |source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    };

    let text = std::fs::read_to_string(path).map_err(io_err)?;
    let mut backup = path.as_os_str().to_owned();
    backup.push(".bak");
    let backup = PathBuf::from(backup);
    std::fs::copy(path, &backup).map_err(io_err)?;

    let (migrated, changed_lines) = migration.apply(&text);
    std::fs::write(path, migrated).map_err(io_err)?;
    info!(
        "{:?} migration of {} changed {} line(s), backup at {}",
        migration,
        path.display(),
        changed_lines,
        backup.display()
    );
    Ok(MigrationReport { changed_lines, backup })
}
