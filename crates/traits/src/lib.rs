pub mod host;

pub use host::{ExportError, ExportRecord, HostApplication, RecordingHost};
