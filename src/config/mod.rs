/// Configuration subsystem - editor settings and preferences
///
/// This module handles loading configuration from .tagscriberc files,
/// providing the settings used by the editing session and the CLI.

pub mod rc;

// Re-export public interface
pub use rc::{RC_FILE_NAME, RcConfig, RcLoader};
