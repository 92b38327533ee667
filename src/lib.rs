pub mod config;
pub mod editor;
pub mod error;
pub mod error_codes;
pub mod executor;
pub mod form;
pub mod input_validation;
pub mod jobs;
pub mod logging;
pub mod system_integration;

#[cfg(test)]
mod test_support;

pub use config::PanelConfig;
pub use editor::{EditMode, JobEditor};
pub use error::{PanelError, PanelResult};
pub use executor::{CliExecutor, CommandExecutor, DaemonAction, JobCommand};
pub use form::{FieldDescriptor, FieldKind, JobForm};
pub use jobs::{JobConfig, JobRow, JobStore, JobSummary, RowAction, SafeRefCodec};
pub use logging::{LogEntry, LogLevel, LogManager};
pub use system_integration::{HostProbe, LocalHost};

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
