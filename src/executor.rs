//! syncwatch CLI invocation.
//!
//! The CLI owns the job database; this module only knows how to call it.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::config::PanelConfig;
use crate::error::{PanelError, PanelResult};

/// Commands understood by the syncwatch CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobCommand {
    /// No arguments: JSON array of job summaries.
    List,
    /// `shw <name>`: full job configuration.
    Show(String),
    /// `add <name> <json>`: create the job, or update the given fields.
    Add(String),
    /// `del <name>`
    Delete(String),
    /// `ctl <action>`: daemon control.
    Control(DaemonAction),
}

impl JobCommand {
    pub fn args(&self) -> Vec<String> {
        match self {
            JobCommand::List => Vec::new(),
            JobCommand::Show(name) => vec!["shw".to_string(), name.clone()],
            JobCommand::Add(name) => vec!["add".to_string(), name.clone()],
            JobCommand::Delete(name) => vec!["del".to_string(), name.clone()],
            JobCommand::Control(action) => vec!["ctl".to_string(), action.as_str().to_string()],
        }
    }
}

impl fmt::Display for JobCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobCommand::List => write!(f, "list"),
            other => write!(f, "{}", other.args().join(" ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DaemonAction {
    Start,
    Stop,
    Restart,
    Reload,
    Enable,
    Disable,
    #[value(name = "isactive")]
    IsActive,
    #[value(name = "isenabled")]
    IsEnabled,
}

impl DaemonAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DaemonAction::Start => "start",
            DaemonAction::Stop => "stop",
            DaemonAction::Restart => "restart",
            DaemonAction::Reload => "reload",
            DaemonAction::Enable => "enable",
            DaemonAction::Disable => "disable",
            DaemonAction::IsActive => "isactive",
            DaemonAction::IsEnabled => "isenabled",
        }
    }
}

/// Runs a CLI command with an optional JSON payload and returns its raw output.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &JobCommand, payload: Option<&Value>) -> PanelResult<String>;
}

/// Spawns the syncwatch CLI as a child process.
pub struct CliExecutor {
    program: PathBuf,
    elevate: Option<String>,
}

impl CliExecutor {
    pub fn new(program: PathBuf) -> Self {
        Self { program, elevate: None }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        Self {
            program: config.cli_path.clone(),
            elevate: config.elevate.clone(),
        }
    }

    pub fn with_elevate(mut self, wrapper: impl Into<String>) -> Self {
        self.elevate = Some(wrapper.into());
        self
    }

    fn build(&self, command: &JobCommand, payload: Option<&Value>) -> PanelResult<Command> {
        let mut cmd = match &self.elevate {
            Some(wrapper) => {
                let mut cmd = Command::new(wrapper);
                cmd.arg(&self.program);
                cmd
            }
            None => Command::new(&self.program),
        };
        cmd.args(command.args());

        if let Some(payload) = payload {
            let json = serde_json::to_string(payload)
                .map_err(|e| PanelError::InvalidInput(format!("cannot encode payload: {e}")))?;
            cmd.arg(json);
        }

        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        Ok(cmd)
    }
}

#[async_trait]
impl CommandExecutor for CliExecutor {
    async fn execute(&self, command: &JobCommand, payload: Option<&Value>) -> PanelResult<String> {
        tracing::debug!(program = %self.program.display(), %command, "running syncwatch cli");

        let output = self
            .build(command, payload)?
            .output()
            .await
            .map_err(|e| PanelError::CommandFailed {
                command: command.to_string(),
                message: format!("cannot run {}: {e}", self.program.display()),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // the CLI prints its diagnostics on stdout, so both streams are reported
            let captured = format!("{}\n{}", stdout.trim(), stderr.trim());
            let captured = captured.trim();
            let message = if captured.is_empty() {
                format!("{}; please check the log file", output.status)
            } else {
                captured.to_string()
            };
            tracing::warn!(%command, status = %output.status, "syncwatch cli failed");
            return Err(PanelError::CommandFailed {
                command: command.to_string(),
                message,
            });
        }

        Ok(stdout)
    }
}
