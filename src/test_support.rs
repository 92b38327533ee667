//! In-memory stand-ins for the syncwatch CLI and the host, shared by the unit tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{PanelError, PanelResult};
use crate::executor::{CommandExecutor, JobCommand};
use crate::jobs::{FieldMap, JobConfig, JobStore, SafeRefCodec};
use crate::logging::LogManager;
use crate::system_integration::HostProbe;

#[derive(Default)]
struct CliState {
    jobs: BTreeMap<String, FieldMap>,
    calls: Vec<(JobCommand, Option<Value>)>,
    failure: Option<String>,
    raw_list: Option<String>,
}

/// Behaves like `syncwatch-cli.py` against an in-memory job database.
#[derive(Clone, Default)]
pub struct FakeCli {
    state: Arc<Mutex<CliState>>,
}

impl FakeCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a job: defaults overlaid with `fields`.
    pub fn insert(&self, name: &str, fields: Value) {
        let mut record = JobConfig::default().to_fields();
        if let Value::Object(fields) = fields {
            record.extend(fields);
        }
        self.state.lock().unwrap().jobs.insert(name.to_string(), record);
    }

    pub fn job(&self, name: &str) -> Option<FieldMap> {
        self.state.lock().unwrap().jobs.get(name).cloned()
    }

    pub fn fail_with(&self, message: &str) {
        self.state.lock().unwrap().failure = Some(message.to_string());
    }

    pub fn recover(&self) {
        self.state.lock().unwrap().failure = None;
    }

    pub fn respond_raw(&self, text: &str) {
        self.state.lock().unwrap().raw_list = Some(text.to_string());
    }

    pub fn calls(&self) -> Vec<(JobCommand, Option<Value>)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_mutation(&self) -> Option<(JobCommand, Option<Value>)> {
        self.calls()
            .into_iter()
            .rev()
            .find(|(c, _)| matches!(c, JobCommand::Add(_) | JobCommand::Delete(_)))
    }

    pub fn mutation_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|(c, _)| matches!(c, JobCommand::Add(_) | JobCommand::Delete(_)))
            .count()
    }
}

fn missing(command: &JobCommand) -> PanelError {
    PanelError::CommandFailed {
        command: command.to_string(),
        message: "Invalid option entered\n<name> doesn't exist".to_string(),
    }
}

#[async_trait]
impl CommandExecutor for FakeCli {
    async fn execute(&self, command: &JobCommand, payload: Option<&Value>) -> PanelResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((command.clone(), payload.cloned()));

        if let Some(message) = &state.failure {
            return Err(PanelError::CommandFailed {
                command: command.to_string(),
                message: message.clone(),
            });
        }

        match command {
            JobCommand::List => {
                if let Some(raw) = &state.raw_list {
                    return Ok(raw.clone());
                }
                let rows: Vec<Value> = state
                    .jobs
                    .iter()
                    .map(|(name, job)| {
                        json!({
                            "job": name,
                            "enabled": job.get("enabled").cloned().unwrap_or(Value::Bool(true)),
                            "source": job.get("source"),
                            "destination": job.get("destination"),
                            "reversesync": job.get("reversesync"),
                            "delete": job.get("delete"),
                        })
                    })
                    .collect();
                Ok(Value::Array(rows).to_string())
            }
            JobCommand::Show(name) => state
                .jobs
                .get(name)
                .map(|job| Value::Object(job.clone()).to_string())
                .ok_or_else(|| missing(command)),
            JobCommand::Add(name) => {
                let Some(Value::Object(changes)) = payload else {
                    return Err(PanelError::CommandFailed {
                        command: command.to_string(),
                        message: "Invalid JSON format".to_string(),
                    });
                };
                let job = state
                    .jobs
                    .entry(name.clone())
                    .or_insert_with(|| JobConfig::default().to_fields());
                job.extend(changes.clone());
                Ok(String::new())
            }
            JobCommand::Delete(name) => match state.jobs.remove(name) {
                Some(_) => Ok(String::new()),
                None => Err(missing(command)),
            },
            JobCommand::Control(_) => Ok(json!({"result": true}).to_string()),
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeHost {
    storage: bool,
    dirs: HashSet<String>,
    shares: Vec<String>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage(mut self, installed: bool) -> Self {
        self.storage = installed;
        self
    }

    pub fn with_dirs<'a>(mut self, dirs: impl IntoIterator<Item = &'a str>) -> Self {
        self.dirs.extend(dirs.into_iter().map(str::to_string));
        self
    }

    /// Shares also exist as directories under `/shares`.
    pub fn with_shares<'a>(mut self, shares: impl IntoIterator<Item = &'a str>) -> Self {
        for share in shares {
            self.dirs.insert(format!("/shares/{share}"));
            self.shares.push(share.to_string());
        }
        self
    }
}

#[async_trait]
impl HostProbe for FakeHost {
    async fn storage_feature_installed(&self) -> bool {
        self.storage
    }

    async fn is_directory(&self, path: &str) -> bool {
        self.dirs.contains(path)
    }

    async fn list_shares(&self) -> Vec<String> {
        self.shares.clone()
    }
}

pub fn store_with(cli: FakeCli, host: FakeHost) -> JobStore {
    JobStore::new(
        Arc::new(cli),
        Arc::new(host),
        SafeRefCodec::default(),
        Arc::new(LogManager::new(100)),
    )
}
