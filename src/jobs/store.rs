use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use super::diff::{build_change_set, join_tokens, normalize_value, split_tokens, FieldMap};
use super::safe_ref::SafeRefCodec;
use super::types::{clamp_delay, fields, JobConfig, JobRow, JobSummary};
use crate::config::PanelConfig;
use crate::editor::JobEditor;
use crate::error::{PanelError, PanelResult};
use crate::executor::{CliExecutor, CommandExecutor, DaemonAction, JobCommand};
use crate::input_validation::{validate_job_name, validate_path_argument, validate_patterns};
use crate::logging::LogManager;
use crate::system_integration::{HostProbe, LocalHost};

/// Snapshot of the job list, replaced as a whole on every refresh.
#[derive(Debug, Clone, Default)]
struct JobCache {
    names: Vec<String>,
    rows: Vec<JobRow>,
    storage_installed: bool,
}

#[derive(Debug, Deserialize)]
struct ControlResult {
    result: bool,
}

/// Front door for every job read and write.
///
/// Failures are recorded in the notification log at the point they happen and returned
/// to the caller; the cached list is only ever replaced by a successful refresh.
pub struct JobStore {
    executor: Arc<dyn CommandExecutor>,
    host: Arc<dyn HostProbe>,
    codec: SafeRefCodec,
    log: Arc<LogManager>,
    cache: RwLock<JobCache>,
}

impl JobStore {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        host: Arc<dyn HostProbe>,
        codec: SafeRefCodec,
        log: Arc<LogManager>,
    ) -> Self {
        Self {
            executor,
            host,
            codec,
            log,
            cache: RwLock::new(JobCache::default()),
        }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(
            Arc::new(CliExecutor::from_config(config)),
            Arc::new(LocalHost::from_config(config)),
            SafeRefCodec::new(config.share_root.clone()),
            Arc::new(LogManager::new(config.max_log_lines)),
        )
    }

    pub fn codec(&self) -> &SafeRefCodec {
        &self.codec
    }

    pub fn host(&self) -> &dyn HostProbe {
        self.host.as_ref()
    }

    pub fn log(&self) -> &LogManager {
        &self.log
    }

    pub async fn job_names(&self) -> Vec<String> {
        self.cache.read().await.names.clone()
    }

    pub async fn rows(&self) -> Vec<JobRow> {
        self.cache.read().await.rows.clone()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.cache.read().await.names.iter().any(|n| n == name)
    }

    /// Storage feature presence as of the last refresh.
    pub async fn storage_installed(&self) -> bool {
        self.cache.read().await.storage_installed
    }

    /// Reload the job list and the storage feature state.
    pub async fn refresh(&self) -> PanelResult<()> {
        let result = self.load_cache().await;
        match result {
            Ok(cache) => {
                *self.cache.write().await = cache;
                Ok(())
            }
            Err(e) => Err(self.report(e, None)),
        }
    }

    async fn load_cache(&self) -> PanelResult<JobCache> {
        let storage_installed = self.host.storage_feature_installed().await;
        let summaries: Vec<JobSummary> = self.run_json(&JobCommand::List, None).await?;

        let rows = summaries
            .iter()
            .map(|s| JobRow::from_summary(s, &self.codec, storage_installed))
            .collect();
        let names = summaries.into_iter().map(|s| s.job).collect();

        Ok(JobCache {
            names,
            rows,
            storage_installed,
        })
    }

    /// Full configuration of one job.
    pub async fn fetch_detail(&self, name: &str) -> PanelResult<JobConfig> {
        self.run_json(&JobCommand::Show(name.to_string()), None)
            .await
            .map_err(|e| self.report(e, Some(name)))
    }

    /// Create or update `name` with the given fields, then refresh.
    pub async fn submit(&self, name: &str, changes: &FieldMap) -> PanelResult<()> {
        self.send_changes(name, changes)
            .await
            .map_err(|e| self.report(e, Some(name)))
    }

    pub async fn remove(&self, name: &str) -> PanelResult<()> {
        self.dispatch_mutation(name, JobCommand::Delete(name.to_string()), None)
            .await
            .map_err(|e| self.report(e, Some(name)))
    }

    pub async fn set_enabled(&self, name: &str, enabled: bool) -> PanelResult<()> {
        let mut changes = FieldMap::new();
        changes.insert(fields::ENABLED.to_string(), Value::Bool(enabled));
        self.submit(name, &changes).await
    }

    async fn send_changes(&self, name: &str, changes: &FieldMap) -> PanelResult<()> {
        let payload = Value::Object(changes.clone());
        self.dispatch_mutation(name, JobCommand::Add(name.to_string()), Some(&payload))
            .await
    }

    async fn dispatch_mutation(&self, name: &str, command: JobCommand, payload: Option<&Value>) -> PanelResult<()> {
        self.run(&command, payload).await?;
        self.log.info(&format!("Completed: {command}"), Some(name));

        // the mutation went through; a failed reload is already reported and keeps the old list
        let _ = self.refresh().await;
        Ok(())
    }

    /// Send a daemon control action; returns the daemon's reported result.
    pub async fn daemon_control(&self, action: DaemonAction) -> PanelResult<bool> {
        let reply: ControlResult = self
            .run_json(&JobCommand::Control(action), None)
            .await
            .map_err(|e| self.report(e, None))?;
        Ok(reply.result)
    }

    /// Confirm an Add/Edit dialog.
    ///
    /// Token lists are comma-joined and `delay` clamped before diffing against the
    /// editor's previous state. Returns the name of the saved job.
    pub async fn save(&self, editor: &JobEditor, values: FieldMap) -> PanelResult<String> {
        let name = match editor.job_name() {
            Some(name) => name.to_string(),
            None => values
                .get(fields::NAME)
                .map(normalize_value)
                .unwrap_or_default()
                .trim()
                .to_string(),
        };

        self.save_checked(editor, &name, values)
            .await
            .map_err(|e| self.report(e, if name.is_empty() { None } else { Some(name.as_str()) }))
    }

    async fn save_checked(&self, editor: &JobEditor, name: &str, values: FieldMap) -> PanelResult<String> {
        if name.is_empty() {
            return Err(PanelError::EmptyName);
        }
        validate_job_name(name)?;
        if editor.is_add() && self.contains(name).await {
            return Err(PanelError::DuplicateName(name.to_string()));
        }
        let source = submitted_path(&values, fields::SOURCE, &editor.data().source);
        if !self.endpoint_valid(&source, &editor.data().source, editor.source_valid()).await {
            return Err(PanelError::PathIneligible {
                field: "Source",
                path: source,
            });
        }
        let destination = submitted_path(&values, fields::DESTINATION, &editor.data().destination);
        if !self
            .endpoint_valid(&destination, &editor.data().destination, editor.destination_valid())
            .await
        {
            return Err(PanelError::PathIneligible {
                field: "Destination",
                path: destination,
            });
        }

        let values = prepare_values(values)?;
        let changes = build_change_set(&values, &editor.previous(), &fields::IDENTITY_FIELDS);
        if changes.is_empty() {
            return Err(PanelError::NoChanges(name.to_string()));
        }

        self.send_changes(name, &changes).await?;
        Ok(name.to_string())
    }

    /// A folder is usable when the path argument is well-formed and the host has it as a directory.
    pub(crate) async fn folder_valid(&self, path: &str) -> bool {
        validate_path_argument(path).is_ok() && self.host.is_directory(path).await
    }

    // The editor already checked its own copy of the path; anything else submitted is checked again.
    async fn endpoint_valid(&self, submitted: &str, edited: &str, edited_valid: bool) -> bool {
        if submitted == edited {
            edited_valid
        } else {
            self.folder_valid(submitted).await
        }
    }

    async fn run(&self, command: &JobCommand, payload: Option<&Value>) -> PanelResult<String> {
        tracing::debug!(%command, "dispatching");
        self.executor.execute(command, payload).await
    }

    async fn run_json<T: DeserializeOwned>(&self, command: &JobCommand, payload: Option<&Value>) -> PanelResult<T> {
        let text = self.run(command, payload).await?;
        serde_json::from_str(text.trim()).map_err(|source| PanelError::InvalidResponse {
            command: command.to_string(),
            source,
        })
    }

    /// Single conversion point from error to user notification.
    fn report(&self, err: PanelError, job: Option<&str>) -> PanelError {
        self.log.log(err.level(), &format!("[{}] {err}", err.code()), job);
        err
    }
}

fn submitted_path(values: &FieldMap, key: &str, fallback: &str) -> String {
    values
        .get(key)
        .map(normalize_value)
        .unwrap_or_else(|| fallback.to_string())
}

/// Bring submitted form values into wire shape: token fields as comma-joined text,
/// `delay` clamped to its range.
fn prepare_values(mut values: FieldMap) -> PanelResult<FieldMap> {
    for key in fields::TOKEN_FIELDS {
        if let Some(value) = values.get_mut(key) {
            let joined = normalize_value(value);
            if key != fields::OPTIONS {
                validate_patterns(&split_tokens(&joined))?;
            }
            *value = Value::String(join_tokens(&split_tokens(&joined)));
        }
    }

    if let Some(delay) = values.get_mut(fields::DELAY) {
        let raw = match delay {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        let raw = raw.ok_or_else(|| PanelError::InvalidInput(format!("delay must be a number, got {delay}")))?;
        *delay = Value::from(clamp_delay(raw));
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{store_with, FakeCli, FakeHost};
    use serde_json::json;

    fn object(value: Value) -> FieldMap {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_prepare_values_joins_and_clamps() {
        let values = prepare_values(object(json!({
            "exclude": [" *.tmp ", "", ".cache"],
            "options": ["--checksum"],
            "delay": 900
        })))
        .unwrap();

        assert_eq!(values.get("exclude"), Some(&json!("*.tmp,.cache")));
        assert_eq!(values.get("options"), Some(&json!("--checksum")));
        assert_eq!(values.get("delay"), Some(&json!(500)));
    }

    #[test]
    fn test_prepare_values_rejects_bad_input() {
        assert!(prepare_values(object(json!({"delay": "soon"}))).is_err());
        assert!(prepare_values(object(json!({"include": ["[abc"]}))).is_err());
        // options are handed to rsync unchecked
        assert!(prepare_values(object(json!({"options": ["[abc"]}))).is_ok());
    }

    #[tokio::test]
    async fn test_refresh_builds_rows() {
        let cli = FakeCli::new();
        cli.insert("sync_a_b", json!({"source": "/shares/a", "destination": "/shares/b"}));
        cli.insert("sync_x_y", json!({"source": "/data/x", "destination": "/data/y", "enabled": false}));
        let store = store_with(cli, FakeHost::new().with_storage(true));

        store.refresh().await.unwrap();

        assert_eq!(store.job_names().await, vec!["sync_a_b", "sync_x_y"]);
        let rows = store.rows().await;
        assert_eq!(rows[0].source, "Xshare:a");
        assert!(!rows[1].safe);
        assert!(!rows[1].enabled);
        assert!(store.storage_installed().await);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_cache() {
        let cli = FakeCli::new();
        cli.insert("sync_a_b", json!({"source": "/a", "destination": "/b"}));
        let store = store_with(cli.clone(), FakeHost::new());
        store.refresh().await.unwrap();

        cli.fail_with("Error parsing xml file");
        let err = store.refresh().await.unwrap_err();

        assert!(err.is_executor_failure());
        assert_eq!(store.job_names().await, vec!["sync_a_b"]);
        let last = store.log().last().unwrap();
        assert!(last.message.contains("Error parsing xml file"));
    }

    #[tokio::test]
    async fn test_invalid_list_output() {
        let cli = FakeCli::new();
        cli.respond_raw("Creating new XML file");
        let store = store_with(cli, FakeHost::new());

        let err = store.refresh().await.unwrap_err();
        assert!(matches!(err, PanelError::InvalidResponse { .. }));
        assert!(store.job_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_set_enabled_sends_only_enabled() {
        let cli = FakeCli::new();
        cli.insert("sync_a_b", json!({"source": "/a", "destination": "/b"}));
        let store = store_with(cli.clone(), FakeHost::new());
        store.refresh().await.unwrap();

        store.set_enabled("sync_a_b", false).await.unwrap();

        let (command, payload) = cli.last_mutation().unwrap();
        assert_eq!(command, JobCommand::Add("sync_a_b".into()));
        assert_eq!(payload, Some(json!({"enabled": false})));
        assert!(!store.rows().await[0].enabled);
    }

    #[tokio::test]
    async fn test_remove_refreshes() {
        let cli = FakeCli::new();
        cli.insert("sync_a_b", json!({"source": "/a", "destination": "/b"}));
        let store = store_with(cli, FakeHost::new());
        store.refresh().await.unwrap();

        store.remove("sync_a_b").await.unwrap();
        assert!(store.job_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_job_reports() {
        let store = store_with(FakeCli::new(), FakeHost::new());
        let err = store.remove("ghost").await.unwrap_err();

        assert!(err.is_executor_failure());
        assert_eq!(store.log().get_logs(Some("ghost")).len(), 1);
    }

    #[tokio::test]
    async fn test_only_mutations_are_notified() {
        let cli = FakeCli::new();
        cli.insert("sync_a_b", json!({"source": "/a", "destination": "/b"}));
        let store = store_with(cli, FakeHost::new());

        store.refresh().await.unwrap();
        store.fetch_detail("sync_a_b").await.unwrap();
        assert!(store.log().get_logs(None).is_empty());

        store.set_enabled("sync_a_b", false).await.unwrap();
        let logs = store.log().get_logs(Some("sync_a_b"));
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].level, crate::logging::LogLevel::Info);
        assert!(logs[0].message.starts_with("Completed: add sync_a_b"));
    }

    #[tokio::test]
    async fn test_daemon_control() {
        let store = store_with(FakeCli::new(), FakeHost::new());
        assert!(store.daemon_control(DaemonAction::IsActive).await.unwrap());
    }
}
