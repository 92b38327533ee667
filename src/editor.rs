//! Add/Edit session for one job.
//!
//! Tracks the working copy of the job while the user edits it: whether both folders
//! validate (confirm stays disabled until they do), the suggested name for new jobs,
//! and whether the form shows folder pickers or share pickers.

use serde_json::Value;

use crate::error::PanelResult;
use crate::form::{build_form, JobForm};
use crate::jobs::types::fields;
use crate::jobs::{generate_unique_name, FieldMap, JobConfig, JobStore, SafeRefCodec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Add,
    Edit { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Source,
    Destination,
}

#[derive(Debug, Clone)]
pub struct JobEditor {
    mode: EditMode,
    original: JobConfig,
    data: JobConfig,
    codec: SafeRefCodec,
    storage_installed: bool,
    safe: bool,
    shares: Vec<String>,
    suggested_name: Option<String>,
    source_valid: bool,
    destination_valid: bool,
}

impl JobEditor {
    /// New job, pre-filled with defaults. Safe mode starts on when the storage feature is present.
    pub async fn add(store: &JobStore) -> Self {
        let storage_installed = store.storage_installed().await;
        let data = JobConfig::default();
        let names = store.job_names().await;
        let suggested = generate_unique_name(names.iter().map(String::as_str), &data.source, &data.destination);

        let mut editor = Self::new(EditMode::Add, data, store.codec().clone(), storage_installed);
        editor.suggested_name = Some(suggested);
        editor.revalidate(store).await;
        editor.set_safe(store, storage_installed).await;
        editor
    }

    /// Existing job, loaded from the daemon. Safe mode starts on when the stored pair is eligible.
    pub async fn edit(store: &JobStore, name: &str) -> PanelResult<Self> {
        let data = store.fetch_detail(name).await?;
        let storage_installed = store.storage_installed().await;
        let safe = store
            .codec()
            .is_safe_eligible(&data.source, &data.destination, storage_installed);

        let mut editor = Self::new(
            EditMode::Edit { name: name.to_string() },
            data,
            store.codec().clone(),
            storage_installed,
        );
        editor.revalidate(store).await;
        editor.set_safe(store, safe).await;
        Ok(editor)
    }

    fn new(mode: EditMode, data: JobConfig, codec: SafeRefCodec, storage_installed: bool) -> Self {
        Self {
            mode,
            original: data.clone(),
            data,
            codec,
            storage_installed,
            safe: false,
            shares: Vec::new(),
            suggested_name: None,
            source_valid: false,
            destination_valid: false,
        }
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn is_add(&self) -> bool {
        self.mode == EditMode::Add
    }

    /// Name of the job being edited; `None` while adding.
    pub fn job_name(&self) -> Option<&str> {
        match &self.mode {
            EditMode::Add => None,
            EditMode::Edit { name } => Some(name.as_str()),
        }
    }

    pub fn data(&self) -> &JobConfig {
        &self.data
    }

    pub fn codec(&self) -> &SafeRefCodec {
        &self.codec
    }

    pub fn storage_installed(&self) -> bool {
        self.storage_installed
    }

    pub fn is_safe(&self) -> bool {
        self.safe
    }

    pub fn shares(&self) -> &[String] {
        &self.shares
    }

    pub fn suggested_name(&self) -> Option<&str> {
        self.suggested_name.as_deref()
    }

    pub fn source_valid(&self) -> bool {
        self.source_valid
    }

    pub fn destination_valid(&self) -> bool {
        self.destination_valid
    }

    /// Confirm is only offered once both folders exist.
    pub fn confirm_enabled(&self) -> bool {
        self.source_valid && self.destination_valid
    }

    pub async fn set_source(&mut self, store: &JobStore, path: &str) {
        self.set_endpoint(store, Endpoint::Source, path).await;
    }

    pub async fn set_destination(&mut self, store: &JobStore, path: &str) {
        self.set_endpoint(store, Endpoint::Destination, path).await;
    }

    async fn set_endpoint(&mut self, store: &JobStore, endpoint: Endpoint, path: &str) {
        match endpoint {
            Endpoint::Source => self.data.source = path.to_string(),
            Endpoint::Destination => self.data.destination = path.to_string(),
        }

        if self.is_add() {
            let names = store.job_names().await;
            self.suggested_name = Some(generate_unique_name(
                names.iter().map(String::as_str),
                &self.data.source,
                &self.data.destination,
            ));
        }

        let valid = store.folder_valid(path).await;
        match endpoint {
            Endpoint::Source => self.source_valid = valid,
            Endpoint::Destination => self.destination_valid = valid,
        }
    }

    /// Switch between folder pickers and share pickers. Share choices are reloaded on every switch.
    pub async fn set_safe(&mut self, store: &JobStore, safe: bool) {
        self.safe = safe && self.storage_installed;
        self.shares = if self.safe {
            store.host().list_shares().await
        } else {
            Vec::new()
        };
    }

    async fn revalidate(&mut self, store: &JobStore) {
        self.source_valid = store.folder_valid(&self.data.source).await;
        self.destination_valid = store.folder_valid(&self.data.destination).await;
    }

    /// Turn a command-line endpoint into a path. In safe mode a bare share name maps to its
    /// share directory; absolute paths are taken as given in either mode.
    pub fn resolve_endpoint(&self, value: &str) -> String {
        if self.safe && !value.starts_with('/') {
            self.codec.from_safe_name(value)
        } else {
            value.to_string()
        }
    }

    /// Share choices as `(path, label)` pairs.
    pub fn share_choices(&self) -> Vec<(String, String)> {
        self.shares
            .iter()
            .map(|label| (self.codec.from_safe_name(label), label.clone()))
            .collect()
    }

    /// State the change set is computed against: nothing for a new job.
    pub fn previous(&self) -> FieldMap {
        match self.mode {
            EditMode::Add => FieldMap::new(),
            EditMode::Edit { .. } => self.original.to_fields(),
        }
    }

    /// Form values as the dialog would submit them, with token fields as lists.
    pub fn values(&self) -> FieldMap {
        let mut values = self.data.to_fields();
        values.insert(fields::EXCLUDE.to_string(), tokens_value(&self.data.exclude));
        values.insert(fields::INCLUDE.to_string(), tokens_value(&self.data.include));
        values.insert(fields::OPTIONS.to_string(), tokens_value(&self.data.options));

        if self.storage_installed {
            values.insert(fields::SAFESYNC.to_string(), Value::Bool(self.safe));
        }
        if self.is_add() {
            let name = self.suggested_name.clone().unwrap_or_default();
            values.insert(fields::NAME.to_string(), Value::String(name));
        }
        values
    }

    pub fn form(&self) -> JobForm {
        build_form(self)
    }
}

fn tokens_value(tokens: &[String]) -> Value {
    Value::Array(tokens.iter().cloned().map(Value::String).collect())
}
