//! Field descriptors for the job dialog.
//!
//! The panel only describes the form; rendering it is up to the presentation layer.

use serde::Serialize;
use serde_json::Value;

use crate::editor::{EditMode, JobEditor};
use crate::jobs::types::{fields, DELAY_MAX, DELAY_MIN};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Boolean,
    Number { min: u32, max: u32, step: u32 },
    /// Directory picker over the whole filesystem.
    Folder,
    /// Single choice among shares; `options` are paths, `labels` the share names.
    Share { options: Vec<String>, labels: Vec<String> },
    /// Free list of tokens.
    Multi,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub param: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub value: Value,
    pub readonly: bool,
    pub help: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobForm {
    pub title: String,
    pub fields: Vec<FieldDescriptor>,
    pub confirm_enabled: bool,
}

impl JobForm {
    pub fn field(&self, param: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.param == param)
    }
}

fn field(param: &'static str, label: &'static str, kind: FieldKind, value: Value, help: &'static str) -> FieldDescriptor {
    FieldDescriptor {
        param,
        label,
        kind,
        value,
        readonly: false,
        help,
    }
}

pub fn build_form(editor: &JobEditor) -> JobForm {
    let values = editor.values();
    let value = |param: &str| values.get(param).cloned().unwrap_or(Value::Null);

    let mut out = Vec::with_capacity(16);

    if let EditMode::Add = editor.mode() {
        out.push(field(
            fields::NAME,
            "Job name",
            FieldKind::Text,
            value(fields::NAME),
            "Enter a unique name for the job",
        ));
    }

    out.push(FieldDescriptor {
        readonly: true,
        ..field(
            fields::ENABLED,
            "Enabled",
            FieldKind::Boolean,
            value(fields::ENABLED),
            "Whether this sync job is currently enabled",
        )
    });

    if editor.storage_installed() {
        out.push(field(
            fields::SAFESYNC,
            "Safe reference",
            FieldKind::Boolean,
            Value::Bool(editor.is_safe()),
            "Use a share by name instead of an arbitrary folder",
        ));
    }

    if editor.is_safe() {
        let (options, labels): (Vec<String>, Vec<String>) = editor.share_choices().into_iter().unzip();
        let share = FieldKind::Share { options, labels };
        out.push(field(
            fields::SOURCE,
            "Source share",
            share.clone(),
            value(fields::SOURCE),
            "Share to sync from",
        ));
        out.push(field(
            fields::DESTINATION,
            "Destination share",
            share,
            value(fields::DESTINATION),
            "Share to sync to",
        ));
    } else {
        out.push(field(
            fields::SOURCE,
            "Source",
            FieldKind::Folder,
            value(fields::SOURCE),
            "Folder to sync from",
        ));
        out.push(field(
            fields::DESTINATION,
            "Destination",
            FieldKind::Folder,
            value(fields::DESTINATION),
            "Folder to sync to",
        ));
    }

    out.push(field(
        fields::DELAY,
        "Delay",
        FieldKind::Number { min: DELAY_MIN, max: DELAY_MAX, step: 1 },
        value(fields::DELAY),
        "Seconds between a write to the source and the start of the sync, so data still being written is not synced (default 10)",
    ));
    out.push(field(
        fields::RESETTIMER,
        "Reset timer",
        FieldKind::Boolean,
        value(fields::RESETTIMER),
        "Restart the delay when more data is written during it (default on)",
    ));
    out.push(field(
        fields::INITSYNC,
        "Init sync",
        FieldKind::Boolean,
        value(fields::INITSYNC),
        "Sync when the daemon starts (default off)",
    ));
    out.push(field(
        fields::REVERSESYNC,
        "Reverse sync",
        FieldKind::Boolean,
        value(fields::REVERSESYNC),
        "Also sync back to the source when the destination changes (default off)",
    ));
    out.push(field(
        fields::RETRY,
        "Retry",
        FieldKind::Boolean,
        value(fields::RETRY),
        "Keep retrying silently every 10 seconds when source or destination is not mounted yet (default off)",
    ));
    out.push(field(
        fields::DELETE,
        "Delete",
        FieldKind::Boolean,
        value(fields::DELETE),
        "Delete files on the destination that are gone from the source, see rsync --delete (default on)",
    ));
    out.push(field(
        fields::EXCLUDE,
        "Exclude",
        FieldKind::Multi,
        value(fields::EXCLUDE),
        "Patterns excluded from syncing, see rsync --exclude (default empty)",
    ));
    out.push(field(
        fields::INCLUDE,
        "Include",
        FieldKind::Multi,
        value(fields::INCLUDE),
        "Patterns included in syncing, see rsync --include (default empty)",
    ));
    out.push(field(
        fields::COMPRESS,
        "Compress",
        FieldKind::Boolean,
        value(fields::COMPRESS),
        "Compress data during transfer, see rsync --compress (default on)",
    ));
    out.push(field(
        fields::UPDATE,
        "Update",
        FieldKind::Boolean,
        value(fields::UPDATE),
        "Skip files that are newer on the destination, see rsync --update (default on)",
    ));
    out.push(field(
        fields::OPTIONS,
        "Options",
        FieldKind::Multi,
        value(fields::OPTIONS),
        "Extra rsync options, passed through unchecked (default empty)",
    ));

    let title = match editor.mode() {
        EditMode::Add => "Add sync job".to_string(),
        EditMode::Edit { name } => format!("Edit sync job: {name}"),
    };

    JobForm {
        title,
        fields: out,
        confirm_enabled: editor.confirm_enabled(),
    }
}
