use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value};

use syncwatch_panel_lib::jobs::types::fields;
use syncwatch_panel_lib::jobs::FieldMap;
use syncwatch_panel_lib::logging::read_log_tail;
use syncwatch_panel_lib::{DaemonAction, JobEditor, JobRow, JobStore, PanelConfig, PanelError};

#[derive(Parser)]
#[command(name = "syncwatch-panel")]
#[command(about = "Manage syncwatch folder sync jobs", long_about = None)]
struct Cli {
    /// Panel configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all sync jobs
    List,
    /// Show the full configuration of a job
    Show { name: String },
    /// Add a new sync job
    Add {
        /// Job name (suggested from the folders when omitted)
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        source: String,
        #[arg(short, long)]
        destination: String,
        /// Treat source and destination as share names
        #[arg(long)]
        safe: bool,
        #[command(flatten)]
        opts: JobOptions,
    },
    /// Change options of an existing job
    Edit {
        name: String,
        #[arg(short, long)]
        source: Option<String>,
        #[arg(short, long)]
        destination: Option<String>,
        #[arg(long)]
        safe: bool,
        #[command(flatten)]
        opts: JobOptions,
    },
    /// Enable a job
    Enable { name: String },
    /// Disable a job
    Disable { name: String },
    /// Delete a job
    Delete { name: String },
    /// List shares usable as safe references
    Shares,
    /// Print the job dialog description as JSON
    Form { name: Option<String> },
    /// Control the syncwatch daemon
    Ctl {
        #[arg(value_enum)]
        action: DaemonAction,
    },
    /// Show the tail of the daemon log
    Log {
        #[arg(short = 'n', long, default_value_t = 50)]
        lines: usize,
    },
}

#[derive(Args, Default)]
struct JobOptions {
    /// Seconds to wait after a change before syncing (0-500)
    #[arg(long)]
    delay: Option<i64>,
    #[arg(long)]
    resettimer: Option<bool>,
    #[arg(long)]
    initsync: Option<bool>,
    #[arg(long)]
    reversesync: Option<bool>,
    #[arg(long)]
    retry: Option<bool>,
    #[arg(long)]
    delete: Option<bool>,
    #[arg(long)]
    compress: Option<bool>,
    #[arg(long)]
    update: Option<bool>,
    /// Comma-separated exclude patterns
    #[arg(long)]
    exclude: Option<String>,
    /// Comma-separated include patterns
    #[arg(long)]
    include: Option<String>,
    /// Comma-separated extra rsync options
    #[arg(long, allow_hyphen_values = true)]
    options: Option<String>,
}

impl JobOptions {
    fn apply(&self, values: &mut FieldMap) {
        let mut set = |key: &str, value: Value| {
            values.insert(key.to_string(), value);
        };
        if let Some(delay) = self.delay {
            set(fields::DELAY, json!(delay));
        }
        for (key, flag) in [
            (fields::RESETTIMER, self.resettimer),
            (fields::INITSYNC, self.initsync),
            (fields::REVERSESYNC, self.reversesync),
            (fields::RETRY, self.retry),
            (fields::DELETE, self.delete),
            (fields::COMPRESS, self.compress),
            (fields::UPDATE, self.update),
        ] {
            if let Some(flag) = flag {
                set(key, Value::Bool(flag));
            }
        }
        for (key, tokens) in [
            (fields::EXCLUDE, &self.exclude),
            (fields::INCLUDE, &self.include),
            (fields::OPTIONS, &self.options),
        ] {
            if let Some(tokens) = tokens {
                set(key, Value::String(tokens.clone()));
            }
        }
    }
}

async fn with_spinner<T, F>(message: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    let out = fut.await;
    pb.finish_and_clear();
    out
}

fn print_jobs(rows: &[JobRow]) {
    if rows.is_empty() {
        println!("No sync jobs configured.");
        return;
    }
    println!(
        "{:<28} {:<8} {:<30} {:<30} {:<8} {:<8}",
        "JOB", "ENABLED", "SOURCE", "DESTINATION", "REVERSE", "DELETE"
    );
    println!("{}", "-".repeat(117));
    for row in rows {
        println!(
            "{:<28} {:<8} {:<30} {:<30} {:<8} {:<8}",
            row.job, row.enabled, row.source, row.destination, row.reversesync, row.delete
        );
    }
}

async fn run(cli: Cli) -> Result<(), PanelError> {
    let config = PanelConfig::load(&PanelConfig::resolve_path(cli.config))?;
    let store = JobStore::from_config(&config);

    match cli.command {
        Command::List => {
            with_spinner("Loading jobs...", store.refresh()).await?;
            print_jobs(&store.rows().await);
        }
        Command::Show { name } => {
            let job = with_spinner("Loading job...", store.fetch_detail(&name)).await?;
            println!("{}", serde_json::to_string_pretty(&job).unwrap_or_default());
        }
        Command::Add { name, source, destination, safe, opts } => {
            store.refresh().await?;
            let mut editor = JobEditor::add(&store).await;
            editor.set_safe(&store, safe).await;
            let source = editor.resolve_endpoint(&source);
            editor.set_source(&store, &source).await;
            let destination = editor.resolve_endpoint(&destination);
            editor.set_destination(&store, &destination).await;

            let mut values = editor.values();
            if let Some(name) = name {
                values.insert(fields::NAME.to_string(), Value::String(name));
            }
            opts.apply(&mut values);

            let saved = with_spinner("Adding...", store.save(&editor, values)).await?;
            println!("✅ Added sync job {saved}");
        }
        Command::Edit { name, source, destination, safe, opts } => {
            store.refresh().await?;
            let mut editor = JobEditor::edit(&store, &name).await?;
            editor.set_safe(&store, safe || editor.is_safe()).await;
            if let Some(source) = source {
                let source = editor.resolve_endpoint(&source);
                editor.set_source(&store, &source).await;
            }
            if let Some(destination) = destination {
                let destination = editor.resolve_endpoint(&destination);
                editor.set_destination(&store, &destination).await;
            }

            let mut values = editor.values();
            opts.apply(&mut values);

            let saved = with_spinner("Editing...", store.save(&editor, values)).await?;
            println!("✅ Edited sync job {saved}");
        }
        Command::Enable { name } => {
            with_spinner("Enabling...", store.set_enabled(&name, true)).await?;
            println!("✅ {name} enabled, it will sync automatically");
        }
        Command::Disable { name } => {
            with_spinner("Disabling...", store.set_enabled(&name, false)).await?;
            println!("✅ {name} disabled, it will no longer sync automatically");
        }
        Command::Delete { name } => {
            with_spinner("Deleting...", store.remove(&name)).await?;
            println!("✅ {name} deleted");
        }
        Command::Shares => {
            if !store.host().storage_feature_installed().await {
                println!("Safe references unavailable: {} is not installed", config.storage_feature);
            }
            for share in store.host().list_shares().await {
                println!("{share}\t{}", store.codec().from_safe_name(&share));
            }
        }
        Command::Form { name } => {
            store.refresh().await?;
            let editor = match name {
                Some(name) => JobEditor::edit(&store, &name).await?,
                None => JobEditor::add(&store).await,
            };
            println!("{}", serde_json::to_string_pretty(&editor.form()).unwrap_or_default());
        }
        Command::Ctl { action } => {
            let result = with_spinner("Waiting for daemon...", store.daemon_control(action)).await?;
            println!("{}: {}", action.as_str(), result);
        }
        Command::Log { lines } => {
            let tail = read_log_tail(&config.log_file, lines).await?;
            for line in tail {
                println!("{line}");
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("❌ [{}] {e}", e.code());
        std::process::exit(1);
    }
}
