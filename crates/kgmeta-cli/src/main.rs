//! kgmeta: command-line tool for knowledge-graph metadata drafts.
//!
//! Validates single values, requests field suggestions for a narrative
//! document, manages saved drafts, and submits drafts to the local
//! submission log.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use kgmeta_core::{
    validate_bcp47, validate_calendar_date, validate_email, validate_iri, DocumentReader,
    DraftRepository, FormType, SubmissionMode, FIELD_REGISTRY,
};
use kgmeta_db::{JsonFileDraftStore, JsonlSubmissionLog, PlainTextDocumentReader, StoreConfig};
use kgmeta_editor::{
    request_suggestions, shared, AcceptOutcome, EditorConfig, FormEditorState, SubmissionOutcome,
};
use kgmeta_inference::{InferenceConfig, OpenAISuggestionBackend};

#[derive(Parser)]
#[command(name = "kgmeta")]
#[command(author, version, about = "Knowledge-graph metadata authoring")]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding drafts.json and submissions.jsonl
    #[arg(long, global = true, env = "KGMETA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// TOML file with an [inference] table
    #[arg(long, global = true, env = "KGMETA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one value with a field validator
    Validate {
        kind: ValueKind,
        value: String,
    },

    /// Print the field registry as JSON
    Schema,

    /// Request suggestions for a narrative document and save them in a draft
    Suggest {
        /// Plain-text narrative describing the knowledge graph
        #[arg(short, long)]
        narrative: PathBuf,

        /// Continue an existing draft instead of starting a new one
        #[arg(short, long)]
        draft: Option<Uuid>,

        /// Apply every suggestion to the record before saving
        #[arg(long)]
        apply_all: bool,
    },

    /// Manage saved drafts
    Drafts {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Submit a saved draft
    Submit {
        draft_id: Uuid,

        /// Submit even if validation fails, recording the errors
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    /// List drafts, newest first
    List,
    /// Print one draft as JSON
    Show { draft_id: Uuid },
    /// Delete one draft
    Delete { draft_id: Uuid },
    /// Delete every draft
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueKind {
    Iri,
    Language,
    Email,
    Date,
}

fn init_tracing() {
    // LOG_FORMAT - "json" or "text" (default: "text")
    // RUST_LOG   - standard env filter (default: "kgmeta=info")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kgmeta=info,kgmeta_core=info,kgmeta_db=info,kgmeta_editor=info,kgmeta_inference=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let store_config = match cli.data_dir {
        Some(dir) => StoreConfig::new(dir),
        None => StoreConfig::from_env(),
    };

    match cli.command {
        Commands::Validate { kind, value } => Ok(cmd_validate(kind, &value)),
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(FIELD_REGISTRY)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Suggest {
            narrative,
            draft,
            apply_all,
        } => cmd_suggest(&store_config, cli.config, narrative, draft, apply_all).await,
        Commands::Drafts { action } => cmd_drafts(&store_config, action).await,
        Commands::Submit { draft_id, force } => cmd_submit(&store_config, draft_id, force).await,
    }
}

fn cmd_validate(kind: ValueKind, value: &str) -> ExitCode {
    let error = match kind {
        ValueKind::Iri => validate_iri(value),
        ValueKind::Language => validate_bcp47(value),
        ValueKind::Email => validate_email(value).error,
        ValueKind::Date => validate_calendar_date(value),
    };
    match error {
        None => {
            println!("valid");
            ExitCode::SUCCESS
        }
        Some(message) => {
            println!("invalid: {}", message);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_suggest(
    store_config: &StoreConfig,
    config_path: Option<PathBuf>,
    narrative: PathBuf,
    draft: Option<Uuid>,
    apply_all: bool,
) -> anyhow::Result<ExitCode> {
    let inference = InferenceConfig::load(config_path.as_deref())?;
    inference.validate()?;
    let backend = OpenAISuggestionBackend::new(inference.openai_config())?;

    let text = PlainTextDocumentReader
        .read_text(&narrative)
        .await
        .with_context(|| format!("reading {}", narrative.display()))?;

    let store = JsonFileDraftStore::new(store_config.drafts_path());
    let editor_config = EditorConfig::from_env();
    let now = Utc::now();
    let state = match draft {
        Some(id) => FormEditorState::load_draft(&store, id, editor_config, now).await?,
        None => FormEditorState::open_with_type(editor_config, FormType::Llm, now),
    };
    let editor = shared(state);

    let fields = match request_suggestions(&editor, &backend, &text).await? {
        AcceptOutcome::Accepted { fields } => fields,
        AcceptOutcome::Failed(message) => {
            eprintln!("Suggestion request failed: {}", message);
            return Ok(ExitCode::FAILURE);
        }
        AcceptOutcome::Discarded => {
            warn!("Suggestion response was discarded");
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut state = editor.lock().await;
    for field in &fields {
        let display = state.suggestions().display(field).unwrap_or_default();
        println!("{}:\n{}\n", kgmeta_core::field_label(field), display);
    }
    if apply_all {
        let reports = state.apply_every_suggestion()?;
        let applied: usize = reports.values().map(|r| r.applied).sum();
        info!(applied, fields = reports.len(), "Applied suggestions to draft");
    }

    let now = Utc::now();
    let saved = state.save_draft(&store, now).await?;
    state.close(now);
    println!("Saved draft {} ({})", saved.draft_id, saved.name);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_drafts(store_config: &StoreConfig, action: DraftAction) -> anyhow::Result<ExitCode> {
    let store = JsonFileDraftStore::new(store_config.drafts_path());
    match action {
        DraftAction::List => {
            for draft in store.list().await? {
                println!(
                    "{}  {}  {:<6}  {}",
                    draft.draft_id,
                    draft.date.format("%Y-%m-%d %H:%M"),
                    draft.form_type.as_str(),
                    draft.name
                );
            }
        }
        DraftAction::Show { draft_id } => {
            let draft = store.load(draft_id).await?;
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        DraftAction::Delete { draft_id } => {
            store.delete(draft_id).await?;
            println!("Deleted draft {}", draft_id);
        }
        DraftAction::Clear => {
            store.clear().await?;
            println!("Deleted all drafts");
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_submit(store_config: &StoreConfig, draft_id: Uuid, force: bool) -> anyhow::Result<ExitCode> {
    let store = JsonFileDraftStore::new(store_config.drafts_path());
    let log = JsonlSubmissionLog::new(store_config.submissions_path());
    let now = Utc::now();

    let mut state = FormEditorState::load_draft(&store, draft_id, EditorConfig::from_env(), now).await?;
    let mode = if force {
        SubmissionMode::Forced
    } else {
        SubmissionMode::Normal
    };

    match state.submit_to(&log, mode, now).await? {
        SubmissionOutcome::Blocked(report) => {
            state.close(now);
            eprintln!("{}", report.message);
            Ok(ExitCode::FAILURE)
        }
        SubmissionOutcome::Submitted(payload) => {
            store.delete(draft_id).await?;
            if let Some(errors) = &payload.validation_errors {
                eprintln!("Submitted with recorded problems:\n{}", errors.consolidated_message());
            }
            println!("Submitted {}", payload.metadata.submission_id);
            Ok(ExitCode::SUCCESS)
        }
    }
}
