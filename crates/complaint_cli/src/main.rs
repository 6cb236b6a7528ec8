//! Command-line front end for the complaint API.
//!
//! # Responsibility
//! - Map subcommands onto `ComplaintApi` calls.
//! - Print every response as the JSON envelope on stdout.
//!
//! # Invariants
//! - Exit code is 0 only when the envelope reports `ok=true`.
//! - Flags override `CIVIC_*` environment values, which override defaults.

use clap::{Parser, Subcommand};
use complaint_api::{
    init_logging, ApiConfig, ApiError, ApiResponse, ComplaintApi, CreateComplaintRequest,
    PhotoUpload,
};
use complaint_core::{CoreConfig, StatusTransitionPolicy};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "complaints")]
#[command(about = "File and track civic complaints", version)]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "CIVIC_DB_PATH")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "CIVIC_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "CIVIC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Status transition policy: unrestricted|guarded
    #[arg(long, env = "CIVIC_STATUS_POLICY", value_parser = parse_policy)]
    policy: Option<StatusTransitionPolicy>,

    /// Owner used when a complaint names none
    #[arg(long, env = "CIVIC_DEFAULT_OWNER_EMAIL")]
    default_owner: Option<String>,

    /// Directory receiving uploaded photos
    #[arg(long, env = "CIVIC_PHOTO_DIR")]
    photo_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// File a new complaint
    Create {
        title: String,
        description: String,
        category: String,
        location: String,
        /// LOW|MEDIUM|HIGH, defaults to MEDIUM
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        owner_email: Option<String>,
        /// Image file attached to the complaint
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Show one complaint
    Get { id: String },
    /// List complaints, optionally filtered
    List {
        #[arg(long, conflicts_with = "category")]
        status: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// List complaints of one owner, or of the default owner
    Mine {
        #[arg(long)]
        owner_email: Option<String>,
    },
    /// Move a complaint to a new status
    Status { id: String, status: String },
    /// Add one upvote
    Upvote { id: String },
    /// Count complaints per status
    Summary,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = effective_config(&cli);

    if let Some(dir) = config.log_dir.as_deref() {
        let message = init_logging(&config.log_level, &dir.to_string_lossy());
        if !message.is_empty() {
            eprintln!("logging disabled: {message}");
        }
    }

    let api = ComplaintApi::new(ApiConfig::from(&config));
    match cli.command {
        Command::Create {
            title,
            description,
            category,
            location,
            priority,
            owner_email,
            photo,
        } => {
            let photo = match photo.as_deref().map(read_photo).transpose() {
                Ok(photo) => photo,
                Err(error) => return print(&ApiResponse::<()>::failure(error)),
            };
            print(&api.create(CreateComplaintRequest {
                title,
                description,
                category,
                location,
                priority,
                owner_email,
                photo,
            }))
        }
        Command::Get { id } => print(&api.get(&id)),
        Command::List { status, category } => match (status, category) {
            (Some(status), _) => print(&api.list_by_status(&status)),
            (None, Some(category)) => print(&api.list_by_category(&category)),
            (None, None) => print(&api.list_all()),
        },
        Command::Mine { owner_email } => print(&api.list_mine(owner_email.as_deref())),
        Command::Status { id, status } => print(&api.update_status(&id, &status)),
        Command::Upvote { id } => print(&api.upvote(&id)),
        Command::Summary => print(&api.status_summary()),
    }
}

fn effective_config(cli: &Cli) -> CoreConfig {
    // Clap already resolved the `CIVIC_*` variables.
    let mut config = CoreConfig::default();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(policy) = cli.policy {
        config.status_policy = policy;
    }
    if let Some(owner) = &cli.default_owner {
        config.default_owner_email = owner.clone();
    }
    if let Some(dir) = &cli.photo_dir {
        config.photo_dir = dir.clone();
    }
    config
}

fn parse_policy(value: &str) -> Result<StatusTransitionPolicy, String> {
    StatusTransitionPolicy::parse(value)
        .ok_or_else(|| format!("unknown status policy `{value}`, expected unrestricted|guarded"))
}

fn read_photo(path: &Path) -> Result<PhotoUpload, ApiError> {
    let bytes = std::fs::read(path)
        .map_err(|err| ApiError::validation(format!("cannot read photo {}: {err}", path.display())))?;
    Ok(PhotoUpload {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        bytes,
    })
}

fn print<T: Serialize>(response: &ApiResponse<T>) -> ExitCode {
    match serde_json::to_string_pretty(response) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to encode response: {err}");
            return ExitCode::FAILURE;
        }
    }
    if response.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
