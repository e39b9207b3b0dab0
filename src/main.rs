// Avagama - command line entry point
// Offline commands normalize a saved agent response; the others run the
// discovery and evaluation flows against the configured agent service.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use avagama_backend::models::discovery::{CompanyRequest, DomainRequest};
use avagama_backend::models::evaluation::EvaluationRequest;
use avagama_backend::services::dashboard::DEFAULT_RANGE_DAYS;
use avagama_backend::{AppState, DiscoveryType};
use avagama_normalize::{extract_content, normalize_use_case_names, summarize};

#[derive(Parser)]
#[command(name = "avagama")]
#[command(version, about = "Process automation assessment backend")]
struct Cli {
    /// Owner whose history and tracking sets are used
    #[arg(long, global = true, default_value = "local")]
    owner: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the use-case names found in an agent response
    Items {
        /// JSON file, or `-` for stdin; plain text is treated as completion content
        input: String,
    },

    /// Print the evaluation content of an agent response
    Content { input: String },

    /// Print use-case summaries sorted by rating
    Summaries { input: String },

    #[command(flatten)]
    Online(OnlineCommand),
}

/// Commands that need the configuration, database and agent service
#[derive(Subcommand)]
enum OnlineCommand {
    /// Discover use cases for a business domain
    DiscoverDomain {
        #[arg(long)]
        domain: String,
        #[arg(long, default_value = "")]
        role: String,
        #[arg(long, default_value = "")]
        objective: String,
    },

    /// Discover use cases for a company
    DiscoverCompany { company_name: String },

    /// Show discovery history (domain or company), newest first
    History { discovery_type: DiscoveryType },

    /// Show every use-case name discovered so far (domain or company)
    Tracked { discovery_type: DiscoveryType },

    /// Evaluate a process described by a JSON file
    Evaluate {
        request: PathBuf,
        /// Plain-text SOP document sent along with the request
        #[arg(long)]
        sop: Option<PathBuf>,
        /// Overwrite this stored evaluation, usually a draft
        #[arg(long)]
        id: Option<String>,
        /// Store the request as a draft without calling the agent
        #[arg(long)]
        draft: bool,
    },

    /// List evaluations, newest first
    Evaluations,

    /// Show dashboard statistics
    Dashboard {
        #[arg(short, long, default_value_t = DEFAULT_RANGE_DAYS)]
        days: u32,
    },
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}

/// Parse a saved agent response; text that is not JSON becomes completion content.
fn load_response(input: &str) -> Result<Value> {
    let text = read_input(input)?;
    Ok(serde_json::from_str(&text)
        .unwrap_or_else(|_| json!({"choices": [{"message": {"content": text}}]})))
}

fn load_evaluation_request(path: &Path, sop: Option<&Path>) -> Result<EvaluationRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut request: EvaluationRequest =
        serde_json::from_str(&text).context("Invalid evaluation request")?;

    if let Some(sop) = sop {
        let bytes = std::fs::read(sop)
            .with_context(|| format!("Failed to read SOP document {}", sop.display()))?;
        let sop_text = String::from_utf8_lossy(&bytes).trim().to_string();
        let filename = sop
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        request.attach_sop(&filename, "text/plain", sop_text);
    }
    Ok(request)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Items { input } => print_json(&normalize_use_case_names(&load_response(&input)?)),
        Commands::Content { input } => print_json(&extract_content(&load_response(&input)?)),
        Commands::Summaries { input } => print_json(&summarize(&load_response(&input)?)),
        Commands::Online(command) => run_online(&cli.owner, command).await,
    }
}

async fn run_online(owner: &str, command: OnlineCommand) -> Result<()> {
    let state = AppState::initialize().context("Failed to initialize application state")?;

    match command {
        OnlineCommand::DiscoverDomain {
            domain,
            role,
            objective,
        } => {
            let request = DomainRequest {
                domain,
                user_role: role,
                objective,
            };
            print_json(&state.discovery().discover_domain(owner, &request).await?)
        }
        OnlineCommand::DiscoverCompany { company_name } => {
            let request = CompanyRequest { company_name };
            print_json(&state.discovery().discover_company(owner, &request).await?)
        }
        OnlineCommand::History { discovery_type } => {
            print_json(&state.discovery().history(owner, discovery_type)?)
        }
        OnlineCommand::Tracked { discovery_type } => {
            print_json(&state.discovery().tracked_names(owner, discovery_type)?)
        }
        OnlineCommand::Evaluate {
            request,
            sop,
            id,
            draft,
        } => {
            let request = load_evaluation_request(&request, sop.as_deref())?;
            let evaluations = state.evaluation();
            let record = if draft {
                evaluations.save_draft(owner, request, id.as_deref())?
            } else {
                evaluations.submit(owner, request, id.as_deref()).await?
            };
            print_json(&record)
        }
        OnlineCommand::Evaluations => print_json(&state.evaluation().list_rows(owner)?),
        OnlineCommand::Dashboard { days } => {
            print_json(&state.evaluation().dashboard(owner, days)?)
        }
    }
}
