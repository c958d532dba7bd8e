use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use meshguard::cli::Console;
use meshguard::logging::{init_logging, LogConfig, LogFormat};
use meshguard::{AuditQuery, MeshGuardClient, MeshGuardError, Outcome};

/// Query a MeshGuard gateway from the command line
///
/// Configuration comes from MESHGUARD_GATEWAY_URL, MESHGUARD_AGENT_TOKEN,
/// MESHGUARD_ADMIN_TOKEN, MESHGUARD_TIMEOUT_SECS and MESHGUARD_TRACE_ID.
#[derive(Parser)]
#[command(name = "meshguard", version)]
struct Cli {
    /// Write logs to this directory
    #[arg(long, env = "MESHGUARD_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask whether an action is allowed
    Check {
        action: String,
        #[arg(long)]
        resource: Option<String>,
    },
    /// Like check, but exit with status 1 when denied
    Enforce {
        action: String,
        #[arg(long)]
        resource: Option<String>,
    },
    /// Show gateway health
    Health,
    /// List registered agents (admin)
    Agents,
    /// List policies (admin)
    Policies,
    /// Show audit log entries (admin)
    Audit {
        #[arg(long, default_value_t = meshguard::admin::DEFAULT_AUDIT_LIMIT)]
        limit: u32,
        #[arg(long)]
        decision: Option<DecisionFilter>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DecisionFilter {
    Allow,
    Deny,
}

impl From<DecisionFilter> for Outcome {
    fn from(filter: DecisionFilter) -> Self {
        match filter {
            DecisionFilter::Allow => Outcome::Allow,
            DecisionFilter::Deny => Outcome::Deny,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let console = Console::new();

    if let Some(ref dir) = cli.log_dir {
        let format = if cli.json_logs { LogFormat::Json } else { LogFormat::Text };
        let config = LogConfig::default().with_dir(dir).with_format(format);
        if let Err(e) = init_logging(&config) {
            console.print_error(&e.to_string());
        }
    }

    match run(cli.command, &console).await {
        Ok(code) => code,
        Err(MeshGuardError::PolicyDenied(denied)) => {
            console.print_denial(&denied);
            ExitCode::from(1)
        }
        Err(e) => {
            console.print_error(&e.to_string());
            ExitCode::from(2)
        }
    }
}

async fn run(command: Command, console: &Console) -> Result<ExitCode, MeshGuardError> {
    let client = MeshGuardClient::from_env()?;

    match command {
        Command::Check { action, resource } => {
            let decision = client.check(&action, resource.as_deref()).await?;
            console.print_decision(&decision);
        }
        Command::Enforce { action, resource } => {
            let decision = client.enforce(&action, resource.as_deref()).await?;
            console.print_decision(&decision);
        }
        Command::Health => {
            let health = client.health().await?;
            console.print_json(&health);
            if health.get("status").and_then(|s| s.as_str()) != Some("healthy") {
                return Ok(ExitCode::from(1));
            }
        }
        Command::Agents => {
            let agents = client.list_agents().await?;
            console.print_agents(&agents);
        }
        Command::Policies => {
            for policy in client.list_policies().await? {
                console.print_json(&policy);
            }
        }
        Command::Audit { limit, decision } => {
            let query = AuditQuery {
                limit,
                decision: decision.map(Outcome::from),
            };
            for entry in client.audit_log(query).await? {
                console.print_json(&entry);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
