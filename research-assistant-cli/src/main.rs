//! CLI entry point for research-assistant

mod repl;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, Input, Select};
use research_assistant_agent::{ContextBuilder, ModelSettings, ResearchAssistant};
use research_assistant_core::config::{validate_config, Config, ConfigLoader, LoggingConfig};
use research_assistant_core::logging::init_logging;
use research_assistant_core::report::ReportWriter;
use research_assistant_core::session::SessionManager;
use research_assistant_core::utils::expand_tilde;
use research_assistant_providers::build_provider;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::Notify;
use tracing::{error, info};

use crate::repl::{LoopExit, Repl};

#[derive(Parser)]
#[command(name = "research-assistant")]
#[command(about = "A conversational research assistant backed by a local or hosted LLM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,

    /// Model to use instead of the configured one
    #[arg(short, long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive research session (default)
    Chat {
        /// Report file to append answers to
        #[arg(short, long)]
        report: Option<PathBuf>,
        /// Session file to resume from and save to
        #[arg(short, long)]
        session: Option<PathBuf>,
    },
    /// Ask a single question in a fresh conversation
    Ask {
        /// Question to ask
        #[arg(long)]
        message: String,
        /// Report file to append the answer to
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
    /// Create or replace the configuration file
    Onboard,
    /// Show configuration and saved sessions
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    let command = cli.command.unwrap_or(Commands::Chat {
        report: None,
        session: None,
    });

    match command {
        Commands::Onboard => {
            // Runs before loading so a broken config file can be replaced
            run_onboard(&config_loader)?;
        }
        Commands::Chat { report, session } => {
            let config = load_config(&config_loader, cli.model)?;
            let _log_guard = init_logging(&resolve_logging(&config_loader, &config.logging));
            info!("Starting interactive session");
            run_chat(&config, report, session).await?;
        }
        Commands::Ask { message, report } => {
            let config = load_config(&config_loader, cli.model)?;
            let _log_guard = init_logging(&resolve_logging(&config_loader, &config.logging));
            info!("Processing one-shot question");
            run_ask(&config, &message, report).await?;
        }
        Commands::Status => {
            let config = load_config(&config_loader, cli.model)?;
            run_status(&config_loader, &config);
        }
    }

    Ok(())
}

fn load_config(loader: &ConfigLoader, model: Option<String>) -> Result<Config> {
    let mut config = loader.load()?;
    if let Some(model) = model {
        config.model.model = model;
        validate_config(&config)?;
    }
    Ok(config)
}

/// Relative log directories live under the configuration directory
fn resolve_logging(loader: &ConfigLoader, logging: &LoggingConfig) -> LoggingConfig {
    let mut resolved = logging.clone();
    let dir = expand_tilde(&logging.dir);
    let dir = if dir.is_relative() {
        loader.config_dir().join(dir)
    } else {
        dir
    };
    resolved.dir = dir.to_string_lossy().into_owned();
    resolved
}

/// Use the flag if given, otherwise ask on a terminal, otherwise the default
fn resolve_path(flag: Option<PathBuf>, prompt: &str, default: &str) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if std::io::stdin().is_terminal() {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .interact_text()?;
        return Ok(expand_tilde(answer.trim()));
    }
    Ok(expand_tilde(default))
}

async fn run_chat(
    config: &Config,
    report: Option<PathBuf>,
    session: Option<PathBuf>,
) -> Result<()> {
    let report_path = resolve_path(
        report,
        "Enter filename for the research report",
        &config.assistant.report_path,
    )?;
    let session_path = resolve_path(
        session,
        "Enter filename for the session",
        &config.assistant.session_path,
    )?;

    let provider = build_provider(&config.model)?;
    let mut assistant =
        ResearchAssistant::from_config(config, provider, &report_path, &session_path);

    println!("{}", style("Research Assistant").bold().cyan());
    println!(
        "Model: {} ({})",
        style(&assistant.settings().model).green(),
        config.model.provider
    );
    println!("Report: {}", report_path.display());
    if assistant.conversation().len() > 1 {
        println!(
            "Resumed session {} with {} messages",
            session_path.display(),
            assistant.conversation().len()
        );
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let interactive = std::io::stderr().is_terminal();
    let interrupt = Arc::new(Notify::new());
    let signal = interrupt.clone();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            signal.notify_one();
        }
    });
    let mut repl = Repl::new(stdin, std::io::stdout())
        .with_spinner(interactive)
        .with_interrupt(interrupt);

    match repl.run(&mut assistant).await {
        Ok(exit) => {
            info!(reason = ?exit, messages = assistant.conversation().len(), "Session ended");
            if exit == LoopExit::Interrupted {
                println!("{}", style("Interrupted. Goodbye!").yellow());
            }
            Ok(())
        }
        Err(e) => {
            error!("Interactive loop failed: {}", e);
            Err(e)
        }
    }
}

async fn run_ask(config: &Config, message: &str, report: Option<PathBuf>) -> Result<()> {
    let report_path = report.unwrap_or_else(|| expand_tilde(&config.assistant.report_path));
    let session_path = expand_tilde(&config.assistant.session_path);

    let provider = build_provider(&config.model)?;
    let context = ContextBuilder::from_config(&config.assistant);
    let conversation = context.fresh_conversation();
    let mut assistant = ResearchAssistant::new(
        provider,
        ModelSettings::from_config(config),
        context,
        conversation,
        ReportWriter::new(&report_path),
        SessionManager::new(&session_path),
    );

    match assistant.ask(message).await {
        Ok(reply) => {
            println!("{}", reply.content);
            if let Some(e) = reply.report_error {
                eprintln!(
                    "{}",
                    style(format!("Could not update the report: {}", e)).yellow()
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", style(e.user_message()).red());
            if let Some(kind) = e.model_error_kind() {
                eprintln!("({})", kind.describe());
            }
            Err(e.into())
        }
    }
}

fn run_onboard(loader: &ConfigLoader) -> Result<()> {
    println!("{}", style("Welcome to Research Assistant!").bold().cyan());
    println!("Let's set up your configuration.\n");

    let config_path = loader.config_path();
    if config_path.exists() {
        let overwrite = Confirm::new()
            .with_prompt("Configuration already exists. Overwrite?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Onboard cancelled.");
            return Ok(());
        }
    }

    let providers = ["ollama", "openai"];
    let provider_idx = Select::new()
        .with_prompt("Select your LLM provider")
        .items(&providers)
        .default(0)
        .interact()?;
    let provider_name = providers[provider_idx];

    let (default_model, default_base) = match provider_name {
        "openai" => ("gpt-4o-mini", "https://api.openai.com/v1"),
        _ => ("llama3.1", "http://localhost:11434"),
    };

    let model: String = Input::new()
        .with_prompt("Enter the model to use")
        .default(default_model.to_string())
        .interact_text()?;

    let api_base: String = Input::new()
        .with_prompt("Enter the API base URL")
        .default(default_base.to_string())
        .interact_text()?;

    let api_key = if provider_name == "openai" {
        let key: String = Input::new()
            .with_prompt("Enter your OpenAI API key (empty to use OPENAI_API_KEY)")
            .allow_empty(true)
            .interact_text()?;
        Some(key).filter(|k| !k.trim().is_empty())
    } else {
        None
    };

    let mut config = Config::default();
    let report_path: String = Input::new()
        .with_prompt("Default report file")
        .default(config.assistant.report_path.clone())
        .interact_text()?;
    let session_path: String = Input::new()
        .with_prompt("Default session file")
        .default(config.assistant.session_path.clone())
        .interact_text()?;

    config.model.provider = provider_name.to_string();
    config.model.model = model;
    config.model.api_base = Some(api_base).filter(|b| b != default_base);
    config.model.api_key = api_key;
    config.assistant.report_path = report_path;
    config.assistant.session_path = session_path;

    loader.save(&config)?;

    println!(
        "\n{}",
        style("Configuration saved successfully!").green().bold()
    );
    println!("Config location: {}", config_path.display());
    println!("\nYou can now run:");
    println!(
        "  {} - Start a research session",
        style("research-assistant chat").cyan()
    );
    println!(
        "  {} - Ask a single question",
        style("research-assistant ask --message 'Hello!'").cyan()
    );

    Ok(())
}

fn run_status(loader: &ConfigLoader, config: &Config) {
    println!("{}", style("Research Assistant Status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    println!("  Config directory: {}", loader.config_dir().display());
    let file_status = if loader.config_path().exists() {
        style("present").green()
    } else {
        style("missing, using defaults").yellow()
    };
    println!("  Config file: {}", file_status);
    println!("  Provider: {}", config.model.provider);
    println!("  Model: {}", config.model.model);
    println!(
        "  API base: {}",
        config.model.api_base.as_deref().unwrap_or("(provider default)")
    );
    if config.model.provider == "openai" {
        let key_status = if config.model.api_key.is_some() {
            style("configured").green()
        } else {
            style("not configured").red()
        };
        println!("  API key: {}", key_status);
    }
    println!("  Report file: {}", config.assistant.report_path);
    println!("  Session file: {}", config.assistant.session_path);
    println!();

    println!("{}", style("Sessions:").bold());
    let manager = SessionManager::new(expand_tilde(&config.assistant.session_path));
    let sessions = manager.list_sessions();
    if sessions.is_empty() {
        println!("  {}", style("none").dim());
    }
    for session in sessions {
        println!(
            "  {} ({} messages)",
            session.path.display(),
            session.messages
        );
    }
}
