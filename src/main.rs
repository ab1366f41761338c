use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use stepgraph::config::Config;
use stepgraph::demo::{self, onboarding_graph};
use stepgraph::form_data::{aggregate_form_data, FormData, FormPart};
use stepgraph::logging;
use stepgraph::ui::{self, ShellOutcome, WizardShell};
use stepgraph::wizard::{Payload, WizardEngine};

#[derive(Parser)]
#[command(name = "stepgraph")]
#[command(about = "Graph-driven multi-step wizard")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// POST the collected answers as multipart/form-data to this URL
    #[arg(long)]
    submit_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a demo step's view and resolved button layout as JSON
    Buttons {
        /// Step id (e.g. welcome, account, review)
        step: String,

        /// Step state as a JSON object keyed by step id
        #[arg(long)]
        state: Option<String>,
    },

    /// List the steps of the demo wizard
    Steps,

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to this path
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    // No subcommand runs the wizard in the terminal
    let is_tui_mode = cli.command.is_none();

    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Buttons { step, state }) => {
            cmd_buttons(&config, step, state.as_deref())?;
        }
        Some(Commands::Steps) => {
            cmd_steps();
        }
        Some(Commands::Config { save }) => {
            cmd_config(&config, save)?;
        }
        None => {
            run_tui(&config, cli.submit_url.as_deref())?;
            logging_handle.finish();
        }
    }

    Ok(())
}

fn run_tui(config: &Config, submit_url: Option<&str>) -> Result<()> {
    let engine = WizardEngine::new(onboarding_graph(), demo::START);
    let shell = WizardShell::new(engine, config.button_resolver());
    let outcome = ui::run_shell(shell, Duration::from_millis(config.ui.tick_rate_ms))?;

    match outcome {
        ShellOutcome::Completed(ctx) => {
            let form = aggregate_form_data(ctx.state());
            tracing::info!(
                session_id = %ctx.session_id(),
                entries = form.len(),
                "wizard completed"
            );
            print_form(&form);
            if let Some(url) = submit_url {
                submit(url, form)?;
            }
        }
        ShellOutcome::Cancelled => {
            println!("Wizard cancelled");
        }
    }

    Ok(())
}

fn print_form(form: &FormData) {
    if form.is_empty() {
        println!("Nothing collected");
        return;
    }
    println!("Collected answers");
    println!("{}", "─".repeat(40));
    for (key, part) in form.entries() {
        match part {
            FormPart::Text(text) => println!("{key}: {text}"),
            FormPart::File(file) => println!("{key}: {} ({})", file.name, file.path.display()),
        }
    }
}

fn submit(url: &str, form: FormData) -> Result<()> {
    let multipart = form.into_multipart()?;
    let response = reqwest::blocking::Client::new()
        .post(url)
        .multipart(multipart)
        .send()
        .with_context(|| format!("Failed to submit form to {url}"))?
        .error_for_status()
        .context("Form submission rejected")?;

    println!("Submitted to {url} ({})", response.status());
    Ok(())
}

fn cmd_buttons(config: &Config, step: String, state: Option<&str>) -> Result<()> {
    let state: BTreeMap<String, Payload> = match state {
        Some(raw) => serde_json::from_str(raw).context("--state must be a JSON object")?,
        None => BTreeMap::new(),
    };

    let engine = WizardEngine::resume(onboarding_graph(), demo::START, state, vec![step]);
    let Some(frame) = engine.frame(&config.button_resolver()) else {
        anyhow::bail!(
            "Unknown step '{}'. Known steps: {}",
            engine.current_step_id(),
            engine.graph().ids().join(", ")
        );
    };
    let output = serde_json::json!({
        "step": frame.step_id,
        "view": frame.render,
        "isLastStep": frame.is_last_step,
        "buttons": frame.buttons,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_steps() {
    let graph = onboarding_graph();
    for id in graph.ids() {
        let marker = if id == demo::START { "*" } else { " " };
        println!("{marker} {id}");
    }
}

fn cmd_config(config: &Config, save: Option<PathBuf>) -> Result<()> {
    print!("{}", config.to_toml()?);
    if let Some(path) = save {
        config.save_to(&path)?;
        eprintln!("Saved to {}", path.display());
    }
    Ok(())
}
