//! dfaviz - DFA simulator
//!
//! Runs an input string through a deterministic finite automaton while a
//! token travels across the laid-out state graph.

use clap::{Parser, Subcommand};
use colored::Colorize;
use dfaviz_core::{Automaton, CoreError, DefinitionError, Executor, HeadlessTraveler, RunOutcome};
use dfaviz_vis::{ChannelUi, Config, GraphLayout, UiEvent, VisTraveler};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dfaviz")]
#[command(about = "Step through a DFA and watch the token move")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an input string through an automaton
    Run {
        /// Automaton definition (YAML, or JSON with a .json extension)
        definition: PathBuf,

        /// Input string
        input: String,

        /// Skip the animation and only follow the automaton
        #[arg(long)]
        headless: bool,

        /// Print every token position
        #[arg(long)]
        trace: bool,
    },

    /// Validate a definition and summarize it
    Check {
        /// Automaton definition
        definition: PathBuf,
    },

    /// Print the screen position of every node as JSON
    Layout {
        /// Automaton definition
        definition: PathBuf,
    },

    /// Print the effective configuration as YAML
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Commands::Run {
            definition,
            input,
            headless,
            trace,
        } => run(&config, &definition, &input, headless, trace).await,
        Commands::Check { definition } => check(&definition),
        Commands::Layout { definition } => layout(&config, &definition),
        Commands::Config => print_config(&config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::from(2)
        }
    }
}

fn load_automaton(path: &Path) -> Result<Automaton, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let automaton = if path.extension().is_some_and(|ext| ext == "json") {
        let json: serde_json::Value = serde_json::from_str(&text).map_err(DefinitionError::from)?;
        Automaton::from_json(&json)?
    } else {
        Automaton::from_yaml(&text)?
    };
    tracing::info!(
        "Loaded automaton from {} (checksum {})",
        path.display(),
        automaton.checksum
    );
    Ok(automaton)
}

async fn run(
    config: &Config,
    definition: &Path,
    input: &str,
    headless: bool,
    trace: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let automaton = Arc::new(load_automaton(definition)?);

    let result = if headless {
        let traveler = HeadlessTraveler::new(automaton.init_state().clone());
        let mut executor = Executor::new(Arc::clone(&automaton), traveler);
        let result = executor.execute(input).await;

        let path: Vec<&str> = executor
            .traveler()
            .path()
            .iter()
            .map(|s| s.as_str())
            .collect();
        println!("{} {}", "Path:".bold(), path.join(" -> "));
        result
    } else {
        let renderer = Arc::new(GraphLayout::from_automaton(&automaton, &config.layout));
        let (ui, mut rx) = ChannelUi::new();
        let traveler = VisTraveler::new(
            Arc::clone(&automaton),
            renderer,
            ui,
            config.animation.clone(),
        )?;

        // Stop the animation on Ctrl-C
        let stop = traveler.stop_handle();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Received interrupt, stopping run...");
            stop.stop();
        });

        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                print_event(&event, trace);
            }
        });

        let mut executor = Executor::new(Arc::clone(&automaton), traveler);
        let result = executor.execute(input).await;
        drop(executor);
        let _ = printer.await;
        result
    };

    Ok(exit_code(result, headless))
}

fn print_event(event: &UiEvent, trace: bool) {
    match event {
        UiEvent::TokenMoved(pos) => {
            if trace {
                println!("  {}", format!("token at ({:.1}, {:.1})", pos.x, pos.y).dimmed());
            }
        }
        UiEvent::Finished => {
            if let Some(text) = event.status_text() {
                println!("{}", text.green().bold());
            }
        }
        UiEvent::Errored(_) => {
            if let Some(text) = event.status_text() {
                println!("{}", text.red().bold());
            }
        }
        UiEvent::SymbolChanged(_) => {
            if let Some(text) = event.status_text() {
                println!("{}", text.cyan());
            }
        }
    }
}

fn exit_code(result: Result<RunOutcome, CoreError>, headless: bool) -> ExitCode {
    match result {
        Ok(outcome) => {
            if headless {
                let status = match &outcome {
                    RunOutcome::Accepted { .. } => "Accepted".green().bold(),
                    RunOutcome::Rejected { reason, .. } => {
                        format!("Not accepted: {}", reason.message()).red().bold()
                    }
                    RunOutcome::Stopped { .. } => "Stopped".yellow().bold(),
                };
                println!("{}", status);
            }
            if outcome.is_accepted() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            if headless {
                println!("{}", format!("Setup failure: {}", e).red().bold());
            }
            ExitCode::from(2)
        }
    }
}

fn check(definition: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let automaton = load_automaton(definition)?;

    let join = |items: Vec<String>| items.join(", ");
    println!("{}", "Definition OK".green().bold());
    println!("  Init state: {}", automaton.init_state());
    println!(
        "  States:     {}",
        join(automaton.states().iter().map(|s| s.to_string()).collect())
    );
    println!(
        "  Accepting:  {}",
        join(
            automaton
                .accepting_states()
                .iter()
                .map(|s| s.to_string())
                .collect()
        )
    );
    println!(
        "  Alphabet:   {}",
        join(automaton.alphabet().iter().map(|c| c.to_string()).collect())
    );
    println!("  Edges:      {}", automaton.edges().len());
    println!("  Checksum:   {}", automaton.checksum);
    Ok(ExitCode::SUCCESS)
}

fn layout(config: &Config, definition: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let automaton = load_automaton(definition)?;
    let layout = GraphLayout::from_automaton(&automaton, &config.layout);
    let placements = layout.placements(&automaton);
    println!("{}", serde_json::to_string_pretty(&placements)?);
    Ok(ExitCode::SUCCESS)
}

fn print_config(config: &Config) -> Result<ExitCode, Box<dyn std::error::Error>> {
    print!("{}", serde_yaml::to_string(config)?);
    Ok(ExitCode::SUCCESS)
}
