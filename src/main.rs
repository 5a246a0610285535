//! Hostsmith CLI - declarative provisioning for a virtualization host
//!
//! Usage: hostsmith <COMMAND>
//!
//! Commands:
//!   apply   Apply due provisioning steps to the remote host
//!   plan    Preview which steps would run, without touching the network
//!   diff    Preview with content diffs of changed files
//!   check   Validate configuration, assets, and the task graph

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;

use hostsmith::application::{ApplyReport, PlanReport};
use hostsmith::domain::ports::{EventSink, ExportedValue, NoopEventSink};
use hostsmith::infrastructure::{HumanEventSink, JsonEventSink, SshChannel, TomlStateRepository};
use hostsmith::{build_graph, Applier, Config};

/// Hostsmith - declarative provisioning for a single-node virtualization host
#[derive(Parser, Debug)]
#[command(name = "hostsmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "hostsmith.toml")]
    config: PathBuf,

    /// Output NDJSON events and reports for CI
    #[arg(long, default_value = "false")]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply due provisioning steps to the remote host
    Apply {
        /// Show what would be done without running anything
        #[arg(long)]
        dry_run: bool,

        /// Print secret exports in clear instead of redacted
        #[arg(long)]
        show_secrets: bool,
    },

    /// Preview which steps would run, without touching the network
    Plan,

    /// Preview with content diffs of changed files
    Diff,

    /// Validate configuration, assets, and the task graph
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let graph = build_graph(&config)?;
    let channel = SshChannel::new(&config.connection);
    let state_repo = TomlStateRepository::new();
    let state_path = Config::state_path(&cli.config);

    match cli.command {
        Commands::Apply {
            dry_run,
            show_secrets,
        } => {
            let sink: Box<dyn EventSink> = if cli.json {
                Box::new(JsonEventSink::stdout())
            } else {
                Box::new(HumanEventSink::new(cli.verbose > 0))
            };
            let applier = Applier::new(&channel, &state_repo, &state_path, sink.as_ref());

            if dry_run {
                let plan = applier.plan(&graph)?;
                print_plan(&plan, cli.json);
                return Ok(());
            }

            let report = applier.apply(&graph)?;
            print_exports(&report, show_secrets, cli.json);
        }

        Commands::Plan => {
            let applier = Applier::new(&channel, &state_repo, &state_path, &NoopEventSink);
            let plan = applier.plan(&graph)?;
            print_plan(&plan, cli.json);
        }

        Commands::Diff => {
            let applier = Applier::new(&channel, &state_repo, &state_path, &NoopEventSink);
            let plan = applier.diff(&graph)?;
            print_plan(&plan, cli.json);
        }

        Commands::Check => {
            let applier = Applier::new(&channel, &state_repo, &state_path, &NoopEventSink);
            applier.plan(&graph)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "event": "check",
                        "ok": true,
                        "steps": graph.len(),
                        "components": config.enabled_components(),
                    })
                );
            } else {
                println!(
                    "Configuration OK: {} steps across components: {}",
                    graph.len(),
                    config.enabled_components().join(", ")
                );
            }
        }
    }

    Ok(())
}

fn print_plan(plan: &PlanReport, json: bool) {
    if json {
        let steps: Vec<_> = plan
            .steps
            .iter()
            .map(|s| {
                serde_json::json!({
                    "step": s.name,
                    "kind": s.kind,
                    "due": s.due,
                    "detail": s.detail,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({ "event": "plan", "due": plan.due_count(), "steps": steps })
        );
        return;
    }

    let color = std::io::stdout().is_terminal();
    for step in &plan.steps {
        if !step.due {
            continue;
        }
        println!("~ {} ({})", step.name, step.kind);
        for line in &step.detail {
            println!("    {}", colorize(line, color));
        }
    }
    if plan.is_up_to_date() {
        println!("Everything up to date.");
    } else {
        println!("{} of {} steps due.", plan.due_count(), plan.steps.len());
    }
}

/// Color added/removed diff lines when writing to a terminal
fn colorize(line: &str, enabled: bool) -> String {
    if !enabled {
        return line.to_string();
    }
    if line.starts_with('+') {
        format!("\x1b[32m{}\x1b[0m", line)
    } else if line.starts_with('-') {
        format!("\x1b[31m{}\x1b[0m", line)
    } else {
        line.to_string()
    }
}

fn print_exports(report: &ApplyReport, show_secrets: bool, json: bool) {
    if report.exports.is_empty() {
        return;
    }

    if json {
        let exports: serde_json::Map<String, serde_json::Value> = report
            .exports
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    ExportedValue::Plain(v) => v.clone(),
                    ExportedValue::Secret(s) if show_secrets => s.expose().to_string(),
                    ExportedValue::Secret(s) => s.to_string(),
                };
                (key.clone(), serde_json::Value::String(rendered))
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({ "event": "exports", "values": exports })
        );
        return;
    }

    println!("Exports:");
    for (key, value) in &report.exports {
        match value {
            ExportedValue::Plain(v) => println!("  {} = {}", key, v),
            ExportedValue::Secret(s) if show_secrets => println!("  {} = {}", key, s.expose()),
            ExportedValue::Secret(s) => println!("  {} = {}", key, s),
        }
    }
}
