//! Inspects the advertised integration catalogue and runs the startup
//! consistency check against the shipped factories.

use std::fmt::Write as _;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dojo::config::Endpoints;
use dojo::menu::Menu;
use dojo::registry::{ConsistencyReport, IntegrationRegistry, RegistryError};
use dojo::telemetry::{self, TelemetryConfig};
use dojo::MenuIntegration;
use tracing::{Level, info};

#[derive(Parser)]
#[command(name = "dojo-check")]
#[command(about = "Inspect the dojo integration menu and verify its factories")]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every advertised integration
    List {
        /// Print the catalogue as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one integration and its features
    Show {
        /// Integration identifier, e.g. `langgraph`
        id: String,
    },
    /// Check that every advertised integration has a factory
    Check {
        /// Also build every integration and verify the features it delivers
        #[arg(long)]
        build: bool,
        /// Print the verification report as JSON (implies --build)
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    telemetry::init(&TelemetryConfig::default().with_default_level(level))?;

    match cli.command {
        Commands::List { json } => {
            print!("{}", render_list(Menu::catalogue(), json)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Show { id } => {
            let Some(integration) = Menu::catalogue().get_integration(&id) else {
                bail!("unknown integration `{id}`");
            };
            print!("{}", render_integration(integration));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { build, json } => check(build || json, json).await,
    }
}

async fn check(build: bool, json: bool) -> Result<ExitCode> {
    let endpoints = Endpoints::from_env();
    let registry = match IntegrationRegistry::with_defaults(&endpoints) {
        Ok(registry) => registry,
        Err(RegistryError::Inconsistent(err)) => {
            for violation in err.violations() {
                eprintln!("error: {violation}");
            }
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err).context("failed to assemble the default registry"),
    };
    info!(?registry, "coverage check passed");

    if !build {
        println!(
            "ok: {} advertised integrations, {} factories",
            registry.menu().len(),
            registry.factories().len()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let report = registry.verify_all().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    Ok(if report.is_consistent() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn render_list(menu: Menu<'_>, json: bool) -> Result<String> {
    if json {
        let integrations: Vec<_> = menu.iter().collect();
        return Ok(serde_json::to_string_pretty(&integrations)? + "\n");
    }

    let width = menu.iter().map(|i| i.id().len()).max().unwrap_or_default();
    let mut out = String::new();
    for integration in menu {
        let features: Vec<_> = integration.features().iter().map(|f| f.as_str()).collect();
        writeln!(
            out,
            "{:width$}  {}",
            integration.id(),
            features.join(", ")
        )?;
    }
    Ok(out)
}

fn render_integration(integration: &MenuIntegration) -> String {
    let mut out = format!("{} ({})\n", integration.name(), integration.id());
    for feature in integration.features() {
        out.push_str("  - ");
        out.push_str(feature.as_str());
        out.push('\n');
    }
    out
}

fn render_report(report: &ConsistencyReport) -> String {
    let mut out = format!("checked {} integrations\n", report.checked().len());
    for entry in report.undeclared() {
        out.push_str(&format!(
            "note: {} also provides {}\n",
            entry.integration,
            entry.features.join(", ")
        ));
    }
    for violation in report.violations() {
        out.push_str(&format!("error: {violation}\n"));
    }
    if report.is_consistent() {
        out.push_str("ok\n");
    }
    out
}
