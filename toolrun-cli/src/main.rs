// ABOUTME: Entry point for the toolrun CLI - loads configuration, builds the
// ABOUTME: catalog and executor, and dispatches subcommands.

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ToolsCommands};
use toolrun::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            query,
            tools,
            inputs,
            agent,
            json,
        } => {
            let catalog = build_catalog(&config).await?;
            let executor = Executor::from_config(&config, catalog)?;

            let mut task = TaskRequest::new(query).tools(tools);
            for input in &inputs {
                let (key, value) = parse_input(input)?;
                task = task.input(key, value);
            }
            if let Some(agent) = agent {
                task = task.agent_name(agent);
            }

            let report = executor.execute(&task).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }

            if let Some(error) = &report.error {
                bail!("Run failed: {}", error);
            }
        }
        Commands::Tools { command } => {
            let catalog = build_catalog(&config).await?;
            match command {
                ToolsCommands::List { category } => {
                    let tools = match category {
                        Some(category) => catalog.list_by_category(&category).await,
                        None => catalog.list_all().await,
                    };
                    if tools.is_empty() {
                        println!("No tools registered.");
                    }
                    for tool in tools {
                        println!("{:<32} {:<12} {}", tool.name, tool.category, tool.description);
                    }
                }
                ToolsCommands::Show { name } => match catalog.lookup(&name).await {
                    Some(tool) => println!("{}", serde_json::to_string_pretty(&tool)?),
                    None => bail!("Tool '{}' is not in the catalog", name),
                },
                ToolsCommands::Remove { name } => {
                    if config.catalog.store_path.is_none() {
                        bail!("No catalog.store_path configured; nothing to remove from");
                    }
                    if !catalog.remove(&name).await {
                        bail!("Tool '{}' is not in the catalog", name);
                    }
                    catalog.persist_now().await?;
                    println!("Removed '{}'.", name);
                    if config.tools.iter().any(|t| t.name == name) {
                        println!("Note: '{}' is also defined in configuration and will return on the next run.", name);
                    }
                }
            }
        }
        Commands::Config => {
            println!("Sources:");
            for source in ConfigLoader::describe_sources(cli.config.as_deref()) {
                println!("  {}", source);
            }
            println!();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Catalog with stored tools loaded first, then the configured ones on top.
async fn build_catalog(config: &ToolrunConfig) -> Result<Catalog> {
    let catalog = match &config.catalog.store_path {
        Some(path) => {
            let catalog = Catalog::with_store(Arc::new(JsonFileStore::new(path)));
            let loaded = catalog
                .load_from_store()
                .await
                .with_context(|| format!("Failed to load catalog from {}", path.display()))?;
            tracing::info!(loaded, "Loaded stored tools");
            catalog
        }
        None => Catalog::new(),
    };
    catalog.register_all(config.tools.iter().cloned()).await?;
    Ok(catalog)
}

/// Parse `key=value`. Values that parse as JSON keep their type.
fn parse_input(input: &str) -> Result<(String, Value)> {
    let Some((key, raw)) = input.split_once('=') else {
        bail!("Input '{}' must be key=value", input);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Input '{}' has an empty key", input);
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn print_report(report: &ExecutionReport) {
    println!("Run {} ({})", report.run_id, report.agent_name);
    println!();
    if !report.aggregated_text.is_empty() {
        println!("{}", report.aggregated_text);
        println!();
    }
    for name in &report.skipped_tools {
        println!("Skipped '{}': not in the catalog", name);
    }
    println!(
        "{} succeeded, {} failed in {} ms",
        report.success_count(),
        report.error_count(),
        report.total_duration_ms
    );
}
