// ABOUTME: Command-line definitions for the toolrun binary - global flags
// ABOUTME: plus the run, tools and config subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "toolrun")]
#[command(about = "Run catalogued remote tools against a natural-language task", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Explicit configuration file, layered over the global and project files
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run tools for a query and print the report
    Run {
        /// Natural-language task description
        query: String,

        /// Tool to run; repeat to run several, in order
        #[arg(short, long = "tool", required = true)]
        tools: Vec<String>,

        /// Explicit input as key=value; disables argument inference
        #[arg(short, long = "input")]
        inputs: Vec<String>,

        /// Agent name recorded in the report
        #[arg(long)]
        agent: Option<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect and edit the tool catalog
    Tools {
        #[command(subcommand)]
        command: ToolsCommands,
    },
    /// Show the resolved configuration and where it came from
    Config,
}

#[derive(Subcommand)]
pub enum ToolsCommands {
    /// List catalogued tools
    List {
        /// Only show tools in this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one tool as JSON
    Show { name: String },
    /// Remove a tool from the persisted catalog
    Remove { name: String },
}
