//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Declared-issue regression test orchestrator
#[derive(Parser, Debug)]
#[command(name = "testset")]
#[command(version = "0.1.0")]
#[command(about = "Run declared issue test cases concurrently")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run all declared issues
    Test(TestArgs),

    /// Scaffold a new issue from a template
    New(NewArgs),

    /// List declared issues
    List(ListArgs),
}

/// Arguments for test command
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Project root containing .testset/ (defaults to the current directory)
    #[arg(short, long)]
    pub root: Option<String>,

    /// Run a single issue by name
    #[arg(short, long)]
    pub issue: Option<String>,

    /// Default timeout in milliseconds for issues that declare none
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Maximum concurrent issues (0 = unbounded)
    #[arg(short, long, default_value = "0")]
    pub concurrent: usize,

    /// Output format (table, json, json-pretty, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Arguments for new command
#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Issue name; must start with the issue number (e.g. 42-nullable-join)
    pub name: String,

    /// Project root containing .testset/ (defaults to the current directory)
    #[arg(short, long)]
    pub root: Option<String>,

    /// Template to scaffold from (required when several templates exist)
    #[arg(short, long)]
    pub template: Option<String>,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Project root containing .testset/ (defaults to the current directory)
    #[arg(short, long)]
    pub root: Option<String>,

    /// Show commands and timeouts
    #[arg(short, long)]
    pub detailed: bool,
}
