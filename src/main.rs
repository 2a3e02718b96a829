//! testset - Declared-issue regression test orchestrator
//!
//! A CLI tool that discovers declared "issue" test cases, runs each as an
//! independent external command with a per-issue timeout, captures its
//! output, and reports aggregate pass/fail results.
//!
//! ## Features
//!
//! - Concurrent execution of every declared issue
//! - Per-issue timeouts with a 5000 ms global default (exit code 124)
//! - Faithful replay of each failed issue's stdout/stderr
//! - Clean termination of all child processes on Ctrl-C / SIGTERM
//! - Template-based issue scaffolding
//!
//! ## Usage
//!
//! ```bash
//! # Run every declared issue
//! testset test
//!
//! # Run one issue with a tighter default timeout
//! testset test --issue 42-nullable-join --timeout 2000
//!
//! # Scaffold a new issue from a template
//! testset new 43-panic-on-empty --template node
//!
//! # List declared issues
//! testset list --detailed
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

mod cli;
mod config;
mod executor;
mod models;
mod output;
mod scaffold;
mod utils;

use cli::Args;
use executor::Orchestrator;
use output::{OutputFormat, ReportFormatter};
use utils::LogLevel;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    utils::init_logger(level);

    match args.command {
        cli::Command::Test(test_args) => {
            let exit_code = run_tests(test_args).await?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        cli::Command::New(new_args) => {
            new_issue(new_args)?;
        }
        cli::Command::List(list_args) => {
            list_issues(list_args);
        }
    }

    Ok(())
}

async fn run_tests(args: cli::TestArgs) -> Result<i32> {
    let root = resolve_root(args.root)?;

    let mut discovery = config::discover_issues(&root);
    let had_config_errors = discovery.has_errors();

    if let Some(issue) = &args.issue {
        discovery.specs.retain(|spec| spec.name == *issue);
        if discovery.specs.is_empty() {
            anyhow::bail!("no issue named '{issue}' under {}", root.display());
        }
    }

    // A CLI timeout replaces the global default, not explicit per-issue values.
    if let Some(timeout_ms) = args.timeout {
        for spec in &mut discovery.specs {
            spec.timeout_ms.get_or_insert(timeout_ms);
        }
    }

    let format = OutputFormat::from_str(&args.format).unwrap_or(OutputFormat::Table);
    let formatter = ReportFormatter::new(format);

    let orchestrator = Orchestrator::new()
        .with_max_concurrent(args.concurrent)
        .with_signal_handling(true);

    let report = orchestrator.run(discovery.specs).await;
    formatter.print_report(&report);

    if report.is_all_passed() && !had_config_errors {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn new_issue(args: cli::NewArgs) -> Result<()> {
    let root = resolve_root(args.root)?;
    let created = scaffold::create_issue(&root, &args.name, args.template.as_deref())?;
    println!("✓ Issue created: {}", created.display());
    Ok(())
}

fn list_issues(args: cli::ListArgs) {
    let root = match resolve_root(args.root) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("✗ {e}");
            std::process::exit(1);
        }
    };

    let discovery = config::discover_issues(&root);

    if discovery.specs.is_empty() && !discovery.has_errors() {
        println!("No issues declared under {}", root.display());
        println!("Create one with: testset new <number>-<name>");
        return;
    }

    info!("{} issue(s) declared", discovery.specs.len());

    println!("\nDeclared Issues ({} total)\n", discovery.specs.len());
    println!("──────────────────────────────────────────────────────────────────────");

    for spec in &discovery.specs {
        if args.detailed {
            let timeout = spec
                .timeout_ms
                .map(|ms| format!("{ms}ms"))
                .unwrap_or_else(|| "default".to_string());
            println!("  {:30} {:10} {}", spec.name, timeout, spec.command);
        } else {
            println!("  {}", spec.name);
        }
    }

    println!("──────────────────────────────────────────────────────────────────────\n");

    if discovery.has_errors() {
        println!("⚠ {} issue config(s) could not be read", discovery.errors.len());
    }
}

fn resolve_root(root: Option<String>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(PathBuf::from(root)),
        None => Ok(std::env::current_dir()?),
    }
}
