//! procveil CLI - process-visibility filtering over a hooked successor primitive.

mod bridge;
mod channel;
mod config;
mod proc_table;
mod runtime;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::warn;

use procveil_policy::{HiddenSet, Pid, Registry};

use crate::config::Config;
use crate::proc_table::{ProcScan, ProcTable};
use crate::runtime::FilterRuntime;

#[derive(Parser)]
#[command(name = "procveil")]
#[command(version, about = "Hide processes from enumeration behind a hooked successor primitive")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply control commands from stdin, then print the hidden roster
    Ctl {
        /// YAML config with an initial hide list
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Enumerate /proc through the installed hook, skipping hidden pids
    Scan {
        /// Pid to hide before scanning (repeatable)
        #[arg(long = "hide", value_name = "PID")]
        hide: Vec<Pid>,

        /// Hide each pid's parent as well
        #[arg(long)]
        with_parent: bool,

        /// Cursor to start the enumeration from
        #[arg(long, default_value_t = 1)]
        start: Pid,

        /// YAML config with an initial hide list
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Resolve symbols in the current process via the dynamic loader
    Symbols {
        /// Symbol names to resolve
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Ctl { config } => run_ctl(config),
        Commands::Scan {
            hide,
            with_parent,
            start,
            config,
        } => run_scan(hide, with_parent, start, config),
        Commands::Symbols { names } => run_symbols(names),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load(&path),
        None => Ok(Config::default()),
    }
}

fn run_ctl(config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let hidden = Arc::new(HiddenSet::new());
    let registry = Registry::new(hidden);
    seed_hide_list(&registry, &config.hide);

    let stdin = io::stdin();
    channel::run_session(&registry, &ProcTable, stdin.lock(), io::stdout())
}

fn run_scan(hide: Vec<Pid>, with_parent: bool, start: Pid, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let hidden = Arc::new(HiddenSet::new());
    let registry = Registry::new(hidden.clone());
    seed_hide_list(&registry, &config.hide);

    for &pid in &hide {
        let outcome = if with_parent {
            registry.add_with_parent(pid, &ProcTable)
        } else {
            registry.add(pid)
        };
        if let Err(err) = outcome {
            warn!("{}", err);
        }
    }

    let scan = ProcScan::snapshot().context("cannot snapshot /proc")?;
    let runtime = FilterRuntime::install(
        &config.symbol,
        Arc::new(scan),
        hidden,
        config.retry_budget,
    )?;

    for pid in runtime.visible_from(start) {
        println!("{}", pid);
    }
    Ok(())
}

#[cfg(unix)]
fn run_symbols(names: Vec<String>) -> Result<()> {
    use procveil_hook::{DlSymbolResolver, SymbolResolver};

    let resolver = DlSymbolResolver::new();
    for name in names {
        match resolver.lookup(&name) {
            Some(address) => println!("{} {:#x}", name, address),
            None => println!("{} unresolved", name),
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn run_symbols(_names: Vec<String>) -> Result<()> {
    anyhow::bail!("symbol resolution requires a unix host");
}

fn seed_hide_list(registry: &Registry, pids: &[Pid]) {
    for &pid in pids {
        if let Err(err) = registry.add(pid) {
            warn!("{}", err);
        }
    }
}
