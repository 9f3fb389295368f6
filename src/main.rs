// Restroom Access Terminal - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/restroom-access --demo
// ```
//
// Or replay a recorded session against an imported roster:
//
// ```console
// $ ./target/release/restroom-access --roster turma-8b.json --script session.jsonl --verbose
// ```

use anyhow::{Context, Result};
use clap::Parser;
use restroom_access::store::MemoryStore;
use restroom_access::terminal::{run_session, AccessTerminal, LoggingConfig, SessionStats};
use restroom_access::types::config::CliArgs;
use restroom_access::types::TerminalConfig;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        let default_config = TerminalConfig::default();
        match default_config.print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Initialize logging based on CLI flags; the guard must outlive the session
    let _logging_guard = match LoggingConfig::from_flags(
        args.verbose,
        args.debug,
        args.log_dir.as_deref(),
        args.json_logs,
    )
    .init()
    {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting restroom access terminal");

    // Load configuration from CLI arguments and optional config file
    let config = match TerminalConfig::from_cli_args(args.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("Configuration validation failed: {}", e);
        process::exit(1);
    }

    info!("Configuration loaded and validated successfully");

    // Handle dry run mode
    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - no session will be started.");
        print_configuration_summary(&config);
        return;
    }

    print_startup_banner(&config);

    let terminal = match initialize_terminal(&config) {
        Ok(terminal) => terminal,
        Err(e) => {
            error!("Failed to initialize terminal: {:#}", e);
            eprintln!("Failed to initialize terminal: {:#}", e);
            process::exit(1);
        }
    };

    match run(&config, &terminal) {
        Ok(stats) => {
            print_session_summary(&terminal, &stats);
            info!("Restroom access terminal finished");
        }
        Err(e) => {
            error!("Session failed: {:#}", e);
            eprintln!("Session failed: {:#}", e);
            process::exit(1);
        }
    }
}

/// Build the terminal and load its initial students
fn initialize_terminal(config: &TerminalConfig) -> Result<AccessTerminal<MemoryStore>> {
    let terminal = AccessTerminal::new(config.clone(), MemoryStore::new());

    if config.demo_data {
        let students = terminal.load_demo_data().context("Failed to load demo data")?;
        eprintln!("Loaded {} demo students", students.len());
    }

    if let Some(roster) = &config.roster {
        let summary = terminal
            .import_roster_file(roster)
            .with_context(|| format!("Failed to import roster '{}'", roster))?;
        eprintln!("Imported {} of {} students from {}", summary.imported, summary.total, roster);
    }

    Ok(terminal)
}

/// Run the session from the script file, or from stdin when none is configured
fn run(config: &TerminalConfig, terminal: &AccessTerminal<MemoryStore>) -> Result<SessionStats> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    let stats = match &config.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open session script '{}'", path))?;
            run_session(terminal, BufReader::new(file), &mut writer)
        }
        None => {
            eprintln!("Reading commands from standard input (one JSON object per line)");
            run_session(terminal, io::stdin().lock(), &mut writer)
        }
    }
    .context("Failed to read or write session stream")?;

    Ok(stats)
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &TerminalConfig) {
    eprintln!("Restroom Access Terminal");
    eprintln!("========================");
    eprintln!();

    print_configuration_summary(config);
}

/// Print configuration summary
fn print_configuration_summary(config: &TerminalConfig) {
    eprintln!("Configuration:");
    eprintln!("  Scan Code Prefix: {}", config.scan_code_prefix);
    eprintln!(
        "  Passcode Digits: {} - {}",
        config.passcode_min_digits, config.passcode_max_digits
    );
    eprintln!("  Repeat Entry Policy: {}", config.repeat_entry_policy);
    eprintln!("  Demo Data: {}", if config.demo_data { "yes" } else { "no" });
    if let Some(roster) = &config.roster {
        eprintln!("  Roster: {}", roster);
    }
    eprintln!("  Session: {}", config.script.as_deref().unwrap_or("stdin"));
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }
    eprintln!();
}

/// Print the closing counters of a session
fn print_session_summary(terminal: &AccessTerminal<MemoryStore>, stats: &SessionStats) {
    eprintln!();
    eprintln!("Session Summary:");
    eprintln!("  Commands: {}", stats.commands);
    eprintln!("  Failures: {}", stats.failures);

    if let Ok(summary) = terminal.summary() {
        eprintln!("  Visits Recorded: {}", summary.total_visits);
        eprintln!("  Still In Use: {}", summary.open_visits);
        for (zone, open) in &summary.open_by_zone {
            eprintln!("    {}: {}", zone.display_label(), open);
        }
    }
}
