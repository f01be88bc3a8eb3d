//! IMS - Binary Entry Point
//!
//! Parses the command line, loads the config and the event log, runs one
//! operation and maps its result to an exit status.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use ims::config::{default_config_path, open_in_editor};
use ims::import::{read_apt_history, APT_HISTORY_PATH};
use ims::listing::{format_all, format_installed};
use ims::{CommitOutcome, Config, Ims, ImsError, ImsResult, InstallState, TagOutcome};

#[derive(Parser, Debug)]
#[command(name = "ims", version, about = "IMS - Install My Stuff")]
struct Cli {
    /// Config file (defaults to <config dir>/ims/ims_config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the data folder from the config file
    #[arg(long, global = true, value_name = "DIR")]
    data_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Install a package
    #[command(name = "install")]
    Install {
        /// Package specification (manager:package or package)
        package: String,
    },
    /// Install and commit immediately
    #[command(name = "install_commit")]
    InstallCommit {
        /// Package specification
        package: String,
    },
    /// Commit all uncommitted packages
    #[command(name = "commit")]
    Commit,
    /// Remove a package
    #[command(name = "remove")]
    Remove {
        /// Package specification
        package: String,
    },
    /// List installed packages
    #[command(name = "list_installed")]
    ListInstalled {
        /// Tag to list packages for
        tag: Option<String>,
    },
    /// List all entries
    #[command(name = "list_all")]
    ListAll,
    /// Generate install script
    #[command(name = "geninstall")]
    Geninstall {
        /// Tag to generate script for
        tag: Option<String>,
    },
    /// Add a tag
    #[command(name = "add_tag")]
    AddTag {
        /// Tag name
        tag_name: String,
    },
    /// Remove a tag
    #[command(name = "remove_tag")]
    RemoveTag {
        /// Tag name
        tag_name: String,
    },
    /// Open the config file in an editor
    #[command(name = "edit_config")]
    EditConfig,
    /// Record packages from apt's history.log as committed installs/removes
    #[command(name = "import_apt_history")]
    ImportAptHistory {
        /// Path to history.log
        #[arg(default_value = APT_HISTORY_PATH)]
        path: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    if let Err(e) = ctrlc::set_handler(|| {
        eprintln!("\nOperation cancelled");
        std::process::exit(1);
    }) {
        warn!(error = %e, "Could not install Ctrl+C handler");
    }

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    let config_path = cli.config.unwrap_or_else(default_config_path);

    match run(command, config_path, cli.data_folder) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &ImsError) {
    eprintln!("Error: {}", err);
    if let Some((stdout, stderr)) = err.captured_output() {
        if !stdout.is_empty() {
            eprintln!("std_out : {}", stdout);
        }
        if !stderr.is_empty() {
            eprintln!("std_err : {}", stderr);
        }
    }
}

fn run(command: Command, config_path: PathBuf, data_folder: Option<PathBuf>) -> ImsResult<()> {
    if let Command::EditConfig = command {
        if !config_path.exists() {
            Config::default().save(&config_path)?;
        }
        return open_in_editor(&config_path);
    }

    let mut config = Config::load(&config_path)?;

    if let Some(dir) = data_folder {
        config.data_folder = dir.to_string_lossy().to_string();
    }

    let mut ims = Ims::open(&config)?;
    for path in ims.log().corrupt_files() {
        eprintln!(
            "Warning: could not read {}, starting with an empty list",
            path.display()
        );
    }

    match command {
        Command::Install { package } => install(&mut ims, &package, false),
        Command::InstallCommit { package } => install(&mut ims, &package, true),
        Command::Commit => {
            match ims.commit()? {
                CommitOutcome::NothingToCommit => println!("No uncommitted packages to commit"),
                CommitOutcome::Committed(count) => println!("Committed {} packages", count),
            }
            Ok(())
        }
        Command::Remove { package } => {
            let outcome = ims.remove(&package)?;
            let name = &outcome.command.package;
            println!("Successfully removed {}", name);
            if outcome.cancelled_pending {
                println!("Removed {} from uncommitted list", name);
            }
            Ok(())
        }
        Command::ListInstalled { tag } => {
            let tag = requested_tag(tag);
            let packages = ims.installed(tag.as_deref());
            match format_installed(&packages, tag.as_deref()) {
                Some(table) => print!("{}", table),
                None => println!("No packages installed"),
            }
            Ok(())
        }
        Command::ListAll => {
            print!("{}", format_all(ims.log()));
            Ok(())
        }
        Command::Geninstall { tag } => {
            let tag = requested_tag(tag);
            match ims.install_script(tag.as_deref()) {
                Some(script) => {
                    let path = script.write_to(&std::env::current_dir()?)?;
                    println!("Generated install script: {}", path.display());
                }
                None => println!("No packages to generate script for"),
            }
            Ok(())
        }
        Command::AddTag { tag_name } => {
            let outcome = ims.add_tag(&tag_name)?;
            println!("{}", tag_message(&tag_name, outcome));
            Ok(())
        }
        Command::RemoveTag { tag_name } => {
            let outcome = ims.remove_tag(&tag_name)?;
            println!("{}", tag_message(&tag_name, outcome));
            Ok(())
        }
        Command::ImportAptHistory { path } => {
            let entries = read_apt_history(&path)?;
            let added = ims.import_apt_history(&entries)?;
            println!(
                "Imported {} of {} entries from {}",
                added,
                entries.len(),
                path.display()
            );
            Ok(())
        }
        Command::EditConfig => unreachable!("handled before the log is opened"),
    }
}

/// An empty tag argument means "no tag", same as omitting it
fn requested_tag(tag: Option<String>) -> Option<String> {
    tag.filter(|t| !t.is_empty())
}

fn tag_message(tag_name: &str, outcome: TagOutcome) -> String {
    match outcome {
        TagOutcome::Added => format!("Added tag: {}", tag_name),
        TagOutcome::AlreadyExists => format!("Tag '{}' already exists", tag_name),
        TagOutcome::Removed => format!("Removed tag: {}", tag_name),
        TagOutcome::NotFound => format!("Tag '{}' not found", tag_name),
    }
}

fn install(ims: &mut Ims<'_>, spec: &str, commit_immediately: bool) -> ImsResult<()> {
    let outcome = ims.install(spec, commit_immediately)?;
    println!(
        "Successfully installed {} with {} - {}",
        outcome.command.package,
        outcome.command.manager,
        outcome.command.display()
    );
    if outcome.state == InstallState::Uncommitted {
        println!("Run `ims commit` to make it permanent");
    }
    Ok(())
}
