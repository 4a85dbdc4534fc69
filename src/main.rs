//! Command-line access to a selection backend.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use place_atlas::color::to_hex;
use place_atlas::config::{AppConfig, ConfigError};
use place_atlas::model::{PixelKey, SelectionId, StoredSelection};
use place_atlas::naming::Prompt;
use place_atlas::persistence::{HttpTransport, PersistenceError, SelectionClient};

#[derive(Parser)]
#[command(author, version, about = "Browse and manage saved canvas selections", long_about = None)]
struct Cli {
    #[arg(help = "Selection server base URL (overrides the config file)", long)]
    server: Option<String>,

    #[arg(help = "Configuration file to use instead of the default one", long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List stored selections")]
    List,

    #[command(about = "Show one stored selection with its pixels")]
    Show { id: String },

    #[command(about = "Delete one stored selection")]
    Delete {
        id: String,
        #[arg(help = "Do not ask for confirmation", long, short)]
        yes: bool,
    },

    #[command(about = "Delete every stored selection")]
    Clear {
        #[arg(help = "Do not ask for confirmation", long, short)]
        yes: bool,
    },

    #[command(about = "Write a default configuration file if none exists")]
    InitConfig,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}", .0.user_message())]
    Persistence(#[from] PersistenceError),

    #[error("Could not write configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Terminal prompt over stdin/stderr.
struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        eprint!("{} [{}] ", message, default);
        io::stderr().flush().ok()?;
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let line = line.trim_end_matches(['\r', '\n']);
                Some(if line.is_empty() { default } else { line }.to_string())
            }
        }
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.prompt(&format!("{} (y/N)", message), "n")
            .is_some_and(|answer| matches!(answer.trim(), "y" | "Y" | "yes"))
    }
}

fn load_config(path: Option<&PathBuf>) -> AppConfig {
    match path {
        Some(path) => AppConfig::load_from(path).unwrap_or_else(|e| {
            eprintln!("Ignoring config {}: {}", path.display(), e);
            AppConfig::default()
        }),
        None => AppConfig::load_from_default_path().unwrap_or_default(),
    }
}

fn print_summary(selection: &StoredSelection) {
    let bounds = selection.bounds();
    println!(
        "{}\t{}\t{} px\t{}x{} at ({}, {})\t{}",
        selection.id,
        selection.name,
        selection.pixels().len(),
        bounds.width(),
        bounds.height(),
        bounds.min_x,
        bounds.min_y,
        selection
            .selection
            .timestamp
            .map_or_else(|| "-".to_string(), |t| t.to_rfc3339()),
    );
}

fn print_details(selection: &StoredSelection) {
    print_summary(selection);
    if !selection.description.is_empty() {
        println!("{}", selection.description);
    }
    for pixel in selection.pixels() {
        let key: PixelKey = pixel.pixel().key();
        println!("  {}\t{}", key, to_hex(pixel.color.to_rgb()));
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), CliError> {
    if let Commands::InitConfig = cli.command {
        match AppConfig::default_path() {
            Some(path) if path.exists() => {
                println!("Configuration already exists at {}", path.display());
            }
            _ => config.save_to_default_path()?,
        }
        return Ok(());
    }

    let server = cli.server.unwrap_or(config.server.url);
    let client = SelectionClient::new(HttpTransport::new(server));
    let mut prompt = TerminalPrompt;

    match cli.command {
        Commands::List => {
            let selections = client.try_list().await?;
            if selections.is_empty() {
                println!("No selections stored");
            }
            for selection in &selections {
                print_summary(selection);
            }
        }
        Commands::Show { id } => {
            let selection = client.get(&SelectionId::new(id)).await?;
            print_details(&selection);
        }
        Commands::Delete { id, yes } => {
            let id = SelectionId::new(id);
            if !yes && !prompt.confirm(&format!("Delete selection {}?", id)) {
                println!("Nothing deleted");
                return Ok(());
            }
            let confirmation = client.delete(&id).await?;
            println!("Deleted {}", confirmation.id);
        }
        Commands::Clear { yes } => {
            if !yes && !prompt.confirm("Delete all selections?") {
                println!("Nothing deleted");
                return Ok(());
            }
            client.clear().await?;
            println!("All selections deleted");
        }
        Commands::InitConfig => {}
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Could not start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{:?}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
