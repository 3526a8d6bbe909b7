// SurveyGrid CLI - headless replay of entity grid edit scripts

mod exit_codes;
mod replay;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use surveygrid_config::{ConfigError, FormCatalog, GridSettings};

use exit_codes::{config_exit_code, EXIT_ERROR, EXIT_REJECTED, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "sgrid")]
#[command(about = "Survey entity grid (CLI mode, headless)")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON edit script against a live grid, printing events as JSON lines
    #[command(after_help = "\
Examples:
  sgrid replay edits.json --preset pdus
  sgrid replay edits.json --config ./settings.json --strict
  sgrid replay edits.json --no-drain | jq 'select(.event == \"flush\")'")]
    Replay {
        /// Path to the JSON script
        script: PathBuf,

        /// Form preset to mount (overrides the script's \"form\")
        #[arg(long, short = 'p')]
        preset: Option<String>,

        /// Settings file (defaults to the user settings.json)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Unmount right after the last step, dropping any pending flush
        #[arg(long)]
        no_drain: bool,

        /// Exit non-zero if any operation was rejected
        #[arg(long)]
        strict: bool,
    },

    /// List the available form presets
    Presets {
        /// Print the full catalog as TOML
        #[arg(long)]
        toml: bool,

        /// Settings file (defaults to the user settings.json)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: sgrid <command> [options]");
            eprintln!("       sgrid --help for more information");
            Ok(())
        }
        Some(Commands::Replay {
            script,
            preset,
            config,
            no_drain,
            strict,
        }) => cmd_replay(&script, preset.as_deref(), config.as_deref(), no_drain, strict),
        Some(Commands::Presets { toml, config }) => cmd_presets(toml, config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::UnknownPreset(_) => Some("run `sgrid presets` to list available forms"),
            ConfigError::Json(_) => {
                Some("settings.json may contain `//` comment lines but must otherwise be JSON")
            }
            _ => None,
        };
        let error = CliError::new(config_exit_code(&err), err.to_string());
        match hint {
            Some(hint) => error.with_hint(hint),
            None => error,
        }
    }
}

fn load_settings(config: Option<&Path>) -> Result<GridSettings, CliError> {
    match config {
        Some(path) => Ok(GridSettings::load_from(path)?),
        None => Ok(GridSettings::load()),
    }
}

fn cmd_replay(
    script_path: &Path,
    preset: Option<&str>,
    config: Option<&Path>,
    no_drain: bool,
    strict: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let catalog = FormCatalog::for_settings(&settings)?;
    let script = replay::load_script(script_path)?;
    let setup = replay::setup(&script, preset, &settings, &catalog)?;

    let outcome = replay::run(script, setup, !no_drain);

    for event in &outcome.events {
        let line = serde_json::to_string(event)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot encode event: {}", e)))?;
        println!("{}", line);
    }

    if strict && outcome.rejected > 0 {
        return Err(CliError::new(
            EXIT_REJECTED,
            format!("{} operation(s) rejected", outcome.rejected),
        ));
    }
    Ok(())
}

fn cmd_presets(as_toml: bool, config: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let catalog = FormCatalog::for_settings(&settings)?;

    if as_toml {
        print!("{}", catalog.to_toml()?);
        return Ok(());
    }

    for (name, preset) in &catalog.forms {
        let options = preset.options(&settings);
        println!(
            "{:<12} {:<20} min={} keys={}",
            name,
            preset.title.as_deref().unwrap_or("-"),
            options.min_columns,
            preset.field_keys.join(",")
        );
    }
    Ok(())
}
