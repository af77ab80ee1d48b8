use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use get5_config_core::{
    Match, MatchError, MatchOverrides, SideType, TeamOverrides, VetoFirst, encode_match,
    normalize_match, prepare_match, validate_match,
};
use get5_config_store::{StoreError, ToolConfig, load_match, save_match};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const EXIT_USAGE: u8 = 2;
const EXIT_IO: u8 = 3;
const EXIT_MALFORMED: u8 = 4;
const EXIT_INVALID: u8 = 5;

/// CLI-specific veto order enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
enum CliVetoFirst {
    Team1,
    Team2,
    Random,
}

impl From<CliVetoFirst> for VetoFirst {
    fn from(value: CliVetoFirst) -> Self {
        match value {
            CliVetoFirst::Team1 => Self::Team1,
            CliVetoFirst::Team2 => Self::Team2,
            CliVetoFirst::Random => Self::Random,
        }
    }
}

/// CLI-specific side selection enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
enum CliSideType {
    Standard,
    AlwaysKnife,
    NeverKnife,
}

impl From<CliSideType> for SideType {
    fn from(value: CliSideType) -> Self {
        match value {
            CliSideType::Standard => Self::Standard,
            CliSideType::AlwaysKnife => Self::AlwaysKnife,
            CliSideType::NeverKnife => Self::NeverKnife,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "get5-config")]
#[command(about = "Build and validate get5 match configurations", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Tool configuration file supplying default paths.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply overrides to a base document, normalize it and write the result.
    Build(BuildArgs),
    /// Normalize and validate one or more match documents.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// Base match document (default: an empty document).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Where to write the result (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Match identifier.
    #[arg(long)]
    match_id: Option<String>,
    /// Match title.
    #[arg(long)]
    match_title: Option<String>,
    /// Comma-separated map list (e.g. de_nuke,de_inferno,de_mirage). Must
    /// have an odd number of maps unless the veto is skipped here or in the
    /// input document.
    #[arg(long)]
    maps: Option<String>,
    /// Number of maps in the series.
    #[arg(long)]
    num_maps: Option<i64>,
    /// Play the map list as given, without a veto. Without this flag the
    /// input document's setting is kept.
    #[arg(long)]
    skip_veto: bool,
    /// Which team vetoes first.
    #[arg(long)]
    veto_first: Option<CliVetoFirst>,
    /// How starting sides are decided.
    #[arg(long)]
    side_type: Option<CliSideType>,
    /// Players per team.
    #[arg(long)]
    players_per_team: Option<i64>,
    /// Players per team that must ready up.
    #[arg(long)]
    min_players_to_ready: Option<i64>,
    /// Spectators that must ready up.
    #[arg(long)]
    min_spectators_to_ready: Option<i64>,
    #[arg(long)]
    team1_name: Option<String>,
    #[arg(long)]
    team2_name: Option<String>,
    #[arg(long)]
    team1_tag: Option<String>,
    #[arg(long)]
    team2_tag: Option<String>,
    /// Two-letter country code.
    #[arg(long)]
    team1_flag: Option<String>,
    /// Two-letter country code.
    #[arg(long)]
    team2_flag: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    team1_score: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    team2_score: Option<i64>,
    /// Leave an empty match id empty instead of stamping the current time.
    #[arg(long)]
    no_stamp_match_id: bool,
}

impl BuildArgs {
    fn overrides(&self) -> MatchOverrides {
        MatchOverrides {
            match_id: self.match_id.clone(),
            match_title: self.match_title.clone(),
            map_list: self.maps.as_deref().map(parse_csv_list),
            num_maps: self.num_maps,
            skip_veto: self.skip_veto.then_some(true),
            veto_first: self.veto_first.map(Into::into),
            side_type: self.side_type.map(Into::into),
            players_per_team: self.players_per_team,
            min_players_to_ready: self.min_players_to_ready,
            min_spectators_to_ready: self.min_spectators_to_ready,
            team1: TeamOverrides {
                name: self.team1_name.clone(),
                tag: self.team1_tag.clone(),
                flag: self.team1_flag.clone(),
                series_score: self.team1_score,
            },
            team2: TeamOverrides {
                name: self.team2_name.clone(),
                tag: self.team2_tag.clone(),
                flag: self.team2_flag.clone(),
                series_score: self.team2_score,
            },
        }
    }
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Match documents to check.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error("couldn't write to stdout: {0}")]
    Stdout(#[source] std::io::Error),
    #[error("{failed} of {total} match file(s) failed validation")]
    Validation { failed: usize, total: usize, code: u8 },
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Store(err) => store_exit_code(err),
            CliError::Match(err) => match_exit_code(err),
            CliError::Stdout(_) => EXIT_IO,
            CliError::Validation { code, .. } => *code,
        }
    }

    fn issues(&self) -> &[get5_config_core::ValidationIssue] {
        match self {
            CliError::Match(err) | CliError::Store(StoreError::Match { source: err, .. }) => {
                err.issues()
            }
            _ => &[],
        }
    }
}

fn store_exit_code(err: &StoreError) -> u8 {
    match err {
        StoreError::EmptyPath => EXIT_USAGE,
        StoreError::Match { source, .. } => match_exit_code(source),
        StoreError::Config { .. } => EXIT_MALFORMED,
        _ => EXIT_IO,
    }
}

fn match_exit_code(err: &MatchError) -> u8 {
    match err {
        MatchError::Malformed { .. } => EXIT_MALFORMED,
        MatchError::Encode(_) => EXIT_IO,
        MatchError::Override(_) => EXIT_USAGE,
        MatchError::Invalid(_) => EXIT_INVALID,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Build(args) => run_build(args, cli.config.as_deref()),
        Command::Validate(args) => run_validate(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            for issue in err.issues() {
                eprintln!("  - {issue}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_tool_config(path: Option<&Path>) -> Result<ToolConfig, CliError> {
    match path {
        Some(path) => Ok(ToolConfig::load(path)?),
        None => Ok(ToolConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// build command
// ---------------------------------------------------------------------------

fn run_build(args: BuildArgs, config: Option<&Path>) -> Result<(), CliError> {
    let config = load_tool_config(config)?;
    let input = args.input.clone().or_else(|| config.input_path());
    let output = args.output.clone().or_else(|| config.output_path());

    let base = match &input {
        Some(path) => load_match(path)?,
        None => {
            debug!("no input document, starting from an empty match");
            Match::default()
        }
    };

    let mut doc = prepare_match(base, &args.overrides())?;
    if !args.no_stamp_match_id {
        stamp_match_id(&mut doc, chrono::Local::now().naive_local());
    }

    match output {
        Some(path) => {
            save_match(&path, &doc)?;
            println!(
                "Wrote match configuration with {} map(s) to '{}'.",
                doc.map_list.len(),
                path.display()
            );
        }
        None => {
            let bytes = encode_match(&doc)?;
            std::io::stdout()
                .lock()
                .write_all(&bytes)
                .map_err(CliError::Stdout)?;
        }
    }
    Ok(())
}

/// Fills an empty match id with one derived from `now`.
fn stamp_match_id(doc: &mut Match, now: NaiveDateTime) {
    if doc.match_id.as_deref().is_none_or(str::is_empty) {
        let match_id = now.format("csgo%Y.%m.%d.%H%M%S").to_string();
        info!(%match_id, "stamped match id");
        doc.match_id = Some(match_id);
    }
}

// ---------------------------------------------------------------------------
// validate command
// ---------------------------------------------------------------------------

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let total = args.inputs.len();
    let mut failed = 0usize;
    let mut code = 0u8;

    for path in &args.inputs {
        match check_file(path) {
            Ok(()) => debug!(path = %path.display(), "match document is valid"),
            Err(err) => {
                failed += 1;
                code = code.max(err.exit_code());
                let issues = err.issues();
                if issues.is_empty() {
                    eprintln!("{}: {err}", path.display());
                }
                for issue in issues {
                    eprintln!("{}: {issue}", path.display());
                }
            }
        }
    }

    if failed > 0 {
        return Err(CliError::Validation {
            failed,
            total,
            code,
        });
    }
    println!("Validated {total} match file(s).");
    Ok(())
}

fn check_file(path: &Path) -> Result<(), CliError> {
    let mut doc = load_match(path)?;
    normalize_match(&mut doc);
    validate_match(&doc)?;
    Ok(())
}

fn parse_csv_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
