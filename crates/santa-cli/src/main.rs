//! Secret Santa command line.
//!
//! # Usage
//!
//! ```bash
//! # Draw from a file and print one link per participant
//! secret-santa draw --input guests.txt --base-url https://example.org/santa/
//!
//! # Draw from stdin as JSON
//! secret-santa draw --format json < guests.txt
//!
//! # Reveal a link
//! secret-santa reveal 'https://example.org/santa/who?name=Santa&key=...&secret=...&iv=...'
//! ```

use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, Subcommand, ValueEnum};
use santa_core::{
    ConfigError, DEFAULT_MAX_ATTEMPTS, ErrorCategory, LinkError, PairingConfig, RevealQuery,
    SantaError, SecretSanta, SecretToken, SystemEnv, reveal,
};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Base URL used when none is given (local docs site)
const DEFAULT_BASE_URL: &str = "http://localhost:3000/super-secret-santa/";

/// Secret Santa pairings with links only the recipient can open
#[derive(Parser, Debug)]
#[command(name = "secret-santa")]
#[command(about = "Draw Secret Santa pairings and reveal links")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pair everyone and print one reveal link per participant
    Draw {
        /// Instruction file (reads stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Base URL the `who` reveal page lives under
        #[arg(short, long, default_value = DEFAULT_BASE_URL)]
        base_url: Url,

        /// Random shuffles tried before the exact matcher
        #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        max_attempts: u32,

        /// Give up after the shuffles instead of running the exact matcher
        #[arg(long)]
        no_exact_fallback: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },

    /// Decode a reveal link
    Reveal {
        /// Full reveal link
        #[arg(conflicts_with_all = ["key", "iv", "secret"])]
        link: Option<String>,

        /// Key query value
        #[arg(long, required_unless_present = "link")]
        key: Option<String>,

        /// Nonce query value
        #[arg(long, alias = "nonce", required_unless_present = "link")]
        iv: Option<String>,

        /// Ciphertext query value
        #[arg(long, required_unless_present = "link")]
        secret: Option<String>,

        /// Name to greet
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// `name<TAB>link` per line
    Table,
    /// JSON array with links and raw token fields
    Json,
}

/// Errors surfaced by the command line.
#[derive(Error, Debug)]
enum CliError {
    /// Draw or reveal failed
    #[error(transparent)]
    Santa(#[from] SantaError),

    /// Invalid pairing settings
    #[error("invalid settings: {0}")]
    Config(#[from] ConfigError),

    /// Reading input or writing output failed
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// JSON output failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<LinkError> for CliError {
    fn from(err: LinkError) -> Self {
        Self::Santa(SantaError::Link(err))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Draw { input, base_url, max_attempts, no_exact_fallback, format } => {
            let config =
                PairingConfig { max_attempts, exact_fallback: !no_exact_fallback }.validate()?;
            let instructions = read_instructions(input.as_ref())?;
            draw(&instructions, &base_url, config, format)
        },
        Command::Reveal { link, key, iv, secret, name } => {
            let query = match link {
                Some(link) => RevealQuery::parse_link(&link).map_err(SantaError::from)?,
                None => RevealQuery {
                    name,
                    token: SecretToken::new(
                        key.unwrap_or_default(),
                        iv.unwrap_or_default(),
                        secret.unwrap_or_default(),
                    ),
                },
            };
            show_reveal(&query)
        },
    }
}

fn read_instructions(input: Option<&PathBuf>) -> Result<String, io::Error> {
    match input {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading instructions");
            fs::read_to_string(path)
        },
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        },
    }
}

fn draw(
    instructions: &str,
    base_url: &Url,
    config: PairingConfig,
    format: Format,
) -> Result<(), CliError> {
    let santa = SecretSanta::new(SystemEnv::new(), config);
    let draw = santa.draw(instructions)?;
    let links = draw.links(base_url)?;

    let mut out = io::stdout().lock();
    match format {
        Format::Table => {
            for (name, link) in &links {
                writeln!(out, "{name}\t{link}")?;
            }
        },
        Format::Json => {
            let entries: Vec<serde_json::Value> = draw
                .tokens()
                .iter()
                .zip(&links)
                .map(|(issued, (name, link))| {
                    serde_json::json!({
                        "name": name,
                        "link": link.as_str(),
                        "key": issued.token.key,
                        "nonce": issued.token.nonce,
                        "secret": issued.token.secret,
                    })
                })
                .collect();
            serde_json::to_writer_pretty(&mut out, &entries)?;
            writeln!(out)?;
        },
    }
    Ok(())
}

fn show_reveal(query: &RevealQuery) -> Result<(), CliError> {
    let revealed = reveal(query)?;
    let mut out = io::stdout().lock();

    match &revealed.name {
        Some(name) => writeln!(out, "Hi {name}! You've been paired with {}", revealed.partner)?,
        None => writeln!(out, "You've been paired with {}", revealed.partner)?,
    }
    writeln!(out, "Good luck!")?;
    Ok(())
}

/// Print a user-facing message and map the error to an exit code.
///
/// Reveal failures print only the generic message; the cause goes to the
/// debug log.
fn report(err: &CliError) -> ExitCode {
    let mut stderr = io::stderr().lock();

    match err {
        CliError::Santa(santa) if santa.category() == ErrorCategory::InvalidLink => {
            tracing::debug!(error = %santa, "reveal rejected");
            let _ = writeln!(stderr, "error: {}", santa.user_message());
        },
        CliError::Santa(santa) => {
            let _ = writeln!(stderr, "error: {}\n  {santa}", santa.user_message());
        },
        CliError::Config(_) | CliError::Io(_) | CliError::Json(_) => {
            let _ = writeln!(stderr, "error: {err}");
        },
    }

    ExitCode::from(exit_code(err))
}

fn exit_code(err: &CliError) -> u8 {
    match err {
        CliError::Santa(santa) => match santa.category() {
            ErrorCategory::Input => 2,
            ErrorCategory::Infeasible => 3,
            ErrorCategory::InvalidLink => 4,
            ErrorCategory::Internal => 1,
        },
        CliError::Config(_) => 2,
        CliError::Io(_) | CliError::Json(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_defaults() {
        let args = Args::try_parse_from(["secret-santa", "draw"]).unwrap();

        let Command::Draw { input, base_url, max_attempts, no_exact_fallback, format } =
            args.command
        else {
            panic!("expected draw");
        };
        assert_eq!(input, None);
        assert_eq!(base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert!(!no_exact_fallback);
        assert_eq!(format, Format::Table);
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn draw_rejects_bad_base_url() {
        assert!(Args::try_parse_from(["secret-santa", "draw", "--base-url", "not a url"]).is_err());
    }

    #[test]
    fn reveal_accepts_link() {
        let args =
            Args::try_parse_from(["secret-santa", "reveal", "https://x.org/who?key=a&iv=b&secret=c"])
                .unwrap();

        assert!(matches!(args.command, Command::Reveal { link: Some(_), .. }));
    }

    #[test]
    fn reveal_accepts_components_and_nonce_alias() {
        let args = Args::try_parse_from([
            "secret-santa",
            "reveal",
            "--key",
            "a",
            "--nonce",
            "b",
            "--secret",
            "c",
        ])
        .unwrap();

        let Command::Reveal { iv, .. } = args.command else {
            panic!("expected reveal");
        };
        assert_eq!(iv.as_deref(), Some("b"));
    }

    #[test]
    fn reveal_requires_link_or_components() {
        assert!(Args::try_parse_from(["secret-santa", "reveal"]).is_err());
        assert!(Args::try_parse_from(["secret-santa", "reveal", "--key", "a"]).is_err());
    }

    #[test]
    fn reveal_link_conflicts_with_components() {
        assert!(
            Args::try_parse_from(["secret-santa", "reveal", "https://x.org/who", "--key", "a"])
                .is_err()
        );
    }

    #[test]
    fn zero_attempts_without_fallback_is_a_config_error() {
        let command = Command::Draw {
            input: None,
            base_url: Url::parse(DEFAULT_BASE_URL).unwrap(),
            max_attempts: 0,
            no_exact_fallback: true,
            format: Format::Table,
        };

        assert!(matches!(run(command), Err(CliError::Config(ConfigError::NoSearch))));
    }

    #[test]
    fn exit_codes_follow_error_category() {
        let invalid = CliError::from(SantaError::from(santa_core::TokenError::AuthenticationFailed));
        let infeasible =
            CliError::from(SantaError::from(santa_core::PairingError::Infeasible { attempts: 1 }));
        let input = CliError::from(SantaError::from(santa_core::ParseError::EmptyRoster));

        assert_eq!(exit_code(&invalid), 4);
        assert_eq!(exit_code(&infeasible), 3);
        assert_eq!(exit_code(&input), 2);
        assert_eq!(exit_code(&CliError::Config(ConfigError::NoSearch)), 2);
    }
}
