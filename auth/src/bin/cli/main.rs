use std::io;
use std::io::BufRead;
use std::process::ExitCode;

use chirpy_auth::AuthConfig;
use chirpy_auth::Authenticator;
use chirpy_auth::PasswordError;
use chirpy_auth::SubjectId;
use chrono::Duration;
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Operator tool for Chirpy credentials.
///
/// Reads the signing secret and cost parameters from configuration
/// (config/default.toml, config/{RUN_MODE}.toml, AUTH__* environment variables).
#[derive(Debug, Parser)]
#[command(name = "chirpy-auth", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Hash a password read from stdin
    Hash,

    /// Check a password read from stdin against a digest
    Verify {
        #[arg(long)]
        digest: String,
    },

    /// Issue a session token for a subject
    Issue {
        #[arg(long)]
        subject: String,

        /// Overrides jwt.expiration_hours
        #[arg(long, allow_negative_numbers = true)]
        ttl_hours: Option<i64>,
    },

    /// Validate a session token and print its subject
    Validate { token: String },
}

fn main() -> Result<ExitCode, anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirpy_auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AuthConfig::load()?;
    tracing::debug!(
        issuer = %config.jwt.issuer,
        expiration_hours = config.jwt.expiration_hours,
        "Configuration loaded"
    );

    let authenticator = Authenticator::from_config(&config)?;
    let secret = config.jwt.secret_bytes();

    match cli.command {
        Command::Hash => {
            let password = read_password()?;
            println!("{}", authenticator.hash_password(&password)?);
        }
        Command::Verify { digest } => {
            let password = read_password()?;
            match authenticator.verify_password(&password, &digest) {
                Ok(()) => println!("ok"),
                Err(PasswordError::Mismatch) => {
                    println!("mismatch");
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Issue { subject, ttl_hours } => {
            let subject: SubjectId = subject.parse()?;
            let authenticator = match ttl_hours {
                Some(hours) => {
                    let ttl = Duration::try_hours(hours)
                        .ok_or_else(|| anyhow::anyhow!("--ttl-hours out of range: {}", hours))?;
                    authenticator.with_token_ttl(ttl)
                }
                None => authenticator,
            };

            let result = authenticator.generate_token(subject, secret)?;
            tracing::info!(%subject, expires_at = %result.expires_at, "Token issued");
            println!("{}", result.access_token);
        }
        Command::Validate { token } => {
            match authenticator.validate_token::<SubjectId>(&token, secret) {
                Ok(subject) => println!("{}", subject),
                Err(e) => {
                    eprintln!("{}", e.public_message());
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_password() -> Result<String, anyhow::Error> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(PasswordError::EmptyPassword.into());
    }

    Ok(password)
}
