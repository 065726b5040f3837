//! # glazier-quote
//!
//! Prices a batch of glass cutting requests from the command line.
//!
//! ## Usage
//! ```bash
//! # Price requests from a file, config from the platform config dir
//! glazier-quote --requests demos/requests.json
//!
//! # Explicit config, requests on stdin, indented output
//! cat requests.json | glazier-quote --config demos/pricing.toml --requests - --pretty
//!
//! # Check a custom formula before saving it
//! glazier-quote --check-formula "max(total / 0.28, 25)"
//!
//! # Which treatments to offer for a material
//! glazier-quote --config demos/pricing.toml --options "1/4" mirror
//! ```
//!
//! ## Logging
//! Logs go to stderr so stdout stays valid JSON.
//! - `RUST_LOG=debug` - Show every pricing stage
//! - Default: `info,glazier=debug`

mod config;
mod error;

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use glazier_core::formula::Formula;
use glazier_core::{GlassType, QuoteRequest, QuoteSheet, Thickness};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::{AppError, AppResult};

/// Total the formula check evaluates at.
const SAMPLE_TOTAL: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Quote {
        config: Option<PathBuf>,
        requests: Option<PathBuf>,
        pretty: bool,
    },
    CheckFormula {
        expression: String,
    },
    Options {
        config: Option<PathBuf>,
        thickness: Thickness,
        glass_type: GlassType,
        pretty: bool,
    },
    Help,
}

fn main() -> ExitCode {
    init_tracing();

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n", e);
            print_help();
            return ExitCode::from(2);
        }
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "glazier-quote failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> AppResult<()> {
    match command {
        Command::Quote {
            config,
            requests,
            pretty,
        } => {
            let config = config::load(config)?;
            let requests = read_requests(requests)?;
            info!(
                config_version = config.version,
                formula_mode = %config.formula.mode,
                lines = requests.len(),
                "Pricing quote"
            );

            let sheet = QuoteSheet::price(&config, &requests);
            info!(
                grand_total = %sheet.grand_total,
                rejected_lines = sheet.rejected_lines,
                "Quote priced"
            );
            print_json(&sheet, pretty)
        }
        Command::CheckFormula { expression } => {
            let formula = Formula::compile(&expression)?;
            let value = formula.evaluate(SAMPLE_TOTAL)?;
            println!("ok: total = {} gives {}", SAMPLE_TOTAL, value);
            Ok(())
        }
        Command::Options {
            config,
            thickness,
            glass_type,
            pretty,
        } => {
            let config = config::load(config)?;
            print_json(&config.treatment_options(&thickness, &glass_type), pretty)
        }
        Command::Help => {
            print_help();
            Ok(())
        }
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> AppResult<Command> {
    let mut config = None;
    let mut requests = None;
    let mut pretty = false;
    let mut formula = None;
    let mut options = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => config = Some(PathBuf::from(value(&mut args, &arg)?)),
            "--requests" | "-r" => requests = Some(PathBuf::from(value(&mut args, &arg)?)),
            "--pretty" | "-p" => pretty = true,
            "--check-formula" => formula = Some(value(&mut args, &arg)?),
            "--options" => {
                let thickness = value(&mut args, &arg)?;
                let glass_type = value(&mut args, &arg)?;
                options = Some((Thickness::new(thickness), GlassType::new(glass_type)));
            }
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(AppError::Usage(format!("Unknown argument: {}", other))),
        }
    }

    Ok(match (formula, options) {
        (Some(_), Some(_)) => {
            return Err(AppError::Usage(
                "--check-formula and --options cannot be combined".into(),
            ))
        }
        (Some(expression), None) => Command::CheckFormula { expression },
        (None, Some((thickness, glass_type))) => Command::Options {
            config,
            thickness,
            glass_type,
            pretty,
        },
        (None, None) => Command::Quote {
            config,
            requests,
            pretty,
        },
    })
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> AppResult<String> {
    args.next()
        .ok_or_else(|| AppError::Usage(format!("{} needs a value", flag)))
}

/// Reads a JSON array of requests from a file, or stdin for `-` or no path.
fn read_requests(path: Option<PathBuf>) -> AppResult<Vec<QuoteRequest>> {
    let contents = match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(&path)?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&contents)?)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> AppResult<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn print_help() {
    println!("glazier-quote - Glass quote pricing");
    println!();
    println!("Usage: glazier-quote [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>          Pricing config (TOML)");
    println!("  -r, --requests <PATH|->      Quote requests (JSON array, default stdin)");
    println!("  -p, --pretty                 Indent JSON output");
    println!("      --check-formula <EXPR>   Validate a custom formula");
    println!("      --options <THICK> <TYPE> Show treatments offered for a material");
    println!("  -h, --help                   Show this help message");
}

/// Initializes the tracing subscriber on stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,glazier=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppResult<Command> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_default_is_quote() {
        assert_eq!(
            parse(&[]).unwrap(),
            Command::Quote {
                config: None,
                requests: None,
                pretty: false
            }
        );
    }

    #[test]
    fn test_quote_flags() {
        assert_eq!(
            parse(&["--config", "p.toml", "-r", "r.json", "--pretty"]).unwrap(),
            Command::Quote {
                config: Some(PathBuf::from("p.toml")),
                requests: Some(PathBuf::from("r.json")),
                pretty: true
            }
        );
    }

    #[test]
    fn test_check_formula() {
        assert_eq!(
            parse(&["--check-formula", "total * 2"]).unwrap(),
            Command::CheckFormula {
                expression: "total * 2".to_string()
            }
        );
    }

    #[test]
    fn test_options_takes_two_values() {
        assert_eq!(
            parse(&["--options", "1/4", "mirror"]).unwrap(),
            Command::Options {
                config: None,
                thickness: Thickness::from("1/4"),
                glass_type: GlassType::from("mirror"),
                pretty: false
            }
        );
        assert!(matches!(
            parse(&["--options", "1/4"]),
            Err(AppError::Usage(_))
        ));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(matches!(parse(&["--verbose"]), Err(AppError::Usage(_))));
        assert!(matches!(parse(&["--config"]), Err(AppError::Usage(_))));
        assert!(matches!(
            parse(&["--check-formula", "1", "--options", "1/4", "clear"]),
            Err(AppError::Usage(_))
        ));
    }

    #[test]
    fn test_demo_requests_parse() {
        let requests: Vec<QuoteRequest> =
            serde_json::from_str(include_str!("../../../demos/requests.json")).unwrap();
        assert_eq!(requests.len(), 5);
        assert_eq!(requests[2].quantity, 3);
    }
}
