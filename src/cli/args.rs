use crate::constants::{exit_codes, verbosity};
use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#;

/// Renders Go text/template style templates against JSON data.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Execute inline template text.
    Execute(ExecuteArgs),
    /// Execute a template file.
    ExecuteFile(ExecuteFileArgs),
    /// Check that a template compiles, without executing it.
    Validate(ValidateArgs),
}

impl Commands {
    pub fn verbose(&self) -> u8 {
        match self {
            Commands::Execute(args) => args.verbose,
            Commands::ExecuteFile(args) => args.verbose,
            Commands::Validate(args) => args.verbose,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExecuteArgs {
    /// Template text.
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Data as a JSON string or `-` to read from stdin.
    #[arg(short, long)]
    pub data: Option<String>,

    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Args, Debug, Clone)]
pub struct ExecuteFileArgs {
    /// Path of the template file.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Data as a JSON string or `-` to read from stdin.
    #[arg(short, long)]
    pub data: Option<String>,

    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Template text, or a path when `--file` is given.
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// Treat TEMPLATE as the path of a template file.
    #[arg(short, long)]
    pub file: bool,

    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse command line arguments with custom handling for missing required inputs.
pub fn parse_cli() -> Cli {
    Cli::try_parse().unwrap_or_else(|e| {
        if e.kind() == ErrorKind::MissingRequiredArgument
            || e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        {
            let mut command = Cli::command().help_template(HELP_TEMPLATE);
            if let Err(print_err) = command.print_help() {
                eprintln!("Failed to display help information: {print_err}");
            } else {
                println!();
            }
            std::process::exit(exit_codes::FAILURE);
        } else {
            e.exit();
        }
    })
}

/// Map `-v` counts to the appropriate log level.
pub fn get_log_level_from_verbose(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        verbosity::OFF => LevelFilter::Error,
        verbosity::INFO => LevelFilter::Info,
        verbosity::DEBUG => LevelFilter::Debug,
        verbosity::TRACE.. => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_verbose_flags_to_log_filters() {
        assert_eq!(get_log_level_from_verbose(verbosity::OFF), LevelFilter::Error);
        assert_eq!(get_log_level_from_verbose(verbosity::INFO), LevelFilter::Info);
        assert_eq!(get_log_level_from_verbose(verbosity::DEBUG), LevelFilter::Debug);
        assert_eq!(get_log_level_from_verbose(verbosity::TRACE), LevelFilter::Trace);
        assert_eq!(get_log_level_from_verbose(verbosity::TRACE + 1), LevelFilter::Trace);
    }

    #[test]
    fn parses_execute() {
        let cli = Cli::parse_from(["gotter", "execute", "{{ . }}", "--data", "{\"a\":1}", "-vv"]);
        let Commands::Execute(args) = cli.command else {
            panic!("expected execute");
        };
        assert_eq!(args.text, "{{ . }}");
        assert_eq!(args.data, Some("{\"a\":1}".to_string()));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn parses_execute_file() {
        let cli = Cli::parse_from(["gotter", "execute-file", "t.tmpl", "-d", "-"]);
        assert_eq!(cli.command.verbose(), 0);
        let Commands::ExecuteFile(args) = cli.command else {
            panic!("expected execute-file");
        };
        assert_eq!(args.path, PathBuf::from("t.tmpl"));
        assert_eq!(args.data, Some("-".to_string()));
    }

    #[test]
    fn parses_validate() {
        let cli = Cli::parse_from(["gotter", "validate", "t.tmpl", "--file", "-v"]);
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.template, "t.tmpl");
        assert!(args.file);
        assert_eq!(args.verbose, 1);
    }

    #[test]
    fn requires_a_subcommand() {
        assert!(Cli::try_parse_from(["gotter"]).is_err());
    }
}
