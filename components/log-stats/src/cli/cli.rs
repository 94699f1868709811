use crate::helpers::load_config::Config;
use crate::runtime;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "log-stats",
    long_about = "log-stats reads HTTP access log lines, keeps running totals of transferred bytes and \
status codes, and prints a cumulative snapshot every 10 lines and once more when the input ends or is interrupted.",
    about = "Streaming access log statistics",
    version,
    term_width = 100,
    args_conflicts_with_subcommands = true,
    after_help = "\
    EXAMPLES:
        tail -f /var/log/nginx/access.log | log-stats
        log-stats run --input ./access.log --config ./log_stats.toml
        log-stats validate --config ./log_stats.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read access log lines from this file instead of standard input
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Aggregate access log lines (the default when no subcommand is given)
    Run(RunArgs),

    /// Validate a configuration file without reading any input
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Entry function for CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run(cli.run)) {
        Commands::Run(args) => {
            runtime::runtime::run_log_stats(args.config.as_deref(), args.input.as_deref()).await?
        }
        Commands::Validate { config } => validate_config(config)?,
    }

    Ok(())
}

//
// ------------------------ Command Implementations ------------------------------
//

/// Validate configuration file
fn validate_config(config: PathBuf) -> Result<()> {
    println!("Validating configuration file: {:?}", config);
    let cfg = Config::load(&config)?;
    println!("Configuration valid:\n{:#?}", cfg);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_runs_on_stdin() {
        let cli = Cli::try_parse_from(["log-stats"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.run.config.is_none());
        assert!(cli.run.input.is_none());
    }

    #[test]
    fn test_top_level_run_flags() {
        let cli =
            Cli::try_parse_from(["log-stats", "--input", "access.log", "-c", "cfg.toml"]).unwrap();
        assert_eq!(cli.run.input, Some(PathBuf::from("access.log")));
        assert_eq!(cli.run.config, Some(PathBuf::from("cfg.toml")));
    }

    #[test]
    fn test_validate_requires_config() {
        assert!(Cli::try_parse_from(["log-stats", "validate"]).is_err());

        let cli = Cli::try_parse_from(["log-stats", "validate", "--config", "cfg.toml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Validate { .. })));
    }
}
