use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use dirsrv_testgen::config::TestcaseRequest;
use dirsrv_testgen::config_loader::resolve_config;
use dirsrv_testgen::orchestrator::generate_testcase;
use dirsrv_testgen::render::OutputFormat;

/// Generate an initial lib389 test script.
///
/// This generates the topology, test, final, and run-isolated functions.
/// With only a ticket a single standalone instance is created. Standalone
/// instances (-i) can not be mixed with replication (-m, -h, -c), and each
/// count is limited to 10.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_help_flag = true, allow_negative_numbers = true)]
struct Args {
    /// Ticket number, used in the generated file and test names
    #[arg(short, long)]
    ticket: Option<String>,

    /// Number of standalone instances (1-10)
    #[arg(short, long)]
    instances: Option<i64>,

    /// Number of masters (0-10)
    #[arg(short, long)]
    masters: Option<i64>,

    /// Number of hubs (0-10)
    #[arg(short = 'h', long)]
    hubs: Option<i64>,

    /// Number of consumers (0-10)
    #[arg(short, long)]
    consumers: Option<i64>,

    /// Output file (defaults to ticket<N>_test.py)
    #[arg(short, long = "outputfile")]
    output: Option<PathBuf>,

    /// What to generate
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// YAML request file; command-line options override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    help: Option<bool>,
}

impl Args {
    fn to_request(&self) -> TestcaseRequest {
        TestcaseRequest {
            ticket: self.ticket.clone(),
            masters: self.masters,
            hubs: self.hubs,
            consumers: self.consumers,
            instances: self.instances,
            output: self.output.clone(),
            format: self.format,
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = resolve_config(args.config.as_deref(), args.to_request())?;
    let path = generate_testcase(&config)?;

    info!("Generated testcase for ticket {}: {:?}", config.ticket, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["dirsrv-testgen", "-t", "47910", "-m", "2", "-h", "1", "-c", "3"]);

        assert_eq!(args.ticket.as_deref(), Some("47910"));
        assert_eq!(args.masters, Some(2));
        assert_eq!(args.hubs, Some(1));
        assert_eq!(args.consumers, Some(3));
        assert_eq!(args.instances, None);
        assert_eq!(args.format, None);
    }

    #[test]
    fn test_long_options() {
        let args = Args::parse_from([
            "dirsrv-testgen",
            "--ticket", "1",
            "--instances", "3",
            "--outputfile", "out.py",
            "--format", "yaml",
        ]);

        assert_eq!(args.instances, Some(3));
        assert_eq!(args.output, Some(PathBuf::from("out.py")));
        assert_eq!(args.format, Some(OutputFormat::Yaml));
    }

    #[test]
    fn test_negative_counts_reach_validation() {
        let args = Args::parse_from(["dirsrv-testgen", "-t", "1", "-m", "-1"]);
        assert_eq!(args.masters, Some(-1));
        assert!(args.to_request().validate().is_err());
    }

    #[test]
    fn test_long_help_only() {
        let err = Args::try_parse_from(["dirsrv-testgen", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
