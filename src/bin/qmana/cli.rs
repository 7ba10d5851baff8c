use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "qmana",
    about = "Batch geometry analysis of quantum-chemistry outputs",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v: info, -vv: debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress banner, progress and summary tables (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a procedure: ingest files, measure, calculate and export
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Validate a procedure and list the files it would read
    #[command(visible_alias = "c")]
    Check(CheckArgs),
}

/// Procedure location shared by all commands.
#[derive(Args)]
pub struct ProcedureOptions {
    /// Procedure file (TOML)
    #[arg(value_name = "PROCEDURE")]
    pub procedure: PathBuf,

    /// Directory relative file paths resolve against
    /// (defaults to the directory of the procedure file)
    #[arg(short = 'r', long = "root-path", value_name = "DIR")]
    pub root_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub procedure: ProcedureOptions,

    /// Treat atom labels matching several atoms as unresolvable
    /// (overrides `strict_resolution` in the procedure)
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub procedure: ProcedureOptions,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["qmana", "run", "proc.toml", "-vv", "--strict"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.strict);
        assert_eq!(args.procedure.procedure, PathBuf::from("proc.toml"));
        assert_eq!(args.procedure.root_path, None);
    }

    #[test]
    fn root_path_option() {
        let cli = Cli::try_parse_from(["qmana", "-q", "check", "p.toml", "-r", "/data"]).unwrap();
        assert!(cli.quiet);
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.procedure.root_path, Some(PathBuf::from("/data")));
    }
}
