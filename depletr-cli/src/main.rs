mod analyze;
mod common;
mod compare;
mod overlap;

use anyhow::Result;
use clap::{ArgMatches, Command, arg};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "depletr";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Quantify how well gRNAs deplete their targets in sequencing libraries.")
        .subcommand_required(true)
        .arg(
            arg!(-v --verbose "Log debug messages (RUST_LOG takes precedence)")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand(analyze::cli::create_analyze_cli())
        .subcommand(compare::cli::create_compare_cli())
        .subcommand(overlap::cli::create_overlap_cli())
}

fn verbose(matches: &ArgMatches) -> bool {
    matches.get_flag("verbose")
        || matches
            .subcommand()
            .is_some_and(|(_, sub)| sub.get_flag("verbose"))
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();
    init_logging(verbose(&matches));

    match matches.subcommand() {
        //
        // DEPLETION ANALYSIS
        //
        Some((analyze::cli::ANALYZE_CMD, matches)) => {
            analyze::handlers::run_analyze(matches)?;
        }

        //
        // GROUP COMPARISON
        //
        Some((compare::cli::COMPARE_CMD, matches)) => {
            compare::handlers::run_compare(matches)?;
        }

        //
        // READ/FEATURE OVERLAP
        //
        Some((overlap::cli::OVERLAP_CMD, matches)) => {
            overlap::handlers::run_overlap(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    #[rstest]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[rstest]
    #[case(&["depletr", "-v", "overlap", "-b", "r.bam", "-f", "f.bed"], true)]
    #[case(&["depletr", "overlap", "-b", "r.bam", "-f", "f.bed", "--verbose"], true)]
    #[case(&["depletr", "overlap", "-b", "r.bam", "-f", "f.bed"], false)]
    fn test_verbose_anywhere(#[case] args: &[&str], #[case] expected: bool) {
        let matches = build_parser().get_matches_from(args);
        assert_eq!(verbose(&matches), expected);
    }

    #[rstest]
    fn test_subcommand_required() {
        assert!(build_parser().try_get_matches_from(["depletr"]).is_err());
    }
}
