//! Joseki-Advisor command line.
//!
//! ## Usage
//!
//! - `joseki-advisor advise <position>` - Print joseki moves for a position
//! - `joseki-advisor stats` - Load the corpus and print index statistics
//! - `joseki-advisor parse <file>` - Check that a record file parses
//! - `joseki-advisor show <position>` - Print a position string as a board
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::TypedValueParser as _;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use joseki_advisor::advisor::{valid_weight, Advisor, AdvisorConfig};
use joseki_advisor::board::format_point;
use joseki_advisor::codec::decode;
use joseki_advisor::constants::{DEFAULT_CORPUS, DEFAULT_SIZE, JOSEKI_WEIGHT, MAX_SIZE};
use joseki_advisor::joseki::JosekiIndex;
use joseki_advisor::sgf::{parse, tree_stats};

/// Joseki-Advisor: opening-book suggestions for Go
#[derive(Parser)]
#[command(name = "joseki-advisor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Record file the joseki index is built from
    #[arg(long, global = true, default_value = DEFAULT_CORPUS)]
    corpus: PathBuf,

    /// Size of the boards described by position strings
    #[arg(long, global = true, default_value_t = DEFAULT_SIZE,
          value_parser = clap::value_parser!(u16).range(1..=MAX_SIZE as i64).map(usize::from))]
    size: usize,

    /// Weight given to each suggested move, in (0, 1]
    #[arg(long, global = true, default_value_t = JOSEKI_WEIGHT, value_parser = parse_weight)]
    weight: f32,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest joseki moves for a position string
    Advise {
        /// Row-major position, rows separated by '/'
        position: String,
    },
    /// Build the index and print statistics
    Stats,
    /// Parse a record file and print its shape
    Parse {
        file: PathBuf,
    },
    /// Decode a position string and print the board
    Show {
        position: String,
    },
}

fn parse_weight(s: &str) -> Result<f32, String> {
    let weight: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if valid_weight(weight) {
        Ok(weight)
    } else {
        Err(format!("{weight} is not in (0, 1]"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Advise { ref position } => advise(&cli, position),
        Commands::Stats => stats(&cli),
        Commands::Parse { ref file } => parse_file(file),
        Commands::Show { ref position } => show(&cli, position),
    }
}

fn advise(cli: &Cli, position: &str) -> Result<()> {
    let pending = JosekiIndex::spawn_load(&cli.corpus);
    // Catch a bad position before waiting on the corpus.
    decode(position, cli.size).context("invalid position")?;

    let config = AdvisorConfig {
        board_size: cli.size,
        weight: cli.weight,
        ..AdvisorConfig::default()
    };
    let advisor = Advisor::with_config(pending.wait(), config);

    let suggestions = advisor.suggest(position);
    if suggestions.is_empty() {
        println!("no joseki move found");
    }
    for s in suggestions {
        println!("move = {}, value = {}", format_point(s.cell, cli.size), s.weight);
    }
    Ok(())
}

fn stats(cli: &Cli) -> Result<()> {
    let index = JosekiIndex::load(&cli.corpus)?;
    let stats = index.stats();
    println!("positions:  {}", index.len());
    println!("candidates: {}", index.candidate_count());
    println!("moves:      {}", stats.moves);
    println!("recorded:   {}", stats.recorded);
    println!("illegal:    {}", stats.illegal);
    println!("unresolved: {}", stats.unresolved);
    Ok(())
}

fn parse_file(file: &Path) -> Result<()> {
    let text =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let nodes = parse(&text).with_context(|| format!("failed to parse {}", file.display()))?;
    let stats = tree_stats(&nodes);
    println!("commands:  {}", stats.commands);
    println!("branches:  {}", stats.branches);
    println!("max depth: {}", stats.max_depth);
    Ok(())
}

fn show(cli: &Cli, position: &str) -> Result<()> {
    let decoded = decode(position, cli.size).context("invalid position")?;
    print!("{}", decoded.board);
    if let Some(pt) = decoded.last_move {
        println!("last move: {}", format_point(pt, cli.size));
    }
    for pt in decoded.ko {
        println!("ko: {}", format_point(pt, cli.size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_must_be_in_unit_range() {
        assert_eq!(parse_weight("0.5"), Ok(0.5));
        assert_eq!(parse_weight("1"), Ok(1.0));
        assert!(parse_weight("2.5").is_err());
        assert!(parse_weight("0").is_err());
        assert!(parse_weight("-0.3").is_err());
        assert!(parse_weight("heavy").is_err());
    }

    #[test]
    fn test_cli_rejects_out_of_range_weight() {
        assert!(Cli::try_parse_from(["joseki-advisor", "--weight", "2.5", "stats"]).is_err());
        let cli = Cli::try_parse_from(["joseki-advisor", "--weight", "0.75", "stats"]).unwrap();
        assert_eq!(cli.weight, 0.75);
    }
}
