//! KittyPress CLI - LZ77 + Huffman file and archive compressor.

mod commands;
mod utils;

use clap::{ArgAction, Parser, Subcommand};
use commands::{CompressionLevel, cmd_create, cmd_detect, cmd_extract, cmd_list, cmd_test};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kittypress")]
#[command(author, version, about = "KittyPress - LZ77 + Huffman file and archive compressor")]
#[command(long_about = "
KittyPress packs files and directories into a single KP04 archive, each file
compressed with LZ77 and Huffman coding. Standalone KP01-KP03
payloads written by older releases can still be decompressed.

Examples:
  kittypress create photos.kitty photos/
  kittypress create notes.kitty a.txt b.txt --level best
  kittypress list photos.kitty --verbose
  kittypress extract photos.kitty -o restored/
  kittypress extract old_report.kp03 -o report
  kittypress test photos.kitty
  kittypress detect mystery.bin
")]
struct Cli {
    /// Show per-file output; repeat for debug (-vv) and trace (-vvv) logging
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a KP04 archive from files and directories
    #[command(alias = "c", alias = "compress")]
    Create {
        /// Archive file to create
        archive: PathBuf,

        /// Files and directories to add
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Compression level
        #[arg(short, long, value_enum, default_value_t = CompressionLevel::Normal)]
        level: CompressionLevel,

        /// LZ77 window size in bytes (at most 65535)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Extract an archive, or decompress a single-file payload
    #[command(alias = "x", alias = "decompress")]
    Extract {
        /// Archive or payload file
        archive: PathBuf,

        /// Output directory for archives, output file for payloads
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List contents of an archive
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Test archive integrity by decoding every entry
    #[command(alias = "t")]
    Test {
        /// Archive file to test
        archive: PathBuf,
    },

    /// Detect the KittyPress generation of a file
    Detect {
        /// File to analyze
        file: PathBuf,
    },
}

fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 | 1 => LevelFilter::Warn,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = TermLogger::init(
        log_level(cli.verbose, cli.quiet),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    let verbose = cli.verbose > 0;
    let progress = !cli.quiet;

    let result = match cli.command {
        Commands::Create {
            archive,
            paths,
            level,
            window,
        } => cmd_create(&archive, &paths, level, window, verbose, progress),
        Commands::Extract { archive, output } => {
            cmd_extract(&archive, output.as_deref(), verbose, progress)
        }
        Commands::List { archive, json } => cmd_list(&archive, verbose, json),
        Commands::Test { archive } => cmd_test(&archive, verbose),
        Commands::Detect { file } => cmd_detect(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
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
    fn test_parse_create_aliases() {
        for alias in ["create", "c", "compress"] {
            let cli =
                Cli::try_parse_from(["kittypress", alias, "out.kitty", "a.txt", "dir"]).unwrap();
            match cli.command {
                Commands::Create {
                    paths,
                    level,
                    window,
                    ..
                } => {
                    assert_eq!(paths.len(), 2);
                    assert_eq!(level, CompressionLevel::Normal);
                    assert_eq!(window, None);
                }
                _ => panic!("expected create"),
            }
        }
    }

    #[test]
    fn test_parse_level_and_window() {
        let cli = Cli::try_parse_from([
            "kittypress", "create", "out.kitty", "a", "--level", "best", "--window", "4096",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Create {
                level: CompressionLevel::Best,
                window: Some(4096),
                ..
            }
        ));
    }

    #[test]
    fn test_create_requires_paths() {
        assert!(Cli::try_parse_from(["kittypress", "create", "out.kitty"]).is_err());
    }

    #[test]
    fn test_global_verbosity() {
        let cli = Cli::try_parse_from(["kittypress", "list", "a.kitty", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(log_level(cli.verbose, cli.quiet), LevelFilter::Debug);

        let cli = Cli::try_parse_from(["kittypress", "-q", "x", "a.kitty"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(log_level(cli.verbose, cli.quiet), LevelFilter::Error);
        assert!(Cli::try_parse_from(["kittypress", "-q", "-v", "x", "a.kitty"]).is_err());
    }
}
