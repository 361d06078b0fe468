//! EpubMerge CLI - Command-line interface for merging EPUB packages

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use epubmerge_core::NavigationFallback;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "epubmerge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Table of contents for books that carry none of their own
#[derive(Clone, Copy, Debug, ValueEnum)]
enum TocFallback {
    /// Only the book's top-level entry
    Single,
    /// One entry per reading-order document
    ReadingOrder,
}

impl From<TocFallback> for NavigationFallback {
    fn from(value: TocFallback) -> Self {
        match value {
            TocFallback::Single => NavigationFallback::SingleEntry,
            TocFallback::ReadingOrder => NavigationFallback::ReadingOrder,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Merge several EPUB files into one
    Merge {
        /// Input files, in merge order
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output file path
        #[arg(short, long)]
        output: String,

        /// Title of the merged book
        #[arg(long)]
        title: Option<String>,

        /// Author of the merged book
        #[arg(long)]
        author: Option<String>,

        /// Table of contents for books without one
        #[arg(long, value_enum, default_value = "single")]
        toc_fallback: TocFallback,

        /// Print the merge summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display information about an EPUB file
    Info {
        /// Input file path
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "epubmerge_cli=debug,epubmerge_core=debug"
    } else {
        "epubmerge_cli=info,epubmerge_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Merge {
            inputs,
            output,
            title,
            author,
            toc_fallback,
            json,
        } => commands::merge(commands::MergeArgs {
            inputs,
            output,
            title,
            author,
            fallback: toc_fallback.into(),
            json,
        }),

        Commands::Info { input, json } => commands::info(&input, json),
    }
}
