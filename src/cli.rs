// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI structure is described by the structs
// and enums below, and clap generates the parsing, --help and --version.
//
// Commands:
// - crawl: walk a site section and list (optionally save / download) PDFs
// - download: download PDFs from a list file or a single URL
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use pdf_scout::config::{parse_delay, DEFAULT_MAX_DEPTH};

#[derive(Parser, Debug)]
#[command(
    name = "pdf-scout",
    version,
    about = "Find and download the PDF files of a website section",
    long_about = "pdf-scout crawls a website breadth-first, staying on the starting host and \
                  below the starting path, and collects every PDF link it finds. \
                  The PDFs can be listed, saved to a text file, or downloaded."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website section and collect its PDF links
    ///
    /// Example: pdf-scout crawl https://example.com/support --depth 2 --download
    Crawl {
        /// Starting URL; only pages on this host below this path are crawled
        url: String,

        /// Maximum crawl depth (0 = only the starting page)
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        depth: usize,

        /// Delay between requests, in seconds
        #[arg(long, default_value = "1.0", value_parser = parse_delay)]
        delay: Duration,

        /// Download every PDF found once the crawl is done
        #[arg(long)]
        download: bool,

        /// Directory for downloaded PDFs
        #[arg(long, default_value = "pdfs")]
        output: PathBuf,

        /// Save the PDF URLs to a text file (see --list-file)
        #[arg(long)]
        save_list: bool,

        /// File written by --save-list
        #[arg(long, default_value = "pdf_list.txt")]
        list_file: PathBuf,

        /// Print the crawl result as JSON instead of a list
        #[arg(long)]
        json: bool,
    },

    /// Download PDFs from a URL list file (one URL per line) or a single URL
    ///
    /// Example: pdf-scout download pdf_list.txt --output pdfs
    Download {
        /// Text file with one PDF URL per line ('#' lines are ignored)
        #[arg(default_value = "pdf_list.txt")]
        input: PathBuf,

        /// Download only this URL instead of reading a list file
        #[arg(long)]
        url: Option<String>,

        /// Directory for downloaded PDFs
        #[arg(long, default_value = "pdfs")]
        output: PathBuf,

        /// Delay between downloads, in seconds
        #[arg(long, default_value = "0", value_parser = parse_delay)]
        delay: Duration,
    },
}
