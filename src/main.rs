// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging and parse command-line arguments using clap
// 2. Dispatch to the appropriate subcommand handler
// 3. Print progress and results
// 4. Exit with proper code (0 = completed, 2 = setup error)
//
// All the real work lives in the library (src/lib.rs); this file only turns
// crawl and download events into terminal output.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::Path;

use cli::{Cli, Commands};
use pdf_scout::crawl::CrawlEvent;
use pdf_scout::download::{self, DownloadEvent, DownloadSummary, Downloader};
use pdf_scout::logging::init_logging;
use pdf_scout::{CrawlConfig, CrawlResult, Crawler, Fetcher, HttpFetcher};

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            url,
            depth,
            delay,
            download,
            output,
            save_list,
            list_file,
            json,
        } => {
            let config = CrawlConfig::default().with_max_depth(depth).with_delay(delay);
            let options = CrawlOptions {
                download,
                output: &output,
                list_file: save_list.then_some(list_file.as_path()),
                json,
            };
            handle_crawl(&url, config, options).await
        }
        Commands::Download {
            input,
            url,
            output,
            delay,
        } => {
            let config = CrawlConfig::default().with_delay(delay);
            handle_download(&input, url.as_deref(), &output, config).await
        }
    }
}

struct CrawlOptions<'a> {
    download: bool,
    output: &'a Path,
    list_file: Option<&'a Path>,
    json: bool,
}

// Handles the 'crawl' subcommand
async fn handle_crawl(url: &str, config: CrawlConfig, options: CrawlOptions<'_>) -> Result<i32> {
    // In JSON mode stdout carries only the JSON document
    let verbose = !options.json;

    if verbose {
        println!("🚀 Starting crawl from: {}", url);
        println!("📊 Max depth: {}", config.max_depth);
        println!("⏱️  Delay: {:.1}s\n", config.delay.as_secs_f64());
    }

    let fetcher = HttpFetcher::new(&config.user_agent).context("Failed to set up HTTP client")?;
    let crawler = Crawler::new(fetcher, config);

    let result = crawler
        .crawl_with(url, |event| {
            if verbose {
                print_crawl_event(event);
            }
        })
        .await
        .with_context(|| format!("Cannot crawl '{}'", url))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_crawl_summary(&result);
        print_pdf_list(&result.pdfs);
    }

    if let Some(list_file) = options.list_file {
        download::write_url_list(list_file, &result.pdfs)
            .with_context(|| format!("Failed to write PDF list to {}", list_file.display()))?;
        if verbose {
            println!("\n💾 PDF list saved to: {}", list_file.display());
        }
    }

    if !options.download {
        if verbose && !result.pdfs.is_empty() {
            println!("\n💡 Tip: Run with --download to download all PDFs");
        }
        return Ok(0);
    }

    if result.pdfs.is_empty() {
        if verbose {
            println!("\n❌ No PDFs to download");
        }
        return Ok(0);
    }

    // Downloads reuse the crawl's client and its connection pool
    let config = crawler.config().clone();
    let fetcher = crawler.into_fetcher();
    let downloader = Downloader::new(&fetcher, &config);

    if verbose {
        println!(
            "\n⬇️  Downloading {} PDFs to '{}/'",
            result.pdfs.len(),
            options.output.display()
        );
    }

    let summary = downloader
        .download_all_with(&result.pdfs, options.output, |event| {
            if verbose {
                print_download_event(event);
            }
        })
        .await
        .context("Download failed")?;

    if verbose {
        print_download_summary(&summary, options.output);
    }

    Ok(0)
}

// Handles the 'download' subcommand
async fn handle_download(
    input: &Path,
    single_url: Option<&str>,
    output: &Path,
    config: CrawlConfig,
) -> Result<i32> {
    let fetcher = HttpFetcher::new(&config.user_agent).context("Failed to set up HTTP client")?;
    let downloader = Downloader::new(&fetcher, &config);

    if let Some(url) = single_url {
        download_single(&downloader, url, output, &mut io::stdout()).await?;
        return Ok(0);
    }

    let urls = download::read_url_list(input)
        .with_context(|| format!("Cannot read URL list '{}'", input.display()))?;

    if urls.is_empty() {
        println!("No URLs found in {}", input.display());
        return Ok(0);
    }

    println!("Found {} PDF URLs", urls.len());
    println!("Downloading to: {}/\n", output.display());

    let summary = downloader
        .download_all_with(&urls, output, print_download_event)
        .await
        .context("Download failed")?;

    print_download_summary(&summary, output);
    Ok(0)
}

// Downloads one URL given on the command line
//
// An output directory that cannot be created is a setup error; a failed
// download is only reported.
async fn download_single<F: Fetcher, W: Write>(
    downloader: &Downloader<'_, F>,
    url: &str,
    output: &Path,
    out: &mut W,
) -> Result<()> {
    download::prepare_output_dir(output)
        .await
        .with_context(|| format!("Cannot create output directory '{}'", output.display()))?;

    write_partial(out, &format!("Downloading: {}... ", url))?;
    match downloader.download_one(url, output).await {
        Ok(file) => writeln!(out, "✅ ({}) -> {}", format_size(file.bytes), file.path.display())?,
        Err(e) => writeln!(out, "❌ Error: {}", e)?,
    }
    Ok(())
}

// Writes the first half of a progress line; the result is appended once the
// download ends, so the text has to be flushed now
fn write_partial<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    out.flush()
}

fn print_crawl_event(event: CrawlEvent<'_>) {
    match event {
        CrawlEvent::Fetching { url, depth } => println!("🔍 Crawling (depth {}): {}", depth, url),
        CrawlEvent::PageVisited { .. } => {}
        CrawlEvent::PageFailed { url, message, .. } => println!("  ❌ Error fetching {}: {}", url, message),
        CrawlEvent::PdfFound { url, .. } => println!("  📄 Found PDF: {}", url),
    }
}

fn print_crawl_summary(result: &CrawlResult) {
    println!("\n✅ Crawl complete!");
    println!("📊 Summary:");
    println!("   🔗 Pages scanned: {}", result.pages_scanned);
    println!("   📄 PDFs found:    {}", result.pdfs.len());
    println!("   ❌ Errors:        {}", result.error_count);
}

fn print_pdf_list(pdfs: &[String]) {
    if pdfs.is_empty() {
        println!("\n❌ No PDFs found");
        return;
    }

    println!("\n📋 List of PDFs:");
    println!("{}", "-".repeat(80));
    for (i, pdf) in pdfs.iter().enumerate() {
        println!("{}. {}", i + 1, pdf);
    }
}

fn print_download_event(event: DownloadEvent<'_>) {
    match event {
        DownloadEvent::Started { index, total, file_name, .. } => {
            let line = format!("  [{}/{}] Downloading: {}... ", index, total, file_name);
            let _ = write_partial(&mut io::stdout(), &line);
        }
        DownloadEvent::Finished { file } => println!("✅ ({})", format_size(file.bytes)),
        DownloadEvent::Failed { error, .. } => println!("❌ Error: {}", error),
    }
}

fn print_download_summary(summary: &DownloadSummary, output: &Path) {
    println!(
        "\n✅ Complete: {}/{} PDFs downloaded ({}) to '{}/'",
        summary.downloaded.len(),
        summary.attempted(),
        format_size(summary.total_bytes()),
        output.display()
    );
}

// Formats a byte count the way the download lines show it: KB below 1 MB
fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        format!("{:.1} KB", kb)
    } else {
        format!("{:.2} MB", kb / 1024.0)
    }
}
