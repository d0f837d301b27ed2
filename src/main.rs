use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use itinerary_md::error::read_document;
use itinerary_md::parser::DocumentParser;
use itinerary_md::passthrough::Route;
use itinerary_md::settings::Settings;
use itinerary_md::ParseResult;

#[derive(Parser)]
#[command(name = "itinerary_md", about = "Itinerary markdown → JSON")]
struct Cli {
    /// Settings file (default: itinerary.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse documents and print metadata + items as JSON
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Pretty-print JSON
        #[arg(short, long)]
        pretty: bool,
    },
    /// List the heading sections of a document
    Sections { file: PathBuf },
    /// Show the effective column label map
    Labels,
    /// Show whether the fetch proxy may touch a URL
    Route { url: String },
}

#[derive(Serialize)]
struct FileResult<'a> {
    file: &'a str,
    result: Option<ParseResult>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Parse { files, pretty } => {
            let parser = DocumentParser::new(settings.parser_options());
            let docs = files
                .iter()
                .map(|f| read_document(f).with_context(|| format!("Cannot parse {}", f.display())))
                .collect::<anyhow::Result<Vec<String>>>()?;

            let results = parse_all(&parser, &docs);
            let misses = results.iter().filter(|r| r.is_none()).count();
            if misses > 0 {
                warn!("{} of {} documents have no itinerary table", misses, docs.len());
            }

            let names: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
            let json = if results.len() == 1 {
                to_json(&results[0], pretty || settings.pretty)?
            } else {
                let entries: Vec<FileResult> = names
                    .iter()
                    .zip(results)
                    .map(|(file, result)| FileResult { file, result })
                    .collect();
                to_json(&entries, pretty || settings.pretty)?
            };
            println!("{}", json);
        }
        Commands::Sections { file } => {
            let md = read_document(&file)?;
            let sections = DocumentParser::new(settings.parser_options()).sections(&md);
            if sections.is_empty() {
                println!("No headings found.");
                return Ok(());
            }
            println!("{:>3} | {:>5} | {:<40} | {:>6}", "#", "Level", "Heading", "Chars");
            println!("{}", "-".repeat(64));
            for (i, s) in sections.iter().enumerate() {
                println!(
                    "{:>3} | {:>5} | {:<40} | {:>6}",
                    i + 1,
                    s.level,
                    truncate(&s.heading, 40),
                    s.body.chars().count()
                );
            }
        }
        Commands::Labels => {
            let options = settings.parser_options();
            for (raw, key) in options.labels.entries() {
                println!("{:<24} → {}", raw, key);
            }
            println!("\n{} labels", options.labels.len());
        }
        Commands::Route { url } => {
            let policy = settings.fetch_policy();
            match policy.route(&url) {
                Route::Bypass => println!("bypass    {}", url),
                Route::Intercept => println!("intercept {}", url),
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_elapsed(elapsed));
    }

    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> itinerary_md::error::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

#[cfg(feature = "rayon")]
fn parse_all(parser: &DocumentParser, docs: &[String]) -> Vec<Option<ParseResult>> {
    use indicatif::ParallelProgressIterator;
    use rayon::prelude::*;

    let pb = progress_bar(docs.len());
    docs.par_iter()
        .progress_with(pb)
        .map(|md| parser.parse(md))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn parse_all(parser: &DocumentParser, docs: &[String]) -> Vec<Option<ParseResult>> {
    use indicatif::ProgressIterator;

    let pb = progress_bar(docs.len());
    docs.iter()
        .progress_with(pb)
        .map(|md| parser.parse(md))
        .collect()
}

/// Hidden for single documents so stderr stays quiet.
fn progress_bar(len: usize) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    if len <= 1 {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Cut `s` to `max` characters, marking the cut with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((end, _)) => format!("{}…", &s[..end]),
        None => s.to_string(),
    }
}

fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    match (secs / 60, secs % 60) {
        (0, _) => format!("{:.1}s", d.as_secs_f64()),
        (mins, rest) => format!("{mins}m{rest:02}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("📌 基礎資訊與匯率", 4), "📌 基礎…");
        assert_eq!(truncate("行程", 40), "行程");
        assert_eq!(truncate("abc", 3), "abc");
    }

    #[test]
    fn elapsed_in_seconds_then_minutes() {
        assert_eq!(format_elapsed(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m05s");
    }
}
