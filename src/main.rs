mod error;
mod fetch;
mod fixture;
mod pacing;
mod parser;
mod pipeline;
mod record;
mod server;
mod service;
mod settings;
mod sink;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::ServiceError;
use crate::record::ProductRecord;
use crate::service::ScrapeRequest;
use crate::settings::Settings;
use crate::sink::CsvSink;

#[derive(Parser)]
#[command(name = "product_scraper", about = "Product search scraper with CSV export")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape search results for a query and save them as CSV
    Scrape {
        /// Search term
        query: String,
        /// Number of result pages to fetch
        #[arg(short, long, default_value = "1")]
        pages: u32,
        /// Skip the network and return the built-in sample products
        #[arg(long)]
        test_mode: bool,
        /// CSV path (default: products.csv or SCRAPER_OUTPUT_PATH)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Serve the scrape endpoint over HTTP
    Serve {
        /// Address to bind (host:port)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print a saved CSV as a table
    Show {
        /// CSV path (default: the configured output path)
        path: Option<PathBuf>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Scrape {
            query,
            pages,
            test_mode,
            output,
        } => {
            if let Some(output) = output {
                settings.output_path = output;
            }
            let pb = if test_mode {
                ProgressBar::hidden()
            } else {
                println!("Scraping {} page(s) for {:?}...", pages, query);
                progress_bar()?
            };
            let request = ScrapeRequest {
                query,
                pages,
                test_mode,
            };

            // The blocking HTTP client must not run on the async runtime.
            let outcome = tokio::task::spawn_blocking(move || {
                service::invoke_with_settings(&settings, &request, &pb)
            })
            .await?;

            match outcome {
                Ok(response) => {
                    print_table(&response.products, 50);
                    println!(
                        "\n{} products saved to {}",
                        response.count, response.csv_file
                    );
                    Ok(())
                }
                Err(ServiceError::NoRecords) => {
                    println!("No products found.");
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            server::serve(settings, &bind).await
        }
        Commands::Show { path, limit } => {
            let path = path.unwrap_or_else(|| settings.output_path.clone());
            let records = CsvSink::read(&path)?;
            if records.is_empty() {
                println!("{} has no products.", path.display());
                return Ok(());
            }
            print_table(&records, limit);
            println!("\n{} products in {}", records.len(), path.display());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn progress_bar() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages (eta {eta})")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

fn print_table(records: &[ProductRecord], limit: usize) {
    println!(
        "{:>3} | {:<40} | {:>10} | {:>6} | {:>8}",
        "#", "Product", "Price", "Rating", "Reviews"
    );
    println!("{}", "-".repeat(80));
    for (i, r) in records.iter().take(limit).enumerate() {
        println!(
            "{:>3} | {:<40} | {:>10} | {:>6} | {:>8}",
            i + 1,
            truncate(&r.name, 40),
            r.price,
            r.rating,
            r.reviews
        );
    }
    if records.len() > limit {
        println!("... {} more", records.len() - limit);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
