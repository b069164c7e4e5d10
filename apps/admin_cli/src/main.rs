use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, AdminController, ShortenerClient};
use shared::{domain::ShortKey, protocol::ShortenedUrlRecord};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shortener-admin", about = "Manage short URLs on a shortener backend")]
struct Args {
    /// Backend endpoint, e.g. http://localhost:8080/api/shorten
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// TOML settings file (defaults to ./shortener-admin.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print JSON instead of a text table
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// List every shortened URL
    List,
    /// Shorten a URL, optionally with a custom key
    Create {
        long_url: String,
        #[arg(long, default_value = "")]
        custom_key: String,
    },
    /// Print the long URL behind a short key
    Resolve { short_key: String },
    /// Delete a short key
    Delete { short_key: String },
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render_table(records: &[ShortenedUrlRecord]) -> String {
    if records.is_empty() {
        return "No shortened URLs.".to_string();
    }

    let key_width = records
        .iter()
        .map(|r| r.short_key.as_str().len())
        .max()
        .unwrap_or(0)
        .max("KEY".len());
    let short_width = records
        .iter()
        .map(|r| r.short_url.len())
        .max()
        .unwrap_or(0)
        .max("SHORT URL".len());
    let created_width = records
        .iter()
        .map(|r| r.created_at.len())
        .max()
        .unwrap_or(0)
        .max("CREATED".len());

    let mut lines = vec![format!(
        "{:key_width$}  {:short_width$}  {:created_width$}  LONG URL",
        "KEY", "SHORT URL", "CREATED"
    )];
    for record in records {
        lines.push(format!(
            "{:key_width$}  {:short_width$}  {:created_width$}  {}",
            record.short_key.as_str(),
            record.short_url,
            record.created_at,
            record.long_url
        ));
    }
    lines.join("\n")
}

/// JSON form of `create`: the new record plus the list reloaded after it.
fn created_report(record: &ShortenedUrlRecord, urls: &[ShortenedUrlRecord]) -> serde_json::Value {
    serde_json::json!({ "created": record, "urls": urls })
}

fn print_records(records: &[ShortenedUrlRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else {
        println!("{}", render_table(records));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref(), args.base_url.clone())
        .context("failed to load settings")?;
    init_tracing(&settings.log_filter);

    let client = ShortenerClient::from_settings(&settings)?;
    tracing::info!(base_url = %client.base_url(), "using shortener backend");
    let controller = AdminController::new(client);

    match args.command {
        Command::List => {
            let records = controller
                .refresh()
                .await
                .context("failed to list short urls")?;
            print_records(&records, args.json)?;
        }
        Command::Create {
            long_url,
            custom_key,
        } => {
            controller.set_inputs(long_url.as_str(), custom_key).await;
            let record = controller
                .submit_create()
                .await
                .with_context(|| format!("failed to shorten {long_url}"))?;
            let urls = controller.snapshot().await.urls;
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&created_report(&record, &urls))?
                );
            } else {
                println!("Created {} -> {}", record.short_url, record.long_url);
                println!();
                println!("{}", render_table(&urls));
            }
        }
        Command::Resolve { short_key } => {
            let short_key = ShortKey::new(short_key);
            let long_url = controller
                .resolve(&short_key)
                .await
                .with_context(|| format!("failed to resolve {short_key}"))?;
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({ "shortKey": short_key, "longUrl": long_url })
                );
            } else {
                println!("{long_url}");
            }
        }
        Command::Delete { short_key } => {
            let short_key = ShortKey::new(short_key);
            controller
                .submit_delete(&short_key)
                .await
                .with_context(|| format!("failed to delete {short_key}"))?;
            let remaining = controller.snapshot().await.urls;
            if args.json {
                print_records(&remaining, true)?;
            } else {
                println!("Deleted {short_key}");
                println!();
                println!("{}", render_table(&remaining));
            }
        }
    }

    Ok(())
}
