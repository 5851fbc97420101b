//! webanalyze 命令行入口：拉取规则库、对给定证据做检测

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use webanalyze::{CatalogFetcher, CatalogLoader, ConfigManager, Evidence, TechDetector};

#[derive(Parser, Debug)]
#[command(name = "webanalyze", version, about = "Detect web technologies with Wappalyzer signatures")]
struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download the technologies catalog
    Update {
        #[arg(long, help = "Catalog URL (defaults to the pinned Wappalyzer technologies.json)")]
        url: Option<String>,
        #[arg(short, long, default_value = "technologies.json")]
        output: PathBuf,
        #[arg(long, default_value_t = 30, help = "HTTP timeout in seconds")]
        timeout: u64,
    },
    /// Match evidence against the catalog
    Detect {
        #[arg(short, long, default_value = "technologies.json")]
        catalog: PathBuf,
        #[arg(long = "url")]
        urls: Vec<String>,
        #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
        headers: Vec<String>,
        #[arg(long = "cookie", value_name = "NAME=VALUE")]
        cookies: Vec<String>,
        #[arg(long = "meta", value_name = "NAME=CONTENT")]
        meta: Vec<String>,
        #[arg(long, help = "HTML file to analyze")]
        html: Option<PathBuf>,
        #[arg(long, help = "Print detections as JSON")]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn split_pair<'a>(raw: &'a str, delimiter: char, what: &str) -> Result<(&'a str, &'a str)> {
    match raw.split_once(delimiter) {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => bail!("invalid {what} `{raw}`, expected NAME{delimiter}VALUE"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Update { url, output, timeout } => {
            let mut builder = ConfigManager::custom()
                .catalog_path(output)
                .http_timeout(timeout)
                .verbose(cli.verbose);
            if let Some(url) = url {
                builder = builder.catalog_url(url);
            }
            let config = builder.build();

            let path = CatalogFetcher::download(&config)
                .await
                .with_context(|| format!("failed to download catalog from {}", config.catalog_url))?;
            println!("catalog saved to {}", path.display());
        }
        Commands::Detect { catalog, urls, headers, cookies, meta, html, json } => {
            let loaded = CatalogLoader::load_file(&catalog)
                .await
                .with_context(|| format!("failed to load catalog {}", catalog.display()))?;
            let detector = TechDetector::new(loaded);

            let mut evidence = Evidence::new();
            for url in urls {
                evidence = evidence.with_url(url);
            }
            for raw in &headers {
                let (name, value) = split_pair(raw, ':', "header")?;
                evidence = evidence.with_header(name, value);
            }
            for raw in &cookies {
                let (name, value) = split_pair(raw, '=', "cookie")?;
                evidence = evidence.with_cookie(name, value);
            }
            for raw in &meta {
                let (name, content) = split_pair(raw, '=', "meta")?;
                evidence = evidence.with_meta(name, content);
            }
            if let Some(path) = html {
                let body = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                evidence = evidence.with_html(String::from_utf8_lossy(&body));
            }

            let detections = detector.detect(&evidence);
            if json {
                println!("{}", serde_json::to_string_pretty(&detections)?);
            } else {
                for detection in detections {
                    println!("{detection}");
                }
            }
        }
    }

    Ok(())
}
