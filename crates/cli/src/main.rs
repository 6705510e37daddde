use std::fs;
use std::io::{self, Read};
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use gleaner_core::{GleanerConfig, GleanerConfigBuilder, PagePipeline, ProviderKind, SearchService, decode_html};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

use echo::{
    format_size, print_banner, print_info, print_step, print_success, print_timing, print_warning, render_outcome,
    render_response,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Search the web and extract article content
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(version)]
#[command(about = "Search the web and extract article content", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Page fetch timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the web and optionally fetch each result's article
    Search(SearchArgs),
    /// Extract the article from a URL, a local HTML file, or "-" for stdin
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Search query
    #[arg(value_name = "QUERY")]
    query: String,

    /// Query only this engine (serper, serpapi) instead of falling back in order
    #[arg(short, long, value_name = "ENGINE")]
    engine: Option<ProviderKind>,

    /// Replace snippets with extracted article text
    #[arg(short, long)]
    fetch_content: bool,

    /// Number of results
    #[arg(short, long, default_value = "10", value_name = "NUM")]
    num: usize,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Maximum characters of content kept
    #[arg(long, default_value = "3000", value_name = "NUM")]
    max_length: usize,

    /// Do not follow listing pages to their first article
    #[arg(long)]
    no_follow: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "gleaner_core=debug,gleaner=debug" } else { "gleaner_core=warn" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with_writer(io::stderr)
        .init();
}

fn base_config(cli: &Cli) -> GleanerConfigBuilder {
    let mut builder = GleanerConfigBuilder::from_config(GleanerConfig::from_env());
    if let Some(timeout) = cli.timeout {
        builder = builder.fetch_timeout(timeout);
    }
    builder
}

async fn run_search(cli: &Cli, args: &SearchArgs) -> anyhow::Result<()> {
    let config = base_config(cli).num_results(args.num).build();

    if cli.verbose {
        let configured: Vec<&str> = [
            (ProviderKind::Serper, config.providers.serper_api_key.is_some()),
            (ProviderKind::SerpApi, config.providers.serpapi_api_key.is_some()),
        ]
        .iter()
        .filter(|(_, has_key)| *has_key)
        .map(|(kind, _)| kind.as_str())
        .collect();

        if configured.is_empty() {
            print_warning("No API keys set (SERPER_API_KEY, SERPAPI_API_KEY)");
        } else {
            print_info(&format!("Engines with keys: {}", configured.join(", ")));
        }
        print_step(
            1,
            2,
            &format!("Searching for {}", args.query.bright_white().underline()),
        );
    }

    let service = SearchService::from_config(&config).context("Failed to initialise search service")?;

    let started = Instant::now();
    let response = service.perform_search(&args.query, args.engine, args.fetch_content).await;

    if cli.verbose {
        print_timing("Search", started.elapsed());
        let enriched = response.results.iter().filter(|r| r.full_content).count();
        print_step(2, 2, &format!("{} result(s), {} enriched", response.results.len(), enriched));
        eprintln!();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response).context("Failed to serialize response")?);
    } else {
        print!("{}", render_response(&response));
    }

    Ok(())
}

fn page_url(input: &str) -> Option<Url> {
    Url::parse(input).ok().filter(|url| matches!(url.scheme(), "http" | "https"))
}

async fn run_extract(cli: &Cli, args: &ExtractArgs) -> anyhow::Result<()> {
    let config = base_config(cli).max_content_length(args.max_length).follow_list_pages(!args.no_follow).build();
    let pipeline = PagePipeline::from_config(config.fetch, config.extract).context("Failed to initialise fetcher")?;

    if cli.verbose {
        print_step(1, 2, &format!("Reading {}", args.input.bright_white()));
    }

    let started = Instant::now();
    let outcome = if let Some(url) = page_url(&args.input) {
        pipeline.fetch_and_extract(url.as_str()).await
    } else {
        let bytes = if args.input == "-" {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer).context("Failed to read from stdin")?;
            buffer
        } else {
            fs::read(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
        };

        if cli.verbose {
            eprintln!("  {} {}", "Size:".dimmed(), format_size(bytes.len()).bright_white());
        }

        let html = decode_html(&bytes, None);
        pipeline.extract_html(&html, &args.input)
    };

    if cli.verbose {
        print_timing("Extraction", started.elapsed());
        print_step(2, 2, "Writing output");
        eprintln!();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?);
    } else {
        print!("{}", render_outcome(&outcome));
    }

    if !outcome.success {
        anyhow::bail!("No readable article extracted from {}", args.input);
    }

    if cli.verbose {
        print_success("Article extracted");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    match &cli.command {
        Command::Search(args) => run_search(&cli, args).await,
        Command::Extract(args) => run_extract(&cli, args).await,
    }
}
