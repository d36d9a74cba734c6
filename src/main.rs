use anyhow::Context;
use article_rec::catalog::{self, Catalog};
use article_rec::config::AppConfig;
use article_rec::server::{self, AppState};
use article_rec::telemetry::init_tracing;
use article_rec::{Recommendations, RecommenderError, RemoteClient};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "article-rec", version, about = "Content-based article recommendations")]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./recommender.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the articles most similar to one article.
    Recommend {
        id: i64,
        #[arg(short, long)]
        n: Option<usize>,
        /// Ask a running server instead of loading data locally.
        #[arg(long)]
        remote: Option<String>,
    },
    /// Answer `<id> [n]` lines read from stdin until EOF.
    Interactive,
    /// Serve `GET /recommend/{id}?n=` over HTTP.
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
}

fn load_catalog(config: &AppConfig) -> anyhow::Result<Arc<Catalog>> {
    catalog::global()
        .get_or_load(|| Catalog::load(&config.data))
        .with_context(|| format!("failed to load catalog from {}", config.data.articles.display()))
}

fn render(result: &Recommendations) {
    println!("Because you read: {}", result.query_title);
    if result.is_empty() {
        println!("  (no other articles to recommend)");
    }
    for (rank, rec) in result.recommendations.iter().enumerate() {
        println!("  {}. {} [{}] score {:.4}", rank + 1, rec.title, rec.id, rec.display_score());
    }
}

/// Per-request failures become messages; anything else is propagated.
fn report(err: RecommenderError) -> anyhow::Result<()> {
    match err {
        RecommenderError::NotFound(id) => {
            eprintln!("No article with id {}.", id);
            Ok(())
        }
        RecommenderError::InvalidArgument(msg) => {
            eprintln!("Invalid request: {}.", msg);
            Ok(())
        }
        other => Err(other.into()),
    }
}

fn run_recommend(config: &AppConfig, id: i64, n: Option<usize>, remote: Option<String>) -> anyhow::Result<ExitCode> {
    let top_n = n.unwrap_or(config.default_top_n);
    let outcome = match remote {
        Some(url) => RemoteClient::new(url)?.recommend(id, top_n),
        None => load_catalog(config)?.recommender().recommend(id, top_n),
    };

    match outcome {
        Ok(result) => {
            render(&result);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report(err)?;
            Ok(ExitCode::from(2))
        }
    }
}

fn parse_request(line: &str, default_top_n: usize) -> Result<(i64, usize), String> {
    let mut parts = line.split_whitespace();
    let id = parts
        .next()
        .ok_or_else(|| "expected `<id> [n]`".to_string())?
        .parse::<i64>()
        .map_err(|e| format!("bad id: {}", e))?;
    let top_n = match parts.next() {
        Some(raw) => raw.parse::<usize>().map_err(|e| format!("bad count: {}", e))?,
        None => default_top_n,
    };
    Ok((id, top_n))
}

fn run_interactive(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let catalog = load_catalog(config)?;
    let recommender = catalog.recommender();
    println!(
        "{} articles loaded. Enter `<id> [n]`, or an empty line to quit.",
        catalog.len()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        if line.trim().is_empty() {
            break;
        }

        match parse_request(&line, config.default_top_n) {
            Ok((id, top_n)) => match recommender.recommend(id, top_n) {
                Ok(result) => render(&result),
                Err(err) => report(err)?,
            },
            Err(msg) => eprintln!("{}", msg),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_serve(config: &AppConfig, bind: Option<String>) -> anyhow::Result<ExitCode> {
    let catalog = load_catalog(config)?;
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    server::run(AppState::new(catalog, config.default_top_n), &bind)?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Recommend { id, n, remote } => run_recommend(&config, id, n, remote),
        Command::Interactive => run_interactive(&config),
        Command::Serve { bind } => run_serve(&config, bind),
    }
}
