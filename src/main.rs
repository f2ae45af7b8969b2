// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use recoll_mcp::mcp::{
    ListRecentFilesParams, RecollSearchMcp, SearchByDateParams, SearchByFiletypeParams,
    SearchFilesystemParams, ToolDispatcher,
};
use recoll_mcp::utils::logging::{format_error, format_hit, format_success, format_warning};
use recoll_mcp::{
    Config, HealthCheck, HealthReport, IndexGateway, RecollEngine, SearchResponse,
};
use rmcp::ServiceExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "recoll_mcp")]
#[command(author = "cipher")]
#[command(version)]
#[command(about = "MCP server exposing a Recoll full-text index as search tools", long_about = None)]
struct Cli {
    /// Configuration file; `config/default.toml` is used when present
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the search tools over MCP (default)
    Serve {
        #[arg(long, default_value = "stdio")]
        transport: String,
    },

    /// Run one search against the index and print the hits
    Search {
        query: Option<String>,

        #[arg(short, long)]
        limit: Option<i64>,

        /// File type alias or mimetype
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        filetype: Option<String>,

        /// Earliest modification date, YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,

        /// Latest modification date, YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
    },

    /// List recently modified files
    Recent {
        #[arg(short, long)]
        limit: Option<i64>,

        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Check that the index can be opened and queried
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    recoll_mcp::utils::logging::init_logger(cli.color, cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let engine = RecollEngine::from_config(&config.index)
        .context("Failed to resolve the Recoll configuration directory")?;
    info!("Using Recoll configuration at {}", engine.confdir().display());

    let gateway = Arc::new(IndexGateway::new(engine, config.index.query_timeout()));
    let dispatcher = ToolDispatcher::new(Arc::clone(&gateway), config.limits.clone());

    match cli.command.unwrap_or(Commands::Serve {
        transport: "stdio".to_string(),
    }) {
        Commands::Serve { transport } => {
            cmd_serve(dispatcher, &transport).await?;
        }
        Commands::Search {
            query,
            limit,
            filetype,
            from,
            to,
        } => {
            cmd_search(&dispatcher, query, limit, filetype, from, to).await?;
        }
        Commands::Recent { limit, days } => {
            let response = dispatcher
                .list_recent_files(ListRecentFilesParams {
                    max_results: limit,
                    days,
                })
                .await?;
            print_response(&response);
        }
        Commands::Check => {
            cmd_check(&gateway).await?;
        }
    }

    Ok(())
}

async fn cmd_serve(dispatcher: ToolDispatcher, transport: &str) -> Result<()> {
    info!("Starting MCP server (transport: {})", transport);

    if transport != "stdio" {
        error!("Only stdio transport is currently supported");
        bail!("Unsupported transport: {}", transport);
    }

    dispatcher
        .gateway()
        .probe()
        .await
        .context("Recoll index is not available")?;

    let mcp_server = RecollSearchMcp::new(dispatcher);

    info!("MCP server ready. Available tools:");
    for tool in mcp_server.get_tool_router().list_all() {
        info!("  - {}", tool.name);
    }

    let service = mcp_server
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start MCP stdio transport")?;
    service.waiting().await?;

    info!("MCP server shut down");
    Ok(())
}

async fn cmd_search(
    dispatcher: &ToolDispatcher,
    query: Option<String>,
    limit: Option<i64>,
    filetype: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    let response = if from.is_some() || to.is_some() {
        dispatcher
            .search_by_date(SearchByDateParams {
                query,
                date_from: from,
                date_to: to,
                max_results: limit,
            })
            .await?
    } else if let Some(filetype) = filetype {
        dispatcher
            .search_by_filetype(SearchByFiletypeParams {
                query,
                filetype,
                max_results: limit,
            })
            .await?
    } else {
        dispatcher
            .search_filesystem(SearchFilesystemParams {
                query: query.unwrap_or_default(),
                max_results: limit,
                include_preview: Some(true),
            })
            .await?
    };

    print_response(&response);
    Ok(())
}

fn print_response(response: &SearchResponse) {
    println!("Query: {}", response.query);

    if response.results.is_empty() {
        println!("{}", format_warning("No matching documents"));
        return;
    }

    for (rank, item) in response.results.iter().enumerate() {
        println!("{}", format_hit(rank + 1, &item.format_summary()));
        if let Some(snippet) = &item.snippet {
            println!("      {}", snippet.replace('\n', " "));
        }
    }

    let total = response
        .total_results
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string());
    println!(
        "{}",
        format_success(&format!("{} of {} results", response.returned_results, total))
    );
}

async fn cmd_check(gateway: &IndexGateway) -> Result<()> {
    let mut checks = Vec::new();

    let start = Instant::now();
    match gateway.probe().await {
        Ok(()) => checks.push(HealthCheck::healthy("index session", start.elapsed())),
        Err(e) => checks.push(HealthCheck::unhealthy(
            "index session",
            e.to_string(),
            start.elapsed(),
        )),
    }

    let start = Instant::now();
    match gateway.recent(recoll_mcp::query::MATCH_ALL, 1).await {
        Ok(outcome) if outcome.records.is_empty() => checks.push(HealthCheck::degraded(
            "sample query",
            "index contains no documents".to_string(),
            start.elapsed(),
        )),
        Ok(_) => checks.push(HealthCheck::healthy("sample query", start.elapsed())),
        Err(e) => checks.push(HealthCheck::unhealthy(
            "sample query",
            e.to_string(),
            start.elapsed(),
        )),
    }

    let report = HealthReport::new(checks, env!("CARGO_PKG_VERSION").to_string());
    print!("{}", report.format());

    if !report.is_healthy() {
        eprintln!("{}", format_error("Recoll index is not usable"));
        bail!("health check failed for {}", gateway.engine_name());
    }

    Ok(())
}
