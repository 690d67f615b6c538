//! Code Timeline - every revision of one file, with the lines each revision changed
//!
//! # Usage
//! ```bash
//! code-timeline src/main.rs              # Print the timeline as JSON
//! code-timeline src/main.rs --pretty     # Indented JSON
//! code-timeline src/main.rs --plain      # No syntax colouring
//! code-timeline serve ~/myproject        # Serve timelines over HTTP
//! ```

mod error;
mod git;
mod models;
mod routes;
mod timeline;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use error::AppError;
use routes::AppState;
use timeline::highlight::Highlighter;
use timeline::{HtmlHighlighter, SyntectHighlighter, TimelineAssembler, TimelineOptions};

/// Code Timeline - Follow a file through its git history
#[derive(Parser)]
#[command(name = "code-timeline")]
#[command(about = "Reconstruct every revision of a file with per-revision line highlights", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// File to build the timeline for
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Worker threads for per-revision blame (defaults to available cores)
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Escape source without syntax colouring
    #[arg(long, global = true)]
    plain: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve timelines over HTTP for files under ROOT
    Serve {
        /// Directory whose files may be requested
        #[arg(value_name = "ROOT", default_value = ".")]
        root: PathBuf,

        /// Port to run the server on
        #[arg(short, long, default_value = "3001")]
        port: u16,
    },
}

fn build_assembler(jobs: Option<usize>, plain: bool) -> error::Result<TimelineAssembler> {
    let mut options = TimelineOptions::default();
    if let Some(jobs) = jobs {
        options.jobs = jobs;
    }

    let highlighter: Arc<dyn Highlighter> = if plain {
        Arc::new(HtmlHighlighter)
    } else {
        Arc::new(SyntectHighlighter::new()?)
    };
    TimelineAssembler::new(options, highlighter)
}

fn report_error(err: &AppError) {
    match err {
        AppError::DirtyWorkingTree(_) => eprintln!("✗ ERROR: {}", err),
        _ => eprintln!("✗ {}", err),
    }
}

fn run_timeline(file: &Path, jobs: Option<usize>, plain: bool, pretty: bool) -> anyhow::Result<()> {
    // Only resolves against the cwd; never changes it.
    let file = std::path::absolute(file)?;

    let timeline = match build_assembler(jobs, plain).and_then(|a| a.assemble(&file)) {
        Ok(t) => t,
        Err(e) => {
            report_error(&e);
            std::process::exit(1);
        }
    };

    let json = if pretty {
        serde_json::to_string_pretty(&timeline)?
    } else {
        serde_json::to_string(&timeline)?
    };
    println!("{}", json);
    Ok(())
}

async fn run_server(root: &Path, port: u16, jobs: Option<usize>, plain: bool) -> anyhow::Result<()> {
    let root = match std::fs::canonicalize(root) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("✗ Cannot serve {}: {}", root.display(), e);
            std::process::exit(1);
        }
    };

    let assembler = match build_assembler(jobs, plain) {
        Ok(a) => a,
        Err(e) => {
            report_error(&e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        root: root.clone(),
        assembler: Arc::new(assembler),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("127.0.0.1:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to port {}: {}", port, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    println!();
    println!("  Code Timeline");
    println!();
    println!("  Root:   {}", root.display());
    println!("  Server: http://{}", addr);
    println!("  Try:    http://{}/api/v1/timeline?path=<file>", addr);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (quiet unless RUST_LOG says otherwise)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Some(Commands::Serve { root, port }) => run_server(&root, port, cli.jobs, cli.plain).await,
        None => {
            let file = cli.file.unwrap_or_else(|| {
                eprintln!("Usage: code-timeline <FILE> [--pretty] [--plain] [--jobs N]");
                eprintln!("       code-timeline serve [ROOT] [--port PORT]");
                std::process::exit(1);
            });
            // Blame work is blocking; keep it off the async worker threads.
            tokio::task::spawn_blocking(move || run_timeline(&file, cli.jobs, cli.plain, cli.pretty)).await?
        }
    }
}
