use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

use lecture_search::{
    render_load_error, render_stats, Catalog, ChapterFilter, Config, Debouncer, RenderedPage, SearchRequest,
    SearchSession,
};

#[derive(Parser)]
#[command(name = "lecture-search")]
#[command(version, about = "Search lecture chapters and highlight transcript excerpts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Explicit TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog path or http(s) URL, overrides the configured source
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single query and print the rendered results
    Search {
        /// Query words, joined with spaces
        query: Vec<String>,
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,
        /// Render at most this many results
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Read queries from stdin, rendering after each quiet period
    Interactive {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,
    },
    /// List courses and semesters with chapter counts
    Courses,
    /// Serve the search API over HTTP
    #[cfg(feature = "api")]
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(clap::Args, Clone)]
struct FilterArgs {
    /// Only show chapters of this course (repeatable)
    #[arg(long = "course")]
    courses: Vec<String>,
    /// Only show chapters of this semester (repeatable)
    #[arg(long = "semester")]
    semesters: Vec<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> ChapterFilter {
        let mut filter = ChapterFilter::all();
        if !self.courses.is_empty() {
            filter = filter.with_courses(self.courses.iter().cloned());
        }
        if !self.semesters.is_empty() {
            filter = filter.with_semesters(self.semesters.iter().cloned());
        }
        filter
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Html,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };
    if let Some(source) = &cli.catalog {
        config.catalog.source = source.clone();
    }

    // Initialize logging
    let filter = if cli.verbose {
        "lecture_search=debug,info".to_string()
    } else {
        config.logging.log_level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.verbose {
        info!("Verbose logging enabled");
    }

    config.validate()?;
    debug!("{}", config.summary());
    info!("🚀 Lecture search starting...");
    info!("📚 Catalog source: {}", config.catalog.source);

    let catalog = match Catalog::load(&config.catalog.source, config.catalog.request_timeout_seconds).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("❌ Failed to load catalog: {}", e);
            println!("{}", render_load_error(&e.to_string()));
            return Err(e.into());
        }
    };
    info!("📖 Loaded {} chapters", catalog.len());

    match cli.command {
        Commands::Search {
            query,
            filter,
            format,
            limit,
        } => {
            let session = SearchSession::new(catalog, &config);
            let request = SearchRequest::new(query.join(" "), filter.to_filter());
            let page = run_limited(&session, &request, limit);
            print_page(&page, format)?;
        }
        Commands::Interactive { filter, format } => {
            let session = Arc::new(SearchSession::new(catalog, &config));
            run_interactive(session, filter.to_filter(), format, config.interactive.debounce_ms).await?;
        }
        Commands::Courses => {
            let counts = catalog.course_counts();
            println!("Courses:");
            for (course, count) in &counts {
                println!("  {:<12} {} chapters", course, count);
            }

            let semesters = catalog.semester_counts();
            if !semesters.is_empty() {
                println!("Semesters:");
                for (semester, count) in &semesters {
                    println!("  {:<12} {} chapters", semester, count);
                }
            }
        }
        #[cfg(feature = "api")]
        Commands::Serve { port } => {
            let session = Arc::new(SearchSession::new(catalog, &config));
            let port = port.unwrap_or(config.server.port);
            let server = lecture_search::api::ApiServer::new(session, port).start_background();
            info!("🌐 Serving on port {} (Ctrl+C to stop)", port);

            tokio::select! {
                result = server => result??,
                _ = tokio::signal::ctrl_c() => info!("🛑 Shutting down"),
            }
        }
    }

    Ok(())
}

/// Search, then render at most `limit` results while the stats keep the full count
fn run_limited(session: &SearchSession, request: &SearchRequest, limit: Option<usize>) -> RenderedPage {
    let mut outcome = session.search(request);
    let shown = outcome.shown();
    if let Some(limit) = limit {
        outcome.items.truncate(limit);
    }

    let mut page = session.render(&outcome);
    page.stats = render_stats(shown, outcome.total, &outcome.query, outcome.all_filters_enabled);
    page.shown = shown;
    page
}

fn print_page(page: &RenderedPage, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Html => {
            println!("{}", page.stats);
            println!("{}", page.results);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(page)?),
    }
    Ok(())
}

/// Every line reschedules the search; only the last one before a pause renders
async fn run_interactive(
    session: Arc<SearchSession>,
    filter: ChapterFilter,
    format: OutputFormat,
    debounce_ms: u64,
) -> Result<()> {
    let initial = session.run(&SearchRequest::new("", filter.clone()));
    println!("{}", initial.stats);

    let mut debouncer = Debouncer::from_millis(debounce_ms);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("⌨️  Reading queries from stdin ({:?} debounce)", debouncer.delay());

    while let Some(line) = lines.next_line().await? {
        let session = Arc::clone(&session);
        let request = SearchRequest::new(line, filter.clone());
        debouncer.schedule(async move {
            let page = session.run(&request);
            if let Err(e) = print_page(&page, format) {
                warn!("Failed to print results: {}", e);
            }
        });
    }

    // Input closed, let the last query render
    debouncer.flush().await;
    Ok(())
}
