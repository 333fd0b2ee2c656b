//! jokelist CLI — vote on and refresh a persisted list of jokes.
//!
//! Usage:
//!   jokelist [--db path] show
//!   jokelist refresh [--count N]
//!   jokelist vote <id> <up|down>
//!   jokelist lock|unlock <id>

use clap::{Parser, Subcommand};
use jokelist::{
    Config, HttpJokeSource, JokeId, OpenStore, RefillOutcome, Session, SessionError, SqliteStore,
    StateStore, Vote,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "jokelist", version, about = "Vote on, lock and refresh a list of jokes")]
struct Cli {
    /// Path to SQLite database file
    #[arg(long, global = true, env = "JOKELIST_DB")]
    db: Option<PathBuf>,
    /// Joke endpoint (must answer JSON with `id` and `joke`)
    #[arg(long, global = true, env = "JOKELIST_ENDPOINT")]
    endpoint: Option<String>,
    /// Number of jokes a refresh collects
    #[arg(long, global = true, env = "JOKELIST_COUNT")]
    count: Option<usize>,
    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "JOKELIST_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
    /// Retry duplicate jokes forever instead of giving up after a streak
    #[arg(long, global = true)]
    unbounded: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List jokes, best first (fetches a list on first use)
    Show,
    /// Replace every unlocked joke with fresh ones
    Refresh,
    /// Vote a joke up or down
    Vote {
        id: String,
        /// `up` or `down`
        direction: Vote,
    },
    /// Set every joke's votes back to zero
    ResetVotes,
    /// Keep a joke across refreshes
    Lock { id: String },
    /// Let a refresh replace a joke again
    Unlock { id: String },
    /// Forget all jokes and locks
    Clear,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("JOKELIST_LOG")
        .unwrap_or_else(|_| EnvFilter::new("jokelist=info,warn"));

    let format = env::var("JOKELIST_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn build_config(cli: &Cli) -> Config {
    let mut config = Config::default();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(count) = cli.count {
        config.num_jokes = count;
    }
    if let Some(secs) = cli.timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if cli.unbounded {
        config.max_duplicate_streak = None;
    }
    config
}

fn open_session(config: &Config) -> anyhow::Result<Session> {
    let store = SqliteStore::open(&config.db_path).map_err(|e| {
        anyhow::anyhow!("failed to open database at {}: {}", config.db_path.display(), e)
    })?;
    Ok(Session::open(StateStore::new(Arc::new(store)), config.num_jokes)
        .with_policy(config.refill_policy()))
}

fn print_jokes(session: &Session) {
    let jokes = session.view();
    if jokes.is_empty() {
        println!("No jokes yet. Run `jokelist refresh`.");
        return;
    }
    for joke in jokes {
        let marker = if session.is_locked(&joke.id) { "[locked]" } else { "        " };
        println!("{:>5}  {}  {:<13}  {}", joke.votes, marker, joke.id, joke.text);
    }
}

/// Refresh and report. Returns false when the refresh failed or was not saved.
async fn cmd_refresh(session: &Session, source: &HttpJokeSource) -> bool {
    match session.request_refill(source).await {
        Ok(RefillOutcome::Applied(_)) => true,
        Ok(RefillOutcome::Superseded) => {
            eprintln!("Refresh superseded by a newer one");
            true
        }
        Err(SessionError::Storage(e)) => {
            eprintln!("Warning: jokes refreshed but not saved: {}", e);
            eprintln!("The next run will show the previous list.");
            false
        }
        Err(e) => {
            eprintln!("Error: could not refresh jokes: {}", e);
            eprintln!("Keeping the previous list.");
            false
        }
    }
}

fn report_write(result: jokelist::StorageResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Warning: change applied but not saved: {}", e);
            1
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = build_config(&cli);
    config.validate()?;
    let session = open_session(&config)?;

    let code = match cli.command {
        Commands::Show => {
            let mut code = 0;
            if session.needs_initial_refill() {
                let source = HttpJokeSource::new(&config.endpoint, config.request_timeout)?;
                if !cmd_refresh(&session, &source).await {
                    code = 1;
                }
            }
            print_jokes(&session);
            code
        }
        Commands::Refresh => {
            let source = HttpJokeSource::new(&config.endpoint, config.request_timeout)?;
            let code = if cmd_refresh(&session, &source).await { 0 } else { 1 };
            print_jokes(&session);
            code
        }
        Commands::Vote { id, direction } => {
            let id = JokeId::from(id);
            if !session.jokes().iter().any(|j| j.id == id) {
                eprintln!("Error: no joke with id '{}'", id);
                return Ok(1);
            }
            let code = report_write(session.vote(&id, direction));
            print_jokes(&session);
            code
        }
        Commands::ResetVotes => {
            let code = report_write(session.reset_votes());
            print_jokes(&session);
            code
        }
        Commands::Lock { id } => {
            let code = report_write(session.lock(&JokeId::from(id)));
            print_jokes(&session);
            code
        }
        Commands::Unlock { id } => {
            let code = report_write(session.unlock(&JokeId::from(id)));
            print_jokes(&session);
            code
        }
        Commands::Clear => {
            if session.clear()? {
                println!("Cleared saved jokes and locks");
            } else {
                println!("Nothing to clear");
            }
            0
        }
    };
    Ok(code)
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let code = match rt.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}
