//! Command-line entry point for the shopping app.
//!
//! # Responsibility
//! - Parse flags and `SHOPPING_*` environment fallbacks.
//! - Open the database and hand it to the HTTP server or the seeders.
//!
//! # Invariants
//! - Every subcommand opens the database through `open_db`, so migrations
//!   have run before any other work.
//! - File logging starts only when a log directory is configured.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use shopping_api::{build_router, ApiConfig, AppState};
use shopping_core::db::migrations::{current_version, latest_version};
use shopping_core::seed::{create_staff, populate, PopulateOptions};
use shopping_core::{init_logging, open_db, LogSettings};
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;

/// Shopping lists, stores, items and budgets over a JSON API.
#[derive(Parser)]
#[command(name = "shopping")]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "SHOPPING_DB_PATH", default_value = "shopping.db")]
    db_path: PathBuf,

    /// Absolute directory for rotated log files; file logging is off when unset
    #[arg(long, global = true, env = "SHOPPING_LOG_DIR")]
    log_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SHOPPING_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API until Ctrl-C
    Serve(ServeArgs),
    /// Apply pending migrations and print the schema version
    Migrate,
    /// Seed demo users, stores and items
    Populate(PopulateArgs),
    /// Create a staff account for the admin endpoints
    CreateStaff(CreateStaffArgs),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Serve(_) => "serve",
            Self::Migrate => "migrate",
            Self::Populate(_) => "populate",
            Self::CreateStaff(_) => "create-staff",
        }
    }
}

#[derive(Args)]
struct ServeArgs {
    /// Socket address to listen on
    #[arg(long, env = "SHOPPING_BIND", default_value = "127.0.0.1:8000")]
    bind: String,

    /// Session lifetime in seconds
    #[arg(long, env = "SHOPPING_SESSION_TTL_SECS", default_value_t = 1_209_600)]
    session_ttl_secs: u64,

    /// Mark the session cookie `Secure`
    #[arg(long, env = "SHOPPING_SECURE_COOKIES")]
    secure_cookies: bool,
}

#[derive(Args)]
struct PopulateArgs {
    /// Number of bulk stores next to the base store
    #[arg(long, default_value_t = PopulateOptions::default().stores)]
    stores: u32,

    /// Number of items per bulk store
    #[arg(long, default_value_t = PopulateOptions::default().items_per_store)]
    items_per_store: u32,
}

#[derive(Args)]
struct CreateStaffArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let settings = LogSettings::new(cli.log_level.as_deref(), log_dir)?;
        init_logging(&settings, cli.command.name(), &cli.db_path)?;
    }

    match cli.command {
        Command::Serve(args) => serve(&cli.db_path, args).await,
        Command::Migrate => migrate(&cli.db_path),
        Command::Populate(args) => seed(&cli.db_path, args),
        Command::CreateStaff(args) => staff(&cli.db_path, args),
    }
}

async fn serve(db_path: &Path, args: ServeArgs) -> Result<()> {
    let conn = open_db(db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let config = ApiConfig::default()
        .with_session_ttl_secs(args.session_ttl_secs)
        .with_secure_cookies(args.secure_cookies);
    let router = build_router(AppState::new(conn, config));

    let listener = TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind `{}`", args.bind))?;
    info!(
        "event=server_start module=cli status=ok bind={} db_path={} session_ttl_secs={} secure_cookies={}",
        args.bind,
        db_path.display(),
        args.session_ttl_secs,
        args.secure_cookies
    );
    println!("listening on http://{}", args.bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("event=server_stop module=cli status=ok bind={}", args.bind);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=server_stop module=cli status=error reason=signal_listener error={err}");
    }
}

fn migrate(db_path: &Path) -> Result<()> {
    let conn = open_db(db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let version = current_version(&conn)?;
    info!(
        "event=db_migrate module=cli status=ok db_path={} version={version}",
        db_path.display()
    );
    println!("schema version {version} (latest {})", latest_version());
    Ok(())
}

fn seed(db_path: &Path, args: PopulateArgs) -> Result<()> {
    let mut conn = open_db(db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let report = populate(
        &mut conn,
        PopulateOptions {
            stores: args.stores,
            items_per_store: args.items_per_store,
        },
    )
    .context("failed to seed demo data")?;
    println!(
        "created {} users, {} stores, {} items",
        report.users_created, report.stores_created, report.items_created
    );
    Ok(())
}

fn staff(db_path: &Path, args: CreateStaffArgs) -> Result<()> {
    let conn = open_db(db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let user = create_staff(&conn, &args.username, &args.email, &args.password)
        .context("failed to create staff account")?;
    println!("created staff user `{}` (id {})", user.username, user.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn serve_defaults_apply_without_flags() {
        let cli = Cli::try_parse_from(["shopping", "serve"]).unwrap();
        assert_eq!(cli.db_path.to_str(), Some("shopping.db"));
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.session_ttl_secs, 1_209_600);
        assert!(!args.secure_cookies);
    }

    #[test]
    fn populate_accepts_catalogue_sizes_and_global_db_path() {
        let cli = Cli::try_parse_from([
            "shopping",
            "populate",
            "--stores",
            "3",
            "--items-per-store",
            "2",
            "--db-path",
            "/tmp/demo.db",
        ])
        .unwrap();
        assert_eq!(cli.db_path.to_str(), Some("/tmp/demo.db"));
        let Command::Populate(args) = cli.command else {
            panic!("expected populate");
        };
        assert_eq!((args.stores, args.items_per_store), (3, 2));
    }

    #[test]
    fn command_names_match_the_subcommands() {
        let cli = Cli::try_parse_from([
            "shopping",
            "create-staff",
            "--username",
            "a",
            "--email",
            "a@b.co",
            "--password",
            "p",
        ])
        .unwrap();
        assert_eq!(cli.command.name(), "create-staff");
        let cli = Cli::try_parse_from(["shopping", "migrate"]).unwrap();
        assert_eq!(cli.command.name(), "migrate");
    }

    #[test]
    fn create_staff_requires_all_fields() {
        assert!(Cli::try_parse_from(["shopping", "create-staff", "--username", "a"]).is_err());
    }
}
