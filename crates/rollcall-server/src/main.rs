//! rollcall-server binary.
//!
//! Loads configuration, opens the SQLite store behind the query cache, seeds
//! the configured subjects and serves the JSON API.
//!
//! Settings come from `config.toml` (or `--config <path>`), overridden by
//! `ROLLCALL_*` environment variables such as `ROLLCALL_PORT=9000`.
//!
//! `rollcall-server --hash-password` reads a password from stdin and prints
//! the argon2 PHC string to paste into a `[[users]]` entry.

use std::{
  io::{self, BufRead, Write},
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, anyhow};
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use rollcall_core::cache::CachedStore;
use rollcall_server::{AppState, ServerConfig, auth::AuthConfig, router, seed_subjects};
use rollcall_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Rollcall attendance server")]
struct Cli {
  /// TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Hash a password read from stdin, print it and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  init_tracing();
  let cli = Cli::parse();

  if cli.hash_password {
    println!("{}", hash_password()?);
    return Ok(());
  }

  let cfg = load_config(&cli.config)?;
  if cfg.users.is_empty() {
    warn!("no users configured; every API request will be rejected");
  }

  let path = expand_home(&cfg.store_path);
  let sqlite = SqliteStore::open(&path)
    .await
    .with_context(|| format!("opening store at {}", path.display()))?;
  let store = CachedStore::with_config(sqlite, cfg.cache);

  let seeded = seed_subjects(&store, &cfg.subjects)
    .await
    .context("seeding subjects")?;
  info!(seeded, store = %path.display(), "store ready");

  let app = router(AppState {
    store: Arc::new(store),
    auth:  Arc::new(AuthConfig { users: cfg.users }),
  });

  let addr = format!("{}:{}", cfg.host, cfg.port);
  let listener = TcpListener::bind(&addr)
    .await
    .with_context(|| format!("binding {addr}"))?;
  info!(%addr, "serving rollcall api");

  axum::serve(listener, app).await.context("serving http")
}

fn init_tracing() {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("ROLLCALL"))
    .build()
    .with_context(|| format!("reading {}", path.display()))?
    .try_deserialize()
    .context("invalid server configuration")
}

fn hash_password() -> anyhow::Result<String> {
  eprint!("Password: ");
  io::stderr().flush().ok();

  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']);

  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow!("argon2: {e}"))?;
  Ok(hash.to_string())
}

/// `~/x` becomes `$HOME/x`; anything else is returned unchanged.
fn expand_home(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
