//! hireboard-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered with
//! `HIREBOARD_*` environment variables, opens the SQLite store, and serves the
//! analytics API over HTTP.
//!
//! # Development tokens
//!
//! To mint a bearer token signed with the configured secret:
//!
//! ```sh
//! cargo run -p hireboard-server -- issue-token --role recruiter --user-id 42
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use hireboard_core::identity::{IdentityClaims, Role};
use hireboard_server::{AppState, ServerConfig, auth::AuthConfig};
use hireboard_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Hireboard recruiter analytics server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Print a signed bearer token for the given identity and exit.
  IssueToken {
    /// `candidate`, `student` or `recruiter`.
    #[arg(long)]
    role:    String,
    #[arg(long)]
    user_id: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8000)?
    .set_default("store_path", "hireboard.db")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("HIREBOARD"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.jwt_secret.is_empty() {
    anyhow::bail!("jwt_secret must not be empty");
  }

  let auth = AuthConfig::from_secret(&server_cfg.jwt_secret, server_cfg.token_ttl_minutes);

  // Helper mode: mint a token and exit.
  if let Some(Command::IssueToken { role, user_id }) = cli.command {
    let role = Role::from(role.as_str());
    if role == Role::Unknown {
      anyhow::bail!("unknown role; expected candidate, student or recruiter");
    }
    let claims = IdentityClaims {
      user_id: Some(user_id),
      role: Some(role),
      ..IdentityClaims::default()
    };
    println!("{}", auth.issue_token(claims).context("failed to sign token")?);
    return Ok(());
  }

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Build application state.
  let state = AppState {
    store:  Arc::new(store),
    auth:   Arc::new(auth),
    config: Arc::new(server_cfg.clone()),
  };

  let app = hireboard_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
