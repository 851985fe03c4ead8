//! pact-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `PACT_*` environment variables, installs the signing key, opens the SQLite
//! store, and serves the owner API and signing pages over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `auth_password_hash`:
//!
//! ```text
//! cargo run -p pact-server -- --hash-password
//! ```

use std::{
  net::SocketAddr,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use pact_server::{AppState, ServerConfig, auth::AuthConfig, webhook::WebhookNotifier};
use pact_signing::{ContractSigningWorkflow, SigningSecret, keyring};
use pact_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Pact contract signing server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PACT"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if !(1..=pact_server::MAX_TOKEN_TTL_HOURS).contains(&server_cfg.token_ttl_hours) {
    anyhow::bail!(
      "token_ttl_hours must be between 1 and {}",
      pact_server::MAX_TOKEN_TTL_HOURS
    );
  }

  // No default key exists; refuse to start without a strong one.
  let secret = SigningSecret::new(server_cfg.signing_secret.clone().into_bytes())
    .context("signing_secret is not usable")?;
  let engine = keyring::initialize(secret).context("failed to install signing key")?;

  let notifier = server_cfg
    .webhook()?
    .map(WebhookNotifier::new)
    .transpose()
    .context("failed to build webhook client")?;
  if notifier.is_some() {
    tracing::info!("signing webhook enabled");
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let workflow = ContractSigningWorkflow::new(store.clone(), store, engine.clone())
    .with_notifier(notifier);

  if server_cfg.trusted_proxy {
    tracing::info!("taking signer IPs from X-Forwarded-For");
  }

  let state = AppState {
    workflow:      Arc::new(workflow),
    auth:          Arc::new(AuthConfig {
      username:      server_cfg.auth_username.clone(),
      password_hash: server_cfg.auth_password_hash.clone(),
    }),
    token_ttl:     server_cfg.token_ttl(),
    trusted_proxy: server_cfg.trusted_proxy,
  };

  let app = pact_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  // Socket addresses back the signer IP when no proxy header is present.
  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
    .await
    .context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
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
