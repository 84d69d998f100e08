//! Service entry-point: wires the REST endpoints and the WebSocket entry.

use actix_web::{web, App, HttpServer};
use clap::Parser;
use rand::RngCore;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use backend::bootstrap;
use backend::doc::openapi_json;
use backend::domain::DEFAULT_EVENT_CAPACITY;
use backend::inbound::http::api_scope;

/// Command-line and environment configuration.
#[derive(Debug, Parser)]
#[command(name = "backend", about = "Social content API service")]
struct Config {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: String,

    /// File holding the token-signing secret.
    #[arg(
        long,
        env = "TOKEN_SECRET_FILE",
        default_value = "/var/run/secrets/token_secret"
    )]
    token_secret_file: String,

    /// Allow an ephemeral signing secret when the file is unreadable
    /// (development only; issued tokens stop verifying on restart).
    #[arg(long, env = "TOKEN_ALLOW_EPHEMERAL", default_value_t = false)]
    allow_ephemeral_secret: bool,

    /// Per-topic event channel capacity.
    #[arg(long, env = "EVENT_CAPACITY", default_value_t = DEFAULT_EVENT_CAPACITY)]
    event_capacity: usize,
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = Config::parse();
    let secret = load_token_secret(&config)?;
    let state = bootstrap::build_state(secret, config.event_capacity);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(openapi_json)
            .service(api_scope())
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}

fn load_token_secret(config: &Config) -> std::io::Result<Vec<u8>> {
    match std::fs::read(&config.token_secret_file) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            if cfg!(debug_assertions) || config.allow_ephemeral_secret {
                warn!(
                    path = %config.token_secret_file,
                    error = %e,
                    "using temporary token secret (dev only)"
                );
                let mut secret = vec![0u8; 32];
                rand::thread_rng().fill_bytes(&mut secret);
                Ok(secret)
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read token secret at {}: {e}",
                    config.token_secret_file
                )))
            }
        }
    }
}
