use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use shoutbox_api::auth::{self, AppState, AppStateInner};
use shoutbox_api::messages;
use shoutbox_api::middleware::identify;
use shoutbox_core::{AccountService, MessageStore};
use shoutbox_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shoutbox=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("SHOUTBOX_DB_PATH").unwrap_or_else(|_| "shoutbox.db".into());
    let host = std::env::var("SHOUTBOX_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("SHOUTBOX_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database and shared state
    let db = Arc::new(Database::open(&PathBuf::from(&db_path))?);
    let state: AppState = Arc::new(AppStateInner {
        accounts: AccountService::new(db.clone()),
        store: MessageStore::new(db.clone()),
    });

    bootstrap_user(&state, &db)?;

    // Routes. The board listing and login are open; every other operation
    // receives the resolved `Caller` and the store itself rejects anonymous
    // mutation, so there is no second authorization path to keep in sync.
    let app = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/messages", get(messages::list).post(messages::create))
        .route("/messages/mine", get(messages::list_owned))
        .route("/messages/{id}", put(messages::edit).delete(messages::remove))
        .layer(middleware::from_fn_with_state(state.clone(), identify))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Shoutbox listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Seed the first account from `SHOUTBOX_BOOTSTRAP_USER` ("name:password")
/// when the user table is empty. Registration has no public surface, so
/// this is how a fresh install gets its first login.
fn bootstrap_user(state: &AppState, db: &Database) -> anyhow::Result<()> {
    let Ok(spec) = std::env::var("SHOUTBOX_BOOTSTRAP_USER") else {
        return Ok(());
    };
    let Some((name, password)) = spec.split_once(':') else {
        anyhow::bail!("SHOUTBOX_BOOTSTRAP_USER must look like name:password");
    };

    if db.count_users()? > 0 {
        info!("User table already populated, skipping bootstrap");
        return Ok(());
    }

    let user = state.accounts.provision_user(name, password)?;
    info!("Bootstrapped user '{}' (id {})", user.username, user.id);
    Ok(())
}
