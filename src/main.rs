use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use readme_game::{api, config, llm, state::AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "readme_game=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Read Me...");

    // Load the session record, upgrading older layouts in place
    let session_path = PathBuf::from(
        std::env::var("SESSION_CONFIG").unwrap_or_else(|_| "session.json".to_string()),
    );
    let (session, upgraded) = match config::load_session(&session_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::warn!(
                "Failed to load session from {}: {}. Starting with defaults.",
                session_path.display(),
                e
            );
            (config::SessionConfig::default(), false)
        }
    };
    if upgraded {
        match config::save_session(&session_path, &session) {
            Ok(()) => tracing::info!("Migrated session file {}", session_path.display()),
            Err(e) => tracing::warn!("Failed to save migrated session: {}", e),
        }
    }

    // Initialize LLM providers
    let llm_config = llm::LlmConfig::from_env().with_session_keys(&session.api_keys);
    let llm_manager = match llm_config.build_manager() {
        Ok(manager) => {
            tracing::info!("LLM providers initialized: {}", manager.names().join(", "));
            manager
        }
        Err(e) => {
            tracing::warn!(
                "Failed to initialize LLM providers: {}. Requests must supply an API key.",
                e
            );
            llm::LlmManager::new(Vec::new())
        }
    };

    let state = Arc::new(AppState::new(llm_manager, llm_config, session));

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
