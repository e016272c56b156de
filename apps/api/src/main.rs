mod config;
mod contact;
mod db;
mod errors;
mod llm_client;
mod models;
mod pages;
mod prediction;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::contact::store::{ContactStore, PgContactStore, SupabaseContactStore};
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::pages::Pages;
use crate::prediction::advisory::{AdvisorySource, GeminiAdvisor};
use crate::prediction::model::DiseaseModel;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting WeatherCare API v{}", env!("CARGO_PKG_VERSION"));

    let pages = Arc::new(Pages::new()?);

    // Model artifacts: a missing model keeps the site up and reports the
    // problem on each prediction.
    let model = match DiseaseModel::load(&config.model_path, &config.label_encoder_path) {
        Ok(model) => {
            info!(
                "ML artifacts loaded successfully ({} classes)",
                model.classes().len()
            );
            Some(Arc::new(model))
        }
        Err(e) => {
            error!(
                "Error loading ML files: {e}. Ensure {} and {} are readable.",
                config.model_path, config.label_encoder_path
            );
            None
        }
    };

    let advisor = build_advisor(&config);
    let contact_store = build_contact_store(&config).await;

    let state = AppState {
        pages,
        model,
        advisor,
        contact_store,
    };

    let app = build_router(state, &config.static_dir)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_advisor(config: &Config) -> Option<Arc<dyn AdvisorySource>> {
    let Some(api_key) = &config.gemini_api_key else {
        warn!("GEMINI_API_KEY not set; AI advisory disabled");
        return None;
    };
    match LlmClient::new(api_key.clone()) {
        Ok(llm) => {
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(GeminiAdvisor(llm)))
        }
        Err(e) => {
            warn!("Failed to build LLM client: {e}; AI advisory disabled");
            None
        }
    }
}

/// Supabase REST takes precedence over a direct Postgres URL.
async fn build_contact_store(config: &Config) -> Option<Arc<dyn ContactStore>> {
    if let Some((url, key)) = config.supabase() {
        match SupabaseContactStore::new(url, key) {
            Ok(store) => {
                info!("Contact store: supabase");
                return Some(Arc::new(store));
            }
            Err(e) => warn!("Failed to build Supabase client: {e}"),
        }
    }

    if let Some(database_url) = &config.database_url {
        match create_pool(database_url).await {
            Ok(pool) => {
                info!("Contact store: postgres");
                return Some(Arc::new(PgContactStore::new(pool)));
            }
            Err(e) => warn!("Postgres unavailable: {e:#}"),
        }
    }

    warn!("SUPABASE_URL/SUPABASE_KEY not set; contact submissions will not be stored");
    None
}
