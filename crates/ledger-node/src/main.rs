mod config;
mod constants;
mod orchestrator;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use config::{Args, Backend};
use ledger_core::{Chain, Node, NodeRegistry};
use ledger_storage::{ChainStore, FileStore, SledStore};
use orchestrator::{CycleReport, Orchestrator};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<Orchestrator>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

/// Handler error rendered as a JSON 500.
struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": format!("{:#}", self.0) })),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

async fn mine(State(state): State<AppState>) -> Result<Json<CycleReport>, AppError> {
    let orchestrator = state.orchestrator.clone();
    // Mining is CPU-bound and blocks until every block is sealed.
    let report = tokio::task::spawn_blocking(move || orchestrator.run_cycle()).await??;
    Ok(Json(report))
}

async fn chain(State(state): State<AppState>) -> Result<Json<Chain>, AppError> {
    let orchestrator = state.orchestrator.clone();
    let chain = tokio::task::spawn_blocking(move || orchestrator.current_chain()).await?;
    Ok(Json(chain))
}

async fn nodes(State(state): State<AppState>) -> Json<Vec<Node>> {
    Json(state.orchestrator.registry().list_nodes().to_vec())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/", get(mine))
        .route("/mine", post(mine))
        .route("/chain", get(chain))
        .route("/nodes", get(nodes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn open_store(args: &Args) -> anyhow::Result<Arc<dyn ChainStore>> {
    let store: Arc<dyn ChainStore> = match args.backend {
        Backend::File => {
            info!("using chain file {}", args.chain_file.display());
            Arc::new(FileStore::new(&args.chain_file))
        }
        Backend::Sled => Arc::new(SledStore::open(&args.data_dir)?),
    };
    Ok(store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let store = open_store(&args)?;
    let registry = NodeRegistry::default().with_policy(args.selection.into());
    let orchestrator = Orchestrator::new(store, registry, args.orchestrator_config());

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
    };
    let app = router(state);

    let addr: SocketAddr = args.listen.parse()?;
    info!(
        "ledger-node listening on http://{addr} (difficulty {}, {} blocks per request)",
        args.difficulty, args.blocks_per_request
    );
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
