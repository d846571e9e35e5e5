use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipquiz::catalog::{build_catalog, CatalogStore};
use clipquiz::{config, handlers, state::AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipquiz=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let content_root = config::load_content_root();
    let catalog = CatalogStore::new(build_catalog(&content_root));
    let entries = catalog.snapshot().len();

    let state = AppState::new(catalog, content_root.clone());
    let app = handlers::router(state);

    let bind_addr = config::server_bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

    tracing::info!("Server running on http://localhost:{}", config::server_port());
    tracing::info!("Content root: {}", content_root.display());
    tracing::info!("Entries loaded: {}", entries);

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
