pub mod handlers;
pub mod types;

use crate::{
    Result, config::Config, inference, pipeline::ImagePipeline, raster::ImageStore,
};
use axum::{Router, routing::get};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Open CORS: any origin, method and header, with credentials. Origins and
/// headers are mirrored since browsers refuse `*` alongside credentials.
pub fn cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/items/:item_id", get(handlers::read_item))
        .route(
            "/generate-image",
            get(handlers::generate_image).post(handlers::generate_image_json),
        )
        .with_state(state)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
}

pub async fn run(config: Config) -> Result<()> {
    // Built once and shared by every request
    let client = inference::build_client(&config.inference).await?;
    let store = ImageStore::new(&config.storage.output_dir, config.output_format()?);

    info!(
        "Saving generated images to {} as {}",
        store.dir().display(),
        store.format()
    );

    let app_state = AppState {
        pipeline: Arc::new(ImagePipeline::new(client, store)),
    };

    let app = router(app_state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
