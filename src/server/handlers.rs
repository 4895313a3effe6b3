use super::types::{
    ErrorResponse, GenerateImageRequest, GenerateImageResponse, ItemQuery, ItemResponse,
};
use crate::{Error, pipeline::ImagePipeline};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ImagePipeline>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

pub async fn root() -> Json<Value> {
    Json(json!({ "Hello": "World" }))
}

pub async fn read_item(
    Path(item_id): Path<i64>,
    Query(query): Query<ItemQuery>,
) -> Json<ItemResponse> {
    Json(ItemResponse {
        item_id,
        q: query.q,
    })
}

/// `GET /generate-image?prompt=...`
pub async fn generate_image(
    State(state): State<AppState>,
    Query(request): Query<GenerateImageRequest>,
) -> Result<Json<GenerateImageResponse>, HandlerError> {
    handle_generate_image(&state, request.prompt).await
}

/// `POST /generate-image` with `{"prompt": "..."}`
pub async fn generate_image_json(
    State(state): State<AppState>,
    Json(request): Json<GenerateImageRequest>,
) -> Result<Json<GenerateImageResponse>, HandlerError> {
    handle_generate_image(&state, request.prompt).await
}

async fn handle_generate_image(
    state: &AppState,
    prompt: String,
) -> Result<Json<GenerateImageResponse>, HandlerError> {
    info!("Received image generation request for prompt: {}", prompt);

    match state.pipeline.generate(&prompt).await {
        Ok(generated) => {
            info!("Stored generated image at {}", generated.path.display());
            Ok(Json(GenerateImageResponse {
                prompt: generated.prompt,
                img_base64: generated.img_base64,
            }))
        }
        Err(e) => {
            error!("Failed to generate image for prompt {}: {}", prompt, e);
            Err(error_response(e))
        }
    }
}

fn error_response(e: Error) -> HandlerError {
    (
        e.status_code(),
        Json(ErrorResponse {
            error: e.to_string(),
            kind: e.kind().to_string(),
        }),
    )
}
