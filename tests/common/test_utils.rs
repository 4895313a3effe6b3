use super::mocks::MockInferenceClient;
use axum::Router;
use imagegen_gateway::{
    pipeline::ImagePipeline,
    raster::{ImageStore, OutputFormat},
    server::{self, handlers::AppState},
};
use std::{path::Path, sync::Arc};
use tempfile::TempDir;

/// Create a temporary directory for generated images
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Pipeline writing PNGs into `dir`, backed by `client`
pub fn create_pipeline(client: MockInferenceClient, dir: &Path) -> ImagePipeline {
    create_pipeline_with_format(client, dir, OutputFormat::Png)
}

pub fn create_pipeline_with_format(
    client: MockInferenceClient,
    dir: &Path,
    format: OutputFormat,
) -> ImagePipeline {
    ImagePipeline::new(Arc::new(client), ImageStore::new(dir, format))
}

/// Full router around a mock client; the returned directory receives the images
pub fn create_test_app(client: MockInferenceClient) -> (Router, TempDir) {
    let temp_dir = create_temp_dir();
    let state = AppState {
        pipeline: Arc::new(create_pipeline(client, &temp_dir.path().join("generated-images"))),
    };
    (server::router(state), temp_dir)
}

/// Files currently present in `dir` (empty when it does not exist)
pub fn list_files(dir: &Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut files: Vec<_> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
            files.sort();
            files
        }
        Err(_) => Vec::new(),
    }
}

/// Body of the endpoint response for the one-red-pixel scenario
pub fn red_square_response() -> serde_json::Value {
    serde_json::json!({
        "generated_image": [[[255, 0, 0]]],
        "prompt": "a red square"
    })
}
