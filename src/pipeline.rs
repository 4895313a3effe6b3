use crate::{
    Error, Result,
    inference::InferenceClient,
    raster::{self, ImageStore, OutputFormat},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Prompt as echoed by the endpoint.
    pub prompt: String,
    pub img_base64: String,
    pub path: PathBuf,
}

/// invoke → decode → rasterize → persist → encode, for one prompt at a time.
pub struct ImagePipeline {
    client: Arc<dyn InferenceClient>,
    store: ImageStore,
}

impl ImagePipeline {
    pub fn new(client: Arc<dyn InferenceClient>, store: ImageStore) -> Self {
        Self { client, store }
    }

    pub fn format(&self) -> OutputFormat {
        self.store.format()
    }

    pub async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        let envelope = self.client.invoke(prompt).await?;
        debug!(
            "Inference response: {} bytes ({})",
            envelope.body.len(),
            envelope.content_type.as_deref().unwrap_or("no content type")
        );

        let requested = prompt.to_string();
        let format = self.format();
        let (echoed, bytes) = tokio::task::spawn_blocking(move || -> Result<(String, Vec<u8>)> {
            let decoded = raster::decode(&envelope, &requested)?;
            let image = decoded.pixels.into_image()?;
            debug!("Decoded {}x{} image", image.width(), image.height());
            Ok((decoded.prompt, raster::encode_bytes(&image, format)?))
        })
        .await
        .map_err(|e| Error::internal(format!("image task failed: {}", e)))??;

        // The file and the response carry the same encoded bytes.
        let path = self.store.save_encoded(&bytes).await?;

        info!("Generated image for prompt: {}", echoed);

        Ok(GeneratedImage {
            prompt: echoed,
            img_base64: STANDARD.encode(&bytes),
            path,
        })
    }
}
