// ABOUTME: Diagram resolution against the blob store and image dimension probing
// ABOUTME: Resolution failures are always non-fatal; the synthesizer emits fallbacks

use casebook_core::constants::case_study_prefix;
use casebook_core::types::{CaseStudy, DiagramRef};
use casebook_storage::BlobStore;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolved image bytes keyed by [`diagram_key`]. A missing entry means the
/// diagram could not be resolved and renders as fallback text.
pub type ResolvedImages = HashMap<String, Vec<u8>>;

/// Identity of a diagram within one case study: the explicit blob key when
/// present, otherwise the filename.
pub fn diagram_key(diagram: &DiagramRef) -> String {
    diagram
        .s3_key
        .clone()
        .unwrap_or_else(|| diagram.name.clone())
}

/// Resolves diagram references to raw bytes from the blob store
pub struct ImageEmbedder {
    store: Arc<dyn BlobStore>,
}

impl ImageEmbedder {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        ImageEmbedder { store }
    }

    /// Resolve one diagram reference: explicit blob key first, then the
    /// filename inside the case study's folder. `None` on total failure —
    /// never an error, the document must still generate.
    pub async fn resolve(&self, folder_name: &str, diagram: &DiagramRef) -> Option<Vec<u8>> {
        if let Some(key) = &diagram.s3_key {
            match self.store.get(key).await {
                Ok(Some(bytes)) => return Some(bytes),
                Ok(None) => debug!("No object at explicit key {}", key),
                Err(e) => warn!("Blob lookup failed for {}: {}", key, e),
            }
        }

        if !diagram.name.is_empty() {
            let key = format!("{}{}", case_study_prefix(folder_name), diagram.name);
            match self.store.get(&key).await {
                Ok(Some(bytes)) => return Some(bytes),
                Ok(None) => debug!("No object at fallback key {}", key),
                Err(e) => warn!("Blob lookup failed for {}: {}", key, e),
            }
        }

        None
    }

    /// Resolve every embeddable diagram of a case study in one pass; shared
    /// by both render modes.
    pub async fn resolve_all(&self, case: &CaseStudy) -> ResolvedImages {
        let mut resolved = ResolvedImages::new();
        let content = &case.questionnaire.content;

        let diagrams = content
            .architecture_diagrams
            .iter()
            .flat_map(|section| section.diagrams.iter())
            .chain(
                content
                    .implementation_workstreams
                    .iter()
                    .flat_map(|workstream| workstream.diagrams.iter()),
            );

        for diagram in diagrams {
            if !diagram.is_image() {
                continue;
            }
            let key = diagram_key(diagram);
            if resolved.contains_key(&key) {
                continue;
            }
            if let Some(bytes) = self.resolve(&case.folder_name, diagram).await {
                resolved.insert(key, bytes);
            }
        }

        resolved
    }
}

/// Read the pixel dimensions from image headers without decoding the full
/// image. `None` when the bytes are not a recognizable image.
pub fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Minimal valid 1x1 PNG shared by docgen tests
#[cfg(test)]
pub(crate) const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x62, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

#[cfg(test)]
mod tests {
    use super::*;
    use casebook_storage::MemoryBlobStore;

    fn diagram(name: &str, s3_key: Option<&str>) -> DiagramRef {
        DiagramRef {
            name: name.to_string(),
            s3_key: s3_key.map(String::from),
            file_type: "image/png".to_string(),
            size: None,
        }
    }

    #[tokio::test]
    async fn test_resolve_by_explicit_key() {
        let store = Arc::new(MemoryBlobStore::new());
        store
            .put("uploads/arch.png", TINY_PNG.to_vec())
            .await
            .unwrap();

        let embedder = ImageEmbedder::new(store);
        let bytes = embedder
            .resolve("acme", &diagram("arch.png", Some("uploads/arch.png")))
            .await;
        assert_eq!(bytes, Some(TINY_PNG.to_vec()));
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_folder_filename() {
        let store = Arc::new(MemoryBlobStore::new());
        store
            .put("case-studies/acme/arch.png", TINY_PNG.to_vec())
            .await
            .unwrap();

        let embedder = ImageEmbedder::new(store);
        // Explicit key is stale; the folder fallback still resolves
        let bytes = embedder
            .resolve("acme", &diagram("arch.png", Some("uploads/gone.png")))
            .await;
        assert_eq!(bytes, Some(TINY_PNG.to_vec()));
    }

    #[tokio::test]
    async fn test_resolve_returns_none_on_total_failure() {
        let embedder = ImageEmbedder::new(Arc::new(MemoryBlobStore::new()));
        let bytes = embedder.resolve("acme", &diagram("missing.png", None)).await;
        assert_eq!(bytes, None);
    }

    #[test]
    fn test_probe_dimensions() {
        assert_eq!(probe_dimensions(TINY_PNG), Some((1, 1)));
        assert_eq!(probe_dimensions(b"definitely not an image"), None);
    }
}
