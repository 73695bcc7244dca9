//! Response engine: the full pipeline over one catalog snapshot.
//!
//! raw text → normalize → extract → resolve → render → format

use crate::catalog::{Catalog, CatalogHandle};
use crate::config::EngineConfig;
use crate::entities::{DetectedEntities, EntityExtractor};
use crate::formatter::{format_response, ChannelResponse};
use crate::normalize::normalize;
use crate::resolver::{IntentResolver, Resolution};
use std::sync::Arc;

/// Entry point used by transports. Cheap to share behind an `Arc`; safe for concurrent use.
pub struct ResponseEngine {
    catalog: CatalogHandle,
    config: Arc<EngineConfig>,
    extractor: EntityExtractor,
    resolver: IntentResolver,
}

impl ResponseEngine {
    pub fn new(catalog: CatalogHandle, config: EngineConfig) -> Self {
        let config = Arc::new(config);
        Self {
            extractor: EntityExtractor::new(&config),
            resolver: IntentResolver::new(Arc::clone(&config)),
            catalog,
            config,
        }
    }

    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Answer `text` in every channel format against the current snapshot.
    pub fn respond(&self, text: &str) -> ChannelResponse {
        let snapshot = self.catalog.snapshot();
        self.respond_with(&snapshot, text)
    }

    /// Answer `text` against an explicit snapshot.
    pub fn respond_with(&self, catalog: &Catalog, text: &str) -> ChannelResponse {
        let resolution = self.explain_with(catalog, text);
        let rendered = resolution.render_text();
        if rendered.trim().is_empty() {
            tracing::warn!(
                "[ENGINE] Intent {} rendered empty; using apology",
                resolution.intent
            );
            return format_response(self.resolver.apology_text());
        }
        format_response(&rendered)
    }

    /// Resolution for `text` without rendering; for debugging and tests.
    pub fn explain(&self, text: &str) -> Resolution {
        let snapshot = self.catalog.snapshot();
        self.explain_with(&snapshot, text)
    }

    pub fn explain_with(&self, catalog: &Catalog, text: &str) -> Resolution {
        let normalized = normalize(text);
        tracing::debug!("[ENGINE] Input '{}' -> normalized '{}'", text, normalized);
        let entities = self.extractor.extract_normalized(catalog, &normalized);
        self.resolver.resolve(catalog, &normalized, &entities)
    }

    /// Entities detected in `text` against the current snapshot.
    pub fn extract(&self, text: &str) -> DetectedEntities {
        let snapshot = self.catalog.snapshot();
        self.extractor.extract(&snapshot, text)
    }
}
