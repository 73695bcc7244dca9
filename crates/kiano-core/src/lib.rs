//! kiano-core: rule-based intent engine for the Kianoland property chat assistant.
//!
//! Given one chat message and an immutable catalog snapshot, the engine extracts entities
//! (project, location, house type), picks exactly one intent through an ordered rule
//! cascade with a similarity fallback, renders the intent's conditional template and
//! formats the answer for each chat channel. Every call is a pure function of the input
//! and the snapshot.

mod config;
mod engine;
mod error;
mod normalize;
mod similarity;
pub mod catalog;
pub mod entities;
pub mod formatter;
pub mod resolver;
pub mod template;

pub use catalog::{
    load_catalog, load_entities, load_intents, Catalog, CatalogHandle, EntityEntry, EntityType,
    Intent,
};
pub use config::{
    CategoryRule, ConfigError, EngineConfig, EntityKinds, ExtractionConfig, IntentNames,
    KeywordValue, Messages, NumberedProject, ProjectListing, ProjectsConfig,
    RecommendationConfig, SimilarityConfig, TopicRule,
};
pub use engine::ResponseEngine;
pub use entities::{DetectedEntities, EntityExtractor};
pub use error::{CatalogError, CatalogResult};
pub use formatter::{format_response, Channel, ChannelResponse, BOLD_CLOSE, BOLD_OPEN, MESSAGE_SEPARATOR};
pub use normalize::normalize;
pub use resolver::{IntentResolver, Resolution, Rule};
pub use similarity::similarity;
pub use template::{render, RenderingContext, FALLBACK_TAG};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
