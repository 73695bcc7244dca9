//! Entity and intent catalog: an immutable snapshot shared by every resolution.
//!
//! A [`Catalog`] is built once (by the loader or by hand in tests) and never mutated.
//! Building it normalizes training phrases and compiles one whole-phrase matcher per
//! entity value/synonym, so extraction does no regex compilation on the hot path.
//! Reloads produce a new `Catalog` and swap it in through [`CatalogHandle`].

mod handle;
mod loader;

pub use handle::CatalogHandle;
pub use loader::{load_catalog, load_entities, load_intents};

use crate::normalize::{normalize, phrase_regex};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One canonical value of an entity type with its synonym variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEntry {
    pub value: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl EntityEntry {
    pub fn new(value: impl Into<String>, synonyms: &[&str]) -> Self {
        Self {
            value: value.into(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// True when `candidate` equals the value or one of the synonyms, ignoring case.
    pub fn names(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        self.value.eq_ignore_ascii_case(candidate)
            || self
                .synonyms
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(candidate))
    }
}

/// Named, ordered list of entries (e.g. `proyek`, `lokasi`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    pub entries: Vec<EntityEntry>,
}

/// A named request category with training phrases and response templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    pub training_phrases: Vec<String>,
    pub responses: Vec<String>,
}

impl Intent {
    /// The template the engine renders. Only the first response is used.
    pub fn first_response(&self) -> Option<&str> {
        self.responses.first().map(String::as_str)
    }
}

/// Compiled matcher for one entry: normalized term plus its whole-phrase regex.
#[derive(Debug)]
pub(crate) struct EntryMatcher {
    pub value: String,
    pub terms: Vec<(String, Regex)>,
}

#[derive(Debug)]
pub(crate) struct TypeMatcher {
    pub name: String,
    pub entries: Vec<EntryMatcher>,
}

/// Immutable catalog snapshot.
#[derive(Debug, Default)]
pub struct Catalog {
    entity_types: Vec<EntityType>,
    intents: Vec<Intent>,
    matchers: Vec<TypeMatcher>,
}

impl Catalog {
    /// Build a snapshot. Training phrases are normalized; entity terms are compiled.
    pub fn new(entity_types: Vec<EntityType>, intents: Vec<Intent>) -> Self {
        let intents = intents
            .into_iter()
            .map(|mut intent| {
                intent.training_phrases = intent
                    .training_phrases
                    .iter()
                    .map(|p| normalize(p))
                    .filter(|p| !p.is_empty())
                    .collect();
                intent
            })
            .collect();
        let matchers = entity_types.iter().map(compile_type).collect();
        Self {
            entity_types,
            intents,
            matchers,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_types.is_empty() && self.intents.is_empty()
    }

    pub fn entity_types(&self) -> &[EntityType] {
        &self.entity_types
    }

    pub fn entity_type(&self, name: &str) -> Option<&EntityType> {
        self.entity_types.iter().find(|t| t.name == name)
    }

    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn intent(&self, name: &str) -> Option<&Intent> {
        self.intents.iter().find(|i| i.name == name)
    }

    /// First response template of `name`; `None` if the intent is missing or has no responses.
    pub fn response_template(&self, name: &str) -> Option<&str> {
        self.intent(name).and_then(Intent::first_response)
    }

    /// True when `value` names an entry (value or synonym) of entity type `kind`.
    pub fn knows(&self, kind: &str, value: &str) -> bool {
        self.entity_type(kind)
            .map(|t| t.entries.iter().any(|e| e.names(value)))
            .unwrap_or(false)
    }

    pub(crate) fn matchers(&self) -> &[TypeMatcher] {
        &self.matchers
    }
}

fn compile_type(entity_type: &EntityType) -> TypeMatcher {
    let entries = entity_type
        .entries
        .iter()
        .map(|entry| {
            let terms = std::iter::once(&entry.value)
                .chain(entry.synonyms.iter())
                .map(|t| normalize(t))
                .filter(|t| !t.is_empty())
                .filter_map(|t| match phrase_regex(&t) {
                    Ok(re) => Some((t, re)),
                    Err(e) => {
                        tracing::warn!(
                            "[CATALOG] Skipping synonym '{}' of {}: {}",
                            t,
                            entity_type.name,
                            e
                        );
                        None
                    }
                })
                .collect();
            EntryMatcher {
                value: entry.value.clone(),
                terms,
            }
        })
        .collect();
    TypeMatcher {
        name: entity_type.name.clone(),
        entries,
    }
}
