//! Entity extraction: project, location and house type from free-form chat text.
//!
//! Order of evidence per entity type:
//! 1. Catalog value/synonym, whole-phrase match, catalog order, first match wins.
//! 2. Project only: `<brand> <number>` pattern (e.g. "kiano 9" → "Natureland Kiano 9"), even if
//!    the catalog has no such project, so the resolver can reject it explicitly.
//! 3. Location only: keyword table (e.g. "cibarusah" → "Bekasi").

use crate::catalog::Catalog;
use crate::config::{EngineConfig, EntityKinds, NumberedProject};
use crate::normalize::{normalize, phrase_regex};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Detected entity-type name → canonical value. At most one value per type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectedEntities {
    values: BTreeMap<String, String>,
}

impl DetectedEntities {
    pub fn get(&self, kind: &str) -> Option<&str> {
        self.values.get(kind).map(String::as_str)
    }

    /// Record `value` for `kind` unless one is already recorded.
    pub fn insert(&mut self, kind: impl Into<String>, value: impl Into<String>) {
        self.values.entry(kind.into()).or_insert_with(|| value.into());
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.values.contains_key(kind)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

struct NumberedPattern {
    regex: Regex,
    base_name: String,
}

struct KeywordEntity {
    regex: Regex,
    value: String,
}

/// Scans normalized text against a catalog snapshot. Built once per configuration.
pub struct EntityExtractor {
    kinds: EntityKinds,
    project_stop_words: HashSet<String>,
    numbered: Option<NumberedPattern>,
    location_keywords: Vec<KeywordEntity>,
}

impl EntityExtractor {
    pub fn new(config: &EngineConfig) -> Self {
        let extraction = &config.extraction;
        let location_keywords = extraction
            .location_keywords
            .iter()
            .filter_map(|kv| {
                let keyword = normalize(&kv.keyword);
                phrase_regex(&keyword).ok().map(|regex| KeywordEntity {
                    regex,
                    value: kv.value.clone(),
                })
            })
            .collect();
        Self {
            kinds: config.entity_kinds.clone(),
            project_stop_words: extraction
                .project_stop_words
                .iter()
                .map(|w| normalize(w))
                .collect(),
            numbered: extraction.numbered_project.as_ref().and_then(compile_numbered),
            location_keywords,
        }
    }

    /// Extract entities from raw user text.
    pub fn extract(&self, catalog: &Catalog, text: &str) -> DetectedEntities {
        self.extract_normalized(catalog, &normalize(text))
    }

    /// Extract from text that has already been through [`normalize`].
    pub fn extract_normalized(&self, catalog: &Catalog, text: &str) -> DetectedEntities {
        let mut detected = DetectedEntities::default();

        for matcher in catalog.matchers() {
            let is_project = matcher.name == self.kinds.project;
            let hit = matcher.entries.iter().find_map(|entry| {
                entry
                    .terms
                    .iter()
                    .filter(|(term, _)| !(is_project && self.project_stop_words.contains(term)))
                    .find(|(_, re)| re.is_match(text))
                    .map(|(term, _)| (term, &entry.value))
            });
            if let Some((term, value)) = hit {
                tracing::debug!("[ENTITY] {} matched '{}' -> {}", matcher.name, term, value);
                detected.insert(matcher.name.clone(), value.clone());
            }
        }

        if !detected.contains(&self.kinds.project) {
            if let Some(name) = self.numbered_project(text) {
                tracing::debug!("[ENTITY] {} via pattern (may be unknown) -> {}", self.kinds.project, name);
                detected.insert(self.kinds.project.clone(), name);
            }
        }

        if !detected.contains(&self.kinds.location) {
            if let Some(kw) = self.location_keywords.iter().find(|k| k.regex.is_match(text)) {
                tracing::debug!("[ENTITY] {} via keyword -> {}", self.kinds.location, kw.value);
                detected.insert(self.kinds.location.clone(), kw.value.clone());
            }
        }

        detected
    }

    fn numbered_project(&self, text: &str) -> Option<String> {
        let pattern = self.numbered.as_ref()?;
        let caps = pattern.regex.captures(text)?;
        let number = caps.get(1)?.as_str();
        Some(format!("{} {}", pattern.base_name, number))
    }
}

fn compile_numbered(config: &NumberedProject) -> Option<NumberedPattern> {
    let brands: Vec<String> = config
        .brands
        .iter()
        .map(|b| normalize(b))
        .filter(|b| !b.is_empty())
        .map(|b| regex::escape(&b))
        .collect();
    if brands.is_empty() {
        return None;
    }
    let regex = Regex::new(&format!(r"\b(?:{})\s*(\d+)\b", brands.join("|")))
        .map_err(|e| tracing::warn!("[ENTITY] Numbered project pattern rejected: {}", e))
        .ok()?;
    Some(NumberedPattern {
        regex,
        base_name: config.base_name.clone(),
    })
}
