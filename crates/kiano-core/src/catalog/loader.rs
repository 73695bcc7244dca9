//! Catalog loader for a Dialogflow-style agent export.
//!
//! ```text
//! <root>/
//! ├── entities/<type>_entries.json   [{"value": "...", "synonyms": [...]}] or {"entries": [...]}
//! └── intents/<name>.json            {"displayName", "trainingPhrases", "messages"}
//! ```
//!
//! Files are visited in lexical order so catalog order (and therefore first-match and
//! tie-break behaviour) is the same on every machine.

use super::{Catalog, EntityEntry, EntityType, Intent};
use crate::error::{CatalogError, CatalogResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENTITY_SUFFIX: &str = "_entries.json";

#[derive(Deserialize)]
#[serde(untagged)]
enum EntityFile {
    List(Vec<EntityEntry>),
    Wrapped { entries: Vec<EntityEntry> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentFile {
    display_name: Option<String>,
    #[serde(default)]
    training_phrases: Vec<TrainingPhrase>,
    #[serde(default)]
    messages: Vec<MessageFile>,
}

#[derive(Deserialize)]
struct TrainingPhrase {
    #[serde(default)]
    parts: Vec<PhrasePart>,
}

#[derive(Deserialize)]
struct PhrasePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct MessageFile {
    #[serde(default)]
    text: Option<MessageText>,
}

#[derive(Deserialize)]
struct MessageText {
    #[serde(default)]
    text: Vec<String>,
}

/// Load `entities/` and `intents/` under `root` into a new snapshot.
pub fn load_catalog(root: &Path) -> CatalogResult<Catalog> {
    if !root.is_dir() {
        return Err(CatalogError::MissingDirectory(root.to_path_buf()));
    }
    let entities = load_entities(&root.join("entities"))?;
    let intents = load_intents(&root.join("intents"))?;
    tracing::info!(
        "[CATALOG] Loaded {} entity types and {} intents from {}",
        entities.len(),
        intents.len(),
        root.display()
    );
    for intent in &intents {
        tracing::debug!(
            "[CATALOG]   - {} ({} phrases)",
            intent.name,
            intent.training_phrases.len()
        );
    }
    Ok(Catalog::new(entities, intents))
}

/// Read every `<type>_entries.json` in `dir`. A missing directory yields no types.
pub fn load_entities(dir: &Path) -> CatalogResult<Vec<EntityType>> {
    let mut types = Vec::new();
    for path in json_files(dir)? {
        let Some(name) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(ENTITY_SUFFIX))
            .map(str::to_string)
        else {
            continue;
        };
        let entries = match read_json::<EntityFile>(&path)? {
            EntityFile::List(entries) => entries,
            EntityFile::Wrapped { entries } => entries,
        };
        types.push(EntityType { name, entries });
    }
    Ok(types)
}

/// Read every intent file in `dir`; files without `displayName` are skipped.
pub fn load_intents(dir: &Path) -> CatalogResult<Vec<Intent>> {
    let mut intents = Vec::new();
    for path in json_files(dir)? {
        let file: IntentFile = read_json(&path)?;
        let Some(name) = file.display_name.filter(|n| !n.trim().is_empty()) else {
            tracing::warn!("[CATALOG] {} has no displayName; skipped", path.display());
            continue;
        };
        let training_phrases = file
            .training_phrases
            .iter()
            .map(|p| p.parts.iter().map(|part| part.text.as_str()).collect::<String>())
            .collect();
        let responses = file
            .messages
            .iter()
            .filter_map(|m| m.text.as_ref())
            .map(|t| join_message_lines(&t.text))
            .collect();
        intents.push(Intent {
            name,
            training_phrases,
            responses,
        });
    }
    Ok(intents)
}

/// Trim each line, drop a trailing comma, skip blank lines, join with newlines.
fn join_message_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.trim_end_matches(','))
        .collect::<Vec<_>>()
        .join("\n")
}

fn json_files(dir: &Path) -> CatalogResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        tracing::warn!("[CATALOG] {} does not exist; treating as empty", dir.display());
        return Ok(Vec::new());
    }
    let read = fs::read_dir(dir).map_err(|source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = read
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    files.sort();
    Ok(files)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> CatalogResult<T> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}
