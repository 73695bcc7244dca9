//! Engine configuration: every tunable of the rule cascade in one place.
//!
//! `EngineConfig::default()` reproduces the Kianoland deployment (Natureland Kiano 3 and
//! Green Jonggol Village on sale, Kiano 1 and 2 sold out). Operators override it with a TOML
//! file and `KIANO__…` environment variables without code edits.
//!
//! | Source | Example |
//! |--------|---------|
//! | defaults | `EngineConfig::default()` |
//! | file (`KIANO_ENGINE_CONFIG`, default `config/engine.toml`) | `[similarity]\nthreshold = 0.7` |
//! | env | `KIANO__SIMILARITY__THRESHOLD=0.7` |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub use config::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "config/engine.toml";

/// Names of the entity types the cascade cares about, as they appear in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityKinds {
    pub project: String,
    pub location: String,
    /// Sub-variant of a project (e.g. a specific house type block). Preferred as selector.
    pub house_type: String,
}

impl Default for EntityKinds {
    fn default() -> Self {
        Self {
            project: "proyek".to_string(),
            location: "lokasi".to_string(),
            house_type: "tipe_rumah".to_string(),
        }
    }
}

/// `<brand word> <number>` pattern that synthesizes a project name absent from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberedProject {
    pub brands: Vec<String>,
    pub base_name: String,
}

/// Keyword → canonical value pair for keyword-triggered fallback entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordValue {
    pub keyword: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Generic words that never count as a project synonym even if the catalog lists them.
    pub project_stop_words: Vec<String>,
    pub numbered_project: Option<NumberedProject>,
    /// Used only when no catalog location synonym matched.
    pub location_keywords: Vec<KeywordValue>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            project_stop_words: words(&[
                "proyek", "project", "properti", "rumah", "perumahan", "yang", "ada", "tersedia",
                "apa", "saja", "aja", "semua", "list", "daftar", "informasi", "info", "harga",
                "promo", "fasilitas", "lokasi",
            ]),
            numbered_project: Some(NumberedProject {
                brands: words(&["kiano", "nlk"]),
                base_name: "Natureland Kiano".to_string(),
            }),
            location_keywords: vec![
                kv("cibarusah", "Bekasi"),
                kv("bekasi", "Bekasi"),
                kv("jonggol", "Bogor"),
                kv("bogor", "Bogor"),
            ],
        }
    }
}

/// A project currently on sale, with the area shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectListing {
    pub name: String,
    #[serde(default)]
    pub area: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsConfig {
    pub available: Vec<ProjectListing>,
    /// Sold-out projects: known, but answered with alternatives.
    pub retired: Vec<String>,
    /// Topic intents that still get a direct answer for a retired project.
    pub retired_exempt_topics: Vec<String>,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            available: vec![
                ProjectListing {
                    name: "Natureland Kiano 3".to_string(),
                    area: Some("Cibarusah, Bekasi".to_string()),
                },
                ProjectListing {
                    name: "Green Jonggol Village".to_string(),
                    area: Some("Jonggol, Bogor".to_string()),
                },
            ],
            retired: words(&["Natureland Kiano 1", "Natureland Kiano 2"]),
            retired_exempt_topics: words(&["info_harga", "info_lokasi", "info_fasilitas"]),
        }
    }
}

/// One entry of the topic keyword table, tried in table order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRule {
    pub intent: String,
    pub keywords: Vec<String>,
    /// Selector used when no project was detected (e.g. `all_promos` for an aggregate block).
    #[serde(default)]
    pub aggregate_selector: Option<String>,
    /// Keep the intent a candidate of the similarity fallback.
    #[serde(default)]
    pub similarity_fallback: bool,
}

/// Category keyword that forces one project and prefixes a recommendation sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keywords: Vec<String>,
    pub project: String,
    /// Sentence placed before the rendered answer; `{{proyek}}` is substituted.
    pub intro: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub keywords: Vec<String>,
    /// Location label used when recommendation keywords appear without a location.
    pub unscoped_location: Option<String>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            keywords: words(&[
                "rekomendasi", "rekom", "sarankan", "saran", "cocok", "rumah", "proyek", "properti",
                "hunian",
            ]),
            unscoped_location: Some("tersebut".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// A candidate must score strictly above this to be accepted.
    pub threshold: f64,
    /// Added to the project-info intent's score when a project was detected.
    pub project_info_boost: f64,
    /// Per-intent thresholds replacing `threshold`.
    pub threshold_overrides: BTreeMap<String, f64>,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.65,
            project_info_boost: 0.2,
            threshold_overrides: BTreeMap::new(),
        }
    }
}

impl SimilarityConfig {
    pub fn threshold_for(&self, intent: &str) -> f64 {
        self.threshold_overrides
            .get(intent)
            .copied()
            .unwrap_or(self.threshold)
    }
}

/// Catalog intent names the cascade refers to directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentNames {
    pub project_info: String,
    pub recommendation: String,
    pub fallback: String,
    /// Synthetic names reported for the two guard responses.
    pub unavailable_project: String,
    pub retired_project: String,
}

impl Default for IntentNames {
    fn default() -> Self {
        Self {
            project_info: "info_proyek".to_string(),
            recommendation: "rekomendasi_proyek".to_string(),
            fallback: "default_fallback".to_string(),
            unavailable_project: "proyek_tidak_tersedia".to_string(),
            retired_project: "proyek_sold_out".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Header of the unknown-project answer; `{{proyek}}` is the detected name.
    pub unavailable_project: String,
    pub retired_project: String,
    pub retired_footer: String,
    /// Last resort when the catalog has no fallback intent.
    pub apology: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            unavailable_project: "Maaf, proyek '{{proyek}}' tidak ada atau tidak tersedia di Kianoland Group.\n\nProyek yang tersedia saat ini:".to_string(),
            retired_project: "Maaf, proyek {{proyek}} sudah sold out. Kami merekomendasikan proyek terbaru kami:".to_string(),
            retired_footer: "Ketik 'info [nama_proyek]' untuk detail lebih lanjut.".to_string(),
            apology: "Maaf, saya tidak dapat memproses permintaan Anda saat ini.".to_string(),
        }
    }
}

/// Full engine configuration. See module docs for load precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub entity_kinds: EntityKinds,
    pub extraction: ExtractionConfig,
    pub projects: ProjectsConfig,
    /// Tried in order; the first topic whose keywords match wins.
    pub topics: Vec<TopicRule>,
    pub categories: Vec<CategoryRule>,
    pub recommendation: RecommendationConfig,
    pub similarity: SimilarityConfig,
    pub intents: IntentNames,
    pub messages: Messages,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            entity_kinds: EntityKinds::default(),
            extraction: ExtractionConfig::default(),
            projects: ProjectsConfig::default(),
            topics: vec![
                topic("info_promo", &["promo", "diskon", "dp", "uang muka"], Some("all_promos")),
                topic("info_harga", &["harga", "cicilan", "angsuran", "biaya"], None),
                topic("info_fasilitas", &["fasilitas"], None),
                topic("info_lokasi", &["lokasi", "alamat", "peta", "letak"], None),
                topic("syarat_dokumen", &["syarat", "persyaratan", "dokumen", "kpr"], None),
                TopicRule {
                    similarity_fallback: true,
                    ..topic("minat_beli", &["beli", "minat", "lihat"], None)
                },
                topic(
                    "bantuan",
                    &["bantuan", "panduan", "tolong", "bantu", "tidak mengerti", "tidak paham", "bingung"],
                    None,
                ),
            ],
            categories: vec![
                CategoryRule {
                    keywords: words(&["subsidi"]),
                    project: "Green Jonggol Village".to_string(),
                    intro: "Untuk rumah subsidi, kami merekomendasikan **{{proyek}}**.\n\nBerikut informasinya:\n".to_string(),
                },
                CategoryRule {
                    keywords: words(&["komersil"]),
                    project: "Green Jonggol Village".to_string(),
                    intro: "Untuk rumah komersil, kami merekomendasikan **{{proyek}}**.\n\nBerikut informasinya:\n".to_string(),
                },
            ],
            recommendation: RecommendationConfig::default(),
            similarity: SimilarityConfig::default(),
            intents: IntentNames::default(),
            messages: Messages::default(),
        }
    }
}

impl EngineConfig {
    /// Load defaults, then the file at `KIANO_ENGINE_CONFIG` (or `config/engine.toml`) if it
    /// exists, then `KIANO__` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("KIANO_ENGINE_CONFIG")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Same layering as [`EngineConfig::load`] with an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        let builder = if path.exists() {
            tracing::info!("[CONFIG] Engine config file: {}", path.display());
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        builder
            .add_source(
                config::Environment::with_prefix("KIANO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Effective configuration as TOML (for `--print-config`).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn is_retired(&self, project: &str) -> bool {
        self.projects
            .retired
            .iter()
            .any(|p| p.eq_ignore_ascii_case(project))
    }
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn kv(keyword: &str, value: &str) -> KeywordValue {
    KeywordValue {
        keyword: keyword.to_string(),
        value: value.to_string(),
    }
}

fn topic(intent: &str, keywords: &[&str], aggregate: Option<&str>) -> TopicRule {
    TopicRule {
        intent: intent.to_string(),
        keywords: words(keywords),
        aggregate_selector: aggregate.map(str::to_string),
        similarity_fallback: false,
    }
}
