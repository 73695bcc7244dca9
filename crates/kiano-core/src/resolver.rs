//! Intent resolution: one ordered rule cascade, first satisfied guard wins.
//!
//! ```text
//! 1. unavailable project   detected project unknown to the catalog
//! 2. retired project       sold out, and not asking price/location/facilities
//! 3. topic keyword         promo > harga > fasilitas > lokasi > syarat > minat beli > bantuan
//! 4. project info          valid project, no topic keyword
//! 5. category shortcut     "subsidi" / "komersil" force the project that offers it
//! 6. recommendation        recommendation words, scoped to a location if one was found
//! 7. similarity            best training phrase above threshold
//! 8. terminal fallback     default_fallback intent, else a fixed apology
//! ```
//!
//! Later rules are never consulted once one fires. Resolution reads a catalog snapshot and
//! never fails.

use crate::catalog::Catalog;
use crate::config::{CategoryRule, EngineConfig, TopicRule};
use crate::entities::DetectedEntities;
use crate::normalize::{normalize, phrase_regex};
use crate::similarity::similarity;
use crate::template::{has_block, render, substitute_placeholders, RenderingContext};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Keywords this short must match as whole words ("dp" must not fire inside "pdpt").
const WHOLE_WORD_MAX_CHARS: usize = 3;

/// Which rule of the cascade produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    UnavailableProject,
    RetiredProject,
    TopicKeyword,
    ProjectInfo,
    CategoryShortcut,
    Recommendation,
    Similarity,
    DefaultFallback,
    Apology,
}

/// Outcome of the cascade: the chosen intent plus everything needed to render it.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub intent: String,
    pub rule: Rule,
    pub context: RenderingContext,
    /// Template to render (a catalog response, or a composed message for guard rules).
    pub template: String,
    /// Sentence placed before the rendered template.
    pub prefix: Option<String>,
    /// Winning score when the similarity rule fired.
    pub score: Option<f64>,
}

impl Resolution {
    fn new(intent: &str, rule: Rule, template: impl Into<String>, context: RenderingContext) -> Self {
        Self {
            intent: intent.to_string(),
            rule,
            context,
            template: template.into(),
            prefix: None,
            score: None,
        }
    }

    /// Prefix followed by the rendered template.
    pub fn render_text(&self) -> String {
        let body = render(&self.template, &self.context);
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, body),
            None => body,
        }
    }
}

enum KeywordMatcher {
    Word(Regex),
    Fragment(String),
}

/// Keyword list compiled for matching against normalized text.
struct KeywordSet {
    matchers: Vec<KeywordMatcher>,
}

impl KeywordSet {
    fn new(keywords: &[String]) -> Self {
        let matchers = keywords
            .iter()
            .map(|k| normalize(k))
            .filter(|k| !k.is_empty())
            .filter_map(|k| {
                if k.chars().count() <= WHOLE_WORD_MAX_CHARS {
                    phrase_regex(&k).ok().map(KeywordMatcher::Word)
                } else {
                    Some(KeywordMatcher::Fragment(k))
                }
            })
            .collect();
        Self { matchers }
    }

    fn matches(&self, text: &str) -> bool {
        self.matchers.iter().any(|m| match m {
            KeywordMatcher::Word(re) => re.is_match(text),
            KeywordMatcher::Fragment(k) => text.contains(k.as_str()),
        })
    }
}

struct CompiledTopic {
    rule: TopicRule,
    keywords: KeywordSet,
}

struct CompiledCategory {
    rule: CategoryRule,
    keywords: KeywordSet,
}

/// Entity values the rules look at.
struct Facts<'a> {
    project: Option<&'a str>,
    location: Option<&'a str>,
    house_type: Option<&'a str>,
}

impl Facts<'_> {
    /// Context for `template`. A house type narrows the selector only when a project is known
    /// and the template has a block for it; otherwise the project's own block is used.
    fn context_for(&self, template: &str) -> RenderingContext {
        let house_type = self
            .project
            .and(self.house_type)
            .filter(|house_type| has_block(template, house_type));
        RenderingContext {
            primary_selector: house_type.or(self.project).map(str::to_string),
            project: self.project.map(str::to_string),
            location: self.location.map(str::to_string),
        }
    }
}

/// The rule cascade, compiled from an [`EngineConfig`].
pub struct IntentResolver {
    config: Arc<EngineConfig>,
    topics: Vec<CompiledTopic>,
    categories: Vec<CompiledCategory>,
    recommendation: KeywordSet,
    /// Intents the similarity rule must not pick.
    similarity_excluded: HashSet<String>,
}

impl IntentResolver {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        let topics = config
            .topics
            .iter()
            .map(|rule| CompiledTopic {
                keywords: KeywordSet::new(&rule.keywords),
                rule: rule.clone(),
            })
            .collect();
        let categories = config
            .categories
            .iter()
            .map(|rule| CompiledCategory {
                keywords: KeywordSet::new(&rule.keywords),
                rule: rule.clone(),
            })
            .collect();
        let mut similarity_excluded: HashSet<String> = config
            .topics
            .iter()
            .filter(|t| !t.similarity_fallback)
            .map(|t| t.intent.clone())
            .collect();
        similarity_excluded.insert(config.intents.recommendation.clone());
        similarity_excluded.insert(config.intents.fallback.clone());
        Self {
            recommendation: KeywordSet::new(&config.recommendation.keywords),
            topics,
            categories,
            similarity_excluded,
            config,
        }
    }

    /// Resolve normalized `text` with its detected entities against `catalog`.
    pub fn resolve(&self, catalog: &Catalog, text: &str, entities: &DetectedEntities) -> Resolution {
        if catalog.is_empty() {
            tracing::warn!("[RULE] Catalog is empty; failing closed");
            return self.apology();
        }

        let kinds = &self.config.entity_kinds;
        let facts = Facts {
            project: entities.get(&kinds.project),
            location: entities.get(&kinds.location),
            house_type: entities.get(&kinds.house_type),
        };

        let resolution = self
            .unavailable_project(catalog, &facts)
            .or_else(|| self.retired_project(text, &facts))
            .or_else(|| self.topic_keyword(catalog, text, &facts))
            .or_else(|| self.project_info(catalog, &facts))
            .or_else(|| self.category_shortcut(catalog, text))
            .or_else(|| self.recommendation(catalog, text, &facts))
            .or_else(|| self.similar_phrase(catalog, text, &facts))
            .unwrap_or_else(|| self.terminal_fallback(catalog));

        tracing::info!(
            "[RULE] {:?} -> {} (selector: {:?})",
            resolution.rule,
            resolution.intent,
            resolution.context.selector()
        );
        resolution
    }

    fn unavailable_project(&self, catalog: &Catalog, facts: &Facts<'_>) -> Option<Resolution> {
        let project = facts.project?;
        if catalog.knows(&self.config.entity_kinds.project, project) || self.config.is_retired(project) {
            return None;
        }
        let listing: Vec<String> = self
            .config
            .projects
            .available
            .iter()
            .map(|p| format!("• {}", p.name))
            .collect();
        let template = format!(
            "{}\n{}",
            self.config.messages.unavailable_project,
            listing.join("\n")
        );
        Some(Resolution::new(
            &self.config.intents.unavailable_project,
            Rule::UnavailableProject,
            template,
            RenderingContext::for_project(project),
        ))
    }

    fn retired_project(&self, text: &str, facts: &Facts<'_>) -> Option<Resolution> {
        let project = facts.project?;
        if !self.config.is_retired(project) {
            return None;
        }
        // Only the topic that wins the keyword order decides the exemption.
        let first_topic = self.topics.iter().find(|t| t.keywords.matches(text));
        if let Some(topic) = first_topic {
            if self.config.projects.retired_exempt_topics.contains(&topic.rule.intent) {
                return None;
            }
        }
        let listing: Vec<String> = self
            .config
            .projects
            .available
            .iter()
            .map(|p| match &p.area {
                Some(area) => format!("• {} ({})", p.name, area),
                None => format!("• {}", p.name),
            })
            .collect();
        let template = format!(
            "{}\n\n{}\n\n{}",
            self.config.messages.retired_project,
            listing.join("\n"),
            self.config.messages.retired_footer
        );
        Some(Resolution::new(
            &self.config.intents.retired_project,
            Rule::RetiredProject,
            template,
            RenderingContext::for_project(project),
        ))
    }

    fn topic_keyword(&self, catalog: &Catalog, text: &str, facts: &Facts<'_>) -> Option<Resolution> {
        self.topics.iter().find_map(|topic| {
            if !topic.keywords.matches(text) {
                return None;
            }
            let Some(template) = catalog.response_template(&topic.rule.intent) else {
                tracing::debug!("[RULE] Topic {} matched but not in catalog", topic.rule.intent);
                return None;
            };
            let mut context = facts.context_for(template);
            if context.primary_selector.is_none() {
                context.primary_selector = topic.rule.aggregate_selector.clone();
            }
            Some(Resolution::new(&topic.rule.intent, Rule::TopicKeyword, template, context))
        })
    }

    fn project_info(&self, catalog: &Catalog, facts: &Facts<'_>) -> Option<Resolution> {
        let project = facts.project?;
        if self.config.is_retired(project) {
            return None;
        }
        let name = &self.config.intents.project_info;
        let template = catalog.response_template(name)?;
        Some(Resolution::new(name, Rule::ProjectInfo, template, facts.context_for(template)))
    }

    fn category_shortcut(&self, catalog: &Catalog, text: &str) -> Option<Resolution> {
        let category = self.categories.iter().find(|c| c.keywords.matches(text))?;
        let name = &self.config.intents.project_info;
        let template = catalog.response_template(name)?;
        let context = RenderingContext::for_project(category.rule.project.clone());
        let mut resolution = Resolution::new(name, Rule::CategoryShortcut, template, context);
        resolution.prefix = Some(substitute_placeholders(&category.rule.intro, &resolution.context));
        Some(resolution)
    }

    fn recommendation(&self, catalog: &Catalog, text: &str, facts: &Facts<'_>) -> Option<Resolution> {
        if !self.recommendation.matches(text) {
            return None;
        }
        let name = &self.config.intents.recommendation;
        let template = catalog.response_template(name)?;
        let context = RenderingContext {
            location: facts
                .location
                .map(str::to_string)
                .or_else(|| self.config.recommendation.unscoped_location.clone()),
            ..RenderingContext::default()
        };
        Some(Resolution::new(name, Rule::Recommendation, template, context))
    }

    fn similar_phrase(&self, catalog: &Catalog, text: &str, facts: &Facts<'_>) -> Option<Resolution> {
        let similarity_config = &self.config.similarity;
        let mut best: Option<(f64, &str, &str)> = None;

        for intent in catalog.intents() {
            if self.similarity_excluded.contains(&intent.name) {
                continue;
            }
            let Some(template) = intent.first_response() else {
                continue;
            };
            // Reached with a project only when a retired project's exempt topic has no intent
            // in the catalog; rules 1 to 4 answer every other project mention.
            let boost = if facts.project.is_some() && intent.name == self.config.intents.project_info {
                similarity_config.project_info_boost
            } else {
                0.0
            };
            let threshold = similarity_config.threshold_for(&intent.name);
            for phrase in &intent.training_phrases {
                let score = (similarity(text, phrase) + boost).min(1.0);
                let beats_best = best.map(|(s, _, _)| score > s).unwrap_or(true);
                if score > threshold && beats_best {
                    tracing::debug!("[RULE] Similarity {:.2} '{}' ({})", score, phrase, intent.name);
                    best = Some((score, intent.name.as_str(), template));
                }
            }
        }

        let (score, name, template) = best?;
        let mut resolution =
            Resolution::new(name, Rule::Similarity, template, facts.context_for(template));
        resolution.score = Some(score);
        Some(resolution)
    }

    fn terminal_fallback(&self, catalog: &Catalog) -> Resolution {
        let name = &self.config.intents.fallback;
        match catalog.response_template(name) {
            Some(template) => Resolution::new(
                name,
                Rule::DefaultFallback,
                template,
                RenderingContext::default(),
            ),
            None => self.apology(),
        }
    }

    fn apology(&self) -> Resolution {
        Resolution::new(
            &self.config.intents.fallback,
            Rule::Apology,
            self.config.messages.apology.clone(),
            RenderingContext::default(),
        )
    }

    /// The literal last-resort message (used when a rendered answer comes out empty).
    pub fn apology_text(&self) -> &str {
        &self.config.messages.apology
    }
}
