//! Conditional response templates.
//!
//! Authoring syntax (stable; intent content depends on it):
//!
//! ```text
//! {{#Natureland Kiano 3}}Harga {{proyek}} mulai 300 juta.{{/Natureland Kiano 3}}
//! {{#all_promos}}Promo semua proyek ...{{/all_promos}}
//! {{#fallback}}Proyek mana yang Anda maksud?{{/fallback}}
//! ```
//!
//! Block tags are opaque, matched by exact string. Placeholders `{{proyek}}` and `{{lokasi}}`
//! (aliases `{{project}}`, `{{location}}`) take context values, or nothing when absent.
//! Rendering never fails: unmatched or malformed markers degrade to stripped text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Reserved tag of the block rendered when no named block matches.
pub const FALLBACK_TAG: &str = "fallback";

static BLOCK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{[#/][^}]+\}\}").expect("static block marker regex"));

const PROJECT_PLACEHOLDERS: [&str; 2] = ["{{proyek}}", "{{project}}"];
const LOCATION_PLACEHOLDERS: [&str; 2] = ["{{lokasi}}", "{{location}}"];

/// Values available to a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderingContext {
    /// Narrower selector (house type, aggregate sentinel) that wins over project/location.
    pub primary_selector: Option<String>,
    pub project: Option<String>,
    pub location: Option<String>,
}

impl RenderingContext {
    pub fn for_project(project: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            ..Self::default()
        }
    }

    pub fn for_location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::default()
        }
    }

    pub fn with_selector(mut self, selector: Option<String>) -> Self {
        self.primary_selector = selector;
        self
    }

    /// Block key: primary selector, else project, else location.
    pub fn selector(&self) -> Option<&str> {
        self.primary_selector
            .as_deref()
            .or(self.project.as_deref())
            .or(self.location.as_deref())
    }
}

/// Render `template` for `context`: selector block, else fallback block, else stripped text.
pub fn render(template: &str, context: &RenderingContext) -> String {
    if let Some(selector) = context.selector() {
        if let Some(inner) = find_block(template, selector) {
            return finish(inner, context);
        }
    }
    if let Some(inner) = find_block(template, FALLBACK_TAG) {
        return finish(inner, context);
    }
    finish(template, context)
}

/// True when `template` has a complete `{{#tag}}…{{/tag}}` block.
pub fn has_block(template: &str, tag: &str) -> bool {
    find_block(template, tag).is_some()
}

/// Replace project/location placeholders; absent values become empty strings.
pub fn substitute_placeholders(text: &str, context: &RenderingContext) -> String {
    let project = context.project.as_deref().unwrap_or("");
    let location = context.location.as_deref().unwrap_or("");
    let mut out = text.to_string();
    for token in PROJECT_PLACEHOLDERS {
        out = out.replace(token, project);
    }
    for token in LOCATION_PLACEHOLDERS {
        out = out.replace(token, location);
    }
    out
}

/// Remove every `{{#tag}}` / `{{/tag}}` marker, keeping the text around and between them.
pub fn strip_block_markers(text: &str) -> String {
    BLOCK_MARKER.replace_all(text, "").into_owned()
}

/// Inner text of the first `{{#tag}}…{{/tag}}` block, if both markers exist in order.
fn find_block<'a>(template: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("{{{{#{}}}}}", tag);
    let close = format!("{{{{/{}}}}}", tag);
    let start = template.find(&open)? + open.len();
    let len = template[start..].find(&close)?;
    Some(&template[start..start + len])
}

fn finish(text: &str, context: &RenderingContext) -> String {
    substitute_placeholders(&strip_block_markers(text), context)
        .trim()
        .to_string()
}
