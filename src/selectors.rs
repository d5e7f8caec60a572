//! Page locators for the map application
//!
//! Every field is looked up through an ordered chain of selectors; the first
//! one that yields text wins. The defaults target Google Maps and can be
//! replaced from a JSON file when the page markup changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single element locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    pub fn css(s: &str) -> Self {
        Selector::Css(s.to_string())
    }

    pub fn xpath(s: &str) -> Self {
        Selector::XPath(s.to_string())
    }

    pub fn as_locator(&self) -> fantoccini::Locator<'_> {
        match self {
            Selector::Css(s) => fantoccini::Locator::Css(s),
            Selector::XPath(s) => fantoccini::Locator::XPath(s),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(s) => write!(f, "{}", s),
            Selector::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

/// Fallback chains for each listing field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSelectors {
    pub name: Vec<Selector>,
    pub address: Vec<Selector>,
    pub phone: Vec<Selector>,
    pub website: Vec<Selector>,
    pub description: Vec<Selector>,
}

impl Default for FieldSelectors {
    fn default() -> Self {
        FieldSelectors {
            name: vec![
                Selector::css(".DUwDvf"),
                Selector::css("h1"),
                Selector::css("h1 span[jsaction]"),
            ],
            address: vec![
                Selector::css(r#"button[data-item-id="address"]"#),
                Selector::css(r#"button[aria-label*="Endereço"]"#),
                Selector::css(r#"[data-item-id="address"] .section-info-text"#),
                Selector::xpath(
                    "//button[contains(@aria-label,'Endereço') or contains(@data-item-id,'address')]//div/span",
                ),
            ],
            phone: vec![
                Selector::css(r#"button[data-item-id^="phone"]"#),
                Selector::css(r#"button[aria-label*="Telefone"]"#),
                Selector::css(r#"a[href^="tel:"]"#),
                Selector::xpath(
                    "//button[contains(@aria-label,'Telefone') or contains(@data-item-id,'phone')]//div/span",
                ),
            ],
            website: vec![
                Selector::css(r#"a[data-item-id="authority"]"#),
                Selector::css(r#"a[data-item-id="website"]"#),
                Selector::css(r#"a[aria-label^="Site"]"#),
                Selector::css(r#"a[aria-label*="Website"]"#),
                Selector::css(r#"a[href^="http"]"#),
            ],
            description: vec![
                Selector::css(".qW6peb"),
                Selector::css(".HlvSq"),
                Selector::css(r#"[data-tooltip*="categoria"]"#),
            ],
        }
    }
}

/// Every locator the scraper needs, page-level and per-field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    /// Search input on the start page
    pub search_box: Selector,
    /// Any of these marks the results panel as rendered
    pub results_panel: Vec<Selector>,
    /// One element per result
    pub result_card: Selector,
    /// Scrollable container holding the cards, first match is used
    pub scroll_container: Vec<Selector>,
    pub fields: FieldSelectors,
}

impl Default for SelectorSet {
    fn default() -> Self {
        SelectorSet {
            search_box: Selector::css("#searchboxinput"),
            results_panel: vec![
                Selector::css(r#"div[role="feed"]"#),
                Selector::css(r#"div[aria-label^="Results for"]"#),
            ],
            result_card: Selector::css(".Nv2PK"),
            scroll_container: vec![
                Selector::css(r#"div[role="feed"]"#),
                Selector::css(r#"div[aria-label^="Results for"]"#),
                Selector::css(r#"div[role="region"]"#),
            ],
            fields: FieldSelectors::default(),
        }
    }
}

impl SelectorSet {
    /// Load a selector file; keys missing from the file keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read selector file {}", path.display()))?;
        let set: SelectorSet = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid selector file {}", path.display()))?;
        set.validate()?;
        debug!("Loaded selectors from {}", path.display());
        Ok(set)
    }

    /// Resolve the selector set: explicit file, then the per-user file, then defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::user_file() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `~/.mapprobe/selectors.json`
    pub fn user_file() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".mapprobe").join("selectors.json"))
    }

    fn validate(&self) -> Result<()> {
        if self.results_panel.is_empty() {
            anyhow::bail!("Selector file must list at least one results_panel selector");
        }
        let fields = &self.fields;
        for (label, chain) in [
            ("name", &fields.name),
            ("address", &fields.address),
            ("phone", &fields.phone),
            ("website", &fields.website),
            ("description", &fields.description),
        ] {
            if chain.is_empty() {
                anyhow::bail!("Selector chain for '{}' is empty", label);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "selectors_test.rs"]
mod selectors_test;
