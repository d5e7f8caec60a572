use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output format for CLI results
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per listing, one per line
    Json,
    /// Human-readable blocks
    #[default]
    Simple,
}

/// One establishment extracted from the results panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Business name
    pub name: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// Phone number as displayed
    pub phone: Option<String>,
    /// Website URL (or its visible text)
    #[serde(rename = "site")]
    pub website: Option<String>,
    /// Category or short description
    pub description: Option<String>,
}

impl Listing {
    /// Fields in reporting order, paired with their labels
    pub fn labelled_fields(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("Name", self.name.as_deref()),
            ("Address", self.address.as_deref()),
            ("Phone", self.phone.as_deref()),
            ("Site", self.website.as_deref()),
            ("Description", self.description.as_deref()),
        ]
    }
}

/// A search term with an optional location qualifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub location: Option<String>,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, location: Option<String>) -> Self {
        SearchQuery {
            term: term.into(),
            location: location.filter(|l| !l.trim().is_empty()),
        }
    }

    /// Split a comma-separated list of terms, dropping blanks
    pub fn parse_list(raw: &str, location: Option<&str>) -> Vec<SearchQuery> {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| SearchQuery::new(t, location.map(str::to_string)))
            .collect()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} in {}", self.term.trim(), location.trim()),
            None => write!(f, "{}", self.term.trim()),
        }
    }
}

/// Browser viewport dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl ViewportSize {
    /// Parse viewport size from "WIDTHxHEIGHT" format (e.g., "1920x1080")
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid viewport format. Use WIDTHxHEIGHT (e.g., 1920x1080)");
        }

        let width = parts[0]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid width in viewport size"))?;
        let height = parts[1]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid height in viewport size"))?;

        Ok(ViewportSize { width, height })
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
