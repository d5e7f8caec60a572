//! Interactive query entry used when no query is given on the command line

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::types::SearchQuery;

pub const DEFAULT_LOCATION: &str = "São Paulo";

/// Terms searched when the user accepts the default list
pub const DEFAULT_TERMS: [&str; 7] = [
    "Casa do norte",
    "casa de produtos naturais",
    "empório",
    "casa de suplementos",
    "casa de tempero",
    "loja de produtos naturais",
    "emporio de produtos naturais",
];

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Ask for a location and a list of terms.
///
/// `location` skips the location question when already known. An empty
/// result means the user entered no usable term.
pub fn prompt_queries<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    location: Option<String>,
) -> Result<Vec<SearchQuery>> {
    let location = match location {
        Some(location) => location,
        None => {
            let answer = ask(
                input,
                output,
                &format!("Location/city (Enter for '{}'): ", DEFAULT_LOCATION),
            )?;
            if answer.is_empty() {
                DEFAULT_LOCATION.to_string()
            } else {
                answer
            }
        }
    };

    let use_defaults = ask(input, output, "Use the default search list? (s/N): ")?;
    if matches!(use_defaults.to_lowercase().as_str(), "s" | "sim" | "y" | "yes") {
        return Ok(DEFAULT_TERMS
            .iter()
            .map(|term| SearchQuery::new(*term, Some(location.clone())))
            .collect());
    }

    let raw = ask(
        input,
        output,
        "Comma-separated searches (e.g. casa do norte, emporio, loja de suplementos): ",
    )?;
    Ok(SearchQuery::parse_list(&raw, Some(&location)))
}
