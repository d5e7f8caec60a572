use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::types::{Listing, OutputFormat, SearchQuery};

/// Placeholder printed for fields that were not found
pub const NOT_AVAILABLE: &str = "Not available";

const SEPARATOR_WIDTH: usize = 50;

#[derive(Serialize)]
struct Record<'a> {
    query: &'a str,
    #[serde(flatten)]
    listing: &'a Listing,
}

/// Writes listings to an output stream as they are extracted
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
    query: String,
    count: usize,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Reporter {
            out,
            format,
            query: String::new(),
            count: 0,
        }
    }

    /// Announce the query whose listings follow
    pub fn begin_query(&mut self, query: &SearchQuery) -> Result<()> {
        self.query = query.to_string();
        if self.format == OutputFormat::Simple {
            writeln!(self.out, "Searching for: {}", self.query)?;
        }
        Ok(())
    }

    pub fn report(&mut self, listing: &Listing) -> Result<()> {
        match self.format {
            OutputFormat::Simple => {
                for (label, value) in listing.labelled_fields() {
                    writeln!(self.out, "{}: {}", label, value.unwrap_or(NOT_AVAILABLE))?;
                }
                writeln!(self.out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
            }
            OutputFormat::Json => {
                let record = Record {
                    query: &self.query,
                    listing,
                };
                writeln!(self.out, "{}", serde_json::to_string(&record)?)?;
            }
        }
        self.out.flush()?;
        self.count += 1;
        Ok(())
    }

    /// Print the closing summary
    pub fn finish(&mut self) -> Result<()> {
        if self.format == OutputFormat::Simple {
            writeln!(self.out, "Total stores found: {}", self.count)?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Listings written so far
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
#[path = "reporter_test.rs"]
mod reporter_test;
