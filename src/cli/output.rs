//! Rendering of command results as text or JSON

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::LineEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Writes command results to stdout in the selected format
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Reports what a command did; `{"message": ...}` in JSON mode
    pub fn status(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => self.json(&serde_json::json!({ "message": message }))?,
        }
        Ok(())
    }

    /// Prints a value as a single line of JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value).context("Failed to encode JSON output")?;
        println!("{}", encoded);
        Ok(())
    }

    /// Prints body lines as they appear in the script, or as a JSON array
    pub fn entries<'a, I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a LineEntry>,
    {
        let entries: Vec<&LineEntry> = entries.into_iter().collect();
        match self.format {
            OutputFormat::Text => entries.iter().for_each(|entry| println!("{}", entry)),
            OutputFormat::Json => self.json(&entries)?,
        }
        Ok(())
    }

    /// Prints text in text mode only
    pub fn text(&self, text: &str) {
        if !self.is_json() {
            println!("{}", text);
        }
    }
}
