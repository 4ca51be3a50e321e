//! Body line CLI commands
//!
//! Anchors (`--after`, `--before`) and removal targets are given as the
//! line text as it appears in the script; the first equal line is used.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;

use super::app::{open_script, save_script};
use super::output::Output;
use crate::domain::{Field, LineEntry};
use crate::storage::Config;

#[derive(Subcommand)]
pub enum LineCommands {
    /// Add a line to the script body
    Add {
        /// Script path
        path: PathBuf,

        /// Line text; anything after the first `#` becomes a comment
        #[arg(default_value = "")]
        text: String,

        /// Insert right after this line
        #[arg(long, conflicts_with = "before")]
        after: Option<String>,

        /// Insert right before this line
        #[arg(long)]
        before: Option<String>,

        /// Add `echo <text>` instead of the raw text
        #[arg(long, conflicts_with = "comment")]
        echo: bool,

        /// Add the text as a comment-only line
        #[arg(long)]
        comment: bool,
    },

    /// Remove the first line equal to the given text
    Remove {
        /// Script path
        path: PathBuf,

        /// Line text
        text: String,
    },

    /// List lines whose command or comment starts with a pattern
    Find {
        /// Script path
        path: PathBuf,

        /// Regular expression matched at the start of the field
        pattern: String,

        /// Field to search (body or annotation)
        #[arg(long, default_value = "body")]
        on: Field,
    },

    /// Print the single line matching a pattern
    Match {
        /// Script path
        path: PathBuf,

        /// Regular expression matched at the start of the rendered line
        pattern: String,
    },

    /// Substitute a pattern in every line
    Replace {
        /// Script path
        path: PathBuf,

        /// Regular expression to replace
        pattern: String,

        /// Replacement text (`$1` refers to capture groups)
        replacement: String,

        /// Field to edit (body or annotation)
        #[arg(long, default_value = "body")]
        on: Field,
    },

    /// Remove every body line, keeping the interpreter and options
    Clear {
        /// Script path
        path: PathBuf,
    },
}

pub fn run(cmd: LineCommands, output: &Output, config: &Config) -> Result<()> {
    match cmd {
        LineCommands::Add {
            path,
            text,
            after,
            before,
            echo,
            comment,
        } => {
            let entry = if echo {
                LineEntry::echo(text.trim(), None)
            } else if comment {
                LineEntry::comment(text.trim())
            } else {
                LineEntry::parse(&text)
            };
            add_line(output, config, &path, entry, after.as_deref(), before.as_deref())
        }
        LineCommands::Remove { path, text } => remove_line(output, config, &path, &text),
        LineCommands::Find { path, pattern, on } => find_lines(output, config, &path, &pattern, on),
        LineCommands::Match { path, pattern } => match_line(output, config, &path, &pattern),
        LineCommands::Replace {
            path,
            pattern,
            replacement,
            on,
        } => replace_lines(output, config, &path, &pattern, &replacement, on),
        LineCommands::Clear { path } => clear_lines(output, config, &path),
    }
}

fn add_line(
    output: &Output,
    config: &Config,
    path: &Path,
    entry: LineEntry,
    after: Option<&str>,
    before: Option<&str>,
) -> Result<()> {
    let after = after.map(LineEntry::parse);
    let before = before.map(LineEntry::parse);

    let mut file = open_script(config, path)?;
    let added = file
        .document_mut()
        .add_entry(entry, after.as_ref(), before.as_ref())?;
    save_script(config, &file)?;

    if output.is_json() {
        output.json(&added)
    } else {
        output.status(&format!("Added line: {}", added))
    }
}

fn remove_line(output: &Output, config: &Config, path: &Path, text: &str) -> Result<()> {
    let mut file = open_script(config, path)?;
    let removed = file.document_mut().remove(&LineEntry::parse(text))?;
    save_script(config, &file)?;

    output.status(&format!("Removed line: {}", removed))
}

fn find_lines(output: &Output, config: &Config, path: &Path, pattern: &str, on: Field) -> Result<()> {
    let file = open_script(config, path)?;
    let doc = file.document();
    output.entries(doc.find_all(pattern, on)?)
}

fn match_line(output: &Output, config: &Config, path: &Path, pattern: &str) -> Result<()> {
    let file = open_script(config, path)?;
    let entry = file.document().match_one(pattern)?;

    if output.is_json() {
        output.json(entry)
    } else {
        output.text(&entry.to_text());
        Ok(())
    }
}

fn replace_lines(
    output: &Output,
    config: &Config,
    path: &Path,
    pattern: &str,
    replacement: &str,
    on: Field,
) -> Result<()> {
    let mut file = open_script(config, path)?;
    let before = file.document().clone();

    let doc = file.document_mut();
    for index in 0..doc.len() {
        if let Some(entry) = doc.get_mut(index) {
            match on {
                Field::Body => entry.replace_body(pattern, replacement)?,
                Field::Annotation => entry.replace_annotation(pattern, replacement)?,
            }
        }
    }

    let changed = before
        .iter()
        .zip(file.document().iter())
        .filter(|(old, new)| old != new)
        .count();

    if changed > 0 {
        save_script(config, &file)?;
    }
    output.status(&format!("Updated {} line(s)", changed))
}

fn clear_lines(output: &Output, config: &Config, path: &Path) -> Result<()> {
    let mut file = open_script(config, path)?;
    let count = file.document().len();
    file.document_mut().clear_body();
    save_script(config, &file)?;

    output.status(&format!("Removed {} line(s)", count))
}
