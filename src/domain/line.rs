//! Script body lines
//!
//! Each line after the directive block is a [`LineEntry`]: a command
//! fragment plus an optional trailing `#` comment. Entries compare by value,
//! so two lines with the same text are interchangeable for anchoring and
//! removal.
//!
//! Every constructor stores the same form the parser would produce: both
//! halves trimmed, no `#` in the body, no empty annotation. A `#` handed in
//! as part of a body starts the annotation, exactly as it would on disk.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Character that separates a command from its comment
pub const COMMENT_MARKER: char = '#';

/// Selects which part of a line a search looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    #[default]
    Body,
    Annotation,
}

impl std::str::FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "body" | "cmd" | "command" => Ok(Field::Body),
            "annotation" | "comment" => Ok(Field::Annotation),
            _ => Err(format!("Unknown line field: {}", s)),
        }
    }
}

/// One line of the script body
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct LineEntry {
    body: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    annotation: Option<String>,
}

impl LineEntry {
    /// Creates an entry from a command and an optional comment.
    ///
    /// A `#` inside `body` splits it the way [`parse`](Self::parse) does; the
    /// text after it is placed in front of `annotation`.
    pub fn new(body: impl Into<String>, annotation: Option<String>) -> Self {
        let body = body.into();
        if body.contains(COMMENT_MARKER) {
            return Self::parse(&Self::from_parts(&body, annotation.as_deref()).to_text());
        }
        Self::from_parts(&body, annotation.as_deref())
    }

    fn from_parts(body: &str, annotation: Option<&str>) -> Self {
        Self {
            body: body.trim().to_string(),
            annotation: annotation
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
        }
    }

    /// Creates a command line without a comment
    pub fn command(body: impl Into<String>) -> Self {
        Self::new(body, None)
    }

    /// Creates a comment-only line
    pub fn comment(text: impl Into<String>) -> Self {
        Self::new(String::new(), Some(text.into()))
    }

    /// Creates an empty line
    pub fn blank() -> Self {
        Self::default()
    }

    /// Creates an `echo <text>` command line
    pub fn echo(text: &str, annotation: Option<String>) -> Self {
        Self::new(format!("echo {}", text), annotation)
    }

    /// Splits text on the first comment marker into body and annotation,
    /// trimming both halves
    pub fn parse(text: &str) -> Self {
        match text.split_once(COMMENT_MARKER) {
            Some((body, annotation)) => Self::from_parts(body, Some(annotation)),
            None => Self::from_parts(text, None),
        }
    }

    /// Returns the command text
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    /// Returns the annotation, empty if there is none
    pub fn annotation_str(&self) -> &str {
        self.annotation.as_deref().unwrap_or("")
    }

    /// Returns the selected field
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Body => &self.body,
            Field::Annotation => self.annotation_str(),
        }
    }

    /// Returns true if both body and annotation are empty
    pub fn is_blank(&self) -> bool {
        self.body.is_empty() && self.annotation.is_none()
    }

    /// Returns true if the line only carries a comment
    pub fn is_comment(&self) -> bool {
        self.body.is_empty() && self.annotation.is_some()
    }

    /// Renders the line as it appears in the script
    pub fn to_text(&self) -> String {
        match self.annotation.as_deref() {
            Some(annotation) if !annotation.is_empty() => {
                if self.body.is_empty() {
                    format!("{} {}", COMMENT_MARKER, annotation)
                } else {
                    format!("{} {} {}", self.body, COMMENT_MARKER, annotation)
                }
            }
            _ => self.body.clone(),
        }
    }

    /// Substitutes every match of `pattern` in the body.
    ///
    /// `replacement` uses the `regex` crate syntax (`$1`, `${name}`). A `#`
    /// introduced by the replacement starts the annotation.
    pub fn replace_body(&mut self, pattern: &str, replacement: &str) -> Result<(), regex::Error> {
        let re = Regex::new(pattern)?;
        let replaced = re.replace_all(&self.body, replacement).into_owned();
        *self = Self::new(replaced, self.annotation.take());
        Ok(())
    }

    /// Substitutes every match of `pattern` in the annotation.
    ///
    /// A missing annotation is treated as empty text; an empty result
    /// clears it.
    pub fn replace_annotation(
        &mut self,
        pattern: &str,
        replacement: &str,
    ) -> Result<(), regex::Error> {
        let re = Regex::new(pattern)?;
        let replaced = re.replace_all(self.annotation_str(), replacement).into_owned();
        *self = Self::from_parts(&self.body, Some(&replaced));
        Ok(())
    }
}

impl fmt::Display for LineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for LineEntry {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}
