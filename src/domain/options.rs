//! `#SBATCH` option store
//!
//! Options are the scheduler directives at the top of a batch script.
//! The store keeps them in insertion order and only accepts keys from the
//! recognized vocabulary.

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;

use super::vocabulary::{external_key, is_known_option, normalize_key};

/// Literal token that starts every directive line
pub const DIRECTIVE_PREFIX: &str = "#SBATCH";

/// Column width of the key field when directives are indented
const INDENT_WIDTH: usize = 20;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Malformed directive (expected '#SBATCH --key=value'): {0}")]
    MalformedDirective(String),
}

/// A single validated option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    key: String,
    value: String,
}

impl Directive {
    /// Creates a directive, normalizing and validating the key.
    ///
    /// The value is trimmed, as it would be when read back from a script.
    pub fn new(key: &str, value: impl ToString) -> Result<Self, OptionError> {
        let key = normalize_key(key);
        if !is_known_option(&key) {
            return Err(OptionError::InvalidOption(key));
        }

        Ok(Self {
            key,
            value: value.to_string().trim().to_string(),
        })
    }

    /// Parses a single `#SBATCH --key=value` line
    pub fn parse(line: &str) -> Result<Self, OptionError> {
        let trimmed = line.trim();
        let rest = trimmed
            .strip_prefix(DIRECTIVE_PREFIX)
            .ok_or_else(|| OptionError::MalformedDirective(trimmed.to_string()))?;

        let (key, value) = rest
            .split_once('=')
            .ok_or_else(|| OptionError::MalformedDirective(trimmed.to_string()))?;

        Self::new(key, value)
    }

    /// Returns the canonical key (`job_name`)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the textual value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Renders the directive line, optionally justifying the key column
    pub fn to_line(&self, indent: bool) -> String {
        let width = if indent { INDENT_WIDTH } else { 0 };
        format!(
            "{} --{:<width$}={}",
            DIRECTIVE_PREFIX,
            external_key(&self.key),
            self.value,
            width = width
        )
    }
}

/// Ordered, key-unique collection of [`Directive`]s
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionStore {
    directives: Vec<Directive>,
}

impl OptionStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.directives.iter().position(|d| d.key == key)
    }

    /// Gets the value for a key in either hyphenated or canonical form
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = normalize_key(key);
        self.position(&key).map(|i| self.directives[i].value.as_str())
    }

    /// Sets a value.
    ///
    /// An existing key keeps its position and only has its value replaced.
    /// Unknown keys are rejected and leave the store untouched.
    pub fn set(&mut self, key: &str, value: impl ToString) -> Result<(), OptionError> {
        self.insert(Directive::new(key, value)?);
        Ok(())
    }

    /// Chaining form of [`set`](Self::set)
    pub fn with(mut self, key: &str, value: impl ToString) -> Result<Self, OptionError> {
        self.set(key, value)?;
        Ok(self)
    }

    fn insert(&mut self, directive: Directive) {
        match self.position(&directive.key) {
            Some(i) => self.directives[i].value = directive.value,
            None => self.directives.push(directive),
        }
    }

    /// Sets several values at once.
    ///
    /// Every key is validated before the first assignment, so a single bad
    /// key leaves the store unchanged.
    pub fn update<K, V, I>(&mut self, pairs: I) -> Result<(), OptionError>
    where
        K: AsRef<str>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        let directives = pairs
            .into_iter()
            .map(|(k, v)| Directive::new(k.as_ref(), v))
            .collect::<Result<Vec<_>, _>>()?;

        for directive in directives {
            self.insert(directive);
        }
        Ok(())
    }

    /// Removes a key, returning its value if it was present
    pub fn delete(&mut self, key: &str) -> Option<String> {
        let key = normalize_key(key);
        self.position(&key).map(|i| self.directives.remove(i).value)
    }

    /// Returns true if the key is present
    pub fn contains(&self, key: &str) -> bool {
        self.position(&normalize_key(key)).is_some()
    }

    /// Returns true if every given key is present
    pub fn require<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        keys.iter().all(|k| self.contains(k.as_ref()))
    }

    /// Returns the canonical form of every given key that is absent
    pub fn missing<S: AsRef<str>>(&self, keys: &[S]) -> Vec<String> {
        keys.iter()
            .map(|k| normalize_key(k.as_ref()))
            .filter(|k| self.position(k).is_none())
            .collect()
    }

    /// Removes every option
    pub fn clear(&mut self) {
        self.directives.clear();
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Iterates over `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.directives
            .iter()
            .map(|d| (d.key.as_str(), d.value.as_str()))
    }

    /// Iterates over canonical keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.directives.iter().map(|d| d.key.as_str())
    }

    /// Returns the directives in insertion order
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Parses a block of directive lines. Blank lines are ignored; the
    /// first malformed or unknown directive aborts the parse.
    pub fn parse_block(text: &str) -> Result<Self, OptionError> {
        let mut store = Self::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            store.push_line(line)?;
        }
        Ok(store)
    }

    /// Parses one directive line into the store
    pub(crate) fn push_line(&mut self, line: &str) -> Result<(), OptionError> {
        self.insert(Directive::parse(line)?);
        Ok(())
    }

    /// Renders one directive line per option
    pub fn directive_lines(&self, indent: bool) -> impl Iterator<Item = String> + '_ {
        self.directives.iter().map(move |d| d.to_line(indent))
    }

    /// Renders the directive block, lines joined with `\n` and no trailing newline
    pub fn serialize_block(&self, indent: bool) -> String {
        self.directive_lines(indent).collect::<Vec<_>>().join("\n")
    }
}

impl fmt::Display for OptionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:<width$}{}", format!("{}:", key), value, width = INDENT_WIDTH)?;
        }
        Ok(())
    }
}

impl Serialize for OptionStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
