//! Batch script document model
//!
//! A [`ScriptDocument`] is the in-memory form of a SLURM batch script:
//!
//! ```text
//! #!/bin/bash                  <- interpreter line
//! #SBATCH --job-name=foo       <- directive block (OptionStore)
//! #SBATCH --time=01:00:00
//!
//! module load gcc              <- body (LineEntry sequence)
//! srun ./a.out # run it
//! ```
//!
//! Only the first contiguous run of `#SBATCH` lines is read as directives;
//! a directive-looking line further down is an ordinary body line.
//!
//! Body lines are matched by value. Anchored inserts and [`remove`]
//! always act on the first entry equal to the one given; use the index
//! based methods to target a specific duplicate.
//!
//! [`remove`]: ScriptDocument::remove

use std::fmt;
use std::ops::{Index, Range};
use std::str::FromStr;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

use super::line::{Field, LineEntry};
use super::options::{OptionError, OptionStore, DIRECTIVE_PREFIX};
use super::submit::{JobHandle, Submitter};

/// Marker that starts the interpreter line
pub const INTERPRETER_MARKER: &str = "#!";

/// Interpreter used when a script has no `#!` line
pub const DEFAULT_INTERPRETER: &str = "/bin/bash";

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Option(#[from] OptionError),

    #[error("Anchor line not found: '{0}'")]
    AnchorNotFound(String),

    #[error("Only one of 'after' and 'before' can be specified")]
    ArgumentConflict,

    #[error("No lines match '{0}'")]
    NoMatch(String),

    #[error("Multiple lines ({count}) match '{pattern}'")]
    AmbiguousMatch { pattern: String, count: usize },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Line index {index} out of range for script body of {len} lines")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Output settings for [`ScriptDocument::dumps_with`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpStyle {
    /// Separator placed after every line, including the last
    pub line_separator: String,

    /// Justify directive keys to a fixed column
    pub indent: bool,
}

impl Default for DumpStyle {
    fn default() -> Self {
        Self {
            line_separator: "\n".to_string(),
            indent: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Start,
    PreDirectives,
    Directives,
    Body,
}

fn is_directive(line: &str) -> bool {
    line.trim_start().starts_with(DIRECTIVE_PREFIX)
}

/// Leftmost match is reported first, so a match at offset 0 exists iff
/// `find` returns one there
fn matches_at_start(re: &Regex, text: &str) -> bool {
    re.find(text).is_some_and(|m| m.start() == 0)
}

/// A batch script: interpreter, directives and body lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptDocument {
    interpreter: String,
    options: OptionStore,
    lines: Vec<LineEntry>,
}

impl Default for ScriptDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptDocument {
    /// Creates an empty script using the default interpreter
    pub fn new() -> Self {
        Self::with_interpreter(DEFAULT_INTERPRETER)
    }

    /// Creates an empty script with the given interpreter
    pub fn with_interpreter(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            options: OptionStore::new(),
            lines: Vec::new(),
        }
    }

    /// Creates an empty-bodied script with initial options
    pub fn with_options(options: OptionStore) -> Self {
        Self {
            options,
            ..Self::new()
        }
    }

    /// Parses script text, falling back to the default interpreter
    pub fn parse(text: &str) -> Result<Self, ScriptError> {
        Self::parse_with_default(text, DEFAULT_INTERPRETER)
    }

    /// Parses script text, using `default_interpreter` if there is no `#!` line
    pub fn parse_with_default(text: &str, default_interpreter: &str) -> Result<Self, ScriptError> {
        let source: Vec<&str> = text.lines().collect();
        let mut doc = Self::with_interpreter(default_interpreter);
        let mut pos = 0;
        let mut state = ParseState::Start;

        loop {
            state = match state {
                ParseState::Start => {
                    if let Some(rest) = source.first().and_then(|l| l.strip_prefix(INTERPRETER_MARKER)) {
                        doc.interpreter = rest.trim().to_string();
                        pos = 1;
                    }
                    ParseState::PreDirectives
                }
                ParseState::PreDirectives => {
                    // Leading blanks belong to the header only if directives follow
                    let next = source[pos..]
                        .iter()
                        .position(|l| !l.trim().is_empty())
                        .map(|offset| pos + offset);
                    if let Some(i) = next.filter(|&i| is_directive(source[i])) {
                        pos = i;
                    }
                    ParseState::Directives
                }
                ParseState::Directives => {
                    while pos < source.len() && is_directive(source[pos]) {
                        doc.options.push_line(source[pos])?;
                        pos += 1;
                    }
                    ParseState::Body
                }
                ParseState::Body => {
                    // One blank line separates the header from the body
                    if source.get(pos).is_some_and(|l| l.trim().is_empty()) {
                        pos += 1;
                    }
                    doc.lines = source[pos..].iter().map(|l| LineEntry::parse(l)).collect();
                    break;
                }
            };
            trace!(?state, line = pos, "script parser transition");
        }

        debug!(
            interpreter = %doc.interpreter,
            options = doc.options.len(),
            lines = doc.lines.len(),
            "parsed script"
        );
        Ok(doc)
    }

    /// Replaces the whole document with parsed text.
    ///
    /// The current interpreter is kept when the text has no `#!` line. On
    /// error the document is left as it was.
    pub fn loads(&mut self, text: &str) -> Result<(), ScriptError> {
        *self = Self::parse_with_default(text, &self.interpreter)?;
        Ok(())
    }

    /// Serializes with `\n` separators and unindented directives
    pub fn dumps(&self) -> String {
        self.dumps_with(&DumpStyle::default())
    }

    /// Serializes using the given style
    pub fn dumps_with(&self, style: &DumpStyle) -> String {
        let mut out = vec![format!("{}{}", INTERPRETER_MARKER, self.interpreter)];
        out.extend(self.options.directive_lines(style.indent));

        if !self.lines.is_empty() {
            out.push(String::new());
            out.extend(self.lines.iter().map(LineEntry::to_text));
        }

        let sep = style.line_separator.as_str();
        let mut text = out.join(sep);
        text.push_str(sep);
        text
    }

    /// Serializes the script and hands it to a submitter
    pub fn submit(&self, submitter: &dyn Submitter) -> anyhow::Result<JobHandle> {
        let script = self.dumps();
        debug!(options = self.options.len(), lines = self.lines.len(), "submitting script");
        submitter.submit(&script)
    }

    // Header

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    pub fn set_interpreter(&mut self, interpreter: impl Into<String>) {
        self.interpreter = interpreter.into();
    }

    pub fn options(&self) -> &OptionStore {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionStore {
        &mut self.options
    }

    // Index-based access

    /// Returns all body lines in order
    pub fn lines(&self) -> &[LineEntry] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineEntry> {
        self.lines.iter()
    }

    pub fn get(&self, index: usize) -> Option<&LineEntry> {
        self.lines.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut LineEntry> {
        self.lines.get_mut(index)
    }

    /// Returns a contiguous run of lines
    pub fn get_range(&self, range: Range<usize>) -> Option<&[LineEntry]> {
        self.lines.get(range)
    }

    fn check_index(&self, index: usize, len: usize) -> Result<(), ScriptError> {
        if index >= len {
            return Err(ScriptError::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), ScriptError> {
        let len = self.lines.len();
        if range.start > range.end || range.end > len {
            let index = if range.start > len { range.start } else { range.end };
            return Err(ScriptError::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    /// Replaces the line at `index`, returning the old one
    pub fn set(&mut self, index: usize, entry: LineEntry) -> Result<LineEntry, ScriptError> {
        self.check_index(index, self.lines.len())?;
        Ok(std::mem::replace(&mut self.lines[index], entry))
    }

    /// Replaces a contiguous run of lines with any number of new lines
    pub fn set_range<I>(&mut self, range: Range<usize>, entries: I) -> Result<(), ScriptError>
    where
        I: IntoIterator<Item = LineEntry>,
    {
        self.check_range(&range)?;
        self.lines.splice(range, entries);
        Ok(())
    }

    /// Removes the line at `index`
    pub fn delete(&mut self, index: usize) -> Result<LineEntry, ScriptError> {
        self.check_index(index, self.lines.len())?;
        Ok(self.lines.remove(index))
    }

    /// Removes a contiguous run of lines
    pub fn delete_range(&mut self, range: Range<usize>) -> Result<Vec<LineEntry>, ScriptError> {
        self.check_range(&range)?;
        Ok(self.lines.drain(range).collect())
    }

    /// Inserts a line before `index`; `index == len()` appends
    pub fn insert(&mut self, index: usize, entry: LineEntry) -> Result<(), ScriptError> {
        self.check_index(index, self.lines.len() + 1)?;
        self.lines.insert(index, entry);
        Ok(())
    }

    /// Appends a line
    pub fn push(&mut self, entry: LineEntry) {
        self.lines.push(entry);
    }

    /// Returns the index of the first line equal to `entry`
    pub fn position(&self, entry: &LineEntry) -> Option<usize> {
        self.lines.iter().position(|l| l == entry)
    }

    // Anchored editing

    fn anchored_index(
        &self,
        after: Option<&LineEntry>,
        before: Option<&LineEntry>,
    ) -> Result<usize, ScriptError> {
        match (after, before) {
            (Some(_), Some(_)) => Err(ScriptError::ArgumentConflict),
            (Some(anchor), None) => self
                .position(anchor)
                .map(|i| i + 1)
                .ok_or_else(|| ScriptError::AnchorNotFound(anchor.to_text())),
            (None, Some(anchor)) => self
                .position(anchor)
                .ok_or_else(|| ScriptError::AnchorNotFound(anchor.to_text())),
            (None, None) => Ok(self.lines.len()),
        }
    }

    /// Inserts an entry at the end, right after `after`, or right before
    /// `before`. Returns a copy of the inserted entry.
    pub fn add_entry(
        &mut self,
        entry: LineEntry,
        after: Option<&LineEntry>,
        before: Option<&LineEntry>,
    ) -> Result<LineEntry, ScriptError> {
        let index = self.anchored_index(after, before)?;
        self.lines.insert(index, entry.clone());
        Ok(entry)
    }

    /// Adds a line of script text, splitting it on the first `#` into
    /// command and comment
    pub fn add(
        &mut self,
        text: &str,
        after: Option<&LineEntry>,
        before: Option<&LineEntry>,
    ) -> Result<LineEntry, ScriptError> {
        self.add_entry(LineEntry::parse(text), after, before)
    }

    /// Adds a command with an explicit comment
    pub fn add_command(
        &mut self,
        body: &str,
        annotation: Option<&str>,
        after: Option<&LineEntry>,
        before: Option<&LineEntry>,
    ) -> Result<LineEntry, ScriptError> {
        let entry = LineEntry::new(body, annotation.map(str::to_string));
        self.add_entry(entry, after, before)
    }

    /// Adds a comment-only line
    pub fn add_comment(
        &mut self,
        text: &str,
        after: Option<&LineEntry>,
        before: Option<&LineEntry>,
    ) -> Result<LineEntry, ScriptError> {
        self.add_entry(LineEntry::comment(text), after, before)
    }

    /// Adds an empty line
    pub fn add_blank_line(
        &mut self,
        after: Option<&LineEntry>,
        before: Option<&LineEntry>,
    ) -> Result<LineEntry, ScriptError> {
        self.add_entry(LineEntry::blank(), after, before)
    }

    /// Adds an `echo <text>` command
    pub fn add_echo(
        &mut self,
        text: &str,
        annotation: Option<&str>,
        after: Option<&LineEntry>,
        before: Option<&LineEntry>,
    ) -> Result<LineEntry, ScriptError> {
        let entry = LineEntry::echo(text, annotation.map(str::to_string));
        self.add_entry(entry, after, before)
    }

    /// Removes the first line equal to `entry`
    pub fn remove(&mut self, entry: &LineEntry) -> Result<LineEntry, ScriptError> {
        let index = self
            .position(entry)
            .ok_or_else(|| ScriptError::AnchorNotFound(entry.to_text()))?;
        Ok(self.lines.remove(index))
    }

    /// Removes every body line. Interpreter and options are untouched.
    pub fn clear_body(&mut self) {
        self.lines.clear();
    }

    // Search

    /// Returns every line whose selected field starts with a match of `pattern`
    pub fn find_all(&self, pattern: &str, on: Field) -> Result<Vec<&LineEntry>, ScriptError> {
        let re = Regex::new(pattern)?;
        Ok(self
            .lines
            .iter()
            .filter(|l| matches_at_start(&re, l.field(on)))
            .collect())
    }

    /// Returns every line whose rendered text starts with a match of `pattern`
    pub fn match_all(&self, pattern: &str) -> Result<Vec<&LineEntry>, ScriptError> {
        let re = Regex::new(pattern)?;
        Ok(self
            .lines
            .iter()
            .filter(|l| matches_at_start(&re, &l.to_text()))
            .collect())
    }

    /// Returns the single line whose rendered text matches `pattern`.
    ///
    /// Zero or several matches are errors.
    pub fn match_one(&self, pattern: &str) -> Result<&LineEntry, ScriptError> {
        let matches = self.match_all(pattern)?;
        match matches.as_slice() {
            [] => Err(ScriptError::NoMatch(pattern.to_string())),
            [only] => Ok(only),
            _ => Err(ScriptError::AmbiguousMatch {
                pattern: pattern.to_string(),
                count: matches.len(),
            }),
        }
    }
}

impl FromStr for ScriptDocument {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScriptDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dumps())
    }
}

impl Index<usize> for ScriptDocument {
    type Output = LineEntry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lines[index]
    }
}

impl<'a> IntoIterator for &'a ScriptDocument {
    type Item = &'a LineEntry;
    type IntoIter = std::slice::Iter<'a, LineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_A: &str =
        "#!/bin/bash\n#SBATCH --job-name=foo\n#SBATCH --time=01:00:00\n\necho hi\n";

    fn scenario_a() -> ScriptDocument {
        ScriptDocument::parse(SCENARIO_A).unwrap()
    }

    fn bodies(doc: &ScriptDocument) -> Vec<&str> {
        doc.iter().map(LineEntry::body).collect()
    }

    #[test]
    fn parses_header_options_and_body() {
        let doc = scenario_a();

        assert_eq!(doc.interpreter(), "/bin/bash");
        let options: Vec<_> = doc.options().iter().collect();
        assert_eq!(options, vec![("job_name", "foo"), ("time", "01:00:00")]);
        assert_eq!(doc.lines(), &[LineEntry::command("echo hi")]);
    }

    #[test]
    fn dumps_reproduces_input() {
        assert_eq!(scenario_a().dumps(), SCENARIO_A);
    }

    #[test]
    fn add_after_anchor() {
        let mut doc = scenario_a();
        let hi = doc[0].clone();

        doc.add("echo bye", Some(&hi), None).unwrap();
        assert_eq!(bodies(&doc), vec!["echo hi", "echo bye"]);
    }

    #[test]
    fn find_all_in_order() {
        let mut doc = scenario_a();
        let hi = doc[0].clone();
        doc.add("echo bye", Some(&hi), None).unwrap();

        let found = doc.find_all("echo", Field::Body).unwrap();
        assert_eq!(found, vec![&doc[0], &doc[1]]);
    }

    #[test]
    fn missing_shebang_uses_default() {
        let doc = ScriptDocument::parse_with_default("#SBATCH --nodes=1\nhostname\n", "/bin/sh").unwrap();
        assert_eq!(doc.interpreter(), "/bin/sh");
        assert_eq!(doc.options().get("nodes"), Some("1"));
        assert_eq!(bodies(&doc), vec!["hostname"]);
    }

    #[test]
    fn loads_keeps_interpreter_without_shebang() {
        let mut doc = ScriptDocument::with_interpreter("/usr/bin/zsh");
        doc.loads("echo x\n").unwrap();
        assert_eq!(doc.interpreter(), "/usr/bin/zsh");
    }

    #[test]
    fn empty_text() {
        let doc = ScriptDocument::parse("").unwrap();
        assert_eq!(doc, ScriptDocument::new());
        assert_eq!(doc.dumps(), "#!/bin/bash\n");
    }

    #[test]
    fn blank_lines_before_directives_are_skipped() {
        let doc = ScriptDocument::parse("#!/bin/sh\n\n\n#SBATCH --time=5\n\ndate\n").unwrap();
        assert_eq!(doc.options().get("time"), Some("5"));
        assert_eq!(bodies(&doc), vec!["date"]);
    }

    #[test]
    fn only_first_directive_block_is_read() {
        let text = "#!/bin/bash\n#SBATCH --time=5\n\necho a\n#SBATCH --nodes=2\n";
        let doc = ScriptDocument::parse(text).unwrap();

        assert_eq!(doc.options().len(), 1);
        assert!(!doc.options().contains("nodes"));
        assert_eq!(doc[1], LineEntry::comment("SBATCH --nodes=2"));
    }

    #[test]
    fn body_comments_are_split() {
        let doc = ScriptDocument::parse("#!/bin/bash\n\n# setup\nmodule load gcc  #  compiler \n").unwrap();
        assert_eq!(doc[0], LineEntry::comment("setup"));
        assert_eq!(doc[1], LineEntry::new("module load gcc", Some("compiler".into())));
    }

    #[test]
    fn malformed_directive_fails() {
        let err = ScriptDocument::parse("#!/bin/bash\n#SBATCH --exclusive\n").unwrap_err();
        assert!(matches!(err, ScriptError::Option(OptionError::MalformedDirective(_))));
    }

    #[test]
    fn unknown_directive_fails_and_loads_leaves_document() {
        let mut doc = scenario_a();
        let before = doc.clone();

        let err = doc.loads("#!/bin/zsh\n#SBATCH --bogus=1\n").unwrap_err();
        assert!(matches!(err, ScriptError::Option(OptionError::InvalidOption(_))));
        assert_eq!(doc, before);
    }

    #[test]
    fn leading_blank_body_lines_roundtrip() {
        let mut doc = ScriptDocument::new();
        doc.add_blank_line(None, None).unwrap();
        doc.add("date", None, None).unwrap();

        let parsed = ScriptDocument::parse(&doc.dumps()).unwrap();
        assert_eq!(parsed, doc);

        doc.options_mut().set("time", "1").unwrap();
        let parsed = ScriptDocument::parse(&doc.dumps()).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn dumps_with_crlf_and_indent() {
        let doc = scenario_a();
        let style = DumpStyle {
            line_separator: "\r\n".to_string(),
            indent: true,
        };

        let text = doc.dumps_with(&style);
        assert!(text.starts_with("#!/bin/bash\r\n#SBATCH --job-name            =foo\r\n"));
        assert!(text.ends_with("echo hi\r\n"));
        assert_eq!(ScriptDocument::parse(&text).unwrap(), doc);
    }

    #[test]
    fn add_before_anchor() {
        let mut doc = scenario_a();
        let hi = doc[0].clone();

        doc.add_comment("greeting", None, Some(&hi)).unwrap();
        assert_eq!(doc[0], LineEntry::comment("greeting"));
        assert_eq!(doc[1], hi);
    }

    #[test]
    fn add_defaults_to_end_and_splits_comment() {
        let mut doc = scenario_a();
        let added = doc.add("srun ./a.out # main step", None, None).unwrap();

        assert_eq!(added, LineEntry::new("srun ./a.out", Some("main step".into())));
        assert_eq!(doc.lines().last(), Some(&added));
    }

    #[test]
    fn add_with_both_anchors_conflicts() {
        let mut doc = scenario_a();
        let hi = doc[0].clone();

        let err = doc.add("x", Some(&hi), Some(&hi)).unwrap_err();
        assert!(matches!(err, ScriptError::ArgumentConflict));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn add_with_missing_anchor_fails() {
        let mut doc = scenario_a();
        let ghost = LineEntry::command("not here");

        assert!(matches!(
            doc.add("x", Some(&ghost), None),
            Err(ScriptError::AnchorNotFound(_))
        ));
        assert!(matches!(
            doc.add_blank_line(None, Some(&ghost)),
            Err(ScriptError::AnchorNotFound(_))
        ));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn anchors_use_first_duplicate() {
        let mut doc = ScriptDocument::new();
        doc.add("echo x", None, None).unwrap();
        doc.add("echo y", None, None).unwrap();
        doc.add("echo x", None, None).unwrap();

        let x = LineEntry::command("echo x");
        doc.add("echo z", Some(&x), None).unwrap();
        assert_eq!(bodies(&doc), vec!["echo x", "echo z", "echo y", "echo x"]);

        doc.remove(&x).unwrap();
        assert_eq!(bodies(&doc), vec!["echo z", "echo y", "echo x"]);
    }

    #[test]
    fn echo_and_command_helpers() {
        let mut doc = ScriptDocument::new();
        let echo = doc.add_echo("start", Some("log"), None, None).unwrap();
        let cmd = doc.add_command("make", None, None, Some(&echo)).unwrap();

        assert_eq!(echo.to_text(), "echo start # log");
        assert_eq!(doc.lines(), &[cmd, echo]);
    }

    #[test]
    fn remove_missing_fails() {
        let mut doc = scenario_a();
        let err = doc.remove(&LineEntry::command("echo bye")).unwrap_err();
        assert!(matches!(err, ScriptError::AnchorNotFound(_)));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn clear_body_keeps_header() {
        let mut doc = scenario_a();
        doc.clear_body();

        assert!(doc.is_empty());
        assert_eq!(doc.options().len(), 2);
        assert_eq!(doc.dumps(), "#!/bin/bash\n#SBATCH --job-name=foo\n#SBATCH --time=01:00:00\n");
    }

    #[test]
    fn index_operations() {
        let mut doc = ScriptDocument::new();
        for cmd in ["a", "b", "c", "d"] {
            doc.push(LineEntry::command(cmd));
        }

        let old = doc.set(1, LineEntry::command("B")).unwrap();
        assert_eq!(old.body(), "b");

        doc.insert(0, LineEntry::command("start")).unwrap();
        doc.insert(doc.len(), LineEntry::command("end")).unwrap();
        assert_eq!(bodies(&doc), vec!["start", "a", "B", "c", "d", "end"]);

        assert_eq!(doc.delete(0).unwrap().body(), "start");
        let removed = doc.delete_range(1..3).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(bodies(&doc), vec!["a", "d", "end"]);

        doc.set_range(0..2, vec![LineEntry::command("x")]).unwrap();
        assert_eq!(bodies(&doc), vec!["x", "end"]);
        assert_eq!(doc.get_range(0..2).map(<[LineEntry]>::len), Some(2));

        doc.get_mut(0).unwrap().replace_body("x", "y").unwrap();
        assert_eq!(doc.get(0).map(LineEntry::body), Some("y"));
    }

    #[test]
    fn index_out_of_range_is_error() {
        let mut doc = scenario_a();

        assert!(matches!(
            doc.set(1, LineEntry::blank()),
            Err(ScriptError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(doc.delete(5).is_err());
        assert!(doc.insert(3, LineEntry::blank()).is_err());
        assert!(doc.delete_range(0..2).is_err());
        assert!(doc.set_range(1..0, Vec::new()).is_err());
        assert_eq!(doc, scenario_a());
    }

    #[test]
    fn find_all_is_prefix_match() {
        let mut doc = ScriptDocument::new();
        doc.add("echo one", None, None).unwrap();
        doc.add("srun echo two # echo", None, None).unwrap();

        assert_eq!(doc.find_all("echo", Field::Body).unwrap().len(), 1);
        assert_eq!(doc.find_all("ec|sr", Field::Body).unwrap().len(), 2);
        assert_eq!(doc.find_all("echo", Field::Annotation).unwrap().len(), 1);
        assert!(doc.find_all("two", Field::Body).unwrap().is_empty());
    }

    #[test]
    fn match_one_unique() {
        let mut doc = scenario_a();
        doc.add("srun ./a.out # main", None, None).unwrap();

        let found = doc.match_one(r"srun .* # main").unwrap();
        assert_eq!(found.body(), "srun ./a.out");
    }

    #[test]
    fn match_one_ambiguous_and_missing() {
        let mut doc = ScriptDocument::new();
        doc.add("echo x", None, None).unwrap();
        doc.add("echo x", None, None).unwrap();

        assert!(matches!(
            doc.match_one("echo x"),
            Err(ScriptError::AmbiguousMatch { count: 2, .. })
        ));
        assert!(matches!(doc.match_one("ls"), Err(ScriptError::NoMatch(_))));
    }

    #[test]
    fn invalid_pattern() {
        let doc = scenario_a();
        assert!(matches!(
            doc.find_all("(", Field::Body),
            Err(ScriptError::InvalidPattern(_))
        ));
    }

    #[test]
    fn alternation_only_matches_at_start() {
        let mut doc = ScriptDocument::new();
        doc.add("xx b", None, None).unwrap();
        doc.add("b xx", None, None).unwrap();

        let found = doc.find_all("a|b", Field::Body).unwrap();
        assert_eq!(bodies_of(&found), vec!["b xx"]);
        assert_eq!(doc.match_one("a|b").unwrap().body(), "b xx");
    }

    #[test]
    fn unbalanced_pattern_is_rejected() {
        let mut doc = ScriptDocument::new();
        doc.add("xx b", None, None).unwrap();

        assert!(matches!(
            doc.find_all("a)|(b", Field::Body),
            Err(ScriptError::InvalidPattern(_))
        ));
        assert!(matches!(
            doc.match_all("a)|(b"),
            Err(ScriptError::InvalidPattern(_))
        ));
    }

    #[test]
    fn commands_with_markers_survive_dump() {
        let mut doc = scenario_a();
        doc.add_echo("progress # 50%", None, None, None).unwrap();
        doc.add_command("#SBATCH --time=5", None, None, None).unwrap();
        doc.add_command("tar czf out.tgz", Some("pack # results"), None, None)
            .unwrap();

        let reparsed = ScriptDocument::parse(&doc.dumps()).unwrap();
        assert_eq!(reparsed, doc);
        assert_eq!(reparsed.options().len(), 2);
        assert_eq!(reparsed[1].annotation(), Some("50%"));
    }

    #[test]
    fn directive_like_body_is_not_read_back_as_option() {
        let mut doc = ScriptDocument::new();
        doc.add_command("#SBATCH --time=5", None, None, None).unwrap();

        let reparsed = ScriptDocument::parse(&doc.dumps()).unwrap();
        assert!(reparsed.options().is_empty());
        assert_eq!(reparsed, doc);
    }

    fn bodies_of<'a>(found: &[&'a LineEntry]) -> Vec<&'a str> {
        found.iter().map(|l| l.body()).collect()
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_value(scenario_a()).unwrap();
        assert_eq!(json["interpreter"], "/bin/bash");
        assert_eq!(json["options"]["job_name"], "foo");
        assert_eq!(json["lines"][0]["body"], "echo hi");
    }

    #[test]
    fn from_str_and_display() {
        let doc: ScriptDocument = SCENARIO_A.parse().unwrap();
        assert_eq!(doc.to_string(), SCENARIO_A);
    }
}
