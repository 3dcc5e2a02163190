//! PO catalog parser and serializer.
//!
//! Line-oriented state machine over the GNU-gettext PO text format. Each
//! keyword line (`msgctxt`, `msgid`, `msgid_plural`, `msgstr`, `msgstr[N]`)
//! opens a string field; bare `"…"` lines continue the most recent field.
//! Comment lines carry translator notes, extraction metadata, and flags.
//!
//! # Invariants
//!
//! 1. **Unique keys**: a successful parse contains at most one entry per
//!    (msgctxt, msgid) pair; duplicates are a [`ParseError`].
//!
//! 2. **Round trip**: `parse(serialize(entries))` reproduces the same keys,
//!    translations, flags, and comments (modulo whitespace normalization).
//!
//! 3. **Line-accurate errors**: every [`ParseError`] names the 1-based line
//!    that produced it.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unterminated string | Missing closing `"` | Error with line number |
//! | Invalid escape | `\x` outside the supported set | Error with line number |
//! | Stray continuation | `"…"` before any keyword | Error with line number |
//! | Orphan `msgstr` | No preceding `msgid` | Error with line number |
//! | Duplicate entry | Same (msgctxt, msgid) twice | Error with line number |
//! | Obsolete entry | `#~` prefix | Skipped, counted |

use std::fmt;

use rustc_hash::FxHashSet;
use tracing::debug;

/// Separator between msgctxt and msgid in a composite lookup key
/// (the EOT byte gettext itself uses).
pub const CONTEXT_SEPARATOR: char = '\u{4}';

/// Cap on `msgstr[N]` indices; known plural rules top out at six forms.
const MAX_PLURAL_FORMS: usize = 16;

/// Errors from parsing PO text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A quoted string was not closed before end of line.
    UnterminatedString { line: usize },
    /// A backslash escape outside the supported set.
    InvalidEscape { line: usize, escape: char },
    /// A line that is neither a keyword, comment, continuation, nor blank,
    /// or a keyword that is invalid in its position.
    UnexpectedToken { line: usize, token: String },
    /// A bare `"…"` continuation line with no field to continue.
    StrayContinuation { line: usize },
    /// A `msgstr` with no preceding `msgid`.
    MsgstrWithoutMsgid { line: usize },
    /// A `msgstr[N]` on an entry without `msgid_plural`.
    IndexedMsgstrWithoutPlural { line: usize },
    /// A `msgstr[N]` whose index is not a small decimal integer.
    InvalidMsgstrIndex { line: usize },
    /// The same (msgctxt, msgid) pair appeared twice.
    DuplicateEntry { line: usize, msgid: String },
}

impl ParseError {
    /// The 1-based source line the error refers to.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::UnterminatedString { line }
            | Self::InvalidEscape { line, .. }
            | Self::UnexpectedToken { line, .. }
            | Self::StrayContinuation { line }
            | Self::MsgstrWithoutMsgid { line }
            | Self::IndexedMsgstrWithoutPlural { line }
            | Self::InvalidMsgstrIndex { line }
            | Self::DuplicateEntry { line, .. } => *line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString { line } => {
                write!(f, "line {line}: unterminated string")
            }
            Self::InvalidEscape { line, escape } => {
                write!(f, "line {line}: invalid escape '\\{escape}'")
            }
            Self::UnexpectedToken { line, token } => {
                write!(f, "line {line}: unexpected token '{token}'")
            }
            Self::StrayContinuation { line } => {
                write!(f, "line {line}: string continuation without a field")
            }
            Self::MsgstrWithoutMsgid { line } => {
                write!(f, "line {line}: msgstr without msgid")
            }
            Self::IndexedMsgstrWithoutPlural { line } => {
                write!(f, "line {line}: msgstr[N] without msgid_plural")
            }
            Self::InvalidMsgstrIndex { line } => {
                write!(f, "line {line}: invalid msgstr index")
            }
            Self::DuplicateEntry { line, msgid } => {
                write!(f, "line {line}: duplicate entry for msgid '{msgid}'")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// One catalog entry: a source string, its translation(s), and the comment
/// metadata attached to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoEntry {
    /// Translator comments (`# …`).
    pub comments: Vec<String>,
    /// Extracted comments from the source program (`#. …`).
    pub extracted: Vec<String>,
    /// Source references (`#: …`).
    pub references: Vec<String>,
    /// Flags (`#, fuzzy, python-format`), split on commas.
    pub flags: Vec<String>,
    /// Previous msgid comments (`#| …`).
    pub previous: Vec<String>,
    /// Disambiguation context, if any.
    pub msgctxt: Option<String>,
    /// The source-language message id / template.
    pub msgid: String,
    /// Plural source string, for pluralized entries.
    pub msgid_plural: Option<String>,
    /// The translation (empty when untranslated; unused for plural entries).
    pub msgstr: String,
    /// Indexed plural translations (`msgstr[0]`, `msgstr[1]`, …).
    pub plural_msgstr: Vec<String>,
}

impl PoEntry {
    /// The composite lookup key: msgctxt ⊕ EOT ⊕ msgid.
    #[must_use]
    pub fn key(&self) -> String {
        match &self.msgctxt {
            Some(ctxt) => format!("{ctxt}{CONTEXT_SEPARATOR}{}", self.msgid),
            None => self.msgid.clone(),
        }
    }

    /// Whether this is the catalog header (empty msgid, no context).
    #[must_use]
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.msgctxt.is_none()
    }

    /// Whether the entry carries the given flag.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Whether the entry is marked fuzzy (translation needs review).
    #[must_use]
    pub fn is_fuzzy(&self) -> bool {
        self.has_flag("fuzzy")
    }

    /// Whether every translation slot is non-empty.
    #[must_use]
    pub fn is_translated(&self) -> bool {
        if self.msgid_plural.is_some() {
            !self.plural_msgstr.is_empty() && self.plural_msgstr.iter().all(|s| !s.is_empty())
        } else {
            !self.msgstr.is_empty()
        }
    }
}

/// Which field the most recent string line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr,
    MsgstrIdx(usize),
}

/// In-progress entry accumulated by the parser.
#[derive(Default)]
struct Builder {
    entry: PoEntry,
    has_msgid: bool,
    msgid_line: usize,
}

impl Builder {
    fn append(&mut self, field: Field, fragment: &str) {
        match field {
            Field::Msgctxt => {
                self.entry
                    .msgctxt
                    .get_or_insert_with(String::new)
                    .push_str(fragment);
            }
            Field::Msgid => self.entry.msgid.push_str(fragment),
            Field::MsgidPlural => {
                self.entry
                    .msgid_plural
                    .get_or_insert_with(String::new)
                    .push_str(fragment);
            }
            Field::Msgstr => self.entry.msgstr.push_str(fragment),
            Field::MsgstrIdx(n) => {
                if self.entry.plural_msgstr.len() <= n {
                    self.entry.plural_msgstr.resize(n + 1, String::new());
                }
                self.entry.plural_msgstr[n].push_str(fragment);
            }
            Field::None => {}
        }
    }
}

/// Parse a full PO catalog into its entries, in file order.
///
/// The header (if present) is the entry with an empty msgid, usually first.
/// Obsolete entries (`#~`) are skipped.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; see the module table for
/// the failure modes.
pub fn parse(source: &str) -> Result<Vec<PoEntry>, ParseError> {
    let mut entries: Vec<PoEntry> = Vec::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut builder = Builder::default();
    let mut field = Field::None;
    let mut obsolete = 0usize;

    let mut flush = |builder: &mut Builder,
                     entries: &mut Vec<PoEntry>,
                     seen: &mut FxHashSet<String>|
     -> Result<(), ParseError> {
        if builder.has_msgid {
            let entry = std::mem::take(&mut builder.entry);
            let line = builder.msgid_line;
            if !seen.insert(entry.key()) {
                return Err(ParseError::DuplicateEntry {
                    line,
                    msgid: entry.msgid,
                });
            }
            entries.push(entry);
        } else {
            // Trailing comments with no msgid are dropped.
            builder.entry = PoEntry::default();
        }
        builder.has_msgid = false;
        builder.msgid_line = 0;
        Ok(())
    };

    for (idx, raw) in source.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('#') {
            // Obsolete entries are not part of the live catalog; a completed
            // entry before the block still counts.
            if rest.starts_with('~') {
                if matches!(field, Field::Msgstr | Field::MsgstrIdx(_)) {
                    flush(&mut builder, &mut entries, &mut seen)?;
                }
                obsolete += 1;
                field = Field::None;
                continue;
            }
            // A comment after a completed translation starts the next entry.
            if matches!(field, Field::Msgstr | Field::MsgstrIdx(_)) {
                flush(&mut builder, &mut entries, &mut seen)?;
                field = Field::None;
            }
            match rest.chars().next() {
                Some('.') => builder.entry.extracted.push(rest[1..].trim().to_string()),
                Some(':') => builder.entry.references.push(rest[1..].trim().to_string()),
                Some(',') => builder.entry.flags.extend(
                    rest[1..]
                        .split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(String::from),
                ),
                Some('|') => builder.entry.previous.push(rest[1..].trim().to_string()),
                _ => builder.entry.comments.push(rest.trim_start().to_string()),
            }
            continue;
        }

        if trimmed.starts_with('"') {
            if field == Field::None {
                return Err(ParseError::StrayContinuation { line: lineno });
            }
            let fragment = parse_string_literal(trimmed, lineno)?;
            builder.append(field, &fragment);
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("msgctxt") {
            if matches!(field, Field::Msgstr | Field::MsgstrIdx(_)) {
                flush(&mut builder, &mut entries, &mut seen)?;
            } else if builder.has_msgid {
                return Err(ParseError::UnexpectedToken {
                    line: lineno,
                    token: "msgctxt".into(),
                });
            }
            let value = parse_string_literal(rest.trim_start(), lineno)?;
            builder.entry.msgctxt = Some(value);
            field = Field::Msgctxt;
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("msgid_plural") {
            if !matches!(field, Field::Msgid) {
                return Err(ParseError::UnexpectedToken {
                    line: lineno,
                    token: "msgid_plural".into(),
                });
            }
            let value = parse_string_literal(rest.trim_start(), lineno)?;
            builder.entry.msgid_plural = Some(value);
            field = Field::MsgidPlural;
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("msgid") {
            if matches!(field, Field::Msgstr | Field::MsgstrIdx(_)) {
                flush(&mut builder, &mut entries, &mut seen)?;
            } else if builder.has_msgid {
                return Err(ParseError::UnexpectedToken {
                    line: lineno,
                    token: "msgid".into(),
                });
            }
            let value = parse_string_literal(rest.trim_start(), lineno)?;
            builder.entry.msgid = value;
            builder.has_msgid = true;
            builder.msgid_line = lineno;
            field = Field::Msgid;
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("msgstr[") {
            if !builder.has_msgid || builder.entry.msgid_plural.is_none() {
                return Err(ParseError::IndexedMsgstrWithoutPlural { line: lineno });
            }
            let close = rest
                .find(']')
                .ok_or(ParseError::InvalidMsgstrIndex { line: lineno })?;
            let index: usize = rest[..close]
                .parse()
                .ok()
                .filter(|&n| n < MAX_PLURAL_FORMS)
                .ok_or(ParseError::InvalidMsgstrIndex { line: lineno })?;
            let value = parse_string_literal(rest[close + 1..].trim_start(), lineno)?;
            builder.append(Field::MsgstrIdx(index), &value);
            field = Field::MsgstrIdx(index);
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("msgstr") {
            if !builder.has_msgid {
                return Err(ParseError::MsgstrWithoutMsgid { line: lineno });
            }
            // One msgstr per entry; a repeat must not overwrite the first.
            if matches!(field, Field::Msgstr | Field::MsgstrIdx(_))
                || builder.entry.msgid_plural.is_some()
            {
                return Err(ParseError::UnexpectedToken {
                    line: lineno,
                    token: "msgstr".into(),
                });
            }
            let value = parse_string_literal(rest.trim_start(), lineno)?;
            builder.entry.msgstr = value;
            field = Field::Msgstr;
            continue;
        }

        let token: String = trimmed.split_whitespace().next().unwrap_or("").to_string();
        return Err(ParseError::UnexpectedToken {
            line: lineno,
            token,
        });
    }

    flush(&mut builder, &mut entries, &mut seen)?;

    debug!(
        entries = entries.len(),
        obsolete_skipped = obsolete,
        "parsed po catalog"
    );
    Ok(entries)
}

/// Parse one `"…"` literal, unescaping its contents.
fn parse_string_literal(s: &str, line: usize) -> Result<String, ParseError> {
    let mut chars = s.chars();
    if chars.next() != Some('"') {
        return Err(ParseError::UnterminatedString { line });
    }
    let mut out = String::new();
    let mut closed = false;
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                closed = true;
                break;
            }
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('a') => out.push('\u{7}'),
                Some('b') => out.push('\u{8}'),
                Some('f') => out.push('\u{c}'),
                Some('v') => out.push('\u{b}'),
                Some('"') => out.push('"'),
                Some('\'') => out.push('\''),
                Some('\\') => out.push('\\'),
                Some(other) => return Err(ParseError::InvalidEscape { line, escape: other }),
                None => return Err(ParseError::UnterminatedString { line }),
            },
            _ => out.push(c),
        }
    }
    if !closed {
        return Err(ParseError::UnterminatedString { line });
    }
    let rest: &str = chars.as_str().trim();
    if !rest.is_empty() {
        return Err(ParseError::UnexpectedToken {
            line,
            token: rest.to_string(),
        });
    }
    Ok(out)
}

/// Escape a string for a PO quoted literal (inverse of the parser's
/// unescaping).
#[must_use]
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize entries back to PO text.
///
/// Multi-line values are emitted gettext-style: an empty first fragment
/// followed by one continuation line per `\n`-terminated segment.
#[must_use]
pub fn serialize(entries: &[PoEntry]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for c in &entry.comments {
            out.push_str("# ");
            out.push_str(c);
            out.push('\n');
        }
        for c in &entry.extracted {
            out.push_str("#. ");
            out.push_str(c);
            out.push('\n');
        }
        for c in &entry.references {
            out.push_str("#: ");
            out.push_str(c);
            out.push('\n');
        }
        if !entry.flags.is_empty() {
            out.push_str("#, ");
            out.push_str(&entry.flags.join(", "));
            out.push('\n');
        }
        for c in &entry.previous {
            out.push_str("#| ");
            out.push_str(c);
            out.push('\n');
        }
        if let Some(ctxt) = &entry.msgctxt {
            write_field(&mut out, "msgctxt", ctxt);
        }
        write_field(&mut out, "msgid", &entry.msgid);
        if let Some(plural) = &entry.msgid_plural {
            write_field(&mut out, "msgid_plural", plural);
            if entry.plural_msgstr.is_empty() {
                write_field(&mut out, "msgstr[0]", "");
            }
            for (n, form) in entry.plural_msgstr.iter().enumerate() {
                write_field(&mut out, &format!("msgstr[{n}]"), form);
            }
        } else {
            write_field(&mut out, "msgstr", &entry.msgstr);
        }
    }
    out
}

fn write_field(out: &mut String, keyword: &str, value: &str) {
    if value.contains('\n') {
        out.push_str(keyword);
        out.push_str(" \"\"\n");
        for segment in value.split_inclusive('\n') {
            out.push('"');
            out.push_str(&escape(segment));
            out.push_str("\"\n");
        }
    } else {
        out.push_str(keyword);
        out.push_str(" \"");
        out.push_str(&escape(value));
        out.push_str("\"\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_entry() {
        let entries = parse("msgid \"Hello\"\nmsgstr \"Bonjour\"\n").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].msgid, "Hello");
        assert_eq!(entries[0].msgstr, "Bonjour");
    }

    #[test]
    fn header_entry() {
        let src = "msgid \"\"\nmsgstr \"\"\n\"Language: fr\\n\"\n\"MIME-Version: 1.0\\n\"\n";
        let entries = parse(src).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_header());
        assert_eq!(entries[0].msgstr, "Language: fr\nMIME-Version: 1.0\n");
    }

    #[test]
    fn multi_line_msgid() {
        let src = "msgid \"\"\n\"first \"\n\"second\"\nmsgstr \"t\"\n";
        let entries = parse(src).unwrap();
        assert_eq!(entries[0].msgid, "first second");
    }

    #[test]
    fn escapes_round_trip() {
        let src = "msgid \"a\\nb\\t\\\"q\\\"\\\\\"\nmsgstr \"x\"\n";
        let entries = parse(src).unwrap();
        assert_eq!(entries[0].msgid, "a\nb\t\"q\"\\");
    }

    #[test]
    fn invalid_escape_rejected() {
        let err = parse("msgid \"\\z\"\nmsgstr \"\"\n").unwrap_err();
        assert_eq!(err, ParseError::InvalidEscape { line: 1, escape: 'z' });
    }

    #[test]
    fn unterminated_string_rejected() {
        let err = parse("msgid \"oops\nmsgstr \"\"\n").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedString { line: 1 });
    }

    #[test]
    fn comments_and_flags() {
        let src = "\
# translator note
#. extracted
#: module.py:42
#, fuzzy, python-format
msgid \"%s missing\"
msgstr \"%s manquant\"
";
        let entries = parse(src).unwrap();
        let e = &entries[0];
        assert_eq!(e.comments, vec!["translator note"]);
        assert_eq!(e.extracted, vec!["extracted"]);
        assert_eq!(e.references, vec!["module.py:42"]);
        assert_eq!(e.flags, vec!["fuzzy", "python-format"]);
        assert!(e.is_fuzzy());
        assert!(e.has_flag("python-format"));
    }

    #[test]
    fn plural_entry() {
        let src = "\
msgid \"%d object\"
msgid_plural \"%d objects\"
msgstr[0] \"%d objet\"
msgstr[1] \"%d objets\"
";
        let entries = parse(src).unwrap();
        let e = &entries[0];
        assert_eq!(e.msgid_plural.as_deref(), Some("%d objects"));
        assert_eq!(e.plural_msgstr, vec!["%d objet", "%d objets"]);
        assert!(e.is_translated());
    }

    #[test]
    fn msgctxt_entry() {
        let src = "msgctxt \"menu\"\nmsgid \"Open\"\nmsgstr \"Ouvrir\"\n";
        let entries = parse(src).unwrap();
        assert_eq!(entries[0].msgctxt.as_deref(), Some("menu"));
        assert_eq!(entries[0].key(), format!("menu{CONTEXT_SEPARATOR}Open"));
    }

    #[test]
    fn duplicate_entry_rejected() {
        let src = "msgid \"a\"\nmsgstr \"1\"\n\nmsgid \"a\"\nmsgstr \"2\"\n";
        let err = parse(src).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateEntry { line: 4, .. }));
    }

    #[test]
    fn same_msgid_different_context_allowed() {
        let src = "\
msgctxt \"month\"
msgid \"May\"
msgstr \"Mai\"

msgctxt \"verb\"
msgid \"May\"
msgstr \"Peut\"
";
        let entries = parse(src).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn msgstr_without_msgid_rejected() {
        let err = parse("msgstr \"orphan\"\n").unwrap_err();
        assert_eq!(err, ParseError::MsgstrWithoutMsgid { line: 1 });
    }

    #[test]
    fn indexed_msgstr_without_plural_rejected() {
        let err = parse("msgid \"a\"\nmsgstr[0] \"x\"\n").unwrap_err();
        assert_eq!(err, ParseError::IndexedMsgstrWithoutPlural { line: 2 });
    }

    #[test]
    fn stray_continuation_rejected() {
        let err = parse("\"floating\"\n").unwrap_err();
        assert_eq!(err, ParseError::StrayContinuation { line: 1 });
    }

    #[test]
    fn obsolete_entries_skipped() {
        let src = "#~ msgid \"old\"\n#~ msgstr \"vieux\"\n\nmsgid \"new\"\nmsgstr \"nouveau\"\n";
        let entries = parse(src).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].msgid, "new");
    }

    #[test]
    fn obsolete_block_between_live_entries() {
        let src = "\
msgid \"a\"
msgstr \"1\"

#~ msgid \"old\"
#~ msgstr \"vieux\"

msgid \"b\"
msgstr \"2\"
";
        let entries = parse(src).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].msgid, "a");
        assert_eq!(entries[1].msgid, "b");
    }

    #[test]
    fn comment_after_obsolete_block_starts_next_entry() {
        let src = "\
msgid \"a\"
msgstr \"1\"
#~ msgid \"old\"
# note for b
msgid \"b\"
msgstr \"2\"
";
        let entries = parse(src).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].comments.is_empty());
        assert_eq!(entries[1].comments, vec!["note for b"]);
    }

    #[test]
    fn oversized_msgstr_index_rejected() {
        // usize::MAX would overflow the resize; merely large indices would
        // drive a huge allocation. Both are invalid.
        let err = parse(
            "msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[18446744073709551615] \"x\"\n",
        )
        .unwrap_err();
        assert_eq!(err, ParseError::InvalidMsgstrIndex { line: 3 });

        let err =
            parse("msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[4000000000] \"x\"\n").unwrap_err();
        assert_eq!(err, ParseError::InvalidMsgstrIndex { line: 3 });
    }

    #[test]
    fn msgstr_index_below_cap_accepted() {
        let src = "msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[5] \"x\"\n";
        let entries = parse(src).unwrap();
        assert_eq!(entries[0].plural_msgstr.len(), 6);
    }

    #[test]
    fn repeated_msgstr_rejected() {
        let err = parse("msgid \"a\"\nmsgstr \"1\"\nmsgstr \"2\"\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                line: 3,
                token: "msgstr".into()
            }
        );
    }

    #[test]
    fn entries_without_blank_separators() {
        let src = "msgid \"a\"\nmsgstr \"1\"\nmsgid \"b\"\nmsgstr \"2\"\n";
        let entries = parse(src).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].msgid, "b");
    }

    #[test]
    fn untranslated_entry_at_eof() {
        let entries = parse("msgid \"pending\"\nmsgstr \"\"").unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_translated());
    }

    #[test]
    fn trailing_comments_dropped() {
        let entries = parse("msgid \"a\"\nmsgstr \"1\"\n\n# end of file\n").unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn unknown_keyword_rejected() {
        let err = parse("msgwat \"a\"\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { line: 1, .. }));
    }

    #[test]
    fn serialize_round_trip() {
        let src = "\
#, python-format
msgid \"%s does not exist\"
msgstr \"%s n'existe pas\"

msgid \"%d object\"
msgid_plural \"%d objects\"
msgstr[0] \"%d objet\"
msgstr[1] \"%d objets\"
";
        let entries = parse(src).unwrap();
        let text = serialize(&entries);
        let reparsed = parse(&text).unwrap();
        assert_eq!(entries, reparsed);
    }

    #[test]
    fn serialize_multiline_round_trip() {
        let entry = PoEntry {
            msgid: "line one\nline two\n".into(),
            msgstr: "ligne un\nligne deux\n".into(),
            ..Default::default()
        };
        let text = serialize(&[entry.clone()]);
        let reparsed = parse(&text).unwrap();
        assert_eq!(reparsed, vec![entry]);
        // gettext style: empty first fragment, then per-segment lines.
        assert!(text.starts_with("msgid \"\"\n\"line one\\n\"\n"));
    }

    #[test]
    fn escape_is_inverse_of_unescape() {
        let original = "tabs\t, quotes \", backslash \\ and\nnewlines";
        let escaped = escape(original);
        let literal = format!("\"{escaped}\"");
        assert_eq!(parse_string_literal(&literal, 1).unwrap(), original);
    }
}
