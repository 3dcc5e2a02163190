//! python-format placeholder substitution.
//!
//! Templates use printf-style placeholders: positional (`%s`, `%d`) consumed
//! in argument order, named (`%(name)s`) looked up by name, and `%%` for a
//! literal percent. Substitution is a single pass and idempotent; a
//! placeholder with no matching argument is left in the output as-is, so
//! formatting never fails at call time.
//!
//! Also provides placeholder extraction for the catalog consistency check:
//! the placeholders a translation references must be a subset of those in
//! its msgid.

use crate::po::PoEntry;

/// Conversion characters accepted at the end of a placeholder.
const CONVERSIONS: &str = "sdifeEgGxXouc";

/// Characters allowed between `%` and the conversion (flags, width,
/// precision).
const MODIFIERS: &str = "-+ #0123456789.*";

/// One placeholder occurrence in a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// A positional slot (`%s`, `%d`, …).
    Positional { conversion: char },
    /// A named slot (`%(name)s`).
    Named { name: String, conversion: char },
}

/// Extract the placeholders of a template, in order of appearance.
///
/// `%%` escapes and malformed `%` sequences are not placeholders.
#[must_use]
pub fn placeholders(template: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    scan(template, |token| match token {
        ScanToken::Literal(_) => {}
        ScanToken::Positional { conversion, .. } => {
            found.push(Placeholder::Positional { conversion });
        }
        ScanToken::Named {
            name, conversion, ..
        } => found.push(Placeholder::Named {
            name: name.to_string(),
            conversion,
        }),
    });
    found
}

/// Substitute positional arguments into a template.
///
/// Arguments are consumed left to right; placeholders beyond the argument
/// list are left as-is. Named placeholders are untouched.
#[must_use]
pub fn format_positional(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next = 0usize;
    scan(template, |token| match token {
        ScanToken::Literal(s) => out.push_str(s),
        ScanToken::Positional { raw, .. } => {
            if let Some(value) = args.get(next) {
                out.push_str(value);
                next += 1;
            } else {
                out.push_str(raw);
            }
        }
        ScanToken::Named { raw, .. } => out.push_str(raw),
    });
    out
}

/// Substitute named arguments into a template.
///
/// Each `(name, value)` pair replaces `%(name)X`; names without a matching
/// argument are left as-is. Positional placeholders are untouched.
#[must_use]
pub fn format_named(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    scan(template, |token| match token {
        ScanToken::Literal(s) => out.push_str(s),
        ScanToken::Positional { raw, .. } => out.push_str(raw),
        ScanToken::Named { name, raw, .. } => {
            if let Some(&(_, value)) = args.iter().find(|&&(n, _)| n == name) {
                out.push_str(value);
            } else {
                out.push_str(raw);
            }
        }
    });
    out
}

/// A lexed region of a template.
enum ScanToken<'a> {
    Literal(&'a str),
    Positional { raw: &'a str, conversion: char },
    Named {
        raw: &'a str,
        name: &'a str,
        conversion: char,
    },
}

/// Single pass over the template, emitting literals and placeholders.
///
/// `%%` is emitted as a one-byte `%` literal. A `%` that does not form a
/// valid placeholder is treated as literal text.
fn scan<'a>(template: &'a str, mut emit: impl FnMut(ScanToken<'a>)) {
    let bytes = template.as_bytes();
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        // Literal run before this '%'.
        if start < i {
            emit(ScanToken::Literal(&template[start..i]));
        }
        if bytes.get(i + 1) == Some(&b'%') {
            emit(ScanToken::Literal(&template[i..=i]));
            i += 2;
            start = i;
            continue;
        }
        match lex_placeholder(template, i) {
            Some((token, end)) => {
                emit(token);
                i = end;
                start = i;
            }
            None => {
                // Not a placeholder; '%' stays literal.
                emit(ScanToken::Literal(&template[i..=i]));
                i += 1;
                start = i;
            }
        }
    }
    if start < bytes.len() {
        emit(ScanToken::Literal(&template[start..]));
    }
}

/// Try to lex a placeholder starting at the `%` at `at`. Returns the token
/// and the byte offset just past it.
fn lex_placeholder(template: &str, at: usize) -> Option<(ScanToken<'_>, usize)> {
    let bytes = template.as_bytes();
    let mut i = at + 1;

    let name = if bytes.get(i) == Some(&b'(') {
        let close = template[i + 1..].find(')')? + i + 1;
        let name = &template[i + 1..close];
        i = close + 1;
        Some(name)
    } else {
        None
    };

    while i < bytes.len() && MODIFIERS.contains(bytes[i] as char) {
        i += 1;
    }
    let conversion = *bytes.get(i)? as char;
    if !CONVERSIONS.contains(conversion) {
        return None;
    }
    i += 1;

    let raw = &template[at..i];
    let token = match name {
        Some(name) => ScanToken::Named {
            raw,
            name,
            conversion,
        },
        None => ScanToken::Positional { raw, conversion },
    };
    Some((token, i))
}

/// A placeholder-consistency problem in one translation string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderIssue {
    /// The translation references a named placeholder absent from the msgid.
    UnknownName { name: String },
    /// The translation has more positional placeholders than the msgid.
    ExcessPositional { expected: usize, found: usize },
}

impl std::fmt::Display for PlaceholderIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownName { name } => {
                write!(f, "translation references unknown placeholder '%({name})'")
            }
            Self::ExcessPositional { expected, found } => write!(
                f,
                "translation has {found} positional placeholders, msgid has {expected}"
            ),
        }
    }
}

/// Check every translation of an entry against its msgid's placeholder set.
///
/// The placeholders referenced in a translation must be a subset of those in
/// the template it translates (plural forms are checked against
/// `msgid_plural` when present). Violations are diagnostics, not errors: the
/// formatter degrades gracefully either way.
#[must_use]
pub fn check_entry(entry: &PoEntry) -> Vec<PlaceholderIssue> {
    let mut issues = Vec::new();
    if entry.msgid_plural.is_some() {
        let singular = placeholders(&entry.msgid);
        let plural = placeholders(entry.msgid_plural.as_deref().unwrap_or_default());
        for form in &entry.plural_msgstr {
            // A plural form may legitimately use either template's set.
            check_against_either(form, &singular, &plural, &mut issues);
        }
    } else if !entry.msgstr.is_empty() {
        check_subset(&placeholders(&entry.msgstr), &placeholders(&entry.msgid), &mut issues);
    }
    issues.sort_by_key(|i| match i {
        PlaceholderIssue::UnknownName { name } => (0, name.clone()),
        PlaceholderIssue::ExcessPositional { .. } => (1, String::new()),
    });
    issues.dedup();
    issues
}

fn check_against_either(
    form: &str,
    singular: &[Placeholder],
    plural: &[Placeholder],
    issues: &mut Vec<PlaceholderIssue>,
) {
    if form.is_empty() {
        return;
    }
    let found = placeholders(form);
    let mut singular_issues = Vec::new();
    check_subset(&found, singular, &mut singular_issues);
    if singular_issues.is_empty() {
        return;
    }
    let mut plural_issues = Vec::new();
    check_subset(&found, plural, &mut plural_issues);
    if !plural_issues.is_empty() {
        issues.append(&mut plural_issues);
    }
}

fn check_subset(
    found: &[Placeholder],
    reference: &[Placeholder],
    issues: &mut Vec<PlaceholderIssue>,
) {
    let expected_positional = reference
        .iter()
        .filter(|p| matches!(p, Placeholder::Positional { .. }))
        .count();
    let found_positional = found
        .iter()
        .filter(|p| matches!(p, Placeholder::Positional { .. }))
        .count();
    if found_positional > expected_positional {
        issues.push(PlaceholderIssue::ExcessPositional {
            expected: expected_positional,
            found: found_positional,
        });
    }
    for p in found {
        if let Placeholder::Named { name, .. } = p {
            let known = reference
                .iter()
                .any(|r| matches!(r, Placeholder::Named { name: n, .. } if n == name));
            if !known {
                issues.push(PlaceholderIssue::UnknownName { name: name.clone() });
            }
        }
    }
}
