//! Immutable message catalogs with graceful-degradation lookup.
//!
//! # Invariants
//!
//! 1. **Lookups never fail**: a missing id resolves to the id itself (the
//!    untranslated source string), so callers always get usable text.
//!
//! 2. **Load once, read many**: a [`Catalog`] is built on one thread and
//!    never mutated afterwards; it is `Send + Sync` and safe for unrestricted
//!    concurrent reads.
//!
//! 3. **Fallback chain terminates**: a [`CatalogSet`] lookup walks the chain
//!    exactly once before degrading to the id verbatim.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing id | Id not in the catalog | Id returned verbatim |
//! | Fuzzy entry | `#, fuzzy` flag | Treated as untranslated |
//! | Malformed catalog | Parse error at load | Error returned; caller may use `Catalog::empty()` |
//! | Bad `Plural-Forms` | Unparseable header rule | Germanic fallback rule |

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::format::{format_named, format_positional};
use crate::header::Metadata;
use crate::plural::PluralRule;
use crate::po::{self, CONTEXT_SEPARATOR, ParseError, PoEntry};

/// Errors from loading a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// The catalog source could not be read.
    Io(std::io::Error),
    /// The catalog text did not parse.
    Parse(ParseError),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "catalog read failed: {e}"),
            Self::Parse(e) => write!(f, "catalog parse failed: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParseError> for CatalogError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

/// A translation slot: simple string or indexed plural forms.
#[derive(Debug, Clone)]
enum Translation {
    Simple(String),
    Plural(Vec<String>),
}

/// An immutable message catalog for one language.
///
/// # Example
///
/// ```
/// use pocat_core::Catalog;
///
/// let src = "\
/// msgid \"\"
/// msgstr \"\"
/// \"Language: fr\\n\"
/// \"Plural-Forms: nplurals=2; plural=(n > 1);\\n\"
///
/// #, python-format
/// msgid \"%s does not exist\"
/// msgstr \"%s n'existe pas\"
/// ";
/// let catalog = Catalog::parse(src).unwrap();
///
/// assert_eq!(catalog.language(), Some("fr"));
/// assert_eq!(catalog.gettext("%s does not exist"), "%s n'existe pas");
/// // Absent ids degrade to the id itself.
/// assert_eq!(catalog.gettext("not in catalog"), "not in catalog");
/// assert_eq!(
///     catalog.format("%s does not exist", &["foo.conf"]),
///     "foo.conf n'existe pas"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    metadata: Metadata,
    rule: PluralRule,
    entries: FxHashMap<String, Translation>,
}

impl Catalog {
    /// An empty catalog: every lookup degrades to the id verbatim.
    ///
    /// The documented fallback when a catalog fails to load (the host
    /// process keeps running, untranslated).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from parsed entries.
    ///
    /// The header entry populates metadata and the plural rule; fuzzy and
    /// untranslated entries are skipped.
    #[must_use]
    pub fn from_entries(entries: Vec<PoEntry>) -> Self {
        let mut metadata = Metadata::default();
        let mut map = FxHashMap::default();
        let mut fuzzy = 0usize;
        let mut untranslated = 0usize;

        for entry in entries {
            if entry.is_header() {
                metadata = Metadata::parse(&entry.msgstr);
                continue;
            }
            if entry.is_fuzzy() {
                fuzzy += 1;
                continue;
            }
            if !entry.is_translated() {
                untranslated += 1;
                continue;
            }
            let translation = if entry.msgid_plural.is_some() {
                Translation::Plural(entry.plural_msgstr.clone())
            } else {
                Translation::Simple(entry.msgstr.clone())
            };
            map.insert(entry.key(), translation);
        }

        let rule = match metadata.plural_forms() {
            Some(decl) => PluralRule::parse(decl).unwrap_or_else(|e| {
                warn!(error = %e, "unusable Plural-Forms, using germanic fallback");
                PluralRule::germanic()
            }),
            None => PluralRule::germanic(),
        };

        debug!(
            language = metadata.language().unwrap_or("?"),
            translated = map.len(),
            fuzzy,
            untranslated,
            "loaded catalog"
        );

        Self {
            metadata,
            rule,
            entries: map,
        }
    }

    /// Parse catalog text and build the lookup table.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ParseError`] when the text is malformed.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        Ok(Self::from_entries(po::parse(source)?))
    }

    /// Load a catalog from any reader.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on read or parse failure.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, CatalogError> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(Self::parse(&source)?)
    }

    /// Load a catalog from a file path.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on read or parse failure.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let source = fs::read_to_string(path)?;
        Ok(Self::parse(&source)?)
    }

    /// The catalog's language tag, from the header.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.metadata.language()
    }

    /// Header metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The plural rule in effect (declared or fallback).
    #[must_use]
    pub fn plural_rule(&self) -> &PluralRule {
        &self.rule
    }

    /// Number of translated message ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All translated message keys, sorted for deterministic output.
    #[must_use]
    pub fn message_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Look up a translation, or `None` on a miss.
    #[must_use]
    pub fn try_gettext(&self, id: &str) -> Option<&str> {
        match self.entries.get(id)? {
            Translation::Simple(s) => Some(s.as_str()),
            Translation::Plural(forms) => forms.first().map(String::as_str),
        }
    }

    /// Look up a translation; a miss returns the id itself unchanged.
    #[must_use]
    pub fn gettext<'a>(&'a self, id: &'a str) -> &'a str {
        self.try_gettext(id).unwrap_or(id)
    }

    /// Context-qualified lookup; a miss returns the id (never the context).
    #[must_use]
    pub fn pgettext<'a>(&'a self, ctxt: &str, id: &'a str) -> &'a str {
        let key = format!("{ctxt}{CONTEXT_SEPARATOR}{id}");
        match self.entries.get(&key) {
            Some(Translation::Simple(s)) => s.as_str(),
            Some(Translation::Plural(forms)) => {
                forms.first().map_or(id, String::as_str)
            }
            None => id,
        }
    }

    /// Plural-aware lookup.
    ///
    /// Selects among the entry's forms via the catalog's plural rule. On a
    /// miss (or an entry without usable forms) degrades to the English
    /// two-form choice between `singular` and `plural`.
    #[must_use]
    pub fn ngettext<'a>(&'a self, singular: &'a str, plural: &'a str, n: u64) -> &'a str {
        self.lookup_plural(singular, n)
            .unwrap_or(if n == 1 { singular } else { plural })
    }

    /// Context-qualified plural-aware lookup.
    #[must_use]
    pub fn npgettext<'a>(
        &'a self,
        ctxt: &str,
        singular: &'a str,
        plural: &'a str,
        n: u64,
    ) -> &'a str {
        let key = format!("{ctxt}{CONTEXT_SEPARATOR}{singular}");
        self.select_form(self.entries.get(&key), n)
            .unwrap_or(if n == 1 { singular } else { plural })
    }

    fn lookup_plural(&self, singular: &str, n: u64) -> Option<&str> {
        self.select_form(self.entries.get(singular), n)
    }

    fn select_form<'a>(&self, translation: Option<&'a Translation>, n: u64) -> Option<&'a str> {
        match translation? {
            Translation::Simple(s) => Some(s.as_str()),
            Translation::Plural(forms) => {
                // Clamp against the forms actually present, not just nplurals.
                let index = self.rule.index(n).min(forms.len().saturating_sub(1));
                let form = forms.get(index)?;
                if form.is_empty() { None } else { Some(form) }
            }
        }
    }

    /// Look up and substitute positional arguments.
    #[must_use]
    pub fn format(&self, id: &str, args: &[&str]) -> String {
        format_positional(self.gettext(id), args)
    }

    /// Look up and substitute named arguments.
    #[must_use]
    pub fn format_named(&self, id: &str, args: &[(&str, &str)]) -> String {
        format_named(self.gettext(id), args)
    }

    /// Plural-aware lookup plus positional substitution.
    #[must_use]
    pub fn nformat(&self, singular: &str, plural: &str, n: u64, args: &[&str]) -> String {
        format_positional(self.ngettext(singular, plural, n), args)
    }

    /// Plural-aware lookup plus named substitution.
    #[must_use]
    pub fn nformat_named(
        &self,
        singular: &str,
        plural: &str,
        n: u64,
        args: &[(&str, &str)],
    ) -> String {
        format_named(self.ngettext(singular, plural, n), args)
    }
}

/// Catalogs for several languages with a fallback chain.
///
/// A lookup tries the requested locale, then each chain entry in order,
/// and finally degrades to the id verbatim.
#[derive(Debug, Clone, Default)]
pub struct CatalogSet {
    catalogs: FxHashMap<String, Catalog>,
    fallback_chain: Vec<String>,
}

impl CatalogSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog under an explicit locale tag.
    pub fn add_catalog(&mut self, locale: impl Into<String>, catalog: Catalog) {
        self.catalogs.insert(locale.into(), catalog);
    }

    /// Register a catalog under its own `Language` header tag.
    ///
    /// Returns the tag used, or the catalog unchanged when it declares none.
    pub fn add_catalog_auto(&mut self, catalog: Catalog) -> Result<String, Catalog> {
        match catalog.language().map(str::to_string) {
            Some(tag) => {
                self.catalogs.insert(tag.clone(), catalog);
                Ok(tag)
            }
            None => Err(catalog),
        }
    }

    /// Set the fallback chain, tried in order after the requested locale.
    ///
    /// Example: `["fr-CA", "fr", "en"]`.
    pub fn set_fallback_chain(&mut self, chain: Vec<String>) {
        self.fallback_chain = chain;
    }

    /// Registered locale tags, sorted.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.catalogs.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// The catalog registered for a locale, if any.
    #[must_use]
    pub fn catalog(&self, locale: &str) -> Option<&Catalog> {
        self.catalogs.get(locale)
    }

    /// Look up a translation, or `None` after exhausting the chain.
    #[must_use]
    pub fn try_gettext(&self, locale: &str, id: &str) -> Option<&str> {
        if let Some(hit) = self.catalogs.get(locale).and_then(|c| c.try_gettext(id)) {
            return Some(hit);
        }
        for fallback in &self.fallback_chain {
            if fallback == locale {
                continue;
            }
            if let Some(hit) = self
                .catalogs
                .get(fallback.as_str())
                .and_then(|c| c.try_gettext(id))
            {
                return Some(hit);
            }
        }
        None
    }

    /// Look up a translation; degrades to the id verbatim.
    #[must_use]
    pub fn gettext<'a>(&'a self, locale: &str, id: &'a str) -> &'a str {
        self.try_gettext(locale, id).unwrap_or(id)
    }

    /// Plural-aware lookup across the chain.
    ///
    /// Each catalog applies its own plural rule (a French fallback for an
    /// unknown locale still pluralizes the French way).
    #[must_use]
    pub fn ngettext<'a>(&'a self, locale: &str, singular: &'a str, plural: &'a str, n: u64) -> &'a str {
        if let Some(hit) = self
            .catalogs
            .get(locale)
            .and_then(|c| c.lookup_plural(singular, n))
        {
            return hit;
        }
        for fallback in &self.fallback_chain {
            if fallback == locale {
                continue;
            }
            if let Some(hit) = self
                .catalogs
                .get(fallback.as_str())
                .and_then(|c| c.lookup_plural(singular, n))
            {
                return hit;
            }
        }
        if n == 1 { singular } else { plural }
    }

    /// The union of translated ids across every catalog, sorted and deduped.
    #[must_use]
    pub fn all_message_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .catalogs
            .values()
            .flat_map(|c| c.entries.keys().cloned())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Ids from `reference` that a locale cannot resolve even via fallback,
    /// sorted.
    #[must_use]
    pub fn missing_ids(&self, locale: &str, reference: &[&str]) -> Vec<String> {
        let mut missing: Vec<String> = reference
            .iter()
            .filter(|id| self.try_gettext(locale, id).is_none())
            .map(|id| (*id).to_string())
            .collect();
        missing.sort_unstable();
        missing
    }

    /// Coverage of every locale against the union of ids.
    #[must_use]
    pub fn coverage_report(&self) -> CoverageReport {
        let all = self.all_message_ids();
        let reference: Vec<&str> = all.iter().map(String::as_str).collect();
        let total = reference.len();

        let locales = self
            .locales()
            .into_iter()
            .map(|tag| {
                let missing = self.missing_ids(tag, &reference);
                let translated = total.saturating_sub(missing.len());
                let coverage_percent = if total == 0 {
                    100.0
                } else {
                    (translated as f32 / total as f32) * 100.0
                };
                LocaleCoverage {
                    locale: tag.to_string(),
                    translated,
                    missing,
                    coverage_percent,
                }
            })
            .collect();

        CoverageReport {
            total_ids: total,
            locales,
        }
    }
}

/// Coverage of a catalog set against the union of its message ids.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CoverageReport {
    /// Unique message ids across all catalogs.
    pub total_ids: usize,
    /// Per-locale coverage, sorted by locale tag.
    pub locales: Vec<LocaleCoverage>,
}

/// Per-locale coverage statistics.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LocaleCoverage {
    /// Locale tag (e.g., `"fr"`).
    pub locale: String,
    /// Reference ids resolvable (including via fallback).
    pub translated: usize,
    /// Reference ids unresolvable even after fallback, sorted.
    pub missing: Vec<String>,
    /// Coverage as a percentage (0.0–100.0).
    pub coverage_percent: f32,
}
