#![forbid(unsafe_code)]

//! PO message-catalog toolkit.
//!
//! Parses GNU-gettext PO catalogs into immutable lookup tables, selects
//! plural forms via the catalog's `Plural-Forms` rule, and substitutes
//! python-format placeholders (`%s`, `%(name)s`) into looked-up templates.
//!
//! Lookups never fail: a missing message id resolves to the id itself, so a
//! host process keeps emitting readable (untranslated) messages when a
//! catalog is absent or malformed.

pub mod catalog;
pub mod format;
pub mod header;
pub mod plural;
pub mod po;

pub use catalog::{Catalog, CatalogError, CatalogSet, CoverageReport, LocaleCoverage};
pub use format::{
    Placeholder, PlaceholderIssue, check_entry, format_named, format_positional, placeholders,
};
pub use header::Metadata;
pub use plural::{PluralError, PluralRule};
pub use po::{ParseError, PoEntry};
