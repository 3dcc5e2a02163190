//! Catalog header metadata.
//!
//! The entry with an empty msgid is the header; its msgstr is a block of
//! `Name: value` lines (MIME-header style). Field order is preserved so the
//! block can be re-serialized byte-compatibly, and unrecognized fields pass
//! through untouched.

use tracing::warn;

/// Parsed header fields, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    fields: Vec<(String, String)>,
}

impl Metadata {
    /// Parse a header msgstr block.
    ///
    /// Lines without a `:` separator are skipped (with a warning); values
    /// keep everything after the first `:`, trimmed.
    #[must_use]
    pub fn parse(block: &str) -> Self {
        let mut fields = Vec::new();
        for line in block.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once(':') {
                Some((name, value)) => {
                    fields.push((name.trim().to_string(), value.trim().to_string()));
                }
                None => warn!(line, "skipping malformed header line"),
            }
        }
        Self { fields }
    }

    /// Look up a field by name (ASCII case-insensitive, per MIME convention).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a field, replacing an existing one in place or appending.
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(slot) = self
            .fields
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            slot.1 = value.to_string();
        } else {
            self.fields.push((name.to_string(), value.to_string()));
        }
    }

    /// All fields in file order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Re-serialize to the header msgstr block form.
    #[must_use]
    pub fn to_block(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.fields {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // Typed accessors for the recognized fields.

    #[must_use]
    pub fn project_id_version(&self) -> Option<&str> {
        self.get("Project-Id-Version")
    }

    #[must_use]
    pub fn report_msgid_bugs_to(&self) -> Option<&str> {
        self.get("Report-Msgid-Bugs-To")
    }

    #[must_use]
    pub fn pot_creation_date(&self) -> Option<&str> {
        self.get("POT-Creation-Date")
    }

    #[must_use]
    pub fn po_revision_date(&self) -> Option<&str> {
        self.get("PO-Revision-Date")
    }

    #[must_use]
    pub fn last_translator(&self) -> Option<&str> {
        self.get("Last-Translator")
    }

    #[must_use]
    pub fn language_team(&self) -> Option<&str> {
        self.get("Language-Team")
    }

    /// The catalog's language tag (e.g., `fr`).
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.get("Language")
    }

    #[must_use]
    pub fn mime_version(&self) -> Option<&str> {
        self.get("MIME-Version")
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get("Content-Type")
    }

    #[must_use]
    pub fn content_transfer_encoding(&self) -> Option<&str> {
        self.get("Content-Transfer-Encoding")
    }

    /// The raw `Plural-Forms` expression, if declared.
    #[must_use]
    pub fn plural_forms(&self) -> Option<&str> {
        self.get("Plural-Forms")
    }

    #[must_use]
    pub fn generated_by(&self) -> Option<&str> {
        self.get("Generated-By")
    }

    #[must_use]
    pub fn x_generator(&self) -> Option<&str> {
        self.get("X-Generator")
    }

    /// The declared charset, extracted from `Content-Type`
    /// (`text/plain; charset=UTF-8`).
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.content_type()?
            .split(';')
            .map(str::trim)
            .find_map(|part| part.strip_prefix("charset="))
    }
}
