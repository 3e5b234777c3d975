use std::collections::BTreeMap;

use super::FieldQuery;

/// The kind of a BibTeX entry, which decides the CFF `type` of the converted document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// `@software`
    Software,
    /// `@dataset`, also accepts `@data` and the `@datatset` misspelling.
    Dataset,
    /// `@misc`
    Misc,
    /// Any other entry type, such as `article` or `book`.
    Other(String),
}

impl From<&str> for EntryKind {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "software" => Self::Software,
            "dataset" | "data" | "datatset" => Self::Dataset,
            "misc" => Self::Misc,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Software => f.write_str("software"),
            Self::Dataset => f.write_str("dataset"),
            Self::Misc => f.write_str("misc"),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

/// One parsed bibliographic record.
///
/// Entries are produced by the parser and are not changed afterwards, the field map is ordered
/// by name so that iterating the fields is deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BibEntry {
    kind: EntryKind,
    cite: String,
    fields: BTreeMap<String, String>,
}

impl BibEntry {
    /// Creates a new entry from its kind, citation key and `(name, raw value)` pairs.
    ///
    /// Field names are normalized to lowercase, when a name is repeated the last value is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use bibtex2cff::ast::{BibEntry, EntryKind, FieldQuery};
    ///
    /// let entry = BibEntry::new("article".into(), "key1", [("Title", "A {GPU} Study")]);
    ///
    /// assert_eq!(&EntryKind::Other("article".to_owned()), entry.kind());
    /// assert_eq!(Some("A {GPU} Study"), entry.get_field("title"));
    /// assert_eq!(Some("A GPU Study".to_owned()), entry.get_text("title"));
    /// ```
    pub fn new<C, I, K, V>(kind: EntryKind, cite: C, fields: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            kind,
            cite: cite.into(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_lowercase(), v.into()))
                .collect(),
        }
    }

    /// Returns the kind of the entry.
    #[must_use]
    pub const fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Returns the citation key of this entry.
    #[must_use]
    pub fn cite(&self) -> &str {
        &self.cite
    }

    /// Returns the `(name, raw value)` pairs of the entry ordered by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FieldQuery for BibEntry {
    fn get_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}
