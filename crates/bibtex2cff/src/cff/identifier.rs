use std::str::FromStr;

use serde::Serialize;

use super::coerce;
use crate::Error;

/// The `type` of an [`Identifier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    /// A digital object identifier.
    Doi,
    /// A URL.
    Url,
    /// A Software Heritage identifier (`swh:1:...`).
    Swh,
    /// Any other identifier.
    Other,
}

impl FromStr for IdentifierKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "doi" => Ok(Self::Doi),
            "url" => Ok(Self::Url),
            "swh" => Ok(Self::Swh),
            "other" => Ok(Self::Other),
            _ => Err(Error::validation(format!(
                "'{s}' is not an identifier type, use one of: doi, url, swh, other"
            ))),
        }
    }
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Doi => "doi",
            Self::Url => "url",
            Self::Swh => "swh",
            Self::Other => "other",
        })
    }
}

/// An extra identifier of the cited work, listed under `identifiers`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Identifier {
    /// The kind of identifier.
    #[serde(rename = "type")]
    pub kind: IdentifierKind,
    /// The identifier itself.
    pub value: String,
    /// What the identifier refers to, such as `The archived release`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Identifier {
    /// Creates a new identifier.
    pub fn new<S: Into<String>>(
        kind: IdentifierKind,
        value: S,
        description: Option<String>,
    ) -> Self {
        Self {
            kind,
            value: value.into(),
            description,
        }
    }

    /// Checks the value against the identifier kind.
    ///
    /// DOIs are reduced to the bare DOI, URLs must use http(s) and Software Heritage identifiers
    /// must start with `swh:1:`.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ErrorKind::Validation`] error when the value does not match the kind.
    pub fn validated(mut self) -> Result<Self, Error> {
        self.value = match self.kind {
            IdentifierKind::Doi => coerce::doi(&self.value)?,
            IdentifierKind::Url => coerce::url(&self.value, "identifiers")?,
            IdentifierKind::Swh if self.value.trim().starts_with("swh:1:") => {
                self.value.trim().to_owned()
            }
            IdentifierKind::Swh => {
                return Err(Error::validation(format!(
                    "'{}' is not a Software Heritage identifier",
                    self.value
                )))
            }
            IdentifierKind::Other if self.value.trim().is_empty() => {
                return Err(Error::validation("An identifier must have a value"))
            }
            IdentifierKind::Other => self.value.trim().to_owned(),
        };
        Ok(self)
    }
}
