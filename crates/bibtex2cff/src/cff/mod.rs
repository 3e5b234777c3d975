//! The Citation File Format document model and the mapping from [`BibEntry`] to it.
//!
//! [`Resolver`] maps a parsed entry onto a [`CffDocument`], applying the [`Overrides`] given on
//! the command line and checking that the required fields are present.
//!
//! [`BibEntry`]: crate::ast::BibEntry

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

mod author;
mod coerce;
mod date;
mod identifier;
mod resolver;

pub use author::{Author, Entity, Person};
pub use identifier::{Identifier, IdentifierKind};
pub use resolver::Resolver;

use crate::Error;

/// The CFF schema version written to `cff-version`.
pub const CFF_VERSION: &str = "1.2.0";

/// The `message` used when none is given.
pub const DEFAULT_MESSAGE: &str = "If you use this software, please cite it as below.";

/// The `version` used when the entry has none.
pub const DEFAULT_VERSION: &str = "0.0.1";

/// The license identifiers accepted in the `license` field.
pub const LICENSES: [&str; 16] = [
    "AGPL-3.0-or-later",
    "Apache-2.0",
    "BSD-2-Clause",
    "BSD-3-Clause",
    "CC-BY-4.0",
    "CC-BY-SA-4.0",
    "CC0-1.0",
    "EPL-2.0",
    "GPL-2.0-or-later",
    "GPL-3.0-or-later",
    "ISC",
    "LGPL-2.1-or-later",
    "LGPL-3.0-or-later",
    "MIT",
    "MPL-2.0",
    "Unlicense",
];

/// The `type` of the cited work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CffType {
    /// `type: software`
    Software,
    /// `type: dataset`
    Dataset,
}

/// A SPDX license identifier from [`LICENSES`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct License(&'static str);

impl License {
    /// The license used when none is given.
    pub const UNLICENSE: Self = Self("Unlicense");

    /// Returns the SPDX identifier.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.0
    }
}

impl FromStr for License {
    type Err = Error;

    /// Matches the identifier case-insensitively and returns the canonical spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LICENSES
            .into_iter()
            .find(|id| id.eq_ignore_ascii_case(s))
            .map(Self)
            .ok_or_else(|| {
                Error::validation(format!(
                    "License '{s}' is not valid, use one of: {}",
                    LICENSES.join(", ")
                ))
            })
    }
}

impl std::fmt::Display for License {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// A complete CFF document ready to be composed to YAML.
///
/// The field order is the key order of the composed YAML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CffDocument {
    /// The schema version, always [`CFF_VERSION`].
    pub cff_version: String,
    /// How users should cite the work.
    pub message: String,
    /// Only set for software and dataset entries.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<CffType>,
    /// The entry title with LaTeX markup removed.
    pub title: String,
    /// A summary of the work.
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    /// The authors of the work, never empty.
    pub authors: Vec<Author>,
    /// Further identifiers of the work.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<Identifier>,
    /// The bare DOI, without the `https://doi.org/` prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    /// The landing page of the work.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// A repository that is neither a source code nor a build artifact repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// The source code repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_code: Option<String>,
    /// The build artifact repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_artifact: Option<String>,
    /// Keywords of the entry followed by the added ones.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// The SPDX license.
    pub license: License,
    /// The released version.
    pub version: String,
    /// The full SHA-1 hash of the released commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// The release date.
    pub date_released: NaiveDate,
}

/// Values given outside of the BibTeX entry which take precedence over the entry's fields.
///
/// Every value goes through the same validation as the matching BibTeX field.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    /// Replaces [`DEFAULT_MESSAGE`].
    pub message: Option<String>,
    /// Replaces the `abstract` field.
    pub abstract_text: Option<String>,
    /// Replaces the `doi` field.
    pub doi: Option<String>,
    /// Replaces the `url` field.
    pub url: Option<String>,
    /// Sets the `repository` key.
    pub repository: Option<String>,
    /// Replaces the `repository` field, which maps to `repository-code`.
    pub repository_code: Option<String>,
    /// Sets the `repository-artifact` key.
    pub repository_artifact: Option<String>,
    /// Replaces the `license` field.
    pub license: Option<License>,
    /// Replaces the `version` field.
    pub version: Option<String>,
    /// Replaces the `commit` field.
    pub commit: Option<String>,
    /// Replaces the date derived from the entry.
    pub date_released: Option<NaiveDate>,
    /// Appended to the keywords of the entry.
    pub keywords: Vec<String>,
    /// Appended to the identifiers of the document.
    pub identifiers: Vec<Identifier>,
    /// Replaces the authors of the entry when set.
    pub authors: Option<Vec<Author>>,
}
