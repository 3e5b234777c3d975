use chrono::NaiveDate;
use log::{debug, trace};

use super::{
    author, coerce, date, Author, CffDocument, CffType, Identifier, License, Overrides,
    CFF_VERSION, DEFAULT_MESSAGE, DEFAULT_VERSION,
};
use crate::{
    ast::{BibEntry, EntryKind, FieldQuery},
    Error, ErrorKind,
};

/// The BibTeX fields that are mapped onto the CFF document, any other field is dropped.
pub const RECOGNIZED_FIELDS: [&str; 13] = [
    "title",
    "author",
    "year",
    "month",
    "day",
    "date",
    "doi",
    "url",
    "version",
    "abstract",
    "keywords",
    "license",
    "repository",
];

/// Builds a [`CffDocument`] from a [`BibEntry`] and any [`Overrides`].
///
/// A resolver holds the coerced values of an entry so far. Resolving fails while any of the
/// required `title`, `author` or `year` values are missing, returning the resolver so more
/// values can be applied before trying again.
///
/// # Examples
///
/// ```
/// use bibtex2cff::ast::{BibEntry, EntryKind};
/// use bibtex2cff::cff::{Author, Overrides, Person, Resolver};
///
/// let entry = BibEntry::new(EntryKind::Misc, "key1", [("title", "A Study"), ("year", "2023")]);
/// let resolver = Resolver::from_entry(&entry).unwrap();
///
/// // no author in the entry
/// assert_eq!(vec!["author"], resolver.required_fields().collect::<Vec<_>>());
///
/// let mut resolver = resolver.resolve().expect_err("author is required");
/// resolver
///     .apply(Overrides {
///         authors: Some(vec![Author::Person(Person::new("Doe"))]),
///         ..Overrides::default()
///     })
///     .unwrap();
///
/// let document = resolver.resolve().unwrap();
/// assert_eq!("A Study", document.title);
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    cite: String,
    kind: EntryKind,
    message: Option<String>,
    title: Option<String>,
    abstract_text: Option<String>,
    authors: Option<Vec<Author>>,
    identifiers: Vec<Identifier>,
    doi: Option<String>,
    url: Option<String>,
    repository: Option<String>,
    repository_code: Option<String>,
    repository_artifact: Option<String>,
    keywords: Vec<String>,
    license: Option<License>,
    version: Option<String>,
    commit: Option<String>,
    date_released: Option<NaiveDate>,
}

impl Resolver {
    /// Maps the recognized fields of `entry` to their CFF values.
    ///
    /// Fields outside of [`RECOGNIZED_FIELDS`] are dropped, so is the `version` of `dataset` and
    /// `misc` entries.
    ///
    /// # Errors
    ///
    /// Returns a [`ErrorKind::Validation`] error naming the entry when a field value cannot be
    /// coerced, such as a malformed author or an invalid date.
    pub fn from_entry(entry: &BibEntry) -> Result<Self, Error> {
        trace!("Mapping entry '{}' of kind {}", entry.cite(), entry.kind());

        Self::map_fields(entry).map_err(|e| e.context(format!("In entry '{}'", entry.cite())))
    }

    fn map_fields(entry: &BibEntry) -> Result<Self, Error> {
        for (name, _) in entry.fields() {
            if !RECOGNIZED_FIELDS.contains(&name) {
                debug!("Dropping unrecognized field '{name}'");
            }
        }

        let version = match entry.kind() {
            EntryKind::Dataset | EntryKind::Misc => {
                if entry.get_field("version").is_some() {
                    debug!("Dropping the version of {} entry", entry.kind());
                }
                None
            }
            _ => entry.get_text("version"),
        };

        let license = entry
            .get_literal("license")
            .map(|license| license.parse::<License>())
            .transpose()?;

        Ok(Self {
            cite: entry.cite().to_owned(),
            kind: entry.kind().clone(),
            message: None,
            title: entry.get_text("title"),
            abstract_text: entry.get_text("abstract"),
            authors: entry
                .get_field("author")
                .map(author::parse_authors)
                .transpose()?
                .filter(|authors| !authors.is_empty()),
            identifiers: Vec::new(),
            doi: entry.get_literal("doi").map(|v| coerce::doi(&v)).transpose()?,
            url: entry
                .get_literal("url")
                .map(|v| coerce::url(&v, "url"))
                .transpose()?,
            repository: None,
            repository_code: entry
                .get_literal("repository")
                .map(|v| coerce::url(&v, "repository"))
                .transpose()?,
            repository_artifact: None,
            keywords: entry
                .get_text("keywords")
                .map(|v| coerce::keywords(&v))
                .unwrap_or_default(),
            license,
            version,
            commit: None,
            date_released: date::release_date(entry)?,
        })
    }

    /// Applies the overrides on top of the values mapped from the entry.
    ///
    /// Values that are set replace the mapped ones, keywords and identifiers are appended.
    ///
    /// # Errors
    ///
    /// Returns a [`ErrorKind::Validation`] error for the first override that cannot be coerced.
    pub fn apply(&mut self, overrides: Overrides) -> Result<(), Error> {
        let Overrides {
            message,
            abstract_text,
            doi,
            url,
            repository,
            repository_code,
            repository_artifact,
            license,
            version,
            commit,
            date_released,
            keywords,
            identifiers,
            authors,
        } = overrides;

        if let Some(message) = message {
            self.message = Some(non_empty(message, "message")?);
        }
        if let Some(abstract_text) = abstract_text {
            self.abstract_text = Some(non_empty(abstract_text, "abstract")?);
        }
        if let Some(doi) = doi {
            self.doi = Some(coerce::doi(&doi)?);
        }
        if let Some(url) = url {
            self.url = Some(coerce::url(&url, "url")?);
        }
        if let Some(repository) = repository {
            self.repository = Some(coerce::url(&repository, "repository")?);
        }
        if let Some(repository_code) = repository_code {
            self.repository_code = Some(coerce::url(&repository_code, "repository-code")?);
        }
        if let Some(repository_artifact) = repository_artifact {
            self.repository_artifact =
                Some(coerce::url(&repository_artifact, "repository-artifact")?);
        }
        if let Some(license) = license {
            self.license = Some(license);
        }
        if let Some(version) = version {
            self.version = Some(non_empty(version, "version")?);
        }
        if let Some(commit) = commit {
            self.commit = Some(coerce::commit(&commit)?);
        }
        if let Some(date_released) = date_released {
            self.date_released = Some(date_released);
        }

        self.keywords.extend(
            keywords
                .into_iter()
                .map(|keyword| keyword.trim().to_owned())
                .filter(|keyword| !keyword.is_empty()),
        );

        for identifier in identifiers {
            self.identifiers.push(identifier.validated()?);
        }

        if let Some(authors) = authors {
            if authors.is_empty() {
                return Err(Error::validation("The replacement author list is empty"));
            }
            self.authors = Some(
                authors
                    .into_iter()
                    .map(Author::validated)
                    .collect::<Result<_, _>>()?,
            );
        }

        Ok(())
    }

    /// Returns the cite key of the entry being mapped.
    #[must_use]
    pub fn cite(&self) -> &str {
        &self.cite
    }

    /// Returns the names of the required BibTeX fields that still have no value.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> {
        [
            ("title", self.title.is_none()),
            ("author", self.authors.is_none()),
            ("year", self.date_released.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
    }

    /// Builds the [`CffDocument`], filling in the defaults for `message`, `license` and
    /// `version`.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self)` when a required field is missing, see [`Resolver::required_fields`].
    pub fn resolve(self) -> Result<CffDocument, Self> {
        match (self.title, self.authors, self.date_released) {
            (Some(title), Some(authors), Some(date_released)) => Ok(CffDocument {
                cff_version: CFF_VERSION.to_owned(),
                message: self
                    .message
                    .unwrap_or_else(|| DEFAULT_MESSAGE.to_owned()),
                kind: match self.kind {
                    EntryKind::Software => Some(CffType::Software),
                    EntryKind::Dataset | EntryKind::Misc => Some(CffType::Dataset),
                    EntryKind::Other(_) => None,
                },
                title,
                abstract_text: self.abstract_text,
                authors,
                identifiers: self.identifiers,
                doi: self.doi,
                url: self.url,
                repository: self.repository,
                repository_code: self.repository_code,
                repository_artifact: self.repository_artifact,
                keywords: self.keywords,
                license: self.license.unwrap_or(License::UNLICENSE),
                version: self.version.unwrap_or_else(|| DEFAULT_VERSION.to_owned()),
                commit: self.commit,
                date_released,
            }),
            (title, authors, date_released) => Err(Self {
                title,
                authors,
                date_released,
                ..self
            }),
        }
    }
}

fn non_empty(value: String, field: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation(format!("The {field} must not be empty")))
    } else {
        Ok(trimmed.to_owned())
    }
}

impl std::fmt::Display for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "missing required fields in entry '{}': {}",
            self.cite,
            self.required_fields().collect::<Vec<_>>().join(", ")
        )
    }
}

impl std::error::Error for Resolver {}

impl From<Resolver> for Error {
    fn from(resolver: Resolver) -> Self {
        Self::new(ErrorKind::Validation, resolver.to_string())
    }
}
