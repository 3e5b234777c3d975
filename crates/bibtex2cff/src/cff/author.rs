use log::warn;
use serde::Serialize;

use super::coerce;
use crate::{ast::text, Error};

/// An author of the cited work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Author {
    /// A natural person.
    Person(Person),
    /// An organisation or group, written in BibTeX as a fully braced name.
    Entity(Entity),
}

/// A person author, `family_names` is the only required part.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Person {
    /// Family name, including compound surnames such as `Vallée Poussin`.
    pub family_names: String,
    /// Given names, separated by spaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_names: Option<String>,
    /// Lowercase surname prefix, such as `van` or `de la`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_particle: Option<String>,
    /// Name suffix, such as `Jr.`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_suffix: Option<String>,
    /// The organization the person belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    /// The orcid.org URL of the person.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    /// A contact email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// An entity author such as `The R Core Team`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// The full name of the entity.
    pub name: String,
}

impl Person {
    /// Creates a person with only a family name.
    #[must_use]
    pub fn new<S: Into<String>>(family_names: S) -> Self {
        Self {
            family_names: family_names.into(),
            ..Self::default()
        }
    }

    /// Sets the given names of this person.
    #[must_use]
    pub fn with_given_names<S: Into<String>>(mut self, given_names: S) -> Self {
        self.given_names = Some(given_names.into());
        self
    }

    /// Checks the parts of a person given outside of BibTeX.
    ///
    /// The family name must not be empty, `orcid` is normalized to the orcid.org URL and
    /// `email` must be an address with a domain.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ErrorKind::Validation`] error for the first invalid part.
    pub fn validated(mut self) -> Result<Self, Error> {
        if self.family_names.trim().is_empty() {
            return Err(Error::validation("An author must have a family name"));
        }
        self.orcid = self.orcid.as_deref().map(coerce::orcid).transpose()?;
        self.email = self.email.as_deref().map(coerce::email).transpose()?;
        Ok(self)
    }
}

impl Author {
    /// Validates the author, see [`Person::validated`].
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ErrorKind::Validation`] error when a part of the author is invalid.
    pub fn validated(self) -> Result<Self, Error> {
        match self {
            Self::Person(person) => person.validated().map(Self::Person),
            Self::Entity(entity) if entity.name.trim().is_empty() => {
                Err(Error::validation("An entity author must have a name"))
            }
            entity @ Self::Entity(_) => Ok(entity),
        }
    }
}

/// Splits a raw BibTeX `author` value into authors.
///
/// Names are separated by `and` outside of braces, `others` is skipped.
pub(crate) fn parse_authors(raw: &str) -> Result<Vec<Author>, Error> {
    let mut names = vec![Vec::new()];
    for word in text::words(raw) {
        if word.eq_ignore_ascii_case("and") {
            names.push(Vec::new());
        } else if let Some(name) = names.last_mut() {
            name.push(word);
        }
    }

    let mut authors = Vec::with_capacity(names.len());
    for name in names {
        match name.as_slice() {
            [] => {
                return Err(Error::validation(format!(
                    "The author list '{}' contains an empty name",
                    text::clean(raw)
                )))
            }
            [others] if others.eq_ignore_ascii_case("others") => {
                warn!("Dropping 'others' from the author list as CFF has no et al.");
            }
            words => authors.push(parse_name(&words.join(" "))?),
        }
    }

    Ok(authors)
}

fn parse_name(name: &str) -> Result<Author, Error> {
    if text::is_fully_braced(name) {
        return Ok(Author::Entity(Entity {
            name: text::clean(name),
        }));
    }

    let parts = text::split_top_level(name, |c| c == ',')
        .into_iter()
        .map(str::trim)
        .collect::<Vec<_>>();

    let person = match parts.as_slice() {
        [first_von_last] => from_first_von_last(first_von_last),
        [von_last, first] => from_von_last(von_last, None, first),
        [von_last, jr, first] => from_von_last(von_last, Some(*jr), first),
        _ => return Err(malformed(name, "too many commas")),
    };

    if person.family_names.is_empty() {
        return Err(malformed(name, "missing family name"));
    }

    Ok(Author::Person(person))
}

fn malformed(name: &str, reason: &str) -> Error {
    Error::validation(format!(
        "Malformed author name '{}': {reason}",
        text::clean(name)
    ))
}

/// `First von Last`: the particle is the lowercase words, the family name is everything after
/// the last lowercase word.
fn from_first_von_last(name: &str) -> Person {
    let words = text::words(name);
    let (last, rest) = match words.split_last() {
        Some(split) => split,
        None => return Person::default(),
    };

    let (given, particle, family) = match rest.iter().position(|w| text::starts_lowercase(w)) {
        Some(start) => {
            let end = rest
                .iter()
                .rposition(|w| text::starts_lowercase(w))
                .unwrap_or(start);
            (&rest[..start], &rest[start..=end], &words[end + 1..])
        }
        None => (rest, &rest[..0], std::slice::from_ref(last)),
    };

    Person {
        family_names: join_clean(family).unwrap_or_default(),
        given_names: join_clean(given),
        name_particle: join_clean(particle),
        ..Person::default()
    }
}

/// `von Last, First` and `von Last, Jr, First`.
fn from_von_last(von_last: &str, jr: Option<&str>, first: &str) -> Person {
    let words = text::words(von_last);
    // the final word always belongs to the family name
    let split = words
        .len()
        .checked_sub(1)
        .and_then(|last| words[..last].iter().rposition(|w| text::starts_lowercase(w)))
        .map_or(0, |i| i + 1);

    Person {
        family_names: join_clean(&words[split..]).unwrap_or_default(),
        given_names: join_clean(&text::words(first)),
        name_particle: join_clean(&words[..split]),
        name_suffix: jr.and_then(|jr| join_clean(&text::words(jr))),
        ..Person::default()
    }
}

fn join_clean(words: &[&str]) -> Option<String> {
    let joined = text::clean(&words.join(" "));
    (!joined.is_empty()).then_some(joined)
}
