//! Light validation and coercion of single field values into their CFF form.

use crate::Error;

/// Reduces a DOI given as `https://doi.org/...` or `doi:...` to the bare DOI.
pub(crate) fn doi(value: &str) -> Result<String, Error> {
    let value = value.trim();
    let bare = ["https://doi.org/", "http://doi.org/", "https://dx.doi.org/", "doi:"]
        .iter()
        .find_map(|prefix| value.strip_prefix(prefix))
        .unwrap_or(value);

    if bare.starts_with("10.") && bare.contains('/') && !bare.contains(char::is_whitespace) {
        Ok(bare.to_owned())
    } else {
        Err(Error::validation(format!("'{value}' is not a valid DOI")))
    }
}

/// Checks that `value` is an `http` or `https` URL, `field` names the value in the error.
pub(crate) fn url(value: &str, field: &str) -> Result<String, Error> {
    let value = value.trim();
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));

    match rest {
        Some(host) if !host.is_empty() && !value.contains(char::is_whitespace) => {
            Ok(value.to_owned())
        }
        _ => Err(Error::validation(format!(
            "'{value}' in {field} is not an http(s) URL"
        ))),
    }
}

/// Checks that a commit is a full 40 character SHA-1 hash in lowercase hex.
pub(crate) fn commit(value: &str) -> Result<String, Error> {
    let value = value.trim();
    if value.len() == 40
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    {
        Ok(value.to_owned())
    } else {
        Err(Error::validation(format!(
            "'{value}' is not a 40 character commit hash"
        )))
    }
}

/// Accepts a bare ORCID id or an orcid.org URL and returns the URL form.
pub(crate) fn orcid(value: &str) -> Result<String, Error> {
    let value = value.trim();
    let id = value
        .strip_prefix("https://orcid.org/")
        .or_else(|| value.strip_prefix("http://orcid.org/"))
        .unwrap_or(value);

    let valid = id.len() == 19
        && id.char_indices().all(|(i, c)| match i {
            4 | 9 | 14 => c == '-',
            18 => c.is_ascii_digit() || c == 'X',
            _ => c.is_ascii_digit(),
        });

    if valid {
        Ok(format!("https://orcid.org/{id}"))
    } else {
        Err(Error::validation(format!("'{value}' is not a valid ORCID")))
    }
}

pub(crate) fn email(value: &str) -> Result<String, Error> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() > 1
                && domain.split('.').all(|part| !part.is_empty())
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(value.to_owned())
    } else {
        Err(Error::validation(format!(
            "'{value}' is not a valid email address"
        )))
    }
}

/// Splits a BibTeX `keywords` value on `,` or `;`.
pub(crate) fn keywords(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
