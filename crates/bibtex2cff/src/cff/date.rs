use chrono::NaiveDate;

use crate::{ast::FieldQuery, Error};

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Derives the release date of an entry.
///
/// A `date` field takes precedence over the `year`, `month` and `day` fields. Missing month and
/// day parts default to the first. Returns `Ok(None)` when the entry has neither `date` nor
/// `year`.
pub(crate) fn release_date<Q: FieldQuery>(entry: &Q) -> Result<Option<NaiveDate>, Error> {
    if let Some(date) = entry.get_literal("date") {
        return parse_date_field(&date).map(Some);
    }

    let year = match entry.get_literal("year") {
        Some(year) => parse_year(&year)?,
        None => return Ok(None),
    };

    let month = entry
        .get_literal("month")
        .map(|month| {
            parse_month(&month)
                .ok_or_else(|| Error::validation(format!("'{month}' is not a valid month")))
        })
        .transpose()?
        .unwrap_or(1);

    let day = entry
        .get_literal("day")
        .map(|day| {
            day.parse::<u32>()
                .map_err(|_| Error::validation(format!("'{day}' is not a valid day")))
        })
        .transpose()?
        .unwrap_or(1);

    to_date(year, month, day).map(Some)
}

/// Parses a `date` field in `YYYY`, `YYYY-MM` or `YYYY-MM-DD` form, for date ranges such as
/// `2020/2021` only the start is used.
fn parse_date_field(value: &str) -> Result<NaiveDate, Error> {
    let start = value.split('/').next().unwrap_or(value).trim();
    let invalid = || Error::validation(format!("'{value}' is not a valid date"));

    let mut parts = start.split('-');
    let year = parts.next().map(parse_year).ok_or_else(invalid)??;
    let month = parts
        .next()
        .map(|m| m.parse::<u32>().map_err(|_| invalid()))
        .transpose()?
        .unwrap_or(1);
    let day = parts
        .next()
        .map(|d| d.parse::<u32>().map_err(|_| invalid()))
        .transpose()?
        .unwrap_or(1);

    if parts.next().is_some() {
        return Err(invalid());
    }

    to_date(year, month, day)
}

fn parse_year(value: &str) -> Result<i32, Error> {
    let value = value.trim();
    if value.len() == 4 && value.chars().all(|c| c.is_ascii_digit()) {
        value
            .parse()
            .map_err(|e| Error::wrap_with(crate::ErrorKind::Validation, e, "Invalid year"))
    } else {
        Err(Error::validation(format!(
            "'{value}' is not a four digit year"
        )))
    }
}

/// Accepts a month number, a three letter abbreviation or a full month name.
fn parse_month(value: &str) -> Option<u32> {
    let value = value.trim().to_lowercase();

    if let Ok(n) = value.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }

    if value.len() < 3 {
        return None;
    }

    MONTHS
        .iter()
        .position(|name| name.starts_with(value.trim_end_matches('.')))
        .and_then(|i| u32::try_from(i + 1).ok())
}

fn to_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, Error> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        Error::validation(format!(
            "{year:04}-{month:02}-{day:02} is not a valid calendar date"
        ))
    })
}
