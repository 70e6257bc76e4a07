use std::sync::LazyLock;

use regex::Regex;

use crate::error::{BoletimError, Result};
use crate::types::{FetchRequest, QueryParams};

static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}$").unwrap());
static RE_BIRTH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").unwrap());

/// Academic years the portal will answer for, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::new(2020, 2025)
    }
}

/// Turn raw query parameters into a [`FetchRequest`].
///
/// Checks run in a fixed order and the first failure is returned:
/// student name, mother name, year (presence, format, range), birth date
/// (presence, format).
pub fn validate_request(query: &QueryParams, years: &YearRange) -> Result<FetchRequest> {
    let student_name = required(query, "studentName").ok_or(BoletimError::StudentNameMissing)?;
    let mother_name = required(query, "motherName").ok_or(BoletimError::MotherNameMissing)?;

    let year_text = required(query, "year").ok_or(BoletimError::YearMissing)?.trim();
    if !RE_YEAR.is_match(year_text) {
        return Err(BoletimError::YearInvalidFormat);
    }
    // Four ASCII digits always fit in an i32.
    let year: i32 = year_text
        .parse()
        .map_err(|_| BoletimError::YearInvalidFormat)?;
    if !years.contains(year) {
        return Err(BoletimError::YearOutOfRange {
            min: years.min,
            max: years.max,
        });
    }

    let birth_date = required(query, "birthDate")
        .ok_or(BoletimError::BirthDateMissing)?
        .trim();
    if !RE_BIRTH_DATE.is_match(birth_date) {
        return Err(BoletimError::BirthDateInvalidFormat);
    }

    Ok(FetchRequest {
        student_name: student_name.to_string(),
        mother_name: mother_name.to_string(),
        birth_date: birth_date.to_string(),
        year,
    })
}

fn required<'a>(query: &'a QueryParams, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid() -> QueryParams {
        params(&[
            ("studentName", "Maria da Silva"),
            ("motherName", "Ana da Silva"),
            ("year", "2022"),
            ("birthDate", "01/02/2008"),
        ])
    }

    fn kind_without(key: &str) -> ErrorKind {
        let mut query = valid();
        query.remove(key);
        validate_request(&query, &YearRange::default())
            .unwrap_err()
            .kind()
    }

    #[test]
    fn valid_request_passes() {
        let request = validate_request(&valid(), &YearRange::default()).unwrap();
        assert_eq!(request.student_name, "Maria da Silva");
        assert_eq!(request.mother_name, "Ana da Silva");
        assert_eq!(request.year, 2022);
        assert_eq!(request.birth_date, "01/02/2008");
    }

    #[test]
    fn each_missing_field_has_its_own_error() {
        assert_eq!(kind_without("studentName"), ErrorKind::StudentNameMissing);
        assert_eq!(kind_without("motherName"), ErrorKind::MotherNameMissing);
        assert_eq!(kind_without("year"), ErrorKind::YearMissing);
        assert_eq!(kind_without("birthDate"), ErrorKind::BirthDateMissing);
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut query = valid();
        query.insert("studentName".into(), String::new());
        assert_eq!(
            validate_request(&query, &YearRange::default()),
            Err(BoletimError::StudentNameMissing)
        );
    }

    #[test]
    fn first_failure_wins() {
        let query = params(&[("year", "abc")]);
        assert_eq!(
            validate_request(&query, &YearRange::default()),
            Err(BoletimError::StudentNameMissing)
        );
    }

    #[test]
    fn year_format_and_range() {
        let years = YearRange::default();

        let mut query = valid();
        query.insert("year".into(), "202a".into());
        assert_eq!(validate_request(&query, &years), Err(BoletimError::YearInvalidFormat));

        query.insert("year".into(), "20221".into());
        assert_eq!(validate_request(&query, &years), Err(BoletimError::YearInvalidFormat));

        query.insert("year".into(), "2019".into());
        assert_eq!(
            validate_request(&query, &years),
            Err(BoletimError::YearOutOfRange { min: 2020, max: 2025 })
        );

        query.insert("year".into(), "2025".into());
        assert!(validate_request(&query, &years).is_ok());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let mut query = valid();
        query.insert("year".into(), " 2022 ".into());
        query.insert("birthDate".into(), "01/02/2000 ".into());

        let request = validate_request(&query, &YearRange::default()).unwrap();
        assert_eq!(request.year, 2022);
        assert_eq!(request.birth_date, "01/02/2000");
    }

    #[test]
    fn year_range_is_configurable() {
        let mut query = valid();
        query.insert("year".into(), "2026".into());
        assert!(validate_request(&query, &YearRange::default()).is_err());
        assert!(validate_request(&query, &YearRange::new(2020, 2026)).is_ok());
    }

    #[test]
    fn birth_date_needs_leading_zeros() {
        let mut query = valid();
        query.insert("birthDate".into(), "1/2/2000".into());
        assert_eq!(
            validate_request(&query, &YearRange::default()),
            Err(BoletimError::BirthDateInvalidFormat)
        );

        query.insert("birthDate".into(), "01/02/2000".into());
        assert!(validate_request(&query, &YearRange::default()).is_ok());
    }
}
