//! Validation of raw caller input against a [`FieldSpec`].
//!
//! Validation always runs before formatting: the formatter assumes the value
//! it receives already satisfies the field's rule.

use crate::error::{Error, Result};
use crate::field::{FieldKind, FieldSpec, Rule};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

/// Check `raw` against the width, character set and rule of `spec`.
pub fn validate(raw: &str, spec: &FieldSpec) -> Result<()> {
    if raw.is_empty() {
        if spec.required {
            return Err(Error::validation(spec.name, raw, "value is required"));
        }
        return Ok(());
    }

    if !is_printable_ascii(raw) {
        return Err(Error::validation(
            spec.name,
            raw,
            "only printable ASCII characters are allowed",
        ));
    }

    if spec.kind == FieldKind::Numeric && !digits().is_match(raw) {
        return Err(Error::validation(spec.name, raw, "should contain only digits"));
    }

    // Dates and times report their own shape errors.
    if spec.kind == FieldKind::Numeric && raw.len() > spec.width {
        return Err(Error::validation(
            spec.name,
            raw,
            format!("should be at most {} characters", spec.width),
        ));
    }

    match spec.rule {
        Rule::Any => Ok(()),
        Rule::Pattern(regex, reason) => {
            if regex().is_match(raw) {
                Ok(())
            } else {
                Err(Error::validation(spec.name, raw, reason))
            }
        }
        Rule::OneOf(codes) => {
            if codes.contains(&raw) {
                Ok(())
            } else {
                Err(Error::validation(
                    spec.name,
                    raw,
                    format!("should be one of {}", codes.join(", ")),
                ))
            }
        }
        Rule::Range(min, max) => match raw.parse::<u64>() {
            Ok(n) if (min..=max).contains(&n) => Ok(()),
            _ => Err(Error::validation(
                spec.name,
                raw,
                format!("should be a number between {} and {}", min, max),
            )),
        },
        Rule::CalendarDate => parse_yymmdd(raw, spec).map(|_| ()),
        Rule::CalendarTime => parse_hhmm(raw, spec).map(|_| ()),
        Rule::Routing => validate_routing(raw, spec),
        Rule::Custom(check) => check(raw).map_err(|reason| Error::validation(spec.name, raw, reason)),
    }
}

/// Decode a `YYMMDD` string, requiring both the shape and a real date.
pub fn parse_yymmdd(raw: &str, spec: &FieldSpec) -> Result<NaiveDate> {
    let invalid = || Error::validation(spec.name, raw, "should be YYMMDD");

    if !six_digits().is_match(raw) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, "%y%m%d").map_err(|_| invalid())
}

/// Decode an `HHMM` string into a time of day.
pub fn parse_hhmm(raw: &str, spec: &FieldSpec) -> Result<NaiveTime> {
    let invalid = || Error::validation(spec.name, raw, "should be HHMM");

    if !four_digits().is_match(raw) {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(raw, "%H%M").map_err(|_| invalid())
}

/// Compute the check digit for the first eight digits of a routing number.
///
/// Weights 3, 7, 1 repeat across the digits; the check digit brings the
/// weighted sum up to the next multiple of ten.
pub fn routing_check_digit(prefix: &str) -> Option<u32> {
    if prefix.len() != 8 {
        return None;
    }

    let mut sum: u32 = 0;
    for (digit, weight) in prefix.chars().zip([3u32, 7, 1].iter().cycle()) {
        sum += digit.to_digit(10)? * weight;
    }
    Some((10 - sum % 10) % 10)
}

fn validate_routing(raw: &str, spec: &FieldSpec) -> Result<()> {
    if !nine_digits().is_match(raw) {
        return Err(Error::validation(spec.name, raw, "should be a 9-digit routing number"));
    }

    let expected = routing_check_digit(&raw[..8]);
    let actual = raw[8..].chars().next().and_then(|c| c.to_digit(10));
    if expected.is_none() || expected != actual {
        return Err(Error::validation(spec.name, raw, "routing number check digit mismatch"));
    }
    Ok(())
}

fn is_printable_ascii(raw: &str) -> bool {
    raw.bytes().all(|b| (0x20..=0x7e).contains(&b))
}

pub(crate) fn digits() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"^[0-9]+$").unwrap())
}

fn six_digits() -> &'static Regex {
    static SIX_DIGITS: OnceLock<Regex> = OnceLock::new();
    SIX_DIGITS.get_or_init(|| Regex::new(r"^[0-9]{6}$").unwrap())
}

fn four_digits() -> &'static Regex {
    static FOUR_DIGITS: OnceLock<Regex> = OnceLock::new();
    FOUR_DIGITS.get_or_init(|| Regex::new(r"^[0-9]{4}$").unwrap())
}

fn nine_digits() -> &'static Regex {
    static NINE_DIGITS: OnceLock<Regex> = OnceLock::new();
    NINE_DIGITS.get_or_init(|| Regex::new(r"^[0-9]{9}$").unwrap())
}

pub(crate) fn upper_alphanumeric_char() -> &'static Regex {
    static ID_MODIFIER: OnceLock<Regex> = OnceLock::new();
    ID_MODIFIER.get_or_init(|| Regex::new(r"^[A-Z0-9]$").unwrap())
}

/// Immediate origin: a routing number or a 10-digit company identifier.
pub(crate) fn routing_or_company_id(raw: &str) -> std::result::Result<(), String> {
    if raw.len() == 10 && digits().is_match(raw) {
        return Ok(());
    }
    let spec = FieldSpec::alpha("immediate_origin", 10, true, Rule::Routing);
    validate_routing(raw, &spec).map_err(|_| {
        "should be a 9-digit routing number or a 10-digit identifier".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EFFECTIVE: FieldSpec = FieldSpec::date("effective_entry_date");

    #[test]
    fn test_check_digit() {
        assert_eq!(routing_check_digit("11000000"), Some(0));
        assert_eq!(routing_check_digit("02100002"), Some(1));
        assert_eq!(routing_check_digit("09100001"), Some(9));
        assert_eq!(routing_check_digit("1234567"), None);
    }

    #[test]
    fn test_routing_validation() {
        let spec = FieldSpec::alpha("immediate_destination", 10, true, Rule::Routing);
        assert!(validate("110000000", &spec).is_ok());
        assert!(validate("021000021", &spec).is_ok());

        let err = validate("021000022", &spec).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid immediate_destination, routing number check digit mismatch: 021000022"
        );
        assert!(validate("02100002", &spec).is_err());
    }

    #[test]
    fn test_yymmdd_shape_and_calendar() {
        assert_eq!(
            parse_yymmdd("200907", &EFFECTIVE).unwrap(),
            NaiveDate::from_ymd_opt(2020, 9, 7).unwrap()
        );

        let err = parse_yymmdd("121314", &EFFECTIVE).unwrap_err();
        assert_eq!(err.to_string(), "Invalid effective_entry_date, should be YYMMDD: 121314");

        let err = validate("2009079", &EFFECTIVE).unwrap_err();
        assert_eq!(err.to_string(), "Invalid effective_entry_date, should be YYMMDD: 2009079");

        assert!(parse_yymmdd("210229", &EFFECTIVE).is_err());
        assert!(parse_yymmdd("20-9-7", &EFFECTIVE).is_err());
    }

    #[test]
    fn test_hhmm() {
        let spec = FieldSpec::time("file_creation_time");
        assert!(parse_hhmm("1212", &spec).is_ok());
        assert!(parse_hhmm("2460", &spec).is_err());
        assert!(parse_hhmm("121", &spec).is_err());
    }

    #[test]
    fn test_required_and_charset() {
        let name = FieldSpec::alpha("company_name", 16, true, Rule::Any);
        assert!(validate("", &name).is_err());
        assert!(validate("Café", &name).is_err());
        assert!(validate("Test Firm", &name).is_ok());

        let optional = FieldSpec::alpha("company_discretionary_data", 20, false, Rule::Any);
        assert!(validate("", &optional).is_ok());
    }

    #[test]
    fn test_enumeration_and_range() {
        let codes = FieldSpec::numeric("service_class_code", 3, Rule::OneOf(&["200", "220", "225"]));
        assert!(validate("225", &codes).is_ok());
        let err = validate("230", &codes).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid service_class_code, should be one of 200, 220, 225: 230"
        );

        let priority = FieldSpec::numeric("priority_code", 2, Rule::Range(1, 99));
        assert!(validate("1", &priority).is_ok());
        assert!(validate("0", &priority).is_err());
        assert!(validate("100", &priority).is_err());
    }

    #[test]
    fn test_origin_accepts_company_id() {
        assert!(routing_or_company_id("1234567890").is_ok());
        assert!(routing_or_company_id("110000000").is_ok());
        assert!(routing_or_company_id("110000001").is_err());
    }
}
