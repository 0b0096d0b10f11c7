//! Format validators for IRIs, language tags, emails, and calendar dates.
//!
//! IRI, language, and date validators treat blank input as valid because every
//! field they guard is optional at edit time; required-ness is checked at
//! submission. Email is the exception: a blank email is invalid.
//!
//! Each validator returns the first violated rule's user-facing message.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::{DATE_YEAR_MAX, DATE_YEAR_MIN};

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").expect("scheme regex"));

static BCP47_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z]{2,3}(-[a-zA-Z]{4})?(-(?:[a-zA-Z]{2}|[0-9]{3}))?(-[a-zA-Z0-9]{5,8})?$")
        .expect("bcp47 regex")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w.+%-]+@[\w][\w.-]*[\w]\.[a-zA-Z]{2,}$").expect("email regex")
});

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})/(\d{2})/(\d{2})$").expect("date regex"));

static IPV4_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("ipv4 regex"));

const FORBIDDEN_LEADING: &[char] = &['@', '#', '{', '}', '|', '\\', '^', '`', '<', '>', '"', '\''];
const FORBIDDEN_ANYWHERE: &[char] = &['"', '<', '>', '{', '}', '|', '\\', '^', '`'];
const FORBIDDEN_TRAILING: &[char] = &['.', ',', ';', ':'];

/// Schemes whose IRIs must use the `scheme://authority` form.
pub const HIERARCHICAL_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "ftps", "sftp", "file", "ws", "wss", "git", "ssh", "telnet", "ldap",
    "ldaps", "imap", "imaps", "pop", "pops", "smtp", "smtps",
];

/// Validate an IRI or IRI reference.
///
/// Returns `None` when the value is valid (or blank).
pub fn validate_iri(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }

    if let Some(first) = value.chars().next() {
        if FORBIDDEN_LEADING.contains(&first) {
            return Some(format!("IRI cannot start with '{}'", first));
        }
    }

    let scheme_match = match SCHEME_RE.find(value) {
        Some(m) => m,
        None => {
            return Some(
                "IRI must start with a scheme such as 'http://' or 'https://'".to_string(),
            )
        }
    };
    let scheme = value[..scheme_match.end() - 1].to_ascii_lowercase();

    if let Some(bad) = value
        .chars()
        .find(|c| c.is_whitespace() || FORBIDDEN_ANYWHERE.contains(c))
    {
        return Some(if bad.is_whitespace() {
            "IRI cannot contain spaces or other whitespace".to_string()
        } else {
            format!("IRI cannot contain '{}'", bad)
        });
    }

    if let Some(last) = value.chars().last() {
        if FORBIDDEN_TRAILING.contains(&last) || last.is_whitespace() {
            return Some(format!("IRI cannot end with '{}'", last));
        }
    }

    if value.contains("..") {
        return Some("IRI cannot contain consecutive dots '..'".to_string());
    }

    for seq in ["/.", "./", ":."] {
        if value.contains(seq) {
            return Some(format!("IRI cannot contain the sequence '{}'", seq));
        }
    }

    if !brackets_balanced(value) {
        return Some("IRI has unbalanced square brackets".to_string());
    }

    let rest = &value[scheme_match.end()..];
    if HIERARCHICAL_SCHEMES.contains(&scheme.as_str()) && !rest.starts_with("//") {
        return Some(format!("IRIs with scheme '{}' must use '{}://'", scheme, scheme));
    }

    let mut authority_has_at = false;
    if scheme == "http" || scheme == "https" {
        let after_slashes = &rest[2..];
        let authority_end = after_slashes
            .find(['/', '?', '#'])
            .unwrap_or(after_slashes.len());
        let authority = &after_slashes[..authority_end];
        let path = &after_slashes[authority_end..];

        if let Some(message) = validate_http_authority(authority) {
            return Some(message);
        }
        let path_only = path.split(['?', '#']).next().unwrap_or("");
        if path_only.contains("//") {
            return Some("IRI path cannot contain '//'".to_string());
        }
        authority_has_at = authority.contains('@');
        if path.contains('@') {
            return Some(
                "'@' is only allowed in mailto: IRIs or as user info in http(s) IRIs".to_string(),
            );
        }
    }

    if value.contains('@') && scheme != "mailto" && !authority_has_at {
        return Some(
            "'@' is only allowed in mailto: IRIs or as user info in http(s) IRIs".to_string(),
        );
    }

    if value.matches('#').count() > 1 {
        return Some("IRI can contain at most one '#'".to_string());
    }

    None
}

fn brackets_balanced(value: &str) -> bool {
    let mut depth: i32 = 0;
    for c in value.chars() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn validate_http_authority(authority: &str) -> Option<String> {
    let host_port = match authority.rfind('@') {
        Some(pos) => &authority[pos + 1..],
        None => authority,
    };
    if host_port.starts_with('[') {
        // IPv6 literal; bracket balance was checked already.
        return None;
    }
    let host = match host_port.rsplit_once(':') {
        Some((host, port)) => {
            if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
                return Some(format!("Invalid port '{}'", port));
            }
            host
        }
        None => host_port,
    };

    if host.is_empty() {
        return Some("IRI is missing a domain name".to_string());
    }
    if host.starts_with('.') || host.ends_with('.') {
        return Some("Domain cannot start or end with a dot".to_string());
    }
    if host.contains("..") {
        return Some("Domain cannot contain consecutive dots".to_string());
    }
    if host.eq_ignore_ascii_case("localhost") || IPV4_RE.is_match(host) {
        return None;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return Some(
            "Domain must have a name and a top-level domain (e.g. example.com)".to_string(),
        );
    }
    let tld = labels[labels.len() - 1];
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some("Top-level domain must be at least 2 letters".to_string());
    }
    if labels[labels.len() - 2].is_empty() {
        return Some("Domain name is missing before the top-level domain".to_string());
    }
    for label in &labels {
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return Some(format!("Domain label '{}' contains invalid characters", label));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Some(format!(
                "Domain label '{}' cannot start or end with a hyphen",
                label
            ));
        }
    }
    None
}

/// Validate a BCP-47 language tag (`language[-script][-region][-variant]`).
pub fn validate_bcp47(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || BCP47_RE.is_match(value) {
        return None;
    }
    Some("Invalid language tag. Use a BCP-47 code such as 'en', 'en-US', or 'zh-Hans'".to_string())
}

/// Outcome of [`validate_email`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailValidation {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl EmailValidation {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(message: &str) -> Self {
        Self {
            is_valid: false,
            error: Some(message.to_string()),
        }
    }
}

/// Validate an email address. Unlike the other validators, blank is invalid.
pub fn validate_email(value: &str) -> EmailValidation {
    let value = value.trim();
    if value.is_empty() {
        return EmailValidation::invalid("Email is required");
    }
    if value.contains(',') {
        return EmailValidation::invalid("Email cannot contain commas");
    }
    if value.chars().any(char::is_whitespace) {
        return EmailValidation::invalid("Email cannot contain spaces");
    }
    if value.contains("..") {
        return EmailValidation::invalid("Email cannot contain consecutive dots");
    }
    if value.starts_with('.') || value.contains("@.") {
        return EmailValidation::invalid("Email cannot start with a dot or have a dot right after '@'");
    }
    if value.matches('@').count() != 1 {
        return EmailValidation::invalid("Email must contain exactly one '@'");
    }
    if !EMAIL_RE.is_match(value) {
        return EmailValidation::invalid("Please enter a valid email address (e.g. name@example.org)");
    }
    EmailValidation::valid()
}

/// Whether `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Validate a strict `YYYY/MM/DD` calendar date within the accepted year range.
pub fn validate_calendar_date(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let Some(caps) = DATE_RE.captures(value) else {
        return Some("Date must be in YYYY/MM/DD format".to_string());
    };
    let (Ok(year), Ok(month), Ok(day)) = (
        caps[1].parse::<i32>(),
        caps[2].parse::<u32>(),
        caps[3].parse::<u32>(),
    ) else {
        return Some("Date must be in YYYY/MM/DD format".to_string());
    };

    if !(DATE_YEAR_MIN..=DATE_YEAR_MAX).contains(&year) {
        return Some(format!(
            "Year must be between {} and {}",
            DATE_YEAR_MIN, DATE_YEAR_MAX
        ));
    }
    if !(1..=12).contains(&month) {
        return Some("Month must be between 01 and 12".to_string());
    }
    let max_day = days_in_month(year, month);
    if day < 1 || day > max_day {
        return Some(format!(
            "Day must be between 01 and {:02} for {}/{:02}",
            max_day, year, month
        ));
    }
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) if date.format("%Y/%m/%d").to_string() == value => None,
        _ => Some("Invalid calendar date".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iri_blank_is_valid() {
        assert_eq!(validate_iri(""), None);
        assert_eq!(validate_iri("   "), None);
    }

    #[test]
    fn test_iri_plain_http_is_valid() {
        assert_eq!(validate_iri("http://example.com"), None);
        assert_eq!(validate_iri("https://www.w3.org/ns/dcat#Dataset"), None);
    }

    #[test]
    fn test_iri_without_scheme() {
        let err = validate_iri("example.com").unwrap();
        assert!(err.contains("scheme"), "{}", err);
    }

    #[test]
    fn test_iri_consecutive_dots_in_domain() {
        let err = validate_iri("http://ex..ample.com").unwrap();
        assert!(err.contains("consecutive dots"), "{}", err);
    }

    #[test]
    fn test_iri_single_label_domain() {
        let err = validate_iri("http://a").unwrap();
        assert!(err.contains("top-level domain"), "{}", err);
    }

    #[test]
    fn test_iri_localhost_with_port() {
        assert_eq!(validate_iri("http://localhost:8080/path"), None);
    }

    #[test]
    fn test_iri_ipv4_host() {
        assert_eq!(validate_iri("http://192.168.0.1/sparql"), None);
    }

    #[test]
    fn test_iri_leading_forbidden_char() {
        assert_eq!(
            validate_iri("<http://example.com>").unwrap(),
            "IRI cannot start with '<'"
        );
    }

    #[test]
    fn test_iri_whitespace_inside() {
        let err = validate_iri("http://example.com/a b").unwrap();
        assert!(err.contains("whitespace"));
    }

    #[test]
    fn test_iri_trailing_punctuation() {
        assert_eq!(
            validate_iri("http://example.com/page.").unwrap(),
            "IRI cannot end with '.'"
        );
    }

    #[test]
    fn test_iri_dot_segment_sequences() {
        assert!(validate_iri("http://example.com/./x").is_some());
        assert!(validate_iri("urn:.x").is_some());
    }

    #[test]
    fn test_iri_unbalanced_brackets() {
        let err = validate_iri("http://[::1/x").unwrap();
        assert!(err.contains("brackets"));
    }

    #[test]
    fn test_iri_hierarchical_scheme_requires_authority() {
        let err = validate_iri("http:example.com").unwrap();
        assert!(err.contains("http://"), "{}", err);
        assert_eq!(validate_iri("urn:isbn:0451450523"), None);
    }

    #[test]
    fn test_iri_numeric_tld_rejected() {
        let err = validate_iri("http://example.c0m").unwrap();
        assert!(err.contains("Top-level domain"));
    }

    #[test]
    fn test_iri_hyphen_label_rejected() {
        let err = validate_iri("http://-bad.example.com").unwrap();
        assert!(err.contains("hyphen"));
    }

    #[test]
    fn test_iri_double_slash_in_path() {
        let err = validate_iri("http://example.com/a//b").unwrap();
        assert!(err.contains("'//'"));
    }

    #[test]
    fn test_iri_at_sign_rules() {
        assert_eq!(validate_iri("mailto:someone@example.org"), None);
        assert_eq!(validate_iri("http://user@example.org/x"), None);
        assert!(validate_iri("http://example.org/a@b").is_some());
        assert!(validate_iri("urn:x:a@b").is_some());
    }

    #[test]
    fn test_iri_multiple_fragments() {
        let err = validate_iri("http://example.org/a#b#c").unwrap();
        assert!(err.contains("'#'"));
    }

    #[test]
    fn test_bcp47_valid_tags() {
        for tag in ["en", "en-US", "zh-Hans", "sr-Latn-RS", "es-419", "de-DE-1996a"] {
            assert_eq!(validate_bcp47(tag), None, "{}", tag);
        }
    }

    #[test]
    fn test_bcp47_invalid_tags() {
        assert!(validate_bcp47("english").is_some());
        assert!(validate_bcp47("e").is_some());
        assert!(validate_bcp47("en_US").is_some());
    }

    #[test]
    fn test_bcp47_blank_is_valid() {
        assert_eq!(validate_bcp47(""), None);
    }

    #[test]
    fn test_email_blank_is_invalid() {
        let result = validate_email("");
        assert!(!result.is_valid);
        assert_eq!(result.error.as_deref(), Some("Email is required"));
    }

    #[test]
    fn test_email_valid() {
        assert!(validate_email("jane.doe+kg@example.org").is_valid);
    }

    #[test]
    fn test_email_rule_order() {
        assert_eq!(
            validate_email("a,b@example.org").error.as_deref(),
            Some("Email cannot contain commas")
        );
        assert_eq!(
            validate_email("a b@example.org").error.as_deref(),
            Some("Email cannot contain spaces")
        );
        assert_eq!(
            validate_email("a..b@example.org").error.as_deref(),
            Some("Email cannot contain consecutive dots")
        );
        assert!(validate_email(".a@example.org")
            .error
            .unwrap()
            .contains("start with a dot"));
        assert!(validate_email("a@.example.org")
            .error
            .unwrap()
            .contains("right after '@'"));
        assert_eq!(
            validate_email("a@b@example.org").error.as_deref(),
            Some("Email must contain exactly one '@'")
        );
        assert!(!validate_email("a@example").is_valid);
    }

    #[test]
    fn test_date_leap_years() {
        assert_eq!(validate_calendar_date("2024/02/29"), None);
        assert!(validate_calendar_date("2023/02/29").is_some());
        assert_eq!(validate_calendar_date("2000/02/29"), None);
        assert!(validate_calendar_date("1900/02/29").is_some());
    }

    #[test]
    fn test_date_month_range() {
        assert_eq!(
            validate_calendar_date("2024/13/01").unwrap(),
            "Month must be between 01 and 12"
        );
    }

    #[test]
    fn test_date_format() {
        assert_eq!(
            validate_calendar_date("24/01/01").unwrap(),
            "Date must be in YYYY/MM/DD format"
        );
        assert!(validate_calendar_date("2024-01-01").is_some());
    }

    #[test]
    fn test_date_year_bounds() {
        assert!(validate_calendar_date("1899/12/31").is_some());
        assert_eq!(validate_calendar_date("1900/01/01"), None);
        assert_eq!(validate_calendar_date("2100/12/31"), None);
        assert!(validate_calendar_date("2101/01/01").is_some());
    }

    #[test]
    fn test_date_day_bounds() {
        assert!(validate_calendar_date("2024/04/31").is_some());
        assert!(validate_calendar_date("2024/01/00").is_some());
        assert_eq!(validate_calendar_date("2024/01/31"), None);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 11), 30);
    }
}
