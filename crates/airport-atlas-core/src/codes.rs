use regex::Regex;
use std::sync::LazyLock;

static IATA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());
static COUNTRY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());

/// Uppercases `code` and returns it if it is a well-formed IATA code.
pub fn normalize_iata(code: &str) -> Option<String> {
    let code = code.to_ascii_uppercase();
    IATA_RE.is_match(&code).then_some(code)
}

/// Uppercases `code` and returns it if it is a well-formed ISO 3166 alpha-2 code.
pub fn normalize_country(code: &str) -> Option<String> {
    let code = code.to_ascii_uppercase();
    COUNTRY_RE.is_match(&code).then_some(code)
}

pub fn is_iata(code: &str) -> bool {
    IATA_RE.is_match(code)
}
