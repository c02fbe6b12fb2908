//! Company domain handling for visitor tracking.
//!
//! Domains are accepted unconditionally; normalisation only makes the logged
//! value comparable across "Jane@Acme.com", "https://www.acme.com/careers" and
//! "acme.com".

use std::sync::OnceLock;

use regex::Regex;

pub const DOMAIN_ACCEPTED: &str = "Domain accepted";
pub const DOMAIN_NOT_REQUIRED: &str = "Domain not required";
/// Recorded in the access log when the visitor gave no domain.
pub const DOMAIN_NOT_PROVIDED: &str = "not_provided";

const BIG_TECH: [&str; 6] = ["google", "microsoft", "apple", "amazon", "meta", "netflix"];
const STARTUP_TLDS: [&str; 5] = [".io", ".ai", ".tech", ".co", ".app"];
const EDUCATION_SUFFIXES: [&str; 3] = [".edu", ".ac.uk", ".edu.sg"];
const GOVERNMENT_SUFFIXES: [&str; 2] = [".gov", ".govt"];
const PERSONAL_DOMAINS: [&str; 10] = [
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "aol.com",
    "mail.com",
    "icloud.com",
    "protonmail.com",
    "zoho.com",
    "yandex.com",
];

fn url_noise() -> &'static Regex {
    static URL_NOISE: OnceLock<Regex> = OnceLock::new();
    URL_NOISE.get_or_init(|| {
        Regex::new(r"^(?:https?://)?(?:www\.)?(?P<host>[^/]*)").expect("valid domain regex")
    })
}

/// Lowercases, trims, keeps the part after `@`, strips scheme, `www.` and any path.
pub fn normalize_domain(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let host = match lowered.rsplit_once('@') {
        Some((_, domain)) => domain,
        None => lowered.as_str(),
    };
    url_noise()
        .captures(host)
        .and_then(|c| c.name("host"))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Coarse bucket used by the analytics view.
pub fn categorize_domain(domain: &str) -> &'static str {
    let domain = domain.to_lowercase();

    if BIG_TECH.iter().any(|name| domain.contains(name)) {
        "big_tech"
    } else if STARTUP_TLDS.iter().any(|tld| domain.ends_with(tld)) {
        "startup"
    } else if EDUCATION_SUFFIXES.iter().any(|s| domain.ends_with(s)) {
        "education"
    } else if GOVERNMENT_SUFFIXES.iter().any(|s| domain.ends_with(s)) {
        "government"
    } else if PERSONAL_DOMAINS.contains(&domain.as_str()) {
        "personal"
    } else {
        "corporate"
    }
}
