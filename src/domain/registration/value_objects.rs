use std::fmt;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// Registration Value Objects
// ============================================================================
//
// Email and PersonName can only be built through `parse`, so a value of
// either type is always trimmed, non-empty and (for Email) normalized.
//
// ============================================================================

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;
const MAX_DOMAIN_LEN: usize = 253;

// Local part atoms may carry non-ASCII letters (RFC 6531).
static LOCAL_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~\u{A0}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFEF}-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~\u{A0}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFEF}-]+)*$",
    )
    .expect("local part pattern is valid")
});

// Internationalized labels are accepted in Unicode form as well as punycode.
static DOMAIN_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9\u{A1}-\u{FFFF}]([A-Za-z0-9\u{A1}-\u{FFFF}-]{0,61}[A-Za-z0-9\u{A1}-\u{FFFF}])?$")
        .expect("domain label pattern is valid")
});

static TOP_LEVEL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([A-Za-z\u{A1}-\u{A8}\u{AA}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFEF}]{2,63}|xn--[A-Za-z0-9-]{1,59})$",
    )
    .expect("top level label pattern is valid")
});

// Full-width ASCII look-alikes are never valid in a host name.
const FULL_WIDTH: RangeInclusive<char> = '\u{FF01}'..='\u{FF5E}';

const GMAIL_DOMAINS: &[&str] = &["gmail.com", "googlemail.com"];

const ICLOUD_DOMAINS: &[&str] = &["icloud.com", "me.com"];

const OUTLOOK_DOMAINS: &[&str] = &[
    "hotmail.at", "hotmail.be", "hotmail.ca", "hotmail.cl", "hotmail.co.il",
    "hotmail.co.nz", "hotmail.co.th", "hotmail.co.uk", "hotmail.com", "hotmail.com.ar",
    "hotmail.com.au", "hotmail.com.br", "hotmail.com.gr", "hotmail.com.mx", "hotmail.com.pe",
    "hotmail.com.tr", "hotmail.com.vn", "hotmail.cz", "hotmail.de", "hotmail.dk",
    "hotmail.es", "hotmail.fr", "hotmail.hu", "hotmail.id", "hotmail.ie",
    "hotmail.in", "hotmail.it", "hotmail.jp", "hotmail.kr", "hotmail.lv",
    "hotmail.my", "hotmail.ph", "hotmail.pt", "hotmail.sa", "hotmail.sg",
    "hotmail.sk", "live.be", "live.co.uk", "live.com", "live.com.ar",
    "live.com.mx", "live.de", "live.es", "live.eu", "live.fr",
    "live.it", "live.nl", "msn.com", "outlook.at", "outlook.be",
    "outlook.cl", "outlook.co.il", "outlook.co.nz", "outlook.co.th", "outlook.com",
    "outlook.com.ar", "outlook.com.au", "outlook.com.br", "outlook.com.gr", "outlook.com.pe",
    "outlook.com.tr", "outlook.com.vn", "outlook.cz", "outlook.de", "outlook.dk",
    "outlook.es", "outlook.fr", "outlook.hu", "outlook.id", "outlook.ie",
    "outlook.in", "outlook.it", "outlook.jp", "outlook.kr", "outlook.lv",
    "outlook.my", "outlook.ph", "outlook.pt", "outlook.sa", "outlook.sg",
    "outlook.sk", "passport.com",
];

const YAHOO_DOMAINS: &[&str] = &[
    "rocketmail.com", "yahoo.ca", "yahoo.co.uk", "yahoo.com", "yahoo.de",
    "yahoo.fr", "yahoo.in", "yahoo.it", "ymail.com",
];

// All folded into yandex.ru.
const YANDEX_DOMAINS: &[&str] = &[
    "yandex.ru", "yandex.ua", "yandex.kz", "yandex.com", "yandex.by", "ya.ru",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailError {
    Empty,
    InvalidFormat,
}

/// Normalized email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Trim, check the address grammar and normalize.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }

        let (local, domain) = split_address(trimmed).ok_or(EmailError::InvalidFormat)?;
        normalize(local, domain)
            .map(Self)
            .ok_or(EmailError::InvalidFormat)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registrant's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName(String);

impl PersonName {
    /// Returns `None` when the name is empty after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Split at the last `@` and check both halves against the grammar.
fn split_address(address: &str) -> Option<(&str, &str)> {
    if address.len() > MAX_EMAIL_LEN {
        return None;
    }

    let (local, domain) = address.rsplit_once('@')?;

    if local.is_empty() || local.len() > MAX_LOCAL_LEN || !LOCAL_PART.is_match(local) {
        return None;
    }

    if domain.len() > MAX_DOMAIN_LEN || domain.chars().any(|c| FULL_WIDTH.contains(&c)) {
        return None;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let (tld, rest) = labels.split_last()?;
    if rest.is_empty() || !TOP_LEVEL_LABEL.is_match(tld) {
        return None;
    }
    if !rest.iter().all(|label| DOMAIN_LABEL.is_match(label)) {
        return None;
    }

    Some((local, domain))
}

fn normalize(local: &str, domain: &str) -> Option<String> {
    let mut local = local.to_lowercase();
    let domain = domain.to_lowercase();
    let mut host = domain.as_str();

    if GMAIL_DOMAINS.contains(&host) {
        host = "gmail.com";
        local = before_first(&local, '+').replace('.', "");
    } else if ICLOUD_DOMAINS.contains(&host) || OUTLOOK_DOMAINS.contains(&host) {
        local = before_first(&local, '+').to_string();
    } else if YAHOO_DOMAINS.contains(&host) {
        local = before_last(&local, '-').to_string();
    } else if YANDEX_DOMAINS.contains(&host) {
        host = "yandex.ru";
    }

    if local.is_empty() {
        return None;
    }

    Some(format!("{local}@{host}"))
}

fn before_first(value: &str, separator: char) -> &str {
    value.split_once(separator).map_or(value, |(head, _)| head)
}

fn before_last(value: &str, separator: char) -> &str {
    value.rsplit_once(separator).map_or(value, |(head, _)| head)
}
