//! Keyword-based extraction of a relocation profile from free text
//!
//! Each field is found by a case-insensitive substring scan over an ordered
//! lookup table; the first table entry present in the query wins, so more
//! specific keys are listed before generic ones ("software engineer" before
//! "engineer").

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fields extracted from one query; empty strings and a zero budget mean
/// "not mentioned"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub profession: String,
    pub destination: String,
    pub origin: String,
    pub budget: u64,
}

impl UserProfile {
    pub fn is_empty(&self) -> bool {
        self.profession.is_empty()
            && self.destination.is_empty()
            && self.origin.is_empty()
            && self.budget == 0
    }
}

const PROFESSIONS: &[(&str, &str)] = &[
    ("software engineer", "software engineer"),
    ("data scientist", "data scientist"),
    ("engineer", "engineer"),
    ("developer", "developer"),
    ("programmer", "programmer"),
    ("doctor", "doctor"),
    ("nurse", "nurse"),
    ("teacher", "teacher"),
    ("accountant", "accountant"),
    ("designer", "designer"),
    ("manager", "manager"),
    ("analyst", "analyst"),
    ("consultant", "consultant"),
];

const DESTINATIONS: &[(&str, &str)] = &[
    ("canada", "Canada"),
    ("usa", "USA"),
    ("united states", "USA"),
    ("america", "USA"),
    ("united kingdom", "UK"),
    ("britain", "UK"),
    ("uk", "UK"),
    ("germany", "Germany"),
    ("australia", "Australia"),
    ("france", "France"),
    ("netherlands", "Netherlands"),
    ("sweden", "Sweden"),
    ("norway", "Norway"),
    ("denmark", "Denmark"),
    ("switzerland", "Switzerland"),
    ("new zealand", "New Zealand"),
    ("singapore", "Singapore"),
    ("japan", "Japan"),
    ("south korea", "South Korea"),
    ("dubai", "UAE"),
    ("uae", "UAE"),
];

const ORIGINS: &[(&str, &str)] = &[
    ("nigeria", "Nigeria"),
    ("ghana", "Ghana"),
    ("kenya", "Kenya"),
    ("south africa", "South Africa"),
    ("ethiopia", "Ethiopia"),
    ("egypt", "Egypt"),
    ("morocco", "Morocco"),
    ("tanzania", "Tanzania"),
    ("uganda", "Uganda"),
    ("india", "India"),
    ("pakistan", "Pakistan"),
    ("bangladesh", "Bangladesh"),
    ("philippines", "Philippines"),
    ("china", "China"),
    ("brazil", "Brazil"),
    ("mexico", "Mexico"),
    ("argentina", "Argentina"),
];

// First "$", then the run of digits, commas and dots, then an optional "k"
static BUDGET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([0-9.,]*)(k?)").expect("budget pattern is valid"));

/// Extract a profile from a free-text query; never fails
pub fn extract_profile(query: &str) -> UserProfile {
    let query = query.to_lowercase();

    UserProfile {
        profession: lookup(&query, PROFESSIONS),
        destination: lookup(&query, DESTINATIONS),
        origin: lookup(&query, ORIGINS),
        budget: parse_budget(&query),
    }
}

fn lookup(query: &str, table: &[(&str, &str)]) -> String {
    table
        .iter()
        .find(|(key, _)| query.contains(key))
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

/// Dollar amount following the first `$`, with commas ignored, any
/// fractional part dropped and a `k` suffix meaning thousands
fn parse_budget(query: &str) -> u64 {
    let Some(captures) = BUDGET_PATTERN.captures(query) else {
        return 0;
    };

    let amount = captures.get(1).map_or("", |m| m.as_str());
    let whole = amount.split('.').next().unwrap_or_default();
    let value = whole
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit))
        });

    let thousands = captures.get(2).is_some_and(|m| !m.as_str().is_empty());
    if thousands {
        value.saturating_mul(1000)
    } else {
        value
    }
}
