//! Template version strings.
//!
//! Templates write versions like `"Winlink Check In  5.0.12"` or
//! `"ICS 309 v. 7.1.3"`; the number is one whitespace-separated token.

use std::cmp::Ordering;

use serde::Serialize;

/// Which token of a version string holds the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionToken {
    Last,
    Index(usize),
}

/// Pick one token out of a version string. Runs of whitespace count as one
/// separator. Returns `""` when the token does not exist.
pub fn normalize_version(raw: &str, token: VersionToken) -> String {
    let mut tokens = raw.split_whitespace();
    let picked = match token {
        VersionToken::Last => tokens.last(),
        VersionToken::Index(i) => tokens.nth(i),
    };
    picked.unwrap_or_default().to_string()
}

/// A dotted numeric version for threshold comparisons.
///
/// Non-numeric components end the version (`"7.1b"` → `7.1`).
#[derive(Debug, Clone, Serialize)]
pub struct FormVersion(Vec<u32>);

impl FormVersion {
    pub fn new(parts: &[u32]) -> Self {
        Self(parts.to_vec())
    }

    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().trim_start_matches(['v', 'V']).trim_start_matches('.');
        let mut parts = Vec::new();
        for component in text.split('.') {
            let digits: String = component.chars().take_while(char::is_ascii_digit).collect();
            match digits.parse::<u32>() {
                Ok(n) => parts.push(n),
                Err(_) => break,
            }
            if digits.len() != component.len() {
                break;
            }
        }
        (!parts.is_empty()).then_some(Self(parts))
    }
}

impl PartialEq for FormVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FormVersion {}

impl PartialOrd for FormVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FormVersion {
    /// Missing trailing components compare as zero, so `7.1 == 7.1.0`.
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| {
                let a = self.0.get(i).copied().unwrap_or(0);
                let b = other.0.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}
