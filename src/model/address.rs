//! Email address parsing (RFC 5322 §3.4) and Winlink call-sign extraction.

/// A parsed email address.
///
/// # Examples
/// - `"Pat Smith <km6so@winlink.org>"` → `display_name = "Pat Smith"`, `address = "km6so@winlink.org"`
/// - `"KM6SO@winlink.org"` → `display_name = ""`, `address = "KM6SO@winlink.org"`
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct EmailAddress {
    /// Human-readable display name (may be empty).
    pub display_name: String,
    /// The bare email address (`user@domain`), or a bare call sign for radio-only peers.
    pub address: String,
}

impl EmailAddress {
    /// Parse a single email address from a header value.
    ///
    /// Supported formats:
    /// - `"user@domain.com"`
    /// - `"<user@domain.com>"`
    /// - `"Display Name <user@domain.com>"`
    /// - `"\"Display, Name\" <user@domain.com>"`
    /// - `"SMTP:user@domain.com"` (Winlink gateway prefix)
    ///
    /// If parsing fails, the raw string is stored as `address`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self {
                display_name: String::new(),
                address: String::new(),
            };
        }

        if let Some(angle_start) = trimmed.rfind('<') {
            if let Some(angle_end) = trimmed.rfind('>') {
                if angle_end > angle_start {
                    let addr = strip_gateway_prefix(trimmed[angle_start + 1..angle_end].trim());
                    let display_name = strip_quotes(&trimmed[..angle_start]);
                    return Self {
                        display_name,
                        address: addr,
                    };
                }
            }
        }

        Self {
            display_name: String::new(),
            address: strip_gateway_prefix(trimmed),
        }
    }

    /// Parse a comma- or semicolon-separated list of addresses.
    ///
    /// Handles quoted commas: `"Last, First" <a@b.com>, other@c.com`
    pub fn parse_list(raw: &str) -> Vec<Self> {
        let mut results = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut in_angle = false;

        for ch in raw.chars() {
            match ch {
                '"' => {
                    in_quotes = !in_quotes;
                    current.push(ch);
                }
                '<' if !in_quotes => {
                    in_angle = true;
                    current.push(ch);
                }
                '>' if !in_quotes => {
                    in_angle = false;
                    current.push(ch);
                }
                ',' | ';' if !in_quotes && !in_angle => {
                    let addr = Self::parse(&current);
                    if !addr.address.is_empty() {
                        results.push(addr);
                    }
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        let addr = Self::parse(&current);
        if !addr.address.is_empty() {
            results.push(addr);
        }

        results
    }

    /// The sender's call sign: the local part of the address, upper-cased.
    ///
    /// Tactical addresses keep their SSID (`W1AW-10`), internet addresses
    /// keep their full local part (`jdoe` for `jdoe@example.com`).
    pub fn callsign(&self) -> String {
        let local = match self.address.split_once('@') {
            Some((local, _)) => local,
            None => self.address.as_str(),
        };
        local.trim().to_uppercase()
    }

    /// Whether the address belongs to the Winlink system domain.
    pub fn is_winlink(&self) -> bool {
        self.address
            .rsplit_once('@')
            .map(|(_, domain)| domain.eq_ignore_ascii_case("winlink.org"))
            .unwrap_or(true)
    }
}

/// Strip surrounding double-quotes and trim whitespace.
fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Winlink gateways prefix internet recipients with `SMTP:`.
fn strip_gateway_prefix(s: &str) -> String {
    match s.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("smtp:") => s[5..].trim().to_string(),
        _ => s.to_string(),
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.display_name.is_empty() {
            write!(f, "{}", self.address)
        } else {
            write!(f, "{} <{}>", self.display_name, self.address)
        }
    }
}
