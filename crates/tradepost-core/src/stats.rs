//! # Supplier Statistics Heuristics
//!
//! The directory header shows how many countries suppliers come from.
//! There is no country column; the last comma-separated part of each
//! address is taken as the country. This is an approximation: "Pune" and
//! "India" both count as countries when addresses are inconsistent.

use std::collections::HashSet;

/// Last comma-separated token of an address, trimmed, if non-empty.
///
/// ## Example
/// ```rust
/// use tradepost_core::stats::country_token;
///
/// assert_eq!(country_token("12 Ring Rd, Delhi, India"), Some("India"));
/// assert_eq!(country_token("Delhi,  "), None);
/// ```
pub fn country_token(address: &str) -> Option<&str> {
    let last = address.rsplit(',').next()?.trim();
    if last.is_empty() {
        None
    } else {
        Some(last)
    }
}

/// Counts distinct country tokens across addresses.
///
/// Tokens are compared exactly (case-sensitive), as stored.
pub fn estimate_country_count<'a, I>(addresses: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    addresses
        .into_iter()
        .filter_map(country_token)
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_distinct_last_tokens() {
        let addresses = [
            "Plot 4, Pune, India",
            "Sector 5, Noida, India",
            "Shenzhen, China",
            "Single Token Address",
            "Trailing comma,",
            "",
        ];
        // India, China, "Single Token Address"
        assert_eq!(estimate_country_count(addresses), 3);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(estimate_country_count(Vec::<&str>::new()), 0);
    }
}
