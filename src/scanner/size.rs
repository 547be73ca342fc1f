//! Lenient size-string parsing for partial-read configuration.
//!
//! Unlike the strict `--io-threads`-style CLI parsers, this parser never
//! fails: any string it cannot understand becomes `0`. A zero size turns a
//! partial-read policy into a no-op rather than aborting the run.

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;

/// Parse a human-readable size string into bytes.
///
/// Recognizes the suffixes `kb` (x1024) and `mb` (x1024x1024), case-insensitive.
/// A bare digit string is returned as-is. Everything else yields `0`.
///
/// # Examples
///
/// ```
/// use dupfind::scanner::parse_size;
///
/// assert_eq!(parse_size("4kb"), 4096);
/// assert_eq!(parse_size("2MB"), 2_097_152);
/// assert_eq!(parse_size("100"), 100);
/// assert_eq!(parse_size(""), 0);
/// assert_eq!(parse_size("xyz"), 0);
/// ```
#[must_use]
pub fn parse_size(s: &str) -> u64 {
    let s = s.trim().to_ascii_lowercase();

    if let Some(num) = s.strip_suffix("kb") {
        scaled(num, KIB)
    } else if let Some(num) = s.strip_suffix("mb") {
        scaled(num, MIB)
    } else {
        digits(&s).unwrap_or(0)
    }
}

fn scaled(num: &str, multiplier: u64) -> u64 {
    digits(num)
        .and_then(|n| n.checked_mul(multiplier))
        .unwrap_or(0)
}

fn digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
