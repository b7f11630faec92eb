//! Completion extraction: the address token that marks a successful run.

use regex::Regex;
use std::sync::OnceLock;

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // The trailing group rejects longer hex runs such as 32-byte hashes.
        Regex::new(r"0x([0-9a-fA-F]{40})(?:[^0-9a-fA-F]|$)").expect("static address regex")
    })
}

/// Return the first `0x`-prefixed 40-hex-digit address in `text`.
pub fn find_address(text: &str) -> Option<&str> {
    let captures = address_pattern().captures(text)?;
    let digits = captures.get(1)?;
    // Include the `0x` prefix that precedes the captured digits.
    Some(&text[digits.start() - 2..digits.end()])
}

/// Like [`find_address`], but ignores a match that runs into the end of
/// `text`: while output is still streaming, the next chunk may extend it.
pub fn find_delimited_address(text: &str) -> Option<&str> {
    let captures = address_pattern().captures(text)?;
    let whole = captures.get(0)?;
    let digits = captures.get(1)?;
    if whole.end() == digits.end() {
        return None;
    }
    Some(&text[digits.start() - 2..digits.end()])
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    #[test]
    fn finds_address_inside_cli_output() {
        let text = format!("Deploying...\n✔ Contract deployed at {ADDR}\n");
        assert_eq!(find_address(&text), Some(ADDR));
    }

    #[test]
    fn first_match_wins() {
        let other = "0x1111111111111111111111111111111111111111";
        let text = format!("{ADDR} then {other}");
        assert_eq!(find_address(&text), Some(ADDR));
    }

    #[test]
    fn address_at_end_of_text_matches() {
        assert_eq!(find_address(ADDR), Some(ADDR));
    }

    #[test]
    fn short_or_missing_tokens_do_not_match() {
        assert_eq!(find_address("exit 0, all done"), None);
        assert_eq!(find_address("0x1234abcd"), None);
        assert_eq!(find_address("5FbDB2315678afecb367f032d93F642f64180aa3"), None);
    }

    #[test]
    fn delimited_lookup_waits_for_a_terminator() {
        assert_eq!(find_delimited_address(ADDR), None);
        assert_eq!(find_delimited_address(&format!("{ADDR}\n")), Some(ADDR));
        let hash_prefix = format!("0x{}", "ab".repeat(20));
        assert_eq!(find_delimited_address(&hash_prefix), None);
    }

    #[test]
    fn transaction_hashes_are_not_addresses() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(find_address(&format!("tx {hash}")), None);
    }
}
