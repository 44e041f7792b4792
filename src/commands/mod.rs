//! CLI subcommands. Thin argument marshalling around the backend client;
//! the interesting control flow lives in the gate (`crate::guard`).

pub mod apispec;
pub mod kube;
pub mod login;

use anyhow::{Result, anyhow};
use std::collections::BTreeMap;

/// Parse repeated `key=value` flags into a map. Later occurrences of a key
/// override earlier ones.
pub fn parse_tag_pairs(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut tags = BTreeMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid tag {pair:?}, expected key=value"))?;
        if key.is_empty() {
            return Err(anyhow!("invalid tag {pair:?}, empty key"));
        }
        tags.insert(key.to_string(), value.to_string());
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_pairs() {
        let tags = parse_tag_pairs(&["a=1".to_string(), "b=two".to_string()]).unwrap();
        assert_eq!(tags.get("a").map(String::as_str), Some("1"));
        assert_eq!(tags.get("b").map(String::as_str), Some("two"));
    }

    #[test]
    fn test_parse_tag_pairs_rejects_malformed() {
        assert!(parse_tag_pairs(&["no-equals".to_string()]).is_err());
        assert!(parse_tag_pairs(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_parse_tag_pairs_last_wins() {
        let tags = parse_tag_pairs(&["k=1".to_string(), "k=2".to_string()]).unwrap();
        assert_eq!(tags.get("k").map(String::as_str), Some("2"));
    }
}
