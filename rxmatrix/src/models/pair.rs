use serde::{Deserialize, Serialize};

const SEPARATOR: char = '|';

/// Canonical identifier of an unordered pair of item ids.
///
/// The two ids are sorted before joining, so `PairKey::new(a, b)` and
/// `PairKey::new(b, a)` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{first}{SEPARATOR}{second}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn involves(&self, id: &str) -> bool {
        self.members()
            .map(|(a, b)| a == id || b == id)
            .unwrap_or(false)
    }

    fn members(&self) -> Option<(&str, &str)> {
        self.0.split_once(SEPARATOR)
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_symmetric() {
        let ids = ["w", "a", "rxcui:11289", "rxcui:1191", "", "Z"];
        for a in ids {
            for b in ids {
                assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
            }
        }
    }

    #[test]
    fn test_pair_key_format() {
        assert_eq!(PairKey::new("w", "a").as_str(), "a|w");
    }

    #[test]
    fn test_involves() {
        let key = PairKey::new("w", "a");
        assert!(key.involves("w"));
        assert!(key.involves("a"));
        assert!(!key.involves("g"));
    }
}
