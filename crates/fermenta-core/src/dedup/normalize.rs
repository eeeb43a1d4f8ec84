use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::DedupConfig;

static PARENTHESIZED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid parenthesized segment regex"));

static DEFAULT_NORMALIZER: Lazy<NameNormalizer> = Lazy::new(NameNormalizer::default);

/// Computes the grouping key for a brewery name.
///
/// The key is lower-cased, has parenthesized segments ("(AB InBev)")
/// removed, loses one leading generic word ("birrificio", "birra", ...)
/// and one trailing legal form ("srl", "s.p.a.", ...), and has its
/// whitespace collapsed. Stripping never empties the key: a brewery named
/// just "Birrificio" keys as `birrificio`.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    prefixes: Vec<String>,
    legal_suffixes: Vec<String>,
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::from_config(&DedupConfig::default())
    }
}

impl NameNormalizer {
    pub fn from_config(config: &DedupConfig) -> Self {
        Self {
            prefixes: config.prefixes.iter().map(|p| p.trim().to_lowercase()).collect(),
            legal_suffixes: config
                .legal_suffixes
                .iter()
                .map(|s| suffix_token(&s.to_lowercase()).to_string())
                .collect(),
        }
    }

    pub fn normalize(&self, name: &str) -> String {
        let lowercase = name.to_lowercase();
        let without_parens = PARENTHESIZED_RE.replace_all(&lowercase, " ");

        let mut tokens: Vec<&str> = without_parens.split_whitespace().collect();
        if tokens.is_empty() {
            tokens = lowercase.split_whitespace().collect();
        }

        if tokens.len() > 1 && self.prefixes.iter().any(|p| p == tokens[0]) {
            tokens.remove(0);
        }

        let has_legal_suffix = tokens.len() > 1
            && tokens
                .last()
                .is_some_and(|last| self.legal_suffixes.iter().any(|s| s == suffix_token(last)));
        if has_legal_suffix {
            tokens.pop();
        }

        let key = tokens.join(" ");
        key.trim_end_matches(',').trim().to_string()
    }
}

/// Normalizes with the built-in prefix and legal-form lists.
pub fn normalize_brewery_name(name: &str) -> String {
    DEFAULT_NORMALIZER.normalize(name)
}

// "S.r.l." and "srl," compare equal once punctuation is dropped from the ends.
fn suffix_token(token: &str) -> &str {
    token.trim_matches(|c: char| c == '.' || c == ',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_leading_generic_word() {
        assert_eq!(normalize_brewery_name("Birrificio Lambrate"), "lambrate");
        assert_eq!(normalize_brewery_name("Birra del Borgo"), "del borgo");
        assert_eq!(normalize_brewery_name("Brewery Hammer"), "hammer");
        assert_eq!(normalize_brewery_name("BREWING Crak"), "crak");
    }

    #[test]
    fn test_prefix_must_be_whole_word() {
        assert_eq!(normalize_brewery_name("Birrone"), "birrone");
        assert_eq!(normalize_brewery_name("Birra-Moretti"), "birra-moretti");
    }

    #[test]
    fn test_only_one_prefix_is_stripped() {
        assert_eq!(normalize_brewery_name("Birrificio Birra Bellazzi"), "birra bellazzi");
    }

    #[test]
    fn test_strips_parenthesized_segments() {
        assert_eq!(normalize_brewery_name("Lambrate (AB InBev)"), "lambrate");
        assert_eq!(normalize_brewery_name("Lambrate"), "lambrate");
        assert_eq!(normalize_brewery_name("Toccalmatto (Fidenza) Srl"), "toccalmatto");
    }

    #[test]
    fn test_strips_trailing_legal_form() {
        assert_eq!(normalize_brewery_name("Baladin Srl"), "baladin");
        assert_eq!(normalize_brewery_name("Baladin S.r.l."), "baladin");
        assert_eq!(normalize_brewery_name("Baladin, srl"), "baladin");
        assert_eq!(normalize_brewery_name("Menabrea S.p.A."), "menabrea");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize_brewery_name("  Birra   del\tBorgo  "), "del borgo");
    }

    #[test]
    fn test_never_strips_to_empty() {
        assert_eq!(normalize_brewery_name("Birrificio"), "birrificio");
        assert_eq!(normalize_brewery_name("Srl"), "srl");
        assert_eq!(normalize_brewery_name("(Lambrate)"), "(lambrate)");
        assert_eq!(normalize_brewery_name(""), "");
    }

    #[test]
    fn test_custom_config() {
        let config = DedupConfig {
            prefixes: vec!["microbirrificio".to_string()],
            legal_suffixes: vec!["S.S.".to_string()],
        };
        let normalizer = NameNormalizer::from_config(&config);
        assert_eq!(normalizer.normalize("Microbirrificio Rurale s.s."), "rurale");
        assert_eq!(normalizer.normalize("Birrificio Rurale"), "birrificio rurale");
    }
}
