//! URL-safe identifiers derived from display names.
//!
//! Encoding rules:
//! - letters are lowercased; accented Latin and Nordic letters are folded to ASCII
//! - every run of other characters becomes a single `-`
//! - leading and trailing `-` are dropped
//!
//! There is no decoder. Lookups re-encode candidate names and compare.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slug(String);

impl Slug {
    /// Derives the slug for a display name.
    pub fn encode(name: &str) -> Self {
        let mut out = String::with_capacity(name.len());
        let mut pending_dash = false;

        for ch in name.chars().flat_map(char::to_lowercase) {
            let folded = fold_char(ch);
            if folded.is_empty() {
                pending_dash = true;
                continue;
            }
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push_str(folded);
        }

        Slug(out)
    }

    /// Wraps a slug taken from a route segment as-is.
    pub fn from_segment(raw: impl Into<String>) -> Self {
        Slug(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Maps one lowercase char to its ASCII spelling; empty means separator.
fn fold_char(ch: char) -> &'static str {
    const ASCII: [&str; 36] = [
        "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "a", "b", "c", "d", "e", "f", "g", "h",
        "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z",
    ];
    match ch {
        '0'..='9' => ASCII[(ch as u8 - b'0') as usize],
        'a'..='z' => ASCII[10 + (ch as u8 - b'a') as usize],
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ð' | 'ď' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' => "s",
        'ß' => "ss",
        'ť' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::Slug;
    use pretty_assertions::assert_eq;

    #[test]
    fn lowercases_and_joins_words() {
        assert_eq!(Slug::encode("North Sea").as_str(), "north-sea");
        assert_eq!(Slug::encode("Ekofisk").as_str(), "ekofisk");
        assert_eq!(Slug::encode("Johan Sverdrup").as_str(), "johan-sverdrup");
    }

    #[test]
    fn folds_nordic_letters() {
        assert_eq!(Slug::encode("Snøhvit").as_str(), "snohvit");
        assert_eq!(Slug::encode("Åsgard").as_str(), "asgard");
        assert_eq!(Slug::encode("Ærfugl Nord").as_str(), "aerfugl-nord");
    }

    #[test]
    fn collapses_separator_runs_and_trims() {
        assert_eq!(Slug::encode("  Volve 15/9-F  ").as_str(), "volve-15-9-f");
        assert_eq!(Slug::encode("--A--B--").as_str(), "a-b");
        assert_eq!(Slug::encode("!!!").as_str(), "");
    }

    #[test]
    fn encoding_is_stable() {
        let a = Slug::encode("Tor II");
        let b = Slug::encode("Tor II");
        assert_eq!(a, b);
        assert_eq!(Slug::encode(a.as_str()), a);
    }

    #[test]
    fn segments_are_not_normalized() {
        let raw = Slug::from_segment("Troll");
        assert_ne!(raw, Slug::encode("Troll"));
    }
}
