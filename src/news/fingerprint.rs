use std::collections::BTreeSet;

use derive_more::Display;

const SECTION_DELIMITER: char = '|';
const VALUE_DELIMITER: char = ',';
const ESCAPE: char = '\\';

/// Cache key derived from a preference set: `<languages>|<categories>`,
/// each side sorted and de-duplicated. Delimiters and backslashes inside a
/// value are backslash-escaped, so distinct preference sets never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub(crate) fn from_canonical(categories: &[String], languages: &[String]) -> Self {
        Self(format!(
            "{}{}{}",
            join_escaped(languages),
            SECTION_DELIMITER,
            join_escaped(categories)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Both collections are expected to be non-empty; callers short-circuit on
/// unconfigured preferences instead of fingerprinting them.
pub fn fingerprint<S: AsRef<str>>(categories: &[S], languages: &[S]) -> Fingerprint {
    Fingerprint::from_canonical(&canonicalize(categories), &canonicalize(languages))
}

fn join_escaped(values: &[String]) -> String {
    let mut joined = String::new();

    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            joined.push(VALUE_DELIMITER);
        }
        for c in value.chars() {
            if matches!(c, SECTION_DELIMITER | VALUE_DELIMITER | ESCAPE) {
                joined.push(ESCAPE);
            }
            joined.push(c);
        }
    }

    joined
}

pub(crate) fn canonicalize<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.as_ref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_does_not_matter() {
        let a = fingerprint(&["sports", "tech"], &["fr", "en"]);
        let b = fingerprint(&["tech", "sports"], &["en", "fr"]);

        assert_eq!(a, b);
        assert_eq!(a.as_str(), "en,fr|sports,tech");
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(
            fingerprint(&["tech", "tech"], &["en"]),
            fingerprint(&["tech"], &["en", "en"])
        );
    }

    #[test]
    fn test_languages_and_categories_do_not_alias() {
        // Same values on opposite sides must not share a key.
        assert_ne!(
            fingerprint(&["en"], &["tech"]),
            fingerprint(&["tech"], &["en"])
        );
    }

    #[test]
    fn test_delimiters_inside_values_do_not_alias() {
        let a = fingerprint(&["x|y"], &["en"]);
        let b = fingerprint(&["y"], &["en|x"]);

        assert_ne!(a, b);
        assert_eq!(a.as_str(), r"en|x\|y");
        assert_eq!(b.as_str(), r"en\|x|y");

        assert_ne!(fingerprint(&["a,b"], &["en"]), fingerprint(&["a", "b"], &["en"]));
        assert_ne!(fingerprint(&[r"a\"], &["en"]), fingerprint(&["a"], &[r"en\"]));
    }

    #[test]
    fn test_single_values() {
        assert_eq!(fingerprint(&["tech"], &["en"]).to_string(), "en|tech");
    }
}
