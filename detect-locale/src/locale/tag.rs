//! Locale tag representation
//!
//! A tag is a base language plus an optional region. Parsing never fails:
//! anything we cannot make sense of becomes the unknown tag (`und`).

use std::fmt;

/// Language code used for the unknown tag
pub const UNKNOWN_LANGUAGE: &str = "und";

/// ISO pseudo-region meaning "no region"
const NO_REGION: &str = "ZZ";

/// Canonical locale identifier: lowercase language, optional uppercase region
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleTag {
    language: String,
    region: Option<String>,
}

impl LocaleTag {
    /// The "unknown" tag (`und`)
    pub fn unknown() -> Self {
        Self { language: UNKNOWN_LANGUAGE.to_string(), region: None }
    }

    /// Parse a raw locale string such as `en`, `en-US` or `en_us`.
    ///
    /// Accepts `-` and `_` as subtag separators. A four-letter script subtag is
    /// skipped, variants and extensions after the region are ignored. Returns
    /// [`LocaleTag::unknown`] for empty or malformed input.
    pub fn parse(raw: &str) -> Self {
        Self::try_parse(raw).unwrap_or_else(Self::unknown)
    }

    /// Like [`LocaleTag::parse`] but reports unparseable input as `None`.
    ///
    /// The unknown tag itself (`und`, `*`) is reported as `None` as well,
    /// since it never identifies a usable locale.
    pub fn try_parse(raw: &str) -> Option<Self> {
        let mut subtags = raw.trim().split(['-', '_']);

        let language = subtags.next()?;
        if !(2..=8).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return None;
        }
        let language = language.to_ascii_lowercase();
        if language == UNKNOWN_LANGUAGE {
            return None;
        }

        let mut next = subtags.next();

        // script (e.g. `Hant`)
        if let Some(script) = next
            && script.len() == 4
            && script.chars().all(|c| c.is_ascii_alphabetic())
        {
            next = subtags.next();
        }

        let region = match next {
            Some(region) if is_region(region) => {
                let region = region.to_ascii_uppercase();
                if region == NO_REGION { None } else { Some(region) }
            },
            Some("") => return None,
            _ => None,
        };

        Some(Self { language, region })
    }

    /// Build a tag from already separated parts, canonicalizing case
    pub fn new(language: &str, region: Option<&str>) -> Self {
        Self::parse(&match region {
            Some(region) => format!("{}-{}", language, region),
            None => language.to_string(),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn is_unknown(&self) -> bool {
        self.language == UNKNOWN_LANGUAGE
    }

    /// `language` or `language-REGION`
    pub fn to_canonical_string(&self) -> String {
        self.to_string()
    }
}

impl Default for LocaleTag {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{}", self.language, region),
            None => f.write_str(&self.language),
        }
    }
}

fn is_region(subtag: &str) -> bool {
    (subtag.len() == 2 && subtag.chars().all(|c| c.is_ascii_alphabetic()))
        || (subtag.len() == 3 && subtag.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_only() {
        let tag = LocaleTag::parse("en");
        assert_eq!(tag.language(), "en");
        assert_eq!(tag.region(), None);
        assert_eq!(tag.to_string(), "en");
    }

    #[test]
    fn test_parse_normalizes_case_and_separator() {
        assert_eq!(LocaleTag::parse("en-US").to_string(), "en-US");
        assert_eq!(LocaleTag::parse("en_us").to_string(), "en-US");
        assert_eq!(LocaleTag::parse("EN-us").to_string(), "en-US");
        assert_eq!(LocaleTag::parse("  Fr_ca ").to_string(), "fr-CA");
    }

    #[test]
    fn test_parse_skips_script_and_variants() {
        assert_eq!(LocaleTag::parse("zh-Hant-TW").to_string(), "zh-TW");
        assert_eq!(LocaleTag::parse("zh-Hans").to_string(), "zh");
        assert_eq!(LocaleTag::parse("de-DE-1996").to_string(), "de-DE");
        assert_eq!(LocaleTag::parse("es-419").to_string(), "es-419");
    }

    #[test]
    fn test_no_region_sentinel_renders_bare() {
        let tag = LocaleTag::parse("en-ZZ");
        assert_eq!(tag.region(), None);
        assert_eq!(tag.to_canonical_string(), "en");
    }

    #[test]
    fn test_parse_fails_soft() {
        for raw in ["", "   ", "*", "und", "e", "fr@x", "12", "en-", "-US", "fr;q=1"] {
            assert!(LocaleTag::parse(raw).is_unknown(), "{:?} should be unknown", raw);
            assert_eq!(LocaleTag::try_parse(raw), None, "{:?} should not parse", raw);
        }
    }

    #[test]
    fn test_new_canonicalizes() {
        assert_eq!(LocaleTag::new("EN", Some("gb")), LocaleTag::parse("en-GB"));
        assert_eq!(LocaleTag::new("de", None).to_string(), "de");
    }

    #[test]
    fn test_unknown_tag() {
        let tag = LocaleTag::default();
        assert!(tag.is_unknown());
        assert_eq!(tag.to_string(), "und");
    }
}
