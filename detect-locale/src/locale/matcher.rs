//! Best-fit locale matching
//!
//! Every (requested, available) pair gets a score. The client's preference
//! rank is the primary key, match specificity the secondary key, and the
//! configured order of available locales breaks the remaining ties.

use std::cmp::Reverse;

use super::tag::LocaleTag;

/// How closely an available tag satisfies a requested one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    /// Same language, regions differ or one side has none
    Language,
    /// Same language and same region (or both without region)
    Exact,
}

impl MatchKind {
    /// Compare two tags; `None` when the languages differ
    pub fn of(requested: &LocaleTag, available: &LocaleTag) -> Option<Self> {
        if requested.is_unknown() || available.is_unknown() {
            return None;
        }
        if !requested.language().eq_ignore_ascii_case(available.language()) {
            return None;
        }

        let same_region = match (requested.region(), available.region()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };

        Some(if same_region { Self::Exact } else { Self::Language })
    }
}

/// Pick the available locale that best serves the requested ones.
///
/// Falls back to `available[0]` when nothing matches or nothing was requested,
/// and to the unknown tag when `available` is empty. The returned tag is always
/// taken from `available`, so a language-only match carries the available
/// entry's region (or lack of one).
pub fn match_locale(available: &[LocaleTag], requested: &[LocaleTag]) -> LocaleTag {
    best_match(available, requested)
        .or_else(|| available.first())
        .cloned()
        .unwrap_or_else(LocaleTag::unknown)
}

/// The best matching available tag, if any pair matches at all
pub fn best_match<'a>(available: &'a [LocaleTag], requested: &[LocaleTag]) -> Option<&'a LocaleTag> {
    requested
        .iter()
        .enumerate()
        .flat_map(move |(rank, wanted)| {
            available.iter().enumerate().filter_map(move |(position, candidate)| {
                MatchKind::of(wanted, candidate)
                    .map(|kind| ((Reverse(rank), kind, Reverse(position)), candidate))
            })
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, candidate)| candidate)
}
