//! Client preference parsing
//!
//! Turns an `Accept-Language` value into tags ordered by weight, and a cookie
//! value into at most one tag.

use super::tag::LocaleTag;

/// Parse a weighted list such as `fr-FR,fr;q=0.9,en;q=0.7` into tags ordered by
/// descending weight. Equal weights keep header order.
///
/// Malformed entries are skipped: unparseable tags, the `*` wildcard, and
/// weights that are not numbers within `[0, 1]`. Entries weighted `q=0` are
/// dropped as "not acceptable".
pub fn parse_accept_language(raw: &str) -> Vec<LocaleTag> {
    parse_preference_list(raw).into_iter().map(|(tag, _)| tag).collect()
}

/// Weighted form of [`parse_accept_language`]
pub fn parse_preference_list(raw: &str) -> Vec<(LocaleTag, f32)> {
    let mut preferences: Vec<(LocaleTag, f32)> =
        raw.split(',').filter_map(parse_entry).filter(|(_, weight)| *weight > 0.0).collect();

    // sort_by is stable, ties keep header order
    preferences.sort_by(|a, b| b.1.total_cmp(&a.1));
    preferences
}

/// Parse a cookie value holding a single locale tag
pub fn parse_cookie_value(raw: &str) -> Option<LocaleTag> {
    LocaleTag::try_parse(raw)
}

fn parse_entry(entry: &str) -> Option<(LocaleTag, f32)> {
    let mut parts = entry.split(';');
    let tag = LocaleTag::try_parse(parts.next()?)?;

    let mut weight = 1.0;
    for param in parts {
        // stray `;`
        if param.trim().is_empty() {
            continue;
        }
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("q") {
            weight = parse_weight(value.trim())?;
        }
    }

    Some((tag, weight))
}

fn parse_weight(value: &str) -> Option<f32> {
    let weight: f32 = value.parse().ok()?;
    if weight.is_finite() && (0.0..=1.0).contains(&weight) { Some(weight) } else { None }
}
