//! Locale negotiation core
//!
//! Pure, allocation-light functions with no I/O: tag parsing, preference
//! parsing and best-fit matching. The HTTP glue lives in
//! [`crate::middleware::locale`].

pub mod matcher;
pub mod preference;
pub mod tag;

pub use matcher::{MatchKind, best_match, match_locale};
pub use preference::{parse_accept_language, parse_cookie_value, parse_preference_list};
pub use tag::LocaleTag;
