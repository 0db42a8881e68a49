pub mod locale;

pub use locale::{LocaleResponse, detected_locale, get_locale, health, not_found};
