pub mod error;

pub use error::{ApiError, ApiResult, ConfigError, localize_response};
