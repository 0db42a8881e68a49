//! Per-request variables shared between pipeline stages
//!
//! Middleware writes named values into the request extensions so later
//! stages (handlers, rewrites) can read them without knowing who set them.

use std::collections::HashMap;

/// Named string variables attached to a single request
#[derive(Debug, Clone, Default)]
pub struct RequestVars(HashMap<String, String>);

impl RequestVars {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut vars = RequestVars::default();
        assert!(vars.is_empty());

        vars.set("detected-locale", "fr");
        vars.set("detected-locale", "de");
        vars.set("other", "x");

        assert_eq!(vars.get("detected-locale"), Some("de"));
        assert_eq!(vars.get("missing"), None);
        assert_eq!(vars.len(), 2);
    }
}
