//! Page location and query-string access

use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

use crate::error::{Error, Result};

/// Base used to resolve relative page addresses during validation.
const RESOLVE_BASE: &str = "http://localhost/";

/// Address of the report page, including its query string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    href: String,
}

impl Location {
    /// Wrap an address without validating it.
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }

    /// Parse an address, rejecting anything that cannot be resolved as a URL.
    ///
    /// Relative addresses (`report.html?filter=x`) are accepted.
    pub fn parse(href: &str) -> Result<Self> {
        let base = Url::parse(RESOLVE_BASE).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Url::options()
            .base_url(Some(&base))
            .parse(href)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", href, e)))?;
        Ok(Self::new(href))
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    /// The query string including its leading `?`, or an empty string.
    pub fn search(&self) -> &str {
        let without_fragment = self.href.split('#').next().unwrap_or_default();
        match without_fragment.find('?') {
            Some(index) => &without_fragment[index..],
            None => "",
        }
    }

    /// The address with its query string removed.
    pub fn without_query(&self) -> String {
        let search = self.search();
        if search.is_empty() {
            self.href.clone()
        } else {
            self.href.replacen(search, "", 1)
        }
    }

    /// First value of a query parameter, form-decoded (`+` becomes a space).
    pub fn param(&self, key: &str) -> Option<String> {
        let query = self.search().trim_start_matches('?');
        form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.into_owned())
    }

    /// A copy of this location whose query holds `key=value`, replacing any
    /// previous value for `key` and keeping the other parameters in order.
    pub fn with_param(&self, key: &str, value: &str) -> Self {
        let query = self.search().trim_start_matches('?');
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        let mut replaced = false;
        for (name, existing) in form_urlencoded::parse(query.as_bytes()) {
            if name == key {
                if !replaced {
                    serializer.append_pair(key, value);
                    replaced = true;
                }
            } else {
                serializer.append_pair(&name, &existing);
            }
        }
        if !replaced {
            serializer.append_pair(key, value);
        }

        Self::new(format!("{}?{}", self.without_query(), serializer.finish()))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.href)
    }
}
