//! Request and response values passed between the interceptor, policies,
//! the network and the cache.

use crate::error::{OffcacheError, OffcacheResult};
use std::fmt;
use url::Url;

/// HTTP request method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Other(String),
}

impl Method {
    /// Parse a method name (case-insensitive for the well-known methods)
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            _ => Self::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How intermediate HTTP caches should be treated when fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Normal fetch; intermediate caches may answer
    #[default]
    Default,
    /// Bypass intermediate caches and revalidate with the origin
    Reload,
}

/// An intercepted or generated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
    cache_mode: CacheMode,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            cache_mode: CacheMode::Default,
        }
    }

    /// Build a GET request from an absolute URL string
    pub fn get(url: &str) -> OffcacheResult<Self> {
        Ok(Self::new(Method::Get, parse_url(url)?))
    }

    /// Build a request from a method name and absolute URL string
    pub fn parse(method: &str, url: &str) -> OffcacheResult<Self> {
        Ok(Self::new(Method::parse(method), parse_url(url)?))
    }

    /// Return a copy with a different cache mode
    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.cache_mode
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::Get
    }

    /// Key under which this request is stored in a cache.
    ///
    /// Fragments never reach the server, so they are not part of the key.
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.into()
    }
}

fn parse_url(url: &str) -> OffcacheResult<Url> {
    Url::parse(url).map_err(|e| OffcacheError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// A response from the network, the cache, or the fallback renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Add a header, keeping any existing values
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// 2xx status
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Status the resolution policies accept as a network answer.
    ///
    /// Anything below 500 counts, including redirects and client errors.
    /// The same threshold gates prefer-network write-back. Precache and
    /// refresh only store `ok()` responses.
    pub fn is_acceptable(&self) -> bool {
        self.status < 500
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
