//! Browser match patterns (`<scheme>://<host><path>`).
//!
//! - Scheme `*` matches `http` and `https` only
//! - Host `*` matches any host; `*.neo` matches `neo` and every subdomain
//! - Path is a glob where `*` matches any run of characters, and is checked
//!   against the path plus query string
//! - Host matching is case-insensitive, path matching is not

use thiserror::Error;
use url::Url;

/// Errors from parsing a match pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("Missing scheme separator in '{0}'")]
    MissingScheme(String),

    #[error("Missing path in '{0}'")]
    MissingPath(String),

    #[error("Invalid host '{0}'")]
    InvalidHost(String),

    #[error("Unsupported scheme '{0}'")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SchemePattern {
    Web,
    Exact(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HostPattern {
    Any,
    /// Matches the domain itself and any subdomain.
    Domain(String),
    Exact(String),
}

/// A parsed match pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern {
    scheme: SchemePattern,
    host: HostPattern,
    path: String,
}

impl UrlPattern {
    /// Parse a pattern such as `*://*.neo/`.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let (scheme, rest) = pattern
            .split_once("://")
            .ok_or_else(|| PatternError::MissingScheme(pattern.to_string()))?;

        let scheme = match scheme {
            "*" => SchemePattern::Web,
            "http" | "https" | "ws" | "wss" => SchemePattern::Exact(scheme.to_string()),
            other => return Err(PatternError::UnsupportedScheme(other.to_string())),
        };

        let slash = rest
            .find('/')
            .ok_or_else(|| PatternError::MissingPath(pattern.to_string()))?;
        let (host, path) = rest.split_at(slash);

        let host = match host {
            "" => return Err(PatternError::InvalidHost(host.to_string())),
            "*" => HostPattern::Any,
            _ => match host.strip_prefix("*.") {
                Some(domain) if !domain.is_empty() && !domain.contains('*') => {
                    HostPattern::Domain(domain.to_ascii_lowercase())
                }
                Some(_) => return Err(PatternError::InvalidHost(host.to_string())),
                None if host.contains('*') => {
                    return Err(PatternError::InvalidHost(host.to_string()))
                }
                None => HostPattern::Exact(host.to_ascii_lowercase()),
            },
        };

        Ok(Self {
            scheme,
            host,
            path: path.to_string(),
        })
    }

    /// Returns true if `url` matches this pattern. Unparseable URLs never match.
    pub fn matches(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(url) => self.matches_url(&url),
            Err(_) => false,
        }
    }

    pub fn matches_url(&self, url: &Url) -> bool {
        let scheme_ok = match &self.scheme {
            SchemePattern::Web => matches!(url.scheme(), "http" | "https"),
            SchemePattern::Exact(scheme) => url.scheme() == scheme,
        };
        if !scheme_ok {
            return false;
        }

        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        let host_ok = match &self.host {
            HostPattern::Any => true,
            HostPattern::Domain(domain) => {
                host == *domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
            HostPattern::Exact(expected) => host == *expected,
        };
        if !host_ok {
            return false;
        }

        let target = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        glob_match(&self.path, &target)
    }
}

impl std::str::FromStr for UrlPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// `*`-only glob match with backtracking to the last star.
fn glob_match(pattern: &str, text: &str) -> bool {
    let p = pattern.as_bytes();
    let t = text.as_bytes();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == b'*' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some((star_pi, star_ti)) = star {
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == b'*')
}
