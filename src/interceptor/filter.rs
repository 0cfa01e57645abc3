//! Navigation request filtering.
//!
//! # Design Decisions
//! - URL matching uses browser match-pattern semantics
//! - Conditions combine with AND semantics
//! - Empty AND filter = always matches (wildcard)

use crate::interceptor::listener::NavigationRequest;
use crate::interceptor::pattern::UrlPattern;
use crate::rules::ResourceType;

/// Trait for matching requests against conditions.
pub trait RequestFilter: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &NavigationRequest) -> bool;
}

/// Matches the request URL against a match pattern.
#[derive(Debug, Clone)]
pub struct UrlPatternFilter {
    pattern: UrlPattern,
}

impl UrlPatternFilter {
    pub fn new(pattern: UrlPattern) -> Self {
        Self { pattern }
    }
}

impl RequestFilter for UrlPatternFilter {
    fn matches(&self, req: &NavigationRequest) -> bool {
        self.pattern.matches(&req.url)
    }
}

/// Matches the request's resource type.
#[derive(Debug, Clone)]
pub struct ResourceTypeFilter {
    types: Vec<ResourceType>,
}

impl ResourceTypeFilter {
    pub fn new(types: Vec<ResourceType>) -> Self {
        Self { types }
    }
}

impl RequestFilter for ResourceTypeFilter {
    fn matches(&self, req: &NavigationRequest) -> bool {
        self.types.contains(&req.resource_type)
    }
}

/// Combines multiple filters with AND semantics.
#[derive(Debug, Default)]
pub struct AndFilter {
    filters: Vec<Box<dyn RequestFilter>>,
}

impl AndFilter {
    pub fn new(filters: Vec<Box<dyn RequestFilter>>) -> Self {
        Self { filters }
    }
}

impl RequestFilter for AndFilter {
    fn matches(&self, req: &NavigationRequest) -> bool {
        self.filters.iter().all(|f| f.matches(req))
    }
}
