//! Navigation request listener.
//!
//! # Responsibilities
//! - Filter inbound navigation requests by URL pattern and resource type
//! - Run one reconciliation pass per matching request
//! - Report store failures without retrying
//!
//! The request itself is never held: a freshly committed rule takes effect
//! on the next load, while a rule from an earlier pass already applies to
//! this one through the rule engine.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::InterceptionConfig;
use crate::interceptor::filter::{AndFilter, RequestFilter, ResourceTypeFilter, UrlPatternFilter};
use crate::interceptor::pattern::{PatternError, UrlPattern};
use crate::observability::metrics;
use crate::reconcile::{ReconcileOutcome, Reconciler};
use crate::rules::{ResourceType, StoreError};

/// A navigation event reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub url: String,
    pub resource_type: ResourceType,
    /// Host-assigned request id, used only for logging.
    pub request_id: Option<String>,
}

impl NavigationRequest {
    pub fn new(url: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            url: url.into(),
            resource_type,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// What the interceptor did with one request.
#[derive(Debug)]
pub enum Interception {
    /// The request did not match the filter.
    Ignored,
    /// A reconciliation pass completed.
    Reconciled(ReconcileOutcome),
    /// The rule store rejected the pass. Left for the next matching request.
    Failed(StoreError),
}

/// Entry point for intercepted navigation requests.
pub struct RequestInterceptor {
    filter: Box<dyn RequestFilter>,
    reconciler: Arc<Reconciler>,
}

impl RequestInterceptor {
    pub fn new(filter: Box<dyn RequestFilter>, reconciler: Arc<Reconciler>) -> Self {
        Self { filter, reconciler }
    }

    /// Build the pattern + resource type filter from configuration.
    pub fn from_config(
        config: &InterceptionConfig,
        reconciler: Arc<Reconciler>,
    ) -> Result<Self, PatternError> {
        let pattern = UrlPattern::parse(&config.pattern)?;
        let filter = AndFilter::new(vec![
            Box::new(UrlPatternFilter::new(pattern)),
            Box::new(ResourceTypeFilter::new(config.resource_types.clone())),
        ]);
        Ok(Self::new(Box::new(filter), reconciler))
    }

    /// Handle one navigation request to completion.
    pub async fn on_before_request(&self, req: &NavigationRequest) -> Interception {
        if !self.filter.matches(req) {
            tracing::trace!(url = %req.url, "Request does not match filter");
            metrics::record_request_ignored();
            return Interception::Ignored;
        }

        tracing::debug!(
            url = %req.url,
            request_id = req.request_id.as_deref().unwrap_or("-"),
            "Intercepted navigation request"
        );

        match self.reconciler.reconcile(&req.url).await {
            Ok(outcome) => Interception::Reconciled(outcome),
            Err(e) => {
                tracing::error!(url = %req.url, error = %e, "Error updating redirect rules");
                Interception::Failed(e)
            }
        }
    }

    /// Handle a request on its own task so overlapping requests interleave.
    pub fn dispatch(self: &Arc<Self>, req: NavigationRequest) -> JoinHandle<Interception> {
        let interceptor = Arc::clone(self);
        tokio::spawn(async move { interceptor.on_before_request(&req).await })
    }
}

impl std::fmt::Debug for RequestInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestInterceptor")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}
