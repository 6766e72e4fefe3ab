//! Per-context bridge state.
//!
//! A `ContextBridge` is what one execution context holds after `init`: the
//! token handler, the interceptors wired to it, and the lifecycle of any
//! polls it started. Nothing here is global; each context owns its own.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::BridgeError;
use crate::handler::{JwtHandler, PollHandle};
use crate::interceptors::{RequestInterceptor, ResponseInterceptor, TokenTransport};
use crate::models::{ExtensionContext, PublishableKey};

/// Handle returned by [`crate::startup::init`], torn down on disposal.
pub struct ContextBridge {
    /// Correlates log lines from one context instance.
    pub(crate) id: Uuid,
    pub(crate) context: ExtensionContext,
    pub(crate) publishable_key: PublishableKey,
    pub(crate) handler: Arc<JwtHandler>,
    pub(crate) transport: TokenTransport,
    pub(crate) request_interceptor: RequestInterceptor,
    pub(crate) response_interceptor: ResponseInterceptor,
    pub(crate) jar: Arc<Jar>,
    pub(crate) poll_interval: Duration,
    pub(crate) shutdown: CancellationToken,
}

impl ContextBridge {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> ExtensionContext {
        self.context
    }

    pub fn publishable_key(&self) -> &PublishableKey {
        &self.publishable_key
    }

    pub fn handler(&self) -> &Arc<JwtHandler> {
        &self.handler
    }

    pub fn transport(&self) -> TokenTransport {
        self.transport
    }

    pub fn request_interceptor(&self) -> &RequestInterceptor {
        &self.request_interceptor
    }

    pub fn response_interceptor(&self) -> &ResponseInterceptor {
        &self.response_interceptor
    }

    /// A client for the frontend API encoded in the publishable key.
    pub fn api_client(&self) -> Result<ApiClient, BridgeError> {
        self.api_client_for(self.publishable_key.frontend_api())
    }

    /// A client for an explicit base URL, sharing this context's jar and
    /// interceptors.
    pub fn api_client_for(&self, base_url: &str) -> Result<ApiClient, BridgeError> {
        ApiClient::new(
            base_url,
            self.jar.clone(),
            self.request_interceptor.clone(),
            self.response_interceptor.clone(),
        )
    }

    /// Starts polling for a token set by another context. Only background
    /// contexts with sync on poll; others get `None`.
    pub fn start_poll(&self) -> Option<PollHandle> {
        if !self.context.can_poll() || !self.handler.is_sync_enabled() {
            debug!(
                bridge_id = %self.id,
                context = %self.context,
                sync = self.handler.is_sync_enabled(),
                "Context does not poll for tokens"
            );
            return None;
        }
        if self.shutdown.is_cancelled() {
            debug!(bridge_id = %self.id, "Bridge already torn down, not polling");
            return None;
        }
        Some(
            self.handler
                .poll_until(self.poll_interval, self.shutdown.child_token()),
        )
    }

    pub fn is_torn_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Stops every poll this context started. The cached token stays for
    /// the other contexts.
    pub fn teardown(&self) {
        if !self.shutdown.is_cancelled() {
            info!(bridge_id = %self.id, context = %self.context, "Tearing down token bridge");
            self.shutdown.cancel();
        }
    }
}

impl Drop for ContextBridge {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
