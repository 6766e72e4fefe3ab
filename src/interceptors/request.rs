use std::sync::Arc;

use http::HeaderValue;
use tracing::{debug, warn};

use super::transport::{
    CredentialsMode, OutboundRequest, TokenTransport, AUTHORIZATION_HEADER,
    DEV_BROWSER_JWT_QUERY_PARAM, NATIVE_CLIENT_QUERY_PARAM,
};
use crate::handler::JwtHandler;

/// Attaches the current token to every outbound authenticated call.
#[derive(Clone)]
pub struct RequestInterceptor {
    handler: Arc<JwtHandler>,
    transport: TokenTransport,
}

impl RequestInterceptor {
    pub fn new(handler: Arc<JwtHandler>, transport: TokenTransport) -> Self {
        RequestInterceptor { handler, transport }
    }

    pub async fn intercept(&self, request: &mut OutboundRequest) {
        // Cookies never ride along on their own; the token is explicit.
        request.credentials = CredentialsMode::Omit;

        let Some(token) = self.handler.get().await else {
            debug!(url = %request.url, "No session token, sending as native client");
            request.append_query(NATIVE_CLIENT_QUERY_PARAM, "1");
            return;
        };

        match self.transport {
            TokenTransport::BearerHeader => {
                request.append_query(NATIVE_CLIENT_QUERY_PARAM, "1");
                match HeaderValue::from_str(&format!("Bearer {}", token.as_str())) {
                    Ok(mut value) => {
                        value.set_sensitive(true);
                        request.headers.insert(AUTHORIZATION_HEADER, value);
                    }
                    Err(_) => warn!(
                        event_name = "interceptors.request.invalid_token",
                        event_domain = "interceptors",
                        "Session token is not a valid header value, sending unauthenticated"
                    ),
                }
            }
            TokenTransport::DevBrowserQuery => {
                request.append_query(DEV_BROWSER_JWT_QUERY_PARAM, token.as_str());
            }
        }
    }
}
