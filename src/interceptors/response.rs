use std::sync::Arc;

use http::HeaderMap;
use tracing::debug;

use super::transport::TokenTransport;
use crate::handler::JwtHandler;
use crate::models::SessionToken;

/// Harvests a refreshed token from every backend response.
#[derive(Clone)]
pub struct ResponseInterceptor {
    handler: Arc<JwtHandler>,
    transport: TokenTransport,
}

impl ResponseInterceptor {
    pub fn new(handler: Arc<JwtHandler>, transport: TokenTransport) -> Self {
        ResponseInterceptor { handler, transport }
    }

    /// Stores the token carried by the response, or clears the cached one
    /// when the header is absent or unusable.
    pub async fn intercept(&self, headers: &HeaderMap) {
        let header = self.transport.response_header();
        let token = headers
            .get(header)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| self.transport.parse_response_value(value))
            .and_then(SessionToken::new);

        match token {
            Some(token) => {
                debug!(header, "Response carried a session token");
                self.handler.set(&token).await;
            }
            None => {
                debug!(header, "Response carried no session token, clearing cache");
                self.handler.remove().await;
            }
        }
    }
}
