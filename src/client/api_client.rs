use std::sync::Arc;

use http::header::{COOKIE, SET_COOKIE};
use http::Method;
use reqwest::cookie::{CookieStore as _, Jar};
use reqwest::{Response, Url};
use serde_json::Value;
use tracing::debug;

use crate::cookies::normalize_host_url;
use crate::error::BridgeError;
use crate::interceptors::{CredentialsMode, OutboundRequest, RequestInterceptor, ResponseInterceptor};

/// HTTP client for the frontend API. Every request goes through the
/// request interceptor, every response through the response interceptor.
///
/// Cookies from `Set-Cookie` land in the shared jar (so a `jar` cookie
/// store can sync them) but are only sent when the request's credentials
/// mode allows it, which the interceptor never does.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    jar: Arc<Jar>,
    request_interceptor: RequestInterceptor,
    response_interceptor: ResponseInterceptor,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        jar: Arc<Jar>,
        request_interceptor: RequestInterceptor,
        response_interceptor: ResponseInterceptor,
    ) -> Result<Self, BridgeError> {
        let base_url = normalize_host_url(base_url).map_err(|e| BridgeError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(ApiClient {
            http: reqwest::Client::new(),
            base_url,
            jar,
            request_interceptor,
            response_interceptor,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> Result<Response, BridgeError> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Response, BridgeError> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, BridgeError> {
        let url = self.base_url.join(path).map_err(|e| BridgeError::InvalidUrl {
            url: path.to_string(),
            reason: e.to_string(),
        })?;

        let mut outbound = OutboundRequest::new(method, url);
        self.request_interceptor.intercept(&mut outbound).await;

        let mut builder = self
            .http
            .request(outbound.method, outbound.url.clone())
            .headers(outbound.headers);
        if outbound.credentials != CredentialsMode::Omit {
            if let Some(cookies) = self.jar.cookies(&outbound.url) {
                builder = builder.header(COOKIE, cookies);
            }
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(url = %outbound.url.path(), "Sending frontend API request");
        let response = builder.send().await?;

        let mut set_cookies = response.headers().get_all(SET_COOKIE).iter();
        self.jar.set_cookies(&mut set_cookies, response.url());

        self.response_interceptor.intercept(response.headers()).await;
        debug!(status = response.status().as_u16(), "Frontend API responded");
        Ok(response)
    }
}
