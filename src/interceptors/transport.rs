use http::{HeaderMap, Method};
use reqwest::Url;

use crate::models::InstanceType;

/// Header carrying the bearer token on production instances.
pub const AUTHORIZATION_HEADER: &str = "authorization";
/// Header carrying the refreshed dev-browser token on development instances.
pub const DEV_BROWSER_JWT_HEADER: &str = "clerk-db-jwt";
/// Query parameter carrying the token on development instances.
pub const DEV_BROWSER_JWT_QUERY_PARAM: &str = "__clerk_db_jwt";
/// Query parameter marking a request as coming from a non-browser client.
pub const NATIVE_CLIENT_QUERY_PARAM: &str = "_is_native";

const BEARER_PREFIX: &str = "Bearer";

/// How the token travels between the bridge and the backend. Picked once
/// from the instance type; the backend depends on this exact shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTransport {
    /// Production: `Authorization: Bearer <t>` both ways, plus `_is_native=1`.
    BearerHeader,
    /// Development: `__clerk_db_jwt=<t>` on requests, `Clerk-Db-Jwt` on responses.
    DevBrowserQuery,
}

impl From<InstanceType> for TokenTransport {
    fn from(instance_type: InstanceType) -> Self {
        match instance_type {
            InstanceType::Production => TokenTransport::BearerHeader,
            InstanceType::Development => TokenTransport::DevBrowserQuery,
        }
    }
}

impl TokenTransport {
    /// The response header a refreshed token arrives in.
    pub fn response_header(self) -> &'static str {
        match self {
            TokenTransport::BearerHeader => AUTHORIZATION_HEADER,
            TokenTransport::DevBrowserQuery => DEV_BROWSER_JWT_HEADER,
        }
    }

    /// Extracts the token from a response header value. `None` means the
    /// session is gone.
    pub fn parse_response_value(self, value: &str) -> Option<String> {
        let value = value.trim();
        let token = match self {
            TokenTransport::BearerHeader => match value.split_once(char::is_whitespace) {
                Some((scheme, rest)) if scheme == BEARER_PREFIX => rest.trim_start(),
                _ if value == BEARER_PREFIX => "",
                _ => value,
            },
            TokenTransport::DevBrowserQuery => value,
        };
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }
}

/// Whether the transport may attach ambient credentials (cookies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialsMode {
    Include,
    #[default]
    SameOrigin,
    Omit,
}

/// A request on its way to the backend, before it hits the wire.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub credentials: CredentialsMode,
}

impl OutboundRequest {
    pub fn new(method: Method, url: Url) -> Self {
        OutboundRequest {
            method,
            url,
            headers: HeaderMap::new(),
            credentials: CredentialsMode::default(),
        }
    }

    pub fn append_query(&mut self, name: &str, value: &str) {
        self.url.query_pairs_mut().append_pair(name, value);
    }

    pub fn query_value(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_from_instance_type() {
        assert_eq!(
            TokenTransport::from(InstanceType::Production),
            TokenTransport::BearerHeader
        );
        assert_eq!(
            TokenTransport::from(InstanceType::Development),
            TokenTransport::DevBrowserQuery
        );
    }

    #[test]
    fn test_parse_bearer_values() {
        let t = TokenTransport::BearerHeader;
        assert_eq!(t.parse_response_value("Bearer abc123").as_deref(), Some("abc123"));
        assert_eq!(t.parse_response_value("abc123").as_deref(), Some("abc123"));
        assert_eq!(t.parse_response_value("Bearer "), None);
        assert_eq!(t.parse_response_value("BearerXYZ").as_deref(), Some("BearerXYZ"));
        assert_eq!(t.parse_response_value("Bearer\tabc").as_deref(), Some("abc"));
        assert_eq!(t.parse_response_value(""), None);
    }

    #[test]
    fn test_parse_dev_values_verbatim() {
        let t = TokenTransport::DevBrowserQuery;
        assert_eq!(
            t.parse_response_value("Bearer abc123").as_deref(),
            Some("Bearer abc123")
        );
        assert_eq!(t.parse_response_value("abc123").as_deref(), Some("abc123"));
    }

    #[test]
    fn test_append_query_keeps_existing_params() {
        let mut req = OutboundRequest::new(
            Method::GET,
            Url::parse("https://clerk.example.com/v1/client?_clerk_js_version=5").unwrap(),
        );
        req.append_query(NATIVE_CLIENT_QUERY_PARAM, "1");
        assert_eq!(req.query_value("_clerk_js_version").as_deref(), Some("5"));
        assert_eq!(req.query_value(NATIVE_CLIENT_QUERY_PARAM).as_deref(), Some("1"));
    }
}
