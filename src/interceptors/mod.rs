//! Request/response hooks that carry the client JWT to and from the backend.

pub mod request;
pub mod response;
pub mod transport;

pub use request::RequestInterceptor;
pub use response::ResponseInterceptor;
pub use transport::{
    CredentialsMode, OutboundRequest, TokenTransport, AUTHORIZATION_HEADER,
    DEV_BROWSER_JWT_HEADER, DEV_BROWSER_JWT_QUERY_PARAM, NATIVE_CLIENT_QUERY_PARAM,
};
