//! Extension manifest checks that gate which sync strategy may run.

pub mod document;
pub mod hosts;
pub mod validator;

pub use document::{BackgroundEntry, Manifest, COOKIES_PERMISSION, STORAGE_PERMISSION};
pub use hosts::{candidate_hosts, require_host_permission, to_host_urls, HostPermission};
pub use validator::{validate_manifest, RequestedFeatures};
