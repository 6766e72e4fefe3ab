use tracing::debug;

use super::Manifest;
use crate::cookies::{normalize_host_url, HostUrls};
use crate::error::ConfigurationError;

/// A scheme + host pair derived from a `host_permissions` match pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPermission {
    pub scheme: String,
    pub host: String,
    /// The pattern was `*.host`, so subdomains are covered too.
    pub include_subdomains: bool,
}

impl HostPermission {
    /// Parses a match pattern such as `https://*.example.com/*`.
    /// Returns `None` for patterns that name no concrete host.
    pub fn parse(pattern: &str) -> Option<Self> {
        let (scheme, rest) = pattern.trim().split_once("://")?;
        let scheme = match scheme {
            "*" => "https",
            "http" | "https" => scheme,
            _ => return None,
        };
        let host = rest.split('/').next().unwrap_or_default();
        let (host, include_subdomains) = match host.strip_prefix("*.") {
            Some(parent) => (parent, true),
            None => (host, false),
        };
        if host.is_empty() || host.contains('*') {
            return None;
        }
        Some(HostPermission {
            scheme: scheme.to_string(),
            host: host.to_ascii_lowercase(),
            include_subdomains,
        })
    }

    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Whether this permission grants access to `host`.
    pub fn covers(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        host == self.host || (self.include_subdomains && host.ends_with(&format!(".{}", self.host)))
    }
}

/// Candidate cookie hosts declared by the manifest, de-duplicated on
/// scheme + host and kept in declaration order.
pub fn candidate_hosts(manifest: &Manifest) -> Vec<HostPermission> {
    let mut hosts: Vec<HostPermission> = Vec::new();
    for pattern in &manifest.host_permissions {
        let Some(parsed) = HostPermission::parse(pattern) else {
            debug!("Skipping host permission without a concrete host: '{}'", pattern);
            continue;
        };
        match hosts
            .iter_mut()
            .find(|h| h.scheme == parsed.scheme && h.host == parsed.host)
        {
            Some(existing) => existing.include_subdomains |= parsed.include_subdomains,
            None => hosts.push(parsed),
        }
    }
    hosts
}

/// The candidate hosts covering `host_hint` (a bare host or a URL).
/// Fails when the manifest grants no access to it.
pub fn require_host_permission(
    manifest: &Manifest,
    host_hint: &str,
) -> Result<Vec<HostPermission>, ConfigurationError> {
    let no_match = || ConfigurationError::NoMatchingHostPermission {
        host: host_hint.to_string(),
    };
    let url = normalize_host_url(host_hint).map_err(|_| no_match())?;
    let host = url.host_str().ok_or_else(no_match)?;

    let matching: Vec<HostPermission> = candidate_hosts(manifest)
        .into_iter()
        .filter(|candidate| candidate.covers(host))
        .collect();
    if matching.is_empty() {
        return Err(no_match());
    }
    Ok(matching)
}

/// Origins to hand to the cookie reader.
pub fn to_host_urls(hosts: &[HostPermission]) -> HostUrls {
    HostUrls::Many(hosts.iter().map(HostPermission::origin).collect())
}
