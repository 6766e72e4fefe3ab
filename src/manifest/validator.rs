use tracing::{debug, error};

use super::{Manifest, COOKIES_PERMISSION, STORAGE_PERMISSION};
use crate::error::ConfigurationError;

/// Features a context wants to switch on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestedFeatures {
    pub sync: bool,
    pub background: bool,
}

/// Checks the manifest grants what the requested features need.
///
/// Rules are checked in a fixed order and the first violation is returned:
/// storage permission, then (sync) cookies permission and host permissions,
/// then (background) a background entry.
pub fn validate_manifest(
    manifest: &Manifest,
    features: RequestedFeatures,
) -> Result<(), ConfigurationError> {
    let result = check(manifest, features);
    match &result {
        Ok(()) => debug!(
            sync = features.sync,
            background = features.background,
            "Extension manifest grants requested features"
        ),
        Err(e) => error!(
            event_name = "manifest.validation.failed",
            event_domain = "manifest",
            "{}",
            e
        ),
    }
    result
}

fn check(manifest: &Manifest, features: RequestedFeatures) -> Result<(), ConfigurationError> {
    if !manifest.has_permission(STORAGE_PERMISSION) {
        return Err(ConfigurationError::MissingPermission(
            STORAGE_PERMISSION.to_string(),
        ));
    }

    if features.sync {
        if !manifest.has_permission(COOKIES_PERMISSION) {
            return Err(ConfigurationError::MissingPermission(
                COOKIES_PERMISSION.to_string(),
            ));
        }
        if manifest.host_permissions.is_empty() {
            return Err(ConfigurationError::MissingHostPermissions);
        }
    }

    if features.background && !manifest.has_background() {
        return Err(ConfigurationError::MissingBackground);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::BackgroundEntry;

    fn manifest(permissions: &[&str], hosts: &[&str], background: bool) -> Manifest {
        Manifest {
            permissions: permissions.iter().map(|s| s.to_string()).collect(),
            host_permissions: hosts.iter().map(|s| s.to_string()).collect(),
            background: background.then(|| BackgroundEntry {
                service_worker: Some("background.js".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    const SYNC: RequestedFeatures = RequestedFeatures {
        sync: true,
        background: false,
    };

    #[test]
    fn test_storage_is_always_required() {
        assert_eq!(
            validate_manifest(&manifest(&[], &[], true), RequestedFeatures::default()),
            Err(ConfigurationError::MissingPermission("storage".to_string()))
        );
        assert_eq!(
            validate_manifest(&manifest(&["storage"], &[], false), RequestedFeatures::default()),
            Ok(())
        );
    }

    #[test]
    fn test_missing_cookies_reported_before_hosts() {
        // No host permissions either, but cookies is checked first.
        assert_eq!(
            validate_manifest(&manifest(&["storage"], &[], false), SYNC),
            Err(ConfigurationError::MissingPermission("cookies".to_string()))
        );
    }

    #[test]
    fn test_sync_needs_host_permissions() {
        assert_eq!(
            validate_manifest(&manifest(&["storage", "cookies"], &[], false), SYNC),
            Err(ConfigurationError::MissingHostPermissions)
        );
        assert_eq!(
            validate_manifest(
                &manifest(&["storage", "cookies"], &["https://*.example.com/*"], false),
                SYNC
            ),
            Ok(())
        );
    }

    #[test]
    fn test_background_checked_last() {
        let features = RequestedFeatures {
            sync: true,
            background: true,
        };
        assert_eq!(
            validate_manifest(&manifest(&["storage"], &[], false), features),
            Err(ConfigurationError::MissingPermission("cookies".to_string()))
        );
        assert_eq!(
            validate_manifest(
                &manifest(&["storage", "cookies"], &["https://example.com/*"], false),
                features
            ),
            Err(ConfigurationError::MissingBackground)
        );
        assert_eq!(
            validate_manifest(
                &manifest(&["storage", "cookies"], &["https://example.com/*"], true),
                features
            ),
            Ok(())
        );
    }
}
