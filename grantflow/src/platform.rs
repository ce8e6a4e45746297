//! Platform boundary for permission state and requests
//!
//! The engine never talks to an OS permission subsystem directly; host
//! applications implement [`PermissionPlatform`] and the engine drives it.
//! This is the only seam through which live permission prompts happen.

use async_trait::async_trait;
use grantflow_api::{PermissionDescriptor, SettingsTarget};
use thiserror::Error;

/// Error type for per-descriptor platform state queries
///
/// Query failures never abort a batch: the engine degrades the failing
/// descriptor to the conservative answer (no rationale needed, not
/// permanently denied, not granted) and continues.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("permission state query failed: {0}")]
    QueryFailed(String),

    #[error("permission \"{0}\" is not known to this platform")]
    UnknownPermission(String),
}

/// Granted/denied partition of one dispatch round-trip
#[derive(Debug, Clone, Default)]
pub struct RequestPartition {
    /// Descriptors the platform reports as granted
    pub granted: Vec<PermissionDescriptor>,
    /// Descriptors the platform reports as denied
    pub denied: Vec<PermissionDescriptor>,
}

impl RequestPartition {
    /// Create a partition from granted and denied lists
    pub fn new(granted: Vec<PermissionDescriptor>, denied: Vec<PermissionDescriptor>) -> Self {
        Self { granted, denied }
    }

    /// Partition in which every descriptor is granted
    pub fn all_granted(descriptors: Vec<PermissionDescriptor>) -> Self {
        Self {
            granted: descriptors,
            denied: Vec::new(),
        }
    }

    /// Whether nothing was denied
    pub fn is_all_granted(&self) -> bool {
        self.denied.is_empty()
    }
}

/// Host-platform adapter for one permission subsystem.
///
/// Implementations wrap whatever the host OS provides: a runtime dialog
/// API, a settings deep-link, a capability database. The engine calls
/// the query methods freely, [`request_permissions`] at most once per
/// batch, and [`navigate_to_settings`] at most once per batch.
///
/// [`request_permissions`]: PermissionPlatform::request_permissions
/// [`navigate_to_settings`]: PermissionPlatform::navigate_to_settings
///
/// # Example
///
/// ```rust,ignore
/// use grantflow::platform::{PermissionPlatform, PlatformError, RequestPartition};
/// use grantflow_api::{PermissionDescriptor, SettingsTarget};
///
/// struct DesktopPlatform { /* OS handles */ }
///
/// #[async_trait::async_trait]
/// impl PermissionPlatform for DesktopPlatform {
///     fn is_granted(&self, permission: &PermissionDescriptor) -> Result<bool, PlatformError> {
///         // Query the OS capability database
///         Ok(false)
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait PermissionPlatform: Send + Sync {
    /// Whether the permission is currently granted
    fn is_granted(&self, permission: &PermissionDescriptor) -> Result<bool, PlatformError>;

    /// Whether the platform recommends showing a rationale before
    /// re-prompting for this permission
    fn requires_rationale(&self, permission: &PermissionDescriptor) -> Result<bool, PlatformError>;

    /// Whether further in-app prompting for this permission is
    /// suppressed ("do not ask again")
    fn is_permanently_denied(
        &self,
        permission: &PermissionDescriptor,
    ) -> Result<bool, PlatformError>;

    /// Show the live permission prompt for the given descriptors and
    /// resolve once the user has answered every one.
    ///
    /// Infallible by contract: a platform that cannot prompt reports the
    /// affected descriptors as denied.
    async fn request_permissions(
        &self,
        permissions: Vec<PermissionDescriptor>,
    ) -> RequestPartition;

    /// Resolve the settings pages covering the given descriptors.
    ///
    /// Descriptors may share one target; the returned list is already
    /// deduplicated from the platform's point of view.
    fn settings_targets(&self, permissions: &[PermissionDescriptor]) -> Vec<SettingsTarget>;

    /// Open the given settings pages. Fire-and-forget: nothing about the
    /// user's settings interaction flows back into the current batch.
    fn navigate_to_settings(&self, targets: &[SettingsTarget]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_all_granted() {
        let partition = RequestPartition::all_granted(vec![
            PermissionDescriptor::dialog("camera"),
            PermissionDescriptor::dialog("microphone"),
        ]);
        assert!(partition.is_all_granted());
        assert_eq!(partition.granted.len(), 2);

        let partition = RequestPartition::new(
            vec![PermissionDescriptor::dialog("camera")],
            vec![PermissionDescriptor::dialog("microphone")],
        );
        assert!(!partition.is_all_granted());
    }

    #[test]
    fn test_platform_error_display() {
        let err = PlatformError::QueryFailed("ipc timeout".into());
        assert_eq!(
            err.to_string(),
            "permission state query failed: ipc timeout"
        );

        let err = PlatformError::UnknownPermission("teleport".into());
        assert!(err.to_string().contains("teleport"));
    }
}
