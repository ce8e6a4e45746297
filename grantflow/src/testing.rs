//! Scripted in-memory platform for exercising negotiation flows
//!
//! [`ScriptedPlatform`] stands in for a real OS permission subsystem in
//! tests and examples: its state sets are configured up front, its
//! dispatch behavior is scripted, and every dispatch and settings
//! navigation is recorded for assertions.

use std::collections::HashSet;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use grantflow_api::{PermissionDescriptor, SettingsTarget};

use crate::platform::{PermissionPlatform, PlatformError, RequestPartition};

/// Configurable, recording implementation of [`PermissionPlatform`].
///
/// # Example
///
/// ```rust
/// use grantflow::testing::ScriptedPlatform;
///
/// let platform = ScriptedPlatform::new()
///     .grant("notifications")
///     .needs_rationale("camera")
///     .allow_on_dispatch("camera");
///
/// assert!(platform.is_currently_granted("notifications"));
/// assert_eq!(platform.dispatch_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedPlatform {
    /// Names currently granted
    granted: RwLock<HashSet<String>>,
    /// Names the platform recommends a rationale for
    rationale: RwLock<HashSet<String>>,
    /// Names in the do-not-ask-again state
    permanently_denied: RwLock<HashSet<String>>,
    /// Names whose state queries error out
    failing: RwLock<HashSet<String>>,
    /// Names the simulated user grants when the dialog appears
    allow_on_dispatch: RwLock<HashSet<String>>,
    /// Every dispatched request list, in call order
    dispatches: Mutex<Vec<Vec<String>>>,
    /// Every settings navigation, in call order
    navigations: Mutex<Vec<Vec<SettingsTarget>>>,
}

impl ScriptedPlatform {
    /// Create a platform with nothing granted and nothing scripted
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a permission as already granted
    pub fn grant(self, name: impl Into<String>) -> Self {
        self.granted.write().unwrap().insert(name.into());
        self
    }

    /// Mark a permission as needing a rationale before re-prompting
    pub fn needs_rationale(self, name: impl Into<String>) -> Self {
        self.rationale.write().unwrap().insert(name.into());
        self
    }

    /// Mark a permission as do-not-ask-again
    pub fn permanently_deny(self, name: impl Into<String>) -> Self {
        self.permanently_denied.write().unwrap().insert(name.into());
        self
    }

    /// Make every state query for this permission fail
    pub fn fail_queries_for(self, name: impl Into<String>) -> Self {
        self.failing.write().unwrap().insert(name.into());
        self
    }

    /// Script the simulated user to grant this permission when the
    /// dispatch dialog appears
    pub fn allow_on_dispatch(self, name: impl Into<String>) -> Self {
        self.allow_on_dispatch.write().unwrap().insert(name.into());
        self
    }

    /// Whether the permission is granted right now
    pub fn is_currently_granted(&self, name: &str) -> bool {
        self.granted.read().unwrap().contains(name)
    }

    /// Number of dispatch round-trips so far
    pub fn dispatch_count(&self) -> usize {
        self.dispatches.lock().unwrap().len()
    }

    /// The permission names of each dispatch, in call order
    pub fn dispatched_lists(&self) -> Vec<Vec<String>> {
        self.dispatches.lock().unwrap().clone()
    }

    /// Number of settings navigations so far
    pub fn navigation_count(&self) -> usize {
        self.navigations.lock().unwrap().len()
    }

    /// The targets of each settings navigation, in call order
    pub fn navigated_targets(&self) -> Vec<Vec<SettingsTarget>> {
        self.navigations.lock().unwrap().clone()
    }

    fn check(&self, set: &RwLock<HashSet<String>>, name: &str) -> Result<bool, PlatformError> {
        if self.failing.read().unwrap().contains(name) {
            return Err(PlatformError::QueryFailed(format!(
                "scripted failure for \"{name}\""
            )));
        }
        Ok(set.read().unwrap().contains(name))
    }
}

#[async_trait]
impl PermissionPlatform for ScriptedPlatform {
    fn is_granted(&self, permission: &PermissionDescriptor) -> Result<bool, PlatformError> {
        self.check(&self.granted, permission.name())
    }

    fn requires_rationale(&self, permission: &PermissionDescriptor) -> Result<bool, PlatformError> {
        self.check(&self.rationale, permission.name())
    }

    fn is_permanently_denied(
        &self,
        permission: &PermissionDescriptor,
    ) -> Result<bool, PlatformError> {
        self.check(&self.permanently_denied, permission.name())
    }

    async fn request_permissions(
        &self,
        permissions: Vec<PermissionDescriptor>,
    ) -> RequestPartition {
        self.dispatches
            .lock()
            .unwrap()
            .push(permissions.iter().map(|p| p.name().to_string()).collect());

        let mut partition = RequestPartition::default();
        for permission in permissions {
            let already = self.granted.read().unwrap().contains(permission.name());
            let user_allows = self
                .allow_on_dispatch
                .read()
                .unwrap()
                .contains(permission.name());
            if already || user_allows {
                self.granted
                    .write()
                    .unwrap()
                    .insert(permission.name().to_string());
                partition.granted.push(permission);
            } else {
                partition.denied.push(permission);
            }
        }
        partition
    }

    fn settings_targets(&self, permissions: &[PermissionDescriptor]) -> Vec<SettingsTarget> {
        let mut targets = Vec::new();
        for permission in permissions {
            let target = SettingsTarget::new(format!("settings/{}", permission.name()));
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        targets
    }

    fn navigate_to_settings(&self, targets: &[SettingsTarget]) {
        self.navigations.lock().unwrap().push(targets.to_vec());
    }
}
