//! grantflow-api: Shared types for the grantflow permission engine
//!
//! This crate defines the data model exchanged between the orchestration
//! engine and host-platform adapters: what a requestable capability looks
//! like, which channel it is requested through, and where its settings
//! page lives.

use serde::{Deserialize, Serialize};

/// API version for compatibility checking
pub const API_VERSION: u32 = 1;

/// The mechanism through which a capability is requested from the host
/// platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionChannel {
    /// No user interaction: the grant state is simply checked.
    DirectCheck,

    /// The platform shows its own runtime dialog when requested.
    InteractiveDialog,

    /// The permission can only be changed on a settings page; the
    /// platform never shows an in-app dialog for it.
    SettingsNavigation,
}

impl PermissionChannel {
    /// Whether this channel can surface a rationale before re-prompting.
    ///
    /// Settings-navigation permissions have no runtime dialog, so there
    /// is nothing to rationalize — the user lands on a settings page
    /// either way.
    pub fn supports_rationale(&self) -> bool {
        !matches!(self, Self::SettingsNavigation)
    }
}

/// Immutable description of one requestable capability.
///
/// The `name` is the stable identifier the host platform understands;
/// grant / rationale / do-not-ask-again state is queried live from the
/// platform, never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionDescriptor {
    /// Stable platform identifier (e.g. "camera", "location.fine")
    name: String,

    /// How the platform requests this capability
    channel: PermissionChannel,
}

impl PermissionDescriptor {
    /// Create a descriptor with an explicit channel
    pub fn new(name: impl Into<String>, channel: PermissionChannel) -> Self {
        Self {
            name: name.into(),
            channel,
        }
    }

    /// Create a descriptor requested via direct state check
    pub fn direct(name: impl Into<String>) -> Self {
        Self::new(name, PermissionChannel::DirectCheck)
    }

    /// Create a descriptor requested via the platform's runtime dialog
    pub fn dialog(name: impl Into<String>) -> Self {
        Self::new(name, PermissionChannel::InteractiveDialog)
    }

    /// Create a descriptor that can only be granted on a settings page
    pub fn settings(name: impl Into<String>) -> Self {
        Self::new(name, PermissionChannel::SettingsNavigation)
    }

    /// Stable platform identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Request channel
    pub fn channel(&self) -> PermissionChannel {
        self.channel
    }
}

/// Opaque identifier of a settings page the user can be sent to when a
/// permission is in the do-not-ask-again state.
///
/// Several permissions may share one target (e.g. one app-details page
/// covering every runtime permission).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettingsTarget(String);

impl SettingsTarget {
    /// Create a target from a platform-specific page identifier
    pub fn new(page: impl Into<String>) -> Self {
        Self(page.into())
    }

    /// The page identifier
    pub fn page(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SettingsTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Well-known capability descriptors with their natural channels.
///
/// Hosts are free to define their own descriptors; these cover the
/// common set so that callers and platform adapters agree on names.
pub mod catalog {
    use super::PermissionDescriptor;

    /// Camera capture
    pub fn camera() -> PermissionDescriptor {
        PermissionDescriptor::dialog("camera")
    }

    /// Microphone / audio recording
    pub fn microphone() -> PermissionDescriptor {
        PermissionDescriptor::dialog("microphone")
    }

    /// Precise location while the app is in use
    pub fn fine_location() -> PermissionDescriptor {
        PermissionDescriptor::dialog("location.fine")
    }

    /// Location while the app is in the background
    pub fn background_location() -> PermissionDescriptor {
        PermissionDescriptor::dialog("location.background")
    }

    /// Posting user-visible notifications
    pub fn notifications() -> PermissionDescriptor {
        PermissionDescriptor::dialog("notifications")
    }

    /// Reading images from shared media storage
    pub fn read_media_images() -> PermissionDescriptor {
        PermissionDescriptor::dialog("media.images.read")
    }

    /// Reading and writing shared external storage
    pub fn external_storage() -> PermissionDescriptor {
        PermissionDescriptor::dialog("storage.external")
    }

    /// Drawing over other applications; settings-page only
    pub fn overlay() -> PermissionDescriptor {
        PermissionDescriptor::settings("window.overlay")
    }

    /// Unrestricted file-system management; settings-page only
    pub fn manage_all_files() -> PermissionDescriptor {
        PermissionDescriptor::settings("storage.manage_all")
    }

    /// Installing packages from this app; settings-page only
    pub fn install_packages() -> PermissionDescriptor {
        PermissionDescriptor::settings("packages.install")
    }
}
