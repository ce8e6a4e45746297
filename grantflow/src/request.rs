//! Request batch construction and the three-phase negotiation flow
//!
//! One [`PermissionRequest`] is one negotiation: built fresh per user
//! action, consumed by a single call to [`request`], never reused. The
//! flow runs Rationale → Dispatch → Post-Request → Deliver, suspending
//! on user decisions where handlers are registered, and delivers the
//! final [`Outcome`] exactly once on every path.
//!
//! [`request`]: PermissionRequest::request

use std::sync::Arc;

use grantflow_api::PermissionDescriptor;
use tokio::sync::oneshot;

use crate::handler::{DoNotAskAgainHandler, RationaleHandler, UserResponse};
use crate::outcome::Outcome;
use crate::platform::{PermissionPlatform, RequestPartition};

/// Builder and runner for one permission negotiation.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use grantflow::{PermissionRequest, TerminalDecisionHandler};
/// use grantflow_api::catalog;
///
/// PermissionRequest::with(platform)
///     .permission(catalog::camera())
///     .permission(catalog::microphone())
///     .on_rationale(TerminalDecisionHandler::new())
///     .on_do_not_ask_again(TerminalDecisionHandler::with_question(
///         "Open settings to allow them?",
///     ))
///     .request(|outcome| {
///         if outcome.all_granted {
///             // start capture
///         }
///     })
///     .await;
/// ```
pub struct PermissionRequest {
    platform: Arc<dyn PermissionPlatform>,
    permissions: Vec<PermissionDescriptor>,
    on_rationale: Option<Box<dyn RationaleHandler>>,
    on_do_not_ask_again: Option<Box<dyn DoNotAskAgainHandler>>,
}

impl PermissionRequest {
    /// Start a batch against the given platform
    pub fn with(platform: Arc<dyn PermissionPlatform>) -> Self {
        Self {
            platform,
            permissions: Vec::new(),
            on_rationale: None,
            on_do_not_ask_again: None,
        }
    }

    /// Add one permission to the batch.
    ///
    /// Names are unique within a batch: re-adding an already-present
    /// name replaces the earlier entry and moves it to the end.
    pub fn permission(mut self, permission: PermissionDescriptor) -> Self {
        self.permissions.retain(|p| p.name() != permission.name());
        self.permissions.push(permission);
        self
    }

    /// Add several permissions to the batch
    pub fn permissions(
        mut self,
        permissions: impl IntoIterator<Item = PermissionDescriptor>,
    ) -> Self {
        for permission in permissions {
            self = self.permission(permission);
        }
        self
    }

    /// Register the rationale handler, shown before dispatch when the
    /// platform recommends explaining some of the requested permissions
    pub fn on_rationale(mut self, handler: impl RationaleHandler + 'static) -> Self {
        self.on_rationale = Some(Box::new(handler));
        self
    }

    /// Register the do-not-ask-again handler, shown after dispatch when
    /// some denied permissions can only be granted from settings
    pub fn on_do_not_ask_again(mut self, handler: impl DoNotAskAgainHandler + 'static) -> Self {
        self.on_do_not_ask_again = Some(Box::new(handler));
        self
    }

    /// Run the negotiation and deliver the final outcome.
    ///
    /// `on_result` fires exactly once unless the batch is abandoned: if
    /// a decision handler drops its responder, or the returned future is
    /// dropped while suspended, nothing is delivered. Batches are
    /// independent; callers may spawn several concurrently.
    pub async fn request<F>(self, on_result: F)
    where
        F: FnOnce(Outcome),
    {
        if let Some(partition) = self.negotiate().await {
            on_result(Outcome::from_partition(&partition));
        }
    }

    /// Drive the phases to a final partition, or `None` when abandoned.
    ///
    /// Every exit path converges here, so `request` has a single
    /// delivery site.
    async fn negotiate(self) -> Option<RequestPartition> {
        let Self {
            platform,
            permissions,
            on_rationale,
            on_do_not_ask_again,
        } = self;

        // Everything already granted (or nothing requested): skip the
        // whole flow and report success without prompting.
        if permissions.iter().all(|p| granted_now(&*platform, p)) {
            tracing::debug!(
                count = permissions.len(),
                "all requested permissions already granted, skipping request"
            );
            return Some(RequestPartition::all_granted(permissions));
        }

        // Rationale phase
        if let Some(handler) = &on_rationale {
            let needs_rationale = rationale_candidates(&*platform, &permissions);
            if !needs_rationale.is_empty() {
                tracing::debug!(permissions = ?needs_rationale, "awaiting rationale decision");
                let (response, rx) = UserResponse::channel();
                handler.show_rationale(needs_rationale, response);
                if !decision(rx).await? {
                    // User declined the new prompt; report the grant
                    // state as it stands right now. Permissions granted
                    // by an earlier run still count.
                    tracing::debug!("rationale refused, short-circuiting to current state");
                    return Some(partition_by_grant_state(&*platform, permissions));
                }
            }
        }

        // Dispatch: the only live platform prompt
        let raw = platform.request_permissions(permissions.clone()).await;
        let partition = normalize_partition(permissions, &raw);
        tracing::debug!(
            granted = partition.granted.len(),
            denied = partition.denied.len(),
            "platform dispatch finished"
        );

        // Post-request phase
        if let Some(handler) = &on_do_not_ask_again {
            let blocked = permanently_denied(&*platform, &partition.denied);
            if !blocked.is_empty() {
                let names: Vec<String> = blocked.iter().map(|p| p.name().to_string()).collect();
                tracing::debug!(permissions = ?names, "awaiting do-not-ask-again decision");
                let (response, rx) = UserResponse::channel();
                handler.show_do_not_ask_again(names, response);
                if decision(rx).await? {
                    // Fire-and-forget; this run's outcome is unaffected.
                    let targets = platform.settings_targets(&blocked);
                    tracing::debug!(targets = ?targets, "navigating to settings");
                    platform.navigate_to_settings(&targets);
                }
            }
        }

        Some(partition)
    }
}

/// Await a suspended user decision; `None` means the responder was
/// dropped and the batch is abandoned.
async fn decision(rx: oneshot::Receiver<bool>) -> Option<bool> {
    match rx.await {
        Ok(agree) => Some(agree),
        Err(_) => {
            tracing::debug!("decision responder dropped, abandoning batch");
            None
        }
    }
}

/// Current grant state; a failing query counts as not granted
fn granted_now(platform: &dyn PermissionPlatform, permission: &PermissionDescriptor) -> bool {
    platform.is_granted(permission).unwrap_or_else(|e| {
        tracing::warn!(permission = %permission.name(), error = %e, "grant state query failed");
        false
    })
}

/// Names of the requested permissions that should get a rationale.
///
/// Settings-navigation permissions are excluded outright, and a failing
/// rationale query excludes just that permission (fail open).
fn rationale_candidates(
    platform: &dyn PermissionPlatform,
    permissions: &[PermissionDescriptor],
) -> Vec<String> {
    permissions
        .iter()
        .filter(|p| p.channel().supports_rationale())
        .filter(|p| {
            platform.requires_rationale(p).unwrap_or_else(|e| {
                tracing::warn!(permission = %p.name(), error = %e, "rationale query failed");
                false
            })
        })
        .map(|p| p.name().to_string())
        .collect()
}

/// The denied permissions that are in the do-not-ask-again state; a
/// failing query counts as not permanently denied
fn permanently_denied(
    platform: &dyn PermissionPlatform,
    denied: &[PermissionDescriptor],
) -> Vec<PermissionDescriptor> {
    denied
        .iter()
        .filter(|p| {
            platform.is_permanently_denied(p).unwrap_or_else(|e| {
                tracing::warn!(permission = %p.name(), error = %e, "do-not-ask-again query failed");
                false
            })
        })
        .cloned()
        .collect()
}

/// Partition the requested permissions by their live grant state
fn partition_by_grant_state(
    platform: &dyn PermissionPlatform,
    permissions: Vec<PermissionDescriptor>,
) -> RequestPartition {
    let mut partition = RequestPartition::default();
    for permission in permissions {
        if granted_now(platform, &permission) {
            partition.granted.push(permission);
        } else {
            partition.denied.push(permission);
        }
    }
    partition
}

/// Re-anchor the platform's partition on the requested list.
///
/// Keeps declaration order and guarantees that every requested name
/// appears exactly once; anything the platform failed to mention comes
/// back denied rather than silently dropped.
fn normalize_partition(
    requested: Vec<PermissionDescriptor>,
    raw: &RequestPartition,
) -> RequestPartition {
    let mut partition = RequestPartition::default();
    for permission in requested {
        if raw.granted.iter().any(|g| g.name() == permission.name()) {
            partition.granted.push(permission);
        } else {
            partition.denied.push(permission);
        }
    }
    partition
}
