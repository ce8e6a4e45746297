//! grantflow: permission-request negotiation engine
//!
//! Orchestrates the conversation between a host platform's permission
//! subsystem and the user: when to explain before asking, when a denial
//! is final and the only way forward is a settings page, and how a batch
//! of heterogeneous permission requests converges to one result.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       PermissionRequest                          │
//! │                                                                  │
//! │  Rationale ──► Dispatch ──► Post-Request ──► Deliver (once)      │
//! │  {suspend}                  {suspend}                            │
//! │      │             │             │                               │
//! │      ▼             ▼             ▼                               │
//! │  Rationale     Permission    DoNotAskAgain                       │
//! │  Handler       Platform      Handler                             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two suspension points wait on single-shot [`UserResponse`]
//! responders; the batch stays off-thread while a dialog is up, and a
//! dropped responder abandons the batch without delivering.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use grantflow::{AutoDecisionHandler, PermissionRequest};
//! use grantflow::testing::ScriptedPlatform;
//! use grantflow_api::catalog;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let platform = Arc::new(ScriptedPlatform::new().allow_on_dispatch("camera"));
//!
//! PermissionRequest::with(platform)
//!     .permission(catalog::camera())
//!     .on_rationale(AutoDecisionHandler::agree())
//!     .request(|outcome| {
//!         assert!(outcome.all_granted);
//!         assert_eq!(outcome.granted, vec!["camera"]);
//!     })
//!     .await;
//! # }
//! ```

pub mod handler;
pub mod outcome;
pub mod platform;
pub mod request;
pub mod testing;

pub use handler::{
    AutoDecisionHandler, DoNotAskAgainHandler, RationaleHandler, RecordedPrompt,
    RecordingDecisionHandler, TerminalDecisionHandler, UserResponse,
};
pub use outcome::Outcome;
pub use platform::{PermissionPlatform, PlatformError, RequestPartition};
pub use request::PermissionRequest;
pub use grantflow_api::{PermissionChannel, PermissionDescriptor, SettingsTarget};
