//! User-decision handling for permission negotiation
//!
//! Provides trait-based decision handling that host applications can
//! customize to match their UI. A handler is shown the affected
//! permission names and a single-shot [`UserResponse`]; it may answer
//! immediately or stash the responder and answer later from a UI event.

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

/// Single-shot responder handed to decision handlers.
///
/// The suspended batch resumes when [`respond`] is called. `respond`
/// consumes the responder, so answering twice is impossible. Dropping
/// the responder unanswered abandons the batch: the suspended flow ends
/// without delivering a final outcome, which is the intended behavior
/// when the hosting context is torn down mid-prompt.
///
/// [`respond`]: UserResponse::respond
#[derive(Debug)]
pub struct UserResponse {
    tx: oneshot::Sender<bool>,
}

impl UserResponse {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Deliver the user's decision.
    ///
    /// If the batch has already been cancelled this is a no-op rather
    /// than an error.
    pub fn respond(self, agree: bool) {
        if self.tx.send(agree).is_err() {
            tracing::debug!("user response arrived after batch was cancelled");
        }
    }

    /// Shorthand for `respond(true)`
    pub fn agree(self) {
        self.respond(true);
    }

    /// Shorthand for `respond(false)`
    pub fn refuse(self) {
        self.respond(false);
    }
}

/// Handler invoked before dispatch when some requested permissions need
/// a rationale.
///
/// Receives the names of the permissions needing explanation (never the
/// full request list) and the responder that resumes the batch.
///
/// # Example
///
/// ```rust
/// use grantflow::handler::{RationaleHandler, UserResponse};
///
/// struct DialogRationale;
///
/// impl RationaleHandler for DialogRationale {
///     fn show_rationale(&self, permissions: Vec<String>, response: UserResponse) {
///         // Present a dialog listing `permissions`, then from its
///         // button callback:
///         response.agree();
///     }
/// }
/// ```
pub trait RationaleHandler: Send + Sync {
    /// Present the rationale and eventually answer via `response`
    fn show_rationale(&self, permissions: Vec<String>, response: UserResponse);
}

/// Handler invoked after dispatch when some denied permissions are in
/// the do-not-ask-again state.
///
/// Agreeing sends the user to the relevant settings pages; either way
/// the batch's outcome is delivered unchanged afterwards.
pub trait DoNotAskAgainHandler: Send + Sync {
    /// Ask whether to open settings for `permissions` and answer via
    /// `response`
    fn show_do_not_ask_again(&self, permissions: Vec<String>, response: UserResponse);
}

impl<F> RationaleHandler for F
where
    F: Fn(Vec<String>, UserResponse) + Send + Sync,
{
    fn show_rationale(&self, permissions: Vec<String>, response: UserResponse) {
        self(permissions, response);
    }
}

impl<F> DoNotAskAgainHandler for F
where
    F: Fn(Vec<String>, UserResponse) + Send + Sync,
{
    fn show_do_not_ask_again(&self, permissions: Vec<String>, response: UserResponse) {
        self(permissions, response);
    }
}

// ============================================================================
// Auto Handler (for CI and pre-decided flows)
// ============================================================================

/// Handler that answers every prompt with a fixed decision
#[derive(Debug, Clone, Copy)]
pub struct AutoDecisionHandler {
    decision: bool,
}

impl AutoDecisionHandler {
    /// Create a handler that always agrees
    pub fn agree() -> Self {
        Self { decision: true }
    }

    /// Create a handler that always refuses
    pub fn refuse() -> Self {
        Self { decision: false }
    }
}

impl RationaleHandler for AutoDecisionHandler {
    fn show_rationale(&self, _permissions: Vec<String>, response: UserResponse) {
        response.respond(self.decision);
    }
}

impl DoNotAskAgainHandler for AutoDecisionHandler {
    fn show_do_not_ask_again(&self, _permissions: Vec<String>, response: UserResponse) {
        response.respond(self.decision);
    }
}

// ============================================================================
// Recording Handler (for testing)
// ============================================================================

/// A recorded decision prompt
#[derive(Debug, Clone)]
pub struct RecordedPrompt {
    /// Permission names the handler was shown
    pub permissions: Vec<String>,
    /// Whether this was the do-not-ask-again prompt
    pub is_do_not_ask_again: bool,
}

/// Handler that records prompts and answers with a fixed decision.
///
/// Clones share the recorded prompt log, so a test can hand one clone
/// to the request builder and keep another for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingDecisionHandler {
    prompts: Arc<Mutex<Vec<RecordedPrompt>>>,
    decision: bool,
}

impl RecordingDecisionHandler {
    /// Create a recording handler that answers `decision`
    pub fn new(decision: bool) -> Self {
        Self {
            prompts: Arc::new(Mutex::new(Vec::new())),
            decision,
        }
    }

    /// All recorded prompts, in invocation order
    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of prompts shown so far
    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn record(&self, permissions: Vec<String>, is_do_not_ask_again: bool) {
        self.prompts.lock().unwrap().push(RecordedPrompt {
            permissions,
            is_do_not_ask_again,
        });
    }
}

impl RationaleHandler for RecordingDecisionHandler {
    fn show_rationale(&self, permissions: Vec<String>, response: UserResponse) {
        self.record(permissions, false);
        response.respond(self.decision);
    }
}

impl DoNotAskAgainHandler for RecordingDecisionHandler {
    fn show_do_not_ask_again(&self, permissions: Vec<String>, response: UserResponse) {
        self.record(permissions, true);
        response.respond(self.decision);
    }
}

// ============================================================================
// Terminal Handler
// ============================================================================

/// Terminal-based decision handler for CLI hosts.
///
/// Prints the affected permission names and reads a y/n answer from
/// stdin. Answers `refuse` when stdin is not an interactive terminal or
/// on read failure. The read is synchronous; GUI hosts should implement
/// their own handler instead.
#[derive(Debug)]
pub struct TerminalDecisionHandler {
    /// Question shown after the permission list
    question: String,
}

impl TerminalDecisionHandler {
    /// Create a handler with the default question
    pub fn new() -> Self {
        Self {
            question: "Continue?".into(),
        }
    }

    /// Override the question shown after the permission list
    pub fn with_question(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }

    fn ask(&self, permissions: &[String]) -> io::Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        writeln!(stdout)?;
        writeln!(stdout, "The following permissions need your attention:")?;
        for name in permissions {
            writeln!(stdout, "  - {name}")?;
        }
        write!(stdout, "{} [y]es / [n]o: ", self.question)?;
        stdout.flush()?;

        let mut input = String::new();
        stdin.lock().read_line(&mut input)?;

        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            _ => Ok(false),
        }
    }

    fn decide(&self, permissions: &[String]) -> bool {
        if !atty_check() {
            tracing::warn!("terminal decision requested in non-interactive environment");
            return false;
        }
        match self.ask(permissions) {
            Ok(agree) => agree,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read terminal decision");
                false
            }
        }
    }
}

impl Default for TerminalDecisionHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl RationaleHandler for TerminalDecisionHandler {
    fn show_rationale(&self, permissions: Vec<String>, response: UserResponse) {
        response.respond(self.decide(&permissions));
    }
}

impl DoNotAskAgainHandler for TerminalDecisionHandler {
    fn show_do_not_ask_again(&self, permissions: Vec<String>, response: UserResponse) {
        response.respond(self.decide(&permissions));
    }
}

/// Check if stdin/stdout are connected to a terminal
fn atty_check() -> bool {
    // Use platform-specific checks for reliable terminal detection
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        // SAFETY: isatty is safe to call with any file descriptor
        unsafe { libc::isatty(io::stdout().as_raw_fd()) != 0 }
    }

    #[cfg(windows)]
    {
        use std::os::windows::io::AsRawHandle;
        use windows_sys::Win32::System::Console::{GetConsoleMode, CONSOLE_MODE};
        let handle = io::stdout().as_raw_handle();
        let mut mode: CONSOLE_MODE = 0;
        // SAFETY: GetConsoleMode is safe with valid handle
        unsafe { GetConsoleMode(handle as _, &mut mode) != 0 }
    }

    #[cfg(not(any(unix, windows)))]
    {
        std::env::var("TERM").is_ok()
    }
}
