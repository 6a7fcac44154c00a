//! Host-debugger abstraction.
//!
//! The [`DebuggerHost`] trait decouples the resurrection core from the
//! IDE's debugger object model (process enumeration, the attach
//! primitive, the engine catalog, dialogs, and status display). All host
//! interaction routes through this trait; the core never talks to the
//! IDE directly.
//!
//! Lifecycle signals flow the other way: the embedder feeds
//! [`DebugEvent`] and [`ProcessStartEvent`] values into the channels
//! handed out by [`ResurrectRuntime::start`](crate::runtime::ResurrectRuntime::start).

use std::future::Future;
use std::pin::Pin;

use uuid::Uuid;

use crate::Result;

/// A process visible to the host debugger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    /// Full executable path as reported by the OS.
    pub path: String,
    /// Whether a debugger is already attached to this process.
    pub is_being_debugged: bool,
}

/// A debug engine known to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    /// Host-assigned engine identifier.
    pub id: Uuid,
    /// Human-readable engine name (e.g. `Native`, `Managed`).
    pub name: String,
}

/// Severity of a host notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational message.
    Info,
    /// Recoverable problem worth the user's attention.
    Warning,
    /// Operation failure.
    Error,
}

/// Debugger lifecycle signals emitted by the host.
#[derive(Debug, Clone)]
pub enum DebugEvent {
    /// A process entered the debug session.
    ProcessCreated {
        /// Full executable path as reported at process-create time.
        path: String,
    },
    /// A debug engine finished loading for a process.
    EngineLoaded {
        /// Path of the process the engine attached to.
        path: String,
        /// Host identifier of the loaded engine.
        engine_id: Uuid,
    },
    /// The host returned to design mode (debug session ended).
    DesignModeEntered,
}

/// OS-level notification that a new process started (outside any debug
/// session). Consumed by the auto-attach watcher.
#[derive(Debug, Clone)]
pub struct ProcessStartEvent {
    /// Full executable path of the newly started process.
    pub path: String,
}

/// Narrow interface to the host IDE's debugger object model.
///
/// Methods return boxed futures so the trait stays object-safe; the core
/// holds hosts as `Arc<dyn DebuggerHost>`.
pub trait DebuggerHost: Send + Sync {
    /// Enumerate processes currently visible to the debugger.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Host`](crate::AppError::Host) when the
    /// debugger object model is unreachable.
    fn enumerate_processes(&self)
        -> Pin<Box<dyn Future<Output = Result<Vec<ProcessInfo>>> + Send + '_>>;

    /// Attach the debugger to `process` with the given engines, or let
    /// the host auto-detect an appropriate engine when `engines` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AccessDenied`](crate::AppError::AccessDenied)
    /// for authorization-class failures and
    /// [`AppError::Host`](crate::AppError::Host) for anything else.
    fn attach<'a>(
        &'a self,
        process: &'a ProcessInfo,
        engines: Option<&'a [Uuid]>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// List the debug engines the host knows about.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Host`](crate::AppError::Host) when the engine
    /// catalog is unreachable.
    fn known_engines(&self) -> Pin<Box<dyn Future<Output = Result<Vec<EngineInfo>>> + Send + '_>>;

    /// Ask the user a yes/no question. `true` means yes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Host`](crate::AppError::Host) when the dialog
    /// cannot be shown.
    fn confirm<'a>(
        &'a self,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;

    /// Show a message to the user.
    fn notify<'a>(
        &'a self,
        message: &'a str,
        severity: Severity,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

    /// Update the resurrection command's display text and enabled state.
    /// Display-only; stale values are harmless.
    fn update_status<'a>(
        &'a self,
        text: &'a str,
        enabled: bool,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

    /// Identity of the currently open workspace (e.g. its file name).
    /// Scopes all persistence operations.
    fn workspace_key(&self) -> String;

    /// Whether the host process runs with elevated privileges. Used to
    /// classify opaque attach failures.
    fn has_elevated_privileges(&self) -> bool;
}
