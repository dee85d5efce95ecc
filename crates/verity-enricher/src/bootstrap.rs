//! Idempotent session bootstrap
//!
//! The entry point of an enrichment session may be invoked repeatedly within
//! the same execution context (e.g. re-injection on in-page navigation).
//! [`SessionRegistry`] makes every invocation after the first a silent no-op
//! that returns the live handle.

use crate::session::EnrichmentSession;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// Identity of an execution context (a tab, a frame, a test)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextId(String);

impl ContextId {
    /// Create a context id
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a bootstrap attempt
#[derive(Debug)]
pub enum Bootstrap<H> {
    /// No session existed; a new one was created and installed
    Started(Arc<H>),
    /// A session was already active; nothing was created
    AlreadyActive(Arc<H>),
}

impl<H> Bootstrap<H> {
    /// The live session handle, whichever way it was obtained
    pub fn handle(&self) -> &Arc<H> {
        match self {
            Bootstrap::Started(handle) | Bootstrap::AlreadyActive(handle) => handle,
        }
    }

    /// Consume the outcome, keeping the handle
    pub fn into_handle(self) -> Arc<H> {
        match self {
            Bootstrap::Started(handle) | Bootstrap::AlreadyActive(handle) => handle,
        }
    }

    /// Whether this call created the session
    pub fn is_started(&self) -> bool {
        matches!(self, Bootstrap::Started(_))
    }
}

/// Session handles keyed by execution context
///
/// The check and the install happen under one lock, so a session factory
/// runs at most once per context.
pub struct SessionRegistry<H> {
    sessions: Mutex<HashMap<ContextId, Arc<H>>>,
}

impl<H> Default for SessionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> SessionRegistry<H> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<ContextId, Arc<H>>> {
        // A panicking factory leaves the map itself consistent
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Install a session for `context` unless one is already active
    ///
    /// `start` runs only when no session exists.
    pub fn bootstrap<F>(&self, context: &ContextId, start: F) -> Bootstrap<H>
    where
        F: FnOnce() -> H,
    {
        match self.try_bootstrap(context, || Ok::<H, std::convert::Infallible>(start())) {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`bootstrap`](Self::bootstrap)
    ///
    /// Nothing is installed when `start` fails.
    pub fn try_bootstrap<F, E>(&self, context: &ContextId, start: F) -> Result<Bootstrap<H>, E>
    where
        F: FnOnce() -> Result<H, E>,
    {
        let mut sessions = self.sessions();

        if let Some(existing) = sessions.get(context) {
            tracing::debug!(context = %context, "Session already active, ignoring re-entry");
            return Ok(Bootstrap::AlreadyActive(Arc::clone(existing)));
        }

        let handle = Arc::new(start()?);
        sessions.insert(context.clone(), Arc::clone(&handle));
        tracing::info!(context = %context, "Enrichment session started");
        Ok(Bootstrap::Started(handle))
    }

    /// The active session for `context`, if any
    pub fn get(&self, context: &ContextId) -> Option<Arc<H>> {
        self.sessions().get(context).cloned()
    }

    /// Whether a session is active for `context`
    pub fn is_active(&self, context: &ContextId) -> bool {
        self.sessions().contains_key(context)
    }

    /// Number of active sessions
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    /// Whether no session is active
    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    /// Forget the session of a destroyed context
    pub fn release(&self, context: &ContextId) -> Option<Arc<H>> {
        let released = self.sessions().remove(context);
        if released.is_some() {
            tracing::info!(context = %context, "Enrichment session released");
        }
        released
    }
}

/// Process-wide registry of enrichment sessions
pub fn global_registry() -> &'static SessionRegistry<EnrichmentSession> {
    static REGISTRY: OnceLock<SessionRegistry<EnrichmentSession>> = OnceLock::new();
    REGISTRY.get_or_init(SessionRegistry::new)
}
