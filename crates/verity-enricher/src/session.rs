//! Handle to a running enrichment session

use crate::bootstrap::ContextId;
use crate::scheduler::ViewportSignal;
use std::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Cheap handle through which the host forwards viewport changes
///
/// The receiving half belongs to the session's
/// [`EnrichmentWorker`](crate::EnrichmentWorker). Ending the session closes
/// the channel, which lets the worker drain and stop.
#[derive(Debug)]
pub struct EnrichmentSession {
    context: ContextId,
    signals: Mutex<Option<UnboundedSender<ViewportSignal>>>,
}

impl EnrichmentSession {
    /// Create a session handle and the receiver its worker consumes
    pub fn new(context: ContextId) -> (Self, UnboundedReceiver<ViewportSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            context,
            signals: Mutex::new(Some(tx)),
        };
        (session, rx)
    }

    /// Context the session belongs to
    pub fn context(&self) -> &ContextId {
        &self.context
    }

    /// Forward a viewport change to the worker
    ///
    /// Returns false once the session has ended or its worker is gone.
    pub fn notify(&self, signal: ViewportSignal) -> bool {
        let signals = self.signals.lock().unwrap_or_else(|p| p.into_inner());
        match signals.as_ref() {
            Some(tx) => tx.send(signal).is_ok(),
            None => false,
        }
    }

    /// Stop accepting signals
    pub fn end(&self) {
        let mut signals = self.signals.lock().unwrap_or_else(|p| p.into_inner());
        if signals.take().is_some() {
            tracing::debug!(context = %self.context, "Session stopped accepting signals");
        }
    }

    /// Whether the session still accepts signals
    pub fn is_open(&self) -> bool {
        let signals = self.signals.lock().unwrap_or_else(|p| p.into_inner());
        signals.as_ref().is_some_and(|tx| !tx.is_closed())
    }
}
