use anyhow::{Context, Result};
use futures::stream::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::backend::{RecognitionBackend, RecognitionOptions, RecognitionSignal};
use crate::session::{EventSender, SessionEvent};

struct ActiveRecognition {
    span: u64,
    pump: JoinHandle<()>,
}

/// Owns the speech recognizer and forwards its output into the session
pub struct TranscriptionController {
    backend: Box<dyn RecognitionBackend>,
    options: RecognitionOptions,
    events: EventSender,
    active: Option<ActiveRecognition>,
}

impl TranscriptionController {
    pub fn new(
        backend: Box<dyn RecognitionBackend>,
        options: RecognitionOptions,
        events: EventSender,
    ) -> Self {
        Self {
            backend,
            options,
            events,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Start listening for the given recording span
    ///
    /// Returns `Ok(false)` if a recognizer is already running.
    pub async fn start(&mut self, span: u64) -> Result<bool> {
        if let Some(active) = &self.active {
            warn!(
                "Recognition already active for span {}, ignoring start",
                active.span
            );
            return Ok(false);
        }

        info!(
            "Starting speech recognition via {} ({}, continuous={}, interim={})",
            self.backend.name(),
            self.options.language,
            self.options.continuous,
            self.options.interim_results
        );

        let mut signals = self
            .backend
            .start(&self.options)
            .await
            .context("Failed to start speech recognition")?;

        let events = self.events.clone();
        let pump = tokio::spawn(async move {
            let mut failed = false;
            while let Some(signal) = signals.next().await {
                failed = matches!(signal, RecognitionSignal::Error(_));
                if events
                    .send(SessionEvent::Recognition { span, signal })
                    .is_err()
                {
                    return;
                }
            }

            if !failed {
                debug!("Recognition stream for span {} ended", span);
                let _ = events.send(SessionEvent::Recognition {
                    span,
                    signal: RecognitionSignal::Ended,
                });
            }
        });

        self.active = Some(ActiveRecognition { span, pump });
        Ok(true)
    }

    /// Stop listening
    ///
    /// Idempotent: returns false if nothing was running.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                self.backend.stop();
                active.pump.abort();
                info!("Speech recognition stopped (span {})", active.span);
                true
            }
            None => false,
        }
    }
}
