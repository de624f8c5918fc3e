//! Debounced suggestion lookups for type-ahead input.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    model::CandidateLocation,
    resolver::{MIN_SUGGESTION_CHARS, Resolver},
};

/// Runs a task after a quiet period. Scheduling again cancels whatever is
/// still pending, so at most one task is ever waiting or running.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Returns `true` if a task was still pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                tracing::debug!("Cancelled pending debounced task");
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Keystroke-driven suggestion list.
///
/// Each [`SuggestionFeed::input`] restarts the debounce window; when it
/// elapses the latest text is looked up and the result published on the
/// watch channel returned by [`SuggestionFeed::new`].
///
/// Every `input` or `clear` bumps a generation counter. A lookup publishes
/// only if its generation is still the latest, so a task that was already
/// running when it got aborted cannot overwrite a newer list.
#[derive(Debug)]
pub struct SuggestionFeed {
    resolver: Resolver,
    debouncer: Debouncer,
    published: Arc<watch::Sender<Vec<CandidateLocation>>>,
    generation: Arc<AtomicU64>,
}

impl SuggestionFeed {
    pub fn new(
        resolver: Resolver,
        delay: Duration,
    ) -> (Self, watch::Receiver<Vec<CandidateLocation>>) {
        let (tx, rx) = watch::channel(Vec::new());
        let feed = Self {
            resolver,
            debouncer: Debouncer::new(delay),
            published: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
        };
        (feed, rx)
    }

    pub fn input(&mut self, text: &str) {
        let query = text.trim().to_string();
        if query.chars().count() < MIN_SUGGESTION_CHARS {
            self.clear();
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.generation);
        let resolver = self.resolver.clone();
        let published = Arc::clone(&self.published);
        self.debouncer.schedule(async move {
            let list = match resolver.suggestions(&query).await {
                Ok(list) => list,
                Err(e) => {
                    tracing::warn!(error = %e, query, "Suggestions error");
                    Vec::new()
                }
            };
            let applied = published.send_if_modified(|shown| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *shown = list;
                true
            });
            if !applied {
                tracing::debug!(query, "Discarded superseded suggestions");
            }
        });
    }

    /// Drop any pending lookup and empty the list.
    pub fn clear(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.debouncer.cancel();
        self.published.send_replace(Vec::new());
    }

    /// The list currently on display.
    pub fn current(&self) -> Vec<CandidateLocation> {
        self.published.borrow().clone()
    }
}
