//! Debounced autocomplete.
//!
//! Each [`SuggestionFetcher::set_query`] bumps a generation counter and spawns
//! a task that sleeps for the debounce delay. The task only calls the backend
//! if its generation is still the latest when the timer fires, and only
//! commits the answer if it is still the latest when the answer arrives. A
//! slow early request can therefore never overwrite the suggestions of a
//! later one.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};

use crate::{
    api::SearchBackend,
    types::{SuggestionItem, MIN_QUERY_LEN},
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// What the dropdown should show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionState {
    pub query: String,
    pub items: Vec<SuggestionItem>,
    pub loading: bool,
    pub visible: bool,
    pub error: Option<String>,
}

impl SuggestionState {
    pub fn has_results(&self) -> bool {
        !self.items.is_empty()
    }
}

pub struct SuggestionFetcher<B: SearchBackend + ?Sized> {
    backend: Arc<B>,
    delay: Duration,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<SuggestionState>>,
}

impl<B: SearchBackend + ?Sized> Clone for SuggestionFetcher<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            delay: self.delay,
            generation: Arc::clone(&self.generation),
            state: Arc::clone(&self.state),
        }
    }
}

impl<B: SearchBackend + ?Sized + 'static> SuggestionFetcher<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_delay(backend, DEFAULT_DEBOUNCE)
    }

    pub fn with_delay(backend: Arc<B>, delay: Duration) -> Self {
        let (state, _) = watch::channel(SuggestionState::default());
        Self {
            backend,
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> SuggestionState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every visible change.
    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.state.subscribe()
    }

    /// Invalidate any scheduled or in-flight fetch.
    fn supersede(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Record new input and schedule a fetch after the debounce delay.
    ///
    /// Must be called from within a tokio runtime. The returned handle
    /// resolves once the scheduled work has finished or been superseded.
    pub fn set_query(&self, text: impl Into<String>) -> JoinHandle<()> {
        let text = text.into();
        let generation = self.supersede();
        self.state.send_modify(|s| s.query = text.clone());

        let backend = Arc::clone(&self.backend);
        let latest = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let is_current = || latest.load(Ordering::SeqCst) == generation;
            if !is_current() {
                tracing::trace!(generation, "debounce timer superseded");
                return;
            }

            let query = text.trim();
            if query.chars().count() < MIN_QUERY_LEN {
                state.send_if_modified(|s| {
                    if !is_current() {
                        return false;
                    }
                    s.items.clear();
                    s.visible = false;
                    s.loading = false;
                    true
                });
                return;
            }

            state.send_if_modified(|s| {
                if !is_current() {
                    return false;
                }
                s.loading = true;
                s.error = None;
                true
            });

            let outcome = backend.autocomplete(query).await;

            state.send_if_modified(|s| {
                if !is_current() {
                    tracing::debug!(generation, query, "discarding stale suggestions");
                    return false;
                }
                s.loading = false;
                match outcome {
                    Ok(items) => {
                        tracing::debug!(generation, count = items.len(), "suggestions updated");
                        s.items = items;
                        s.visible = true;
                        s.error = None;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "autocomplete failed");
                        s.items.clear();
                        s.visible = false;
                        s.error = Some(e.to_string());
                    }
                }
                true
            });
        })
    }

    /// Pick a suggestion: its text becomes the query and the dropdown closes.
    ///
    /// No search is started here; that is up to the caller.
    pub fn select_result(&self, item: SuggestionItem) -> SuggestionItem {
        self.supersede();
        self.state.send_modify(|s| {
            s.query = item.text.clone();
            s.visible = false;
            s.loading = false;
        });
        item
    }

    pub fn clear(&self) {
        self.supersede();
        self.state.send_modify(|s| *s = SuggestionState::default());
    }

    pub fn hide(&self) {
        self.state.send_if_modified(|s| std::mem::replace(&mut s.visible, false));
    }

    pub fn show(&self) {
        self.state.send_if_modified(|s| !std::mem::replace(&mut s.visible, true));
    }
}
