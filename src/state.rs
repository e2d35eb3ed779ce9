//! Shared engine handle for a serving boundary.
//!
//! Loading happens strictly before queries are accepted. [`AppState`]
//! holds the active engine behind a lock so a serving layer can probe
//! readiness, and a reload can build an entirely new engine off to the
//! side and swap it in atomically. In-flight readers keep the `Arc` they
//! already cloned out; the live structures are never mutated in place.

use std::sync::{Arc, RwLock};

use crate::engine::Engine;

#[derive(Default)]
pub struct AppState {
    engine: RwLock<Option<Arc<Engine>>>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            engine: RwLock::new(None),
        }
    }

    /// Readiness predicate: true once a corpus has been installed.
    pub fn is_ready(&self) -> bool {
        self.engine.read().unwrap().is_some()
    }

    /// Install a fully built engine, replacing any previous one.
    pub fn install(&self, engine: Engine) {
        *self.engine.write().unwrap() = Some(Arc::new(engine));
    }

    /// The current engine, if loading has completed.
    pub fn engine(&self) -> Option<Arc<Engine>> {
        self.engine.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{LoadReport, LoadStrategy};
    use crate::models::Corpus;

    fn empty_engine() -> Engine {
        Engine::new(
            Corpus::default(),
            LoadReport {
                strategy: LoadStrategy::Unified,
                duration_ms: 0,
                collections: 0,
                records: 0,
                approx_bytes: 0,
                fingerprint: String::new(),
                loaded_at: chrono::Utc::now(),
            },
        )
    }

    #[test]
    fn test_not_ready_before_install() {
        let state = AppState::new();
        assert!(!state.is_ready());
        assert!(state.engine().is_none());
    }

    #[test]
    fn test_ready_after_install() {
        let state = AppState::new();
        state.install(empty_engine());
        assert!(state.is_ready());
        assert!(state.engine().is_some());
    }

    #[test]
    fn test_install_swaps_without_disturbing_readers() {
        let state = AppState::new();
        state.install(empty_engine());
        let held = state.engine().unwrap();

        state.install(empty_engine());
        let fresh = state.engine().unwrap();

        // The reader's engine survives the swap as its own allocation.
        assert!(!Arc::ptr_eq(&held, &fresh));
        assert_eq!(held.total_records(), 0);
    }
}
