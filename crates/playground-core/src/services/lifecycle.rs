//! Engine lifecycle controller.
//!
//! Owns at most one engine handle and drives it through
//! `Unloaded → Loading → Ready | Failed`. Reloading while `Ready` restarts
//! the cycle and discards the previous handle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::domain::{EngineLifecycleState, SamplingConfig};
use crate::errors::SessionError;
use crate::events::{LifecycleEvents, NoopLifecycleEvents};
use crate::ports::{EngineFactory, InferenceEngine, ProgressSink};

#[derive(Default)]
struct Slot {
    state: EngineLifecycleState,
    handle: Option<Arc<dyn InferenceEngine>>,
    /// Incremented on every accepted load so stale callbacks can be ignored.
    attempt: u64,
}

struct Shared {
    slot: Mutex<Slot>,
    events: Arc<dyn LifecycleEvents>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `mutate` to the slot and, if it reports a change, notify
    /// observers with the new state. Observers run outside the lock.
    fn update(&self, mutate: impl FnOnce(&mut Slot) -> bool) -> bool {
        let next = {
            let mut slot = self.lock();
            if !mutate(&mut slot) {
                return false;
            }
            slot.state.clone()
        };
        self.events.transitioned(&next);
        true
    }

    /// Finish load `attempt` if it is still the one in flight.
    fn finish(
        &self,
        attempt: u64,
        state: EngineLifecycleState,
        handle: Option<Arc<dyn InferenceEngine>>,
    ) -> bool {
        self.update(|slot| {
            if slot.attempt != attempt || !slot.state.is_loading() {
                return false;
            }
            slot.state = state;
            slot.handle = handle;
            true
        })
    }
}

/// Updates `Loading { progress }` and forwards the text to the caller's sink.
struct ProgressRelay {
    shared: Arc<Shared>,
    attempt: u64,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressSink for ProgressRelay {
    fn report(&self, text: &str) {
        let attempt = self.attempt;
        self.shared.update(|slot| {
            if slot.attempt != attempt || !slot.state.is_loading() {
                return false;
            }
            slot.state = EngineLifecycleState::Loading {
                progress: text.to_string(),
            };
            true
        });
        self.sink.report(text);
    }
}

/// Scope guard that fails the load if its future is dropped before the
/// engine answered.
struct LoadGuard<'a> {
    shared: &'a Shared,
    attempt: u64,
    armed: bool,
}

impl LoadGuard<'_> {
    const fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!(attempt = self.attempt, "Model load abandoned before completion");
            self.shared.finish(
                self.attempt,
                EngineLifecycleState::Failed {
                    reason: "load abandoned".to_string(),
                },
                None,
            );
        }
    }
}

/// Controller for the single engine handle of a session.
pub struct EngineLifecycle {
    factory: Arc<dyn EngineFactory>,
    shared: Arc<Shared>,
}

impl EngineLifecycle {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self::with_events(factory, Arc::new(NoopLifecycleEvents))
    }

    /// Create a controller that reports every transition to `events`.
    pub fn with_events(factory: Arc<dyn EngineFactory>, events: Arc<dyn LifecycleEvents>) -> Self {
        Self {
            factory,
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot::default()),
                events,
            }),
        }
    }

    /// Load `model_id` into a fresh engine handle.
    ///
    /// Fails fast with [`SessionError::AlreadyLoading`] while another load is
    /// in flight. Otherwise the previous handle is discarded, the state moves
    /// to `Loading("")`, and engine progress text is relayed to `progress`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyLoading`] or
    /// [`SessionError::EngineLoadFailure`]; after the latter the state is
    /// `Failed`.
    pub async fn load(
        &self,
        model_id: &str,
        sampling: SamplingConfig,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<(), SessionError> {
        let mut attempt = 0;
        let accepted = self.shared.update(|slot| {
            if slot.state.is_loading() {
                return false;
            }
            slot.attempt += 1;
            slot.state = EngineLifecycleState::Loading {
                progress: String::new(),
            };
            slot.handle = None;
            attempt = slot.attempt;
            true
        });
        if !accepted {
            warn!(model_id = %model_id, "Load rejected: another load is in flight");
            return Err(SessionError::AlreadyLoading);
        }

        info!(
            model_id = %model_id,
            temperature = sampling.temperature,
            top_p = sampling.top_p,
            "Loading model"
        );

        let mut guard = LoadGuard {
            shared: &self.shared,
            attempt,
            armed: true,
        };
        let engine = self.factory.create_engine();
        let relay: Arc<dyn ProgressSink> = Arc::new(ProgressRelay {
            shared: Arc::clone(&self.shared),
            attempt,
            sink: progress,
        });

        let result = engine.reload(model_id, sampling, relay).await;
        guard.disarm();

        match result {
            Ok(()) => {
                self.shared.finish(
                    attempt,
                    EngineLifecycleState::Ready {
                        model_id: model_id.to_string(),
                    },
                    Some(engine),
                );
                info!(model_id = %model_id, "Model ready");
                Ok(())
            }
            Err(e) => {
                warn!(model_id = %model_id, error = %e, "Model load failed");
                self.shared.finish(
                    attempt,
                    EngineLifecycleState::Failed {
                        reason: e.to_string(),
                    },
                    None,
                );
                Err(SessionError::EngineLoadFailure(e.to_string()))
            }
        }
    }

    /// The engine handle, only while the state is `Ready`.
    pub fn current_handle(&self) -> Option<Arc<dyn InferenceEngine>> {
        let slot = self.shared.lock();
        if slot.state.is_ready() {
            slot.handle.clone()
        } else {
            None
        }
    }

    pub fn state(&self) -> EngineLifecycleState {
        self.shared.lock().state.clone()
    }

    /// The loaded model, if ready.
    pub fn model_id(&self) -> Option<String> {
        self.shared.lock().state.model_id().map(str::to_string)
    }

    /// Query the engine's catalog of loadable models.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::StreamFailure`] if the engine cannot be queried.
    pub async fn available_models(&self) -> Result<Vec<String>, SessionError> {
        let models = self
            .factory
            .list_available_models()
            .await
            .map_err(|e| SessionError::StreamFailure(e.to_string()))?;
        debug!(count = models.len(), "Fetched model catalog");
        Ok(models)
    }
}

impl std::fmt::Debug for EngineLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineLifecycle")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{EngineError, MockEngineFactory, MockInferenceEngine, NoopProgress};

    fn factory_with(engine: MockInferenceEngine) -> Arc<dyn EngineFactory> {
        let engine: Arc<dyn InferenceEngine> = Arc::new(engine);
        let mut factory = MockEngineFactory::new();
        factory
            .expect_create_engine()
            .returning(move || Arc::clone(&engine));
        Arc::new(factory)
    }

    struct Recorder(Mutex<Vec<EngineLifecycleState>>);

    impl LifecycleEvents for Recorder {
        fn transitioned(&self, state: &EngineLifecycleState) {
            self.0.lock().unwrap().push(state.clone());
        }
    }

    #[tokio::test]
    async fn test_load_relays_progress_and_becomes_ready() {
        let mut engine = MockInferenceEngine::new();
        engine
            .expect_reload()
            .times(1)
            .returning(|model_id, sampling, progress| {
                assert_eq!(model_id, "Llama-3-8B-Instruct-q4f16_1-MLC");
                assert!((sampling.top_p - 1.0).abs() < f32::EPSILON);
                progress.report("Fetching param cache[1/2]");
                progress.report("Fetching param cache[2/2]");
                Ok(())
            });

        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let lifecycle = EngineLifecycle::with_events(factory_with(engine), recorder.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink: Arc<dyn ProgressSink> =
            Arc::new(move |text: &str| sink_seen.lock().unwrap().push(text.to_string()));

        lifecycle
            .load("Llama-3-8B-Instruct-q4f16_1-MLC", SamplingConfig::default(), sink)
            .await
            .unwrap();

        assert_eq!(
            lifecycle.model_id().as_deref(),
            Some("Llama-3-8B-Instruct-q4f16_1-MLC")
        );
        assert!(lifecycle.current_handle().is_some());
        assert_eq!(seen.lock().unwrap().len(), 2);

        let states = recorder.0.lock().unwrap();
        assert_eq!(
            states.first(),
            Some(&EngineLifecycleState::Loading {
                progress: String::new()
            })
        );
        assert_eq!(
            states[2],
            EngineLifecycleState::Loading {
                progress: "Fetching param cache[2/2]".to_string()
            }
        );
        assert!(states.last().is_some_and(EngineLifecycleState::is_ready));
    }

    #[tokio::test]
    async fn test_load_failure_is_surfaced_and_recorded() {
        let mut engine = MockInferenceEngine::new();
        engine
            .expect_reload()
            .returning(|id, _, _| Err(EngineError::ModelNotFound(id.to_string())));

        let lifecycle = EngineLifecycle::new(factory_with(engine));
        let err = lifecycle
            .load("nope-q4-MLC", SamplingConfig::default(), Arc::new(NoopProgress))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::EngineLoadFailure(ref r) if r.contains("nope-q4-MLC")));
        assert!(matches!(lifecycle.state(), EngineLifecycleState::Failed { .. }));
        assert!(lifecycle.current_handle().is_none());
    }

    #[tokio::test]
    async fn test_reload_creates_a_fresh_handle() {
        let mut factory = MockEngineFactory::new();
        factory.expect_create_engine().times(2).returning(|| {
            let mut engine = MockInferenceEngine::new();
            engine.expect_reload().returning(|_, _, _| Ok(()));
            Arc::new(engine) as Arc<dyn InferenceEngine>
        });
        let lifecycle = EngineLifecycle::new(Arc::new(factory));

        lifecycle
            .load("phi-2-q4f16_1-MLC", SamplingConfig::default(), Arc::new(NoopProgress))
            .await
            .unwrap();
        let first = lifecycle.current_handle().unwrap();

        lifecycle
            .load("gemma-2b-it-q4f16_1-MLC", SamplingConfig::default(), Arc::new(NoopProgress))
            .await
            .unwrap();
        let second = lifecycle.current_handle().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(lifecycle.model_id().as_deref(), Some("gemma-2b-it-q4f16_1-MLC"));
    }

    #[test]
    fn test_starts_unloaded_without_handle() {
        let lifecycle = EngineLifecycle::new(Arc::new(MockEngineFactory::new()));
        assert_eq!(lifecycle.state(), EngineLifecycleState::Unloaded);
        assert!(lifecycle.current_handle().is_none());
    }

    #[tokio::test]
    async fn test_available_models_maps_errors() {
        let mut factory = MockEngineFactory::new();
        factory
            .expect_list_available_models()
            .returning(|| Err(EngineError::Request("connection refused".to_string())));
        let lifecycle = EngineLifecycle::new(Arc::new(factory));

        let err = lifecycle.available_models().await.unwrap_err();
        assert!(matches!(err, SessionError::StreamFailure(_)));
    }
}
