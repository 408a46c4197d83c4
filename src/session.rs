use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::detect_types::{Outcome, SelectedFile, UiState};
use crate::models::display_types::{FileLabel, TriggerState};
use crate::services::classifier_client::{ClassifierClient, HttpClassifier};
use crate::surface::UiSurface;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Selection {
    file: Option<SelectedFile>,
    /// Bumped on every selection so late preview reads can tell they are stale.
    generation: u64,
}

/// Shared state of one detector screen: at most one selected file and at most
/// one request in flight.
#[derive(Clone)]
pub struct DetectorSession {
    config: Arc<ClientConfig>,
    client: Arc<dyn ClassifierClient>,
    surface: Arc<dyn UiSurface>,
    selection: Arc<Mutex<Selection>>,
    in_flight: Arc<AtomicBool>,
    last_outcome: Arc<Mutex<Option<Outcome>>>,
}

impl DetectorSession {
    /// Creates the session and paints the initial screen: prompt label,
    /// disabled trigger, hidden result panel.
    pub fn new(
        config: ClientConfig,
        client: Arc<dyn ClassifierClient>,
        surface: Arc<dyn UiSurface>,
    ) -> Self {
        surface.set_file_label(&FileLabel::prompt());
        surface.set_trigger(&TriggerState::disabled());
        surface.set_result_panel(None);

        Self {
            config: Arc::new(config),
            client,
            surface,
            selection: Arc::new(Mutex::new(Selection::default())),
            in_flight: Arc::new(AtomicBool::new(false)),
            last_outcome: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_http(config: ClientConfig, surface: Arc<dyn UiSurface>) -> Result<Self, AppError> {
        let client = HttpClassifier::new(&config)?;
        Ok(Self::new(config, Arc::new(client), surface))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn selected_file(&self) -> Option<SelectedFile> {
        lock(&self.selection).file.clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        lock(&self.last_outcome).clone()
    }

    pub fn ui_state(&self) -> UiState {
        let has_file = lock(&self.selection).file.is_some();
        let last_outcome = lock(&self.last_outcome);
        UiState::derive(has_file, self.is_in_flight(), last_outcome.as_ref())
    }

    pub(crate) fn surface(&self) -> &dyn UiSurface {
        &*self.surface
    }

    pub(crate) fn client(&self) -> &dyn ClassifierClient {
        &*self.client
    }

    /// Replaces the selected file and forgets the previous outcome.
    /// Returns the generation tag for this selection.
    pub(crate) fn replace_selection(&self, file: SelectedFile) -> u64 {
        let generation = {
            let mut selection = lock(&self.selection);
            selection.file = Some(file);
            selection.generation += 1;
            selection.generation
        };
        *lock(&self.last_outcome) = None;
        generation
    }

    /// Runs `apply` only if `generation` is still the current selection.
    /// The selection lock is held meanwhile so a newer selection cannot interleave.
    pub(crate) fn with_current_selection(&self, generation: u64, apply: impl FnOnce()) -> bool {
        let selection = lock(&self.selection);
        if selection.generation != generation {
            return false;
        }
        apply();
        true
    }

    pub(crate) fn record_outcome(&self, outcome: Outcome) {
        *lock(&self.last_outcome) = Some(outcome);
    }

    /// Claims the single in-flight slot and shows the busy trigger.
    /// `None` if a request is already pending.
    pub(crate) fn try_begin_detection(&self) -> Option<InFlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        self.surface.set_trigger(&TriggerState::busy());
        Some(InFlightGuard {
            in_flight: self.in_flight.clone(),
            surface: self.surface.clone(),
        })
    }
}

/// Held for the duration of a request. Dropping it, on any exit path,
/// releases the in-flight slot and restores the idle trigger.
pub(crate) struct InFlightGuard {
    in_flight: Arc<AtomicBool>,
    surface: Arc<dyn UiSurface>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
        self.surface.set_trigger(&TriggerState::idle());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectError;
    use crate::models::detect_types::PredictionResponse;
    use crate::surface::MemorySurface;
    use async_trait::async_trait;

    struct Unused;

    #[async_trait]
    impl ClassifierClient for Unused {
        async fn predict(&self, _file: &SelectedFile) -> Result<PredictionResponse, DetectError> {
            Err(DetectError::transport("unused"))
        }
    }

    fn session() -> (DetectorSession, Arc<MemorySurface>) {
        let surface = Arc::new(MemorySurface::new());
        let session = DetectorSession::new(ClientConfig::default(), Arc::new(Unused), surface.clone());
        (session, surface)
    }

    #[test]
    fn new_session_is_idle() {
        let (session, surface) = session();
        assert_eq!(session.ui_state(), UiState::Idle);
        assert!(session.selected_file().is_none());
        assert!(!surface.snapshot().trigger.enabled);
    }

    #[test]
    fn selection_bumps_generation_and_clears_outcome() {
        let (session, _) = session();
        session.record_outcome(Err(DetectError::NoFileSelected));

        let first = session.replace_selection(SelectedFile::new("a.png", vec![1]));
        let second = session.replace_selection(SelectedFile::new("b.png", vec![2]));

        assert!(second > first);
        assert_eq!(session.selected_file().unwrap().name(), "b.png");
        assert!(session.last_outcome().is_none());
        assert_eq!(session.ui_state(), UiState::FileSelected);
        assert!(!session.with_current_selection(first, || {}));
        assert!(session.with_current_selection(second, || {}));
    }

    #[test]
    fn guard_is_exclusive_and_restores_trigger() {
        let (session, surface) = session();

        let guard = session.try_begin_detection().unwrap();
        assert!(session.try_begin_detection().is_none());
        assert_eq!(session.ui_state(), UiState::Detecting);
        assert_eq!(surface.snapshot().trigger, TriggerState::busy());

        drop(guard);
        assert!(!session.is_in_flight());
        assert_eq!(surface.snapshot().trigger, TriggerState::idle());
    }
}
