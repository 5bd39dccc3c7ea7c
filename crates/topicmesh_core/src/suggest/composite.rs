//! Fan-out over several suggestion backends.

use crate::model::entity::TopicSuggestion;
use crate::suggest::{BackendError, SuggestRequest, SuggestionBackend};
use log::warn;

/// Runs every backend and concatenates what they propose.
///
/// A failing backend is logged and skipped. The composite fails only when
/// every backend fails.
pub struct CompositeSuggester<'a> {
    backends: Vec<Box<dyn SuggestionBackend + 'a>>,
}

impl<'a> CompositeSuggester<'a> {
    pub fn new(backends: Vec<Box<dyn SuggestionBackend + 'a>>) -> Self {
        Self { backends }
    }

    pub fn push(&mut self, backend: impl SuggestionBackend + 'a) {
        self.backends.push(Box::new(backend));
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl SuggestionBackend for CompositeSuggester<'_> {
    fn suggest(&self, request: &SuggestRequest) -> Result<Vec<TopicSuggestion>, BackendError> {
        let mut suggestions = Vec::new();
        let mut last_error = None;
        let mut succeeded = 0usize;

        for (position, backend) in self.backends.iter().enumerate() {
            match backend.suggest(request) {
                Ok(found) => {
                    succeeded += 1;
                    suggestions.extend(found);
                }
                Err(err) => {
                    warn!(
                        "event=suggest_backend module=suggest status=degraded backend={position} error={err}"
                    );
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) if succeeded == 0 => Err(err),
            _ => Ok(suggestions),
        }
    }
}
