use tracing::debug;

use crate::models::SelectedFile;

/// A comparison always takes exactly this many quotes.
pub const MAX_FILES: usize = 2;

type ChangeListener = Box<dyn FnMut(&[SelectedFile]) + Send>;

/// What happened to one batch of candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AddOutcome {
    pub accepted: usize,
    pub dropped: usize,
}

/// The working set of quotes: at most two, PDF only.
///
/// Candidates that are not PDFs, or arrive when the set is full, are dropped
/// without an error. The number of dropped candidates is kept as a counter so
/// the filter can be observed without surfacing it in the UI.
#[derive(Default)]
pub struct FileSelector {
    files: Vec<SelectedFile>,
    dropped_total: usize,
    listener: Option<ChangeListener>,
}

impl FileSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the callback that receives the full set after every change.
    pub fn on_change(&mut self, listener: impl FnMut(&[SelectedFile]) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn add(&mut self, candidates: impl IntoIterator<Item = SelectedFile>) -> AddOutcome {
        let mut outcome = AddOutcome::default();
        for candidate in candidates {
            if self.files.len() < MAX_FILES && candidate.is_pdf() {
                debug!(name = %candidate.name, size = candidate.byte_size, "quote accepted");
                self.files.push(candidate);
                outcome.accepted += 1;
            } else {
                debug!(name = %candidate.name, mime = %candidate.mime_type, "candidate dropped");
                outcome.dropped += 1;
            }
        }
        self.dropped_total += outcome.dropped;
        if outcome.accepted > 0 {
            self.notify();
        }
        outcome
    }

    /// Removes the file at `index`; out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<SelectedFile> {
        if index >= self.files.len() {
            return None;
        }
        let removed = self.files.remove(index);
        self.notify();
        Some(removed)
    }

    pub fn clear(&mut self) {
        if self.files.is_empty() {
            return;
        }
        self.files.clear();
        self.notify();
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// True when the set holds exactly the number of quotes a comparison needs.
    pub fn is_ready(&self) -> bool {
        self.files.len() == MAX_FILES
    }

    pub fn dropped_total(&self) -> usize {
        self.dropped_total
    }

    fn notify(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.files);
        }
    }
}
