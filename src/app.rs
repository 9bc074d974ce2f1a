use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use arboard::Clipboard;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::files::FileSelector;
use crate::models::{FocusArea, InputMode, SelectedFile};
use crate::prompts::PromptStore;
use crate::render::{self, RenderedView};
use crate::submission::SubmissionController;

/// Cursor of the inline prompt editor, as a byte offset into the prompt text.
#[derive(Default)]
pub struct PromptEditor {
    pub expanded: bool,
    pub cursor: usize,
}

pub struct App {
    pub selector: FileSelector,
    pub prompt: PromptStore,
    pub editor: PromptEditor,
    pub controller: SubmissionController,
    pub focus: FocusArea,
    pub mode: InputMode,
    pub selected_file: usize,
    pub result_scroll: u16,
    pub result_max_scroll: u16,
    /// One-line message about the last user action (unreadable path, clipboard...).
    pub notice: Arc<Mutex<Option<String>>>,
    pub tick: usize,
    runtime: Handle,
}

impl App {
    pub fn new(prompt: PromptStore, controller: SubmissionController, runtime: Handle) -> Self {
        let mut selector = FileSelector::new();
        let notice: Arc<Mutex<Option<String>>> = Arc::default();
        {
            // A change of the file set clears the stale precondition message.
            let controller = controller.clone();
            let notice = notice.clone();
            selector.on_change(move |files| {
                debug!(count = files.len(), "file set changed");
                controller.clear_validation_error();
                if let Ok(mut n) = notice.lock() {
                    *n = None;
                }
            });
        }
        Self {
            selector,
            prompt,
            editor: PromptEditor::default(),
            controller,
            focus: FocusArea::Files,
            mode: InputMode::Normal,
            selected_file: 0,
            result_scroll: 0,
            result_max_scroll: 0,
            notice,
            tick: 0,
            runtime,
        }
    }

    pub fn set_notice(&self, text: impl Into<String>) {
        if let Ok(mut n) = self.notice.lock() {
            *n = Some(text.into());
        }
    }

    pub fn notice(&self) -> Option<String> {
        self.notice.lock().ok().and_then(|n| n.clone())
    }

    /// Submit is offered only with exactly two files and nothing in flight.
    pub fn can_submit(&self) -> bool {
        self.selector.is_ready() && !self.controller.is_loading()
    }

    pub fn view(&self) -> RenderedView {
        render::render(&self.controller.state())
    }

    /// Reads each path and offers the readable ones to the selector.
    pub fn add_paths(&mut self, paths: Vec<PathBuf>) {
        let mut candidates = Vec::new();
        let mut unreadable = Vec::new();
        for path in paths {
            match SelectedFile::from_path(&path) {
                Ok(file) => candidates.push(file),
                Err(e) => {
                    debug!(error = %e, "candidate unreadable");
                    unreadable.push(e.to_string());
                }
            }
        }
        let outcome = self.selector.add(candidates);
        info!(
            accepted = outcome.accepted,
            dropped = outcome.dropped,
            dropped_total = self.selector.dropped_total(),
            "candidates offered"
        );
        if let Some(first) = unreadable.first() {
            self.set_notice(first.clone());
        }
        self.clamp_file_cursor();
    }

    pub fn remove_selected_file(&mut self) {
        if self.selector.remove(self.selected_file).is_some() {
            self.clamp_file_cursor();
        }
    }

    pub fn clear_files(&mut self) {
        self.selector.clear();
        self.selected_file = 0;
    }

    fn clamp_file_cursor(&mut self) {
        self.selected_file = self.selected_file.min(self.selector.len().saturating_sub(1));
    }

    pub fn submit(&mut self) {
        if self.controller.is_loading() {
            self.set_notice("A comparison is already running.");
            return;
        }
        // Refusals are recorded by the controller as its validation message.
        if self
            .controller
            .spawn_submit(&self.runtime, self.selector.files(), self.prompt.get())
            .is_ok()
        {
            self.result_scroll = 0;
            self.focus = FocusArea::Results;
        }
    }

    pub fn copy_result(&self) {
        let text = self.view().to_plain_text();
        if text.is_empty() {
            return;
        }
        match Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
            Ok(()) => self.set_notice("Result copied to clipboard."),
            Err(e) => self.set_notice(format!("Clipboard unavailable: {e}")),
        }
    }

    pub fn scroll_results(&mut self, delta: i32) {
        let next = (self.result_scroll as i32 + delta).clamp(0, self.result_max_scroll as i32);
        self.result_scroll = next as u16;
    }

    // Prompt editing. The cursor always sits on a char boundary.

    pub fn insert_prompt_char(&mut self, c: char) {
        let mut text = self.prompt.get().to_string();
        let at = self.editor.cursor.min(text.len());
        text.insert(at, c);
        self.prompt.set(text);
        self.editor.cursor = at + c.len_utf8();
    }

    pub fn delete_prompt_char(&mut self) {
        let mut text = self.prompt.get().to_string();
        let at = self.editor.cursor.min(text.len());
        if let Some((start, _)) = text[..at].char_indices().next_back() {
            text.remove(start);
            self.prompt.set(text);
            self.editor.cursor = start;
        }
    }

    pub fn move_prompt_cursor_left(&mut self) {
        let text = self.prompt.get();
        let at = self.editor.cursor.min(text.len());
        if let Some((start, _)) = text[..at].char_indices().next_back() {
            self.editor.cursor = start;
        }
    }

    pub fn move_prompt_cursor_right(&mut self) {
        let text = self.prompt.get();
        let at = self.editor.cursor.min(text.len());
        if let Some(c) = text[at..].chars().next() {
            self.editor.cursor = at + c.len_utf8();
        }
    }

    pub fn reset_prompt(&mut self) {
        self.prompt.reset();
        self.editor.cursor = self.prompt.get().len();
    }
}
