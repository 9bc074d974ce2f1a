use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;
use crate::models::{FocusArea, InputMode};
use crate::utils::parse_dropped_paths;

/// Handles one key press. Returns `Ok(false)` when the application should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return Ok(false);
    }
    if ctrl && key.code == KeyCode::Char('s') {
        app.submit();
        return Ok(true);
    }

    match app.mode.clone() {
        InputMode::PathEntry(buffer) => handle_path_entry(app, key, buffer),
        InputMode::EditingPrompt => handle_prompt_edit(app, key, ctrl),
        InputMode::Normal => return handle_normal(app, key, ctrl),
    }
    Ok(true)
}

/// Bracketed paste: terminals deliver dragged files this way.
pub fn handle_paste(app: &mut App, text: &str) {
    if let InputMode::PathEntry(buffer) = &mut app.mode {
        buffer.push_str(text.trim_end_matches(['\r', '\n']));
        return;
    }
    if app.mode == InputMode::EditingPrompt {
        for c in text.chars().filter(|c| *c != '\r') {
            app.insert_prompt_char(c);
        }
    } else {
        app.add_paths(parse_dropped_paths(text));
    }
}

fn handle_normal(app: &mut App, key: KeyEvent, ctrl: bool) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => return Ok(false),
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.previous(),
        KeyCode::Char('s') => app.submit(),
        KeyCode::Char('o') | KeyCode::Char('a') => app.mode = InputMode::PathEntry(String::new()),
        KeyCode::Char('p') => {
            app.editor.expanded = !app.editor.expanded;
            app.focus = FocusArea::Prompt;
        }
        KeyCode::Char('r') if ctrl => app.reset_prompt(),
        KeyCode::Char('c') => app.copy_result(),
        _ => match app.focus {
            FocusArea::Files => match key.code {
                KeyCode::Up | KeyCode::Char('k') => app.selected_file = app.selected_file.saturating_sub(1),
                KeyCode::Down | KeyCode::Char('j') => {
                    if app.selected_file + 1 < app.selector.len() {
                        app.selected_file += 1;
                    }
                }
                KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => app.remove_selected_file(),
                KeyCode::Char('x') => app.clear_files(),
                KeyCode::Enter => app.submit(),
                _ => {}
            },
            FocusArea::Prompt => match key.code {
                KeyCode::Char('e') | KeyCode::Enter => {
                    app.editor.expanded = true;
                    app.editor.cursor = app.prompt.get().len();
                    app.mode = InputMode::EditingPrompt;
                }
                _ => {}
            },
            FocusArea::Results => match key.code {
                KeyCode::Up | KeyCode::Char('k') => app.scroll_results(-1),
                KeyCode::Down | KeyCode::Char('j') => app.scroll_results(1),
                KeyCode::PageUp => app.scroll_results(-10),
                KeyCode::PageDown => app.scroll_results(10),
                KeyCode::Home => app.result_scroll = 0,
                _ => {}
            },
        },
    }
    Ok(true)
}

fn handle_path_entry(app: &mut App, key: KeyEvent, mut buffer: String) {
    match key.code {
        KeyCode::Esc => app.mode = InputMode::Normal,
        KeyCode::Enter => {
            app.mode = InputMode::Normal;
            app.add_paths(parse_dropped_paths(&buffer));
        }
        KeyCode::Backspace => {
            buffer.pop();
            app.mode = InputMode::PathEntry(buffer);
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            app.mode = InputMode::PathEntry(buffer);
        }
        _ => {}
    }
}

fn handle_prompt_edit(app: &mut App, key: KeyEvent, ctrl: bool) {
    match key.code {
        KeyCode::Esc => app.mode = InputMode::Normal,
        KeyCode::Char('r') if ctrl => app.reset_prompt(),
        KeyCode::Char(c) => app.insert_prompt_char(c),
        KeyCode::Enter => app.insert_prompt_char('\n'),
        KeyCode::Tab => app.insert_prompt_char('\t'),
        KeyCode::Backspace => app.delete_prompt_char(),
        KeyCode::Left => app.move_prompt_cursor_left(),
        KeyCode::Right => app.move_prompt_cursor_right(),
        KeyCode::Home => app.editor.cursor = 0,
        KeyCode::End => app.editor.cursor = app.prompt.get().len(),
        _ => {}
    }
}
