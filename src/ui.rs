use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use textwrap::core::display_width;

use crate::app::App;
use crate::files::MAX_FILES;
use crate::models::{ComparisonRow, FocusArea, InputMode};
use crate::render::{
    LOADING_ADVISORY, LOADING_MESSAGE, MissingList, NO_MISSING_ITEMS, RenderedView, SOFT_ERROR_TITLE, Section,
};
use crate::submission::Completion;
use crate::theme::Theme;
use crate::utils::{calculate_max_scroll, spinner_frame};

const COLUMN_SEPARATOR: &str = " │ ";

/// Draws the whole screen.
pub fn draw(f: &mut Frame, app: &mut App, theme: &Theme) {
    let prompt_height = if app.editor.expanded { 12 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                     // title
            Constraint::Length(MAX_FILES as u16 + 4), // files
            Constraint::Length(prompt_height),         // prompt
            Constraint::Length(1),                     // submit bar
            Constraint::Min(5),                        // results
            Constraint::Length(1),                     // footer
        ])
        .split(f.area());

    let title = Paragraph::new(Line::from(vec![
        Span::styled("QUOTE COMPARATOR", theme.title),
        Span::styled("  renovation quotes, side by side", Style::default().fg(theme.text_secondary)),
    ]));
    f.render_widget(title, chunks[0]);

    render_files(f, app, theme, chunks[1]);
    render_prompt(f, app, theme, chunks[2]);
    render_submit_bar(f, app, theme, chunks[3]);
    render_results(f, app, theme, chunks[4]);

    let help = match app.mode {
        InputMode::PathEntry(_) => "Enter add | Esc cancel",
        InputMode::EditingPrompt => "Esc stop editing | Ctrl+R restore default | Ctrl+S compare",
        InputMode::Normal => {
            "Tab focus | o add file | d remove | x clear | p prompt | e edit | s compare | ↑/↓ scroll | c copy result | q quit"
        }
    };
    f.render_widget(Paragraph::new(help).style(theme.footer), chunks[5]);

    if let InputMode::PathEntry(buffer) = &app.mode {
        render_path_popup(f, buffer, theme);
    }
}

fn render_files(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let focused = app.focus == FocusArea::Files;
    let block = Block::default()
        .title(format!("Quotes (PDF) {}/{}", app.selector.len(), MAX_FILES))
        .title_bottom(Line::from(" o add · d remove · or drop files onto the terminal ").style(theme.footer))
        .borders(Borders::ALL)
        .border_style(theme.border(focused));

    if app.selector.is_empty() {
        let placeholder = Paragraph::new(vec![
            Line::from("Drop your PDF quotes here, or press o to enter a path."),
            Line::from(Span::styled(format!("(maximum {MAX_FILES} files)"), theme.placeholder)),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = app
        .selector
        .files()
        .iter()
        .enumerate()
        .map(|(i, file)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("Quote {} ", i + 1), Style::default().fg(theme.text_secondary)),
                Span::styled(file.name.clone(), theme.file_name),
                Span::styled(format!("  {}", file.size_label()), theme.file_size),
            ]))
        })
        .collect();
    let mut state = ListState::default();
    if focused {
        state.select(Some(app.selected_file));
    }
    let list = List::new(items)
        .block(block)
        .highlight_symbol("→ ")
        .highlight_style(Style::default().fg(theme.text_highlight).add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_prompt(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let focused = app.focus == FocusArea::Prompt;
    let modified = if app.prompt.is_modified() { " (modified)" } else { "" };
    let block = Block::default()
        .title(format!("Customize the prompt (advanced){modified}"))
        .borders(Borders::ALL)
        .border_style(theme.border(focused));

    if !app.editor.expanded {
        let hint = Paragraph::new(Span::styled("p show", theme.placeholder)).block(block);
        f.render_widget(hint, area);
        return;
    }

    let block = block.title_bottom(
        Line::from(" This prompt guides the analysis of the quotes · e edit · Esc done · Ctrl+R default ")
            .style(theme.footer),
    );
    let inner = block.inner(area);
    let text = app.prompt.get();
    let cursor = app.editor.cursor.min(text.len());
    let before = &text[..cursor];
    let line = before.matches('\n').count() as u16;
    let col = display_width(before.rsplit('\n').next().unwrap_or("")) as u16;
    let scroll_y = line.saturating_sub(inner.height.saturating_sub(1));
    let scroll_x = col.saturating_sub(inner.width.saturating_sub(1));

    let editor = Paragraph::new(text)
        .style(Style::default().fg(theme.text))
        .block(block)
        .scroll((scroll_y, scroll_x));
    f.render_widget(editor, area);

    if app.mode == InputMode::EditingPrompt {
        f.set_cursor_position((inner.x + col - scroll_x, inner.y + line - scroll_y));
    }
}

fn render_submit_bar(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(1)])
        .split(area);

    let (label, style) = if app.controller.is_loading() {
        (format!(" {} Analysing...", spinner_frame(app.tick)), theme.submit_disabled)
    } else if app.can_submit() {
        (" ▶ Compare quotes (s)".to_string(), theme.submit_enabled)
    } else {
        (" Compare quotes".to_string(), theme.submit_disabled)
    };
    f.render_widget(Paragraph::new(label).style(style), columns[0]);

    let message = if let Some(error) = app.controller.validation_error() {
        Some(Span::styled(error, theme.error))
    } else {
        app.notice().map(|n| Span::styled(n, theme.notice))
    };
    if let Some(message) = message {
        f.render_widget(Paragraph::new(Line::from(vec![Span::raw(" "), message])), columns[1]);
    }
}

fn render_results(f: &mut Frame, app: &mut App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .title("Result")
        .borders(Borders::ALL)
        .border_style(theme.border(app.focus == FocusArea::Results));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let view = app.view();
    let text_width = inner.width.saturating_sub(1).max(1) as usize;
    let lines = view_lines(&view, app.controller.completion().as_ref(), text_width, app.tick, theme);

    app.result_max_scroll = calculate_max_scroll(lines.len(), inner.height);
    app.result_scroll = app.result_scroll.min(app.result_max_scroll);

    let content_len = lines.len();
    let paragraph = Paragraph::new(lines).scroll((app.result_scroll, 0));
    f.render_widget(paragraph, inner);

    if app.result_max_scroll > 0 {
        let mut state = ScrollbarState::new(content_len).position(app.result_scroll as usize);
        f.render_stateful_widget(Scrollbar::new(ScrollbarOrientation::VerticalRight), inner, &mut state);
    }
}

fn render_path_popup(f: &mut Frame, buffer: &str, theme: &Theme) {
    let area = centered_rect(70, 3, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title("Add a quote: type a path or drop a file")
        .borders(Borders::ALL)
        .style(theme.popup_border);
    let inner = block.inner(area);
    let visible = display_width(buffer) as u16;
    let scroll_x = visible.saturating_sub(inner.width.saturating_sub(1));
    let para = Paragraph::new(buffer)
        .style(Style::default().fg(theme.text))
        .block(block)
        .scroll((0, scroll_x));
    f.render_widget(para, area);
    f.set_cursor_position((inner.x + visible - scroll_x, inner.y));
}

/// All lines of the results pane for a given width.
pub fn view_lines(
    view: &RenderedView,
    completion: Option<&Completion>,
    width: usize,
    tick: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    match view {
        RenderedView::Empty => {}
        RenderedView::Loading => {
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", spinner_frame(tick)), Style::default().fg(theme.focus_border)),
                Span::raw(LOADING_MESSAGE),
            ]));
            lines.push(Line::default());
            push_wrapped(&mut lines, LOADING_ADVISORY, width, Style::default().fg(theme.text_secondary));
        }
        RenderedView::Error(message) => {
            lines.push(Line::styled(SOFT_ERROR_TITLE, theme.error.add_modifier(Modifier::BOLD)));
            push_wrapped(&mut lines, message, width, theme.error);
        }
        RenderedView::Report(sections) => {
            lines.push(Line::styled("Analysis result", theme.title));
            if let Some(done) = completion {
                let id = done.comparison_id.as_deref().unwrap_or("-");
                lines.push(Line::styled(
                    format!("comparison {id} · {}", done.at.format("%Y-%m-%d %H:%M:%S")),
                    theme.file_size,
                ));
            }
            for section in sections {
                lines.push(Line::default());
                section_lines(&mut lines, section, width, theme);
            }
        }
    }
    lines
}

fn section_lines(lines: &mut Vec<Line<'static>>, section: &Section, width: usize, theme: &Theme) {
    let title_style = match section {
        Section::Recommendation(_) => theme.recommendation.add_modifier(Modifier::BOLD),
        _ => theme.section_title,
    };
    lines.push(Line::styled(section.title(), title_style));

    let body = Style::default().fg(theme.text);
    match section {
        Section::Summary(text) => push_wrapped(lines, text, width, body),
        Section::Table(rows) => table_lines(lines, rows, width, theme),
        Section::Differences(items) => {
            for (i, item) in items.iter().enumerate() {
                let marker = format!("{}. ", i + 1);
                let indent = " ".repeat(marker.len());
                let options = textwrap::Options::new(width)
                    .initial_indent(&marker)
                    .subsequent_indent(&indent);
                for part in textwrap::wrap(item, options) {
                    lines.push(Line::styled(part.into_owned(), body));
                }
            }
        }
        Section::Missing { quote1, quote2 } => {
            for (label, list) in [("Quote 1", quote1), ("Quote 2", quote2)] {
                lines.push(Line::styled(label, Style::default().fg(theme.text_secondary).add_modifier(Modifier::BOLD)));
                match list {
                    MissingList::Placeholder => lines.push(Line::styled(format!("  {NO_MISSING_ITEMS}"), theme.placeholder)),
                    MissingList::Items(items) => {
                        for item in items {
                            let options = textwrap::Options::new(width).initial_indent("  • ").subsequent_indent("    ");
                            for part in textwrap::wrap(item, options) {
                                lines.push(Line::styled(part.into_owned(), body));
                            }
                        }
                    }
                }
            }
        }
        Section::Recommendation(text) => {
            let options = textwrap::Options::new(width).initial_indent("▌ ").subsequent_indent("▌ ");
            for part in textwrap::wrap(text, options) {
                lines.push(Line::styled(part.into_owned(), theme.recommendation));
            }
        }
    }
}

fn push_wrapped(lines: &mut Vec<Line<'static>>, text: &str, width: usize, style: Style) {
    for part in textwrap::wrap(text, width.max(1)) {
        lines.push(Line::styled(part.into_owned(), style));
    }
}

/// Four fixed columns; long cells wrap inside their column.
fn table_lines(lines: &mut Vec<Line<'static>>, rows: &[ComparisonRow], width: usize, theme: &Theme) {
    let available = width.saturating_sub(3 * display_width(COLUMN_SEPARATOR)).max(16);
    let widths = [20, 25, 25, 30].map(|pct| (available * pct / 100).max(4));

    let header = ["Aspect", "Quote 1", "Quote 2", "Comment"];
    push_table_row(lines, header, widths, theme.table_header);

    for (i, row) in rows.iter().enumerate() {
        let mut style = Style::default().fg(theme.text);
        if i % 2 == 1 {
            style = style.bg(theme.row_alt_bg);
        }
        let cells = [row.aspect.as_str(), row.value1.as_str(), row.value2.as_str(), row.comment.as_str()];
        push_table_row(lines, cells, widths, style);
    }
}

fn push_table_row(lines: &mut Vec<Line<'static>>, cells: [&str; 4], widths: [usize; 4], style: Style) {
    let wrapped: Vec<Vec<String>> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| textwrap::wrap(cell, w).into_iter().map(|c| c.into_owned()).collect())
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(0).max(1);

    for line_idx in 0..height {
        let mut text = String::new();
        for (col, w) in widths.iter().enumerate() {
            if col > 0 {
                text.push_str(COLUMN_SEPARATOR);
            }
            let part = wrapped[col].get(line_idx).map(String::as_str).unwrap_or("");
            text.push_str(part);
            text.push_str(&" ".repeat(w.saturating_sub(display_width(part))));
        }
        lines.push(Line::styled(text, style));
    }
}

/// A rectangle `percent_x` wide and `height` rows tall, centered in `r`.
pub fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(height), Constraint::Fill(1)])
        .split(r)[1];
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical)[1]
}
