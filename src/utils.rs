use std::path::PathBuf;

use reqwest::Url;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

/// Turns typed or pasted text into candidate paths.
///
/// Terminals deliver dropped files as pasted text: several paths on one line
/// separated by spaces, each quoted or with escaped spaces, or `file://` URLs.
/// Each line is split into shell words; a line with unbalanced quotes is kept
/// whole.
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(|line| shell_words::split(line).unwrap_or_else(|_| vec![line.to_string()]))
        .filter(|word| !word.is_empty())
        .map(|word| to_local_path(&word))
        .collect()
}

fn to_local_path(word: &str) -> PathBuf {
    if word.starts_with("file://") {
        if let Some(path) = Url::parse(word).ok().and_then(|url| url.to_file_path().ok()) {
            return path;
        }
    }
    PathBuf::from(shellexpand::tilde(word).as_ref())
}

pub fn calculate_max_scroll(content_lines: usize, view_height: u16) -> u16 {
    let content_lines = u16::try_from(content_lines).unwrap_or(u16::MAX);
    content_lines.saturating_sub(view_height)
}
