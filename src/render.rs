//! Projection of the submission state onto what the results pane shows.
//!
//! Nothing here does I/O. Each section of a result is checked on its own:
//! no two fields are assumed to be present together.

use crate::models::{ComparisonResult, ComparisonRow};
use crate::submission::SubmissionState;

pub const LOADING_MESSAGE: &str = "Analysis in progress, please wait...";
pub const LOADING_ADVISORY: &str = "Analysing your quotes can take up to a minute depending on their complexity.";
pub const SOFT_ERROR_TITLE: &str = "An error occurred";
pub const NO_MISSING_ITEMS: &str = "No missing items";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MissingList {
    /// Absent or empty on the service side; shown as a placeholder.
    Placeholder,
    Items(Vec<String>),
}

impl MissingList {
    fn from_items(items: Option<&Vec<String>>) -> Self {
        match items {
            Some(items) if !items.is_empty() => MissingList::Items(items.clone()),
            _ => MissingList::Placeholder,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Section {
    Summary(String),
    Table(Vec<ComparisonRow>),
    Differences(Vec<String>),
    Missing { quote1: MissingList, quote2: MissingList },
    Recommendation(String),
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::Summary(_) => "Overall comparison",
            Section::Table(_) => "Comparison table",
            Section::Differences(_) => "Notable differences",
            Section::Missing { .. } => "Missing items",
            Section::Recommendation(_) => "Recommendation",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedView {
    Empty,
    Loading,
    Error(String),
    Report(Vec<Section>),
}

pub fn render(state: &SubmissionState) -> RenderedView {
    match state {
        SubmissionState::Idle => RenderedView::Empty,
        SubmissionState::Loading => RenderedView::Loading,
        SubmissionState::Failed(message) => RenderedView::Error(message.clone()),
        SubmissionState::Succeeded(None) => RenderedView::Empty,
        SubmissionState::Succeeded(Some(result)) => render_result(result),
    }
}

fn non_empty(text: &Option<String>) -> Option<&String> {
    text.as_ref().filter(|t| !t.is_empty())
}

fn render_result(result: &ComparisonResult) -> RenderedView {
    if let Some(error) = non_empty(&result.error) {
        return RenderedView::Error(error.clone());
    }

    let mut sections = Vec::new();
    if let Some(summary) = non_empty(&result.overall_summary) {
        sections.push(Section::Summary(summary.clone()));
    }
    if let Some(rows) = result.comparison_rows.as_ref().filter(|r| !r.is_empty()) {
        sections.push(Section::Table(rows.clone()));
    }
    if let Some(diffs) = result.notable_differences.as_ref().filter(|d| !d.is_empty()) {
        sections.push(Section::Differences(diffs.clone()));
    }
    if let Some(missing) = &result.missing_items {
        sections.push(Section::Missing {
            quote1: MissingList::from_items(missing.quote1.as_ref()),
            quote2: MissingList::from_items(missing.quote2.as_ref()),
        });
    }
    if let Some(recommendation) = non_empty(&result.recommendation) {
        sections.push(Section::Recommendation(recommendation.clone()));
    }
    RenderedView::Report(sections)
}

impl RenderedView {
    /// Plain-text form of the view, used for the clipboard.
    pub fn to_plain_text(&self) -> String {
        match self {
            RenderedView::Empty => String::new(),
            RenderedView::Loading => format!("{LOADING_MESSAGE}\n{LOADING_ADVISORY}"),
            RenderedView::Error(message) => format!("{SOFT_ERROR_TITLE}: {message}"),
            RenderedView::Report(sections) => {
                let mut out = Vec::new();
                for section in sections {
                    out.push(format!("## {}", section.title()));
                    match section {
                        Section::Summary(text) | Section::Recommendation(text) => out.push(text.clone()),
                        Section::Table(rows) => {
                            out.push("Aspect | Quote 1 | Quote 2 | Comment".into());
                            for row in rows {
                                out.push(format!("{} | {} | {} | {}", row.aspect, row.value1, row.value2, row.comment));
                            }
                        }
                        Section::Differences(items) => {
                            out.extend(items.iter().enumerate().map(|(i, d)| format!("{}. {d}", i + 1)));
                        }
                        Section::Missing { quote1, quote2 } => {
                            for (label, list) in [("Quote 1", quote1), ("Quote 2", quote2)] {
                                out.push(format!("{label}:"));
                                match list {
                                    MissingList::Placeholder => out.push(format!("  {NO_MISSING_ITEMS}")),
                                    MissingList::Items(items) => out.extend(items.iter().map(|i| format!("  - {i}"))),
                                }
                            }
                        }
                    }
                    out.push(String::new());
                }
                out.join("\n").trim_end().to_string()
            }
        }
    }
}
