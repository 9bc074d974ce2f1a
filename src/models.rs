use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::FileError;

pub const PDF_MIME: &str = "application/pdf";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FocusArea {
    Files,
    Prompt,
    Results,
}

impl FocusArea {
    pub fn next(self) -> Self {
        match self {
            FocusArea::Files => FocusArea::Prompt,
            FocusArea::Prompt => FocusArea::Results,
            FocusArea::Results => FocusArea::Files,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FocusArea::Files => FocusArea::Results,
            FocusArea::Prompt => FocusArea::Files,
            FocusArea::Results => FocusArea::Prompt,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum InputMode {
    Normal,
    /// Path prompt is open, holding what has been typed so far.
    PathEntry(String),
    EditingPrompt,
}

/// A quote picked by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub byte_size: u64,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("byte_size", &self.byte_size)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            byte_size: content.len() as u64,
            mime_type: mime_type.into(),
            content,
        }
    }

    /// Reads a file from disk. The MIME type is guessed from the file name,
    /// the same way a browser file input types a picked file.
    pub fn from_path(path: &Path) -> Result<Self, FileError> {
        if !path.is_file() {
            return Err(FileError::NotAFile { path: path.to_path_buf() });
        }
        let content = fs::read(path).map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");
        Ok(Self::new(name, mime_type, content))
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == PDF_MIME
    }

    pub fn size_label(&self) -> String {
        format!("{:.1} kB", self.byte_size as f64 / 1024.0)
    }
}

/// One line of the comparison table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComparisonRow {
    pub aspect: String,
    pub value1: String,
    pub value2: String,
    pub comment: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MissingItems {
    pub quote1: Option<Vec<String>>,
    pub quote2: Option<Vec<String>>,
}

/// Best-effort structured output of the analysis service. Every field is
/// independently optional; nothing here is guaranteed by the service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComparisonResult {
    pub overall_summary: Option<String>,
    pub comparison_rows: Option<Vec<ComparisonRow>>,
    pub notable_differences: Option<Vec<String>>,
    pub missing_items: Option<MissingItems>,
    pub recommendation: Option<String>,
    /// Soft failure reported by the service inside a 2xx response.
    pub error: Option<String>,
}

/// Wire shape of `result`. Field names follow the schema offered to the model.
#[derive(Deserialize, Default)]
struct WireResult {
    comparaison_generale: Option<Value>,
    tableau_comparatif: Option<Value>,
    differences_notables: Option<Value>,
    elements_manquants: Option<Value>,
    recommandation: Option<Value>,
    error: Option<Value>,
}

impl ComparisonResult {
    /// Projects an arbitrary JSON value onto the optional fields. A field of
    /// the wrong type counts as absent; a non-object value yields an empty result.
    pub fn from_value(value: &Value) -> Self {
        let wire: WireResult = if value.is_object() {
            serde_json::from_value(value.clone()).unwrap_or_default()
        } else {
            WireResult::default()
        };

        Self {
            overall_summary: wire.comparaison_generale.as_ref().and_then(scalar_text),
            comparison_rows: wire.tableau_comparatif.as_ref().and_then(rows_of),
            notable_differences: wire.differences_notables.as_ref().and_then(text_list),
            missing_items: wire.elements_manquants.as_ref().and_then(|v| {
                let obj = v.as_object()?;
                Some(MissingItems {
                    quote1: obj.get("devis1").and_then(text_list),
                    quote2: obj.get("devis2").and_then(text_list),
                })
            }),
            recommendation: wire.recommandation.as_ref().and_then(scalar_text),
            error: wire.error.as_ref().and_then(scalar_text),
        }
    }
}

/// Strings as-is, numbers and booleans in their textual form, everything else absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(scalar_text).collect())
}

fn rows_of(value: &Value) -> Option<Vec<ComparisonRow>> {
    let rows = value.as_array()?;
    Some(
        rows.iter()
            .filter_map(Value::as_object)
            .map(|row| {
                let cell = |key: &str| row.get(key).and_then(scalar_text).unwrap_or_default();
                ComparisonRow {
                    aspect: cell("aspect"),
                    value1: cell("devis1"),
                    value2: cell("devis2"),
                    comment: cell("commentaire"),
                }
            })
            .collect(),
    )
}
