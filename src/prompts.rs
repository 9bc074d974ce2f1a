// Analysis prompt sent along with the two quotes.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Instructions plus the JSON layout the result view knows how to display.
pub const DEFAULT_PROMPT: &str = r#"
Analyse les deux devis suivants et fournis une comparaison détaillée :
1. Compare les prix totaux et le détail des prestations
2. Identifie les différences majeures entre les devis
3. Signale les éléments manquants dans l'un ou l'autre
4. Recommande l'option la plus avantageuse en termes de rapport qualité-prix
5. Présente le résultat sous forme de tableau comparatif

Réponds au format JSON avec les sections suivantes :
{
  "comparaison_generale": "description générale",
  "tableau_comparatif": [
    {"aspect": "Prix total", "devis1": "valeur", "devis2": "valeur", "commentaire": "..."},
    ...
  ],
  "differences_notables": ["différence 1", "différence 2", ...],
  "elements_manquants": {"devis1": ["élément 1", ...], "devis2": ["élément 1", ...]},
  "recommandation": "recommandation finale"
}
"#;

/// Editable prompt text. Any value is accepted, including an empty one.
pub struct PromptStore {
    text: String,
    seed: String,
}

impl PromptStore {
    pub fn new(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        Self { text: seed.clone(), seed }
    }

    pub fn get(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.text = value.into();
    }

    /// Back to the text the store was created with. Only on explicit request.
    pub fn reset(&mut self) {
        self.text = self.seed.clone();
    }

    pub fn is_modified(&self) -> bool {
        self.text != self.seed
    }
}

impl Default for PromptStore {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}

/// Reads a prompt template from disk, `~` expanded.
pub fn load_custom_prompt(path: &str) -> Result<String> {
    let expanded = PathBuf::from(shellexpand::tilde(path).as_ref());
    fs::read_to_string(&expanded)
        .with_context(|| format!("cannot read prompt file {}", expanded.display()))
}
