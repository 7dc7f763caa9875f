//! Language filtering and aliasing.

use std::collections::HashMap;

use super::types::{LanguageCount, RawLanguage};

/// Catalog languages that are not general-purpose programming languages
pub const NOT_GENERAL_PROGRAMMING: &[&str] = &[
    "HTML",
    "CSS",
    "Haml",
    "ClearSilver",
    "XML",
    "XSL Transformation",
    "XML Schema",
    "MXML",
    "XAML",
    "QML",
    "shell script",
    "DOS batch script",
    "AWK",
    "Vim Script",
    "DCL",
    "NSIS",
    "Make",
    "Automake",
    "Autoconf",
    "Ebuild",
    "CMake",
    "Exheres",
    "Jam",
    "TeX/LaTeX",
    "MetaFont",
    "MetaPost",
    "SQL",
    "IDL/PV-WAVE/GDL",
    "Assembly",
    "OpenGL Shading",
    "CUDA",
    "Matlab",
    "Octave",
    "R",
    "Scilab",
    "Stratego",
    "Puppet",
    "VHDL",
];

/// Dialects counted under their family name
pub const ALIASES: &[(&str, &str)] = &[
    // C++ family
    ("C/C++", "C++"),
    // Lisp family
    ("Emacs Lisp", "Lisp"),
    ("Scheme", "Lisp"),
    ("Racket", "Lisp"),
    ("Clojure", "Lisp"),
    // Fortran family
    ("Fortran (Fixed-format)", "Fortran"),
    ("Fortran (Free-format)", "Fortran"),
    // Basic family
    ("Visual Basic", "Basic"),
    ("Structured Basic", "Basic"),
    ("Classic Basic", "Basic"),
    // Modula family
    ("Modula-2", "Modula"),
    ("Modula-3", "Modula"),
    ("Oberon", "Modula"),
];

/// Maps a catalog name to the name it is counted under
///
/// # Returns
/// * `None` - If the language is excluded
/// * `Some(name)` - The family name for an aliased dialect, otherwise the name itself
pub fn canonical_name(name: &str) -> Option<&str> {
    if NOT_GENERAL_PROGRAMMING.contains(&name) {
        return None;
    }
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, family)| *family);
    Some(canonical)
}

/// Running per-language totals across catalog pages
#[derive(Debug, Default)]
pub struct LanguageTally {
    counts: HashMap<String, u64>,
}

impl LanguageTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog entry, skipping excluded languages; returns whether it was counted
    pub fn add(&mut self, language: &RawLanguage) -> bool {
        match canonical_name(&language.name) {
            Some(name) => {
                *self.counts.entry(name.to_string()).or_insert(0) += language.value;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Totals ordered by count, highest first; equal counts by name, descending
    pub fn into_ranked(self) -> Vec<LanguageCount> {
        let mut ranked: Vec<LanguageCount> = self
            .counts
            .into_iter()
            .map(|(name, count)| LanguageCount { name, count })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| b.name.cmp(&a.name)));
        ranked
    }
}
