//! Recoverable diagnostics collected during a translation run.

use std::fmt;

use crate::domain_path::PathResolution;

/// A recoverable problem: logged, recorded, and otherwise skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Sheet never attached to the forest.
    Orphan { sheet: String },
    /// Sheet whose domain path could not be resolved; its subtree is skipped.
    Untyped {
        sheet: String,
        resolution: PathResolution,
    },
    /// Sheet whose category has no home under its root.
    Misplaced { sheet: String, path: String },
    /// Two parent objects produced the same join key; the first one was kept.
    DuplicateKey { sheet: String, key: String },
    /// Child rows whose join key matched no parent object.
    UnmatchedRows { sheet: String, count: usize },
    /// Rows of a flat-merged sheet that replaced values an earlier row of the
    /// same parent object had set.
    Overwritten { sheet: String, count: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orphan { sheet } => write!(f, "{sheet}: not attached to any root"),
            Self::Untyped { sheet, resolution } => {
                write!(f, "{sheet}: domain path {resolution}")
            }
            Self::Misplaced { sheet, path } => write!(f, "{sheet}: {path} data has no place here"),
            Self::DuplicateKey { sheet, key } => write!(f, "{sheet}: duplicate parent key {key}"),
            Self::UnmatchedRows { sheet, count } => {
                write!(f, "{sheet}: {count} row(s) without a parent")
            }
            Self::Overwritten { sheet, count } => {
                write!(f, "{sheet}: {count} row(s) overwrote values of the same parent")
            }
        }
    }
}

/// Counts of experiment links made by the cross-link pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkSummary {
    pub weather: usize,
    pub soil: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    pub diagnostics: Vec<Diagnostic>,
    pub links: LinkSummary,
}

impl TranslationReport {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn orphans(&self) -> impl Iterator<Item = &str> {
        self.diagnostics.iter().filter_map(|diagnostic| match diagnostic {
            Diagnostic::Orphan { sheet } => Some(sheet.as_str()),
            _ => None,
        })
    }

    pub fn duplicate_keys(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::DuplicateKey { .. }))
            .count()
    }

    pub fn unmatched_rows(&self) -> usize {
        self.diagnostics
            .iter()
            .map(|d| match d {
                Diagnostic::UnmatchedRows { count, .. } => *count,
                _ => 0,
            })
            .sum()
    }
}
