use std::fmt::Write;

use crate::models::{EvidenceGrade, InteractionRecord, Severity, SourceLink};

/// Detail panel for one interaction cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub title: String,
    pub severity: Severity,
    pub evidence: EvidenceGrade,
    pub guidance: String,
    pub mechanism: Option<String>,
    pub sources: Vec<SourceLink>,
}

impl DetailView {
    pub fn new(first: &str, second: &str, record: &InteractionRecord) -> Self {
        Self {
            title: format!("{first} + {second}"),
            severity: record.severity,
            evidence: record.evidence,
            guidance: record.guidance.clone(),
            mechanism: record.mechanism.clone(),
            sources: record.sources.clone(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(
            out,
            "Severity: {}  Evidence: {}",
            self.severity, self.evidence
        );
        let _ = writeln!(out, "Guidance: {}", self.guidance);
        if let Some(mechanism) = &self.mechanism {
            let _ = writeln!(out, "Mechanism: {mechanism}");
        }
        if !self.sources.is_empty() {
            let _ = writeln!(out, "Sources:");
            for (i, source) in self.sources.iter().enumerate() {
                let _ = writeln!(out, "  {}. {} <{}>", i + 1, source.name, source.url);
                if let Some(snippet) = &source.snippet {
                    let _ = writeln!(out, "     {snippet}");
                }
            }
        }
        out
    }
}
