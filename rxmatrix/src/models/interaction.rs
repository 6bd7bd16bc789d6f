use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordinal interaction risk: `Minor < Moderate < Major < Contraindicated`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
    Contraindicated,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Major => "major",
            Self::Contraindicated => "contraindicated",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minor" => Ok(Self::Minor),
            "moderate" => Ok(Self::Moderate),
            "major" => Ok(Self::Major),
            "contraindicated" => Ok(Self::Contraindicated),
            _ => Err(format!("Unknown severity: {s}")),
        }
    }
}

/// Strength of the clinical evidence behind a record, A (strongest) to D.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EvidenceGrade {
    A,
    B,
    C,
    D,
}

impl std::fmt::Display for EvidenceGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::C => write!(f, "C"),
            Self::D => write!(f, "D"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceLink {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_at: Option<DateTime<Utc>>,
}

impl SourceLink {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            snippet: None,
            retrieved_at: None,
        }
    }
}

/// One known interaction between two canonical items. Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub item_a: String,
    pub item_b: String,
    pub severity: Severity,
    pub guidance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<String>,
    pub evidence: EvidenceGrade,
    #[serde(default)]
    pub sources: Vec<SourceLink>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Minor < Severity::Moderate);
        assert!(Severity::Moderate < Severity::Major);
        assert!(Severity::Major < Severity::Contraindicated);
    }

    #[test]
    fn test_severity_from_str_is_case_insensitive() {
        assert_eq!(" Major ".parse::<Severity>(), Ok(Severity::Major));
        assert!("severe".parse::<Severity>().is_err());
    }

    #[test]
    fn test_record_deserializes_wire_shape() {
        let record: InteractionRecord = serde_json::from_value(json!({
            "itemA": "w",
            "itemB": "a",
            "severity": "major",
            "guidance": "Avoid combination; bleeding risk.",
            "evidence": "A",
            "sources": [
                {"name": "DailyMed", "url": "https://dailymed.nlm.nih.gov", "retrievedAt": "2026-01-02T03:04:05Z"}
            ]
        }))
        .unwrap();

        assert_eq!(record.severity, Severity::Major);
        assert_eq!(record.evidence, EvidenceGrade::A);
        assert!(record.mechanism.is_none());
        assert_eq!(record.sources.len(), 1);
        assert!(record.sources[0].retrieved_at.is_some());
    }
}
