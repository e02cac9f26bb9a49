//! Optional step-by-step record of an extraction run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline stage an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Normalize,
    Birthdate,
    DocumentNumber,
    FullName,
    Country,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normalize => "normalize",
            Self::Birthdate => "birthdate",
            Self::DocumentNumber => "document_number",
            Self::FullName => "full_name",
            Self::Country => "country",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub stage: Stage,
    pub message: String,
}

/// Events recorded while extracting one document.
///
/// A disabled trace drops everything passed to [`ExtractionTrace::record`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionTrace {
    #[serde(skip)]
    enabled: bool,
    events: Vec<TraceEvent>,
}

impl ExtractionTrace {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            events: Vec::new(),
        }
    }

    pub fn record(&mut self, stage: Stage, message: impl Into<String>) {
        if self.enabled {
            self.events.push(TraceEvent {
                stage,
                message: message.into(),
            });
        }
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl fmt::Display for ExtractionTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "[{}] {}", event.stage, event.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_trace_records_nothing() {
        let mut trace = ExtractionTrace::new(false);
        trace.record(Stage::Birthdate, "ignored");
        assert!(trace.is_empty());
    }

    #[test]
    fn test_default_trace_is_disabled() {
        let mut trace = ExtractionTrace::default();
        trace.record(Stage::Normalize, "ignored");
        assert!(trace.events().is_empty());
    }

    #[test]
    fn test_stage_names_match_serialized_form() {
        for stage in [
            Stage::Normalize,
            Stage::Birthdate,
            Stage::DocumentNumber,
            Stage::FullName,
            Stage::Country,
        ] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.as_str()));
        }
    }

    #[test]
    fn test_enabled_trace_display() {
        let mut trace = ExtractionTrace::new(true);
        trace.record(Stage::Normalize, "3 characters changed");
        trace.record(Stage::Country, "KEN from country_label");
        assert_eq!(trace.events().len(), 2);
        assert_eq!(
            trace.to_string(),
            "[normalize] 3 characters changed\n[country] KEN from country_label\n"
        );
    }
}
