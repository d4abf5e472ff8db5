//! Presentation heuristic for the analysis text.
//!
//! This is a substring check, not a classifier. Callers that need an
//! authoritative answer should consult the backend instead.

const MARKER: &str = "pii detected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiiStatus {
    Detected,
    Clear,
}

impl PiiStatus {
    pub fn label(self) -> &'static str {
        match self {
            PiiStatus::Detected => "PII Detected!",
            PiiStatus::Clear => "No PII Detected",
        }
    }
}

/// Detected when the text mentions "PII detected" (any case) at least once
/// without a preceding "no".
pub fn classify(analysis: &str) -> PiiStatus {
    let lowered = analysis.to_lowercase();
    let affirmed = lowered.match_indices(MARKER).any(|(start, _)| {
        let before = lowered[..start].trim_end();
        let previous_word = before
            .rsplit(|c: char| !c.is_alphanumeric())
            .next()
            .unwrap_or("");
        previous_word != "no"
    });

    if affirmed {
        PiiStatus::Detected
    } else {
        PiiStatus::Clear
    }
}
