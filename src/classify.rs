//! Probability → label, confidence bucket and risk level.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outputs at or above this value are `Positive`.
pub const DECISION_THRESHOLD: f32 = 0.5;

pub const HIGH_CONFIDENCE: f32 = 0.8;
pub const MEDIUM_CONFIDENCE: f32 = 0.6;

/// Characters kept in a result's text preview.
pub const PREVIEW_CHARS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Label {
    Positive,
    Negative,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    LowRisk,
    HighRisk,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::LowRisk => "LOW RISK",
            RiskLevel::HighRisk => "HIGH RISK",
        }
    }
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High Confidence",
            ConfidenceLevel::Medium => "Medium Confidence",
            ConfidenceLevel::Low => "Low Confidence",
        }
    }
}

pub fn label(p: f32) -> Label {
    // 0.5 itself is Positive.
    if p < DECISION_THRESHOLD {
        Label::Negative
    } else {
        Label::Positive
    }
}

/// Distance from the decision boundary folded into [0.5, 1.0].
pub fn confidence(p: f32) -> f32 {
    if p >= DECISION_THRESHOLD {
        p
    } else {
        1.0 - p
    }
}

pub fn confidence_level(confidence: f32) -> ConfidenceLevel {
    if confidence >= HIGH_CONFIDENCE {
        ConfidenceLevel::High
    } else if confidence >= MEDIUM_CONFIDENCE {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

pub fn risk_level(label: Label) -> RiskLevel {
    match label {
        Label::Positive => RiskLevel::LowRisk,
        Label::Negative => RiskLevel::HighRisk,
    }
}

/// Gauge value in [0, 1]: 0 at the boundary, 1 at either extreme.
pub fn intensity(p: f32) -> f32 {
    match label(p) {
        Label::Positive => (p - DECISION_THRESHOLD) * 2.0,
        Label::Negative => (DECISION_THRESHOLD - p) * 2.0,
    }
}

/// First [`PREVIEW_CHARS`] characters, with "..." appended when cut.
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// One analysis outcome. Never mutated after creation.
#[derive(Clone, Debug, Serialize)]
pub struct ClassificationResult {
    pub probability: f32,
    pub label: Label,
    pub display_label: String,
    pub confidence: f32,
    pub confidence_level: ConfidenceLevel,
    pub risk_level: RiskLevel,
    pub intensity: f32,
    pub text_preview: String,
    pub timestamp: DateTime<Utc>,
    pub latency_ms: f64,
}

impl ClassificationResult {
    /// `labels` are the display names for `[Negative, Positive]`.
    pub fn new(p: f32, text: &str, labels: &[String; 2], latency_ms: f64) -> Self {
        let label = label(p);
        let confidence = confidence(p);
        let display_label = match label {
            Label::Negative => labels[0].clone(),
            Label::Positive => labels[1].clone(),
        };
        Self {
            probability: p,
            label,
            display_label,
            confidence,
            confidence_level: confidence_level(confidence),
            risk_level: risk_level(label),
            intensity: intensity(p),
            text_preview: preview(text),
            timestamp: Utc::now(),
            latency_ms,
        }
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level == RiskLevel::HighRisk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> impl Iterator<Item = f32> {
        (0..=1000).map(|i| i as f32 / 1000.0)
    }

    #[test]
    fn negative_iff_below_threshold() {
        for p in grid() {
            assert_eq!(label(p) == Label::Negative, p < 0.5, "p = {}", p);
        }
    }

    #[test]
    fn exact_boundary_is_positive_low_risk() {
        assert_eq!(label(0.5), Label::Positive);
        assert_eq!(risk_level(label(0.5)), RiskLevel::LowRisk);
        assert_eq!(confidence(0.5), 0.5);
        assert_eq!(intensity(0.5), 0.0);
    }

    #[test]
    fn confidence_is_folded_distance() {
        for p in grid() {
            let c = confidence(p);
            assert_eq!(c, p.max(1.0 - p), "p = {}", p);
            assert!((0.5..=1.0).contains(&c), "p = {}", p);
        }
    }

    #[test]
    fn confidence_buckets() {
        for p in grid() {
            let c = confidence(p);
            let expected = if c >= 0.8 {
                ConfidenceLevel::High
            } else if c >= 0.6 {
                ConfidenceLevel::Medium
            } else {
                ConfidenceLevel::Low
            };
            assert_eq!(confidence_level(c), expected, "c = {}", c);
        }
        assert_eq!(confidence_level(0.8), ConfidenceLevel::High);
        assert_eq!(confidence_level(0.6), ConfidenceLevel::Medium);
        assert_eq!(confidence_level(0.59), ConfidenceLevel::Low);
    }

    #[test]
    fn intensity_spans_unit_interval() {
        assert_eq!(intensity(1.0), 1.0);
        assert_eq!(intensity(0.0), 1.0);
        assert!((intensity(0.75) - 0.5).abs() < 1e-6);
        assert!((intensity(0.25) - 0.5).abs() < 1e-6);
        for p in grid() {
            assert!((0.0..=1.0).contains(&intensity(p)), "p = {}", p);
        }
    }

    #[test]
    fn preview_truncates_on_characters() {
        assert_eq!(preview("short"), "short");
        let exact = "a".repeat(50);
        assert_eq!(preview(&exact), exact);
        let long = "é".repeat(60);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), 53);
    }

    #[test]
    fn result_uses_display_labels() {
        let labels = ["bad".to_string(), "good".to_string()];
        let high = ClassificationResult::new(0.1, "text", &labels, 1.0);
        assert_eq!(high.display_label, "bad");
        assert!(high.is_high_risk());
        assert_eq!(high.confidence_level, ConfidenceLevel::High);

        let low = ClassificationResult::new(0.65, "text", &labels, 1.0);
        assert_eq!(low.display_label, "good");
        assert_eq!(low.risk_level, RiskLevel::LowRisk);
        assert_eq!(low.confidence_level, ConfidenceLevel::Medium);
    }
}
