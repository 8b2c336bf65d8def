use crate::classify::ClassificationResult;
use crate::content::DISCLAIMER;

/// Plain-text summary of one analysis, offered as `analysis.txt`.
pub fn render(text: &str, result: &ClassificationResult) -> String {
    let mut out = format!(
        "Text:\n{}\nPrediction: {}\nRisk: {}\nConfidence: {:.1}% ({})\nLatency: {:.1}ms\nTimestamp: {}\n",
        text.trim(),
        result.display_label,
        result.risk_level.as_str(),
        result.confidence * 100.0,
        result.confidence_level.as_str(),
        result.latency_ms,
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
    );
    if result.is_high_risk() {
        out.push('\n');
        out.push_str(DISCLAIMER);
        out.push('\n');
    }
    out
}
