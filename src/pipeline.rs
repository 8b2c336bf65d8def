//! The load-once analysis service: vocabulary + model + labelling.

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::classify::ClassificationResult;
use crate::config::Config;
use crate::crypto;
use crate::error::AnalyzeError;
use crate::input::Vocabulary;
use crate::models::{ModelManifest, OnnxModel, SequenceModel};

pub struct Analyzer {
    manifest: ModelManifest,
    vocab: Vocabulary,
    model: Box<dyn SequenceModel>,
    fingerprint: Option<String>,
}

impl Analyzer {
    pub fn new(manifest: ModelManifest, vocab: Vocabulary, model: Box<dyn SequenceModel>) -> Self {
        Self {
            manifest,
            vocab,
            model,
            fingerprint: None,
        }
    }

    /// Load manifest, vocabulary and ONNX model from the configured directory.
    pub fn load(config: &Config) -> Result<Self, AnalyzeError> {
        Self::try_load(config).map_err(|e| AnalyzeError::ModelUnavailable(format!("{e:#}")))
    }

    fn try_load(config: &Config) -> anyhow::Result<Self> {
        let manifest = ModelManifest::load_or_default(&config.manifest_path())?;
        info!("[riskscan] Model manifest: {} ({})", manifest.name, manifest.id);

        let vocab = Vocabulary::load(&config.vocab_path())?;
        info!("[riskscan]   {} vocabulary entries loaded", vocab.len());

        let model_path = config.model_path();
        let model = OnnxModel::load(&model_path, manifest.input_dtype)?;
        let fingerprint = crypto::model_fingerprint(&model_path)?;

        let mut analyzer = Self::new(manifest, vocab, Box::new(model));
        analyzer.fingerprint = Some(fingerprint);
        Ok(analyzer)
    }

    pub fn manifest(&self) -> &ModelManifest {
        &self.manifest
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// Tokenize, pad, predict and label one text. Blocking.
    pub fn analyze(&self, text: &str) -> Result<ClassificationResult, AnalyzeError> {
        validate(text)?;

        let start = Instant::now();
        let sequence = self.vocab.encode(text, &self.manifest.sequence_options());
        let raw = self
            .model
            .predict(&sequence)
            .map_err(|e| AnalyzeError::Inference(format!("{e:#}")))?;
        let p = to_probability(raw)?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok(ClassificationResult::new(
            p,
            text,
            &self.manifest.labels,
            latency_ms,
        ))
    }
}

/// Blank or whitespace-only text never reaches the model.
pub fn validate(text: &str) -> Result<(), AnalyzeError> {
    if text.trim().is_empty() {
        return Err(AnalyzeError::EmptyInput);
    }
    Ok(())
}

fn to_probability(raw: f32) -> Result<f32, AnalyzeError> {
    if !raw.is_finite() {
        return Err(AnalyzeError::Inference(format!(
            "model returned non-finite output {}",
            raw
        )));
    }
    Ok(raw.clamp(0.0, 1.0))
}

/// Run [`Analyzer::analyze`] on the blocking pool, containing panics from the
/// inference runtime.
pub async fn analyze_blocking(
    analyzer: Arc<Analyzer>,
    text: String,
) -> Result<ClassificationResult, AnalyzeError> {
    tokio::task::spawn_blocking(move || {
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| analyzer.analyze(&text)))
    })
    .await
    .map_err(|e| {
        error!("[riskscan] Inference task failed: {:?}", e);
        AnalyzeError::Inference("inference task failed".to_string())
    })?
    .map_err(|_| {
        error!("[riskscan] Inference panicked");
        AnalyzeError::Inference("inference crashed".to_string())
    })?
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::classify::{Label, RiskLevel};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scores text by which of two marker words it contains.
    pub(crate) struct KeywordModel {
        pub calls: Arc<AtomicUsize>,
    }

    pub(crate) const HAPPY_ID: i64 = 1;
    pub(crate) const SAD_ID: i64 = 2;

    impl SequenceModel for KeywordModel {
        fn predict(&self, sequence: &[i64]) -> anyhow::Result<f32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::ensure!(sequence.len() == 100, "bad sequence length");
            let happy = sequence.iter().filter(|&&id| id == HAPPY_ID).count();
            let sad = sequence.iter().filter(|&&id| id == SAD_ID).count();
            Ok(match happy.cmp(&sad) {
                std::cmp::Ordering::Greater => 0.92,
                std::cmp::Ordering::Less => 0.07,
                std::cmp::Ordering::Equal => 0.5,
            })
        }
    }

    struct FixedModel(f32);

    impl SequenceModel for FixedModel {
        fn predict(&self, _sequence: &[i64]) -> anyhow::Result<f32> {
            Ok(self.0)
        }
    }

    struct FailingModel;

    impl SequenceModel for FailingModel {
        fn predict(&self, _sequence: &[i64]) -> anyhow::Result<f32> {
            anyhow::bail!("runtime exploded")
        }
    }

    pub(crate) fn test_vocab() -> Vocabulary {
        Vocabulary::from_json(
            r#"{"promoted": 1, "blessed": 1, "grateful": 1, "depressed": 2, "nobody": 2, "cares": 3}"#,
        )
        .unwrap()
    }

    pub(crate) fn keyword_analyzer() -> (Analyzer, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let model = KeywordModel {
            calls: calls.clone(),
        };
        (
            Analyzer::new(ModelManifest::default(), test_vocab(), Box::new(model)),
            calls,
        )
    }

    fn fixed(p: f32) -> Analyzer {
        Analyzer::new(ModelManifest::default(), test_vocab(), Box::new(FixedModel(p)))
    }

    #[test]
    fn positive_sample_is_low_risk() {
        let (analyzer, _) = keyword_analyzer();
        let result = analyzer
            .analyze("Just got promoted at work! Feeling blessed and grateful for this opportunity.")
            .unwrap();
        assert_eq!(result.label, Label::Positive);
        assert_eq!(result.risk_level, RiskLevel::LowRisk);
        assert_eq!(result.display_label, "Non-Suicidal / Positive");
    }

    #[test]
    fn negative_sample_is_high_risk() {
        let (analyzer, _) = keyword_analyzer();
        let result = analyzer
            .analyze("I feel like nobody cares anymore. I am so depressed. What's the point of trying?")
            .unwrap();
        assert_eq!(result.label, Label::Negative);
        assert_eq!(result.risk_level, RiskLevel::HighRisk);
    }

    #[test]
    fn blank_input_never_reaches_model() {
        let (analyzer, calls) = keyword_analyzer();
        for text in ["", "   ", "\n\t "] {
            assert!(matches!(analyzer.analyze(text), Err(AnalyzeError::EmptyInput)));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn out_of_range_outputs_are_clamped() {
        assert_eq!(fixed(1.2).analyze("x").unwrap().probability, 1.0);
        assert_eq!(fixed(-0.1).analyze("x").unwrap().probability, 0.0);
    }

    #[test]
    fn non_finite_output_is_an_inference_error() {
        assert!(matches!(
            fixed(f32::NAN).analyze("x"),
            Err(AnalyzeError::Inference(_))
        ));
    }

    #[test]
    fn model_errors_surface_as_inference_errors() {
        let analyzer = Analyzer::new(ModelManifest::default(), test_vocab(), Box::new(FailingModel));
        match analyzer.analyze("hello") {
            Err(AnalyzeError::Inference(msg)) => assert!(msg.contains("runtime exploded")),
            other => panic!("unexpected: {:?}", other.map(|r| r.probability)),
        }
    }

    #[test]
    fn missing_model_dir_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_tests();
        config.model_dir = dir.path().to_path_buf();
        assert!(matches!(
            Analyzer::load(&config),
            Err(AnalyzeError::ModelUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn blocking_wrapper_returns_result() {
        let (analyzer, calls) = keyword_analyzer();
        let analyzer = Arc::new(analyzer);
        let result = analyze_blocking(analyzer.clone(), "so depressed".to_string())
            .await
            .unwrap();
        assert_eq!(result.label, Label::Negative);
        assert!(matches!(
            analyze_blocking(analyzer, " ".to_string()).await,
            Err(AnalyzeError::EmptyInput)
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
