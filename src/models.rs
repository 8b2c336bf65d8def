use anyhow::Context;
use ort::session::Session;
use ort::value::Tensor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

use crate::input::{SequenceOptions, Truncating, UnknownWords, DEFAULT_MAX_LEN};

/// Element type of the model's single input tensor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputDtype {
    /// Keras `Sequential` models export their embedding input as float32.
    #[default]
    Float32,
    Int64,
    Int32,
}

/// Contents of `model.toml`, describing how to feed and label the model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelManifest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    #[serde(default)]
    pub input_dtype: InputDtype,
    #[serde(default)]
    pub truncating: Truncating,
    #[serde(default)]
    pub unknown_words: UnknownWords,
    /// Display names, `[below threshold, at or above threshold]`.
    #[serde(default = "default_labels")]
    pub labels: [String; 2],
}

fn default_max_len() -> usize {
    DEFAULT_MAX_LEN
}

fn default_labels() -> [String; 2] {
    [
        "Suicidal / Negative".to_string(),
        "Non-Suicidal / Positive".to_string(),
    ]
}

impl Default for ModelManifest {
    fn default() -> Self {
        Self {
            id: "lstm".to_string(),
            name: "LSTM risk classifier".to_string(),
            description: String::new(),
            max_len: DEFAULT_MAX_LEN,
            input_dtype: InputDtype::default(),
            truncating: Truncating::default(),
            unknown_words: UnknownWords::default(),
            labels: default_labels(),
        }
    }
}

impl ModelManifest {
    /// Read `model.toml`, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!("[riskscan] No manifest at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let manifest: ModelManifest =
            toml::from_str(&contents).with_context(|| format!("parse manifest {:?}", path))?;
        anyhow::ensure!(manifest.max_len > 0, "max_len must be > 0");
        Ok(manifest)
    }

    pub fn sequence_options(&self) -> SequenceOptions {
        SequenceOptions {
            max_len: self.max_len,
            truncating: self.truncating,
            unknown_words: self.unknown_words,
        }
    }
}

/// A trained binary classifier over fixed-length id sequences.
pub trait SequenceModel: Send + Sync {
    /// Raw model output for one padded sequence.
    fn predict(&self, sequence: &[i64]) -> anyhow::Result<f32>;
}

/// Sequence model exported to ONNX and run through ONNX Runtime.
pub struct OnnxModel {
    session: Mutex<Session>,
    input_dtype: InputDtype,
}

impl OnnxModel {
    pub fn load(path: &Path, input_dtype: InputDtype) -> anyhow::Result<Self> {
        anyhow::ensure!(path.exists(), "model file not found: {path:?}");

        let session = Session::builder()?
            .commit_from_file(path)
            .with_context(|| format!("load ONNX model {:?}", path))?;

        info!(model = %path.display(), ?input_dtype, "[riskscan] loaded sequence model");
        Ok(Self {
            session: Mutex::new(session),
            input_dtype,
        })
    }
}

impl SequenceModel for OnnxModel {
    fn predict(&self, sequence: &[i64]) -> anyhow::Result<f32> {
        let shape = [1i64, sequence.len() as i64];
        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("model session lock poisoned"))?;

        let outputs = match self.input_dtype {
            InputDtype::Float32 => {
                let data: Vec<f32> = sequence.iter().map(|&id| id as f32).collect();
                let tensor = Tensor::from_array((shape, data.into_boxed_slice()))?;
                session.run(ort::inputs![tensor])?
            }
            InputDtype::Int64 => {
                let tensor = Tensor::from_array((shape, sequence.to_vec().into_boxed_slice()))?;
                session.run(ort::inputs![tensor])?
            }
            InputDtype::Int32 => {
                let data: Vec<i32> = sequence.iter().map(|&id| id as i32).collect();
                let tensor = Tensor::from_array((shape, data.into_boxed_slice()))?;
                session.run(ort::inputs![tensor])?
            }
        };

        let (_, data) = outputs[0].try_extract_tensor::<f32>()?;
        let value = data.first().copied();
        value.ok_or_else(|| anyhow::anyhow!("model produced an empty output"))
    }
}
