//! Text → fixed-length token id sequence.
//!
//! The vocabulary is built and frozen when the model is trained; this module
//! only loads it and replays the same word splitting the Keras `Tokenizer`
//! applied at training time.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Characters the Keras tokenizer strips by default.
pub const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Id used for left padding and, when the vocabulary has no OOV token, for
/// unknown words. Keras never assigns index 0 to a word.
pub const PAD_ID: i64 = 0;

pub const DEFAULT_MAX_LEN: usize = 100;

/// Which end of an over-long sequence is cut off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Truncating {
    /// Drop leading tokens, keeping the last `max_len`.
    Pre,
    /// Drop trailing tokens, keeping the first `max_len`.
    #[default]
    Post,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownWords {
    /// Map to the OOV index, or [`PAD_ID`] when the vocabulary has none.
    #[default]
    Reserve,
    /// Map to the OOV index if there is one, otherwise drop the word.
    Skip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SequenceOptions {
    pub max_len: usize,
    pub truncating: Truncating,
    pub unknown_words: UnknownWords,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            truncating: Truncating::default(),
            unknown_words: UnknownWords::default(),
        }
    }
}

/// Frozen word → id mapping plus the splitting rules it was built with.
#[derive(Clone, Debug)]
pub struct Vocabulary {
    word_index: HashMap<String, i64>,
    num_words: Option<usize>,
    filters: String,
    lower: bool,
    split: String,
    char_level: bool,
    oov_index: Option<i64>,
}

impl Vocabulary {
    /// Load `vocab.json`: either a Keras `tokenizer.to_json()` document or a
    /// flat `{ "word": id }` object.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read vocabulary {:?}", path))?;
        Self::from_json(&contents).with_context(|| format!("parse vocabulary {:?}", path))
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let json: Value = serde_json::from_str(contents)?;
        match json.get("config").filter(|c| c.get("word_index").is_some()) {
            Some(config) => Self::from_keras_config(config),
            None => Self::from_word_map(&json),
        }
    }

    fn from_keras_config(config: &Value) -> anyhow::Result<Self> {
        // `to_json()` stores word_index as a JSON-encoded string.
        let word_index = match config.get("word_index") {
            Some(Value::String(encoded)) => serde_json::from_str::<Value>(encoded)
                .context("decode word_index string")?,
            Some(v) => v.clone(),
            None => anyhow::bail!("tokenizer config has no word_index"),
        };

        let mut vocab = Self::from_word_map(&word_index)?;

        vocab.num_words = config
            .get("num_words")
            .and_then(Value::as_u64)
            .map(|n| n as usize);
        if let Some(filters) = config.get("filters").and_then(Value::as_str) {
            vocab.filters = filters.to_string();
        }
        if let Some(lower) = config.get("lower").and_then(Value::as_bool) {
            vocab.lower = lower;
        }
        if let Some(split) = config.get("split").and_then(Value::as_str) {
            if !split.is_empty() {
                vocab.split = split.to_string();
            }
        }
        if let Some(char_level) = config.get("char_level").and_then(Value::as_bool) {
            vocab.char_level = char_level;
        }
        vocab.oov_index = config
            .get("oov_token")
            .and_then(Value::as_str)
            .and_then(|token| vocab.word_index.get(token).copied());

        Ok(vocab)
    }

    fn from_word_map(json: &Value) -> anyhow::Result<Self> {
        let Value::Object(map) = json else {
            anyhow::bail!("vocabulary must be a JSON object");
        };

        let mut word_index = HashMap::with_capacity(map.len());
        for (word, id) in map {
            if let Some(id) = id.as_u64() {
                word_index.insert(word.clone(), id as i64);
            }
        }
        anyhow::ensure!(!word_index.is_empty(), "vocabulary is empty");

        Ok(Self {
            word_index,
            num_words: None,
            filters: DEFAULT_FILTERS.to_string(),
            lower: true,
            split: " ".to_string(),
            char_level: false,
            oov_index: None,
        })
    }

    pub fn len(&self) -> usize {
        self.word_index.len()
    }

    pub fn oov_index(&self) -> Option<i64> {
        self.oov_index
    }

    /// Split text into the words the vocabulary is keyed by.
    pub fn words(&self, text: &str) -> Vec<String> {
        let text = if self.lower {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        if self.char_level {
            return text.chars().map(String::from).collect();
        }

        let mut translated = String::with_capacity(text.len());
        for c in text.chars() {
            if self.filters.contains(c) {
                translated.push_str(&self.split);
            } else {
                translated.push(c);
            }
        }

        translated
            .split(self.split.as_str())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn lookup(&self, word: &str) -> Option<i64> {
        self.word_index
            .get(word)
            .copied()
            .filter(|&id| self.num_words.map_or(true, |n| (id as usize) < n))
    }

    /// Unpadded id sequence for one text.
    pub fn texts_to_sequence(&self, text: &str, unknown: UnknownWords) -> Vec<i64> {
        self.words(text)
            .iter()
            .filter_map(|w| {
                self.lookup(w).or_else(|| {
                    self.oov_index.or(match unknown {
                        UnknownWords::Reserve => Some(PAD_ID),
                        UnknownWords::Skip => None,
                    })
                })
            })
            .collect()
    }

    /// Tokenize and pad to exactly `opts.max_len` ids.
    pub fn encode(&self, text: &str, opts: &SequenceOptions) -> Vec<i64> {
        let seq = self.texts_to_sequence(text, opts.unknown_words);
        pad_sequence(&seq, opts.max_len, opts.truncating)
    }
}

/// Left-pad with [`PAD_ID`] or truncate so the result has exactly `max_len` ids.
pub fn pad_sequence(seq: &[i64], max_len: usize, truncating: Truncating) -> Vec<i64> {
    let kept = if seq.len() > max_len {
        match truncating {
            Truncating::Pre => &seq[seq.len() - max_len..],
            Truncating::Post => &seq[..max_len],
        }
    } else {
        seq
    };

    let mut padded = vec![PAD_ID; max_len - kept.len()];
    padded.extend_from_slice(kept);
    padded
}
