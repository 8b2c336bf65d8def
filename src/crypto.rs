use sha3::{Digest, Keccak256};
use std::path::Path;

pub fn keccak256(data: &[u8]) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    format!("0x{}", hex::encode(hasher.finalize()))
}

/// Keccak-256 of the model file, reported so results can be tied to the
/// exact weights that produced them.
pub fn model_fingerprint(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(keccak256(&bytes))
}
