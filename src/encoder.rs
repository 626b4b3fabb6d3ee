// src/encoder.rs
//
// Embedding-encoder collaborator interface.
//
// The environment core treats the sentence encoder as a synchronous black
// box: a deterministic map from token sequences to fixed-dimension numeric
// vectors. Real deployments plug a model-backed implementation in here;
// HashEncoder is the in-process stand-in used by the harness and tests.

use std::sync::Arc;

/// One numeric vector produced by the encoder.
pub type Embedding = Vec<f32>;

/// Deterministic sentence-to-vector encoder.
pub trait Encoder: Send + Sync {
    /// Encode each string into one embedding, preserving order.
    fn encode(&self, sentences: &[String]) -> Vec<Embedding>;

    /// Dimension of every embedding this encoder produces.
    fn dim(&self) -> usize;
}

/// Feature-hashing encoder: deterministic, model-free embeddings.
///
/// Each sentence is hashed (FNV-1a) to seed a small xorshift stream that
/// fills the vector with values in [-1, 1]. Identical sentences always map
/// to identical vectors, which is all the environment contract requires.
#[derive(Debug, Clone)]
pub struct HashEncoder {
    dim: usize,
}

impl HashEncoder {
    /// Default dimension matches the sentence-transformer the adapters were
    /// originally paired with.
    pub const DEFAULT_DIM: usize = 384;

    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn shared(dim: usize) -> Arc<dyn Encoder> {
        Arc::new(Self::new(dim))
    }
}

impl Default for HashEncoder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIM)
    }
}

impl Encoder for HashEncoder {
    fn encode(&self, sentences: &[String]) -> Vec<Embedding> {
        sentences
            .iter()
            .map(|s| {
                let mut state = fnv1a64(s) | 1;
                (0..self.dim)
                    .map(|_| {
                        // xorshift64*
                        state ^= state >> 12;
                        state ^= state << 25;
                        state ^= state >> 27;
                        let sample = state.wrapping_mul(0x2545_f491_4f6c_dd1d);
                        (sample >> 11) as f32 / (1u64 << 53) as f32 * 2.0 - 1.0
                    })
                    .collect()
            })
            .collect()
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

fn fnv1a64(s: &str) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    let mut h = FNV_OFFSET;
    for b in s.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_deterministic() {
        let enc = HashEncoder::new(16);
        let sentences = vec!["White pawn from e2 to e4".to_string(), String::new()];
        assert_eq!(enc.encode(&sentences), enc.encode(&sentences));
    }

    #[test]
    fn test_encode_shape() {
        let enc = HashEncoder::new(32);
        let out = enc.encode(&["a".to_string(), "b".to_string(), "a".to_string()]);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|v| v.len() == 32));
        assert_eq!(out[0], out[2]);
        assert_ne!(out[0], out[1]);
    }

    #[test]
    fn test_values_bounded() {
        let enc = HashEncoder::default();
        let out = enc.encode(&["bounded".to_string()]);
        assert!(out[0].iter().all(|x| (-1.0..=1.0).contains(x)));
    }
}
