use async_trait::async_trait;

use crate::error::RetrievalError;

/// Text → dense vector
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

/// Force an embedding to exactly `target` values.
///
/// Longer vectors keep their first `target` values; shorter ones are
/// zero-padded at the end. Deterministic, so query and index vectors
/// produced by the same model line up.
pub fn adjust_dimension(mut embedding: Vec<f32>, target: usize) -> Vec<f32> {
    if embedding.len() != target {
        log::debug!("Adjusting embedding from {} to {} dims", embedding.len(), target);
        embedding.resize(target, 0.0);
    }
    embedding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_longer_embedding() {
        let adjusted = adjust_dimension(vec![1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(adjusted, vec![1.0, 2.0]);
    }

    #[test]
    fn test_pads_shorter_embedding() {
        let adjusted = adjust_dimension(vec![1.0, 2.0], 5);
        assert_eq!(adjusted, vec![1.0, 2.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_length_always_matches_target() {
        for len in [0usize, 1, 8, 1024, 3072] {
            for target in [1usize, 8, 1024, 1536] {
                assert_eq!(adjust_dimension(vec![0.5; len], target).len(), target);
            }
        }
    }

    #[test]
    fn test_equal_length_untouched() {
        let v = vec![0.1, 0.2, 0.3];
        assert_eq!(adjust_dimension(v.clone(), 3), v);
    }
}
