use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::EmbeddingProvider;
use crate::error::VectorResult;
use crate::models::{EmbeddingModel, EmbeddingResult};

/// Decorator adding bounded retries around any embedding provider.
///
/// Only transient failures (rate limits, transport) are retried; provider
/// rejections and malformed responses surface immediately.
pub struct RetryingEmbedder<P> {
    inner: P,
    max_attempts: u32,
    base_delay: Duration,
}

impl<P: EmbeddingProvider> RetryingEmbedder<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    async fn run<T, F, Fut>(&self, mut operation: F) -> VectorResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = VectorResult<T>>,
    {
        let mut delay = self.base_delay;

        for attempt in 1..=self.max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Embedding attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(err) => return Err(err),
            }
        }

        unreachable!("retry loop always returns")
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for RetryingEmbedder<P> {
    fn model(&self) -> &EmbeddingModel {
        self.inner.model()
    }

    async fn embed(&self, text: &str) -> VectorResult<EmbeddingResult> {
        self.run(|| self.inner.embed(text)).await
    }

    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<EmbeddingResult>> {
        self.run(|| self.inner.embed_batch(texts)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::VectorError;

    /// Fails with the given error until `fail_count` attempts have been made
    struct FlakyProvider {
        model: EmbeddingModel,
        attempts: AtomicU32,
        fail_count: u32,
        error: fn() -> VectorError,
    }

    impl FlakyProvider {
        fn new(fail_count: u32, error: fn() -> VectorError) -> Self {
            Self {
                model: EmbeddingModel::Custom {
                    name: "test".to_string(),
                    dimension: 3,
                },
                attempts: AtomicU32::new(0),
                fail_count,
                error,
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FlakyProvider {
        fn model(&self) -> &EmbeddingModel {
            &self.model
        }

        async fn embed(&self, _text: &str) -> VectorResult<EmbeddingResult> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.fail_count {
                return Err((self.error)());
            }
            Ok(EmbeddingResult {
                values: vec![0.1, 0.2, 0.3],
                dimension: 3,
                tokens_used: 1,
            })
        }

        async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<EmbeddingResult>> {
            let mut results = Vec::new();
            for text in texts {
                results.push(self.embed(text).await?);
            }
            Ok(results)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_rate_limit_then_succeeds() {
        let embedder = RetryingEmbedder::new(FlakyProvider::new(2, || VectorError::RateLimited))
            .with_base_delay(Duration::from_millis(10));

        let result = embedder.embed("acme").await.unwrap();
        assert_eq!(result.dimension, 3);
        assert_eq!(embedder.inner.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_surface_error() {
        let embedder = RetryingEmbedder::new(FlakyProvider::new(10, || VectorError::RateLimited))
            .with_max_attempts(2)
            .with_base_delay(Duration::from_millis(10));

        let err = embedder.embed("acme").await.unwrap_err();
        assert!(matches!(err, VectorError::RateLimited));
        assert_eq!(embedder.inner.attempts(), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let embedder = RetryingEmbedder::new(FlakyProvider::new(10, || VectorError::EmptyInput));

        let err = embedder.embed("acme").await.unwrap_err();
        assert!(matches!(err, VectorError::EmptyInput));
        assert_eq!(embedder.inner.attempts(), 1);
    }
}
