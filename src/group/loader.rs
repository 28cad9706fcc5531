//! Loader Module
//!
//! The user-supplied source of truth consulted on a local cache miss.

use std::future::Future;

use async_trait::async_trait;

// == Loader ==
/// Loads the value for a key when no cache or peer can provide it.
///
/// Within one group, a loader is never called concurrently for the same key
/// while an earlier call for that key is still running; different keys may
/// load in parallel.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

// == Loader Fn ==
/// Adapts an async function or closure into a [`Loader`].
///
/// # Example
/// ```ignore
/// let loader = LoaderFn::new(|key: String| async move {
///     Ok(format!("value of {}", key).into_bytes())
/// });
/// ```
pub struct LoaderFn<F> {
    f: F,
}

impl<F> LoaderFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Loader for LoaderFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send + 'static,
{
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.f)(key.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loader_fn_passes_key() {
        let loader =
            LoaderFn::new(|key: String| async move { Ok::<_, anyhow::Error>(key.into_bytes()) });

        let bytes = loader.load("Tom").await.unwrap();
        assert_eq!(bytes, b"Tom".to_vec());
    }

    #[tokio::test]
    async fn test_loader_fn_error() {
        let loader = LoaderFn::new(|key: String| async move {
            Err::<Vec<u8>, _>(anyhow::anyhow!("{} not exist", key))
        });

        let err = loader.load("Unknown").await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown not exist");
    }
}
