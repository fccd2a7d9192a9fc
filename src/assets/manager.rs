use async_trait::async_trait;
use std::path::Path;
use super::AssetLoadError;

/// Produces an asset of type `A` from a path.
///
/// A failed load is always an error; implementations never hand back an
/// empty asset in place of one they could not read.
#[async_trait]
pub trait AssetLoader<A>: Send + Sync {
    async fn load(&self, path: &Path) -> Result<A, AssetLoadError>;
}
