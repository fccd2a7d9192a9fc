use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info};
use crate::rendering::scene::Renderable;
use super::cache::AssetCache;
use super::manager::AssetLoader;
use super::AssetLoadError;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_HEADER_LEN: usize = 12;
const GLB_VERSION: u32 = 2;

/// Material assigned to loaded models; the model's own materials are resolved
/// by the renderer, not here.
pub const MODEL_MATERIAL: &str = "model";

/// Loads glTF models (`.glb` binary or `.gltf` JSON) from disk.
///
/// Only the container is validated; mesh data stays opaque and is referenced
/// by path through the renderable's `mesh_id`. The cache lock is held across
/// the read, so concurrent loads of one path wait for the first and then hit
/// the cache: six chairs cost one read.
pub struct ModelLoader {
    root: PathBuf,
    cache: Mutex<AssetCache<PathBuf, Renderable>>,
    disk_reads: AtomicU64,
}

impl ModelLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(AssetCache::new()),
            disk_reads: AtomicU64::new(0),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub async fn cached_models(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Files actually read from disk, cache hits excluded
    pub fn disk_reads(&self) -> u64 {
        self.disk_reads.load(Ordering::Relaxed)
    }
}

fn validate_glb(path: &str, bytes: &[u8]) -> Result<(), AssetLoadError> {
    if bytes.len() < GLB_HEADER_LEN || &bytes[0..4] != GLB_MAGIC {
        return Err(AssetLoadError::Decode {
            path: path.to_string(),
            reason: "missing glTF binary header".to_string(),
        });
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != GLB_VERSION {
        return Err(AssetLoadError::Decode {
            path: path.to_string(),
            reason: format!("unsupported glTF version {}", version),
        });
    }
    let declared = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    if declared > bytes.len() {
        return Err(AssetLoadError::Decode {
            path: path.to_string(),
            reason: format!("truncated: header declares {} bytes, file has {}", declared, bytes.len()),
        });
    }
    Ok(())
}

fn validate_gltf(path: &str, bytes: &[u8]) -> Result<(), AssetLoadError> {
    let document: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| AssetLoadError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    match document.get("asset").and_then(|asset| asset.get("version")) {
        Some(_) => Ok(()),
        None => Err(AssetLoadError::Decode {
            path: path.to_string(),
            reason: "missing asset.version".to_string(),
        }),
    }
}

#[async_trait]
impl AssetLoader<Renderable> for ModelLoader {
    async fn load(&self, path: &Path) -> Result<Renderable, AssetLoadError> {
        let full = self.resolve(path);
        let mut cache = self.cache.lock().await;
        if let Some(model) = cache.get(&full) {
            debug!("Model cache hit: {:?}", full);
            return Ok(model);
        }

        let model_path = full.display().to_string();
        self.disk_reads.fetch_add(1, Ordering::Relaxed);
        let bytes = tokio::fs::read(&full).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AssetLoadError::NotFound { path: model_path.clone() },
            _ => AssetLoadError::Io { path: model_path.clone(), reason: e.to_string() },
        })?;

        match full.extension().and_then(|ext| ext.to_str()) {
            Some("glb") => validate_glb(&model_path, &bytes)?,
            Some("gltf") => validate_gltf(&model_path, &bytes)?,
            other => {
                return Err(AssetLoadError::Decode {
                    path: model_path,
                    reason: format!("unsupported model format {:?}", other),
                })
            }
        }

        info!("Loaded model: {} ({} bytes)", model_path, bytes.len());
        let model = Renderable::new(model_path, MODEL_MATERIAL);
        cache.insert(full, model.clone());
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glb_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(GLB_MAGIC);
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&12u32.to_le_bytes());
        bytes
    }

    #[test]
    fn test_glb_header_validation() {
        assert!(validate_glb("chair.glb", &glb_bytes()).is_ok());
        assert!(matches!(validate_glb("chair.glb", b""), Err(AssetLoadError::Decode { .. })));

        let mut wrong_version = glb_bytes();
        wrong_version[4] = 1;
        assert!(matches!(validate_glb("chair.glb", &wrong_version), Err(AssetLoadError::Decode { .. })));

        let mut truncated = glb_bytes();
        truncated[8] = 200;
        assert!(matches!(validate_glb("chair.glb", &truncated), Err(AssetLoadError::Decode { .. })));
    }

    #[test]
    fn test_gltf_json_validation() {
        assert!(validate_gltf("table.gltf", br#"{"asset":{"version":"2.0"}}"#).is_ok());
        assert!(validate_gltf("table.gltf", br#"{"scenes":[]}"#).is_err());
        assert!(validate_gltf("table.gltf", b"not json").is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let loader = ModelLoader::new(std::env::temp_dir());
        let result = loader.load(Path::new("roomcast-missing-model.glb")).await;
        assert!(matches!(result, Err(AssetLoadError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_read() {
        let dir = std::env::temp_dir().join(format!("roomcast-model-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("chair.glb"), glb_bytes()).unwrap();

        let loader = ModelLoader::new(dir.clone());
        let path = Path::new("chair.glb");
        let (a, b, c) = tokio::join!(loader.load(path), loader.load(path), loader.load(path));
        assert_eq!(a.unwrap(), b.unwrap());
        assert!(c.is_ok());
        assert_eq!(loader.disk_reads(), 1);
        assert_eq!(loader.cached_models().await, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
