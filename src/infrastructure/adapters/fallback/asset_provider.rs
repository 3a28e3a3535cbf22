//! Asset Fallback Provider - 本地静态兜底音频
//!
//! 资源目录下的文件：先存在性检查，再解码校验

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::application::ports::{AudioValidatorPort, FallbackProvider, Strategy};
use crate::domain::audio::{AudioFormat, AudioOrigin, AudioResource, SourceHandle};
use crate::domain::narration::NarrationRequest;

/// 内置兜底文件
pub const DEFAULT_FALLBACK_ASSETS: [&str; 3] =
    ["fallback-intro.mp3", "intro.mp3", "voice-intro.mp3"];

enum AssetSelection {
    /// 请求中指定的文件
    Requested,
    /// 固定候选列表
    Candidates(Vec<String>),
}

/// 本地兜底音频提供者
pub struct AssetFallbackProvider {
    assets_dir: PathBuf,
    selection: AssetSelection,
    validator: Arc<dyn AudioValidatorPort>,
}

impl AssetFallbackProvider {
    /// 使用请求指定的 `fallback_asset`
    pub fn custom(assets_dir: impl Into<PathBuf>, validator: Arc<dyn AudioValidatorPort>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            selection: AssetSelection::Requested,
            validator,
        }
    }

    /// 依次尝试候选文件
    pub fn defaults(
        assets_dir: impl Into<PathBuf>,
        candidates: Vec<String>,
        validator: Arc<dyn AudioValidatorPort>,
    ) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            selection: AssetSelection::Candidates(candidates),
            validator,
        }
    }

    /// 把资源路径解析到资源目录内；拒绝越界路径
    fn resolve(&self, asset: &Path) -> Option<PathBuf> {
        let mut resolved = self.assets_dir.clone();
        let mut has_file = false;
        for component in asset.components() {
            match component {
                Component::RootDir | Component::CurDir => {}
                Component::Normal(part) => {
                    resolved.push(part);
                    has_file = true;
                }
                Component::ParentDir | Component::Prefix(_) => {
                    tracing::warn!(asset = %asset.display(), "Fallback asset escapes assets directory");
                    return None;
                }
            }
        }
        has_file.then_some(resolved)
    }

    async fn try_asset(&self, asset: &Path) -> Option<AudioResource> {
        let path = self.resolve(asset)?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            _ => {
                tracing::debug!(path = %path.display(), "Fallback asset not found");
                return None;
            }
        }

        let format = AudioFormat::from_path(&path);
        let handle = SourceHandle::File(path.clone());
        let candidate = AudioResource::new(handle.clone(), AudioOrigin::LocalFallback, format);

        match self.validator.validate(&candidate).await {
            Ok(probe) => Some(AudioResource::with_duration_hint(
                handle,
                AudioOrigin::LocalFallback,
                format,
                probe.duration_secs,
            )),
            Err(e) => {
                candidate.release();
                tracing::warn!(path = %path.display(), error = %e, "Fallback asset failed validation");
                None
            }
        }
    }
}

#[async_trait]
impl FallbackProvider for AssetFallbackProvider {
    fn strategy(&self) -> Strategy {
        match self.selection {
            AssetSelection::Requested => Strategy::CustomFallback,
            AssetSelection::Candidates(_) => Strategy::DefaultFallback,
        }
    }

    async fn try_resolve(&self, request: &NarrationRequest) -> Option<AudioResource> {
        match &self.selection {
            AssetSelection::Requested => {
                let asset = request.fallback_asset.as_deref()?;
                self.try_asset(asset).await
            }
            AssetSelection::Candidates(candidates) => {
                for candidate in candidates {
                    if let Some(resource) = self.try_asset(Path::new(candidate)).await {
                        return Some(resource);
                    }
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::{encode_wav, notification_tone};
    use crate::domain::narration::Section;
    use crate::infrastructure::adapters::audio::SymphoniaValidator;

    fn write_wav(dir: &Path, name: &str) {
        let samples = notification_tone(8000, 1.0).unwrap();
        std::fs::write(dir.join(name), encode_wav(&samples, 8000, 1)).unwrap();
    }

    fn validator() -> Arc<dyn AudioValidatorPort> {
        Arc::new(SymphoniaValidator::default())
    }

    fn request() -> NarrationRequest {
        NarrationRequest::for_section("Hello", Section::About)
    }

    #[tokio::test]
    async fn test_custom_asset_resolves_inside_assets_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_wav(dir.path(), "about.wav");
        let provider = AssetFallbackProvider::custom(dir.path(), validator());

        let resource = provider
            .try_resolve(&request().with_fallback_asset("/about.wav"))
            .await
            .unwrap();

        assert_eq!(resource.origin(), AudioOrigin::LocalFallback);
        assert_eq!(resource.format(), Some(AudioFormat::Wav));
        assert!(resource.duration_hint().is_some());
        assert_eq!(provider.strategy(), Strategy::CustomFallback);
    }

    #[tokio::test]
    async fn test_custom_asset_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("public");
        std::fs::create_dir(&assets).unwrap();
        write_wav(dir.path(), "secret.wav");
        let provider = AssetFallbackProvider::custom(&assets, validator());

        let resolved = provider
            .try_resolve(&request().with_fallback_asset("../secret.wav"))
            .await;
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_custom_without_asset_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let provider = AssetFallbackProvider::custom(dir.path(), validator());
        assert!(provider.try_resolve(&request()).await.is_none());
    }

    #[tokio::test]
    async fn test_defaults_skip_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("intro.wav"), vec![0u8; 4096]).unwrap();
        write_wav(dir.path(), "voice-intro.wav");

        let provider = AssetFallbackProvider::defaults(
            dir.path(),
            vec![
                "fallback-intro.wav".to_string(),
                "intro.wav".to_string(),
                "voice-intro.wav".to_string(),
            ],
            validator(),
        );

        let resource = provider.try_resolve(&request()).await.unwrap();
        match resource.handle().unwrap() {
            SourceHandle::File(path) => assert!(path.ends_with("voice-intro.wav")),
            other => panic!("unexpected handle {:?}", other),
        }
        assert_eq!(provider.strategy(), Strategy::DefaultFallback);
    }
}
