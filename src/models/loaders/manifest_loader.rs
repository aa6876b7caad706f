use crate::models::source::QuizSource;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// sources.toml 清单的顶层结构
#[derive(Debug, Deserialize)]
struct SourcesManifest {
    #[serde(default)]
    sources: Vec<QuizSource>,
}

/// 从 TOML 清单加载全部题源配置
///
/// 缺少取数途径（url 为空且无缓存文件）的条目记告警后跳过，
/// 不影响其余题源。
pub async fn load_sources_manifest(manifest_path: &Path) -> Result<Vec<QuizSource>> {
    let content = fs::read_to_string(manifest_path)
        .await
        .with_context(|| format!("无法读取题源清单: {}", manifest_path.display()))?;

    let manifest: SourcesManifest = toml::from_str(&content)
        .with_context(|| format!("无法解析题源清单: {}", manifest_path.display()))?;

    if manifest.sources.is_empty() {
        tracing::warn!("题源清单为空: {}", manifest_path.display());
        return Ok(Vec::new());
    }

    let mut sources = Vec::with_capacity(manifest.sources.len());
    for source in manifest.sources {
        if source.url.trim().is_empty() && source.cache_file.is_none() {
            tracing::warn!("题源 {} 既无 url 也无缓存文件，已跳过", source);
            continue;
        }
        sources.push(source);
    }

    tracing::info!("成功加载 {} 个题源", sources.len());
    Ok(sources)
}
