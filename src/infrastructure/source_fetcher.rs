//! 源数据获取器 - 基础设施层
//!
//! 持有唯一的 HTTP 客户端与只读缓存目录，只暴露"取原始文本"的能力

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::models::source::QuizSource;

/// 源数据获取器
///
/// 职责：
/// - 持有唯一的 HTTP 客户端资源
/// - 暴露 fetch_source() / fetch_url() 能力
/// - 缓存只读不写（缓存内容由外部维护）
/// - 不解析、不修复，不认识 Question
#[derive(Clone)]
pub struct SourceFetcher {
    client: reqwest::Client,
    cache_dir: Option<PathBuf>,
}

impl SourceFetcher {
    /// 创建新的获取器
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("构建 HTTP 客户端失败")?;

        let cache_dir = config.cache_dir.as_ref().map(PathBuf::from);

        Ok(Self { client, cache_dir })
    }

    /// 获取一个题源的原始 JSON 文本
    ///
    /// 读穿缓存：配置了缓存文件且本地可读时直接返回缓存内容，
    /// 否则回退网络请求。
    ///
    /// # 参数
    /// - `source`: 题源配置
    ///
    /// # 返回
    /// 返回原始文本；缓存与网络都取不到时返回 FetchError。
    pub async fn fetch_source(&self, source: &QuizSource) -> Result<String, FetchError> {
        if let Some(cached) = self.read_cache(source).await {
            return Ok(cached);
        }
        self.fetch_url(&source.url).await
    }

    /// 直接按 URL 取原始文本
    pub async fn fetch_url(&self, url: &str) -> Result<String, FetchError> {
        debug!("发起网络请求: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::RequestFailed {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::BodyFailed {
            url: url.to_string(),
            source: e,
        })
    }

    /// 查询只读缓存；任何读取失败都视为未命中
    async fn read_cache(&self, source: &QuizSource) -> Option<String> {
        let cache_dir = self.cache_dir.as_ref()?;
        let cache_file = source.cache_file.as_ref()?;
        let path = cache_dir.join(cache_file);

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                info!("✓ 缓存命中: {}", path.display());
                Some(content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("缓存未命中: {}", path.display());
                None
            }
            Err(e) => {
                warn!("缓存读取失败，回退网络请求 ({}): {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::source::QuizMode;

    fn make_source(cache_file: Option<&str>) -> QuizSource {
        QuizSource {
            provider: "azure".to_string(),
            category: "az-900".to_string(),
            url: "https://example.com/az-900.json".to_string(),
            cache_file: cache_file.map(String::from),
            mode: QuizMode::Practice,
            count: None,
            default_exam_count: None,
            use_stratified: false,
        }
    }

    #[test]
    fn test_cache_hit_skips_network() {
        let dir = std::env::temp_dir().join("fqs_fetcher_test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("az-900.json"), r#"[{"id": 1}]"#).unwrap();

        let config = Config {
            cache_dir: Some(dir.to_string_lossy().to_string()),
            ..Config::default()
        };
        let fetcher = SourceFetcher::new(&config).unwrap();
        let source = make_source(Some("az-900.json"));

        let content = tokio_test::block_on(fetcher.fetch_source(&source)).unwrap();
        assert_eq!(content, r#"[{"id": 1}]"#);
    }

    #[test]
    fn test_cache_miss_without_cache_file() {
        let config = Config {
            cache_dir: Some(std::env::temp_dir().to_string_lossy().to_string()),
            ..Config::default()
        };
        let fetcher = SourceFetcher::new(&config).unwrap();

        // 未配置缓存文件时 read_cache 直接未命中
        let miss = tokio_test::block_on(fetcher.read_cache(&make_source(None)));
        assert!(miss.is_none());
    }
}
