/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 题源清单路径（TOML）
    pub sources_manifest: String,
    /// 只读缓存目录（存在同名缓存文件时跳过网络请求）
    pub cache_dir: Option<String>,
    /// 题集输出目录
    pub output_dir: String,
    /// 同时处理的题源数量（至少为 1，也是分批的批大小）
    pub max_concurrent_sources: usize,
    /// HTTP 请求超时（秒）
    pub http_timeout_secs: u64,
    /// 数量参数缺省且提供方未知时的整卷题量兜底
    pub default_exam_count: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources_manifest: "sources.toml".to_string(),
            cache_dir: Some("source_cache".to_string()),
            output_dir: "output_pools".to_string(),
            max_concurrent_sources: 4,
            http_timeout_secs: 30,
            default_exam_count: 40,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            sources_manifest: std::env::var("SOURCES_MANIFEST").unwrap_or(default.sources_manifest),
            cache_dir: std::env::var("CACHE_DIR").ok().or(default.cache_dir),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            max_concurrent_sources: std::env::var("MAX_CONCURRENT_SOURCES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_sources).max(1),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.http_timeout_secs),
            default_exam_count: std::env::var("DEFAULT_EXAM_COUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_exam_count),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_concurrency_env_clamps_to_one() {
        // 环境变量给 0 时并发数提升到 1，分批切块不允许批大小为 0
        std::env::set_var("MAX_CONCURRENT_SOURCES", "0");
        let config = Config::from_env();
        std::env::remove_var("MAX_CONCURRENT_SOURCES");
        assert_eq!(config.max_concurrent_sources, 1);
    }
}
