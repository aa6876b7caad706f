//! 题池构建流程 - 流程层
//!
//! 核心职责：定义"一个题源"的完整处理流程
//!
//! 流程顺序：
//! 1. fetch（读穿缓存 → 网络）
//! 2. parse_lenient（标准解析 + 受限拼接修复）
//! 3. extract_records（形态探测 + 展平）
//! 4. normalize → validate（逐条，失败静默丢弃）

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::infrastructure::SourceFetcher;
use crate::models::question::CanonicalQuestion;
use crate::models::source::QuizSource;
use crate::services::explanation_cleanup::cleanup_for_provider;
use crate::services::format_detector::{detect_shape, extract_records};
use crate::services::json_repair::parse_lenient;
use crate::services::normalizer::QuestionNormalizer;
use crate::services::validator::validate_question;
use crate::utils::logging::truncate_text;
use crate::workflow::source_ctx::SourceCtx;

/// 题池构建流程
///
/// - 编排单个题源的完整处理流程
/// - 不持有任何资源（fetcher 由编排层传入）
/// - 只依赖业务能力（services）
pub struct PoolFlow {
    verbose_logging: bool,
}

impl PoolFlow {
    /// 创建新的题池构建流程
    pub fn new(config: &Config) -> Self {
        Self {
            verbose_logging: config.verbose_logging,
        }
    }

    /// 处理一个题源：取数 → 修复解析 → 展平 → 规范化 → 校验
    ///
    /// # 返回
    /// 返回校验通过的题池。空池是合法结果（源形态无法识别时的降级），
    /// 与取数 / 解析失败不同，后者才会返回 Err。
    pub async fn run(
        &self,
        fetcher: &SourceFetcher,
        source: &QuizSource,
        ctx: &SourceCtx,
    ) -> Result<Vec<CanonicalQuestion>> {
        // ========== 流程 1: 取数 ==========
        info!("{} 🔍 正在获取题源数据...", ctx);

        let raw_text = fetcher
            .fetch_source(source)
            .await
            .with_context(|| format!("题源获取失败: {}", source.url))?;

        debug!("{} 原始文本 {} 字节", ctx, raw_text.len());

        // ========== 流程 2: 宽容解析 ==========
        let parsed = parse_lenient(&raw_text)
            .with_context(|| format!("题源 JSON 不可解析: {}", source.url))?;

        Ok(self.build_pool(&parsed, source, ctx))
    }

    /// 处理已解析的 JSON 负载
    ///
    /// 跳过文本修复一步；对象形态（分节源）在此入口保留原状。
    pub fn run_value(
        &self,
        parsed: &Value,
        source: &QuizSource,
        ctx: &SourceCtx,
    ) -> Vec<CanonicalQuestion> {
        self.build_pool(parsed, source, ctx)
    }

    /// 展平 + 逐条规范化 + 校验
    fn build_pool(
        &self,
        parsed: &Value,
        source: &QuizSource,
        ctx: &SourceCtx,
    ) -> Vec<CanonicalQuestion> {
        // ========== 流程 3: 形态探测与展平 ==========
        let shape = detect_shape(parsed);
        debug!("{} 源形态: {:?}", ctx, shape);

        let records = extract_records(parsed);
        if records.is_empty() {
            warn!("{} ⚠️ 未识别出任何题目记录，返回空池", ctx);
            return Vec::new();
        }

        info!("{} ✓ 展平得到 {} 条原始记录", ctx, records.len());

        // ========== 流程 4: 逐条规范化与校验 ==========
        let normalizer =
            QuestionNormalizer::with_cleanup(cleanup_for_provider(&source.provider));

        let mut pool = Vec::with_capacity(records.len());
        let mut dropped_normalize = 0usize;
        let mut dropped_validate = 0usize;

        for record in &records {
            match normalizer.normalize(record) {
                Some(question) => {
                    if validate_question(&question) {
                        if self.verbose_logging {
                            debug!("{} ✓ {}", ctx, truncate_text(&question.question, 60));
                        }
                        pool.push(question);
                    } else {
                        dropped_validate += 1;
                    }
                }
                None => {
                    dropped_normalize += 1;
                }
            }
        }

        if dropped_normalize + dropped_validate > 0 {
            warn!(
                "{} ⚠️ 丢弃 {} 条（规范化 {} / 校验 {}）",
                ctx,
                dropped_normalize + dropped_validate,
                dropped_normalize,
                dropped_validate
            );
        }

        info!("{} ✓ 题池构建完成，共 {} 题", ctx, pool.len());
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::source::QuizMode;
    use serde_json::json;

    fn make_source() -> QuizSource {
        QuizSource {
            provider: "azure".to_string(),
            category: "az-900".to_string(),
            url: "https://example.com/az-900.json".to_string(),
            cache_file: None,
            mode: QuizMode::Practice,
            count: None,
            default_exam_count: None,
            use_stratified: false,
        }
    }

    fn make_ctx() -> SourceCtx {
        SourceCtx::new("azure".to_string(), "az-900".to_string(), 1)
    }

    #[test]
    fn test_run_value_builds_pool_and_drops_invalid() {
        let flow = PoolFlow::new(&Config::default());
        let payload = json!([
            {"id": 1, "question": "Q1", "options": ["a", "b"], "answer": "A"},
            {"id": 2, "question": "", "options": ["a"]},
            {"id": 3, "question": "Q3"}
        ]);

        let pool = flow.run_value(&payload, &make_source(), &make_ctx());
        // 空题干与缺选项的单选都被丢弃
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].question, "Q1");
    }

    #[test]
    fn test_run_value_keeps_sectioned_object_shape() {
        let flow = PoolFlow::new(&Config::default());
        let payload = json!({
            "sections": [
                {"sectionTitle": "Storage", "questions": [
                    {"id": 1, "question": "Q1", "options": ["a", "b"]}
                ]}
            ]
        });

        let pool = flow.run_value(&payload, &make_source(), &make_ctx());
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].section.as_deref(), Some("Storage"));
    }

    #[test]
    fn test_run_value_degrades_to_empty_pool() {
        let flow = PoolFlow::new(&Config::default());
        let pool = flow.run_value(&json!({"meta": "nothing here"}), &make_source(), &make_ctx());
        assert!(pool.is_empty());
    }
}
