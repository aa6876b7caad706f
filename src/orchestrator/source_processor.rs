//! 单个题源处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责单个题源从取数到落盘的完整过程，是题源级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **流程调度**：创建并调用 `PoolFlow` 构建题池
//! 2. **抽题**：按题源配置的模式与数量参数抽出最终题集
//! 3. **落盘**：把题集写入 "{provider}-{category}.json"
//! 4. **降级**：空池只记录，不算失败

use crate::config::Config;
use crate::infrastructure::SourceFetcher;
use crate::models::question::CanonicalQuestion;
use crate::models::source::QuizSource;
use crate::services::sampler::select_questions;
use crate::workflow::{PoolFlow, SourceCtx};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tracing::{debug, info, warn};

/// 单个题源的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    /// 题集已写入输出文件
    Written { pool_size: usize, selected: usize },
    /// 题池为空（源形态无法识别或全部被丢弃），无输出
    EmptyPool,
}

/// 处理单个题源
///
/// # 参数
/// - `fetcher`: 源数据获取器
/// - `source`: 题源配置
/// - `source_index`: 题源序号（用于日志）
/// - `config`: 配置
///
/// # 返回
/// 返回处理结果；取数或解析失败向上传播为 Err。
pub async fn process_source(
    fetcher: &SourceFetcher,
    source: &QuizSource,
    source_index: usize,
    config: &Config,
) -> Result<SourceOutcome> {
    let ctx = SourceCtx::new(source.provider.clone(), source.category.clone(), source_index);

    log_source_start(&ctx, source);

    let pool_flow = PoolFlow::new(config);
    let pool = pool_flow.run(fetcher, source, &ctx).await?;

    if pool.is_empty() {
        warn!("{} ⚠️ 题池为空，跳过抽题与输出", ctx);
        return Ok(SourceOutcome::EmptyPool);
    }

    // 抽题：线上用随机种子，种子留档便于复查
    let seed = rand::random::<u64>();
    debug!("{} 抽题种子: {}", ctx, seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let selected = select_questions(
        &pool,
        source.mode,
        source.count.as_deref(),
        source.resolve_exam_count(config.default_exam_count),
        source.use_stratified,
        &mut rng,
    );

    info!(
        "{} ✓ 抽题完成: {} / {} 题（模式: {}）",
        ctx,
        selected.len(),
        pool.len(),
        source.mode
    );

    // 落盘
    let output_path = Path::new(&config.output_dir).join(source.output_file_name());
    write_selection(&output_path, &selected).await?;
    info!("{} 📤 题集已写入: {}", ctx, output_path.display());

    log_source_complete(&ctx, pool.len(), selected.len());

    Ok(SourceOutcome::Written {
        pool_size: pool.len(),
        selected: selected.len(),
    })
}

/// 把题集序列化写入输出文件
async fn write_selection(path: &Path, selected: &[CanonicalQuestion]) -> Result<()> {
    let payload = serde_json::to_string_pretty(selected).context("题集序列化失败")?;
    tokio::fs::write(path, payload)
        .await
        .with_context(|| format!("无法写入题集文件: {}", path.display()))?;
    Ok(())
}

// ========== 日志辅助函数 ==========

fn log_source_start(ctx: &SourceCtx, source: &QuizSource) {
    info!("{} 开始处理", ctx);
    info!("{} 地址: {}", ctx, source.url);
    info!(
        "{} 模式: {} / 数量参数: {}",
        ctx,
        source.mode,
        source.count.as_deref().unwrap_or("(缺省)")
    );
}

fn log_source_complete(ctx: &SourceCtx, pool_size: usize, selected: usize) {
    info!(
        "{} 统计: 题池 {} 题，抽出 {} 题",
        ctx, pool_size, selected
    );
    info!("\n{} ✅ 题源处理完成\n", ctx);
}
