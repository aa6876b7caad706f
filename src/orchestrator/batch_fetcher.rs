//! 批量题源处理器 - 编排层
//!
//! ## 职责
//!
//! 应用入口所在，负责把清单里的全部题源分批跑完并汇总结果。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：建日志文件、建输出目录、构建 SourceFetcher
//! 2. **清单加载**：从 sources.toml 读出 `Vec<QuizSource>`
//! 3. **并发控制**：Semaphore 限制同时在跑的题源数
//! 4. **分批推进**：一批题源全部结束后才开下一批
//! 5. **资源管理**：唯一持有 SourceFetcher，任务按需克隆
//! 6. **全局统计**：成功 / 空池 / 失败三类计数
//!
//! ## 设计特点
//!
//! - **顶层编排**：单个题源的细节全部委托 source_processor
//! - **失败隔离**：某个题源失败只计入统计，其余题源照常进行

use crate::config::Config;
use crate::infrastructure::SourceFetcher;
use crate::models::load_sources_manifest;
use crate::models::source::QuizSource;
use crate::orchestrator::source_processor::{self, SourceOutcome};
use crate::utils::logging;
use anyhow::Result;
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    fetcher: SourceFetcher,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 日志文件先行，后续所有输出都有处可查
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(&config);

        // 输出目录不存在就建出来
        tokio::fs::create_dir_all(&config.output_dir).await?;

        // SourceFetcher 持有唯一的 HTTP 客户端
        let fetcher = SourceFetcher::new(&config)?;

        Ok(Self { config, fetcher })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let all_sources = self.load_sources().await?;

        if all_sources.is_empty() {
            warn!("⚠️ 题源清单为空，程序结束");
            return Ok(());
        }

        logging::log_sources_loaded(all_sources.len(), self.config.max_concurrent_sources);

        let stats = self.process_all_sources(all_sources).await?;

        logging::print_final_stats(
            stats.success,
            stats.empty,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(())
    }

    /// 加载题源清单
    async fn load_sources(&self) -> Result<Vec<QuizSource>> {
        info!("\n📁 正在加载题源清单...");
        load_sources_manifest(Path::new(&self.config.sources_manifest)).await
    }

    /// 按并发上限分批跑完全部题源
    async fn process_all_sources(&self, all_sources: Vec<QuizSource>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_sources;
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total_batches = all_sources.len().div_ceil(batch_size);

        let mut stats = ProcessingStats {
            total: all_sources.len(),
            ..Default::default()
        };

        for (batch_index, batch) in all_sources.chunks(batch_size).enumerate() {
            let batch_num = batch_index + 1;
            // 本批覆盖的题源序号区间（1 起始）
            let first = batch_index * batch_size + 1;
            let last = first + batch.len() - 1;

            logging::log_batch_start(batch_num, total_batches, first, last);

            let outcome = self.process_batch(batch, first, semaphore.clone()).await?;
            stats.success += outcome.success;
            stats.empty += outcome.empty;
            stats.failed += outcome.failed;

            logging::log_batch_complete(batch_num, outcome.success, outcome.empty, outcome.failed);
        }

        Ok(stats)
    }

    /// 并发处理一批题源，期间任何一个失败都不影响同批其余题源
    async fn process_batch(
        &self,
        batch: &[QuizSource],
        first_index: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut handles = Vec::with_capacity(batch.len());
        let mut indices = Vec::with_capacity(batch.len());

        for (offset, source) in batch.iter().enumerate() {
            let source_index = first_index + offset;
            let permit = semaphore.clone().acquire_owned().await?;

            // SourceFetcher 内部的 HTTP 客户端是 Arc 共享的，克隆很廉价
            let fetcher = self.fetcher.clone();
            let source = source.clone();
            let config = self.config.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let result =
                    source_processor::process_source(&fetcher, &source, source_index, &config)
                        .await;
                if let Err(e) = &result {
                    error!("[题源 {}] ❌ 处理过程中发生错误: {:#}", source_index, e);
                }
                result
            }));
            indices.push(source_index);
        }

        let mut result = BatchResult::default();
        for (source_index, joined) in indices.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(SourceOutcome::Written { .. })) => result.success += 1,
                Ok(Ok(SourceOutcome::EmptyPool)) => result.empty += 1,
                Ok(Err(_)) => result.failed += 1,
                Err(e) => {
                    error!("[题源 {}] 任务执行失败: {}", source_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 全局处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    empty: usize,
    failed: usize,
    total: usize,
}

/// 单批处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    empty: usize,
    failed: usize,
}
