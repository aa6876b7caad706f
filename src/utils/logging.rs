//! 日志输出工具
//!
//! 集中管理取数过程的横幅、批次分隔与汇总输出，
//! 编排层只传数字，不自己拼格式

use anyhow::Result;
use std::fs;
use tracing::info;

use crate::config::Config;

/// 横幅分隔线宽度
const BANNER_WIDTH: usize = 60;

fn banner() -> String {
    "=".repeat(BANNER_WIDTH)
}

/// 建立输出日志文件并写入头部
///
/// 每次运行覆盖上一次的内容。
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let header = format!(
        "{banner}\n题源取数日志 - {time}\n{banner}\n\n",
        banner = banner(),
        time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
    );
    fs::write(log_file_path, header)?;
    Ok(())
}

/// 打印启动横幅与关键配置
pub fn log_startup(config: &Config) {
    info!("{}", banner());
    info!("🚀 程序启动 - 多题源取数模式");
    info!("📋 题源清单: {}", config.sources_manifest);
    info!("📁 输出目录: {}", config.output_dir);
    info!("📊 最大并发数: {}", config.max_concurrent_sources);
    info!("{}", banner());
}

/// 清单加载完成后报告批次安排
pub fn log_sources_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的题源", total);
    info!("💡 将按每批 {} 个分批取数，一批全部结束后再开下一批\n", max_concurrent);
}

/// 批次开始横幅
///
/// `first` / `last` 是本批覆盖的题源序号（1 起始的闭区间）。
pub fn log_batch_start(batch_num: usize, total_batches: usize, first: usize, last: usize) {
    info!("\n{}", banner());
    info!("📦 第 {}/{} 批开始（题源 {} ~ {}）", batch_num, total_batches, first, last);
    info!("{}", banner());
}

/// 批次结束小结
pub fn log_batch_complete(batch_num: usize, success: usize, empty: usize, failed: usize) {
    info!("\n{}", "─".repeat(BANNER_WIDTH));
    info!(
        "✓ 第 {} 批结束: 成功 {} / 空池 {} / 失败 {}",
        batch_num, success, empty, failed
    );
    info!("{}", "─".repeat(BANNER_WIDTH));
}

/// 全部题源处理完后的汇总输出
pub fn print_final_stats(
    success: usize,
    empty: usize,
    failed: usize,
    total: usize,
    log_file_path: &str,
) {
    info!("\n{}", banner());
    info!("📊 全部题源处理完毕");
    info!("⏱️ 结束时间: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("✅ 成功: {}/{}", success, total);
    info!("⚠️ 空池: {}", empty);
    info!("❌ 失败: {}", failed);
    info!("{}", banner());
    info!("\n日志已保存至: {}", log_file_path);
}

/// 按字符数截断长文本，超长部分以 "..." 结尾
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_pos, _)) => format!("{}...", &text[..byte_pos]),
        None => text.to_string(),
    }
}
