//! 题源处理上下文
//!
//! 封装"我正在处理第几个题源、哪个提供方的哪个类目"这一信息

use std::fmt::Display;

/// 题源处理上下文
///
/// 包含处理单个题源所需的所有上下文信息
#[derive(Debug, Clone)]
pub struct SourceCtx {
    /// 提供方标识
    pub provider: String,

    /// 类目标识
    pub category: String,

    /// 题源序号（仅用于日志显示，从1开始）
    pub source_index: usize,
}

impl SourceCtx {
    /// 创建新的题源上下文
    pub fn new(provider: String, category: String, source_index: usize) -> Self {
        Self {
            provider,
            category,
            source_index,
        }
    }
}

impl Display for SourceCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[题源 {} {}/{}]",
            self.source_index, self.provider, self.category
        )
    }
}
