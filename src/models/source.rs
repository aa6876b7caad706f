//! 题源配置模型
//!
//! sources.toml 清单中的一条记录对应一个"提供方/类目"组合。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 提供方默认整卷题量
///
/// 题源未显式配置 default_exam_count 时查这张表，
/// 查不到再退回全局配置的兜底值。
pub static PROVIDER_EXAM_COUNTS: phf::Map<&'static str, usize> = phf::phf_map! {
    "azure" => 40,
    "gcp" => 50,
    "kubernetes" => 60,
    "aws" => 65,
};

/// 抽题模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// 练习模式：数量参数缺省时全量出题
    Practice,
    /// 考试模式：数量参数缺省时按整卷题量出题
    Exam,
}

impl QuizMode {
    /// 从配置字符串解析模式（忽略大小写）
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "practice" => Some(QuizMode::Practice),
            "exam" => Some(QuizMode::Exam),
            _ => None,
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizMode::Practice => write!(f, "practice"),
            QuizMode::Exam => write!(f, "exam"),
        }
    }
}

/// 题源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSource {
    /// 提供方标识（决定默认题量与解析清洗钩子）
    pub provider: String,
    /// 类目标识（如 "az-104"）
    pub category: String,
    /// 原始 JSON 地址
    pub url: String,
    /// 本地缓存文件名（读穿缓存，存在则优先读取）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_file: Option<String>,
    /// 抽题模式
    #[serde(default = "default_mode")]
    pub mode: QuizMode,
    /// 数量参数："all" / 正整数字符串 / 缺省
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<String>,
    /// 整卷默认题量（覆盖提供方默认表）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_exam_count: Option<usize>,
    /// 考试模式下是否启用 75/25 分层配比
    #[serde(default)]
    pub use_stratified: bool,
}

fn default_mode() -> QuizMode {
    QuizMode::Practice
}

impl QuizSource {
    /// 解析整卷默认题量：源配置 → 提供方默认表 → 全局兜底
    pub fn resolve_exam_count(&self, global_default: usize) -> usize {
        self.default_exam_count
            .or_else(|| PROVIDER_EXAM_COUNTS.get(self.provider.as_str()).copied())
            .unwrap_or(global_default)
    }

    /// 输出文件名
    pub fn output_file_name(&self) -> String {
        format!("{}-{}.json", self.provider, self.category)
    }
}

impl fmt::Display for QuizSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.category)
    }
}
