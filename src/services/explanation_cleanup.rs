//! 解析文本清洗服务 - 业务能力层
//!
//! 不同提供方的解析文本各有脏数据（引用标记、生成模型的自我修正
//! 片段等），按提供方挂接清洗钩子，让规范化主干保持与提供方无关
//!
//! 职责：
//! - 定义清洗钩子 trait
//! - 提供直通与脏数据两种内置实现
//! - 按提供方标识选择钩子

use regex::Regex;

/// 带编号的引用标记，形如 "[cite: 3]" / "[cite: 3, 7]"
const CITE_TAG_PATTERN: &str = r"\[cite:\s*\d+(?:\s*,\s*\d+)*\]";

/// 解析文本清洗钩子
///
/// 返回 None 表示整段解析不可用，规范化时按无解析处理。
pub trait ExplanationCleanup: Send + Sync {
    fn clean(&self, raw: &str) -> Option<String>;
}

/// 直通钩子：只裁剪首尾空白
#[derive(Debug, Default)]
pub struct PassthroughCleanup;

impl ExplanationCleanup for PassthroughCleanup {
    fn clean(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// 脏数据钩子：剔除引用标记与生成模型的自我修正泄漏
///
/// - "[cite_start]" / "[cite_end]" / "[cite: 3]" 直接删除
/// - 从段首出现的 "Wait," 起全部截断（模型修正上文的泄漏段落）
#[derive(Debug, Default)]
pub struct ArtifactCleanup;

impl ExplanationCleanup for ArtifactCleanup {
    fn clean(&self, raw: &str) -> Option<String> {
        let mut text = raw.replace("[cite_start]", "").replace("[cite_end]", "");
        if let Ok(re) = Regex::new(CITE_TAG_PATTERN) {
            text = re.replace_all(&text, "").into_owned();
        }

        if let Some(pos) = find_self_correction(&text) {
            text.truncate(pos);
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// 定位自我修正段落的起点
///
/// 只认段首（文本开头或紧随换行）的 "Wait,"，正文引用的
/// "wait" 不受影响。
fn find_self_correction(text: &str) -> Option<usize> {
    if text.starts_with("Wait,") {
        return Some(0);
    }
    text.find("\nWait,")
}

/// 按提供方标识选择清洗钩子
///
/// azure 的解析由带引用工具的生成模型产出，脏数据最多；
/// 其余提供方暂时直通。
pub fn cleanup_for_provider(provider: &str) -> Box<dyn ExplanationCleanup> {
    match provider.to_lowercase().as_str() {
        "azure" => Box::new(ArtifactCleanup),
        _ => Box::new(PassthroughCleanup),
    }
}
