//! 源格式探测服务 - 业务能力层
//!
//! 把"这份 JSON 长什么样"的判断集中到一个显式的标签联合里，
//! 避免形状假设散落在各处
//!
//! 职责：
//! - 按固定优先级探测源形态（首个命中生效）
//! - 把各种形态展平成统一的记录列表
//! - 展平时保留分节标题与批次标识
//! - 无法识别的结构降级为空列表，绝不报错

use serde_json::{Map, Value};
use tracing::debug;

/// 源数据形态
///
/// 探测顺序即优先级，首个命中生效。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceShape {
    /// 批次数组：[{ "questions": [...] }, ...]
    Batched,
    /// 分节对象：{ "sections": [...] } 或 { "questions": [...] }
    Sectioned,
    /// 普通数组；nested 表示首元素本身是数组，需展平一层
    Generic { nested: bool },
    /// 对象兜底：按文档顺序在自身属性里找第一个数组值按普通数组处理
    FallbackScan,
    /// 无法识别（降级为空结果，不是错误）
    Unrecognized,
}

/// 展平后的单条原始记录及其来源上下文
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// 原始记录本体
    pub value: Value,
    /// 所属分节标题（分节形态才有）
    pub section: Option<String>,
    /// 所属批次标识（批次形态才有，用于合成唯一 ID）
    pub batch_id: Option<String>,
}

impl RawRecord {
    fn bare(value: Value) -> Self {
        Self {
            value,
            section: None,
            batch_id: None,
        }
    }
}

/// 探测解析值的源形态
pub fn detect_shape(value: &Value) -> SourceShape {
    match value {
        Value::Array(items) => {
            if let Some(first) = items.first() {
                if first.get("questions").map_or(false, |q| q.is_array()) {
                    return SourceShape::Batched;
                }
                if first.is_array() {
                    return SourceShape::Generic { nested: true };
                }
            }
            SourceShape::Generic { nested: false }
        }
        Value::Object(obj) => {
            if obj.get("sections").map_or(false, |s| s.is_array())
                || obj.get("questions").map_or(false, |q| q.is_array())
            {
                SourceShape::Sectioned
            } else {
                SourceShape::FallbackScan
            }
        }
        _ => SourceShape::Unrecognized,
    }
}

/// 按探测到的形态展平出记录列表
pub fn extract_records(value: &Value) -> Vec<RawRecord> {
    match (detect_shape(value), value) {
        (SourceShape::Batched, Value::Array(batches)) => extract_batched(batches),
        (SourceShape::Sectioned, _) => extract_sectioned(value),
        (SourceShape::Generic { nested }, Value::Array(items)) => extract_generic(items, nested),
        (SourceShape::FallbackScan, Value::Object(obj)) => extract_fallback(obj),
        _ => Vec::new(),
    }
}

/// 批次形态：逐批展平，记录各自的批次标识
///
/// 批次标识取批次对象的 id 或 batchId，都没有时用 1 起始的批次序号。
fn extract_batched(batches: &[Value]) -> Vec<RawRecord> {
    let mut records = Vec::new();
    for (index, batch) in batches.iter().enumerate() {
        let batch_id = batch
            .get("id")
            .or_else(|| batch.get("batchId"))
            .and_then(id_text)
            .unwrap_or_else(|| (index + 1).to_string());

        if let Some(questions) = batch.get("questions").and_then(|q| q.as_array()) {
            for question in questions {
                records.push(RawRecord {
                    value: question.clone(),
                    section: None,
                    batch_id: Some(batch_id.clone()),
                });
            }
        } else {
            debug!("批次 {} 缺少 questions 数组，跳过", batch_id);
        }
    }
    records
}

/// 分节形态：sections 数组优先，其次对象自带的 questions 数组
fn extract_sectioned(value: &Value) -> Vec<RawRecord> {
    if let Some(sections) = value.get("sections").and_then(|s| s.as_array()) {
        let mut records = Vec::new();
        for section in sections {
            let title = section
                .get("sectionTitle")
                .or_else(|| section.get("title"))
                .and_then(|t| t.as_str())
                .map(|t| t.to_string());

            if let Some(questions) = section.get("questions").and_then(|q| q.as_array()) {
                for question in questions {
                    records.push(RawRecord {
                        value: question.clone(),
                        section: title.clone(),
                        batch_id: None,
                    });
                }
            }
        }
        return records;
    }

    value
        .get("questions")
        .and_then(|q| q.as_array())
        .map(|questions| questions.iter().cloned().map(RawRecord::bare).collect())
        .unwrap_or_default()
}

/// 普通数组形态；nested 时展平一层（非数组元素原样保留）
fn extract_generic(items: &[Value], nested: bool) -> Vec<RawRecord> {
    let mut records = Vec::new();
    if nested {
        for item in items {
            match item.as_array() {
                Some(inner) => records.extend(inner.iter().cloned().map(RawRecord::bare)),
                None => records.push(RawRecord::bare(item.clone())),
            }
        }
    } else {
        records.extend(items.iter().cloned().map(RawRecord::bare));
    }
    records
}

/// 对象兜底：取第一个数组值属性，按普通数组递归处理
///
/// 属性按文档顺序遍历（serde_json 开了 preserve_order），
/// 多个数组属性并存时靠前的胜出。
fn extract_fallback(obj: &Map<String, Value>) -> Vec<RawRecord> {
    for (key, prop) in obj {
        if let Some(items) = prop.as_array() {
            debug!("兜底扫描命中属性 \"{}\"（{} 个元素）", key, items.len());
            let nested = items.first().map_or(false, |f| f.is_array());
            return extract_generic(items, nested);
        }
    }
    Vec::new()
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
