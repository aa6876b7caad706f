//! JSON 修复服务 - 业务能力层
//!
//! 只负责"把疑似损坏的 JSON 文本解析出来"这一件事
//!
//! 职责：
//! - 剔除上游工具遗留的引用标记
//! - 标准解析，裸对象包装成单元素数组
//! - 标准解析失败时做一次受限的拼接修复
//! - 不碰记录内容，不关心题目结构

use crate::error::ParseError;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

/// 上游引用工具遗留的无效标记（原样混入 JSON 文本，解析前先剔除）
const INVALID_MARKERS: &[&str] = &["[cite_start]", "[cite_end]"];

/// 带编号的引用标记，形如 "[cite: 3]" / "[cite: 3, 7]"
const CITE_TAG_PATTERN: &str = r"\[cite:\s*\d+(?:\s*,\s*\d+)*\]";

/// 宽容解析入口
///
/// # 参数
/// - `raw`: 原始 JSON 文本（可能混有引用标记，或是缺少数组包装的对象拼接）
///
/// # 返回
/// 解析成功返回 Value（裸对象包装成单元素数组，便于下游统一按数组处理）；
/// 修复后仍无法解析时返回 ParseError，这是管道中唯一的硬解析失败。
pub fn parse_lenient(raw: &str) -> Result<Value, ParseError> {
    let cleaned = strip_invalid_markers(raw);

    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(obj)) => Ok(Value::Array(vec![Value::Object(obj)])),
        Ok(value) => Ok(value),
        Err(first_err) => {
            // 修复只认"顶层对象拼接缺少数组包装"这一种损坏形态
            if !cleaned.trim_start().starts_with('{') {
                return Err(ParseError::Invalid(first_err));
            }

            debug!("标准解析失败，尝试拼接修复: {}", first_err);
            let rewritten = wrap_concatenated_objects(&cleaned);

            match serde_json::from_str::<Value>(&rewritten) {
                Ok(value) => {
                    warn!("JSON 文本缺少数组包装，已按对象拼接修复");
                    Ok(value)
                }
                Err(second_err) => Err(ParseError::RepairFailed {
                    original: first_err.to_string(),
                    secondary: second_err.to_string(),
                }),
            }
        }
    }
}

/// 剔除已知无效标记
fn strip_invalid_markers(raw: &str) -> String {
    let mut text = raw.to_string();
    for marker in INVALID_MARKERS {
        if text.contains(marker) {
            text = text.replace(marker, "");
        }
    }
    if let Ok(re) = Regex::new(CITE_TAG_PATTERN) {
        text = re.replace_all(&text, "").into_owned();
    }
    text
}

/// 把 "{...}{...}" 形式的对象拼接改写为合法数组
///
/// 逐字符扫描并跟踪字符串与转义状态，只在顶层 "}" 与下一个 "{" 之间
/// 补逗号；字符串字面量内部的 "}{" 不受影响。
fn wrap_concatenated_objects(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    out.push('[');

    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    // 刚结束一个顶层对象，等待下一个 '{'
    let mut expecting_next = false;

    for ch in text.chars() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '{' => {
                if expecting_next && depth == 0 {
                    out.push(',');
                    expecting_next = false;
                }
                depth += 1;
                out.push(ch);
            }
            '}' => {
                depth -= 1;
                out.push(ch);
                if depth == 0 {
                    expecting_next = true;
                }
            }
            _ => out.push(ch),
        }
    }

    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_array() {
        let value = parse_lenient(r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_wraps_bare_object() {
        let value = parse_lenient(r#"{"id": 1, "question": "Q"}"#).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("id").and_then(|v| v.as_i64()), Some(1));
    }

    #[test]
    fn test_parse_repairs_concatenated_objects() {
        let value = parse_lenient(r#"{"a": 1}{"a": 2}"#).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].get("a").and_then(|v| v.as_i64()), Some(2));
    }

    #[test]
    fn test_parse_repair_keeps_braces_inside_strings() {
        let raw = r#"{"question": "What does }{ mean?"}{"question": "Q2"}"#;
        let value = parse_lenient(raw).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].get("question").and_then(|v| v.as_str()),
            Some("What does }{ mean?")
        );
    }

    #[test]
    fn test_parse_strips_citation_markers() {
        let raw = r#"[{"question": "[cite_start]Which service?[cite_end]", "note": "see [cite: 3, 7]"}]"#;
        let value = parse_lenient(raw).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(
            items[0].get("question").and_then(|v| v.as_str()),
            Some("Which service?")
        );
        assert_eq!(items[0].get("note").and_then(|v| v.as_str()), Some("see "));
    }

    #[test]
    fn test_parse_rejects_non_object_garbage() {
        let err = parse_lenient("not json at all").unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
    }

    #[test]
    fn test_parse_reports_both_errors_when_repair_fails() {
        let err = parse_lenient(r#"{"a": 1} trailing garbage"#).unwrap_err();
        match err {
            ParseError::RepairFailed { original, secondary } => {
                assert!(!original.is_empty());
                assert!(!secondary.is_empty());
            }
            other => panic!("预期 RepairFailed，实际: {:?}", other),
        }
    }

    #[test]
    fn test_wrap_handles_whitespace_between_objects() {
        let value = parse_lenient("{\"a\": 1}\n  {\"a\": 2}\n{\"a\": 3}").unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
    }
}
