//! 题目规范化服务 - 业务能力层
//!
//! 只处理单条原始记录，把五花八门的来源字段收敛成规范形态
//!
//! 职责：
//! - 字母键选项映射展开为有序列表（并记住键→值映射）
//! - 按固定优先级解析答案键，字母代换为选项值
//! - 题型推导（缺省单选，多元素列表答案强制多选）
//! - 从解析文本恢复结构化答案（"Box 1: Yes" 这类判定对）
//! - 不出现 Vec<RawRecord>，不关心流程顺序

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::question::{AnswerKey, CanonicalQuestion, QuestionId, QuestionType};
use crate::services::explanation_cleanup::{ExplanationCleanup, PassthroughCleanup};
use crate::services::format_detector::RawRecord;

/// 规范化中已消费的来源字段（其余字段原样透传）
const CONSUMED_FIELDS: &[&str] = &[
    "id",
    "type",
    "question",
    "code",
    "options",
    "answer",
    "correctAnswer",
    "correct_answers",
    "answer_mapping",
    "explanation",
    "section",
    "image",
];

/// 解析文本中的结构化判定对，形如 "Box 1: Yes" / "statement 2: no"
const STRUCTURED_VERDICT_PATTERN: &str = r"(?i)\b(Box|Statement|Area)\s*(\d+)\s*:\s*(Yes|No)\b";

/// 题目规范化服务
///
/// 职责：
/// - 只处理单条记录
/// - 解析清洗钩子按提供方注入
/// - 构造出的记录之后不再修改
pub struct QuestionNormalizer {
    cleanup: Box<dyn ExplanationCleanup>,
}

impl QuestionNormalizer {
    /// 创建默认规范化服务（解析文本直通）
    pub fn new() -> Self {
        Self {
            cleanup: Box::new(PassthroughCleanup),
        }
    }

    /// 挂接提供方专属的解析清洗钩子
    pub fn with_cleanup(cleanup: Box<dyn ExplanationCleanup>) -> Self {
        Self { cleanup }
    }

    /// 规范化单条原始记录
    ///
    /// # 返回
    /// 返回 None 表示静默丢弃（不是对象、缺题干或缺 ID），
    /// 丢弃永远不会升级为整个题源的失败。
    pub fn normalize(&self, record: &RawRecord) -> Option<CanonicalQuestion> {
        let raw = record.value.as_object()?;

        let question = raw.get("question").and_then(|v| v.as_str())?.to_string();

        // 1. 选项：字母键映射按键名字典序展开为有序列表
        let (options, option_map) = resolve_options(raw.get("options"));

        // 2. 答案：按 answer → correctAnswer → correct_answers 的优先级取值，
        //    某个键取到 null 时视同缺失，继续向后取
        let raw_answer = non_null(raw, "answer")
            .or_else(|| non_null(raw, "correctAnswer"))
            .or_else(|| non_null(raw, "correct_answers"));
        let mut answer = resolve_answer(raw_answer, option_map.as_ref(), options.as_deref());

        // 三个命名答案键都解析不出时，answer_mapping 作为结构化答案兜底
        if answer.is_none() {
            answer = raw
                .get("answer_mapping")
                .and_then(mapping_from_value)
                .map(AnswerKey::Mapping);
        }

        // 3. 题型推导
        let raw_type = raw.get("type").and_then(|v| v.as_str());
        let mut question_type = derive_type(raw_type, answer.as_ref());

        // 4. 答案仍不可用时，尝试从解析文本恢复结构化答案
        let explanation_raw = raw.get("explanation").and_then(|v| v.as_str());
        if needs_structured_recovery(question_type, answer.as_ref()) {
            if let Some(recovered) = explanation_raw.and_then(recover_structured_answer) {
                debug!("从解析文本恢复出 {} 项结构化判定", recovered.len());
                question_type = QuestionType::Hotspot;
                answer = Some(AnswerKey::Mapping(recovered));
            }
        }

        let explanation = explanation_raw.and_then(|text| self.cleanup.clean(text));

        let id = resolve_id(raw.get("id"), record.batch_id.as_deref())?;

        // 记录自带的分节字段优先，其次取展平时打上的分节标签
        let section = raw
            .get("section")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .or_else(|| record.section.clone());

        let code = raw.get("code").and_then(|v| v.as_str()).map(String::from);
        let image = raw.get("image").and_then(|v| v.as_str()).map(String::from);

        let extra: Map<String, Value> = raw
            .iter()
            .filter(|(key, _)| !CONSUMED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Some(CanonicalQuestion {
            id,
            question_type,
            question,
            code,
            options,
            answer,
            explanation,
            section,
            image,
            extra,
        })
    }
}

impl Default for QuestionNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

// ========== 辅助函数 ==========

/// 取对象字段，值为 null 时视同字段不存在
fn non_null<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|v| !v.is_null())
}

/// 解析选项字段
///
/// 字母键映射（{"A": "...", "B": "..."}）按键名字典序展开为有序列表，
/// 并返回键→值映射供答案解析使用；列表形态原样收集。
fn resolve_options(raw: Option<&Value>) -> (Option<Vec<String>>, Option<BTreeMap<String, String>>) {
    match raw {
        Some(Value::Array(items)) => {
            let list: Vec<String> = items.iter().filter_map(option_text).collect();
            if list.is_empty() {
                (None, None)
            } else {
                (Some(list), None)
            }
        }
        Some(Value::Object(map)) => {
            let mut pairs: Vec<(String, String)> = map
                .iter()
                .filter_map(|(key, value)| option_text(value).map(|text| (key.clone(), text)))
                .collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));

            if pairs.is_empty() {
                return (None, None);
            }
            let list = pairs.iter().map(|(_, text)| text.clone()).collect();
            let mapping = pairs.into_iter().collect::<BTreeMap<_, _>>();
            (Some(list), Some(mapping))
        }
        _ => (None, None),
    }
}

/// 选项值转文本（数字选项也常见，如 "4"）
fn option_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 解析答案键
///
/// 选项来自字母键映射时按映射表解析（匹配不上的键丢弃）；
/// 选项为有序列表时把单个大写字母当作下标代换为选项值；
/// 对象形态直接收敛为结构化映射。
fn resolve_answer(
    raw: Option<&Value>,
    option_map: Option<&BTreeMap<String, String>>,
    options: Option<&[String]>,
) -> Option<AnswerKey> {
    let raw = raw?;

    let resolved = match raw {
        Value::Object(_) => mapping_from_value(raw).map(AnswerKey::Mapping),
        Value::String(text) => match option_map {
            Some(mapping) => mapping.get(text.trim()).cloned().map(AnswerKey::Single),
            None => substitute_letter(text, options).map(AnswerKey::Single),
        },
        Value::Array(items) => {
            let keys: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            let values: Vec<String> = match option_map {
                Some(mapping) => keys
                    .iter()
                    .filter_map(|key| mapping.get(key.trim()).cloned())
                    .collect(),
                None => keys
                    .iter()
                    .filter_map(|key| substitute_letter(key, options))
                    .collect(),
            };
            if values.is_empty() {
                None
            } else {
                Some(AnswerKey::Multiple(values))
            }
        }
        _ => None,
    };

    resolved.filter(AnswerKey::is_usable)
}

/// 单个答案字符串的字母→下标代换
///
/// 字母按选项列表顺序对号入座（A→第 0 项）；越界的字母说明答案键
/// 与选项对不上，丢弃该项。非字母形态原样传递。
fn substitute_letter(answer: &str, options: Option<&[String]>) -> Option<String> {
    let trimmed = answer.trim();
    if let (Some(options), Some(index)) = (options, letter_index(trimmed)) {
        return options.get(index).cloned();
    }
    Some(trimmed.to_string())
}

/// "A"→0, "B"→1 ...（仅单个 ASCII 大写字母）
fn letter_index(text: &str) -> Option<usize> {
    let mut chars = text.chars();
    let first = chars.next()?;
    if chars.next().is_some() || !first.is_ascii_uppercase() {
        return None;
    }
    Some((first as u8 - b'A') as usize)
}

/// 题型推导
///
/// 原始类型字符串能解析就用解析结果，否则缺省单选；
/// 多元素列表答案无论类型字符串怎么说都强制多选。
fn derive_type(raw_type: Option<&str>, answer: Option<&AnswerKey>) -> QuestionType {
    let mut derived = raw_type
        .and_then(QuestionType::parse)
        .unwrap_or(QuestionType::Mcq);

    if let Some(AnswerKey::Multiple(items)) = answer {
        if items.len() > 1 {
            derived = QuestionType::Msq;
        }
    }
    derived
}

/// 是否需要尝试结构化答案恢复
///
/// 单选 / 热区 / 拖拽题在答案不可用时都值得一试；
/// 案例表格题的答案要求行结构，文本恢复不适用。
fn needs_structured_recovery(question_type: QuestionType, answer: Option<&AnswerKey>) -> bool {
    let eligible = matches!(
        question_type,
        QuestionType::Mcq | QuestionType::Hotspot | QuestionType::DragDrop
    );
    eligible && !answer.map_or(false, AnswerKey::is_usable)
}

/// 从解析文本恢复结构化答案
///
/// 全局匹配 "Box 1: Yes" / "statement 2: no" 这类判定对，
/// 命中至少一条即可构造 {"Box 1": "Yes"} 形式的答案映射。
fn recover_structured_answer(explanation: &str) -> Option<BTreeMap<String, String>> {
    let re = Regex::new(STRUCTURED_VERDICT_PATTERN).ok()?;

    let mut recovered = BTreeMap::new();
    for caps in re.captures_iter(explanation) {
        if let (Some(label), Some(number), Some(verdict)) = (caps.get(1), caps.get(2), caps.get(3))
        {
            recovered.insert(
                format!("{} {}", title_case(label.as_str()), number.as_str()),
                title_case(verdict.as_str()),
            );
        }
    }

    if recovered.is_empty() {
        None
    } else {
        Some(recovered)
    }
}

/// 首字母大写、其余小写（"statement" → "Statement"）
fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// 解析题目 ID
///
/// 批次来源的记录合成 "{批次ID}-{原始ID}"，保证展平后的池内唯一；
/// 其余保持数字或字符串原样。
fn resolve_id(raw_id: Option<&Value>, batch_id: Option<&str>) -> Option<QuestionId> {
    let raw_id = raw_id?;

    match batch_id {
        Some(batch) => {
            let original = match raw_id {
                Value::Number(n) => n.to_string(),
                Value::String(s) if !s.is_empty() => s.clone(),
                _ => return None,
            };
            Some(QuestionId::Text(format!("{}-{}", batch, original)))
        }
        None => match raw_id {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(QuestionId::Num(i)),
                None => Some(QuestionId::Text(n.to_string())),
            },
            Value::String(s) if !s.is_empty() => Some(QuestionId::Text(s.clone())),
            _ => None,
        },
    }
}

/// Value 对象 → 字符串映射（值非字符串的条目丢弃）
fn mapping_from_value(value: &Value) -> Option<BTreeMap<String, String>> {
    let obj = value.as_object()?;
    let map: BTreeMap<String, String> = obj
        .iter()
        .filter_map(|(key, v)| v.as_str().map(|s| (key.clone(), s.to_string())))
        .collect();

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}
