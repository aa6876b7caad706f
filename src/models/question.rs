//! 规范化题目模型
//!
//! 管道内所有下游（校验、抽题、输出）只消费这一种形态。
//! 规范化阶段构造一次，校验通过后不再修改。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 题目唯一标识
///
/// 来源数据中既有数字 ID 也有字符串 ID；批次来源的记录会合成
/// "{批次ID}-{原始ID}" 形式的字符串 ID 以保证池内唯一。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Num(i64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Num(n) => write!(f, "{}", n),
            QuestionId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// 题型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    /// 单选题
    #[serde(rename = "mcq")]
    Mcq,
    /// 多选题
    #[serde(rename = "MSQ")]
    Msq,
    /// 热区题（对若干标注项逐个判定 Yes/No）
    #[serde(rename = "hotspot")]
    Hotspot,
    /// 拖拽排序题
    #[serde(rename = "drag_drop")]
    DragDrop,
    /// 案例表格题
    #[serde(rename = "case_table")]
    CaseTable,
}

impl QuestionType {
    /// 规范标签（与序列化形式一致）
    pub fn tag(self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::Msq => "MSQ",
            QuestionType::Hotspot => "hotspot",
            QuestionType::DragDrop => "drag_drop",
            QuestionType::CaseTable => "case_table",
        }
    }

    /// 从原始类型字符串解析题型（忽略大小写）
    ///
    /// 包含 "multiple" 或 "msq" 的字符串一律视为多选；
    /// 无法识别的字符串返回 None，由调用方决定默认值。
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        if lower.contains("multiple") || lower.contains("msq") {
            return Some(QuestionType::Msq);
        }
        match lower.as_str() {
            "mcq" | "single" | "single_choice" => Some(QuestionType::Mcq),
            "hotspot" => Some(QuestionType::Hotspot),
            "drag_drop" | "drag-drop" | "dragdrop" => Some(QuestionType::DragDrop),
            "case_table" | "case-table" => Some(QuestionType::CaseTable),
            _ => None,
        }
    }

    /// 是否是结构化答案题型（答案为"子项 → 判定"的映射）
    pub fn is_structured(self) -> bool {
        matches!(
            self,
            QuestionType::Hotspot | QuestionType::DragDrop | QuestionType::CaseTable
        )
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// 规范化后的答案键
///
/// 三种合法形态：
/// - 单个字符串（规范化后必须与 options 中某一项逐字相等）
/// - 字符串列表（多选，顺序无关）
/// - 子项映射（"Box 1" → "Yes" 这类结构化判定）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerKey {
    Single(String),
    Multiple(Vec<String>),
    Mapping(BTreeMap<String, String>),
}

impl AnswerKey {
    /// 答案是否可用（非空）
    pub fn is_usable(&self) -> bool {
        match self {
            AnswerKey::Single(s) => !s.trim().is_empty(),
            AnswerKey::Multiple(items) => !items.is_empty(),
            AnswerKey::Mapping(map) => !map.is_empty(),
        }
    }

    /// 是否为非空的结构化映射
    pub fn is_mapping(&self) -> bool {
        matches!(self, AnswerKey::Mapping(map) if !map.is_empty())
    }
}

/// 规范化题目记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalQuestion {
    /// 题目标识
    pub id: QuestionId,
    /// 题型（缺省按单选处理）
    #[serde(rename = "type", default = "default_question_type")]
    pub question_type: QuestionType,
    /// 题干
    pub question: String,
    /// 代码片段（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// 选项列表（字母键映射已在规范化时展开为有序列表）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// 答案键（字母已代换为选项值）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerKey>,
    /// 解析文本（已过清洗钩子）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// 所属分节标题
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// 配图地址
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// 未识别的来源字段原样透传
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_question_type() -> QuestionType {
    QuestionType::Mcq
}
