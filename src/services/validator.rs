//! 记录校验服务 - 业务能力层
//!
//! 规范化产物的最后一道闸，不合规的记录丢弃（过滤语义）
//!
//! 职责：
//! - 只校验单条规范化记录
//! - 校验失败只丢该条，永远不是整个题源的失败

use crate::models::question::{AnswerKey, CanonicalQuestion};
use tracing::debug;

/// 校验单条规范化记录
///
/// 放行条件：
/// - 题干非空
/// - 单选 / 多选必须有非空选项列表
/// - 结构化题型（hotspot / drag_drop / case_table）必须有非空答案映射
pub fn validate_question(question: &CanonicalQuestion) -> bool {
    if question.question.trim().is_empty() {
        debug!("校验失败: 题干为空 (id: {})", question.id);
        return false;
    }

    if question.question_type.is_structured() {
        let has_mapping = question
            .answer
            .as_ref()
            .map_or(false, AnswerKey::is_mapping);
        if !has_mapping {
            debug!(
                "校验失败: {} 题缺少答案映射 (id: {})",
                question.question_type, question.id
            );
        }
        return has_mapping;
    }

    let has_options = question
        .options
        .as_ref()
        .map_or(false, |options| !options.is_empty());
    if !has_options {
        debug!(
            "校验失败: {} 题缺少选项 (id: {})",
            question.question_type, question.id
        );
    }
    has_options
}
