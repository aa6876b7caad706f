//! 抽题服务 - 业务能力层
//!
//! 纯函数：输入题池、模式与数量参数，输出最终题集
//!
//! 职责：
//! - 整池洗牌，消除源数据顺序带来的位置偏差
//! - 练习模式全量或定量出题
//! - 考试模式支持 75/25 分层配比，层内不足互相补位
//! - 随机源由调用方显式传入（测试用种子，线上用随机种子）

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::models::question::{AnswerKey, CanonicalQuestion, QuestionType};
use crate::models::source::QuizMode;

/// 分层抽样中单选题的配比（其余配额给交互题型）
const MCQ_RATIO: f64 = 0.75;

/// 从题池抽出最终题集
///
/// # 参数
/// - `pool`: 校验后的题池（不会被修改）
/// - `mode`: 练习 / 考试
/// - `count_param`: 数量参数，"all" / 正整数字符串 / 缺省
/// - `default_exam_count`: 数量参数缺省或非法时的整卷题量
/// - `use_stratified`: 考试模式下是否启用分层配比
/// - `rng`: 显式随机源
///
/// # 返回
/// 返回新的题集（洗牌后的拷贝），题池不足时允许短缺。
pub fn select_questions<R: Rng>(
    pool: &[CanonicalQuestion],
    mode: QuizMode,
    count_param: Option<&str>,
    default_exam_count: usize,
    use_stratified: bool,
    rng: &mut R,
) -> Vec<CanonicalQuestion> {
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);

    let target = resolve_target_count(count_param, shuffled.len(), default_exam_count);
    debug!(
        "抽题: 模式={} 池={} 目标={} 分层={}",
        mode,
        shuffled.len(),
        target,
        use_stratified
    );

    match mode {
        QuizMode::Practice => {
            let keep_all = match count_param {
                None => true,
                Some(raw) => raw.trim().eq_ignore_ascii_case("all"),
            };
            if !keep_all {
                shuffled.truncate(target);
            }
            shuffled
        }
        QuizMode::Exam if use_stratified => stratified_exam(shuffled, target, rng),
        QuizMode::Exam => {
            shuffled.truncate(target);
            shuffled
        }
    }
}

/// 解析目标题量："all" → 全池；可解析正整数 → 该值；否则 → 整卷默认
fn resolve_target_count(
    count_param: Option<&str>,
    pool_len: usize,
    default_exam_count: usize,
) -> usize {
    match count_param {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.eq_ignore_ascii_case("all") {
                return pool_len;
            }
            match trimmed.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => default_exam_count,
            }
        }
        None => default_exam_count,
    }
}

/// 分层抽样：单选题与交互题型按 75/25 配比
///
/// 无法判分的热区题（答案不是非空映射）整体剔除，不参与任何一层；
/// 任一层不足时从另一层未选走的尾部补位，合并后再洗一次并截断。
fn stratified_exam<R: Rng>(
    shuffled: Vec<CanonicalQuestion>,
    target: usize,
    rng: &mut R,
) -> Vec<CanonicalQuestion> {
    let mut mcqs: Vec<CanonicalQuestion> = Vec::new();
    let mut others: Vec<CanonicalQuestion> = Vec::new();

    for question in shuffled {
        match question.question_type {
            QuestionType::Mcq => mcqs.push(question),
            QuestionType::Hotspot => {
                let gradable = question.answer.as_ref().map_or(false, AnswerKey::is_mapping);
                if gradable {
                    others.push(question);
                } else {
                    debug!("剔除无法判分的热区题 (id: {})", question.id);
                }
            }
            _ => others.push(question),
        }
    }

    mcqs.shuffle(rng);
    others.shuffle(rng);

    let mcq_quota = ((target as f64) * MCQ_RATIO).round() as usize;
    let others_quota = target.saturating_sub(mcq_quota);

    let mcq_take = mcq_quota.min(mcqs.len());
    let others_take = others_quota.min(others.len());

    // 目标值可以远超池容量，预留按实际可取量封顶
    let capacity = target.min(mcqs.len() + others.len());
    let mut picked: Vec<CanonicalQuestion> = Vec::with_capacity(capacity);
    picked.extend_from_slice(&mcqs[..mcq_take]);
    picked.extend_from_slice(&others[..others_take]);

    // 配额缺口从另一层未选走的尾部补齐
    let mcq_deficit = mcq_quota - mcq_take;
    let others_deficit = others_quota - others_take;

    if others_deficit > 0 {
        let spare = &mcqs[mcq_take..];
        picked.extend_from_slice(&spare[..others_deficit.min(spare.len())]);
    }
    if mcq_deficit > 0 {
        let spare = &others[others_take..];
        picked.extend_from_slice(&spare[..mcq_deficit.min(spare.len())]);
    }

    picked.shuffle(rng);
    picked.truncate(target);
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::Map;
    use std::collections::BTreeMap;

    fn make_mcq(id: i64) -> CanonicalQuestion {
        CanonicalQuestion {
            id: QuestionId::Num(id),
            question_type: QuestionType::Mcq,
            question: format!("Question {}", id),
            code: None,
            options: Some(vec!["a".to_string(), "b".to_string()]),
            answer: Some(AnswerKey::Single("a".to_string())),
            explanation: None,
            section: None,
            image: None,
            extra: Map::new(),
        }
    }

    fn make_hotspot(id: i64, gradable: bool) -> CanonicalQuestion {
        let answer = if gradable {
            let mut mapping = BTreeMap::new();
            mapping.insert("Box 1".to_string(), "Yes".to_string());
            Some(AnswerKey::Mapping(mapping))
        } else {
            None
        };
        CanonicalQuestion {
            id: QuestionId::Num(id),
            question_type: QuestionType::Hotspot,
            question: format!("Hotspot {}", id),
            code: None,
            options: None,
            answer,
            explanation: None,
            section: None,
            image: None,
            extra: Map::new(),
        }
    }

    fn sorted_ids(questions: &[CanonicalQuestion]) -> Vec<String> {
        let mut ids: Vec<String> = questions.iter().map(|q| q.id.to_string()).collect();
        ids.sort();
        ids
    }

    fn count_type(questions: &[CanonicalQuestion], question_type: QuestionType) -> usize {
        questions
            .iter()
            .filter(|q| q.question_type == question_type)
            .count()
    }

    #[test]
    fn test_practice_default_returns_whole_pool() {
        let pool: Vec<_> = (0..30).map(make_mcq).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let picked = select_questions(&pool, QuizMode::Practice, None, 40, false, &mut rng);
        assert_eq!(picked.len(), 30);
        assert_eq!(sorted_ids(&picked), sorted_ids(&pool));
    }

    #[test]
    fn test_practice_all_returns_whole_pool() {
        let pool: Vec<_> = (0..10).map(make_mcq).collect();
        let mut rng = StdRng::seed_from_u64(2);
        let picked = select_questions(&pool, QuizMode::Practice, Some("all"), 40, false, &mut rng);
        assert_eq!(sorted_ids(&picked), sorted_ids(&pool));
    }

    #[test]
    fn test_practice_numeric_count() {
        let pool: Vec<_> = (0..50).map(make_mcq).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let picked = select_questions(&pool, QuizMode::Practice, Some("12"), 40, false, &mut rng);
        assert_eq!(picked.len(), 12);
    }

    #[test]
    fn test_exam_unparseable_count_falls_back_to_default() {
        let pool: Vec<_> = (0..50).map(make_mcq).collect();
        let mut rng = StdRng::seed_from_u64(4);
        let picked = select_questions(&pool, QuizMode::Exam, Some("not-a-number"), 15, false, &mut rng);
        assert_eq!(picked.len(), 15);
    }

    #[test]
    fn test_exam_truncates_without_stratification() {
        let pool: Vec<_> = (0..100).map(make_mcq).collect();
        let mut rng = StdRng::seed_from_u64(5);
        let picked = select_questions(&pool, QuizMode::Exam, None, 40, false, &mut rng);
        assert_eq!(picked.len(), 40);
    }

    #[test]
    fn test_selection_never_duplicates_or_invents() {
        let pool: Vec<_> = (0..25).map(make_mcq).collect();
        let mut rng = StdRng::seed_from_u64(6);
        let picked = select_questions(&pool, QuizMode::Exam, Some("20"), 40, false, &mut rng);

        let mut seen = std::collections::HashSet::new();
        for q in &picked {
            assert!(seen.insert(q.id.to_string()), "出现重复题目: {}", q.id);
        }
        let pool_ids: std::collections::HashSet<String> =
            pool.iter().map(|q| q.id.to_string()).collect();
        for q in &picked {
            assert!(pool_ids.contains(&q.id.to_string()));
        }
    }

    #[test]
    fn test_stratified_exact_quota() {
        // 80 单选 + 20 热区，目标 40 → 30 单选 + 10 交互
        let mut pool: Vec<_> = (0..80).map(make_mcq).collect();
        pool.extend((100..120).map(|id| make_hotspot(id, true)));

        let mut rng = StdRng::seed_from_u64(7);
        let picked = select_questions(&pool, QuizMode::Exam, Some("40"), 40, true, &mut rng);

        assert_eq!(picked.len(), 40);
        assert_eq!(count_type(&picked, QuestionType::Mcq), 30);
        assert_eq!(count_type(&picked, QuestionType::Hotspot), 10);
    }

    #[test]
    fn test_stratified_backfills_from_mcq_tail() {
        // 95 单选 + 5 热区，目标 40 → 交互层缺 5，由单选补成 35 + 5
        let mut pool: Vec<_> = (0..95).map(make_mcq).collect();
        pool.extend((100..105).map(|id| make_hotspot(id, true)));

        let mut rng = StdRng::seed_from_u64(8);
        let picked = select_questions(&pool, QuizMode::Exam, Some("40"), 40, true, &mut rng);

        assert_eq!(picked.len(), 40);
        assert_eq!(count_type(&picked, QuestionType::Mcq), 35);
        assert_eq!(count_type(&picked, QuestionType::Hotspot), 5);
    }

    #[test]
    fn test_stratified_backfills_from_others_tail() {
        // 10 单选 + 90 热区，目标 40 → 单选层缺 20，由交互层补成 10 + 30
        let mut pool: Vec<_> = (0..10).map(make_mcq).collect();
        pool.extend((100..190).map(|id| make_hotspot(id, true)));

        let mut rng = StdRng::seed_from_u64(9);
        let picked = select_questions(&pool, QuizMode::Exam, Some("40"), 40, true, &mut rng);

        assert_eq!(picked.len(), 40);
        assert_eq!(count_type(&picked, QuestionType::Mcq), 10);
        assert_eq!(count_type(&picked, QuestionType::Hotspot), 30);
    }

    #[test]
    fn test_stratified_excludes_ungradable_hotspots() {
        let mut pool: Vec<_> = (0..30).map(make_mcq).collect();
        pool.extend((100..110).map(|id| make_hotspot(id, false)));

        let mut rng = StdRng::seed_from_u64(10);
        let picked = select_questions(&pool, QuizMode::Exam, Some("40"), 40, true, &mut rng);

        // 无法判分的热区题整体剔除，交互层空缺全部由单选补位
        assert_eq!(picked.len(), 30);
        assert_eq!(count_type(&picked, QuestionType::Hotspot), 0);
    }

    #[test]
    fn test_stratified_allows_shortfall() {
        let pool: Vec<_> = (0..8).map(make_mcq).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let picked = select_questions(&pool, QuizMode::Exam, Some("40"), 40, true, &mut rng);
        assert_eq!(picked.len(), 8);
    }

    #[test]
    fn test_stratified_huge_count_returns_whole_usable_pool() {
        // 数量参数可解析但天量时，分层抽样照常返回全池
        let mut pool: Vec<_> = (0..2).map(make_mcq).collect();
        pool.push(make_hotspot(100, true));

        let mut rng = StdRng::seed_from_u64(12);
        let picked = select_questions(
            &pool,
            QuizMode::Exam,
            Some("9000000000000000000"),
            40,
            true,
            &mut rng,
        );
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn test_shuffle_preserves_multiset() {
        for size in [0usize, 1, 2, 5, 33] {
            let pool: Vec<_> = (0..size as i64).map(make_mcq).collect();
            let mut rng = StdRng::seed_from_u64(size as u64);
            let picked =
                select_questions(&pool, QuizMode::Practice, Some("all"), 40, false, &mut rng);
            assert_eq!(sorted_ids(&picked), sorted_ids(&pool));
        }
    }

    #[test]
    fn test_seeded_selection_is_deterministic() {
        let pool: Vec<_> = (0..60).map(make_mcq).collect();
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);

        let picked_a = select_questions(&pool, QuizMode::Exam, Some("20"), 40, false, &mut rng_a);
        let picked_b = select_questions(&pool, QuizMode::Exam, Some("20"), 40, false, &mut rng_b);

        let ids_a: Vec<String> = picked_a.iter().map(|q| q.id.to_string()).collect();
        let ids_b: Vec<String> = picked_b.iter().map(|q| q.id.to_string()).collect();
        assert_eq!(ids_a, ids_b);
    }
}
