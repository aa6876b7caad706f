//! # Fetch Question Select
//!
//! 认证刷题平台的题库取数、规范化与抽题管道
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP 客户端 + 只读缓存），只暴露能力
//! - `SourceFetcher` - 唯一的取数入口，提供 fetch_source() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条记录
//! - `json_repair` - 损坏 JSON 的受限修复能力
//! - `format_detector` - 源形态探测与展平能力
//! - `QuestionNormalizer` - 单条记录规范化能力
//! - `validator` - 规范记录校验能力
//! - `sampler` - 抽题能力（练习 / 考试 / 分层配比）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个题源"的完整处理流程
//! - `SourceCtx` - 上下文封装（provider + category）
//! - `PoolFlow` - 流程编排（fetch → repair → detect → normalize → validate）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_fetcher` - 批量题源处理器，管理资源和并发
//! - `orchestrator/source_processor` - 单个题源处理器，抽题并落盘
//!
//! ## 数据流
//!
//! 严格单向：fetch → repair → detect → normalize → validate → sample，
//! 产出规范化题目的扁平列表，交给展示层（不在本 crate 范围内）。

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{FetchError, ParseError};
pub use infrastructure::SourceFetcher;
pub use models::question::{AnswerKey, CanonicalQuestion, QuestionId, QuestionType};
pub use models::source::{QuizMode, QuizSource};
pub use orchestrator::{process_source, App, SourceOutcome};
pub use services::sampler::select_questions;
pub use workflow::{PoolFlow, SourceCtx};
