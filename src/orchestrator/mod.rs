//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 批量调度与结果汇总都在这一层，下面各层只管单个题源。
//!
//! ## 模块划分
//!
//! ### `batch_fetcher` - 批量题源处理器
//! - 应用生命周期（初始化、运行、汇总）
//! - 读入题源清单（Vec<QuizSource>）
//! - Semaphore 限制并发上限
//! - 唯一持有 SourceFetcher
//! - 汇总成功 / 空池 / 失败计数
//!
//! ### `source_processor` - 单个题源处理器
//! - 调用 PoolFlow 构建单个题源的题池
//! - 按题源配置抽题
//! - 把题集写入输出文件
//! - 记录单个题源处理小结
//!
//! ## 层次关系
//!
//! ```text
//! batch_fetcher (处理 Vec<QuizSource>)
//!     ↓
//! source_processor (处理单个 QuizSource)
//!     ↓
//! workflow::PoolFlow (fetch → repair → detect → normalize → validate)
//!     ↓
//! services (能力层：repair / detect / normalize / validate / sample)
//!     ↓
//! infrastructure (基础设施：SourceFetcher)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_fetcher 管批量，source_processor 管单个
//! 2. **资源隔离**：只有编排层持有 SourceFetcher
//! 3. **依赖方向**：编排层只向 workflow / services / infrastructure 伸手
//! 4. **无业务逻辑**：调度与计数之外的判断都不在这层做

pub mod batch_fetcher;
pub mod source_processor;

// 重新导出主要类型
pub use batch_fetcher::App;
pub use source_processor::{process_source, SourceOutcome};
