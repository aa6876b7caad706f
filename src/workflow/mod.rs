pub mod pool_flow;
pub mod source_ctx;

pub use pool_flow::PoolFlow;
pub use source_ctx::SourceCtx;
