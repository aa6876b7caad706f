use thiserror::Error;

/// 源数据获取错误
///
/// 只在"整个题源拿不到原始文本"时出现；
/// 单条记录的问题走丢弃路径，不进入错误类型。
#[derive(Debug, Error)]
pub enum FetchError {
    /// 网络请求失败
    #[error("网络请求失败 ({url}): {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 响应状态码异常
    #[error("响应状态异常 ({url}): HTTP {status}")]
    BadStatus { url: String, status: u16 },
    /// 响应体读取失败
    #[error("响应体读取失败 ({url}): {source}")]
    BodyFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// JSON 解析错误
///
/// 标准解析失败后还会尝试一次拼接修复，两次都失败才会抛出。
#[derive(Debug, Error)]
pub enum ParseError {
    /// 文本不满足修复前提（顶层不是对象拼接），直接报原始解析错误
    #[error("JSON 解析失败: {0}")]
    Invalid(#[from] serde_json::Error),
    /// 标准解析与拼接修复都失败，两个错误一并报出
    #[error("JSON 解析失败（拼接修复后仍不可用）: 原始错误: {original}; 修复后错误: {secondary}")]
    RepairFailed { original: String, secondary: String },
}
