//! 错误类型
//!
//! 配置与构建阶段唯一对外可见的错误。路由失败、容量拒绝等运行期情况属于正常结果，
//! 只计入统计，不会以错误形式返回。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unsupported topology `{name}` (supported: {supported})")]
    UnsupportedTopology { name: String, supported: String },

    #[error("routing algorithm `{algorithm}` is not supported on `{topology}` (supported: {supported})")]
    UnsupportedRouting {
        algorithm: String,
        topology: String,
        supported: String,
    },

    #[error("unsupported traffic pattern `{0}` (supported: uniform, transpose, hotspot)")]
    UnsupportedTraffic(String),

    #[error("invalid {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}
