//! 统一错误处理模块
//!
//! 定义各 crate 共享的基础错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 基础设施错误类型
#[derive(Debug, Error)]
pub enum SharedError {
    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("可观测性初始化失败: {0}")]
    Observability(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, SharedError>;

impl SharedError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Observability(_) => "OBSERVABILITY_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            SharedError::Observability("x".to_string()).code(),
            "OBSERVABILITY_ERROR"
        );
        assert_eq!(SharedError::Internal("x".to_string()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_error_display() {
        let err = SharedError::Internal("recorder already installed".to_string());
        assert_eq!(err.to_string(), "内部错误: recorder already installed");
    }
}
