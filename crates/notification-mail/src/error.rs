//! 邮件通知错误类型
//!
//! 区分外部协作方（用户目录、配置存储、邮件传输）的失败，
//! 便于调用方决定记录日志后丢弃还是向上传播。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("邮件发送失败: 收件人={recipients}, 原因={reason}")]
    Transport { recipients: String, reason: String },

    #[error("用户目录查询失败: user={user_id}, 原因={reason}")]
    Directory { user_id: String, reason: String },

    #[error("读取用户配置失败: {app}.{key}, 原因={reason}")]
    ConfigStore {
        app: String,
        key: String,
        reason: String,
    },

    #[error("通知预处理失败: {notification}, 原因={reason}")]
    Preparation {
        notification: String,
        reason: String,
    },

    #[error(transparent)]
    Shared(#[from] notifications_shared::error::SharedError),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, MailError>;

impl MailError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "TRANSPORT_FAILED",
            Self::Directory { .. } => "DIRECTORY_FAILED",
            Self::ConfigStore { .. } => "CONFIG_STORE_FAILED",
            Self::Preparation { .. } => "PREPARATION_FAILED",
            Self::Shared(e) => e.code(),
        }
    }
}
