//! 邮件发送策略
//!
//! 用户通过 `notificationsmail.email_sending_option` 选择何时接收邮件：
//! `never`（默认）、`always`、`action`（仅可操作的通知）。

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::warn;

use crate::traits::ConfigStore;
use crate::types::Notification;

/// 配置命名空间
pub const APP_NAMESPACE: &str = "notificationsmail";
/// 策略配置键
pub const SENDING_OPTION_KEY: &str = "email_sending_option";

/// 邮件发送选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailSendingOption {
    #[default]
    Never,
    Always,
    /// 仅当通知带有可操作项时发送
    Action,
}

impl EmailSendingOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Always => "always",
            Self::Action => "action",
        }
    }

    /// 解析存储的配置值，无法识别的值按 `Never` 处理
    pub fn from_config_value(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// 在该选项下，给定是否存在可操作项时是否允许发送
    pub fn permits(&self, has_actions: bool) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::Action => has_actions,
        }
    }
}

impl FromStr for EmailSendingOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Self::Never),
            "always" => Ok(Self::Always),
            "action" => Ok(Self::Action),
            other => Err(format!("unknown email sending option: {other}")),
        }
    }
}

impl fmt::Display for EmailSendingOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 策略评估器
///
/// 无状态，每次调用都重新读取用户配置。
#[derive(Clone)]
pub struct PolicyEvaluator {
    config: Arc<dyn ConfigStore>,
}

impl PolicyEvaluator {
    pub fn new(config: Arc<dyn ConfigStore>) -> Self {
        Self { config }
    }

    /// 读取用户的发送选项；配置存储不可用时按 `Never` 处理
    pub async fn sending_option(&self, user_id: &str) -> EmailSendingOption {
        match self
            .config
            .get_user_value(
                user_id,
                APP_NAMESPACE,
                SENDING_OPTION_KEY,
                EmailSendingOption::Never.as_str(),
            )
            .await
        {
            Ok(value) => EmailSendingOption::from_config_value(&value),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    "读取邮件发送策略失败，按 never 处理"
                );
                EmailSendingOption::Never
            }
        }
    }

    /// 该通知是否允许通过邮件发送给目标用户
    pub async fn will_send(&self, notification: &Notification) -> bool {
        self.sending_option(&notification.user)
            .await
            .permits(notification.has_actions())
    }
}
