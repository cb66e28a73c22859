//! 邮件通知服务
//!
//! 对每条系统通知判断是否需要按用户策略转发到邮箱，校验收件地址并生成邮件。
//! 通知总线、用户目录、配置存储、本地化目录和邮件传输均通过 trait 注入，
//! 本 crate 只负责决策、校验和组装。

pub mod consumer;
pub mod error;
pub mod memory;
pub mod policy;
pub mod sender;
pub mod templates;
pub mod traits;
pub mod types;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_utils;

pub use consumer::NotificationConsumer;
pub use error::{MailError, Result};
pub use policy::{EmailSendingOption, PolicyEvaluator};
pub use sender::{MailNotificationSender, NotificationSender};
pub use types::{Action, ComposedMessage, Delivery, Notification, User};
pub use validator::{EmailValidator, SyntaxAddressValidator, ValidationResult};
