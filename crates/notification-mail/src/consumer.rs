//! 通知消费者
//!
//! 通知总线对每条通知调用一次 [`NotificationConsumer::notify`]。
//! 邮件只是站内通知的旁路，任何失败都只记录日志，不向总线抛出。

use std::sync::Arc;

use notifications_shared::observability::metrics::{
    record_notification_dropped, record_notification_ignored,
};
use tracing::{debug, error, warn};

use crate::sender::NotificationSender;
use crate::traits::{UrlGenerator, UserDirectory};
use crate::types::{Delivery, Notification};

/// 通知消费者
///
/// 依次完成策略快速检查、用户查询、地址校验，再交给发送器。
pub struct NotificationConsumer {
    sender: Arc<dyn NotificationSender>,
    users: Arc<dyn UserDirectory>,
    urls: Arc<dyn UrlGenerator>,
}

impl NotificationConsumer {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        users: Arc<dyn UserDirectory>,
        urls: Arc<dyn UrlGenerator>,
    ) -> Self {
        Self {
            sender,
            users,
            urls,
        }
    }

    /// 处理一条通知
    pub async fn notify(&self, notification: &Notification) {
        // 快速路径只用于省去后续查询，是否发送以 sender 内的检查为准
        if !self.sender.will_send(notification).await {
            debug!(
                object_type = %notification.object_type,
                object_id = %notification.object_id,
                "{} ignored",
                notification.id()
            );
            record_notification_ignored();
            return;
        }

        let Some(address) = self.resolve_recipient(notification).await else {
            return;
        };

        let server_url = self.urls.absolute_url("/");

        match self
            .sender
            .send_notification(notification, &server_url, std::slice::from_ref(&address))
            .await
        {
            Ok(Delivery::Sent(_)) => {}
            Ok(Delivery::Suppressed) => {
                debug!(
                    object_type = %notification.object_type,
                    object_id = %notification.object_id,
                    "用户策略在发送前发生变化，已跳过"
                );
            }
            Err(e) => {
                error!(
                    object_type = %notification.object_type,
                    object_id = %notification.object_id,
                    code = e.code(),
                    error = %e,
                    "{} 邮件发送失败",
                    notification.id()
                );
            }
        }
    }

    /// 邮件不计入未读数
    pub fn get_count(&self, _notification: &Notification) -> u64 {
        0
    }

    /// 解析并校验目标用户的邮箱，无法发送时记录警告并返回 None
    async fn resolve_recipient(&self, notification: &Notification) -> Option<String> {
        let user = match self.users.get(&notification.user).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                cannot_send(notification, "user_not_found");
                return None;
            }
            Err(e) => {
                warn!(error = %e, user_id = %notification.user, "用户目录查询失败");
                cannot_send(notification, "directory_error");
                return None;
            }
        };

        let Some(address) = user.email_address() else {
            cannot_send(notification, "missing_email");
            return None;
        };

        let validation = self.sender.validate_emails(&[Some(address.to_string())]);
        if !validation.is_valid(address) {
            cannot_send(notification, "invalid_email");
            return None;
        }

        Some(address.to_string())
    }
}

fn cannot_send(notification: &Notification, reason: &'static str) {
    warn!(
        object_type = %notification.object_type,
        object_id = %notification.object_id,
        reason,
        "{} can't be sent",
        notification.id()
    );
    record_notification_dropped(reason);
}
