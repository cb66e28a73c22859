//! 邮件通知发送器
//!
//! 通过 `NotificationSender` trait 抽象策略判断、地址校验和发送，
//! consumer 只依赖该 trait。`MailNotificationSender` 是唯一的生产实现：
//! 发送前重新检查用户策略，按用户语言组装主题与正文后交给邮件传输。

use std::sync::Arc;

use async_trait::async_trait;
use notifications_shared::config::MailConfig;
use notifications_shared::observability::metrics::record_email_sent;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::memory::IdentityPreparer;
use crate::policy::PolicyEvaluator;
use crate::templates::{BODY_TEMPLATE, SUBJECT_TEMPLATE};
use crate::traits::{
    AddressValidator, Catalog, ConfigStore, LocalizationFactory, MailTransport,
    NotificationPreparer,
};
use crate::types::{ComposedMessage, Delivery, Notification};
use crate::validator::{EmailValidator, ValidationResult};

/// 用户语言配置的命名空间与键
pub const LANGUAGE_APP: &str = "core";
pub const LANGUAGE_KEY: &str = "lang";

/// 通知发送器 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 用户策略是否允许发送该通知
    async fn will_send(&self, notification: &Notification) -> bool;

    /// 校验候选收件地址
    fn validate_emails(&self, addresses: &[Option<String>]) -> ValidationResult;

    /// 组装并发送邮件
    ///
    /// 策略不允许时返回 `Delivery::Suppressed`；传输失败原样返回 `Err`，不重试。
    async fn send_notification(
        &self,
        notification: &Notification,
        server_url: &str,
        addresses: &[String],
    ) -> Result<Delivery>;
}

/// 邮件通知发送器
pub struct MailNotificationSender {
    policy: PolicyEvaluator,
    validator: EmailValidator,
    config_store: Arc<dyn ConfigStore>,
    localization: Arc<dyn LocalizationFactory>,
    preparer: Arc<dyn NotificationPreparer>,
    transport: Arc<dyn MailTransport>,
    from_address: String,
    from_name: String,
    default_locale: String,
}

impl MailNotificationSender {
    pub fn new(
        config_store: Arc<dyn ConfigStore>,
        address_validator: Arc<dyn AddressValidator>,
        localization: Arc<dyn LocalizationFactory>,
        transport: Arc<dyn MailTransport>,
        mail: &MailConfig,
    ) -> Self {
        Self {
            policy: PolicyEvaluator::new(config_store.clone()),
            validator: EmailValidator::new(address_validator),
            config_store,
            localization,
            preparer: Arc::new(IdentityPreparer),
            transport,
            from_address: mail.from_address.clone(),
            from_name: mail.from_name.clone(),
            default_locale: mail.default_locale.clone(),
        }
    }

    /// 替换通知预处理器
    pub fn with_preparer(mut self, preparer: Arc<dyn NotificationPreparer>) -> Self {
        self.preparer = preparer;
        self
    }

    /// 读取用户语言，读取失败时使用默认语言
    async fn user_locale(&self, user_id: &str) -> String {
        match self
            .config_store
            .get_user_value(user_id, LANGUAGE_APP, LANGUAGE_KEY, &self.default_locale)
            .await
        {
            Ok(locale) if !locale.is_empty() => locale,
            Ok(_) => self.default_locale.clone(),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    "读取用户语言失败，使用默认语言"
                );
                self.default_locale.clone()
            }
        }
    }

    /// 组装邮件主题、正文和收件人
    pub fn compose(
        &self,
        notification: &Notification,
        server_url: &str,
        addresses: &[String],
        catalog: &dyn Catalog,
    ) -> ComposedMessage {
        let notification_id = notification.id();

        let subject = catalog.translate(
            SUBJECT_TEMPLATE,
            &[
                ("server_url", server_url),
                ("notification_id", notification_id.as_str()),
                ("subject", notification.parsed_subject.as_str()),
            ],
        );
        let body = catalog.translate(
            BODY_TEMPLATE,
            &[
                ("subject", notification.parsed_subject.as_str()),
                ("message", notification.parsed_message.as_str()),
                ("notification_id", notification_id.as_str()),
                ("server_url", server_url),
            ],
        );

        ComposedMessage::new(&self.from_address, &self.from_name)
            .with_recipients(addresses.iter().cloned())
            .with_subject(subject)
            .with_plain_body(body)
    }
}

#[async_trait]
impl NotificationSender for MailNotificationSender {
    async fn will_send(&self, notification: &Notification) -> bool {
        self.policy.will_send(notification).await
    }

    fn validate_emails(&self, addresses: &[Option<String>]) -> ValidationResult {
        self.validator.validate_emails(addresses)
    }

    async fn send_notification(
        &self,
        notification: &Notification,
        server_url: &str,
        addresses: &[String],
    ) -> Result<Delivery> {
        // 以此处的检查为准，直接调用本方法的调用方同样受用户策略约束
        if !self.policy.will_send(notification).await {
            debug!(
                object_type = %notification.object_type,
                object_id = %notification.object_id,
                "用户策略不允许发送，跳过组装"
            );
            return Ok(Delivery::Suppressed);
        }

        let locale = self.user_locale(&notification.user).await;
        let catalog = self.localization.catalog(&locale).await;
        let prepared = self.preparer.prepare(notification, &locale).await?;

        let message = self.compose(&prepared, server_url, addresses, catalog.as_ref());

        if let Err(e) = self.transport.send(&message).await {
            record_email_sent(false);
            error!(
                object_type = %notification.object_type,
                object_id = %notification.object_id,
                to = %message.recipient_list(),
                error = %e,
                "邮件传输失败"
            );
            return Err(e);
        }

        record_email_sent(true);
        info!(
            object_type = %notification.object_type,
            object_id = %notification.object_id,
            to = %message.recipient_list(),
            locale = %catalog.locale(),
            "邮件通知已发送"
        );

        Ok(Delivery::Sent(message))
    }
}

// ---------------------------------------------------------------------------
// 测试
// ---------------------------------------------------------------------------
