//! 默认协作方实现
//!
//! 进程内的用户目录、配置存储、URL 生成器、通知预处理和日志邮件传输。
//! 用于本地运行与集成测试；生产环境替换为真实后端时只需实现同一 trait。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::traits::{ConfigStore, MailTransport, NotificationPreparer, UrlGenerator, UserDirectory};
use crate::types::{ComposedMessage, Notification, User};

// ---------------------------------------------------------------------------
// 用户目录
// ---------------------------------------------------------------------------

/// 内存用户目录
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// 配置存储
// ---------------------------------------------------------------------------

/// 内存配置存储，键为 (user, app, key)
#[derive(Default)]
pub struct InMemoryConfigStore {
    values: RwLock<HashMap<(String, String, String), String>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_user_value(
        &self,
        user_id: impl Into<String>,
        app: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.values
            .write()
            .await
            .insert((user_id.into(), app.into(), key.into()), value.into());
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get_user_value(
        &self,
        user_id: &str,
        app: &str,
        key: &str,
        default: &str,
    ) -> Result<String> {
        let values = self.values.read().await;
        let value = values
            .get(&(user_id.to_string(), app.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_else(|| default.to_string());
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// URL 生成
// ---------------------------------------------------------------------------

/// 基于固定根地址拼接绝对 URL
#[derive(Debug, Clone)]
pub struct StaticUrlGenerator {
    base_url: String,
}

impl StaticUrlGenerator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl UrlGenerator for StaticUrlGenerator {
    fn absolute_url(&self, path: &str) -> String {
        match path.trim_start_matches('/') {
            // 根路径不带结尾斜杠
            "" => self.base_url.clone(),
            rest => format!("{}/{}", self.base_url, rest),
        }
    }
}

// ---------------------------------------------------------------------------
// 通知预处理
// ---------------------------------------------------------------------------

/// 原样返回通知，适用于上游已按用户语言渲染的场景
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPreparer;

#[async_trait]
impl NotificationPreparer for IdentityPreparer {
    async fn prepare(&self, notification: &Notification, _locale: &str) -> Result<Notification> {
        Ok(notification.clone())
    }
}

// ---------------------------------------------------------------------------
// 邮件传输
// ---------------------------------------------------------------------------

/// 仅记录日志的邮件传输
///
/// 生产环境中替换为 SMTP 或邮件服务商的 API 调用
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, message: &ComposedMessage) -> Result<()> {
        let message_id = Uuid::now_v7().to_string();

        info!(
            channel = "EMAIL",
            message_id = %message_id,
            from = %message.from_address,
            to = %message.recipient_list(),
            subject = %message.subject,
            body_length = message.plain_body.len(),
            "模拟发送邮件通知"
        );

        Ok(())
    }
}
