//! 外部协作方 Trait 定义
//!
//! 邮件通知服务只依赖这些接口，不依赖具体实现，便于 mock 测试和替换后端。

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ComposedMessage, Notification, User};

/// 用户目录
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 按用户 ID 查询，用户不存在时返回 `Ok(None)`
    async fn get(&self, user_id: &str) -> Result<Option<User>>;
}

/// 邮箱地址语法校验
///
/// 只做语法检查，不查询目录或网络。
#[cfg_attr(test, mockall::automock)]
pub trait AddressValidator: Send + Sync {
    fn is_syntactically_valid(&self, address: &str) -> bool;
}

/// 按用户存储的配置
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// 读取 `app.key` 的用户级配置，未设置时返回 `default`
    async fn get_user_value(
        &self,
        user_id: &str,
        app: &str,
        key: &str,
        default: &str,
    ) -> Result<String>;
}

/// 某一语言的文本目录
pub trait Catalog: Send + Sync {
    fn locale(&self) -> &str;

    /// 翻译模板并填充 `{{name}}` 形式的参数
    fn translate(&self, template: &str, params: &[(&str, &str)]) -> String;
}

/// 本地化工厂
#[async_trait]
pub trait LocalizationFactory: Send + Sync {
    async fn catalog(&self, locale: &str) -> Arc<dyn Catalog>;
}

/// 绝对 URL 生成
#[cfg_attr(test, mockall::automock)]
pub trait UrlGenerator: Send + Sync {
    fn absolute_url(&self, path: &str) -> String;
}

/// 邮件传输
///
/// 传输失败返回 `Err`，重试与退避由传输层自行负责。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &ComposedMessage) -> Result<()>;
}

/// 通知预处理
///
/// 按收件人语言重新渲染通知主题与正文。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationPreparer: Send + Sync {
    async fn prepare(&self, notification: &Notification, locale: &str) -> Result<Notification>;
}
