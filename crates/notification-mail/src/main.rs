//! 邮件通知服务
//!
//! 以进程内协作方装配邮件通知消费者，等待通知总线投递。

use std::sync::Arc;

use anyhow::Result;
use notifications_shared::{config::AppConfig, observability};
use tokio::signal;
use tracing::info;

use notification_mail::{
    MailNotificationSender, NotificationConsumer, SyntaxAddressValidator,
    memory::{InMemoryConfigStore, InMemoryUserDirectory, LogMailTransport, StaticUrlGenerator},
    templates::BundledLocalization,
};

const SERVICE_NAME: &str = "notification-mail";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 加载配置，失败时使用默认值
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        AppConfig::default()
    });

    // 2. 初始化日志与指标
    let _guard = observability::init(SERVICE_NAME, &config.observability).await?;

    info!("Starting {}...", SERVICE_NAME);
    info!(
        environment = %config.environment,
        from = %config.mail.from_address,
        base_url = %config.mail.base_url,
        default_locale = %config.mail.default_locale,
        "Configuration loaded"
    );

    // 3. 装配协作方
    let config_store = Arc::new(InMemoryConfigStore::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let urls = Arc::new(StaticUrlGenerator::new(&config.mail.base_url));

    let sender = Arc::new(MailNotificationSender::new(
        config_store,
        Arc::new(SyntaxAddressValidator),
        Arc::new(BundledLocalization::new()),
        Arc::new(LogMailTransport),
        &config.mail,
    ));

    let _consumer = NotificationConsumer::new(sender, users, urls);
    info!("Notification consumer ready");

    // 4. 等待关闭信号
    signal::ctrl_c().await?;
    info!("Shutting down {}...", SERVICE_NAME);

    Ok(())
}
