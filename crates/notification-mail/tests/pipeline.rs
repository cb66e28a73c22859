//! 邮件通知端到端测试
//!
//! 使用进程内协作方串起 consumer -> sender -> transport，验证用户策略、
//! 地址校验和用户语言对最终邮件的影响。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use notification_mail::{
    Action, ComposedMessage, MailError, MailNotificationSender, Notification, NotificationConsumer,
    NotificationSender, SyntaxAddressValidator, User,
    memory::{InMemoryConfigStore, InMemoryUserDirectory, StaticUrlGenerator},
    policy::{APP_NAMESPACE, SENDING_OPTION_KEY},
    templates::BundledLocalization,
    traits::MailTransport,
};
use notifications_shared::config::MailConfig;

/// 记录所有投递的邮件
#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<ComposedMessage>>,
    fail: bool,
}

impl RecordingTransport {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn sent(&self) -> Vec<ComposedMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: &ComposedMessage) -> notification_mail::Result<()> {
        if self.fail {
            return Err(MailError::Transport {
                recipients: message.recipient_list(),
                reason: "smtp unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

struct Harness {
    config_store: Arc<InMemoryConfigStore>,
    users: Arc<InMemoryUserDirectory>,
    transport: Arc<RecordingTransport>,
    sender: Arc<MailNotificationSender>,
    consumer: NotificationConsumer,
}

impl Harness {
    fn new(transport: RecordingTransport) -> Self {
        let config_store = Arc::new(InMemoryConfigStore::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let transport = Arc::new(transport);

        let sender = Arc::new(MailNotificationSender::new(
            config_store.clone(),
            Arc::new(SyntaxAddressValidator),
            Arc::new(BundledLocalization::new()),
            transport.clone(),
            &MailConfig {
                from_address: "noreply@cloud.example".to_string(),
                from_name: "Cloud".to_string(),
                ..Default::default()
            },
        ));
        let consumer = NotificationConsumer::new(
            sender.clone(),
            users.clone(),
            Arc::new(StaticUrlGenerator::new("http://what.ever/oc/")),
        );

        Self {
            config_store,
            users,
            transport,
            sender,
            consumer,
        }
    }

    async fn add_user(&self, user: User, option: &str) {
        self.config_store
            .set_user_value(&user.id, APP_NAMESPACE, SENDING_OPTION_KEY, option)
            .await;
        self.users.insert(user).await;
    }
}

fn share_notification(user: &str) -> Notification {
    Notification::new("share", "42", user)
        .with_parsed_subject("alice shared a file with you")
        .with_parsed_message("report.pdf is now available")
}

#[tokio::test]
async fn test_action_option_only_mails_actionable_notifications() {
    let harness = Harness::new(RecordingTransport::default());
    harness
        .add_user(User::new("bob").with_email("bob@cloud.example"), "action")
        .await;

    harness.consumer.notify(&share_notification("bob")).await;
    assert!(harness.transport.sent().is_empty());

    harness
        .consumer
        .notify(&share_notification("bob").with_action(Action::new("accept")))
        .await;

    let sent = harness.transport.sent();
    assert_eq!(sent.len(), 1);
    let message = &sent[0];
    assert_eq!(message.from_address, "noreply@cloud.example");
    assert_eq!(message.to.len(), 1);
    assert_eq!(message.to.get("bob@cloud.example"), Some(&None));
    assert!(message.subject.contains("share#42"));
    assert!(message.subject.contains("http://what.ever/oc"));
    assert!(message.plain_body.contains("report.pdf is now available"));
}

#[tokio::test]
async fn test_default_option_never_sends() {
    let harness = Harness::new(RecordingTransport::default());
    // 未设置发送选项时按 never 处理
    harness
        .users
        .insert(User::new("carol").with_email("carol@cloud.example"))
        .await;

    harness
        .consumer
        .notify(&share_notification("carol").with_action(Action::new("accept")))
        .await;

    assert!(harness.transport.sent().is_empty());
}

#[tokio::test]
async fn test_invalid_address_is_dropped() {
    let harness = Harness::new(RecordingTransport::default());
    harness
        .add_user(User::new("dave").with_email("wiiiiii"), "always")
        .await;

    harness.consumer.notify(&share_notification("dave")).await;

    assert!(harness.transport.sent().is_empty());
}

#[tokio::test]
async fn test_user_language_selects_catalog() {
    let harness = Harness::new(RecordingTransport::default());
    harness
        .add_user(User::new("erika").with_email("erika@cloud.example"), "always")
        .await;
    harness
        .config_store
        .set_user_value("erika", "core", "lang", "de")
        .await;

    harness.consumer.notify(&share_notification("erika")).await;

    let sent = harness.transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.starts_with("[http://what.ever/oc] Benachrichtigung share#42"));
}

#[tokio::test]
async fn test_direct_send_respects_policy() {
    let harness = Harness::new(RecordingTransport::default());
    harness
        .add_user(User::new("frank").with_email("frank@cloud.example"), "never")
        .await;

    let delivery = harness
        .sender
        .send_notification(
            &share_notification("frank"),
            "http://what.ever/oc",
            &["frank@cloud.example".to_string()],
        )
        .await
        .unwrap();

    assert!(!delivery.is_sent());
    assert!(harness.transport.sent().is_empty());
}

#[tokio::test]
async fn test_transport_failure_does_not_reach_bus() {
    let harness = Harness::new(RecordingTransport::failing());
    harness
        .add_user(User::new("grace").with_email("grace@cloud.example"), "always")
        .await;

    // notify 不返回错误，失败只记录日志
    harness.consumer.notify(&share_notification("grace")).await;

    let result = harness
        .sender
        .send_notification(
            &share_notification("grace"),
            "http://what.ever/oc",
            &["grace@cloud.example".to_string()],
        )
        .await;
    assert!(matches!(result, Err(MailError::Transport { .. })));
}
