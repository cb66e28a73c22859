//! 通知类型定义
//!
//! 定义从通知总线收到的通知、目录中的用户以及待发送邮件的数据结构。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 通知上的可操作项
///
/// 对邮件服务而言只是一个标记：存在即表示该通知需要用户响应。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub label: String,
    #[serde(default)]
    pub link: Option<String>,
}

impl Action {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// 通知
///
/// 由上游通知子系统生成，主题与正文已经渲染完毕。邮件服务只读不改。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notification {
    /// 关联对象类型
    pub object_type: String,
    /// 关联对象 ID
    pub object_id: String,
    /// 目标用户 ID
    pub user: String,
    pub actions: Vec<Action>,
    /// 已渲染的主题
    pub parsed_subject: String,
    /// 已渲染的正文
    pub parsed_message: String,
}

impl Notification {
    /// 创建新通知
    pub fn new(
        object_type: impl Into<String>,
        object_id: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            object_type: object_type.into(),
            object_id: object_id.into(),
            user: user.into(),
            ..Default::default()
        }
    }

    /// 添加可操作项
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_parsed_subject(mut self, subject: impl Into<String>) -> Self {
        self.parsed_subject = subject.into();
        self
    }

    pub fn with_parsed_message(mut self, message: impl Into<String>) -> Self {
        self.parsed_message = message.into();
        self
    }

    /// 通知标识，格式为 `<objectType>#<objectId>`，用于日志和邮件主题
    pub fn id(&self) -> String {
        format!("{}#{}", self.object_type, self.object_id)
    }

    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }
}

/// 用户目录中的用户
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// 邮箱地址，空字符串视为未设置
    pub fn email_address(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }
}

/// 组装完成的邮件
///
/// 每次发送单独构建，交给邮件传输后即丢弃。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposedMessage {
    pub from_address: String,
    pub from_name: String,
    /// 收件人地址 -> 显示名称（本服务始终为 None）
    pub to: BTreeMap<String, Option<String>>,
    pub subject: String,
    pub plain_body: String,
}

impl ComposedMessage {
    pub fn new(from_address: impl Into<String>, from_name: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
            from_name: from_name.into(),
            ..Default::default()
        }
    }

    /// 设置收件人，每个地址都不带显示名称
    pub fn with_recipients<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to = addresses.into_iter().map(|a| (a.into(), None)).collect();
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_plain_body(mut self, body: impl Into<String>) -> Self {
        self.plain_body = body.into();
        self
    }

    /// 收件人地址列表（逗号分隔），用于日志
    pub fn recipient_list(&self) -> String {
        self.to.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// 发送结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// 邮件已交给传输层
    Sent(ComposedMessage),
    /// 用户策略不允许发送，未组装也未调用传输层
    Suppressed,
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }

    pub fn message(&self) -> Option<&ComposedMessage> {
        match self {
            Self::Sent(message) => Some(message),
            Self::Suppressed => None,
        }
    }
}
