//! 共享库
//!
//! 包含邮件通知服务共用的配置加载、错误类型和可观测性初始化代码。

pub mod config;
pub mod error;
pub mod observability;
