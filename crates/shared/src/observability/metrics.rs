//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ObservabilityConfig;
use crate::error::SharedError;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(service_name: &str, config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| SharedError::Observability(e.to_string()))?;

    // 保存到全局，供其他地方获取指标快照
    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册邮件通知相关指标的描述
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!(
        "notifications_mail_ignored_total",
        "Notifications skipped because the user's policy denies email"
    );
    metrics::describe_counter!(
        "notifications_mail_dropped_total",
        "Notifications dropped because no valid recipient could be resolved"
    );
    metrics::describe_counter!("notifications_mail_sent_total", "Emails handed to the transport");
    metrics::describe_counter!(
        "notifications_mail_send_failures_total",
        "Emails the transport failed to deliver"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 获取全局 Prometheus handle（用于自定义渲染）
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录因用户策略而跳过的通知
#[inline]
pub fn record_notification_ignored() {
    metrics::counter!("notifications_mail_ignored_total").increment(1);
}

/// 记录因收件人无法解析而丢弃的通知
#[inline]
pub fn record_notification_dropped(reason: &str) {
    metrics::counter!("notifications_mail_dropped_total", "reason" => reason.to_string())
        .increment(1);
}

/// 记录邮件发送结果
#[inline]
pub fn record_email_sent(success: bool) {
    if success {
        metrics::counter!("notifications_mail_sent_total").increment(1);
    } else {
        metrics::counter!("notifications_mail_send_failures_total").increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_recorder_is_noop() {
        // 未安装 recorder 时记录指标不应 panic
        record_notification_ignored();
        record_notification_dropped("user_not_found");
        record_email_sent(true);
        record_email_sent(false);
    }

    #[test]
    fn test_handle_absent_before_init() {
        assert!(get_handle().is_none());
    }
}
