// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 启动Prometheus指标导出器
///
/// # 参数
///
/// * `listen_addr` - 导出器监听地址
///
/// # 返回值
///
/// * `Ok(())` - 导出器已启动或安装失败已记录
/// * `Err(anyhow::Error)` - 地址无效
pub fn init_metrics(listen_addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = listen_addr.parse()?;

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return Ok(());
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "crawlgraph_tasks_total",
        "Crawl tasks processed, labelled by outcome"
    );
    describe_counter!(
        "crawlgraph_links_rejected_total",
        "Child links dropped by the link filter, labelled by predicate"
    );
    describe_counter!(
        "crawlgraph_dispatch_entries_total",
        "Child task entries submitted to the dispatch queue, labelled by result"
    );
    describe_counter!(
        "crawlgraph_push_total",
        "Pushes to subscribers, labelled by result"
    );
    describe_counter!(
        "crawlgraph_subscribers_reaped_total",
        "Stale subscriptions removed after a failed push"
    );
    describe_histogram!(
        "crawlgraph_push_duration_seconds",
        "Duration of a single push to a subscriber in seconds"
    );
}
