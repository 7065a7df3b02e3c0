use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Metrics は autoload サーバーの Prometheus メトリクスを表す。
/// 一覧表示、操作の適用、トークン拒否、ストア障害の件数を数える。
pub struct Metrics {
    listing_requests_total: IntCounter,
    actions_applied_total: IntCounterVec,
    token_rejected_total: IntCounter,
    store_errors_total: IntCounterVec,
    registry: Registry,
}

impl Metrics {
    /// new は Prometheus メトリクスを初期化して返す。
    /// service_name はメトリクスの service ラベルに使用される。
    pub fn new(service_name: &str) -> Self {
        let registry = Registry::new();

        let listing_requests_total = IntCounter::with_opts(
            Opts::new(
                "autoload_listing_requests_total",
                "Total number of rendered autoload listing pages",
            )
            .const_label("service", service_name),
        )
        .expect("failed to create autoload_listing_requests_total counter");

        let actions_applied_total = IntCounterVec::new(
            Opts::new(
                "autoload_actions_applied_total",
                "Total number of applied autoload actions",
            )
            .const_label("service", service_name),
            &["action"],
        )
        .expect("failed to create autoload_actions_applied_total counter");

        let token_rejected_total = IntCounter::with_opts(
            Opts::new(
                "autoload_token_rejected_total",
                "Total number of actions rejected for an invalid confirmation token",
            )
            .const_label("service", service_name),
        )
        .expect("failed to create autoload_token_rejected_total counter");

        let store_errors_total = IntCounterVec::new(
            Opts::new(
                "autoload_store_errors_total",
                "Total number of settings store failures",
            )
            .const_label("service", service_name),
            &["operation"],
        )
        .expect("failed to create autoload_store_errors_total counter");

        registry
            .register(Box::new(listing_requests_total.clone()))
            .expect("failed to register autoload_listing_requests_total");
        registry
            .register(Box::new(actions_applied_total.clone()))
            .expect("failed to register autoload_actions_applied_total");
        registry
            .register(Box::new(token_rejected_total.clone()))
            .expect("failed to register autoload_token_rejected_total");
        registry
            .register(Box::new(store_errors_total.clone()))
            .expect("failed to register autoload_store_errors_total");

        Self {
            listing_requests_total,
            actions_applied_total,
            token_rejected_total,
            store_errors_total,
            registry,
        }
    }

    pub fn record_listing_request(&self) {
        self.listing_requests_total.inc();
    }

    /// action は "delete" / "disable" のいずれか。
    pub fn record_action_applied(&self, action: &str) {
        self.actions_applied_total.with_label_values(&[action]).inc();
    }

    pub fn record_token_rejected(&self) {
        self.token_rejected_total.inc();
    }

    /// operation は "list" / "action" のいずれか。
    pub fn record_store_error(&self, operation: &str) {
        self.store_errors_total.with_label_values(&[operation]).inc();
    }

    /// gather_metrics は Prometheus テキストフォーマットでメトリクスを返す。
    pub fn gather_metrics(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
