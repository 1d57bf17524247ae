use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Notifications raised and removed (by kind / removal reason)
// - Order submissions (accepted, rejected, settled, duration)
//
// ============================================================================

/// Central metrics registry for the client
pub struct Metrics {
    registry: Registry,

    // Notification Metrics
    pub notifications_raised: IntCounterVec,
    pub notifications_removed: IntCounterVec,
    pub notifications_active: IntGauge,

    // Submission Metrics
    pub order_submissions: IntCounter,
    pub order_submissions_rejected: IntCounterVec,
    pub order_settlements: IntCounterVec,
    pub order_submission_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Notification Metrics
        let notifications_raised = IntCounterVec::new(
            Opts::new("notifications_raised_total", "Total notifications raised"),
            &["kind"],
        )?;
        registry.register(Box::new(notifications_raised.clone()))?;

        let notifications_removed = IntCounterVec::new(
            Opts::new("notifications_removed_total", "Total notifications removed"),
            &["reason"],
        )?;
        registry.register(Box::new(notifications_removed.clone()))?;

        let notifications_active = IntGauge::new(
            "notifications_active",
            "Notifications currently shown",
        )?;
        registry.register(Box::new(notifications_active.clone()))?;

        // Submission Metrics
        let order_submissions = IntCounter::new(
            "order_submissions_total",
            "Total order submissions sent to the gateway",
        )?;
        registry.register(Box::new(order_submissions.clone()))?;

        let order_submissions_rejected = IntCounterVec::new(
            Opts::new("order_submissions_rejected_total", "Submit requests ignored by the controller"),
            &["reason"],
        )?;
        registry.register(Box::new(order_submissions_rejected.clone()))?;

        let order_settlements = IntCounterVec::new(
            Opts::new("order_settlements_total", "Settled order submissions"),
            &["outcome"],
        )?;
        registry.register(Box::new(order_settlements.clone()))?;

        let order_submission_duration = HistogramVec::new(
            HistogramOpts::new("order_submission_duration_seconds", "Time from submit to settlement")
                .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(order_submission_duration.clone()))?;

        Ok(Self {
            registry,
            notifications_raised,
            notifications_removed,
            notifications_active,
            order_submissions,
            order_submissions_rejected,
            order_settlements,
            order_submission_duration,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition format of every registered metric
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn record_notification_raised(&self, kind: &str, active: usize) {
        self.notifications_raised.with_label_values(&[kind]).inc();
        self.notifications_active.set(active as i64);
    }

    pub fn record_notifications_removed(&self, reason: &str, count: usize, active: usize) {
        if count > 0 {
            self.notifications_removed
                .with_label_values(&[reason])
                .inc_by(count as u64);
        }
        self.notifications_active.set(active as i64);
    }

    pub fn record_submission_rejected(&self, reason: &str) {
        self.order_submissions_rejected.with_label_values(&[reason]).inc();
    }

    pub fn record_settlement(&self, outcome: &str, duration_secs: f64) {
        self.order_settlements.with_label_values(&[outcome]).inc();
        self.order_submission_duration
            .with_label_values(&[outcome])
            .observe(duration_secs);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
