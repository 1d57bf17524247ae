use std::sync::Arc;
use std::time::Instant;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::notification::NotificationCenter;
use crate::gateway::OrderGateway;
use crate::metrics::Metrics;

use super::commands::DraftChange;
use super::validators::{is_valid_draft, validate_draft, DraftViolations};
use super::value_objects::{OrderDraft, OrderResponse, SubmissionState};

// ============================================================================
// Order Submission Controller
// ============================================================================
//
// Orchestrates: DraftChange → validity → submit → OrderGateway → notification
//
// State machine:
//   Idle --submit(valid draft)--> Submitting --settle(ok | err)--> Idle
//   submit(invalid draft or already submitting) is a no-op
//
// ============================================================================

/// Observable state of the order form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    pub draft: OrderDraft,
    pub valid: bool,
    pub submission: SubmissionState,
}

impl FormSnapshot {
    fn with_draft(draft: OrderDraft) -> Self {
        Self {
            valid: is_valid_draft(&draft),
            draft,
            submission: SubmissionState::Idle,
        }
    }

    pub fn is_submit_allowed(&self) -> bool {
        self.valid && self.submission == SubmissionState::Idle
    }
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Placed(OrderResponse),
    Failed(String),
}

pub fn success_message(draft: &OrderDraft) -> String {
    format!(
        "Order for {} ({}) placed successfully!",
        draft.customer_name, draft.item_type
    )
}

#[derive(Clone)]
pub struct OrderSubmissionController {
    inner: Arc<Inner>,
}

struct Inner {
    gateway: Arc<dyn OrderGateway>,
    notifications: NotificationCenter,
    form: watch::Sender<FormSnapshot>,
    metrics: Option<Arc<Metrics>>,
}

impl OrderSubmissionController {
    pub fn new(gateway: Arc<dyn OrderGateway>, notifications: NotificationCenter) -> Self {
        Self::build(gateway, notifications, None)
    }

    pub fn new_with_metrics(
        gateway: Arc<dyn OrderGateway>,
        notifications: NotificationCenter,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self::build(gateway, notifications, Some(metrics))
    }

    fn build(
        gateway: Arc<dyn OrderGateway>,
        notifications: NotificationCenter,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        let (form, _) = watch::channel(FormSnapshot::with_draft(OrderDraft::default()));
        Self {
            inner: Arc::new(Inner {
                gateway,
                notifications,
                form,
                metrics,
            }),
        }
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.inner.notifications
    }

    // ------------------------------------------------------------------------
    // Draft events
    // ------------------------------------------------------------------------

    /// Apply a user edit and recompute validity from the new draft.
    pub fn apply(&self, change: DraftChange) {
        self.inner.form.send_if_modified(|form| {
            let draft = change.apply_to(&form.draft);
            if draft == form.draft {
                return false;
            }
            form.valid = is_valid_draft(&draft);
            form.draft = draft;
            true
        });
    }

    pub fn set_customer_name(&self, name: impl Into<String>) {
        self.apply(DraftChange::CustomerName(name.into()));
    }

    pub fn set_item_type(&self, item: impl Into<String>) {
        self.apply(DraftChange::ItemType(item.into()));
    }

    pub fn reset_draft(&self) {
        self.apply(DraftChange::Reset);
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn snapshot(&self) -> FormSnapshot {
        self.inner.form.borrow().clone()
    }

    pub fn draft(&self) -> OrderDraft {
        self.inner.form.borrow().draft.clone()
    }

    pub fn is_valid(&self) -> bool {
        self.inner.form.borrow().valid
    }

    pub fn violations(&self) -> DraftViolations {
        validate_draft(&self.inner.form.borrow().draft)
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.inner.form.borrow().submission
    }

    pub fn is_submit_allowed(&self) -> bool {
        self.inner.form.borrow().is_submit_allowed()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormSnapshot> {
        self.inner.form.subscribe()
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// Submit the current draft.
    ///
    /// Returns `None` without side effects when submission is not allowed or
    /// there is no tokio runtime to run it on. Otherwise the state is
    /// `Submitting` by the time this returns, and the gateway call runs on a
    /// spawned task whose handle is returned.
    pub fn submit(&self) -> Option<JoinHandle<Settlement>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!(error = %e, "Cannot submit order outside a tokio runtime");
                if let Some(metrics) = &self.inner.metrics {
                    metrics.record_submission_rejected("no_runtime");
                }
                return None;
            }
        };

        let mut submitted = None;
        let mut rejection = None;

        self.inner.form.send_if_modified(|form| {
            if !form.valid {
                rejection = Some("invalid");
                return false;
            }
            if form.submission == SubmissionState::Submitting {
                rejection = Some("in_flight");
                return false;
            }
            form.submission = SubmissionState::Submitting;
            submitted = Some(form.draft.clone());
            true
        });

        let Some(draft) = submitted else {
            let reason = rejection.unwrap_or("invalid");
            tracing::debug!(reason = reason, "Ignoring submit request");
            if let Some(metrics) = &self.inner.metrics {
                metrics.record_submission_rejected(reason);
            }
            return None;
        };

        tracing::info!(
            customer = %draft.customer_name,
            item = %draft.item_type,
            "Submitting order"
        );
        if let Some(metrics) = &self.inner.metrics {
            metrics.order_submissions.inc();
        }

        // Held by the future itself, so dropping it unpolled still restores Idle
        let idle = IdleOnDrop(self.inner.clone());
        let inner = self.inner.clone();
        Some(runtime.spawn(async move {
            let _idle = idle;
            inner.settle(draft).await
        }))
    }
}

impl Inner {
    async fn settle(&self, draft: OrderDraft) -> Settlement {
        let started = Instant::now();
        let result = self.gateway.place_order(&draft).await;
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(response) => {
                tracing::info!(
                    customer = %draft.customer_name,
                    item = %draft.item_type,
                    msg = %response.msg,
                    "Order placed"
                );
                self.notifications.success(success_message(&draft));
                self.form.send_modify(|form| {
                    form.draft = OrderDraft::default();
                    form.valid = is_valid_draft(&form.draft);
                });
                if let Some(metrics) = &self.metrics {
                    metrics.record_settlement("placed", elapsed);
                }
                Settlement::Placed(response)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(
                    customer = %draft.customer_name,
                    kind = e.kind(),
                    error = %message,
                    "Order failed"
                );
                self.notifications.error(message.clone());
                if let Some(metrics) = &self.metrics {
                    metrics.record_settlement("failed", elapsed);
                }
                Settlement::Failed(message)
            }
        }
    }

    fn finish_submission(&self) {
        self.form.send_if_modified(|form| {
            let was_submitting = form.submission == SubmissionState::Submitting;
            form.submission = SubmissionState::Idle;
            was_submitting
        });
    }
}

/// Returns the form to Idle when the submission task ends, whichever way.
struct IdleOnDrop(Arc<Inner>);

impl Drop for IdleOnDrop {
    fn drop(&mut self) {
        self.0.finish_submission();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::NotificationKind;
    use crate::domain::order::errors::GatewayError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Gateway returning a fixed outcome, optionally held until released.
    struct StubGateway {
        calls: AtomicUsize,
        outcome: Result<OrderResponse, GatewayError>,
        release: Option<Arc<Notify>>,
    }

    impl StubGateway {
        fn ok() -> Self {
            Self::with_outcome(Ok(OrderResponse {
                success: true,
                msg: "Order placed".to_string(),
            }))
        }

        fn failing(error: GatewayError) -> Self {
            Self::with_outcome(Err(error))
        }

        fn with_outcome(outcome: Result<OrderResponse, GatewayError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome,
                release: None,
            }
        }

        fn held(mut self, release: Arc<Notify>) -> Self {
            self.release = Some(release);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OrderGateway for StubGateway {
        async fn place_order(&self, _draft: &OrderDraft) -> Result<OrderResponse, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(release) = &self.release {
                release.notified().await;
            }
            self.outcome.clone()
        }
    }

    struct PanickingGateway;

    #[async_trait]
    impl OrderGateway for PanickingGateway {
        async fn place_order(&self, _draft: &OrderDraft) -> Result<OrderResponse, GatewayError> {
            panic!("gateway blew up");
        }
    }

    fn controller_with(gateway: Arc<StubGateway>) -> OrderSubmissionController {
        OrderSubmissionController::new(gateway, NotificationCenter::default())
    }

    fn fill(controller: &OrderSubmissionController, name: &str, item: &str) {
        controller.set_customer_name(name);
        controller.set_item_type(item);
    }

    #[test]
    fn test_success_message_format() {
        let draft = OrderDraft::new("john", "espresso");
        assert_eq!(success_message(&draft), "Order for john (espresso) placed successfully!");
    }

    #[tokio::test]
    async fn test_starts_idle_with_empty_invalid_draft() {
        let controller = controller_with(Arc::new(StubGateway::ok()));

        assert_eq!(controller.submission_state(), SubmissionState::Idle);
        assert_eq!(controller.draft(), OrderDraft::default());
        assert!(!controller.is_valid());
        assert!(!controller.is_submit_allowed());
    }

    #[tokio::test]
    async fn test_validity_follows_draft_changes() {
        let controller = controller_with(Arc::new(StubGateway::ok()));

        controller.set_customer_name("john");
        assert!(!controller.is_submit_allowed());

        controller.set_item_type("espresso");
        assert!(controller.is_submit_allowed());

        controller.set_customer_name("john doe");
        assert!(!controller.is_submit_allowed());
        assert!(controller.violations().customer_name.is_some());

        controller.apply(DraftChange::Replace(OrderDraft::new("jane", "latte")));
        assert!(controller.is_submit_allowed());
        assert!(controller.violations().is_empty());
    }

    #[tokio::test]
    async fn test_submit_with_invalid_draft_is_noop() {
        let gateway = Arc::new(StubGateway::ok());
        let controller = controller_with(gateway.clone());
        fill(&controller, "john doe", "espresso");

        assert!(controller.submit().is_none());
        assert_eq!(controller.submission_state(), SubmissionState::Idle);
        assert_eq!(gateway.calls(), 0);
        assert!(controller.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_successful_submit_resets_draft_and_notifies() {
        let gateway = Arc::new(StubGateway::ok());
        let controller = controller_with(gateway.clone());
        fill(&controller, "john", "espresso");

        let handle = controller.submit().expect("submission should start");
        assert_eq!(controller.submission_state(), SubmissionState::Submitting);
        assert!(!controller.is_submit_allowed());

        let settlement = handle.await.unwrap();
        assert!(matches!(settlement, Settlement::Placed(_)));

        let notifications = controller.notifications().current();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind(), NotificationKind::Success);
        assert_eq!(notifications[0].message(), "Order for john (espresso) placed successfully!");

        assert_eq!(controller.draft(), OrderDraft::default());
        assert_eq!(controller.submission_state(), SubmissionState::Idle);
        assert!(!controller.is_submit_allowed());
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_draft_and_shows_error() {
        let gateway = Arc::new(StubGateway::failing(GatewayError::ServerFault(
            "Kafka connection error".to_string(),
        )));
        let controller = controller_with(gateway.clone());
        fill(&controller, "john", "espresso");

        let settlement = controller.submit().unwrap().await.unwrap();
        assert_eq!(settlement, Settlement::Failed("Kafka connection error".to_string()));

        let notifications = controller.notifications().current();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind(), NotificationKind::Error);
        assert_eq!(notifications[0].message(), "Kafka connection error");

        assert_eq!(controller.draft(), OrderDraft::new("john", "espresso"));
        assert_eq!(controller.submission_state(), SubmissionState::Idle);
        assert!(controller.is_submit_allowed());
    }

    #[tokio::test]
    async fn test_transport_error_text_is_normalized() {
        let gateway = Arc::new(StubGateway::failing(GatewayError::Transport(
            "connection refused".to_string(),
        )));
        let controller = controller_with(gateway);
        fill(&controller, "john", "latte");

        controller.submit().unwrap().await.unwrap();

        let notifications = controller.notifications().current();
        assert_eq!(notifications[0].message(), "Error: connection refused");
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_noop() {
        let release = Arc::new(Notify::new());
        let gateway = Arc::new(StubGateway::ok().held(release.clone()));
        let controller = controller_with(gateway.clone());
        fill(&controller, "john", "espresso");

        let first = controller.submit().expect("first submission starts");
        assert!(controller.submit().is_none());
        assert_eq!(controller.submission_state(), SubmissionState::Submitting);

        // Notifications stay usable while the order is in flight
        let id = controller.notifications().error("unrelated");
        assert!(controller.notifications().remove(id));

        release.notify_one();
        first.await.unwrap();

        assert_eq!(gateway.calls(), 1);
        assert_eq!(controller.notifications().len(), 1);
        assert_eq!(controller.submission_state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_submit_uses_draft_captured_at_submit_time() {
        let release = Arc::new(Notify::new());
        let gateway = Arc::new(StubGateway::ok().held(release.clone()));
        let controller = controller_with(gateway);
        fill(&controller, "john", "espresso");

        let handle = controller.submit().unwrap();
        controller.set_customer_name("jane");

        release.notify_one();
        handle.await.unwrap();

        let notifications = controller.notifications().current();
        assert_eq!(notifications[0].message(), "Order for john (espresso) placed successfully!");
        assert_eq!(controller.draft(), OrderDraft::default());
    }

    #[tokio::test]
    async fn test_gateway_panic_still_returns_to_idle() {
        let controller = OrderSubmissionController::new(
            Arc::new(PanickingGateway),
            NotificationCenter::default(),
        );
        fill(&controller, "john", "espresso");

        let result = controller.submit().unwrap().await;
        assert!(result.is_err());
        assert_eq!(controller.submission_state(), SubmissionState::Idle);
        assert!(controller.is_submit_allowed());
    }

    #[tokio::test]
    async fn test_aborted_submission_returns_to_idle() {
        let release = Arc::new(Notify::new());
        let gateway = Arc::new(StubGateway::ok().held(release));
        let controller = controller_with(gateway);
        fill(&controller, "john", "espresso");

        let handle = controller.submit().unwrap();
        tokio::task::yield_now().await;
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        assert_eq!(controller.submission_state(), SubmissionState::Idle);
        assert!(controller.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_submission_aborted_before_first_poll_returns_to_idle() {
        let gateway = Arc::new(StubGateway::ok());
        let controller = controller_with(gateway.clone());
        fill(&controller, "john", "espresso");

        let handle = controller.submit().unwrap();
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        assert_eq!(gateway.calls(), 0);
        assert_eq!(controller.submission_state(), SubmissionState::Idle);
        assert!(controller.is_submit_allowed());
        assert!(controller.submit().is_some());
    }

    #[test]
    fn test_submission_dropped_with_runtime_returns_to_idle() {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let gateway = Arc::new(StubGateway::ok().held(Arc::new(Notify::new())));
        let controller = controller_with(gateway);
        fill(&controller, "john", "espresso");

        let handle = runtime.block_on(async { controller.submit().unwrap() });
        assert_eq!(controller.submission_state(), SubmissionState::Submitting);

        drop(runtime);
        drop(handle);
        assert_eq!(controller.submission_state(), SubmissionState::Idle);
    }

    #[test]
    fn test_submit_without_runtime_is_rejected() {
        let gateway = Arc::new(StubGateway::ok());
        let controller = controller_with(gateway.clone());
        fill(&controller, "john", "espresso");

        assert!(controller.submit().is_none());
        assert_eq!(controller.submission_state(), SubmissionState::Idle);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_observe_lifecycle() {
        let controller = controller_with(Arc::new(StubGateway::ok()));
        let mut rx = controller.subscribe();
        fill(&controller, "john", "espresso");
        assert!(rx.borrow_and_update().is_submit_allowed());

        let handle = controller.submit().unwrap();
        assert_eq!(rx.borrow_and_update().submission, SubmissionState::Submitting);

        handle.await.unwrap();
        let form = rx.borrow_and_update().clone();
        assert_eq!(form.submission, SubmissionState::Idle);
        assert_eq!(form.draft, OrderDraft::default());
    }

    #[tokio::test]
    async fn test_metrics_count_submissions() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let controller = OrderSubmissionController::new_with_metrics(
            Arc::new(StubGateway::ok()),
            NotificationCenter::default(),
            metrics.clone(),
        );

        controller.submit();
        fill(&controller, "john", "espresso");
        controller.submit().unwrap().await.unwrap();

        assert_eq!(metrics.order_submissions.get(), 1);
        assert_eq!(
            metrics.order_submissions_rejected.with_label_values(&["invalid"]).get(),
            1
        );
        assert_eq!(metrics.order_settlements.with_label_values(&["placed"]).get(), 1);
    }
}
