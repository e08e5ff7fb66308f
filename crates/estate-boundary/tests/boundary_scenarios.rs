//! Boundary scenarios: retry exhaustion, capability preemption, panic
//! capture, automatic recovery, background probing and graceful degradation.

use assert_matches::assert_matches;
use estate_boundary::{
    BoundaryAction, BoundaryContext, BoundaryKind, BoundaryState, ConnectivityMonitor,
    ErrorBoundary, NetworkBoundary, Rendered, UiBoundary,
};
use estate_core::effects::ProbeError;
use estate_core::{
    BoundarySettings, Environment, ErrorCategory, ErrorOptions, NetworkSettings,
    ReportingSettings, RetryFailure, Severity,
};
use estate_reporting::ReportingService;
use estate_testkit::{failing_retry, flaky_retry, MockPlatform, ScriptedProbe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

fn context(platform: Arc<MockPlatform>, environment: Environment) -> BoundaryContext {
    let settings = ReportingSettings {
        environment,
        ..ReportingSettings::default()
    };
    let service = Arc::new(ReportingService::new(settings, platform, None));
    BoundaryContext::new(service).with_settings(BoundarySettings {
        max_retries: 3,
        ..BoundarySettings::default()
    })
}

fn dev_context(platform: Arc<MockPlatform>) -> BoundaryContext {
    context(platform, Environment::Development)
}

#[tokio::test]
async fn network_boundary_exhausts_after_three_failed_retries() {
    let platform = Arc::new(MockPlatform::new());
    let boundary = ErrorBoundary::for_category(
        Some(ErrorCategory::Network),
        dev_context(platform.clone()),
    );
    assert_eq!(boundary.kind(), BoundaryKind::Network);

    let (hooks, calls) = failing_retry();
    let record = boundary
        .core()
        .service()
        .factory()
        .network_error("fetch failed", ErrorOptions::new().hooks(hooks));
    let rendered = boundary.render(|| Err::<(), _>(record));
    assert!(rendered.fallback().unwrap().is_enabled(BoundaryAction::Retry));

    for attempt in 1..=3 {
        assert!(!boundary.retry().await);
        assert_eq!(boundary.core().retry_count(), attempt);
    }

    assert_eq!(boundary.state(), BoundaryState::Exhausted);
    let view = boundary.fallback().unwrap();
    assert!(!view.is_enabled(BoundaryAction::Retry));
    assert!(view.is_enabled(BoundaryAction::ReloadPage));

    // Retrying an exhausted boundary runs nothing.
    assert!(!boundary.retry().await);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(platform.clock().sleeps(), vec![1000, 2000, 4000]);

    assert!(boundary.perform(BoundaryAction::ReloadPage).await);
    assert_eq!(platform.reload_count(), 1);
}

#[tokio::test]
async fn ar_boundary_preempts_children_without_camera() {
    let platform = Arc::new(MockPlatform::new().without_camera());
    let boundary = ErrorBoundary::for_category(
        Some(ErrorCategory::AugmentedReality),
        dev_context(platform),
    );
    boundary.mount().await;

    let mut rendered_child = false;
    let rendered = boundary.render(|| {
        rendered_child = true;
        Ok::<_, &str>("3d-viewer")
    });

    let panel = assert_matches!(rendered, Rendered::Requirements(panel) => panel);
    assert!(panel
        .lines()
        .contains(&"Camera Access: unavailable".to_string()));
    assert!(panel.lines().contains(&"Gyroscope: available".to_string()));
    assert!(!rendered_child);
    assert_eq!(boundary.state(), BoundaryState::Clean);
    assert_eq!(boundary.core().service().get_metrics().total_errors, 0);
}

#[tokio::test]
async fn ar_boundary_renders_children_when_capable() {
    let boundary = ErrorBoundary::for_category(
        Some(ErrorCategory::AugmentedReality),
        dev_context(Arc::new(MockPlatform::new())),
    );
    boundary.mount().await;
    let rendered = boundary.render(|| Ok::<_, &str>("3d-viewer"));
    assert_eq!(rendered.children(), Some("3d-viewer"));
}

#[test]
fn panicking_child_is_captured_and_reported() {
    let boundary = ErrorBoundary::for_category(None, dev_context(Arc::new(MockPlatform::new())));
    let rendered = boundary.render(|| -> Result<u32, &str> { panic!("listing grid overflow") });

    let view = rendered.fallback().unwrap().clone();
    assert_eq!(view.boundary, BoundaryKind::Ui);
    assert!(view
        .technical_details
        .as_deref()
        .unwrap()
        .contains("listing grid overflow"));

    let record = boundary.core().error().unwrap();
    assert_eq!(record.category, ErrorCategory::Ui);
    assert_eq!(record.component_stack.as_deref(), Some("UiBoundary"));
    let service = boundary.core().service();
    assert_eq!(service.get_error(&record.id), Some(record));
}

#[test]
fn production_fallback_hides_diagnostics() {
    let boundary = ErrorBoundary::for_category(
        Some(ErrorCategory::Resource),
        context(Arc::new(MockPlatform::new()), Environment::Production),
    );
    let rendered = boundary.render(|| Err::<(), _>("quota exceeded"));
    let view = rendered.fallback().unwrap();
    assert_eq!(view.technical_details, None);
    assert!(!view.user_message.is_empty());
}

#[test]
fn caught_boundary_does_not_rerun_children() {
    let boundary = ErrorBoundary::for_category(None, dev_context(Arc::new(MockPlatform::new())));
    boundary.render(|| Err::<(), _>("first failure"));

    let mut ran = false;
    let rendered = boundary.render(|| {
        ran = true;
        Ok::<_, &str>(())
    });
    assert!(!ran);
    assert_matches!(rendered, Rendered::Fallback(_));
}

#[tokio::test]
async fn successful_retry_renders_children_again() {
    let boundary = ErrorBoundary::for_category(None, dev_context(Arc::new(MockPlatform::new())));
    let (hooks, _) = flaky_retry(1);
    let record = boundary
        .core()
        .service()
        .factory()
        .ui_error("widget crashed", ErrorOptions::new().hooks(hooks));
    boundary.render(|| Err::<(), _>(record));

    assert!(!boundary.retry().await);
    assert_eq!(boundary.state(), BoundaryState::Caught);
    assert!(boundary.retry().await);
    assert_eq!(boundary.state(), BoundaryState::Clean);
    assert_eq!(boundary.core().retry_count(), 0);

    let rendered = boundary.render(|| Ok::<_, &str>("listing"));
    assert_eq!(rendered.children(), Some("listing"));
}

#[tokio::test]
async fn concurrent_retry_is_ignored_while_recovering() {
    let boundary = UiBoundary::new(
        ErrorCategory::Ui,
        dev_context(Arc::new(MockPlatform::new())),
    );
    let gate = Arc::new(Notify::new());
    let hook_gate = gate.clone();
    let record = boundary.core().service().factory().ui_error(
        "slow widget",
        ErrorOptions::new().retry(move || {
            let gate = hook_gate.clone();
            async move {
                gate.notified().await;
                Ok::<(), RetryFailure>(())
            }
        }),
    );
    boundary.render(|| Err::<(), _>(record));

    let (first, second) = tokio::join!(boundary.core().retry(), async {
        while boundary.core().state() != BoundaryState::Recovering {
            tokio::task::yield_now().await;
        }
        let view = boundary.core().fallback().unwrap();
        assert!(!view.is_enabled(BoundaryAction::Retry));
        let second = boundary.core().retry().await;
        gate.notify_one();
        second
    });

    assert!(first);
    assert!(!second);
    assert_eq!(boundary.core().state(), BoundaryState::Clean);
}

#[tokio::test]
async fn network_boundary_recovers_when_back_online() {
    let platform = Arc::new(MockPlatform::new());
    let monitor = Arc::new(ConnectivityMonitor::new(false));
    let boundary = Arc::new(NetworkBoundary::new(
        dev_context(platform).with_connectivity(monitor.clone()),
    ));

    let (hooks, calls) = flaky_retry(0);
    let record = boundary
        .core()
        .service()
        .factory()
        .network_error("offline", ErrorOptions::new().hooks(hooks));
    let rendered = boundary.render(|| Err::<(), _>(record));
    assert_eq!(
        rendered.fallback().unwrap().help[0],
        "You appear to be offline."
    );

    let watcher = boundary.clone();
    let task = tokio::spawn(async move { watcher.auto_recover().await });
    // Let the watcher subscribe before the transition.
    tokio::time::sleep(Duration::from_millis(20)).await;
    monitor.set_online(true);

    for _ in 0..200 {
        if boundary.core().state() == BoundaryState::Clean {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(boundary.core().state(), BoundaryState::Clean);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    task.abort();
}

#[test]
fn graceful_ui_boundary_degrades_non_critical_failures() {
    let boundary = UiBoundary::new(
        ErrorCategory::Ui,
        dev_context(Arc::new(MockPlatform::new())),
    )
    .graceful();

    let rendered = boundary.render_or(|| Err::<&str, _>("chart failed"), || "static chart");
    assert_eq!(rendered, Rendered::Degraded("static chart"));
    assert_eq!(boundary.core().state(), BoundaryState::Degraded);
    assert!(boundary.core().fallback().is_none());

    // Degradation is permanent; the child is not retried.
    let rendered = boundary.render_or(|| Ok::<_, &str>("live chart"), || "static chart");
    assert_eq!(rendered, Rendered::Degraded("static chart"));
}

#[test]
fn graceful_ui_boundary_still_panels_critical_failures() {
    let boundary = UiBoundary::new(
        ErrorCategory::Resource,
        dev_context(Arc::new(MockPlatform::new())),
    )
    .graceful();
    let record = boundary.core().service().factory().create_error(
        ErrorCategory::Resource,
        Severity::Critical,
        "heap exhausted",
        "The page ran out of memory.",
        ErrorOptions::new(),
    );

    let rendered = boundary.render_or(|| Err::<&str, _>(record), || "static chart");
    let view = assert_matches!(rendered, Rendered::Fallback(view) => view);
    assert_eq!(view.severity, Severity::Critical);
    assert_eq!(boundary.core().state(), BoundaryState::Caught);
}

#[test]
fn dispatcher_defaults_to_ui_boundary() {
    let ctx = dev_context(Arc::new(MockPlatform::new()));
    let cases = [
        (None, BoundaryKind::Ui),
        (Some(ErrorCategory::WalletChain), BoundaryKind::Wallet),
        (Some(ErrorCategory::Network), BoundaryKind::Network),
        (Some(ErrorCategory::AugmentedReality), BoundaryKind::AugmentedReality),
        (Some(ErrorCategory::Permission), BoundaryKind::Ui),
    ];
    for (category, kind) in cases {
        let boundary = ErrorBoundary::for_category(category, ctx.clone());
        assert_eq!(boundary.kind(), kind);
    }

    let permission = ErrorBoundary::for_category(Some(ErrorCategory::Permission), ctx);
    permission.render(|| Err::<(), _>("blocked"));
    assert_eq!(
        permission.core().error().unwrap().category,
        ErrorCategory::Permission
    );
}

#[test]
fn dispatcher_keeps_graceful_degradation() {
    let ctx = dev_context(Arc::new(MockPlatform::new()));
    let boundary = ErrorBoundary::Ui(UiBoundary::new(ErrorCategory::Ui, ctx.clone()).graceful());
    let rendered = boundary.render_or(|| Err::<&str, _>("chart failed"), || "static chart");
    assert_eq!(rendered, Rendered::Degraded("static chart"));
    assert_eq!(boundary.state(), BoundaryState::Degraded);

    let network = ErrorBoundary::for_category(Some(ErrorCategory::Network), ctx);
    let rendered = network.render_or(|| Err::<&str, _>("fetch failed"), || "static chart");
    assert!(rendered.fallback().is_some());
    assert_eq!(network.state(), BoundaryState::Caught);
}

#[tokio::test(start_paused = true)]
async fn background_probe_drives_network_recovery() {
    let probe = Arc::new(ScriptedProbe::new([Err(ProbeError::Status(503)), Ok(())]));
    let monitor =
        ConnectivityMonitor::from_settings(&NetworkSettings::default(), Some(probe.clone()));
    let boundary = Arc::new(ErrorBoundary::for_category(
        Some(ErrorCategory::Network),
        dev_context(Arc::new(MockPlatform::new())).with_connectivity(monitor.clone()),
    ));

    let (hooks, calls) = flaky_retry(0);
    let record = boundary
        .core()
        .service()
        .factory()
        .network_error("gateway down", ErrorOptions::new().hooks(hooks));
    boundary.render(|| Err::<(), _>(record));

    let watcher = boundary.clone();
    let task = tokio::spawn(async move { watcher.auto_recover().await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!monitor.is_online());
    assert_eq!(boundary.state(), BoundaryState::Caught);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(monitor.is_online());
    assert_eq!(boundary.state(), BoundaryState::Clean);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(probe.calls(), 2);
    task.abort();
}
