//! `estate simulate`
//!
//! Mounts the boundary selected for a category over a child that always
//! fails, then presses "Try Again" until the boundary recovers or exhausts
//! its retries. Each step is printed as one JSON line. Network boundaries
//! also poll `network.health_endpoint` and retry on their own when it comes
//! back.

use super::parse_category;
use anyhow::Result;
use clap::Args;
use estate_boundary::{
    BoundaryAction, BoundaryContext, BoundaryKind, ConnectivityMonitor, ErrorBoundary, Rendered,
};
use estate_core::effects::{HealthProbe, TelemetrySink};
use estate_core::{ErrorCategory, ErrorOptions, EstateConfig, RetryFailure};
use estate_effects::{HeadlessPlatform, HttpHealthProbe, HttpTelemetrySink};
use estate_reporting::ReportingService;
use serde::Serialize;
use serde_json::json;
use std::future::{self, Ready};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Args)]
pub struct SimulateArgs {
    /// Boundary category; the generic UI boundary when omitted
    #[arg(short = 'C', long, value_parser = parse_category)]
    category: Option<ErrorCategory>,

    /// Failure message raised by the child
    #[arg(short, long, default_value = "simulated render failure")]
    message: String,

    /// Retry attempts that fail before one succeeds; never succeeds when omitted
    #[arg(short, long)]
    failures: Option<u32>,

    /// Skip backoff delays
    #[arg(long)]
    fast: bool,
}

/// Run the subcommand.
pub async fn run(args: SimulateArgs, config: &EstateConfig) -> Result<()> {
    let platform = Arc::new(HeadlessPlatform::new(
        config.device.clone(),
        "app://estate/simulate",
    ));
    let sink = match &config.reporting.endpoint {
        Some(endpoint) => {
            let sink: Arc<dyn TelemetrySink> = Arc::new(HttpTelemetrySink::new(
                endpoint,
                config.network.request_timeout(),
            )?);
            Some(sink)
        }
        None => None,
    };
    let service = Arc::new(ReportingService::new(
        config.reporting.clone(),
        platform,
        sink,
    ));

    let mut settings = config.boundary.clone();
    if args.fast {
        settings.backoff_base_ms = 0;
    }
    let mut ctx = BoundaryContext::new(service.clone()).with_settings(settings);
    let network = BoundaryKind::for_category(args.category) == BoundaryKind::Network;
    if network {
        let probe = HttpHealthProbe::from_settings(&config.network)?
            .map(|probe| Arc::new(probe) as Arc<dyn HealthProbe>);
        ctx = ctx.with_connectivity(ConnectivityMonitor::from_settings(&config.network, probe));
    }
    let boundary = Arc::new(ErrorBoundary::for_category(args.category, ctx));
    boundary.mount().await;
    let watcher = network.then(|| {
        let boundary = boundary.clone();
        tokio::spawn(async move { boundary.auto_recover().await })
    });

    let category = args.category.unwrap_or(boundary.core().category());
    let record = service.factory().for_category(
        category,
        args.message,
        ErrorOptions::new().retry(flaky_hook(args.failures)),
    );

    let rendered = boundary.render(|| Err::<&str, _>(record));
    let mut step = 0;
    print_step(step, &boundary, describe(&rendered))?;

    if matches!(rendered, Rendered::Fallback(_)) {
        while retry_enabled(&boundary) {
            step += 1;
            let recovered = boundary.retry().await;
            let view = boundary.fallback();
            print_step(step, &boundary, json!({ "recovered": recovered, "fallback": view }))?;
        }
        let after = boundary.render(|| Ok::<_, &str>("child"));
        print_step(step + 1, &boundary, describe(&after))?;
    }

    if let Some(watcher) = watcher {
        watcher.abort();
    }
    boundary.core().context().connectivity.stop_probe();

    println!(
        "{}",
        serde_json::to_string(&json!({
            "sessionId": service.session_id(),
            "metrics": service.get_metrics(),
        }))?
    );
    Ok(())
}

fn retry_enabled(boundary: &ErrorBoundary) -> bool {
    boundary
        .fallback()
        .is_some_and(|view| view.is_enabled(BoundaryAction::Retry))
}

fn flaky_hook(failures: Option<u32>) -> impl Fn() -> Ready<Result<(), RetryFailure>> + Send + Sync {
    let calls = Arc::new(AtomicU32::new(0));
    move || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        let outcome = match failures {
            Some(limit) if n >= limit => Ok(()),
            _ => Err(RetryFailure::from(format!("attempt {} failed", n + 1))),
        };
        future::ready(outcome)
    }
}

fn describe<T: Serialize>(rendered: &Rendered<T>) -> serde_json::Value {
    match rendered {
        Rendered::Children(value) => json!({ "children": value }),
        Rendered::Fallback(view) => json!({ "fallback": view }),
        Rendered::Requirements(panel) => {
            json!({ "requirements": panel, "lines": panel.lines() })
        }
        Rendered::Degraded(value) => json!({ "degraded": value }),
    }
}

fn print_step(step: u32, boundary: &ErrorBoundary, body: serde_json::Value) -> Result<()> {
    let line = json!({
        "step": step,
        "boundary": boundary.kind(),
        "state": boundary.state(),
        "body": body,
    });
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flaky_hook_succeeds_after_failures() {
        let hook = flaky_hook(Some(2));
        assert!(hook().await.is_err());
        assert!(hook().await.is_err());
        assert!(hook().await.is_ok());

        let never = flaky_hook(None);
        for _ in 0..5 {
            assert!(never().await.is_err());
        }
    }
}
