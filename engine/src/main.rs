use std::io::BufRead;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{Instrument, info, warn};

use common::logger::{LogFormat, TraceId, child_span, init_logger, root_span};
use engine::{
    PriceEngine,
    cli::Cli,
    config::AppConfig,
    console::{ConsoleCommand, parse_command},
    view::{LogView, run_view},
};

/// Bars logged from the final snapshot on shutdown.
const FINAL_TAIL: usize = 5;

/// Blocking stdin reader on its own thread so it never holds up runtime shutdown.
fn spawn_stdin_reader() -> anyhow::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(16);

    std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })
        .context("spawn stdin reader")?;

    Ok(rx)
}

/// Handles console commands until stdin closes or `quit` is entered.
async fn run_console(engine: Arc<PriceEngine>, mut lines: mpsc::Receiver<String>) {
    while let Some(line) = lines.recv().await {
        let Some(cmd) = parse_command(&line) else {
            if !line.trim().is_empty() {
                warn!(input = %line, "unknown command (buy N | sell N | show | start | stop | quit)");
            }
            continue;
        };

        match cmd {
            ConsoleCommand::Trade(side, amount) => {
                let outcome = engine.apply_input(side, &amount);
                if outcome.is_applied() {
                    // input field reset
                    info!(?side, ?outcome, "order applied; amount reset to 0");
                } else {
                    info!(?side, ?outcome, "order ignored");
                }
            }
            ConsoleCommand::Show => {
                let snap = engine.snapshot();
                if let Some((point, label)) = snap.last() {
                    info!(
                        label = %label,
                        open = %format!("{:.2}", point.open),
                        close = %format!("{:.2}", point.close),
                        len = snap.len(),
                        revision = snap.revision,
                        "latest bar"
                    );
                }
            }
            ConsoleCommand::Start => {
                engine.start();
            }
            ConsoleCommand::Stop => {
                engine.stop();
            }
            ConsoleCommand::Quit => break,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = cli
        .apply(AppConfig::from_env().context("load config from environment")?)
        .context("apply command line overrides")?;

    let format = if cfg.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logger("engine", format);

    let trace_id = TraceId::default();
    let span = root_span("price_series", &trace_id);

    async move {
        info!(
            capacity = cfg.series.capacity.get(),
            tick_ms = cfg.series.tick_interval.as_millis() as u64,
            seed = ?cfg.seed,
            "starting price series engine"
        );

        let engine = PriceEngine::from_config(&cfg);
        if !engine.start() {
            anyhow::bail!("tick scheduler failed to start");
        }
        info!(
            every_ms = engine.tick_interval().as_millis() as u64,
            "series ticking"
        );

        let lines = spawn_stdin_reader()?;

        let view = tokio::spawn(
            run_view(Arc::downgrade(&engine), LogView::new(5), cfg.render_interval)
                .instrument(child_span("series_view")),
        );

        tokio::select! {
            _ = run_console(Arc::clone(&engine), lines) => {
                info!("console closed");
            }
            res = tokio::signal::ctrl_c() => {
                res.context("listen for ctrl-c")?;
                info!("shutdown signal received");
            }
        }

        engine.stop();

        let snap = engine.snapshot();
        let counters = engine.counters();
        info!(
            revision = snap.revision,
            ticks = counters.ticks_appended,
            mutations = counters.mutations_applied,
            ignored = counters.mutations_ignored,
            "engine stopped"
        );
        match serde_json::to_string(&snap.tail(FINAL_TAIL)) {
            Ok(json) => info!(tail = %json, "final series tail"),
            Err(e) => warn!(error = %e, "failed to encode final series tail"),
        }

        drop(engine);
        if let Ok(view) = view.await {
            info!(renders = view.rendered(), "view closed");
        }

        Ok::<(), anyhow::Error>(())
    }
    .instrument(span)
    .await
}
