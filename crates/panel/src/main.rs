use std::sync::Arc;

use dotenvy::dotenv;
use fanpanel::{PanelConfig, PanelController};
use fanpanel_core::{slider_id, FanId, PanelEvent, INTERVAL_INPUT_ID, RUNTIME_INPUT_ID};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::TerminalView;

type Panel = Arc<PanelController<TerminalView>>;

const HELP: &str = "\
commands:
  drag <front|back> <value>      move a slider without releasing it
  set <front|back> <value>       move and release a slider
  settings <runtime> <interval>  submit general settings
  refresh                        re-read fans and sync sliders
  start | stop                   resume or pause polling
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let config = PanelConfig::from_env();
    info!(device = %config.client.base_url, poll_ms = config.poll_period.as_millis() as u64, "Connecting panel");
    let panel: Panel = Arc::new(PanelController::from_config(&config, TerminalView::new())?);

    let report = panel.initialize().await;
    if !report.fans_loaded || !report.settings_loaded {
        warn!(?report, "device did not answer every startup request");
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => break,
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !run_line(&panel, line.trim()).await {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    panel.stop_polling().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,fanpanel=info,fan_panel=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}

/// Returns `false` once the user asks to quit. Operation errors are already
/// logged by the controller.
async fn run_line(panel: &Panel, line: &str) -> bool {
    // Raw events, e.g. {"type":"Refresh"}
    if line.starts_with('{') {
        match serde_json::from_str::<PanelEvent>(line) {
            Ok(event) => {
                let _ = panel.handle_event(event).await;
            }
            Err(err) => warn!(%err, "not a panel event"),
        }
        return true;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => {}
        ["quit" | "exit"] => return false,
        ["help"] => println!("{HELP}"),
        ["refresh"] => {
            let _ = panel.handle_event(PanelEvent::Refresh).await;
        }
        ["start"] => panel.start_polling().await,
        ["stop"] => {
            panel.stop_polling().await;
        }
        ["drag" | "set", fan, value] => {
            let Some(fan) = fan_named(fan) else {
                println!("unknown fan '{fan}'");
                return true;
            };
            panel.with_view(|view| view.type_into(&slider_id(fan), value)).await;
            let fan_name = fan.id().to_string();
            let _ = panel
                .handle_event(PanelEvent::SliderInput { fan_name: fan_name.clone(), value: value.to_string() })
                .await;
            if words[0] == "set" {
                let _ = panel
                    .handle_event(PanelEvent::SliderChange { fan_name, value: value.to_string() })
                    .await;
            }
        }
        ["settings", runtime, interval] => {
            panel
                .with_view(|view| {
                    view.type_into(RUNTIME_INPUT_ID, runtime);
                    view.type_into(INTERVAL_INPUT_ID, interval);
                })
                .await;
            let _ = panel.handle_event(PanelEvent::SubmitSettings).await;
        }
        _ => println!("{HELP}"),
    }
    true
}

fn fan_named(word: &str) -> Option<FanId> {
    FanId::ALL
        .into_iter()
        .find(|fan| fan.label().eq_ignore_ascii_case(word) || fan.id() == word)
}
