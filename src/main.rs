//! SCBR console - terminal front-end for the diagnostic session client
//!
//! Each plain line is a turn; lines starting with `/` are commands.

use chrono::Local;
use scbr_console::api::FeedbackAction;
use scbr_console::format::{render_dashboard, render_message};
use scbr_console::session::{SessionEvent, TurnOutcome};
use scbr_console::{ClientConfig, HttpTransport, LoggingTransport, SessionController, SessionOptions};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Controller = SessionController<LoggingTransport<HttpTransport>>;

const HELP: &str = "\
commands:
  /patient <id>      select the patient for later turns
  /patient           clear the patient selection
  /reset             start a new session
  /feedback accept   accept the last answer
  /feedback reject   reject the last answer
  /feedback modify <corrected diagnosis>
  /report            print the full report of the last answer
  /health            probe the diagnostic service
  /quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Configuration
    let config = ClientConfig::from_env()?;
    tracing::info!(
        base_url = %config.api_base_url,
        timeout_secs = config.request_timeout.as_secs(),
        welcome_message = config.welcome_message,
        "Configuration loaded"
    );

    let transport = LoggingTransport::new(HttpTransport::from_config(&config)?);
    let controller: Arc<Controller> =
        Arc::new(SessionController::new(transport, SessionOptions::from(&config)));

    let renderer = tokio::spawn(render_loop(controller.clone(), controller.subscribe()));

    let snapshot = controller.snapshot();
    println!("session {}", snapshot.session_id());
    for message in snapshot.messages() {
        println!("{}", render_message(message, &Local));
    }
    println!("type /help for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !handle_line(&controller, line).await {
            break;
        }
    }

    renderer.abort();
    Ok(())
}

fn init_logging() {
    let json = std::env::var("SCBR_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scbr_console=info".into()),
        )
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| {
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
        }))
        .init();
}

/// Returns false when the user asked to quit
async fn handle_line(controller: &Arc<Controller>, line: String) -> bool {
    if !line.trim_start().starts_with('/') {
        // Turns run in the background so commands stay available meanwhile
        let controller = controller.clone();
        tokio::spawn(async move {
            match controller.submit(&line).await {
                TurnOutcome::Ignored(reason) if !line.trim().is_empty() => {
                    println!("(not sent: {reason})");
                }
                _ => {}
            }
        });
        return true;
    }
    let command = line.trim().strip_prefix('/').unwrap_or_default();

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(n, a)| (n, a.trim()));

    match name {
        "quit" | "exit" => return false,
        "help" => println!("{HELP}"),
        "reset" => {
            controller.reset_session();
        }
        "patient" if arg.is_empty() => {
            controller.clear_patient();
            println!("patient cleared");
        }
        "patient" => {
            controller.set_patient(arg);
            println!("patient {}", controller.patient().label());
        }
        "report" => match controller.snapshot().dashboard().formatted_report.clone() {
            Some(report) => println!("{report}"),
            None => println!("no report yet"),
        },
        "health" => match controller.check_health().await {
            Ok(health) => println!("service: {}", health.status),
            Err(e) => println!("service unreachable: {e}"),
        },
        "feedback" => {
            let Some((action, content)) = parse_feedback(arg) else {
                println!("usage: /feedback accept|reject|modify <text>");
                return true;
            };
            let controller = controller.clone();
            tokio::spawn(async move {
                if let Err(e) = controller.send_feedback(action, content).await {
                    tracing::warn!(error = %e, "Feedback not delivered");
                }
            });
        }
        _ => println!("unknown command, type /help"),
    }
    true
}

/// `accept`, `reject` or `modify <text>`. Trailing text only travels with
/// `modify`.
fn parse_feedback(arg: &str) -> Option<(FeedbackAction, Option<String>)> {
    let (action, content) = arg
        .split_once(char::is_whitespace)
        .map_or((arg, None), |(a, c)| (a, Some(c.trim().to_string())));
    let action = FeedbackAction::parse(action)?;
    let content = content.filter(|_| action == FeedbackAction::Modify);
    Some((action, content))
}

/// Print transcript additions and the dashboard as change signals arrive
async fn render_loop(
    controller: Arc<Controller>,
    mut events: tokio::sync::broadcast::Receiver<SessionEvent>,
) {
    let mut printed = controller.snapshot().messages().len();
    let mut was_processing = false;

    loop {
        match events.recv().await {
            Ok(SessionEvent::Changed {
                session_id,
                processing,
                ..
            }) => {
                let session = controller.snapshot();
                if session.session_id() != &session_id {
                    continue;
                }
                for message in session.messages().iter().skip(printed) {
                    println!("{}", render_message(message, &Local));
                }
                printed = session.messages().len();

                if processing && !was_processing {
                    println!("… waiting for the diagnostic service");
                } else if !processing && was_processing {
                    print!("{}", render_dashboard(session.dashboard()));
                }
                was_processing = processing;
            }
            Ok(SessionEvent::Reset { session_id }) => {
                println!("── new session {session_id} ──");
                let session = controller.snapshot();
                for message in session.messages() {
                    println!("{}", render_message(message, &Local));
                }
                printed = session.messages().len();
                was_processing = false;
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Renderer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
