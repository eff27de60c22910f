use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use booking_flow::config::FlowConfig;
use booking_flow::error::FlowError;
use booking_flow::flow::{Orchestrator, StepEvent};
use booking_flow::questions::InputKind;
use booking_flow::session::AnswerValue;
use booking_flow::submit::HttpBookingGateway;
use booking_flow::touchpoint::{DisabledTouchpoints, HttpTouchpointClient, TouchpointApi};
use booking_flow::validate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let submit_url = std::env::var("BOOKING_SUBMIT_URL").unwrap_or_else(|_| {
        eprintln!("Error: BOOKING_SUBMIT_URL not set");
        eprintln!("  export BOOKING_SUBMIT_URL=https://example.com/api/bookings");
        std::process::exit(1);
    });

    let mut config = FlowConfig::default();
    if let Ok(secs) = std::env::var("BOOKING_TOUCHPOINT_DEADLINE_SECS") {
        config.touchpoint_deadline =
            std::time::Duration::from_secs(secs.parse().unwrap_or(10));
    }

    let touchpoints: Arc<dyn TouchpointApi> = match std::env::var("BOOKING_TOUCHPOINT_URL") {
        Ok(url) => {
            let token = std::env::var("BOOKING_TOUCHPOINT_TOKEN")
                .ok()
                .map(secrecy::SecretString::from);
            Arc::new(HttpTouchpointClient::new(url, token, &config))
        }
        Err(_) => {
            tracing::info!("BOOKING_TOUCHPOINT_URL not set; running on fallback text only");
            Arc::new(DisabledTouchpoints)
        }
    };
    let bookings = Arc::new(HttpBookingGateway::new(submit_url));

    eprintln!("🎻 Booking chat v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Answer the questions to request a booking.");
    eprintln!("   Commands: /back, /quit\n");

    let mut orch = Orchestrator::new(touchpoints, bookings);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if orch.session().phase == booking_flow::questions::PHASE_MAX {
            if run_review(&mut orch, &mut lines).await? {
                break;
            }
            continue;
        }

        println!("\n{}", orch.prompt());
        if let Some(hint) = input_hint(&orch) {
            println!("   ({hint})");
        }

        let Some(line) = read_line(&mut lines).await? else {
            break; // EOF
        };
        match line.as_str() {
            "/quit" => {
                if orch.should_warn_on_exit() {
                    eprintln!("Leaving now will discard your booking request.");
                }
                break;
            }
            "/back" => {
                if !orch.go_back() {
                    eprintln!("Can't go back from here.");
                }
                continue;
            }
            _ => {}
        }

        let value = match parse_answer(&orch, &line, &mut lines).await? {
            Some(value) => value,
            None => continue,
        };
        match orch.submit_answer(value) {
            Ok(StepEvent::FollowupOpened { .. }) => continue,
            Ok(StepEvent::AnswerAccepted { echo, .. }) => {
                println!("You: {echo}");
                if let Some(assistant) = orch.settle_interstitial().await? {
                    println!("♪ {assistant}");
                }
            }
            Err(FlowError::Invalid(errors)) => {
                for e in &errors.0 {
                    eprintln!("  ✗ {e}");
                }
            }
            Err(e) => eprintln!("  ✗ {e}"),
        }
    }

    Ok(())
}

/// The review screen. Returns `true` when the session is finished.
async fn run_review(
    orch: &mut Orchestrator,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<bool, Box<dyn std::error::Error>> {
    println!(
        "\n♪ {}",
        orch.ensure_review_summary().await.unwrap_or_default()
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&orch.session().answers)?
    );
    println!("Type \"confirm\" to book, \"edit <phase> <question>\" to change an answer, or /quit.");

    let Some(line) = read_line(lines).await? else {
        return Ok(true);
    };
    match line.split_whitespace().collect::<Vec<_>>().as_slice() {
        ["confirm"] => match orch.submit_booking().await {
            Ok(confirmation) => {
                println!(
                    "\n🎉 Booked! Your reference is {} (id {}).",
                    confirmation.reference, confirmation.booking_id
                );
                Ok(true)
            }
            Err(e) => {
                eprintln!("  ✗ {e}");
                eprintln!("  Your answers are saved — press confirm to try again.");
                Ok(false)
            }
        },
        ["edit", phase, question] => {
            match (phase.parse::<u8>(), question.parse::<usize>()) {
                (Ok(p), Ok(q)) if booking_flow::questions::question_at(p, q).is_some() => {
                    orch.edit_jump(p, q)?;
                }
                _ => eprintln!("  ✗ no such question"),
            }
            Ok(false)
        }
        ["/quit"] => Ok(true),
        _ => Ok(false),
    }
}

/// Hint text for the current input affordance.
fn input_hint(orch: &Orchestrator) -> Option<String> {
    match orch.current_question().input {
        InputKind::Choice(options) => Some(options.join(" / ")),
        InputKind::MultiChoice(options) => {
            Some(format!("comma-separated: {}", options.join(", ")))
        }
        InputKind::Date => Some("YYYY-MM-DD".to_string()),
        InputKind::Number => Some("a number".to_string()),
        _ => None,
    }
}

/// Turn a typed line into an [`AnswerValue`] for the current question.
/// Returns `None` after printing a parse complaint.
async fn parse_answer(
    orch: &Orchestrator,
    line: &str,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<Option<AnswerValue>, Box<dyn std::error::Error>> {
    use booking_flow::flow::UiState;

    // Follow-up sub-dialogs always capture free text
    if matches!(orch.ui(), UiState::AwaitingFollowup { .. }) {
        return Ok(Some(AnswerValue::Text(line.to_string())));
    }

    let value = match orch.current_question().input {
        InputKind::Choice(_) => AnswerValue::Text(normalize_choice(line)),
        InputKind::FreeText => AnswerValue::Text(line.to_string()),
        InputKind::MultiChoice(_) => AnswerValue::Many(
            line.split(',')
                .map(|p| normalize_choice(p.trim()))
                .filter(|p| !p.is_empty())
                .collect(),
        ),
        InputKind::Date => match validate::event_date(line) {
            Ok(date) => AnswerValue::Date(date),
            Err(e) => {
                eprintln!("  ✗ {e}");
                return Ok(None);
            }
        },
        InputKind::Number => match line.parse::<u32>() {
            Ok(n) => AnswerValue::Number(n),
            Err(_) => {
                eprintln!("  ✗ please enter a whole number");
                return Ok(None);
            }
        },
        InputKind::Contact => {
            println!("Email:");
            let Some(email) = read_line(lines).await? else {
                return Ok(None);
            };
            println!("Phone:");
            let Some(phone) = read_line(lines).await? else {
                return Ok(None);
            };
            AnswerValue::Contact {
                name: line.to_string(),
                email,
                phone,
            }
        }
        InputKind::Review => return Ok(None),
    };
    Ok(Some(value))
}

/// Choice pills come back as lowercase snake_case values; let people type
/// "private party" for "private_party".
fn normalize_choice(input: &str) -> String {
    input.trim().to_lowercase().replace(' ', "_")
}

async fn read_line(
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<Option<String>, std::io::Error> {
    loop {
        match lines.next_line().await? {
            Some(line) => {
                let line = line.trim().to_string();
                if !line.is_empty() {
                    return Ok(Some(line));
                }
            }
            None => return Ok(None),
        }
    }
}
