mod config;
mod console;
mod jsonl;

use crate::config::Config;
use crate::console::ConsoleSpeech;
use crate::jsonl::JsonlStore;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::fmt::time::ChronoLocal;

use prepmate_core::clock::SessionClock;
use prepmate_core::generate::GeminiClient;
use prepmate_core::interview::{InterviewConfig, InterviewKind};
use prepmate_core::session::{SessionController, SessionOutcome, SessionState};

#[derive(Parser)]
#[command(about = "Run a spoken mock interview in the terminal")]
struct Cli {
    /// Candidate name
    #[arg(long)]
    candidate: String,
    /// Candidate email, used to key the session history
    #[arg(long)]
    email: Option<String>,
    /// Target role
    #[arg(long)]
    role: String,
    /// Target company
    #[arg(long)]
    company: Option<String>,
    /// Education background, e.g. "B.Tech"
    #[arg(long, default_value = "")]
    graduation: String,
    /// Years of experience, e.g. "2 years"
    #[arg(long)]
    experience: String,
    /// Interview kind: technical, hr, or managerial
    #[arg(long, default_value = "technical")]
    kind: String,
    /// Path to a plain-text resume
    #[arg(long)]
    resume: PathBuf,
    /// Path to a plain-text job description
    #[arg(long)]
    job_description: Option<PathBuf>,
    /// Session history file
    #[arg(long, default_value = "sessions.jsonl")]
    history: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load application configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    let args = Cli::parse();

    let kind: InterviewKind = args
        .kind
        .parse()
        .with_context(|| format!("unrecognized interview kind '{}'", args.kind))?;
    let resume = std::fs::read_to_string(&args.resume)
        .with_context(|| format!("Failed to read resume from {}", args.resume.display()))?;
    let job_description = match &args.job_description {
        Some(path) => Some(std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read job description from {}", path.display())
        })?),
        None => None,
    };

    let interview = InterviewConfig {
        candidate: args.candidate,
        email: args.email,
        role: args.role,
        company: args.company,
        graduation: args.graduation,
        experience: args.experience,
        kind,
        job_description,
        resume,
    };

    let interviewer = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.model.clone(),
    ));
    let speech = Arc::new(ConsoleSpeech::new());
    let store = Arc::new(JsonlStore::new(args.history));

    let mut session = SessionController::with_clock(
        interview,
        interviewer,
        speech.clone(),
        store,
        SessionClock::with_ceilings(config.session_secs, config.answer_secs),
    )
    .context("Invalid interview configuration")?;

    tracing::info!("Generating interview questions...");
    session
        .load_questions()
        .await
        .context("Failed to generate the opening questions")?;

    println!("\nCommands: start, stop, next, repeat, more, end.");
    println!("While recording, anything else you type is your answer.\n");

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.tick().await; // the first tick fires immediately

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(err) = session.tick().await {
                    tracing::warn!(error = %err, "timer tick failed");
                }
            }
            line = lines.next_line() => {
                match line.context("Failed to read from stdin")? {
                    Some(line) => handle_line(&mut session, &speech, line.trim()).await,
                    None => {
                        // stdin closed, wrap up with whatever was answered
                        if let Err(err) = session.end_session().await {
                            tracing::warn!(error = %err, "could not end the session");
                        }
                    }
                }
            }
        }

        if session.state() == SessionState::Ended {
            break;
        }
    }

    print_outcome(&session);
    session.close().await;
    Ok(())
}

async fn handle_line(session: &mut SessionController, speech: &Arc<ConsoleSpeech>, line: &str) {
    let result = match line {
        "" => Ok(()),
        "start" => session.start_answering().await,
        "stop" => session.stop_answering().await,
        "next" => session.next_question().await,
        "repeat" => session.repeat_question().await,
        "more" => session.request_more_questions().await,
        "end" => session.end_session().await,
        other => {
            if speech.is_capturing() {
                speech.push_line(other);
                session.observe_partial(other.to_string());
            } else {
                println!("unknown command: {other}");
            }
            Ok(())
        }
    };
    if let Err(err) = result {
        println!("{err}");
    }

    let view = session.view();
    if matches!(
        view.state,
        SessionState::AwaitingAnswer | SessionState::Capturing
    ) {
        println!(
            "[question {}/{} | session {}s | answer {}s]",
            view.question_index + 1,
            view.total_questions,
            view.session_seconds_remaining,
            view.answer_seconds_remaining,
        );
    }
}

fn print_outcome(session: &SessionController) {
    match session.outcome() {
        Some(SessionOutcome::Report(report)) => {
            println!("\n=== Interview feedback ===");
            println!("Overall score: {:.0}/100", report.overall_score);
            println!("Communication: {:.0}/100", report.communication_score);
            if let Some(technical) = report.technical_score {
                println!("Technical: {technical:.0}/100");
            }
            if let Some(behavioral) = report.logical_behavioral_score {
                println!("Logical & behavioral: {behavioral:.0}/100");
            }
            if !report.interview_summary.is_empty() {
                println!("\n{}", report.interview_summary);
            }
            if !report.overall_suggestions.is_empty() {
                println!("\nSuggestions:");
                for suggestion in &report.overall_suggestions {
                    println!("  - {suggestion}");
                }
            }
            for q in &report.questions {
                println!("\nQ: {}", q.question);
                println!("   communication {:.0}/10", q.communication_score);
                if let Some(technical) = q.technical_score {
                    println!("   technical {technical:.0}/10");
                }
                if let Some(comment) = &q.fluency_comment {
                    println!("   fluency: {comment}");
                }
                if let Some(comment) = &q.tech_comment {
                    println!("   technical: {comment}");
                }
                if let Some(comment) = &q.behavioral_comment {
                    println!("   behavioral: {comment}");
                }
            }
        }
        Some(SessionOutcome::NoAnswersProvided) => {
            println!("\nNo questions were answered, so there is nothing to evaluate.");
        }
        Some(SessionOutcome::Failed(reason)) => {
            println!("\nThe session could not be evaluated: {reason}");
        }
        None => {
            println!("\nSession closed.");
        }
    }
}
