//! Pipeline orchestration: utterance in, user-facing outcome out.
//!
//! Sequencing is fixed — intent matcher, then safety policy, then the
//! execution engine — and every failure path is terminal for the request.
//! There are no retries; the caller supplies a new utterance instead.

pub mod io;

use tracing::{debug, info, warn};

use voxsh_config::AppConfig;
use voxsh_exec::policy::{SafetyPolicy, Verdict};
use voxsh_exec::{ExecResult, ShellSession};
use voxsh_intent::{IntentMatcher, Platform};

pub use crate::io::{FeedbackSink, SpeechInput};

/// Final disposition of one utterance.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Neither the catalogue nor the heuristic tier understood the text.
    NotUnderstood,
    /// The safety policy denied the synthesized operation.  The audit
    /// reason is logged; the user-facing message stays generic.
    Refused,
    Done {
        message: String,
        result: ExecResult,
    },
    Failed {
        message: String,
        result: ExecResult,
    },
}

impl Outcome {
    /// The message handed to the feedback collaborator.
    pub fn message(&self) -> &str {
        match self {
            Outcome::NotUnderstood => "I don't know how to run that command",
            Outcome::Refused => "that command may be unsafe, so I won't run it",
            Outcome::Done { message, .. } | Outcome::Failed { message, .. } => message,
        }
    }
}

pub struct Pipeline {
    matcher: IntentMatcher,
    policy: SafetyPolicy,
    session: ShellSession,
}

impl Pipeline {
    pub fn new(matcher: IntentMatcher, policy: SafetyPolicy, session: ShellSession) -> Self {
        Self {
            matcher,
            policy,
            session,
        }
    }

    /// Wire up matcher, policy and session from config, detecting the host
    /// platform once.
    pub fn from_config(config: &AppConfig) -> Self {
        let platform = Platform::detect();
        let matcher =
            IntentMatcher::new(platform).with_heuristic(config.intent.enable_heuristic);
        let session = ShellSession::new(platform)
            .with_timeout(std::time::Duration::from_secs(config.exec.command_timeout_secs))
            .with_max_output(config.exec.max_output_bytes);
        Self::new(matcher, SafetyPolicy::new(), session)
    }

    pub fn session(&self) -> &ShellSession {
        &self.session
    }

    pub fn matcher(&self) -> &IntentMatcher {
        &self.matcher
    }

    /// Resolve, gate and execute one utterance.
    pub async fn handle(&mut self, text: &str) -> Outcome {
        let Some(op) = self.matcher.resolve(text) else {
            return Outcome::NotUnderstood;
        };
        debug!(key = op.key.as_str(), command = %op.command_line(), "intent resolved");

        match self.policy.evaluate(&op) {
            Verdict::Denied(reason) => {
                warn!(?reason, utterance = %text, "operation refused");
                return Outcome::Refused;
            }
            Verdict::Allowed => {}
        }

        let result = self.session.execute(&op).await;
        if result.success {
            let message = success_message(op.base_token()).to_string();
            info!(command = %result.command_line, "command completed");
            Outcome::Done { message, result }
        } else {
            let message = if result.stderr.is_empty() {
                "command failed: unknown error".to_string()
            } else {
                format!("command failed: {}", result.stderr)
            };
            info!(command = %result.command_line, code = result.exit_code, "command failed");
            Outcome::Failed { message, result }
        }
    }

    /// Best-effort feedback delivery.  A sink fault is logged and dropped;
    /// the pipeline outcome is already decided by this point.
    pub async fn deliver(&self, sink: &mut dyn FeedbackSink, outcome: &Outcome) {
        match sink.speak(outcome.message()).await {
            Ok(true) => debug!("feedback delivered"),
            Ok(false) => warn!("feedback sink reported delivery failure"),
            Err(err) => warn!(%err, "feedback sink error"),
        }
    }
}

/// Classify a successful command into a short spoken confirmation.
fn success_message(base_token: &str) -> &'static str {
    match base_token.to_lowercase().as_str() {
        "ls" | "dir" => "file list displayed",
        "mkdir" => "folder created",
        "cd" => "directory changed",
        _ => "command completed",
    }
}
