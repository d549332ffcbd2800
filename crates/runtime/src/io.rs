//! Collaborator interfaces at the pipeline boundary.
//!
//! The pipeline only ever sees an utterance string coming in and a message
//! string going out; speech capture and playback live behind these traits.

use anyhow::Result;
use async_trait::async_trait;

/// Produces one utterance per call.  `Ok(None)` means no speech was
/// detected; the pipeline treats that the same as an empty utterance.
#[async_trait]
pub trait SpeechInput: Send {
    async fn listen(&mut self) -> Result<Option<String>>;
}

/// Consumes a user-facing message (spoken or printed).  Returns whether
/// delivery succeeded; the pipeline never branches on it beyond logging.
#[async_trait]
pub trait FeedbackSink: Send {
    async fn speak(&mut self, text: &str) -> Result<bool>;
}
