use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use super::{build_prompt, GeminiClient, TextGenerator, TransformError, TransformOp};
use crate::config::AiConfig;
use crate::editor::SelectionSnapshot;
use crate::store::NoteId;

/// A finished transform that is still relevant to the editor.
#[derive(Debug)]
pub struct TransformOutcome {
    pub note_id: NoteId,
    pub op: TransformOp,
    pub selection: Option<SelectionSnapshot>,
    pub result: Result<String, TransformError>,
}

struct Response {
    seq: u64,
    outcome: TransformOutcome,
}

struct Pending {
    seq: u64,
    note_id: NoteId,
    op: TransformOp,
}

/// Runs transforms on worker threads and filters out stale results.
///
/// Only the most recently issued request can produce an outcome, and only while
/// its note is still the active one.
pub struct TransformManager {
    generator: Option<Arc<dyn TextGenerator>>,
    sender: Sender<Response>,
    receiver: Receiver<Response>,
    latest: u64,
    pending: Option<Pending>,
}

impl TransformManager {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            generator,
            sender,
            receiver,
            latest: 0,
            pending: None,
        }
    }

    pub fn from_config(config: &AiConfig) -> Self {
        let generator = match config.resolve_api_key() {
            Some(key) => Some(Arc::new(GeminiClient::new(config, key)) as Arc<dyn TextGenerator>),
            None => {
                log::warn!(
                    "no API key found in config, ${} or $GEMINI_API_KEY; AI transforms disabled",
                    config.api_key_env
                );
                None
            }
        };
        Self::new(generator)
    }

    pub fn has_credential(&self) -> bool {
        self.generator.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_pending_for(&self, note_id: &NoteId) -> bool {
        self.pending.as_ref().is_some_and(|p| &p.note_id == note_id)
    }

    pub fn pending_op(&self) -> Option<TransformOp> {
        self.pending.as_ref().map(|p| p.op)
    }

    /// Start a transform of `input` for `note_id`.
    ///
    /// Fails before any network work when no key is configured or the input is blank.
    /// A newer request supersedes any in flight.
    pub fn request(
        &mut self,
        note_id: &NoteId,
        op: TransformOp,
        input: &str,
        selection: Option<SelectionSnapshot>,
    ) -> Result<(), TransformError> {
        let Some(generator) = self.generator.clone() else {
            return Err(TransformError::MissingCredential);
        };
        if input.trim().is_empty() {
            return Err(TransformError::EmptyInput);
        }

        self.latest += 1;
        let seq = self.latest;
        self.pending = Some(Pending {
            seq,
            note_id: note_id.clone(),
            op,
        });
        log::debug!("transform #{} {:?} for note {}", seq, op, note_id);

        let prompt = build_prompt(op, input);
        let note_id = note_id.clone();
        let sender = self.sender.clone();

        std::thread::spawn(move || {
            let result = generator.generate(&prompt);
            let outcome = TransformOutcome {
                note_id,
                op,
                selection,
                result,
            };
            let _ = sender.send(Response { seq, outcome });
        });
        Ok(())
    }

    /// Forget the in-flight request. Its result will be discarded when it arrives.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::debug!("transform #{} cancelled", pending.seq);
        }
    }

    /// Take the next relevant outcome, discarding stale ones.
    pub fn poll(&mut self, active: Option<&NoteId>) -> Option<TransformOutcome> {
        while let Ok(response) = self.receiver.try_recv() {
            let is_latest = self.pending.as_ref().is_some_and(|p| p.seq == response.seq);
            if !is_latest {
                log::debug!("discarding stale transform #{}", response.seq);
                continue;
            }
            self.pending = None;

            if active != Some(&response.outcome.note_id) {
                log::debug!(
                    "discarding transform #{} for inactive note {}",
                    response.seq,
                    response.outcome.note_id
                );
                continue;
            }
            return Some(response.outcome);
        }
        None
    }
}
