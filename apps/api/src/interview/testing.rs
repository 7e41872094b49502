//! Scripted `CompletionClient` for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::interview::transcript::Transcript;
use crate::llm_client::{CompletionClient, LlmError};

enum Step {
    Reply(String),
    Fail,
}

/// Replays queued replies in order; once the queue is empty it answers
/// `Question N?` where N is the call number.
#[derive(Default)]
pub struct ScriptedClient {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, usize, String)>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.steps
            .lock()
            .unwrap()
            .push_back(Step::Reply(text.to_string()));
        self
    }

    pub fn fail_next(self) -> Self {
        self.steps.lock().unwrap().push_back(Step::Fail);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(latest_input, transcript_len, tech_stack)` for every call made.
    pub fn seen(&self) -> Vec<(String, usize, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        latest_input: &str,
        transcript: &Transcript,
        tech_stack: &str,
    ) -> Result<String, LlmError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.seen.lock().unwrap().push((
            latest_input.to_string(),
            transcript.len(),
            tech_stack.to_string(),
        ));
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Reply(text)) => Ok(text),
            Some(Step::Fail) => Err(LlmError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            }),
            None => Ok(format!("Question {n}?")),
        }
    }
}
