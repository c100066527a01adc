use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url_summarizer::error::{AppError, Result};
use url_summarizer::llm::{ChatCompletion, CompletionBackend};

#[derive(Clone)]
pub struct MockCompletion {
    pub reply: String,
    /// (system prompt, user prompt) per call
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
    pub fail_with: Option<String>,
}

#[async_trait]
impl ChatCompletion for MockCompletion {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        if let Some(ref msg) = self.fail_with {
            return Err(AppError::Summarize(msg.clone()));
        }
        Ok(self.reply.clone())
    }
}

#[derive(Clone)]
pub struct MockBackend {
    pub completion: MockCompletion,
    pub connects: Arc<Mutex<Vec<String>>>,
    pub init_error: Option<String>,
}

impl MockBackend {
    pub fn new(reply: &str) -> Self {
        Self {
            completion: MockCompletion {
                reply: reply.to_string(),
                calls: Arc::new(Mutex::new(Vec::new())),
                fail_with: None,
            },
            connects: Arc::new(Mutex::new(Vec::new())),
            init_error: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        let mut backend = Self::new("");
        backend.completion.fail_with = Some(msg.to_string());
        backend
    }

    pub fn rejecting_key(msg: &str) -> Self {
        let mut backend = Self::new("");
        backend.init_error = Some(msg.to_string());
        backend
    }
}

impl CompletionBackend for MockBackend {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn ChatCompletion>> {
        self.connects.lock().unwrap().push(api_key.to_string());
        if let Some(ref msg) = self.init_error {
            return Err(AppError::LlmInit(msg.clone()));
        }
        Ok(Arc::new(self.completion.clone()))
    }
}
