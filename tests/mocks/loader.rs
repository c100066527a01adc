use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url_summarizer::error::{AppError, Result};
use url_summarizer::loader::{Document, DocumentLoader};

#[derive(Clone)]
pub struct MockLoader {
    pub documents: Vec<Document>,
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
    pub fail_with: Option<String>,
}

impl MockLoader {
    pub fn new(content: &str) -> Self {
        Self::with_documents(vec![Document::new(content)])
    }

    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            documents: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

#[async_trait]
impl DocumentLoader for MockLoader {
    async fn load(&self, urls: &[String]) -> Result<Vec<Document>> {
        self.calls.lock().unwrap().push(urls.to_vec());
        if let Some(ref msg) = self.fail_with {
            return Err(AppError::Load(msg.clone()));
        }
        Ok(self.documents.clone())
    }
}
