//! Caller-constructed pipeline context.
//!
//! [`Advisor`] bundles the embedder, generator, and opened index behind the
//! question-answering entry point. Constructing it explicitly (rather than
//! initializing clients at import time) keeps tests isolated and allows
//! several configurations to coexist in one process. The seasonal-advice
//! path takes a generator directly ([`crate::advise::seasonal_advice`])
//! since it never touches the index.

use std::sync::Arc;

use crate::answer::answer_with_context;
use crate::embedding::Embedder;
use crate::error::PipelineError;
use crate::generation::Generator;
use crate::index::VectorIndex;
use crate::models::Answer;

pub struct Advisor {
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<dyn Generator>,
    pub index: VectorIndex,
}

impl Advisor {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        index: VectorIndex,
    ) -> Self {
        Self {
            embedder,
            generator,
            index,
        }
    }

    /// Answer a question grounded in the `top_k` most similar chunks.
    pub async fn ask(&self, question: &str, top_k: usize) -> Result<Answer, PipelineError> {
        let retrieved = self
            .index
            .query(self.embedder.as_ref(), question, top_k)
            .await?;
        answer_with_context(self.generator.as_ref(), question, &retrieved).await
    }

    pub async fn close(self) {
        self.index.close().await;
    }
}
