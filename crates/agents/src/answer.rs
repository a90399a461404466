//! Answer Agent - Grounded completion over retrieved context

use std::sync::Arc;

use newsrag_core::ScoredChunk;
use tracing::{info, instrument};

use crate::capability::CompletionModel;
use crate::Result;

const CONTEXT_RULE: &str = "---------------------";

/// Render the question-answering prompt.
///
/// Chunk texts appear in retrieval order, separated by blank lines.
pub fn build_prompt(query: &str, context: &[ScoredChunk]) -> String {
    let context_str = context
        .iter()
        .map(|scored| scored.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Context information is below.\n\
         {CONTEXT_RULE}\n\
         {context_str}\n\
         {CONTEXT_RULE}\n\
         Given the context information and not prior knowledge, answer the query.\n\
         Query: {query}\n\
         Answer: "
    )
}

/// Asks the language model to answer from retrieved chunks only
pub struct AnswerAgent {
    llm: Arc<dyn CompletionModel>,
}

impl AnswerAgent {
    pub fn new(llm: Arc<dyn CompletionModel>) -> Self {
        Self { llm }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Single completion call. An empty `context` still queries the model.
    #[instrument(skip(self, query, context), fields(model = %self.llm.model_name(), chunks = context.len()))]
    pub async fn answer(&self, query: &str, context: &[ScoredChunk]) -> Result<String> {
        let prompt = build_prompt(query, context);
        let response = self.llm.complete(&prompt).await?;
        info!("Received {} chars from {}", response.len(), self.llm.model_name());
        Ok(response)
    }
}
