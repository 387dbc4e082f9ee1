//! Retrieval question answering
//!
//! The top matching chunks are "stuffed" into a single prompt together with
//! the question, and the model's reply is returned as a `result` mapping.

use std::sync::Arc;

use crate::Result;
use crate::answer::{RESULT_KEY, ResultValue};
use crate::llm::ChatModel;
use crate::rag::VectorStore;

/// Default number of chunks placed in the prompt
pub const DEFAULT_TOP_K: usize = 4;

/// Key echoing the question in chain output
pub const QUERY_KEY: &str = "query";

/// Answers questions from an indexed document
pub struct RetrievalQa {
    store: VectorStore,
    llm: Arc<dyn ChatModel>,
    top_k: usize,
}

impl RetrievalQa {
    /// Create a chain over `store`
    #[must_use]
    pub fn new(store: VectorStore, llm: Arc<dyn ChatModel>, top_k: usize) -> Self {
        Self { store, llm, top_k }
    }

    /// The underlying index
    #[must_use]
    pub const fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Retrieve context for `query` and ask the model
    ///
    /// # Errors
    ///
    /// Returns error if retrieval or the model call fails
    pub async fn invoke(&self, query: &str) -> Result<ResultValue> {
        let context = self.store.similarity_search(query, self.top_k).await?;
        let context = context
            .iter()
            .map(|s| s.page_content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = stuff_prompt(&context, query);
        let reply = self.llm.invoke(&prompt).await?;

        Ok(ResultValue::mapping([(QUERY_KEY, query), (RESULT_KEY, reply.as_str())]))
    }
}

impl std::fmt::Debug for RetrievalQa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalQa")
            .field("store", &self.store)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

/// Build the question-answering prompt around retrieved context
#[must_use]
pub fn stuff_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
         {context}\n\n\
         Question: {question}\n\
         Helpful Answer:"
    )
}
