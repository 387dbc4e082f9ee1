//! Question-answering pipeline integration tests
//!
//! Runs indexing, retrieval, translation, and answer normalization against
//! scripted models, without an Ollama server

use std::sync::Arc;

use docqa::{
    Assistant, AssistantSettings, Error, Language, RetrievalQa, Segment, TextSplitter, VectorStore,
    extract_answer,
};

mod common;

use common::{FailingEmbedder, KeywordEmbedder, ScriptedChat};

fn document() -> Vec<Segment> {
    vec![
        Segment::new("Paris is the capital of France.", "guide.pdf").with_page(1),
        Segment::new("The Seine is a river that flows through Paris.", "guide.pdf").with_page(2),
        Segment::new("Bread is baked from flour in an oven.", "guide.pdf").with_page(3),
    ]
}

fn settings(top_k: usize) -> AssistantSettings {
    AssistantSettings {
        splitter: TextSplitter::new(200, 20).unwrap(),
        top_k,
        ..AssistantSettings::default()
    }
}

#[tokio::test]
async fn test_answers_from_retrieved_context() {
    let chat = ScriptedChat::fixed("Paris is the capital.");
    let assistant = Assistant::new(chat.clone(), Arc::new(KeywordEmbedder::default()), settings(1));

    let document = assistant.index(&document()).await.unwrap();
    assert_eq!(document.chunk_count(), 3);

    let answer = document
        .ask("What is the capital of France?", Language::English)
        .await
        .unwrap();
    assert_eq!(answer, "Paris is the capital.");

    let prompts = chat.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Paris is the capital of France."));
    assert!(!prompts[0].contains("Bread"));
    assert!(prompts[0].contains("Question: What is the capital of France?"));
}

#[tokio::test]
async fn test_top_k_limits_context() {
    let chat = ScriptedChat::fixed("ok");
    let assistant = Assistant::new(chat.clone(), Arc::new(KeywordEmbedder::default()), settings(2));

    let document = assistant.index(&document()).await.unwrap();
    document.ask("Tell me about Paris", Language::English).await.unwrap();

    let prompt = &chat.prompts()[0];
    assert!(prompt.contains("capital of France"));
    assert!(prompt.contains("Seine"));
    assert!(!prompt.contains("Bread"));
}

#[tokio::test]
async fn test_kannada_round_trip() {
    let chat = ScriptedChat::new(|prompt: &str| {
        if prompt.starts_with("Translate the following Kannada question") {
            " What is the capital of France? ".to_string()
        } else if prompt.starts_with("Translate the following answer to Kannada") {
            "ಪ್ಯಾರಿಸ್".to_string()
        } else {
            "Paris".to_string()
        }
    });
    let assistant = Assistant::new(chat.clone(), Arc::new(KeywordEmbedder::default()), settings(1));
    let document = assistant.index(&document()).await.unwrap();

    let answer = document
        .ask("ಫ್ರಾನ್ಸ್‌ನ ರಾಜಧಾನಿ ಯಾವುದು?", Language::Kannada)
        .await
        .unwrap();
    assert_eq!(answer, "ಪ್ಯಾರಿಸ್");

    let prompts = chat.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].ends_with("ಫ್ರಾನ್ಸ್‌ನ ರಾಜಧಾನಿ ಯಾವುದು?"));
    assert!(prompts[1].contains("Question: What is the capital of France?\n"));
    assert!(prompts[2].ends_with("\n\nParis"));
}

#[tokio::test]
async fn test_blank_question_is_rejected() {
    let chat = ScriptedChat::fixed("unused");
    let assistant = Assistant::new(chat.clone(), Arc::new(KeywordEmbedder::default()), settings(1));
    let document = assistant.index(&document()).await.unwrap();

    let result = document.ask("   ", Language::English).await;
    assert!(matches!(result, Err(Error::EmptyQuestion)));
    assert!(chat.prompts().is_empty());
}

#[tokio::test]
async fn test_empty_document_is_rejected() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let assistant = Assistant::new(ScriptedChat::fixed("unused"), embedder.clone(), settings(1));

    let blank = vec![Segment::new("  \n\n ", "scan.pdf")];
    let result = assistant.index(&blank).await;
    assert!(matches!(result, Err(Error::EmptyDocument)));
    assert!(embedder.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_embedding_failure_propagates() {
    let assistant = Assistant::new(ScriptedChat::fixed("unused"), Arc::new(FailingEmbedder), settings(1));
    let result = assistant.index(&document()).await;
    assert!(matches!(result, Err(Error::Embedding(_))));
}

#[tokio::test]
async fn test_chunks_embedded_in_one_batch() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let assistant = Assistant::new(ScriptedChat::fixed("ok"), embedder.clone(), settings(1));

    assistant.index(&document()).await.unwrap();
    assert_eq!(*embedder.batches.lock().unwrap(), vec![3]);
}

#[tokio::test]
async fn test_chain_returns_query_and_result() {
    let store = VectorStore::from_segments(document(), Arc::new(KeywordEmbedder::default()))
        .await
        .unwrap();
    let chain = RetrievalQa::new(store, ScriptedChat::fixed("It flows through Paris."), 1);

    let result = chain.invoke("Which river?").await.unwrap();
    assert_eq!(result.get("query"), Some("Which river?"));
    assert_eq!(extract_answer(&result), "It flows through Paris.");
}

#[tokio::test]
async fn test_similarity_search_ranks_by_relevance() {
    let store = VectorStore::from_segments(document(), Arc::new(KeywordEmbedder::default()))
        .await
        .unwrap();

    let results = store.similarity_search("flour and oven", 3).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].metadata.page, Some(3));

    assert!(store.similarity_search("anything", 0).await.unwrap().is_empty());
}
