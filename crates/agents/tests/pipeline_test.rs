//! End-to-end pipeline tests
//!
//! The loader, embedder and model are in-process fakes, so nothing here
//! needs a network service.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{corpus_dir, FailingEmbedder, HashEmbedder, RecordingLlm, TextLoader};
use newsrag_agents::{build_index, retrieve, run_pipeline, AgentError, PipelineConfig};
use newsrag_core::{CoreError, DatePolicy, SentenceChunker, CHAT_TEMPLATE_MARKERS};

fn config(dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig::builder()
        .source_dir(dir)
        .query("What happened to interest rates and inflation?")
        .build()
        .expect("valid config")
}

#[tokio::test]
async fn test_one_document_per_file_with_metadata() {
    let dir = corpus_dir(&[
        ("news_2023-11-13_a.xlsx", "<|user|>Rates held steady.</s>"),
        ("news_2023-11-13_b.xlsx", "<|assistant|>Oil prices fell.<s>"),
        ("news_2023-11-14_c.xlsx", "<|system|>Bonds rallied."),
    ]);
    let llm = Arc::new(RecordingLlm::default());

    let report = run_pipeline(&config(dir.path()), Arc::new(TextLoader), Arc::new(HashEmbedder), llm)
        .await
        .unwrap();

    assert_eq!(report.documents.len(), 3);
    let names: Vec<_> = report.documents.iter().map(|d| d.metadata.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["news_2023-11-13_a.xlsx", "news_2023-11-13_b.xlsx", "news_2023-11-14_c.xlsx"]
    );
    assert_eq!(report.documents[2].metadata.date_time.as_deref(), Some("2023-11-14"));

    for doc in &report.documents {
        for marker in CHAT_TEMPLATE_MARKERS {
            assert!(!doc.text.contains(marker), "{marker} left in {}", doc.metadata.file_name);
        }
    }
    assert_eq!(report.documents[0].text, "Rates held steady.");
}

#[tokio::test]
async fn test_node_ids_unique_and_complete() {
    let long = "Inflation slowed in October. The central bank paused hikes. ".repeat(20);
    let dir = corpus_dir(&[
        ("news_2023-11-13_a.xlsx", long.as_str()),
        ("news_2023-11-13_b.xlsx", "Short note on credit spreads."),
        ("news_2023-11-14_c.xlsx", long.as_str()),
    ]);
    let config = PipelineConfig::builder()
        .source_dir(dir.path())
        .chunk_size(200)
        .chunk_overlap(20)
        .build()
        .unwrap();

    let corpus = build_index(&config, Arc::new(TextLoader), Arc::new(HashEmbedder))
        .await
        .unwrap();

    let chunker = SentenceChunker::new(200, 20).unwrap();
    let expected: usize = corpus
        .documents
        .iter()
        .map(|doc| chunker.split_text(&doc.text).len())
        .sum();
    assert_eq!(corpus.node_count, expected);
    assert!(corpus.node_count > 3);
    assert_eq!(corpus.search.index().count().await.unwrap(), corpus.node_count);

    let config = PipelineConfig { top_k: corpus.node_count, target_date: "2023-11-14".into(), ..config };
    let retrieved = retrieve(&config, &corpus).await.unwrap();
    let ids: HashSet<_> = retrieved.iter().map(|s| s.chunk.id.clone()).collect();
    assert_eq!(ids.len(), retrieved.len());
    assert!(ids.iter().all(|id| id.starts_with("node-")));
}

#[tokio::test]
async fn test_at_most_top_k_sorted_by_score() {
    let dir = corpus_dir(&[
        ("news_2023-11-13_a.xlsx", "Interest rates rose sharply."),
        ("news_2023-11-13_b.xlsx", "Inflation and interest rates dominate."),
        ("news_2023-11-13_c.xlsx", "Football results from the weekend."),
        ("news_2023-11-13_d.xlsx", "Rates on mortgages climbed."),
        ("news_2023-11-13_e.xlsx", "A new museum opened downtown."),
    ]);
    let llm = Arc::new(RecordingLlm::default());

    let report = run_pipeline(
        &config(dir.path()),
        Arc::new(TextLoader),
        Arc::new(HashEmbedder),
        llm.clone(),
    )
    .await
    .unwrap();

    assert_eq!(report.node_count, 5);
    assert_eq!(report.retrieved.len(), 3);
    for pair in report.retrieved.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(report.response, RecordingLlm::ANSWER);

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Query: What happened to interest rates and inflation?"));
    for scored in &report.retrieved {
        assert!(prompts[0].contains(&scored.chunk.text));
    }
}

#[tokio::test]
async fn test_only_target_date_is_retrieved() {
    let dir = corpus_dir(&[
        ("A_2023-11-13_x.xlsx", "Interest rates were unchanged on Monday."),
        ("B_2023-11-14_y.xlsx", "Interest rates and inflation surprised markets."),
    ]);

    let report = run_pipeline(
        &config(dir.path()),
        Arc::new(TextLoader),
        Arc::new(HashEmbedder),
        Arc::new(RecordingLlm::default()),
    )
    .await
    .unwrap();

    assert_eq!(report.node_count, 2);
    assert_eq!(report.retrieved.len(), 1);
    assert_eq!(report.retrieved[0].chunk.metadata.file_name, "A_2023-11-13_x.xlsx");
}

#[tokio::test]
async fn test_no_matching_date_still_asks_model() {
    let dir = corpus_dir(&[("news_2023-11-14_a.xlsx", "Interest rates rose.")]);
    let llm = Arc::new(RecordingLlm::default());

    let report = run_pipeline(
        &config(dir.path()),
        Arc::new(TextLoader),
        Arc::new(HashEmbedder),
        llm.clone(),
    )
    .await
    .unwrap();

    assert!(report.retrieved.is_empty());
    assert_eq!(llm.prompts().len(), 1);
    assert!(!llm.prompts()[0].contains("Interest rates rose."));
}

#[tokio::test]
async fn test_empty_directory() {
    let dir = corpus_dir(&[]);

    let report = run_pipeline(
        &config(dir.path()),
        Arc::new(TextLoader),
        Arc::new(HashEmbedder),
        Arc::new(RecordingLlm::default()),
    )
    .await
    .unwrap();

    assert!(report.documents.is_empty());
    assert_eq!(report.node_count, 0);
    assert!(report.retrieved.is_empty());
}

#[tokio::test]
async fn test_name_without_separator_strict_vs_lenient() {
    let dir = corpus_dir(&[
        ("summary.xlsx", "Interest rates overview."),
        ("news_2023-11-13_a.xlsx", "Interest rates rose."),
    ]);

    let err = build_index(&config(dir.path()), Arc::new(TextLoader), Arc::new(HashEmbedder))
        .await
        .err()
        .expect("strict policy rejects the file name");
    assert!(matches!(
        err,
        AgentError::Core(CoreError::MalformedFileName { ref file_name, .. }) if file_name == "summary.xlsx"
    ));

    let lenient = PipelineConfig {
        date_policy: DatePolicy::Lenient,
        ..config(dir.path())
    };
    let report = run_pipeline(
        &lenient,
        Arc::new(TextLoader),
        Arc::new(HashEmbedder),
        Arc::new(RecordingLlm::default()),
    )
    .await
    .unwrap();

    let summary = report
        .documents
        .iter()
        .find(|d| d.metadata.file_name == "summary.xlsx")
        .unwrap();
    assert_eq!(summary.metadata.date_time, None);
    assert!(report
        .retrieved
        .iter()
        .all(|s| s.chunk.metadata.file_name != "summary.xlsx"));
}

#[tokio::test]
async fn test_embedding_failure_aborts_before_model() {
    let dir = corpus_dir(&[("news_2023-11-13_a.xlsx", "Interest rates rose.")]);
    let llm = Arc::new(RecordingLlm::default());

    let result = run_pipeline(
        &config(dir.path()),
        Arc::new(TextLoader),
        Arc::new(FailingEmbedder),
        llm.clone(),
    )
    .await;

    assert!(matches!(result, Err(AgentError::Embedding(_))));
    assert!(llm.prompts().is_empty());
}
