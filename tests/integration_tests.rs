//! Integration tests for the research assistant
//!
//! These drive the registry end to end over a mock search source, a scripted
//! model and a temporary papers directory.

use research_assistant::llm::{ChatResponse, ScriptedModel};
use research_assistant::mcp::Registry;
use research_assistant::sources::mock::make_paper;
use research_assistant::sources::MockSource;
use research_assistant::store::{MetadataStore, PAPERS_FILE};
use research_assistant::utils::HttpClient;
use research_assistant::{Category, Error, PaperRecord, Research};
use serde_json::{json, Value};
use std::sync::Arc;

struct Harness {
    dir: tempfile::TempDir,
    source: Arc<MockSource>,
    model: Arc<ScriptedModel>,
    registry: Registry,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new());
        let model = Arc::new(ScriptedModel::default());
        let research = Research::new(
            source.clone(),
            MetadataStore::new(dir.path().join("papers")),
            HttpClient::new().unwrap(),
            model.clone(),
        );
        let registry = Registry::new(Arc::new(research));
        Self {
            dir,
            source,
            model,
            registry,
        }
    }

    fn papers_file(&self, dir_name: &str) -> std::path::PathBuf {
        self.dir.path().join("papers").join(dir_name).join(PAPERS_FILE)
    }
}

fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("search_papers returns an array")
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_search_results_are_resolvable() {
    let h = Harness::new();
    let papers = vec![
        make_paper("2301.00001v1", "One"),
        make_paper("2301.00002v1", "Two"),
        make_paper("2301.00003v2", "Three"),
    ];
    h.source.set_papers(papers.clone());

    let result = h
        .registry
        .call_tool("search_papers", json!({"topic": "llm", "max_results": 2}))
        .await
        .unwrap();
    let found = ids(&result);
    assert_eq!(found.len(), 2);

    for id in &found {
        let info = h
            .registry
            .call_tool("extract_info", json!({ "paper_id": id }))
            .await
            .unwrap();
        let record: PaperRecord = serde_json::from_value(info).unwrap();
        let expected = papers.iter().find(|p| &p.id == id).unwrap();
        assert_eq!(&record, expected);
    }
}

#[tokio::test]
async fn test_integral_float_count_is_honoured() {
    let h = Harness::new();
    h.source
        .set_papers((1..=6).map(|i| make_paper(&format!("p{}", i), "Paper")).collect());

    let result = h
        .registry
        .call_tool("search_papers", json!({"topic": "x", "max_results": 2.0}))
        .await
        .unwrap();
    assert_eq!(ids(&result), ["p1", "p2"]);
    assert_eq!(h.source.queries()[0].max_results, 2);

    let err = h
        .registry
        .call_tool("search_papers", json!({"topic": "x", "max_results": 2.5}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SchemaValidation(_)));
}

#[tokio::test]
async fn test_repeated_search_does_not_duplicate() {
    let h = Harness::new();
    h.source.set_papers(vec![
        make_paper("2301.00001v1", "One"),
        make_paper("2301.00002v1", "Two"),
    ]);

    for _ in 0..2 {
        h.registry
            .call_tool("search_papers", json!({"topic": "llm"}))
            .await
            .unwrap();
    }

    let listing = h
        .registry
        .call_tool("list_all_papers", json!({}))
        .await
        .unwrap();
    assert_eq!(listing["llm"], json!(["2301.00001v1", "2301.00002v1"]));

    let stored: Value =
        serde_json::from_str(&std::fs::read_to_string(h.papers_file("llm")).unwrap()).unwrap();
    assert_eq!(stored.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_extract_info_unknown_id() {
    let h = Harness::new();

    let err = h
        .registry
        .call_tool("extract_info", json!({"paper_id": "9999.99999"}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(err.to_string().contains("9999.99999"));
}

#[tokio::test]
async fn test_folders_lists_each_searched_topic() {
    let h = Harness::new();
    h.source.set_papers(vec![make_paper("2301.00001v1", "One")]);

    for topic in ["llm", "Graph Neural Networks", "llm"] {
        h.registry
            .call_tool("search_papers", json!({ "topic": topic }))
            .await
            .unwrap();
    }

    assert_eq!(
        h.registry.topic_folders().unwrap(),
        vec!["graph_neural_networks".to_string(), "llm".to_string()]
    );

    let folders = h.registry.read_resource("papers://folders").await.unwrap();
    assert_eq!(folders.mime_type, "text/markdown");
    assert!(folders.text.contains("- graph_neural_networks\n- llm\n"));
}

#[tokio::test]
async fn test_unknown_names_per_category() {
    let h = Harness::new();

    for category in [Category::Tool, Category::Resource, Category::Prompt] {
        let err = h
            .registry
            .invoke(category, "nope://missing", json!({}))
            .await
            .unwrap_err();
        match err {
            Error::UnknownName { category: c, name } => {
                assert_eq!(c, category);
                assert_eq!(name, "nope://missing");
            }
            other => panic!("Expected UnknownName, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_schema_violations_are_rejected() {
    let h = Harness::new();

    let err = h
        .registry
        .call_tool("search_papers", json!({"max_results": 3}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SchemaValidation(_)));

    let err = h
        .registry
        .call_tool("search_papers", json!({"topic": "llm", "max_results": 0}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SchemaValidation(_)));
    assert!(h.source.queries().is_empty());
}

#[tokio::test]
async fn test_diffusion_models_end_to_end() {
    let h = Harness::new();
    let papers = vec![
        make_paper("2401.00001v1", "Denoising Diffusion"),
        make_paper("2401.00002v1", "Score Matching"),
        make_paper("2401.00003v1", "Latent Diffusion"),
        make_paper("2401.00004v1", "Not Requested"),
    ];
    h.source.set_papers(papers.clone());
    h.model.push(ChatResponse::text("A short summary."));

    let result = h
        .registry
        .call_tool(
            "search_papers",
            json!({"topic": "diffusion models", "max_results": 3}),
        )
        .await
        .unwrap();
    let found = ids(&result);
    assert_eq!(found, ["2401.00001v1", "2401.00002v1", "2401.00003v1"]);
    assert_eq!(h.source.queries()[0].query, "diffusion models");
    assert_eq!(h.source.queries()[0].max_results, 3);
    assert!(h.papers_file("diffusion_models").exists());

    for (id, expected) in found.iter().zip(&papers) {
        let info = h
            .registry
            .call_tool("extract_info", json!({ "paper_id": id }))
            .await
            .unwrap();
        assert_eq!(info["title"], json!(expected.metadata.title));
        assert_eq!(info["authors"], json!(expected.metadata.authors));
        assert_eq!(info["summary"], json!(expected.metadata.summary));
        assert_eq!(info["pdf_url"], json!(expected.metadata.pdf_url));
    }

    let listing = h
        .registry
        .call_tool("list_all_papers", json!({}))
        .await
        .unwrap();
    assert_eq!(listing["diffusion_models"], json!(found));
    assert_eq!(listing.as_object().unwrap().len(), 1);

    let info = h
        .registry
        .call_tool("extract_info", json!({"paper_id": "2401.00002v1"}))
        .await
        .unwrap();

    let topic = h
        .registry
        .read_resource("papers://diffusion_models")
        .await
        .unwrap();
    assert!(topic.text.starts_with("# Papers on Diffusion Models"));
    assert!(topic.text.contains("Total papers: 3"));
    let first = topic.text.find("Denoising Diffusion").unwrap();
    let last = topic.text.find("Latent Diffusion").unwrap();
    assert!(first < last);
    assert!(!topic.text.contains("Not Requested"));

    let summary = h
        .registry
        .call_tool("summarize_paper", json!({"text": info.to_string()}))
        .await
        .unwrap();
    assert_eq!(summary, json!("A short summary."));
    let request = &h.model.requests()[0];
    assert!(request.tools.is_none());
}

#[tokio::test]
async fn test_provider_failure_leaves_store_unchanged() {
    let h = Harness::new();
    h.source.set_papers(vec![make_paper("2301.00001v1", "One")]);
    h.registry
        .call_tool("search_papers", json!({"topic": "llm"}))
        .await
        .unwrap();
    let before = std::fs::read_to_string(h.papers_file("llm")).unwrap();

    h.source.fail_with("connection reset");
    let err = h
        .registry
        .call_tool("search_papers", json!({"topic": "llm"}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Provider(_)));

    let after = std::fs::read_to_string(h.papers_file("llm")).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_unknown_topic_resource() {
    let h = Harness::new();

    let err = h
        .registry
        .read_resource("papers://quantum_gravity")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_search_prompt_uses_default_count() {
    let h = Harness::new();

    let prompt = h
        .registry
        .get_prompt("generate_search_prompt", json!({"topic": "transformers"}))
        .unwrap();
    assert!(prompt
        .text
        .contains("search_papers(topic='transformers', max_results=5)"));
}
