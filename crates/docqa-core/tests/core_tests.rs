use serde_json::json;

use docqa_core::types::{AskResponse, QueryType, SearchResponse, UploadFile, VlmModel};
use docqa_core::validate;
use docqa_core::{ApiError, ValidationError};

#[test]
fn api_error_serializes_in_backend_shape() {
    let err = ApiError::transport("connection refused");
    let v = serde_json::to_value(&err).unwrap();
    assert_eq!(v, json!({ "error": "Unknown error", "message": "connection refused", "statusCode": 500 }));
}

#[test]
fn search_response_decodes_minimal_payload() {
    let resp: SearchResponse = serde_json::from_value(json!({
        "results": [],
        "totalCount": 0,
        "queryTime": 12.5,
        "model": "intern-vl",
        "strategy": "vector"
    }))
    .expect("decode");
    assert!(resp.results.is_empty());
    assert_eq!(resp.model, VlmModel::InternVl);
}

#[test]
fn ask_response_keeps_source_order_and_unit_scale() {
    let resp: AskResponse = serde_json::from_value(json!({
        "answer": "这张平面布置图有3个卧室",
        "sources": [
            { "file_id": "b", "file_name": "floor.png", "file_type": "image", "similarity": 0.91 },
            { "file_id": "a", "file_name": "plan.pdf", "file_type": "pdf", "similarity": 0.55, "chunk_text": "主卧" }
        ],
        "confidence": 0.95,
        "query_type": "exact_query"
    }))
    .expect("decode");
    assert_eq!(resp.query_type, QueryType::ExactQuery);
    let ids: Vec<_> = resp.sources.iter().map(|s| s.file_id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    assert!((resp.sources[0].similarity.value() - 0.91).abs() < 1e-9);
}

#[test]
fn validation_messages_are_user_facing() {
    assert_eq!(ValidationError::EmptyQuery.to_string(), "Please enter a search query");
    assert_eq!(ValidationError::NoActiveDocument.to_string(), "No document is selected");
}

#[test]
fn upload_file_stats_regular_files_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("MotorBracket_v1.2.DWG");
    std::fs::write(&path, vec![0u8; 2048]).expect("write");

    let file = UploadFile::from_path(&path).expect("stat");
    assert_eq!(file.size, 2048);
    assert_eq!(file.file_name, "MotorBracket_v1.2.DWG");
    assert!(validate::upload_file(Some(&file), validate::MAX_UPLOAD_BYTES).is_ok());

    assert!(UploadFile::from_path(dir.path()).is_err());
    assert!(UploadFile::from_path(&dir.path().join("missing.pdf")).is_err());
}
