//! End-to-end tests of the save pipeline against a mock cache service.

use savecache::config::Config;
use savecache::step;
use savecache_keytemplate::BuildContext;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn build_context() -> BuildContext {
    BuildContext {
        workflow: "primary".to_string(),
        branch: "main".to_string(),
        commit_hash: "76b48d12".to_string(),
    }
}

fn config(server_url: &str, work: &Path, paths: &str) -> Config {
    Config {
        key: "deps-{{ .Branch }}".to_string(),
        paths: paths.to_string(),
        verbose: false,
        api_base_url: server_url.to_string(),
        token: "test-token".to_string(),
        working_dir: work.to_path_buf(),
        source_dir: work.to_path_buf(),
    }
}

#[tokio::test]
async fn saves_resolved_paths_under_evaluated_key() {
    let server = MockServer::start().await;
    let work = TempDir::new().unwrap();
    std::fs::create_dir_all(work.path().join("target")).unwrap();
    std::fs::write(work.path().join("target/app.bin"), b"binary").unwrap();

    Mock::given(method("POST"))
        .and(path("/save"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(serde_json::json!({
            "cache_key": "deps-main",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "upload_url": format!("{}/blob/e41c", server.uri()),
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/blob/e41c"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // A missing entry must not fail the run, only warn.
    let config = config(&server.uri(), work.path(), "target\ndoes-not-exist.txt");
    step::run(config, build_context()).await.unwrap();
}

#[tokio::test]
async fn nothing_resolved_terminates_successfully_without_upload() {
    let server = MockServer::start().await;
    let work = TempDir::new().unwrap();

    let config = config(&server.uri(), work.path(), "does-not-exist\nalso-missing/**");
    step::run(config, build_context()).await.unwrap();

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_key_template_aborts_before_any_work() {
    let server = MockServer::start().await;
    let work = TempDir::new().unwrap();

    let mut config = config(&server.uri(), work.path(), "target");
    config.key = "deps-{{ .Unknown }}".to_string();

    let err = step::run(config, build_context()).await.unwrap_err();
    assert!(err.to_string().contains("failed to evaluate key template"));
    assert!(server.received_requests().await.unwrap().is_empty());
}
