//! HTTP API integration tests.

mod common;

use anyhow::Result;
use serde_json::{Value, json};

use common::{TestServer, settle};

#[tokio::test]
async fn test_health() -> Result<()> {
    let server = TestServer::start().await?;
    let response = server.client.get(server.url("/health")).send().await?;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["debug_sessions"]["live"], 0);
    assert_eq!(body["debug_sessions"]["capacity"], 50);
    Ok(())
}

#[tokio::test]
async fn test_component_crud() -> Result<()> {
    let server = TestServer::start().await?;
    let id = server.create_component("echo", -1).await?;

    let component: Value = server
        .client
        .get(server.url(&format!("/v2/components/{id}")))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(component["name"], "echo");
    assert_eq!(component["timeout"], 0);
    assert_eq!(component["type"], "Kubernetes");

    let response = server
        .client
        .put(server.url(&format!("/v2/components/{id}")))
        .json(&json!({"image_name": "alpine", "image_tag": "3.20"}))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let updated: Value = response.json().await?;
    assert_eq!(updated["image_name"], "alpine");

    let listed: Value = server
        .client
        .get(server.url("/v2/components?name=ec&fuzzy=true"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(listed["items"].as_array().map(Vec::len), Some(1));

    let response = server
        .client
        .delete(server.url(&format!("/v2/components/{id}")))
        .send()
        .await?;
    assert_eq!(response.status(), 204);
    let response = server
        .client
        .get(server.url(&format!("/v2/components/{id}")))
        .send()
        .await?;
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], "not_found");
    Ok(())
}

#[tokio::test]
async fn test_duplicate_component_conflicts() -> Result<()> {
    let server = TestServer::start().await?;
    server.create_component("echo", 0).await?;
    assert!(server.create_component("echo", 0).await.is_err());

    let response = server
        .client
        .post(server.url("/v2/components"))
        .json(&json!({"name": "echo", "version": "v1", "image_name": "busybox"}))
        .send()
        .await?;
    assert_eq!(response.status(), 409);
    Ok(())
}

#[tokio::test]
async fn test_executed_component_is_immutable() -> Result<()> {
    let server = TestServer::start().await?;
    let id = server.create_component("echo", 0).await?;
    server.execute(id).await?;

    let response = server
        .client
        .put(server.url(&format!("/v2/components/{id}")))
        .json(&json!({"image_name": "alpine"}))
        .send()
        .await?;
    assert_eq!(response.status(), 409);

    let response = server
        .client
        .post(server.url(&format!("/v2/components/{id}")))
        .json(&json!({"version": "v2"}))
        .send()
        .await?;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await?;
    assert_ne!(body["id"].as_i64(), Some(id));
    Ok(())
}

#[tokio::test]
async fn test_execution_lifecycle_over_http() -> Result<()> {
    let server = TestServer::start().await?;
    let component = server.create_component("echo", 0).await?;
    let id = server.execute(component).await?;
    settle().await;

    let response = server.post_event(id, "component_start", "").await?;
    assert_eq!(response.status(), 201);
    let response = server.post_event(id, "component_result", "42").await?;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await?;
    assert_eq!(body["status"], "finished");

    let execution: Value = server
        .client
        .get(server.url(&format!("/v2/executions/{id}?events=true")))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(execution["status"], "finished");
    assert_eq!(execution["events"].as_array().map(Vec::len), Some(2));
    assert_eq!(execution["events"][1]["content"], "42");
    assert!(execution["kube_resp"]["pod"].is_object());

    let without_events: Value = server
        .client
        .get(server.url(&format!("/v2/executions/{id}")))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(without_events["events"].as_array().map(Vec::len), Some(0));

    settle().await;
    assert_eq!(server.webhooks.delivered_to("http://hooks.test/result").len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_stop_twice_conflicts() -> Result<()> {
    let server = TestServer::start().await?;
    let component = server.create_component("echo", 0).await?;
    let id = server.execute(component).await?;
    settle().await;

    let url = server.url(&format!("/v2/executions/{id}"));
    let response = server.client.delete(&url).send().await?;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["status"], "stopped");

    let response = server.client.delete(&url).send().await?;
    assert_eq!(response.status(), 409);
    assert_eq!(server.backend.delete_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_rejected_event_is_conflict() -> Result<()> {
    let server = TestServer::start().await?;
    let component = server.create_component("echo", 0).await?;
    let id = server.execute(component).await?;
    settle().await;

    server.post_event(id, "component_result", "").await?;
    let response = server.post_event(id, "component_start", "").await?;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], "invalid_state");
    Ok(())
}

#[tokio::test]
async fn test_bad_requests() -> Result<()> {
    let server = TestServer::start().await?;
    let component = server.create_component("echo", 0).await?;

    let response = server.post_event(1, "component_restart", "").await?;
    assert_eq!(response.status(), 400);

    let response = server.post_event(9999, "component_start", "").await?;
    assert_eq!(response.status(), 404);

    let response = server
        .client
        .get(server.url("/v2/executions/9999"))
        .send()
        .await?;
    assert_eq!(response.status(), 404);

    let response = server
        .client
        .post(server.url(&format!("/v2/components/{component}/execute")))
        .json(&json!({"executor": "team-a", "kube_master": "k8s.test"}))
        .send()
        .await?;
    assert_eq!(response.status(), 400);

    let response = server
        .client
        .post(server.url(&format!("/v2/components/{component}/execute")))
        .json(&json!({"kube_master": common::KUBE_MASTER}))
        .send()
        .await?;
    assert_eq!(response.status(), 400);
    assert!(server.backend.calls().is_empty());
    Ok(())
}
