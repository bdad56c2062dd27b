use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use http_body_util::BodyExt;
use mart_axum::axum;
use mart_core::errors::MartError;
use mart_core::{MartApp, MartService, ServiceCapabilities, ServiceMethodKind, TenantContext};
use serde_json::{json, Value};
use tower::ServiceExt;

struct Listings;

#[async_trait::async_trait]
impl MartService<Value, ()> for Listings {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Find, ServiceMethodKind::Create])
    }

    async fn find(&self, ctx: &TenantContext, _params: ()) -> anyhow::Result<Vec<Value>> {
        Ok(vec![json!({"tenant": ctx.tenant_id.as_str()})])
    }

    async fn create(&self, _ctx: &TenantContext, data: Value, _params: ()) -> anyhow::Result<Value> {
        if data.get("name").is_none() {
            return Err(MartError::unprocessable("Invalid")
                .with_errors(json!({"name": ["required"]}))
                .into_anyhow());
        }
        if data["name"] == "boom" {
            return Err(anyhow::anyhow!("boom"));
        }
        Ok(data)
    }

    async fn remove(&self, _ctx: &TenantContext, _id: &str, _params: ()) -> anyhow::Result<Value> {
        Ok(json!({"removed": true}))
    }
}

fn router() -> axum::Router {
    let app: MartApp<Value, ()> = MartApp::new();
    axum(app)
        .use_service("/listings", Arc::new(Listings))
        .service("/health", || async { "ok" })
        .with_default_layers()
        .router
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn malformed_json_is_bad_request_with_request_id() {
    let res = router().oneshot(post("/listings", "{\"name\":\"x\"")).await.unwrap();

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.headers().get("x-request-id").is_some());
    let body = json_body(res).await;
    assert_eq!(body["name"], "BadRequest");
    assert_eq!(body["className"], "bad-request");
    assert!(body.get("errors").is_some());
}

#[tokio::test]
async fn provided_request_id_is_echoed() {
    let mut req = post("/listings", "{\"name\":\"x\"}");
    req.headers_mut()
        .insert("x-request-id", HeaderValue::from_static("req-test-123"));

    let res = router().oneshot(req).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.headers().get("x-request-id").unwrap(), "req-test-123");
}

#[tokio::test]
async fn structured_errors_keep_their_fields() {
    let res = router().oneshot(post("/listings", "{}")).await.unwrap();

    assert_eq!(res.status().as_u16(), 422);
    let body = json_body(res).await;
    assert_eq!(body["name"], "Unprocessable");
    assert_eq!(body["errors"]["name"][0], "required");
}

#[tokio::test]
async fn plain_errors_become_general_errors() {
    let res = router().oneshot(post("/listings", "{\"name\":\"boom\"}")).await.unwrap();

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["name"], "GeneralError");
    assert_eq!(body["message"], "boom");
}

#[tokio::test]
async fn methods_outside_capabilities_are_refused() {
    let res = router()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/listings/l1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 405);
    let body = json_body(res).await;
    assert_eq!(body["className"], "method-not-allowed");
}

#[tokio::test]
async fn tenant_header_reaches_the_service() {
    let res = router()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/listings")
                .header("x-tenant-id", "accra-depot")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body, json!([{"tenant": "accra-depot"}]));
}

#[tokio::test]
async fn health_route_is_plain_text() {
    let res = router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}
