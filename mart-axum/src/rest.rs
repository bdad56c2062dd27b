use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, Uri},
    routing, Json, Router,
};
use mart_core::errors::MartError;
use mart_core::{MartApp, ServiceHandle, ServiceMethodKind, TenantContext};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::{
    params::{FromRestParams, RestParams},
    MartAxumError, MartAxumState,
};

type Rest<T> = Result<Json<T>, MartAxumError>;
type QueryMap = Query<HashMap<String, String>>;

fn map_json_rejection(rejection: JsonRejection) -> MartAxumError {
    MartError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.body_text()]}))
        .into()
}

/// Tenant named by `x-tenant-id`, or the default tenant.
pub fn tenant_from_headers(headers: &HeaderMap) -> TenantContext {
    headers
        .get("x-tenant-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(TenantContext::new)
        .unwrap_or_default()
}

/// Resolves the service and refuses methods it does not expose.
fn resolve<R, P>(state: &MartAxumState<R, P>, method: ServiceMethodKind) -> Result<ServiceHandle<R, P>, MartAxumError>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    let svc = state.app.service(&state.service)?;
    if !svc.capabilities().allows(&method) {
        return Err(MartError::method_not_allowed(format!(
            "Method {} is not allowed on {}",
            method.as_str(),
            state.service
        ))
        .into());
    }
    Ok(svc)
}

fn params<P: FromRestParams>(headers: &HeaderMap, query: HashMap<String, String>, method: &str, uri: &Uri) -> P {
    P::from_rest_params(RestParams::from_parts("rest", headers, query, method, uri))
}

async fn find<R, P>(
    State(state): State<MartAxumState<R, P>>,
    headers: HeaderMap,
    Query(query): QueryMap,
    OriginalUri(uri): OriginalUri,
) -> Rest<Vec<R>>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let svc = resolve(&state, ServiceMethodKind::Find)?;
    let res = svc
        .find(tenant_from_headers(&headers), params(&headers, query, "GET", &uri))
        .await?;
    Ok(Json(res))
}

async fn create<R, P>(
    State(state): State<MartAxumState<R, P>>,
    headers: HeaderMap,
    Query(query): QueryMap,
    OriginalUri(uri): OriginalUri,
    data: Result<Json<R>, JsonRejection>,
) -> Rest<R>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let Json(data) = data.map_err(map_json_rejection)?;
    let svc = resolve(&state, ServiceMethodKind::Create)?;
    let res = svc
        .create(tenant_from_headers(&headers), data, params(&headers, query, "POST", &uri))
        .await?;
    Ok(Json(res))
}

async fn get<R, P>(
    State(state): State<MartAxumState<R, P>>,
    headers: HeaderMap,
    Query(query): QueryMap,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Rest<R>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let svc = resolve(&state, ServiceMethodKind::Get)?;
    let res = svc
        .get(tenant_from_headers(&headers), &id, params(&headers, query, "GET", &uri))
        .await?;
    Ok(Json(res))
}

async fn patch<R, P>(
    State(state): State<MartAxumState<R, P>>,
    headers: HeaderMap,
    Query(query): QueryMap,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    data: Result<Json<R>, JsonRejection>,
) -> Rest<R>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let Json(data) = data.map_err(map_json_rejection)?;
    let svc = resolve(&state, ServiceMethodKind::Patch)?;
    let res = svc
        .patch(tenant_from_headers(&headers), &id, data, params(&headers, query, "PATCH", &uri))
        .await?;
    Ok(Json(res))
}

async fn remove<R, P>(
    State(state): State<MartAxumState<R, P>>,
    headers: HeaderMap,
    Query(query): QueryMap,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Rest<R>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let svc = resolve(&state, ServiceMethodKind::Remove)?;
    let res = svc
        .remove(tenant_from_headers(&headers), &id, params(&headers, query, "DELETE", &uri))
        .await?;
    Ok(Json(res))
}

/// `GET/POST /` and `GET/PATCH/DELETE /{id}` for one registered service.
pub fn service_router<R, P>(service_name: &str, app: Arc<MartApp<R, P>>) -> Router<()>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let state = MartAxumState {
        app,
        service: Arc::from(service_name),
    };

    Router::new()
        .route("/", routing::get(find::<R, P>).post(create::<R, P>))
        .route(
            "/{id}",
            routing::get(get::<R, P>)
                .patch(patch::<R, P>)
                .delete(remove::<R, P>),
        )
        .with_state(state)
}
