use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::MethodRouter,
    Json, Router,
};
use crm_core::{CrmApp, CrmError, ServiceCapabilities, ServiceMethodKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::{
    params::{FromRestParams, RestParams},
    CrmAxumError, ServiceState,
};

fn map_json_rejection(rejection: JsonRejection) -> CrmAxumError {
    CrmError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.to_string()]}))
        .into_anyhow()
        .into()
}

/// REST routes for one service. Only methods the service allows are
/// mounted; other verbs on the same paths answer 405.
///
/// | verb   | path    | method   |
/// |--------|---------|----------|
/// | GET    | `/`     | find     |
/// | POST   | `/`     | create   |
/// | GET    | `/{id}` | get      |
/// | PUT    | `/{id}` | update   |
/// | PATCH  | `/{id}` | patch    |
/// | DELETE | `/{id}` | remove   |
pub fn service_router<R, P>(
    service_name: &str,
    app: Arc<CrmApp<R, P>>,
    capabilities: &ServiceCapabilities,
) -> Router<()>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let state = ServiceState::new(app, service_name);

    let mut collection: MethodRouter<ServiceState<R, P>> = MethodRouter::new();
    let mut item: MethodRouter<ServiceState<R, P>> = MethodRouter::new();

    if capabilities.allows(&ServiceMethodKind::Find) {
        collection = collection.get(
            |State(state): State<ServiceState<R, P>>,
             headers: HeaderMap,
             Query(query): Query<HashMap<String, String>>,
             OriginalUri(uri): OriginalUri| async move {
                let params = RestParams::new("GET", &uri, &headers, query);
                let params = P::from_rest_params(params);

                let svc = state.handle()?;
                let res = svc.find(params).await?;
                Ok::<_, CrmAxumError>(Json(res))
            },
        );
    }

    if capabilities.allows(&ServiceMethodKind::Create) {
        collection = collection.post(
            |State(state): State<ServiceState<R, P>>,
             headers: HeaderMap,
             Query(query): Query<HashMap<String, String>>,
             OriginalUri(uri): OriginalUri,
             data: Result<Json<R>, JsonRejection>| async move {
                let Json(data) = data.map_err(map_json_rejection)?;

                let params = RestParams::new("POST", &uri, &headers, query);
                let params = P::from_rest_params(params);

                let svc = state.handle()?;
                let res = svc.create(data, params).await?;
                Ok::<_, CrmAxumError>((StatusCode::CREATED, Json(res)))
            },
        );
    }

    if capabilities.allows(&ServiceMethodKind::Get) {
        item = item.get(
            |State(state): State<ServiceState<R, P>>,
             headers: HeaderMap,
             Query(query): Query<HashMap<String, String>>,
             OriginalUri(uri): OriginalUri,
             Path(id): Path<String>| async move {
                let params = RestParams::new("GET", &uri, &headers, query);
                let params = P::from_rest_params(params);

                let svc = state.handle()?;
                let res = svc.get(&id, params).await?;
                Ok::<_, CrmAxumError>(Json(res))
            },
        );
    }

    if capabilities.allows(&ServiceMethodKind::Update) {
        item = item.put(
            |State(state): State<ServiceState<R, P>>,
             headers: HeaderMap,
             Query(query): Query<HashMap<String, String>>,
             OriginalUri(uri): OriginalUri,
             Path(id): Path<String>,
             data: Result<Json<R>, JsonRejection>| async move {
                let Json(data) = data.map_err(map_json_rejection)?;

                let params = RestParams::new("PUT", &uri, &headers, query);
                let params = P::from_rest_params(params);

                let svc = state.handle()?;
                let res = svc.update(&id, data, params).await?;
                Ok::<_, CrmAxumError>(Json(res))
            },
        );
    }

    if capabilities.allows(&ServiceMethodKind::Patch) {
        item = item.patch(
            |State(state): State<ServiceState<R, P>>,
             headers: HeaderMap,
             Query(query): Query<HashMap<String, String>>,
             OriginalUri(uri): OriginalUri,
             Path(id): Path<String>,
             data: Result<Json<R>, JsonRejection>| async move {
                let Json(data) = data.map_err(map_json_rejection)?;

                let params = RestParams::new("PATCH", &uri, &headers, query);
                let params = P::from_rest_params(params);

                let svc = state.handle()?;
                let res = svc.patch(Some(&id), data, params).await?;
                Ok::<_, CrmAxumError>(Json(res))
            },
        );
    }

    if capabilities.allows(&ServiceMethodKind::Remove) {
        item = item.delete(
            |State(state): State<ServiceState<R, P>>,
             headers: HeaderMap,
             Query(query): Query<HashMap<String, String>>,
             OriginalUri(uri): OriginalUri,
             Path(id): Path<String>| async move {
                let params = RestParams::new("DELETE", &uri, &headers, query);
                let params = P::from_rest_params(params);

                let svc = state.handle()?;
                let res = svc.remove(Some(&id), params).await?;
                Ok::<_, CrmAxumError>(Json(res))
            },
        );
    }

    let caps = &capabilities.allowed_methods;
    let mut router = Router::new();
    if caps.iter().any(|m| matches!(m, ServiceMethodKind::Find | ServiceMethodKind::Create)) {
        router = router.route("/", collection);
    }
    if caps.iter().any(|m| {
        matches!(
            m,
            ServiceMethodKind::Get | ServiceMethodKind::Update | ServiceMethodKind::Patch | ServiceMethodKind::Remove
        )
    }) {
        router = router.route("/{id}", item);
    }

    router.with_state(state)
}
