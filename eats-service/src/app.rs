use std::sync::Arc;

use async_graphql::http::{GraphiQLSource, ALL_WEBSOCKET_PROTOCOLS};
use async_graphql::Data;
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::extract::{DefaultBodyLimit, FromRef, State, WebSocketUpgrade};
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::response::{Html, IntoResponse, Response};
use axum::{middleware, routing::{get, post}, Router};
use common_auth::{AuthContext, JwtVerifier};
use common_http_errors::{ApiError, ApiResult, ERROR_CODE_HEADER};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::debug;

use crate::graphql::guard::viewer_from_init_payload;
use crate::graphql::{operation_kind, EatsSchema, Viewer};
use crate::metrics::ServiceMetrics;
use crate::uploads::{upload_file, ObjectStore};

const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub schema: EatsSchema,
    pub jwt_verifier: Arc<JwtVerifier>,
    pub object_store: Arc<dyn ObjectStore>,
    pub metrics: ServiceMetrics,
    pub graphiql: bool,
}

impl FromRef<AppState> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_verifier.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ObjectStore> {
    fn from_ref(state: &AppState) -> Self {
        state.object_store.clone()
    }
}

pub async fn http_error_metrics(
    State(metrics): State<ServiceMetrics>,
    req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> Response {
    let resp = next.run(req).await;
    let status = resp.status();
    if status.as_u16() >= 400 {
        let code = resp
            .headers()
            .get(ERROR_CODE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        metrics.http_error(code, status);
    }
    resp
}

pub async fn health() -> &'static str {
    "ok"
}

async fn metrics_endpoint(State(state): State<AppState>) -> ApiResult<Response> {
    state.metrics.render().map_err(ApiError::internal)
}

async fn graphql_handler(
    State(state): State<AppState>,
    auth: Option<AuthContext>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let request = req.into_inner();
    state.metrics.graphql_request(operation_kind(&request.query));
    let viewer = Viewer(auth.map(AuthContext::into_claims));
    state.schema.execute(request.data(viewer)).await.into()
}

async fn graphiql(State(state): State<AppState>) -> ApiResult<Html<String>> {
    if !state.graphiql {
        return Err(ApiError::NotFound { code: "graphiql_disabled" });
    }
    Ok(Html(
        GraphiQLSource::build()
            .endpoint("/graphql")
            .subscription_endpoint("/graphql/ws")
            .finish(),
    ))
}

async fn graphql_ws(
    State(state): State<AppState>,
    protocol: GraphQLProtocol,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    let schema = state.schema.clone();
    let verifier = state.jwt_verifier.clone();
    upgrade
        .protocols(ALL_WEBSOCKET_PROTOCOLS)
        .on_upgrade(move |socket| {
            GraphQLWebSocket::new(socket, schema, protocol)
                .on_connection_init(move |payload| async move {
                    let viewer = viewer_from_init_payload(&verifier, &payload);
                    debug!(authenticated = viewer.0.is_some(), "subscription connection initialised");
                    let mut data = Data::default();
                    data.insert(viewer);
                    Ok(data)
                })
                .serve()
        })
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION, HeaderName::from_static("x-jwt")]);

    let metrics = state.metrics.clone();
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/graphql/ws", get(graphql_ws))
        .route(
            "/uploads",
            post(upload_file).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .with_state(state)
        .layer(middleware::from_fn_with_state(metrics, http_error_metrics))
        .layer(cors)
}
