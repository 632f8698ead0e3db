// API module entry
// Stats control endpoints under /control

mod handlers;
mod response;
mod types;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::AppState;
use crate::error::ControlError;
use crate::logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Stats,
    StatsReset,
    StatsConfig,
    StatsInfo,
}

/// Path, accepted method and handler of every control endpoint
static ENDPOINTS: [(&str, Method, Endpoint); 4] = [
    ("/control/stats", Method::GET, Endpoint::Stats),
    ("/control/stats_reset", Method::POST, Endpoint::StatsReset),
    ("/control/stats_config", Method::POST, Endpoint::StatsConfig),
    ("/control/stats_info", Method::GET, Endpoint::StatsInfo),
];

/// Control API route handler
///
/// Dispatches to handler functions based on request path and method
pub async fn handle_control<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = match resolve(&method, &path) {
        Ok(endpoint) => dispatch(endpoint, req, &state).await,
        Err(resp) => resp,
    };

    if let Ok(value) = state.config.http.server_name.parse() {
        response.headers_mut().insert(SERVER, value);
    }
    logger::log_api_request(method.as_str(), &path, response.status().as_u16());
    Ok(response)
}

/// Match the path exactly, then check the method (ensureGET / ensurePOST)
fn resolve(method: &Method, path: &str) -> Result<Endpoint, Response<Full<Bytes>>> {
    let Some((_, allowed, endpoint)) = ENDPOINTS.iter().find(|(p, _, _)| *p == path) else {
        return Err(response::not_found());
    };
    if method != allowed {
        logger::log_warning(&format!("Method not allowed: {method} {path}"));
        return Err(response::method_not_allowed(allowed.as_str()));
    }
    Ok(*endpoint)
}

async fn dispatch<B>(endpoint: Endpoint, req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match endpoint {
        Endpoint::Stats => handlers::handle_stats(state).await,
        Endpoint::StatsInfo => handlers::handle_stats_info(state).await,
        Endpoint::StatsReset => handlers::handle_stats_reset(state),
        Endpoint::StatsConfig => match read_body(req, state.config.http.max_body_size).await {
            Ok(body) => handlers::handle_stats_config(state, &body).await,
            Err(resp) => resp,
        },
    }
}

/// Collect the request body, 413 when it is larger than `max_body_size`
async fn read_body<B>(req: Request<B>, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|size| size > max_body_size) {
        logger::log_warning(&format!(
            "Request body too large: {declared:?} bytes (max: {max_body_size})"
        ));
        return Err(response::payload_too_large(max_body_size));
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(response::payload_too_large(max_body_size)),
        Err(e) => Err(response::error_response(&ControlError::Body(e.to_string()))),
    }
}


#[cfg(test)]
mod tests {
    use super::response::OK_BODY;
    use super::test_support::{body_json, body_string, test_state};
    use super::*;
    use hyper::StatusCode;

    fn request(method: Method, path: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn call(
        state: &Arc<AppState>,
        method: Method,
        path: &str,
        body: &str,
    ) -> Response<Full<Bytes>> {
        handle_control(request(method, path, body), Arc::clone(state))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_config_then_info_round_trip() {
        let (state, _stats, _dir) = test_state(1).await;
        let state = Arc::new(state);

        let resp = call(&state, Method::POST, "/control/stats_config", r#"{"interval":30}"#).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(SERVER).unwrap(), "stats-control-test");

        let resp = call(&state, Method::GET, "/control/stats_info", "").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({"interval": 30}));

        let resp = call(&state, Method::GET, "/control/stats", "").await;
        assert_eq!(body_json(resp).await["time_units"], "days");
    }

    #[tokio::test]
    async fn test_malformed_json_is_400_not_500() {
        let (state, _stats, _dir) = test_state(1).await;
        let state = Arc::new(state);

        let resp = call(&state, Method::POST, "/control/stats_config", "not json").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let (state, _stats, _dir) = test_state(1).await;
        let state = Arc::new(state);

        let resp = call(&state, Method::POST, "/control/stats", "").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers().get("Allow").unwrap(), "GET");

        let resp = call(&state, Method::GET, "/control/stats_reset", "").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers().get("Allow").unwrap(), "POST");

        let resp = call(&state, Method::GET, "/control/stats_config", "").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (state, _stats, _dir) = test_state(1).await;
        let state = Arc::new(state);

        let resp = call(&state, Method::GET, "/control/stats/", "").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["available_endpoints"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let (state, _stats, _dir) = test_state(1).await;
        let state = Arc::new(state);

        // test config allows 64 bytes
        let body = format!(r#"{{"interval":7,"padding":"{}"}}"#, "x".repeat(100));
        let resp = call(&state, Method::POST, "/control/stats_config", &body).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(*state.stats_interval.read().await, 1);
    }

    #[tokio::test]
    async fn test_reset_returns_ok_marker() {
        let (state, stats, _dir) = test_state(1).await;
        let state = Arc::new(state);

        let resp = call(&state, Method::POST, "/control/stats_reset", "").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, OK_BODY);
        assert_eq!(stats.clear_calls(), 1);
    }
}
