#[cfg(test)]
mod tests {
    use crate::errors::UpstreamError;
    use crate::handlers::handle_rejection;
    use crate::GatewayError;
    use serde_json::Value;
    use warp::http::StatusCode;
    use warp::Reply;

    async fn render(rejection: warp::Rejection) -> (StatusCode, Value) {
        let response = handle_rejection(rejection).await.unwrap().into_response();
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_handle_not_found_rejection() {
        let (status, body) = render(warp::reject::not_found()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn test_handle_rate_limit_rejection() {
        let (status, body) = render(warp::reject::custom(GatewayError::RateLimitExceeded)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Rate limit exceeded. Try again later.");
    }

    #[tokio::test]
    async fn test_handle_upstream_rejection() {
        let rejection = warp::reject::custom(GatewayError::Upstream(UpstreamError::Status {
            status: 404,
            message: "No Launch matches the given query.".to_string(),
        }));
        let (status, body) = render(rejection).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "No Launch matches the given query.");
    }

    #[tokio::test]
    async fn test_handle_timeout_rejection() {
        let rejection = warp::reject::custom(GatewayError::Upstream(UpstreamError::Timeout));
        let (status, body) = render(rejection).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Request timed out");
    }

    #[tokio::test]
    async fn test_handle_invalid_url_rejection() {
        let rejection = warp::reject::custom(GatewayError::InvalidUrl("nope".to_string()));
        let (status, _) = render(rejection).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
