//! REST API definitions.

pub mod auth;
pub mod favorite;
pub mod property;
pub mod recently_viewed;

use axum::{
    http::{self, header::InvalidHeaderValue, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Creates a new [`Router`] serving the REST API.
///
/// Handlers expect the [`Service`] to be provided as an [`Extension`] layer.
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
pub fn router() -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/user/:id", get(auth::user))
        .route(
            "/api/properties",
            get(property::search).post(property::create),
        )
        .route("/api/properties/:id", get(property::by_id))
        .route("/api/favorites", get(favorite::list))
        .route("/api/favorites/:property_id", post(favorite::toggle))
        .route("/api/favorites/check/:property_id", get(favorite::check))
        .route(
            "/api/recentlyviewed/track/:property_id",
            post(recently_viewed::track),
        )
        .route("/api/recentlyviewed", get(recently_viewed::list))
}

/// Creates a new [`CorsLayer`] allowing the provided `origins`.
///
/// A single `*` allows any origin.
///
/// # Errors
///
/// If any of the `origins` is not a valid header value.
pub fn cors(origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
    let allowed = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .map(|o| o.parse::<HeaderValue>())
                .collect::<Result<Vec<_>, _>>()?,
        )
    };
    Ok(CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE]))
}

#[cfg(test)]
mod spec {
    use axum::{
        body::{self, Body},
        http::{header, HeaderMap, Request, StatusCode},
        Extension, Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt as _;

    use crate::{config, Service};

    fn app() -> Router {
        let svc = Service::new(
            config::Service::default().into(),
            service::infra::Memory::new(),
        );
        super::router().layer(Extension(svc))
    }

    async fn send(
        app: &Router,
        req: Request<Body>,
    ) -> (StatusCode, HeaderMap, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, json)
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        req.body(Body::empty()).unwrap()
    }

    fn post(uri: &str, token: Option<&str>, json: &Value) -> Request<Body> {
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        req.body(Body::from(json.to_string())).unwrap()
    }

    async fn register(app: &Router, email: &str) -> String {
        let (status, _, body) = send(
            app,
            post(
                "/api/auth/register",
                None,
                &json!({"email": email, "password": "secret-pass"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn inverted_price_range_is_bad_request() {
        let app = app();

        let (status, _, body) = send(
            &app,
            get("/api/properties?priceFrom=500&priceTo=100", None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_CRITERIA");
        assert_eq!(body["message"], "PriceFrom cannot be greater than PriceTo");
    }

    #[tokio::test]
    async fn malformed_price_is_invalid_query() {
        let app = app();

        let (status, _, body) =
            send(&app, get("/api/properties?priceTo=cheap", None)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_QUERY");
    }

    #[tokio::test]
    async fn requires_valid_token() {
        let app = app();

        let (status, _, body) = send(&app, get("/api/auth/me", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "AUTHORIZATION_REQUIRED");

        let (status, _, body) =
            send(&app, get("/api/favorites", Some("not-a-jwt"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn registered_token_authorizes() {
        let app = app();
        let token = register(&app, "jane@example.com").await;

        let (status, _, body) =
            send(&app, get("/api/auth/me", Some(&token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "jane@example.com");
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let app = app();
        _ = register(&app, "jane@example.com").await;

        let (status, _, body) = send(
            &app,
            post(
                "/api/auth/register",
                None,
                &json!({"email": "jane@example.com", "password": "other-pass"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "EMAIL_OCCUPIED");
    }

    #[tokio::test]
    async fn tracking_unknown_property_is_not_found() {
        let app = app();
        let token = register(&app, "jane@example.com").await;

        let (status, _, body) = send(
            &app,
            post(
                "/api/recentlyviewed/track/5b0a2c7e-8d4f-4a55-9a0e-1f3c2b6d7e80",
                Some(&token),
                &Value::Null,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "PROPERTY_NOT_EXISTS");
    }

    #[tokio::test]
    async fn created_property_is_located() {
        let app = app();
        let token = register(&app, "jane@example.com").await;

        let (status, headers, created) = send(
            &app,
            post(
                "/api/properties",
                Some(&token),
                &json!({
                    "title": "Harbour view apartment",
                    "address": "12 George Street",
                    "city": "Sydney",
                    "price": 850_000,
                    "listingType": "Sale",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{created}");

        let location = headers[header::LOCATION].to_str().unwrap();
        assert_eq!(
            location,
            format!("/api/properties/{}", created["id"].as_str().unwrap()),
        );

        let (status, _, fetched) = send(&app, get(location, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["title"], "Harbour view apartment");
        assert_eq!(fetched["price"], 850_000);
    }

    #[tokio::test]
    async fn cors_allows_every_listed_origin() {
        let origins = vec![
            "https://a.example".to_owned(),
            "https://b.example".to_owned(),
        ];
        let app = app().layer(super::cors(&origins).unwrap());

        for origin in ["https://a.example", "https://b.example"] {
            let mut req = get("/api/properties", None);
            _ = req
                .headers_mut()
                .insert(header::ORIGIN, origin.parse().unwrap());

            let (status, headers, _) = send(&app, req).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(
                headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
                origin,
                "origin: {origin}",
            );
        }

        let mut req = get("/api/properties", None);
        _ = req
            .headers_mut()
            .insert(header::ORIGIN, "https://c.example".parse().unwrap());
        let (_, headers, _) = send(&app, req).await;
        assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn cors_wildcard_allows_any_origin() {
        let app = app().layer(super::cors(&["*".to_owned()]).unwrap());

        let mut req = get("/api/properties", None);
        _ = req
            .headers_mut()
            .insert(header::ORIGIN, "https://c.example".parse().unwrap());
        let (_, headers, _) = send(&app, req).await;

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
