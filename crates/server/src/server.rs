use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{auth, reports, summaries, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves Basic credentials to a user and stores it as a request
/// extension.
///
/// A failed lookup and a failed hash verification are indistinguishable
/// from outside: both are a plain 401.
async fn authenticate(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let (user, password_hash) = state
        .engine
        .user_by_username(auth_header.username())
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    if !auth::verify_password(&password_hash, auth_header.password()) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/reports", post(reports::create).get(reports::list))
        .route("/reports/annual", get(summaries::annual))
        .route("/reports/balance", get(summaries::general_balance))
        .route("/reports/month/{month}/{year}", get(reports::list_by_month))
        .route(
            "/reports/{id}",
            get(reports::get).put(reports::update).delete(reports::remove),
        )
        .route("/reports/{id}/incomes", post(reports::add_income))
        .route(
            "/reports/{id}/incomes/{item_id}",
            delete(reports::remove_income),
        )
        .route("/reports/{id}/expenses", post(reports::add_expense))
        .route(
            "/reports/{id}/expenses/{item_id}",
            delete(reports::remove_expense),
        )
        .route(
            "/user",
            get(user::profile).patch(user::update).delete(user::remove),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/users", post(user::register))
        .merge(protected)
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};
    use base64::Engine as _;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        router(ServerState {
            engine: Arc::new(engine),
        })
    }

    fn basic(username: &str) -> String {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:hunter2"));
        format!("Basic {encoded}")
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(authorization) = authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(router: &Router, username: &str) {
        let (status, _) = send(
            router,
            Method::POST,
            "/users",
            None,
            Some(json!({
                "email": format!("{username}@example.com"),
                "username": username,
                "fullname": "Test User",
                "password": "hunter2",
                "confirm_password": "hunter2",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn register_then_fetch_profile() {
        let router = test_router().await;
        register(&router, "alice").await;

        let (status, body) = send(
            &router,
            Method::GET,
            "/user",
            Some(&basic("alice")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");
        // No password field, hashed or otherwise, in any read response.
        assert!(body.get("password").is_none());
        assert!(!body.to_string().contains("password"));
    }

    #[tokio::test]
    async fn register_duplicate_is_conflict() {
        let router = test_router().await;
        register(&router, "alice").await;

        let (status, _) = send(
            &router,
            Method::POST,
            "/users",
            None,
            Some(json!({
                "email": "alice@example.com",
                "username": "alice",
                "fullname": "Test User",
                "password": "hunter2",
                "confirm_password": "hunter2",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_password_mismatch_is_rejected() {
        let router = test_router().await;
        let (status, _) = send(
            &router,
            Method::POST,
            "/users",
            None,
            Some(json!({
                "email": "alice@example.com",
                "username": "alice",
                "fullname": "Test User",
                "password": "hunter2",
                "confirm_password": "hunter3",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_or_wrong_credentials_are_unauthorized() {
        let router = test_router().await;
        register(&router, "alice").await;

        let (status, _) = send(&router, Method::GET, "/reports", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let wrong = base64::engine::general_purpose::STANDARD.encode("alice:nope");
        let (status, _) = send(
            &router,
            Method::GET,
            "/reports",
            Some(&format!("Basic {wrong}")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_report_computes_reference_totals() {
        let router = test_router().await;
        register(&router, "alice").await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/reports",
            Some(&basic("alice")),
            Some(json!({
                "month": "January",
                "year": 2026,
                "incomes": [{"concept": "salary", "amount": 1000.0}],
                "expenses": [{"concept": "rent", "amount": 200.0}],
                "offering_percentage": 0.04,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["gross_income"], 1000.0);
        assert_eq!(body["tithe"], 100.0);
        assert_eq!(body["offering"], 40.0);
        assert_eq!(body["church_total"], 140.0);
        assert_eq!(body["net_income"], 860.0);
        assert_eq!(body["total_expenses"], 200.0);
        assert_eq!(body["settlement"], 660.0);
    }

    #[tokio::test]
    async fn add_income_updates_totals_and_missing_item_is_not_found() {
        let router = test_router().await;
        register(&router, "alice").await;

        let (_, report) = send(
            &router,
            Method::POST,
            "/reports",
            Some(&basic("alice")),
            Some(json!({
                "month": "January",
                "year": 2026,
                "incomes": [],
                "expenses": [],
                "offering_percentage": 0.0,
            })),
        )
        .await;
        let report_id = report["id"].as_str().unwrap().to_string();

        let (status, updated) = send(
            &router,
            Method::POST,
            &format!("/reports/{report_id}/incomes"),
            Some(&basic("alice")),
            Some(json!({"concept": "salary", "amount": 250.5})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(updated["gross_income"], 250.5);

        let missing = uuid::Uuid::new_v4();
        let (status, _) = send(
            &router,
            Method::DELETE,
            &format!("/reports/{report_id}/incomes/{missing}"),
            Some(&basic("alice")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn annual_summary_zero_reports_is_all_zero() {
        let router = test_router().await;
        register(&router, "alice").await;

        let (status, body) = send(
            &router,
            Method::GET,
            "/reports/annual?year=2026",
            Some(&basic("alice")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["year"], 2026);
        for field in [
            "gross_income",
            "tithe",
            "offering",
            "church_total",
            "net_income",
            "total_expenses",
            "settlement",
        ] {
            assert_eq!(body[field], 0.0, "{field} should be zero");
        }
    }

    #[tokio::test]
    async fn annual_summary_rejects_non_numeric_year() {
        let router = test_router().await;
        register(&router, "alice").await;

        let (status, _) = send(
            &router,
            Method::GET,
            "/reports/annual?year=later",
            Some(&basic("alice")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_user_removes_account_and_reports() {
        let router = test_router().await;
        register(&router, "alice").await;

        let (status, _) = send(
            &router,
            Method::POST,
            "/reports",
            Some(&basic("alice")),
            Some(json!({
                "month": "January",
                "year": 2026,
                "incomes": [{"concept": "salary", "amount": 10.0}],
                "expenses": [],
                "offering_percentage": 0.0,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(
            &router,
            Method::DELETE,
            "/user",
            Some(&basic("alice")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        // The account is gone, so the same credentials no longer resolve.
        let (status, _) = send(
            &router,
            Method::GET,
            "/reports",
            Some(&basic("alice")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
