use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::middleware;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower::util::ServiceExt; // for `oneshot`

use hr_authz::guard::{route_guard, RouteGuard};

fn app(guard: RouteGuard) -> Router {
    Router::new()
        .route("/", get(|| async { "home page" }))
        .route("/login", get(|| async { "login page" }))
        .route("/dashboard", get(|| async { "dashboard" }))
        .route("/dashboard/employees", get(|| async { "employees" }))
        .layer(middleware::from_fn_with_state(Arc::new(guard), route_guard))
}

fn location(resp: &Response) -> Option<&str> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

#[tokio::test]
async fn protected_page_without_cookie_redirects_to_login() -> Result<()> {
    let req = Request::builder()
        .uri("/dashboard/employees")
        .body(Body::empty())?;
    let resp: Response = app(RouteGuard::default()).oneshot(req).await?;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn protected_page_with_cookie_is_served() -> Result<()> {
    let req = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, "theme=dark; token=abc123")
        .body(Body::empty())?;
    let resp: Response = app(RouteGuard::default()).oneshot(req).await?;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), 1024).await?;
    assert_eq!(&body[..], b"dashboard");
    Ok(())
}

#[tokio::test]
async fn cookie_split_across_headers_is_found() -> Result<()> {
    let req = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, "theme=dark")
        .header(header::COOKIE, "token=abc123")
        .body(Body::empty())?;
    let resp: Response = app(RouteGuard::default()).oneshot(req).await?;

    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn login_with_session_redirects_home() -> Result<()> {
    let req = Request::builder()
        .uri("/login")
        .header(header::COOKIE, "token=abc123")
        .body(Body::empty())?;
    let resp: Response = app(RouteGuard::default()).oneshot(req).await?;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/dashboard"));
    Ok(())
}

#[tokio::test]
async fn public_pages_pass_through() -> Result<()> {
    let router = app(RouteGuard::default());

    let req = Request::builder().uri("/").body(Body::empty())?;
    let resp: Response = router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/login").body(Body::empty())?;
    let resp: Response = router.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn custom_cookie_name_is_honoured() -> Result<()> {
    let guard = RouteGuard::new().with_session_cookie("sid");

    let req = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, "token=abc123")
        .body(Body::empty())?;
    let resp: Response = app(guard.clone()).oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let req = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, "sid=xyz")
        .body(Body::empty())?;
    let resp: Response = app(guard).oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn site_wide_protection_still_serves_login() -> Result<()> {
    let router = app(RouteGuard::new().with_protected_prefixes(["/".to_string()]));

    let req = Request::builder().uri("/login").body(Body::empty())?;
    let resp: Response = router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/").body(Body::empty())?;
    let resp: Response = router.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn root_login_page_does_not_bounce_dashboard() -> Result<()> {
    let router = app(RouteGuard::new().with_login_path("/"));

    let req = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, "token=abc123")
        .body(Body::empty())?;
    let resp: Response = router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder()
        .uri("/")
        .header(header::COOKIE, "token=abc123")
        .body(Body::empty())?;
    let resp: Response = router.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/dashboard"));
    Ok(())
}

#[tokio::test]
async fn empty_leading_cookie_does_not_hide_session() -> Result<()> {
    let req = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, "token=; token=abc123")
        .body(Body::empty())?;
    let resp: Response = app(RouteGuard::default()).oneshot(req).await?;

    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}
