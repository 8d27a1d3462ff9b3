//! Visit tracking middleware.
//!
//! Records a visit row for the public pages a visitor can land on:
//! product detail, category detail, and the contact page. Tracking
//! failures are logged and never fail the request.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::db::VisitRepository;
use crate::state::AppState;

/// Record a visit when the request targets a tracked page, then
/// continue the chain.
///
/// The client address is taken from the first `X-Forwarded-For` entry
/// when present, falling back to the peer address.
pub async fn track_visit(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::GET && is_tracked_page(request.uri().path()) {
        let page = request.uri().path().to_owned();
        let ip_address = forwarded_for(&request).unwrap_or_else(|| peer.ip().to_string());

        let repo = VisitRepository::new(state.pool());
        if let Err(error) = repo.record(&page, Some(&ip_address)).await {
            tracing::warn!(%error, page, "Failed to record visit");
        }
    }

    next.run(request).await
}

/// The contact page and product/category detail pages are tracked.
fn is_tracked_page(path: &str) -> bool {
    if path == "/contact" {
        return true;
    }
    detail_id(path, "/products/").is_some() || detail_id(path, "/categories/").is_some()
}

fn detail_id(path: &str, prefix: &str) -> Option<Uuid> {
    let rest = path.strip_prefix(prefix)?;
    if rest.contains('/') {
        return None;
    }
    rest.parse().ok()
}

fn forwarded_for(request: &Request) -> Option<String> {
    request
        .headers()
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(|ip| ip.trim().to_owned())
        .filter(|ip| !ip.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_page_tracked() {
        assert!(is_tracked_page("/contact"));
        assert!(!is_tracked_page("/contact/whatsapp-number"));
    }

    #[test]
    fn test_detail_pages_tracked() {
        let id = Uuid::new_v4();
        assert!(is_tracked_page(&format!("/products/{id}")));
        assert!(is_tracked_page(&format!("/categories/{id}")));
        assert!(!is_tracked_page("/products"));
        assert!(!is_tracked_page("/products/slug/durian-montong"));
        assert!(!is_tracked_page(&format!("/posts/{id}")));
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let request = axum::http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(forwarded_for(&request), Some("203.0.113.7".to_string()));
    }

    #[test]
    fn test_forwarded_for_absent() {
        let request = axum::http::Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(forwarded_for(&request), None);
    }
}
