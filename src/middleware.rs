//! Cross-cutting HTTP layers: the CORS allow-list, per-client rate limiting,
//! hardened response headers and the production HTTPS redirect.

use std::time::Duration;

use actix_cors::Cors;
use actix_governor::{GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Next};
use actix_web::{Error, HttpResponse};
use governor::middleware::NoOpMiddleware;
use log::{trace, warn};

use crate::auth::TOKEN_HEADER;

pub type RateLimitConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Only the listed origins may make cross-origin calls. Requests without an
/// `Origin` header are not subject to CORS and pass through untouched.
pub fn cors(allowed_origins: &[String]) -> Cors {
    let allowed = allowed_origins.to_vec();
    Cors::default()
        .allowed_origin_fn(move |origin, _req| {
            let permitted = origin
                .to_str()
                .map(|o| allowed.iter().any(|a| a == o))
                .unwrap_or(false);
            if !permitted {
                warn!("Blocked by CORS: {origin:?}");
            }
            permitted
        })
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_header(header::CONTENT_TYPE)
        .allowed_header(header::ACCEPT)
        .allowed_header(TOKEN_HEADER)
        .max_age(3600)
}

/// Each client IP may send a burst of `max_requests`; the allowance refills
/// evenly over `window`. Returns `None` for a zero limit or window.
pub fn rate_limit(max_requests: u32, window: Duration) -> Option<RateLimitConfig> {
    if max_requests == 0 {
        return None;
    }
    let refill_ms = window.as_millis() / u128::from(max_requests);
    let refill_ms = u64::try_from(refill_ms).unwrap_or(u64::MAX);
    GovernorConfigBuilder::default()
        .per_millisecond(refill_ms)
        .burst_size(max_requests)
        .finish()
}

pub fn secure_headers(production: bool) -> DefaultHeaders {
    let headers = DefaultHeaders::new()
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .add((header::REFERRER_POLICY, "no-referrer"))
        .add((header::X_DNS_PREFETCH_CONTROL, "off"))
        .add(("Cross-Origin-Resource-Policy", "same-origin"))
        .add(("Cross-Origin-Opener-Policy", "same-origin"));
    if production {
        headers.add((header::STRICT_TRANSPORT_SECURITY, "max-age=15552000; includeSubDomains"))
    } else {
        headers
    }
}

/// Redirects plain-HTTP traffic arriving through the TLS-terminating proxy.
pub async fn redirect_to_https(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let forwarded_proto = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok());
    if forwarded_proto == Some("https") {
        return next.call(req).await.map(ServiceResponse::map_into_boxed_body);
    }

    let host = req.connection_info().host().to_string();
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let location = format!("https://{host}{target}");
    trace!("Redirecting insecure request to {location}");
    let response = HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish();
    Ok(req.into_response(response))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use actix_governor::Governor;
    use actix_web::dev::Service;
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::{test, web, App};

    use super::*;

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().body("ok")
    }

    #[actix_web::test]
    async fn plain_http_is_redirected_to_https() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(redirect_to_https))
                .route("/api/order/list", web::post().to(ok)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/order/list?x=1")
            .insert_header((header::HOST, "shop.test"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "https://shop.test/api/order/list?x=1"
        );
    }

    #[actix_web::test]
    async fn forwarded_https_passes_through() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(redirect_to_https))
                .route("/", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("x-forwarded-proto", "https"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn secure_headers_are_added() {
        let app = test::init_service(
            App::new()
                .wrap(secure_headers(true))
                .route("/", web::get().to(ok)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert!(resp.headers().contains_key(header::STRICT_TRANSPORT_SECURITY));
    }

    #[actix_web::test]
    async fn cors_rejects_unknown_origins() {
        let app = test::init_service(
            App::new()
                .wrap(cors(&["http://localhost:5174".to_string()]))
                .route("/", web::get().to(ok)),
        )
        .await;

        let allowed = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://localhost:5174"))
            .to_request();
        let resp = test::call_service(&app, allowed).await;
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5174"
        );

        let blocked = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://evil.test"))
            .to_request();
        let resp = test::call_service(&app, blocked).await;
        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[actix_web::test]
    async fn zero_limits_are_refused() {
        assert!(rate_limit(0, Duration::from_secs(60)).is_none());
        assert!(rate_limit(5, Duration::ZERO).is_none());
        assert!(rate_limit(100, Duration::from_secs(900)).is_some());
    }

    #[actix_web::test]
    async fn clients_over_the_limit_get_too_many_requests() {
        let limit = rate_limit(2, Duration::from_secs(60)).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(Governor::new(&limit))
                .route("/", web::get().to(ok)),
        )
        .await;

        let busy: SocketAddr = "10.0.0.1:40000".parse().unwrap();
        let quiet: SocketAddr = "10.0.0.2:40000".parse().unwrap();
        let mut statuses = Vec::new();
        for peer in [busy, busy, busy, quiet] {
            let req = test::TestRequest::get().uri("/").peer_addr(peer).to_request();
            let status = match app.call(req).await {
                Ok(resp) => resp.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            statuses.push(status);
        }

        assert_eq!(
            statuses,
            vec![
                StatusCode::OK,
                StatusCode::OK,
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::OK
            ]
        );
    }
}
