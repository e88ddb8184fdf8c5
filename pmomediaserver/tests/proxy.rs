use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use pmomediaserver::proxy::proxy_handler;
use futures::StreamExt;
use pmomediaserver::{HttpTransport, ProxyState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tower::ServiceExt;

const TOTAL: usize = 1000;

fn payload() -> Vec<u8> {
    (0..TOTAL).map(|i| (i % 251) as u8).collect()
}

/// Origine minimale qui honore `Range: bytes=a-b`
async fn media(headers: HeaderMap) -> Response {
    let data = payload();
    let forwarded = headers
        .get("x-forwarded-host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("bytes="))
        .and_then(|v| v.split_once('-'))
        .and_then(|(a, b)| Some((a.parse::<usize>().ok()?, b.parse::<usize>().ok()?)));

    match range {
        Some((start, end)) if start <= end && end < TOTAL => (
            StatusCode::PARTIAL_CONTENT,
            [
                (header::CONTENT_RANGE, format!("bytes {start}-{end}/{TOTAL}")),
                (header::ACCEPT_RANGES, "bytes".to_string()),
                (header::HeaderName::from_static("x-seen-forwarded-host"), forwarded),
            ],
            data[start..=end].to_vec(),
        )
            .into_response(),
        _ => (
            StatusCode::OK,
            [
                (header::ACCEPT_RANGES, "bytes".to_string()),
                (header::HeaderName::from_static("x-seen-forwarded-host"), forwarded),
            ],
            data,
        )
            .into_response(),
    }
}

async fn spawn_origin() -> String {
    let app = Router::new()
        .route("/media.bin", get(media))
        .route("/moved", get(|| async { Redirect::temporary("/media.bin") }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Lève le drapeau quand l'origine abandonne son flux
struct StreamDropped(Arc<AtomicBool>);

impl Drop for StreamDropped {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Origine qui émet un bloc toutes les 10 ms, sans fin
async fn spawn_endless_origin(dropped: Arc<AtomicBool>) -> String {
    let app = Router::new().route(
        "/live.ts",
        get(move || {
            let guard = StreamDropped(dropped.clone());
            async move {
                let chunks = futures::stream::unfold(guard, |guard| async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Some((Ok::<_, std::io::Error>(vec![0x47u8; 4096]), guard))
                });
                Body::from_stream(chunks)
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn proxy_router() -> Router {
    let transport = HttpTransport::build(&[], Duration::from_secs(5)).unwrap();
    Router::new()
        .route("/cdp-proxy", get(proxy_handler).head(proxy_handler))
        .with_state(ProxyState::new(transport.proxy_client()))
}

fn proxied(origin: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(origin.as_bytes()).collect();
    format!("/cdp-proxy?url={encoded}")
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_range_is_passed_through() {
    let origin = spawn_origin().await;
    let request = Request::builder()
        .uri(proxied(&format!("{origin}/media.bin")))
        .header(header::HOST, "dms.local")
        .header(header::RANGE, "bytes=100-199")
        .body(Body::empty())
        .unwrap();

    let response = proxy_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers().get(header::CONTENT_RANGE).unwrap(),
        "bytes 100-199/1000"
    );
    assert_eq!(response.headers().get(header::ACCEPT_RANGES).unwrap(), "bytes");
    assert_eq!(response.headers().get("x-seen-forwarded-host").unwrap(), "dms.local");

    let body = body_bytes(response).await;
    assert_eq!(body.len(), 100);
    assert_eq!(body, payload()[100..200].to_vec());
}

#[tokio::test]
async fn test_full_body() {
    let origin = spawn_origin().await;
    let request = Request::builder()
        .uri(proxied(&format!("{origin}/media.bin")))
        .body(Body::empty())
        .unwrap();

    let response = proxy_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(header::CONTENT_LENGTH).unwrap(), "1000");
    assert_eq!(body_bytes(response).await, payload());
}

#[tokio::test]
async fn test_head_request() {
    let origin = spawn_origin().await;
    let request = Request::builder()
        .method("HEAD")
        .uri(proxied(&format!("{origin}/media.bin")))
        .body(Body::empty())
        .unwrap();

    let response = proxy_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(header::CONTENT_LENGTH).unwrap(), "1000");
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let origin = spawn_origin().await;
    let request = Request::builder()
        .uri(proxied(&format!("{origin}/moved")))
        .body(Body::empty())
        .unwrap();

    let response = proxy_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/media.bin");
}

#[tokio::test]
async fn test_bad_requests() {
    for uri in ["/cdp-proxy", "/cdp-proxy?url=", "/cdp-proxy?url=nope", "/cdp-proxy?url=ftp%3A%2F%2Fo%2Ff"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = proxy_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_unreachable_origin() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let request = Request::builder()
        .uri(proxied(&format!("http://{addr}/gone.mp3")))
        .body(Body::empty())
        .unwrap();
    let response = proxy_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_client_disconnect_closes_origin_stream() {
    let dropped = Arc::new(AtomicBool::new(false));
    let origin = spawn_endless_origin(dropped.clone()).await;
    let request = Request::builder()
        .uri(proxied(&format!("{origin}/live.ts")))
        .body(Body::empty())
        .unwrap();

    let response = proxy_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body().into_data_stream();
    let first = body.next().await.unwrap().unwrap();
    assert!(!first.is_empty());
    assert!(!dropped.load(Ordering::SeqCst));
    drop(body);

    tokio::time::timeout(Duration::from_secs(5), async {
        while !dropped.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("origin kept streaming after the client went away");
}
