use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pmocatalog::{CatalogClient, CatalogItem};
use pmodidl::DIDLLite;
use pmomediaserver::contentdirectory::{BrowseEngine, BrowseRequest, CONTENT_DIRECTORY_URN, UpdateCounter};
use pmomediaserver::{BrowseError, ObjectTranslator, ProxyState, bridge_router};
use pmoupnp::soap::build_soap_request;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

type Hits = Arc<AtomicUsize>;

const SPARSE: &str = r#"[
    {"id":"n1","parent_id":null,"title":null,"mime_type":"audio/mpeg","media_url":"http://origin/n1.mp3","bitrate":5000000000},
    {"id":"n2","parent_id":"sparse","title":"Fine","is_directory":null,"mime_type":"video/mp4","media_url":"http://origin/n2.mp4","size":"big"},
    {"id":"n3"}
]"#;

fn audio(id: &str, parent: &str) -> CatalogItem {
    CatalogItem::media(id, parent, format!("Track {id}"), "audio/mpeg", format!("http://origin/{id}.mp3"))
}

async fn browse(State(hits): State<Hits>, Query(q): Query<HashMap<String, String>>) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    match q.get("id").map(String::as_str) {
        Some("many") => Json((0..10).map(|i| audio(&format!("i{i}"), "many")).collect::<Vec<_>>()).into_response(),
        Some("mixed") => {
            let mut no_url = audio("nourl", "mixed");
            no_url.media_url = None;
            Json(vec![
                CatalogItem::directory("d1", "mixed", "Albums"),
                audio("a1", "mixed"),
                CatalogItem::media("p1", "mixed", "Manual", "application/pdf", "http://origin/m.pdf"),
                no_url,
                CatalogItem::media("v1", "mixed", "Clip", "video/mp4", "http://origin/v.mp4"),
            ])
            .into_response()
        }
        Some("boom") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Some("garbage") => "{not json".into_response(),
        Some("sparse") => SPARSE.into_response(),
        _ => Json(Vec::<CatalogItem>::new()).into_response(),
    }
}

async fn object(State(hits): State<Hits>, Query(q): Query<HashMap<String, String>>) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    match q.get("id").map(String::as_str) {
        Some("v1") => {
            Json(CatalogItem::media("v1", "mixed", "Clip", "video/mp4", "http://origin/v.mp4")).into_response()
        }
        Some("p1") => Json(CatalogItem::media("p1", "mixed", "Manual", "application/pdf", "http://origin/m.pdf"))
            .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_catalog() -> (String, Hits) {
    let hits: Hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/browse", get(browse))
        .route("/object", get(object))
        .with_state(hits.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), hits)
}

async fn engine() -> (BrowseEngine, Hits) {
    let (base, hits) = spawn_catalog().await;
    let catalog = CatalogClient::new(base, "token").unwrap();
    let engine = BrowseEngine::new(
        catalog,
        ObjectTranslator::new("/cdp-proxy"),
        Arc::new(UpdateCounter::new()),
    );
    (engine, hits)
}

fn ids(didl: &str) -> Vec<String> {
    DIDLLite::parse(didl)
        .unwrap()
        .objects
        .iter()
        .map(|o| o.id().to_string())
        .collect()
}

#[tokio::test]
async fn test_pagination_window() {
    let (engine, _) = engine().await;

    let page = engine.browse(&BrowseRequest::children("many", 3, 4), "dms.local").await.unwrap();
    assert_eq!(page.total_matches, 10);
    assert_eq!(page.number_returned, 4);
    assert_eq!(ids(&page.result), vec!["i3", "i4", "i5", "i6"]);

    let page = engine.browse(&BrowseRequest::children("many", 20, 4), "dms.local").await.unwrap();
    assert_eq!(page.total_matches, 10);
    assert_eq!(page.number_returned, 0);
    assert!(ids(&page.result).is_empty());

    let page = engine.browse(&BrowseRequest::children("many", 6, 0), "dms.local").await.unwrap();
    assert_eq!(ids(&page.result), vec!["i6", "i7", "i8", "i9"]);
}

#[tokio::test]
async fn test_total_matches_counts_filtered_records() {
    let (engine, _) = engine().await;

    let page = engine.browse(&BrowseRequest::children("mixed", 0, 0), "dms.local").await.unwrap();
    assert_eq!(page.total_matches, 5);
    assert_eq!(page.number_returned, 3);
    assert_eq!(ids(&page.result), vec!["d1", "a1", "v1"]);
    assert!(page.result.contains("http://dms.local/cdp-proxy?url=http%3A%2F%2Forigin%2Fa1.mp3"));
}

#[tokio::test]
async fn test_sparse_records_do_not_fail_siblings() {
    let (engine, _) = engine().await;

    let page = engine.browse(&BrowseRequest::children("sparse", 0, 0), "h").await.unwrap();
    assert_eq!(page.total_matches, 3);
    assert_eq!(page.number_returned, 2);
    assert_eq!(ids(&page.result), vec!["n1", "n2"]);
    assert!(!page.result.contains("bitrate="));
    assert!(!page.result.contains("size="));
}

#[tokio::test]
async fn test_catalog_failures() {
    let (engine, _) = engine().await;

    let err = engine.browse(&BrowseRequest::children("boom", 0, 0), "h").await.unwrap_err();
    assert!(matches!(err, BrowseError::CatalogUnreachable(_)));
    assert_eq!(err.upnp_error_code(), "701");

    let err = engine.browse(&BrowseRequest::children("garbage", 0, 0), "h").await.unwrap_err();
    assert!(matches!(err, BrowseError::MalformedCatalogResponse(_)));
    assert_eq!(err.upnp_error_code(), "501");
}

#[tokio::test]
async fn test_browse_metadata() {
    let (engine, _) = engine().await;

    let meta = engine.browse(&BrowseRequest::metadata("v1"), "h").await.unwrap();
    assert_eq!(meta.total_matches, 1);
    assert_eq!(meta.number_returned, 1);
    let doc = DIDLLite::parse(&meta.result).unwrap();
    let item = doc.items().next().unwrap();
    assert_eq!(item.class, "object.item.videoItem");
    assert_eq!(item.parent_id, "mixed");

    let err = engine.browse(&BrowseRequest::metadata("p1"), "h").await.unwrap_err();
    assert!(matches!(err, BrowseError::NoSuchObject(_)));

    let err = engine.browse(&BrowseRequest::metadata("ghost"), "h").await.unwrap_err();
    assert!(matches!(err, BrowseError::NoSuchObject(_)));
    assert_eq!(err.upnp_error_code(), "701");
}

#[tokio::test]
async fn test_update_id_never_decreases_under_concurrency() {
    let (engine, _) = engine().await;
    let engine = Arc::new(engine);

    let bumper = {
        let engine = engine.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                engine.notify_catalog_changed();
                tokio::task::yield_now().await;
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        readers.push(tokio::spawn(async move {
            let mut last = 0;
            for _ in 0..10 {
                let page = engine.browse(&BrowseRequest::children("many", 0, 1), "h").await.unwrap();
                assert!(page.update_id >= last);
                last = page.update_id;
            }
        }));
    }

    bumper.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(engine.update_id(), 51);
}

// Point de contrôle SOAP

async fn soap_call(router: Router, action: &str, args: &[(&str, &str)]) -> (StatusCode, String) {
    let body = build_soap_request(CONTENT_DIRECTORY_URN, action, args).unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/ContentDirectory/control")
        .header("host", "dms.local:8080")
        .header("content-type", "text/xml; charset=\"utf-8\"")
        .header("soapaction", format!("\"{CONTENT_DIRECTORY_URN}#{action}\""))
        .body(Body::from(body))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn router() -> (Router, Hits) {
    let (engine, hits) = engine().await;
    let router = bridge_router(
        Arc::new(engine),
        ProxyState::new(reqwest::Client::new()),
        "/ContentDirectory/control",
        "/cdp-proxy",
    );
    (router, hits)
}

#[tokio::test]
async fn test_soap_browse() {
    let (router, _) = router().await;

    let (status, body) = soap_call(
        router,
        "Browse",
        &[
            ("ObjectID", "many"),
            ("BrowseFlag", "BrowseDirectChildren"),
            ("Filter", "*"),
            ("StartingIndex", "0"),
            ("RequestedCount", "2"),
            ("SortCriteria", ""),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("BrowseResponse"));
    assert!(body.contains("<TotalMatches>10</TotalMatches>"));
    assert!(body.contains("<NumberReturned>2</NumberReturned>"));
    assert!(body.contains("<UpdateID>1</UpdateID>"));
    assert!(body.contains("&lt;DIDL-Lite"));
    assert!(body.contains("dms.local:8080/cdp-proxy"));
}

#[tokio::test]
async fn test_invalid_flag_faults_without_fetch() {
    let (router, hits) = router().await;

    let (status, body) = soap_call(
        router,
        "Browse",
        &[("ObjectID", "many"), ("BrowseFlag", "BrowseEverything")],
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("<errorCode>600</errorCode>"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_catalog_fault() {
    let (router, _) = router().await;

    let (status, body) = soap_call(
        router,
        "Browse",
        &[("ObjectID", "boom"), ("BrowseFlag", "BrowseDirectChildren")],
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("<errorCode>701</errorCode>"));
}

#[tokio::test]
async fn test_auxiliary_actions() {
    let (router, _) = router().await;

    let (status, body) = soap_call(router.clone(), "GetSystemUpdateID", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<Id>1</Id>"));

    let (status, body) = soap_call(router.clone(), "GetSortCapabilities", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("GetSortCapabilitiesResponse"));

    let (status, body) = soap_call(router, "Search", &[("ContainerID", "0")]).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("<errorCode>401</errorCode>"));
}

#[tokio::test]
async fn test_malformed_envelope() {
    let (router, _) = router().await;

    let request = Request::builder()
        .method("POST")
        .uri("/ContentDirectory/control")
        .body(Body::from("<not-soap/>"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("<errorCode>402</errorCode>"));
}
