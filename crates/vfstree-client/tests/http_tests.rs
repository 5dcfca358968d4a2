//! HttpVfsApi against a local axum server standing in for the device.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};

use vfstree_client::{ClientConfig, HttpVfsApi};
use vfstree_kernel::{ApiError, Node, TreeManager, VfsApi, VfsError};
use vfstree_testutil::fixtures;
use vfstree_types::{DeleteResponse, DirectoryListing, FileItem, VfsStat, VolumeListing};

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    content_type: Option<String>,
    last_modified: Option<String>,
    body: Vec<u8>,
}

#[derive(Clone, Default)]
struct Device {
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Device {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn last(&self) -> Recorded {
        self.requests().pop().unwrap()
    }
}

fn stat(used: u64) -> VfsStat {
    VfsStat {
        mounted: true,
        sector_size: 512,
        total_sectors: 1000,
        used_sectors: used,
        free_sectors: 1000 - used,
    }
}

fn text(status: StatusCode, body: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

async fn dispatch(
    State(device): State<Device>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let get_header = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    device.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        content_type: get_header(header::CONTENT_TYPE),
        last_modified: get_header(header::LAST_MODIFIED),
        body: body.to_vec(),
    });

    match (method.as_str(), uri.path()) {
        ("GET", "/api/vfs") => Json(fixtures::device_volumes()).into_response(),
        ("GET", "/api/vfs/sd/") => Json(fixtures::sd_with_nested_file()).into_response(),
        ("GET", "/api/vfs/sd/a/") => {
            let mut listing =
                DirectoryListing::new("a", vec![FileItem::file("b.txt", 10), FileItem::file("c.txt", 3)]);
            listing.vfs_stat = Some(stat(20));
            Json(listing).into_response()
        }
        ("GET", "/api/vfs/sd/missing/") => text(StatusCode::NOT_FOUND, "no such directory\n"),
        ("GET", "/api/vfs/sd/garbage/") => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            "{not json",
        )
            .into_response(),
        ("PUT", "/api/vfs/config/x/") => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        ("PUT", "/api/vfs/sd/new/") => Json(DirectoryListing::new("new", vec![])).into_response(),
        ("PUT", "/api/vfs/sd/full.bin") => text(StatusCode::INSUFFICIENT_STORAGE, "disk full"),
        ("PUT", p) if !p.ends_with('/') => {
            let name = p.rsplit('/').next().unwrap_or_default().to_string();
            let mut item = FileItem::file(name, body.len() as u64).with_vfs_stat(stat(42));
            item.mtime = get_header(header::LAST_MODIFIED)
                .and_then(|v| vfstree_types::parse_mtime(&v).ok());
            Json(item).into_response()
        }
        ("DELETE", "/api/vfs/sd/a/b.txt") => StatusCode::OK.into_response(),
        ("DELETE", "/api/vfs/sd/a/") => Json(DeleteResponse {
            vfs_stat: Some(stat(0)),
        })
        .into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({}))).into_response(),
    }
}

async fn serve() -> (Device, SocketAddr) {
    let device = Device::default();
    let app = Router::new().fallback(dispatch).with_state(device.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (device, addr)
}

async fn client() -> (Device, HttpVfsApi) {
    let (device, addr) = serve().await;
    let api = HttpVfsApi::new(ClientConfig::new(&format!("http://{addr}")).unwrap()).unwrap();
    (device, api)
}

#[tokio::test]
async fn lists_volumes() {
    let (device, api) = client().await;

    let volumes = api.list_volumes().await.unwrap();
    assert_eq!(volumes, fixtures::device_volumes());

    let request = device.last();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/api/vfs");
}

#[tokio::test]
async fn volume_root_and_directory_use_trailing_slash() {
    let (device, api) = client().await;

    let root: VolumeListing = api.get_volume_root("/sd").await.unwrap();
    assert_eq!(root.path, "/sd");

    let listing = api.list_directory("/sd", "a").await.unwrap();
    assert_eq!(listing.files.len(), 2);

    let paths: Vec<String> = device.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/api/vfs/sd/", "/api/vfs/sd/a/"]);
}

#[tokio::test]
async fn plain_text_error_body_is_captured() {
    let (_device, api) = client().await;

    let err = api.list_directory("/sd", "missing").await.unwrap_err();
    match err {
        ApiError::Status {
            method,
            status,
            status_text,
            text,
            url,
        } => {
            assert_eq!(method, "GET");
            assert_eq!(status, 404);
            assert_eq!(status_text, "Not Found");
            assert_eq!(text.as_deref(), Some("no such directory"));
            assert!(url.ends_with("/api/vfs/sd/missing/"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn json_error_body_is_not_captured() {
    let (_device, api) = client().await;

    let err = api.delete_entry("/sd", "unknown").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, text: None, .. }));
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let (_device, api) = client().await;

    let err = api.list_directory("/sd", "garbage").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpVfsApi::new(ClientConfig::new(&format!("http://{addr}")).unwrap()).unwrap();
    let err = api.list_volumes().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn mkdir_method_not_allowed_is_unsupported() {
    let (_device, api) = client().await;

    let err = api.create_directory("/config", "x").await.unwrap_err();
    assert!(err.is_unsupported());

    let listing = api.create_directory("/sd", "new").await.unwrap();
    assert_eq!(listing.name, "new");
}

#[tokio::test]
async fn upload_sends_octet_stream_and_last_modified() {
    let (device, api) = client().await;
    let mtime = vfstree_types::parse_mtime("2024-03-01T12:00:05Z").unwrap();

    let item = api
        .upload_file("/sd", "my show/intro.fseq", b"frames".to_vec(), Some(mtime))
        .await
        .unwrap();
    assert_eq!(item.name, "intro.fseq");
    assert_eq!(item.size, Some(6));
    assert_eq!(item.mtime, Some(mtime));

    let request = device.last();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.path, "/api/vfs/sd/my%20show/intro.fseq");
    assert_eq!(request.content_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(
        request.last_modified.as_deref(),
        Some("Fri, 01 Mar 2024 12:00:05 GMT")
    );
    assert_eq!(request.body, b"frames");
}

#[tokio::test]
async fn upload_without_mtime_omits_header() {
    let (device, api) = client().await;

    api.upload_file("/sd", "x.bin", vec![1, 2], None).await.unwrap();
    assert_eq!(device.last().last_modified, None);
}

#[tokio::test]
async fn empty_delete_body_decodes_to_default() {
    let (device, api) = client().await;

    let response = api.delete_entry("/sd", "a/b.txt").await.unwrap();
    assert_eq!(response, DeleteResponse::default());

    let response = api.delete_directory("/sd", "a").await.unwrap();
    assert_eq!(response.vfs_stat.map(|s| s.used_sectors), Some(0));

    let paths: Vec<String> = device.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/api/vfs/sd/a/b.txt", "/api/vfs/sd/a/"]);
}

// ============================================================================
// Through the tree manager
// ============================================================================

#[tokio::test]
async fn manager_mirrors_the_device() {
    let (_device, api) = client().await;
    let mut manager = TreeManager::new(api);

    manager.load_volume_root("/sd").await.unwrap();
    let a = manager.load_directory("/sd", "a").await.unwrap();
    assert_eq!(a.names().collect::<Vec<_>>(), vec!["b.txt", "c.txt"]);

    manager
        .upload_file("/sd", "a/d.txt", vec![0; 4], None)
        .await
        .unwrap();
    assert_eq!(manager.lookup("/sd", "a/d.txt").and_then(Node::size), Some(4));
    assert_eq!(
        manager.volume("/sd").and_then(|v| v.stat()).map(|s| s.used_sectors),
        Some(42)
    );

    manager.delete_file("/sd", "a/b.txt").await.unwrap();
    assert!(manager.lookup("/sd", "a/b.txt").is_none());

    // unsupported mkdir is created locally
    manager.load_volumes().await.unwrap();
    let x = manager.create_directory("/config", "x").await.unwrap();
    assert!(x.is_loaded());
    assert!(manager.lookup("/config", "x").is_some_and(Node::is_dir));
}

#[tokio::test]
async fn manager_failure_leaves_tree_untouched() {
    let (_device, api) = client().await;
    let mut manager = TreeManager::new(api);
    manager.load_volumes().await.unwrap();
    let before = manager.registry().clone();

    let err = manager
        .upload_file("/sd", "full.bin", vec![0; 4], None)
        .await
        .unwrap_err();
    assert!(matches!(err, VfsError::Api(ref e) if e.status() == Some(507)));
    assert_eq!(manager.registry(), &before);
}
