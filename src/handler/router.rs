//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route matching, and dispatching.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::sync::Arc;

use crate::config::AppState;
use crate::handler::{data, export, upload};
use crate::http;
use crate::logger;

const UPLOAD_PATH: &str = "/api/upload";
const EXPORT_PATH: &str = "/api/export";

const WELCOME_HTML: &str =
    "<h1>Welcome to the Data API</h1><p>Use the API routes to access data.</p>";

/// Resolved target of a request path
#[derive(Debug, PartialEq, Eq)]
enum Endpoint<'a> {
    Home,
    DataIndex,
    Data(&'a str),
    Upload,
    Export,
    NotFound,
}

impl Endpoint<'_> {
    /// Methods accepted by the endpoint, as sent in `Allow`
    const fn allow(&self) -> &'static str {
        match self {
            Self::Upload => "POST, OPTIONS",
            _ => "GET, HEAD, OPTIONS",
        }
    }

    fn accepts(&self, method: &Method) -> bool {
        match self {
            Self::Upload => method == Method::POST,
            _ => method == Method::GET || method == Method::HEAD,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(req: Request<B>, state: Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
{
    let response = route_request(req, &state).await;
    if state.config.http.enable_cors {
        http::with_cors(response)
    } else {
        response
    }
}

async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
{
    // 1. Preflight
    if req.method() == Method::OPTIONS {
        return http::build_options_response(state.config.http.enable_cors);
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return resp;
    }

    // 3. Match path, then method
    let path = req.uri().path().to_string();
    let endpoint = resolve_endpoint(&path, state.catalog.prefix());

    if endpoint == Endpoint::NotFound {
        return http::build_404_response();
    }
    if !endpoint.accepts(req.method()) {
        logger::log_warning(&format!("Method not allowed: {} {path}", req.method()));
        return http::build_405_response(endpoint.allow());
    }

    let is_head = req.method() == Method::HEAD;
    match endpoint {
        Endpoint::Home => http::build_html_response(WELCOME_HTML.to_string(), is_head),
        Endpoint::DataIndex => data::list_catalog(state, is_head),
        Endpoint::Data(suffix) => data::serve_data(state, suffix, is_head).await,
        Endpoint::Upload => upload::handle_upload(req, state).await,
        Endpoint::Export => export::handle_export(state, is_head).await,
        Endpoint::NotFound => http::build_404_response(),
    }
}

/// Map a request path onto an endpoint. Data suffixes stay percent-encoded.
fn resolve_endpoint<'a>(path: &'a str, data_prefix: &str) -> Endpoint<'a> {
    match path {
        "/" => Endpoint::Home,
        UPLOAD_PATH => Endpoint::Upload,
        EXPORT_PATH => Endpoint::Export,
        _ => match path.strip_prefix(data_prefix) {
            Some("") => Endpoint::DataIndex,
            Some(suffix) => Endpoint::Data(suffix),
            None if path == data_prefix.trim_end_matches('/') => Endpoint::DataIndex,
            None => Endpoint::NotFound,
        },
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(hyper::header::CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::config_with_base;
    use crate::decode::write_xlsx;
    use http_body_util::BodyExt;
    use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, CONTENT_DISPOSITION, CONTENT_TYPE};
    use hyper::StatusCode;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    const BOUNDARY: &str = "XyZtestBoundary";

    fn setup(files: &[(&str, &[u8])]) -> (TempDir, Arc<AppState>) {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        fs::create_dir_all(&data).unwrap();
        for (name, content) in files {
            let path = data.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let state = AppState::bootstrap(config_with_base(dir.path())).unwrap();
        (dir, Arc::new(state))
    }

    fn request(method: Method, uri: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn multipart_request(field: &str, file_name: &str, content: &[u8]) -> Request<Full<Bytes>> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri(UPLOAD_PATH)
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    #[test]
    fn test_resolve_endpoint() {
        let prefix = "/api/data/";
        assert_eq!(resolve_endpoint("/", prefix), Endpoint::Home);
        assert_eq!(resolve_endpoint("/api/upload", prefix), Endpoint::Upload);
        assert_eq!(resolve_endpoint("/api/export", prefix), Endpoint::Export);
        assert_eq!(resolve_endpoint("/api/data", prefix), Endpoint::DataIndex);
        assert_eq!(resolve_endpoint("/api/data/", prefix), Endpoint::DataIndex);
        assert_eq!(
            resolve_endpoint("/api/data/sub%2Fb.xlsx", prefix),
            Endpoint::Data("sub%2Fb.xlsx")
        );
        assert_eq!(resolve_endpoint("/api/database", prefix), Endpoint::NotFound);
        assert_eq!(resolve_endpoint("/other", prefix), Endpoint::NotFound);
    }

    #[tokio::test]
    async fn test_welcome_page() {
        let (_dir, state) = setup(&[]);
        let resp = handle_request(request(Method::GET, "/"), state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
        assert_eq!(body_bytes(resp).await, WELCOME_HTML.as_bytes());
    }

    #[tokio::test]
    async fn test_csv_route_returns_records() {
        let (_dir, state) = setup(&[("a.csv", b"a,b\n1,2\n")]);
        let resp = handle_request(request(Method::GET, "/api/data/a.csv"), state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!([{ "a": "1", "b": "2" }]));
    }

    #[tokio::test]
    async fn test_nested_spreadsheet_route() {
        let (dir, _) = setup(&[]);
        let nested = dir.path().join("data").join("sub");
        fs::create_dir_all(&nested).unwrap();
        write_xlsx(&nested.join("b.xlsx"), &[&["a", "b"], &["1", "2"]]);
        let state = Arc::new(AppState::bootstrap(config_with_base(dir.path())).unwrap());

        let resp = handle_request(request(Method::GET, "/api/data/sub%2Fb.xlsx"), state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!([{ "a": 1, "b": 2 }]));
    }

    #[tokio::test]
    async fn test_unsupported_file_has_no_route() {
        let (_dir, state) = setup(&[("notes.txt", b"hello")]);
        let resp = handle_request(request(Method::GET, "/api/data/notes.txt"), state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_corrupted_spreadsheet_returns_500() {
        let (_dir, state) = setup(&[("broken.xlsx", b"definitely not a zip")]);
        let resp = handle_request(request(Method::GET, "/api/data/broken.xlsx"), state).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_bytes(resp).await, "Error processing Excel file".as_bytes());
    }

    #[tokio::test]
    async fn test_data_listing() {
        let (_dir, state) = setup(&[("a.csv", b"x\n1\n"), ("skip.txt", b"")]);
        let resp = handle_request(request(Method::GET, "/api/data"), state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let listing = body_json(resp).await;
        let items = listing.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["path"], "a.csv");
        assert_eq!(items[0]["route"], "/api/data/a.csv");
    }

    #[tokio::test]
    async fn test_head_has_empty_body() {
        let (_dir, state) = setup(&[("a.csv", b"a\n1\n")]);
        let resp = handle_request(request(Method::HEAD, "/api/data/a.csv"), state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_stores_file_unchanged() {
        let (dir, state) = setup(&[]);
        let content = b"id,name\n1,widget\n";
        let resp = handle_request(multipart_request("file", "report.csv", content), state).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["message"], "File uploaded successfully");
        assert_eq!(json["file"]["originalname"], "report.csv");
        assert_eq!(json["file"]["size"], content.len());

        let stored = fs::read(dir.path().join("test").join("report.csv")).unwrap();
        assert_eq!(stored, content);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_400() {
        let (_dir, state) = setup(&[]);
        let resp = handle_request(multipart_request("other", "x.csv", b"1"), state).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(resp).await, "No file uploaded".as_bytes());
    }

    #[tokio::test]
    async fn test_upload_requires_multipart() {
        let (_dir, state) = setup(&[]);
        let resp = handle_request(request(Method::POST, UPLOAD_PATH), state).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_413() {
        let (_dir, state) = setup(&[]);
        let mut req = request(Method::POST, UPLOAD_PATH);
        req.headers_mut()
            .insert(hyper::header::CONTENT_LENGTH, (u64::MAX).to_string().parse().unwrap());
        let resp = handle_request(req, state).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_export_empty_dir_is_valid_zip() {
        let (dir, state) = setup(&[]);
        let resp = handle_request(request(Method::GET, EXPORT_PATH), state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/zip");
        assert!(resp.headers()[CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("exported_data.zip"));

        let bytes = body_bytes(resp).await;
        let archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        assert_eq!(archive.len(), 0);
        assert!(dir.path().join("exported_data.zip").exists());
    }

    #[tokio::test]
    async fn test_export_includes_nested_files() {
        let (_dir, state) = setup(&[("a.csv", b"a\n1\n"), ("sub/b.txt", b"hi")]);
        let resp = handle_request(request(Method::GET, EXPORT_PATH), state).await;
        let bytes = body_bytes(resp).await;
        let archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["a.csv".to_string(), "sub/b.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (_dir, state) = setup(&[]);
        let resp = handle_request(request(Method::GET, "/nope"), state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let (_dir, state) = setup(&[]);
        let resp = handle_request(request(Method::GET, UPLOAD_PATH), Arc::clone(&state)).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "POST, OPTIONS");

        let resp = handle_request(request(Method::DELETE, "/"), state).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_options_and_cors() {
        let (_dir, state) = setup(&[]);
        let resp = handle_request(request(Method::OPTIONS, "/api/data"), Arc::clone(&state)).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = handle_request(request(Method::GET, "/"), state).await;
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_cors_disabled() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        let mut config = config_with_base(dir.path());
        config.http.enable_cors = false;
        let state = Arc::new(AppState::bootstrap(config).unwrap());

        let resp = handle_request(request(Method::GET, "/"), state).await;
        assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
