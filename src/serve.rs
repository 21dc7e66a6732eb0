//! HTTP service for interactive inspection
//!
//! `blobscope serve ./store` → serves every object below `./store`:
//!
//! - `POST /api/inspect?maxLen=N`: classify the request body, declared type
//!   taken from the `Content-Type` header
//! - `GET /api/inspect?path=P&maxLen=N`: classify a file below the root
//! - `GET /raw?path=P`: the raw object, used as the media preview locator
//! - `GET /api/blob-id?id=ID`: base64url blob id to its decimal form

use crate::error::{Error, Result};
use crate::options::{sanitize_preview_len, InspectOptions};
use crate::{blob_id, source, ClassificationVerdict, ContentSample, Inspector};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tiny_http::{Header, Method, Request, Response, Server};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(error: String) -> Self {
        Self { ok: false, data: None, error: Some(error) }
    }
}

#[derive(Deserialize, Debug, Default)]
struct InspectParams {
    path: Option<String>,
    /// Kept as text so a malformed value falls back to the default length
    #[serde(rename = "maxLen")]
    max_len: Option<String>,
}

impl InspectParams {
    fn preview_max_len(&self) -> usize {
        sanitize_preview_len(self.max_len.as_deref().and_then(|s| s.trim().parse().ok()))
    }
}

#[derive(Deserialize, Debug)]
struct BlobIdParams {
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlobIdReply {
    blob_id: String,
    decimal: String,
}

/// A response ready to hand to the transport
#[derive(Debug)]
struct Reply {
    status: u16,
    content_type: String,
    body: Vec<u8>,
}

impl Reply {
    fn json<T: Serialize>(status: u16, payload: &T) -> Self {
        // Serializing our own response types cannot fail
        let body = serde_json::to_vec(payload).unwrap_or_default();
        Self {
            status,
            content_type: "application/json".to_string(),
            body,
        }
    }

    fn ok<T: Serialize>(data: T) -> Self {
        Self::json(200, &ApiResponse::success(data))
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, &ApiResponse::failure(message.into()))
    }

    fn from_error(err: &Error) -> Self {
        let status = match err {
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => 404,
            Error::PathOutsideRoot(_) => 403,
            Error::InvalidBlobId(_) => 400,
            Error::BodyTooLarge(_) => 413,
            _ => 500,
        };
        Self::error(status, err.to_string())
    }
}

/// Shared state for every request
struct Service {
    root: PathBuf,
    options: InspectOptions,
}

impl Service {
    fn new(root: &Path, options: InspectOptions) -> Result<Self> {
        Ok(Self {
            root: root.canonicalize()?,
            options,
        })
    }

    fn route(&self, method: &Method, url: &str, content_type: Option<&str>, body: &[u8]) -> Reply {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };

        match (method, path) {
            (&Method::Get, "/") => Reply {
                status: 200,
                content_type: "text/plain; charset=utf-8".to_string(),
                body: format!(
                    "blobscope {}\n\nGET  /api/inspect?path=...&maxLen=...\nPOST /api/inspect?maxLen=...\nGET  /raw?path=...\nGET  /api/blob-id?id=...\n",
                    env!("CARGO_PKG_VERSION")
                )
                .into_bytes(),
            },

            (&Method::Post, "/api/inspect") => {
                let params = match parse_query::<InspectParams>(query) {
                    Ok(p) => p,
                    Err(reply) => return reply,
                };
                let inspector = self.inspector(&params);
                let sample = ContentSample::new(body).with_content_type(content_type);
                Reply::ok(inspector.inspect(&sample))
            }

            (&Method::Get, "/api/inspect") => {
                let params = match parse_query::<InspectParams>(query) {
                    Ok(p) => p,
                    Err(reply) => return reply,
                };
                let Some(requested) = params.path.as_deref() else {
                    return Reply::error(400, "missing path parameter");
                };
                match self.inspect_path(requested, &params) {
                    Ok(verdict) => Reply::ok(verdict),
                    Err(e) => Reply::from_error(&e),
                }
            }

            (&Method::Get, "/raw") => {
                let params = match parse_query::<InspectParams>(query) {
                    Ok(p) => p,
                    Err(reply) => return reply,
                };
                let Some(requested) = params.path.as_deref() else {
                    return Reply::error(400, "missing path parameter");
                };
                match self.resolve(requested).and_then(source::load) {
                    Ok(loaded) => Reply {
                        status: 200,
                        content_type: loaded
                            .content_type
                            .unwrap_or("application/octet-stream")
                            .to_string(),
                        body: loaded.bytes,
                    },
                    Err(e) => Reply::from_error(&e),
                }
            }

            (&Method::Get, "/api/blob-id") => {
                let params = match parse_query::<BlobIdParams>(query) {
                    Ok(p) => p,
                    Err(reply) => return reply,
                };
                match blob_id::to_decimal(&params.id) {
                    Ok(decimal) => Reply::ok(BlobIdReply {
                        blob_id: params.id,
                        decimal,
                    }),
                    Err(e) => Reply::from_error(&e),
                }
            }

            _ => Reply::error(404, "Not found"),
        }
    }

    fn inspector(&self, params: &InspectParams) -> Inspector {
        Inspector::new().with_options(self.options.with_preview_max_len(params.preview_max_len()))
    }

    fn inspect_path(&self, requested: &str, params: &InspectParams) -> Result<ClassificationVerdict> {
        let path = self.resolve(requested)?;
        let loaded = source::load(&path)?;
        let locator = raw_locator(requested);

        let sample = ContentSample::new(&loaded.bytes)
            .with_content_type(loaded.content_type)
            .with_locator(locator.as_deref());
        Ok(self.inspector(params).inspect(&sample))
    }

    /// Resolve a requested path against the root. Leading slashes are relative
    /// to the root; `..` or symlinks leading out of the tree are refused.
    fn resolve(&self, requested: &str) -> Result<PathBuf> {
        let joined = self.root.join(requested.trim_start_matches('/'));
        let canonical = joined.canonicalize()?;
        if !canonical.starts_with(&self.root) {
            return Err(Error::PathOutsideRoot(requested.to_string()));
        }
        if !canonical.is_file() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a file", requested),
            )));
        }
        Ok(canonical)
    }
}

fn parse_query<T: for<'de> Deserialize<'de>>(query: &str) -> std::result::Result<T, Reply> {
    serde_urlencoded::from_str(query).map_err(|e| Reply::error(400, format!("bad query: {}", e)))
}

/// Locator handed to clients for media previews
fn raw_locator(path: &str) -> Option<String> {
    serde_urlencoded::to_string([("path", path)])
        .ok()
        .map(|q| format!("/raw?{}", q))
}

/// Start server, open browser, serve until killed
pub fn start(port: u16, root: PathBuf, options: InspectOptions) -> Result<()> {
    let service = Service::new(&root, options)?;

    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| Error::Server(e.to_string()))?;

    let url = format!("http://localhost:{}", port);
    eprintln!("\n\x1b[1;32mblobscope\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Serving: {}\n", service.root.display());

    if let Err(e) = open::that(&url) {
        tracing::debug!(error = %e, "could not open browser");
    }

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(&service, request) {
            tracing::warn!(error = %e, "failed to answer request");
        }
    }

    Ok(())
}

/// Read at most `limit` bytes of a request body
fn read_body<R: Read>(reader: R, limit: usize) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    reader.take(limit as u64 + 1).read_to_end(&mut body)?;
    if body.len() > limit {
        return Err(Error::BodyTooLarge(limit));
    }
    Ok(body)
}

fn handle_request(service: &Service, mut request: Request) -> Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();

    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string());

    let (reply, body) = if method == Method::Post {
        match read_body(request.as_reader(), service.options.max_body_len) {
            Ok(body) => (service.route(&method, &url, content_type.as_deref(), &body), body),
            Err(e @ Error::BodyTooLarge(_)) => (Reply::from_error(&e), Vec::new()),
            Err(e) => return Err(e),
        }
    } else {
        (service.route(&method, &url, content_type.as_deref(), &[]), Vec::new())
    };

    tracing::info!(%method, %url, status = reply.status, bytes = body.len(), "request");

    let mut response = Response::from_data(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response = response.with_header(header);
    }
    request.respond(response)?;
    Ok(())
}
