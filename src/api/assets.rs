use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// Embed page assets (compile-time embed from frontend/) / 嵌入前端静态文件
#[derive(RustEmbed)]
#[folder = "frontend/"]
struct FrontendAssets;

fn file_response(path: &str, data: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    ([(header::CONTENT_TYPE, mime.as_ref().to_string())], Body::from(data)).into_response()
}

/// Handle embedded static file requests / 处理嵌入的静态文件请求
pub async fn serve_embedded_file(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if let Some(content) = FrontendAssets::get(path) {
        return file_response(path, content.data.into_owned());
    }

    // Unknown paths get the page itself / 未知路径返回index.html
    if let Some(content) = FrontendAssets::get("index.html") {
        return file_response("index.html", content.data.into_owned());
    }

    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
