//! Serves stored images under `/media`.

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};
use tracing::warn;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::outbound::media::FsImageStore;

fn content_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "gif" => "image/gif",
        Some(ext) if ext == "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Stream one stored image; 404 when missing or outside the media root.
#[get("/media/{path:.+}")]
pub async fn serve_media(
    store: web::Data<FsImageStore>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let relative = path.into_inner();
    match store.read(&relative).await {
        Ok(Some(bytes)) => Ok(HttpResponse::Ok()
            .content_type(content_type(&relative))
            .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
            .body(bytes)),
        Ok(None) => Err(Error::not_found("Файл не найден.")),
        Err(error) => {
            warn!(path = %relative, %error, "media read refused");
            Err(Error::not_found("Файл не найден."))
        }
    }
}
