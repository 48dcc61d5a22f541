use crate::error::AppError;
use crate::services::UploadService;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, Result, ResponseError, web};
use futures_util::StreamExt;
use serde_json::json;
use utoipa::ToSchema;

/// multipart 表单：file 字段为图片
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

struct ReceivedFile {
    name: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// 读取 multipart 中名为 file 的字段，超出大小限制立即中止
async fn read_file_field(
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<ReceivedFile, AppError> {
    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::ValidationError(format!("Multipart error: {e}")))?;

        if field.name() != Some("file") {
            continue;
        }
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("upload")
            .to_string();
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| AppError::ValidationError(format!("Failed to read file: {e}")))?;
            if data.len() + chunk.len() > max_bytes {
                return Err(AppError::ValidationError(format!(
                    "File is too large (max {} bytes)",
                    max_bytes
                )));
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(ReceivedFile {
            name,
            content_type,
            data,
        });
    }

    Err(AppError::ValidationError("No file received.".into()))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    request_body(
        content = UploadForm,
        content_type = "multipart/form-data",
        description = "file 字段为图片"
    ),
    security(
        ("admin_session" = [])
    ),
    responses(
        (status = 200, description = "上传成功，返回 /uploads/<文件名>"),
        (status = 400, description = "缺少文件、类型不支持或超出大小限制"),
        (status = 401, description = "未登录")
    )
)]
pub async fn upload_file(
    upload_service: web::Data<UploadService>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let file = match read_file_field(payload, upload_service.max_bytes()).await {
        Ok(file) => file,
        Err(e) => return Ok(e.error_response()),
    };

    match upload_service
        .save(&file.name, file.content_type.as_deref(), &file.data)
        .await
    {
        Ok(uploaded) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "url": uploaded.url,
            "data": uploaded
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn upload_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload", web::post().to(upload_file));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    const BOUNDARY: &str = "----faroo-boundary";

    fn multipart_body(field: &str, filename: &str, content_type: &str, data: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n{data}\r\n--{BOUNDARY}--\r\n"
        )
    }

    #[actix_web::test]
    async fn test_upload_saves_image() {
        let tmp = tempfile::tempdir().unwrap();
        let service = UploadService::new(UploadConfig {
            dir: tmp.path().to_string_lossy().into_owned(),
            public_prefix: "/uploads".into(),
            max_bytes: 1024,
        });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(upload_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/upload")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body("file", "red kurti.jpg", "image/jpeg", "jpegdata"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        let url = body["url"].as_str().unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("-red_kurti.jpg"));
    }

    #[actix_web::test]
    async fn test_upload_without_file_field() {
        let tmp = tempfile::tempdir().unwrap();
        let service = UploadService::new(UploadConfig {
            dir: tmp.path().to_string_lossy().into_owned(),
            public_prefix: "/uploads".into(),
            max_bytes: 1024,
        });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(upload_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/upload")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body("avatar", "a.jpg", "image/jpeg", "x"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
