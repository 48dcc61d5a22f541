use crate::config::UploadConfig;
use crate::error::{AppError, AppResult};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use utoipa::ToSchema;

/// 允许的图片类型及对应扩展名（第一个为默认扩展名）
const ALLOWED_CONTENT_TYPES: &[(&str, &[&str])] = &[
    ("image/jpeg", &["jpg", "jpeg"]),
    ("image/png", &["png"]),
    ("image/webp", &["webp"]),
    ("image/gif", &["gif"]),
    ("image/avif", &["avif"]),
];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadedFile {
    pub url: String,
    pub filename: String,
    pub size: usize,
}

/// 只保留文件名部分，空格替换为下划线，去掉路径分隔符与其它特殊字符
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .replace(' ', "_");

    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// 扩展名必须与内容类型一致，否则改用该类型的默认扩展名
pub fn stored_filename(original: &str, extensions: &[&str]) -> String {
    let cleaned = sanitize_filename(original);
    let (stem, ext) = match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext.to_ascii_lowercase())),
        _ => (cleaned.as_str(), None),
    };

    let ext = match ext {
        Some(ext) if extensions.contains(&ext.as_str()) => ext,
        _ => extensions.first().copied().unwrap_or("bin").to_string(),
    };
    format!("{stem}.{ext}")
}

#[derive(Clone)]
pub struct UploadService {
    config: UploadConfig,
}

impl UploadService {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    pub fn max_bytes(&self) -> usize {
        self.config.max_bytes
    }

    /// 返回该类型允许的扩展名
    pub fn check_content_type(
        &self,
        content_type: Option<&str>,
    ) -> AppResult<&'static [&'static str]> {
        let ct = content_type
            .ok_or_else(|| AppError::ValidationError("Missing file content type".into()))?;
        ALLOWED_CONTENT_TYPES
            .iter()
            .find(|(allowed, _)| allowed.eq_ignore_ascii_case(ct))
            .map(|(_, extensions)| *extensions)
            .ok_or_else(|| AppError::ValidationError(format!("Unsupported file type: {}", ct)))
    }

    /// 保存为 <毫秒时间戳>-<文件名>，返回公开访问 URL
    pub async fn save(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> AppResult<UploadedFile> {
        let extensions = self.check_content_type(content_type)?;
        if data.is_empty() {
            return Err(AppError::ValidationError("No file received.".into()));
        }
        if data.len() > self.config.max_bytes {
            return Err(AppError::ValidationError(format!(
                "File is too large (max {} bytes)",
                self.config.max_bytes
            )));
        }

        let filename = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            stored_filename(original_name, extensions)
        );
        let dir = PathBuf::from(&self.config.dir);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&filename), data).await?;

        log::info!("File uploaded: {} ({} bytes)", filename, data.len());

        Ok(UploadedFile {
            url: format!(
                "{}/{}",
                self.config.public_prefix.trim_end_matches('/'),
                filename
            ),
            filename,
            size: data.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: &std::path::Path, max_bytes: usize) -> UploadService {
        UploadService::new(UploadConfig {
            dir: dir.to_string_lossy().into_owned(),
            public_prefix: "/uploads".into(),
            max_bytes,
        })
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("summer dress.jpg"), "summer_dress.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\photos\\kurti 1.png"), "kurti_1.png");
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename("../"), "upload");
    }

    #[test]
    fn test_stored_filename_follows_content_type() {
        assert_eq!(
            stored_filename("summer dress.jpg", &["jpg", "jpeg"]),
            "summer_dress.jpg"
        );
        assert_eq!(stored_filename("Kurti.JPEG", &["jpg", "jpeg"]), "Kurti.jpeg");
        assert_eq!(stored_filename("evil.html", &["png"]), "evil.png");
        assert_eq!(stored_filename("photo", &["webp"]), "photo.webp");
        assert_eq!(stored_filename("archive.tar.gz", &["gif"]), "archive.tar.gif");
    }

    #[tokio::test]
    async fn test_save_never_keeps_foreign_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(tmp.path(), 1024);

        let uploaded = svc
            .save("evil.html", Some("image/png"), b"<script>alert(1)</script>")
            .await
            .unwrap();

        assert!(uploaded.filename.ends_with("-evil.png"));
        assert!(uploaded.url.ends_with(".png"));
        assert!(tmp.path().join(&uploaded.filename).exists());
    }

    #[tokio::test]
    async fn test_save_writes_file_and_returns_url() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(tmp.path(), 1024);

        let uploaded = svc
            .save("new arrival.png", Some("image/png"), b"\x89PNG....")
            .await
            .unwrap();

        assert!(uploaded.filename.ends_with("-new_arrival.png"));
        assert_eq!(uploaded.url, format!("/uploads/{}", uploaded.filename));
        let written = std::fs::read(tmp.path().join(&uploaded.filename)).unwrap();
        assert_eq!(written, b"\x89PNG....");
    }

    #[tokio::test]
    async fn test_save_rejects_large_and_non_image_files() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(tmp.path(), 4);

        let err = svc
            .save("big.jpg", Some("image/jpeg"), b"12345")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = svc
            .save("script.html", Some("text/html"), b"<p>")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unsupported file type"));

        let err = svc.save("empty.png", Some("image/png"), b"").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
