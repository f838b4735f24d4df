use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    files::{FileRecord, FileUpload},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct FileInfoResponse {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub upload_time: String,
}

impl From<FileRecord> for FileInfoResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            content_type: record.content_type,
            size: record.size,
            upload_time: record.upload_time.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub file_info: Option<FileInfoResponse>,
}

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileInfoResponse>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Reading a multipart stream that overruns the request body limit
/// surfaces as a 413 from the extractor; keep that status instead of
/// degrading it to a generic bad request.
fn map_multipart_error(err: MultipartError, max_size: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge {
            size: None,
            max_size,
        };
    }
    AppError::BadRequest(format!("Failed to read multipart request: {}", err))
}

pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let max_file_size = state.file_service.max_file_size();
    let mut file_upload: Option<FileUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multipart_error(e, max_file_size))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let filename = field
                .file_name()
                .ok_or_else(|| AppError::BadRequest("Missing filename".to_string()))?
                .to_string();

            let content_type = field.content_type().map(|ct| ct.to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| map_multipart_error(e, max_file_size))?;

            file_upload = Some(FileUpload {
                filename,
                content_type,
                data: data.to_vec(),
            });
            break;
        }
    }

    let upload = file_upload
        .ok_or_else(|| AppError::BadRequest("No file found in request".to_string()))?;

    let record = state.file_service.store_file(upload).await?;

    Ok(Json(UploadResponse {
        success: true,
        message: "File uploaded successfully".to_string(),
        file_info: Some(record.into()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct FileListQuery {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<FileListQuery>,
) -> Result<Json<FileListResponse>> {
    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(100);

    if limit < 1 || limit > 1000 {
        return Err(AppError::BadRequest(
            "limit must be between 1 and 1000".to_string(),
        ));
    }

    let files = state.file_service.list_files(skip, limit);
    let total = state.file_service.count_files() as u64;

    Ok(Json(FileListResponse {
        files: files.into_iter().map(|r| r.into()).collect(),
        total,
    }))
}

pub async fn get_file_info(
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<FileInfoResponse>> {
    let record = state
        .file_service
        .get_file(&file_id)
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    Ok(Json(record.into()))
}

pub async fn download_file(
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> Result<Response> {
    let (record, data) = state
        .file_service
        .get_file_data(&file_id)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        record.content_type.parse().unwrap_or_else(|_| {
            header::HeaderValue::from_static("application/octet-stream")
        }),
    );

    headers.insert(
        header::CONTENT_LENGTH,
        data.len().to_string().parse().unwrap(),
    );

    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&record.filename),
    );

    Ok((StatusCode::OK, headers, data).into_response())
}

/// Content-Disposition for the original filename. ASCII names go in a
/// plain quoted `filename` parameter; anything else is percent-encoded
/// into an RFC 5987 `filename*` parameter so the name survives the
/// trip through the header.
fn content_disposition(filename: &str) -> HeaderValue {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if sanitized.is_ascii() {
        if let Ok(value) =
            HeaderValue::from_str(&format!("attachment; filename=\"{}\"", sanitized))
        {
            return value;
        }
    }

    let encoded = urlencoding::encode(filename);
    HeaderValue::from_str(&format!("attachment; filename*=UTF-8''{}", encoded))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii_filename() {
        let value = content_disposition("report.pdf");
        assert_eq!(value, "attachment; filename=\"report.pdf\"");
    }

    #[test]
    fn test_content_disposition_escapes_quotes() {
        let value = content_disposition("a\"b.txt");
        assert_eq!(value, "attachment; filename=\"a_b.txt\"");
    }

    #[test]
    fn test_content_disposition_non_ascii_filename() {
        let value = content_disposition("文件.txt");
        assert_eq!(value, "attachment; filename*=UTF-8''%E6%96%87%E4%BB%B6.txt");
    }

    #[test]
    fn test_content_disposition_strips_control_characters() {
        let value = content_disposition("a\r\nb.txt");
        assert_eq!(value, "attachment; filename=\"ab.txt\"");
    }
}

pub async fn delete_file(
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    if !state.file_service.delete_file(&file_id).await {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "File deleted successfully".to_string(),
    }))
}
