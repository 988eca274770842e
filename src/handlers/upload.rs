// src/handlers/upload.rs

use axum::extract::Multipart;
use utoipa::ToSchema;

use crate::common::error::AppError;

// Formulário dos uploads de imagem (para a documentação)
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    #[schema(example = "Vista da varanda")]
    pub caption: Option<String>,
}

pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub caption: Option<String>,
}

/// Lê o primeiro arquivo do formulário (e a legenda, se houver).
pub async fn read_image(mut multipart: Multipart) -> Result<UploadedImage, AppError> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut caption = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.to_string()))?
    {
        if let Some(file_name) = field.file_name().map(str::to_string) {
            if image.is_none() {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidUpload(e.to_string()))?;
                image = Some((file_name, bytes.to_vec()));
            }
            continue;
        }

        if field.name() == Some("caption") {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::InvalidUpload(e.to_string()))?;
            let text = text.trim();
            if text.chars().count() > 150 {
                return Err(AppError::InvalidUpload("legenda com mais de 150 caracteres".into()));
            }
            if !text.is_empty() {
                caption = Some(text.to_string());
            }
        }
    }

    let (file_name, bytes) = image.ok_or_else(|| AppError::InvalidUpload("nenhum arquivo enviado".into()))?;
    Ok(UploadedImage {
        file_name,
        bytes,
        caption,
    })
}
