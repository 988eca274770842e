// src/common/media.rs

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::common::error::AppError;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

// Pastas de destino, separadas por tipo de imagem
pub const FACADE_FOLDER: &str = "predios/fachadas";
pub const MAIN_PHOTO_FOLDER: &str = "apartamentos/fotos_principais";
pub const GALLERY_FOLDER: &str = "apartamentos/galeria";
pub const PROFILE_PHOTO_FOLDER: &str = "usuarios/fotos_perfil";

// Grava os uploads de imagem em disco, abaixo de MEDIA_ROOT.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    base_url: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Salva a imagem e devolve o caminho relativo (`pasta/AAAA/MM/DD/<uuid>.<ext>`).
    pub async fn save(&self, folder: &str, original_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        if bytes.is_empty() {
            return Err(AppError::InvalidUpload("arquivo vazio".into()));
        }
        let ext = image_extension(original_name)?;
        let relative = format!(
            "{}/{}/{}.{}",
            folder,
            Utc::now().format("%Y/%m/%d"),
            Uuid::new_v4(),
            ext
        );

        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("Falha ao criar diretório de mídia: {}", e))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao gravar arquivo de mídia: {}", e))?;

        tracing::debug!("🖼️ Mídia gravada em {}", target.display());
        Ok(relative)
    }

    /// Remove o arquivo. Arquivo inexistente não é erro; outras falhas só vão para o log.
    pub async fn delete(&self, relative: &str) {
        let Some(target) = self.resolve(relative) else {
            tracing::warn!("Caminho de mídia recusado: {}", relative);
            return;
        };
        match tokio::fs::remove_file(&target).await {
            Ok(()) => tracing::debug!("🗑️ Mídia removida: {}", target.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::error!("Falha ao remover mídia {}: {}", target.display(), e),
        }
    }

    pub fn url(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url, relative)
    }

    // Só aceita caminhos relativos que não saiam de MEDIA_ROOT
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let path = Path::new(relative);
        let safe = path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if relative.is_empty() || !safe {
            return None;
        }
        Some(self.root.join(path))
    }
}

fn image_extension(file_name: &str) -> Result<String, AppError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| AppError::UnsupportedMediaType("(sem extensão)".into()))?;

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::UnsupportedMediaType(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> MediaStorage {
        let dir = std::env::temp_dir().join(format!("apartamentos-media-{}", Uuid::new_v4()));
        MediaStorage::new(dir, "/media/")
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("foto.JPG").unwrap(), "jpg");
        assert_eq!(image_extension("fachada.webp").unwrap(), "webp");
        assert!(matches!(image_extension("script.exe"), Err(AppError::UnsupportedMediaType(_))));
        assert!(image_extension("sem_extensao").is_err());
    }

    #[test]
    fn test_url() {
        let storage = MediaStorage::new("mediafiles", "/media/");
        assert_eq!(storage.url("predios/fachadas/a.png"), "/media/predios/fachadas/a.png");
    }

    #[test]
    fn test_resolve_rejects_escaping_paths() {
        let storage = MediaStorage::new("mediafiles", "/media");
        assert!(storage.resolve("../etc/passwd").is_none());
        assert!(storage.resolve("/etc/passwd").is_none());
        assert!(storage.resolve("").is_none());
        assert!(storage.resolve("apartamentos/galeria/x.png").is_some());
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let storage = temp_storage();
        let relative = storage
            .save(GALLERY_FOLDER, "varanda.png", b"\x89PNG fake")
            .await
            .unwrap();

        assert!(relative.starts_with("apartamentos/galeria/"));
        assert!(relative.ends_with(".png"));
        let on_disk = storage.root().join(&relative);
        assert!(on_disk.exists());

        storage.delete(&relative).await;
        assert!(!on_disk.exists());

        // Apagar de novo não deve falhar
        storage.delete(&relative).await;
        let _ = std::fs::remove_dir_all(storage.root());
    }

    #[tokio::test]
    async fn test_save_rejects_empty_file() {
        let storage = temp_storage();
        let err = storage.save(GALLERY_FOLDER, "vazio.png", b"").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidUpload(_)));
    }
}
