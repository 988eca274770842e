// src/models/building.rs

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{common::media::MediaStorage, models::apartment::ApartmentListEntry};

// ---
// Predio (Prédio / Condomínio)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Residencial Vista do Rio")]
    pub name: String,
    #[schema(example = "Rua das Palmeiras, 120 - Centro")]
    pub full_address: String,
    #[schema(example = "Juazeiro")]
    pub city: String,
    #[schema(example = "BA")]
    pub state: String,
    #[schema(example = "48900-000")]
    pub zip_code: String,
    pub facade_photo_path: Option<String>,
    // Preenchida pelo serviço a partir de MEDIA_URL
    #[sqlx(skip)]
    #[serde(default)]
    #[schema(example = "/media/predios/fachadas/2025/07/30/fachada.jpg")]
    pub facade_photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Building {
    pub fn with_media_urls(mut self, media: &MediaStorage) -> Self {
        self.facade_photo_url = self.facade_photo_path.as_deref().map(|p| media.url(p));
        self
    }
}

// Prédio com as unidades (página de detalhe)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingDetail {
    #[serde(flatten)]
    pub building: Building,
    pub apartments: Vec<ApartmentListEntry>,
}

impl BuildingDetail {
    pub fn with_media_urls(self, media: &MediaStorage) -> Self {
        Self {
            building: self.building.with_media_urls(media),
            apartments: self
                .apartments
                .into_iter()
                .map(|a| a.with_media_urls(media))
                .collect(),
        }
    }
}

static ZIP_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}-\d{3}$").expect("regex de CEP"));

fn validate_state(state: &str) -> Result<(), ValidationError> {
    if state.len() == 2 && state.chars().all(|c| c.is_ascii_uppercase()) {
        return Ok(());
    }
    let mut err = ValidationError::new("state");
    err.message = Some("Informe a UF com duas letras maiúsculas. Ex: BA, SP, RJ".into());
    Err(err)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuildingPayload {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório (máx. 255)."))]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "O endereço é obrigatório (máx. 255)."))]
    pub full_address: String,
    #[validate(length(min = 1, max = 100, message = "A cidade é obrigatória (máx. 100)."))]
    pub city: String,
    #[validate(custom(function = "validate_state"))]
    pub state: String,
    #[validate(regex(path = *ZIP_CODE, message = "Formato do CEP: 12345-678"))]
    pub zip_code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBuildingPayload {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório (máx. 255)."))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "O endereço é obrigatório (máx. 255)."))]
    pub full_address: Option<String>,
    #[validate(length(min = 1, max = 100, message = "A cidade é obrigatória (máx. 100)."))]
    pub city: Option<String>,
    #[validate(custom(function = "validate_state"))]
    pub state: Option<String>,
    #[validate(regex(path = *ZIP_CODE, message = "Formato do CEP: 12345-678"))]
    pub zip_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(state: &str, zip: &str) -> CreateBuildingPayload {
        CreateBuildingPayload {
            name: "Residencial Vista do Rio".into(),
            full_address: "Rua das Palmeiras, 120".into(),
            city: "Juazeiro".into(),
            state: state.into(),
            zip_code: zip.into(),
        }
    }

    #[test]
    fn test_valid_building() {
        assert!(payload("BA", "48900-000").validate().is_ok());
    }

    #[test]
    fn test_state_must_be_two_uppercase_letters() {
        assert!(payload("Bahia", "48900-000").validate().is_err());
        assert!(payload("ba", "48900-000").validate().is_err());
    }

    #[test]
    fn test_zip_code_format() {
        assert!(payload("BA", "48900000").validate().is_err());
        assert!(payload("BA", "4890-0000").validate().is_err());
    }

    #[test]
    fn test_facade_url_follows_media_url() {
        let media = MediaStorage::new("mediafiles", "/media/");
        let building = Building {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Residencial Vista do Rio".into(),
            full_address: "Rua das Palmeiras, 120".into(),
            city: "Juazeiro".into(),
            state: "BA".into(),
            zip_code: "48900-000".into(),
            facade_photo_path: Some("predios/fachadas/2025/07/30/a.jpg".into()),
            facade_photo_url: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(building.with_media_urls(&media)).unwrap();
        assert_eq!(json["facadePhotoUrl"], "/media/predios/fachadas/2025/07/30/a.jpg");
        assert_eq!(json["facadePhotoPath"], "predios/fachadas/2025/07/30/a.jpg");
    }

    #[test]
    fn test_partial_update_only_checks_sent_fields() {
        let update = UpdateBuildingPayload {
            name: None,
            full_address: None,
            city: Some("Petrolina".into()),
            state: None,
            zip_code: None,
        };
        assert!(update.validate().is_ok());
    }
}
