// src/models/apartment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::media::MediaStorage,
    models::{auth::UserSummary, building::Building},
};

// ---
// Comodidade (Wi-Fi, Piscina, Garagem...)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Amenity {
    pub id: Uuid,
    #[schema(example = "Wi-Fi")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAmenityPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório (máx. 100)."))]
    #[schema(example = "Piscina")]
    pub name: String,
}

// ---
// Apartamento (a unidade alugável)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Apartment {
    pub id: Uuid,
    pub building_id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Bloco A - Apto 204")]
    pub title: String,
    pub description: String,
    #[schema(example = 2)]
    pub bedrooms: i32,
    #[schema(example = 1)]
    pub bathrooms: i32,
    #[schema(example = "54.50")]
    pub area_m2: Decimal,
    #[schema(example = "180.00")]
    pub daily_price: Decimal,
    pub main_photo_path: Option<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub main_photo_url: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha da listagem pública: unidade + nome/cidade do prédio
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentListEntry {
    pub id: Uuid,
    pub building_id: Uuid,
    pub building_name: String,
    pub city: String,
    pub state: String,
    pub title: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_m2: Decimal,
    pub daily_price: Decimal,
    pub main_photo_path: Option<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub main_photo_url: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentPhoto {
    pub id: Uuid,
    pub apartment_id: Uuid,
    pub image_path: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub image_url: String,
    #[schema(example = "Vista da varanda")]
    pub caption: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub review_count: i64,
    pub average_rating: Option<Decimal>,
}

// Página de detalhe: tudo que o anúncio mostra
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentDetail {
    #[serde(flatten)]
    pub apartment: Apartment,
    pub building: Building,
    pub owner: UserSummary,
    pub photos: Vec<ApartmentPhoto>,
    pub amenities: Vec<Amenity>,
    pub rating: RatingSummary,
}

impl Apartment {
    pub fn with_media_urls(mut self, media: &MediaStorage) -> Self {
        self.main_photo_url = self.main_photo_path.as_deref().map(|p| media.url(p));
        self
    }
}

impl ApartmentListEntry {
    pub fn with_media_urls(mut self, media: &MediaStorage) -> Self {
        self.main_photo_url = self.main_photo_path.as_deref().map(|p| media.url(p));
        self
    }
}

impl ApartmentPhoto {
    pub fn with_media_urls(mut self, media: &MediaStorage) -> Self {
        self.image_url = media.url(&self.image_path);
        self
    }
}

impl ApartmentDetail {
    pub fn with_media_urls(self, media: &MediaStorage) -> Self {
        Self {
            apartment: self.apartment.with_media_urls(media),
            building: self.building.with_media_urls(media),
            photos: self.photos.into_iter().map(|p| p.with_media_urls(media)).collect(),
            ..self
        }
    }
}

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApartmentPayload {
    #[validate(length(min = 1, max = 100, message = "O identificador da unidade é obrigatório (máx. 100)."))]
    #[schema(example = "Apto 101")]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_rooms")]
    #[validate(range(min = 0, message = "Não pode ser negativo."))]
    pub bedrooms: i32,

    #[serde(default = "default_rooms")]
    #[validate(range(min = 0, message = "Não pode ser negativo."))]
    pub bathrooms: i32,

    #[validate(custom(function = "validate_positive"))]
    pub area_m2: Decimal,

    #[validate(custom(function = "validate_positive"))]
    pub daily_price: Decimal,

    #[serde(default = "default_available")]
    pub available: bool,

    #[serde(default)]
    pub amenity_ids: Vec<Uuid>,
}

fn default_rooms() -> i32 {
    1
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApartmentPayload {
    #[validate(length(min = 1, max = 100, message = "O identificador da unidade é obrigatório (máx. 100)."))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Não pode ser negativo."))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, message = "Não pode ser negativo."))]
    pub bathrooms: Option<i32>,
    #[validate(custom(function = "validate_positive"))]
    pub area_m2: Option<Decimal>,
    #[validate(custom(function = "validate_positive"))]
    pub daily_price: Option<Decimal>,
    pub available: Option<bool>,
    // Quando presente, substitui o conjunto inteiro de comodidades
    pub amenity_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApartmentFilter {
    // Busca parcial, sem diferenciar maiúsculas ("Qual cidade?")
    pub city: Option<String>,
    pub page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn payload(area: f64, price: f64) -> CreateApartmentPayload {
        CreateApartmentPayload {
            title: "Apto 101".into(),
            description: String::new(),
            bedrooms: 2,
            bathrooms: 1,
            area_m2: Decimal::from_f64(area).unwrap(),
            daily_price: Decimal::from_f64(price).unwrap(),
            available: true,
            amenity_ids: vec![],
        }
    }

    #[test]
    fn test_positive_area_and_price() {
        assert!(payload(50.0, 200.0).validate().is_ok());

        let errors = payload(0.0, -10.0).validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("area_m2"));
        assert!(fields.contains_key("daily_price"));
    }

    #[test]
    fn test_detail_carries_public_image_urls() {
        let media = MediaStorage::new("mediafiles", "/media");
        let building_id = Uuid::new_v4();
        let apartment_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();

        let detail = ApartmentDetail {
            apartment: Apartment {
                id: apartment_id,
                building_id,
                owner_id,
                title: "Apto 101".into(),
                description: String::new(),
                bedrooms: 2,
                bathrooms: 1,
                area_m2: Decimal::new(5450, 2),
                daily_price: Decimal::new(18000, 2),
                main_photo_path: Some("apartamentos/fotos_principais/2025/07/30/sala.jpg".into()),
                main_photo_url: None,
                available: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            building: Building {
                id: building_id,
                owner_id,
                name: "Residencial Vista do Rio".into(),
                full_address: "Rua das Palmeiras, 120".into(),
                city: "Juazeiro".into(),
                state: "BA".into(),
                zip_code: "48900-000".into(),
                facade_photo_path: None,
                facade_photo_url: None,
                created_at: Utc::now(),
            },
            owner: UserSummary {
                id: owner_id,
                username: "joao".into(),
                first_name: "João".into(),
                last_name: String::new(),
            },
            photos: vec![ApartmentPhoto {
                id: Uuid::new_v4(),
                apartment_id,
                image_path: "apartamentos/galeria/2025/07/30/varanda.png".into(),
                image_url: String::new(),
                caption: Some("Vista da varanda".into()),
                uploaded_at: Utc::now(),
            }],
            amenities: vec![],
            rating: RatingSummary::default(),
        }
        .with_media_urls(&media);

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["mainPhotoUrl"], "/media/apartamentos/fotos_principais/2025/07/30/sala.jpg");
        assert_eq!(json["photos"][0]["imageUrl"], "/media/apartamentos/galeria/2025/07/30/varanda.png");
        // Sem fachada, sem URL
        assert!(json["building"]["facadePhotoUrl"].is_null());
    }

    #[test]
    fn test_defaults_from_json() {
        let p: CreateApartmentPayload =
            serde_json::from_str(r#"{"title":"Casa 3B","areaM2":70.5,"dailyPrice":250}"#).unwrap();
        assert_eq!(p.bedrooms, 1);
        assert_eq!(p.bathrooms, 1);
        assert!(p.available);
        assert!(p.amenity_ids.is_empty());
    }
}
