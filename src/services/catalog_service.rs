// src/services/catalog_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        media::{MediaStorage, FACADE_FOLDER, GALLERY_FOLDER, MAIN_PHOTO_FOLDER},
        pagination::{Page, PageRequest},
    },
    db::{AmenityRepository, ApartmentRepository, BuildingRepository},
    models::{
        apartment::{
            Amenity, Apartment, ApartmentDetail, ApartmentListEntry, ApartmentPhoto, CreateApartmentPayload,
            UpdateApartmentPayload,
        },
        auth::User,
        building::{Building, BuildingDetail, CreateBuildingPayload, UpdateBuildingPayload},
    },
};

pub const BUILDINGS_PER_PAGE: i64 = 10;
pub const APARTMENTS_PER_PAGE: i64 = 9;

// Comodidades criadas na primeira inicialização
pub const DEFAULT_AMENITIES: &[&str] = &[
    "Wi-Fi",
    "Ar Condicionado",
    "Cozinha Equipada",
    "TV a Cabo",
    "Estacionamento Gratuito",
];

/// Só o dono (ou um superusuário) mexe no que é seu.
pub fn ensure_owner(user: &User, owner_id: Uuid, action: &str) -> Result<(), AppError> {
    if user.is_superuser || user.id == owner_id {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(action.to_string()))
    }
}

// Prédios, apartamentos, comodidades e as imagens de cada um
#[derive(Clone)]
pub struct CatalogService {
    building_repo: BuildingRepository,
    apartment_repo: ApartmentRepository,
    amenity_repo: AmenityRepository,
    media: MediaStorage,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(
        building_repo: BuildingRepository,
        apartment_repo: ApartmentRepository,
        amenity_repo: AmenityRepository,
        media: MediaStorage,
        pool: PgPool,
    ) -> Self {
        Self {
            building_repo,
            apartment_repo,
            amenity_repo,
            media,
            pool,
        }
    }

    // ---
    // Prédios
    // ---

    pub async fn list_buildings(&self, page: Option<i64>) -> Result<Page<Building>, AppError> {
        let request = PageRequest::new(page, BUILDINGS_PER_PAGE);
        let (items, total) = self.building_repo.list(request).await?;
        let items = items.into_iter().map(|b| b.with_media_urls(&self.media)).collect();
        Ok(Page::new(items, request, total))
    }

    pub async fn get_building(&self, id: Uuid) -> Result<BuildingDetail, AppError> {
        let building = self.find_building(id).await?;
        let apartments = self.building_repo.list_apartments(id).await?;
        Ok(BuildingDetail { building, apartments }.with_media_urls(&self.media))
    }

    pub async fn list_cities(&self) -> Result<Vec<String>, AppError> {
        self.building_repo.list_cities().await
    }

    pub async fn create_building(&self, user: &User, input: &CreateBuildingPayload) -> Result<Building, AppError> {
        let building = self.building_repo.create(&self.pool, user.id, input).await?;
        tracing::info!("🏢 Prédio '{}' cadastrado por {}", building.name, user.username);
        Ok(building.with_media_urls(&self.media))
    }

    pub async fn update_building(
        &self,
        user: &User,
        id: Uuid,
        input: &UpdateBuildingPayload,
    ) -> Result<Building, AppError> {
        let building = self.find_building(id).await?;
        ensure_owner(user, building.owner_id, "building:change")?;
        let updated = self.building_repo.update(&self.pool, id, input).await?;
        Ok(updated.with_media_urls(&self.media))
    }

    /// Apaga o prédio (e, em cascata, suas unidades). As imagens saem do disco depois do commit.
    ///
    /// Prédio e unidades ficam travados enquanto os caminhos são coletados, então um
    /// upload concorrente espera o commit e falha em vez de deixar arquivo órfão.
    pub async fn delete_building(&self, user: &User, id: Uuid) -> Result<(), AppError> {
        let building = self.find_building(id).await?;
        ensure_owner(user, building.owner_id, "building:delete")?;

        let mut tx = self.pool.begin().await?;
        if !self.building_repo.lock_with_apartments(&mut tx, id).await? {
            return Err(AppError::ResourceNotFound("building".into()));
        }
        let media_paths = self.building_repo.list_media_paths(&mut *tx, id).await?;
        self.building_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        for path in &media_paths {
            self.media.delete(path).await;
        }
        tracing::info!("🗑️ Prédio '{}' removido ({} imagens)", building.name, media_paths.len());
        Ok(())
    }

    pub async fn upload_facade_photo(
        &self,
        user: &User,
        id: Uuid,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Building, AppError> {
        let building = self.find_building(id).await?;
        ensure_owner(user, building.owner_id, "building:change")?;

        let path = self.media.save(FACADE_FOLDER, file_name, bytes).await?;
        let updated = match self.building_repo.set_facade_photo(id, &path).await {
            Ok(b) => b,
            Err(e) => {
                self.media.delete(&path).await;
                return Err(e);
            }
        };

        if let Some(old) = building.facade_photo_path {
            self.media.delete(&old).await;
        }
        Ok(updated.with_media_urls(&self.media))
    }

    async fn find_building(&self, id: Uuid) -> Result<Building, AppError> {
        self.building_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("building".into()))
    }

    // ---
    // Apartamentos
    // ---

    pub async fn list_apartments(
        &self,
        city: Option<&str>,
        page: Option<i64>,
    ) -> Result<Page<ApartmentListEntry>, AppError> {
        let request = PageRequest::new(page, APARTMENTS_PER_PAGE);
        let (items, total) = self.apartment_repo.list_available(city, request).await?;
        let items = items.into_iter().map(|a| a.with_media_urls(&self.media)).collect();
        Ok(Page::new(items, request, total))
    }

    pub async fn list_my_apartments(&self, user: &User) -> Result<Vec<ApartmentListEntry>, AppError> {
        let apartments = self.apartment_repo.list_by_owner(user.id).await?;
        Ok(apartments.into_iter().map(|a| a.with_media_urls(&self.media)).collect())
    }

    pub async fn get_apartment(&self, id: Uuid) -> Result<ApartmentDetail, AppError> {
        let apartment = self.find_apartment(id).await?;

        let building = self.find_building(apartment.building_id).await?;
        let owner = self
            .apartment_repo
            .find_owner_summary(apartment.owner_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        let photos = self.apartment_repo.list_photos(id).await?;
        let amenities = self.apartment_repo.list_amenities(id).await?;
        let rating = self.apartment_repo.rating_summary(id).await?;

        Ok(ApartmentDetail {
            apartment,
            building,
            owner,
            photos,
            amenities,
            rating,
        }
        .with_media_urls(&self.media))
    }

    pub async fn create_apartment(
        &self,
        user: &User,
        building_id: Uuid,
        input: &CreateApartmentPayload,
    ) -> Result<Apartment, AppError> {
        // 404 se o prédio não existir
        self.find_building(building_id).await?;
        self.ensure_amenities_exist(&input.amenity_ids).await?;

        let mut tx = self.pool.begin().await?;
        let apartment = self
            .apartment_repo
            .create(&mut *tx, building_id, user.id, input)
            .await?;
        self.apartment_repo
            .set_amenities(&mut tx, apartment.id, &input.amenity_ids)
            .await?;
        tx.commit().await?;

        tracing::info!("🏠 Unidade '{}' cadastrada por {}", apartment.title, user.username);
        Ok(apartment.with_media_urls(&self.media))
    }

    pub async fn update_apartment(
        &self,
        user: &User,
        id: Uuid,
        input: &UpdateApartmentPayload,
    ) -> Result<Apartment, AppError> {
        let apartment = self.find_apartment(id).await?;
        ensure_owner(user, apartment.owner_id, "apartment:change")?;

        if let Some(ids) = &input.amenity_ids {
            self.ensure_amenities_exist(ids).await?;
        }

        let mut tx = self.pool.begin().await?;
        let updated = self.apartment_repo.update(&mut *tx, id, input).await?;
        if let Some(ids) = &input.amenity_ids {
            self.apartment_repo.set_amenities(&mut tx, id, ids).await?;
        }
        tx.commit().await?;

        Ok(updated.with_media_urls(&self.media))
    }

    pub async fn delete_apartment(&self, user: &User, id: Uuid) -> Result<(), AppError> {
        let apartment = self.find_apartment(id).await?;
        ensure_owner(user, apartment.owner_id, "apartment:delete")?;

        let photos = self.apartment_repo.list_photos(id).await?;
        self.apartment_repo.delete(id).await?;

        if let Some(main) = &apartment.main_photo_path {
            self.media.delete(main).await;
        }
        for photo in &photos {
            self.media.delete(&photo.image_path).await;
        }
        Ok(())
    }

    pub async fn upload_main_photo(
        &self,
        user: &User,
        id: Uuid,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Apartment, AppError> {
        let apartment = self.find_apartment(id).await?;
        ensure_owner(user, apartment.owner_id, "apartment:change")?;

        let path = self.media.save(MAIN_PHOTO_FOLDER, file_name, bytes).await?;
        let updated = match self.apartment_repo.set_main_photo(id, &path).await {
            Ok(a) => a,
            Err(e) => {
                self.media.delete(&path).await;
                return Err(e);
            }
        };

        if let Some(old) = apartment.main_photo_path {
            self.media.delete(&old).await;
        }
        Ok(updated.with_media_urls(&self.media))
    }

    pub async fn add_photo(
        &self,
        user: &User,
        id: Uuid,
        file_name: &str,
        bytes: &[u8],
        caption: Option<&str>,
    ) -> Result<ApartmentPhoto, AppError> {
        let apartment = self.find_apartment(id).await?;
        ensure_owner(user, apartment.owner_id, "apartment:change")?;

        let path = self.media.save(GALLERY_FOLDER, file_name, bytes).await?;
        match self.apartment_repo.add_photo(id, &path, caption).await {
            Ok(photo) => Ok(photo.with_media_urls(&self.media)),
            Err(e) => {
                self.media.delete(&path).await;
                Err(e)
            }
        }
    }

    pub async fn delete_photo(&self, user: &User, id: Uuid, photo_id: Uuid) -> Result<(), AppError> {
        let apartment = self.find_apartment(id).await?;
        ensure_owner(user, apartment.owner_id, "apartment:change")?;

        let photo = self
            .apartment_repo
            .find_photo(id, photo_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("photo".into()))?;

        self.apartment_repo.delete_photo(photo.id).await?;
        self.media.delete(&photo.image_path).await;
        Ok(())
    }

    async fn find_apartment(&self, id: Uuid) -> Result<Apartment, AppError> {
        self.apartment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("apartment".into()))
    }

    async fn ensure_amenities_exist(&self, ids: &[Uuid]) -> Result<(), AppError> {
        let mut unique = ids.to_vec();
        unique.sort();
        unique.dedup();
        if unique.is_empty() {
            return Ok(());
        }

        let found = self.amenity_repo.count_existing(&unique).await?;
        if found as usize != unique.len() {
            return Err(AppError::UnknownAmenities);
        }
        Ok(())
    }

    // ---
    // Comodidades
    // ---

    pub async fn list_amenities(&self) -> Result<Vec<Amenity>, AppError> {
        self.amenity_repo.list().await
    }

    pub async fn create_amenity(&self, name: &str) -> Result<Amenity, AppError> {
        self.amenity_repo.create(name.trim()).await
    }

    pub async fn ensure_default_amenities(&self) -> Result<u64, AppError> {
        self.amenity_repo.ensure_defaults(DEFAULT_AMENITIES).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(is_superuser: bool) -> User {
        User {
            id: Uuid::new_v4(),
            username: "joao".into(),
            email: "joao@example.com".into(),
            first_name: "João".into(),
            last_name: String::new(),
            password_hash: String::new(),
            is_active: true,
            is_superuser,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_passes() {
        let owner = user(false);
        assert!(ensure_owner(&owner, owner.id, "building:change").is_ok());
    }

    #[test]
    fn test_other_user_is_denied() {
        let other = user(false);
        let err = ensure_owner(&other, Uuid::new_v4(), "apartment:delete").unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(action) if action == "apartment:delete"));
    }

    #[test]
    fn test_superuser_passes() {
        let admin = user(true);
        assert!(ensure_owner(&admin, Uuid::new_v4(), "building:delete").is_ok());
    }

    #[test]
    fn test_default_amenities() {
        assert_eq!(DEFAULT_AMENITIES.len(), 5);
        assert!(DEFAULT_AMENITIES.contains(&"Wi-Fi"));
    }
}
