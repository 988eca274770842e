// src/db/apartment_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::{map_unique_violation, AppError},
        pagination::PageRequest,
    },
    models::{
        apartment::{
            Amenity, Apartment, ApartmentListEntry, ApartmentPhoto, CreateApartmentPayload,
            RatingSummary, UpdateApartmentPayload,
        },
        auth::UserSummary,
    },
};

const APARTMENT_COLUMNS: &str = "id, building_id, owner_id, title, description, bedrooms, bathrooms, \
     area_m2, daily_price, main_photo_path, available, created_at, updated_at";

const LIST_ENTRY_SELECT: &str = r#"
    SELECT a.id, a.building_id, b.name AS building_name, b.city, b.state,
           a.title, a.bedrooms, a.bathrooms, a.area_m2, a.daily_price,
           a.main_photo_path, a.available, a.created_at
    FROM apartments a
    JOIN buildings b ON b.id = a.building_id
"#;

const DUPLICATE_TITLE: &str = "Já existe uma unidade com este identificador neste prédio.";

#[derive(Clone)]
pub struct ApartmentRepository {
    pool: PgPool,
}

impl ApartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Listagem pública
    // ---

    /// Só unidades disponíveis. `city` é busca parcial sem diferenciar maiúsculas.
    pub async fn list_available(
        &self,
        city: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<ApartmentListEntry>, i64), AppError> {
        let pattern = city
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| format!("%{}%", c));

        let apartments = sqlx::query_as::<_, ApartmentListEntry>(&format!(
            "{} WHERE a.available = TRUE AND ($1::TEXT IS NULL OR b.city ILIKE $1) \
             ORDER BY b.name ASC, a.title ASC LIMIT $2 OFFSET $3",
            LIST_ENTRY_SELECT
        ))
        .bind(pattern.as_deref())
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM apartments a
            JOIN buildings b ON b.id = a.building_id
            WHERE a.available = TRUE AND ($1::TEXT IS NULL OR b.city ILIKE $1)
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((apartments, total))
    }

    // "Meus anúncios": mais recentes primeiro
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<ApartmentListEntry>, AppError> {
        let apartments = sqlx::query_as::<_, ApartmentListEntry>(&format!(
            "{} WHERE a.owner_id = $1 ORDER BY a.created_at DESC",
            LIST_ENTRY_SELECT
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(apartments)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Apartment>, AppError> {
        let apartment = sqlx::query_as::<_, Apartment>(&format!(
            "SELECT {} FROM apartments WHERE id = $1",
            APARTMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(apartment)
    }

    /// Trava a linha do apartamento até o fim da transação.
    /// Reservas concorrentes para a mesma unidade ficam em fila aqui.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Apartment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let apartment = sqlx::query_as::<_, Apartment>(&format!(
            "SELECT {} FROM apartments WHERE id = $1 FOR UPDATE",
            APARTMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(apartment)
    }

    pub async fn find_owner_summary(&self, owner_id: Uuid) -> Result<Option<UserSummary>, AppError> {
        let owner = sqlx::query_as::<_, UserSummary>(
            "SELECT id, username, first_name, last_name FROM users WHERE id = $1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    pub async fn list_amenities(&self, apartment_id: Uuid) -> Result<Vec<Amenity>, AppError> {
        let amenities = sqlx::query_as::<_, Amenity>(
            r#"
            SELECT am.id, am.name
            FROM amenities am
            JOIN apartment_amenities aa ON aa.amenity_id = am.id
            WHERE aa.apartment_id = $1
            ORDER BY am.name ASC
            "#,
        )
        .bind(apartment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(amenities)
    }

    pub async fn list_photos(&self, apartment_id: Uuid) -> Result<Vec<ApartmentPhoto>, AppError> {
        let photos = sqlx::query_as::<_, ApartmentPhoto>(
            "SELECT id, apartment_id, image_path, caption, uploaded_at FROM apartment_photos \
             WHERE apartment_id = $1 ORDER BY uploaded_at ASC",
        )
        .bind(apartment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    // Média com uma casa decimal; NULL quando não há avaliações
    pub async fn rating_summary(&self, apartment_id: Uuid) -> Result<RatingSummary, AppError> {
        let summary = sqlx::query_as::<_, RatingSummary>(
            r#"
            SELECT COUNT(rv.id) AS review_count,
                   ROUND(AVG(rv.rating)::NUMERIC, 1) AS average_rating
            FROM reviews rv
            JOIN reservations r ON r.id = rv.reservation_id
            WHERE r.apartment_id = $1
            "#,
        )
        .bind(apartment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    // ---
    // Escrita
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        building_id: Uuid,
        owner_id: Uuid,
        input: &CreateApartmentPayload,
    ) -> Result<Apartment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Apartment>(&format!(
            "INSERT INTO apartments \
                (building_id, owner_id, title, description, bedrooms, bathrooms, area_m2, daily_price, available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            APARTMENT_COLUMNS
        ))
        .bind(building_id)
        .bind(owner_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.bedrooms)
        .bind(input.bathrooms)
        .bind(input.area_m2)
        .bind(input.daily_price)
        .bind(input.available)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_TITLE))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &UpdateApartmentPayload,
    ) -> Result<Apartment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Apartment>(&format!(
            "UPDATE apartments SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                bedrooms = COALESCE($4, bedrooms), \
                bathrooms = COALESCE($5, bathrooms), \
                area_m2 = COALESCE($6, area_m2), \
                daily_price = COALESCE($7, daily_price), \
                available = COALESCE($8, available), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            APARTMENT_COLUMNS
        ))
        .bind(id)
        .bind(input.title.as_deref())
        .bind(input.description.as_deref())
        .bind(input.bedrooms)
        .bind(input.bathrooms)
        .bind(input.area_m2)
        .bind(input.daily_price)
        .bind(input.available)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_TITLE))
    }

    /// Substitui o conjunto de comodidades da unidade.
    pub async fn set_amenities(
        &self,
        conn: &mut sqlx::PgConnection,
        apartment_id: Uuid,
        amenity_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM apartment_amenities WHERE apartment_id = $1")
            .bind(apartment_id)
            .execute(&mut *conn)
            .await?;

        if !amenity_ids.is_empty() {
            sqlx::query(
                "INSERT INTO apartment_amenities (apartment_id, amenity_id) \
                 SELECT $1, UNNEST($2::UUID[]) ON CONFLICT DO NOTHING",
            )
            .bind(apartment_id)
            .bind(amenity_ids)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    pub async fn set_main_photo(&self, id: Uuid, path: &str) -> Result<Apartment, AppError> {
        let apartment = sqlx::query_as::<_, Apartment>(&format!(
            "UPDATE apartments SET main_photo_path = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            APARTMENT_COLUMNS
        ))
        .bind(id)
        .bind(path)
        .fetch_one(&self.pool)
        .await?;

        Ok(apartment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM apartments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ---
    // Galeria
    // ---

    pub async fn add_photo(
        &self,
        apartment_id: Uuid,
        image_path: &str,
        caption: Option<&str>,
    ) -> Result<ApartmentPhoto, AppError> {
        let photo = sqlx::query_as::<_, ApartmentPhoto>(
            "INSERT INTO apartment_photos (apartment_id, image_path, caption) VALUES ($1, $2, $3) \
             RETURNING id, apartment_id, image_path, caption, uploaded_at",
        )
        .bind(apartment_id)
        .bind(image_path)
        .bind(caption)
        .fetch_one(&self.pool)
        .await?;

        Ok(photo)
    }

    pub async fn find_photo(&self, apartment_id: Uuid, photo_id: Uuid) -> Result<Option<ApartmentPhoto>, AppError> {
        let photo = sqlx::query_as::<_, ApartmentPhoto>(
            "SELECT id, apartment_id, image_path, caption, uploaded_at FROM apartment_photos \
             WHERE id = $1 AND apartment_id = $2",
        )
        .bind(photo_id)
        .bind(apartment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(photo)
    }

    pub async fn delete_photo(&self, photo_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM apartment_photos WHERE id = $1")
            .bind(photo_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
