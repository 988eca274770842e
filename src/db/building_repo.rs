// src/db/building_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::{map_unique_violation, AppError},
        pagination::PageRequest,
    },
    models::{
        apartment::ApartmentListEntry,
        building::{Building, CreateBuildingPayload, UpdateBuildingPayload},
    },
};

const BUILDING_COLUMNS: &str =
    "id, owner_id, name, full_address, city, state, zip_code, facade_photo_path, created_at";

const DUPLICATE_NAME: &str = "Já existe um prédio com este nome.";

const LOCK_BUILDING: &str = "SELECT id FROM buildings WHERE id = $1 FOR UPDATE";
const LOCK_APARTMENTS: &str = "SELECT id FROM apartments WHERE building_id = $1 ORDER BY id FOR UPDATE";

#[derive(Clone)]
pub struct BuildingRepository {
    pool: PgPool,
}

impl BuildingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn list(&self, page: PageRequest) -> Result<(Vec<Building>, i64), AppError> {
        let buildings = sqlx::query_as::<_, Building>(&format!(
            "SELECT {} FROM buildings ORDER BY name ASC LIMIT $1 OFFSET $2",
            BUILDING_COLUMNS
        ))
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM buildings")
            .fetch_one(&self.pool)
            .await?;

        Ok((buildings, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Building>, AppError> {
        let building = sqlx::query_as::<_, Building>(&format!(
            "SELECT {} FROM buildings WHERE id = $1",
            BUILDING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(building)
    }

    // Unidades do prédio, disponíveis ou não (a página do prédio mostra todas)
    pub async fn list_apartments(&self, building_id: Uuid) -> Result<Vec<ApartmentListEntry>, AppError> {
        let apartments = sqlx::query_as::<_, ApartmentListEntry>(
            r#"
            SELECT a.id, a.building_id, b.name AS building_name, b.city, b.state,
                   a.title, a.bedrooms, a.bathrooms, a.area_m2, a.daily_price,
                   a.main_photo_path, a.available, a.created_at
            FROM apartments a
            JOIN buildings b ON b.id = a.building_id
            WHERE a.building_id = $1
            ORDER BY a.title ASC
            "#,
        )
        .bind(building_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(apartments)
    }

    // Todas as imagens guardadas sob o prédio (fachada + unidades + galerias)
    pub async fn list_media_paths<'e, E>(&self, executor: E, building_id: Uuid) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let paths = sqlx::query_scalar::<_, String>(
            r#"
            SELECT facade_photo_path FROM buildings
            WHERE id = $1 AND facade_photo_path IS NOT NULL
            UNION ALL
            SELECT main_photo_path FROM apartments
            WHERE building_id = $1 AND main_photo_path IS NOT NULL
            UNION ALL
            SELECT p.image_path FROM apartment_photos p
            JOIN apartments a ON a.id = p.apartment_id
            WHERE a.building_id = $1
            "#,
        )
        .bind(building_id)
        .fetch_all(executor)
        .await?;

        Ok(paths)
    }

    // Cidades com pelo menos um apartamento disponível (sugestões da busca)
    pub async fn list_cities(&self) -> Result<Vec<String>, AppError> {
        let cities = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT b.city
            FROM buildings b
            JOIN apartments a ON a.building_id = b.id
            WHERE a.available = TRUE
            ORDER BY b.city ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(cities)
    }

    // ---
    // Escrita
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        input: &CreateBuildingPayload,
    ) -> Result<Building, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Building>(&format!(
            "INSERT INTO buildings (owner_id, name, full_address, city, state, zip_code) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            BUILDING_COLUMNS
        ))
        .bind(owner_id)
        .bind(&input.name)
        .bind(&input.full_address)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip_code)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_NAME))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &UpdateBuildingPayload,
    ) -> Result<Building, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Building>(&format!(
            "UPDATE buildings SET \
                name = COALESCE($2, name), \
                full_address = COALESCE($3, full_address), \
                city = COALESCE($4, city), \
                state = COALESCE($5, state), \
                zip_code = COALESCE($6, zip_code) \
             WHERE id = $1 RETURNING {}",
            BUILDING_COLUMNS
        ))
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.full_address.as_deref())
        .bind(input.city.as_deref())
        .bind(input.state.as_deref())
        .bind(input.zip_code.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_NAME))
    }

    pub async fn set_facade_photo(&self, id: Uuid, path: &str) -> Result<Building, AppError> {
        let building = sqlx::query_as::<_, Building>(&format!(
            "UPDATE buildings SET facade_photo_path = $2 WHERE id = $1 RETURNING {}",
            BUILDING_COLUMNS
        ))
        .bind(id)
        .bind(path)
        .fetch_one(&self.pool)
        .await?;

        Ok(building)
    }

    /// Trava o prédio e as suas unidades até o fim da transação.
    /// `false` se o prédio já não existe.
    pub async fn lock_with_apartments(&self, conn: &mut sqlx::PgConnection, id: Uuid) -> Result<bool, AppError> {
        let locked = sqlx::query_scalar::<_, Uuid>(LOCK_BUILDING)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        if locked.is_none() {
            return Ok(false);
        }

        sqlx::query(LOCK_APARTMENTS)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(true)
    }

    // Apaga o prédio; os apartamentos vão junto (ON DELETE CASCADE)
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM buildings WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Uploads tocam estas linhas (UPDATE ou a FK de apartment_photos), então ficam bloqueados
    #[test]
    fn test_delete_locks_building_and_apartments() {
        assert!(LOCK_BUILDING.contains("FROM buildings") && LOCK_BUILDING.ends_with("FOR UPDATE"));
        assert!(LOCK_APARTMENTS.contains("building_id = $1") && LOCK_APARTMENTS.ends_with("FOR UPDATE"));
    }
}
