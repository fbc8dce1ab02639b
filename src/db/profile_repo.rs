// src/db/profile_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::profile::{Profile, UpdateProfileRequest},
};

#[derive(Clone, Default)]
pub struct ProfileRepository;

impl ProfileRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_profile<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Sem linha ainda? Tratamos "Not Found" como perfil vazio.
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, full_name, license_number, phone, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(profile.unwrap_or_else(|| Profile::empty(user_id)))
    }

    // UPSERT (Insert or Update)
    pub async fn upsert_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &UpdateProfileRequest,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, full_name, license_number, phone)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id)
            DO UPDATE SET
                full_name = EXCLUDED.full_name,
                license_number = EXCLUDED.license_number,
                phone = EXCLUDED.phone,
                updated_at = NOW()
            RETURNING user_id, full_name, license_number, phone, updated_at
            "#,
        )
        .bind(user_id)
        .bind(input.full_name.as_deref())
        .bind(input.license_number.as_deref())
        .bind(input.phone.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(profile)
    }
}
