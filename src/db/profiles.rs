use sqlx::PgPool;

use crate::models::UserProfile;

pub async fn list_by_name(pool: &PgPool) -> Result<Vec<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>("SELECT id, name FROM user_profiles ORDER BY name ASC")
        .fetch_all(pool)
        .await
}
