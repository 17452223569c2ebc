use sqlx::PgPool;

/// Post ids arrive from free-form log metadata, so they are compared as text.
pub async fn find_title(pool: &PgPool, post_id: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT title FROM post_content WHERE id::text = $1")
        .bind(post_id)
        .fetch_optional(pool)
        .await
}
