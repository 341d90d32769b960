use feedback_core::feedback::DEFAULT_STATUSES;
use feedback_db::repositories::FeedbackRepo;
use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    feedback_db::health_check(&pool).await.unwrap();

    let columns: Vec<(String,)> = sqlx::query_as(
        "SELECT column_name::text
         FROM information_schema.columns
         WHERE table_schema = 'public' AND table_name = 'feedback'
         ORDER BY column_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    let columns: Vec<String> = columns.into_iter().map(|(c,)| c).collect();

    for expected in [
        "app",
        "created_at",
        "data",
        "id",
        "modified_at",
        "notes",
        "status",
        "title",
        "type",
    ] {
        assert!(columns.iter().any(|c| c == expected), "missing column {expected}");
    }
}

/// The live enum matches the built-in status list, in order.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_enum_matches_builtin_statuses(pool: PgPool) {
    let live = FeedbackRepo::allowed_statuses(&pool).await.unwrap();
    assert_eq!(live, DEFAULT_STATUSES);
}

/// Running the bootstrap script on a migrated database is a no-op.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ensure_schema_is_idempotent(pool: PgPool) {
    feedback_db::ensure_schema(&pool).await.unwrap();
    feedback_db::ensure_schema(&pool).await.unwrap();

    let indexes: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM pg_indexes WHERE tablename = 'feedback' AND indexname LIKE 'idx_feedback_%'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(indexes.0, 4);
}

/// The bootstrap script also works on an empty database.
#[sqlx::test(migrations = false)]
async fn test_ensure_schema_on_empty_database(pool: PgPool) {
    let before = FeedbackRepo::allowed_statuses(&pool).await.unwrap();
    assert_eq!(before, DEFAULT_STATUSES, "falls back to built-in set");

    feedback_db::ensure_schema(&pool).await.unwrap();

    let exists: (bool,) = sqlx::query_as("SELECT to_regclass('public.feedback') IS NOT NULL")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(exists.0);
}
