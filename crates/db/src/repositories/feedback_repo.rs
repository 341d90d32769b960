//! Repository for the `feedback` table.

use feedback_core::feedback::DEFAULT_STATUSES;
use sqlx::PgPool;

use crate::models::feedback::{
    Feedback, FeedbackCreated, FeedbackListParams, FeedbackUpdated, NewFeedback, UpdateFeedback,
};
use crate::query::{escape_like, BoundQuery, SqlBuilder};

/// Column list for `feedback` queries. The enum is read back as text.
const COLUMNS: &str = "\
    id, app, type, title, status::text AS status, data, notes, \
    created_at, modified_at";

/// Provides CRUD operations and query building for feedback records.
pub struct FeedbackRepo;

impl FeedbackRepo {
    // -----------------------------------------------------------------------
    // Statement builders
    // -----------------------------------------------------------------------

    /// Build the filtered listing query.
    ///
    /// Filters are appended in the fixed order app, type, status, title;
    /// blank filters are skipped. `LIMIT` and `OFFSET` always take the last
    /// two placeholders. Results are ordered newest-first.
    pub fn list_query(params: &FeedbackListParams, limit: i64, offset: i64) -> BoundQuery {
        let mut b = SqlBuilder::new(format!("SELECT {COLUMNS} FROM feedback"));

        if let Some(app) = non_empty(&params.app) {
            b.and_where("app = ", app);
        }
        if let Some(kind) = non_empty(&params.kind) {
            b.and_where("type = ", kind);
        }
        if let Some(status) = non_empty(&params.status) {
            b.and_where("status::text = ", status);
        }
        if let Some(title) = non_empty(&params.title) {
            b.and_where_with("title ILIKE ('%' || ", escape_like(title), " || '%') ESCAPE '\\'");
        }

        b.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        b.build()
    }

    /// Build the partial-update statement for `id`.
    ///
    /// `modified_at` is always refreshed; provided fields follow in the
    /// order type, title, status, data, notes, and the id binds last.
    pub fn update_query(id: &str, input: &UpdateFeedback) -> BoundQuery {
        let mut b = SqlBuilder::new("UPDATE feedback");
        b.set_raw("modified_at = NOW()");

        if let Some(kind) = &input.kind {
            b.set("type", kind.as_str());
        }
        if let Some(title) = &input.title {
            b.set("title", title.as_str());
        }
        if let Some(status) = &input.status {
            b.set_with("status", status.as_str(), "::feedback_status");
        }
        if let Some(data) = &input.data {
            b.set("data", data.clone());
        }
        if let Some(notes) = &input.notes {
            b.set("notes", serde_json::Value::Array(notes.clone()));
        }

        b.and_where("id = ", id);
        b.push(" RETURNING id, title, status::text AS status, modified_at");
        b.build()
    }

    /// Build the fixed-shape insert. A `None` id falls back to the column
    /// default.
    pub fn insert_query(input: &NewFeedback) -> BoundQuery {
        let mut b = SqlBuilder::new(
            "INSERT INTO feedback (id, app, type, title, status, data, notes) VALUES (COALESCE(",
        );
        b.push_bind(input.id.clone())
            .push(", gen_random_uuid()::text), ")
            .push_bind(input.app.as_str())
            .push(", ")
            .push_bind(input.kind.clone())
            .push(", ")
            .push_bind(input.title.as_str())
            .push(", ")
            .push_bind(input.status.as_str())
            .push("::feedback_status, ")
            .push_bind(input.data.clone())
            .push(", ")
            .push_bind(serde_json::Value::Array(input.notes.clone()))
            .push(") RETURNING id, created_at");
        b.build()
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    /// Insert a new record, returning its id and creation time.
    pub async fn create(pool: &PgPool, input: &NewFeedback) -> Result<FeedbackCreated, sqlx::Error> {
        Self::insert_query(input)
            .query_as::<FeedbackCreated>()
            .fetch_one(pool)
            .await
    }

    /// Find a record by id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Feedback>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feedback WHERE id = $1");
        sqlx::query_as::<_, Feedback>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a record with `id` exists.
    pub async fn exists(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM feedback WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List records matching `params`, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &FeedbackListParams,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Feedback>, sqlx::Error> {
        Self::list_query(params, limit, offset)
            .query_as::<Feedback>()
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if the record does not exist.
    ///
    /// The status, if any, must already be validated; an unknown enum label
    /// is a database error here.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        input: &UpdateFeedback,
    ) -> Result<Option<FeedbackUpdated>, sqlx::Error> {
        Self::update_query(id, input)
            .query_as::<FeedbackUpdated>()
            .fetch_optional(pool)
            .await
    }

    /// Delete a record. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM feedback WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The live set of `feedback_status` labels in declaration order.
    ///
    /// Falls back to the built-in set when the enum is not installed.
    pub async fn allowed_statuses(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let labels: Vec<String> = sqlx::query_scalar(
            "SELECT e.enumlabel::text \
             FROM pg_enum e \
             JOIN pg_type t ON t.oid = e.enumtypid \
             WHERE t.typname = 'feedback_status' \
             ORDER BY e.enumsortorder",
        )
        .fetch_all(pool)
        .await?;

        if labels.is_empty() {
            tracing::warn!("feedback_status enum not found, using built-in status set");
            return Ok(DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect());
        }
        Ok(labels)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
