//! Parameterized SQL assembly.
//!
//! [`SqlBuilder`] appends SQL text and bound values together: every call
//! that writes a placeholder pushes its value in the same step, so the
//! `$n` numbering always matches the parameter list. User input only ever
//! reaches the database as a bound parameter.

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres};

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    NullableText(Option<String>),
    Int(i64),
    Json(serde_json::Value),
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Option<String>> for SqlParam {
    fn from(value: Option<String>) -> Self {
        Self::NullableText(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<serde_json::Value> for SqlParam {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Incrementally builds one statement and its parameter list.
#[derive(Debug, Default)]
pub struct SqlBuilder {
    sql: String,
    params: Vec<SqlParam>,
    conditions: usize,
    assignments: usize,
}

impl SqlBuilder {
    /// Start a statement with fixed leading text.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            sql: base.into(),
            ..Self::default()
        }
    }

    /// Append literal SQL. Never pass user input here.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append the next placeholder and bind `value` to it.
    pub fn push_bind(&mut self, value: impl Into<SqlParam>) -> &mut Self {
        self.params.push(value.into());
        self.sql.push('$');
        self.sql.push_str(&self.params.len().to_string());
        self
    }

    /// Append `WHERE`/`AND` followed by `lhs`, a bound `value`, and `suffix`.
    ///
    /// The first call opens the `WHERE` clause; later calls are `AND`-joined.
    pub fn and_where_with(
        &mut self,
        lhs: &str,
        value: impl Into<SqlParam>,
        suffix: &str,
    ) -> &mut Self {
        let joiner = if self.conditions == 0 { " WHERE " } else { " AND " };
        self.conditions += 1;
        self.push(joiner).push(lhs).push_bind(value).push(suffix)
    }

    /// Append an `lhs $n` predicate, e.g. `and_where("app = ", app)`.
    pub fn and_where(&mut self, lhs: &str, value: impl Into<SqlParam>) -> &mut Self {
        self.and_where_with(lhs, value, "")
    }

    /// Append a literal assignment to a `SET` list, e.g. `modified_at = NOW()`.
    pub fn set_raw(&mut self, assignment: &str) -> &mut Self {
        let joiner = if self.assignments == 0 { " SET " } else { ", " };
        self.assignments += 1;
        self.push(joiner).push(assignment)
    }

    /// Append `column = $n<cast>` to a `SET` list and bind `value`.
    pub fn set_with(&mut self, column: &str, value: impl Into<SqlParam>, cast: &str) -> &mut Self {
        let joiner = if self.assignments == 0 { " SET " } else { ", " };
        self.assignments += 1;
        self.push(joiner)
            .push(column)
            .push(" = ")
            .push_bind(value)
            .push(cast)
    }

    /// Append `column = $n` to a `SET` list and bind `value`.
    pub fn set(&mut self, column: &str, value: impl Into<SqlParam>) -> &mut Self {
        self.set_with(column, value, "")
    }

    pub fn build(self) -> BoundQuery {
        BoundQuery {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// A finished statement with its ordered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl BoundQuery {
    /// Prepare a typed query with every parameter bound in order.
    pub fn query_as<O>(&self) -> QueryAs<'_, Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, PgRow>,
    {
        self.params
            .iter()
            .fold(sqlx::query_as::<_, O>(&self.sql), |q, param| match param {
                SqlParam::Text(v) => q.bind(v.as_str()),
                SqlParam::NullableText(v) => q.bind(v.as_deref()),
                SqlParam::Int(v) => q.bind(*v),
                SqlParam::Json(v) => q.bind(v),
            })
    }
}

/// Escape `%`, `_`, and `\` so a value matches literally inside `LIKE`.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_bind_numbers_sequentially() {
        let mut b = SqlBuilder::new("SELECT");
        b.push(" ").push_bind(1_i64).push(", ").push_bind("two");
        let q = b.build();
        assert_eq!(q.sql, "SELECT $1, $2");
        assert_eq!(q.params, vec![SqlParam::Int(1), SqlParam::Text("two".into())]);
    }

    #[test]
    fn first_condition_opens_where_clause() {
        let mut b = SqlBuilder::new("SELECT * FROM t");
        b.and_where("a = ", "x").and_where("b = ", "y");
        assert_eq!(b.build().sql, "SELECT * FROM t WHERE a = $1 AND b = $2");
    }

    #[test]
    fn no_conditions_means_no_where() {
        let mut b = SqlBuilder::new("SELECT * FROM t");
        b.push(" LIMIT ").push_bind(5_i64);
        assert_eq!(b.build().sql, "SELECT * FROM t LIMIT $1");
    }

    #[test]
    fn set_list_is_comma_joined() {
        let mut b = SqlBuilder::new("UPDATE t");
        b.set_raw("modified_at = NOW()")
            .set("title", "new")
            .set_with("status", "closed", "::feedback_status");
        b.and_where("id = ", "abc");
        let q = b.build();
        assert_eq!(
            q.sql,
            "UPDATE t SET modified_at = NOW(), title = $1, status = $2::feedback_status WHERE id = $3"
        );
        assert_eq!(q.params.len(), 3);
    }

    #[test]
    fn wrapped_predicate_keeps_suffix() {
        let mut b = SqlBuilder::new("SELECT 1");
        b.and_where_with("title ILIKE ('%' || ", "abc", " || '%')");
        assert_eq!(b.build().sql, "SELECT 1 WHERE title ILIKE ('%' || $1 || '%')");
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
