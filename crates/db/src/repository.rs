//! Generic single-table CRUD helper.
//!
//! Covers the boilerplate every per-table store would otherwise repeat:
//! lookups by id, ANDed equality filters, insert/update/delete with
//! `RETURNING *`. Reads never fail on "no match" (they return `Option`/empty
//! `Vec`); writes return the affected rows.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::error::DbError;

/// A row type bound to one table.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// Table the rows live in.
    const TABLE: &'static str;

    /// Primary-key column used by the `*_by_id` operations.
    const ID_COLUMN: &'static str = "id";
}

/// A value bindable into a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// ANDed column/value equality clauses.
///
/// A `Null` value renders as `IS NULL`. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(&'static str, SqlValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.clauses.push((column, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[(&'static str, SqlValue)] {
        &self.clauses
    }
}

/// Ordered column/value pairs for inserts and updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnValues {
    entries: Vec<(&'static str, SqlValue)>,
}

impl ColumnValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.entries.push((column, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(&'static str, SqlValue)] {
        &self.entries
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(column, _)| *column).collect()
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, value)| value)
    }
}

/// Pagination and filtering for [`Repository::find_many`].
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub filter: Option<Filter>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// CRUD operations for one table, generic over the row type.
pub struct Repository<E> {
    pool: PgPool,
    _entity: PhantomData<E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<E>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        qb.push(E::TABLE);
        qb.push(" WHERE ");
        qb.push(E::ID_COLUMN);
        qb.push(" = ");
        qb.push_bind(id.to_string());
        Ok(qb.build_query_as::<E>().fetch_optional(&self.pool).await?)
    }

    /// First row matching `filter`, if any.
    pub async fn find_one(&self, filter: &Filter) -> Result<Option<E>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        qb.push(E::TABLE);
        push_filter(&mut qb, filter);
        qb.push(" LIMIT 1");
        Ok(qb.build_query_as::<E>().fetch_optional(&self.pool).await?)
    }

    pub async fn find_many(&self, options: &FindOptions) -> Result<Vec<E>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        qb.push(E::TABLE);
        if let Some(filter) = &options.filter {
            push_filter(&mut qb, filter);
        }
        if let Some(limit) = options.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }
        if let Some(offset) = options.offset {
            qb.push(" OFFSET ");
            qb.push_bind(offset);
        }
        Ok(qb.build_query_as::<E>().fetch_all(&self.pool).await?)
    }

    pub async fn find_all(&self) -> Result<Vec<E>, DbError> {
        self.find_many(&FindOptions::default()).await
    }

    /// Insert one row and return it as stored.
    pub async fn insert_one(&self, values: &ColumnValues) -> Result<E, DbError> {
        if values.is_empty() {
            return Err(DbError::NoValues);
        }
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO ");
        qb.push(E::TABLE);
        qb.push(" (");
        push_columns(&mut qb, &values.columns());
        qb.push(") VALUES (");
        push_value_list(&mut qb, values);
        qb.push(") RETURNING *");
        Ok(qb.build_query_as::<E>().fetch_one(&self.pool).await?)
    }

    /// Insert several rows in one statement and return them as stored.
    ///
    /// Every row must supply the same columns as the first; an empty input
    /// returns an empty `Vec` without touching the database.
    pub async fn insert_many(&self, rows: &[ColumnValues]) -> Result<Vec<E>, DbError> {
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        if first.is_empty() {
            return Err(DbError::NoValues);
        }
        let columns = first.columns();
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO ");
        qb.push(E::TABLE);
        qb.push(" (");
        push_columns(&mut qb, &columns);
        qb.push(") ");
        qb.push_values(rows, |mut parts, row| {
            for column in &columns {
                match row.get(column) {
                    Some(value) => push_separated_value(&mut parts, value),
                    None => {
                        parts.push("NULL");
                    }
                }
            }
        });
        qb.push(" RETURNING *");
        Ok(qb.build_query_as::<E>().fetch_all(&self.pool).await?)
    }

    /// Update the row with the given id; `None` when no row matched.
    pub async fn update_by_id(&self, id: &str, values: &ColumnValues) -> Result<Option<E>, DbError> {
        if values.is_empty() {
            return Err(DbError::NoValues);
        }
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE ");
        qb.push(E::TABLE);
        qb.push(" SET ");
        push_set(&mut qb, values);
        qb.push(" WHERE ");
        qb.push(E::ID_COLUMN);
        qb.push(" = ");
        qb.push_bind(id.to_string());
        qb.push(" RETURNING *");
        Ok(qb.build_query_as::<E>().fetch_optional(&self.pool).await?)
    }

    /// Update every row matching `filter` and return the affected rows.
    pub async fn update_where(
        &self,
        filter: &Filter,
        values: &ColumnValues,
    ) -> Result<Vec<E>, DbError> {
        if values.is_empty() {
            return Err(DbError::NoValues);
        }
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE ");
        qb.push(E::TABLE);
        qb.push(" SET ");
        push_set(&mut qb, values);
        push_filter(&mut qb, filter);
        qb.push(" RETURNING *");
        Ok(qb.build_query_as::<E>().fetch_all(&self.pool).await?)
    }

    /// Delete the row with the given id; `None` when no row matched.
    pub async fn delete_by_id(&self, id: &str) -> Result<Option<E>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM ");
        qb.push(E::TABLE);
        qb.push(" WHERE ");
        qb.push(E::ID_COLUMN);
        qb.push(" = ");
        qb.push_bind(id.to_string());
        qb.push(" RETURNING *");
        Ok(qb.build_query_as::<E>().fetch_optional(&self.pool).await?)
    }

    /// Delete every row matching `filter` and return the deleted rows.
    pub async fn delete_where(&self, filter: &Filter) -> Result<Vec<E>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM ");
        qb.push(E::TABLE);
        push_filter(&mut qb, filter);
        qb.push(" RETURNING *");
        Ok(qb.build_query_as::<E>().fetch_all(&self.pool).await?)
    }

    /// Count rows matching `filter` (fetches the matching rows and counts
    /// them, reusing the read path).
    pub async fn count(&self, filter: Option<&Filter>) -> Result<usize, DbError> {
        let options = FindOptions {
            filter: filter.cloned(),
            ..Default::default()
        };
        Ok(self.find_many(&options).await?.len())
    }

    /// Whether any row matches `filter`.
    pub async fn exists(&self, filter: &Filter) -> Result<bool, DbError> {
        Ok(self.find_one(filter).await?.is_some())
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    for (i, (column, value)) in filter.clauses().iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        qb.push(*column);
        match value {
            SqlValue::Null => {
                qb.push(" IS NULL");
            }
            SqlValue::Text(v) => {
                qb.push(" = ");
                qb.push_bind(v.clone());
            }
            SqlValue::Int(v) => {
                qb.push(" = ");
                qb.push_bind(*v);
            }
            SqlValue::Bool(v) => {
                qb.push(" = ");
                qb.push_bind(*v);
            }
            SqlValue::Timestamp(v) => {
                qb.push(" = ");
                qb.push_bind(*v);
            }
        }
    }
}

fn push_columns(qb: &mut QueryBuilder<'_, Postgres>, columns: &[&'static str]) {
    let mut parts = qb.separated(", ");
    for column in columns {
        parts.push(*column);
    }
}

fn push_value_list(qb: &mut QueryBuilder<'_, Postgres>, values: &ColumnValues) {
    let mut parts = qb.separated(", ");
    for (_, value) in values.entries() {
        push_separated_value(&mut parts, value);
    }
}

fn push_separated_value(
    parts: &mut Separated<'_, '_, Postgres, &'static str>,
    value: &SqlValue,
) {
    match value {
        SqlValue::Text(v) => {
            parts.push_bind(v.clone());
        }
        SqlValue::Int(v) => {
            parts.push_bind(*v);
        }
        SqlValue::Bool(v) => {
            parts.push_bind(*v);
        }
        SqlValue::Timestamp(v) => {
            parts.push_bind(*v);
        }
        SqlValue::Null => {
            parts.push("NULL");
        }
    }
}

fn push_set(qb: &mut QueryBuilder<'_, Postgres>, values: &ColumnValues) {
    let mut parts = qb.separated(", ");
    for (column, value) in values.entries() {
        parts.push(*column);
        parts.push_unseparated(" = ");
        match value {
            SqlValue::Text(v) => {
                parts.push_bind_unseparated(v.clone());
            }
            SqlValue::Int(v) => {
                parts.push_bind_unseparated(*v);
            }
            SqlValue::Bool(v) => {
                parts.push_bind_unseparated(*v);
            }
            SqlValue::Timestamp(v) => {
                parts.push_bind_unseparated(*v);
            }
            SqlValue::Null => {
                parts.push_unseparated("NULL");
            }
        }
    }
}
