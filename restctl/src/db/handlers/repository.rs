//! Base repository trait for database operations.

use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, sqlite::SqliteRow};

use crate::db::errors::Result;
use crate::rest::criteria::{Columns, SearchCriteria};

/// Base repository trait providing common database operations
///
/// A repository is a data access layer for one table. It has separate associated types for
/// create requests, update requests and responses, and lists entities with a filter.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The request type for updating entities
    type UpdateRequest;

    /// The response type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List entities matching the filter
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Count entities matching the filter, ignoring ordering and pagination
    async fn count(&mut self, filter: &Self::Filter) -> Result<i64>;

    /// IDs of the entities matching the filter
    async fn ids(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Id>>;

    /// Delete an entity by ID
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;

    /// Update an entity by ID
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;
}

/// `SELECT *` rows of `columns.table` matching `criteria`.
pub(crate) async fn select_matching<T>(db: &mut SqliteConnection, columns: &Columns, criteria: &SearchCriteria) -> Result<Vec<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {}", columns.table));
    criteria.push_where(&mut qb, columns);
    criteria.push_order_and_pagination(&mut qb);

    Ok(qb.build_query_as::<T>().fetch_all(&mut *db).await?)
}

/// Number of rows of `columns.table` matching `criteria`.
pub(crate) async fn count_matching(db: &mut SqliteConnection, columns: &Columns, criteria: &SearchCriteria) -> Result<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {}", columns.table));
    criteria.push_where(&mut qb, columns);

    Ok(qb.build_query_scalar::<i64>().fetch_one(&mut *db).await?)
}

/// `id` column of the rows of `columns.table` matching `criteria`.
pub(crate) async fn ids_matching<T>(db: &mut SqliteConnection, columns: &Columns, criteria: &SearchCriteria) -> Result<Vec<T>>
where
    T: Send + Unpin,
    (T,): for<'r> FromRow<'r, SqliteRow>,
{
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT id FROM {}", columns.table));
    criteria.push_where(&mut qb, columns);
    criteria.push_order_and_pagination(&mut qb);

    Ok(qb.build_query_scalar::<T>().fetch_all(&mut *db).await?)
}
