//! Database transaction utilities
//!
//! Multi-step mutations (reorder, primary promotion, delete compaction) must
//! never expose intermediate states to readers, so they run through the
//! helper here.

use propmedia_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::pin::Pin;

/// Execute a closure within a database transaction
///
/// Begins a transaction, executes the closure, and commits on success or
/// rolls back on error. Rollback errors are ignored; the original error wins.
///
/// # Example
///
/// ```ignore
/// use propmedia_db::db::transaction::with_transaction;
///
/// async fn example(pool: &sqlx::PgPool) -> Result<(), propmedia_core::AppError> {
///     with_transaction(pool, |tx| {
///         Box::pin(async move {
///             sqlx::query("UPDATE ...").execute(&mut **tx).await?;
///             sqlx::query("UPDATE ...").execute(&mut **tx).await?;
///             Ok(())
///         })
///     })
///     .await
/// }
/// ```
pub async fn with_transaction<F, R>(pool: &PgPool, f: F) -> Result<R, AppError>
where
    F: for<'c> FnOnce(
        &'c mut Transaction<'_, Postgres>,
    ) -> Pin<Box<dyn Future<Output = Result<R, AppError>> + Send + 'c>>,
{
    let mut tx = pool.begin().await?;

    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(e) => {
            tx.rollback().await.ok();
            Err(e)
        }
    }
}
