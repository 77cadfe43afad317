//! Transactional scope for composite writes
//!
//! Every multi-row mutation (event + tracklist, song + role set) runs inside
//! a single transaction so a failed step never leaves partial state visible.

use futures::future::BoxFuture;
use sqlx::{PgPool, Postgres, Transaction};

use crate::Result;

/// Run `f` inside a database transaction, committing on `Ok` and rolling
/// back on `Err`.
///
/// A dropped (cancelled) future rolls the transaction back through sqlx's
/// `Transaction` drop guard, so callers that time out mid-write leave no
/// partial rows behind.
pub async fn with_transaction<F, R>(pool: &PgPool, f: F) -> Result<R>
where
    F: for<'t> FnOnce(&'t mut Transaction<'static, Postgres>) -> BoxFuture<'t, Result<R>> + Send,
    R: Send,
{
    let mut tx = pool.begin().await?;

    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(e) => {
            tx.rollback().await?;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {

    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_transaction_commit() {
        // Integration test placeholder
    }

    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_transaction_rollback() {
        // Integration test placeholder
    }
}
