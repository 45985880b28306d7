//! Atomic execution wrapper around [`UserTransaction`].

use futures::future::BoxFuture;
use tracing::warn;

use portcullis_core::result::AppResult;

use crate::store::{UserStore, UserTransaction};

/// Run `work` inside a fresh transaction.
///
/// Commits when `work` returns `Ok` and rolls back when it returns `Err`.
/// A rollback failure is logged and the original error is returned. Nothing
/// written by `work` is observable unless the commit succeeds.
///
/// ```ignore
/// let user = transact(store, move |tx| Box::pin(async move {
///     tx.insert_user(&record).await
/// }))
/// .await?;
/// ```
pub async fn transact<T, F>(store: &dyn UserStore, work: F) -> AppResult<T>
where
    T: Send,
    F: for<'t> FnOnce(&'t mut dyn UserTransaction) -> BoxFuture<'t, AppResult<T>> + Send,
{
    let mut tx = store.begin().await?;

    match work(tx.as_mut()).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed after unit of work error");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryUserStore;
    use portcullis_core::error::{AppError, ErrorKind};
    use portcullis_entity::user::NewUser;
    use uuid::Uuid;

    fn record(email: &str) -> NewUser {
        NewUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: Some("digest".to_string()),
            email_confirm_seed: Some(Uuid::new_v4().to_string()),
            signup_attribution: None,
        }
    }

    #[tokio::test]
    async fn test_commit_on_success() {
        let store = MemoryUserStore::new();
        let rec = record("a@x.com");

        let user = transact(&store, move |tx| {
            Box::pin(async move { tx.insert_user(&rec).await })
        })
        .await
        .unwrap();

        let found = store.find_by_id(user.id).await.unwrap();
        assert_eq!(found, Some(user));
    }

    #[tokio::test]
    async fn test_rollback_on_failure_after_insert() {
        let store = MemoryUserStore::new();
        let rec = record("a@x.com");

        let result: AppResult<()> = transact(&store, move |tx| {
            Box::pin(async move {
                tx.insert_user(&rec).await?;
                Err(AppError::internal("injected failure before commit"))
            })
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(store.find_by_email("a@x.com").await.unwrap().is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_conflict_leaves_existing_record_untouched() {
        let store = MemoryUserStore::new();
        let first = record("a@x.com");
        let original = transact(&store, move |tx| {
            Box::pin(async move { tx.insert_user(&first).await })
        })
        .await
        .unwrap();

        let mut second = record("a@x.com");
        second.signup_attribution = Some("campaign2".to_string());
        let err = transact(&store, move |tx| {
            Box::pin(async move { tx.insert_user(&second).await })
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Conflict);
        let stored = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored, original);
        assert_eq!(store.len().await, 1);
    }
}
