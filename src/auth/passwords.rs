//! Password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use tokio::task;

use crate::error::{ApiError, ApiResult};

/// Hash a password with Argon2id. Runs on the blocking pool because the
/// hash is CPU-bound and would stall the async runtime.
pub async fn hash(password: String) -> ApiResult<String> {
    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| ApiError::Memory)
    })
    .await
    .map_err(|_| ApiError::Memory)?
}

/// Constant-time verification of `password` against an encoded hash.
pub async fn verify(password: String, encoded: String) -> bool {
    task::spawn_blocking(move || {
        PasswordHash::new(&encoded)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    })
    .await
    .unwrap_or(false)
}

const STORED_HASH_SQL: &str = "SELECT password \
      FROM auth.users \
      WHERE uuid::text = $1 \
      OR username = $1";

/// Check `password` against the stored hash of the user referenced by UUID
/// or username. Missing users, query failures and mismatches all read as
/// `false`.
pub async fn validate<C: ConnectionTrait>(conn: &C, user_ref: &str, password: &str) -> bool {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        STORED_HASH_SQL,
        vec![user_ref.into()],
    );
    let rows = match conn.query_all(stmt).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Error fetching password hash: {e:?}");
            return false;
        }
    };
    if rows.len() != 1 {
        return false;
    }
    let Ok(encoded) = rows[0].try_get_by::<String, _>(0_usize) else {
        return false;
    };
    verify(password.to_owned(), encoded).await
}
