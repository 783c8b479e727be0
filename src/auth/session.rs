//! Session-token checks against the `auth` schema.
//!
//! Every failure mode — malformed base64, absent or expired session,
//! query error — collapses to `false`; callers only ever branch on a
//! boolean.

use sea_orm::{ConnectionTrait, DatabaseBackend, Statement, Value};

use super::tokens;

const VALIDATE_SQL: &str = "SELECT 1 \
      FROM auth.user_sessions s \
      JOIN auth.users u ON s.user_id = u.user_id \
      WHERE s.session_token = $1 \
        AND s.expires_at > NOW() \
        AND s.revoked_at IS NULL \
        AND u.deleted_at IS NULL \
        AND ( \
              ($2::text IS NULL AND u.is_admin = true) \
              OR ($2::text IS NOT NULL AND ( \
                    u.is_admin = true \
                    OR u.uuid::text = $2::text \
                    OR u.username = $2::text \
              )) \
            )";

/// True iff `token` belongs to an active session whose user may act on
/// `user_ref`: the referenced user itself, any admin, or — when `user_ref`
/// is `None` — admins only.
pub async fn validate<C: ConnectionTrait>(conn: &C, user_ref: Option<&str>, token: &str) -> bool {
    let Some(hash) = tokens::hash_presented(token) else {
        return false;
    };

    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        VALIDATE_SQL,
        vec![hash.into(), Value::from(user_ref.map(str::to_owned))],
    );

    match conn.query_all(stmt).await {
        Ok(rows) => !rows.is_empty(),
        Err(e) => {
            tracing::error!("Error validating session: {e:?}");
            false
        }
    }
}

/// Admin-scope check: [`validate`] with no user reference.
pub async fn validate_admin<C: ConnectionTrait>(conn: &C, token: &str) -> bool {
    validate(conn, None, token).await
}

const USER_UUID_SQL: &str = "SELECT u.uuid::text AS user_uuid \
      FROM auth.user_sessions s \
      JOIN auth.users u ON s.user_id = u.user_id \
      WHERE s.session_token = $1";

/// Resolve the UUID of the user owning `token`, if any.
pub async fn user_uuid<C: ConnectionTrait>(conn: &C, token: &str) -> Option<String> {
    let hash = tokens::hash_presented(token)?;

    let stmt =
        Statement::from_sql_and_values(DatabaseBackend::Postgres, USER_UUID_SQL, vec![hash.into()]);

    let rows = conn.query_all(stmt).await.ok()?;
    rows.first()?.try_get_by::<String, _>(0_usize).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{MockDatabase, Value};
    use std::collections::BTreeMap;

    fn token() -> String {
        tokens::mint().plaintext
    }

    #[tokio::test]
    async fn validate_is_false_without_a_matching_session() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();

        assert!(!validate(&conn, Some("alice"), &token()).await);
    }

    #[tokio::test]
    async fn validate_is_true_when_the_lookup_matches() {
        let row = BTreeMap::from([("?column?", Value::Int(Some(1)))]);
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();

        assert!(validate(&conn, Some("alice"), &token()).await);
    }

    #[tokio::test]
    async fn validate_is_false_for_malformed_tokens() {
        // No query must be issued: an empty mock would turn an attempted
        // lookup into an error, which also reads as false.
        let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        assert!(!validate(&conn, Some("alice"), "%%% not base64 %%%").await);
        assert!(!validate(&conn, None, "").await);
    }

    #[tokio::test]
    async fn user_uuid_resolves_the_owning_user() {
        let row = BTreeMap::from([(
            "user_uuid",
            Value::from("123e4567-e89b-12d3-a456-426614174000"),
        )]);
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();

        assert_eq!(
            user_uuid(&conn, &token()).await.as_deref(),
            Some("123e4567-e89b-12d3-a456-426614174000")
        );
    }
}
