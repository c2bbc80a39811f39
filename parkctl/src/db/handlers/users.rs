//! Database repository for users.

use crate::types::{abbrev_uuid, UserId};
use crate::{
    api::models::users::Role,
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
};
use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

const SYSTEM_USER_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub contact_number: Option<String>,
    pub plate_number: Option<String>,
    pub auth_source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_admin: bool,
    pub password_hash: Option<String>,
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl From<(Vec<Role>, User)> for UserDBResponse {
    fn from((roles, user): (Vec<Role>, User)) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            contact_number: user.contact_number,
            plate_number: user.plate_number,
            created_at: user.created_at,
            updated_at: user.updated_at,
            auth_source: user.auth_source,
            is_admin: user.is_admin,
            roles,
            password_hash: user.password_hash,
        }
    }
}

async fn roles_for(conn: &mut PgConnection, user_id: UserId) -> Result<Vec<Role>> {
    let roles = sqlx::query_scalar::<_, Role>("SELECT role FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(roles)
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // Always generate a new ID for users
        let user_id = Uuid::new_v4();

        let mut tx = self.db.begin().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, display_name, contact_number, plate_number, auth_source, is_admin, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.display_name)
        .bind(&request.contact_number)
        .bind(&request.plate_number)
        .bind(&request.auth_source)
        .bind(request.is_admin)
        .bind(&request.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        for role in &request.roles {
            sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
                .bind(user_id)
                .bind(role)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(UserDBResponse::from((request.roles.clone(), user)))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT * FROM users WHERE id = $1 AND id != '{SYSTEM_USER_ID}'"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        if let Some(user) = user {
            let roles = roles_for(self.db, id).await?;
            Ok(Some(UserDBResponse::from((roles, user))))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users WHERE id != '{SYSTEM_USER_ID}' ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        let mut result = Vec::new();
        for user in users {
            let roles = roles_for(self.db, user.id).await?;
            result.push(UserDBResponse::from((roles, user)));
        }
        Ok(result)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // This update touches multiple tables, so regardless of the connection passed in, we still need a transaction.
        let user;
        {
            let mut tx = self.db.begin().await?;

            user = sqlx::query_as::<_, User>(
                r#"
            UPDATE users SET
                display_name = COALESCE($2, display_name),
                contact_number = COALESCE($3, contact_number),
                plate_number = COALESCE($4, plate_number),
                password_hash = COALESCE($5, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
            )
            .bind(id)
            .bind(&request.display_name)
            .bind(&request.contact_number)
            .bind(&request.plate_number)
            .bind(&request.password_hash)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;

            // Handle role updates if provided
            if let Some(roles) = &request.roles {
                // Ensure StandardUser role is always present
                let mut updated_roles = roles.clone();
                if !updated_roles.contains(&Role::StandardUser) {
                    updated_roles.push(Role::StandardUser);
                }

                sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                for role in &updated_roles {
                    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
                        .bind(id)
                        .bind(role)
                        .execute(&mut *tx)
                        .await?;
                }
            }
            tx.commit().await?;
        }

        // Get current roles for the response
        let roles = roles_for(self.db, id).await?;

        Ok(UserDBResponse::from((roles, user)))
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT * FROM users WHERE email = $1 AND id != '{SYSTEM_USER_ID}'"))
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        if let Some(user) = user {
            let roles = roles_for(self.db, user.id).await?;
            Ok(Some(UserDBResponse::from((roles, user))))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self, username), err)]
    pub async fn get_user_by_username(&mut self, username: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users WHERE username = $1 AND id != '{SYSTEM_USER_ID}'"
        ))
        .bind(username)
        .fetch_optional(&mut *self.db)
        .await?;

        if let Some(user) = user {
            let roles = roles_for(self.db, user.id).await?;
            Ok(Some(UserDBResponse::from((roles, user))))
        } else {
            Ok(None)
        }
    }

    /// Number of non-system users, for the dashboard overview
    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM users WHERE id != '{SYSTEM_USER_ID}'"))
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use crate::api::models::users::{Role, UserCreate};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user_create = UserCreateDBRequest::from(UserCreate {
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            display_name: Some("Test User".to_string()),
            contact_number: None,
            plate_number: Some("ABC-1234".to_string()),
            roles: vec![Role::StandardUser],
        });

        let result = repo.create(&user_create).await;
        assert!(result.is_ok());

        let user = result.unwrap();
        assert_eq!(user.username, "testuser");
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.display_name, Some("Test User".to_string()));
        assert_eq!(user.plate_number, Some("ABC-1234".to_string()));
        assert_eq!(user.roles, vec![Role::StandardUser]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_user_by_email(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user_create = UserCreateDBRequest::from(UserCreate {
            username: "emailuser".to_string(),
            email: "email@example.com".to_string(),
            display_name: None,
            contact_number: None,
            plate_number: None,
            roles: vec![Role::StandardUser],
        });

        let created_user = repo.create(&user_create).await.unwrap();

        let found_user = repo.get_user_by_email("email@example.com").await.unwrap();
        assert!(found_user.is_some());

        let found_user = found_user.unwrap();
        assert_eq!(found_user.id, created_user.id);
        assert_eq!(found_user.username, "emailuser");
        assert_eq!(found_user.roles, vec![Role::StandardUser]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_system_user_is_hidden(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let system_id: UserId = SYSTEM_USER_ID.parse().unwrap();
        assert!(repo.get_by_id(system_id).await.unwrap().is_none());

        let all = repo.list(&UserFilter::new(0, 100)).await.unwrap();
        assert!(all.iter().all(|u| u.id != system_id));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_user_roles_always_includes_standard_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user_create = UserCreateDBRequest::from(UserCreate {
            username: "roleuser".to_string(),
            email: "roleuser@example.com".to_string(),
            display_name: None,
            contact_number: None,
            plate_number: None,
            roles: vec![Role::StandardUser, Role::LotManager],
        });

        let created_user = repo.create(&user_create).await.unwrap();
        assert_eq!(created_user.roles.len(), 2);

        // Intentionally omit StandardUser from the new role set
        let update_request = UserUpdateDBRequest {
            display_name: None,
            contact_number: None,
            plate_number: None,
            roles: Some(vec![Role::BillingManager]),
            password_hash: None,
        };

        let updated_user = repo.update(created_user.id, &update_request).await.unwrap();
        assert!(updated_user.roles.contains(&Role::StandardUser));
        assert!(updated_user.roles.contains(&Role::BillingManager));
        assert!(!updated_user.roles.contains(&Role::LotManager));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_partial_update_leaves_other_fields(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user_create = UserCreateDBRequest::from(UserCreate {
            username: "partial".to_string(),
            email: "partial@example.com".to_string(),
            display_name: Some("Before".to_string()),
            contact_number: Some("555-0100".to_string()),
            plate_number: None,
            roles: vec![Role::StandardUser],
        });
        let created = repo.create(&user_create).await.unwrap();

        let update = UserUpdateDBRequest {
            display_name: Some("After".to_string()),
            contact_number: None,
            plate_number: None,
            roles: None,
            password_hash: None,
        };
        let updated = repo.update(created.id, &update).await.unwrap();

        assert_eq!(updated.display_name, Some("After".to_string()));
        assert_eq!(updated.contact_number, Some("555-0100".to_string()));
        assert_eq!(updated.roles, vec![Role::StandardUser]);
    }
}
