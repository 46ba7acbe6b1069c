use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::User;
use crate::services::registration::{PreparedUser, UserDirectory};
use crate::services::update_builder::{FieldValue, UserUpdate};
use crate::utils::crypto::{hash_password_blocking, verify_credential_blocking};

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone, dob, address, \
     profile_pic_url, role, balance, legal, notes, is_available, suspended, created_at, updated_at";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, prepared: PreparedUser) -> Result<User> {
        let password_hash = hash_password_blocking(prepared.password).await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (
                email, password_hash, first_name, last_name, phone, dob, address,
                profile_pic_url, role, balance, legal, notes, is_available, suspended
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&prepared.email)
        .bind(&password_hash)
        .bind(&prepared.first_name)
        .bind(&prepared.last_name)
        .bind(&prepared.phone)
        .bind(prepared.dob)
        .bind(&prepared.address)
        .bind(&prepared.profile_pic_url)
        .bind(&prepared.role)
        .bind(prepared.balance)
        .bind(&prepared.legal)
        .bind(&prepared.notes)
        .bind(prepared.is_available)
        .bind(prepared.suspended)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Checks the password and, for a matching legacy credential, replaces
    /// it with an argon2 hash before returning the user.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let invalid = || Error::Unauthorized("Invalid email or password.".into());

        let mut user = self.get_by_email(email).await?.ok_or_else(invalid)?;
        let check = verify_credential_blocking(password.to_string(), user.password_hash.clone()).await?;
        if !check.matches {
            return Err(invalid());
        }

        if check.needs_upgrade {
            let upgraded = hash_password_blocking(password.to_string()).await?;
            self.set_password_hash(user.id, &upgraded).await?;
            user.password_hash = Some(upgraded);
            tracing::info!(user_id = %user.id, "Upgraded legacy credential to argon2");
        }

        Ok(user)
    }

    pub async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn apply_update(&self, id: Uuid, update: &UserUpdate) -> Result<User> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        {
            let mut set = qb.separated(", ");
            for (column, value) in &update.fields {
                set.push(column.as_str());
                set.push_unseparated(" = ");
                match value {
                    FieldValue::Text(text) => set.push_bind_unseparated(text.clone()),
                    FieldValue::Date(date) => set.push_bind_unseparated(*date),
                    FieldValue::Decimal(amount) => set.push_bind_unseparated(*amount),
                    FieldValue::Bool(flag) => set.push_bind_unseparated(*flag),
                    FieldValue::Timestamp(at) => set.push_bind_unseparated(*at),
                };
            }
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(USER_COLUMNS);

        let user = qb
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".into()))?;

        tracing::info!(user_id = %id, fields = update.touched_count, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("User not found".into()));
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for UserService {
    async fn email_taken(&self, email: &str) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(taken)
    }
}
