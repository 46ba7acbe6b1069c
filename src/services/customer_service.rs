use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::customer::Customer;
use crate::services::registration::{CustomerDirectory, PreparedCustomer};

const CUSTOMER_COLUMNS: &str =
    "id, first_name, surname, email, landline, mobile, address, balance, created_at, updated_at";

#[derive(Clone)]
pub struct CustomerService {
    pool: PgPool,
}

impl CustomerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, prepared: PreparedCustomer) -> Result<Customer> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            INSERT INTO customers (first_name, surname, email, landline, mobile, address, balance)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(&prepared.first_name)
        .bind(&prepared.surname)
        .bind(&prepared.email)
        .bind(&prepared.landline)
        .bind(&prepared.mobile)
        .bind(&prepared.address)
        .bind(prepared.balance)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(customer_id = %customer.id, "Customer registered");
        Ok(customer)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    pub async fn list(&self) -> Result<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Customer not found".into()));
        }
        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(())
    }
}

#[async_trait]
impl CustomerDirectory for CustomerService {
    async fn contact_taken(&self, email: Option<String>, mobile: Option<String>) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE email = $1 OR mobile = $2)",
        )
        .bind(email)
        .bind(mobile)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }
}
