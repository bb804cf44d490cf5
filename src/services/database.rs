use anyhow::{anyhow, Result};
use serde::{de::DeserializeOwned, Serialize};
use surrealdb::engine::any::{self, Any};
use surrealdb::Surreal;
use thiserror::Error;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::{
    payment::RecurringPayment,
    subscription::Subscription,
    user::User,
};

const USERS: &str = "users";
const SUBSCRIPTIONS: &str = "subscriptions";
const RECURRING_PAYMENTS: &str = "recurring_payments";

#[derive(Debug, Error)]
#[error("User with email {0} already exists")]
pub struct DuplicateEmail(pub String);

#[derive(Clone)]
pub struct DatabaseService {
    db: Surreal<Any>,
}

impl DatabaseService {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let db = any::connect(config.url.as_str())
            .await
            .map_err(|e| anyhow!("Unable to open database {}: {}", config.url, e))?;

        db.use_ns(config.namespace.as_str())
            .use_db(config.name.as_str())
            .await?;

        let service = Self { db };
        service.initialize_schema().await?;

        Ok(service)
    }

    /// In-memory store, used by tests and local runs without `DATABASE_URL`.
    pub async fn in_memory() -> Result<Self> {
        Self::new(&DatabaseConfig {
            url: "mem://".to_string(),
            namespace: "expense_tracker".to_string(),
            name: "test".to_string(),
        })
        .await
    }

    async fn initialize_schema(&self) -> Result<()> {
        self.db
            .query(
                "
            DEFINE TABLE users SCHEMALESS;
            DEFINE INDEX unique_email ON users COLUMNS email UNIQUE;

            DEFINE TABLE subscriptions SCHEMALESS;
            DEFINE INDEX subscriptions_owner ON subscriptions COLUMNS owner;

            DEFINE TABLE recurring_payments SCHEMALESS;
            DEFINE INDEX recurring_payments_owner ON recurring_payments COLUMNS owner;
        ",
            )
            .await?
            .check()?;

        log::info!("Database schema initialized successfully");
        Ok(())
    }

    // Generic record plumbing. Records are keyed by their UUID and read back
    // with `meta::id` so the model's `id` field stays a plain UUID.

    async fn insert<T: Serialize>(&self, table: &str, id: &Uuid, record: &T) -> Result<()> {
        self.db
            .query("CREATE type::thing($table, $id) CONTENT $data RETURN NONE")
            .bind(("table", table))
            .bind(("id", id.to_string()))
            .bind(("data", document(record)?))
            .await?
            .check()?;
        Ok(())
    }

    async fn replace<T: Serialize>(&self, table: &str, id: &Uuid, record: &T) -> Result<()> {
        self.db
            .query("UPDATE type::thing($table, $id) CONTENT $data RETURN NONE")
            .bind(("table", table))
            .bind(("id", id.to_string()))
            .bind(("data", document(record)?))
            .await?
            .check()?;
        Ok(())
    }

    async fn find_owned<T: DeserializeOwned>(
        &self,
        table: &str,
        owner: &Uuid,
        id: &Uuid,
    ) -> Result<Option<T>> {
        let record: Option<T> = self
            .db
            .query(
                "SELECT *, meta::id(id) AS id FROM type::thing($table, $id) \
                 WHERE owner = $owner",
            )
            .bind(("table", table))
            .bind(("id", id.to_string()))
            .bind(("owner", owner.to_string()))
            .await?
            .take(0)?;
        Ok(record)
    }

    async fn list_owned<T: DeserializeOwned>(&self, table: &str, owner: &Uuid) -> Result<Vec<T>> {
        let records: Vec<T> = self
            .db
            .query(
                "SELECT *, meta::id(id) AS id FROM type::table($table) \
                 WHERE owner = $owner ORDER BY createdAt ASC",
            )
            .bind(("table", table))
            .bind(("owner", owner.to_string()))
            .await?
            .take(0)?;
        Ok(records)
    }

    async fn delete_owned(&self, table: &str, owner: &Uuid, id: &Uuid) -> Result<bool> {
        let deleted: Vec<serde_json::Value> = self
            .db
            .query("DELETE type::thing($table, $id) WHERE owner = $owner RETURN BEFORE")
            .bind(("table", table))
            .bind(("id", id.to_string()))
            .bind(("owner", owner.to_string()))
            .await?
            .take(0)?;
        Ok(!deleted.is_empty())
    }

    // User operations
    /// Fails with [`DuplicateEmail`] when the email is already registered,
    /// including when a concurrent registration wins the unique index.
    pub async fn create_user(&self, user: &User) -> Result<User> {
        if let Err(e) = self.insert(USERS, &user.id, user).await {
            if e.downcast_ref::<surrealdb::Error>().map_or(false, is_unique_violation) {
                return Err(DuplicateEmail(user.email.clone()).into());
            }
            return Err(e);
        }

        log::info!("Created user {}", user.id);
        Ok(user.clone())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user: Option<User> = self
            .db
            .query("SELECT *, meta::id(id) AS id FROM users WHERE email = $email LIMIT 1")
            .bind(("email", email))
            .await?
            .take(0)?;
        Ok(user)
    }

    // Subscription operations
    pub async fn create_subscription(&self, subscription: &Subscription) -> Result<Subscription> {
        self.insert(SUBSCRIPTIONS, &subscription.id, subscription).await?;
        log::info!("Created subscription {} for {}", subscription.id, subscription.owner);
        Ok(subscription.clone())
    }

    pub async fn get_subscription(&self, owner: &Uuid, id: &Uuid) -> Result<Option<Subscription>> {
        self.find_owned(SUBSCRIPTIONS, owner, id).await
    }

    pub async fn get_subscriptions_by_owner(&self, owner: &Uuid) -> Result<Vec<Subscription>> {
        self.list_owned(SUBSCRIPTIONS, owner).await
    }

    pub async fn update_subscription(&self, subscription: &Subscription) -> Result<Subscription> {
        self.replace(SUBSCRIPTIONS, &subscription.id, subscription).await?;
        Ok(subscription.clone())
    }

    pub async fn delete_subscription(&self, owner: &Uuid, id: &Uuid) -> Result<bool> {
        self.delete_owned(SUBSCRIPTIONS, owner, id).await
    }

    // Recurring payment operations
    pub async fn create_recurring_payment(
        &self,
        payment: &RecurringPayment,
    ) -> Result<RecurringPayment> {
        self.insert(RECURRING_PAYMENTS, &payment.id, payment).await?;
        log::info!(
            "Created recurring payment {} with {} installments for {}",
            payment.id,
            payment.installments.len(),
            payment.owner
        );
        Ok(payment.clone())
    }

    pub async fn get_recurring_payment(
        &self,
        owner: &Uuid,
        id: &Uuid,
    ) -> Result<Option<RecurringPayment>> {
        self.find_owned(RECURRING_PAYMENTS, owner, id).await
    }

    pub async fn get_recurring_payments_by_owner(
        &self,
        owner: &Uuid,
    ) -> Result<Vec<RecurringPayment>> {
        self.list_owned(RECURRING_PAYMENTS, owner).await
    }

    pub async fn update_recurring_payment(
        &self,
        payment: &RecurringPayment,
    ) -> Result<RecurringPayment> {
        self.replace(RECURRING_PAYMENTS, &payment.id, payment).await?;
        Ok(payment.clone())
    }

    pub async fn delete_recurring_payment(&self, owner: &Uuid, id: &Uuid) -> Result<bool> {
        self.delete_owned(RECURRING_PAYMENTS, owner, id).await
    }

    /// Both collections for one owner; fails as a whole if either read fails.
    pub async fn get_expense_records(
        &self,
        owner: &Uuid,
    ) -> Result<(Vec<Subscription>, Vec<RecurringPayment>)> {
        tokio::try_join!(
            self.get_subscriptions_by_owner(owner),
            self.get_recurring_payments_by_owner(owner),
        )
    }

    // Utility methods
    pub async fn health_check(&self) -> Result<()> {
        self.db.health().await?;
        Ok(())
    }
}

fn is_unique_violation(err: &surrealdb::Error) -> bool {
    matches!(err, surrealdb::Error::Db(surrealdb::error::Db::IndexExists { .. }))
        || err.to_string().contains("already contains")
}

/// Serializes a model for storage, leaving the record id to the key.
fn document<T: Serialize>(record: &T) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(record)?;
    value
        .as_object_mut()
        .ok_or_else(|| anyhow!("Records must serialize to an object"))?
        .remove("id");
    Ok(value)
}
