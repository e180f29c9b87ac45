//! Customer repository.

use std::ops::Deref;

use async_trait::async_trait;

use crate::context::DatabaseContext;
use crate::di::{FromContext, FromRef};
use crate::error::AppError;
use crate::models::Customer;
use crate::repositories::Repository;
use crate::store::{Field, FindOptions, SortOrder};

/// Typed entry point for [`Customer`] documents.
///
/// Derefs to [`Repository<Customer>`] for the generic operations.
#[derive(FromContext, Clone, Debug)]
pub struct CustomerRepository {
    customers: Repository<Customer>,
}

impl CustomerRepository {
    pub fn new(ctx: &DatabaseContext) -> Self {
        Self::from_ref(ctx)
    }
}

impl Deref for CustomerRepository {
    type Target = Repository<Customer>;

    fn deref(&self) -> &Self::Target {
        &self.customers
    }
}

/// Customer-specific lookups layered on the generic operations.
#[async_trait]
pub trait CustomerQueries {
    /// Customers with exactly this name, ordered by creation time.
    async fn find_by_name(&self, name: &str) -> Result<Vec<Customer>, AppError>;

    async fn name_exists(&self, name: &str) -> Result<bool, AppError>;

    /// The customer registered under an email address.
    ///
    /// Emails are expected to be unique; a duplicate surfaces as
    /// [`AppError::MultipleResults`].
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, AppError>;
}

#[async_trait]
impl CustomerQueries for CustomerRepository {
    async fn find_by_name(&self, name: &str) -> Result<Vec<Customer>, AppError> {
        self.customers
            .find(
                Field::new("name").eq(name),
                FindOptions::new().sort_by("created_at", SortOrder::Ascending),
            )
            .await
    }

    async fn name_exists(&self, name: &str) -> Result<bool, AppError> {
        self.customers.any_where(Field::new("name").eq(name)).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        self.customers
            .single_or_default(Field::new("email").eq(email))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> CustomerRepository {
        let ctx = DatabaseContext::connect("memory://localhost/crm").await.unwrap();
        CustomerRepository::new(&ctx)
    }

    #[tokio::test]
    async fn test_bound_to_customer_collection() {
        let repo = repo().await;
        assert_eq!(repo.collection_name(), "Customer");
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let repo = repo().await;
        repo.add_range(&mut [
            Customer::new("Ada"),
            Customer::new("Grace"),
            Customer::new("Ada").with_email("ada@example.com"),
        ])
        .await
        .unwrap();

        let adas = repo.find_by_name("Ada").await.unwrap();
        assert_eq!(adas.len(), 2);
        assert!(adas.iter().all(|c| c.name == "Ada"));
        assert!(repo.name_exists("Grace").await.unwrap());
        assert!(!repo.name_exists("Alan").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let repo = repo().await;
        repo.add(&mut Customer::new("Ada").with_email("ada@example.com"))
            .await
            .unwrap();

        let found = repo.find_by_email("ada@example.com").await.unwrap();
        assert_eq!(found.map(|c| c.name), Some("Ada".to_string()));
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());

        repo.add(&mut Customer::new("Ada 2").with_email("ada@example.com"))
            .await
            .unwrap();
        assert!(matches!(
            repo.find_by_email("ada@example.com").await,
            Err(AppError::MultipleResults { .. })
        ));
    }
}
