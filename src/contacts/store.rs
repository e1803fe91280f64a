use tracing::debug;

use crate::contacts::{Contact, ContactDraft, ContactError};
use crate::db::schema::{ContactOwnerRecord, ContactRecord};
use crate::db::{Db, next_id};
use crate::types::{ContactId, UserId};

/// Contact store for database operations.
///
/// Every query carries a `user_id = $user_id` predicate.
#[derive(Clone)]
pub struct ContactStore {
    db: Db,
}

impl ContactStore {
    /// Create a new contact store.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert a contact owned by `owner` and return its ID.
    ///
    /// Validation runs before anything is written.
    pub async fn create(
        &self,
        owner: UserId,
        draft: &ContactDraft,
    ) -> Result<ContactId, ContactError> {
        draft.validate()?;

        let id = next_id(&self.db, "contact").await?;

        let query = r#"
            CREATE type::thing('contact', $id) CONTENT {
                user_id: $user_id,
                name: $name,
                phone_number: $phone_number,
                email: $email,
                address: $address
            }
        "#;

        self.db
            .query(query)
            .bind(("id", id))
            .bind(("user_id", owner.get()))
            .bind(("name", draft.name.clone()))
            .bind(("phone_number", draft.phone_number.clone()))
            .bind(("email", draft.email.clone()))
            .bind(("address", draft.address.clone()))
            .await?
            .check()?;

        debug!(contact_id = id, user_id = %owner, "Contact created");
        Ok(ContactId::new(id))
    }

    /// Fetch one of the caller's contacts.
    pub async fn get(&self, owner: UserId, id: ContactId) -> Result<Contact, ContactError> {
        let query = r#"
            SELECT record::id(id) AS id, name, phone_number, email, address
            FROM type::thing('contact', $id)
            WHERE user_id = $user_id
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("id", id.get()))
            .bind(("user_id", owner.get()))
            .await?;

        let rows: Vec<ContactRecord> = res.take(0)?;
        rows.into_iter()
            .next()
            .map(Contact::from)
            .ok_or(ContactError::NotFound(id))
    }

    /// All of the caller's contacts, ordered by ID.
    pub async fn list(&self, owner: UserId) -> Result<Vec<Contact>, ContactError> {
        let query = r#"
            SELECT record::id(id) AS id, name, phone_number, email, address
            FROM contact
            WHERE user_id = $user_id
            ORDER BY id
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("user_id", owner.get()))
            .await?;

        let rows: Vec<ContactRecord> = res.take(0)?;
        Ok(rows.into_iter().map(Contact::from).collect())
    }

    /// Replace every field of one of the caller's contacts.
    pub async fn update(
        &self,
        owner: UserId,
        id: ContactId,
        draft: &ContactDraft,
    ) -> Result<(), ContactError> {
        draft.validate()?;

        let query = r#"
            UPDATE type::thing('contact', $id) SET
                name = $name,
                phone_number = $phone_number,
                email = $email,
                address = $address
            WHERE user_id = $user_id
            RETURN AFTER
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("id", id.get()))
            .bind(("user_id", owner.get()))
            .bind(("name", draft.name.clone()))
            .bind(("phone_number", draft.phone_number.clone()))
            .bind(("email", draft.email.clone()))
            .bind(("address", draft.address.clone()))
            .await?;

        let updated: Vec<ContactOwnerRecord> = res.take(0)?;
        if updated.is_empty() {
            return Err(ContactError::NotFound(id));
        }

        Ok(())
    }

    /// Delete one of the caller's contacts.
    pub async fn delete(&self, owner: UserId, id: ContactId) -> Result<(), ContactError> {
        let query = r#"
            DELETE type::thing('contact', $id)
            WHERE user_id = $user_id
            RETURN BEFORE
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("id", id.get()))
            .bind(("user_id", owner.get()))
            .await?;

        let deleted: Vec<ContactOwnerRecord> = res.take(0)?;
        if deleted.is_empty() {
            return Err(ContactError::NotFound(id));
        }

        Ok(())
    }

    /// The caller's contacts where `term` is a case-insensitive substring of
    /// any text field. The empty term returns everything.
    pub async fn search(&self, owner: UserId, term: &str) -> Result<Vec<Contact>, ContactError> {
        let contacts = self.list(owner).await?;
        Ok(contacts.into_iter().filter(|c| c.matches(term)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DatabaseConfig, create_connection, ensure_schema};

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    async fn setup() -> ContactStore {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        ContactStore::new(db)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = setup().await;
        let draft = ContactDraft::new("John Doe", "123")
            .with_email("john@example.com")
            .with_address("1 Main St");

        let id = store.create(ALICE, &draft).await.unwrap();
        assert!(id.get() > 0);

        let contact = store.get(ALICE, id).await.unwrap();
        assert_eq!(contact.id, id);
        assert_eq!(contact.name, "John Doe");
        assert_eq!(contact.phone_number, "123");
        assert_eq!(contact.email.as_deref(), Some("john@example.com"));
        assert_eq!(contact.address.as_deref(), Some("1 Main St"));
    }

    #[tokio::test]
    async fn test_create_without_optional_fields() {
        let store = setup().await;
        let id = store
            .create(ALICE, &ContactDraft::new("Jane", "456"))
            .await
            .unwrap();

        let contact = store.get(ALICE, id).await.unwrap();
        assert!(contact.email.is_none());
        assert!(contact.address.is_none());
    }

    #[tokio::test]
    async fn test_create_validation_writes_nothing() {
        let store = setup().await;

        let result = store.create(ALICE, &ContactDraft::new("", "123")).await;
        assert_eq!(result.unwrap_err(), ContactError::MissingField("name"));
        assert!(store.list(ALICE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = setup().await;
        let result = store.get(ALICE, ContactId::new(999)).await;
        assert_eq!(result.unwrap_err(), ContactError::NotFound(ContactId::new(999)));
    }

    #[tokio::test]
    async fn test_foreign_contact_is_not_found() {
        let store = setup().await;
        let id = store
            .create(ALICE, &ContactDraft::new("Secret", "000"))
            .await
            .unwrap();

        assert_eq!(
            store.get(BOB, id).await.unwrap_err(),
            ContactError::NotFound(id)
        );
        assert_eq!(
            store
                .update(BOB, id, &ContactDraft::new("Hijack", "111"))
                .await
                .unwrap_err(),
            ContactError::NotFound(id)
        );
        assert_eq!(
            store.delete(BOB, id).await.unwrap_err(),
            ContactError::NotFound(id)
        );
        assert!(store.search(BOB, "").await.unwrap().is_empty());

        // Untouched for the owner
        let contact = store.get(ALICE, id).await.unwrap();
        assert_eq!(contact.name, "Secret");
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped() {
        let store = setup().await;
        let a1 = store.create(ALICE, &ContactDraft::new("A1", "1")).await.unwrap();
        store.create(BOB, &ContactDraft::new("B1", "2")).await.unwrap();
        let a2 = store.create(ALICE, &ContactDraft::new("A2", "3")).await.unwrap();

        let ids: Vec<ContactId> = store
            .list(ALICE)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![a1, a2]);
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let store = setup().await;
        let id = store
            .create(
                ALICE,
                &ContactDraft::new("John", "1").with_email("j@example.com"),
            )
            .await
            .unwrap();

        store
            .update(ALICE, id, &ContactDraft::new("John Smith", "2").with_address("Oak St"))
            .await
            .unwrap();

        let contact = store.get(ALICE, id).await.unwrap();
        assert_eq!(contact.name, "John Smith");
        assert_eq!(contact.phone_number, "2");
        assert!(contact.email.is_none());
        assert_eq!(contact.address.as_deref(), Some("Oak St"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = setup().await;
        let result = store
            .update(ALICE, ContactId::new(5), &ContactDraft::new("X", "1"))
            .await;
        assert_eq!(result.unwrap_err(), ContactError::NotFound(ContactId::new(5)));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let store = setup().await;
        let id = store.create(ALICE, &ContactDraft::new("Gone", "1")).await.unwrap();

        store.delete(ALICE, id).await.unwrap();

        assert_eq!(
            store.get(ALICE, id).await.unwrap_err(),
            ContactError::NotFound(id)
        );
        assert_eq!(
            store.delete(ALICE, id).await.unwrap_err(),
            ContactError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn test_search() {
        let store = setup().await;
        store
            .create(ALICE, &ContactDraft::new("John Doe", "111").with_email("JD@mail.com"))
            .await
            .unwrap();
        store
            .create(ALICE, &ContactDraft::new("Jane Roe", "222").with_address("Elm Street"))
            .await
            .unwrap();
        store
            .create(BOB, &ContactDraft::new("John Bob", "333"))
            .await
            .unwrap();

        let names = |found: Vec<Contact>| found.into_iter().map(|c| c.name).collect::<Vec<_>>();

        assert_eq!(names(store.search(ALICE, "JOHN").await.unwrap()), vec!["John Doe"]);
        assert_eq!(names(store.search(ALICE, "jd@").await.unwrap()), vec!["John Doe"]);
        assert_eq!(names(store.search(ALICE, "street").await.unwrap()), vec!["Jane Roe"]);
        assert_eq!(names(store.search(ALICE, "22").await.unwrap()), vec!["Jane Roe"]);
        assert_eq!(store.search(ALICE, "").await.unwrap().len(), 2);
        assert!(store.search(ALICE, "zzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_are_unique_across_owners() {
        let store = setup().await;
        let a = store.create(ALICE, &ContactDraft::new("A", "1")).await.unwrap();
        let b = store.create(BOB, &ContactDraft::new("B", "2")).await.unwrap();
        assert_ne!(a, b);
    }
}
