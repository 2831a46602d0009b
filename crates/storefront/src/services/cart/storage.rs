//! Session-backed cart storage.

use tower_sessions::Session;

use sessioncart_core::{CartLineItem, CartStorage};

/// Cart storage kept inside the caller's HTTP session record.
///
/// The cart is a JSON list under one namespaced key. Writing it marks the
/// session modified, and the session layer flushes the record to its store
/// when the response is sent.
#[derive(Debug, Clone)]
pub struct SessionCartStorage {
    session: Session,
    key: String,
}

impl SessionCartStorage {
    /// Bind a session and the key the cart lives under.
    #[must_use]
    pub fn new(session: Session, key: impl Into<String>) -> Self {
        Self {
            session,
            key: key.into(),
        }
    }
}

impl CartStorage for SessionCartStorage {
    type Error = tower_sessions::session::Error;

    async fn load(&self) -> Result<Vec<CartLineItem>, Self::Error> {
        Ok(self
            .session
            .get::<Vec<CartLineItem>>(&self.key)
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, items: &[CartLineItem]) -> Result<(), Self::Error> {
        self.session.insert(&self.key, items).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use sessioncart_core::{LineItemId, Price, ProductSnapshot};

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn item(id: i32, title: &str) -> CartLineItem {
        CartLineItem::new(
            LineItemId::new(id),
            ProductSnapshot::new(title, Price::from_cents(1000)),
            1,
        )
    }

    #[tokio::test]
    async fn test_load_without_cart_is_empty() {
        let storage = SessionCartStorage::new(session(), "cart");

        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let storage = SessionCartStorage::new(session(), "cart");

        storage.save(&[item(1, "A"), item(2, "B")]).await.unwrap();

        assert_eq!(
            storage.load().await.unwrap(),
            vec![item(1, "A"), item(2, "B")]
        );
    }

    #[tokio::test]
    async fn test_save_marks_session_modified() {
        let session = session();
        let storage = SessionCartStorage::new(session.clone(), "cart");
        assert!(!session.is_modified());

        storage.save(&[item(1, "A")]).await.unwrap();

        assert!(session.is_modified());
    }

    #[tokio::test]
    async fn test_key_namespaces_the_cart() {
        let session = session();
        let carts = SessionCartStorage::new(session.clone(), "cart");
        let wishlist = SessionCartStorage::new(session, "wishlist");

        carts.save(&[item(1, "A")]).await.unwrap();

        assert!(wishlist.load().await.unwrap().is_empty());
        assert_eq!(carts.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_of_load_is_a_no_op() {
        let storage = SessionCartStorage::new(session(), "cart");
        storage.save(&[item(1, "A"), item(3, "C")]).await.unwrap();
        let before = storage.load().await.unwrap();

        let loaded = storage.load().await.unwrap();
        storage.save(&loaded).await.unwrap();

        assert_eq!(storage.load().await.unwrap(), before);
    }
}
