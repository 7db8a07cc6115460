use crate::{
    Result,
    client::Client,
    common::{self, condition, expiry, key},
    model::{field::Field, item::Item},
    read, write,
};

use serde_json::Value;
use std::marker;

/// A Deta "Base": one model, stored in the Base named [`Base::NAME`].
///
/// ```rust
/// use deta_base_crud::{common::RawItem, model::{base::Base, field::Field}};
/// use serde_json::json;
///
/// struct User;
///
/// impl User {
///     const NAME: Field<String> = Field::new("name");
///     const ACTIVE: Field<bool> = Field::new("active");
/// }
///
/// impl Base for User {
///     const NAME: &'static str = "users";
///
///     fn defaults() -> RawItem {
///         RawItem::from_iter([("active".to_string(), json!(true))])
///     }
/// }
/// ```
pub trait Base {
    /// The name of the Base on the service.
    const NAME: &'static str;

    /// The key every item carries.
    const KEY: Field<String> = Field::new(key::KEY_ATTRIBUTE);

    /// Values given to items that don't set the attribute themselves.
    fn defaults() -> common::RawItem {
        common::RawItem::new()
    }
}

/// Typed operations on the items of a registered [`Base`].
///
/// Obtained from [`Client::base`].
pub struct BaseClient<'a, B> {
    client: &'a Client,
    expiry: Option<expiry::Expiry>,
    _base: marker::PhantomData<fn() -> B>,
}

impl<B> Clone for BaseClient<'_, B> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            expiry: self.expiry,
            _base: marker::PhantomData,
        }
    }
}

impl<'a, B: Base> BaseClient<'a, B> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            expiry: None,
            _base: marker::PhantomData,
        }
    }

    /// Make items written through this handle expire.
    pub fn expiring(mut self, expiry: expiry::Expiry) -> Self {
        self.expiry = Some(expiry);
        self
    }

    fn write_args(&self) -> write::common::WriteArgs {
        write::common::WriteArgs {
            base_name: B::NAME.to_string(),
            expiry: self.expiry,
        }
    }

    /// Insert an item, failing if its key is already taken.
    ///
    /// Returns the stored item, defaults and generated key included.
    pub async fn insert(&self, item: Item<B>) -> Result<Item<B>> {
        let stored = write::insert_item::InsertItem {
            item,
            write_args: self.write_args(),
        }
        .send(self.client)
        .await?;
        Ok(Item::from_raw(stored))
    }

    /// Store several items, overwriting items with the same key.
    pub async fn put(&self, items: Vec<Item<B>>) -> Result<write::put_item::PutItemsOutput<Item<B>>> {
        let output = write::put_item::PutItems {
            items,
            write_args: self.write_args(),
        }
        .send(self.client)
        .await?;
        Ok(output.map(Item::from_raw))
    }

    /// Fetch the item with the given key.
    pub async fn get(&self, key: impl Into<key::Key>) -> Result<Option<Item<B>>> {
        read::get_item::GetItem {
            key: key.into(),
            base_name: B::NAME.to_string(),
        }
        .send_as(self.client)
        .await
    }

    /// Delete the item with the given key.
    pub async fn delete(&self, key: impl Into<key::Key>) -> Result<()> {
        write::delete_item::DeleteItem {
            key: key.into(),
            base_name: B::NAME.to_string(),
        }
        .send(self.client)
        .await
    }

    /// Update a stored item.
    ///
    /// Returns a new item predicting the stored state after the update; `item` is
    /// left as it was.
    pub async fn update(
        &self,
        item: &Item<B>,
        update_expression: write::update_item::UpdateExpressionMap<Value>,
    ) -> Result<Item<B>> {
        let payload = write::update_item::UpdateItem {
            key: item.key()?,
            update_expression,
            base_name: B::NAME.to_string(),
        }
        .send(self.client)
        .await?;
        item.apply(&payload)
    }

    /// Query the Base, returning the first page.
    ///
    /// `None` as condition returns every item.
    pub async fn query(
        &self,
        condition: Option<condition::ConditionMap<Value>>,
        limit: Option<u32>,
    ) -> Result<read::common::Page<Item<B>>> {
        read::query::Query {
            condition,
            read_args: read::common::ReadArgs {
                base_name: B::NAME.to_string(),
                limit,
                ..Default::default()
            },
        }
        .send_as(self.client)
        .await
    }

    /// Query the Base and follow every page.
    pub async fn query_all(
        &self,
        condition: Option<condition::ConditionMap<Value>>,
    ) -> Result<Vec<Item<B>>> {
        self.query(condition, None)
            .await?
            .collect_all(self.client)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, client};

    use chrono::DateTime;
    use serde_json::json;

    struct User;

    impl User {
        const NAME: Field<String> = Field::new("name");
        const AGE: Field<i64> = Field::new("age");
        const TAGS: Field<Vec<String>> = Field::new("tags");
    }

    impl Base for User {
        const NAME: &'static str = "users";

        fn defaults() -> common::RawItem {
            common::RawItem::from_iter([
                ("age".to_string(), json!(0)),
                ("tags".to_string(), json!([])),
            ])
        }
    }

    struct Unregistered;

    impl Base for Unregistered {
        const NAME: &'static str = "other";
    }

    fn client(server: &mockito::Server) -> client::Client {
        let mut client = client::Client::new(client::ClientArgs {
            project_key: Some("p_k".to_string()),
            bases: vec!["users".to_string()],
            host: server.url(),
            ..Default::default()
        })
        .unwrap();
        client.open().unwrap();
        client
    }

    #[tokio::test]
    async fn test_unregistered_base() {
        let server = mockito::Server::new_async().await;
        let client = client(&server);
        assert!(client.base::<User>().is_ok());
        assert!(matches!(
            client.base::<Unregistered>(),
            Err(Error::UnregisteredBase(name)) if name == "other"
        ));
    }

    #[tokio::test]
    async fn test_insert_populates_defaults() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/p/users/items")
            .match_body(mockito::Matcher::Json(json!({
                "item": {"name": "a", "age": 0, "tags": [], "__expires": 500}
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"key":"k1","name":"a","age":0,"tags":[],"__expires":500}"#)
            .expect(1)
            .create_async()
            .await;
        let client = client(&server);
        let users = client
            .base::<User>()
            .unwrap()
            .expiring(expiry::Expiry::At(DateTime::from_timestamp(500, 0).unwrap()));
        let stored = users
            .insert(Item::new().with(&User::NAME, "a"))
            .await
            .unwrap();
        assert_eq!(stored.get(&User::KEY).unwrap(), "k1");
        assert_eq!(stored.get(&User::AGE).unwrap(), 0);
        assert_eq!(stored.get(&User::TAGS).unwrap(), Vec::<String>::new());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_returns_projected_item() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/v1/p/users/items/k1")
            .match_body(mockito::Matcher::Json(json!({
                "set": {"name": "b"},
                "increment": {"age": 2},
                "append": {"tags": ["x"]},
                "prepend": {},
                "delete": [],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"key":"k1"}"#)
            .expect(1)
            .create_async()
            .await;
        let client = client(&server);
        let users = client.base::<User>().unwrap();
        let item: Item<User> = Item::from_raw(
            common::to_raw_item(json!({"key": "k1", "name": "a", "age": 1, "tags": []})).unwrap(),
        );
        let updated = users
            .update(
                &item,
                write::update_item::UpdateExpressionMap::Combined(vec![
                    User::NAME.set("b"),
                    User::AGE.increment(2),
                    User::TAGS.append(vec!["x".to_string()]),
                ]),
            )
            .await
            .unwrap();
        assert_eq!(updated.get(&User::NAME).unwrap(), "b");
        assert_eq!(updated.get(&User::AGE).unwrap(), 3);
        assert_eq!(updated.get(&User::TAGS).unwrap(), vec!["x".to_string()]);
        assert_eq!(item.get(&User::NAME).unwrap(), "a");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_requires_key() {
        let server = mockito::Server::new_async().await;
        let client = client(&server);
        let users = client.base::<User>().unwrap();
        let result = users.update(&Item::new(), User::NAME.delete()).await;
        assert!(matches!(result, Err(Error::MissingField(name)) if name == "key"));
    }

    #[tokio::test]
    async fn test_query_and_get() {
        let mut server = mockito::Server::new_async().await;
        let query = server
            .mock("POST", "/v1/p/users/query")
            .match_body(mockito::Matcher::Json(json!({"query": [{"age?gte": 18}]})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"paging":{"size":2},"items":[{"key":"a","age":20},{"key":"b","age":30}]}"#)
            .expect(1)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/v1/p/users/items/a")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"key":"a","age":20}"#)
            .expect(1)
            .create_async()
            .await;
        let client = client(&server);
        let users = client.base::<User>().unwrap();
        let adults = users
            .query_all(Some(User::AGE.greater_than_or_equal(18)))
            .await
            .unwrap();
        let ages: Vec<i64> = adults
            .iter()
            .map(|user| user.get(&User::AGE).unwrap())
            .collect();
        assert_eq!(ages, vec![20, 30]);
        let user = users.get("a").await.unwrap().unwrap();
        assert!(matches!(
            user.get(&User::NAME),
            Err(Error::MissingField(name)) if name == "name"
        ));
        query.assert_async().await;
        get.assert_async().await;
    }
}
