use crate::{Result, client::Client, common};

use reqwest::{Method, StatusCode};

/// Get item operation.
///
/// ```rust,no_run
/// use deta_base_crud::{client::Client, common, read};
///
/// # async fn example(client: &Client) -> deta_base_crud::Result<()> {
/// let get_item = read::get_item::GetItem {
///     key: common::key::Key::from("1"),
///     base_name: "users".to_string(),
/// };
/// if let Some(item) = get_item.send(client).await? {
///     println!("{item:?}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GetItem {
    /// The key of the item to retrieve.
    pub key: common::key::Key,
    /// The name of the Base to read from.
    pub base_name: String,
}

impl GetItem {
    /// Execute the get item operation.
    ///
    /// Returns `None` when no item has the key.
    pub async fn send(self, client: &Client) -> Result<Option<common::RawItem>> {
        self.send_as(client).await
    }

    /// Execute the get item operation, converting the item.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "deta_base_crud.get_item", skip(client), err)
    )]
    pub async fn send_as<T: common::FromItem>(self, client: &Client) -> Result<Option<T>> {
        let response = client
            .execute::<()>(Method::GET, &self.base_name, &["items", &*self.key], None)
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let item: common::RawItem = Client::decode(response).await?;
        Ok(Some(T::from_item(item)))
    }
}
