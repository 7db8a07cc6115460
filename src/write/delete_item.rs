use crate::{Result, client::Client, common};

use reqwest::Method;

/// Delete item operation.
///
/// Deleting a key that does not exist succeeds.
///
/// ```rust,no_run
/// use deta_base_crud::{client::Client, common, write};
///
/// # async fn example(client: &Client) -> deta_base_crud::Result<()> {
/// let delete_item = write::delete_item::DeleteItem {
///     key: common::key::Key::from("1"),
///     base_name: "users".to_string(),
/// };
/// delete_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeleteItem {
    /// The key of the item to delete.
    pub key: common::key::Key,
    /// The name of the Base to delete from.
    pub base_name: String,
}

impl DeleteItem {
    /// Execute the delete item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "deta_base_crud.delete_item", err)
    )]
    pub async fn send(self, client: &Client) -> Result<()> {
        let response = client
            .execute::<()>(Method::DELETE, &self.base_name, &["items", &*self.key], None)
            .await?;
        Client::check(response).await?;
        Ok(())
    }
}
