use crate::{Result, client::Client, common, write};

use reqwest::Method;
use serde::Serialize;

/// insert item operation
#[derive(Debug, PartialEq, Serialize)]
struct InsertItemInput {
    #[serde(skip)]
    base_name: String,
    item: common::RawItem,
}

/// Insert item operation.
///
/// Creates a new item only if no item with the same key exists. The service
/// generates a key when the item has none.
///
/// ```rust,no_run
/// use deta_base_crud::{client::Client, write};
/// use serde_json::json;
///
/// # async fn example(client: &Client) -> deta_base_crud::Result<()> {
/// let insert_item = write::insert_item::InsertItem {
///     item: json!({"name": "John"}),
///     write_args: write::common::WriteArgs {
///         base_name: "users".to_string(),
///         ..Default::default()
///     },
/// };
/// let stored = insert_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq)]
pub struct InsertItem<T> {
    /// The item to insert into the Base.
    pub item: T,
    /// Additional write operation arguments (Base name, expiry).
    pub write_args: write::common::WriteArgs,
}

impl<T: Serialize> TryFrom<InsertItem<T>> for InsertItemInput {
    type Error = crate::Error;

    fn try_from(insert_item: InsertItem<T>) -> Result<Self> {
        let write_operation: write::common::WriteInput = insert_item.write_args.try_into()?;
        let item = write_operation.prepare_item(insert_item.item)?;
        let operation = Self {
            base_name: write_operation.base_name,
            item,
        };
        Ok(operation)
    }
}

impl<T: Serialize> InsertItem<T> {
    /// Execute the insert item operation, returning the stored item.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "deta_base_crud.insert_item", skip_all, err)
    )]
    pub async fn send(self, client: &Client) -> Result<common::RawItem> {
        let insert_item: InsertItemInput = self.try_into()?;
        client
            .send_json(
                Method::POST,
                &insert_item.base_name,
                &["items"],
                Some(&insert_item),
            )
            .await
    }
}
