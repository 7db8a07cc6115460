use crate::{Result, client::Client, common, write};

use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Maximum number of items the service accepts in a single put request.
pub const MAX_PUT_ITEMS: usize = 25;

/// put items operation
#[derive(Debug, PartialEq, Serialize)]
struct PutItemsInput {
    #[serde(skip)]
    base_name: String,
    items: Vec<common::RawItem>,
}

#[derive(Debug, Default, Deserialize)]
struct PutItemsList {
    #[serde(default)]
    items: Vec<common::RawItem>,
}

#[derive(Debug, Default, Deserialize)]
struct PutItemsResponse {
    #[serde(default)]
    failed: PutItemsList,
    #[serde(default)]
    processed: PutItemsList,
}

/// Outcome of a put items operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PutItemsOutput<T> {
    /// Items the service failed to store.
    pub failed: Vec<T>,
    /// Items the service stored.
    pub processed: Vec<T>,
}

impl<T> PutItemsOutput<T> {
    /// Convert every item of the output.
    pub fn map<U>(self, f: impl Fn(T) -> U) -> PutItemsOutput<U> {
        PutItemsOutput {
            failed: self.failed.into_iter().map(&f).collect(),
            processed: self.processed.into_iter().map(&f).collect(),
        }
    }
}

/// Put items operation.
///
/// Stores several items in a single request, overwriting items whose key already exists.
///
/// ```rust,no_run
/// use deta_base_crud::{client::Client, write};
/// use serde_json::json;
///
/// # async fn example(client: &Client) -> deta_base_crud::Result<()> {
/// let put_items = write::put_item::PutItems {
///     items: vec![json!({"key": "1", "name": "John"})],
///     write_args: write::common::WriteArgs {
///         base_name: "users".to_string(),
///         ..Default::default()
///     },
/// };
/// put_items.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq)]
pub struct PutItems<T> {
    /// The items to put into the Base.
    pub items: Vec<T>,
    /// Additional write operation arguments (Base name, expiry).
    pub write_args: write::common::WriteArgs,
}

impl<T: Serialize> TryFrom<PutItems<T>> for PutItemsInput {
    type Error = crate::Error;

    fn try_from(put_items: PutItems<T>) -> Result<Self> {
        let write_operation: write::common::WriteInput = put_items.write_args.try_into()?;
        let mut items = Vec::with_capacity(put_items.items.len());
        for item in put_items.items {
            items.push(write_operation.prepare_item(item)?);
        }
        let operation = Self {
            base_name: write_operation.base_name,
            items,
        };
        Ok(operation)
    }
}

impl<T: Serialize> PutItems<T> {
    /// Execute the put items operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "deta_base_crud.put_items", skip_all, err)
    )]
    pub async fn send(self, client: &Client) -> Result<PutItemsOutput<common::RawItem>> {
        let put_items: PutItemsInput = self.try_into()?;
        if put_items.items.len() > MAX_PUT_ITEMS {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                count = put_items.items.len(),
                "only {MAX_PUT_ITEMS} items can be put at a time"
            );
        }
        let response: PutItemsResponse = client
            .send_json(
                Method::PUT,
                &put_items.base_name,
                &["items"],
                Some(&put_items),
            )
            .await?;
        let output = PutItemsOutput {
            failed: response.failed.items,
            processed: response.processed.items,
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client;

    use chrono::DateTime;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case::empty(
        PutItems {
            items: vec![
                json!(
                    {
                        "key": "a"
                    }
                ),
            ],
            write_args: write::common::WriteArgs {
                base_name: "b".to_string(),
                ..Default::default()
            },
        },
        json!(
            {
                "items": [
                    {
                        "key": "a"
                    }
                ]
            }
        )
    )]
    #[case::expiring(
        PutItems {
            items: vec![
                json!(
                    {
                        "key": "a"
                    }
                ),
                json!(
                    {
                        "c": 1
                    }
                ),
            ],
            write_args: write::common::WriteArgs {
                base_name: "b".to_string(),
                expiry: Some(
                    common::expiry::Expiry::At(
                        DateTime::from_timestamp(1_000, 0).unwrap()
                    )
                ),
            },
        },
        json!(
            {
                "items": [
                    {
                        "key": "a",
                        "__expires": 1_000
                    },
                    {
                        "c": 1,
                        "__expires": 1_000
                    }
                ]
            }
        )
    )]
    fn test_put_items(#[case] args: PutItems<Value>, #[case] expected: Value) {
        let actual: PutItemsInput = args.try_into().unwrap();
        assert_eq!(actual.base_name, "b");
        assert_eq!(serde_json::to_value(&actual).unwrap(), expected);
    }

    #[test]
    fn test_put_items_rejects_non_objects() {
        let put_items = PutItems {
            items: vec![json!(1)],
            write_args: write::common::WriteArgs {
                base_name: "b".to_string(),
                ..Default::default()
            },
        };
        let actual: Result<PutItemsInput> = put_items.try_into();
        assert!(matches!(actual, Err(crate::Error::NotAnObject(_))));
    }

    #[tokio::test]
    async fn test_put_items_send() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/v1/p/users/items")
            .match_body(mockito::Matcher::Json(json!({"items": [{"key": "a"}, {"key": "b"}]})))
            .with_status(207)
            .with_header("content-type", "application/json")
            .with_body(r#"{"processed":{"items":[{"key":"a"}]},"failed":{"items":[{"key":"b"}]}}"#)
            .expect(1)
            .create_async()
            .await;
        let mut client = client::Client::new(client::ClientArgs {
            project_key: Some("p_k".to_string()),
            host: server.url(),
            ..Default::default()
        })
        .unwrap();
        client.open().unwrap();
        let output = PutItems {
            items: vec![json!({"key": "a"}), json!({"key": "b"})],
            write_args: write::common::WriteArgs {
                base_name: "users".to_string(),
                ..Default::default()
            },
        }
        .send(&client)
        .await
        .unwrap();
        assert_eq!(output.processed.len(), 1);
        assert_eq!(output.failed[0].get("key"), Some(&json!("b")));
        mock.assert_async().await;
    }
}
