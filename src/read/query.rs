use crate::{Result, client::Client, common, read};

use serde::Serialize;

/// Query operation.
///
/// ```rust,no_run
/// use deta_base_crud::{client::Client, common, read};
///
/// # async fn example(client: &Client) -> deta_base_crud::Result<()> {
/// let query = read::query::Query {
///     condition: Some(common::condition::ConditionMap::Leaves(
///         common::condition::LogicalOperator::And,
///         vec![common::condition::KeyCondition {
///             name: "age".to_string(),
///             condition: common::condition::Condition::GreaterThan(18),
///         }],
///     )),
///     read_args: read::common::ReadArgs {
///         base_name: "users".to_string(),
///         limit: Some(10),
///         ..Default::default()
///     },
/// };
/// let page = query.send(client).await?;
/// let next = page.next(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query<T> {
    /// Filter to apply. `None` returns every item of the Base.
    pub condition: Option<common::condition::ConditionMap<T>>,
    /// Additional read operation arguments (Base name, limit, cursor).
    pub read_args: read::common::ReadArgs,
}

impl<T: Serialize> TryFrom<Query<T>> for read::common::QueryInput {
    type Error = crate::Error;

    fn try_from(query: Query<T>) -> Result<Self> {
        let query_items = match query.condition {
            Some(condition) => condition.into_query()?,
            None => None,
        };
        let operation = Self {
            base_name: query.read_args.base_name,
            last: query.read_args.last,
            limit: query.read_args.limit.filter(|limit| *limit > 0),
            query: query_items,
        };
        Ok(operation)
    }
}

impl<T: Serialize> Query<T> {
    /// Execute the query operation, returning the first page.
    pub async fn send(self, client: &Client) -> Result<read::common::Page<common::RawItem>> {
        self.send_as(client).await
    }

    /// Execute the query operation, converting the items of the first page.
    pub async fn send_as<I: common::FromItem>(
        self,
        client: &Client,
    ) -> Result<read::common::Page<I>> {
        let query: read::common::QueryInput = self.try_into()?;
        query.fetch(client).await
    }

    /// Execute the query operation and follow every page, returning all items.
    pub async fn send_all(self, client: &Client) -> Result<Vec<common::RawItem>> {
        self.send(client).await?.collect_all(client).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client;

    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case::empty(
        Query {
            read_args: read::common::ReadArgs {
                base_name: "a".to_string(),
                ..Default::default()
            },
            ..Default::default()
        },
        json!({})
    )]
    #[case::zero_limit_is_omitted(
        Query {
            read_args: read::common::ReadArgs {
                base_name: "a".to_string(),
                limit: Some(0),
                ..Default::default()
            },
            ..Default::default()
        },
        json!({})
    )]
    #[case::full(
        Query {
            condition: Some(
                common::condition::ConditionMap::Leaves(
                    common::condition::LogicalOperator::Or,
                    vec![
                        common::condition::KeyCondition {
                            name: "b".to_string(),
                            condition: common::condition::Condition::Equals(
                                json!("c")
                            ),
                        },
                        common::condition::KeyCondition {
                            name: "d".to_string(),
                            condition: common::condition::Condition::LessThanOrEqual(
                                json!(5)
                            ),
                        },
                    ]
                )
            ),
            read_args: read::common::ReadArgs {
                base_name: "a".to_string(),
                last: Some(
                    "e".to_string()
                ),
                limit: Some(
                    10
                ),
            },
        },
        json!(
            {
                "query": [
                    {
                        "b": "c"
                    },
                    {
                        "d?lte": 5
                    }
                ],
                "limit": 10,
                "last": "e"
            }
        )
    )]
    fn test_query(#[case] args: Query<Value>, #[case] expected: Value) {
        let actual: read::common::QueryInput = args.try_into().unwrap();
        assert_eq!(actual.base_name, "a");
        assert_eq!(serde_json::to_value(&actual).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_query_follows_pages() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/v1/p/users/query")
            .match_body(mockito::Matcher::Json(json!({"query": [{"age?gt": 1}], "limit": 1})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"paging":{"size":1,"last":"a"},"items":[{"key":"a","age":2}]}"#)
            .expect(2)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/v1/p/users/query")
            .match_body(mockito::Matcher::Json(
                json!({"query": [{"age?gt": 1}], "limit": 1, "last": "a"}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"paging":{"size":1},"items":[{"key":"b","age":3}]}"#)
            .expect(2)
            .create_async()
            .await;
        let mut client = client::Client::new(client::ClientArgs {
            project_key: Some("p_k".to_string()),
            host: server.url(),
            ..Default::default()
        })
        .unwrap();
        client.open().unwrap();
        let query = Query {
            condition: Some(common::condition::ConditionMap::Leaves(
                common::condition::LogicalOperator::And,
                vec![common::condition::KeyCondition {
                    name: "age".to_string(),
                    condition: common::condition::Condition::GreaterThan(1),
                }],
            )),
            read_args: read::common::ReadArgs {
                base_name: "users".to_string(),
                limit: Some(1),
                ..Default::default()
            },
        };
        let page = query.clone().send(&client).await.unwrap();
        assert!(page.has_next());
        assert_eq!(page.size, 1);
        let next = page.next(&client).await.unwrap().unwrap();
        assert!(!next.has_next());
        assert_eq!(next.items[0].get("key"), Some(&json!("b")));
        assert!(next.next(&client).await.unwrap().is_none());

        let all = query.send_all(&client).await.unwrap();
        let keys: Vec<_> = all.iter().map(|item| item["key"].clone()).collect();
        assert_eq!(keys, vec![json!("a"), json!("b")]);
        first.assert_async().await;
        second.assert_async().await;
    }
}
