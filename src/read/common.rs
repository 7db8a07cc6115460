use crate::{Result, client::Client, common};

use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Arguments for multiple-item read operations (Query).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReadArgs {
    /// The name of the Base to read from.
    pub base_name: String,
    /// The key of the last item of the previous page.
    ///
    /// Used to continue a previous Query from where it left off. Typically obtained
    /// from [`Page::last`].
    pub last: Option<String>,
    /// The maximum number of items in a page.
    ///
    /// `None` or `Some(0)` lets the service choose the page size.
    pub limit: Option<u32>,
}

/// Internal representation of a query request, ready to be sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub(crate) struct QueryInput {
    #[serde(skip)]
    pub(crate) base_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) last: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) query: Option<Vec<common::RawItem>>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    last: Option<String>,
    size: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    items: Vec<common::RawItem>,
    paging: Paging,
}

impl QueryInput {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "deta_base_crud.query", skip_all, fields(base = %self.base_name), err)
    )]
    pub(crate) async fn fetch<T: common::FromItem>(self, client: &Client) -> Result<Page<T>> {
        let response: QueryResponse = client
            .send_json(Method::POST, &self.base_name, &["query"], Some(&self))
            .await?;
        let page = Page {
            items: response.items.into_iter().map(T::from_item).collect(),
            last: response.paging.last.filter(|last| !last.is_empty()),
            size: response.paging.size,
            input: self,
        };
        Ok(page)
    }
}

/// One batch of query results plus the cursor to the next batch.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    /// The items of this page.
    pub items: Vec<T>,
    /// The key of the last item, present while more pages remain.
    pub last: Option<String>,
    /// The number of items in this page, as reported by the service.
    pub size: usize,
    input: QueryInput,
}

impl<T: common::FromItem> Page<T> {
    /// Whether another page can be fetched.
    pub fn has_next(&self) -> bool {
        self.last.is_some()
    }

    /// Fetch the next page with the same query and limit.
    ///
    /// Returns `None` once the last page has been reached.
    pub async fn next(&self, client: &Client) -> Result<Option<Page<T>>> {
        self.next_with_limit(client, self.input.limit).await
    }

    /// Fetch the next page with the same query and a different limit.
    ///
    /// `None` or `Some(0)` keeps the limit of this page.
    pub async fn next_with_limit(
        &self,
        client: &Client,
        limit: Option<u32>,
    ) -> Result<Option<Page<T>>> {
        let Some(last) = self.last.clone() else {
            return Ok(None);
        };
        let input = QueryInput {
            last: Some(last),
            limit: limit.filter(|limit| *limit > 0).or(self.input.limit),
            ..self.input.clone()
        };
        input.fetch(client).await.map(Some)
    }

    /// Fetch every remaining page and return all items, this page's included.
    pub async fn collect_all(self, client: &Client) -> Result<Vec<T>> {
        let mut next = self.next(client).await?;
        let mut items = self.items;
        while let Some(page) = next {
            next = page.next(client).await?;
            items.extend(page.items);
        }
        Ok(items)
    }

    /// Convert every item of the page.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            last: self.last,
            size: self.size,
            input: self.input,
        }
    }
}
