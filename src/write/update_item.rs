use crate::{Error, Result, client::Client, common};

use indexmap::IndexMap;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Update applied to a single attribute.
///
/// ```rust
/// use deta_base_crud::write::update_item;
///
/// let assign = update_item::UpdateInput::Set("value".to_string());
/// let increment = update_item::UpdateInput::Increment(10);
/// let append = update_item::UpdateInput::Append(vec![1, 2]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateInput<T> {
    /// Assign a new value to the attribute (replaces existing value).
    Set(T),
    /// Increment a numeric attribute by the specified value (negative to decrement).
    Increment(T),
    /// Append values to the end of a list attribute.
    Append(Vec<T>),
    /// Prepend values to the beginning of a list attribute.
    Prepend(Vec<T>),
}

/// Map for attribute updates.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateInputsMap<T> {
    /// Leaf updates - flat list of (attribute_name, update) pairs.
    Leaves(Vec<(String, UpdateInput<T>)>),
    /// Node updates - nested updates for hierarchical attribute paths.
    Node(IndexMap<String, UpdateInputsMap<T>>),
}

impl<T: Serialize> UpdateInputsMap<T> {
    fn get_update_payload_recursive(
        self,
        keys: &[String],
        payload: &mut UpdatePayload,
    ) -> Result<()> {
        match self {
            Self::Leaves(leaves) => {
                for (key, update) in leaves {
                    let path = common::add_path(keys, &key).join(common::PATH_SEPARATOR);
                    match update {
                        UpdateInput::Set(value) => {
                            payload.set.insert(path, serde_json::to_value(value)?);
                        }
                        UpdateInput::Increment(value) => {
                            payload.increment.insert(path, serde_json::to_value(value)?);
                        }
                        UpdateInput::Append(values) => {
                            extend_list(&mut payload.append, path, values)?;
                        }
                        UpdateInput::Prepend(values) => {
                            extend_list(&mut payload.prepend, path, values)?;
                        }
                    }
                }
            }
            Self::Node(map) => {
                for (key, value) in map {
                    let new_keys = common::add_path(keys, &key);
                    value.get_update_payload_recursive(&new_keys, payload)?;
                }
            }
        }
        Ok(())
    }
}

fn extend_list<T: Serialize>(
    lists: &mut Map<String, Value>,
    path: String,
    values: Vec<T>,
) -> Result<()> {
    let mut serialized = Vec::with_capacity(values.len());
    for value in values {
        serialized.push(serde_json::to_value(value)?);
    }
    match lists.get_mut(&path) {
        Some(Value::Array(existing)) => existing.extend(serialized),
        _ => {
            lists.insert(path, Value::Array(serialized));
        }
    }
    Ok(())
}

/// Update expression map.
///
/// ```rust
/// use deta_base_crud::{common, write::update_item};
///
/// let expr = update_item::UpdateExpressionMap::Combined(vec![
///     update_item::UpdateExpressionMap::Update(update_item::UpdateInputsMap::Leaves(vec![
///         ("name".to_string(), update_item::UpdateInput::Set("New".to_string())),
///     ])),
///     update_item::UpdateExpressionMap::Delete(common::selection::SelectionMap::Leaves(vec![
///         "nickname".to_string(),
///     ])),
/// ]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateExpressionMap<T> {
    /// SET, INCREMENT, APPEND and PREPEND operations.
    Update(UpdateInputsMap<T>),
    /// DELETE operations - remove attributes from items.
    Delete(common::selection::SelectionMap),
    /// Combined operations - multiple operation types in a single update.
    Combined(Vec<UpdateExpressionMap<T>>),
}

impl<T: Serialize> UpdateExpressionMap<T> {
    fn get_update_payload_recursive(self, payload: &mut UpdatePayload) -> Result<()> {
        match self {
            Self::Update(inputs) => inputs.get_update_payload_recursive(&[], payload),
            Self::Delete(selection) => {
                for path in selection.into_paths() {
                    if !payload.delete.contains(&path) {
                        payload.delete.push(path);
                    }
                }
                Ok(())
            }
            Self::Combined(combined_operations) => {
                for operation in combined_operations {
                    operation.get_update_payload_recursive(payload)?;
                }
                Ok(())
            }
        }
    }
}

impl<T: Serialize> TryFrom<UpdateExpressionMap<T>> for UpdatePayload {
    type Error = Error;

    fn try_from(update_expression_map: UpdateExpressionMap<T>) -> Result<Self> {
        let mut payload = Self::default();
        update_expression_map.get_update_payload_recursive(&mut payload)?;
        Ok(payload)
    }
}

/// The body of an update request, keyed by dotted attribute path.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct UpdatePayload {
    /// Attributes to assign.
    #[serde(default)]
    pub set: Map<String, Value>,
    /// Numeric attributes to increment.
    #[serde(default)]
    pub increment: Map<String, Value>,
    /// List attributes to append to.
    #[serde(default)]
    pub append: Map<String, Value>,
    /// List attributes to prepend to.
    #[serde(default)]
    pub prepend: Map<String, Value>,
    /// Attributes to remove.
    #[serde(default)]
    pub delete: Vec<String>,
}

fn projection_error(path: &str, reason: &str) -> Error {
    Error::Projection {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Walk to the object holding the last segment of `path`.
///
/// With `create`, missing intermediate objects are created; without it, a missing or
/// non-object parent yields `None`.
fn parent_mut<'a>(
    item: &'a mut common::RawItem,
    path: &'a str,
    create: bool,
) -> Result<Option<(&'a mut common::RawItem, &'a str)>> {
    let mut segments: Vec<&str> = path.split(common::PATH_SEPARATOR).collect();
    let Some(last) = segments.pop() else {
        return Ok(None);
    };
    let mut current = item;
    for segment in segments {
        let value = if create {
            current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()))
        } else {
            match current.get_mut(segment) {
                Some(value) => value,
                None => return Ok(None),
            }
        };
        current = match value {
            Value::Object(map) => map,
            _ if create => return Err(projection_error(path, "parent is not an object")),
            _ => return Ok(None),
        };
    }
    Ok(Some((current, last)))
}

fn add_numbers(path: &str, current: &Number, by: &Number) -> Result<Number> {
    if let (Some(current), Some(by)) = (current.as_i64(), by.as_i64()) {
        if let Some(sum) = current.checked_add(by) {
            return Ok(sum.into());
        }
    }
    if let (Some(current), Some(by)) = (current.as_u64(), by.as_u64()) {
        if let Some(sum) = current.checked_add(by) {
            return Ok(sum.into());
        }
    }
    if let (Some(current), Some(by)) = (current.as_u64(), by.as_i64()) {
        if let Some(sum) = current.checked_add_signed(by) {
            return Ok(sum.into());
        }
    }
    let sum = current.as_f64().unwrap_or_default() + by.as_f64().unwrap_or_default();
    Number::from_f64(sum).ok_or_else(|| projection_error(path, "increment is not a finite number"))
}

impl UpdatePayload {
    /// Whether the payload changes nothing.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
            && self.increment.is_empty()
            && self.append.is_empty()
            && self.prepend.is_empty()
            && self.delete.is_empty()
    }

    /// Predict the state of `item` after the service applies this update.
    ///
    /// Operations are applied in the order set, increment, append, prepend, delete.
    /// The input item is left untouched.
    pub fn apply(&self, item: &common::RawItem) -> Result<common::RawItem> {
        let mut item = item.clone();
        for (path, value) in &self.set {
            if let Some((parent, name)) = parent_mut(&mut item, path, true)? {
                parent.insert(name.to_string(), value.clone());
            }
        }
        for (path, by) in &self.increment {
            let Value::Number(by) = by else {
                return Err(projection_error(path, "increment is not a number"));
            };
            if let Some((parent, name)) = parent_mut(&mut item, path, true)? {
                let current = match parent.get(name) {
                    None | Some(Value::Null) => Number::from(0),
                    Some(Value::Number(current)) => current.clone(),
                    Some(_) => return Err(projection_error(path, "attribute is not a number")),
                };
                let sum = add_numbers(path, &current, by)?;
                parent.insert(name.to_string(), Value::Number(sum));
            }
        }
        for (path, values) in &self.append {
            Self::extend_at(&mut item, path, values, false)?;
        }
        for (path, values) in &self.prepend {
            Self::extend_at(&mut item, path, values, true)?;
        }
        for path in &self.delete {
            if let Some((parent, name)) = parent_mut(&mut item, path, false)? {
                parent.remove(name);
            }
        }
        Ok(item)
    }

    fn extend_at(
        item: &mut common::RawItem,
        path: &str,
        values: &Value,
        front: bool,
    ) -> Result<()> {
        let Value::Array(values) = values else {
            return Err(projection_error(path, "values are not a list"));
        };
        let Some((parent, name)) = parent_mut(item, path, true)? else {
            return Ok(());
        };
        let existing = match parent.remove(name) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(existing)) => existing,
            Some(other) => {
                parent.insert(name.to_string(), other);
                return Err(projection_error(path, "attribute is not a list"));
            }
        };
        let list = if front {
            values.iter().cloned().chain(existing).collect()
        } else {
            existing.into_iter().chain(values.iter().cloned()).collect()
        };
        parent.insert(name.to_string(), Value::Array(list));
        Ok(())
    }
}

/// Update item operation.
///
/// ```rust,no_run
/// use deta_base_crud::{client::Client, common, write};
///
/// # async fn example(client: &Client) -> deta_base_crud::Result<()> {
/// let update_item = write::update_item::UpdateItem {
///     key: common::key::Key::from("1"),
///     update_expression: write::update_item::UpdateExpressionMap::Update(
///         write::update_item::UpdateInputsMap::Leaves(vec![
///             ("name".to_string(), write::update_item::UpdateInput::Set("New".to_string())),
///         ]),
///     ),
///     base_name: "users".to_string(),
/// };
/// let payload = update_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateItem<T> {
    /// The key of the item to update.
    pub key: common::key::Key,
    /// The update expression specifying what changes to make.
    pub update_expression: UpdateExpressionMap<T>,
    /// The name of the Base holding the item.
    pub base_name: String,
}

impl<T: Serialize> UpdateItem<T> {
    /// Execute the update item operation, returning the payload that was sent.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "deta_base_crud.update_item", skip_all, fields(key = %self.key), err)
    )]
    pub async fn send(self, client: &Client) -> Result<UpdatePayload> {
        let payload: UpdatePayload = self.update_expression.try_into()?;
        let response = client
            .execute(
                Method::PATCH,
                &self.base_name,
                &["items", &*self.key],
                Some(&payload),
            )
            .await?;
        Client::check(response).await?;
        Ok(payload)
    }
}
