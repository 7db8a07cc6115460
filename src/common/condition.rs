use crate::{Error, Result, common};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::ops;

/// A conjunction of `field?operator` entries, all of which must hold.
type Clause = Vec<(String, Value)>;

/// Logical operator for combining conditions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LogicalOperator {
    /// Logical AND - all conditions must be true.
    And,
    /// Logical OR - at least one condition must be true.
    Or,
}

impl LogicalOperator {
    /// Combine operands already in disjunctive normal form.
    fn combine(self, operands: Vec<Vec<Clause>>) -> Vec<Clause> {
        match self {
            Self::And => operands
                .into_iter()
                .fold(vec![Clause::new()], |clauses, operand| {
                    let mut product = Vec::with_capacity(clauses.len() * operand.len());
                    for clause in &clauses {
                        for other in &operand {
                            let mut joined = clause.clone();
                            joined.extend(other.iter().cloned());
                            product.push(joined);
                        }
                    }
                    product
                }),
            Self::Or => operands.into_iter().flatten().collect(),
        }
    }
}

/// Condition types for Deta Base queries.
///
/// ```rust
/// use deta_base_crud::common::condition;
///
/// let eq = condition::Condition::Equals("value".to_string());
/// let gt = condition::Condition::GreaterThan(100);
/// let prefix: condition::Condition<String> = condition::Condition::BeginsWith("a".to_string());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Condition<T> {
    /// Checks if a string attribute begins with a specified prefix.
    BeginsWith(String),
    /// Checks if an attribute value is between two values (inclusive).
    Between(T, T),
    /// Checks if a string or list attribute contains a specified value.
    Contains(T),
    /// Checks if an attribute value equals a specified value.
    Equals(T),
    /// Checks if an attribute value is greater than a specified value.
    GreaterThan(T),
    /// Checks if an attribute value is greater than or equal to a specified value.
    GreaterThanOrEqual(T),
    /// Checks if an attribute value is less than a specified value.
    LessThan(T),
    /// Checks if an attribute value is less than or equal to a specified value.
    LessThanOrEqual(T),
    /// Checks if a string or list attribute does not contain a specified value.
    NotContains(T),
    /// Checks if an attribute value does not equal a specified value.
    NotEqual(T),
}

impl<T: Serialize> Condition<T> {
    fn get_query_entry(self, path: &str) -> Result<(String, Value)> {
        let (operator, value) = match self {
            Self::BeginsWith(prefix) => ("?pfx", Value::String(prefix)),
            Self::Between(start, end) => {
                let start = serde_json::to_value(start)?;
                let end = serde_json::to_value(end)?;
                ("?r", Value::Array(vec![start, end]))
            }
            Self::Contains(value) => ("?contains", serde_json::to_value(value)?),
            Self::Equals(value) => ("", serde_json::to_value(value)?),
            Self::GreaterThan(value) => ("?gt", serde_json::to_value(value)?),
            Self::GreaterThanOrEqual(value) => ("?gte", serde_json::to_value(value)?),
            Self::LessThan(value) => ("?lt", serde_json::to_value(value)?),
            Self::LessThanOrEqual(value) => ("?lte", serde_json::to_value(value)?),
            Self::NotContains(value) => ("?not_contains", serde_json::to_value(value)?),
            Self::NotEqual(value) => ("?ne", serde_json::to_value(value)?),
        };
        Ok((format!("{path}{operator}"), value))
    }
}

/// Condition applied to an attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyCondition<T> {
    /// The condition to apply to the attribute.
    pub condition: Condition<T>,
    /// The name of the attribute to apply the condition to.
    pub name: String,
}

/// Map of conditions with logical operators.
///
/// ```rust
/// use deta_base_crud::common::condition;
///
/// let map = condition::ConditionMap::Leaves(
///     condition::LogicalOperator::And,
///     vec![
///         condition::KeyCondition {
///             name: "status".to_string(),
///             condition: condition::Condition::Equals("active".to_string()),
///         },
///     ],
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ConditionMap<T> {
    /// Leaf conditions - flat list of conditions combined with the logical operator.
    Leaves(LogicalOperator, Vec<KeyCondition<T>>),
    /// Node conditions - nested conditions for hierarchical attribute paths.
    Node(LogicalOperator, IndexMap<String, ConditionMap<T>>),
    /// Group conditions - arbitrary sub-trees combined with the logical operator.
    Group(LogicalOperator, Vec<ConditionMap<T>>),
}

impl<T> ConditionMap<T> {
    fn join(self, operator: LogicalOperator, other: Self) -> Self {
        let mut conditions = Vec::with_capacity(2);
        for condition in [self, other] {
            match condition {
                Self::Group(group_operator, group) if group_operator == operator => {
                    conditions.extend(group)
                }
                condition => conditions.push(condition),
            }
        }
        Self::Group(operator, conditions)
    }
}

impl<T> ops::BitAnd for ConditionMap<T> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.join(LogicalOperator::And, rhs)
    }
}

impl<T> ops::BitOr for ConditionMap<T> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.join(LogicalOperator::Or, rhs)
    }
}

impl<T: Serialize> ConditionMap<T> {
    /// Build the query the service expects: a list of objects that are OR-ed together,
    /// each object holding `field?operator` entries that are AND-ed together.
    ///
    /// Returns `None` when the conditions do not filter anything.
    pub fn into_query(self) -> Result<Option<Vec<common::RawItem>>> {
        let clauses = self.get_clauses_recursive(&[])?;
        if clauses.is_empty() || clauses.iter().any(Vec::is_empty) {
            return Ok(None);
        }
        let mut query = Vec::with_capacity(clauses.len());
        for clause in clauses {
            let mut conjunction = common::RawItem::new();
            for (key, value) in clause {
                match conjunction.get(&key) {
                    Some(existing) if *existing != value => {
                        return Err(Error::ConflictingCondition(key));
                    }
                    _ => {
                        conjunction.insert(key, value);
                    }
                }
            }
            query.push(conjunction);
        }
        Ok(Some(query))
    }

    fn get_clauses_recursive(self, keys: &[String]) -> Result<Vec<Clause>> {
        let (operator, operands) = match self {
            Self::Leaves(operator, key_conditions) => {
                let mut operands = Vec::with_capacity(key_conditions.len());
                for key_condition in key_conditions {
                    let path = common::add_path(keys, &key_condition.name)
                        .join(common::PATH_SEPARATOR);
                    let entry = key_condition.condition.get_query_entry(&path)?;
                    operands.push(vec![vec![entry]]);
                }
                (operator, operands)
            }
            Self::Node(operator, map) => {
                let mut operands = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let new_keys = common::add_path(keys, &key);
                    operands.push(value.get_clauses_recursive(&new_keys)?);
                }
                (operator, operands)
            }
            Self::Group(operator, conditions) => {
                let mut operands = Vec::with_capacity(conditions.len());
                for condition in conditions {
                    operands.push(condition.get_clauses_recursive(keys)?);
                }
                (operator, operands)
            }
        };
        Ok(operator.combine(operands))
    }
}
