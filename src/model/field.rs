use crate::{
    common::{condition, selection},
    model::base::Base,
    write::update_item,
};

use serde_json::Value;
use std::{fmt, marker};

/// Numeric value types that can be incremented.
pub trait Numeric: Into<Value> {}

macro_rules! impl_numeric {
    ($($ty:ty),*) => {
        $(impl Numeric for $ty {})*
    };
}

impl_numeric!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// A single attribute of a [`Base`], holding values of type `T`.
///
/// Fields build query conditions and update expressions for their attribute.
///
/// ```rust
/// use deta_base_crud::model::field::Field;
///
/// const AGE: Field<u32> = Field::new("age");
/// const TAGS: Field<Vec<String>> = Field::new("tags");
///
/// let adults = AGE.greater_than_or_equal(18u32);
/// let birthday = AGE.increment(1u32);
/// let tagged = TAGS.append(vec!["new".to_string()]);
/// ```
pub struct Field<T> {
    name: &'static str,
    _type: marker::PhantomData<fn() -> T>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

impl<T> Field<T> {
    /// Declare a field with the given attribute name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: marker::PhantomData,
        }
    }

    /// The attribute name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The name qualified with the Base it belongs to, e.g. `users.age`.
    pub fn qualified_name<B: Base>(&self) -> String {
        format!("{}.{}", B::NAME, self.name)
    }

    /// Remove the attribute.
    pub fn delete(&self) -> update_item::UpdateExpressionMap<Value> {
        update_item::UpdateExpressionMap::Delete(selection::SelectionMap::Leaves(vec![
            self.name.to_string(),
        ]))
    }

    fn condition(&self, condition: condition::Condition<Value>) -> condition::ConditionMap<Value> {
        condition::ConditionMap::Leaves(
            condition::LogicalOperator::And,
            vec![condition::KeyCondition {
                condition,
                name: self.name.to_string(),
            }],
        )
    }

    fn update(&self, update: update_item::UpdateInput<Value>) -> update_item::UpdateExpressionMap<Value> {
        update_item::UpdateExpressionMap::Update(update_item::UpdateInputsMap::Leaves(vec![(
            self.name.to_string(),
            update,
        )]))
    }
}

fn to_value<T: Into<Value>>(value: impl Into<T>) -> Value {
    value.into().into()
}

impl<T: Into<Value>> Field<T> {
    /// The attribute equals `value`.
    pub fn equals(&self, value: impl Into<T>) -> condition::ConditionMap<Value> {
        self.condition(condition::Condition::Equals(to_value::<T>(value)))
    }

    /// The attribute does not equal `value`.
    pub fn not_equal(&self, value: impl Into<T>) -> condition::ConditionMap<Value> {
        self.condition(condition::Condition::NotEqual(to_value::<T>(value)))
    }

    /// The attribute is greater than `value`.
    pub fn greater_than(&self, value: impl Into<T>) -> condition::ConditionMap<Value> {
        self.condition(condition::Condition::GreaterThan(to_value::<T>(value)))
    }

    /// The attribute is greater than or equal to `value`.
    pub fn greater_than_or_equal(&self, value: impl Into<T>) -> condition::ConditionMap<Value> {
        self.condition(condition::Condition::GreaterThanOrEqual(to_value::<T>(value)))
    }

    /// The attribute is less than `value`.
    pub fn less_than(&self, value: impl Into<T>) -> condition::ConditionMap<Value> {
        self.condition(condition::Condition::LessThan(to_value::<T>(value)))
    }

    /// The attribute is less than or equal to `value`.
    pub fn less_than_or_equal(&self, value: impl Into<T>) -> condition::ConditionMap<Value> {
        self.condition(condition::Condition::LessThanOrEqual(to_value::<T>(value)))
    }

    /// The attribute is between `start` and `end`, both inclusive.
    pub fn between(&self, start: impl Into<T>, end: impl Into<T>) -> condition::ConditionMap<Value> {
        self.condition(condition::Condition::Between(
            to_value::<T>(start),
            to_value::<T>(end),
        ))
    }

    /// The attribute (a string or a list) contains `value`.
    pub fn contains(&self, value: impl Into<Value>) -> condition::ConditionMap<Value> {
        self.condition(condition::Condition::Contains(value.into()))
    }

    /// The attribute (a string or a list) does not contain `value`.
    pub fn not_contains(&self, value: impl Into<Value>) -> condition::ConditionMap<Value> {
        self.condition(condition::Condition::NotContains(value.into()))
    }

    /// Assign `value` to the attribute.
    pub fn set(&self, value: impl Into<T>) -> update_item::UpdateExpressionMap<Value> {
        self.update(update_item::UpdateInput::Set(to_value::<T>(value)))
    }
}

impl Field<String> {
    /// The attribute starts with `prefix`.
    pub fn begins_with(&self, prefix: impl Into<String>) -> condition::ConditionMap<Value> {
        self.condition(condition::Condition::BeginsWith(prefix.into()))
    }
}

impl<T: Numeric> Field<T> {
    /// Add `by` to the attribute. Use a negative value to decrement.
    pub fn increment(&self, by: impl Into<T>) -> update_item::UpdateExpressionMap<Value> {
        self.update(update_item::UpdateInput::Increment(to_value::<T>(by)))
    }
}

impl<E: Into<Value>> Field<Vec<E>> {
    /// Append `values` to the end of the list attribute.
    pub fn append(&self, values: Vec<E>) -> update_item::UpdateExpressionMap<Value> {
        self.update(update_item::UpdateInput::Append(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// Prepend `values` to the beginning of the list attribute.
    pub fn prepend(&self, values: Vec<E>) -> update_item::UpdateExpressionMap<Value> {
        self.update(update_item::UpdateInput::Prepend(
            values.into_iter().map(Into::into).collect(),
        ))
    }
}
