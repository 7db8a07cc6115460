use crate::common;

use indexmap::IndexMap;
use std::hash;

/// Map for selecting attributes by (possibly nested) path.
///
/// ```rust
/// use deta_base_crud::common::selection;
/// use indexmap::IndexMap;
///
/// let selection = selection::SelectionMap::Node(IndexMap::from([(
///     "profile".to_string(),
///     selection::SelectionMap::Leaves(vec!["age".to_string()]),
/// )]));
/// assert_eq!(selection.into_paths(), vec!["profile.age".to_string()]);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectionMap {
    /// Leaf selection - a flat list of attribute names to select.
    Leaves(Vec<String>),
    /// Node selection - nested selection for hierarchical attribute paths.
    Node(IndexMap<String, SelectionMap>),
}

impl hash::Hash for SelectionMap {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::Leaves(leaves) => leaves.hash(state),
            Self::Node(map) => map.iter().for_each(|(key, value)| {
                key.hash(state);
                value.hash(state);
            }),
        }
    }
}

impl SelectionMap {
    /// Flatten the selection into dotted attribute paths, in declaration order.
    pub fn into_paths(self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths_recursive(&[], &mut paths);
        paths
    }

    pub(crate) fn collect_paths_recursive(self, keys: &[String], paths: &mut Vec<String>) {
        match self {
            Self::Leaves(leaves) => paths.extend(
                leaves
                    .into_iter()
                    .map(|leaf| common::add_path(keys, &leaf).join(common::PATH_SEPARATOR)),
            ),
            Self::Node(map) => {
                for (key, value) in map {
                    let new_keys = common::add_path(keys, &key);
                    value.collect_paths_recursive(&new_keys, paths);
                }
            }
        }
    }
}
