use crate::{AsValue, Record, RecordSet, Value};
use std::collections::{BTreeMap, HashMap};

/// Ordered column name to value mapping, the normalized form of one input record.
///
/// Keys are unique: inserting an existing key replaces its value and keeps its position. The
/// insertion order is the column order of every statement built from the row.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct DataRow {
    entries: Vec<(String, Value)>,
}

impl DataRow {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }
    /// Builder style insert.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => Some(std::mem::replace(v, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> + Clone {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
    pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
    /// True when both rows have the same key set, order ignored.
    pub fn same_keys(&self, other: &DataRow) -> bool {
        self.len() == other.len() && self.keys().all(|k| other.contains_key(k))
    }
}

impl IntoIterator for DataRow {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DataRow {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut row = DataRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// The shapes a caller may hand to a mutation, already classified.
///
/// The core dispatches on this tag only, it never inspects the Rust type it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataInput {
    /// A single value, used verbatim as an update expression (`"count=count+1"`).
    Scalar(Value),
    Record(DataRow),
    Records(Vec<DataRow>),
}

impl DataInput {
    pub fn kind(&self) -> &'static str {
        match self {
            DataInput::Scalar(..) => "scalar",
            DataInput::Record(..) => "record",
            DataInput::Records(..) => "record sequence",
        }
    }
}

/// Conversion of caller data into a [`DataInput`].
///
/// This is the boundary to the value normalizer: anything that can describe itself as a
/// record, a sequence of records or a scalar can be written.
pub trait IntoData {
    fn into_data(self) -> DataInput;
}

impl IntoData for DataInput {
    fn into_data(self) -> DataInput {
        self
    }
}

impl IntoData for DataRow {
    fn into_data(self) -> DataInput {
        DataInput::Record(self)
    }
}

impl IntoData for Vec<DataRow> {
    fn into_data(self) -> DataInput {
        DataInput::Records(self)
    }
}

impl<const N: usize> IntoData for [DataRow; N] {
    fn into_data(self) -> DataInput {
        DataInput::Records(self.into())
    }
}

impl IntoData for &[DataRow] {
    fn into_data(self) -> DataInput {
        DataInput::Records(self.to_vec())
    }
}

impl IntoData for Value {
    fn into_data(self) -> DataInput {
        DataInput::Scalar(self)
    }
}

impl IntoData for &str {
    fn into_data(self) -> DataInput {
        DataInput::Scalar(self.into())
    }
}

impl IntoData for String {
    fn into_data(self) -> DataInput {
        DataInput::Scalar(self.into())
    }
}

impl<K: Into<String>, V: AsValue> IntoData for BTreeMap<K, V> {
    fn into_data(self) -> DataInput {
        DataInput::Record(self.into_iter().map(|(k, v)| (k, v.as_value())).collect())
    }
}

/// Iteration order of a `HashMap` is arbitrary, the resulting column order is too.
impl<K: Into<String>, V: AsValue> IntoData for HashMap<K, V> {
    fn into_data(self) -> DataInput {
        DataInput::Record(self.into_iter().map(|(k, v)| (k, v.as_value())).collect())
    }
}

impl<K: Into<String>, V: AsValue> IntoData for Vec<(K, V)> {
    fn into_data(self) -> DataInput {
        DataInput::Record(self.into_iter().map(|(k, v)| (k, v.as_value())).collect())
    }
}

impl<K: Into<String>, V: AsValue> IntoData for Vec<BTreeMap<K, V>> {
    fn into_data(self) -> DataInput {
        DataInput::Records(
            self.into_iter()
                .map(|map| map.into_iter().map(|(k, v)| (k, v.as_value())).collect())
                .collect(),
        )
    }
}

impl IntoData for Record {
    fn into_data(self) -> DataInput {
        DataInput::Record(self.to_row())
    }
}

impl IntoData for RecordSet {
    fn into_data(self) -> DataInput {
        DataInput::Records(self.iter().map(Record::to_row).collect())
    }
}
