use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::value::{TypeHint, Value};

/// Column descriptor: name plus the wire type of its cells.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub hint: TypeHint,
}

impl Column {
    pub fn new(name: impl Into<String>, hint: impl Into<TypeHint>) -> Self {
        Self { name: name.into(), hint: hint.into() }
    }
}

/// One decoded record: ordered column descriptors paired positionally with
/// decoded cell values.
///
/// Positional order is authoritative. Name lookup resolves through a map
/// built at construction time that points at the first occurrence of each
/// name, so duplicate-named columns resolve to the leftmost one.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<Column>,
    by_name: HashMap<String, usize>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<Column>) -> Self {
        let mut by_name = HashMap::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            by_name.entry(column.name.clone()).or_insert(index);
        }
        Self { columns, by_name, values: Vec::new() }
    }

    /// Attach the next cell value. Cells arrive in column order as the
    /// connection layer decodes them.
    pub fn push_value(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Cell lookup by column name (`&str`) or position (`usize`). Name and
    /// position lookup of the same column return the same value.
    pub fn get<I: ColumnIndex>(&self, index: I) -> Result<&Value> {
        index.lookup(self)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Types usable as a [`Row::get`] index.
pub trait ColumnIndex: sealed::Sealed {
    fn lookup(self, row: &Row) -> Result<&Value>;
}

impl ColumnIndex for usize {
    fn lookup(self, row: &Row) -> Result<&Value> {
        row.values.get(self).ok_or_else(|| {
            Error::ColumnNotFound(format!(
                "position {self} out of range for a row of {} columns",
                row.values.len()
            ))
        })
    }
}

impl ColumnIndex for &str {
    fn lookup(self, row: &Row) -> Result<&Value> {
        let index = *row
            .by_name
            .get(self)
            .ok_or_else(|| Error::ColumnNotFound(format!("no column named {self:?}")))?;
        index.lookup(row)
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for usize {}
    impl Sealed for &str {}
}
