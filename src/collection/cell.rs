//! Typed cell access over Arrow columns
//!
//! CSV sources arrive as nullable text, Parquet sources keep their stored
//! types. Aggregations only ever see a [`Cell`], so they stay agnostic of the
//! physical column type.

use crate::temporal::TemporalValue;
use crate::{Error, Result};
use arrow::array::{
    Array, ArrayRef, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use std::borrow::Cow;

/// One scalar value read from a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    /// Non-blank text
    Text(&'a str),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Calendar date
    Date(NaiveDate),
    /// Null, or text that is empty after trimming
    Absent,
}

impl<'a> Cell<'a> {
    /// Whether the cell holds no value
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Text used as a grouping/identity key, `None` when absent
    #[must_use]
    pub fn label(&self) -> Option<Cow<'a, str>> {
        match *self {
            Self::Text(s) => Some(Cow::Borrowed(s)),
            Self::Int(v) => Some(Cow::Owned(v.to_string())),
            Self::Float(v) if v.is_nan() => None,
            Self::Float(v) => Some(Cow::Owned(v.to_string())),
            Self::Date(d) => Some(Cow::Owned(d.to_string())),
            Self::Absent => None,
        }
    }

    /// Interpret the cell as a year or date
    ///
    /// Returns `None` for absent cells, for text that is neither a number
    /// nor a recognised date format, and for years out of range.
    #[must_use]
    pub fn temporal(&self) -> Option<TemporalValue> {
        match *self {
            Self::Text(s) => TemporalValue::parse(s),
            Self::Int(v) => TemporalValue::from_year(v),
            Self::Float(v) => TemporalValue::from_f64(v),
            Self::Date(d) => Some(TemporalValue::Date(d)),
            Self::Absent => None,
        }
    }
}

fn text_cell(value: &str) -> Cell<'_> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Cell::Absent
    } else {
        Cell::Text(trimmed)
    }
}

/// Column downcast once, then read row by row
pub(crate) enum ColumnReader<'a> {
    Utf8(&'a StringArray),
    LargeUtf8(&'a LargeStringArray),
    Int32(&'a Int32Array),
    Int64(&'a Int64Array),
    Float32(&'a Float32Array),
    Float64(&'a Float64Array),
    Date32(&'a Date32Array),
    /// All-null column (e.g. a CSV column with no values)
    Null(usize),
}

fn downcast<'a, T: 'static>(column: &'a ArrayRef, name: &str) -> Result<&'a T> {
    column
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::Other(format!("Failed to downcast column to {name}")))
}

impl<'a> ColumnReader<'a> {
    pub(crate) fn new(column: &'a ArrayRef) -> Result<Self> {
        match column.data_type() {
            DataType::Utf8 => Ok(Self::Utf8(downcast(column, "StringArray")?)),
            DataType::LargeUtf8 => Ok(Self::LargeUtf8(downcast(column, "LargeStringArray")?)),
            DataType::Int32 => Ok(Self::Int32(downcast(column, "Int32Array")?)),
            DataType::Int64 => Ok(Self::Int64(downcast(column, "Int64Array")?)),
            DataType::Float32 => Ok(Self::Float32(downcast(column, "Float32Array")?)),
            DataType::Float64 => Ok(Self::Float64(downcast(column, "Float64Array")?)),
            DataType::Date32 => Ok(Self::Date32(downcast(column, "Date32Array")?)),
            DataType::Null => Ok(Self::Null(column.len())),
            dt => Err(Error::InvalidInput(format!(
                "Column type not supported for summarization: {dt:?}"
            ))),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Utf8(a) => a.len(),
            Self::LargeUtf8(a) => a.len(),
            Self::Int32(a) => a.len(),
            Self::Int64(a) => a.len(),
            Self::Float32(a) => a.len(),
            Self::Float64(a) => a.len(),
            Self::Date32(a) => a.len(),
            Self::Null(len) => *len,
        }
    }

    pub(crate) fn cell(&self, row: usize) -> Cell<'a> {
        match self {
            Self::Utf8(a) if !a.is_null(row) => text_cell(a.value(row)),
            Self::LargeUtf8(a) if !a.is_null(row) => text_cell(a.value(row)),
            Self::Int32(a) if !a.is_null(row) => Cell::Int(i64::from(a.value(row))),
            Self::Int64(a) if !a.is_null(row) => Cell::Int(a.value(row)),
            Self::Float32(a) if !a.is_null(row) => Cell::Float(f64::from(a.value(row))),
            Self::Float64(a) if !a.is_null(row) => Cell::Float(a.value(row)),
            Self::Date32(a) if !a.is_null(row) => {
                a.value_as_date(row).map_or(Cell::Absent, Cell::Date)
            }
            _ => Cell::Absent,
        }
    }
}
