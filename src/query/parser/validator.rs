use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use super::ast::{DateRange, Filter, QueryRequest, Selection, Sort, SortDirection};
use crate::storage::{Column, Dimension};

/// Stands for an open end of the date range
const OPEN_DATE: &str = "inf";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("At least one column must be selected")]
    NoColumns,
    #[error("Column '{0}' can not be selected")]
    UnknownColumn(String),
    #[error("Selection results can not be filtered by column '{0}'")]
    InvalidFilterColumn(String),
    #[error("Can not be grouped by column '{0}'")]
    InvalidGroupColumn(String),
    #[error("Invalid date '{0}'. Date should be represented in YYYY-MM-DD format or 'inf'")]
    InvalidDate(String),
    #[error("Column '{0}' not found")]
    UnknownSortColumn(String),
    #[error("Sort direction must be 'asc' or 'desc', got '{0}'")]
    InvalidSortDirection(String),
    #[error("order_by takes a column and an optional direction, got {0} values")]
    InvalidSort(usize),
}

/// `order_by` is either a bare column name or `[column]` / `[column, direction]`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderBy {
    Column(String),
    List(Vec<String>),
}

/// Body of a `POST /get_data` call, as sent by the client
#[derive(Debug, Clone, Deserialize)]
pub struct RequestBody {
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
    #[serde(default)]
    pub filters: Vec<(String, String)>,
    #[serde(default = "default_from_date")]
    pub from_date: String,
    #[serde(default = "default_to_date")]
    pub to_date: String,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub group_by: Vec<String>,
}

fn default_columns() -> Vec<String> {
    Column::ALL.iter().map(|c| c.name().to_string()).collect()
}

fn default_from_date() -> String {
    OPEN_DATE.to_string()
}

fn default_to_date() -> String {
    OPEN_DATE.to_string()
}

impl Default for RequestBody {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            filters: Vec::new(),
            from_date: default_from_date(),
            to_date: default_to_date(),
            order_by: None,
            group_by: Vec::new(),
        }
    }
}

impl RequestBody {
    /// Checks every field and produces the typed request the planner consumes
    pub fn validate(&self) -> Result<QueryRequest, ValidationError> {
        let columns = validate_columns(&self.columns)?;
        let filters = self
            .filters
            .iter()
            .map(|(column, value)| {
                let column = dimension(column)
                    .ok_or_else(|| ValidationError::InvalidFilterColumn(column.clone()))?;
                Ok(Filter {
                    column,
                    value: value.clone(),
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;
        let date_range = DateRange::new(
            parse_date(&self.from_date, DateRange::earliest())?,
            parse_date(&self.to_date, DateRange::latest())?,
        );
        let group_by = self
            .group_by
            .iter()
            .map(|column| {
                dimension(column).ok_or_else(|| ValidationError::InvalidGroupColumn(column.clone()))
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;
        let sort = self.order_by.as_ref().map(validate_sort).transpose()?;

        Ok(QueryRequest {
            columns,
            filters,
            date_range,
            group_by,
            sort,
        })
    }
}

fn validate_columns(names: &[String]) -> Result<Vec<Selection>, ValidationError> {
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let selection =
            Selection::parse(name).ok_or_else(|| ValidationError::UnknownColumn(name.clone()))?;
        if !columns.contains(&selection) {
            columns.push(selection);
        }
    }
    if columns.is_empty() {
        return Err(ValidationError::NoColumns);
    }
    Ok(columns)
}

fn dimension(name: &str) -> Option<Dimension> {
    Column::from_name(name).and_then(Column::as_dimension)
}

fn parse_date(value: &str, open_end: NaiveDate) -> Result<NaiveDate, ValidationError> {
    if value == OPEN_DATE {
        return Ok(open_end);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

fn validate_sort(order_by: &OrderBy) -> Result<Sort, ValidationError> {
    let (column, direction) = match order_by {
        OrderBy::Column(column) => (column, None),
        OrderBy::List(values) => match values.as_slice() {
            [column] => (column, None),
            [column, direction] => (column, Some(direction)),
            other => return Err(ValidationError::InvalidSort(other.len())),
        },
    };
    let key = Selection::parse(column)
        .ok_or_else(|| ValidationError::UnknownSortColumn(column.clone()))?;
    let direction = match direction {
        Some(token) => SortDirection::from_token(token)
            .ok_or_else(|| ValidationError::InvalidSortDirection(token.clone()))?,
        None => SortDirection::Ascending,
    };
    Ok(Sort { key, direction })
}
