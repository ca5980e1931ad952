use chrono::NaiveDate;

use crate::storage::{Column, Dimension};

/// Name of the derived cost-per-install column
pub const CPI: &str = "CPI";

/// A column a caller can ask for: a stored column or the derived CPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    Column(Column),
    Cpi,
}

impl Selection {
    pub fn parse(name: &str) -> Option<Self> {
        if name == CPI {
            return Some(Selection::Cpi);
        }
        Column::from_name(name).map(Selection::Column)
    }

    pub fn name(self) -> &'static str {
        match self {
            Selection::Column(column) => column.name(),
            Selection::Cpi => CPI,
        }
    }
}

/// Strict equality on a dimension column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: Dimension,
    pub value: String,
}

/// Inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn earliest() -> NaiveDate {
        NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn latest() -> NaiveDate {
        NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::new(Self::earliest(), Self::latest())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "asc" => Some(SortDirection::Ascending),
            "desc" => Some(SortDirection::Descending),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: Selection,
    pub direction: SortDirection,
}

/// A validated request against the `dataset` table.
///
/// Built fresh for every call and consumed once by the planner.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Distinct, in the order the caller wants them returned
    pub columns: Vec<Selection>,
    pub filters: Vec<Filter>,
    pub date_range: DateRange,
    pub group_by: Vec<Dimension>,
    pub sort: Option<Sort>,
}

impl QueryRequest {
    pub fn new(columns: Vec<Selection>) -> Self {
        Self {
            columns,
            filters: Vec::new(),
            date_range: DateRange::default(),
            group_by: Vec::new(),
            sort: None,
        }
    }

    /// Every stored column, in table order
    pub fn all_columns() -> Vec<Selection> {
        Column::ALL.into_iter().map(Selection::Column).collect()
    }

    /// CPI has to be computed when it is returned or sorted on
    pub fn needs_cpi(&self) -> bool {
        self.columns.contains(&Selection::Cpi)
            || self.sort.map_or(false, |sort| sort.key == Selection::Cpi)
    }
}
