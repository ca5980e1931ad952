//! Builds the single statement that answers a `QueryRequest`.
//!
//! The statement is assembled in stages, each a pure function from one
//! `Select` to the next:
//!
//! 1. every table column, with numeric columns summed when grouping
//! 2. the inclusive date range
//! 3. the equality filters
//! 4. CPI over the (possibly aggregated) rows, as a wrapping subquery
//! 5. the sort key
//! 6. a final wrapping subquery keeping only the requested columns
//!
//! CPI and the sort key may depend on columns the caller did not select,
//! which is why pruning happens last.

use super::parser::{DateRange, Filter, QueryRequest, Selection, Sort, CPI};
use super::statement::{Expr, OrderBy, Param, Predicate, Select, SelectItem, Source, Statement};
use crate::storage::{Column, Dimension, TABLE_NAME};

const CPI_SUBQUERY: &str = "main_table";
const RESULT_SUBQUERY: &str = "all_data";

/// Translates a validated request into an executable statement
pub fn build(request: &QueryRequest) -> Statement {
    plan(request).render()
}

/// The statement tree for `request`, before rendering
pub fn plan(request: &QueryRequest) -> Select {
    let select = base_select(&request.group_by);
    let select = filter_by_date(select, &request.date_range);
    let select = filter_by_value(select, &request.filters);
    let select = if request.needs_cpi() {
        with_cpi(select)
    } else {
        select
    };
    let select = order(select, request.sort.as_ref());
    project(select, &request.columns)
}

/// Every column of the table. Grouping sums all numeric columns, not only the
/// selected ones; dimensions outside `group_by` are passed through as is.
fn base_select(group_by: &[Dimension]) -> Select {
    let grouping = !group_by.is_empty();
    let items = Column::ALL
        .into_iter()
        .map(|column| {
            if grouping && column.is_numeric() {
                SelectItem::aliased(Expr::Sum(column.name()), column.name())
            } else {
                SelectItem::column(column.name())
            }
        })
        .collect();

    let mut select = Select::new(items, Source::Table(TABLE_NAME));
    select.group_by = group_by.iter().map(|dimension| dimension.name()).collect();
    select
}

fn filter_by_date(mut select: Select, range: &DateRange) -> Select {
    let date = Column::Date.name();
    select.predicates.push(Predicate::AtLeast(date, Param::Date(range.from)));
    select.predicates.push(Predicate::AtMost(date, Param::Date(range.to)));
    select
}

fn filter_by_value(mut select: Select, filters: &[Filter]) -> Select {
    select.predicates.extend(filters.iter().map(|filter| {
        Predicate::Equals(filter.column.name(), Param::Text(filter.value.clone()))
    }));
    select
}

/// Wraps `select` and adds `spend / installs AS CPI` next to its columns
fn with_cpi(select: Select) -> Select {
    let mut items: Vec<SelectItem> = select
        .output_names()
        .into_iter()
        .map(SelectItem::column)
        .collect();
    items.push(SelectItem::aliased(
        Expr::Divide(Column::Spend.name(), Column::Installs.name()),
        CPI,
    ));
    Select::new(
        items,
        Source::Subquery {
            select: Box::new(select),
            alias: CPI_SUBQUERY,
        },
    )
}

fn order(mut select: Select, sort: Option<&Sort>) -> Select {
    select.order_by = sort.map(|sort| OrderBy {
        column: sort.key.name(),
        direction: sort.direction,
    });
    select
}

/// Keeps the requested columns that `select` produces, in the requested
/// order. The sort moves to the outer select so the final row order does
/// not depend on how the store treats an ordered subquery.
fn project(mut select: Select, columns: &[Selection]) -> Select {
    let available = select.output_names();
    let items = columns
        .iter()
        .map(|selection| selection.name())
        .filter(|name| available.contains(name))
        .map(SelectItem::column)
        .collect();
    let order_by = select.order_by.take();

    let mut outer = Select::new(
        items,
        Source::Subquery {
            select: Box::new(select),
            alias: RESULT_SUBQUERY,
        },
    );
    outer.order_by = order_by;
    outer
}
