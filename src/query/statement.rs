//! SQL statement tree and its rendering.
//!
//! Identifiers in the tree are `&'static str` taken from the table schema,
//! so no caller-supplied text can reach the SQL. Values travel separately as
//! bound parameters, in the order their placeholders appear.

use chrono::NaiveDate;

use super::parser::SortDirection;

/// A value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Date(NaiveDate),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column of the table or subquery being selected from
    Column(&'static str),
    Sum(&'static str),
    Divide(&'static str, &'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<&'static str>,
}

impl SelectItem {
    pub fn column(name: &'static str) -> Self {
        Self {
            expr: Expr::Column(name),
            alias: None,
        }
    }

    pub fn aliased(expr: Expr, alias: &'static str) -> Self {
        Self {
            expr,
            alias: Some(alias),
        }
    }

    /// The column name this item produces
    pub fn output_name(&self) -> &'static str {
        match (self.alias, &self.expr) {
            (Some(alias), _) => alias,
            (None, Expr::Column(name)) | (None, Expr::Sum(name)) => *name,
            (None, Expr::Divide(numerator, _)) => *numerator,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table(&'static str),
    Subquery {
        select: Box<Select>,
        alias: &'static str,
    },
}

/// Conjuncts of a WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    AtLeast(&'static str, Param),
    AtMost(&'static str, Param),
    Equals(&'static str, Param),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub items: Vec<SelectItem>,
    pub source: Source,
    pub predicates: Vec<Predicate>,
    pub group_by: Vec<&'static str>,
    pub order_by: Option<OrderBy>,
}

impl Select {
    pub fn new(items: Vec<SelectItem>, source: Source) -> Self {
        Self {
            items,
            source,
            predicates: Vec::new(),
            group_by: Vec::new(),
            order_by: None,
        }
    }

    pub fn output_names(&self) -> Vec<&'static str> {
        self.items.iter().map(SelectItem::output_name).collect()
    }

    pub fn render(&self) -> Statement {
        let mut sql = String::new();
        let mut params = Vec::new();
        self.write(&mut sql, &mut params, 0);
        Statement {
            sql,
            params,
            columns: self.output_names().into_iter().map(str::to_string).collect(),
        }
    }

    fn write(&self, sql: &mut String, params: &mut Vec<Param>, indent: usize) {
        let p = pad(indent);
        let items: Vec<String> = self.items.iter().map(render_item).collect();
        sql.push_str(&format!("{p}SELECT {}\n{p}FROM ", items.join(", ")));

        match &self.source {
            Source::Table(table) => sql.push_str(&quote(table)),
            Source::Subquery { select, alias } => {
                sql.push_str("(\n");
                select.write(sql, params, indent + 1);
                sql.push_str(&format!("\n{p}) AS {alias}"));
            }
        }

        if !self.predicates.is_empty() {
            let conjuncts: Vec<String> = self
                .predicates
                .iter()
                .map(|predicate| {
                    let (column, op, param) = match predicate {
                        Predicate::AtLeast(column, param) => (column, ">=", param),
                        Predicate::AtMost(column, param) => (column, "<=", param),
                        Predicate::Equals(column, param) => (column, "=", param),
                    };
                    params.push(param.clone());
                    format!("{} {} ?", quote(column), op)
                })
                .collect();
            sql.push_str(&format!("\n{p}WHERE {}", conjuncts.join(" AND ")));
        }

        if !self.group_by.is_empty() {
            let columns: Vec<String> = self.group_by.iter().map(|c| quote(c)).collect();
            sql.push_str(&format!("\n{p}GROUP BY {}", columns.join(", ")));
        }

        if let Some(order_by) = &self.order_by {
            sql.push_str(&format!(
                "\n{p}ORDER BY {} {}",
                quote(order_by.column),
                order_by.direction.keyword()
            ));
        }
    }
}

/// A rendered statement, ready for a single execution
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Param>,
    /// Names of the result columns, in order
    pub columns: Vec<String>,
}

fn render_item(item: &SelectItem) -> String {
    let expr = match &item.expr {
        Expr::Column(name) => quote(name),
        Expr::Sum(name) => format!("SUM({})", quote(name)),
        Expr::Divide(numerator, denominator) => {
            format!("{} / {}", quote(numerator), quote(denominator))
        }
    };
    match item.alias {
        Some(alias) => format!("{expr} AS {}", quote(alias)),
        None => expr,
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{identifier}\"")
}

fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}
