//! Read/write classification of submitted SQL.
//!
//! The loose rule is a keyword heuristic kept for compatibility with how the
//! client has always behaved. The strict rule parses the text with
//! sqlparser-rs in the connected backend's dialect.

use sqlparser::ast::{Query, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;
use tracing::debug;

use crate::db::DatabaseBackend;

use super::{ClassificationMode, QueryKind};

/// Classifies `sql` with the given mode.
pub fn classify(sql: &str, mode: ClassificationMode, backend: DatabaseBackend) -> QueryKind {
    match mode {
        ClassificationMode::Loose => classify_loose(sql),
        ClassificationMode::Strict => classify_strict(sql, backend).unwrap_or_else(|| {
            debug!("SQL did not parse, using loose classification");
            classify_loose(sql)
        }),
    }
}

/// Keyword heuristic.
///
/// Read when the first whitespace-separated token, lowercased, is `select`,
/// or when the trimmed text contains `show` or `describe` anywhere. The
/// substring checks are case-sensitive: `SHOW TABLES` is a write and
/// `update t set showroom = 1` is a read.
pub fn classify_loose(sql: &str) -> QueryKind {
    let trimmed = sql.trim();
    let first = trimmed.split_whitespace().next().unwrap_or_default();

    if first.to_lowercase() == "select" || trimmed.contains("show") || trimmed.contains("describe")
    {
        QueryKind::Read
    } else {
        QueryKind::Write
    }
}

/// Parses `sql` in the backend's dialect.
///
/// Returns `None` when the text does not parse or holds no statement.
/// Multiple statements are a read only if every one of them is.
pub fn classify_strict(sql: &str, backend: DatabaseBackend) -> Option<QueryKind> {
    let dialect: Box<dyn Dialect> = match backend {
        DatabaseBackend::MySql => Box::new(MySqlDialect {}),
        DatabaseBackend::Postgres => Box::new(PostgreSqlDialect {}),
        DatabaseBackend::Sqlite => Box::new(SQLiteDialect {}),
    };

    let statements = Parser::parse_sql(dialect.as_ref(), sql).ok()?;
    if statements.is_empty() {
        return None;
    }

    let kind = if statements.iter().all(is_read_statement) {
        QueryKind::Read
    } else {
        QueryKind::Write
    };
    Some(kind)
}

fn is_read_statement(statement: &Statement) -> bool {
    match statement {
        // May contain data-modifying CTEs
        Statement::Query(query) => is_read_query(query),
        // EXPLAIN ANALYZE runs the statement
        Statement::Explain {
            analyze, statement, ..
        } => !*analyze || is_read_statement(statement),
        Statement::ExplainTable { .. }
        | Statement::ShowVariable { .. }
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowCreate { .. }
        | Statement::ShowFunctions { .. }
        | Statement::ShowStatus { .. }
        | Statement::ShowCollation { .. }
        | Statement::Pragma { value: None, .. } => true,
        _ => false,
    }
}

fn is_read_query(query: &Query) -> bool {
    let ctes_read = query
        .with
        .as_ref()
        .map_or(true, |with| with.cte_tables.iter().all(|cte| is_read_query(&cte.query)));

    ctes_read && is_read_set_expr(&query.body)
}

fn is_read_set_expr(set_expr: &SetExpr) -> bool {
    match set_expr {
        SetExpr::Select(select) => select.from.iter().all(is_read_table_with_joins),
        SetExpr::Query(query) => is_read_query(query),
        SetExpr::SetOperation { left, right, .. } => {
            is_read_set_expr(left) && is_read_set_expr(right)
        }
        SetExpr::Values(_) | SetExpr::Table(_) => true,
        _ => false,
    }
}

fn is_read_table_with_joins(twj: &TableWithJoins) -> bool {
    is_read_table_factor(&twj.relation)
        && twj
            .joins
            .iter()
            .all(|join| is_read_table_factor(&join.relation))
}

fn is_read_table_factor(factor: &TableFactor) -> bool {
    match factor {
        TableFactor::Derived { subquery, .. } => is_read_query(subquery),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => is_read_table_with_joins(table_with_joins),
        _ => true,
    }
}
