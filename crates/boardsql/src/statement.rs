//! Statement assembly for INSERT / SELECT / UPDATE / DELETE.
//!
//! Every builder produces a [`Statement`] with `?` placeholders. Clients that speak
//! Postgres render it with [`Placeholders::Numbered`] at execution time.
//!
//! # Safety
//! Table names, column names and ORDER BY clauses are emitted verbatim. They must be
//! literals controlled by the caller, never user input.

use crate::condition::{ConditionMap, compile};
use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use crate::value::Value;
use std::borrow::Cow;

/// Placeholder syntax used when rendering a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholders {
    /// `?` positional placeholders.
    Question,
    /// `$1`, `$2`, … (Postgres).
    #[default]
    Numbered,
}

/// A SQL statement with positional bind values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    /// Wrap hand-written SQL. Use `?` placeholders.
    pub fn raw(sql: impl Into<String>, params: impl IntoIterator<Item = Value>) -> Self {
        Self {
            sql: sql.into(),
            params: params.into_iter().collect(),
        }
    }

    /// SQL text with `?` placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind values in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    /// Render the SQL in the given placeholder style.
    pub fn render(&self, style: Placeholders) -> Cow<'_, str> {
        match style {
            Placeholders::Question => Cow::Borrowed(&self.sql),
            Placeholders::Numbered => Cow::Owned(number_placeholders(&self.sql)),
        }
    }
}

/// Rewrite `?` placeholders as `$1..$n`, leaving string literals, quoted identifiers
/// and comments untouched.
pub fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0usize;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '?' => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            }
            '\'' | '"' => {
                out.push(c);
                while let Some(ch) = chars.next() {
                    out.push(ch);
                    if ch == c {
                        // Doubled quote is an escape; stay inside the literal.
                        if chars.peek() == Some(&c) {
                            if let Some(esc) = chars.next() {
                                out.push(esc);
                            }
                            continue;
                        }
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                out.push(c);
                for ch in chars.by_ref() {
                    out.push(ch);
                    if ch == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                out.push(c);
                let mut prev = '\0';
                for ch in chars.by_ref() {
                    out.push(ch);
                    if prev == '*' && ch == '/' {
                        break;
                    }
                    prev = ch;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Column selection for SELECT.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Columns {
    /// `*`
    #[default]
    All,
    /// Explicit ordered column list.
    List(Vec<String>),
}

impl Columns {
    fn to_sql(&self) -> OrmResult<Cow<'_, str>> {
        match self {
            Columns::All => Ok(Cow::Borrowed("*")),
            Columns::List(cols) if cols.is_empty() => {
                Err(OrmError::validation("SELECT requires at least one column"))
            }
            Columns::List(cols) => Ok(Cow::Owned(cols.join(", "))),
        }
    }
}

impl From<&str> for Columns {
    fn from(s: &str) -> Self {
        if s.trim() == "*" {
            Columns::All
        } else {
            Columns::List(vec![s.to_string()])
        }
    }
}

impl From<&[&str]> for Columns {
    fn from(cols: &[&str]) -> Self {
        Columns::List(cols.iter().map(|c| c.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Columns {
    fn from(cols: [&str; N]) -> Self {
        Columns::List(cols.iter().map(|c| c.to_string()).collect())
    }
}

impl From<Vec<String>> for Columns {
    fn from(cols: Vec<String>) -> Self {
        Columns::List(cols)
    }
}

/// `INSERT INTO table (c1, c2) VALUES (?, ?)`
pub fn insert(table: &str, data: &Record) -> OrmResult<Statement> {
    if data.is_empty() {
        return Err(OrmError::validation(format!(
            "INSERT into {table} requires at least one column"
        )));
    }
    let columns = data.columns().collect::<Vec<_>>().join(", ");
    let placeholders = vec!["?"; data.len()].join(", ");
    Ok(Statement {
        sql: format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})"),
        params: data.values().cloned().collect(),
    })
}

/// `INSERT … RETURNING id_column`, so Postgres reports the new identifier.
pub fn insert_returning(table: &str, data: &Record, id_column: &str) -> OrmResult<Statement> {
    let mut stmt = insert(table, data)?;
    stmt.sql.push_str(" RETURNING ");
    stmt.sql.push_str(id_column);
    Ok(stmt)
}

/// `SELECT cols FROM table [WHERE …] [ORDER BY …]`
pub fn select(
    table: &str,
    columns: &Columns,
    conditions: &ConditionMap,
    order_by: Option<&str>,
) -> OrmResult<Statement> {
    let clause = compile(conditions)?;
    let mut sql = format!("SELECT {} FROM {table}", columns.to_sql()?);

    if !clause.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clause.sql());
    }
    if let Some(order) = order_by.map(str::trim).filter(|o| !o.is_empty()) {
        sql.push_str(" ORDER BY ");
        sql.push_str(order);
    }

    let (_, params) = clause.into_parts();
    Ok(Statement { sql, params })
}

/// `UPDATE table SET c1 = ?, … WHERE …`. Refuses to build without conditions.
pub fn update(table: &str, data: &Record, conditions: &ConditionMap) -> OrmResult<Statement> {
    if data.is_empty() {
        return Err(OrmError::validation(format!(
            "UPDATE of {table} requires at least one column to set"
        )));
    }
    let clause = compile(conditions)?;
    if clause.is_empty() {
        return Err(OrmError::invalid_condition(format!(
            "refusing UPDATE of {table} without conditions"
        )));
    }

    let set = data
        .columns()
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let (where_sql, where_params) = clause.into_parts();

    let mut params: Vec<Value> = data.values().cloned().collect();
    params.extend(where_params);

    Ok(Statement {
        sql: format!("UPDATE {table} SET {set} WHERE {where_sql}"),
        params,
    })
}

/// `DELETE FROM table WHERE …`. Refuses to build without conditions.
pub fn delete(table: &str, conditions: &ConditionMap) -> OrmResult<Statement> {
    let clause = compile(conditions)?;
    if clause.is_empty() {
        return Err(OrmError::invalid_condition(format!(
            "refusing DELETE from {table} without conditions"
        )));
    }
    let (where_sql, params) = clause.into_parts();
    Ok(Statement {
        sql: format!("DELETE FROM {table} WHERE {where_sql}"),
        params,
    })
}
