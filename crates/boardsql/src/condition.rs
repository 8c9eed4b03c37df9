//! Condition maps and the WHERE-clause compiler.
//!
//! A [`ConditionMap`] describes a WHERE predicate declaratively: each column maps to a
//! [`Condition`], and [`compile`] turns the map into an `AND`-joined clause with `?`
//! placeholders plus the matching positional bind values.
//!
//! ```ignore
//! use boardsql::{ConditionMap, compile};
//!
//! let conditions = ConditionMap::new()
//!     .eq("board_id", 5)
//!     .not("is_deleted", true)
//!     .between("views", 10, 100);
//!
//! let clause = compile(&conditions)?;
//! assert_eq!(clause.sql(), "board_id = ? AND is_deleted != ? AND views BETWEEN ? AND ?");
//! ```

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a [`Condition::Descriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Equal: column = value
    Is,
    /// Not equal: column != value
    Not,
    /// Substring match: column LIKE %value%
    Like,
    /// Greater than: column > value
    Gt,
    /// Greater than or equal: column >= value
    Gte,
    /// Less than: column < value
    Lt,
    /// Less than or equal: column <= value
    Lte,
    /// IN (list)
    In,
    /// BETWEEN min AND max
    Between,
}

impl Op {
    /// Name used in `{type, value}` descriptors.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Is => "is",
            Op::Not => "not",
            Op::Like => "like",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::In => "in",
            Op::Between => "between",
        }
    }

    /// SQL operator keyword.
    pub fn sql_operator(self) -> &'static str {
        match self {
            Op::Is => "=",
            Op::Not => "!=",
            Op::Like => "LIKE",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::In => "IN",
            Op::Between => "BETWEEN",
        }
    }
}

impl FromStr for Op {
    type Err = OrmError;

    fn from_str(s: &str) -> OrmResult<Self> {
        Ok(match s {
            "is" => Op::Is,
            "not" => Op::Not,
            "like" => Op::Like,
            "gt" => Op::Gt,
            "gte" => Op::Gte,
            "lt" => Op::Lt,
            "lte" => Op::Lte,
            "in" => Op::In,
            "between" => Op::Between,
            other => {
                return Err(OrmError::invalid_condition(format!(
                    "unknown condition type '{other}'"
                )));
            }
        })
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `value` half of a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(Value),
    List(Vec<Value>),
}

/// What a single column of a [`ConditionMap`] must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// column = value
    Scalar(Value),
    /// column IN (values...)
    Sequence(Vec<Value>),
    /// An explicit operator.
    Descriptor { op: Op, value: Operand },
}

impl Condition {
    /// Descriptor with a scalar operand.
    pub fn op(op: Op, value: impl Into<Value>) -> Self {
        Condition::Descriptor {
            op,
            value: Operand::Scalar(value.into()),
        }
    }

    /// Descriptor with a list operand.
    pub fn op_list<I, T>(op: Op, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Condition::Descriptor {
            op,
            value: Operand::List(values.into_iter().map(Into::into).collect()),
        }
    }

    /// `BETWEEN` descriptor. Bounds are validated and ordered at compile time.
    pub fn between(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Condition::Descriptor {
            op: Op::Between,
            value: Operand::List(vec![min.into(), max.into()]),
        }
    }
}

/// Convert a JSON value into a condition, detecting its shape: an object with a
/// `type` field is a descriptor, an array is a sequence, anything else is a scalar.
impl TryFrom<serde_json::Value> for Condition {
    type Error = OrmError;

    fn try_from(v: serde_json::Value) -> OrmResult<Self> {
        match v {
            serde_json::Value::Object(mut obj) if obj.contains_key("type") => {
                let op = match obj.remove("type") {
                    Some(serde_json::Value::String(s)) => s.parse::<Op>()?,
                    other => {
                        return Err(OrmError::invalid_condition(format!(
                            "condition type must be a string, got {other:?}"
                        )));
                    }
                };
                let value = match obj.remove("value").unwrap_or(serde_json::Value::Null) {
                    serde_json::Value::Array(items) => {
                        Operand::List(items.into_iter().map(Value::from).collect())
                    }
                    other => Operand::Scalar(Value::from(other)),
                };
                Ok(Condition::Descriptor { op, value })
            }
            serde_json::Value::Array(items) => Ok(Condition::Sequence(
                items.into_iter().map(Value::from).collect(),
            )),
            other => Ok(Condition::Scalar(Value::from(other))),
        }
    }
}

/// An ordered mapping from column name to [`Condition`].
///
/// Column names are emitted verbatim and must come from the caller, never from
/// user input. Only values are parameterized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionMap {
    entries: Vec<(String, Condition)>,
}

impl ConditionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object, keeping document order.
    pub fn from_json(json: &str) -> OrmResult<Self> {
        serde_json::from_str(json).map_err(|e| OrmError::invalid_condition(e.to_string()))
    }

    /// Set the condition for a column. Re-setting a column keeps its original position.
    pub fn insert(&mut self, column: impl Into<String>, condition: Condition) {
        let column = column.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => *slot = condition,
            None => self.entries.push((column, condition)),
        }
    }

    /// Add an arbitrary condition.
    pub fn with(mut self, column: impl Into<String>, condition: Condition) -> Self {
        self.insert(column, condition);
        self
    }

    /// column = value (plain scalar)
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Condition::Scalar(value.into()))
    }

    /// column IN (values...) (plain sequence)
    pub fn any_of<I, T>(self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.with(
            column,
            Condition::Sequence(values.into_iter().map(Into::into).collect()),
        )
    }

    /// `{type: "is"}`: column = value
    pub fn is(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Condition::op(Op::Is, value))
    }

    /// `{type: "not"}`: column != value
    pub fn not(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Condition::op(Op::Not, value))
    }

    /// `{type: "like"}`: column LIKE %value%
    pub fn like(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Condition::op(Op::Like, value))
    }

    /// `{type: "gt"}`: column > value
    pub fn gt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Condition::op(Op::Gt, value))
    }

    /// `{type: "gte"}`: column >= value
    pub fn gte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Condition::op(Op::Gte, value))
    }

    /// `{type: "lt"}`: column < value
    pub fn lt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Condition::op(Op::Lt, value))
    }

    /// `{type: "lte"}`: column <= value
    pub fn lte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Condition::op(Op::Lte, value))
    }

    /// `{type: "in"}`: column IN (values...)
    pub fn in_list<I, T>(self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.with(column, Condition::op_list(Op::In, values))
    }

    /// `{type: "between"}`: column BETWEEN min AND max
    pub fn between(
        self,
        column: impl Into<String>,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> Self {
        self.with(column, Condition::between(min, max))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(column, condition)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.entries.iter().map(|(c, cond)| (c.as_str(), cond))
    }
}

impl<K: Into<String>> FromIterator<(K, Condition)> for ConditionMap {
    fn from_iter<I: IntoIterator<Item = (K, Condition)>>(iter: I) -> Self {
        let mut map = ConditionMap::new();
        for (k, c) in iter {
            map.insert(k, c);
        }
        map
    }
}

struct ConditionMapVisitor;

impl<'de> Visitor<'de> for ConditionMapVisitor {
    type Value = ConditionMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping column names to conditions")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ConditionMap, A::Error> {
        let mut map = ConditionMap::new();
        while let Some((column, raw)) = access.next_entry::<String, serde_json::Value>()? {
            let condition = Condition::try_from(raw)
                .map_err(|e| de::Error::custom(format!("{column}: {e}")))?;
            map.insert(column, condition);
        }
        Ok(map)
    }
}

/// Deserializes from an object in document order; unknown descriptor types are rejected.
impl<'de> Deserialize<'de> for ConditionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ConditionMapVisitor)
    }
}

/// A compiled WHERE clause: one fragment per emitting column plus positional binds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledClause {
    fragments: Vec<String>,
    params: Vec<Value>,
}

impl CompiledClause {
    /// `true` when no column produced a fragment. Callers must omit `WHERE`.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Individual fragments in emission order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Fragments joined with ` AND ` (no leading `WHERE`).
    pub fn sql(&self) -> String {
        self.fragments.join(" AND ")
    }

    /// Bind values in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Consume into `(sql, params)`.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.fragments.join(" AND "), self.params)
    }

    fn push(&mut self, fragment: String, params: impl IntoIterator<Item = Value>) {
        self.fragments.push(fragment);
        self.params.extend(params);
    }

    fn push_in(&mut self, column: &str, values: &[Value]) {
        if values.is_empty() {
            // Membership in an empty set matches nothing; `IN ()` is not valid SQL.
            self.fragments.push("1=0".to_string());
            return;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        self.push(format!("{column} IN ({placeholders})"), values.iter().cloned());
    }
}

/// Compile a condition map into a WHERE clause body and its bind values.
pub fn compile(conditions: &ConditionMap) -> OrmResult<CompiledClause> {
    let mut clause = CompiledClause::default();

    for (column, condition) in conditions.iter() {
        match condition {
            Condition::Scalar(v) => clause.push(format!("{column} = ?"), [v.clone()]),
            Condition::Sequence(values) => clause.push_in(column, values),
            Condition::Descriptor { op, value } => compile_descriptor(&mut clause, column, *op, value)?,
        }
    }

    Ok(clause)
}

fn compile_descriptor(
    clause: &mut CompiledClause,
    column: &str,
    op: Op,
    operand: &Operand,
) -> OrmResult<()> {
    match (op, operand) {
        (Op::In, Operand::List(values)) => clause.push_in(column, values),
        (Op::In, Operand::Scalar(_)) => {
            tracing::warn!(
                target: "boardsql.sql",
                column,
                "`in` condition without a list operand; column skipped"
            );
        }
        (Op::Between, operand) => {
            let (min, max) = between_bounds(column, operand)?;
            clause.push(format!("{column} BETWEEN ? AND ?"), [min, max]);
        }
        (Op::Like, operand) => {
            let pattern = format!("%{}%", like_text(operand));
            clause.push(format!("{column} LIKE ?"), [Value::Text(pattern)]);
        }
        (op, Operand::Scalar(v)) => {
            clause.push(format!("{column} {} ?", op.sql_operator()), [v.clone()]);
        }
        (op, Operand::List(_)) => {
            return Err(OrmError::invalid_condition(format!(
                "`{op}` condition on {column} expects a single value, got a list"
            )));
        }
    }
    Ok(())
}

fn like_text(operand: &Operand) -> String {
    match operand {
        Operand::Scalar(Value::Text(s)) => s.clone(),
        Operand::Scalar(Value::Null) => "null".to_string(),
        Operand::Scalar(other) => match serde_json::to_value(other) {
            Ok(serde_json::Value::String(s)) => s,
            Ok(v) => v.to_string(),
            Err(_) => String::new(),
        },
        Operand::List(vs) => vs
            .iter()
            .map(|v| like_text(&Operand::Scalar(v.clone())))
            .collect::<Vec<_>>()
            .join(","),
    }
}

fn between_bounds(column: &str, operand: &Operand) -> OrmResult<(Value, Value)> {
    let Operand::List(bounds) = operand else {
        return Err(OrmError::invalid_condition(format!(
            "invalid between values for {column}: expected [min, max]"
        )));
    };
    let [min, max] = bounds.as_slice() else {
        return Err(OrmError::invalid_condition(format!(
            "invalid between values for {column}: expected exactly two bounds, got {}",
            bounds.len()
        )));
    };
    if min.is_null() || max.is_null() {
        return Err(OrmError::invalid_condition(format!(
            "invalid between values for {column}: min and max are required"
        )));
    }
    let (Some(mut lo), Some(mut hi)) = (min.to_numeric(), max.to_numeric()) else {
        return Err(OrmError::invalid_condition(format!(
            "invalid between values for {column}: values must be numbers"
        )));
    };
    if lo.as_f64() > hi.as_f64() {
        std::mem::swap(&mut lo, &mut hi);
    }
    Ok((lo.into_value(), hi.into_value()))
}
