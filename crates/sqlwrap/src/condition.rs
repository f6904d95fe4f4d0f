//! Filter conditions and column assignments.
//!
//! A [`Condition`] is one `field <op> value` filter; a list of them is joined with `and`
//! when rendered. An [`Assignment`] is one column written by INSERT or UPDATE.
//!
//! Nothing here is validated on construction: arity and value-shape checks happen when the
//! statement is rendered, so a bad condition surfaces as an error from the builder rather
//! than a panic halfway through a method chain.

use crate::error::{DbError, DbResult};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a [`Condition`].
///
/// The set is closed; anything else is rejected by [`Op::from_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<>`
    LtGt,
    /// `like`
    Like,
    /// `not like`
    NotLike,
    /// `in (...)`
    In,
    /// `not in (...)`
    NotIn,
    /// `between ? and ?`
    Between,
    /// `not between ? and ?`
    NotBetween,
    /// Raw boolean fragment with its own placeholders
    Apply,
}

impl Op {
    /// SQL keyword or symbol for this operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::LtGt => "<>",
            Op::Like => "like",
            Op::NotLike => "not like",
            Op::In => "in",
            Op::NotIn => "not in",
            Op::Between => "between",
            Op::NotBetween => "not between",
            Op::Apply => "apply",
        }
    }

    /// Operators rendered as `field <op> ?` with a single argument.
    pub fn is_simple(self) -> bool {
        matches!(
            self,
            Op::Eq
                | Op::Ne
                | Op::Lt
                | Op::Le
                | Op::Gt
                | Op::Ge
                | Op::LtGt
                | Op::Like
                | Op::NotLike
        )
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Op {
    type Err = DbError;

    fn from_str(s: &str) -> DbResult<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let op = match normalized.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "" => return Err(DbError::invalid("operator must not be empty")),
            "=" => Op::Eq,
            "!=" => Op::Ne,
            "<" => Op::Lt,
            "<=" => Op::Le,
            ">" => Op::Gt,
            ">=" => Op::Ge,
            "<>" => Op::LtGt,
            "like" => Op::Like,
            "not like" => Op::NotLike,
            "in" => Op::In,
            "not in" => Op::NotIn,
            "between" => Op::Between,
            "not between" => Op::NotBetween,
            "apply" => Op::Apply,
            _ => {
                return Err(DbError::invalid(format!("operator '{s}' is not supported")));
            }
        };
        Ok(op)
    }
}

/// One filter clause: `field <op> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Unquoted column reference, possibly `alias.column`. Just `apply` for [`Op::Apply`].
    pub field: String,
    pub op: Op,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Parse the operator from text, e.g. `Condition::parse("age", ">=", 18)`.
    pub fn parse(field: impl Into<String>, op: &str, value: impl Into<Value>) -> DbResult<Self> {
        let field = field.into();
        let op = op
            .parse::<Op>()
            .map_err(|e| DbError::invalid(format!("[{field}] {}", strip_kind(&e))))?;
        Ok(Self::new(field, op, value))
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Eq, value)
    }

    /// `field in (values...)`
    pub fn in_list<T: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::new(field, Op::In, Value::list(values))
    }

    /// `field between from and to`
    pub fn between(
        field: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        Self::new(field, Op::Between, Value::List(vec![from.into(), to.into()]))
    }

    /// `(<sql>)` with `args` bound to the placeholders inside `sql`.
    pub fn apply<T: Into<Value>>(sql: impl Into<String>, args: impl IntoIterator<Item = T>) -> Self {
        let mut items = vec![Value::Text(sql.into())];
        items.extend(args.into_iter().map(Into::into));
        Self::new("apply", Op::Apply, Value::List(items))
    }
}

fn strip_kind(err: &DbError) -> String {
    match err {
        DbError::InvalidQuery(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// How an [`Assignment`] value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignKind {
    /// Bound as a `?` argument.
    Value,
    /// Spliced verbatim as SQL (e.g. `NOW()`); the value must be text.
    Expression,
}

/// One column written by INSERT or UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub field: String,
    pub kind: AssignKind,
    pub value: Value,
}

impl Assignment {
    /// A bound value: `` `field` = ? ``
    pub fn value(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            kind: AssignKind::Value,
            value: value.into(),
        }
    }

    /// A raw SQL expression: `` `field` = <expr> ``
    pub fn expression(field: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: AssignKind::Expression,
            value: Value::Text(expr.into()),
        }
    }
}
