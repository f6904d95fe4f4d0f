//! Fluent query/update condition builder.
//!
//! A [`Wrapper`] describes one logical statement: filters, paging, the columns to select and,
//! for writes, the columns to set. It is handed to a [`Dao`](crate::Dao) operation which
//! renders and runs it.
//!
//! Methods never fail. Anything that goes wrong while chaining (an unknown operator, a value
//! that cannot be encoded as JSON) is recorded and reported by [`Wrapper::check`], which
//! every `Dao` operation calls before touching a connection.
//!
//! # Example
//!
//! ```ignore
//! use sqlwrap::Wrapper;
//!
//! let w = Wrapper::new()
//!     .select(["id", "name"])
//!     .eq("class_id", 3)
//!     .in_list("age", [18, 19, 20])
//!     .like_right("name", "li")
//!     .order("id desc")
//!     .page(2)
//!     .limit(20);
//! ```

use crate::builder::{self, BuiltQuery, QuerySpec};
use crate::condition::{Assignment, Condition, Op};
use crate::error::{DbError, DbResult};
use crate::value::Value;
use serde::Serialize;

/// Single-use statement description. See the [module docs](self).
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Wrapper {
    spec: QuerySpec,
    data: Vec<Assignment>,
    errors: Vec<String>,
}

/// Start a new, empty [`Wrapper`].
pub fn wrapper() -> Wrapper {
    Wrapper::new()
}

impl Wrapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated statement description.
    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// The accumulated column assignments.
    pub fn data(&self) -> &[Assignment] {
        &self.data
    }

    /// Errors recorded while building, in the order they happened.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Fail with every recorded error joined into one [`DbError::Wrapper`].
    pub fn check(&self) -> DbResult<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(DbError::Wrapper(self.errors.join("; ")))
    }

    /// Render the paged SELECT this wrapper describes against its own table name.
    ///
    /// Requires [`Wrapper::table_name`]; useful for logging and tests.
    pub fn to_select_sql(&self) -> DbResult<BuiltQuery> {
        self.check()?;
        builder::build_select("", &self.spec)
    }

    // ==================== Statement shape ====================

    /// Target a different table than the one bound to the `Dao`.
    pub fn table_name(mut self, table: impl Into<String>) -> Self {
        self.spec.table_name = table.into();
        self
    }

    /// Columns to select; an empty list selects `*`.
    ///
    /// Entries are used verbatim, so computed columns such as
    /// [`null_to_default_str`](crate::ident::null_to_default_str) work here.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Table alias, e.g. `s` in `select ... from student s`.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.spec.alias = name.into();
        self
    }

    /// Append a raw join clause, e.g. `left join class c on s.class_id = c.id`.
    ///
    /// Blank clauses are ignored.
    pub fn join(mut self, join: &str) -> Self {
        let join = join.trim();
        if !join.is_empty() {
            self.spec.join.push(' ');
            self.spec.join.push_str(join);
        }
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.spec.group = group.into();
        self
    }

    pub fn having(mut self, having: impl Into<String>) -> Self {
        self.spec.having = having.into();
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.spec.order = order.into();
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.spec.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.spec.offset = offset;
        self
    }

    /// 1-based page number; pages past the first override [`Wrapper::offset`].
    pub fn page(mut self, page: u64) -> Self {
        self.spec.page = page;
        self
    }

    /// Read from the primary connection instead of the replica.
    pub fn use_primary(mut self, use_primary: bool) -> Self {
        self.spec.use_primary = use_primary;
        self
    }

    // ==================== Conditions ====================

    fn push(mut self, field: &str, op: Op, value: Value) -> Self {
        self.spec.conditions.push(Condition::new(field, op, value));
        self
    }

    /// `field = value`
    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Op::Eq, value.into())
    }

    /// `field != value`
    pub fn ne(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Op::Ne, value.into())
    }

    /// `field > value`
    pub fn gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Op::Gt, value.into())
    }

    /// `field >= value`
    pub fn ge(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Op::Ge, value.into())
    }

    /// `field < value`
    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Op::Lt, value.into())
    }

    /// `field <= value`
    pub fn le(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Op::Le, value.into())
    }

    /// `field between from and to`
    pub fn between(self, field: &str, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        self.push(field, Op::Between, Value::List(vec![from.into(), to.into()]))
    }

    /// `field not between from and to`
    pub fn not_between(self, field: &str, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        self.push(
            field,
            Op::NotBetween,
            Value::List(vec![from.into(), to.into()]),
        )
    }

    /// `field like '%value%'`
    pub fn like(self, field: &str, value: &str) -> Self {
        self.push(field, Op::Like, Value::Text(format!("%{value}%")))
    }

    /// `field not like '%value%'`
    pub fn not_like(self, field: &str, value: &str) -> Self {
        self.push(field, Op::NotLike, Value::Text(format!("%{value}%")))
    }

    /// `field like '%value'`
    pub fn like_left(self, field: &str, value: &str) -> Self {
        self.push(field, Op::Like, Value::Text(format!("%{value}")))
    }

    /// `field like 'value%'`
    pub fn like_right(self, field: &str, value: &str) -> Self {
        self.push(field, Op::Like, Value::Text(format!("{value}%")))
    }

    /// `field in (values...)`; an empty list fails when the statement is rendered.
    pub fn in_list<T: Into<Value>>(self, field: &str, values: impl IntoIterator<Item = T>) -> Self {
        self.push(field, Op::In, Value::list(values))
    }

    /// `field not in (values...)`; an empty list fails when the statement is rendered.
    pub fn not_in<T: Into<Value>>(self, field: &str, values: impl IntoIterator<Item = T>) -> Self {
        self.push(field, Op::NotIn, Value::list(values))
    }

    /// A raw boolean fragment with `?` placeholders, rendered as `(<sql>)`.
    ///
    /// ```ignore
    /// w.apply("a = ? or b > ?", [1, 2])
    /// ```
    pub fn apply<T: Into<Value>>(mut self, sql: &str, args: impl IntoIterator<Item = T>) -> Self {
        self.spec.conditions.push(Condition::apply(sql, args));
        self
    }

    /// A condition with the operator given as text, e.g. `where_op("age", ">=", 18)`.
    ///
    /// An unknown operator is recorded as an error.
    pub fn where_op(mut self, field: &str, op: &str, value: impl Into<Value>) -> Self {
        match Condition::parse(field, op, value) {
            Ok(cond) => self.spec.conditions.push(cond),
            Err(err) => self.errors.push(err.to_string()),
        }
        self
    }

    /// Append a prepared condition.
    pub fn condition(mut self, cond: Condition) -> Self {
        self.spec.conditions.push(cond);
        self
    }

    /// Replace every condition.
    pub fn where_items(mut self, conditions: Vec<Condition>) -> Self {
        self.spec.conditions = conditions;
        self
    }

    // ==================== Assignments ====================

    /// Write `value` to `field`.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.data.push(Assignment::value(field, value));
        self
    }

    /// Write `value` encoded as a JSON string.
    ///
    /// An encoding failure is recorded as an error naming the field.
    pub fn set_json<T: Serialize + ?Sized>(mut self, field: &str, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(json) => self.data.push(Assignment::value(field, json)),
            Err(err) => self
                .errors
                .push(DbError::Serialization(format!("{field}: {err}")).to_string()),
        }
        self
    }

    /// Write a raw SQL expression, e.g. `set_exp("updated_at", "NOW()")`.
    pub fn set_exp(mut self, field: &str, expr: &str) -> Self {
        self.data.push(Assignment::expression(field, expr));
        self
    }

    /// Append prepared assignments.
    pub fn set_all(mut self, data: impl IntoIterator<Item = Assignment>) -> Self {
        self.data.extend(data);
        self
    }
}
