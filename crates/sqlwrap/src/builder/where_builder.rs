//! WHERE clause rendering shared by SELECT, UPDATE and DELETE.

use crate::condition::{Condition, Op};
use crate::error::{DbError, DbResult};
use crate::ident::write_quoted;
use crate::value::Value;

/// Render `conditions` as `<c1> and <c2> ...`, appending arguments to `args`.
///
/// An empty list renders as an empty string. Arguments are pushed in the same order their
/// placeholders appear, so callers that render a SET list first keep a consistent order.
///
/// ```ignore
/// {"one",   In,      [1, 2, 3]}             -> `one` in (?, ?, ?)
/// {"two",   Between, [10, 20]}              -> `two` between ? and ?
/// {"three", Gt,      10}                    -> `three` > ?
/// {"apply", Apply,   ["a = ? or b > ?", 1, 2]} -> (a = ? or b > ?)
/// ```
pub fn build_where(conditions: &[Condition], args: &mut Vec<Value>) -> DbResult<String> {
    let mut out = String::new();
    for (i, cond) in conditions.iter().enumerate() {
        if i > 0 {
            out.push_str(" and ");
        }
        write_condition(cond, &mut out, args)?;
    }
    Ok(out)
}

fn write_condition(cond: &Condition, out: &mut String, args: &mut Vec<Value>) -> DbResult<()> {
    if cond.value.is_map() {
        return Err(DbError::invalid(format!(
            "[{}] where value must not be a map",
            cond.field
        )));
    }

    match cond.op {
        op if op.is_simple() => {
            write_quoted(&cond.field, out);
            out.push(' ');
            out.push_str(op.as_sql());
            out.push_str(" ?");
            args.push(cond.value.clone());
        }
        Op::In | Op::NotIn => write_in(cond, out, args)?,
        Op::Between | Op::NotBetween => write_between(cond, out, args)?,
        Op::Apply => write_apply(cond, out, args)?,
        op => {
            return Err(DbError::invalid(format!(
                "[{}] operator '{op}' is not supported",
                cond.field
            )));
        }
    }
    Ok(())
}

fn write_in(cond: &Condition, out: &mut String, args: &mut Vec<Value>) -> DbResult<()> {
    let Some(items) = cond.value.as_list() else {
        return Err(DbError::invalid(format!(
            "[{}] {} expects a list, got {}",
            cond.field,
            cond.op,
            cond.value.kind()
        )));
    };
    if items.is_empty() {
        return Err(DbError::invalid(format!(
            "[{}] {} list must not be empty",
            cond.field, cond.op
        )));
    }

    write_quoted(&cond.field, out);
    out.push(' ');
    out.push_str(cond.op.as_sql());
    out.push_str(" (");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('?');
        args.push(item.clone());
    }
    out.push(')');
    Ok(())
}

fn write_between(cond: &Condition, out: &mut String, args: &mut Vec<Value>) -> DbResult<()> {
    let [from, to] = cond.value.as_list().unwrap_or_default() else {
        return Err(DbError::invalid(format!(
            "[{}] {} expects exactly two values",
            cond.field, cond.op
        )));
    };

    write_quoted(&cond.field, out);
    out.push(' ');
    out.push_str(cond.op.as_sql());
    out.push_str(" ? and ?");
    args.push(from.clone());
    args.push(to.clone());
    Ok(())
}

fn write_apply(cond: &Condition, out: &mut String, args: &mut Vec<Value>) -> DbResult<()> {
    let Some((first, rest)) = cond.value.as_list().and_then(<[Value]>::split_first) else {
        return Err(DbError::invalid(format!(
            "[{}] apply expects a SQL fragment followed by its arguments",
            cond.field
        )));
    };
    let Some(fragment) = first.as_str() else {
        return Err(DbError::invalid(format!(
            "[{}] apply fragment must be text, got {}",
            cond.field,
            first.kind()
        )));
    };

    // Placeholder count is the caller's responsibility.
    out.push('(');
    out.push_str(fragment);
    out.push(')');
    args.extend(rest.iter().cloned());
    Ok(())
}
