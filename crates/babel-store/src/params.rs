//! JSON <-> SQLite value conversion for statements sent by clients.

use babel_types::SqlParams;
use rusqlite::Statement;
use rusqlite::types::{Value as SqlValue, ValueRef};
use serde_json::{Map, Number, Value};

use crate::error::StoreError;

/// Prefixes tried, in order, for named parameters given without one.
const NAMED_PREFIXES: [char; 3] = ['@', ':', '$'];

pub(crate) fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

fn named_index(stmt: &Statement<'_>, key: &str) -> Result<Option<usize>, StoreError> {
    if key.starts_with(NAMED_PREFIXES) {
        return Ok(stmt.parameter_index(key)?);
    }
    for prefix in NAMED_PREFIXES {
        if let Some(idx) = stmt.parameter_index(&format!("{prefix}{key}"))? {
            return Ok(Some(idx));
        }
    }
    Ok(None)
}

pub(crate) fn bind(stmt: &mut Statement<'_>, params: &SqlParams) -> Result<(), StoreError> {
    match params {
        SqlParams::None => {}
        SqlParams::Positional(values) => {
            let expected = stmt.parameter_count();
            if values.len() != expected {
                return Err(StoreError::ParameterCount {
                    expected,
                    got: values.len(),
                });
            }
            for (i, value) in values.iter().enumerate() {
                stmt.raw_bind_parameter(i + 1, to_sql_value(value))?;
            }
        }
        SqlParams::Named(map) => {
            for (key, value) in map {
                let idx = named_index(stmt, key)?
                    .ok_or_else(|| StoreError::UnknownParameter(key.clone()))?;
                stmt.raw_bind_parameter(idx, to_sql_value(value))?;
            }
        }
    }
    Ok(())
}

pub(crate) fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Array(b.iter().map(|byte| Value::from(*byte)).collect()),
    }
}

/// Run a query and collect rows as objects keyed by column name.
pub(crate) fn query_rows(
    stmt: &mut Statement<'_>,
    params: &SqlParams,
    limit: Option<usize>,
) -> Result<Vec<Value>, StoreError> {
    bind(stmt, params)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut out = Vec::new();
    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let mut object = Map::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            object.insert(name.clone(), to_json(row.get_ref(i)?));
        }
        out.push(Value::Object(object));
        if limit.is_some_and(|n| out.len() >= n) {
            break;
        }
    }
    Ok(out)
}
