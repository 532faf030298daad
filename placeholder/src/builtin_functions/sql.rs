//! `SQL(query)` against a SQLite database.
//!
//! A `SELECT` gives the first column of its first row, a list when the row has several
//! columns, and null when there is no row. Any other statement runs for its side effects
//! and gives null.

use placeholder_eval::{Arity, FunctionRegistry};
use placeholder_value::{Value, ValueError};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// A database file, opened on the first query and kept open until [`Database::close`].
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    connection: RefCell<Option<Connection>>,
}

impl Database {
    /// `":memory:"` gives a private in-memory database.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            connection: RefCell::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.connection.borrow().is_some()
    }

    /// Drops the connection. The next query opens a new one.
    pub fn close(&self) {
        if self.connection.borrow_mut().take().is_some() {
            debug!(path = %self.path.display(), "closed database");
        }
    }

    pub fn query(&self, query: &str) -> Result<Value, ValueError> {
        let mut slot = self.connection.borrow_mut();
        let connection = match slot.take() {
            Some(connection) => connection,
            None => {
                debug!(path = %self.path.display(), "opening database");
                Connection::open(&self.path).map_err(database_error)?
            }
        };
        let result = run(&connection, query).map_err(database_error);
        *slot = Some(connection);
        result
    }
}

fn database_error(err: rusqlite::Error) -> ValueError {
    ValueError::Database(err.to_string())
}

fn run(connection: &Connection, query: &str) -> Result<Value, rusqlite::Error> {
    let mut statement = connection.prepare(query)?;
    let columns = statement.column_count();
    let mut rows = statement.query([])?;
    // stepping once runs statements that return no rows
    let row = match rows.next()? {
        Some(row) if is_select(query) => row,
        _ => return Ok(Value::Null),
    };

    let mut values = (0..columns)
        .map(|i| row.get_ref(i).map(from_sql))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(if values.len() == 1 {
        values.swap_remove(0)
    } else {
        Value::List(values)
    })
}

fn is_select(query: &str) -> bool {
    query
        .trim_start()
        .get(..6)
        .map_or(false, |keyword| keyword.eq_ignore_ascii_case("select"))
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(val) => Value::Int(val),
        ValueRef::Real(val) => Value::Float(val),
        ValueRef::Text(text) => Value::Str(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => {
            Value::List(bytes.iter().map(|byte| Value::Int(*byte as i64)).collect())
        }
    }
}

/// Registers `SQL` backed by `database`.
pub fn register(registry: &mut FunctionRegistry, database: Rc<Database>) {
    registry.register("SQL", Arity::Exact(1), move |args| {
        database.query(&args[0].to_string())
    });
}
