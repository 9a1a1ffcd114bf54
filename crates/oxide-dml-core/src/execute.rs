//! Statement execution.
//!
//! Every statement goes through the same scoped sequence: prepare, bind each
//! parameter through the codec registry, run, close. The statement is closed
//! exactly once on every path. Backend failures surface as
//! [`DmlError::Execution`] carrying the SQL text. When closing fails while
//! another error is already propagating, the close failure is logged and
//! suppressed so that the original error stays visible.

use tracing::{debug, warn};

use crate::config::Configuration;
use crate::connection::{Connection, PreparedStatement, Row};
use crate::error::{BackendError, DmlError, Result};
use crate::expr::BindValue;

/// Runs a data-modifying statement and returns the affected row count.
pub fn execute_update<C: Connection + ?Sized>(
    connection: &mut C,
    configuration: &Configuration,
    sql: &str,
    bindings: &[BindValue],
) -> Result<u64> {
    let rows = run(connection, configuration, sql, bindings, |stmt| {
        stmt.execute_update()
    })?;
    debug!(sql = %sql, rows, "Statement executed");
    Ok(rows)
}

/// Runs a query and collects its rows.
pub fn execute_query<C: Connection + ?Sized>(
    connection: &mut C,
    configuration: &Configuration,
    sql: &str,
    bindings: &[BindValue],
) -> Result<Vec<Row>> {
    let rows = run(connection, configuration, sql, bindings, |stmt| {
        stmt.execute_query()
    })?;
    debug!(sql = %sql, rows = rows.len(), "Query returned");
    Ok(rows)
}

fn run<C, T>(
    connection: &mut C,
    configuration: &Configuration,
    sql: &str,
    bindings: &[BindValue],
    action: impl FnOnce(&mut dyn PreparedStatement) -> std::result::Result<T, BackendError>,
) -> Result<T>
where
    C: Connection + ?Sized,
{
    debug!(sql = %sql, parameters = bindings.len(), "Executing SQL");

    let mut stmt = connection
        .prepare(sql)
        .map_err(|source| DmlError::execution(sql, source))?;

    let outcome = bind_all(stmt.as_mut(), configuration, sql, bindings).and_then(|()| {
        action(stmt.as_mut()).map_err(|source| DmlError::execution(sql, source))
    });

    match (outcome, stmt.close()) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(source)) => Err(DmlError::execution(sql, source)),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_error)) => {
            warn!(
                sql = %sql,
                error = %close_error,
                "Failed to release statement after an earlier failure"
            );
            Err(err)
        }
    }
}

fn bind_all(
    stmt: &mut dyn PreparedStatement,
    configuration: &Configuration,
    sql: &str,
    bindings: &[BindValue],
) -> Result<()> {
    let registry = configuration.registry();
    for (index, binding) in bindings.iter().enumerate() {
        registry
            .bind(stmt, index + 1, binding)?
            .map_err(|source| DmlError::execution(sql, source))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::dialect::GenericDialect;
    use crate::expr::{Constant, NullExpr};
    use crate::value::{SqlType, SqlValue};

    #[derive(Default)]
    struct Script {
        fail_execute: bool,
        fail_close: bool,
        closed: usize,
        bound: Vec<(usize, SqlValue)>,
    }

    struct Statement(Rc<RefCell<Script>>);

    impl PreparedStatement for Statement {
        fn bind(&mut self, position: usize, value: SqlValue) -> std::result::Result<(), BackendError> {
            self.0.borrow_mut().bound.push((position, value));
            Ok(())
        }

        fn bind_null(
            &mut self,
            position: usize,
            _sql_type: SqlType,
        ) -> std::result::Result<(), BackendError> {
            self.bind(position, SqlValue::Null)
        }

        fn execute_update(&mut self) -> std::result::Result<u64, BackendError> {
            if self.0.borrow().fail_execute {
                Err("constraint violated".into())
            } else {
                Ok(1)
            }
        }

        fn execute_query(&mut self) -> std::result::Result<Vec<Row>, BackendError> {
            Ok(vec![])
        }

        fn close(self: Box<Self>) -> std::result::Result<(), BackendError> {
            let mut script = self.0.borrow_mut();
            script.closed += 1;
            if script.fail_close {
                Err("close failed".into())
            } else {
                Ok(())
            }
        }
    }

    struct Conn(Rc<RefCell<Script>>);

    impl Connection for Conn {
        fn prepare<'s>(
            &'s mut self,
            _sql: &str,
        ) -> std::result::Result<Box<dyn PreparedStatement + 's>, BackendError> {
            Ok(Box::new(Statement(Rc::clone(&self.0))))
        }
    }

    fn connection(fail_execute: bool, fail_close: bool) -> (Conn, Rc<RefCell<Script>>) {
        let script = Rc::new(RefCell::new(Script {
            fail_execute,
            fail_close,
            ..Script::default()
        }));
        (Conn(Rc::clone(&script)), script)
    }

    #[test]
    fn test_binds_in_order_and_closes_once() {
        let (mut conn, script) = connection(false, false);
        let config = Configuration::new(GenericDialect::new());
        let rows = execute_update(
            &mut conn,
            &config,
            "UPDATE t SET a = ?, b = ?",
            &[
                BindValue::Value(Constant::new(String::from("x"))),
                BindValue::Null(NullExpr::of::<i64>()),
            ],
        )
        .unwrap();
        assert_eq!(rows, 1);
        let script = script.borrow();
        assert_eq!(
            script.bound,
            vec![(1, SqlValue::Text(String::from("x"))), (2, SqlValue::Null)]
        );
        assert_eq!(script.closed, 1);
    }

    #[test]
    fn test_close_failure_after_success_is_an_error() {
        let (mut conn, script) = connection(false, true);
        let config = Configuration::new(GenericDialect::new());
        let err = execute_update(&mut conn, &config, "DELETE FROM t", &[]).unwrap_err();
        assert_eq!(err.sql(), Some("DELETE FROM t"));
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string).as_deref(),
            Some("close failed")
        );
        assert_eq!(script.borrow().closed, 1);
    }

    #[test]
    fn test_close_failure_does_not_mask_execute_failure() {
        let (mut conn, script) = connection(true, true);
        let config = Configuration::new(GenericDialect::new());
        let err = execute_update(&mut conn, &config, "INSERT INTO t VALUES (1)", &[]).unwrap_err();
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string).as_deref(),
            Some("constraint violated")
        );
        assert_eq!(script.borrow().closed, 1);
    }

    #[test]
    fn test_missing_codec_still_closes() {
        #[derive(Debug, PartialEq)]
        struct Unregistered;

        let (mut conn, script) = connection(false, false);
        let config = Configuration::new(GenericDialect::new());
        let err = execute_update(
            &mut conn,
            &config,
            "INSERT INTO t VALUES (?)",
            &[BindValue::Value(Constant::new(Unregistered))],
        )
        .unwrap_err();
        assert!(matches!(err, DmlError::MissingCodec { .. }));
        assert_eq!(script.borrow().closed, 1);
    }
}
