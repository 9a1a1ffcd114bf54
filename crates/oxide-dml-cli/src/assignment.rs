//! `column=kind:value` assignments given on the command line.

use std::str::FromStr;

use oxide_dml_core::{ColumnRef, Expr};
use url::Url;

use crate::error::CliError;

/// A literal value with the kind it was declared as.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `int:<i64>`
    Int(i64),
    /// `real:<f64>`
    Real(f64),
    /// `text:<string>`
    Text(String),
    /// `bool:<true|false>`
    Bool(bool),
    /// `url:<absolute URL>`
    Url(Url),
    /// `null`
    Null,
}

impl Literal {
    fn parse(kind: &str, value: &str) -> Result<Self, CliError> {
        let invalid = |kind: &'static str, reason: String| CliError::InvalidValue {
            kind,
            value: value.to_string(),
            reason,
        };
        match kind {
            "int" => value
                .parse()
                .map(Self::Int)
                .map_err(|e: std::num::ParseIntError| invalid("int", e.to_string())),
            "real" => value
                .parse()
                .map(Self::Real)
                .map_err(|e: std::num::ParseFloatError| invalid("real", e.to_string())),
            "bool" => value
                .parse()
                .map(Self::Bool)
                .map_err(|e: std::str::ParseBoolError| invalid("bool", e.to_string())),
            "text" => Ok(Self::Text(value.to_string())),
            "url" => Url::parse(value)
                .map(Self::Url)
                .map_err(|e| invalid("url", e.to_string())),
            "null" => Ok(Self::Null),
            other => Err(CliError::UnknownKind(other.to_string())),
        }
    }
}

/// One `--set column=kind:value` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAssignment {
    column: String,
    literal: Literal,
}

impl ColumnAssignment {
    /// Returns the column name.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the parsed literal.
    #[must_use]
    pub const fn literal(&self) -> &Literal {
        &self.literal
    }

    /// Returns a column reference typed after the literal's kind.
    #[must_use]
    pub fn column_ref(&self) -> ColumnRef {
        match &self.literal {
            Literal::Int(_) => ColumnRef::new::<i64>(self.column.as_str()),
            Literal::Real(_) => ColumnRef::new::<f64>(self.column.as_str()),
            Literal::Bool(_) => ColumnRef::new::<bool>(self.column.as_str()),
            Literal::Url(_) => ColumnRef::new::<Url>(self.column.as_str()),
            Literal::Text(_) | Literal::Null => ColumnRef::new::<String>(self.column.as_str()),
        }
    }

    /// Returns the value as an expression; `null` is an untyped NULL.
    #[must_use]
    pub fn expr(&self) -> Expr {
        match &self.literal {
            Literal::Int(i) => Expr::constant(*i),
            Literal::Real(f) => Expr::constant(*f),
            Literal::Bool(b) => Expr::constant(*b),
            Literal::Text(s) => Expr::constant(s.clone()),
            Literal::Url(u) => Expr::constant(u.clone()),
            Literal::Null => Expr::null(),
        }
    }
}

impl FromStr for ColumnAssignment {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, typed) = s
            .split_once('=')
            .filter(|(column, _)| !column.is_empty())
            .ok_or_else(|| CliError::MalformedAssignment(s.to_string()))?;
        let literal = match typed.split_once(':') {
            Some((kind, value)) => Literal::parse(kind, value)?,
            None if typed == "null" => Literal::Null,
            None => return Err(CliError::MalformedAssignment(s.to_string())),
        };
        Ok(Self {
            column: column.to_string(),
            literal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        let a: ColumnAssignment = "id=int:5".parse().unwrap();
        assert_eq!(a.column(), "id");
        assert_eq!(a.literal(), &Literal::Int(5));

        let a: ColumnAssignment = "note=text:a=b:c".parse().unwrap();
        assert_eq!(a.literal(), &Literal::Text(String::from("a=b:c")));

        let a: ColumnAssignment = "home=url:https://example.com/".parse().unwrap();
        assert!(a.column_ref().type_tag().is::<Url>());

        let a: ColumnAssignment = "name=null".parse().unwrap();
        assert_eq!(a.expr(), Expr::null());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "id".parse::<ColumnAssignment>(),
            Err(CliError::MalformedAssignment(_))
        ));
        assert!(matches!(
            "=int:1".parse::<ColumnAssignment>(),
            Err(CliError::MalformedAssignment(_))
        ));
        assert!(matches!(
            "id=uuid:1".parse::<ColumnAssignment>(),
            Err(CliError::UnknownKind(kind)) if kind == "uuid"
        ));
        let err = "id=int:five".parse::<ColumnAssignment>().unwrap_err();
        assert!(err.to_string().starts_with("Invalid int value 'five'"));
    }
}
