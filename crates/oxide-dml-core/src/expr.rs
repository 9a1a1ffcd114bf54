//! Value expressions and predicates.
//!
//! Clause builders accumulate [`Expr`] values: typed constants, typed NULL
//! markers, column references, and verbatim SQL fragments. The serializer
//! turns constants and NULL markers into placeholders plus [`BindValue`]s,
//! which the execution engine binds through the codec registry.

use core::any::Any;
use core::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use url::Url;

use crate::schema::{ColumnRef, Path, TypeTag};

/// A domain value that can be carried in a [`Constant`].
///
/// Implemented for every `'static` type that is `Debug + PartialEq + Send + Sync`.
pub trait DomainValue: Any + fmt::Debug + Send + Sync {
    /// Returns `self` as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Compares with another erased value of possibly different type.
    fn dyn_eq(&self, other: &dyn DomainValue) -> bool;
}

impl<T: Any + fmt::Debug + PartialEq + Send + Sync> DomainValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DomainValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// A type-erased domain value bound as a statement parameter.
#[derive(Clone)]
pub struct Constant {
    value: Arc<dyn DomainValue>,
    tag: TypeTag,
}

impl Constant {
    /// Wraps a domain value.
    #[must_use]
    pub fn new<T: DomainValue>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            tag: TypeTag::of::<T>(),
        }
    }

    /// Returns the tag of the wrapped value's type.
    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        self.tag
    }

    /// Returns the wrapped value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.as_ref().as_any().downcast_ref::<T>()
    }

    pub(crate) fn as_any(&self) -> &dyn Any {
        self.value.as_ref().as_any()
    }
}

impl fmt::Debug for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.value.as_ref(), f)
    }
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.value.as_ref().dyn_eq(other.value.as_ref())
    }
}

/// The NULL marker: "column present, value is SQL NULL".
///
/// Carries the declared type of the column when known, so that a typed NULL
/// can be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullExpr {
    tag: Option<TypeTag>,
}

impl NullExpr {
    /// An untyped NULL.
    pub const DEFAULT: Self = Self { tag: None };

    /// A NULL of domain type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            tag: Some(TypeTag::of::<T>()),
        }
    }

    /// A NULL typed after the given column.
    #[must_use]
    pub const fn for_column(column: &ColumnRef) -> Self {
        Self {
            tag: Some(column.type_tag()),
        }
    }

    /// Returns the declared type, if any.
    #[must_use]
    pub const fn type_tag(&self) -> Option<TypeTag> {
        self.tag
    }
}

/// A value expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bound constant.
    Constant(Constant),
    /// A (possibly typed) NULL.
    Null(NullExpr),
    /// A reference to another column.
    Column(ColumnRef),
    /// A verbatim SQL fragment.
    ///
    /// **Warning**: never build one from user input.
    Raw(String),
}

impl Expr {
    /// Wraps a domain value as a constant.
    #[must_use]
    pub fn constant<T: DomainValue>(value: T) -> Self {
        Self::Constant(Constant::new(value))
    }

    /// An untyped NULL.
    #[must_use]
    pub const fn null() -> Self {
        Self::Null(NullExpr::DEFAULT)
    }

    /// A verbatim SQL fragment.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Returns whether this is the NULL marker.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }
}

/// Conversion into an [`Expr`].
///
/// Plain domain values become constants, `None` becomes a NULL typed after
/// the option's inner type, and expressions pass through unchanged.
pub trait ToExpr {
    /// Converts into an expression.
    fn to_expr(self) -> Expr;

    /// The domain type a NULL of this kind should carry.
    #[must_use]
    fn value_tag() -> Option<TypeTag>
    where
        Self: Sized,
    {
        None
    }
}

impl ToExpr for Expr {
    fn to_expr(self) -> Expr {
        self
    }
}

impl ToExpr for Constant {
    fn to_expr(self) -> Expr {
        Expr::Constant(self)
    }
}

impl ToExpr for NullExpr {
    fn to_expr(self) -> Expr {
        Expr::Null(self)
    }
}

impl ToExpr for ColumnRef {
    fn to_expr(self) -> Expr {
        Expr::Column(self)
    }
}

impl<T> ToExpr for &Path<T> {
    fn to_expr(self) -> Expr {
        Expr::Column(self.column().clone())
    }
}

impl ToExpr for &str {
    fn to_expr(self) -> Expr {
        Expr::constant(String::from(self))
    }

    fn value_tag() -> Option<TypeTag> {
        Some(TypeTag::of::<String>())
    }
}

impl<T: ToExpr> ToExpr for Option<T> {
    fn to_expr(self) -> Expr {
        match self {
            Some(value) => value.to_expr(),
            None => Expr::Null(NullExpr { tag: T::value_tag() }),
        }
    }

    fn value_tag() -> Option<TypeTag> {
        T::value_tag()
    }
}

macro_rules! impl_to_expr_constant {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToExpr for $ty {
                fn to_expr(self) -> Expr {
                    Expr::constant(self)
                }

                fn value_tag() -> Option<TypeTag> {
                    Some(TypeTag::of::<$ty>())
                }
            }
        )+
    };
}

impl_to_expr_constant!(
    bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    Vec<u8>,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<Utc>,
    Url,
);

/// A filter predicate over a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = expr`
    Eq(ColumnRef, Expr),
    /// `column IS NULL`
    IsNull(ColumnRef),
    /// `column IS NOT NULL`
    IsNotNull(ColumnRef),
    /// `column IN (exprs...)`
    In(ColumnRef, Vec<Expr>),
}

impl<T: ToExpr> Path<T> {
    /// Creates an equality predicate.
    #[must_use]
    pub fn eq(&self, value: T) -> Predicate {
        Predicate::Eq(self.column().clone(), value.to_expr())
    }

    /// Creates an IN predicate.
    #[must_use]
    pub fn in_list(&self, values: impl IntoIterator<Item = T>) -> Predicate {
        Predicate::In(
            self.column().clone(),
            values.into_iter().map(ToExpr::to_expr).collect(),
        )
    }
}

impl<T> Path<T> {
    /// Creates an equality predicate against an arbitrary expression.
    #[must_use]
    pub fn eq_expr(&self, expr: Expr) -> Predicate {
        Predicate::Eq(self.column().clone(), expr)
    }

    /// Creates an IS NULL predicate.
    #[must_use]
    pub fn is_null(&self) -> Predicate {
        Predicate::IsNull(self.column().clone())
    }

    /// Creates an IS NOT NULL predicate.
    #[must_use]
    pub fn is_not_null(&self) -> Predicate {
        Predicate::IsNotNull(self.column().clone())
    }
}

/// One entry of a serializer's ordered parameter list.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    /// Bind a constant through its codec.
    Value(Constant),
    /// Bind a (typed) SQL NULL.
    Null(NullExpr),
}
