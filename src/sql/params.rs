//! Typed bind values collected while building dynamic SQL.

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::{Query, QueryAs, QueryScalar};
use uuid::Uuid;

/// A value bound to a `$n` placeholder produced by the query builder.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Text(String),
    Bool(bool),
    I32(i32),
    F64(f64),
    Uuid(Uuid),
    UuidArray(Vec<Uuid>),
}

impl PgBindValue {
    pub fn bind<'q>(self, q: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        match self {
            PgBindValue::Text(s) => q.bind(s),
            PgBindValue::Bool(b) => q.bind(b),
            PgBindValue::I32(n) => q.bind(n),
            PgBindValue::F64(n) => q.bind(n),
            PgBindValue::Uuid(u) => q.bind(u),
            PgBindValue::UuidArray(v) => q.bind(v),
        }
    }

    pub fn bind_as<'q, O>(
        self,
        q: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        match self {
            PgBindValue::Text(s) => q.bind(s),
            PgBindValue::Bool(b) => q.bind(b),
            PgBindValue::I32(n) => q.bind(n),
            PgBindValue::F64(n) => q.bind(n),
            PgBindValue::Uuid(u) => q.bind(u),
            PgBindValue::UuidArray(v) => q.bind(v),
        }
    }

    pub fn bind_scalar<'q, O>(
        self,
        q: QueryScalar<'q, Postgres, O, PgArguments>,
    ) -> QueryScalar<'q, Postgres, O, PgArguments> {
        match self {
            PgBindValue::Text(s) => q.bind(s),
            PgBindValue::Bool(b) => q.bind(b),
            PgBindValue::I32(n) => q.bind(n),
            PgBindValue::F64(n) => q.bind(n),
            PgBindValue::Uuid(u) => q.bind(u),
            PgBindValue::UuidArray(v) => q.bind(v),
        }
    }
}

/// SQL text plus its parameters in placeholder order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    pub fn new() -> Self {
        QueryBuf::default()
    }

    /// Append a parameter and return its placeholder, e.g. `$3`.
    pub fn push_param(&mut self, v: PgBindValue) -> String {
        self.params.push(v);
        format!("${}", self.params.len())
    }

    /// `sqlx::query_as` with every parameter bound.
    pub fn query_as<'q, O>(&'q self) -> QueryAs<'q, Postgres, O, PgArguments>
    where
        O: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
    {
        self.params
            .iter()
            .cloned()
            .fold(sqlx::query_as::<_, O>(&self.sql), |q, p| p.bind_as(q))
    }

    /// `sqlx::query_scalar` with every parameter bound.
    pub fn query_scalar<'q, O>(&'q self) -> QueryScalar<'q, Postgres, O, PgArguments>
    where
        (O,): for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
    {
        self.params
            .iter()
            .cloned()
            .fold(sqlx::query_scalar::<_, O>(&self.sql), |q, p| p.bind_scalar(q))
    }

    /// `sqlx::query` with every parameter bound.
    pub fn query(&self) -> Query<'_, Postgres, PgArguments> {
        self.params
            .iter()
            .cloned()
            .fold(sqlx::query(&self.sql), |q, p| p.bind(q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_numbered_in_push_order() {
        let mut q = QueryBuf::new();
        assert_eq!(q.push_param(PgBindValue::Text("a".into())), "$1");
        assert_eq!(q.push_param(PgBindValue::I32(3)), "$2");
        assert_eq!(q.params.len(), 2);
    }
}
