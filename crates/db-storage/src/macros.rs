/// Creates one or more typed id wrappers around `i64`
///
/// All ids of this service are `BIGINT` columns, so the wrapped type and the
/// SQL type are fixed here. The generated types implement everything needed
/// to use them in queries and JSON bodies.
#[macro_export]
macro_rules! diesel_newtype {
    ($($(#[$meta:meta])* $name:ident),+) => {
        $(
            pub use __newtype_impl::$name;
        )+

        mod __newtype_impl {
            use diesel::backend::Backend;
            use diesel::deserialize::{self, FromSql};
            use diesel::serialize::{self, Output, ToSql};
            use diesel::sql_types::BigInt;
            use serde::{Deserialize, Serialize};
            use std::fmt;
            use std::io::Write;

            $(

            #[derive(
                Debug,
                Copy,
                Clone,
                PartialEq,
                Eq,
                PartialOrd,
                Ord,
                Hash,
                Serialize,
                Deserialize,
                AsExpression,
                FromSqlRow,
            )]
            $(#[$meta])*
            #[sql_type = "diesel::sql_types::BigInt"]
            pub struct $name(i64);

            impl $name {
                pub const fn from(inner: i64) -> Self {
                    Self(inner)
                }

                pub fn inner(&self) -> &i64 {
                    &self.0
                }

                pub fn into_inner(self) -> i64 {
                    self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            impl<DB> ToSql<BigInt, DB> for $name
            where
                DB: Backend,
                i64: ToSql<BigInt, DB>,
            {
                fn to_sql<W: Write>(&self, out: &mut Output<W, DB>) -> serialize::Result {
                    <i64 as ToSql<BigInt, DB>>::to_sql(&self.0, out)
                }
            }

            impl<DB> FromSql<BigInt, DB> for $name
            where
                DB: Backend,
                i64: FromSql<BigInt, DB>,
            {
                fn from_sql(bytes: Option<&DB::RawValue>) -> deserialize::Result<Self> {
                    <i64 as FromSql<BigInt, DB>>::from_sql(bytes).map(Self)
                }
            }

            )+
        }
    };
}
