//! Test utility functions shared between the service crates
pub use ::serde_json;
pub use pretty_assertions::assert_eq;

#[cfg(feature = "database")]
pub mod database;

/// Compares a [`Serialize`](serde::Serialize) implementor against a JSON literal
///
/// The left expression is serialized and compared field by field, so the
/// literal documents the complete wire format of the value.
///
/// # Examples
///
/// ```
/// # use rsvp_test_util::assert_eq_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Attendee {
///     name: String,
///     status: String,
/// }
///
/// let attendee = Attendee {
///     name: "alice".into(),
///     status: "attending".into(),
/// };
///
/// assert_eq_json!(
///     attendee,
///     {
///         "name": "alice",
///         "status": "attending",
///     }
/// );
/// ```
#[macro_export]
macro_rules! assert_eq_json {
    ($actual:expr, $($expected:tt)+) => {
        match $crate::serde_json::to_value(&$actual) {
            Ok(actual) => $crate::assert_eq!(actual, $crate::serde_json::json!($($expected)+)),
            Err(e) => panic!("left side of the comparison does not serialize: {}", e),
        }
    };
}
