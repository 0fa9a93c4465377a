use rusqlite::types::Value;

use crate::marshal::passthrough_to;
use crate::types::FieldValue;

/// A single positional parameter.
pub trait IntoParam {
    fn into_param(self) -> Value;
}

/// Parameters attached to one `where` predicate.
///
/// `()` means the predicate has no placeholders; a scalar is a single parameter; vectors, arrays
/// and slices supply several in order.
pub trait IntoParams {
    fn into_params(self) -> Option<Vec<Value>>;
}

macro_rules! scalar_param {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl IntoParam for $ty {
                fn into_param(self) -> Value {
                    let $v = self;
                    $conv
                }
            }

            impl IntoParams for $ty {
                fn into_params(self) -> Option<Vec<Value>> {
                    Some(vec![self.into_param()])
                }
            }
        )*
    };
}

scalar_param! {
    Value => |v| v,
    i64 => |v| Value::Integer(v),
    i32 => |v| Value::Integer(i64::from(v)),
    u32 => |v| Value::Integer(i64::from(v)),
    f64 => |v| Value::Real(v),
    bool => |v| Value::Integer(i64::from(v)),
    String => |v| Value::Text(v),
    &str => |v| Value::Text(v.to_string()),
    FieldValue => |v| passthrough_to(v),
}

impl<T: IntoParam> IntoParam for Option<T> {
    fn into_param(self) -> Value {
        self.map_or(Value::Null, IntoParam::into_param)
    }
}

impl<T: IntoParam> IntoParams for Option<T> {
    fn into_params(self) -> Option<Vec<Value>> {
        Some(vec![self.into_param()])
    }
}

impl IntoParams for () {
    fn into_params(self) -> Option<Vec<Value>> {
        None
    }
}

impl<T: IntoParam> IntoParams for Vec<T> {
    fn into_params(self) -> Option<Vec<Value>> {
        Some(self.into_iter().map(IntoParam::into_param).collect())
    }
}

impl<T: IntoParam, const N: usize> IntoParams for [T; N] {
    fn into_params(self) -> Option<Vec<Value>> {
        Some(self.into_iter().map(IntoParam::into_param).collect())
    }
}

impl<T: IntoParam + Clone> IntoParams for &[T] {
    fn into_params(self) -> Option<Vec<Value>> {
        Some(self.iter().cloned().map(IntoParam::into_param).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_of_where_params() {
        assert_eq!(().into_params(), None);
        assert_eq!(1_i64.into_params(), Some(vec![Value::Integer(1)]));
        assert_eq!(
            vec!["a", "b"].into_params(),
            Some(vec![Value::Text("a".into()), Value::Text("b".into())])
        );
        assert_eq!(
            [1_i64, 2].into_params(),
            Some(vec![Value::Integer(1), Value::Integer(2)])
        );
        assert_eq!(None::<i64>.into_params(), Some(vec![Value::Null]));
        assert_eq!(
            FieldValue::Bool(true).into_params(),
            Some(vec![Value::Integer(1)])
        );
    }

    #[test]
    fn field_values_bind_like_untyped_columns() {
        assert_eq!(
            FieldValue::Json(serde_json::json!({"a": 1})).into_param(),
            Value::Text(r#"{"a":1}"#.into())
        );
        assert_eq!(FieldValue::Absent.into_param(), Value::Null);
        assert_eq!(
            FieldValue::Blob(vec![1, 2]).into_param(),
            Value::Blob(vec![1, 2])
        );
    }
}
