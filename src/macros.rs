/// Builds a [`Value`](crate::Value) with a JSON-like syntax.
///
/// Keys must be string or integer literals. Anything that is not a nested
/// `[..]` / `{..}` or one of `null`, `true`, `false` goes through
/// `Value::from`; wrap negative numbers and other multi-token expressions in
/// parentheses.
///
/// ```rust
/// use vbs_writer::{vbs, Value};
///
/// let value = vbs!({
///     "name": "probe",
///     "ports": [80, 443],
///     "offset": (-3),
///     7: null
/// });
/// let dict = value.as_dict().unwrap();
/// assert_eq!(dict.get("offset"), Some(&Value::Integer(-3)));
/// assert_eq!(dict.get(&7i64), Some(&Value::Null));
/// ```
#[macro_export]
macro_rules! vbs {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::List($crate::List::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List($crate::List::from(vec![$($crate::vbs!($elem)),*]))
    };

    ({}) => {
        $crate::Value::Dict($crate::Dict::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut dict = $crate::Dict::new();
        $(
            dict.insert($key, $crate::vbs!($value));
        )*
        $crate::Value::Dict(dict)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
