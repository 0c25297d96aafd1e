/// A runtime value in the Quill language: the full set of shapes a program
/// can produce.  Equality is strict value-and-type identity — values of
/// different kinds never compare equal, and there is no numeric/string
/// coercion for `==`/`!=` (`PartialEq` derives exactly that).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
}

impl Value {
    /// Truthiness rule: only `nil` and `false` are falsy.  The number `0`
    /// and the empty string are truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

impl std::fmt::Display for Value {
    /// Canonical textual form used by `print`: integral numbers without a
    /// fractional part (`7`, not `7.0`), strings bare, `nil` as literal text.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::Str(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),
        }
    }
}
