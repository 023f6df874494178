use core::cmp::Ordering;

use serde_json::Value;

/// How a claim is compared against the value of its constraint.
///
/// The ordering validators compare `claim <op> constraint`, so
/// [`Validator::LessOrEqual`] with a constraint of `1000` accepts an `iat` of
/// `900`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Validator {
    /// The values are equal. Numbers compare by value, so `1` equals `1.0`.
    Equals,
    /// The claim contains the constraint.
    ///
    /// An array claim contains a scalar if one of its elements equals it, a
    /// scalar claim only contains an equal scalar. An array constraint is
    /// satisfied if any of its elements is contained.
    Contains,
    /// The claim is a number greater than the constraint.
    Greater,
    /// The claim is a number greater than or equal to the constraint.
    GreaterOrEqual,
    /// The claim is a number less than the constraint.
    Less,
    /// The claim is a number less than or equal to the constraint.
    LessOrEqual,
}

impl Validator {
    /// The validator used for a registered claim if the constraint does not
    /// name one.
    pub fn for_claim(name: &str) -> Self {
        match name {
            "aud" => Self::Contains,
            "iat" => Self::LessOrEqual,
            _ => Self::Equals,
        }
    }

    /// Checks `claim` against `constraint`.
    pub fn validate(self, claim: &Value, constraint: &Value) -> bool {
        match self {
            Self::Equals => equals(claim, constraint),
            Self::Contains => match constraint {
                Value::Array(any) => any.iter().any(|c| contains(claim, c)),
                scalar => contains(claim, scalar),
            },
            Self::Greater => compare(claim, constraint).is_some_and(Ordering::is_gt),
            Self::GreaterOrEqual => compare(claim, constraint).is_some_and(Ordering::is_ge),
            Self::Less => compare(claim, constraint).is_some_and(Ordering::is_lt),
            Self::LessOrEqual => compare(claim, constraint).is_some_and(Ordering::is_le),
        }
    }
}

fn equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn contains(claim: &Value, item: &Value) -> bool {
    match claim {
        Value::Array(elements) => elements.iter().any(|e| equals(e, item)),
        scalar => equals(scalar, item),
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}
