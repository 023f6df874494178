use alloc::string::String;
use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ParseError;

/// The flattened JSON serialization, a wrapper around a JSON object.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct JsonFlattened {
    pub(crate) value: Map<String, Value>,
}

impl JsonFlattened {
    /// Turns this Json wrapper into it's generic underlying Value.
    pub fn into_inner(self) -> Value {
        Value::Object(self.value)
    }

    /// Returns the string member `name`, if present.
    pub(crate) fn string(&self, name: &'static str) -> Result<Option<&str>, ParseError> {
        match self.value.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(ParseError::InvalidMember(name)),
        }
    }

    /// Returns the string member `name`, failing if it is absent.
    pub(crate) fn required_string(&self, name: &'static str) -> Result<&str, ParseError> {
        self.string(name)?.ok_or(ParseError::InvalidMember(name))
    }

    pub(crate) fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.value.insert(name.into(), value.into());
    }
}

impl FromStr for JsonFlattened {
    type Err = serde_json::Error;

    /// The from_str implementation will parse the supplied
    /// string as a JSON object.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = serde_json::from_str::<Map<String, Value>>(s)?;
        Ok(Self { value })
    }
}

impl fmt::Display for JsonFlattened {
    /// The display implementation will format this value
    /// as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = serde_json::to_string(&self.value).map_err(|_| fmt::Error)?;
        f.write_str(&value)
    }
}
