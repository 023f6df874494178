use alloc::string::String;

use hashbrown::DefaultHashBuilder;
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use tracing::debug;

use super::{Claims, Validator};
use crate::error::{ValidationError, ValidationFailure};

#[derive(Debug, Clone, PartialEq)]
struct Constraint {
    value: Value,
    validator: Option<Validator>,
}

/// The constraints a claim set is validated against.
///
/// Time claims (`exp`, `nbf`) are only checked if a reference time is set.
/// Every other claim is only checked if it is present and a constraint was
/// registered for it with [`require`](Self::require) or
/// [`require_with`](Self::require_with). Claims that must be present are
/// named with [`require_present`](Self::require_present).
///
/// ```
/// # use jwx::{Claims, ValidationContext};
/// let claims = Claims::new()
///     .with_claim("iss", "joe")
///     .with_claim("exp", 1_300_819_380);
///
/// let context = ValidationContext::new()
///     .with_reference_time(1_300_819_000)
///     .require("iss", "joe");
/// assert!(context.validate(&claims).is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationContext {
    reference_time: Option<u64>,
    leeway: u64,
    constraints: IndexMap<String, Constraint, DefaultHashBuilder>,
    present: IndexSet<String, DefaultHashBuilder>,
}

impl ValidationContext {
    /// A context without reference time, leeway or constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// The time `exp` and `nbf` are checked against, in seconds since the
    /// epoch.
    #[must_use]
    pub fn with_reference_time(mut self, seconds: u64) -> Self {
        self.reference_time = Some(seconds);
        self
    }

    /// Uses the system clock as reference time.
    #[cfg(feature = "std")]
    #[must_use]
    pub fn with_current_time(self) -> Self {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        self.with_reference_time(now)
    }

    /// The clock skew tolerated for `exp` and `nbf`, in seconds.
    #[must_use]
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway = seconds;
        self
    }

    /// If the claim `name` is present, it must satisfy the default validator
    /// of the claim (see [`Validator::for_claim`]) against `value`.
    #[must_use]
    pub fn require(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constrain(name.into(), value.into(), None)
    }

    /// If the claim `name` is present, it must satisfy `validator` against
    /// `value`.
    #[must_use]
    pub fn require_with(
        self,
        name: impl Into<String>,
        value: impl Into<Value>,
        validator: Validator,
    ) -> Self {
        self.constrain(name.into(), value.into(), Some(validator))
    }

    /// Requires the claim `name` to be present, whatever its value.
    #[must_use]
    pub fn require_present(mut self, name: impl Into<String>) -> Self {
        self.present.insert(name.into());
        self
    }

    fn constrain(mut self, name: String, value: Value, validator: Option<Validator>) -> Self {
        self.constraints.insert(name, Constraint { value, validator });
        self
    }

    /// The reference time, if any.
    pub const fn reference_time(&self) -> Option<u64> {
        self.reference_time
    }

    /// The leeway in seconds.
    pub const fn leeway(&self) -> u64 {
        self.leeway
    }

    /// Validates `claims`, stopping at the first claim that fails.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the claim that failed.
    pub fn validate(&self, claims: &Claims) -> Result<(), ValidationError> {
        if let Some(reference) = self.reference_time {
            self.check_time(claims, reference)?;
        }

        if let Some(name) = self.present.iter().find(|name| !claims.contains(name)) {
            return Err(ValidationError::new(name.as_str(), ValidationFailure::Missing));
        }

        for (name, constraint) in &self.constraints {
            let Some(claim) = claims.get(name) else {
                continue;
            };
            let validator = constraint
                .validator
                .unwrap_or_else(|| Validator::for_claim(name));

            if !validator.validate(claim, &constraint.value) {
                debug!(claim = name.as_str(), ?validator, "claim constraint failed");
                return Err(ValidationError::new(
                    name.as_str(),
                    ValidationFailure::Constraint(validator),
                ));
            }
        }

        Ok(())
    }

    // NumericDate may carry fractions, so the comparison happens in `f64`
    fn check_time(&self, claims: &Claims, reference: u64) -> Result<(), ValidationError> {
        let reference = reference as f64;
        let leeway = self.leeway as f64;

        if let Some(exp) = numeric_date(claims, "exp")? {
            if exp <= reference - leeway {
                return Err(ValidationError::new("exp", ValidationFailure::Expired));
            }
        }
        if let Some(nbf) = numeric_date(claims, "nbf")? {
            if nbf > reference + leeway {
                return Err(ValidationError::new("nbf", ValidationFailure::NotYetValid));
            }
        }
        Ok(())
    }
}

fn numeric_date(claims: &Claims, name: &'static str) -> Result<Option<f64>, ValidationError> {
    match claims.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| ValidationError::new(name, ValidationFailure::NotANumericDate)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const T: u64 = 1_700_000_000;

    fn timed() -> Claims {
        Claims::new()
            .with_claim("exp", T + 60)
            .with_claim("nbf", T)
    }

    #[test]
    fn expiration_with_leeway() {
        let context = ValidationContext::new().with_leeway(10);

        assert!(context
            .clone()
            .with_reference_time(T + 69)
            .validate(&timed())
            .is_ok());

        let err = context
            .with_reference_time(T + 70)
            .validate(&timed())
            .unwrap_err();
        assert_eq!(err.claim(), "exp");
        assert_eq!(err.reason(), &ValidationFailure::Expired);
    }

    #[test]
    fn not_before_with_leeway() {
        let context = ValidationContext::new().with_leeway(10);
        assert!(context
            .clone()
            .with_reference_time(T - 10)
            .validate(&timed())
            .is_ok());

        let err = context
            .with_reference_time(T - 11)
            .validate(&timed())
            .unwrap_err();
        assert_eq!(err.claim(), "nbf");
        assert_eq!(err.reason(), &ValidationFailure::NotYetValid);
    }

    #[test]
    fn time_claims_need_reference_time() {
        let claims = timed().with_claim("exp", 0).with_claim("nbf", u64::MAX);
        assert!(ValidationContext::new().validate(&claims).is_ok());
    }

    #[test]
    fn malformed_time_claim() {
        let claims = Claims::new().with_claim("exp", "tomorrow");
        let err = ValidationContext::new()
            .with_reference_time(T)
            .validate(&claims)
            .unwrap_err();
        assert_eq!(err.reason(), &ValidationFailure::NotANumericDate);
    }

    #[test]
    fn constraints() {
        let claims = Claims::new()
            .with_claim("iss", "joe")
            .with_claim("aud", json!(["api", "web"]))
            .with_claim("iat", T)
            .with_claim("ignored", true);

        let context = ValidationContext::new()
            .require("iss", "joe")
            .require("aud", "web")
            .require("iat", T + 1);
        assert!(context.validate(&claims).is_ok());

        let err = context.clone().require("aud", "cli").validate(&claims).unwrap_err();
        assert_eq!(err.claim(), "aud");
        assert_eq!(err.reason(), &ValidationFailure::Constraint(Validator::Contains));

    }

    #[test]
    fn absent_claims_are_skipped_unless_required() {
        let claims = Claims::new().with_claim("iss", "joe");
        let context = ValidationContext::new()
            .require("iss", "joe")
            .require("sub", "alice");
        assert!(context.validate(&claims).is_ok());

        let err = context.require_present("sub").validate(&claims).unwrap_err();
        assert_eq!(err.claim(), "sub");
        assert_eq!(err.reason(), &ValidationFailure::Missing);

        let claims = claims.with_claim("sub", "bob");
        let context = ValidationContext::new().require_present("sub").require("sub", "alice");
        let err = context.validate(&claims).unwrap_err();
        assert_eq!(err.reason(), &ValidationFailure::Constraint(Validator::Equals));
    }

    #[test]
    fn explicit_validator() {
        let claims = Claims::new().with_claim("level", 3);
        let context = ValidationContext::new().require_with("level", 2, Validator::Greater);
        assert!(context.validate(&claims).is_ok());

        let context = ValidationContext::new().require_with("level", 3, Validator::Greater);
        assert!(context.validate(&claims).is_err());
    }
}
