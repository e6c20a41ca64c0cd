//! Three-valued parameters and the per-call variable bundle.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::ValidationError;

/// An optional GraphQL argument.
///
/// GraphQL distinguishes an omitted variable from an explicit `null`, so a
/// plain `Option` is not enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Param<T> {
    /// Not supplied; the variable is left out of the request.
    #[default]
    Unset,
    /// Explicitly `null`.
    Null,
    /// Supplied value.
    Value(T),
}

impl<T> Param<T> {
    /// `None` means "not supplied", not `null`.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Unset, Self::Value)
    }

    /// `true` unless the parameter is [`Param::Unset`].
    #[must_use]
    pub const fn is_supplied(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Borrow the value, if any.
    #[must_use]
    pub const fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unset | Self::Null => None,
        }
    }

    /// Transform the value, keeping `Unset` and `Null` as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Param<U> {
        match self {
            Self::Unset => Param::Unset,
            Self::Null => Param::Null,
            Self::Value(value) => Param::Value(f(value)),
        }
    }

    /// Fallible [`Param::map`].
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Param<U>, E> {
        Ok(match self {
            Self::Unset => Param::Unset,
            Self::Null => Param::Null,
            Self::Value(value) => Param::Value(f(value)?),
        })
    }
}

impl<T> From<T> for Param<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

/// Normalized variables for one GraphQL call.
///
/// Keys are GraphQL variable names. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParamBundle {
    vars: BTreeMap<&'static str, Value>,
}

impl ParamBundle {
    /// Empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required variable.
    pub fn insert(&mut self, name: &'static str, value: impl Into<Value>) -> &mut Self {
        self.vars.insert(name, value.into());
        self
    }

    /// Add an optional variable: `Unset` is skipped, `Null` becomes `null`.
    pub fn set<T: Into<Value>>(&mut self, name: &'static str, param: Param<T>) -> &mut Self {
        match param {
            Param::Unset => {}
            Param::Null => {
                self.vars.insert(name, Value::Null);
            }
            Param::Value(value) => {
                self.insert(name, value);
            }
        }
        self
    }

    /// Whether `name` is present (possibly as `null`).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Whether `name` is present with a non-null value.
    #[must_use]
    pub fn has_value(&self, name: &str) -> bool {
        self.vars.get(name).is_some_and(|value| !value.is_null())
    }

    /// Look up a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// `true` when no variables are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// JSON object form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.vars
                .iter()
                .map(|(name, value)| ((*name).to_string(), value.clone()))
                .collect(),
        )
    }
}

/// A numeric ID as supplied by the caller.
///
/// IDs are integers on the wire; integral floats are accepted and converted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericId {
    /// Integer input.
    Int(i64),
    /// Floating point input.
    Float(f64),
}

impl NumericId {
    /// Normalize to a positive integer ID.
    pub fn normalize(self, field: &'static str) -> Result<i64, ValidationError> {
        let id = match self {
            Self::Int(id) => Some(id),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(id) if id.is_finite() && id.fract() == 0.0 && id.abs() < 9.0e15 => {
                Some(id as i64)
            }
            Self::Float(_) => None,
        };
        match id {
            Some(id) if id >= 1 => Ok(id),
            _ => Err(ValidationError::InvalidId {
                field,
                value: self.to_string(),
            }),
        }
    }
}

impl fmt::Display for NumericId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Float(id) => write!(f, "{id}"),
        }
    }
}

macro_rules! numeric_id_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for NumericId {
                fn from(id: $ty) -> Self {
                    Self::Int(i64::from(id))
                }
            }
        )*
    };
}

numeric_id_from_int!(i32, i64, u16, u32);

impl From<f64> for NumericId {
    fn from(id: f64) -> Self {
        Self::Float(id)
    }
}

/// Normalize a numeric ID for `field`.
pub fn normalize_id(id: impl Into<NumericId>, field: &'static str) -> Result<i64, ValidationError> {
    id.into().normalize(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn three_valued_serialization() {
        let mut bundle = ParamBundle::new();
        bundle
            .set("zoneID", Param::<i64>::Unset)
            .set("guildID", Param::<i64>::Null)
            .set("limit", Param::Value(10))
            .insert("code", "abcd1234");

        assert_eq!(
            serde_json::to_value(&bundle).unwrap(),
            json!({"guildID": null, "limit": 10, "code": "abcd1234"})
        );
        assert!(!bundle.contains("zoneID"));
        assert!(bundle.contains("guildID"));
        assert!(!bundle.has_value("guildID"));
        assert_eq!(bundle.to_value(), serde_json::to_value(&bundle).unwrap());
    }

    #[test]
    fn values_keep_their_wire_form() {
        let mut bundle = ParamBundle::new();
        bundle
            .set("role", Param::Value(crate::params::RoleType::Dps))
            .set("fightIDs", Param::Value(vec![1_i64, 4]))
            .set("translate", Param::Value(false))
            .insert("startTime", 1_500.5_f64);

        assert_eq!(
            bundle.to_value(),
            json!({"role": "DPS", "fightIDs": [1, 4], "translate": false, "startTime": 1500.5})
        );
        assert!(bundle.has_value("translate"));
    }

    #[test]
    fn option_converts_to_unset() {
        assert_eq!(Param::<i64>::from_option(None), Param::Unset);
        assert_eq!(Param::from_option(Some(3)), Param::Value(3));
        assert_eq!(Param::from(3).map(|v| v * 2), Param::Value(6));
        assert_eq!(Param::<i64>::Null.map(|v| v * 2), Param::Null);
        assert!(!Param::<i64>::Unset.is_supplied());
        assert!(Param::<i64>::Null.is_supplied());
    }

    #[test]
    fn ids_accept_integral_floats() {
        assert_eq!(normalize_id(42, "id"), Ok(42));
        assert_eq!(normalize_id(42.0, "id"), Ok(42));
        assert_eq!(normalize_id(7_u32, "id"), Ok(7));
    }

    #[test]
    fn ids_reject_bad_values() {
        for bad in [
            NumericId::Float(1.5),
            NumericId::Float(f64::NAN),
            NumericId::Float(f64::INFINITY),
            NumericId::Float(0.0),
            NumericId::Int(0),
            NumericId::Int(-4),
        ] {
            let err = normalize_id(bad, "zoneID").unwrap_err();
            assert_eq!(err.fields(), vec!["zoneID"], "{bad}");
        }
    }
}
