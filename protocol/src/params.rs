//! Heat pump parameters and the parameter registry.
//!
//! Every parameter is identified by a unique name and maps to a data point
//! of the controller. Data points are either settings ([`DpType::Setting`],
//! `SP`) or measured values ([`DpType::Measurement`], `MP`).
//!
//! The [`Registry`] holds the known parameters. [`Registry::new`] returns the
//! built-in catalog, [`Registry::from_csv`] loads a custom one:
//!
//! ```
//! use htheatpump::params::{DataType, DpType, Registry, Value};
//!
//! let registry = Registry::from_csv(
//!     "# name, type, number, acl, data type, min, max\n\
//!      Temp. Aussen, MP, 0, r-, FLOAT, -20.0, 40.0\n\
//!      Betriebsart, SP, 13, rw, INT, 0, 7\n",
//! )
//! .unwrap();
//! let param = registry.get("Betriebsart").unwrap();
//!
//! assert_eq!(param.dp_type(), DpType::Setting);
//! assert_eq!(param.cmd(), "SP,NR=13");
//! assert!(param.in_limits(&Value::Int(5)));
//! ```

use crate::catalog;
use alloc::{
    borrow::ToOwned,
    collections::btree_map::BTreeMap,
    format,
    string::{String, ToString},
};
use core::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    str::FromStr,
};

/// Error type for value conversions.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum ValueError {
    /// The string doesn't represent a value of the data type.
    InvalidFormat(DataType),
    /// The value doesn't match the data type.
    TypeMismatch(DataType),
    /// The lower limit is greater than the upper limit.
    InvalidLimits,
}

impl Display for ValueError {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        match self {
            Self::InvalidFormat(ty) => write!(f, "invalid format for data type {ty}"),
            Self::TypeMismatch(ty) => write!(f, "value doesn't match data type {ty}"),
            Self::InvalidLimits => write!(f, "lower limit greater than upper limit"),
        }
    }
}

impl core::error::Error for ValueError {}

/// Error returned when a parameter catalog couldn't be parsed.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct ParseRegistryError {
    /// Line number (starting at 1) of the offending definition.
    pub line: usize,
}

impl Display for ParseRegistryError {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(f, "invalid parameter definition in line {}", self.line)
    }
}

impl core::error::Error for ParseRegistryError {}

/// Data point type.
#[derive(strum::Display, strum::EnumString, PartialEq, Eq, Copy, Clone, Debug)]
pub enum DpType {
    /// Setting, can be read and (usually) written.
    #[strum(serialize = "SP")]
    Setting,
    /// Measured value, can be read in bulk using a fast query.
    #[strum(serialize = "MP")]
    Measurement,
}

/// Access rights of a parameter.
#[derive(strum::Display, strum::EnumString, PartialEq, Eq, Copy, Clone, Debug)]
pub enum Access {
    /// Read-only.
    #[strum(serialize = "r-")]
    Read,
    /// Write-only.
    #[strum(serialize = "-w")]
    Write,
    /// Read and write.
    #[strum(serialize = "rw")]
    ReadWrite,
}

impl Access {
    /// Returns whether the parameter can be written.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

/// Data type of a parameter value.
#[derive(strum::Display, strum::EnumString, PartialEq, Eq, Copy, Clone, Debug)]
#[strum(serialize_all = "UPPERCASE")]
pub enum DataType {
    /// Boolean, transmitted as `0` or `1`.
    Bool,
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
}

impl DataType {
    /// Converts a string into a value of this data type.
    ///
    /// In strict mode, [`DataType::Float`] rejects strings that
    /// represent an integer (e.g. `"21"`).
    pub fn parse(self, s: &str, strict: bool) -> Result<Value, ValueError> {
        let s = s.trim();
        let err = ValueError::InvalidFormat(self);

        match self {
            Self::Bool => match s.parse::<i32>() {
                Ok(0) => Ok(Value::Bool(false)),
                Ok(1) => Ok(Value::Bool(true)),
                _ => Err(err),
            },
            Self::Int => s.parse().map(Value::Int).map_err(|_| err),
            Self::Float => {
                if strict && s.parse::<i64>().is_ok() {
                    return Err(err);
                }

                s.parse().map(Value::Float).map_err(|_| err)
            }
        }
    }

    /// Checks whether a value matches this data type.
    ///
    /// Integers are accepted for [`DataType::Float`] and returned as float.
    pub fn coerce(self, value: Value) -> Result<Value, ValueError> {
        match (self, value) {
            (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_))
            | (Self::Float, Value::Float(_)) => Ok(value),
            (Self::Float, Value::Int(val)) => Ok(Value::Float(val.into())),
            _ => Err(ValueError::TypeMismatch(self)),
        }
    }

    /// Converts a value into its wire representation.
    pub fn format(self, value: Value) -> Result<String, ValueError> {
        Ok(match self.coerce(value)? {
            Value::Bool(val) => String::from(if val { "1" } else { "0" }),
            Value::Int(val) => val.to_string(),
            Value::Float(val) => format!("{val:?}"),
        })
    }
}

/// The value of a parameter.
#[derive(Copy, Clone, Debug)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i32),
    /// Floating point value.
    Float(f64),
}

impl Value {
    /// Returns the boolean value, if any.
    #[must_use]
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(val) => Some(val),
            _ => None,
        }
    }

    /// Returns the numeric value as float, if any.
    #[must_use]
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Bool(_) => None,
            Self::Int(val) => Some(val.into()),
            Self::Float(val) => Some(val),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        match self {
            Self::Bool(val) => write!(f, "{val}"),
            Self::Int(val) => write!(f, "{val}"),
            Self::Float(val) => write!(f, "{val:?}"),
        }
    }
}

/// A heat pump parameter.
///
/// Only the limits of a parameter can be changed after construction.
#[derive(PartialEq, Clone, Debug)]
pub struct Param {
    name: String,
    dp_type: DpType,
    number: u16,
    access: Access,
    data_type: DataType,
    min: Option<Value>,
    max: Option<Value>,
}

impl Param {
    /// Constructs a new parameter without limits.
    pub fn new(
        name: impl Into<String>,
        dp_type: DpType,
        number: u16,
        access: Access,
        data_type: DataType,
    ) -> Self {
        Self {
            name: name.into(),
            dp_type,
            number,
            access,
            data_type,
            min: None,
            max: None,
        }
    }

    /// Sets the limits of the parameter.
    ///
    /// `None` stands for an unknown limit.
    pub fn with_limits(mut self, min: Option<Value>, max: Option<Value>) -> Result<Self, ValueError> {
        self.set_limits(min, max)?;

        Ok(self)
    }

    /// Returns the unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the data point type.
    #[must_use]
    pub const fn dp_type(&self) -> DpType {
        self.dp_type
    }

    /// Returns the data point number.
    #[must_use]
    pub const fn number(&self) -> u16 {
        self.number
    }

    /// Returns the access rights.
    #[must_use]
    pub const fn access(&self) -> Access {
        self.access
    }

    /// Returns the data type.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns the lower limit.
    #[must_use]
    pub const fn min(&self) -> Option<Value> {
        self.min
    }

    /// Returns the upper limit.
    #[must_use]
    pub const fn max(&self) -> Option<Value> {
        self.max
    }

    /// Returns the command used to query the parameter, e.g. `SP,NR=13`.
    #[must_use]
    pub fn cmd(&self) -> String {
        format!("{},NR={}", self.dp_type, self.number)
    }

    /// Converts a string into a value of the parameter's data type.
    pub fn parse(&self, s: &str, strict: bool) -> Result<Value, ValueError> {
        self.data_type.parse(s, strict)
    }

    /// Checks a value against the parameter's data type.
    pub fn coerce(&self, value: Value) -> Result<Value, ValueError> {
        self.data_type.coerce(value)
    }

    /// Converts a value into its wire representation.
    pub fn format(&self, value: Value) -> Result<String, ValueError> {
        self.data_type.format(value)
    }

    /// Returns whether the value lies within the limits.
    ///
    /// Unknown limits are not checked.
    #[must_use]
    pub fn in_limits(&self, value: &Value) -> bool {
        self.min.is_none_or(|min| min <= *value) && self.max.is_none_or(|max| *value <= max)
    }

    /// Updates the limits of the parameter.
    ///
    /// Returns whether any of the limits changed.
    pub fn set_limits(&mut self, min: Option<Value>, max: Option<Value>) -> Result<bool, ValueError> {
        let min = min.map(|val| self.coerce(val)).transpose()?;
        let max = max.map(|val| self.coerce(val)).transpose()?;

        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(ValueError::InvalidLimits);
            }
        }

        let changed = self.min != min || self.max != max;

        self.min = min;
        self.max = max;

        Ok(changed)
    }
}

/// Collection of known parameters, keyed by name.
///
/// Passed to [`HeatPump::with_registry`](crate::HeatPump::with_registry)
/// to customize the parameters known to a client.
#[derive(PartialEq, Clone, Debug)]
pub struct Registry {
    params: BTreeMap<String, Param>,
}

impl Registry {
    /// Constructs a registry containing the built-in parameter catalog.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();

        for param in catalog::builtin() {
            registry.insert(param);
        }

        registry
    }

    /// Constructs an empty registry.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            params: BTreeMap::new(),
        }
    }

    /// Parses a parameter catalog in CSV format.
    ///
    /// Each line contains `name, SP|MP, number, acl, type, min, max`.
    /// Limits may be `None` if unknown. Empty lines and lines starting
    /// with `#` are ignored.
    pub fn from_csv(text: &str) -> Result<Self, ParseRegistryError> {
        let mut registry = Self::empty();

        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let err = ParseRegistryError { line: idx + 1 };
            let param = parse_definition(line).ok_or(err)?;

            if registry.insert(param).is_some() {
                return Err(err);
            }
        }

        Ok(registry)
    }

    /// Inserts a parameter, replacing any parameter with the same name.
    pub fn insert(&mut self, param: Param) -> Option<Param> {
        self.params.insert(param.name.clone(), param)
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.get(name)
    }

    /// Looks up a parameter by name for updating its limits.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Param> {
        self.params.get_mut(name)
    }

    /// Returns whether a parameter with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Returns an iterator over all parameters, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.values()
    }

    /// Returns an iterator over all parameter names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Returns an iterator over all parameters of the given data point type.
    pub fn of_type(&self, dp_type: DpType) -> impl Iterator<Item = &Param> {
        self.iter().filter(move |param| param.dp_type == dp_type)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_definition(line: &str) -> Option<Param> {
    let fields: alloc::vec::Vec<_> = line.split(',').map(str::trim).collect();
    let [name, dp_type, number, access, data_type, min, max] = fields[..] else {
        return None;
    };

    if name.is_empty() {
        return None;
    }

    let data_type = DataType::from_str(data_type).ok()?;
    let limit = |s: &str| match s {
        "None" => Some(None),
        _ => data_type.parse(s, false).ok().map(Some),
    };

    Param::new(
        name.to_owned(),
        DpType::from_str(dp_type).ok()?,
        number.parse().ok()?,
        Access::from_str(access).ok()?,
        data_type,
    )
    .with_limits(limit(min)?, limit(max)?)
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_values() {
        assert_eq!(DataType::Bool.parse("0", true), Ok(Value::Bool(false)));
        assert_eq!(DataType::Bool.parse("1", true), Ok(Value::Bool(true)));
        assert_eq!(
            DataType::Bool.parse("2", true),
            Err(ValueError::InvalidFormat(DataType::Bool)),
            "only 0 and 1 should be valid"
        );
        assert_eq!(DataType::Int.parse(" -3 ", true), Ok(Value::Int(-3)));
        assert_eq!(
            DataType::Int.parse("1.5", false),
            Err(ValueError::InvalidFormat(DataType::Int))
        );
        assert_eq!(DataType::Float.parse("21.5", true), Ok(Value::Float(21.5)));
        assert_eq!(DataType::Float.parse("21", false), Ok(Value::Float(21.0)));
        assert_eq!(
            DataType::Float.parse("21", true),
            Err(ValueError::InvalidFormat(DataType::Float)),
            "strict mode should reject integers"
        );
    }

    #[test]
    fn format_values() {
        assert_eq!(DataType::Bool.format(Value::Bool(true)).as_deref(), Ok("1"));
        assert_eq!(DataType::Int.format(Value::Int(-7)).as_deref(), Ok("-7"));
        assert_eq!(DataType::Float.format(Value::Float(21.5)).as_deref(), Ok("21.5"));
        assert_eq!(
            DataType::Float.format(Value::Int(22)).as_deref(),
            Ok("22.0"),
            "integers should be formatted as float"
        );
        assert_eq!(
            DataType::Int.format(Value::Float(1.0)),
            Err(ValueError::TypeMismatch(DataType::Int))
        );
        assert_eq!(
            DataType::Bool.format(Value::Int(1)),
            Err(ValueError::TypeMismatch(DataType::Bool))
        );
    }

    #[test]
    fn value_ordering() {
        assert!(Value::Int(2) < Value::Int(3));
        assert!(Value::Int(2) < Value::Float(2.5));
        assert_eq!(Value::Float(2.0), Value::Int(2));
        assert_eq!(
            Value::Bool(true).partial_cmp(&Value::Int(1)),
            None,
            "booleans shouldn't be comparable to numbers"
        );
    }

    #[test]
    fn param_limits() {
        let mut param = Param::new("HKR Soll_Raum", DpType::Setting, 69, Access::ReadWrite, DataType::Float)
            .with_limits(Some(Value::Float(10.0)), Some(Value::Float(25.0)))
            .unwrap();

        assert_eq!(param.cmd(), "SP,NR=69");
        assert!(param.in_limits(&Value::Float(10.0)), "lower limit should be inclusive");
        assert!(param.in_limits(&Value::Float(25.0)), "upper limit should be inclusive");
        assert!(!param.in_limits(&Value::Float(25.5)));
        assert!(!param.in_limits(&Value::Int(9)));

        assert_eq!(
            param.set_limits(Some(Value::Int(10)), Some(Value::Float(25.0))),
            Ok(false),
            "equal limits shouldn't be reported as changed"
        );
        assert_eq!(
            param.set_limits(Some(Value::Float(5.0)), Some(Value::Float(25.0))),
            Ok(true)
        );
        assert_eq!(param.min(), Some(Value::Float(5.0)));
        assert_eq!(
            param.set_limits(Some(Value::Float(30.0)), Some(Value::Float(25.0))),
            Err(ValueError::InvalidLimits)
        );
        assert_eq!(param.min(), Some(Value::Float(5.0)), "limits should be unchanged");
        assert_eq!(param.set_limits(None, None), Ok(true));
        assert!(param.in_limits(&Value::Float(-100.0)), "unknown limits shouldn't be checked");
    }

    #[test]
    fn registry_from_csv() {
        let registry = Registry::from_csv(
            "# comment\n\
             \n\
             Temp. Aussen , MP, 0, r-, FLOAT, -20.0, 40.0\n\
             Stoerung     , MP, 17, r-, BOOL, 0, 1\n\
             Betriebsart  , SP, 13, rw, INT, 0, None\n",
        )
        .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.names().collect::<alloc::vec::Vec<_>>(),
            ["Betriebsart", "Stoerung", "Temp. Aussen"]
        );
        assert_eq!(registry.of_type(DpType::Measurement).count(), 2);

        let param = registry.get("Betriebsart").unwrap();

        assert_eq!(param.access(), Access::ReadWrite);
        assert_eq!(param.max(), None, "None should be an unknown limit");
        assert_eq!(
            registry.get("Temp. Aussen").unwrap().min(),
            Some(Value::Float(-20.0))
        );
    }

    #[test]
    fn registry_from_csv_errors() {
        assert_eq!(
            Registry::from_csv("A, MP, 0, r-, FLOAT, 0.0\n"),
            Err(ParseRegistryError { line: 1 }),
            "missing field should be rejected"
        );
        assert_eq!(
            Registry::from_csv("A, XP, 0, r-, FLOAT, 0.0, 1.0\n"),
            Err(ParseRegistryError { line: 1 })
        );
        assert_eq!(
            Registry::from_csv("A, MP, 0, r-, INT, 5, 1\n"),
            Err(ParseRegistryError { line: 1 }),
            "min greater than max should be rejected"
        );
        assert_eq!(
            Registry::from_csv("A, MP, 0, r-, INT, 0, 1\n# x\nA, SP, 1, rw, INT, 0, 1\n"),
            Err(ParseRegistryError { line: 3 }),
            "duplicate name should be rejected"
        );
    }

    #[test]
    fn builtin_catalog_limits() {
        let registry = Registry::new();

        assert!(!registry.is_empty(), "catalog shouldn't be empty");

        for param in registry.iter() {
            if let (Some(min), Some(max)) = (param.min(), param.max()) {
                assert!(min <= max, "limits of {:?} should be ordered", param.name());
            }

            for limit in [param.min(), param.max()].into_iter().flatten() {
                assert!(
                    param.coerce(limit).is_ok(),
                    "limits of {:?} should match the data type",
                    param.name()
                );
            }
        }
    }
}
