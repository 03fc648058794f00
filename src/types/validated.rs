//! Validated types that enforce invariants at construction time

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Validation errors for configuration values
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("interface name cannot be empty or whitespace")]
    EmptyInterfaceName,

    #[error("port cannot be 0")]
    InvalidPort,

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("row limit cannot be 0")]
    ZeroRowLimit,

    #[error("discard threshold must be >= 0, got {0}")]
    NegativeThreshold(f64),

    #[error("discard threshold must be a finite number")]
    NonFiniteThreshold,
}

/// Macro to generate validated string newtypes.
///
/// Each type gets a validating `new()`, `as_str()`, `AsRef<str>`, `Deref`,
/// `Display`, `TryFrom<String>` and a validating serde `Deserialize`.
macro_rules! validated_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident(String) {
            validation: |$s_param:ident| $validation:expr,
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        $vis struct $name(String);

        impl $name {
            #[doc = concat!("Create a new ", stringify!($name), " after validation")]
            pub fn new($s_param: String) -> Result<Self, ValidationError> {
                let validate = || $validation;
                validate()?;
                Ok(Self($s_param))
            }

            #[doc = concat!("Get the ", stringify!($name), " as a string slice")]
            #[must_use]
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from($s_param: String) -> Result<Self, Self::Error> {
                Self::new($s_param)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::new(s).map_err(serde::de::Error::custom)
            }
        }
    };
}

validated_string! {
    /// A network interface name that cannot be empty or whitespace-only
    ///
    /// Only the capture layer opens the interface; the statistics engine never
    /// looks at it.
    ///
    /// # Examples
    /// ```
    /// use mckeys::types::InterfaceName;
    ///
    /// let iface = InterfaceName::new("eth0".to_string()).unwrap();
    /// assert_eq!(iface.as_str(), "eth0");
    /// assert!(InterfaceName::new("  ".to_string()).is_err());
    /// ```
    #[doc(alias = "device")]
    pub struct InterfaceName(String) {
        validation: |s| {
            if s.trim().is_empty() {
                Err(ValidationError::EmptyInterfaceName)
            } else {
                Ok(())
            }
        },
    }
}

impl Default for InterfaceName {
    fn default() -> Self {
        Self(crate::constants::capture::INTERFACE.to_string())
    }
}

/// Minimum lifetime request rate (requests/sec) a key needs to survive pruning
///
/// Always finite and non-negative. Zero disables pruning entirely.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct DiscardThreshold(f64);

impl DiscardThreshold {
    /// Threshold that keeps every key
    pub const DISABLED: Self = Self(0.0);

    /// Create a threshold, rejecting negative and non-finite values
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteThreshold);
        }
        if value < 0.0 {
            return Err(ValidationError::NegativeThreshold(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    #[inline]
    pub const fn get(&self) -> f64 {
        self.0
    }

    /// Whether pruning is switched off
    #[must_use]
    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for DiscardThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for DiscardThreshold {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidNumber(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<f64> for DiscardThreshold {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for DiscardThreshold {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
