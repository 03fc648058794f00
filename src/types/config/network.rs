//! Network-related configuration types

use std::num::NonZeroU16;
use std::str::FromStr;

use crate::types::ValidationError;

nonzero_newtype! {
    /// A validated network port number that cannot be zero
    ///
    /// Used by the capture layer to select the key-value store traffic to
    /// observe.
    ///
    /// # Examples
    /// ```
    /// use mckeys::types::Port;
    ///
    /// let port = Port::new(11211).unwrap();
    /// assert_eq!(port.get(), 11211);
    /// assert!(Port::new(0).is_none());
    /// ```
    #[doc(alias = "port_number")]
    pub struct Port(NonZeroU16: u16, serialize as serialize_u16);
}

impl Port {
    /// Memcached port (11211)
    pub const MEMCACHED: Self = Self(NonZeroU16::new(crate::constants::capture::PORT).unwrap());
}

impl Default for Port {
    fn default() -> Self {
        Self::MEMCACHED
    }
}

impl FromStr for Port {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let port = s
            .parse::<u16>()
            .map_err(|_| ValidationError::InvalidNumber(s.to_string()))?;
        Self::new(port).ok_or(ValidationError::InvalidPort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_memcached() {
        assert_eq!(Port::default().get(), 11211);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("6379".parse::<Port>().unwrap().get(), 6379);
        assert_eq!("0".parse::<Port>(), Err(ValidationError::InvalidPort));
        assert!(matches!(
            "70000".parse::<Port>(),
            Err(ValidationError::InvalidNumber(_))
        ));
    }
}
