use std::fmt;
use std::str::FromStr;

use crate::error::ProvisionError;

/// Version of the provisioning interface a backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct InterfaceVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl InterfaceVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether `self` belongs to the same compatibility family as `required`.
    ///
    /// Below 1.0 the minor number is the breaking component, so `0.20.3`
    /// satisfies `0.20.0` but `0.21.0` does not.
    pub fn is_compatible_with(&self, required: &InterfaceVersion) -> bool {
        if self.major != required.major {
            return false;
        }
        if self.major == 0 {
            return self.minor == required.minor;
        }
        true
    }
}

impl FromStr for InterfaceVersion {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || ProvisionError::UnexpectedOutput(format!("invalid interface version '{}'", s));

        let mut numbers = s.trim().trim_start_matches('v').splitn(3, '.');
        let mut next = || -> Result<u64, ProvisionError> {
            numbers
                .next()
                .ok_or_else(invalid)?
                .parse::<u64>()
                .map_err(|_| invalid())
        };

        let major = next()?;
        let minor = next()?;
        let patch = next()?;
        Ok(Self::new(major, minor, patch))
    }
}

impl fmt::Display for InterfaceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let v: InterfaceVersion = "0.20.1".parse().unwrap();
        assert_eq!(v, InterfaceVersion::new(0, 20, 1));
        assert_eq!(v.to_string(), "0.20.1");
        assert_eq!("v1.2.3".parse::<InterfaceVersion>().unwrap(), InterfaceVersion::new(1, 2, 3));
        assert!("0.20".parse::<InterfaceVersion>().is_err());
        assert!("0.x.1".parse::<InterfaceVersion>().is_err());
    }

    #[test]
    fn test_zero_major_compatibility_is_per_minor() {
        let required = InterfaceVersion::new(0, 20, 0);
        assert!(InterfaceVersion::new(0, 20, 7).is_compatible_with(&required));
        assert!(!InterfaceVersion::new(0, 21, 0).is_compatible_with(&required));
        assert!(!InterfaceVersion::new(1, 20, 0).is_compatible_with(&required));
    }

    #[test]
    fn test_stable_major_compatibility() {
        let required = InterfaceVersion::new(2, 0, 0);
        assert!(InterfaceVersion::new(2, 5, 1).is_compatible_with(&required));
        assert!(!InterfaceVersion::new(3, 0, 0).is_compatible_with(&required));
    }
}
