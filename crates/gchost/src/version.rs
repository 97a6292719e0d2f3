//! Collector interface versioning.

use std::fmt::{self, Display, Formatter};

use tracing::warn;

use crate::error::ActivationError;

/// Interface major version the host is built against. A collector whose
/// reported major differs cannot be activated.
pub const HOST_MAJOR_VERSION: u32 = 3;

/// Interface minor version the host is built against. A collector reporting
/// a lower minor still activates; the gap is logged.
pub const HOST_MINOR_VERSION: u32 = 2;

/// Version information a collector reports before initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub name: String,
}

impl InterfaceVersion {
    /// Check this reported version against the interface version the host
    /// expects.
    ///
    /// The major version gates ABI shape and must match exactly. A lower
    /// minor only means the collector predates some additive host surface,
    /// which is tolerated.
    pub fn validate(
        &self,
        expected_major: u32,
        expected_minor: u32,
    ) -> Result<(), ActivationError> {
        if self.major != expected_major {
            return Err(ActivationError::IncompatibleMajorVersion {
                expected: expected_major,
                found: self.major,
            });
        }
        if self.minor < expected_minor {
            warn!(
                collector = %self.name,
                reported_minor = self.minor,
                host_minor = expected_minor,
                "collector was built against an older interface minor version"
            );
        }
        Ok(())
    }
}

impl Display for InterfaceVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{}.{}",
            self.name, self.major, self.minor, self.build
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reported(major: u32, minor: u32) -> InterfaceVersion {
        InterfaceVersion {
            major,
            minor,
            build: 7,
            name: "testgc".to_owned(),
        }
    }

    #[test]
    fn test_exact_match_validates() {
        assert_eq!(reported(3, 2).validate(3, 2), Ok(()));
    }

    #[test]
    fn test_lower_minor_is_tolerated() {
        assert_eq!(reported(3, 1).validate(3, 2), Ok(()));
        assert_eq!(reported(3, 0).validate(3, 2), Ok(()));
    }

    #[test]
    fn test_higher_minor_is_tolerated() {
        assert_eq!(reported(3, 9).validate(3, 2), Ok(()));
    }

    #[test]
    fn test_major_mismatch_is_fatal_in_both_directions() {
        assert_eq!(
            reported(4, 0).validate(3, 2),
            Err(ActivationError::IncompatibleMajorVersion {
                expected: 3,
                found: 4
            })
        );
        assert_eq!(
            reported(2, 9).validate(3, 2),
            Err(ActivationError::IncompatibleMajorVersion {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_display_shape() {
        assert_eq!(reported(3, 2).to_string(), "testgc 3.2.7");
    }
}
