//! Option value validation helpers.
//!
//! Range and format checks shared by the testcase request validation.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::ConfigError;
use crate::topology::Role;

/// Upper bound for each replicated role and for standalone instances
pub const MAX_ROLE_COUNT: i64 = 10;

static TICKET_PATTERN: LazyLock<Regex> = LazyLock::new(||
    Regex::new(r"^[A-Za-z0-9_]+$").expect("Invalid ticket regex")
);

/// Check a replicated role count (0..=10)
///
/// # Examples
/// ```
/// use dirsrv_testgen::utils::validation::validate_role_count;
/// use dirsrv_testgen::topology::Role;
///
/// assert_eq!(validate_role_count(Role::Hub, 3), Ok(3));
/// assert!(validate_role_count(Role::Hub, -1).is_err());
/// assert!(validate_role_count(Role::Master, 11).is_err());
/// ```
pub fn validate_role_count(role: Role, value: i64) -> Result<usize, ConfigError> {
    if !(0..=MAX_ROLE_COUNT).contains(&value) {
        return Err(ConfigError::CountOutOfRange { role, value, max: MAX_ROLE_COUNT });
    }
    Ok(value as usize)
}

/// Check a standalone instance count (1..=10)
pub fn validate_instance_count(value: i64) -> Result<usize, ConfigError> {
    if !(1..=MAX_ROLE_COUNT).contains(&value) {
        return Err(ConfigError::InstancesOutOfRange(value));
    }
    Ok(value as usize)
}

/// Check that a ticket can be embedded in generated function and file names
pub fn validate_ticket(ticket: &str) -> Result<(), ConfigError> {
    if TICKET_PATTERN.is_match(ticket) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTicket(ticket.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_count_bounds() {
        assert_eq!(validate_role_count(Role::Master, 0), Ok(0));
        assert_eq!(validate_role_count(Role::Master, 10), Ok(10));
        assert!(validate_role_count(Role::Consumer, 11).is_err());
        assert!(validate_role_count(Role::Consumer, -3).is_err());
    }

    #[test]
    fn test_instance_count_bounds() {
        assert_eq!(validate_instance_count(1), Ok(1));
        assert_eq!(validate_instance_count(10), Ok(10));
        assert_eq!(validate_instance_count(0), Err(ConfigError::InstancesOutOfRange(0)));
        assert_eq!(validate_instance_count(-2), Err(ConfigError::InstancesOutOfRange(-2)));
    }

    #[test]
    fn test_ticket_format() {
        assert!(validate_ticket("47910").is_ok());
        assert!(validate_ticket("rfe_48231").is_ok());
        assert!(validate_ticket("48 231").is_err());
        assert!(validate_ticket("../x").is_err());
    }
}
