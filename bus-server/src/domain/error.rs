//! Domain error types.
//!
//! These errors represent validation failures on incoming records. They are
//! distinct from storage errors: a `DomainError` always means the request
//! had no effect.

/// Validation errors for schedules and routes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A schedule field was missing or blank
    #[error("All fields are required")]
    MissingScheduleFields,

    /// A route endpoint was missing or blank
    #[error("Both fields are required")]
    MissingRouteFields,

    /// The bus date is not a calendar date in YYYY-MM-DD form
    #[error("invalid bus date: {0}")]
    InvalidDate(String),

    /// The bus date is before the creation day
    #[error("Bus date cannot be before today's date")]
    PastDate,

    /// The departure time is not zero-padded HH:MM
    #[error("invalid departure time: {0}")]
    InvalidTime(String),

    /// The price is not a positive number
    #[error("bus price must be a positive number")]
    InvalidPrice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            DomainError::MissingScheduleFields.to_string(),
            "All fields are required"
        );
        assert_eq!(
            DomainError::MissingRouteFields.to_string(),
            "Both fields are required"
        );
        assert_eq!(
            DomainError::PastDate.to_string(),
            "Bus date cannot be before today's date"
        );
        assert_eq!(
            DomainError::InvalidDate("tomorrow".into()).to_string(),
            "invalid bus date: tomorrow"
        );
        assert_eq!(
            DomainError::InvalidTime("7pm".into()).to_string(),
            "invalid departure time: 7pm"
        );
    }
}
