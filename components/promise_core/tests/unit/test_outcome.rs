//! Unit tests for Outcome

use promise_core::{Error, ErrorKind, Outcome, Status};

#[cfg(test)]
mod outcome_tests {
    use super::*;

    #[test]
    fn test_settled_with_zero_value_is_ok() {
        let outcome = Outcome::resolved(0_i64);
        assert!(outcome.ok());
        assert!(outcome.is_settled());
        assert_eq!(outcome.value(), Some(&0));
    }

    #[test]
    fn test_never_settled_is_not_ok() {
        let outcome: Outcome<i64> = Outcome::Unsettled;
        assert!(!outcome.ok());
        assert_eq!(outcome.value(), None);
        assert_eq!(outcome.error().unwrap().kind(), ErrorKind::NoResult);
        assert_eq!(outcome.into_result().unwrap_err(), Error::NoResult);
    }

    #[test]
    fn test_rejected_exposes_only_error() {
        let outcome: Outcome<Vec<u8>> = Outcome::rejected("gone");
        assert_eq!(outcome.value(), None);
        assert_eq!(outcome.error().unwrap().to_string(), "gone");
        assert_eq!(outcome.status(), Status::Rejected);
    }

    #[test]
    fn test_clones_share_error_identity() {
        let outcome: Outcome<u8> = Outcome::rejected(Error::msg("shared"));
        let copy = outcome.clone();
        assert_eq!(outcome, copy);
        assert_eq!(outcome.error(), copy.error());
    }

    #[test]
    fn test_as_result_borrows_value() {
        let outcome = Outcome::resolved(String::from("value"));
        assert_eq!(outcome.as_result().map(|s| s.len()), Ok(5));
        assert_eq!(outcome.into_value(), Some(String::from("value")));
    }
}
