//! The `timestamp` type tag defers to an RFC 3339 lexical check. JTD treats
//! this predicate as an external collaborator; we implement it with `chrono`
//! the same way the upstream format validators implement `date-time`.
use chrono::DateTime;

pub(crate) fn is_rfc3339(instance: &str) -> bool {
    DateTime::parse_from_rfc3339(instance).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_utc() {
        assert!(is_rfc3339("1985-04-12T23:20:50.52Z"));
    }

    #[test]
    fn accepts_offset() {
        assert!(is_rfc3339("1996-12-19T16:39:57-08:00"));
    }

    #[test]
    fn rejects_non_timestamp() {
        assert!(!is_rfc3339("not a timestamp"));
        assert!(!is_rfc3339("1985-04-12"));
        assert!(!is_rfc3339(""));
    }
}
