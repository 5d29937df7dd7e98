// Field checks shared by the entity and marks services. Each returns
// DatabaseError::Validation so failures surface as HTTP 400.

use chrono::NaiveDate;

use crate::database::DatabaseError;

pub const MIN_PASSWORD_LEN: usize = 6;

fn invalid(message: impl Into<String>) -> DatabaseError {
    DatabaseError::Validation(message.into())
}

pub fn require_text(field: &str, value: &str) -> Result<(), DatabaseError> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{} is required", field)));
    }
    Ok(())
}

/// Basic email shape: exactly one `@` with text on both sides and a dot in the domain
pub fn validate_email(email: &str) -> Result<(), DatabaseError> {
    let parts: Vec<&str> = email.trim().split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err(invalid("Invalid email format"));
    }
    Ok(())
}

/// Emails are stored and looked up trimmed and lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_phone(phone: &str) -> Result<(), DatabaseError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits == 0 || !phone.chars().all(|c| c.is_ascii_digit() || "+- ()".contains(c)) {
        return Err(invalid("Invalid phone number"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), DatabaseError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_year(field: &str, year: i64) -> Result<(), DatabaseError> {
    if year < 1 {
        return Err(invalid(format!("{} must be at least 1", field)));
    }
    Ok(())
}

pub fn validate_dob(dob: &str) -> Result<(), DatabaseError> {
    NaiveDate::parse_from_str(dob, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| invalid("Date of birth must use YYYY-MM-DD"))
}

pub fn validate_score(field: &str, score: f64) -> Result<(), DatabaseError> {
    if !score.is_finite() || score < 0.0 {
        return Err(invalid(format!("{} must be a non-negative number", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails() {
        assert!(validate_email("teacher@college.edu").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("@college.edu").is_err());
        assert!(validate_email("user@localhost").is_err());
    }

    #[test]
    fn normalizes_email_case() {
        assert_eq!(normalize_email("  Head@College.EDU "), "head@college.edu");
    }

    #[test]
    fn phones() {
        assert!(validate_phone("+91 98765-43210").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn dates_of_birth() {
        assert!(validate_dob("2004-02-29").is_ok());
        assert!(validate_dob("2003-02-29").is_err());
        assert!(validate_dob("12/01/2004").is_err());
    }

    #[test]
    fn scores_and_years() {
        assert!(validate_score("marks_obtained", 0.0).is_ok());
        assert!(validate_score("marks_obtained", -1.0).is_err());
        assert!(validate_score("marks_obtained", f64::NAN).is_err());
        assert!(validate_year("year", 1).is_ok());
        assert!(validate_year("year", 0).is_err());
    }

    #[test]
    fn text_and_passwords() {
        assert!(require_text("name", "  ").is_err());
        assert!(require_text("name", "Asha").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }
}
