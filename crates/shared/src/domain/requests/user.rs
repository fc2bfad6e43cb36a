use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// `local@label.tld` over ASCII word characters, `-` and `.`, with a top-level
/// label of 2 to 4 characters.
pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+@([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]{2,4}$")
        .expect("email pattern compiles")
});

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(regex(path = *EMAIL_REGEX, message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[serde(default)]
    pub recaptcha_response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,

    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmailRequest {
    #[validate(regex(path = *EMAIL_REGEX, message = "Invalid email format"))]
    pub new_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChangeRoleRequest {
    #[validate(custom(function = "validate_role"))]
    pub role: String,
}

/// Row payload for the user command repository; `password` is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        Err(ValidationError::new("username").with_message("Username must not be empty".into()))
    } else {
        Ok(())
    }
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    match role {
        "USER" | "ADMIN" => Ok(()),
        _ => Err(ValidationError::new("role").with_message("Role must be USER or ADMIN".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: "secret1".into(),
            recaptcha_response: String::new(),
        }
    }

    #[test]
    fn accepts_common_addresses() {
        assert!(EMAIL_REGEX.is_match("jane.doe@example.com"));
        assert!(EMAIL_REGEX.is_match("bob-1@mail.shop.io"));
        assert!(register("jane", "jane_doe@example.info").validate().is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "",
            "plain",
            "@example.com",
            "a@b",
            "a@.com",
            "a@example.toolong",
            "a b@x.com",
            "josé@exämple.com",
        ] {
            assert!(!EMAIL_REGEX.is_match(email), "{email} should be rejected");
        }

        let errors = register("jane", "josé@example.com").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn blank_username_is_rejected() {
        for username in ["", "   ", "\t"] {
            let errors = register(username, "jane@example.com").validate().unwrap_err();
            assert!(errors.field_errors().contains_key("username"), "{username:?}");
        }
        assert!(register(" jane ", "jane@example.com").validate().is_ok());
    }

    #[test]
    fn register_validation_reports_each_field() {
        let req = RegisterRequest {
            username: String::new(),
            email: "nope".into(),
            password: "123".into(),
            recaptcha_response: String::new(),
        };

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn change_email_uses_the_same_rule() {
        let req = ChangeEmailRequest {
            new_email: "x@y".into(),
        };
        assert!(req.validate().is_err());
    }
}
