use serde_json::{Map, Value};

use super::{Checker, FieldError, Mode, Shape, Text};
use crate::types::Role;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validated user payload. `password` is plaintext and only lives until it is hashed.
#[derive(Clone, PartialEq)]
pub struct UserInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl std::fmt::Debug for UserInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserInput")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .finish()
    }
}

impl Shape for UserInput {
    fn validate(payload: &Map<String, Value>, mode: Mode) -> Result<Self, Vec<FieldError>> {
        let mut checker = Checker::new(payload);

        let first_name = checker.text(Text::required("firstName", "First name").min(2).max(50));
        let last_name = checker.text(Text::required("lastName", "Last name").min(2).max(50));
        let email = checker.email("email");

        // Merged updates keep the stored hash when no new password is supplied.
        let password = checker.secret(
            "password",
            "Password",
            mode == Mode::Create,
            MIN_PASSWORD_LENGTH,
        );

        let role = checker.choice::<Role>("role", "Role", &["user", "admin"]);

        checker.finish(|| {
            Some(UserInput {
                first_name: first_name?,
                last_name: last_name?,
                email: email?,
                password,
                role,
            })
        })
    }
}

/// Login payload
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Shape for Credentials {
    fn validate(payload: &Map<String, Value>, _mode: Mode) -> Result<Self, Vec<FieldError>> {
        let mut checker = Checker::new(payload);
        let email = checker.email("email");
        let password = checker.secret("password", "Password", true, 0);

        checker.finish(|| {
            Some(Credentials {
                email: email?,
                password: password?,
            })
        })
    }
}
