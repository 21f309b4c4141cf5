//! Input shape checks, run before any storage access.

use super::error::{FieldError, ServiceError};

pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 10_000;
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 320;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 1024;

/// Collects every field error in a payload so the client sees them all at
/// once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn title(&mut self, field: &str, value: &str) -> &mut Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.reject(field, "must not be empty");
        } else if trimmed.chars().count() > MAX_TITLE_LEN {
            self.reject(
                field,
                format!("must be at most {MAX_TITLE_LEN} characters"),
            );
        }
        self
    }

    pub fn optional_title(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.title(field, value);
        }
        self
    }

    pub fn description(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if value.is_some_and(|v| v.chars().count() > MAX_DESCRIPTION_LEN) {
            self.reject(
                field,
                format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
            );
        }
        self
    }

    pub fn position(&mut self, field: &str, value: Option<i64>) -> &mut Self {
        if value.is_some_and(|v| v < 0) {
            self.reject(field, "must be zero or greater");
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        let well_formed = value
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !well_formed {
            self.reject(field, "must be a valid email address");
        } else if value.len() > MAX_EMAIL_LEN {
            self.reject(field, format!("must be at most {MAX_EMAIL_LEN} characters"));
        }
        self
    }

    pub fn name(&mut self, field: &str, value: &str) -> &mut Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.reject(field, "must not be empty");
        } else if trimmed.chars().count() > MAX_NAME_LEN {
            self.reject(field, format!("must be at most {MAX_NAME_LEN} characters"));
        }
        self
    }

    pub fn password(&mut self, field: &str, value: &str) -> &mut Self {
        let len = value.chars().count();
        if len < MIN_PASSWORD_LEN {
            self.reject(
                field,
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            );
        } else if len > MAX_PASSWORD_LEN {
            self.reject(
                field,
                format!("must be at most {MAX_PASSWORD_LEN} characters"),
            );
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ServiceError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}
