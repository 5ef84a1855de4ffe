use email_address::EmailAddress;
use url::Url;

use crate::errors::ValidationIssue;

/// Highest rating a review may carry.
pub const MAX_RATING: u8 = 5;

/// Maximum number of images attached to a project.
pub const MAX_PROJECT_IMAGES: usize = 2;

/// Returns `true` if the provided string is a syntactically valid email address.
pub fn is_valid_email(value: &str) -> bool {
    EmailAddress::is_valid(value)
}

/// Returns `true` if the provided string parses as a URL with a scheme.
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Pushes a `validation.required` issue when `value` is blank.
pub fn require_text(field: &str, value: &str, issues: &mut Vec<ValidationIssue>) {
    if value.trim().is_empty() {
        issues.push(ValidationIssue::new(
            field,
            "validation.required",
            format!("{field} must not be empty"),
        ));
    }
}

/// Same as [`require_text`] for an optional patch value; `None` is accepted.
pub fn require_text_if_present(field: &str, value: Option<&str>, issues: &mut Vec<ValidationIssue>) {
    if let Some(value) = value {
        require_text(field, value, issues);
    }
}

pub fn check_url(field: &str, value: Option<&str>, issues: &mut Vec<ValidationIssue>) {
    if let Some(value) = value
        && !value.is_empty()
        && !is_valid_url(value)
    {
        issues.push(ValidationIssue::new(
            field,
            "validation.url",
            format!("{field} must be a valid URL"),
        ));
    }
}

pub fn check_project_images(images: &[String], issues: &mut Vec<ValidationIssue>) {
    if images.len() > MAX_PROJECT_IMAGES {
        issues.push(ValidationIssue::new(
            "images",
            "validation.length",
            format!("a project may not have more than {MAX_PROJECT_IMAGES} images"),
        ));
    }
}

pub fn check_rating(rating: u8, issues: &mut Vec<ValidationIssue>) {
    if rating > MAX_RATING {
        issues.push(ValidationIssue::new(
            "rating",
            "validation.range",
            format!("rating must be between 0 and {MAX_RATING}"),
        ));
    }
}
