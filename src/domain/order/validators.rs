use serde::Serialize;

use super::errors::{Violation, INVALID_CUSTOMER_NAME};
use super::value_objects::OrderDraft;

// ============================================================================
// Order Validators - Field rules composed into form validity
// ============================================================================

pub const CUSTOMER_NAME_FIELD: &str = "customer_name";
pub const ITEM_TYPE_FIELD: &str = "coffee_type";

/// Customer names may only use ASCII letters, digits and hyphens.
///
/// A missing value is reported as [`Violation::Required`] rather than as a
/// format error.
pub fn customer_name_rule(value: Option<&str>) -> Result<(), Violation> {
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => return Err(Violation::Required { field: CUSTOMER_NAME_FIELD }),
    };

    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        Ok(())
    } else {
        Err(Violation::InvalidFormat {
            value: value.to_string(),
            message: INVALID_CUSTOMER_NAME,
        })
    }
}

/// The item only has to be present; the form restricts it to known values.
pub fn item_type_rule(value: Option<&str>) -> Result<(), Violation> {
    match value {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(Violation::Required { field: ITEM_TYPE_FIELD }),
    }
}

/// Inline errors for each field of a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftViolations {
    pub customer_name: Option<Violation>,
    pub item_type: Option<Violation>,
}

impl DraftViolations {
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none() && self.item_type.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.customer_name.iter().chain(self.item_type.iter())
    }
}

pub fn validate_draft(draft: &OrderDraft) -> DraftViolations {
    DraftViolations {
        customer_name: customer_name_rule(Some(&draft.customer_name)).err(),
        item_type: item_type_rule(Some(&draft.item_type)).err(),
    }
}

pub fn is_valid_draft(draft: &OrderDraft) -> bool {
    validate_draft(draft).is_empty()
}

// ============================================================================
// Unit Tests
// ============================================================================
