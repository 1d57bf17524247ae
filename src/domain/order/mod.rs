// ============================================================================
// Order Domain - Draft validation and submission lifecycle
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderDraft, CoffeeType, SubmissionState, OrderResponse)
// - Commands (DraftChange)
// - Errors (Violation, GatewayError)
// - Validators (field rules and draft validity)
// - Submission controller (OrderSubmissionController)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod validators;
pub mod submission;

// Re-export for convenience
pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use validators::*;
pub use submission::*;
