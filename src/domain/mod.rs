// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each area has its own subdirectory with its value objects, errors and the
// component that owns its state:
// - notification: NotificationCenter
// - order: validators and OrderSubmissionController
//
// Nothing in here knows about HTTP; the order controller talks to the backend
// through the `OrderGateway` trait.
//
// ============================================================================

pub mod notification;
pub mod order;
