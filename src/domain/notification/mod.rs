// ============================================================================
// Notification Domain - Transient user-facing messages
// ============================================================================
//
// - Value objects (Notification, NotificationId, NotificationKind)
// - NotificationCenter (ordered active list + cancellable expiry)
//
// ============================================================================

pub mod value_objects;
pub mod center;

pub use value_objects::*;
pub use center::*;
