// ============================================================================
// Registration Domain
// ============================================================================
//
// - Value objects (Email, PersonName)
// - Errors (field failures, rejection reasons)
// - Validator (pure rule evaluation)
// - Workflow (validate → de-duplicate → persist)
// - Listing (authenticated read path)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod validator;
pub mod workflow;
pub mod listing;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use workflow::*;
pub use listing::*;
