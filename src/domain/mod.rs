// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Storage and HTTP concerns live outside this layer; the workflow and the
// listing service receive their store handle at construction.
//
// ============================================================================

pub mod registration;
