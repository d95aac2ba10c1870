// ============================================================================
// Chatline Types - Core Data Types
// ============================================================================
//
// Data structures shared by the ingress service and the delivery worker.
// No dependencies on databases, brokers or HTTP frameworks.
//
// Contents:
// - Message entity and its delivery state machine
// - Metadata mapping (arbitrary JSON values keyed by string)
// - Inbound request / outbound response bodies
//
// ============================================================================

pub mod message;
pub mod request;

pub use message::*;
pub use request::*;
