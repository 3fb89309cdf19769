//! Ports: interfaces to the collaborators the core depends on.

pub mod outbound;
