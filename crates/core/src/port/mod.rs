// Port Layer - Interfaces for types that embed a shutter

pub mod shutdownable;

// Re-exports
pub use shutdownable::Shutdownable;
