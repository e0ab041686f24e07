pub use primed_core::*;
