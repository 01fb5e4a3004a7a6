//! Invocation-context primitives shared by the sdkprep crates: target platform
//! identifiers, interpreter versions, lenient release numbers, and the test
//! helpers used to lay out throwaway project trees.

pub mod error;
pub mod interpreter;
pub mod platform;
pub mod release;
pub mod test_support;

pub use error::ContextError;
pub use interpreter::InterpreterVersion;
pub use platform::{OsFamily, Platform, PointerWidth};
pub use release::ReleaseNumber;
