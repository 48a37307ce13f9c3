//! Domain types for Veil.
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`EntityType`], [`LanguageCode`])
//! - **Error types** ([`VeilError`], [`RecognizerError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Entity types and language codes are newtypes so a language tag can never be
//! passed where an entity filter is expected:
//!
//! ```rust
//! use veil::domain::{EntityType, LanguageCode};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let entity = EntityType::new("PERSON")?;
//! let language = LanguageCode::new("el")?;
//! // let wrong: EntityType = language;  // Compile error!
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{RecognizerError, VeilError};
pub use ids::{EntityType, LanguageCode};
pub use result::Result;
