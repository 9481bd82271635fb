//! restplus: declarative REST resources, models and Swagger documentation
//! over Axum.
//!
//! This facade crate re-exports the sub-crates through a single dependency.
//!
//! ```ignore
//! use restplus::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature   | Default | Crate              |
//! |-----------|---------|--------------------|
//! | `openapi` | **yes** | `restplus-openapi` |

pub extern crate restplus_core;

pub use restplus_core::*;

#[cfg(feature = "openapi")]
pub use restplus_openapi;

/// Unified prelude, `use restplus::prelude::*`.
pub mod prelude {
    pub use restplus_core::prelude::*;

    #[cfg(feature = "openapi")]
    pub use restplus_openapi::{SwaggerConfig, SwaggerPlugin};
}
