//! Everything needed to declare an API with a single `use`.
//!
//! ```ignore
//! use restplus_core::prelude::*;
//!
//! async fn hello(_call: Call<()>) -> Result<Value, ApiError> {
//!     Ok(json!({"hello": "world"}))
//! }
//!
//! let app = Api::new(())
//!     .route("/hello", Resource::new("HelloWorld").get(Operation::new(hello)))
//!     .build();
//! ```

pub use crate::builder::Api;
pub use crate::config::RestConfig;
pub use crate::cors::CrossDomain;
pub use crate::error::{abort, abort_with, ApiError, SpecsError};
pub use crate::fields::Field;
pub use crate::meta::{ApiInfo, Contact};
pub use crate::model::Model;
pub use crate::namespace::Namespace;
pub use crate::plugin::Plugin;
pub use crate::plugins::{Cors, ErrorHandling, Tracing};
pub use crate::reqparse::{ArgKind, Argument, Location, RequestParser};
pub use crate::resource::{Call, Operation, Reply, Resource};
pub use crate::http::{HeaderMap, Method, StatusCode};
pub use serde_json::{json, Value};
