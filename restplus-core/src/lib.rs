pub mod builder;
pub mod config;
pub mod cors;
mod dispatch;
pub mod error;
pub mod fields;
pub mod http;
pub mod layers;
pub mod marshal;
pub mod mask;
pub mod meta;
pub mod model;
pub mod namespace;
pub mod negotiate;
pub mod pattern;
pub mod plugin;
pub mod plugins;
pub mod prelude;
pub mod reqparse;
pub mod resource;
pub mod settings;
pub mod utils;
pub mod validation;

pub use builder::Api;
pub use config::{ConfigError, ConfigValue, FromConfigValue, RestConfig};
pub use cors::CrossDomain;
pub use dispatch::default_status;
pub use error::{abort, abort_with, ApiError, MarshalError, SpecsError};
pub use fields::{Field, FieldKind};
pub use layers::{catch_panic_layer, default_cors, default_trace, init_tracing};
pub use marshal::{marshal, marshal_serialize};
pub use mask::{Mask, MaskError};
pub use meta::{
    ApiDoc, ApiInfo, BodyDoc, Contact, License, MetaRegistry, NamespaceDoc, OperationDoc,
    ParamDoc, ParamLocation, ResponseDoc, RouteDoc, TagDoc,
};
pub use model::{Model, ModelBuilder};
pub use namespace::Namespace;
pub use negotiate::{best_match, json_renderer, Renderer, Representations, APPLICATION_JSON, TEXT_PLAIN};
pub use pattern::{Converter, RoutePattern};
pub use plugin::Plugin;
pub use reqparse::{ArgKind, Argument, Location, RequestParser};
pub use resource::{Call, Operation, Reply, Resource};
pub use settings::ApiSettings;
pub use validation::{FieldError, ValidationError};
