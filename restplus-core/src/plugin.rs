//! Plugin system.
//!
//! Plugins are composable units of functionality installed into an [`Api`]
//! with `.with(plugin)`.

use crate::builder::Api;

/// A composable unit of functionality that can be installed into an [`Api`].
///
/// Plugins can add layers, register raw routes, or consume the documentation
/// metadata produced at build time.
///
/// # Example
///
/// ```ignore
/// pub struct Health;
///
/// impl Plugin for Health {
///     fn install<S: Clone + Send + Sync + 'static>(self, api: Api<S>) -> Api<S> {
///         api.register_routes(Router::new().route("/health", get(|| async { "OK" })))
///     }
/// }
/// ```
pub trait Plugin: Send + 'static {
    fn install<S: Clone + Send + Sync + 'static>(self, api: Api<S>) -> Api<S>;

    /// Whether this plugin must be the outermost one. The builder warns when
    /// other plugins are installed after it.
    fn should_be_last() -> bool
    where
        Self: Sized,
    {
        false
    }

    /// The name of this plugin (for diagnostics).
    fn name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}
