use crate::http::{
    HeaderMap, HeaderName, HeaderValue, Method, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS,
    ACCESS_CONTROL_MAX_AGE,
};
use std::time::Duration;

/// Per-resource cross-origin headers.
///
/// Attach with [`Resource::cross_domain`](crate::Resource::cross_domain).
/// For a blanket API-wide policy use the [`Cors`](crate::plugins::Cors) plugin.
///
/// ```ignore
/// Resource::new("Foo")
///     .get(Operation::new(get_foo))
///     .cross_domain(CrossDomain::new("*").expose_headers(["X-My-Header"]))
/// ```
#[derive(Debug, Clone)]
pub struct CrossDomain {
    origin: String,
    methods: Option<Vec<Method>>,
    headers: Option<String>,
    expose_headers: Option<String>,
    max_age: Duration,
    credentials: bool,
    attach_to_all: bool,
    automatic_options: bool,
}

impl CrossDomain {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            methods: None,
            headers: None,
            expose_headers: None,
            max_age: Duration::from_secs(21600),
            credentials: false,
            attach_to_all: true,
            automatic_options: true,
        }
    }

    /// Several allowed origins, sent comma separated.
    pub fn origins<I, O>(origins: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: AsRef<str>,
    {
        let joined = origins
            .into_iter()
            .map(|o| o.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(joined)
    }

    /// Restrict `Access-Control-Allow-Methods`. `OPTIONS` is always added.
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = Some(methods.into_iter().collect());
        self
    }

    pub fn headers<I, H>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: AsRef<str>,
    {
        self.headers = Some(upper_join(headers));
        self
    }

    pub fn expose_headers<I, H>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: AsRef<str>,
    {
        self.expose_headers = Some(upper_join(headers));
        self
    }

    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn credentials(mut self, credentials: bool) -> Self {
        self.credentials = credentials;
        self
    }

    /// When false, headers are only sent on `OPTIONS` responses.
    pub fn attach_to_all(mut self, attach: bool) -> Self {
        self.attach_to_all = attach;
        self
    }

    /// When true, `OPTIONS` is answered directly without calling a handler.
    pub fn automatic_options(mut self, automatic: bool) -> Self {
        self.automatic_options = automatic;
        self
    }

    pub fn handles_options(&self) -> bool {
        self.automatic_options
    }

    pub fn applies_to(&self, method: &Method) -> bool {
        self.attach_to_all || method == Method::OPTIONS
    }

    fn allowed_methods(&self, resource_methods: &[Method]) -> String {
        let mut names: Vec<String> = match &self.methods {
            Some(methods) => methods.iter().map(|m| m.as_str().to_uppercase()).collect(),
            None => resource_methods
                .iter()
                .map(|m| m.as_str().to_string())
                .chain(["HEAD".to_string()])
                .collect(),
        };
        names.sort();
        names.dedup();
        if !names.iter().any(|m| m == "OPTIONS") {
            names.push("OPTIONS".to_string());
        }
        names.join(", ")
    }

    /// Write the CORS headers into `headers`.
    pub fn apply(&self, headers: &mut HeaderMap, resource_methods: &[Method]) {
        let mut set = |name: HeaderName, value: &str| {
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.insert(name, value);
            }
        };
        set(ACCESS_CONTROL_ALLOW_ORIGIN, &self.origin);
        set(ACCESS_CONTROL_ALLOW_METHODS, &self.allowed_methods(resource_methods));
        set(ACCESS_CONTROL_MAX_AGE, &self.max_age.as_secs().to_string());
        if self.credentials {
            set(ACCESS_CONTROL_ALLOW_CREDENTIALS, "true");
        }
        if let Some(allow) = &self.headers {
            set(ACCESS_CONTROL_ALLOW_HEADERS, allow);
        }
        if let Some(expose) = &self.expose_headers {
            set(ACCESS_CONTROL_EXPOSE_HEADERS, expose);
        }
    }
}

fn upper_join<I, H>(items: I) -> String
where
    I: IntoIterator<Item = H>,
    H: AsRef<str>,
{
    items
        .into_iter()
        .map(|h| h.as_ref().to_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}
