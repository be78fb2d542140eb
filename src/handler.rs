//! Minimal request entry point
//!
//! [`Handler`] exists to put the path decoder and the init guard together
//! the way a web framework does on every request: the middleware chain is
//! loaded lazily under an [`InitGuard`], then the raw path is validated,
//! decoded and matched against a fixed set of routes. It is not a router.
//!
//! # Examples
//!
//! ```rust
//! use markup_sanitizer::handler::{Handler, HandlerSettings, MiddlewareRegistry};
//!
//! let handler = Handler::new(HandlerSettings::default(), MiddlewareRegistry::new());
//! assert_eq!(handler.call(b"/").unwrap().status, 200);
//! assert_eq!(handler.call(b"\xED").unwrap().status, 400);
//!
//! let missing = handler.call(b"/~%A9helloworld").unwrap();
//! assert_eq!(missing.status, 404);
//! assert_eq!(missing.request_path.as_deref(), Some("/%7E%25A9helloworld"));
//! ```

use encoding_rs::Encoding;
use percent_encoding::percent_decode;
use std::collections::HashMap;

use crate::error::SanitizerError;
use crate::guard::InitGuard;
use crate::path::{decode_path, encoding_for_label, escape_uri_path, try_decode_path};

/// Handler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSettings {
    /// Middleware names, resolved through the registry in order
    pub middleware: Vec<String>,
    /// Charset label used to decode request paths
    pub charset: String,
    /// Paths answered with 200
    pub routes: Vec<String>,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            middleware: Vec::new(),
            charset: "utf-8".to_string(),
            routes: vec!["/".to_string()],
        }
    }
}

/// A decoded request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Decoded path, always starting with `/`
    pub path: String,
}

/// Outcome of handling a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Escaped path for display, set on 404 responses
    pub request_path: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self::with_status(200)
    }

    pub fn bad_request() -> Self {
        Self::with_status(400)
    }

    pub fn not_found(request_path: String) -> Self {
        Self {
            status: 404,
            request_path: Some(request_path),
        }
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            request_path: None,
        }
    }
}

/// Request hook run before routing
pub trait Middleware: Send + Sync {
    /// Return `Some` to answer the request without routing it
    fn process_request(&self, request: &Request) -> Option<Response>;
}

type MiddlewareFactory = Box<dyn Fn() -> Box<dyn Middleware> + Send + Sync>;

/// Named middleware constructors
#[derive(Default)]
pub struct MiddlewareRegistry {
    factories: HashMap<String, MiddlewareFactory>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any previous entry
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Middleware> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    fn build(&self, name: &str) -> Result<Box<dyn Middleware>, SanitizerError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| {
                SanitizerError::ImproperlyConfigured(format!("unknown middleware '{name}'"))
            })
    }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("MiddlewareRegistry")
            .field("names", &names)
            .finish()
    }
}

/// Request handler with a lazily loaded middleware chain
pub struct Handler {
    settings: HandlerSettings,
    registry: MiddlewareRegistry,
    chain: InitGuard<Vec<Box<dyn Middleware>>>,
}

impl Handler {
    pub fn new(settings: HandlerSettings, registry: MiddlewareRegistry) -> Self {
        Self {
            settings,
            registry,
            chain: InitGuard::new(),
        }
    }

    pub fn settings(&self) -> &HandlerSettings {
        &self.settings
    }

    /// Whether middleware loading currently holds the init lock
    pub fn is_init_locked(&self) -> bool {
        self.chain.is_held()
    }

    /// Whether the middleware chain has been loaded
    pub fn is_loaded(&self) -> bool {
        self.chain.is_initialized()
    }

    /// Handle one request for `raw_path_info`
    ///
    /// # Errors
    ///
    /// Returns [`SanitizerError::ImproperlyConfigured`] when a middleware
    /// name is not registered and [`SanitizerError::UnknownEncoding`] when
    /// the charset label is not recognised. An undecodable path is not an
    /// error: it produces a 400 response.
    pub fn call(&self, raw_path_info: &[u8]) -> Result<Response, SanitizerError> {
        let chain = self.chain.get_or_try_init(|| self.load_middleware())?;
        let encoding = encoding_for_label(&self.settings.charset)?;

        let request = match build_request(raw_path_info, encoding) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(error = %err, "rejecting undecodable request path");
                return Ok(Response::bad_request());
            }
        };

        if let Some(response) = chain.iter().find_map(|m| m.process_request(&request)) {
            tracing::debug!(status = response.status, "middleware answered request");
            return Ok(response);
        }

        if self.settings.routes.iter().any(|route| *route == request.path) {
            Ok(Response::ok())
        } else {
            Ok(Response::not_found(escape_uri_path(&request.path)))
        }
    }

    fn load_middleware(&self) -> Result<Vec<Box<dyn Middleware>>, SanitizerError> {
        tracing::debug!(count = self.settings.middleware.len(), "loading middleware");
        self.settings
            .middleware
            .iter()
            .map(|name| self.registry.build(name))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|err| tracing::error!(error = %err, "middleware loading failed"))
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Validate and decode a raw wire path into a [`Request`]
///
/// # Errors
///
/// Returns [`SanitizerError::InvalidPath`] when `raw` itself does not decode
/// under `encoding`. Bytes produced by percent-unquoting never cause an
/// error; they fall back to `%XX` escapes.
///
/// Unquoting works on the raw bytes, so the path is decoded exactly once.
pub fn build_request(raw: &[u8], encoding: &'static Encoding) -> Result<Request, SanitizerError> {
    try_decode_path(raw, encoding)?;
    let unquoted: Vec<u8> = percent_decode(raw).collect();
    let path = decode_path(&unquoted, encoding);
    let path = if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    };
    Ok(Request { path })
}
