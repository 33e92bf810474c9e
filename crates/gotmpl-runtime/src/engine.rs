//! Template engine API for embedding
//!
//! An [`Engine`] pairs one template with the process-wide native renderer.
//! Every render runs the same pipeline: serialize the data, call the
//! renderer, take ownership of the returned buffer, decode and classify it,
//! give the buffer back.

use crate::async_runtime::Offload;
use crate::classify::ResultClassifier;
use crate::error::{BridgeError, BridgeResult};
use crate::ffi::{caller, encode_payload, LibraryLoader, NativeHandle, TemplateSource};
use gotmpl_config::settings::DEFAULT_MAX_INFLIGHT;
use gotmpl_config::{ConfigError, ConfigLoader, Settings};
use serde::Serialize;
use std::sync::Arc;

/// Per-engine behavior knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Unknown `*_ERROR:` prefixes are failures, not output
    pub strict_sentinels: bool,
    /// Run native calls under the process-wide call lock
    pub serialize_calls: bool,
    /// Upper bound on concurrent `render_async` calls of this engine
    pub max_inflight: usize,
}

impl RenderOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            strict_sentinels: settings.strict_sentinels,
            serialize_calls: settings.serialize_calls,
            max_inflight: settings.max_inflight,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strict_sentinels: true,
            serialize_calls: false,
            max_inflight: DEFAULT_MAX_INFLIGHT,
        }
    }
}

/// A template bound to the native renderer
///
/// Cloning is cheap and clones share the template, the native handle and
/// the async concurrency bound.
///
/// # Examples
///
/// ```no_run
/// use gotmpl_runtime::Engine;
/// use serde_json::json;
///
/// let engine = Engine::new("Hello, {{.Name}}!").unwrap();
/// assert_eq!(engine.render(&json!({"Name": "World"})).unwrap(), "Hello, World!");
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    template: Arc<TemplateSource>,
    handle: Arc<NativeHandle>,
    classifier: ResultClassifier,
    serialize_calls: bool,
    offload: Offload,
}

impl Engine {
    /// Build an engine using configuration discovered from the working
    /// directory (see `gotmpl_config::ConfigLoader`)
    pub fn new(template: impl Into<String>) -> BridgeResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::IoError)?;
        let settings = ConfigLoader::new().load_from_directory(&cwd)?;
        Self::with_settings(template, &settings)
    }

    /// Build an engine from already resolved settings
    pub fn with_settings(template: impl Into<String>, settings: &Settings) -> BridgeResult<Self> {
        let template = TemplateSource::new(template)?;
        let handle = LibraryLoader::from_settings(settings).ensure_loaded()?;
        Ok(Self::from_parts(
            template,
            handle,
            RenderOptions::from_settings(settings),
        ))
    }

    /// Build an engine through a specific loader, default options
    pub fn with_loader(template: impl Into<String>, loader: &LibraryLoader) -> BridgeResult<Self> {
        let template = TemplateSource::new(template)?;
        let handle = loader.ensure_loaded()?;
        Ok(Self::from_parts(template, handle, RenderOptions::default()))
    }

    /// Build an engine on an existing handle, default options
    pub fn with_handle(
        template: impl Into<String>,
        handle: Arc<NativeHandle>,
    ) -> BridgeResult<Self> {
        let template = TemplateSource::new(template)?;
        Ok(Self::from_parts(template, handle, RenderOptions::default()))
    }

    fn from_parts(template: TemplateSource, handle: Arc<NativeHandle>, options: RenderOptions) -> Self {
        Self {
            template: Arc::new(template),
            handle,
            classifier: ResultClassifier::new(options.strict_sentinels),
            serialize_calls: options.serialize_calls,
            offload: Offload::new(options.max_inflight),
        }
    }

    /// Replace this engine's options
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.classifier = ResultClassifier::new(options.strict_sentinels);
        self.serialize_calls = options.serialize_calls;
        self.offload = Offload::new(options.max_inflight);
        self
    }

    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            strict_sentinels: self.classifier.is_strict(),
            serialize_calls: self.serialize_calls,
            max_inflight: self.offload.limit(),
        }
    }

    /// The template text this engine renders
    pub fn template(&self) -> &str {
        self.template.as_str()
    }

    /// The shared native handle
    pub fn handle(&self) -> &Arc<NativeHandle> {
        &self.handle
    }

    /// Render synchronously on the calling thread
    pub fn render<T>(&self, payload: &T) -> BridgeResult<String>
    where
        T: Serialize + ?Sized,
    {
        let data = encode_payload(payload)?;
        let buffer = caller::invoke(
            &self.handle,
            self.template.as_c_str(),
            &data,
            self.serialize_calls,
        )?;

        let outcome = match buffer.to_str() {
            Ok(text) => self.classifier.classify(text),
            Err(e) => Err(BridgeError::DecodingError(e)),
        };
        // Reclaim before any error reaches the caller
        drop(buffer);
        outcome
    }

    /// Render an already parsed JSON document
    pub fn render_value(&self, value: &serde_json::Value) -> BridgeResult<String> {
        self.render(value)
    }

    /// Render on the blocking worker pool
    ///
    /// Resolves to exactly what [`render`](Self::render) returns for the same
    /// input. Must be awaited inside a tokio runtime. Dropping the future
    /// does not abort a call that already reached the renderer.
    pub async fn render_async<T>(&self, payload: T) -> BridgeResult<String>
    where
        T: Serialize + Send + 'static,
    {
        let engine = self.clone();
        self.offload.run(move || engine.render(&payload)).await
    }
}
