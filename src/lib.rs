//! Rust client for Gemini image generation covering four workflows: style
//! remix, face swap, free-form editing, and text-to-image.
//!
//! The crate splits the work in two: [`compose::build_request`] turns a
//! [`Mode`] plus [`RawInputs`] into an immutable [`ImageGenerationRequest`]
//! (pure, validation included), and [`GenerationExecutor`] runs that request
//! against the service with exponential backoff on transient server errors,
//! returning a [`GenerationOutcome`] the UI can render directly.
//!
//! ```no_run
//! use std::sync::Arc;
//! use remixgen::{
//!     build_request, GeminiClient, GeminiConfig, GenerationExecutor, Mode, RawInputs,
//! };
//!
//! # async fn demo() -> remixgen::Result<()> {
//! let inputs = RawInputs::new().with_prompt("a lighthouse at dusk, film grain");
//! let request = build_request(Mode::Generate, &inputs)?;
//!
//! let client = GeminiClient::new(GeminiConfig::from_env());
//! let executor = GenerationExecutor::new(Arc::new(client.image().clone()));
//! let outcome = executor.run(request).await;
//! # Ok(())
//! # }
//! ```

pub mod compose;
pub mod config;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod gemini;
pub mod logger;
pub mod models;

pub use compose::build_request;
pub use config::{GeminiConfig, RetryPolicy};
pub use credentials::{ApiKeyProvider, EnvKeyProvider, StaticKeyProvider};
pub use error::{ErrorClass, GeminiError, Result};
pub use executor::{DelayFn, GenerationExecutor};
pub use gemini::{GeminiClient, GenerationService, ImageClient};
pub use models::{
    AspectRatio, Attachment, GenerationOutcome, ImageGenerationRequest, ImageGenerationResponse,
    Mode, ModelVersion, OutputConfig, RawInputs, ReferenceImage, ResolutionTier,
};
