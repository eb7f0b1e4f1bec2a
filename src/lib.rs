//! # stresscast
//!
//! Hybrid fuzzy + ensemble stress-level prediction.
//!
//! A deterministic feature pipeline turns raw lifestyle records into the
//! exact column layout a tree ensemble was trained on, then serves
//! predictions over HTTP:
//!
//! - **Fuzzification**: five numeric attributes expand into fourteen
//!   triangular membership degrees ([`fuzzy`])
//! - **Frozen encoding**: categorical values map through training-time
//!   vocabularies, unseen values are rejected ([`encoder`])
//! - **Canonical assembly**: encoded, raw, and fuzzy columns reindex to
//!   the frozen trained column order ([`features`])
//! - **Classification**: a serialized tree ensemble votes on the stress
//!   level ([`model`])
//! - **Serving**: one artifact bundle, loaded and validated at startup,
//!   behind an axum API ([`artifact`], [`service`], [`server`])
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use stresscast::service::InferenceService;
//! use stresscast::features::RawRecord;
//!
//! let service = InferenceService::from_path("model.json")?;
//! let record = RawRecord {
//!     gender: "Male".into(),
//!     age: Some(33.0),
//!     sleep_duration: Some(7.5),
//!     quality_of_sleep: Some(8.0),
//!     bmi_category: "Normal".into(),
//!     heart_rate: Some(75.0),
//!     daily_steps: Some(8000.0),
//!     sleep_disorder: None,
//! };
//! println!("{}", service.predict(&record)?.label);
//! ```
//!
//! The same pipeline runs at training time and at serving time; the only
//! sanctioned difference is the missing-value fill policy
//! ([`features::FillPolicy`]).

pub mod artifact;
pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod fuzzy;
pub mod model;
pub mod server;
pub mod service;

pub use artifact::ModelArtifact;
pub use error::{ErrorCode, StressError, StressResult};
pub use features::{FillPolicy, RawRecord};
pub use service::{InferenceService, PredictionResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
