//! Field registration for kvfield.
//!
//! This is the entry point for applications. A host model type implements
//! [`Model`]; a [`Registrar`] for that type records the fields it exposes
//! and produces bound handles for them, either shared by the type
//! (class scope) or private to one instance (instance scope).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kvf_registry::{Model, PrimaryKey, Registrar, StoreClient};
//! use kvf_store::InMemoryBackend;
//!
//! struct Article {
//!     id: u64,
//! }
//!
//! impl Model for Article {
//!     const APP_LABEL: &'static str = "blog";
//!     const MODEL_NAME: &'static str = "article";
//!
//!     fn primary_key(&self) -> Option<PrimaryKey> {
//!         Some(PrimaryKey::from(self.id))
//!     }
//! }
//!
//! let client = StoreClient::new(Arc::new(InMemoryBackend::new()));
//! let mut registrar = Registrar::<Article>::new(client).unwrap();
//! registrar.add_counter("views").unwrap();
//!
//! let article = Article { id: 1 };
//! let views = registrar.field("views", &article).unwrap();
//! assert_eq!(views.as_counter().unwrap().incr().unwrap(), 1);
//! assert_eq!(registrar.accessor_names("views").unwrap()[1], "views_incr");
//! ```
//!
//! # Accessors
//!
//! Each field gets a base accessor named after it plus suffixed accessors
//! for its kind (see [`Accessor`]). They can be called by name through
//! [`Registrar::call_class`] and [`Registrar::call`].

pub mod accessor;
pub mod config;
pub mod error;
pub mod model;
pub mod registrar;

pub use accessor::Accessor;
pub use config::{DuplicatePolicy, RegistryConfig};
pub use error::{RegistryError, RegistryResult};
pub use model::{HostError, Model};
pub use registrar::Registrar;

pub use kvf_codec::Codec;
pub use kvf_fields::{Field, FieldKind, FieldOps, FieldSpec, FieldValue, Scope};
pub use kvf_store::StoreClient;
pub use kvf_types::{KeyNamespace, ModelIdentity, PrimaryKey};
