use kvf_types::{ModelIdentity, PrimaryKey, TypeResult};
use serde_json::Value;

/// Error type returned by host model hooks.
pub type HostError = Box<dyn std::error::Error + Send + Sync>;

/// A host model type that can carry remote fields.
///
/// The identity must be unique per type: two types with the same
/// `APP_LABEL` and `MODEL_NAME` share every class-scoped key.
pub trait Model {
    /// Application label, the first half of the identity.
    const APP_LABEL: &'static str;
    /// Model name, the second half of the identity.
    const MODEL_NAME: &'static str;

    fn identity() -> TypeResult<ModelIdentity> {
        ModelIdentity::new(Self::APP_LABEL, Self::MODEL_NAME)
    }

    /// Primary key of this instance, or `None` if it has none yet.
    fn primary_key(&self) -> Option<PrimaryKey>;

    /// Store a mirrored field value in the attribute `name`.
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), HostError> {
        let _ = value;
        Err(format!("{} does not accept attribute {name}", Self::MODEL_NAME).into())
    }

    /// Persist the instance in host-managed storage.
    fn save(&mut self) -> Result<(), HostError> {
        Err(format!("{} cannot be saved", Self::MODEL_NAME).into())
    }
}
