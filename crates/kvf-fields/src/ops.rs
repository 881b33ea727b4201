use kvf_store::{KvBackend, StoreClient, StoreResult};
use kvf_types::KeyNamespace;
use tracing::debug;

use crate::error::FieldResult;

/// A field name resolved against a namespace and a codec-bound client.
///
/// The backend key is derived again on every call.
#[derive(Clone, Debug)]
pub struct FieldBinding {
    namespace: KeyNamespace,
    name: String,
    client: StoreClient,
}

impl FieldBinding {
    pub fn new(namespace: KeyNamespace, name: String, client: StoreClient) -> Self {
        Self {
            namespace,
            name,
            client,
        }
    }

    pub fn key(&self) -> String {
        self.namespace.key(&self.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &KeyNamespace {
        &self.namespace
    }

    pub fn client(&self) -> &StoreClient {
        &self.client
    }

    /// Replace the collection with already-encoded `entries`: delete the
    /// key, then `write` each entry.
    ///
    /// Callers encode before calling, so a value the codec rejects leaves
    /// the previous contents in place.
    pub(crate) fn replace<E>(
        &self,
        entries: Vec<E>,
        mut write: impl FnMut(&dyn KvBackend, &str, E) -> StoreResult<()>,
    ) -> FieldResult<()> {
        let key = self.key();
        let count = entries.len();
        let backend: &dyn KvBackend = &**self.client.backend();
        backend.delete(&key)?;
        for entry in entries {
            write(backend, &key, entry)?;
        }
        debug!(%key, count, "replaced collection");
        Ok(())
    }
}

/// Uniform get/set/delete over one bound field.
pub trait FieldOps {
    /// What `set` accepts.
    type Value;
    /// What `get` returns: a value for scalars, a live view for collections.
    type Output;

    fn binding(&self) -> &FieldBinding;

    fn get(&self) -> FieldResult<Self::Output>;

    fn set(&self, value: Self::Value) -> FieldResult<()>;

    /// Fully-qualified backend key.
    fn key(&self) -> String {
        self.binding().key()
    }

    fn exists(&self) -> FieldResult<bool> {
        Ok(self.binding().client().exists(&self.key())?)
    }

    /// Remove the backend key. Deleting an absent field is a no-op.
    fn delete(&self) -> FieldResult<()> {
        self.binding().client().delete(&self.key())?;
        Ok(())
    }
}
