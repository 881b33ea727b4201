use std::fmt;

use kvf_codec::{Codec, DynamicValue};
use kvf_store::StoreClient;
use kvf_types::{validate_field_name, KeyNamespace};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::collection::{HashField, ListField, SetField, SortedSetField};
use crate::error::{FieldError, FieldResult};
use crate::field::Field;
use crate::ops::FieldBinding;
use crate::scalar::{Counter, ObjectField, StringField};

/// The seven kinds of persisted field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Counter,
    String,
    Object,
    List,
    Hash,
    Set,
    SortedSet,
}

impl FieldKind {
    pub const ALL: [FieldKind; 7] = [
        FieldKind::Counter,
        FieldKind::String,
        FieldKind::Object,
        FieldKind::List,
        FieldKind::Hash,
        FieldKind::Set,
        FieldKind::SortedSet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::String => "string",
            Self::Object => "object",
            Self::List => "list",
            Self::Hash => "hash",
            Self::Set => "set",
            Self::SortedSet => "sorted_set",
        }
    }

    /// Counter and string values are plain backend text.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Counter | Self::String)
    }

    /// Returns `true` for list, hash, set, and sorted set.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::List | Self::Hash | Self::Set | Self::SortedSet)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a field is shared by a model type or private to each instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Class,
    Instance,
}

impl Scope {
    /// Returns `true` if `namespace` is the right variant for this scope.
    pub fn admits(&self, namespace: &KeyNamespace) -> bool {
        match self {
            Self::Class => namespace.is_class(),
            Self::Instance => !namespace.is_class(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class => f.write_str("class"),
            Self::Instance => f.write_str("instance"),
        }
    }
}

/// Registered description of one persisted field.
///
/// Immutable once built. The builder methods consume and return the spec.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    scope: Scope,
    codec: Codec,
    persist_to: Option<String>,
}

impl FieldSpec {
    /// Describe a field. Counter and string fields use [`Codec::Raw`]; every
    /// other kind starts with [`Codec::Binary`].
    pub fn new(name: impl Into<String>, kind: FieldKind, scope: Scope) -> FieldResult<Self> {
        let name = name.into();
        validate_field_name(&name)?;
        let codec = if kind.is_text() {
            Codec::Raw
        } else {
            Codec::Binary
        };
        Ok(Self {
            name,
            kind,
            scope,
            codec,
            persist_to: None,
        })
    }

    /// Use `codec` for this field's values.
    pub fn with_codec(mut self, codec: Codec) -> FieldResult<Self> {
        if self.kind.is_text() && codec != Codec::Raw {
            return Err(FieldError::UnsupportedCodec {
                kind: self.kind,
                codec,
            });
        }
        self.codec = codec;
        Ok(self)
    }

    /// Mirror this field into the host attribute `attribute` on save.
    pub fn persist_to(mut self, attribute: impl Into<String>) -> Self {
        self.persist_to = Some(attribute.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Host attribute this field is mirrored into, if any.
    pub fn persisted_as(&self) -> Option<&str> {
        self.persist_to.as_deref()
    }

    /// Backend key of this field in `namespace`.
    pub fn key(&self, namespace: &KeyNamespace) -> String {
        namespace.key(&self.name)
    }

    // ---- Binding ----

    fn binding(&self, namespace: KeyNamespace, client: &StoreClient) -> FieldResult<FieldBinding> {
        if !self.scope.admits(&namespace) {
            return Err(FieldError::UnboundAccess {
                field: self.name.clone(),
                scope: self.scope,
            });
        }
        Ok(FieldBinding::new(
            namespace,
            self.name.clone(),
            client.with_codec(self.codec),
        ))
    }

    fn expect_kind(&self, expected: FieldKind) -> FieldResult<()> {
        if self.kind != expected {
            return Err(FieldError::KindMismatch {
                field: self.name.clone(),
                expected,
                actual: self.kind,
            });
        }
        Ok(())
    }

    fn typed_binding(
        &self,
        expected: FieldKind,
        namespace: KeyNamespace,
        client: &StoreClient,
    ) -> FieldResult<FieldBinding> {
        self.expect_kind(expected)?;
        self.binding(namespace, client)
    }

    /// Bind to an untyped [`Field`] handle.
    pub fn bind(&self, namespace: KeyNamespace, client: &StoreClient) -> FieldResult<Field> {
        let binding = self.binding(namespace, client)?;
        Ok(match self.kind {
            FieldKind::Counter => Field::Counter(Counter::new(binding)),
            FieldKind::String => Field::String(StringField::new(binding)),
            FieldKind::Object => Field::Object(ObjectField::<DynamicValue>::new(binding)),
            FieldKind::List => Field::List(ListField::<DynamicValue>::new(binding)),
            FieldKind::Hash => Field::Hash(HashField::<DynamicValue>::new(binding)),
            FieldKind::Set => Field::Set(SetField::<DynamicValue>::new(binding)),
            FieldKind::SortedSet => Field::SortedSet(SortedSetField::<DynamicValue>::new(binding)),
        })
    }

    pub fn counter(&self, namespace: KeyNamespace, client: &StoreClient) -> FieldResult<Counter> {
        let binding = self.typed_binding(FieldKind::Counter, namespace, client)?;
        Ok(Counter::new(binding))
    }

    pub fn string(
        &self,
        namespace: KeyNamespace,
        client: &StoreClient,
    ) -> FieldResult<StringField> {
        let binding = self.typed_binding(FieldKind::String, namespace, client)?;
        Ok(StringField::new(binding))
    }

    pub fn object<T: Serialize + DeserializeOwned>(
        &self,
        namespace: KeyNamespace,
        client: &StoreClient,
    ) -> FieldResult<ObjectField<T>> {
        let binding = self.typed_binding(FieldKind::Object, namespace, client)?;
        Ok(ObjectField::new(binding))
    }

    pub fn list<T: Serialize + DeserializeOwned>(
        &self,
        namespace: KeyNamespace,
        client: &StoreClient,
    ) -> FieldResult<ListField<T>> {
        let binding = self.typed_binding(FieldKind::List, namespace, client)?;
        Ok(ListField::new(binding))
    }

    pub fn hash<T: Serialize + DeserializeOwned>(
        &self,
        namespace: KeyNamespace,
        client: &StoreClient,
    ) -> FieldResult<HashField<T>> {
        let binding = self.typed_binding(FieldKind::Hash, namespace, client)?;
        Ok(HashField::new(binding))
    }

    pub fn set<T: Serialize + DeserializeOwned>(
        &self,
        namespace: KeyNamespace,
        client: &StoreClient,
    ) -> FieldResult<SetField<T>> {
        let binding = self.typed_binding(FieldKind::Set, namespace, client)?;
        Ok(SetField::new(binding))
    }

    pub fn sorted_set<T: Serialize + DeserializeOwned>(
        &self,
        namespace: KeyNamespace,
        client: &StoreClient,
    ) -> FieldResult<SortedSetField<T>> {
        let binding = self.typed_binding(FieldKind::SortedSet, namespace, client)?;
        Ok(SortedSetField::new(binding))
    }
}
