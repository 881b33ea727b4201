use std::collections::btree_map::{BTreeMap, Entry};
use std::marker::PhantomData;

use kvf_codec::DynamicValue;
use kvf_fields::{Field, FieldError, FieldKind, FieldSpec, FieldValue, Scope};
use kvf_store::StoreClient;
use kvf_types::{KeyNamespace, ModelIdentity, TypeError};
use serde_json::Value;
use tracing::{debug, warn};

use crate::accessor::Accessor;
use crate::config::{DuplicatePolicy, RegistryConfig};
use crate::error::{RegistryError, RegistryResult};
use crate::model::Model;

/// The field registry of one host model type.
///
/// Built once when the model is set up, then shared read-only. Every
/// handle it produces recomputes its key from the namespace and goes to
/// the backend on each call.
pub struct Registrar<M> {
    identity: ModelIdentity,
    client: StoreClient,
    config: RegistryConfig,
    fields: BTreeMap<String, FieldSpec>,
    _model: PhantomData<fn(&M)>,
}

impl<M: Model> Registrar<M> {
    /// Create a registrar with the default configuration.
    pub fn new(client: StoreClient) -> RegistryResult<Self> {
        Self::with_config(client, RegistryConfig::default())
    }

    pub fn with_config(client: StoreClient, config: RegistryConfig) -> RegistryResult<Self> {
        Ok(Self {
            identity: M::identity()?,
            client,
            config,
            fields: BTreeMap::new(),
            _model: PhantomData,
        })
    }

    pub fn identity(&self) -> &ModelIdentity {
        &self.identity
    }

    pub fn client(&self) -> &StoreClient {
        &self.client
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a field. A name that is already taken is replaced or
    /// rejected according to the duplicate policy.
    pub fn register(&mut self, spec: FieldSpec) -> RegistryResult<&FieldSpec> {
        debug!(
            model = %self.identity,
            field = %spec.name(),
            kind = %spec.kind(),
            scope = %spec.scope(),
            codec = %spec.codec(),
            "registering field"
        );
        match self.fields.entry(spec.name().to_string()) {
            Entry::Vacant(entry) => Ok(entry.insert(spec)),
            Entry::Occupied(mut entry) => match self.config.duplicate_policy {
                DuplicatePolicy::Reject => Err(RegistryError::DuplicateFieldName {
                    model: self.identity.to_string(),
                    field: entry.key().clone(),
                }),
                DuplicatePolicy::Overwrite => {
                    warn!(
                        model = %self.identity,
                        field = %entry.key(),
                        "overwriting registered field"
                    );
                    entry.insert(spec);
                    Ok(entry.into_mut())
                }
            },
        }
    }

    fn add(&mut self, name: &str, kind: FieldKind, scope: Scope) -> RegistryResult<&FieldSpec> {
        let mut spec = FieldSpec::new(name, kind, scope)?;
        if !kind.is_text() {
            spec = spec.with_codec(self.config.default_codec)?;
        }
        self.register(spec)
    }

    pub fn add_counter(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::Counter, Scope::Instance)
    }

    pub fn add_counter_to_class(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::Counter, Scope::Class)
    }

    pub fn add_string(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::String, Scope::Instance)
    }

    pub fn add_string_to_class(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::String, Scope::Class)
    }

    pub fn add_object(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::Object, Scope::Instance)
    }

    pub fn add_object_to_class(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::Object, Scope::Class)
    }

    pub fn add_list(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::List, Scope::Instance)
    }

    pub fn add_list_to_class(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::List, Scope::Class)
    }

    pub fn add_dict(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::Hash, Scope::Instance)
    }

    pub fn add_dict_to_class(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::Hash, Scope::Class)
    }

    pub fn add_set(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::Set, Scope::Instance)
    }

    pub fn add_set_to_class(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::Set, Scope::Class)
    }

    pub fn add_zset(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::SortedSet, Scope::Instance)
    }

    pub fn add_zset_to_class(&mut self, name: &str) -> RegistryResult<&FieldSpec> {
        self.add(name, FieldKind::SortedSet, Scope::Class)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Registered fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    fn lookup(&self, name: &str) -> RegistryResult<&FieldSpec> {
        self.fields.get(name).ok_or_else(|| RegistryError::UnknownField {
            model: self.identity.to_string(),
            field: name.to_string(),
        })
    }

    /// Names of the accessors generated for `name`, base accessor first.
    pub fn accessor_names(&self, name: &str) -> RegistryResult<Vec<String>> {
        let spec = self.lookup(name)?;
        Ok(Accessor::for_kind(spec.kind(), spec.persisted_as().is_some())
            .into_iter()
            .map(|accessor| accessor.name_for(spec.name()))
            .collect())
    }

    /// Resolve an accessor name to its field and operation. An exact field
    /// name wins over a suffixed reading of the same string.
    fn resolve(&self, accessor: &str) -> RegistryResult<(&FieldSpec, Accessor)> {
        if let Some(spec) = self.fields.get(accessor) {
            return Ok((spec, Accessor::Get));
        }
        accessor
            .rsplit_once('_')
            .and_then(|(name, suffix)| {
                let spec = self.fields.get(name)?;
                let op = Accessor::from_suffix(suffix)?;
                op.applies_to(spec.kind(), spec.persisted_as().is_some())
                    .then_some((spec, op))
            })
            .ok_or_else(|| RegistryError::UnknownAccessor {
                accessor: accessor.to_string(),
            })
    }

    // ------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------

    pub fn class_namespace(&self) -> KeyNamespace {
        KeyNamespace::class(self.identity.clone())
    }

    /// Namespace of `instance`. Fails if the instance has no primary key
    /// yet.
    pub fn instance_namespace(&self, instance: &M) -> RegistryResult<KeyNamespace> {
        let pk = instance
            .primary_key()
            .ok_or_else(|| TypeError::InvalidIdentity {
                value: self.identity.to_string(),
                reason: "instance has no primary key".to_string(),
            })?;
        Ok(KeyNamespace::instance(self.identity.clone(), pk))
    }

    /// Bind a class-scoped field.
    pub fn class_field(&self, name: &str) -> RegistryResult<Field> {
        let spec = self.lookup(name)?;
        Ok(spec.bind(self.class_namespace(), &self.client)?)
    }

    /// Bind an instance-scoped field to `instance`.
    pub fn field(&self, name: &str, instance: &M) -> RegistryResult<Field> {
        let spec = self.lookup(name)?;
        self.bind_instance(spec, instance)
    }

    fn bind_instance(&self, spec: &FieldSpec, instance: &M) -> RegistryResult<Field> {
        // Checked before the primary key so a scope error is reported as such.
        if spec.scope() == Scope::Class {
            return Err(FieldError::UnboundAccess {
                field: spec.name().to_string(),
                scope: Scope::Class,
            }
            .into());
        }
        Ok(spec.bind(self.instance_namespace(instance)?, &self.client)?)
    }

    // ------------------------------------------------------------------
    // Accessor dispatch
    // ------------------------------------------------------------------

    /// Call a class-level accessor by name, e.g. `"views_incr"`.
    pub fn call_class(
        &self,
        accessor: &str,
        arg: Option<FieldValue>,
    ) -> RegistryResult<FieldValue> {
        let (spec, op) = self.resolve(accessor)?;
        if op == Accessor::Save {
            return Err(RegistryError::InstanceRequired {
                accessor: accessor.to_string(),
            });
        }
        let field = spec.bind(self.class_namespace(), &self.client)?;
        apply(&field, accessor, op, arg)
    }

    /// Call an instance-level accessor by name on `instance`.
    pub fn call(
        &self,
        accessor: &str,
        instance: &mut M,
        arg: Option<FieldValue>,
    ) -> RegistryResult<FieldValue> {
        let (spec, op) = self.resolve(accessor)?;
        if op == Accessor::Save {
            return self.save(spec.name(), instance);
        }
        let field = self.bind_instance(spec, instance)?;
        apply(&field, accessor, op, arg)
    }

    /// Copy the current value of `name` into its host attribute, then save
    /// the instance. Returns the mirrored value.
    ///
    /// Class-scoped fields are read from the class namespace.
    pub fn save(&self, name: &str, instance: &mut M) -> RegistryResult<FieldValue> {
        let spec = self.lookup(name)?;
        let attribute = spec
            .persisted_as()
            .ok_or_else(|| RegistryError::NotPersisted {
                field: name.to_string(),
            })?;
        let field = match spec.scope() {
            Scope::Class => spec.bind(self.class_namespace(), &self.client)?,
            Scope::Instance => spec.bind(self.instance_namespace(instance)?, &self.client)?,
        };
        let value = field.get()?;

        let host_error = |source| RegistryError::Host {
            field: name.to_string(),
            source,
        };
        instance
            .set_attribute(attribute, value.clone().into_json())
            .map_err(host_error)?;
        instance.save().map_err(host_error)?;

        debug!(key = %field.key(), attribute, "mirrored field into model");
        Ok(value)
    }
}

impl<M> std::fmt::Debug for Registrar<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar")
            .field("identity", &self.identity)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

fn required(arg: Option<FieldValue>, accessor: &str) -> RegistryResult<FieldValue> {
    arg.ok_or_else(|| RegistryError::MissingArgument {
        accessor: accessor.to_string(),
    })
}

fn invalid(field: &Field) -> RegistryError {
    FieldError::InvalidValue {
        field: field.name().to_string(),
        expected: field.kind(),
    }
    .into()
}

fn apply(
    field: &Field,
    accessor: &str,
    op: Accessor,
    arg: Option<FieldValue>,
) -> RegistryResult<FieldValue> {
    Ok(match op {
        Accessor::Get => field.get()?,
        Accessor::Incr => FieldValue::Int(field.as_counter()?.incr()?),
        Accessor::Decr => FieldValue::Int(field.as_counter()?.decr()?),
        Accessor::Append => {
            let fragment = required(arg, accessor)?;
            let fragment = fragment.as_text().ok_or_else(|| invalid(field))?;
            FieldValue::Text(field.as_string()?.append(fragment)?)
        }
        Accessor::Exists => FieldValue::Bool(field.exists()?),
        Accessor::Set => {
            field.set(required(arg, accessor)?)?;
            FieldValue::Unit
        }
        Accessor::GetSet => getset(field, required(arg, accessor)?)?,
        Accessor::Delete => {
            field.delete()?;
            FieldValue::Unit
        }
        Accessor::Save => {
            return Err(RegistryError::InstanceRequired {
                accessor: accessor.to_string(),
            })
        }
    })
}

/// Swap in `value` and return the previous one. An absent string comes
/// back as `Unit`, an absent object as `Object(None)`.
fn getset(field: &Field, value: FieldValue) -> RegistryResult<FieldValue> {
    match (field, value) {
        (Field::String(f), FieldValue::Text(s)) => {
            Ok(f.getset(&s)?.map_or(FieldValue::Unit, FieldValue::Text))
        }
        (Field::Object(f), FieldValue::Object(Some(v))) => Ok(FieldValue::Object(
            f.getset(&DynamicValue(v))?.map(Value::from),
        )),
        (field, _) => Err(invalid(field)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use kvf_codec::Codec;
    use kvf_fields::FieldOps;
    use kvf_store::{InMemoryBackend, KvBackend};
    use kvf_types::PrimaryKey;
    use serde_json::json;

    use super::*;
    use crate::model::HostError;

    #[derive(Debug, Default)]
    struct FakeObject {
        id: Option<u64>,
        attributes: BTreeMap<String, Value>,
        saves: usize,
    }

    impl FakeObject {
        fn with_id(id: u64) -> Self {
            Self {
                id: Some(id),
                ..Default::default()
            }
        }
    }

    impl Model for FakeObject {
        const APP_LABEL: &'static str = "fakemeta";
        const MODEL_NAME: &'static str = "myobject";

        fn primary_key(&self) -> Option<PrimaryKey> {
            self.id.map(PrimaryKey::from)
        }

        fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), HostError> {
            self.attributes.insert(name.to_string(), value);
            Ok(())
        }

        fn save(&mut self) -> Result<(), HostError> {
            self.saves += 1;
            Ok(())
        }
    }

    struct Plain;

    impl Model for Plain {
        const APP_LABEL: &'static str = "fakemeta";
        const MODEL_NAME: &'static str = "plain";

        fn primary_key(&self) -> Option<PrimaryKey> {
            Some(PrimaryKey::from(1u64))
        }
    }

    struct Broken;

    impl Model for Broken {
        const APP_LABEL: &'static str = "bad:label";
        const MODEL_NAME: &'static str = "broken";

        fn primary_key(&self) -> Option<PrimaryKey> {
            None
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    fn registrar_with(config: RegistryConfig) -> (Registrar<FakeObject>, Arc<InMemoryBackend>) {
        init_tracing();
        let backend = Arc::new(InMemoryBackend::new());
        let client = StoreClient::new(backend.clone());
        (Registrar::with_config(client, config).unwrap(), backend)
    }

    fn registrar() -> (Registrar<FakeObject>, Arc<InMemoryBackend>) {
        registrar_with(RegistryConfig::default())
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    #[test]
    fn identity_from_model() {
        let (reg, _) = registrar();
        assert_eq!(reg.identity().to_string(), "fakemeta:myobject");
        assert_eq!(reg.class_namespace().to_string(), "fakemeta:myobject");
    }

    #[test]
    fn invalid_identity_is_fatal() {
        let client = StoreClient::new(Arc::new(InMemoryBackend::new()));
        let err = Registrar::<Broken>::new(client).unwrap_err();
        assert!(matches!(err, RegistryError::Type(TypeError::InvalidIdentity { .. })));
    }

    #[test]
    fn invalid_field_name_rejected() {
        let (mut reg, _) = registrar();
        assert!(matches!(
            reg.add_counter("").unwrap_err(),
            RegistryError::Field(FieldError::Type(_))
        ));
        assert!(reg.add_string("a:b").is_err());
        assert_eq!(reg.fields().count(), 0);
    }

    #[test]
    fn entry_points_set_kind_scope_and_codec() {
        let (mut reg, _) = registrar();
        reg.add_counter("a").unwrap();
        reg.add_string_to_class("b").unwrap();
        reg.add_object("c").unwrap();
        reg.add_list_to_class("d").unwrap();
        reg.add_dict("e").unwrap();
        reg.add_set_to_class("f").unwrap();
        reg.add_zset("g").unwrap();

        let summary: Vec<(&str, FieldKind, Scope, Codec)> = reg
            .fields()
            .map(|s| (s.name(), s.kind(), s.scope(), s.codec()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("a", FieldKind::Counter, Scope::Instance, Codec::Raw),
                ("b", FieldKind::String, Scope::Class, Codec::Raw),
                ("c", FieldKind::Object, Scope::Instance, Codec::Binary),
                ("d", FieldKind::List, Scope::Class, Codec::Binary),
                ("e", FieldKind::Hash, Scope::Instance, Codec::Binary),
                ("f", FieldKind::Set, Scope::Class, Codec::Binary),
                ("g", FieldKind::SortedSet, Scope::Instance, Codec::Binary),
            ]
        );
    }

    #[test]
    fn default_codec_from_config() {
        let config = RegistryConfig::from_toml_str("default_codec = \"json\"").unwrap();
        let (mut reg, _) = registrar_with(config);
        assert_eq!(reg.add_object_to_class("o").unwrap().codec(), Codec::Json);
        assert_eq!(reg.add_counter_to_class("n").unwrap().codec(), Codec::Raw);
    }

    #[test]
    fn duplicate_overwrites_by_default() {
        let (mut reg, _) = registrar();
        reg.add_counter("x").unwrap();
        reg.add_string_to_class("x").unwrap();
        let spec = reg.spec("x").unwrap();
        assert_eq!(spec.kind(), FieldKind::String);
        assert_eq!(spec.scope(), Scope::Class);
        assert_eq!(reg.fields().count(), 1);
    }

    #[test]
    fn duplicate_rejected_by_strict_policy() {
        let (mut reg, _) = registrar_with(RegistryConfig::strict());
        reg.add_counter("x").unwrap();
        let err = reg.add_string("x").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateFieldName { ref model, ref field }
                if model == "fakemeta:myobject" && field == "x"
        ));
        assert_eq!(reg.spec("x").unwrap().kind(), FieldKind::Counter);
    }

    #[test]
    fn register_custom_spec() {
        let (mut reg, _) = registrar();
        let spec = FieldSpec::new("doc", FieldKind::Object, Scope::Instance)
            .unwrap()
            .with_codec(Codec::Json)
            .unwrap()
            .persist_to("doc_copy");
        reg.register(spec).unwrap();
        assert_eq!(reg.spec("doc").unwrap().persisted_as(), Some("doc_copy"));
    }

    #[test]
    fn accessor_names_per_kind() {
        let (mut reg, _) = registrar();
        reg.add_string("title").unwrap();
        reg.add_list("tags").unwrap();
        assert_eq!(
            reg.accessor_names("title").unwrap(),
            vec![
                "title",
                "title_append",
                "title_exists",
                "title_set",
                "title_getset",
                "title_delete"
            ]
        );
        assert_eq!(
            reg.accessor_names("tags").unwrap(),
            vec!["tags", "tags_exists", "tags_set", "tags_delete"]
        );
        assert!(matches!(
            reg.accessor_names("missing").unwrap_err(),
            RegistryError::UnknownField { .. }
        ));
    }

    // ------------------------------------------------------------------
    // Scenarios
    // ------------------------------------------------------------------

    #[test]
    fn class_counter_lifecycle() {
        let (mut reg, backend) = registrar();
        reg.add_counter_to_class("classincr").unwrap();
        let field = reg.class_field("classincr").unwrap();
        let counter = field.as_counter().unwrap();

        assert_eq!(counter.get().unwrap(), 0);
        assert_eq!(counter.incr().unwrap(), 1);
        assert_eq!(counter.get().unwrap(), 1);
        assert_eq!(backend.get("fakemeta:myobject:classincr").unwrap(), Some(b"1".to_vec()));
        assert_eq!(counter.decr().unwrap(), 0);
        assert_eq!(counter.get().unwrap(), 0);
        counter.delete().unwrap();
        assert!(!counter.exists().unwrap());
    }

    #[test]
    fn class_string_vivifies() {
        let (mut reg, _) = registrar();
        reg.add_string_to_class("mystring").unwrap();

        assert_eq!(
            reg.call_class("mystring", None).unwrap(),
            FieldValue::Text(String::new())
        );
        assert_eq!(
            reg.call_class("mystring_exists", None).unwrap(),
            FieldValue::Bool(true)
        );
        reg.call_class("mystring_delete", None).unwrap();
        assert_eq!(
            reg.call_class("mystring_exists", None).unwrap(),
            FieldValue::Bool(false)
        );
    }

    #[test]
    fn instance_list_lifecycle() {
        let (mut reg, backend) = registrar();
        reg.add_list("tags").unwrap();
        let obj = FakeObject::with_id(7);
        let field = reg.field("tags", &obj).unwrap();
        assert_eq!(field.key(), "fakemeta:myobject:7:tags");

        field.set(FieldValue::List(vec![json!("a"), json!("b")])).unwrap();
        assert_eq!(
            field.get().unwrap(),
            FieldValue::List(vec![json!("a"), json!("b")])
        );
        assert_eq!(backend.llen("fakemeta:myobject:7:tags").unwrap(), 2);

        field.delete().unwrap();
        assert_eq!(field.get().unwrap(), FieldValue::List(vec![]));
    }

    #[test]
    fn instances_do_not_share_keys() {
        let (mut reg, _) = registrar();
        reg.add_counter("hits").unwrap();
        let mut a = FakeObject::with_id(1);
        let mut b = FakeObject::with_id(2);

        reg.call("hits_incr", &mut a, None).unwrap();
        reg.call("hits_incr", &mut a, None).unwrap();
        reg.call("hits_incr", &mut b, None).unwrap();
        assert_eq!(reg.call("hits", &mut a, None).unwrap(), FieldValue::Int(2));
        assert_eq!(reg.call("hits", &mut b, None).unwrap(), FieldValue::Int(1));
    }

    #[test]
    fn typed_handles_through_spec() {
        let (mut reg, _) = registrar();
        reg.add_zset_to_class("leaders").unwrap();
        let spec = reg.spec("leaders").unwrap();
        let zset = spec
            .sorted_set::<String>(reg.class_namespace(), reg.client())
            .unwrap();
        zset.set(vec![("bo".to_string(), 2.0), ("al".to_string(), 1.0)])
            .unwrap();
        assert_eq!(zset.get().unwrap().items().unwrap(), vec!["al", "bo"]);
    }

    #[test]
    fn typed_and_named_access_share_binary_values() {
        let (mut reg, _) = registrar();
        reg.add_list_to_class("scores").unwrap();
        let typed = reg
            .spec("scores")
            .unwrap()
            .list::<u32>(reg.class_namespace(), reg.client())
            .unwrap();

        typed.set(vec![3, 1]).unwrap();
        assert_eq!(
            reg.call_class("scores", None).unwrap(),
            FieldValue::List(vec![json!(3), json!(1)])
        );

        reg.call_class("scores_set", Some(FieldValue::List(vec![json!("x")])))
            .unwrap();
        assert!(matches!(
            typed.get().unwrap().items().unwrap_err(),
            FieldError::Store(kvf_store::StoreError::Codec(_))
        ));
    }

    // ------------------------------------------------------------------
    // Scope checks
    // ------------------------------------------------------------------

    #[test]
    fn instance_field_requires_instance() {
        let (mut reg, backend) = registrar();
        reg.add_counter("hits").unwrap();
        let err = reg.class_field("hits").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Field(FieldError::UnboundAccess {
                scope: Scope::Instance,
                ..
            })
        ));
        assert!(reg.call_class("hits_incr", None).is_err());
        assert!(backend.is_empty());
    }

    #[test]
    fn class_field_rejects_instance() {
        let (mut reg, backend) = registrar();
        reg.add_counter_to_class("total").unwrap();
        let mut obj = FakeObject::default();
        let err = reg.field("total", &obj).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Field(FieldError::UnboundAccess {
                scope: Scope::Class,
                ..
            })
        ));
        assert!(matches!(
            reg.call("total_incr", &mut obj, None).unwrap_err(),
            RegistryError::Field(FieldError::UnboundAccess { .. })
        ));
        assert!(backend.is_empty());
    }

    #[test]
    fn instance_without_primary_key() {
        let (mut reg, _) = registrar();
        reg.add_counter("hits").unwrap();
        let err = reg.field("hits", &FakeObject::default()).unwrap_err();
        assert!(matches!(err, RegistryError::Type(TypeError::InvalidIdentity { .. })));
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    #[test]
    fn unknown_accessors() {
        let (mut reg, _) = registrar();
        reg.add_list_to_class("tags").unwrap();
        for name in ["nothing", "tags_incr", "tags_save", "tags_pop", "tags_"] {
            assert!(
                matches!(
                    reg.call_class(name, None).unwrap_err(),
                    RegistryError::UnknownAccessor { .. }
                ),
                "{name}"
            );
        }
    }

    #[test]
    fn exact_field_name_wins_over_suffix() {
        let (mut reg, _) = registrar();
        reg.add_counter_to_class("page").unwrap();
        reg.add_string_to_class("page_set").unwrap();
        assert_eq!(
            reg.call_class("page_set", None).unwrap(),
            FieldValue::Text(String::new())
        );
    }

    #[test]
    fn missing_argument() {
        let (mut reg, _) = registrar();
        reg.add_string_to_class("title").unwrap();
        for name in ["title_set", "title_append", "title_getset"] {
            assert!(matches!(
                reg.call_class(name, None).unwrap_err(),
                RegistryError::MissingArgument { .. }
            ));
        }
    }

    #[test]
    fn string_accessors() {
        let (mut reg, _) = registrar();
        reg.add_string_to_class("title").unwrap();

        assert_eq!(
            reg.call_class("title_append", Some("Hello".into())).unwrap(),
            FieldValue::Text("Hello".into())
        );
        assert_eq!(
            reg.call_class("title_append", Some(", world".into())).unwrap(),
            FieldValue::Text("Hello, world".into())
        );
        assert_eq!(
            reg.call_class("title_getset", Some("Bye".into())).unwrap(),
            FieldValue::Text("Hello, world".into())
        );
        assert_eq!(
            reg.call_class("title", None).unwrap(),
            FieldValue::Text("Bye".into())
        );
        assert!(matches!(
            reg.call_class("title_append", Some(FieldValue::Int(3))).unwrap_err(),
            RegistryError::Field(FieldError::InvalidValue { .. })
        ));
    }

    #[test]
    fn object_getset_swaps() {
        let (mut reg, _) = registrar();
        reg.add_object_to_class("blob").unwrap();

        let x = json!({"v": 1});
        let y = json!({"v": [2, 3]});
        assert_eq!(
            reg.call_class("blob", None).unwrap(),
            FieldValue::Object(None)
        );
        assert_eq!(
            reg.call_class("blob_getset", Some(FieldValue::Object(Some(x.clone()))))
                .unwrap(),
            FieldValue::Object(None)
        );
        assert_eq!(
            reg.call_class("blob_getset", Some(FieldValue::Object(Some(y.clone()))))
                .unwrap(),
            FieldValue::Object(Some(x))
        );
        assert_eq!(
            reg.call_class("blob", None).unwrap(),
            FieldValue::Object(Some(y))
        );
    }

    #[test]
    fn counter_set_then_incr() {
        let (mut reg, _) = registrar();
        reg.add_counter_to_class("n").unwrap();
        reg.call_class("n_set", Some(FieldValue::Int(40))).unwrap();
        reg.call_class("n_incr", None).unwrap();
        assert_eq!(reg.call_class("n_incr", None).unwrap(), FieldValue::Int(42));
        assert_eq!(reg.call_class("n_decr", None).unwrap(), FieldValue::Int(41));
    }

    #[test]
    fn delete_twice_via_accessor() {
        let (mut reg, _) = registrar();
        reg.add_dict_to_class("meta").unwrap();
        let map = BTreeMap::from([("k".to_string(), json!("v"))]);
        reg.call_class("meta_set", Some(FieldValue::Hash(map.clone())))
            .unwrap();
        assert_eq!(reg.call_class("meta", None).unwrap(), FieldValue::Hash(map));
        reg.call_class("meta_delete", None).unwrap();
        reg.call_class("meta_delete", None).unwrap();
        assert_eq!(
            reg.call_class("meta_exists", None).unwrap(),
            FieldValue::Bool(false)
        );
    }

    // ------------------------------------------------------------------
    // Persistence mirroring
    // ------------------------------------------------------------------

    #[test]
    fn save_mirrors_into_model() {
        let (mut reg, _) = registrar();
        reg.register(
            FieldSpec::new("score", FieldKind::Counter, Scope::Instance)
                .unwrap()
                .persist_to("score_cache"),
        )
        .unwrap();
        assert!(reg
            .accessor_names("score")
            .unwrap()
            .contains(&"score_save".to_string()));

        let mut obj = FakeObject::with_id(3);
        reg.call("score_incr", &mut obj, None).unwrap();
        reg.call("score_incr", &mut obj, None).unwrap();

        assert_eq!(
            reg.call("score_save", &mut obj, None).unwrap(),
            FieldValue::Int(2)
        );
        assert_eq!(obj.attributes.get("score_cache"), Some(&json!(2)));
        assert_eq!(obj.saves, 1);
    }

    #[test]
    fn save_class_field_into_instance() {
        let (mut reg, _) = registrar();
        reg.register(
            FieldSpec::new("motd", FieldKind::String, Scope::Class)
                .unwrap()
                .persist_to("motd"),
        )
        .unwrap();
        reg.call_class("motd_set", Some("hi".into())).unwrap();

        assert!(matches!(
            reg.call_class("motd_save", None).unwrap_err(),
            RegistryError::InstanceRequired { .. }
        ));

        let mut obj = FakeObject::default();
        reg.save("motd", &mut obj).unwrap();
        assert_eq!(obj.attributes.get("motd"), Some(&json!("hi")));
    }

    #[test]
    fn save_requires_persisted_field() {
        let (mut reg, _) = registrar();
        reg.add_counter("plain").unwrap();
        let mut obj = FakeObject::with_id(1);
        assert!(matches!(
            reg.save("plain", &mut obj).unwrap_err(),
            RegistryError::NotPersisted { .. }
        ));
        assert!(matches!(
            reg.call("plain_save", &mut obj, None).unwrap_err(),
            RegistryError::UnknownAccessor { .. }
        ));
        assert_eq!(obj.saves, 0);
    }

    #[test]
    fn host_errors_surface() {
        init_tracing();
        let client = StoreClient::new(Arc::new(InMemoryBackend::new()));
        let mut reg = Registrar::<Plain>::new(client).unwrap();
        reg.register(
            FieldSpec::new("n", FieldKind::Counter, Scope::Instance)
                .unwrap()
                .persist_to("n"),
        )
        .unwrap();
        let err = reg.save("n", &mut Plain).unwrap_err();
        assert!(matches!(err, RegistryError::Host { ref field, .. } if field == "n"));
    }
}
