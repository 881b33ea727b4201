use std::fmt;

use kvf_fields::FieldKind;

/// A named operation generated for a registered field.
///
/// `Get` is exposed under the field's own name; the others append a
/// suffix, e.g. `views_incr` or `title_getset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Accessor {
    Get,
    Incr,
    Decr,
    Append,
    Exists,
    Set,
    GetSet,
    Delete,
    /// Mirror the current value into the host attribute, then save the host.
    Save,
}

impl Accessor {
    /// Every accessor in generation order.
    pub const ALL: [Accessor; 9] = [
        Accessor::Get,
        Accessor::Incr,
        Accessor::Decr,
        Accessor::Append,
        Accessor::Exists,
        Accessor::Set,
        Accessor::GetSet,
        Accessor::Delete,
        Accessor::Save,
    ];

    /// Name suffix, or `None` for the base accessor.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Accessor::Get => None,
            Accessor::Incr => Some("incr"),
            Accessor::Decr => Some("decr"),
            Accessor::Append => Some("append"),
            Accessor::Exists => Some("exists"),
            Accessor::Set => Some("set"),
            Accessor::GetSet => Some("getset"),
            Accessor::Delete => Some("delete"),
            Accessor::Save => Some("save"),
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|accessor| accessor.suffix() == Some(suffix))
    }

    /// Whether the accessor takes an argument.
    pub fn takes_argument(&self) -> bool {
        matches!(self, Accessor::Append | Accessor::Set | Accessor::GetSet)
    }

    /// Whether the accessor is generated for a field of `kind`.
    pub fn applies_to(&self, kind: FieldKind, persisted: bool) -> bool {
        match self {
            Accessor::Get | Accessor::Exists | Accessor::Set | Accessor::Delete => true,
            Accessor::Incr | Accessor::Decr => kind == FieldKind::Counter,
            Accessor::Append => kind == FieldKind::String,
            Accessor::GetSet => matches!(kind, FieldKind::String | FieldKind::Object),
            Accessor::Save => persisted,
        }
    }

    /// Full accessor name for the field `field`.
    pub fn name_for(&self, field: &str) -> String {
        match self.suffix() {
            Some(suffix) => format!("{field}_{suffix}"),
            None => field.to_string(),
        }
    }

    /// Accessors generated for a field, in generation order.
    pub fn for_kind(kind: FieldKind, persisted: bool) -> Vec<Accessor> {
        Self::ALL
            .into_iter()
            .filter(|accessor| accessor.applies_to(kind, persisted))
            .collect()
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix().unwrap_or("get"))
    }
}
