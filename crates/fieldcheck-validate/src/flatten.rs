//! Flattening of nested records and maps into a single-level field map.
//!
//! Records describe their members through [`Record`], usually generated by
//! `#[derive(Record)]`. Every type that can appear in a record implements
//! [`Flatten`], which reports one of a closed set of [`Kind`]s. The
//! [`Roller`] walks that structure and yields `field name → Value`.
//!
//! Naming of a leaf member, first match wins:
//!
//! 1. the annotation for the configured tag identifier (`json` by default),
//!    first segment when split on the separator; `-` drops the member and an
//!    empty segment counts as no annotation;
//! 2. the member name, for members of the top-level record;
//! 3. `Container.member`, where the container is the nested record's type
//!    name, or the map key when the record was reached through a map.
//!
//! A name is written once; later writes to an occupied name are dropped.

use crate::value::{Nullable, Value};
use std::collections::{BTreeMap, HashMap};

/// Shape of a value as seen by the flattening walk.
pub enum Kind<'a> {
    /// A leaf value: scalars, strings, sequences and nullable scalars.
    Scalar(Value),
    Record(&'a dyn Record),
    Map(Vec<(&'a str, &'a dyn Flatten)>),
    Optional {
        value: Option<&'a dyn Flatten>,
        /// Whether the pointee type is a record or a map.
        composite: bool,
    },
}

/// Anything that can take part in flattening.
pub trait Flatten {
    fn kind(&self) -> Kind<'_>;

    /// Whether values of this type are records or maps.
    fn is_composite() -> bool
    where
        Self: Sized,
    {
        false
    }
}

/// A record with introspectable members.
pub trait Record {
    /// Type name used as the container name for unannotated members.
    fn type_name(&self) -> &'static str;

    /// Members in declaration order.
    fn members(&self) -> Vec<Member<'_>>;
}

/// One member of a [`Record`].
#[derive(Clone, Copy)]
pub struct Member<'a> {
    pub name: &'static str,
    /// `(identifier, annotation)` pairs, e.g. `("json", "email|omitempty")`.
    pub tags: &'static [(&'static str, &'static str)],
    pub value: &'a dyn Flatten,
}

impl<'a> Member<'a> {
    pub fn new(
        name: &'static str,
        tags: &'static [(&'static str, &'static str)],
        value: &'a dyn Flatten,
    ) -> Self {
        Self { name, tags, value }
    }

    pub fn tag(&self, identifier: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(id, _)| *id == identifier)
            .map(|(_, annotation)| *annotation)
    }
}

/// Resolved annotation of a member.
enum Annotation<'t> {
    Named(&'t str),
    Suppressed,
    Absent,
}

/// Flattening walk over a record or map.
#[derive(Debug)]
pub struct Roller<'o> {
    tag_identifier: &'o str,
    tag_separator: &'o str,
    root: HashMap<String, Value>,
}

impl<'o> Roller<'o> {
    pub fn new(tag_identifier: &'o str, tag_separator: &'o str) -> Self {
        Self {
            tag_identifier,
            tag_separator,
            root: HashMap::new(),
        }
    }

    /// Flatten `data`. Top-level scalars and sequences carry no field names
    /// and yield an empty map.
    pub fn roll(mut self, data: &dyn Flatten) -> HashMap<String, Value> {
        self.walk_root(data.kind());
        self.root
    }

    fn walk_root(&mut self, kind: Kind<'_>) {
        match kind {
            Kind::Record(record) => self.walk_record(record, None),
            Kind::Map(entries) => self.walk_map(entries),
            Kind::Optional {
                value: Some(inner), ..
            } => self.walk_root(inner.kind()),
            Kind::Scalar(_) | Kind::Optional { value: None, .. } => {}
        }
    }

    fn push(&mut self, name: String, value: Value) {
        if self.root.contains_key(&name) {
            tracing::trace!(field = %name, "name already taken, dropping value");
            return;
        }
        self.root.insert(name, value);
    }

    fn annotation(&self, member: &Member<'_>) -> Annotation<'static> {
        let Some(raw) = member.tag(self.tag_identifier) else {
            return Annotation::Absent;
        };
        let first = raw.split(self.tag_separator).next().unwrap_or_default();
        match first {
            "-" => Annotation::Suppressed,
            "" => Annotation::Absent,
            name => Annotation::Named(name),
        }
    }

    fn walk_record(&mut self, record: &dyn Record, container: Option<&str>) {
        for member in record.members() {
            let name = match self.annotation(&member) {
                Annotation::Suppressed => continue,
                Annotation::Named(name) => name.to_string(),
                Annotation::Absent => match container {
                    Some(container) => format!("{}.{}", container, member.name),
                    None => member.name.to_string(),
                },
            };
            self.walk_member(name, member.value.kind());
        }
    }

    fn walk_member(&mut self, name: String, kind: Kind<'_>) {
        match kind {
            Kind::Scalar(value) => self.push(name, value),
            Kind::Record(nested) => self.walk_record(nested, Some(nested.type_name())),
            Kind::Map(entries) => self.walk_map(entries),
            Kind::Optional {
                value: None,
                composite,
            } => {
                if !composite {
                    self.push(name, Value::Null);
                }
            }
            Kind::Optional {
                value: Some(inner), ..
            } => match inner.kind() {
                Kind::Record(nested) if is_zero_record(nested) => {}
                Kind::Map(entries) if entries.is_empty() => {}
                other => self.walk_member(name, other),
            },
        }
    }

    fn walk_map(&mut self, entries: Vec<(&str, &dyn Flatten)>) {
        for (key, value) in entries {
            self.walk_entry(key, value.kind());
        }
    }

    fn walk_entry(&mut self, key: &str, kind: Kind<'_>) {
        match kind {
            Kind::Scalar(Value::Null) | Kind::Optional { value: None, .. } => {}
            Kind::Scalar(value) => self.push(key.to_string(), value),
            Kind::Record(record) => self.walk_record(record, Some(key)),
            Kind::Map(entries) => self.walk_map(entries),
            Kind::Optional {
                value: Some(inner), ..
            } => self.walk_entry(key, inner.kind()),
        }
    }
}

/// Flatten `data` using the given tag identifier and separator.
pub fn flatten(data: &dyn Flatten, tag_identifier: &str, tag_separator: &str) -> HashMap<String, Value> {
    Roller::new(tag_identifier, tag_separator).roll(data)
}

/// Whether every member of `record` holds its zero value.
pub fn is_zero_record(record: &dyn Record) -> bool {
    record.members().iter().all(|m| is_zero(m.value.kind()))
}

fn is_zero(kind: Kind<'_>) -> bool {
    match kind {
        Kind::Scalar(value) => value.is_empty(),
        Kind::Record(record) => is_zero_record(record),
        Kind::Map(entries) => entries.is_empty(),
        Kind::Optional { value, .. } => value.is_none(),
    }
}

/// Collapse any [`Flatten`] value into a single [`Value`].
///
/// Used for records and maps nested inside sequences, which stay unflattened.
pub fn value_of(data: &dyn Flatten) -> Value {
    match data.kind() {
        Kind::Scalar(value) => value,
        Kind::Record(record) => Value::Map(
            record
                .members()
                .into_iter()
                .map(|m| (m.name.to_string(), value_of(m.value)))
                .collect(),
        ),
        Kind::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), value_of(v)))
                .collect(),
        ),
        Kind::Optional { value, .. } => value.map(value_of).unwrap_or(Value::Null),
    }
}

macro_rules! impl_flatten_scalar {
    ($($ty:ty),*) => {
        $(
            impl Flatten for $ty {
                fn kind(&self) -> Kind<'_> {
                    Kind::Scalar(Value::from(*self))
                }
            }
        )*
    };
}

impl_flatten_scalar!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, char);

impl Flatten for str {
    fn kind(&self) -> Kind<'_> {
        Kind::Scalar(Value::from(self))
    }
}

impl Flatten for String {
    fn kind(&self) -> Kind<'_> {
        Kind::Scalar(Value::String(self.clone()))
    }
}

impl Flatten for Value {
    fn kind(&self) -> Kind<'_> {
        Kind::Scalar(self.clone())
    }
}

impl<T> Flatten for Nullable<T>
where
    T: Clone + Into<Value>,
{
    fn kind(&self) -> Kind<'_> {
        Kind::Scalar(self.to_value())
    }
}

impl<T: Flatten> Flatten for Vec<T> {
    fn kind(&self) -> Kind<'_> {
        self.as_slice().kind()
    }
}

impl<T: Flatten> Flatten for [T] {
    fn kind(&self) -> Kind<'_> {
        Kind::Scalar(Value::Seq(
            self.iter().map(|item| value_of(item)).collect(),
        ))
    }
}

impl<T: Flatten> Flatten for Option<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Optional {
            value: self.as_ref().map(|v| v as &dyn Flatten),
            composite: T::is_composite(),
        }
    }

    fn is_composite() -> bool {
        T::is_composite()
    }
}

impl<T: Flatten> Flatten for Box<T> {
    fn kind(&self) -> Kind<'_> {
        self.as_ref().kind()
    }

    fn is_composite() -> bool {
        T::is_composite()
    }
}

impl<T: Flatten + ?Sized> Flatten for &T {
    fn kind(&self) -> Kind<'_> {
        (**self).kind()
    }
}

impl<V: Flatten, S> Flatten for HashMap<String, V, S> {
    fn kind(&self) -> Kind<'_> {
        Kind::Map(
            self.iter()
                .map(|(k, v)| (k.as_str(), v as &dyn Flatten))
                .collect(),
        )
    }

    fn is_composite() -> bool {
        true
    }
}

impl<V: Flatten> Flatten for BTreeMap<String, V> {
    fn kind(&self) -> Kind<'_> {
        Kind::Map(
            self.iter()
                .map(|(k, v)| (k.as_str(), v as &dyn Flatten))
                .collect(),
        )
    }

    fn is_composite() -> bool {
        true
    }
}

impl Flatten for serde_json::Map<String, serde_json::Value> {
    fn kind(&self) -> Kind<'_> {
        Kind::Map(
            self.iter()
                .map(|(k, v)| (k.as_str(), v as &dyn Flatten))
                .collect(),
        )
    }

    fn is_composite() -> bool {
        true
    }
}

impl Flatten for serde_json::Value {
    fn kind(&self) -> Kind<'_> {
        match self {
            serde_json::Value::Object(entries) => entries.kind(),
            other => Kind::Scalar(Value::from(other.clone())),
        }
    }
}
