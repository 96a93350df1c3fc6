use std::fmt;

/// Binding of one entity field to one record key.
///
/// `get` renders the field back to its wire string, `set` parses a wire
/// string into the field. Both are plain function pointers, so an accessor
/// is `Copy + Send + Sync` regardless of `T`.
pub struct PropertyAccessor<T> {
    /// Rust field name (used in logs and errors).
    pub field: &'static str,
    /// Record key, e.g. `mac-address` or `.id`.
    pub key: &'static str,
    /// Mandatory keys must be present in every record.
    pub mandatory: bool,
    /// Literal used when an optional key is absent. Without one the field
    /// keeps its `Default` value.
    pub default: Option<&'static str>,
    pub get: fn(&T) -> String,
    pub set: fn(&mut T, &str) -> Result<(), String>,
}

impl<T> Clone for PropertyAccessor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PropertyAccessor<T> {}

impl<T> fmt::Debug for PropertyAccessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("field", &self.field)
            .field("key", &self.key)
            .field("mandatory", &self.mandatory)
            .field("default", &self.default)
            .finish()
    }
}

/// Compares the declaration only; function pointers are not compared.
impl<T> PartialEq for PropertyAccessor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.key == other.key
            && self.mandatory == other.mandatory
            && self.default == other.default
    }
}

impl<T> Eq for PropertyAccessor<T> {}

/// A record type that can be materialized from a `ResponseRecord`.
///
/// Normally implemented with `#[derive(Entity)]`:
///
/// ```ignore
/// #[derive(Entity, Default, Debug, PartialEq)]
/// pub struct Interface {
///     #[field(key = "name", mandatory)]
///     pub name: String,
///
///     #[field(key = "disabled", default = "false")]
///     pub disabled: bool,
/// }
/// ```
pub trait Entity: Default + Send + 'static {
    /// Mapping declaration, in declaration order.
    fn mapping() -> Vec<PropertyAccessor<Self>>;
}

/// Ordered accessor list of one entity type.
///
/// Built once per type by the engine's metadata cache and never mutated after.
pub struct EntityMetadata<T> {
    entity: &'static str,
    accessors: Vec<PropertyAccessor<T>>,
}

impl<T: Entity> EntityMetadata<T> {
    pub fn build() -> Self {
        Self {
            entity: std::any::type_name::<T>(),
            accessors: T::mapping(),
        }
    }
}

impl<T> EntityMetadata<T> {
    /// Full type name of the entity.
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn accessors(&self) -> &[PropertyAccessor<T>] {
        &self.accessors
    }

    /// Accessor bound to a record key.
    pub fn find(&self, key: &str) -> Option<&PropertyAccessor<T>> {
        self.accessors.iter().find(|a| a.key == key)
    }

    pub fn mandatory_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.accessors.iter().filter(|a| a.mandatory).map(|a| a.key)
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

impl<T> fmt::Debug for EntityMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMetadata")
            .field("entity", &self.entity)
            .field("accessors", &self.accessors)
            .finish()
    }
}

impl<T> PartialEq for EntityMetadata<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity && self.accessors == other.accessors
    }
}
