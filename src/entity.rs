//! Typed entity facade over a [`Record`].
//!
//! Each entity type is declared once with [`entity!`](crate::entity!), which
//! generates the struct, one [`Attr`] constant per registered attribute and
//! the [`Entity`] implementation carrying the type's [`Schema`]. Typed access
//! through `Attr` constants is checked at compile time; name-based access
//! through [`Entity::record`] is checked against the registry at run time.

use std::fmt;
use std::marker::PhantomData;

use crate::error::KayakoError;
use crate::registry::{Record, Schema, Slot, UNSET};

/// A registered attribute of entity type `E`.
///
/// Values of this type are only produced by [`entity!`](crate::entity!), so
/// every `Attr<E>` names an attribute in `E::SCHEMA`.
pub struct Attr<E> {
    name: &'static str,
    entity: PhantomData<fn() -> E>,
}

impl<E> Attr<E> {
    /// Used by [`entity!`](crate::entity!) to declare attribute constants.
    /// Building a handle for a name missing from `E::SCHEMA` makes
    /// [`Entity::set`] panic.
    #[doc(hidden)]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            entity: PhantomData,
        }
    }

    /// The attribute name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<E> Clone for Attr<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Attr<E> {}

impl<E> fmt::Debug for Attr<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Attr").field(&self.name).finish()
    }
}

/// An entity type backed by a [`Record`].
pub trait Entity: Sized {
    /// Registry metadata shared by every instance.
    const SCHEMA: &'static Schema;

    /// Wraps a record built for `Self::SCHEMA`.
    fn from_record(record: Record) -> Self;

    /// The underlying record.
    fn record(&self) -> &Record;

    /// The underlying record, mutably.
    fn record_mut(&mut self) -> &mut Record;

    /// Creates an instance with every attribute unset.
    fn new() -> Self {
        Self::from_record(Record::new(Self::SCHEMA))
    }

    /// Creates an instance from named values.
    ///
    /// # Errors
    ///
    /// Returns `KayakoError::Configuration` if a name is not registered.
    fn with_values<I, K, V>(values: I) -> Result<Self, KayakoError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Slot>,
    {
        Record::with_values(Self::SCHEMA, values).map(Self::from_record)
    }

    /// Reads an attribute.
    fn attr(&self, attr: Attr<Self>) -> &Slot {
        self.record().get(attr.name()).unwrap_or(&UNSET)
    }

    /// Assigns an attribute and returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// If `attr` was built by hand for a name missing from the schema.
    fn set(&mut self, attr: Attr<Self>, value: impl Into<Slot>) -> &mut Self {
        if let Err(e) = self.record_mut().set(attr.name(), value) {
            panic!("{e}");
        }
        self
    }

    /// Assigns named values with the same semantics as construction.
    fn update<I, K, V>(&mut self, values: I) -> Result<(), KayakoError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Slot>,
    {
        self.record_mut().update(values)
    }

    /// The identifying attribute.
    fn id(&self) -> &Slot {
        self.record()
            .get(Self::SCHEMA.identifier)
            .unwrap_or(&UNSET)
    }
}

/// Formats an entity as `<Type (id): label>`.
pub fn describe<E: Entity>(entity: &E, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let schema = E::SCHEMA;
    let label = entity.record().get(schema.label).unwrap_or(&UNSET);
    write!(f, "<{} ({}): {}>", schema.entity, entity.id(), label)
}

/// Declares an entity type.
///
/// ```ignore
/// entity! {
///     /// A department.
///     pub struct Department {
///         controller: "/Base/Department",
///         tag: "department",
///         list: None,
///         identifier: ID,
///         parent: None,
///         label: TITLE,
///         validate_add: None,
///     }
///     fields {
///         ID => FieldDef::int("id"),
///         TITLE => FieldDef::string("title"),
///     }
///     add: [TITLE], required: [TITLE];
///     save: [TITLE], required: [];
/// }
/// ```
///
/// `parent` and `validate_add` are expressions evaluated in a constant
/// context where `Self` is the declared type.
#[macro_export]
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            controller: $controller:expr,
            tag: $tag:expr,
            list: $list:expr,
            identifier: $id:ident,
            parent: $parent:expr,
            label: $label:ident,
            validate_add: $validate:expr $(,)?
        }
        fields {
            $($konst:ident => $field:expr),+ $(,)?
        }
        add: [$($add:ident),* $(,)?], required: [$($add_required:ident),* $(,)?];
        save: [$($save:ident),* $(,)?], required: [$($save_required:ident),* $(,)?];
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq)]
        $vis struct $name {
            record: $crate::registry::Record,
        }

        #[allow(missing_docs)]
        impl $name {
            $(
                pub const $konst: $crate::entity::Attr<$name> =
                    $crate::entity::Attr::new(($field).name);
            )+
        }

        impl $crate::entity::Entity for $name {
            const SCHEMA: &'static $crate::registry::Schema = &$crate::registry::Schema {
                entity: stringify!($name),
                controller: $controller,
                tag: $tag,
                list_action: $list,
                identifier: Self::$id.name(),
                parent: $parent,
                label: Self::$label.name(),
                fields: &[$($field),+],
                add: &[$(Self::$add.name()),*],
                add_required: &[$(Self::$add_required.name()),*],
                save: &[$(Self::$save.name()),*],
                save_required: &[$(Self::$save_required.name()),*],
                validate_add: $validate,
            };

            fn from_record(record: $crate::registry::Record) -> Self {
                Self { record }
            }

            fn record(&self) -> &$crate::registry::Record {
                &self.record
            }

            fn record_mut(&mut self) -> &mut $crate::registry::Record {
                &mut self.record
            }
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                <Self as $crate::entity::Entity>::new()
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.record).finish()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                $crate::entity::describe(self, f)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FieldDef, Parent};

    crate::entity! {
        struct Gadget {
            controller: "/Test/Gadget",
            tag: "gadget",
            list: Some("ListAll"),
            identifier: ID,
            parent: Some(Parent { field: Self::SHELFID.name(), in_path: true }),
            label: NAME,
            validate_add: None,
        }
        fields {
            ID => FieldDef::int("id"),
            SHELFID => FieldDef::int("shelfid"),
            NAME => FieldDef::string("name"),
            TAGS => FieldDef::list("tags", "tag", crate::registry::Scalar::Str),
        }
        add: [SHELFID, NAME, TAGS], required: [NAME];
        save: [NAME], required: [];
    }

    #[test]
    #[should_panic(expected = "has no attribute named \"bogus\"")]
    fn test_set_rejects_unregistered_handle() {
        let mut gadget = Gadget::new();
        gadget.set(Attr::<Gadget>::new("bogus"), "x");
    }

    #[test]
    fn test_schema_generated_from_declaration() {
        let schema = Gadget::SCHEMA;
        assert_eq!(schema.entity, "Gadget");
        assert_eq!(schema.identifier, "id");
        assert_eq!(schema.label, "name");
        assert_eq!(schema.fields.len(), 4);
        assert_eq!(schema.add, &["shelfid", "name", "tags"]);
        assert_eq!(schema.add_required, &["name"]);
        assert!(schema.save_required.is_empty());
        assert_eq!(schema.parent.map(|p| p.field), Some("shelfid"));
    }

    #[test]
    fn test_typed_access() {
        let mut gadget = Gadget::new();
        assert!(gadget.attr(Gadget::NAME).is_unset());

        gadget.set(Gadget::NAME, "lever").set(Gadget::SHELFID, 3i64);
        assert_eq!(gadget.attr(Gadget::NAME).as_str(), Some("lever"));
        assert_eq!(gadget.attr(Gadget::SHELFID).as_int(), Some(3));
        assert!(gadget.id().is_unset());
    }

    #[test]
    fn test_with_values_rejects_unknown_names() {
        assert!(Gadget::with_values([("name", "x")]).is_ok());
        assert!(matches!(
            Gadget::with_values([("colour", "red")]),
            Err(KayakoError::Configuration(_))
        ));
    }

    #[test]
    fn test_display() {
        let mut gadget = Gadget::with_values([("name", "lever")]).unwrap();
        assert_eq!(gadget.to_string(), "<Gadget (<unset>): lever>");
        gadget.set(Gadget::ID, 9i64);
        assert_eq!(gadget.to_string(), "<Gadget (9): lever>");
    }

    #[test]
    fn test_default_is_empty() {
        let gadget = Gadget::default();
        assert!(gadget.record().set_values().is_empty());
    }
}
