//! Request DTOs with visited property tracking.
//!
//! A DTO records which of its properties were explicitly set during the current request.
//! That set drives partial updates:
//!
//! ```text
//! PUT   : Dto::default() ◄─patch── request dto   ─► validate ─► write visited properties
//! PATCH : Dto::load(entity) ◄─patch── request dto ─► validate ─► write visited properties
//! ```
//!
//! [`rest_dto!`](crate::rest_dto) generates the struct, its setters and the [`Properties`] impl;
//! the per-entity parts (`load`, extra validation) are written by hand in [`RestDto`] impls.

use serde_json::Value;
use std::collections::BTreeSet;
use validator::Validate;

use crate::errors::{Error, Result, Violation};

/// Names (as sent by clients) of the properties set on a DTO.
pub type Visited = BTreeSet<&'static str>;

/// The REST action a DTO is being validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Patch,
}

/// Property bookkeeping, implemented by [`rest_dto!`](crate::rest_dto).
pub trait Properties: Default + Clone + Send + Sync + 'static {
    /// Every mappable property name.
    const PROPERTIES: &'static [&'static str];

    fn visited(&self) -> &Visited;

    fn is_visited(&self, property: &str) -> bool {
        self.visited().contains(property)
    }

    /// Copy the properties visited on `other` onto `self`, marking them visited here too.
    fn patch(&mut self, other: &Self);

    /// Deserialize `value` into `property` through its setter.
    /// Returns `Ok(false)` for unknown properties.
    fn set_property(&mut self, property: &str, value: Value) -> std::result::Result<bool, serde_json::Error>;
}

pub trait RestDto: Properties + Validate {
    /// Persisted representation the DTO is loaded from.
    type Entity;

    /// Fill from a persisted entity without marking anything visited.
    fn load(&mut self, entity: &Self::Entity);

    /// Validate for the given action. Defaults to the derived `validator` rules.
    fn validate_for(&self, _action: Action) -> Result<()> {
        self.validate()?;
        Ok(())
    }

    /// Map a JSON request body onto a fresh DTO, property by property.
    ///
    /// Unknown properties are ignored, values of the wrong type are rejected.
    fn from_json(body: Value) -> Result<Self> {
        let Value::Object(map) = body else {
            return Err(Error::BadRequest {
                message: "Request body must be a JSON object".to_string(),
            });
        };

        let mut dto = Self::default();
        for (property, value) in map {
            match dto.set_property(&property, value) {
                Ok(true) => {}
                Ok(false) => tracing::debug!(property = %property, "Ignoring unknown property"),
                Err(e) => {
                    return Err(Error::BadRequest {
                        message: format!("Invalid value for property '{property}': {e}"),
                    });
                }
            }
        }
        Ok(dto)
    }

    /// `self` loaded from `entity`, then patched with `changes`.
    fn merged(entity: &Self::Entity, changes: &Self) -> Self {
        let mut dto = Self::default();
        dto.load(entity);
        dto.patch(changes);
        dto
    }
}

/// The derived `validator` rules of `value` plus `extra`, reported as one validation error.
pub fn validate_with<T: Validate>(value: &T, extra: Vec<Violation>) -> Result<()> {
    let mut violations = match value.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => match Error::from(errors) {
            Error::Validation { violations } => violations,
            other => return Err(other),
        },
    };
    if extra.is_empty() && violations.is_empty() {
        return Ok(());
    }

    violations.extend(extra);
    violations.sort_by(|a, b| a.property_path.cmp(&b.property_path));
    Err(Error::Validation { violations })
}

/// Declare a DTO struct with a setter per property and a hidden visited set.
///
/// ```ignore
/// rest_dto! {
///     #[derive(Debug, Clone, Default, Serialize, Validate, ToSchema)]
///     pub struct RoleDto {
///         #[validate(length(min = 1))]
///         description: String => "description",
///     }
/// }
/// ```
#[macro_export]
macro_rules! rest_dto {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $ty:ty => $property:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
            #[serde(skip)]
            visited: $crate::rest::dto::Visited,
        }

        ::paste::paste! {
            impl $name {
                $(
                    pub fn [<set_ $field>](&mut self, value: $ty) -> &mut Self {
                        self.$field = value;
                        self.visited.insert($property);
                        self
                    }
                )*
            }

            impl $crate::rest::dto::Properties for $name {
                const PROPERTIES: &'static [&'static str] = &[$($property),*];

                fn visited(&self) -> &$crate::rest::dto::Visited {
                    &self.visited
                }

                fn patch(&mut self, other: &Self) {
                    $(
                        if other.visited.contains($property) {
                            self.$field = other.$field.clone();
                            self.visited.insert($property);
                        }
                    )*
                }

                fn set_property(
                    &mut self,
                    property: &str,
                    value: ::serde_json::Value,
                ) -> ::std::result::Result<bool, ::serde_json::Error> {
                    match property {
                        $(
                            $property => {
                                let value: $ty = ::serde_json::from_value(value)?;
                                self.[<set_ $field>](value);
                                Ok(true)
                            }
                        )*
                        _ => Ok(false),
                    }
                }
            }
        }
    };
}
