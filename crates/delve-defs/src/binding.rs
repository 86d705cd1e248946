use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::element::Element;

/// How binding treats a child element that names a property which exists
/// but is not settable from definitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindMode {
    /// Skip that child and keep binding the rest.
    #[default]
    SkipInternal,
    /// Stop binding the whole element at that child. Matches the behavior of
    /// older definition loaders, which some data files were written against.
    StopAtInternal,
}

/// Setter invoked with the child element whose name matched the property.
pub type Setter<T> = fn(&mut T, &Element) -> Result<(), PropertyError>;

/// One entry of a type's property table.
pub struct Property<T> {
    name: &'static str,
    setter: Option<Setter<T>>,
}

impl<T> Property<T> {
    /// A property definitions may set.
    pub fn settable(name: &'static str, setter: Setter<T>) -> Self {
        Self {
            name,
            setter: Some(setter),
        }
    }

    /// A property that exists on the type but is off limits to definitions.
    pub fn internal(name: &'static str) -> Self {
        Self { name, setter: None }
    }

    /// The external name of the property.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if definitions may set this property.
    pub fn is_settable(&self) -> bool {
        self.setter.is_some()
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Property<T> {}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("settable", &self.is_settable())
            .finish()
    }
}

/// A type whose fields can be populated from definition elements.
///
/// The table lists every property a definition might name, in any order.
/// Names absent from the table are ignored by the binder.
pub trait Definable: Sized {
    /// The type's property table.
    fn properties() -> Vec<Property<Self>>;
}

/// A property value that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The text does not parse as the property's type.
    #[error("cannot read {value:?} as {expected}: {reason}")]
    Invalid {
        /// The offending text.
        value: String,
        /// The Rust type that was expected.
        expected: &'static str,
        /// Parser message.
        reason: String,
    },

    /// A required nested element is missing.
    #[error("missing <{0}>")]
    Missing(&'static str),
}

/// Parse the trimmed text of `elem` as `V`.
pub fn parse_property<V>(elem: &Element) -> Result<V, PropertyError>
where
    V: FromStr,
    V::Err: fmt::Display,
{
    elem.parse_value::<V>().map_err(|e| PropertyError::Invalid {
        value: elem.value().to_string(),
        expected: std::any::type_name::<V>(),
        reason: e.to_string(),
    })
}

/// What a call to [`bind_properties`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Properties that were set, in element order.
    pub applied: Vec<String>,
    /// Child names that were ignored (unknown, internal, or unparsable).
    pub skipped: Vec<String>,
    /// Under [`BindMode::StopAtInternal`], the internal property that ended
    /// binding early.
    pub stopped_at: Option<String>,
}

/// Copy matching child values of `element` onto `target`.
///
/// A child is applied when its local name is a settable property of `T` and
/// its value converts; everything else is skipped without error. See
/// [`BindMode`] for internal properties.
pub fn bind_properties<T: Definable>(target: &mut T, element: &Element, mode: BindMode) -> BindReport {
    let table = T::properties();
    let mut report = BindReport::default();

    for child in &element.children {
        let name = child.local_name();
        let Some(property) = table.iter().find(|p| p.name == name) else {
            report.skipped.push(name.to_string());
            continue;
        };

        let Some(setter) = property.setter else {
            if mode == BindMode::StopAtInternal {
                debug!("<{}>: internal property \"{name}\" ends binding", element.local_name());
                report.stopped_at = Some(name.to_string());
                break;
            }
            debug!("<{}>: skipping internal property \"{name}\"", element.local_name());
            report.skipped.push(name.to_string());
            continue;
        };

        match setter(target, child) {
            Ok(()) => report.applied.push(name.to_string()),
            Err(e) => {
                debug!("<{}>: skipping \"{name}\": {e}", element.local_name());
                report.skipped.push(name.to_string());
            }
        }
    }

    report
}
