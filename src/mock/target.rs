//! Descriptions of the collaborator a double stands in for.
//!
//! A [`Target`] lists named methods, each a [`MethodFn`], plus declared
//! [`Property`] values. Anything that can name methods implements
//! [`MethodSource`], which is all [`stub`](super::stub) needs.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::call::{Arg, MethodFn, Output};
use crate::error::Result;

/// Reads a computed property.
pub type Getter = Arc<dyn Fn() -> Value + Send + Sync>;

/// Writes a computed property.
pub type Setter = Arc<dyn Fn(Value) + Send + Sync>;

/// Something that names a set of methods.
///
/// Names come back in first-seen order with duplicates removed.
pub trait MethodSource {
    /// The unique method names.
    fn method_names(&self) -> Vec<String>;
}

fn unique<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for name in names {
        if !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

impl<S: AsRef<str>> MethodSource for [S] {
    fn method_names(&self) -> Vec<String> {
        unique(self.iter().map(AsRef::as_ref))
    }
}

impl<S: AsRef<str>, const N: usize> MethodSource for [S; N] {
    fn method_names(&self) -> Vec<String> {
        self.as_slice().method_names()
    }
}

impl<S: AsRef<str>> MethodSource for Vec<S> {
    fn method_names(&self) -> Vec<String> {
        self.as_slice().method_names()
    }
}

/// How a property stores its value.
#[derive(Clone)]
pub enum Descriptor {
    /// A stored value.
    Value {
        /// Current value.
        value: Value,
        /// Whether `set_property` may replace it.
        writable: bool,
    },
    /// A computed value.
    Accessor {
        /// Produces the value on every read.
        get: Getter,
        /// Receives writes. Without one the property is read-only.
        set: Option<Setter>,
    },
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value { value, writable } => f
                .debug_struct("Value")
                .field("value", value)
                .field("writable", writable)
                .finish(),
            Self::Accessor { set, .. } => f
                .debug_struct("Accessor")
                .field("writable", &set.is_some())
                .finish_non_exhaustive(),
        }
    }
}

/// A named non-method member of a double.
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    descriptor: Descriptor,
}

impl Property {
    /// A read-only stored value.
    pub fn value(name: &str, value: impl Into<Value>) -> Self {
        Self {
            name: name.to_string(),
            descriptor: Descriptor::Value {
                value: value.into(),
                writable: false,
            },
        }
    }

    /// A stored value that `set_property` may replace.
    pub fn writable(name: &str, value: impl Into<Value>) -> Self {
        Self {
            name: name.to_string(),
            descriptor: Descriptor::Value {
                value: value.into(),
                writable: true,
            },
        }
    }

    /// A read-only computed value.
    pub fn getter<G>(name: &str, get: G) -> Self
    where
        G: Fn() -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            descriptor: Descriptor::Accessor {
                get: Arc::new(get),
                set: None,
            },
        }
    }

    /// A computed value with a setter.
    pub fn accessor<G, S>(name: &str, get: G, set: S) -> Self
    where
        G: Fn() -> Value + Send + Sync + 'static,
        S: Fn(Value) + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            descriptor: Descriptor::Accessor {
                get: Arc::new(get),
                set: Some(Arc::new(set)),
            },
        }
    }

    /// Property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How the property is stored.
    #[must_use]
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub(crate) fn into_parts(self) -> (String, Descriptor) {
        (self.name, self.descriptor)
    }
}

/// The collaborator to wrap: its methods and properties.
///
/// # Example
///
/// ```rust
/// use understudy::{MethodSource, Output, Property, Target};
/// use serde_json::json;
///
/// let target = Target::new()
///     .method("greet", |_| Ok(Output::from(json!("hello"))))
///     .method("save", |_| Ok(Output::null()))
///     .property(Property::value("version", 3));
///
/// assert_eq!(target.method_names(), ["greet", "save"]);
/// ```
#[derive(Clone, Default)]
pub struct Target {
    methods: Vec<(String, MethodFn)>,
    properties: Vec<Property>,
}

impl Target {
    /// An empty target.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method. A second method with the same name replaces the first
    /// and keeps its position.
    #[must_use]
    pub fn method<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&[Arg]) -> Result<Output> + Send + Sync + 'static,
    {
        let func: MethodFn = Arc::new(func);
        match self.methods.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = func,
            None => self.methods.push((name.to_string(), func)),
        }
        self
    }

    /// Declare a property. A later declaration with the same name wins.
    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.retain(|p| p.name != property.name);
        self.properties.push(property);
        self
    }

    /// A target with one method per unique name of `source`, each returning
    /// `null` without doing anything.
    pub fn no_op<S: MethodSource + ?Sized>(source: &S) -> Self {
        source
            .method_names()
            .iter()
            .fold(Self::new(), |target, name| {
                target.method(name, |_| Ok(Output::null()))
            })
    }

    pub(crate) fn into_parts(self) -> (Vec<(String, MethodFn)>, Vec<Property>) {
        (self.methods, self.properties)
    }
}

impl MethodSource for Target {
    fn method_names(&self) -> Vec<String> {
        self.methods.iter().map(|(name, _)| name.clone()).collect()
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("methods", &self.method_names())
            .field("properties", &self.properties)
            .finish()
    }
}
