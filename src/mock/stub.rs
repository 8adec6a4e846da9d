//! Doubles built from nothing but method names.

use super::double::Double;
use super::options::Options;
use super::target::{MethodSource, Property, Target};

/// Build a [`Double`] whose methods do nothing and return `null`.
///
/// `source` names the methods: a list of names, or an existing [`Target`]
/// (only its method names are used). Each declared property is defined on
/// the double.
///
/// ```rust
/// use understudy::{args, stub, Options, Property};
/// use serde_json::{json, Value};
///
/// let double = stub(&["load", "save"], [Property::value("id", 9)], &Options::default());
///
/// let out = double.call("load", &args!["key"]).unwrap();
/// assert_eq!(out.value(), Some(&Value::Null));
/// assert_eq!(double.property("id").unwrap(), json!(9));
/// ```
pub fn stub<S, P>(source: &S, properties: P, options: &Options) -> Double
where
    S: MethodSource + ?Sized,
    P: IntoIterator<Item = Property>,
{
    let target = properties
        .into_iter()
        .fold(Target::no_op(source), Target::property);
    Double::build(target, options.namespace("stub"))
}
