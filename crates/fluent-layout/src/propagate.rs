//! Writing solved values back onto elements.

use log::warn;

use fluent_constraint::{Variable, VariableRegistry};
use fluent_core::ElementStore;

use crate::options::Rounding;

/// Write the registry value of each variable to its element's edge.
///
/// Only edges are ever written; width and height follow from them. Returns
/// the number of edges written.
pub fn propagate<S, I>(
    registry: &VariableRegistry,
    store: &mut S,
    variables: I,
    rounding: Rounding,
) -> usize
where
    S: ElementStore + ?Sized,
    I: IntoIterator<Item = Variable>,
{
    let mut written = 0;
    for variable in variables {
        let Some(entry) = registry.entry(variable) else {
            continue;
        };
        let value = rounding.apply(entry.value);
        if store.set_edge(entry.key.element, entry.key.edge, value) {
            written += 1;
        } else {
            warn!(element = entry.key.element.0; "Element for {} vanished before write-back", entry.name);
        }
    }
    written
}
