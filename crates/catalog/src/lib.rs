//! Resolves a configuration's `extends` chain, folds it into a single
//! document, substitutes `${key}` templates, and (for `group` builds)
//! assembles many documents into a nested `Group` hierarchy.

mod extend;
mod hierarchy;
mod template;

pub use extend::{find_instances, load_and_resolve, resolve_extend_stack, ExtendStack};
pub use hierarchy::{build_hierarchy, replace_slashes};
pub use template::substitute;
