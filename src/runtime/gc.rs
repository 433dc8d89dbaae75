use std::collections::HashSet;

use crate::nodes::node::NodeRef;
use crate::runtime::environment::EnvRef;

/// Sweeps bindings out of the current scope once no remaining statement in
/// the block can read them. Runs after every statement, so a binding's
/// lifetime ends at its last lexical use rather than at the end of the
/// block.
///
/// Marking walks the references of every remaining statement and closes
/// over attached references, so a still-needed function keeps the outer
/// identifiers its body reads alive even when nothing else names them.
pub fn run_gc(env: &EnvRef, remaining: &[NodeRef]) {
    let mut in_use: HashSet<String> = HashSet::new();
    let mut pending: Vec<String> = Vec::new();
    for node in remaining {
        pending.extend(node.references());
    }

    {
        let env = env.borrow();
        while let Some(name) = pending.pop() {
            if !in_use.insert(name.clone()) {
                continue;
            }
            if let Some(attached) = env.attached_references(&name) {
                pending.extend(attached.iter().cloned());
            }
        }
    }

    let swept: Vec<String> = env
        .borrow()
        .identifier_names()
        .into_iter()
        .filter(|name| !in_use.contains(name))
        .collect();
    let mut env = env.borrow_mut();
    for name in swept {
        env.remove(&name);
    }
}
