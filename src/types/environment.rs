use std::collections::HashMap;

use crate::types::types::TypeDef;

struct TypeScope {
    identifiers: HashMap<String, TypeDef>,
    // A function boundary fixes the return type for the scopes nested
    // inside it; plain block scopes inherit it.
    function_boundary: bool,
    return_type: Option<TypeDef>,
    returned: bool,
}

/// The parser's scope stack. Mirrors the runtime scope chain exactly, one
/// scope per runtime environment, so the depth a lookup reports here equals
/// the number of parent hops the runtime needs at the same point in the
/// program.
pub struct TypeEnvironment {
    scopes: Vec<TypeScope>,
}

impl TypeEnvironment {
    /// Creates the root scope, pre-declared with the embedder's globals.
    /// The root behaves as a function with no declared return type, so a
    /// bare `return` is allowed at the top level but a valued one is not.
    pub fn new(globals: HashMap<String, TypeDef>) -> TypeEnvironment {
        TypeEnvironment {
            scopes: vec![TypeScope {
                identifiers: globals,
                function_boundary: true,
                return_type: None,
                returned: false,
            }],
        }
    }

    /// Enters a nested block scope (if/loop body).
    pub fn push_scope(&mut self) {
        self.scopes.push(TypeScope {
            identifiers: HashMap::new(),
            function_boundary: false,
            return_type: None,
            returned: false,
        });
    }

    /// Enters a function body scope with its own return type.
    pub fn push_function_scope(&mut self, return_type: Option<TypeDef>) {
        self.scopes.push(TypeScope {
            identifiers: HashMap::new(),
            function_boundary: true,
            return_type,
            returned: false,
        });
    }

    /// Leaves the current scope, reporting whether it unconditionally
    /// returned.
    pub fn pop_scope(&mut self) -> bool {
        match self.scopes.pop() {
            Some(scope) => scope.returned,
            None => false,
        }
    }

    pub fn declare(&mut self, name: String, def: TypeDef) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.identifiers.insert(name, def);
        }
    }

    /// Looks an identifier up through the stack. The depth is the number
    /// of scopes above the current one the binding lives in.
    pub fn get(&self, name: &str) -> Option<(&TypeDef, usize)> {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if let Some(def) = scope.identifiers.get(name) {
                return Some((def, depth));
            }
        }
        None
    }

    /// The declared return type of the enclosing function, if any.
    pub fn return_type(&self) -> Option<&TypeDef> {
        for scope in self.scopes.iter().rev() {
            if scope.function_boundary {
                return scope.return_type.as_ref();
            }
        }
        None
    }

    /// Marks the current scope as having unconditionally returned. Later
    /// statements in the same block are dead code.
    pub fn mark_returned(&mut self) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.returned = true;
        }
    }

    pub fn has_returned(&self) -> bool {
        self.scopes.last().map(|scope| scope.returned).unwrap_or(false)
    }
}
