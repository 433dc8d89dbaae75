use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::value::Value;

pub type EnvRef = Rc<RefCell<Environment>>;

/// Records which function call created an environment, for call stack
/// output when a runtime panic occurs.
#[derive(Debug, Clone)]
pub struct Call {
    pub function_name: String,
    pub file: Rc<String>,
    pub line: u32,
}

/// One frame of the runtime scope chain. Each environment exclusively owns
/// its own identifier table and shares its parent with every sibling scope.
/// Function values keep their declaring environment alive through the same
/// shared handle.
pub struct Environment {
    identifiers: HashMap<String, Value>,
    parent: Option<EnvRef>,
    call: Option<Call>,
    // Identifiers a declared function's body reads from outer scopes, keyed
    // by the function's name. The garbage collector must keep these alive
    // for as long as the function itself is reachable.
    attached_refs: HashMap<String, Vec<String>>,
}

impl Environment {
    pub fn new_root(call: Call) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            identifiers: HashMap::new(),
            parent: None,
            call: Some(call),
            attached_refs: HashMap::new(),
        }))
    }

    /// A nested scope (block body, loop iteration) within the same call.
    pub fn new_child(parent: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            identifiers: HashMap::new(),
            parent: Some(parent),
            call: None,
            attached_refs: HashMap::new(),
        }))
    }

    /// A function call frame.
    pub fn new_call(parent: EnvRef, call: Call) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            identifiers: HashMap::new(),
            parent: Some(parent),
            call: Some(call),
            attached_refs: HashMap::new(),
        }))
    }

    pub fn declare(&mut self, name: String, value: Value) {
        self.identifiers.insert(name, value);
    }

    pub fn attach_references(&mut self, name: &str, references: Vec<String>) {
        self.attached_refs.insert(name.to_string(), references);
    }

    pub(crate) fn attached_references(&self, name: &str) -> Option<&Vec<String>> {
        self.attached_refs.get(name)
    }

    pub(crate) fn identifier_names(&self) -> Vec<String> {
        self.identifiers.keys().cloned().collect()
    }

    pub(crate) fn remove(&mut self, name: &str) {
        self.identifiers.remove(name);
        self.attached_refs.remove(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.identifiers.contains_key(name)
    }
}

/// Looks an identifier up through the scope chain. The parser has already
/// proven the identifier is declared, so a miss is an interpreter bug.
pub fn get(env: &EnvRef, name: &str) -> Value {
    let mut current = Rc::clone(env);
    loop {
        let next = {
            let env = current.borrow();
            if let Some(value) = env.identifiers.get(name) {
                return value.clone();
            }
            match &env.parent {
                Some(parent) => Rc::clone(parent),
                None => break,
            }
        };
        current = next;
    }
    runtime_panic(env, &format!("identifier {:?} is not declared", name))
}

/// Writes to an existing binding `depth` parent hops up the chain. The hop
/// count is resolved at parse time.
pub fn set_at_depth(env: &EnvRef, depth: usize, name: &str, value: Value) {
    let mut current = Rc::clone(env);
    for _ in 0..depth {
        let parent = match &current.borrow().parent {
            Some(parent) => Rc::clone(parent),
            None => runtime_panic(env, &format!("no scope at depth for {:?}", name)),
        };
        current = parent;
    }
    current
        .borrow_mut()
        .identifiers
        .insert(name.to_string(), value);
}

/// Formats the chain of call records from the innermost frame outwards.
pub fn call_stack_output(env: &EnvRef) -> String {
    let mut lines = Vec::new();
    let mut current = Some(Rc::clone(env));
    while let Some(env_ref) = current {
        let env = env_ref.borrow();
        if let Some(call) = &env.call {
            lines.push(format!(
                "File, {}, Line, {}, In {}",
                call.file, call.line, call.function_name
            ));
        }
        current = env.parent.as_ref().map(Rc::clone);
    }
    lines.join("\n")
}

/// Aborts execution with a message and the call stack. Runtime failures do
/// not unwind to a caller; the process is expected to die.
pub fn runtime_panic(env: &EnvRef, message: &str) -> ! {
    eprintln!("Runtime error: {}", message);
    eprintln!("{}", call_stack_output(env));
    panic!("runtime error: {}", message);
}
