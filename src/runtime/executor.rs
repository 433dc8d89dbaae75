use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::nodes::node::{Flow, NodeRef};
use crate::profiler::profile_result::ProfileResult;
use crate::runtime::environment::{Call, EnvRef, Environment};
use crate::runtime::gc::run_gc;
use crate::runtime::value::Value;

/// State threaded through evaluation: the file being run (for call
/// records), the builtin module value tables, and the profiler when one is
/// enabled.
pub struct ExecContext {
    pub file: Rc<String>,
    /// Builtin module tables, each a ready-made map value an `import`
    /// binds into scope.
    pub modules: HashMap<String, Value>,
    pub profiler: Option<Profiler>,
}

/// Collects per-call timings into a tree mirroring the call tree. Calls
/// attribute their elapsed time to the frame that made them.
pub struct Profiler {
    root: ProfileResult,
    stack: Vec<ProfileResult>,
}

impl Profiler {
    fn new(name: &str) -> Profiler {
        Profiler {
            root: ProfileResult::new(name),
            stack: Vec::new(),
        }
    }

    pub fn begin_call(&mut self, name: &str) {
        self.stack.push(ProfileResult::new(name));
    }

    pub fn end_call(&mut self, duration: Duration) {
        if let Some(mut frame) = self.stack.pop() {
            frame.duration = duration;
            match self.stack.last_mut() {
                Some(parent) => parent.sub_programs.push(frame),
                None => self.root.sub_programs.push(frame),
            }
        }
    }

    fn finish(mut self, total: Duration) -> ProfileResult {
        self.root.duration = total;
        self.root
    }
}

/// Runs a statement sequence, sweeping the scope after every statement so
/// bindings die at their last use. A `return` short-circuits the remaining
/// statements.
pub fn run_statements(nodes: &[NodeRef], env: &EnvRef, ctx: &mut ExecContext) -> Flow {
    for (i, node) in nodes.iter().enumerate() {
        if let Flow::Returned(value) = node.eval(env, ctx) {
            return Flow::Returned(value);
        }
        run_gc(env, &nodes[i + 1..]);
    }
    Flow::Completed(Value::Nil)
}

/// Runs a parsed program. `globals` and `modules` must be the value halves
/// of the tables the parser type-checked against; the builtin registration
/// records in `stdlib` produce both halves together. Returns the profile
/// tree when profiling is enabled.
pub fn execute(
    ast: &[NodeRef],
    file: Rc<String>,
    profile: bool,
    globals: HashMap<String, Value>,
    modules: HashMap<String, Value>,
) -> Option<ProfileResult> {
    let env = Environment::new_root(Call {
        function_name: String::from("main"),
        file: Rc::clone(&file),
        line: 0,
    });
    for (name, value) in globals {
        env.borrow_mut().declare(name, value);
    }

    let mut ctx = ExecContext {
        file,
        modules,
        profiler: profile.then(|| Profiler::new("main")),
    };

    let start = Instant::now();
    run_statements(ast, &env, &mut ctx);
    let total = start.elapsed();

    ctx.profiler.map(|profiler| profiler.finish(total))
}
