use std::{env, fs, process::exit, rc::Rc};

use interpreter::{
    display_error, parser::parser::parse, runtime::executor::execute, stdlib,
};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut profile = false;
    let mut file_path: Option<&str> = None;
    for arg in &args[1..] {
        if arg == "--profile" {
            profile = true;
        } else {
            file_path = Some(arg);
        }
    }
    let file_path = match file_path {
        Some(file_path) => file_path,
        None => {
            eprintln!("Usage: interpreter <script> [--profile]");
            exit(1);
        }
    };

    let source = fs::read_to_string(file_path).expect("Failed to read file!");

    let (global_defs, global_values) = stdlib::globals();
    let (module_defs, module_values) = stdlib::modules();

    let ast = match parse(&source, file_path, global_defs, module_defs) {
        Ok(ast) => ast,
        Err(error) => {
            display_error(error, &source);
            exit(1);
        }
    };

    let result = execute(
        &ast,
        Rc::new(file_path.to_string()),
        profile,
        global_values,
        module_values,
    );

    if let Some(result) = result {
        fs::write("profile.csv", result.to_csv()).expect("Failed to write profile.csv!");
        println!("{}", result.to_sorted_string(0));
        println!("Profile written to profile.csv");
    }
}
