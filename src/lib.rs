#![allow(clippy::module_inception)]

use crate::errors::errors::{Error, ErrorTip};

pub mod errors;
pub mod lexer;
pub mod macros;
pub mod nodes;
pub mod parser;
pub mod profiler;
pub mod runtime;
pub mod stdlib;
pub mod types;

pub fn display_error(error: Error, source: &str) {
    /*
        Error: TypeMismatch (expected `int32`, received `int64`)
        -> script.lang
           |
        20 | var a: int32 = b
           | ^
    */

    let line = error.get_line() as usize;
    let line_text = source
        .lines()
        .nth(line.saturating_sub(1))
        .unwrap_or_default();

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    if let ErrorTip::None = error.get_tip() {
        println!("Error: {}", error.get_error_name());
    } else {
        println!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }
    println!("-> {}", error.get_file());
    println!("{:>padding$}", "|");
    println!("{} | {}", line_string, line_text.trim());
    println!("{:>padding$} ^", "|");
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::errors::errors::{Error, ErrorImpl};

    #[test]
    fn test_display_error_does_not_panic() {
        let source = "var x = 5\nvar y = oops\n";
        let error = Error::new(
            ErrorImpl::IdentifierNotDeclared {
                identifier: String::from("oops"),
            },
            2,
            Rc::new(String::from("test.lang")),
        );
        super::display_error(error, source);
    }
}
