use std::fmt::Display;
use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    line: u32,
    file: Rc<String>,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, line: u32, file: Rc<String>) -> Self {
        Error {
            internal_error: error_impl,
            line,
            file,
        }
    }

    pub fn get_line(&self) -> u32 {
        self.line
    }

    pub fn get_file(&self) -> &str {
        &self.file
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedCharacter { .. } => "UnrecognisedCharacter",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::NewlineInString => "NewlineInString",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::IdentifierNotDeclared { .. } => "IdentifierNotDeclared",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::ArgumentTypeMismatch { .. } => "ArgumentTypeMismatch",
            ErrorImpl::TooManyArguments { .. } => "TooManyArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::NotIndexable { .. } => "NotIndexable",
            ErrorImpl::NonIntegerIndex { .. } => "NonIntegerIndex",
            ErrorImpl::NonBooleanCondition { .. } => "NonBooleanCondition",
            ErrorImpl::InvalidOperandType { .. } => "InvalidOperandType",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::UnexpectedReturnValue => "UnexpectedReturnValue",
            ErrorImpl::UnknownModule { .. } => "UnknownModule",
            ErrorImpl::UnknownProperty { .. } => "UnknownProperty",
            ErrorImpl::NotAssignable => "NotAssignable",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedCharacter { .. } => ErrorTip::None,
            ErrorImpl::UnterminatedString => ErrorTip::Suggestion(String::from(
                "String literal never closed, did you miss a `\"`?",
            )),
            ErrorImpl::NewlineInString => ErrorTip::Suggestion(String::from(
                "Strings cannot span lines, use `\\n` for a line break",
            )),
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a line break or semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::IdentifierNotDeclared { identifier } => ErrorTip::Suggestion(format!(
                "`{}` is not defined in this scope",
                identifier
            )),
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::ArgumentTypeMismatch { argument, expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected type `{}` for argument {}, received `{}`",
                    expected, argument, received
                ))
            }
            ErrorImpl::TooManyArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::MissingArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::NotCallable { type_ } => {
                ErrorTip::Suggestion(format!("A value of type `{}` cannot be called", type_))
            }
            ErrorImpl::NotIndexable { type_ } => {
                ErrorTip::Suggestion(format!("A value of type `{}` cannot be indexed", type_))
            }
            ErrorImpl::NonIntegerIndex { type_ } => ErrorTip::Suggestion(format!(
                "Array index must be an integer, received `{}`",
                type_
            )),
            ErrorImpl::NonBooleanCondition { type_ } => ErrorTip::Suggestion(format!(
                "Condition must be of type `bool`, received `{}`",
                type_
            )),
            ErrorImpl::InvalidOperandType { operator, type_ } => ErrorTip::Suggestion(format!(
                "Operator `{}` cannot be applied to type `{}`",
                operator, type_
            )),
            ErrorImpl::MissingReturn { function } => ErrorTip::Suggestion(format!(
                "Function `{}` declares a return type but can fall through without returning",
                function
            )),
            ErrorImpl::UnexpectedReturnValue => ErrorTip::Suggestion(String::from(
                "Function has no declared return type so `return` must not carry a value",
            )),
            ErrorImpl::UnknownModule { module } => {
                ErrorTip::Suggestion(format!("Module `{}` does not exist", module))
            }
            ErrorImpl::UnknownProperty { property, type_ } => ErrorTip::Suggestion(format!(
                "`{}` has no property named `{}`",
                type_, property
            )),
            ErrorImpl::NotAssignable => ErrorTip::Suggestion(String::from(
                "Left hand side of assignment is not assignable",
            )),
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ErrorImpl {
    #[error("unrecognised character: {character:?}")]
    UnrecognisedCharacter { character: String },
    #[error("reached end of file before string literal finished")]
    UnterminatedString,
    #[error("unexpected newline while reading string literal")]
    NewlineInString,
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("identifier {identifier:?} not declared")]
    IdentifierNotDeclared { identifier: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMismatch { expected: String, received: String },
    #[error("argument {argument:?} type does not match: expected {expected:?}, received {received:?}")]
    ArgumentTypeMismatch {
        argument: usize,
        expected: String,
        received: String,
    },
    #[error("too many arguments: expected {expected:?}, received {received:?}")]
    TooManyArguments { expected: usize, received: usize },
    #[error("missing arguments: expected {expected:?}, received {received:?}")]
    MissingArguments { expected: usize, received: usize },
    #[error("cannot call value of type {type_}")]
    NotCallable { type_: String },
    #[error("cannot index value of type {type_}")]
    NotIndexable { type_: String },
    #[error("array index must be an integer, received {type_}")]
    NonIntegerIndex { type_: String },
    #[error("condition must be a bool, received {type_}")]
    NonBooleanCondition { type_: String },
    #[error("operator {operator:?} cannot be applied to {type_}")]
    InvalidOperandType { operator: String, type_: String },
    #[error("function {function:?} is missing a return statement")]
    MissingReturn { function: String },
    #[error("return value in function without declared return type")]
    UnexpectedReturnValue,
    #[error("module {module:?} does not exist")]
    UnknownModule { module: String },
    #[error("no property {property:?} on {type_}")]
    UnknownProperty { property: String, type_: String },
    #[error("left hand side of assignment is not assignable")]
    NotAssignable,
}
