use std::rc::Rc;

use crate::errors::errors::{Error, ErrorImpl};
use crate::lexer::tokens::TokenKind;
use crate::nodes::basic::{Assignment, Identifier, Literal, MapValue};
use crate::nodes::functions::{FuncCall, StructProperty};
use crate::nodes::node::NodeRef;
use crate::nodes::operators::{
    And, ComparisonType, EqualityComparison, MathsOperationType, Not, Or,
};
use crate::runtime::value::Value;
use crate::types::conversions::{convert_float64, convert_int64};
use crate::types::dispatch::generic_type_node;
use crate::types::types::{ArrayDef, FuncDef, GenericType, StructDef, TypeDef};

use super::parser::Parser;

const BOOL: TypeDef = TypeDef::Primitive(GenericType::Bool);

/// Parses a full expression: a calculated value followed by any chain of
/// comparison, logical or assignment operators. `implicit` is the type the
/// context expects, used to give untyped number literals a width.
pub fn parse_value(
    parser: &mut Parser,
    implicit: Option<&TypeDef>,
) -> Result<(NodeRef, TypeDef), Error> {
    let (value, def) = parse_calculated_value(parser, implicit)?;
    parse_operator(parser, value, def)
}

/// Chains `&&` and `||` left to right over comparison operands, so
/// `a < b && b == c` reads as `(a < b) && (b == c)`. A single `=` rewrites
/// the left hand side into an assignment instead.
fn parse_operator(
    parser: &mut Parser,
    value: NodeRef,
    def: TypeDef,
) -> Result<(NodeRef, TypeDef), Error> {
    let first = parse_comparison(parser, value, def)?;
    let (mut left, mut left_def) = match first {
        Comparison::Value(left, left_def) => (left, left_def),
        Comparison::Assignment(node, def) => return Ok((node, def)),
    };

    loop {
        let token = parser.peek_token()?;
        let and = match token.kind {
            TokenKind::Ampersand => true,
            TokenKind::Bar => false,
            _ => return Ok((left, left_def)),
        };
        parser.next_token()?;
        let operator = if and {
            parser.expect_token(&[TokenKind::Ampersand])?;
            "&&"
        } else {
            parser.expect_token(&[TokenKind::Bar])?;
            "||"
        };

        if !left_def.equals(&BOOL) {
            return Err(parser.error(ErrorImpl::InvalidOperandType {
                operator: operator.to_string(),
                type_: left_def.to_string(),
            }));
        }
        let (operand, operand_def) = parse_calculated_value(parser, Some(&BOOL))?;
        let (right, right_def) = match parse_comparison(parser, operand, operand_def)? {
            Comparison::Value(right, right_def) => (right, right_def),
            Comparison::Assignment(..) => {
                return Err(parser.error(ErrorImpl::NotAssignable));
            }
        };
        if !right_def.equals(&BOOL) {
            return Err(parser.error(ErrorImpl::InvalidOperandType {
                operator: operator.to_string(),
                type_: right_def.to_string(),
            }));
        }

        left = if and {
            Rc::new(And { left, right })
        } else {
            Rc::new(Or { left, right })
        };
        left_def = BOOL;
    }
}

enum Comparison {
    Value(NodeRef, TypeDef),
    Assignment(NodeRef, TypeDef),
}

/// Chains `== != > >= < <=` left to right, binding tighter than the
/// logical operators. A bare `=` at this level is the assignment operator.
fn parse_comparison(
    parser: &mut Parser,
    value: NodeRef,
    def: TypeDef,
) -> Result<Comparison, Error> {
    let mut left = value;
    let mut left_def = def;

    loop {
        let token = parser.peek_token()?;
        match token.kind {
            TokenKind::ExclamationMark => {
                parser.next_token()?;
                parser.expect_token(&[TokenKind::Equals])?;
                let right = parse_equality_operand(parser, &left_def)?;
                let equality: NodeRef = Rc::new(EqualityComparison { left, right });
                left = Rc::new(Not { value: equality });
                left_def = BOOL;
            }
            TokenKind::Equals => {
                parser.next_token()?;
                if parser.peek_token()?.kind == TokenKind::Equals {
                    parser.next_token()?;
                    let right = parse_equality_operand(parser, &left_def)?;
                    left = Rc::new(EqualityComparison { left, right });
                    left_def = BOOL;
                } else {
                    let (node, def) = parse_assignment(parser, left, left_def)?;
                    return Ok(Comparison::Assignment(node, def));
                }
            }
            TokenKind::GreaterThan => {
                parser.next_token()?;
                let comparison = if parser.peek_token()?.kind == TokenKind::Equals {
                    parser.next_token()?;
                    ComparisonType::GreaterThanOrEquals
                } else {
                    ComparisonType::GreaterThan
                };
                left = parse_inequality(parser, comparison, left, &left_def)?;
                left_def = BOOL;
            }
            TokenKind::LessThan => {
                parser.next_token()?;
                let comparison = if parser.peek_token()?.kind == TokenKind::Equals {
                    parser.next_token()?;
                    ComparisonType::LessThanOrEquals
                } else {
                    ComparisonType::LessThan
                };
                left = parse_inequality(parser, comparison, left, &left_def)?;
                left_def = BOOL;
            }
            _ => return Ok(Comparison::Value(left, left_def)),
        }
    }
}

fn parse_equality_operand(parser: &mut Parser, left_def: &TypeDef) -> Result<NodeRef, Error> {
    let (right, right_def) = parse_calculated_value(parser, Some(left_def))?;
    if !right_def.equals(left_def) {
        return Err(parser.error(ErrorImpl::TypeMismatch {
            expected: left_def.to_string(),
            received: right_def.to_string(),
        }));
    }
    Ok(right)
}

fn parse_inequality(
    parser: &mut Parser,
    comparison: ComparisonType,
    left: NodeRef,
    left_def: &TypeDef,
) -> Result<NodeRef, Error> {
    let operator = match comparison {
        ComparisonType::GreaterThan => ">",
        ComparisonType::GreaterThanOrEquals => ">=",
        ComparisonType::LessThan => "<",
        ComparisonType::LessThanOrEquals => "<=",
    };
    if !left_def.is_number() {
        return Err(parser.error(ErrorImpl::InvalidOperandType {
            operator: operator.to_string(),
            type_: left_def.to_string(),
        }));
    }
    let (right, right_def) = parse_calculated_value(parser, Some(left_def))?;
    if !right_def.equals(left_def) {
        return Err(parser.error(ErrorImpl::TypeMismatch {
            expected: left_def.to_string(),
            received: right_def.to_string(),
        }));
    }
    Ok(generic_type_node(left_def).inequality_comparison(comparison, left, right))
}

/// Rewrites a just-parsed left hand side into an assignment. Identifiers,
/// array elements and struct value properties are assignable.
fn parse_assignment(
    parser: &mut Parser,
    left: NodeRef,
    left_def: TypeDef,
) -> Result<(NodeRef, TypeDef), Error> {
    if let Some(identifier) = left.as_any().downcast_ref::<Identifier>() {
        let name = identifier.name.clone();
        let (def, depth) = match parser.type_env.get(&name) {
            Some((def, depth)) => (def.clone(), depth),
            None => {
                return Err(parser.error(ErrorImpl::IdentifierNotDeclared { identifier: name }));
            }
        };
        let (value, value_def) = parse_value(parser, Some(&def))?;
        if !value_def.equals(&def) {
            return Err(parser.error(ErrorImpl::TypeMismatch {
                expected: def.to_string(),
                received: value_def.to_string(),
            }));
        }
        let node: NodeRef = Rc::new(Assignment {
            identifier: name,
            depth,
            value,
        });
        return Ok((node, def));
    }

    let generator = generic_type_node(&left_def);
    if let Some((array, index)) = generator.array_index_details(left.as_ref()) {
        let (value, value_def) = parse_value(parser, Some(&left_def))?;
        if !value_def.equals(&left_def) {
            return Err(parser.error(ErrorImpl::TypeMismatch {
                expected: left_def.to_string(),
                received: value_def.to_string(),
            }));
        }
        let node = generator.array_assignment(array, index, value);
        return Ok((node, left_def));
    }

    if let Some(property) = left.as_any().downcast_ref::<StructProperty>() {
        if !property.is_method {
            let target = Rc::clone(&property.struct_value);
            let index: NodeRef = Rc::new(Literal {
                value: Value::Int64(property.index as i64),
            });
            let (value, value_def) = parse_value(parser, Some(&left_def))?;
            if !value_def.equals(&left_def) {
                return Err(parser.error(ErrorImpl::TypeMismatch {
                    expected: left_def.to_string(),
                    received: value_def.to_string(),
                }));
            }
            let node = generator.array_assignment(target, index, value);
            return Ok((node, left_def));
        }
    }

    Err(parser.error(ErrorImpl::NotAssignable))
}

/// Parses a value with arithmetic applied: partial values chained with
/// `+ - * /`, where `*` and `/` bind tighter than `+` and `-`.
pub(crate) fn parse_calculated_value(
    parser: &mut Parser,
    implicit: Option<&TypeDef>,
) -> Result<(NodeRef, TypeDef), Error> {
    let (mut left, def) = parse_partial_value(parser, implicit)?;

    loop {
        let token = parser.peek_token()?;
        let operation = match token.kind {
            TokenKind::Plus => MathsOperationType::Addition,
            TokenKind::Dash => MathsOperationType::Subtraction,
            TokenKind::Asterisk => MathsOperationType::Multiplication,
            TokenKind::ForwardSlash => MathsOperationType::Division,
            _ => return Ok((left, def)),
        };
        parser.next_token()?;

        if !def.is_number() {
            return Err(parser.error(ErrorImpl::InvalidOperandType {
                operator: token.literal,
                type_: def.to_string(),
            }));
        }

        let mut right = parse_maths_operand(parser, &def)?;
        if matches!(
            operation,
            MathsOperationType::Addition | MathsOperationType::Subtraction
        ) {
            right = parse_tight_operations(parser, right, &def)?;
        }
        left = generic_type_node(&def).maths_operation(operation, left, right);
    }
}

/// Consumes a run of `*` and `/` so they apply before the pending `+`
/// or `-`.
fn parse_tight_operations(
    parser: &mut Parser,
    value: NodeRef,
    def: &TypeDef,
) -> Result<NodeRef, Error> {
    let mut left = value;
    loop {
        let operation = match parser.peek_token()?.kind {
            TokenKind::Asterisk => MathsOperationType::Multiplication,
            TokenKind::ForwardSlash => MathsOperationType::Division,
            _ => return Ok(left),
        };
        parser.next_token()?;
        let right = parse_maths_operand(parser, def)?;
        left = generic_type_node(def).maths_operation(operation, left, right);
    }
}

fn parse_maths_operand(parser: &mut Parser, def: &TypeDef) -> Result<NodeRef, Error> {
    let (right, right_def) = parse_partial_value(parser, Some(def))?;
    if !right_def.equals(def) {
        return Err(parser.error(ErrorImpl::TypeMismatch {
            expected: def.to_string(),
            received: right_def.to_string(),
        }));
    }
    Ok(right)
}

/// Parses a single operand: a literal, an identifier with any calls,
/// indexes and property accesses applied, a parenthesized expression, an
/// array literal, or a unary `!` or `-`.
fn parse_partial_value(
    parser: &mut Parser,
    implicit: Option<&TypeDef>,
) -> Result<(NodeRef, TypeDef), Error> {
    let token = parser.next_token()?;
    match token.kind {
        TokenKind::String => {
            let node: NodeRef = Rc::new(Literal {
                value: Value::String(token.literal),
            });
            Ok((node, TypeDef::Primitive(GenericType::String)))
        }
        TokenKind::True | TokenKind::False => {
            let node: NodeRef = Rc::new(Literal {
                value: Value::Bool(token.kind == TokenKind::True),
            });
            Ok((node, BOOL))
        }
        TokenKind::Number => parse_number(parser, token.literal, implicit),
        TokenKind::Identifier => {
            let (def, _) = match parser.type_env.get(&token.literal) {
                Some((def, depth)) => (def.clone(), depth),
                None => {
                    return Err(parser.error(ErrorImpl::IdentifierNotDeclared {
                        identifier: token.literal,
                    }));
                }
            };
            let node: NodeRef = Rc::new(Identifier {
                name: token.literal,
            });
            parse_value_expression(parser, node, def)
        }
        TokenKind::LeftBracket => {
            let (value, def) = parse_value(parser, implicit)?;
            parser.expect_token(&[TokenKind::RightBracket])?;
            parse_value_expression(parser, value, def)
        }
        TokenKind::LeftSquareBracket => parse_array_literal(parser, implicit),
        TokenKind::ExclamationMark => {
            let (value, def) = parse_partial_value(parser, Some(&BOOL))?;
            if !def.equals(&BOOL) {
                return Err(parser.error(ErrorImpl::InvalidOperandType {
                    operator: String::from("!"),
                    type_: def.to_string(),
                }));
            }
            let node: NodeRef = Rc::new(Not { value });
            Ok((node, BOOL))
        }
        TokenKind::Dash => {
            let (value, def) = parse_partial_value(parser, implicit)?;
            let zero = match convert_int64(0, def.generic_type()) {
                Some(zero) => zero,
                None => {
                    return Err(parser.error(ErrorImpl::InvalidOperandType {
                        operator: String::from("-"),
                        type_: def.to_string(),
                    }));
                }
            };
            let zero: NodeRef = Rc::new(Literal { value: zero });
            let node =
                generic_type_node(&def).maths_operation(MathsOperationType::Subtraction, zero, value);
            Ok((node, def))
        }
        _ => Err(parser.error(ErrorImpl::UnexpectedToken {
            token: token.literal,
        })),
    }
}

/// Reads an integer or float literal. An untyped literal defaults to
/// `int64` or `float64`; in a typed position it takes the expected width
/// instead.
fn parse_number(
    parser: &mut Parser,
    literal: String,
    implicit: Option<&TypeDef>,
) -> Result<(NodeRef, TypeDef), Error> {
    let mut literal = literal;
    let mut is_float = false;
    if parser.peek_token()?.kind == TokenKind::Period {
        parser.next_token()?;
        let fraction = parser.expect_token(&[TokenKind::Number])?;
        literal = format!("{}.{}", literal, fraction.literal);
        is_float = true;
    }

    let target = implicit.map(|def| def.generic_type());
    let (value, generic) = if is_float {
        let parsed = literal.parse::<f64>().map_err(|_| {
            parser.error(ErrorImpl::NumberParseError {
                token: literal.clone(),
            })
        })?;
        match target.and_then(|target| convert_float64(parsed, target).map(|v| (v, target))) {
            Some(converted) => converted,
            None => (Value::Float64(parsed), GenericType::Float64),
        }
    } else {
        let parsed = literal.parse::<i64>().map_err(|_| {
            parser.error(ErrorImpl::NumberParseError {
                token: literal.clone(),
            })
        })?;
        match target.and_then(|target| convert_int64(parsed, target).map(|v| (v, target))) {
            Some(converted) => converted,
            None => (Value::Int64(parsed), GenericType::Int64),
        }
    };

    let node: NodeRef = Rc::new(Literal { value });
    Ok((node, TypeDef::Primitive(generic)))
}

/// `[a, b, c]` with every element the same type. An empty literal needs
/// the context to supply an element type.
fn parse_array_literal(
    parser: &mut Parser,
    implicit: Option<&TypeDef>,
) -> Result<(NodeRef, TypeDef), Error> {
    let implicit_array = match implicit {
        Some(TypeDef::Array(def)) => Some(def),
        _ => None,
    };
    let mut element_def = implicit_array.map(|def| (*def.element).clone());

    let mut elements = Vec::new();
    loop {
        if parser.peek_token()?.kind == TokenKind::RightSquareBracket {
            parser.next_token()?;
            break;
        }
        let (element, def) = parse_value(parser, element_def.as_ref())?;
        match &element_def {
            Some(expected) => {
                if !def.equals(expected) {
                    return Err(parser.error(ErrorImpl::TypeMismatch {
                        expected: expected.to_string(),
                        received: def.to_string(),
                    }));
                }
            }
            None => element_def = Some(def),
        }
        elements.push(element);

        let token = parser.expect_token(&[TokenKind::Comma, TokenKind::RightSquareBracket])?;
        if token.kind == TokenKind::RightSquareBracket {
            break;
        }
    }

    let element_def = match element_def {
        Some(def) => def,
        None => {
            return Err(parser.error(ErrorImpl::UnexpectedTokenDetailed {
                token: String::from("]"),
                message: String::from("cannot infer the element type of an empty array"),
            }));
        }
    };

    let size = implicit_array.and_then(|def| def.size);
    if let Some(size) = size {
        if elements.len() > size {
            return Err(parser.error(ErrorImpl::TypeMismatch {
                expected: format!("{}[{}]", element_def, size),
                received: format!("{}[{}]", element_def, elements.len()),
            }));
        }
    }

    let length = size.unwrap_or(elements.len());
    let node = generic_type_node(&element_def).array_initialization(elements, size);
    let def = TypeDef::Array(ArrayDef {
        element: Box::new(element_def),
        size: Some(length),
    });
    Ok((node, def))
}

/// Applies call, index and property-access suffixes to a parsed value
/// until none remain.
pub(crate) fn parse_value_expression(
    parser: &mut Parser,
    value: NodeRef,
    def: TypeDef,
) -> Result<(NodeRef, TypeDef), Error> {
    let mut node = value;
    let mut def = def;

    loop {
        let token = parser.peek_token()?;
        match token.kind {
            TokenKind::LeftBracket => {
                parser.next_token()?;
                let (call, return_def) = match def {
                    TypeDef::Func(func_def) => parse_call(parser, node, &func_def)?,
                    TypeDef::Struct(struct_def) => {
                        parse_constructor_call(parser, node, struct_def)?
                    }
                    _ => {
                        return Err(parser.error(ErrorImpl::NotCallable {
                            type_: def.to_string(),
                        }));
                    }
                };
                node = call;
                def = return_def;
            }
            TokenKind::LeftSquareBracket => {
                parser.next_token()?;
                let array_def = match def {
                    TypeDef::Array(array_def) => array_def,
                    _ => {
                        return Err(parser.error(ErrorImpl::NotIndexable {
                            type_: def.to_string(),
                        }));
                    }
                };
                let (index, index_def) = parse_value(parser, None)?;
                if !index_def.is_integer() {
                    return Err(parser.error(ErrorImpl::NonIntegerIndex {
                        type_: index_def.to_string(),
                    }));
                }
                parser.expect_token(&[TokenKind::RightSquareBracket])?;
                let element = *array_def.element;
                node = generic_type_node(&element).array_index(node, index);
                def = element;
            }
            TokenKind::Period => {
                parser.next_token()?;
                let property = parser.expect_token(&[TokenKind::Identifier])?.literal;
                match def {
                    TypeDef::Struct(struct_def) => {
                        let index = match struct_def.properties.get(&property) {
                            Some(index) => *index,
                            None => {
                                return Err(parser.error(ErrorImpl::UnknownProperty {
                                    property,
                                    type_: struct_def.name.clone(),
                                }));
                            }
                        };
                        def = struct_def.property_defs[index].clone();
                        node = Rc::new(StructProperty {
                            struct_value: node,
                            index,
                            is_method: index >= struct_def.value_properties,
                            name: property,
                        });
                    }
                    TypeDef::Map(map_def) => {
                        def = (*map_def.value).clone();
                        node = Rc::new(MapValue {
                            map: node,
                            key: property,
                        });
                    }
                    TypeDef::Module(module_def) => {
                        def = match module_def.properties.get(&property) {
                            Some(def) => def.clone(),
                            None => {
                                return Err(parser.error(ErrorImpl::UnknownProperty {
                                    property,
                                    type_: String::from("module"),
                                }));
                            }
                        };
                        node = Rc::new(MapValue {
                            map: node,
                            key: property,
                        });
                    }
                    _ => {
                        return Err(parser.error(ErrorImpl::UnknownProperty {
                            property,
                            type_: def.to_string(),
                        }));
                    }
                }
            }
            _ => return Ok((node, def)),
        }
    }
}

/// Parses call arguments after the opening bracket, checking each against
/// the function's signature.
fn parse_call(
    parser: &mut Parser,
    function: NodeRef,
    func_def: &FuncDef,
) -> Result<(NodeRef, TypeDef), Error> {
    let args = parse_call_args(parser, |position| {
        TypeDef::arg_type(func_def, position).cloned()
    })?;

    if args.len() < func_def.args.len() {
        return Err(parser.error(ErrorImpl::MissingArguments {
            expected: func_def.args.len(),
            received: args.len(),
        }));
    }
    if args.len() > func_def.args.len() && !func_def.variadic {
        return Err(parser.error(ErrorImpl::TooManyArguments {
            expected: func_def.args.len(),
            received: args.len(),
        }));
    }

    let return_def = match &func_def.return_type {
        Some(return_type) => (**return_type).clone(),
        None => TypeDef::NIL,
    };
    let node: NodeRef = Rc::new(FuncCall { function, args });
    Ok((node, return_def))
}

/// A constructor call takes one argument per value property, in
/// declaration order, and produces an instance of the struct.
fn parse_constructor_call(
    parser: &mut Parser,
    constructor: NodeRef,
    struct_def: StructDef,
) -> Result<(NodeRef, TypeDef), Error> {
    let expected = struct_def.value_properties;
    let args = parse_call_args(parser, |position| {
        if position < expected {
            Some(struct_def.property_defs[position].clone())
        } else {
            None
        }
    })?;

    if args.len() < expected {
        return Err(parser.error(ErrorImpl::MissingArguments {
            expected,
            received: args.len(),
        }));
    }
    if args.len() > expected {
        return Err(parser.error(ErrorImpl::TooManyArguments {
            expected,
            received: args.len(),
        }));
    }

    let node: NodeRef = Rc::new(FuncCall {
        function: constructor,
        args,
    });
    Ok((node, TypeDef::Struct(struct_def)))
}

fn parse_call_args(
    parser: &mut Parser,
    expected_type: impl Fn(usize) -> Option<TypeDef>,
) -> Result<Vec<NodeRef>, Error> {
    let mut args = Vec::new();
    loop {
        if parser.peek_token()?.kind == TokenKind::RightBracket {
            parser.next_token()?;
            return Ok(args);
        }

        let expected = expected_type(args.len());
        let (arg, def) = parse_value(parser, expected.as_ref())?;
        if let Some(expected) = &expected {
            if !def.equals(expected) {
                return Err(parser.error(ErrorImpl::ArgumentTypeMismatch {
                    argument: args.len() + 1,
                    expected: expected.to_string(),
                    received: def.to_string(),
                }));
            }
        }
        args.push(arg);

        let token = parser.expect_token(&[TokenKind::Comma, TokenKind::RightBracket])?;
        if token.kind == TokenKind::RightBracket {
            return Ok(args);
        }
    }
}
