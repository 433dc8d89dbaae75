use std::rc::Rc;

use crate::errors::errors::{Error, ErrorImpl};
use crate::lexer::tokens::{Token, TokenKind};
use crate::nodes::basic::{Block, Import, Literal, Return, VarDeclaration};
use crate::nodes::control::{If, LoopRange, While};
use crate::nodes::functions::FuncDeclaration;
use crate::nodes::node::NodeRef;
use crate::runtime::value::Value;
use crate::types::dispatch::generic_type_node;
use crate::types::types::{ArrayDef, FuncDef, GenericType, MapDef, ModuleDef, TypeDef};

use super::parser::Parser;
use super::structs::parse_struct_declaration;
use super::values::parse_value;

/// How a block relates to the return type rules: a function body fixes its
/// own return type, a plain block inherits the enclosing one.
pub(crate) enum BlockScope {
    Plain,
    Function(Option<TypeDef>),
}

/// Parses the next statement, skipping blank and comment lines. Returns
/// `None` at end of input, or at the closing brace when inside a block.
pub fn parse_next(parser: &mut Parser, in_block: bool) -> Result<Option<NodeRef>, Error> {
    loop {
        let token = parser.next_token()?;
        match token.kind {
            TokenKind::NewLine | TokenKind::SemiColon => continue,
            TokenKind::EOF => return Ok(None),
            TokenKind::RightBrace if in_block => return Ok(None),
            _ => {
                let node = parse_statement(parser, token)?;
                end_statement(parser, in_block)?;
                return Ok(Some(node));
            }
        }
    }
}

fn parse_statement(parser: &mut Parser, token: Token) -> Result<NodeRef, Error> {
    match token.kind {
        TokenKind::Var => parse_var_declaration(parser),
        TokenKind::Fn => parse_function_declaration(parser),
        TokenKind::If => parse_if_statement(parser),
        TokenKind::While => parse_while_statement(parser),
        TokenKind::For => parse_for_statement(parser),
        TokenKind::Struct => parse_struct_declaration(parser),
        TokenKind::Import => parse_import_statement(parser),
        TokenKind::Return => parse_return_statement(parser),
        TokenKind::Identifier => {
            // Expression statement: calls, assignments, property access
            parser.lexer.unread(&token);
            let (node, _) = parse_value(parser, None)?;
            Ok(node)
        }
        _ => Err(parser.error(ErrorImpl::UnexpectedToken {
            token: token.literal,
        })),
    }
}

/// Every statement ends at a newline, semicolon or end of input. Inside a
/// block the closing brace also ends one; it is left for the block loop.
fn end_statement(parser: &mut Parser, in_block: bool) -> Result<(), Error> {
    let token = parser.next_token()?;
    match token.kind {
        TokenKind::EOF | TokenKind::NewLine | TokenKind::SemiColon => Ok(()),
        TokenKind::RightBrace if in_block => {
            parser.lexer.unread(&token);
            Ok(())
        }
        _ => Err(parser.error(ErrorImpl::UnexpectedToken {
            token: token.literal,
        })),
    }
}

/// Parses a braced statement sequence in a fresh scope seeded with the
/// given bindings. Statements after an unconditional return are consumed
/// but dropped. Also reports whether the block unconditionally returned.
pub(crate) fn parse_block(
    parser: &mut Parser,
    scoped_variables: Vec<(String, TypeDef)>,
    scope: BlockScope,
) -> Result<(Block, bool), Error> {
    parser.expect_token(&[TokenKind::LeftBrace])?;
    match scope {
        BlockScope::Plain => parser.type_env.push_scope(),
        BlockScope::Function(return_type) => parser.type_env.push_function_scope(return_type),
    }
    for (name, def) in scoped_variables {
        parser.type_env.declare(name, def);
    }

    let mut nodes = Vec::new();
    loop {
        let dead_code = parser.type_env.has_returned();
        match parse_next(parser, true)? {
            Some(node) => {
                if !dead_code {
                    nodes.push(node);
                }
            }
            None => break,
        }
    }

    let returned = parser.type_env.pop_scope();
    Ok((Block { nodes }, returned))
}

fn parse_var_declaration(parser: &mut Parser) -> Result<NodeRef, Error> {
    let identifier = parser.expect_token(&[TokenKind::Identifier])?.literal;

    let token = parser.expect_token(&[TokenKind::Colon, TokenKind::Equals])?;
    let (value, def) = if token.kind == TokenKind::Colon {
        let declared = parse_type_def(parser)?;
        parser.expect_token(&[TokenKind::Equals])?;
        let (value, value_def) = parse_value(parser, Some(&declared))?;
        if !value_def.equals(&declared) {
            return Err(parser.error(ErrorImpl::TypeMismatch {
                expected: declared.to_string(),
                received: value_def.to_string(),
            }));
        }
        (value, declared)
    } else {
        parse_value(parser, None)?
    };

    parser.type_env.declare(identifier.clone(), def);
    Ok(Rc::new(VarDeclaration { identifier, value }))
}

fn parse_function_declaration(parser: &mut Parser) -> Result<NodeRef, Error> {
    let line = parser.lexer.get_current_line();
    let (name, arg_names, arg_defs, return_type) = parse_function_signature(parser)?;

    // Declared before the body parses so the function can call itself
    parser.type_env.declare(
        name.clone(),
        TypeDef::Func(FuncDef {
            args: arg_defs.clone(),
            variadic: false,
            return_type: return_type.clone().map(Box::new),
        }),
    );

    let scoped = arg_names.iter().cloned().zip(arg_defs).collect();
    let (block, returned) = parse_block(parser, scoped, BlockScope::Function(return_type.clone()))?;
    if return_type.is_some() && !returned {
        return Err(parser.error(ErrorImpl::MissingReturn { function: name }));
    }

    Ok(Rc::new(FuncDeclaration {
        name,
        arg_names,
        body: Rc::new(block),
        line,
    }))
}

/// Parses `name(arg: type, ...)` with an optional `: returnType`.
pub(crate) fn parse_function_signature(
    parser: &mut Parser,
) -> Result<(String, Vec<String>, Vec<TypeDef>, Option<TypeDef>), Error> {
    let name = parser.expect_token(&[TokenKind::Identifier])?.literal;
    let (arg_names, arg_defs, return_type) = parse_signature_tail(parser)?;
    Ok((name, arg_names, arg_defs, return_type))
}

/// The `(arg: type, ...) [: returnType]` part of a signature, after the
/// name. Struct methods reach this directly since they carry no `fn`
/// keyword.
pub(crate) fn parse_signature_tail(
    parser: &mut Parser,
) -> Result<(Vec<String>, Vec<TypeDef>, Option<TypeDef>), Error> {
    parser.expect_token(&[TokenKind::LeftBracket])?;

    let mut arg_names = Vec::new();
    let mut arg_defs = Vec::new();
    loop {
        let token = parser.expect_token(&[TokenKind::Identifier, TokenKind::RightBracket])?;
        if token.kind == TokenKind::RightBracket {
            break;
        }
        parser.expect_token(&[TokenKind::Colon])?;
        arg_defs.push(parse_type_def(parser)?);
        arg_names.push(token.literal);

        let token = parser.expect_token(&[TokenKind::Comma, TokenKind::RightBracket])?;
        if token.kind == TokenKind::RightBracket {
            break;
        }
    }

    let token = parser.next_token()?;
    let return_type = if token.kind == TokenKind::Colon {
        Some(parse_type_def(parser)?)
    } else {
        parser.lexer.unread(&token);
        None
    };

    Ok((arg_names, arg_defs, return_type))
}

fn parse_if_statement(parser: &mut Parser) -> Result<NodeRef, Error> {
    let (node, returned) = parse_if_chain(parser)?;
    // An if/else chain that returns on every branch counts as a return
    // for the block it appears in
    if returned {
        parser.type_env.mark_returned();
    }
    Ok(node)
}

fn parse_if_chain(parser: &mut Parser) -> Result<(NodeRef, bool), Error> {
    let (condition, def) = parse_value(parser, None)?;
    if !def.equals(&TypeDef::Primitive(GenericType::Bool)) {
        return Err(parser.error(ErrorImpl::NonBooleanCondition {
            type_: def.to_string(),
        }));
    }
    let (inner, inner_returned) = parse_block(parser, Vec::new(), BlockScope::Plain)?;

    let token = parser.next_token()?;
    if token.kind != TokenKind::Else {
        parser.lexer.unread(&token);
        let node = Rc::new(If {
            condition,
            inner,
            else_branch: None,
        });
        return Ok((node, false));
    }

    let token = parser.expect_token(&[TokenKind::If, TokenKind::LeftBrace])?;
    let (else_branch, else_returned): (NodeRef, bool) = if token.kind == TokenKind::If {
        parse_if_chain(parser)?
    } else {
        parser.lexer.unread(&token);
        let (block, returned) = parse_block(parser, Vec::new(), BlockScope::Plain)?;
        (Rc::new(block), returned)
    };

    let node = Rc::new(If {
        condition,
        inner,
        else_branch: Some(else_branch),
    });
    Ok((node, inner_returned && else_returned))
}

fn parse_while_statement(parser: &mut Parser) -> Result<NodeRef, Error> {
    let (condition, def) = parse_value(parser, None)?;
    if !def.equals(&TypeDef::Primitive(GenericType::Bool)) {
        return Err(parser.error(ErrorImpl::NonBooleanCondition {
            type_: def.to_string(),
        }));
    }
    let (inner, _) = parse_block(parser, Vec::new(), BlockScope::Plain)?;
    Ok(Rc::new(While { condition, inner }))
}

/// `for i range 0, 10 { }` counts an integer range; `for v, i range arr`
/// iterates an array with an optional index identifier.
fn parse_for_statement(parser: &mut Parser) -> Result<NodeRef, Error> {
    let first_identifier = parser.expect_token(&[TokenKind::Identifier])?.literal;
    let token = parser.expect_token(&[TokenKind::Comma, TokenKind::Range])?;
    let second_identifier = if token.kind == TokenKind::Comma {
        let identifier = parser.expect_token(&[TokenKind::Identifier])?.literal;
        parser.expect_token(&[TokenKind::Range])?;
        Some(identifier)
    } else {
        None
    };

    let (first_value, def) = parse_value(parser, None)?;

    if let TypeDef::Array(array_def) = &def {
        let element = (*array_def.element).clone();
        let mut scoped = vec![(first_identifier.clone(), element.clone())];
        if let Some(index_identifier) = &second_identifier {
            scoped.push((
                index_identifier.clone(),
                TypeDef::Primitive(GenericType::Int64),
            ));
        }
        let (inner, _) = parse_block(parser, scoped, BlockScope::Plain)?;
        let generator = generic_type_node(&element);
        return Ok(generator.loop_array(first_identifier, second_identifier, first_value, inner));
    }

    if !def.is_integer() {
        return Err(parser.error(ErrorImpl::InvalidOperandType {
            operator: String::from("range"),
            type_: def.to_string(),
        }));
    }
    if let Some(identifier) = second_identifier {
        return Err(parser.error(ErrorImpl::UnexpectedTokenDetailed {
            token: identifier,
            message: String::from("an integer range takes a single loop identifier"),
        }));
    }

    // Either `range end` with an implied start of 0, or `range start, end`
    let token = parser.next_token()?;
    let (start, end) = if token.kind == TokenKind::Comma {
        let (end, end_def) = parse_value(parser, None)?;
        if !end_def.is_integer() {
            return Err(parser.error(ErrorImpl::InvalidOperandType {
                operator: String::from("range"),
                type_: end_def.to_string(),
            }));
        }
        (first_value, end)
    } else {
        parser.lexer.unread(&token);
        let zero: NodeRef = Rc::new(Literal {
            value: Value::Int64(0),
        });
        (zero, first_value)
    };

    let scoped = vec![(
        first_identifier.clone(),
        TypeDef::Primitive(GenericType::Int64),
    )];
    let (inner, _) = parse_block(parser, scoped, BlockScope::Plain)?;
    Ok(Rc::new(LoopRange {
        val_identifier: first_identifier,
        start,
        end,
        inner,
    }))
}

fn parse_import_statement(parser: &mut Parser) -> Result<NodeRef, Error> {
    let module = parser.expect_token(&[TokenKind::String])?.literal;
    let properties = match parser.modules.get(&module) {
        Some(properties) => properties.clone(),
        None => {
            return Err(parser.error(ErrorImpl::UnknownModule { module }));
        }
    };

    let mut identifier = module.clone();
    let token = parser.next_token()?;
    if token.kind == TokenKind::As {
        identifier = parser.expect_token(&[TokenKind::Identifier])?.literal;
    } else {
        parser.lexer.unread(&token);
    }

    parser
        .type_env
        .declare(identifier.clone(), TypeDef::Module(ModuleDef { properties }));
    Ok(Rc::new(Import { module, identifier }))
}

fn parse_return_statement(parser: &mut Parser) -> Result<NodeRef, Error> {
    let return_type = parser.type_env.return_type().cloned();

    let token = parser.peek_token()?;
    let value = if token.is_end_of_statement() || token.kind == TokenKind::RightBrace {
        if let Some(expected) = &return_type {
            return Err(parser.error(ErrorImpl::TypeMismatch {
                expected: expected.to_string(),
                received: String::from("nil"),
            }));
        }
        None
    } else {
        let (node, def) = parse_value(parser, return_type.as_ref())?;
        match &return_type {
            Some(expected) => {
                if !def.equals(expected) {
                    return Err(parser.error(ErrorImpl::TypeMismatch {
                        expected: expected.to_string(),
                        received: def.to_string(),
                    }));
                }
            }
            None => return Err(parser.error(ErrorImpl::UnexpectedReturnValue)),
        }
        Some(node)
    };

    parser.type_env.mark_returned();
    Ok(Rc::new(Return { value }))
}

/// Parses a type annotation: primitive keywords, `map[K]V`, `fn(args)`
/// shapes, declared struct names, and `[]`/`[N]` array suffixes.
pub(crate) fn parse_type_def(parser: &mut Parser) -> Result<TypeDef, Error> {
    let token = parser.next_token()?;
    let mut def = match token.kind {
        TokenKind::TypeMap => {
            parser.expect_token(&[TokenKind::LeftSquareBracket])?;
            let key = parse_type_def(parser)?;
            parser.expect_token(&[TokenKind::RightSquareBracket])?;
            let value = parse_type_def(parser)?;
            TypeDef::Map(MapDef {
                key: Box::new(key),
                value: Box::new(value),
            })
        }
        TokenKind::Fn => {
            parser.expect_token(&[TokenKind::LeftBracket])?;
            let mut args = Vec::new();
            loop {
                let token = parser.peek_token()?;
                if token.kind == TokenKind::RightBracket {
                    parser.next_token()?;
                    break;
                }
                args.push(parse_type_def(parser)?);
                let token = parser.expect_token(&[TokenKind::Comma, TokenKind::RightBracket])?;
                if token.kind == TokenKind::RightBracket {
                    break;
                }
            }
            let token = parser.next_token()?;
            let return_type = if token.kind == TokenKind::Colon {
                Some(Box::new(parse_type_def(parser)?))
            } else {
                parser.lexer.unread(&token);
                None
            };
            TypeDef::Func(FuncDef {
                args,
                variadic: false,
                return_type,
            })
        }
        TokenKind::Identifier => match parser.type_env.get(&token.literal) {
            Some((def @ TypeDef::Struct(_), _)) => def.clone(),
            _ => {
                return Err(parser.error(ErrorImpl::UnexpectedTokenDetailed {
                    token: token.literal,
                    message: String::from("is not a known type"),
                }));
            }
        },
        _ => match primitive_type(token.kind) {
            Some(generic) => TypeDef::Primitive(generic),
            None => {
                return Err(parser.error(ErrorImpl::UnexpectedToken {
                    token: token.literal,
                }));
            }
        },
    };

    // Array suffixes can nest: int32[][] is an array of int32 arrays
    loop {
        if parser.peek_token()?.kind != TokenKind::LeftSquareBracket {
            return Ok(def);
        }
        parser.next_token()?;
        let token = parser.expect_token(&[TokenKind::RightSquareBracket, TokenKind::Number])?;
        let size = if token.kind == TokenKind::Number {
            let size = token.literal.parse::<usize>().map_err(|_| {
                parser.error(ErrorImpl::NumberParseError {
                    token: token.literal.clone(),
                })
            })?;
            parser.expect_token(&[TokenKind::RightSquareBracket])?;
            Some(size)
        } else {
            None
        };
        def = TypeDef::Array(ArrayDef {
            element: Box::new(def),
            size,
        });
    }
}

fn primitive_type(kind: TokenKind) -> Option<GenericType> {
    match kind {
        TokenKind::TypeInt8 => Some(GenericType::Int8),
        TokenKind::TypeInt16 => Some(GenericType::Int16),
        TokenKind::TypeInt32 => Some(GenericType::Int32),
        TokenKind::TypeInt64 => Some(GenericType::Int64),
        TokenKind::TypeUint8 => Some(GenericType::Uint8),
        TokenKind::TypeUint16 => Some(GenericType::Uint16),
        TokenKind::TypeUint32 => Some(GenericType::Uint32),
        TokenKind::TypeUint64 => Some(GenericType::Uint64),
        TokenKind::TypeFloat32 => Some(GenericType::Float32),
        TokenKind::TypeFloat64 => Some(GenericType::Float64),
        TokenKind::TypeString => Some(GenericType::String),
        TokenKind::TypeBool => Some(GenericType::Bool),
        _ => None,
    }
}
