use std::collections::HashMap;
use std::rc::Rc;

use crate::errors::errors::{Error, ErrorImpl};
use crate::lexer::lexer::LexerPos;
use crate::lexer::tokens::TokenKind;
use crate::nodes::functions::{FuncDeclaration, StructDeclaration};
use crate::nodes::node::NodeRef;
use crate::types::types::{FuncDef, StructDef, TypeDef};

use super::parser::Parser;
use super::stmt::{parse_block, parse_signature_tail, parse_type_def, BlockScope};

struct MethodSig {
    name: String,
    arg_names: Vec<String>,
    arg_defs: Vec<TypeDef>,
    return_type: Option<TypeDef>,
    body: LexerPos,
    line: u32,
}

/// Parses `struct Name { ... }` in two passes. The first collects the
/// value properties and method signatures, skipping over method bodies,
/// so the full struct type exists before any body is checked. The second
/// seeks back to each body and parses it with `self` in scope.
pub(crate) fn parse_struct_declaration(parser: &mut Parser) -> Result<NodeRef, Error> {
    let name = parser.expect_token(&[TokenKind::Identifier])?.literal;
    parser.expect_token(&[TokenKind::LeftBrace])?;

    let mut value_properties: Vec<(String, TypeDef)> = Vec::new();
    let mut methods: Vec<MethodSig> = Vec::new();

    loop {
        let token = parser.next_token()?;
        match token.kind {
            TokenKind::NewLine | TokenKind::SemiColon => continue,
            TokenKind::RightBrace => break,
            // A member is `name: type` or `name(args) [: type] { ... }`
            TokenKind::Identifier => {
                let next = parser.expect_token(&[TokenKind::Colon, TokenKind::LeftBracket])?;
                if next.kind == TokenKind::Colon {
                    let def = parse_type_def(parser)?;
                    end_member(parser)?;
                    value_properties.push((token.literal, def));
                } else {
                    parser.lexer.unread(&next);
                    let line = parser.lexer.get_current_line();
                    let (arg_names, arg_defs, return_type) = parse_signature_tail(parser)?;
                    let body = parser.lexer.save();
                    skip_method_body(parser)?;
                    methods.push(MethodSig {
                        name: token.literal,
                        arg_names,
                        arg_defs,
                        return_type,
                        body,
                        line,
                    });
                }
            }
            _ => {
                return Err(parser.error(ErrorImpl::UnexpectedToken {
                    token: token.literal,
                }));
            }
        }
    }
    let end = parser.lexer.save();

    // Instance layout: value properties first, methods after
    let mut properties = HashMap::new();
    let mut property_defs = Vec::new();
    for (index, (property_name, def)) in value_properties.iter().enumerate() {
        properties.insert(property_name.clone(), index);
        property_defs.push(def.clone());
    }
    for (offset, method) in methods.iter().enumerate() {
        properties.insert(method.name.clone(), value_properties.len() + offset);
        property_defs.push(TypeDef::Func(FuncDef {
            args: method.arg_defs.clone(),
            variadic: false,
            return_type: method.return_type.clone().map(Box::new),
        }));
    }
    let struct_def = TypeDef::Struct(StructDef {
        name: name.clone(),
        properties,
        property_defs,
        value_properties: value_properties.len(),
    });
    // Declared before bodies parse so methods can take and return the
    // struct, and call the constructor
    parser.type_env.declare(name.clone(), struct_def.clone());

    let mut method_nodes: Vec<NodeRef> = Vec::new();
    for method in methods {
        parser.lexer.seek(method.body);

        let mut arg_names = vec![String::from("self")];
        arg_names.extend(method.arg_names);
        let mut scoped = vec![(String::from("self"), struct_def.clone())];
        scoped.extend(arg_names[1..].iter().cloned().zip(method.arg_defs));

        // Method closures evaluate inside an extra environment layer that
        // holds the struct's methods, so lookups from the body cross one
        // more scope than a plain function's would
        parser.type_env.push_scope();
        let (block, returned) =
            parse_block(parser, scoped, BlockScope::Function(method.return_type.clone()))?;
        parser.type_env.pop_scope();
        if method.return_type.is_some() && !returned {
            return Err(parser.error(ErrorImpl::MissingReturn {
                function: method.name,
            }));
        }

        method_nodes.push(Rc::new(FuncDeclaration {
            name: method.name,
            arg_names,
            body: Rc::new(block),
            line: method.line,
        }));
    }

    parser.lexer.seek(end);
    Ok(Rc::new(StructDeclaration {
        name,
        methods: method_nodes,
    }))
}

fn end_member(parser: &mut Parser) -> Result<(), Error> {
    let token = parser.next_token()?;
    match token.kind {
        TokenKind::NewLine | TokenKind::SemiColon => Ok(()),
        TokenKind::RightBrace => {
            parser.lexer.unread(&token);
            Ok(())
        }
        _ => Err(parser.error(ErrorImpl::UnexpectedToken {
            token: token.literal,
        })),
    }
}

/// Skips a balanced-brace method body without interpreting it.
fn skip_method_body(parser: &mut Parser) -> Result<(), Error> {
    parser.expect_token(&[TokenKind::LeftBrace])?;
    let mut depth = 1usize;
    while depth > 0 {
        let token = parser.next_token()?;
        match token.kind {
            TokenKind::LeftBrace => depth += 1,
            TokenKind::RightBrace => depth -= 1,
            TokenKind::EOF => {
                return Err(parser.error(ErrorImpl::UnexpectedToken {
                    token: String::from("end of file"),
                }));
            }
            _ => {}
        }
    }
    Ok(())
}
