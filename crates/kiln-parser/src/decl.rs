//! Top-level declaration parsing
//!
//! Declarations are parsed into their headers. Types, initializers and
//! function bodies are only skimmed for the identifiers they reference.

use super::*;
use crate::refs::{expr_end, matching, split_params, type_end, RefWalker};

impl Parser {
    pub(crate) fn parse_top_level_decl(&mut self) -> ParseResult<Vec<Node<Decl>>> {
        match self.current_token().kind {
            TokenKind::Func => Ok(vec![self.parse_func_decl()?]),
            TokenKind::Var => self.parse_spec_group(|p| p.parse_value_spec(false, false)),
            TokenKind::Const => {
                let mut first = true;
                self.parse_spec_group(|p| {
                    let spec = p.parse_value_spec(true, first);
                    first = false;
                    spec
                })
            }
            TokenKind::Type => self.parse_spec_group(Self::parse_type_spec),
            TokenKind::Import => Err(self.error("imports must appear before other declarations")),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Vec::new())
            }
            _ => Err(self.error("non-declaration statement outside function body")),
        }
    }

    /// `keyword spec` or `keyword ( spec; spec; ... )`
    fn parse_spec_group<F>(&mut self, mut spec: F) -> ParseResult<Vec<Node<Decl>>>
    where
        F: FnMut(&mut Self) -> ParseResult<Node<Decl>>,
    {
        self.advance();
        let mut decls = Vec::new();

        if self.check(&TokenKind::LParen) {
            self.advance();
            while !self.check(&TokenKind::RParen) && !self.is_at_end() {
                decls.push(spec(self)?);
                self.expect_terminator()?;
            }
            self.expect(TokenKind::RParen, "')'")?;
        } else {
            decls.push(spec(self)?);
        }

        self.expect_terminator()?;
        Ok(decls)
    }

    // =========================================================================
    // Specs
    // =========================================================================

    fn parse_value_spec(&mut self, is_const: bool, first: bool) -> ParseResult<Node<Decl>> {
        let start = self.current_token().span;
        let names = self.parse_ident_list()?;

        let has_type = self.starts_type();
        if has_type {
            self.skim_type()?;
        }

        let has_values = self.check(&TokenKind::Eq);
        if has_values {
            self.advance();
            self.skim_exprs()?;
        }

        if !is_const && !has_type && !has_values {
            return Err(self.error("missing variable type or initialization"));
        }
        if is_const && first && !has_values {
            return Err(self.error("missing init expr for const declaration"));
        }

        let kind = if is_const { ObjKind::Const } else { ObjKind::Var };
        for name in &names {
            self.declare(kind, name)?;
        }

        let span = start.merge(&self.previous_token().span);
        let spec = ValueSpec {
            names,
            has_type,
            has_values,
        };
        let decl = if is_const { Decl::Const(spec) } else { Decl::Var(spec) };
        Ok(Node::new(decl, span))
    }

    fn parse_type_spec(&mut self) -> ParseResult<Node<Decl>> {
        let name = self.parse_identifier()?;
        let is_alias = self.check(&TokenKind::Eq);
        if is_alias {
            self.advance();
        }
        self.skim_type()?;
        self.declare(ObjKind::Type, &name)?;

        let span = name.span.merge(&self.previous_token().span);
        Ok(Node::new(Decl::Type(TypeSpec { name, is_alias }), span))
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn parse_func_decl(&mut self) -> ParseResult<Node<Decl>> {
        let start = self.advance().span;
        let mut locals = HashSet::new();

        let recv = if self.check(&TokenKind::LParen) {
            Some(self.parse_receiver(&mut locals)?)
        } else {
            None
        };

        let name = self.parse_identifier()?;
        if !self.check(&TokenKind::LParen) {
            return Err(self.error(format!("expected '(', found {}", self.describe_current())));
        }
        let params = self.parse_params(&mut locals)?;

        let results = if self.check(&TokenKind::LParen) {
            self.parse_params(&mut locals)?
        } else if self.starts_type() {
            let type_span = self.skim_type()?;
            vec![Param { name: None, type_span }]
        } else {
            Vec::new()
        };

        let has_body = self.check(&TokenKind::LBrace);
        if has_body {
            let open = self.current;
            let close = matching(&self.tokens, open)
                .ok_or_else(|| self.error("unexpected EOF, expected '}'"))?;
            let refs = {
                let mut walker = RefWalker::new(&self.tokens, locals);
                walker.walk_body(open, close + 1);
                walker.into_refs()
            };
            self.unresolved.extend(refs);
            self.current = close + 1;
        }
        self.expect_terminator()?;

        // init functions and methods are not addressable by name
        if recv.is_none() && name.value.name != "init" {
            self.declare(ObjKind::Func, &name)?;
        }

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(
            Decl::Func(FuncDecl {
                name,
                recv,
                params,
                results,
                has_body,
            }),
            span,
        ))
    }

    fn parse_receiver(&mut self, locals: &mut HashSet<String>) -> ParseResult<Receiver> {
        let open = self.current;
        let list = split_params(&self.tokens, open)
            .ok_or_else(|| self.error("unexpected EOF in receiver"))?;

        let entry = match list.entries.as_slice() {
            [entry] => *entry,
            [] => return Err(self.error("method has no receiver")),
            _ => return Err(self.error("method has multiple receivers")),
        };

        let (mut i, end) = entry.ty;
        let pointer = i < end && self.tokens[i].kind == TokenKind::Star;
        if pointer {
            i += 1;
        }
        if i + 1 != end || self.tokens[i].kind != TokenKind::Identifier {
            return Err(ParseError::new("invalid receiver type", self.tokens[open].span));
        }
        let base = &self.tokens[i];
        let base_type = Node::new(Ident::new(base.value.clone()), base.span);

        let name = entry.name.map(|n| {
            let token = &self.tokens[n];
            Node::new(Ident::new(token.value.clone()), token.span)
        });
        if let Some(name) = &name {
            locals.insert(name.value.name.clone());
        }

        self.collect_refs(entry.ty.0, entry.ty.1);
        self.current = list.close + 1;

        Ok(Receiver {
            name,
            base_type,
            pointer,
        })
    }

    fn parse_params(&mut self, locals: &mut HashSet<String>) -> ParseResult<Vec<Param>> {
        let open = self.current;
        let list = split_params(&self.tokens, open)
            .ok_or_else(|| self.error("unexpected EOF in parameter list"))?;

        let dangling_name = list.entries.last().map_or(false, |e| e.ty.0 == e.ty.1);
        if list.mixed || dangling_name {
            return Err(ParseError::new(
                "mixed named and unnamed parameters",
                self.tokens[open].span,
            ));
        }

        // `a, b int`: names without a type take the next type that follows
        let mut type_span = Span::default();
        let mut params = Vec::with_capacity(list.entries.len());
        for entry in list.entries.iter().rev() {
            let (a, b) = entry.ty;
            if a < b {
                type_span = self.tokens[a].span.merge(&self.tokens[b - 1].span);
                self.collect_refs(a, b);
            }
            let name = entry.name.map(|n| {
                let token = &self.tokens[n];
                Node::new(Ident::new(token.value.clone()), token.span)
            });
            params.push(Param { name, type_span });
        }
        params.reverse();

        for param in &params {
            if let Some(name) = &param.name {
                locals.insert(name.value.name.clone());
            }
        }

        self.current = list.close + 1;
        Ok(params)
    }

    // =========================================================================
    // Skimming and scope
    // =========================================================================

    /// Skips a type, recording its references; returns its span.
    fn skim_type(&mut self) -> ParseResult<Span> {
        let start = self.current;
        let end = type_end(&self.tokens, start);
        if end == start {
            return Err(self.error(format!("expected type, found {}", self.describe_current())));
        }
        self.collect_refs(start, end);
        self.current = end;
        Ok(self.tokens[start].span.merge(&self.tokens[end - 1].span))
    }

    /// Skips an expression list, recording its references.
    fn skim_exprs(&mut self) -> ParseResult<()> {
        let start = self.current;
        let end = expr_end(&self.tokens, start);
        if end == start {
            return Err(self.error(format!(
                "expected expression, found {}",
                self.describe_current()
            )));
        }
        self.collect_refs(start, end);
        self.current = end;
        Ok(())
    }

    fn collect_refs(&mut self, start: usize, end: usize) {
        let refs = {
            let mut walker = RefWalker::new(&self.tokens, HashSet::new());
            walker.walk(start, end);
            walker.into_refs()
        };
        self.unresolved.extend(refs);
    }

    fn declare(&mut self, kind: ObjKind, name: &Node<Ident>) -> ParseResult<()> {
        if name.value.is_blank() {
            return Ok(());
        }
        let object = Object::new(kind, name.value.name.clone(), Some(name.span));
        if self.scope.insert(object).is_some() {
            return Err(ParseError::new(
                format!("{} redeclared in this block", name.value),
                name.span,
            ));
        }
        Ok(())
    }
}
