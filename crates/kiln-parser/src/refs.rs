//! Identifier reference collection over token ranges
//!
//! Bodies, types and initializers are not parsed into trees. Instead the
//! walker scans their tokens, tracks locally declared names with a stack of
//! frames, and records every other identifier use as an `IdentRef`.

use std::collections::HashSet;

use kiln_ast::{Ident, IdentRef, Node};
use kiln_lexer::{Token, TokenKind};

/// Index of the token closing the bracket opened at `open`.
pub(crate) fn matching(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            TokenKind::Eof => return None,
            _ => {}
        }
    }
    None
}

/// End (exclusive) of the type starting at `start`.
pub(crate) fn type_end(tokens: &[Token], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < tokens.len() {
        match tokens[i].kind {
            TokenKind::LParen | TokenKind::LBracket => depth += 1,
            TokenKind::RParen | TokenKind::RBracket => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            TokenKind::Struct | TokenKind::Interface
                if tokens.get(i + 1).map(|t| t.kind) == Some(TokenKind::LBrace) =>
            {
                match matching(tokens, i + 1) {
                    Some(close) => {
                        i = close + 1;
                        continue;
                    }
                    None => return tokens.len() - 1,
                }
            }
            TokenKind::LBrace
            | TokenKind::RBrace
            | TokenKind::Eof
            | TokenKind::StringLiteral => break,
            TokenKind::Semicolon | TokenKind::Comma | TokenKind::Eq | TokenKind::ColonEq if depth == 0 => {
                break
            }
            _ => {}
        }
        i += 1;
    }
    i
}

/// End (exclusive) of an expression list at declaration level: stops at a
/// statement terminator or at the `)` closing a declaration group.
pub(crate) fn expr_end(tokens: &[Token], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < tokens.len() {
        match tokens[i].kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            TokenKind::Semicolon if depth == 0 => break,
            TokenKind::Eof => break,
            _ => {}
        }
        i += 1;
    }
    i
}

/// One comma-separated entry of a parameter list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParamEntry {
    /// Token index of the parameter name
    pub name: Option<usize>,
    /// Token range of the type; empty for a name grouped with a later type
    pub ty: (usize, usize),
}

/// Parameter list found between `open` and its closing parenthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParamList {
    pub entries: Vec<ParamEntry>,
    pub close: usize,
    /// Named and unnamed entries were mixed
    pub mixed: bool,
}

/// Split the parenthesized list at `open` into entries.
///
/// An entry of two or more tokens starting with a bare identifier is a
/// named parameter; when any entry is named, lone identifiers are names
/// whose type comes later (`a, b int`). Otherwise every entry is a type.
pub(crate) fn split_params(tokens: &[Token], open: usize) -> Option<ParamList> {
    let close = matching(tokens, open)?;
    let mut ranges = Vec::new();
    let mut depth = 0usize;
    let mut entry_start = open + 1;
    for i in open + 1..close {
        match tokens[i].kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => {
                ranges.push((entry_start, i));
                entry_start = i + 1;
            }
            _ => {}
        }
    }
    if entry_start < close {
        ranges.push((entry_start, close));
    }

    let is_named = |&(a, b): &(usize, usize)| {
        b - a >= 2
            && tokens[a].kind == TokenKind::Identifier
            && tokens[a + 1].kind != TokenKind::Dot
    };
    let any_named = ranges.iter().any(|range| is_named(range));

    let mut mixed = false;
    let entries = ranges
        .iter()
        .map(|&(a, b)| {
            if !any_named {
                ParamEntry { name: None, ty: (a, b) }
            } else if is_named(&(a, b)) {
                ParamEntry { name: Some(a), ty: (a + 1, b) }
            } else if b - a == 1 && tokens[a].kind == TokenKind::Identifier {
                ParamEntry { name: Some(a), ty: (b, b) }
            } else {
                mixed = true;
                ParamEntry { name: None, ty: (a, b) }
            }
        })
        .collect();

    Some(ParamList { entries, close, mixed })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    /// Names declared by a control-clause header or a function signature
    Header,
    Block,
    Fields,
    Methods,
    Literal,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    names: HashSet<String>,
    closes_header: bool,
}

/// A frame waiting for the `{` that opens its block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    /// Control-clause header: the first suitable `{` at this paren depth
    Header(usize),
    /// Function signature: the body opens at exactly this token
    Body(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Start {
    No,
    Stmt,
    /// Right after `case`: a comm clause may declare, but `x:` is no label
    Case,
}

/// Walks token ranges and records identifier uses that no local binds.
pub(crate) struct RefWalker<'t> {
    tokens: &'t [Token],
    frames: Vec<Frame>,
    floor: usize,
    pending: Vec<Pending>,
    paren_depth: usize,
    case_open: bool,
    refs: Vec<IdentRef>,
}

impl<'t> RefWalker<'t> {
    /// New walker whose outermost frame binds `locals`.
    pub(crate) fn new(tokens: &'t [Token], locals: HashSet<String>) -> Self {
        Self {
            tokens,
            frames: vec![Frame {
                kind: FrameKind::Header,
                names: locals,
                closes_header: false,
            }],
            floor: 1,
            pending: Vec::new(),
            paren_depth: 0,
            case_open: false,
            refs: Vec::new(),
        }
    }

    pub(crate) fn into_refs(self) -> Vec<IdentRef> {
        self.refs
    }

    /// Walk a function body whose `{` is at `open`.
    pub(crate) fn walk_body(&mut self, open: usize, end: usize) {
        self.pending.push(Pending::Body(open));
        self.walk(open, end);
    }

    /// Walk `tokens[start..end]`.
    pub(crate) fn walk(&mut self, start: usize, end: usize) {
        let end = end.min(self.tokens.len());
        let mut start_state = Start::No;
        let mut i = start;

        while i < end {
            let kind = self.tokens[i].kind;
            match kind {
                TokenKind::LParen | TokenKind::LBracket => {
                    self.paren_depth += 1;
                    start_state = Start::No;
                    i += 1;
                }
                TokenKind::RParen | TokenKind::RBracket => {
                    self.paren_depth = self.paren_depth.saturating_sub(1);
                    start_state = Start::No;
                    i += 1;
                }
                TokenKind::LBrace => {
                    let frame_kind = self.open_brace(i);
                    start_state = match frame_kind {
                        FrameKind::Literal => Start::No,
                        _ => Start::Stmt,
                    };
                    i += 1;
                }
                TokenKind::RBrace => {
                    self.close_brace();
                    start_state = Start::No;
                    i += 1;
                }
                TokenKind::Semicolon => {
                    start_state = match self.top_kind() {
                        FrameKind::Literal => Start::No,
                        _ => Start::Stmt,
                    };
                    i += 1;
                }
                TokenKind::If | TokenKind::For | TokenKind::Switch | TokenKind::Select => {
                    self.push_header(HashSet::new(), Pending::Header(self.paren_depth));
                    start_state = Start::Stmt;
                    i += 1;
                }
                TokenKind::Case => {
                    self.case_open = true;
                    start_state = Start::Case;
                    i += 1;
                }
                TokenKind::Default => {
                    self.case_open = true;
                    start_state = Start::No;
                    i += 1;
                }
                TokenKind::Colon => {
                    start_state = if std::mem::take(&mut self.case_open) {
                        Start::Stmt
                    } else {
                        Start::No
                    };
                    i += 1;
                }
                TokenKind::Goto | TokenKind::Break | TokenKind::Continue => {
                    i += 1;
                    if i < end && self.tokens[i].kind == TokenKind::Identifier {
                        i += 1;
                    }
                    start_state = Start::No;
                }
                TokenKind::Func => {
                    i = self.func_signature(i + 1, end, true);
                    start_state = Start::No;
                }
                TokenKind::Var | TokenKind::Const | TokenKind::Type if start_state == Start::Stmt => {
                    i = self.local_decl(i, end);
                    start_state = Start::No;
                }
                TokenKind::Identifier => {
                    i = self.identifier(i, end, start_state);
                    start_state = Start::No;
                }
                _ => {
                    start_state = Start::No;
                    i += 1;
                }
            }
        }
    }

    fn identifier(&mut self, i: usize, end: usize, start_state: Start) -> usize {
        let next = self.kind_at(i + 1, end);

        if start_state != Start::No {
            if let Some((names, after)) = self.short_var_decl(i, end) {
                for name in names {
                    self.declare(name);
                }
                return after;
            }
        }

        if start_state == Start::Stmt {
            match self.top_kind() {
                FrameKind::Block if next == Some(TokenKind::Colon) => return i + 2,
                FrameKind::Fields => {
                    if let Some(after) = self.field_names(i, end) {
                        return after;
                    }
                }
                FrameKind::Methods if next == Some(TokenKind::LParen) => {
                    return self.func_signature(i + 1, end, false);
                }
                _ => {}
            }
        }

        self.reference(i);
        i + 1
    }

    fn reference(&mut self, i: usize) {
        if i > 0 && self.tokens[i - 1].kind == TokenKind::Dot {
            return;
        }
        let token = &self.tokens[i];
        if token.value == "_" || self.is_local(&token.value) {
            return;
        }
        self.refs.push(IdentRef::new(Node::new(Ident::new(token.value.clone()), token.span)));
    }

    fn is_local(&self, name: &str) -> bool {
        self.frames.iter().rev().any(|frame| frame.names.contains(name))
    }

    fn declare(&mut self, name: String) {
        if name == "_" {
            return;
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.names.insert(name);
        }
    }

    fn top_kind(&self) -> FrameKind {
        self.frames.last().map_or(FrameKind::Block, |f| f.kind)
    }

    fn kind_at(&self, i: usize, end: usize) -> Option<TokenKind> {
        (i < end).then(|| self.tokens[i].kind)
    }

    fn push_header(&mut self, names: HashSet<String>, pending: Pending) {
        self.frames.push(Frame {
            kind: FrameKind::Header,
            names,
            closes_header: false,
        });
        self.pending.push(pending);
    }

    fn open_brace(&mut self, i: usize) -> FrameKind {
        let prev = i.checked_sub(1).map(|p| self.tokens[p].kind);
        let header_block = match self.pending.last() {
            Some(&Pending::Body(brace)) => brace == i,
            Some(&Pending::Header(depth)) => depth == self.paren_depth && !self.literal_type_before(i),
            None => false,
        };

        let (kind, closes_header) = if prev == Some(TokenKind::Struct) {
            (FrameKind::Fields, false)
        } else if prev == Some(TokenKind::Interface) {
            (FrameKind::Methods, false)
        } else if header_block {
            self.pending.pop();
            (FrameKind::Block, true)
        } else {
            match prev {
                None
                | Some(TokenKind::Semicolon)
                | Some(TokenKind::LBrace)
                | Some(TokenKind::RBrace)
                | Some(TokenKind::Colon)
                | Some(TokenKind::Else) => (FrameKind::Block, false),
                _ => (FrameKind::Literal, false),
            }
        };

        self.frames.push(Frame {
            kind,
            names: HashSet::new(),
            closes_header,
        });
        kind
    }

    fn close_brace(&mut self) {
        if self.frames.len() <= self.floor {
            return;
        }
        if let Some(frame) = self.frames.pop() {
            if frame.closes_header
                && self.frames.len() > self.floor
                && self.top_kind() == FrameKind::Header
            {
                self.frames.pop();
            }
        }
    }

    /// `[]T{`, `[N]T{` and `map[K]V{` open composite literals even inside
    /// headers; `xs[i] {` ends an index expression and opens the block.
    fn literal_type_before(&self, i: usize) -> bool {
        if i < 3
            || self.tokens[i - 1].kind != TokenKind::Identifier
            || self.tokens[i - 2].kind != TokenKind::RBracket
        {
            return false;
        }
        match self.open_bracket(i - 2) {
            Some(open) => self.is_type_bracket(open, i - 2),
            None => false,
        }
    }

    /// Index of the `[` closed at `close`.
    fn open_bracket(&self, close: usize) -> Option<usize> {
        let mut depth = 0usize;
        for j in (0..=close).rev() {
            match self.tokens[j].kind {
                TokenKind::RBracket => depth += 1,
                TokenKind::LBracket => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(j);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// `[]`, `[...]`, `map[` and a `[` that follows no operand start a type;
    /// anything else indexes or slices an operand.
    fn is_type_bracket(&self, open: usize, close: usize) -> bool {
        if close == open + 1 || self.tokens[open + 1].kind == TokenKind::Ellipsis {
            return true;
        }
        let Some(before) = open.checked_sub(1).map(|k| self.tokens[k].kind) else {
            return true;
        };
        !matches!(
            before,
            TokenKind::Identifier
                | TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::CharLiteral
                | TokenKind::StringLiteral
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }

    /// `a, b :=` at statement start.
    fn short_var_decl(&self, i: usize, end: usize) -> Option<(Vec<String>, usize)> {
        let mut names = vec![self.tokens[i].value.clone()];
        let mut j = i + 1;
        loop {
            match self.kind_at(j, end)? {
                TokenKind::ColonEq => return Some((names, j + 1)),
                TokenKind::Comma if self.kind_at(j + 1, end) == Some(TokenKind::Identifier) => {
                    names.push(self.tokens[j + 1].value.clone());
                    j += 2;
                }
                _ => return None,
            }
        }
    }

    /// Leading field names of a struct field declaration.
    fn field_names(&self, i: usize, end: usize) -> Option<usize> {
        let mut j = i + 1;
        while self.kind_at(j, end) == Some(TokenKind::Comma)
            && self.kind_at(j + 1, end) == Some(TokenKind::Identifier)
        {
            j += 2;
        }
        match self.kind_at(j, end) {
            None
            | Some(TokenKind::Semicolon)
            | Some(TokenKind::RBrace)
            | Some(TokenKind::StringLiteral)
            | Some(TokenKind::Dot) => None,
            Some(_) => Some(j),
        }
    }

    /// Local `var`, `const` or `type` declaration starting at keyword `i`.
    fn local_decl(&mut self, i: usize, end: usize) -> usize {
        let is_type = self.tokens[i].kind == TokenKind::Type;
        let body = i + 1;

        if self.kind_at(body, end) == Some(TokenKind::LParen) {
            let close = matching(self.tokens, body).map_or(end, |c| c.min(end));
            let mut spec_start = body + 1;
            let mut depth = 0usize;
            for j in body + 1..close {
                match self.tokens[j].kind {
                    TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                    TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                        depth = depth.saturating_sub(1)
                    }
                    TokenKind::Semicolon if depth == 0 => {
                        self.value_spec(spec_start, j, is_type);
                        spec_start = j + 1;
                    }
                    _ => {}
                }
            }
            if spec_start < close {
                self.value_spec(spec_start, close, is_type);
            }
            return (close + 1).min(end);
        }

        let spec_end = expr_end(self.tokens, body).min(end);
        self.value_spec(body, spec_end, is_type);
        spec_end
    }

    fn value_spec(&mut self, start: usize, end: usize, is_type: bool) {
        let mut names = Vec::new();
        let mut j = start;
        while self.kind_at(j, end) == Some(TokenKind::Identifier) {
            names.push(self.tokens[j].value.clone());
            j += 1;
            if is_type || self.kind_at(j, end) != Some(TokenKind::Comma) {
                break;
            }
            j += 1;
        }

        if is_type {
            for name in names.drain(..) {
                self.declare(name);
            }
        }
        self.walk(j, end);
        for name in names {
            self.declare(name);
        }
    }

    /// Signature after `func` (or after an interface method name).
    ///
    /// When a body follows, the parameter names are bound in a header frame
    /// that closes together with that body.
    fn func_signature(&mut self, open: usize, end: usize, may_have_body: bool) -> usize {
        if self.kind_at(open, end) != Some(TokenKind::LParen) {
            return open;
        }

        let mut names = HashSet::new();
        let mut j = self.param_list(open, end, &mut names);

        match self.kind_at(j, end) {
            Some(TokenKind::LParen) => j = self.param_list(j, end, &mut names),
            Some(TokenKind::LBrace) | None => {}
            Some(_) => {
                let ty_end = type_end(self.tokens, j).min(end);
                self.walk(j, ty_end);
                j = ty_end;
            }
        }

        if may_have_body && self.kind_at(j, end) == Some(TokenKind::LBrace) {
            self.push_header(names, Pending::Body(j));
        }
        j
    }

    fn param_list(&mut self, open: usize, end: usize, names: &mut HashSet<String>) -> usize {
        let Some(list) = split_params(self.tokens, open) else {
            return end;
        };
        for entry in &list.entries {
            if let Some(name) = entry.name {
                names.insert(self.tokens[name].value.clone());
            }
            self.walk(entry.ty.0, entry.ty.1);
        }
        (list.close + 1).min(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_lexer::Lexer;

    fn refs_in(source: &str) -> Vec<String> {
        let tokens = Lexer::new(source).tokenize();
        let mut walker = RefWalker::new(&tokens, HashSet::new());
        walker.walk(0, tokens.len());
        walker.into_refs().into_iter().map(|r| r.ident.value.name).collect()
    }

    #[test]
    fn test_selectors_are_skipped() {
        assert_eq!(refs_in("{ fmt.Println(x.y) }"), vec!["fmt", "x"]);
    }

    #[test]
    fn test_short_var_decl_binds() {
        assert_eq!(refs_in("{ a, b := f(); g(a, b, c) }"), vec!["f", "g", "c"]);
    }

    #[test]
    fn test_header_scope_ends_with_block() {
        assert_eq!(
            refs_in("{ for i := 0; i < n; i++ { use(i) }; i = 1 }"),
            vec!["n", "use", "i"]
        );
    }

    #[test]
    fn test_range_over_literal() {
        assert_eq!(
            refs_in("{ for _, v := range []int{one, two} { sink(v) } }"),
            vec!["int", "one", "two", "sink"]
        );
    }

    #[test]
    fn test_literal_types_in_headers() {
        assert_eq!(
            refs_in("{ for k := range map[string]int{a: 1} { use(k) }; for _, v := range [2]T{} { use(v) } }"),
            vec!["string", "int", "a", "use", "T", "use"]
        );
    }

    #[test]
    fn test_index_expression_ends_header() {
        assert_eq!(
            refs_in("{ for _, x := range xs[1:] { y := x; use(y) }; if a == b[0] { z := 1; use(z) } }"),
            vec!["xs", "use", "a", "b", "use"]
        );
    }

    #[test]
    fn test_func_literal_with_slice_result() {
        assert_eq!(
            refs_in("{ f := func() []T { n := 1; return []T{n} }; f() }"),
            vec!["T", "T"]
        );
    }

    #[test]
    fn test_func_literal_params() {
        assert_eq!(
            refs_in("{ f := func(a T, b int) R { return a + b + c }; f(1, 2) }"),
            vec!["T", "int", "R", "c"]
        );
    }

    #[test]
    fn test_struct_fields_are_not_refs() {
        assert_eq!(
            refs_in("struct { name string; next, prev *Node; Embedded; io.Reader }"),
            vec!["string", "Node", "Embedded", "io"]
        );
    }

    #[test]
    fn test_interface_methods() {
        assert_eq!(refs_in("interface { Read(p []byte) (n int, err error); Stringer }"), vec![
            "byte", "int", "error", "Stringer"
        ]);
    }

    #[test]
    fn test_local_var_decl() {
        assert_eq!(
            refs_in("{ var x T = y; var ( a = 1; b int ); use(x, a, b) }"),
            vec!["T", "y", "int", "use"]
        );
    }

    #[test]
    fn test_labels_and_switch() {
        assert_eq!(
            refs_in("{ outer: for { switch v := w.(type) { case K: break outer; default: use(v) } } }"),
            vec!["w", "K", "use"]
        );
    }

    #[test]
    fn test_split_params() {
        let tokens = Lexer::new("(a, b int, c pkg.T)").tokenize();
        let list = split_params(&tokens, 0).unwrap();
        assert!(!list.mixed);
        assert_eq!(list.entries.len(), 3);
        assert_eq!(list.entries[0], ParamEntry { name: Some(1), ty: (2, 2) });
        assert_eq!(list.entries[1].name, Some(3));
        assert_eq!(list.entries[2].ty, (7, 10));

        let tokens = Lexer::new("(int, pkg.T)").tokenize();
        let list = split_params(&tokens, 0).unwrap();
        assert!(list.entries.iter().all(|e| e.name.is_none()));
    }
}
