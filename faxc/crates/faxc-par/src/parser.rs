//! Recursive-descent parser, one-token lookahead, building IR directly
//! (no separate untyped AST) and consulting the symbol environment as it
//! goes.

use crate::context::GenCtx;
use crate::expr::{Expr, IdentifierExpr};
use crate::stmt::Stmt;
use faxc_lex::{Lexer, Tag, Token, Type, Word};
use faxc_sem::{Environment, IdentifierEntry};
use faxc_util::{CompileError, Counter, Result, Symbol};
use rustc_hash::FxHashMap;

/// Drives a [`Lexer`] one token at a time, building [`Expr`]/[`Stmt`] IR
/// and resolving identifiers through an [`Environment`].
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    look: Token,
    env: Environment,
    offset: u32,
    basic_types: FxHashMap<Symbol, Type>,
    /// Number of loop bodies currently being parsed. `break` is only valid
    /// while this is nonzero; this is the parse-time half of the
    /// enclosing-loop resolution the original resolves with a captured
    /// statement pointer (see DESIGN.md).
    loop_depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let mut basic_types = FxHashMap::default();
        for (name, ty) in [
            ("int", Type::int()),
            ("float", Type::float()),
            ("char", Type::char()),
            ("bool", Type::bool()),
        ] {
            let sym = lexer.reserve_type(name);
            basic_types.insert(sym, ty);
        }
        let look = lexer.scan()?;
        Ok(Parser {
            lexer,
            look,
            env: Environment::new(),
            offset: 0,
            basic_types,
            loop_depth: 0,
        })
    }

    fn line(&self) -> u32 {
        self.lexer.line
    }

    fn advance(&mut self) -> Result<()> {
        self.look = self.lexer.scan()?;
        Ok(())
    }

    fn resolve(&self, sym: Symbol) -> &str {
        self.lexer.resolve(sym)
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::fatal(self.line(), message)
    }

    /// Consumes the current char token if it matches `c`, else raises a
    /// syntax error.
    fn expect_char(&mut self, c: u8) -> Result<()> {
        match self.look {
            Token::Char(found) if found == c => self.advance(),
            _ => Err(self.error("Syntax error")),
        }
    }

    fn expect_word(&mut self, tag: Tag) -> Result<Word> {
        match self.look {
            Token::Word(w) if w.tag == tag => {
                self.advance()?;
                Ok(w)
            }
            _ => Err(self.error("Syntax error")),
        }
    }

    // ---- entry point -----------------------------------------------------

    /// Parses the whole program and returns the generated TAC listing.
    pub fn program(mut self) -> Result<String> {
        let stmt = self.block()?;
        let interner = self.lexer.into_interner();
        let mut ctx = GenCtx::new(&interner);
        let begin = ctx.new_label();
        let after = ctx.new_label();
        ctx.emit_label(begin);
        stmt.gen(&mut ctx, begin, after);
        ctx.emit_label(after);
        Ok(ctx.into_output())
    }

    // ---- grammar -----------------------------------------------------------

    fn block(&mut self) -> Result<Stmt> {
        self.expect_char(b'{')?;
        self.env.push_scope();
        self.decls()?;
        let stmt = self.stmts()?;
        self.env.pop_scope();
        self.expect_char(b'}')?;
        Ok(stmt)
    }

    fn decls(&mut self) -> Result<()> {
        loop {
            let is_basic = matches!(self.look, Token::Word(w) if self.basic_types.contains_key(&w.lexeme));
            if !is_basic {
                return Ok(());
            }
            let ty = self.parse_type()?;
            let name = match self.look {
                Token::Word(w) if w.tag == Tag::Ident => w,
                _ => return Err(self.error("Syntax error")),
            };
            self.advance()?;
            self.expect_char(b';')?;
            let width = ty.width();
            self.env
                .put(name.lexeme, IdentifierEntry::new(name, ty, self.offset));
            self.offset += width;
        }
    }

    fn parse_type(&mut self) -> Result<Type> {
        let basic = match self.look {
            Token::Word(w) => self
                .basic_types
                .get(&w.lexeme)
                .cloned()
                .ok_or_else(|| self.error("Syntax error"))?,
            _ => return Err(self.error("Syntax error")),
        };
        self.advance()?;
        self.dims(basic)
    }

    /// Parses zero or more `[INT]` suffixes, nesting `Array` wrappers
    /// outer-first so the declared type reads the same as the source
    /// (`int[3][4]` nests `Array(3, Array(4, int))`).
    fn dims(&mut self, elem: Type) -> Result<Type> {
        if !matches!(self.look, Token::Char(b'[')) {
            return Ok(elem);
        }
        self.advance()?;
        let count = match self.look {
            Token::Int(n) => n.value as u32,
            _ => return Err(self.error("Syntax error")),
        };
        self.advance()?;
        self.expect_char(b']')?;
        let inner = self.dims(elem)?;
        Ok(Type::array(count, inner))
    }

    fn stmts(&mut self) -> Result<Stmt> {
        if matches!(self.look, Token::Char(b'}')) {
            return Ok(Stmt::Null);
        }
        let first = self.stmt()?;
        let second = self.stmts()?;
        Ok(Stmt::sequence(first, second))
    }

    fn stmt(&mut self) -> Result<Stmt> {
        match self.look {
            Token::Char(b';') => {
                self.advance()?;
                Ok(Stmt::Null)
            }
            Token::Char(b'{') => self.block(),
            Token::Word(w) if w.tag == Tag::If => self.if_stmt(),
            Token::Word(w) if w.tag == Tag::While => self.while_stmt(),
            Token::Word(w) if w.tag == Tag::Do => self.do_stmt(),
            Token::Word(w) if w.tag == Tag::Break => {
                let line = self.line();
                self.advance()?;
                self.expect_char(b';')?;
                if self.loop_depth == 0 {
                    return Err(CompileError::fatal(line, "Unenclosed break"));
                }
                Ok(Stmt::Break)
            }
            _ => self.assign(),
        }
    }

    fn if_stmt(&mut self) -> Result<Stmt> {
        let line = self.line();
        self.advance()?; // 'if'
        self.expect_char(b'(')?;
        let cond = self.bool_expr()?;
        self.expect_char(b')')?;
        let then = self.stmt()?;
        if matches!(self.look, Token::Word(w) if w.tag == Tag::Else) {
            self.advance()?;
            let otherwise = self.stmt()?;
            Stmt::if_else(line, cond, then, otherwise)
        } else {
            Stmt::if_then(line, cond, then)
        }
    }

    fn while_stmt(&mut self) -> Result<Stmt> {
        let line = self.line();
        self.advance()?; // 'while'
        self.expect_char(b'(')?;
        let cond = self.bool_expr()?;
        self.expect_char(b')')?;
        self.loop_depth += 1;
        let body = self.stmt();
        self.loop_depth -= 1;
        Stmt::while_loop(line, cond, body?)
    }

    fn do_stmt(&mut self) -> Result<Stmt> {
        let line = self.line();
        self.advance()?; // 'do'
        self.loop_depth += 1;
        let body = self.stmt();
        self.loop_depth -= 1;
        let body = body?;
        self.expect_word(Tag::While)?;
        self.expect_char(b'(')?;
        let cond = self.bool_expr()?;
        self.expect_char(b')')?;
        self.expect_char(b';')?;
        Stmt::do_while(line, body, cond)
    }

    fn assign(&mut self) -> Result<Stmt> {
        let line = self.line();
        let name = match self.look {
            Token::Word(w) if w.tag == Tag::Ident => w,
            _ => return Err(self.error("Syntax error")),
        };
        self.advance()?;
        let entry = self
            .env
            .get(name.lexeme)
            .ok_or_else(|| self.error(format!("{} undeclared", self.resolve(name.lexeme))))?
            .clone();

        if matches!(self.look, Token::Char(b'[')) {
            let id = IdentifierExpr {
                word: entry.word,
                ty: entry.ty.clone(),
                offset: entry.offset,
            };
            let access = self.offset_chain(id, entry.ty)?;
            self.expect_char(b'=')?;
            let rhs = self.bool_expr()?;
            self.expect_char(b';')?;
            let (array, index, elem_ty) = match access {
                Expr::Access(a) => (a.array, a.index, a.ty),
                _ => unreachable!("offset_chain always yields an Access"),
            };
            return Stmt::set_elem(line, array, index, elem_ty, rhs);
        }

        self.expect_char(b'=')?;
        let rhs = self.bool_expr()?;
        self.expect_char(b';')?;
        let id = IdentifierExpr {
            word: entry.word,
            ty: entry.ty,
            offset: entry.offset,
        };
        Stmt::set(line, id, rhs)
    }

    /// Chains one or more `[idx]` onto a declared array identifier,
    /// accumulating a byte offset across dimensions in declaration order.
    fn offset_chain(&mut self, id: IdentifierExpr, declared: Type) -> Result<Expr> {
        self.expect_char(b'[')?;
        let first_index = self.bool_expr()?;
        self.expect_char(b']')?;
        let mut elem_ty = match &declared {
            Type::Array(a) => a.element.clone(),
            _ => return Err(self.error("type error")),
        };
        let width = elem_ty.width() as i64;
        let mut location = Expr::arithmetic(self.line(), "*", first_index, Expr::constant_int(width))?;

        while matches!(self.look, Token::Char(b'[')) {
            self.advance()?;
            let idx = self.bool_expr()?;
            self.expect_char(b']')?;
            let next_elem = match &elem_ty {
                Type::Array(a) => a.element.clone(),
                _ => return Err(self.error("type error")),
            };
            let w = next_elem.width() as i64;
            let term = Expr::arithmetic(self.line(), "*", idx, Expr::constant_int(w))?;
            location = Expr::arithmetic(self.line(), "+", location, term)?;
            elem_ty = next_elem;
        }

        Ok(Expr::access(id, location, elem_ty))
    }

    // ---- expressions, by ascending precedence -----------------------------

    fn bool_expr(&mut self) -> Result<Expr> {
        let mut left = self.join()?;
        while matches!(self.look, Token::Word(w) if w.tag == Tag::Or) {
            let line = self.line();
            self.advance()?;
            let right = self.rel()?;
            left = Expr::or(line, left, right)?;
        }
        Ok(left)
    }

    fn join(&mut self) -> Result<Expr> {
        let mut left = self.equality()?;
        while matches!(self.look, Token::Word(w) if w.tag == Tag::And) {
            let line = self.line();
            self.advance()?;
            let right = self.rel()?;
            left = Expr::and(line, left, right)?;
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut left = self.rel()?;
        loop {
            let op = match self.look {
                Token::Word(w) if w.tag == Tag::Eq => "==",
                Token::Word(w) if w.tag == Tag::Ne => "!=",
                _ => return Ok(left),
            };
            let line = self.line();
            self.advance()?;
            let right = self.expression()?;
            left = Expr::relational(line, op, left, right)?;
        }
    }

    fn rel(&mut self) -> Result<Expr> {
        let left = self.expression()?;
        let op = match self.look {
            Token::Char(b'<') => "<",
            Token::Word(w) if w.tag == Tag::Le => "<=",
            Token::Word(w) if w.tag == Tag::Ge => ">=",
            Token::Char(b'>') => ">",
            _ => return Ok(left),
        };
        let line = self.line();
        self.advance()?;
        let right = self.expression()?;
        Expr::relational(line, op, left, right)
    }

    fn expression(&mut self) -> Result<Expr> {
        let mut left = self.term()?;
        loop {
            let op = match self.look {
                Token::Char(b'+') => "+",
                Token::Char(b'-') => "-",
                _ => return Ok(left),
            };
            let line = self.line();
            self.advance()?;
            let right = self.term()?;
            left = Expr::arithmetic(line, op, left, right)?;
        }
    }

    fn term(&mut self) -> Result<Expr> {
        let mut left = self.unary()?;
        loop {
            let op = match self.look {
                Token::Char(b'*') => "*",
                Token::Char(b'/') => "/",
                _ => return Ok(left),
            };
            let line = self.line();
            self.advance()?;
            let right = self.unary()?;
            left = Expr::arithmetic(line, op, left, right)?;
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        match self.look {
            Token::Char(b'-') => {
                let line = self.line();
                self.advance()?;
                let operand = self.unary()?;
                Expr::unary(line, "-", operand)
            }
            Token::Char(b'!') => {
                let line = self.line();
                self.advance()?;
                let operand = self.unary()?;
                Expr::not(line, operand)
            }
            _ => self.factor(),
        }
    }

    fn factor(&mut self) -> Result<Expr> {
        match self.look {
            Token::Char(b'(') => {
                self.advance()?;
                let e = self.bool_expr()?;
                self.expect_char(b')')?;
                Ok(e)
            }
            Token::Int(n) => {
                self.advance()?;
                Ok(Expr::constant_int(n.value))
            }
            Token::Real(n) => {
                self.advance()?;
                Ok(Expr::constant_real(n.value.0))
            }
            Token::Word(w) if w.tag == Tag::True => {
                self.advance()?;
                Ok(Expr::constant_true())
            }
            Token::Word(w) if w.tag == Tag::False => {
                self.advance()?;
                Ok(Expr::constant_false())
            }
            Token::Word(w) if w.tag == Tag::Ident => {
                self.advance()?;
                let entry = self
                    .env
                    .get(w.lexeme)
                    .ok_or_else(|| self.error(format!("{} undeclared", self.resolve(w.lexeme))))?
                    .clone();
                if matches!(self.look, Token::Char(b'[')) {
                    let id = IdentifierExpr {
                        word: entry.word,
                        ty: entry.ty.clone(),
                        offset: entry.offset,
                    };
                    self.offset_chain(id, entry.ty)
                } else {
                    Ok(Expr::identifier(entry.word, entry.ty, entry.offset))
                }
            }
            _ => Err(self.error("Syntax error")),
        }
    }
}

/// Parses `source` and returns the generated three-address-code listing.
pub fn compile(source: &str) -> Result<String> {
    let parser = Parser::new(source)?;
    parser.program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_empty_block() {
        assert_eq!(compile("{}").unwrap(), "L1:L2:");
    }

    #[test]
    fn s2_declaration_only() {
        assert_eq!(compile("{int i;}").unwrap(), "L1:L2:");
    }

    #[test]
    fn s3_single_assignment() {
        assert_eq!(compile("{int i; i = 10;}").unwrap(), "L1:\ti = 10\nL2:");
    }

    #[test]
    fn s4_array_assignment() {
        let out = compile("{int i;int[20] arr; i = 10; arr[i] = 10;}").unwrap();
        assert_eq!(out, "L1:\ti = 10\nL3:\tt1 = i * 4\n\tarr[ t1 ] = 10\nL2:");
    }

    #[test]
    fn s5_while_true_break() {
        let out = compile("{ while (true) { break; } }").unwrap();
        assert_eq!(out, "L1:L3:\tgoto L2\n\tgoto L1\nL2:");
    }

    #[test]
    fn undeclared_identifier_is_an_error() {
        let err = compile("{i = 1;}").unwrap_err();
        assert!(matches!(err, CompileError::Fatal { message, .. } if message == "i undeclared"));
    }

    #[test]
    fn break_outside_loop_is_unenclosed() {
        let err = compile("{break;}").unwrap_err();
        assert!(matches!(err, CompileError::Fatal { message, .. } if message == "Unenclosed break"));
    }

    #[test]
    fn break_inside_nested_block_within_loop_is_accepted() {
        assert!(compile("{while (true) { break; }}").is_ok());
    }

    #[test]
    fn while_with_non_bool_condition_is_rejected() {
        let err = compile("{int i; while (i) ;}").unwrap_err();
        assert!(matches!(err, CompileError::Fatal { message, .. } if message == "Boolean required in do"));
    }
}
