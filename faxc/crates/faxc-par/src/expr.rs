//! The expression half of the IR: the jumping-code protocol of
//! `to_string` / `gen` / `reduce` / `jumping`.

use crate::context::GenCtx;
use faxc_lex::{Type, Word};
use faxc_util::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantValue {
    True,
    False,
    Int(i64),
    Real(faxc_lex::OrdF64),
}

#[derive(Debug, Clone)]
pub struct ConstantExpr {
    pub value: ConstantValue,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct IdentifierExpr {
    pub word: Word,
    pub ty: Type,
    pub offset: u32,
}

#[derive(Debug, Clone)]
pub struct TemporaryExpr {
    pub number: u32,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct ArithmeticExpr {
    pub op: &'static str,
    pub left: Expr,
    pub right: Expr,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: &'static str,
    pub operand: Expr,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct AccessExpr {
    pub array: IdentifierExpr,
    pub index: Expr,
    pub ty: Type,
}

/// Shared shape for `And`/`Or`/`Not`. `Not` stores its single operand as
/// both `l` and `r`.
#[derive(Debug, Clone)]
pub struct LogicalExpr {
    pub op: &'static str,
    pub l: Expr,
    pub r: Expr,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct RelationalExpr {
    pub op: &'static str,
    pub left: Expr,
    pub right: Expr,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Constant(ConstantExpr),
    Identifier(IdentifierExpr),
    Temporary(TemporaryExpr),
    Arithmetic(Box<ArithmeticExpr>),
    Unary(Box<UnaryExpr>),
    Access(Box<AccessExpr>),
    And(Box<LogicalExpr>),
    Or(Box<LogicalExpr>),
    Not(Box<LogicalExpr>),
    Relational(Box<RelationalExpr>),
}

impl Expr {
    pub fn ty(&self) -> &Type {
        match self {
            Expr::Constant(e) => &e.ty,
            Expr::Identifier(e) => &e.ty,
            Expr::Temporary(e) => &e.ty,
            Expr::Arithmetic(e) => &e.ty,
            Expr::Unary(e) => &e.ty,
            Expr::Access(e) => &e.ty,
            Expr::And(e) | Expr::Or(e) | Expr::Not(e) => &e.ty,
            Expr::Relational(e) => &e.ty,
        }
    }

    // ---- constructors -------------------------------------------------

    pub fn constant_true() -> Expr {
        Expr::Constant(ConstantExpr {
            value: ConstantValue::True,
            ty: Type::bool(),
        })
    }

    pub fn constant_false() -> Expr {
        Expr::Constant(ConstantExpr {
            value: ConstantValue::False,
            ty: Type::bool(),
        })
    }

    pub fn constant_int(v: i64) -> Expr {
        Expr::Constant(ConstantExpr {
            value: ConstantValue::Int(v),
            ty: Type::int(),
        })
    }

    pub fn constant_real(v: f64) -> Expr {
        Expr::Constant(ConstantExpr {
            value: ConstantValue::Real(faxc_lex::OrdF64(v)),
            ty: Type::float(),
        })
    }

    pub fn identifier(word: Word, ty: Type, offset: u32) -> Expr {
        Expr::Identifier(IdentifierExpr { word, ty, offset })
    }

    pub fn arithmetic(line: u32, op: &'static str, left: Expr, right: Expr) -> Result<Expr, CompileError> {
        let ty = Type::max(Some(left.ty()), Some(right.ty()))
            .ok_or_else(|| CompileError::fatal(line, "type error"))?;
        Ok(Expr::Arithmetic(Box::new(ArithmeticExpr {
            op,
            left,
            right,
            ty,
        })))
    }

    pub fn unary(line: u32, op: &'static str, operand: Expr) -> Result<Expr, CompileError> {
        let ty = Type::max(Some(&Type::int()), Some(operand.ty()))
            .ok_or_else(|| CompileError::fatal(line, "type error"))?;
        Ok(Expr::Unary(Box::new(UnaryExpr { op, operand, ty })))
    }

    pub fn access(array: IdentifierExpr, index: Expr, elem_ty: Type) -> Expr {
        Expr::Access(Box::new(AccessExpr {
            array,
            index,
            ty: elem_ty,
        }))
    }

    pub fn and(line: u32, l: Expr, r: Expr) -> Result<Expr, CompileError> {
        logical(line, "&&", l, r).map(|b| Expr::And(Box::new(b)))
    }

    pub fn or(line: u32, l: Expr, r: Expr) -> Result<Expr, CompileError> {
        logical(line, "||", l, r).map(|b| Expr::Or(Box::new(b)))
    }

    pub fn not(line: u32, operand: Expr) -> Result<Expr, CompileError> {
        if !operand.ty().is_bool() {
            return Err(CompileError::fatal(line, "type error"));
        }
        Ok(Expr::Not(Box::new(LogicalExpr {
            op: "!",
            l: operand.clone(),
            r: operand,
            ty: Type::bool(),
        })))
    }

    pub fn relational(line: u32, op: &'static str, left: Expr, right: Expr) -> Result<Expr, CompileError> {
        if left.ty().is_array() || right.ty().is_array() || left.ty() != right.ty() {
            return Err(CompileError::fatal(line, "type error"));
        }
        Ok(Expr::Relational(Box::new(RelationalExpr {
            op,
            left,
            right,
            ty: Type::bool(),
        })))
    }

    // ---- rendering ------------------------------------------------------

    pub fn render(&self, ctx: &GenCtx) -> String {
        match self {
            Expr::Constant(c) => match c.value {
                ConstantValue::True => "true".to_string(),
                ConstantValue::False => "false".to_string(),
                ConstantValue::Int(v) => v.to_string(),
                ConstantValue::Real(v) => v.0.to_string(),
            },
            Expr::Identifier(id) => ctx.interner.resolve(id.word.lexeme).to_string(),
            Expr::Temporary(t) => format!("t{}", t.number),
            Expr::Arithmetic(a) => format!("{} {} {}", a.left.render(ctx), a.op, a.right.render(ctx)),
            Expr::Unary(u) => format!("{} {}", u.op, u.operand.render(ctx)),
            Expr::Access(a) => format!(
                "{}[ {} ]",
                ctx.interner.resolve(a.array.word.lexeme),
                a.index.render(ctx)
            ),
            Expr::And(l) | Expr::Or(l) => format!("{} {} {}", l.l.render(ctx), l.op, l.r.render(ctx)),
            Expr::Not(l) => format!("! {}", l.l.render(ctx)),
            Expr::Relational(r) => format!("{} {} {}", r.left.render(ctx), r.op, r.right.render(ctx)),
        }
    }

    // ---- code generation ------------------------------------------------

    /// Value-producing generation: returns an expression that, rendered,
    /// represents this expression's value at this point.
    pub fn gen(&self, ctx: &mut GenCtx) -> Expr {
        match self {
            Expr::Arithmetic(a) => {
                let left = a.left.reduce(ctx);
                let right = a.right.reduce(ctx);
                Expr::Arithmetic(Box::new(ArithmeticExpr {
                    op: a.op,
                    left,
                    right,
                    ty: a.ty.clone(),
                }))
            }
            Expr::Unary(u) => {
                let operand = u.operand.reduce(ctx);
                Expr::Unary(Box::new(UnaryExpr {
                    op: u.op,
                    operand,
                    ty: u.ty.clone(),
                }))
            }
            Expr::Access(a) => {
                let index = a.index.reduce(ctx);
                Expr::Access(Box::new(AccessExpr {
                    array: a.array.clone(),
                    index,
                    ty: a.ty.clone(),
                }))
            }
            Expr::And(_) | Expr::Or(_) | Expr::Not(_) | Expr::Relational(_) => logical_gen(self, ctx),
            Expr::Constant(_) | Expr::Identifier(_) | Expr::Temporary(_) => self.clone(),
        }
    }

    /// Forces a terminal value, materializing one into a fresh temporary
    /// when this expression is not already terminal.
    pub fn reduce(&self, ctx: &mut GenCtx) -> Expr {
        match self {
            Expr::Arithmetic(_) | Expr::Unary(_) | Expr::Access(_) => {
                let gen = self.gen(ctx);
                let rendered = gen.render(ctx);
                let number = ctx.new_temp();
                ctx.emit(&format!("t{number} = {rendered}"));
                Expr::Temporary(TemporaryExpr {
                    number,
                    ty: self.ty().clone(),
                })
            }
            Expr::Constant(_)
            | Expr::Identifier(_)
            | Expr::Temporary(_)
            | Expr::And(_)
            | Expr::Or(_)
            | Expr::Not(_)
            | Expr::Relational(_) => self.clone(),
        }
    }

    /// Emits conditional jumps so control transfers to `to` when this
    /// expression is true, `from` when false (either may be 0).
    pub fn jumping(&self, ctx: &mut GenCtx, to: u32, from: u32) {
        match self {
            Expr::Constant(c) => match c.value {
                ConstantValue::True => {
                    if to != 0 {
                        ctx.emit(&format!("goto L{to}"));
                    }
                }
                ConstantValue::False => {
                    if from != 0 {
                        ctx.emit(&format!("goto L{from}"));
                    }
                }
                _ => {
                    let rendered = self.render(ctx);
                    ctx.emit_jumps(&rendered, to, from);
                }
            },
            Expr::And(l) => {
                let lbl = if from != 0 { from } else { ctx.new_label() };
                l.l.jumping(ctx, 0, lbl);
                l.r.jumping(ctx, to, from);
                if from == 0 {
                    ctx.emit_label(lbl);
                }
            }
            Expr::Or(l) => {
                let lbl = if to != 0 { to } else { ctx.new_label() };
                l.l.jumping(ctx, lbl, 0);
                l.r.jumping(ctx, to, from);
                if to == 0 {
                    ctx.emit_label(lbl);
                }
            }
            Expr::Not(l) => {
                l.l.jumping(ctx, from, to);
            }
            Expr::Relational(r) => {
                let left = r.left.reduce(ctx);
                let right = r.right.reduce(ctx);
                let test = format!("{} {} {}", left.render(ctx), r.op, right.render(ctx));
                ctx.emit_jumps(&test, to, from);
            }
            Expr::Access(_) => {
                let reduced = self.reduce(ctx);
                let rendered = reduced.render(ctx);
                ctx.emit_jumps(&rendered, to, from);
            }
            Expr::Identifier(_) | Expr::Temporary(_) | Expr::Arithmetic(_) | Expr::Unary(_) => {
                let rendered = self.render(ctx);
                ctx.emit_jumps(&rendered, to, from);
            }
        }
    }
}

fn logical(line: u32, op: &'static str, l: Expr, r: Expr) -> Result<LogicalExpr, CompileError> {
    if !l.ty().is_bool() || !r.ty().is_bool() {
        return Err(CompileError::fatal(line, "type error"));
    }
    Ok(LogicalExpr {
        op,
        l,
        r,
        ty: Type::bool(),
    })
}

/// Shared `Logical.gen`: materializes a jumping-style boolean into a
/// value by branching to label `f` on false, `a` on fall-through.
fn logical_gen(expr: &Expr, ctx: &mut GenCtx) -> Expr {
    let f = ctx.new_label();
    let a = ctx.new_label();
    let number = ctx.new_temp();
    expr.jumping(ctx, 0, f);
    ctx.emit(&format!("t{number} = true"));
    ctx.emit(&format!("goto L{a}"));
    ctx.emit_label(f);
    ctx.emit(&format!("t{number} = false"));
    ctx.emit_label(a);
    Expr::Temporary(TemporaryExpr {
        number,
        ty: Type::bool(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use faxc_util::Interner;

    #[test]
    fn arithmetic_type_is_max_of_operands() {
        let left = Expr::constant_int(1);
        let right = Expr::constant_real(2.0);
        let e = Expr::arithmetic(1, "+", left, right).unwrap();
        assert_eq!(*e.ty(), Type::float());
    }

    #[test]
    fn relational_rejects_mismatched_types() {
        let left = Expr::constant_int(1);
        let right = Expr::constant_real(2.0);
        assert!(Expr::relational(1, "<", left, right).is_err());
    }

    #[test]
    fn and_requires_both_operands_bool() {
        let l = Expr::constant_true();
        let r = Expr::constant_int(1);
        assert!(Expr::and(1, l, r).is_err());
    }

    #[test]
    fn true_jumping_to_only_emits_when_to_nonzero() {
        let interner = Interner::new();
        let mut ctx = GenCtx::new(&interner);
        Expr::constant_true().jumping(&mut ctx, 0, 5);
        assert_eq!(ctx.into_output(), "");
    }

    #[test]
    fn true_jumping_emits_goto_to_when_present() {
        let interner = Interner::new();
        let mut ctx = GenCtx::new(&interner);
        Expr::constant_true().jumping(&mut ctx, 3, 0);
        assert_eq!(ctx.into_output(), "\tgoto L3\n");
    }

    #[test]
    fn reduce_of_arithmetic_emits_a_temporary_assignment() {
        let interner = Interner::new();
        let mut ctx = GenCtx::new(&interner);
        let expr = Expr::arithmetic(1, "+", Expr::constant_int(1), Expr::constant_int(2)).unwrap();
        let reduced = expr.reduce(&mut ctx);
        assert!(matches!(reduced, Expr::Temporary(_)));
        assert_eq!(ctx.into_output(), "\tt1 = 1 + 2\n");
    }

    #[test]
    fn identifier_reduce_is_identity() {
        let mut lexer_interner = Interner::new();
        let sym = lexer_interner.intern("i");
        let word = Word::new(faxc_lex::Tag::Ident, sym);
        let id = Expr::identifier(word, Type::int(), 0);
        let mut ctx = GenCtx::new(&lexer_interner);
        let reduced = id.reduce(&mut ctx);
        assert!(matches!(reduced, Expr::Identifier(_)));
        assert_eq!(ctx.into_output(), "");
    }

    #[test]
    fn access_jumping_reduces_to_a_temporary_before_testing() {
        let mut lexer_interner = Interner::new();
        let array_sym = lexer_interner.intern("flags");
        let array_word = Word::new(faxc_lex::Tag::Ident, array_sym);
        let array = IdentifierExpr {
            word: array_word,
            ty: Type::array(4, Type::bool()),
            offset: 0,
        };
        let index = Expr::constant_int(0);
        let access = Expr::access(array, index, Type::bool());
        let mut ctx = GenCtx::new(&lexer_interner);
        access.jumping(&mut ctx, 0, 5);
        assert_eq!(
            ctx.into_output(),
            "\tt1 = flags[ 0 ]\n\tiffalse t1 goto L5\n"
        );
    }
}
