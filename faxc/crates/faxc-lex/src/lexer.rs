//! The lexer: byte stream to token stream, with reserved words and
//! identifiers sharing one interning table.

use crate::token::{NumericLiteral, Tag, Token, Word};
use faxc_util::{Interner, Result, Symbol};
use rustc_hash::FxHashMap;

/// Owns the character cursor, the current source line, and the
/// reserved/identifier word table for one compilation.
pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    peek: u8,
    pub line: u32,
    words: FxHashMap<Symbol, Word>,
    interner: Interner,
}

const SPACE: u8 = b' ';

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut interner = Interner::new();
        let mut words = FxHashMap::default();

        const RESERVED: &[(Tag, &str)] = &[
            (Tag::If, "if"),
            (Tag::Else, "else"),
            (Tag::While, "while"),
            (Tag::Do, "do"),
            (Tag::Break, "break"),
            (Tag::True, "true"),
            (Tag::False, "false"),
        ];
        for &(tag, lexeme) in RESERVED {
            let sym = interner.intern(lexeme);
            words.insert(sym, Word::new(tag, sym));
        }

        let mut lexer = Lexer {
            source: source.as_bytes(),
            pos: 0,
            peek: SPACE,
            line: 1,
            words,
            interner,
        };
        lexer.peek = lexer.source.first().copied().unwrap_or(0);
        lexer
    }

    /// Registers a reserved name backed by a type (the four primitive
    /// type keywords). Called by the parser before scanning begins, since
    /// the type value objects live in this crate but primitive
    /// construction is orthogonal to the cursor/line-tracking state here.
    pub fn reserve_type(&mut self, lexeme: &str) -> Symbol {
        let sym = self.interner.intern(lexeme);
        self.words.insert(sym, Word::new(Tag::Basic, sym));
        sym
    }

    pub fn intern(&mut self, text: &str) -> Symbol {
        self.interner.intern(text)
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn into_interner(self) -> Interner {
        self.interner
    }

    fn advance(&mut self) {
        self.pos += 1;
        self.peek = self.source.get(self.pos).copied().unwrap_or(0);
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Advance past the current char; if the new current char equals `c`,
    /// consume it too and reset `peek` to a space so the next `scan`
    /// starts clean. Returns whether the match happened.
    fn readch(&mut self, c: u8) -> bool {
        self.advance();
        if self.peek == c {
            self.peek = SPACE;
            true
        } else {
            false
        }
    }

    pub fn scan(&mut self) -> Result<Token> {
        loop {
            if self.at_eof() {
                return Ok(Token::Eof);
            }
            match self.peek {
                b' ' | b'\t' | b'\r' => {
                    self.advance();
                    continue;
                }
                b'\n' => {
                    self.line += 1;
                    self.advance();
                    continue;
                }
                _ => break,
            }
        }

        let composite = match self.peek {
            b'&' => Some((b'&', Tag::And, "&&")),
            b'|' => Some((b'|', Tag::Or, "||")),
            b'=' => Some((b'=', Tag::Eq, "==")),
            b'!' => Some((b'=', Tag::Ne, "!=")),
            b'<' => Some((b'=', Tag::Le, "<=")),
            b'>' => Some((b'=', Tag::Ge, ">=")),
            _ => None,
        };
        if let Some((second, tag, lexeme)) = composite {
            let first = self.peek;
            if self.readch(second) {
                let sym = self.interner.intern(lexeme);
                return Ok(Token::Word(Word::new(tag, sym)));
            }
            // `readch` already advanced past `first`; the char it left in
            // `peek` is the next pending char for the following `scan`.
            return Ok(Token::Char(first));
        }

        if self.peek.is_ascii_digit() {
            let mut value: i64 = 0;
            while self.peek.is_ascii_digit() {
                value = value * 10 + (self.peek - b'0') as i64;
                self.advance();
            }
            if self.peek == b'.' {
                self.advance();
                let mut real = value as f64;
                let mut power = 10.0_f64;
                while self.peek.is_ascii_digit() {
                    real += (self.peek - b'0') as f64 / power;
                    power *= 10.0;
                    self.advance();
                }
                return Ok(Token::Real(NumericLiteral::real(real)));
            }
            return Ok(Token::Int(NumericLiteral::int(value)));
        }

        if self.peek.is_ascii_alphabetic() {
            let start = self.pos;
            while self.peek.is_ascii_alphanumeric() {
                self.advance();
            }
            let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
            let sym = self.interner.intern(text);
            if let Some(word) = self.words.get(&sym) {
                return Ok(Token::Word(*word));
            }
            let word = Word::new(Tag::Ident, sym);
            self.words.insert(sym, word);
            return Ok(Token::Word(word));
        }

        let ch = self.peek;
        self.advance();
        Ok(Token::Char(ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(src: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.scan().unwrap();
            if tok == Token::Eof {
                break;
            }
            out.push(tok);
        }
        out
    }

    #[test]
    fn composite_operators_lex_as_single_tokens() {
        let toks = scan_all("&& || == != <= >=");
        assert_eq!(toks.len(), 6);
        for t in toks {
            assert!(matches!(t, Token::Word(_)));
        }
    }

    #[test]
    fn lone_ampersand_is_single_char_token() {
        let toks = scan_all("& a");
        assert_eq!(toks[0], Token::Char(b'&'));
    }

    #[test]
    fn integer_literal_has_no_fraction() {
        let toks = scan_all("42");
        assert_eq!(toks[0], Token::Int(NumericLiteral::int(42)));
    }

    #[test]
    fn real_literal_with_fraction() {
        let toks = scan_all("3.14");
        match toks[0] {
            Token::Real(n) => assert!((n.value.0 - 3.14).abs() < 1e-9),
            other => panic!("expected real literal, got {other:?}"),
        }
    }

    #[test]
    fn dot_with_no_following_digit_is_still_a_real() {
        let toks = scan_all("3.;");
        match toks[0] {
            Token::Real(n) => assert_eq!(n.value.0, 3.0),
            other => panic!("expected real literal, got {other:?}"),
        }
        assert_eq!(toks[1], Token::Char(b';'));
    }

    #[test]
    fn identifier_reinterns_to_same_symbol() {
        let mut lexer = Lexer::new("count count");
        let first = lexer.scan().unwrap();
        let second = lexer.scan().unwrap();
        match (first, second) {
            (Token::Word(a), Token::Word(b)) => assert_eq!(a.lexeme, b.lexeme),
            _ => panic!("expected two identifier words"),
        }
    }

    #[test]
    fn reserved_words_lex_with_their_own_tag() {
        let toks = scan_all("if else while do break true false");
        let tags: Vec<Tag> = toks
            .into_iter()
            .map(|t| match t {
                Token::Word(w) => w.tag,
                other => panic!("expected word, got {other:?}"),
            })
            .collect();
        assert_eq!(
            tags,
            vec![
                Tag::If,
                Tag::Else,
                Tag::While,
                Tag::Do,
                Tag::Break,
                Tag::True,
                Tag::False
            ]
        );
    }

    #[test]
    fn newline_advances_line_counter() {
        let mut lexer = Lexer::new("a\nb\nc");
        assert_eq!(lexer.line, 1);
        lexer.scan().unwrap();
        lexer.scan().unwrap();
        assert_eq!(lexer.line, 2);
        lexer.scan().unwrap();
        assert_eq!(lexer.line, 3);
    }

    proptest::proptest! {
        /// Any lowercase identifier that isn't a reserved word lexes back
        /// to a `Word` whose lexeme resolves to the exact source text.
        #[test]
        fn identifiers_round_trip_through_the_interner(name in "[a-z]{1,8}") {
            proptest::prop_assume!(!matches!(
                name.as_str(),
                "if" | "else" | "while" | "do" | "break" | "true" | "false"
            ));
            let mut lexer = Lexer::new(&name);
            let tok = lexer.scan().unwrap();
            match tok {
                Token::Word(w) => proptest::prop_assert_eq!(lexer.resolve(w.lexeme), name.as_str()),
                other => panic!("expected an identifier word, got {other:?}"),
            }
        }
    }
}
