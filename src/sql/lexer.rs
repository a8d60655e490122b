//! SQL lexer: converts statement text into tokens.
//!
//! Tokenization is total. Characters outside the recognized alphabet are
//! skipped, strings and block comments left open at end of input close
//! there, and numeric validation is deferred to the parser, so `tokenize`
//! never fails.

use super::token::{Token, TokenKind};

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the whole input. The final token is always `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            let offset = self.position;

            if self.is_eof() {
                return Token::new(TokenKind::Eof, "", offset);
            }

            let ch = self.current_char();

            // Comments lex as whitespace
            if ch == '-' && self.peek_char() == Some('-') {
                self.skip_line_comment();
                continue;
            }
            if ch == '/' && self.peek_char() == Some('*') {
                self.skip_block_comment();
                continue;
            }

            match ch {
                '\'' => return self.read_string(offset),

                '0'..='9' => return self.read_number(offset),

                'a'..='z' | 'A'..='Z' | '_' => return self.read_identifier(offset),

                '=' => {
                    self.advance();
                    return Token::new(TokenKind::Eq, "=", offset);
                }
                '<' => {
                    self.advance();
                    return match self.current_char() {
                        '>' => {
                            self.advance();
                            Token::new(TokenKind::Ne, "<>", offset)
                        }
                        '=' => {
                            self.advance();
                            Token::new(TokenKind::Le, "<=", offset)
                        }
                        _ => Token::new(TokenKind::Lt, "<", offset),
                    };
                }
                '>' => {
                    self.advance();
                    if self.current_char() == '=' {
                        self.advance();
                        return Token::new(TokenKind::Ge, ">=", offset);
                    }
                    return Token::new(TokenKind::Gt, ">", offset);
                }
                ';' => {
                    self.advance();
                    return Token::new(TokenKind::Semicolon, ";", offset);
                }
                ',' => {
                    self.advance();
                    return Token::new(TokenKind::Comma, ",", offset);
                }
                '(' => {
                    self.advance();
                    return Token::new(TokenKind::LParen, "(", offset);
                }
                ')' => {
                    self.advance();
                    return Token::new(TokenKind::RParen, ")", offset);
                }
                '*' => {
                    self.advance();
                    return Token::new(TokenKind::Star, "*", offset);
                }

                // Anything else is outside the language's alphabet
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn current_char(&self) -> char {
        if self.is_eof() {
            '\0'
        } else {
            self.input[self.position]
        }
    }

    fn peek_char(&self) -> Option<char> {
        if self.position + 1 < self.input.len() {
            Some(self.input[self.position + 1])
        } else {
            None
        }
    }

    fn advance(&mut self) {
        if !self.is_eof() {
            self.position += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_eof() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn skip_line_comment(&mut self) {
        while !self.is_eof() && self.current_char() != '\n' {
            self.advance();
        }
        if !self.is_eof() {
            self.advance(); // skip newline
        }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_eof() {
            if self.current_char() == '*' && self.peek_char() == Some('/') {
                self.advance();
                self.advance();
                return;
            }
            self.advance();
        }
        // unterminated comment swallows the rest of the input
    }

    /// Single-quoted string, no escape processing. A quote character inside
    /// a string cannot be expressed; a string left open at end of input
    /// closes there.
    fn read_string(&mut self, offset: usize) -> Token {
        self.advance(); // skip opening quote
        let mut value = String::new();

        while !self.is_eof() && self.current_char() != '\'' {
            value.push(self.current_char());
            self.advance();
        }

        if !self.is_eof() {
            self.advance(); // skip closing quote
        }

        Token::new(TokenKind::StringLiteral, value, offset)
    }

    /// Digits and dots, greedily. `1.2.3` lexes as one token; deciding
    /// whether the text is a well-formed numeral is the parser's job.
    fn read_number(&mut self, offset: usize) -> Token {
        let mut value = String::new();

        while !self.is_eof() && (self.current_char().is_ascii_digit() || self.current_char() == '.')
        {
            value.push(self.current_char());
            self.advance();
        }

        Token::new(TokenKind::Number, value, offset)
    }

    fn read_identifier(&mut self, offset: usize) -> Token {
        let mut value = String::new();

        while !self.is_eof() {
            let ch = self.current_char();
            if ch.is_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::from_keyword(&value).unwrap_or(TokenKind::Identifier);
        Token::new(kind, value, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).tokenize().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lexer_simple_select() {
        let tokens = Lexer::new("SELECT * FROM users").tokenize();

        assert_eq!(tokens.len(), 5); // SELECT, *, FROM, users, EOF
        assert_eq!(tokens[0].kind, TokenKind::Select);
        assert_eq!(tokens[1].kind, TokenKind::Star);
        assert_eq!(tokens[2].kind, TokenKind::From);
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
        assert_eq!(tokens[3].text, "users");
        assert_eq!(tokens[4].kind, TokenKind::Eof);
    }

    #[test]
    fn test_lexer_keywords_case_insensitive() {
        let tokens = Lexer::new("select FROM Where").tokenize();

        assert_eq!(tokens[0].kind, TokenKind::Select);
        assert_eq!(tokens[1].kind, TokenKind::From);
        assert_eq!(tokens[2].kind, TokenKind::Where);
        // original spelling survives in the text
        assert_eq!(tokens[0].text, "select");
        assert_eq!(tokens[2].text, "Where");
    }

    #[test]
    fn test_lexer_operators() {
        assert_eq!(
            kinds("= <> < > <= >="),
            vec![
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_string_literal() {
        let tokens = Lexer::new("name = 'John'").tokenize();

        assert_eq!(tokens[2].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[2].text, "John");
    }

    #[test]
    fn test_lexer_no_escape_processing() {
        // a doubled quote ends one string and starts another
        let tokens = Lexer::new("'it''s'").tokenize();

        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text, "it");
        assert_eq!(tokens[1].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[1].text, "s");
    }

    #[test]
    fn test_lexer_unterminated_string_closes_at_eof() {
        let tokens = Lexer::new("'abc").tokenize();

        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text, "abc");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_lexer_skips_unknown_characters() {
        assert_eq!(
            kinds("SELECT @#$ * FROM t!"),
            vec![
                TokenKind::Select,
                TokenKind::Star,
                TokenKind::From,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_number_with_many_dots_is_one_token() {
        let tokens = Lexer::new("1.2.3").tokenize();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "1.2.3");
    }

    #[test]
    fn test_lexer_minus_is_not_part_of_numbers() {
        // there is no unary minus; a lone '-' is outside the alphabet
        let tokens = Lexer::new("-5").tokenize();

        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "5");
    }

    #[test]
    fn test_lexer_comments() {
        assert_eq!(
            kinds("SELECT * -- trailing comment\nFROM t"),
            vec![
                TokenKind::Select,
                TokenKind::Star,
                TokenKind::From,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("SELECT /* block\ncomment */ * FROM t"),
            vec![
                TokenKind::Select,
                TokenKind::Star,
                TokenKind::From,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        // unterminated block comment swallows the rest
        assert_eq!(kinds("SELECT /* open"), vec![TokenKind::Select, TokenKind::Eof]);
    }

    #[test]
    fn test_lexer_offsets() {
        let tokens = Lexer::new("SELECT id").tokenize();

        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].offset, 7);
    }

    #[test]
    fn test_lexer_constraint_keywords() {
        assert_eq!(
            kinds("NOT NULL PRIMARY KEY true FALSE"),
            vec![
                TokenKind::Not,
                TokenKind::Null,
                TokenKind::Primary,
                TokenKind::Key,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Eof,
            ]
        );
    }
}
