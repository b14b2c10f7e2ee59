use crate::filter::registry::Attribute;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    And,
    Or,
    Not,
    #[serde(rename = "LPAREN")]
    LParen,
    #[serde(rename = "RPAREN")]
    RParen,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Contains,
    Identifier,
    StringLiteral,
    IntLiteral,
    Invalid,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Eq => "EQ",
            TokenKind::Neq => "NEQ",
            TokenKind::Lt => "LT",
            TokenKind::Gt => "GT",
            TokenKind::Lte => "LTE",
            TokenKind::Gte => "GTE",
            TokenKind::Contains => "CONTAINS",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::IntLiteral => "INT_LITERAL",
            TokenKind::Invalid => "INVALID",
        }
    }

    pub fn is_compare_op(self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::Neq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::Lte
                | TokenKind::Gte
                | TokenKind::Contains
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Not => "!",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Eq => "==",
            TokenKind::Neq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Lte => "<=",
            TokenKind::Gte => ">=",
            TokenKind::Contains => "contains",
            TokenKind::Identifier => "identifier",
            TokenKind::StringLiteral => "string literal",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::Invalid => "invalid token",
        };
        f.write_str(label)
    }
}

/// One lexeme of filter text. `position` is a byte offset into the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, lexeme: &str, position: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.to_string(),
            position,
        }
    }
}

const CONTAINS_KEYWORD: &str = "contains";

const OPERATORS: [(&str, TokenKind); 9] = [
    ("<=", TokenKind::Lte),
    (">=", TokenKind::Gte),
    ("!=", TokenKind::Neq),
    ("==", TokenKind::Eq),
    ("||", TokenKind::Or),
    ("&&", TokenKind::And),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("!", TokenKind::Not),
];

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.'
}

pub(crate) fn is_operator_char(ch: char) -> bool {
    matches!(ch, '<' | '>' | '!' | '=' | '|' | '&')
}

/// Splits filter text into tokens. Never fails: unrecognized fragments
/// come back as `TokenKind::Invalid` for the parser to reject.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch == '"' {
            chars.next();
            let mut end = None;
            while let Some((idx, ch)) = chars.next() {
                match ch {
                    '\\' => {
                        chars.next();
                    }
                    '"' => {
                        end = Some(idx + 1);
                        break;
                    }
                    _ => {}
                }
            }
            match end {
                Some(end) => tokens.push(Token::new(
                    TokenKind::StringLiteral,
                    &text[start..end],
                    start,
                )),
                None => tokens.push(Token::new(TokenKind::Invalid, &text[start..], start)),
            }
            continue;
        }

        if is_word_char(ch) {
            let end = scan_while(&mut chars, text.len(), is_word_char);
            let lexeme = &text[start..end];
            tokens.push(Token::new(classify_word(lexeme), lexeme, start));
            continue;
        }

        if is_operator_char(ch) {
            let end = scan_while(&mut chars, text.len(), is_operator_char);
            split_operator_run(&text[start..end], start, &mut tokens);
            continue;
        }

        chars.next();
        let end = start + ch.len_utf8();
        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            _ => TokenKind::Invalid,
        };
        tokens.push(Token::new(kind, &text[start..end], start));
    }

    tokens
}

fn scan_while(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    text_len: usize,
    accept: fn(char) -> bool,
) -> usize {
    while let Some(&(idx, ch)) = chars.peek() {
        if !accept(ch) {
            return idx;
        }
        chars.next();
    }
    text_len
}

fn classify_word(lexeme: &str) -> TokenKind {
    if lexeme == CONTAINS_KEYWORD {
        TokenKind::Contains
    } else if Attribute::lookup(lexeme).is_some() {
        TokenKind::Identifier
    } else if lexeme.parse::<i64>().is_ok() {
        TokenKind::IntLiteral
    } else {
        TokenKind::Invalid
    }
}

// Maximal munch over a run of operator symbols. A run containing a symbol
// that starts no operator is kept whole as a single invalid token.
fn split_operator_run(run: &str, position: usize, tokens: &mut Vec<Token>) {
    let mut split = Vec::new();
    let mut offset = 0;
    while offset < run.len() {
        let rest = &run[offset..];
        match OPERATORS.iter().find(|(op, _)| rest.starts_with(op)) {
            Some((op, kind)) => {
                split.push(Token::new(*kind, op, position + offset));
                offset += op.len();
            }
            None => {
                tokens.push(Token::new(TokenKind::Invalid, run, position));
                return;
            }
        }
    }
    tokens.extend(split);
}

/// Strips the surrounding quotes of a string literal lexeme and resolves
/// backslash escapes (`\"` becomes `"`, `\\` becomes `\`).
pub fn decode_string_literal(lexeme: &str) -> String {
    let inner = lexeme
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(lexeme);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Read-only view over a token sequence with one-token lookahead.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
    end_position: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [Token], end_position: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            end_position,
        }
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    pub fn next_if(&mut self, kind: TokenKind) -> Option<&'a Token> {
        let token = self.peek().filter(|token| token.kind == kind)?;
        self.pos += 1;
        Some(token)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Byte offset of the next token, or of the end of input.
    pub fn position(&self) -> usize {
        self.peek()
            .map(|token| token.position)
            .unwrap_or(self.end_position)
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_string_literal, tokenize, TokenKind, TokenStream};

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn tokenize_reference_filter() {
        assert_eq!(
            kinds(r#"author.subscribed && message.length > 10 || author.badges contains "moderator""#),
            vec![
                TokenKind::Identifier,
                TokenKind::And,
                TokenKind::Identifier,
                TokenKind::Gt,
                TokenKind::IntLiteral,
                TokenKind::Or,
                TokenKind::Identifier,
                TokenKind::Contains,
                TokenKind::StringLiteral,
            ]
        );
    }

    #[test]
    fn tokenize_records_positions() {
        let tokens = tokenize("(message.length>=3)");
        let positions: Vec<usize> = tokens.iter().map(|token| token.position).collect();
        assert_eq!(positions, vec![0, 1, 15, 17, 18]);
        assert_eq!(tokens[2].lexeme, ">=");
    }

    #[test]
    fn tokenize_string_with_escaped_quote() {
        let tokens = tokenize(r#"message.content == "say \"hi\"" "#);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[2].lexeme, r#""say \"hi\"""#);
        assert_eq!(decode_string_literal(&tokens[2].lexeme), r#"say "hi""#);
    }

    #[test]
    fn tokenize_unterminated_string_is_invalid() {
        let tokens = tokenize(r#"author.name == "abc"#);
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::Invalid);
        assert_eq!(last.lexeme, "\"abc");
        assert_eq!(last.position, 15);
    }

    #[test]
    fn tokenize_splits_operator_runs() {
        assert_eq!(
            kinds("!!author.subscribed"),
            vec![TokenKind::Not, TokenKind::Not, TokenKind::Identifier]
        );
        assert_eq!(
            kinds("author.subscribed&&!author.no_color"),
            vec![
                TokenKind::Identifier,
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Identifier
            ]
        );
    }

    #[test]
    fn tokenize_unknown_operator_run_is_single_invalid() {
        let tokens = tokenize("message.length =< 3");
        assert_eq!(tokens[1].kind, TokenKind::Invalid);
        assert_eq!(tokens[1].lexeme, "=<");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn tokenize_classifies_words() {
        assert_eq!(kinds("contains"), vec![TokenKind::Contains]);
        assert_eq!(kinds("42"), vec![TokenKind::IntLiteral]);
        assert_eq!(kinds("author.unknown_field"), vec![TokenKind::Invalid]);
        assert_eq!(kinds("Contains"), vec![TokenKind::Invalid]);
        assert_eq!(kinds("1.5"), vec![TokenKind::Invalid]);
    }

    #[test]
    fn tokenize_unexpected_characters() {
        let tokens = tokenize("message.length > 3 # é");
        assert_eq!(tokens[3].kind, TokenKind::Invalid);
        assert_eq!(tokens[3].lexeme, "#");
        // `é` is a word character, so it is an unknown word rather than a symbol.
        assert_eq!(tokens[4].kind, TokenKind::Invalid);
        assert_eq!(tokens[4].lexeme, "é");
    }

    #[test]
    fn tokenize_ignores_whitespace_only_input() {
        assert!(tokenize("  \t\n ").is_empty());
    }

    #[test]
    fn decode_drops_escape_backslashes() {
        assert_eq!(decode_string_literal(r#""a\\b""#), r"a\b");
        assert_eq!(decode_string_literal(r#""""#), "");
    }

    #[test]
    fn stream_peeks_without_consuming() {
        let tokens = tokenize("( author.subscribed )");
        let mut stream = TokenStream::new(&tokens, 21);
        assert_eq!(stream.peek_kind(), Some(TokenKind::LParen));
        assert_eq!(stream.peek_kind(), Some(TokenKind::LParen));
        assert!(stream.next_if(TokenKind::RParen).is_none());
        assert!(stream.next_if(TokenKind::LParen).is_some());
        assert_eq!(stream.next().map(|token| token.kind), Some(TokenKind::Identifier));
        assert_eq!(stream.position(), 20);
        stream.next();
        assert!(stream.is_at_end());
        assert_eq!(stream.position(), 21);
    }
}
