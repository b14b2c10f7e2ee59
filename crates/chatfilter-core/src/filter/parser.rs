use crate::domain::Color;
use crate::filter::ast::{CompareOp, Expression, Value};
use crate::filter::registry::{Attribute, ValueType};
use crate::filter::token::{
    decode_string_literal, is_operator_char, is_word_char, tokenize, Token, TokenKind, TokenStream,
};
use crate::filter::FilterError;

/// Deepest nesting of parentheses and `!` the parser accepts. Flat `&&`
/// and `||` chains do not nest and may have any number of operands.
pub const MAX_NESTING: usize = 256;

pub fn parse(text: &str) -> Result<Expression, FilterError> {
    let tokens = tokenize(text);
    parse_tokens(&tokens, text.len())
}

/// Parses an already tokenized filter. `end_position` is reported for errors
/// at end of input, normally the length of the filter text.
pub fn parse_tokens(tokens: &[Token], end_position: usize) -> Result<Expression, FilterError> {
    if let Some(token) = tokens.iter().find(|token| token.kind == TokenKind::Invalid) {
        return Err(invalid_token_error(token));
    }
    if tokens.is_empty() {
        return Err(FilterError::Empty);
    }

    let mut parser = Parser {
        stream: TokenStream::new(tokens, end_position),
    };
    let expr = parser.expression(0)?;

    match parser.stream.peek() {
        None => Ok(expr),
        Some(token) if token.kind == TokenKind::RParen => Err(FilterError::UnbalancedParenthesis {
            position: token.position,
        }),
        Some(token) => Err(FilterError::UnexpectedToken {
            expected: "`&&`, `||` or end of filter",
            found: token.lexeme.clone(),
            position: token.position,
        }),
    }
}

fn invalid_token_error(token: &Token) -> FilterError {
    let position = token.position;
    match token.lexeme.chars().next() {
        Some('"') => FilterError::UnterminatedString { position },
        Some(ch) if ch.is_ascii_digit() => FilterError::InvalidInteger {
            lexeme: token.lexeme.clone(),
            position,
        },
        Some(ch) if is_word_char(ch) => FilterError::UnknownAttribute {
            name: token.lexeme.clone(),
            position,
        },
        Some(ch) if is_operator_char(ch) => FilterError::UnknownOperator {
            lexeme: token.lexeme.clone(),
            position,
        },
        _ => FilterError::UnexpectedCharacter {
            lexeme: token.lexeme.clone(),
            position,
        },
    }
}

struct Parser<'a> {
    stream: TokenStream<'a>,
}

impl<'a> Parser<'a> {
    // expression := and_expr ( OR and_expr )*
    fn expression(&mut self, nesting: usize) -> Result<Expression, FilterError> {
        let first = self.and_expr(nesting)?;
        if self.stream.peek_kind() != Some(TokenKind::Or) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.stream.next_if(TokenKind::Or).is_some() {
            operands.push(self.and_expr(nesting)?);
        }
        Ok(Expression::or(operands))
    }

    // and_expr := unary ( AND unary )*
    fn and_expr(&mut self, nesting: usize) -> Result<Expression, FilterError> {
        let first = self.unary(nesting)?;
        if self.stream.peek_kind() != Some(TokenKind::And) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.stream.next_if(TokenKind::And).is_some() {
            operands.push(self.unary(nesting)?);
        }
        Ok(Expression::and(operands))
    }

    // unary := NOT unary | condition
    fn unary(&mut self, nesting: usize) -> Result<Expression, FilterError> {
        if let Some(op) = self.stream.next_if(TokenKind::Not) {
            let operand = self.unary(nested(nesting, op.position)?)?;
            return Ok(Expression::not(operand));
        }
        self.condition(nesting)
    }

    // condition := LPAREN expression RPAREN | value ( compare_op value )?
    fn condition(&mut self, nesting: usize) -> Result<Expression, FilterError> {
        if let Some(open) = self.stream.next_if(TokenKind::LParen) {
            let inner = self.expression(nested(nesting, open.position)?)?;
            if self.stream.next_if(TokenKind::RParen).is_none() {
                return Err(FilterError::UnbalancedParenthesis {
                    position: open.position,
                });
            }
            return Ok(inner);
        }

        let (left, left_token) = self.value()?;
        let op_token = match self.stream.peek() {
            Some(token) if token.kind.is_compare_op() => token,
            _ => {
                let found = left.value_type();
                if found != ValueType::Bool {
                    return Err(FilterError::NotBoolean {
                        found,
                        position: left_token.position,
                    });
                }
                return Ok(left);
            }
        };
        self.stream.next();

        let (right, right_token) = self.value()?;
        let op = compare_op(op_token.kind);
        check_comparison(op, op_token, (left, left_token), (right, right_token))
    }

    // value := IDENTIFIER | STRING_LITERAL | INT_LITERAL
    fn value(&mut self) -> Result<(Expression, &'a Token), FilterError> {
        let position = self.stream.position();
        let Some(token) = self.stream.next() else {
            return Err(FilterError::UnexpectedEnd {
                expected: "a value",
                position,
            });
        };

        let expr = match token.kind {
            TokenKind::Identifier => {
                let attribute = Attribute::lookup(&token.lexeme).ok_or_else(|| {
                    FilterError::UnknownAttribute {
                        name: token.lexeme.clone(),
                        position: token.position,
                    }
                })?;
                Expression::identifier(attribute)
            }
            TokenKind::StringLiteral => {
                Expression::literal(Value::String(decode_string_literal(&token.lexeme)))
            }
            TokenKind::IntLiteral => {
                let value = token
                    .lexeme
                    .parse::<i64>()
                    .map_err(|_| FilterError::InvalidInteger {
                        lexeme: token.lexeme.clone(),
                        position: token.position,
                    })?;
                Expression::literal(Value::Int(value))
            }
            TokenKind::Invalid => return Err(invalid_token_error(token)),
            _ => {
                return Err(FilterError::UnexpectedToken {
                    expected: "a value",
                    found: token.lexeme.clone(),
                    position: token.position,
                })
            }
        };
        Ok((expr, token))
    }
}

// Nesting level inside a `(` or `!` found at `position`.
fn nested(nesting: usize, position: usize) -> Result<usize, FilterError> {
    if nesting >= MAX_NESTING {
        return Err(FilterError::TooDeep { position });
    }
    Ok(nesting + 1)
}

fn compare_op(kind: TokenKind) -> CompareOp {
    match kind {
        TokenKind::Eq => CompareOp::Eq,
        TokenKind::Neq => CompareOp::Neq,
        TokenKind::Lt => CompareOp::Lt,
        TokenKind::Gt => CompareOp::Gt,
        TokenKind::Lte => CompareOp::Lte,
        TokenKind::Gte => CompareOp::Gte,
        TokenKind::Contains => CompareOp::Contains,
        other => unreachable!("`{other}` is not a comparison operator"),
    }
}

fn check_comparison(
    op: CompareOp,
    op_token: &Token,
    left: (Expression, &Token),
    right: (Expression, &Token),
) -> Result<Expression, FilterError> {
    let (left, left_token) = left;
    let (right, right_token) = right;

    // A string literal facing a color operand is read as a color.
    let left = coerce_color(left, left_token, right.value_type())?;
    let right = coerce_color(right, right_token, left.value_type())?;

    let left_type = left.value_type();
    let right_type = right.value_type();
    let allowed = match left_type {
        ValueType::Bool | ValueType::Color => {
            matches!(op, CompareOp::Eq | CompareOp::Neq) && right_type == left_type
        }
        ValueType::Int => op != CompareOp::Contains && right_type == ValueType::Int,
        ValueType::String => {
            matches!(op, CompareOp::Eq | CompareOp::Neq | CompareOp::Contains)
                && right_type == ValueType::String
        }
        ValueType::StringList => op == CompareOp::Contains && right_type == ValueType::String,
    };

    if !allowed {
        return Err(FilterError::OperatorMismatch {
            op,
            left: left_type,
            right: right_type,
            position: op_token.position,
        });
    }
    Ok(Expression::comparison(op, left, right))
}

fn coerce_color(
    expr: Expression,
    token: &Token,
    other: ValueType,
) -> Result<Expression, FilterError> {
    if other != ValueType::Color {
        return Ok(expr);
    }
    match expr {
        Expression::Literal {
            value: Value::String(raw),
        } => {
            let color = Color::parse(&raw).map_err(|_| FilterError::InvalidColor {
                literal: raw.clone(),
                position: token.position,
            })?;
            Ok(Expression::literal(Value::Color(color)))
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, MAX_NESTING};
    use crate::domain::Color;
    use crate::filter::ast::{CompareOp, Expression, Value};
    use crate::filter::registry::{Attribute, ValueType};
    use crate::filter::{FilterError, FilterErrorKind};

    fn ident(attribute: Attribute) -> Expression {
        Expression::identifier(attribute)
    }

    #[test]
    fn parse_bare_bool_attribute() {
        assert_eq!(
            parse("author.subscribed").unwrap(),
            ident(Attribute::AuthorSubscribed)
        );
    }

    #[test]
    fn parse_and_binds_tighter_than_or() {
        let expr = parse("author.subscribed || author.no_color && message.length > 3").unwrap();
        assert_eq!(
            expr,
            Expression::or(vec![
                ident(Attribute::AuthorSubscribed),
                Expression::and(vec![
                    ident(Attribute::AuthorNoColor),
                    Expression::comparison(
                        CompareOp::Gt,
                        ident(Attribute::MessageLength),
                        Expression::literal(Value::Int(3)),
                    ),
                ]),
            ])
        );
    }

    #[test]
    fn parse_logical_chains_stay_flat() {
        let expr = parse("author.subscribed && author.no_color && author.subscribed").unwrap();
        assert_eq!(
            expr,
            Expression::and(vec![
                ident(Attribute::AuthorSubscribed),
                ident(Attribute::AuthorNoColor),
                ident(Attribute::AuthorSubscribed),
            ])
        );

        let grouped = parse("(author.subscribed && author.no_color) && author.subscribed").unwrap();
        assert_eq!(
            grouped,
            Expression::and(vec![
                Expression::and(vec![
                    ident(Attribute::AuthorSubscribed),
                    ident(Attribute::AuthorNoColor),
                ]),
                ident(Attribute::AuthorSubscribed),
            ])
        );
    }

    #[test]
    fn parse_parentheses_regroup() {
        let expr = parse("(author.subscribed || author.no_color) && author.subscribed").unwrap();
        assert!(matches!(expr, Expression::And { .. }));
    }

    #[test]
    fn parse_not_binds_to_single_condition() {
        let expr = parse("!author.subscribed && author.no_color").unwrap();
        assert_eq!(
            expr,
            Expression::and(vec![
                Expression::not(ident(Attribute::AuthorSubscribed)),
                ident(Attribute::AuthorNoColor),
            ])
        );
    }

    #[test]
    fn parse_decodes_string_literals() {
        let expr = parse(r#"message.content contains "\"quoted\"""#).unwrap();
        assert_eq!(
            expr,
            Expression::comparison(
                CompareOp::Contains,
                ident(Attribute::MessageContent),
                Expression::literal(Value::String("\"quoted\"".to_string())),
            )
        );
    }

    #[test]
    fn parse_color_literal_is_decoded() {
        let expr = parse(r##"author.color == "#FF0000""##).unwrap();
        assert_eq!(
            expr,
            Expression::comparison(
                CompareOp::Eq,
                ident(Attribute::AuthorColor),
                Expression::literal(Value::Color(Color::rgb(255, 0, 0))),
            )
        );
        let flipped = parse(r##""#f00" != author.color"##).unwrap();
        assert!(matches!(flipped, Expression::Comparison { op: CompareOp::Neq, .. }));
    }

    #[test]
    fn parse_rejects_invalid_color_literal() {
        let err = parse(r#"author.color == "red""#).unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidColor {
                literal: "red".to_string(),
                position: 16,
            }
        );
        assert_eq!(err.kind(), FilterErrorKind::Type);
    }

    #[test]
    fn parse_rejects_int_compared_with_string() {
        let err = parse(r#"message.length > "abc""#).unwrap_err();
        assert_eq!(
            err,
            FilterError::OperatorMismatch {
                op: CompareOp::Gt,
                left: ValueType::Int,
                right: ValueType::String,
                position: 15,
            }
        );
    }

    #[test]
    fn parse_enforces_operator_table() {
        let rejected = [
            "author.subscribed > author.no_color",
            r#"message.content < "a""#,
            r#"author.badges == "vip""#,
            "message.length contains 3",
            r##"author.color contains "#fff""##,
            r#"author.name contains author.badges"#,
        ];
        for text in rejected {
            let err = parse(text).unwrap_err();
            assert!(
                matches!(err, FilterError::OperatorMismatch { .. }),
                "{text}: {err:?}"
            );
        }

        let accepted = [
            "author.subscribed == author.no_color",
            "author.subscribed != author.no_color",
            "message.length <= author.subscription_length",
            "1 < 2",
            r#"author.name == "bob""#,
            r#"author.name contains "ob""#,
            r#"author.badges contains "vip""#,
            r#"author.badges contains author.name"#,
            r##"author.color != "#00000000""##,
        ];
        for text in accepted {
            assert!(parse(text).is_ok(), "{text}");
        }
    }

    #[test]
    fn parse_rejects_bare_non_bool_values() {
        for (text, found) in [
            ("message.content", ValueType::String),
            ("message.length", ValueType::Int),
            ("author.color", ValueType::Color),
            ("author.badges", ValueType::StringList),
            (r#""text""#, ValueType::String),
            ("7", ValueType::Int),
        ] {
            assert_eq!(
                parse(text).unwrap_err(),
                FilterError::NotBoolean { found, position: 0 }
            );
        }
    }

    #[test]
    fn parse_reports_unknown_attribute() {
        let err = parse(r#"author.unknown_field == "x""#).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnknownAttribute {
                name: "author.unknown_field".to_string(),
                position: 0,
            }
        );
        assert_eq!(err.kind(), FilterErrorKind::Type);
    }

    #[test]
    fn parse_reports_lex_errors() {
        let err = parse(r#"author.name == "abc"#).unwrap_err();
        assert_eq!(err, FilterError::UnterminatedString { position: 15 });
        assert_eq!(err.kind(), FilterErrorKind::Lex);

        let err = parse("message.length => 3").unwrap_err();
        assert_eq!(
            err,
            FilterError::UnknownOperator {
                lexeme: "=>".to_string(),
                position: 15,
            }
        );

        let err = parse("message.length > 99999999999999999999").unwrap_err();
        assert!(matches!(err, FilterError::InvalidInteger { position: 17, .. }));

        let err = parse("author.subscribed $").unwrap_err();
        assert_eq!(err.kind(), FilterErrorKind::Lex);
        assert_eq!(err.position(), 18);
    }

    #[test]
    fn parse_reports_unbalanced_parentheses() {
        assert_eq!(
            parse("(author.subscribed").unwrap_err(),
            FilterError::UnbalancedParenthesis { position: 0 }
        );
        assert_eq!(
            parse("author.subscribed)").unwrap_err(),
            FilterError::UnbalancedParenthesis { position: 17 }
        );
        assert_eq!(
            parse("((author.subscribed)").unwrap_err().kind(),
            FilterErrorKind::Syntax
        );
    }

    #[test]
    fn parse_reports_syntax_errors() {
        assert_eq!(parse("").unwrap_err(), FilterError::Empty);
        assert_eq!(parse("   ").unwrap_err(), FilterError::Empty);
        assert_eq!(
            parse("author.subscribed &&").unwrap_err(),
            FilterError::UnexpectedEnd {
                expected: "a value",
                position: 20,
            }
        );
        assert_eq!(
            parse("&& author.subscribed").unwrap_err(),
            FilterError::UnexpectedToken {
                expected: "a value",
                found: "&&".to_string(),
                position: 0,
            }
        );
        assert!(matches!(
            parse("author.subscribed author.no_color").unwrap_err(),
            FilterError::UnexpectedToken { position: 18, .. }
        ));
        assert!(matches!(
            parse("message.length > 1 > 0").unwrap_err(),
            FilterError::UnexpectedToken { position: 19, .. }
        ));
        assert_eq!(parse("()").unwrap_err().kind(), FilterErrorKind::Syntax);
    }

    #[test]
    fn parse_limits_nesting() {
        let deep = format!(
            "{}author.subscribed{}",
            "(".repeat(MAX_NESTING + 1),
            ")".repeat(MAX_NESTING + 1)
        );
        assert!(matches!(
            parse(&deep).unwrap_err(),
            FilterError::TooDeep { .. }
        ));

        let negations = format!("{}author.subscribed", "!".repeat(MAX_NESTING * 4));
        assert!(matches!(
            parse(&negations).unwrap_err(),
            FilterError::TooDeep { .. }
        ));

        let limit = format!(
            "{}author.subscribed{}",
            "(".repeat(MAX_NESTING),
            ")".repeat(MAX_NESTING)
        );
        assert!(parse(&limit).is_ok());
    }

    #[test]
    fn parse_long_flat_chains() {
        let names: Vec<String> = (0..1000).map(|n| format!(r#"author.name == "user{n}""#)).collect();
        match parse(&names.join(" || ")).unwrap() {
            Expression::Or { operands } => assert_eq!(operands.len(), 1000),
            other => panic!("expected a flat or, got {other:?}"),
        }

        let negated = vec!["!author.subscribed"; 1000].join(" && ");
        match parse(&negated).unwrap() {
            Expression::And { operands } => assert_eq!(operands.len(), 1000),
            other => panic!("expected a flat and, got {other:?}"),
        }
    }

    #[test]
    fn display_output_reparses_to_same_tree() {
        let text = r##"!(author.subscribed || author.badges contains "a\\b") && author.color == "#abc""##;
        let expr = parse(text).unwrap();
        assert_eq!(parse(&expr.to_string()).unwrap(), expr);
    }
}
