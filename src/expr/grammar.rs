//! Parser implementation using chumsky

use chumsky::error::RichPattern;
use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::ast::{CompareOp, Expr, Literal};
use super::lexer::{lex, Token};
use super::ExprError;

/// Parse a test expression into an AST
///
/// Only the first syntax error is reported; expressions are short enough
/// that one error pinpoints the problem.
pub fn parse(input: &str) -> Result<Expr, ExprError> {
    let len = input.len();
    let tokens = lex(input)?;

    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream =
        Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    expression_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| match errs.into_iter().next() {
            Some(err) => syntax_error(err),
            None => ExprError::Syntax {
                span: 0..len,
                message: "Invalid expression".to_string(),
            },
        })
}

fn expression_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let literal = select! {
            Token::Number(n) => Expr::Literal(Literal::Number(n)),
            Token::String(s) => Expr::Literal(Literal::String(s)),
            Token::True => Expr::Literal(Literal::Bool(true)),
            Token::False => Expr::Literal(Literal::Bool(false)),
            Token::Null => Expr::Literal(Literal::Null),
        };

        // Variable reference: identifier { "." identifier }
        let path = select! { Token::Ident(s) => s }
            .separated_by(just(Token::Dot))
            .at_least(1)
            .collect::<Vec<_>>()
            .map(Expr::Path);

        let atom = choice((
            literal,
            path,
            expr.delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        ));

        let compare_op = select! {
            Token::Equals => CompareOp::Equals,
            Token::NotEquals => CompareOp::NotEquals,
            Token::Less => CompareOp::Less,
            Token::LessOrEqual => CompareOp::LessOrEqual,
            Token::Greater => CompareOp::Greater,
            Token::GreaterOrEqual => CompareOp::GreaterOrEqual,
        };

        // Comparisons do not chain: `a = b = c` is a syntax error
        let comparison = atom
            .clone()
            .then(compare_op.then(atom).or_not())
            .map(|(left, rest)| match rest {
                Some((op, right)) => Expr::compare(op, left, right),
                None => left,
            });

        let negation = just(Token::Not)
            .repeated()
            .collect::<Vec<_>>()
            .then(comparison)
            .map(|(nots, inner)| {
                nots.iter()
                    .fold(inner, |acc, _| Expr::Not(Box::new(acc)))
            });

        let conjunction = negation
            .clone()
            .then(
                just(Token::And)
                    .ignore_then(negation)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| {
                rest.into_iter()
                    .fold(first, |l, r| Expr::And(Box::new(l), Box::new(r)))
            });

        conjunction
            .clone()
            .then(
                just(Token::Or)
                    .ignore_then(conjunction)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| {
                rest.into_iter()
                    .fold(first, |l, r| Expr::Or(Box::new(l), Box::new(r)))
            })
            .boxed()
    })
}

fn syntax_error(err: Rich<'_, Token>) -> ExprError {
    let message = match err.found() {
        Some(tok) => format!("Unexpected {}", describe(tok)),
        None => "Unexpected end of input".to_string(),
    };

    let expected: Vec<String> = err
        .expected()
        .filter_map(|pattern| match pattern {
            RichPattern::Token(tok) => Some(describe(tok)),
            RichPattern::Label(label) => Some(label.to_string()),
            RichPattern::EndOfInput => Some("end of input".to_string()),
            _ => None,
        })
        .collect();

    let message = if expected.is_empty() {
        message
    } else {
        format!("{}, expected {}", message, expected.join(" or "))
    };

    ExprError::Syntax {
        span: err.span().into_range(),
        message,
    }
}

/// Format a token for human-readable error messages
fn describe(tok: &Token) -> String {
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::String(s) => format!("string '{}'", s),
        Token::Number(n) => format!("number {}", n),
        Token::True => "'true'".to_string(),
        Token::False => "'false'".to_string(),
        Token::Null => "'null'".to_string(),
        Token::And => "'&&'".to_string(),
        Token::Or => "'||'".to_string(),
        Token::Not => "'!'".to_string(),
        Token::Equals => "'='".to_string(),
        Token::NotEquals => "'!='".to_string(),
        Token::Less => "'<'".to_string(),
        Token::LessOrEqual => "'<='".to_string(),
        Token::Greater => "'>'".to_string(),
        Token::GreaterOrEqual => "'>='".to_string(),
        Token::ParenOpen => "'('".to_string(),
        Token::ParenClose => "')'".to_string(),
        Token::Dot => "'.'".to_string(),
    }
}
