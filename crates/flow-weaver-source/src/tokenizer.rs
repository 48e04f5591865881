//! Annotation tag tokenizer (`spec.md §4.B`): a hand-rolled keyword
//! tokenizer for tag bodies, deliberately not regex-only dispatch — tag
//! grammars mix identifiers, quoted strings with escapes, bracketed
//! attribute lists, and arrow separators that a single regex can't cleanly
//! disambiguate.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    String(String),
    Number(f64),
    Arrow,      // ->
    Colon,      // :
    Comma,      // ,
    Dot,        // .
    Equals,     // =
    LBracket,   // [
    RBracket,   // ]
    LParen,     // (
    RParen,     // )
}

#[derive(Debug, Error, PartialEq)]
pub enum TokenizeError {
    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),
    #[error("unexpected character '{0}' at byte {1}")]
    UnexpectedChar(char, usize),
}

/// Tokenizes a single tag body (the text following `@tagName`).
pub fn tokenize(body: &str) -> Result<Vec<Token>, TokenizeError> {
    let chars: Vec<char> = body.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => {
                i += 1;
            }
            '-' if chars.get(i + 1) == Some(&'>') => {
                tokens.push(Token::Arrow);
                i += 2;
            }
            ':' => {
                tokens.push(Token::Colon);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Equals);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '"' => {
                let start = i;
                i += 1;
                let mut s = String::new();
                loop {
                    match chars.get(i) {
                        None => return Err(TokenizeError::UnterminatedString(start)),
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            i += 1;
                            match chars.get(i) {
                                Some('"') => s.push('"'),
                                Some('\\') => s.push('\\'),
                                Some('n') => s.push('\n'),
                                Some(other) => s.push(*other),
                                None => return Err(TokenizeError::UnterminatedString(start)),
                            }
                            i += 1;
                        }
                        Some(other) => {
                            s.push(*other);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::String(s));
            }
            c if c.is_ascii_digit() || (c == '-' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())) => {
                let start = i;
                i += 1;
                while chars.get(i).is_some_and(|d| d.is_ascii_digit() || *d == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n: f64 = text.parse().map_err(|_| TokenizeError::UnexpectedChar(c, start))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_alphanumeric() || c == '_' || c == '@' || c == '/' || c == '*' || c == '$' => {
                let start = i;
                while chars
                    .get(i)
                    .is_some_and(|d| d.is_alphanumeric() || *d == '_' || *d == '@' || *d == '/' || *d == '*' || *d == '$')
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token::Ident(text));
            }
            other => return Err(TokenizeError::UnexpectedChar(other, i)),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_line_tokenizes() {
        let toks = tokenize("a.onSuccess -> b.execute").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Ident("a".into()),
                Token::Dot,
                Token::Ident("onSuccess".into()),
                Token::Arrow,
                Token::Ident("b".into()),
                Token::Dot,
                Token::Ident("execute".into()),
            ]
        );
    }

    #[test]
    fn attribute_block_with_escaped_string() {
        let toks = tokenize(r#"label:"say \"hi\""#).unwrap();
        assert_eq!(
            toks,
            vec![Token::Ident("label".into()), Token::Colon, Token::String("say \"hi".into())]
        );
    }

    #[test]
    fn bracketed_order_attribute() {
        let toks = tokenize("[order:3]").unwrap();
        assert_eq!(
            toks,
            vec![Token::LBracket, Token::Ident("order".into()), Token::Colon, Token::Number(3.0), Token::RBracket]
        );
    }

    #[test]
    fn unterminated_string_is_reported() {
        let err = tokenize(r#"label:"oops"#).unwrap_err();
        assert!(matches!(err, TokenizeError::UnterminatedString(_)));
    }
}
