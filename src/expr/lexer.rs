use std::fmt;

use crate::error::SkinError;
use crate::limits::Limits;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Run of non-special characters: a numeric literal or a leaf name.
    Word(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Underscore,
    Comma,
    Gt,
    Lt,
    Eq,
    EqEq,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Word(word) => return f.write_str(word),
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Underscore => "_",
            Self::Comma => ",",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Eq => "=",
            Self::EqEq => "==",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character in the original input.
    pub pos: usize,
}

const SPECIAL_CHARS: [char; 12] = ['+', '*', '/', '-', '%', '(', ')', '_', ',', '>', '<', '='];

fn is_special(c: char) -> bool {
    SPECIAL_CHARS.contains(&c)
}

/// Splits `input` into tokens after discarding all whitespace.
///
/// Whitespace does not separate words: `"1 1"` lexes as the single word `11`.
/// `_` opens a function token only at the start of input or right after
/// another special character; elsewhere it is part of a name.
pub fn tokenize(input: &str, limits: &Limits) -> Result<Vec<Token>, SkinError> {
    if input.len() > limits.max_expression_len {
        return Err(SkinError::ExpressionTooLong {
            len: input.len(),
            max: limits.max_expression_len,
        });
    }

    let trimmed: Vec<(usize, char)> = input
        .char_indices()
        .filter(|(_, c)| !c.is_whitespace())
        .collect();

    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut word_pos = 0;
    let mut i = 0;

    while i < trimmed.len() {
        let (pos, ch) = trimmed[i];
        let follows_special = i == 0 || is_special(trimmed[i - 1].1);

        if !is_special(ch) || (ch == '_' && !follows_special) {
            if word.is_empty() {
                word_pos = pos;
            }
            word.push(ch);
            if word.len() > limits.max_token_len {
                return Err(SkinError::TokenTooLong {
                    pos: word_pos,
                    max: limits.max_token_len,
                });
            }
            i += 1;
            continue;
        }

        flush_word(&mut tokens, &mut word, word_pos);

        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '_' => TokenKind::Underscore,
            ',' => TokenKind::Comma,
            '>' => TokenKind::Gt,
            '<' => TokenKind::Lt,
            '=' => {
                if matches!(trimmed.get(i + 1), Some((_, '='))) {
                    i += 1;
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            _ => unreachable!("checked by is_special"),
        };
        tokens.push(Token { kind, pos });
        i += 1;
    }
    flush_word(&mut tokens, &mut word, word_pos);

    if tokens.len() > limits.max_tokens {
        return Err(SkinError::TooManyTokens {
            max: limits.max_tokens,
        });
    }

    Ok(tokens)
}

fn flush_word(tokens: &mut Vec<Token>, word: &mut String, pos: usize) {
    if !word.is_empty() {
        tokens.push(Token {
            kind: TokenKind::Word(std::mem::take(word)),
            pos,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{tokenize, TokenKind};
    use crate::limits::Limits;

    fn kinds(input: &str) -> Vec<String> {
        tokenize(input, &Limits::default())
            .unwrap()
            .into_iter()
            .map(|t| t.kind.to_string())
            .collect()
    }

    #[test]
    fn splits_on_special_characters() {
        assert_eq!(kinds("1 + (2*3)"), ["1", "+", "(", "2", "*", "3", ")"]);
        assert_eq!(kinds("_add  ( 1.1 , 1)"), ["_", "add", "(", "1.1", ",", "1", ")"]);
    }

    #[test]
    fn whitespace_joins_words() {
        assert_eq!(kinds("_add(1 1)"), ["_", "add", "(", "11", ")"]);
    }

    #[test]
    fn underscore_is_context_sensitive() {
        assert_eq!(kinds("example_x + 1"), ["example_x", "+", "1"]);
        assert_eq!(kinds("__add(1, 1)"), ["_", "_", "add", "(", "1", ",", "1", ")"]);
        assert_eq!(kinds("1+_max(a_b,2)"), ["1", "+", "_", "max", "(", "a_b", ",", "2", ")"]);
    }

    #[test]
    fn equals_pairs_and_lone_equals() {
        assert_eq!(kinds("1 == -1"), ["1", "==", "-", "1"]);
        let tokens = tokenize("1 = 1", &Limits::default()).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Eq);
    }

    #[test]
    fn positions_refer_to_original_input() {
        let tokens = tokenize("  1 +  foo", &Limits::default()).unwrap();
        assert_eq!(tokens[0].pos, 2);
        assert_eq!(tokens[1].pos, 4);
        assert_eq!(tokens[2].pos, 7);
    }

    #[test]
    fn enforces_length_limits() {
        let limits = Limits {
            max_expression_len: 8,
            max_token_len: 3,
            max_tokens: 3,
            ..Limits::default()
        };
        let err = tokenize("1 + 2 + 3 + 4", &limits).unwrap_err();
        assert!(err.to_string().contains("exceeds max expression length 8"));

        let err = tokenize("1234", &limits).unwrap_err();
        assert!(err.to_string().contains("exceeds max token length 3"));

        let err = tokenize("1+2+3", &limits).unwrap_err();
        assert!(err.to_string().contains("exceeds max token count 3"));
    }
}
