//! Tokenizer for Kindle assembly text.

use crate::error::AsmError;

/// A single token from an assembly line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// `.name`, lowercased, without the dot.
    Directive(String),
    /// A mnemonic or keyword, case preserved.
    Ident(String),
    /// `rN`.
    Register(u8),
    /// `[N]`.
    Index(u8),
    /// A numeric literal, kept as written so the parser can choose its type.
    Number(String),
}

/// Tokenize a single line of assembly text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `;` and extend to end of line.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    let line = match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    };

    line.split_whitespace()
        .map(|word| tokenize_word(word, line_num))
        .collect()
}

fn tokenize_word(word: &str, line_num: usize) -> Result<Token, AsmError> {
    let invalid = || AsmError::InvalidNumber {
        line: line_num,
        token: word.to_string(),
    };

    if let Some(name) = word.strip_prefix('.') {
        return Ok(Token::Directive(name.to_ascii_lowercase()));
    }
    if let Some(inner) = word.strip_prefix('[') {
        let digits = inner.strip_suffix(']').ok_or_else(invalid)?;
        return digits.parse().map(Token::Index).map_err(|_| invalid());
    }
    if let Some(digits) = word.strip_prefix(['r', 'R']) {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return digits.parse().map(Token::Register).map_err(|_| invalid());
        }
    }

    let starts_numeric = word
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.'));
    if starts_numeric {
        Ok(Token::Number(word.to_string()))
    } else {
        Ok(Token::Ident(word.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line() {
        assert_eq!(tokenize_line("", 1).unwrap(), vec![]);
    }

    #[test]
    fn comment_only() {
        assert_eq!(tokenize_line("  ; load the answer", 1).unwrap(), vec![]);
    }

    #[test]
    fn instruction_with_register() {
        assert_eq!(
            tokenize_line("Star r12 ; spill", 1).unwrap(),
            vec![Token::Ident("Star".to_string()), Token::Register(12)]
        );
    }

    #[test]
    fn uppercase_register_prefix() {
        assert_eq!(tokenize_line("R3", 1).unwrap(), vec![Token::Register(3)]);
    }

    #[test]
    fn identifiers_starting_with_r_are_not_registers() {
        assert_eq!(
            tokenize_line("Return", 1).unwrap(),
            vec![Token::Ident("Return".to_string())]
        );
    }

    #[test]
    fn constant_index() {
        assert_eq!(
            tokenize_line("LdaConstant [7]", 1).unwrap(),
            vec![Token::Ident("LdaConstant".to_string()), Token::Index(7)]
        );
    }

    #[test]
    fn directive_is_lowercased() {
        assert_eq!(
            tokenize_line(".Registers 4", 1).unwrap(),
            vec![
                Token::Directive("registers".to_string()),
                Token::Number("4".to_string())
            ]
        );
    }

    #[test]
    fn numbers_keep_their_text() {
        assert_eq!(
            tokenize_line("-0.0 1e300 +5", 1).unwrap(),
            vec![
                Token::Number("-0.0".to_string()),
                Token::Number("1e300".to_string()),
                Token::Number("+5".to_string()),
            ]
        );
    }

    #[test]
    fn register_out_of_range() {
        let err = tokenize_line("Ldar r256", 4).unwrap_err();
        assert_eq!(
            err,
            AsmError::InvalidNumber {
                line: 4,
                token: "r256".to_string()
            }
        );
    }

    #[test]
    fn unterminated_index() {
        let err = tokenize_line("LdaConstant [3", 2).unwrap_err();
        assert!(matches!(err, AsmError::InvalidNumber { line: 2, .. }));
    }
}
