/*
 * Character Codes
 *
 * Shared by the markup lexer, the expression lexer and the path resolvers
 */
#![allow(non_upper_case_globals)]

pub const EOF: char = '\0';
pub const NEWLINE: char = '\n';
const NBSP: char = '\u{00A0}';

pub const BANG: char = '!';
pub const DQ: char = '"';
const DOLLAR: char = '$';
pub const PERCENT: char = '%';
pub const AMPERSAND: char = '&';
pub const SQ: char = '\'';
pub const LPAREN: char = '(';
pub const RPAREN: char = ')';
pub const STAR: char = '*';
pub const PLUS: char = '+';
pub const COMMA: char = ',';
pub const MINUS: char = '-';
pub const PERIOD: char = '.';
pub const SLASH: char = '/';
pub const COLON: char = ':';
pub const SEMICOLON: char = ';';
pub const LT: char = '<';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const QUESTION: char = '?';
pub const LBRACKET: char = '[';
pub const BACKSLASH: char = '\\';
pub const RBRACKET: char = ']';
pub const UNDERSCORE: char = '_';
const BT: char = '`';
pub const LBRACE: char = '{';
pub const BAR: char = '|';
pub const RBRACE: char = '}';

// Exponent markers
pub const E: char = 'E';
pub const e: char = 'e';

/// Control characters, space and NBSP
pub fn is_whitespace(ch: char) -> bool {
    ch <= ' ' || ch == NBSP
}

pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

pub fn is_ascii_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

pub fn is_quote(ch: char) -> bool {
    ch == SQ || ch == DQ || ch == BT
}

/// ASCII letters, `_`, `$` and any non-ASCII letter
pub fn is_identifier_start(ch: char) -> bool {
    is_ascii_letter(ch) || ch == UNDERSCORE || ch == DOLLAR || (!ch.is_ascii() && ch.is_alphabetic())
}

pub fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || is_digit(ch)
}

/// Cyrillic block, including the supplement used by legacy module names
pub fn is_cyrillic(ch: char) -> bool {
    ('\u{0400}'..='\u{052F}').contains(&ch)
}

/// Check if character terminates a tag or attribute name
pub fn is_name_end(ch: char) -> bool {
    is_whitespace(ch) || ch == GT || ch == LT || ch == SLASH || ch == SQ || ch == DQ || ch == EQ
}
