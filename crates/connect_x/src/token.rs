//! Token values occupying connection-board cells.

use serde::{Deserialize, Serialize};

/// A cell value on a connection board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    /// Vacant cell.
    Empty,
    /// Cell claimed by the numbered player (1-based).
    Player(u8),
}

impl Token {
    /// True when the cell holds no player token.
    pub fn is_empty(self) -> bool {
        matches!(self, Token::Empty)
    }

    /// Player number behind a claimed cell, `None` for a vacant one.
    pub fn player_number(self) -> Option<u8> {
        match self {
            Token::Empty => None,
            Token::Player(number) => Some(number),
        }
    }
}

impl From<Token> for u8 {
    fn from(token: Token) -> Self {
        match token {
            Token::Empty => 0,
            Token::Player(number) => number,
        }
    }
}

impl From<u8> for Token {
    fn from(value: u8) -> Self {
        match value {
            0 => Token::Empty,
            number => Token::Player(number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_bytes() {
        assert_eq!(u8::from(Token::Empty), 0);
        assert_eq!(u8::from(Token::Player(2)), 2);
        assert_eq!(Token::from(0), Token::Empty);
        assert_eq!(Token::from(7), Token::Player(7));
    }

    #[test]
    fn test_player_number() {
        assert_eq!(Token::Empty.player_number(), None);
        assert_eq!(Token::Player(1).player_number(), Some(1));
    }
}
