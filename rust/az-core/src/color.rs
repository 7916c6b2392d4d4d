//! Tile colors.

/// Number of distinct tile colors.
pub const COLOR_COUNT: usize = 5;

/// Tile color. `Empty` marks absence and is never drawn from the bag.
///
/// Numeric values are part of the move encoding (`color - 1`), so they must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Color {
    #[default]
    Empty = 0,
    Blue = 1,
    Yellow = 2,
    Red = 3,
    Black = 4,
    White = 5,
}

impl Color {
    /// All drawable colors in enumeration order.
    pub const TILES: [Color; COLOR_COUNT] = [
        Color::Blue,
        Color::Yellow,
        Color::Red,
        Color::Black,
        Color::White,
    ];

    /// Index into per-color count arrays (`bag`, `bins`, `discard`).
    ///
    /// # Panics
    /// Panics for `Color::Empty`.
    #[inline]
    pub fn slot(self) -> usize {
        assert!(self != Color::Empty, "Empty has no count slot");
        self as usize - 1
    }

    /// Inverse of [`Color::slot`].
    ///
    /// # Panics
    /// Panics if `slot >= COLOR_COUNT`.
    #[inline]
    pub fn from_slot(slot: usize) -> Color {
        Color::TILES[slot]
    }

    /// Convert the numeric value (0..=5) back to a color.
    pub fn from_u8(v: u8) -> Option<Color> {
        match v {
            0 => Some(Color::Empty),
            1..=5 => Some(Color::TILES[(v - 1) as usize]),
            _ => None,
        }
    }

    #[inline]
    pub fn is_tile(self) -> bool {
        self != Color::Empty
    }

    /// One-letter board notation.
    pub fn to_char(self) -> char {
        match self {
            Color::Empty => '_',
            Color::Blue => 'U',
            Color::Yellow => 'Y',
            Color::Red => 'R',
            Color::Black => 'K',
            Color::White => 'W',
        }
    }

    /// Parse the one-letter notation (case-insensitive).
    pub fn from_char(c: char) -> Option<Color> {
        match c.to_ascii_uppercase() {
            '_' => Some(Color::Empty),
            'U' => Some(Color::Blue),
            'Y' => Some(Color::Yellow),
            'R' => Some(Color::Red),
            'K' => Some(Color::Black),
            'W' => Some(Color::White),
            _ => None,
        }
    }
}
