use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::grid::GRID_WIDTH;

/// Enum representing the type of piece.
///
/// The discriminant order doubles as the color-index order: a locked cell of
/// kind `k` reports color index `k as u8 + 1` (0 is reserved for empty cells).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        match rng.random_range(0..=6) {
            0 => PieceKind::I,
            1 => PieceKind::O,
            2 => PieceKind::T,
            3 => PieceKind::S,
            4 => PieceKind::Z,
            5 => PieceKind::J,
            _ => PieceKind::L,
        }
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece types in color-index order.
    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Returns the non-zero color index of this kind (1-7).
    #[must_use]
    pub const fn color_index(self) -> u8 {
        self as u8 + 1
    }

    /// Inverse of [`Self::color_index`]; `None` for 0 (empty) and out-of-range
    /// values.
    #[must_use]
    pub const fn from_color_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::O),
            3 => Some(PieceKind::T),
            4 => Some(PieceKind::S),
            5 => Some(PieceKind::Z),
            6 => Some(PieceKind::J),
            7 => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Returns the single character representation of this piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Returns the ordered rotation-state sequence for this kind.
    ///
    /// Rotation index `i` selects state `i % len`. The O piece has a single
    /// state, I/S/Z have two, T/J/L have four.
    #[must_use]
    pub fn rotation_states(self) -> &'static [PieceShape] {
        match self {
            PieceKind::I => &I_STATES,
            PieceKind::O => &O_STATES,
            PieceKind::T => &T_STATES,
            PieceKind::S => &S_STATES,
            PieceKind::Z => &Z_STATES,
            PieceKind::J => &J_STATES,
            PieceKind::L => &L_STATES,
        }
    }

    /// Shape of this kind in its spawn orientation (rotation state 0).
    #[must_use]
    pub fn spawn_shape(self) -> &'static PieceShape {
        &self.rotation_states()[0]
    }
}

/// One fixed-orientation matrix variant of a piece.
///
/// Shapes are square matrices (2×2 for O, 3×3 for T/S/Z/J/L, 4×4 for I)
/// stored in a fixed 4×4 array; `size` gives the live extent. Occupied cells
/// are `true`; the color of an occupied cell comes from the piece kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceShape {
    size: usize,
    cells: [[bool; 4]; 4],
}

impl PieceShape {
    /// Side length of the shape matrix.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Whether the cell at `(x, y)` within the matrix is occupied.
    #[must_use]
    pub const fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.cells[y][x]
    }

    /// The occupied cells of the matrix as `(x, y)` offsets.
    ///
    /// Every tetromino shape occupies exactly 4 cells, which bounds the list.
    #[must_use]
    pub fn occupied_offsets(&self) -> ArrayVec<(usize, usize), 4> {
        let mut offsets = ArrayVec::new();
        for y in 0..self.size {
            for x in 0..self.size {
                if self.cells[y][x] {
                    offsets.push((x, y));
                }
            }
        }
        offsets
    }
}

const E: bool = false;
const C: bool = true;

const fn shape2(rows: [[bool; 2]; 2]) -> PieceShape {
    let mut cells = [[E; 4]; 4];
    let mut y = 0;
    while y < 2 {
        let mut x = 0;
        while x < 2 {
            cells[y][x] = rows[y][x];
            x += 1;
        }
        y += 1;
    }
    PieceShape { size: 2, cells }
}

const fn shape3(rows: [[bool; 3]; 3]) -> PieceShape {
    let mut cells = [[E; 4]; 4];
    let mut y = 0;
    while y < 3 {
        let mut x = 0;
        while x < 3 {
            cells[y][x] = rows[y][x];
            x += 1;
        }
        y += 1;
    }
    PieceShape { size: 3, cells }
}

const fn shape4(cells: [[bool; 4]; 4]) -> PieceShape {
    PieceShape { size: 4, cells }
}

static I_STATES: [PieceShape; 2] = [
    shape4([[E, E, E, E], [C, C, C, C], [E, E, E, E], [E, E, E, E]]),
    shape4([[E, E, C, E], [E, E, C, E], [E, E, C, E], [E, E, C, E]]),
];

static O_STATES: [PieceShape; 1] = [shape2([[C, C], [C, C]])];

static T_STATES: [PieceShape; 4] = [
    shape3([[E, C, E], [C, C, C], [E, E, E]]),
    shape3([[E, C, E], [E, C, C], [E, C, E]]),
    shape3([[E, E, E], [C, C, C], [E, C, E]]),
    shape3([[E, C, E], [C, C, E], [E, C, E]]),
];

static S_STATES: [PieceShape; 2] = [
    shape3([[E, C, C], [C, C, E], [E, E, E]]),
    shape3([[E, C, E], [E, C, C], [E, E, C]]),
];

static Z_STATES: [PieceShape; 2] = [
    shape3([[C, C, E], [E, C, C], [E, E, E]]),
    shape3([[E, E, C], [E, C, C], [E, C, E]]),
];

static J_STATES: [PieceShape; 4] = [
    shape3([[C, E, E], [C, C, C], [E, E, E]]),
    shape3([[E, C, C], [E, C, E], [E, C, E]]),
    shape3([[E, E, E], [C, C, C], [E, E, C]]),
    shape3([[E, C, E], [E, C, E], [C, C, E]]),
];

static L_STATES: [PieceShape; 4] = [
    shape3([[E, E, C], [C, C, C], [E, E, E]]),
    shape3([[E, C, E], [E, C, E], [E, C, C]]),
    shape3([[E, E, E], [C, C, C], [C, E, E]]),
    shape3([[C, C, E], [E, C, E], [E, C, E]]),
];

/// The currently falling piece: kind, rotation index, and top-left anchor.
///
/// Pieces are immutable - movement and rotation operations return new
/// `FallingPiece` values, so a candidate can be collision-tested before the
/// session commits it. Anchor coordinates are signed; a freshly spawned piece
/// may have empty leading shape rows while its occupied cells are already
/// inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallingPiece {
    kind: PieceKind,
    rotation: u8,
    x: i16,
    y: i16,
}

impl FallingPiece {
    /// Creates a piece of `kind` at its spawn position: horizontally centered
    /// (anchor column `C/2 - size/2`), anchor row 0, rotation state 0.
    #[must_use]
    pub fn spawn(kind: PieceKind) -> Self {
        #[expect(clippy::cast_possible_truncation)]
        let x = (GRID_WIDTH / 2 - kind.spawn_shape().size() / 2) as i16;
        Self {
            kind,
            rotation: 0,
            x,
            y: 0,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn rotation_index(&self) -> usize {
        usize::from(self.rotation)
    }

    /// Anchor column (may be negative for unvalidated candidates).
    #[must_use]
    pub fn x(&self) -> i16 {
        self.x
    }

    /// Anchor row.
    #[must_use]
    pub fn y(&self) -> i16 {
        self.y
    }

    /// The shape matrix of the current rotation state.
    #[must_use]
    pub fn shape(&self) -> &'static PieceShape {
        &self.kind.rotation_states()[usize::from(self.rotation)]
    }

    /// Returns a copy translated by `(dx, dy)`.
    ///
    /// The result is a candidate; it is not validated against any grid.
    #[must_use]
    pub fn translated(&self, dx: i16, dy: i16) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Returns a copy advanced to the next rotation state.
    ///
    /// Rotation is modular over the kind's state sequence; the anchor does
    /// not move. Like [`Self::translated`], the result is unvalidated.
    #[must_use]
    pub fn rotated(&self) -> Self {
        let rotation = (usize::from(self.rotation) + 1) % self.kind.rotation_states().len();
        #[expect(clippy::cast_possible_truncation)]
        let rotation = rotation as u8;
        Self { rotation, ..*self }
    }

    /// The occupied cells of the piece in grid coordinates.
    #[must_use]
    pub fn occupied_cells(&self) -> ArrayVec<(i16, i16), 4> {
        self.shape()
            .occupied_offsets()
            .into_iter()
            .map(|(dx, dy)| {
                #[expect(clippy::cast_possible_truncation)]
                let (dx, dy) = (dx as i16, dy as i16);
                (self.x + dx, self.y + dy)
            })
            .collect()
    }
}

impl Serialize for FallingPiece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#rotation@x,y" (e.g., "T#1@4,0")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation,
            self.x,
            self.y
        );
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for FallingPiece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let err = || serde::de::Error::custom(format!("expected 'kind#rotation@x,y', got '{s}'"));

        let (kind_str, rest) = s.split_once('#').ok_or_else(err)?;
        let (rotation_str, position_str) = rest.split_once('@').ok_or_else(err)?;
        let (x_str, y_str) = position_str.split_once(',').ok_or_else(err)?;

        let mut kind_chars = kind_str.chars();
        let kind = kind_chars
            .next()
            .filter(|_| kind_chars.next().is_none())
            .and_then(PieceKind::from_char)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid piece kind: '{kind_str}'")))?;

        let rotation = rotation_str.parse::<u8>().map_err(|e| {
            serde::de::Error::custom(format!("invalid rotation: {rotation_str} ({e})"))
        })?;
        if usize::from(rotation) >= kind.rotation_states().len() {
            return Err(serde::de::Error::custom(format!(
                "rotation must be 0-{} for {}, got {rotation}",
                kind.rotation_states().len() - 1,
                kind.as_char()
            )));
        }

        let x = x_str
            .parse::<i16>()
            .map_err(|e| serde::de::Error::custom(format!("invalid x position: {x_str} ({e})")))?;
        let y = y_str
            .parse::<i16>()
            .map_err(|e| serde::de::Error::custom(format!("invalid y position: {y_str} ({e})")))?;

        Ok(FallingPiece {
            kind,
            rotation,
            x,
            y,
        })
    }
}
