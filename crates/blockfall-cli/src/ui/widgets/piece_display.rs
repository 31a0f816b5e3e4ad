use blockfall_engine::{Cell, PieceKind, PieceShape};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::CellDisplay;

/// Renders a piece kind in its spawn orientation (the next-piece preview).
#[derive(Debug)]
pub struct PieceDisplay<'a> {
    piece: Option<PieceKind>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub fn new() -> Self {
        Self {
            piece: None,
            block: None,
        }
    }

    pub fn piece(self, piece: PieceKind) -> Self {
        Self {
            piece: Some(piece),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        4 * CellDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        2 * CellDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

/// Bounding box of the occupied cells in the kind's spawn state.
fn occupied_bounds(kind: PieceKind) -> (Rect, &'static PieceShape) {
    let shape = kind.spawn_shape();
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (usize::MAX, usize::MAX, 0, 0);
    for (x, y) in shape.occupied_offsets() {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    #[expect(clippy::cast_possible_truncation)]
    let rect = Rect::new(
        min_x as u16,
        min_y as u16,
        (max_x - min_x + 1) as u16,
        (max_y - min_y + 1) as u16,
    );
    (rect, shape)
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let empty_cell = CellDisplay::from_cell(Cell::Empty, false);
        let Some(kind) = self.piece else {
            empty_cell.render(area, buf);
            return;
        };

        let (bounds, shape) = occupied_bounds(kind);
        let piece_area = area.centered(
            Constraint::Length(bounds.width * CellDisplay::width()),
            Constraint::Length(bounds.height * CellDisplay::height()),
        );

        let col_constraints = (0..bounds.width).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints = (0..bounds.height).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);
        let cell_rows = piece_area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        let occupied_cell = CellDisplay::from_cell(Cell::Piece(kind), false);
        for (y, cell_row) in cell_rows.enumerate() {
            for (x, cell_area) in cell_row.into_iter().enumerate() {
                let matrix_x = x + bounds.x as usize;
                let matrix_y = y + bounds.y as usize;
                if shape.is_occupied(matrix_x, matrix_y) {
                    Widget::render(&occupied_cell, cell_area, buf);
                } else {
                    Widget::render(&empty_cell, cell_area, buf);
                }
            }
        }
    }
}
