use std::iter;

use blockfall_engine::{FallingPiece, Grid};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};

use crate::ui::widgets::CellDisplay;

/// Renders the grid with the falling piece overlaid.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    grid: &'a Grid,
    falling_piece: Option<FallingPiece>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            falling_piece: None,
            block: None,
        }
    }

    pub fn falling_piece(self, piece: FallingPiece) -> Self {
        Self {
            falling_piece: Some(piece),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn width(&self) -> u16 {
        Grid::WIDTH as u16 * CellDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u16 {
        Grid::HEIGHT as u16 * CellDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        // Overlay the falling piece on a copy; the grid itself stores only
        // locked cells
        let mut grid = self.grid.clone();
        if let Some(piece) = self.falling_piece {
            grid.lock_piece(&piece);
        }

        let col_constraints = (0..Grid::WIDTH).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints = (0..Grid::HEIGHT).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout::<{ Grid::HEIGHT }>(&vertical)
            .into_iter()
            .map(|row| row.layout::<{ Grid::WIDTH }>(&horizontal));

        for (cell_areas, row) in iter::zip(grid_cells, grid.rows()) {
            for (cell_area, cell) in iter::zip(cell_areas, row.cells()) {
                let cell_display = CellDisplay::from_cell(*cell, true);
                cell_display.render(cell_area, buf);
            }
        }
    }
}
