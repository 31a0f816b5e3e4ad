use std::{
    ops::ControlFlow,
    thread,
    time::{Duration, Instant},
};

use blockfall_engine::{GameSession, PieceSeed, SessionState};
use crossterm::event::{self, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout},
    style::Style,
    text::{Line, Text},
    widgets::Block,
};

use crate::ui::widgets::{BoardDisplay, PieceDisplay, StatsDisplay, color, style};

pub(crate) fn run(seed: Option<PieceSeed>, fps: u32) -> anyhow::Result<()> {
    let mut session = match seed {
        Some(seed) => GameSession::with_seed(seed),
        None => GameSession::new(),
    };
    let frame_duration = Duration::from_secs(1) / fps.max(1);

    ratatui::run(|terminal| {
        let mut last_frame = Instant::now();
        loop {
            // Drain pending input without blocking the frame
            while event::poll(Duration::ZERO)? {
                if let Some(key) = event::read()?.as_key_event()
                    && handle_key(&mut session, key.code).is_break()
                {
                    return Ok(());
                }
            }

            let now = Instant::now();
            session.advance(now.duration_since(last_frame));
            last_frame = now;

            terminal.draw(|frame| draw(frame, &session))?;

            if let Some(rest) = frame_duration.checked_sub(now.elapsed()) {
                thread::sleep(rest);
            }
        }
    })
}

/// Maps a key press to an engine command.
///
/// The session ignores intents that are invalid in its current state, so no
/// guarding is needed here beyond the quit key.
fn handle_key(session: &mut GameSession, code: KeyCode) -> ControlFlow<()> {
    match code {
        KeyCode::Char('q') => return ControlFlow::Break(()),
        KeyCode::Char('s') => session.start(),
        KeyCode::Char('r') => session.reset(),
        KeyCode::Char('p') | KeyCode::Char(' ') => session.toggle_pause(),
        KeyCode::Left => session.move_left(),
        KeyCode::Right => session.move_right(),
        KeyCode::Down => session.soft_drop(),
        KeyCode::Up => session.rotate(),
        _ => {}
    }
    ControlFlow::Continue(())
}

fn draw(frame: &mut Frame<'_>, session: &GameSession) {
    let border_color = match session.state() {
        SessionState::Idle => color::GRAY,
        SessionState::Running => color::WHITE,
        SessionState::Paused => color::YELLOW,
        SessionState::GameOver => color::RED,
    };

    let board = {
        let widget = BoardDisplay::new(session.grid()).block(
            Block::bordered()
                .title(Line::from(session.state().to_string()).centered())
                .border_style(border_color)
                .style(style::DEFAULT),
        );
        match session.falling_piece() {
            Some(piece) => widget.falling_piece(*piece),
            None => widget,
        }
    };
    let next_panel = PieceDisplay::new().piece(session.next_piece()).block(
        Block::bordered()
            .title(Line::from("NEXT").centered())
            .border_style(border_color)
            .style(style::DEFAULT),
    );
    let stats_panel = StatsDisplay::new(session.stats()).block(
        Block::bordered()
            .title(Line::from("STATS").centered())
            .border_style(border_color)
            .style(style::DEFAULT),
    );

    let help_text = match session.state() {
        SessionState::Idle => "Controls: S (Start) | Q (Quit)",
        SessionState::Running => {
            "Controls: ← → (Move) | ↓ (Soft Drop) | ↑ (Rotate) | P/Space (Pause) | R (Reset) | Q (Quit)"
        }
        SessionState::Paused => "Controls: P/Space (Resume) | R (Reset) | Q (Quit)",
        SessionState::GameOver => "Controls: S (Restart) | R (Reset) | Q (Quit)",
    };
    let help_text = Text::from(help_text)
        .style(Style::default().fg(color::GRAY))
        .centered();

    let [main_area, help_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());

    let [board_area, side_area] = Layout::horizontal([
        Constraint::Length(board.width()),
        Constraint::Length(next_panel.width().max(stats_panel.width())),
    ])
    .flex(Flex::Center)
    .spacing(1)
    .areas(main_area);

    let [next_area, stats_area] = Layout::vertical([
        Constraint::Length(next_panel.height()),
        Constraint::Length(stats_panel.height()),
    ])
    .spacing(1)
    .areas(side_area);

    frame.render_widget(board, board_area);
    frame.render_widget(next_panel, next_area);
    frame.render_widget(stats_panel, stats_area);
    frame.render_widget(help_text, help_area);
}
