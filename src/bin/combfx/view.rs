//! Interactive difference plot
//!
//! Draws the same per-channel charts as `compare --plot`, sized to the terminal.

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use combfx::compare::{plot, Difference};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};

/// UI application state
pub struct DiffView {
    diff: Difference,
    title: String,
    should_quit: bool,
}

impl DiffView {
    pub fn new(diff: Difference, title: String) -> Self {
        Self {
            diff,
            title,
            should_quit: false,
        }
    }

    /// Run the UI event loop until the user quits
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            // Nothing animates, so a slow poll is enough to catch resizes
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        if let KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc = key {
            self.should_quit = true;
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::vertical([Constraint::Min(4), Constraint::Length(1)]).split(frame.area());

        plot::render_into(chunks[0], frame.buffer_mut(), &self.diff, &self.title);

        let help = Paragraph::new(format!(
            " [Q] Quit  peak {:.3e}  {:.2}s @ {} Hz",
            self.diff.peak(),
            self.diff.duration_sec(),
            self.diff.sample_rate
        ))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[1]);
    }
}

/// Take over the terminal, show `diff`, and restore the terminal on exit.
pub fn run(diff: Difference, title: String) -> EyreResult<()> {
    let mut terminal = ratatui::init();
    let result = DiffView::new(diff, title).run(&mut terminal);
    ratatui::restore();
    result
}
