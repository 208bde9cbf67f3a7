//! App: terminal init, frame loop, routing mouse input to the board.

use crate::Args;
use crate::input::{Action, key_to_action, mouse_to_action};
use crate::theme::Theme;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use spotlink::{Board, BoardConfig, BoardEvent, BoardObserver, Position, Release};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use tachyonfx::Effect;

pub struct App {
    args: Args,
    config: BoardConfig,
    theme: Theme,
    board: Board,
    /// Board notifications, drained once per frame.
    events: Receiver<BoardEvent>,
    /// Boards started so far; offsets `--seed` so R gives a fresh board.
    boards_started: u64,
    /// Terminal area of the last frame, for mouse hit-testing.
    area: Rect,
    last_frame: Instant,
    /// Slots cleared by the last release, flashed by `clear_effect`.
    flash: Vec<Position>,
    clear_effect: Option<Effect>,
    clear_effect_process_time: Option<Instant>,
}

/// Build a board and wire its notifications into a channel.
fn new_board(config: &BoardConfig, seed: Option<u64>) -> Result<(Board, Receiver<BoardEvent>)> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (tx, rx) = mpsc::channel();
    let forward: Box<dyn BoardObserver> = Box::new(move |event: &BoardEvent| {
        // Receiver gone means the app is replacing this board.
        let _ = tx.send(event.clone());
    });
    let board = Board::with_observers(config.clone(), rng, vec![forward])?;
    Ok((board, rx))
}

impl App {
    pub fn new(args: Args, config: BoardConfig, theme: Theme) -> Result<Self> {
        let (board, events) = new_board(&config, args.seed)?;
        Ok(Self {
            args,
            config,
            theme,
            board,
            events,
            boards_started: 1,
            area: Rect::default(),
            last_frame: Instant::now(),
            flash: Vec::new(),
            clear_effect: None,
            clear_effect_process_time: None,
        })
    }

    fn reset_board(&mut self) -> Result<()> {
        let seed = self.args.seed.map(|s| s.wrapping_add(self.boards_started));
        let (board, events) = new_board(&self.config, seed)?;
        self.board = board;
        self.events = events;
        self.boards_started += 1;
        self.flash.clear();
        self.clear_effect = None;
        self.clear_effect_process_time = None;
        info!("new board #{}", self.boards_started);
        Ok(())
    }

    fn apply_action(&mut self, action: Action) {
        let (width, height) = (self.board.width(), self.board.height());
        let slot = |column, row| crate::ui::cell_at(self.area, width, height, column, row);
        match action {
            Action::Press { column, row } => {
                if let Some(pos) = slot(column, row) {
                    self.board.begin_selection(pos);
                }
            }
            Action::Drag { column, row } => {
                if let Some(pos) = slot(column, row) {
                    self.board.hover(pos);
                }
            }
            Action::Release => match self.board.release() {
                Release::Cleared { count, square } => {
                    info!("cleared {} spots{}", count, if square { " (square)" } else { "" });
                }
                Release::Cancelled => {}
            },
            Action::Restart | Action::Quit | Action::None => {}
        }
    }

    /// React to what the board did since the last frame.
    fn drain_board_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                BoardEvent::TilesCleared { tiles } => {
                    if !self.args.no_animation {
                        self.flash = tiles.iter().map(|tile| tile.position()).collect();
                        self.clear_effect = None;
                        self.clear_effect_process_time = None;
                    }
                }
                BoardEvent::SquareClosed { kind } => debug!("square closed: {:?}", kind),
                other => log::trace!("{:?}", other),
            }
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.args.frame_rate.max(1.0));
        self.last_frame = Instant::now();
        loop {
            let now = Instant::now();
            self.board.tick(now.saturating_duration_since(self.last_frame));
            self.last_frame = now;
            self.drain_board_events();

            terminal.draw(|f| {
                self.area = f.area();
                crate::ui::draw(
                    f,
                    &self.board,
                    &self.theme,
                    &self.flash,
                    &mut self.clear_effect,
                    &mut self.clear_effect_process_time,
                    now,
                );
            })?;

            if self.clear_effect.as_ref().is_some_and(|e| e.done()) {
                self.flash.clear();
                self.clear_effect = None;
                self.clear_effect_process_time = None;
            }

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let action = match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => key_to_action(key),
                        Event::Mouse(mouse) => mouse_to_action(mouse),
                        _ => Action::None,
                    };
                    match action {
                        Action::Quit => return Ok(()),
                        Action::Restart => self.reset_board()?,
                        other => self.apply_action(other),
                    }
                }
            }
        }
    }
}
