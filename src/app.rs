//! App: terminal init, main loop, board ticks, column feed timer and input handling.

use crate::Args;
use crate::input::{Action, key_to_action, mouse_to_cell};
use crate::theme::Theme;
use crate::ui::{self, Hud};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use ratatui::style::Color;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tumbletiles::{
    Board, BoardConfig, GameStatus, Resources, SpawnTrigger, TickInput, TickReport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    Restart,
    Exit,
}

pub struct App {
    args: Args,
    config: BoardConfig,
    theme: Theme,
    palette: Resources<Color>,
    board: Board,
    screen: Screen,
    hud: Hud,
    /// Input collected since the last board tick.
    pending: TickInput,
    last_tick: Instant,
    last_feed: Instant,
    paused_at: Option<Instant>,
    /// Frame area of the last draw, for mouse translation.
    last_area: Rect,
    /// TachyonFX fade of the board on game over (created on the first game-over frame).
    game_over_effect: Option<Effect>,
    game_over_effect_process_time: Option<Instant>,
    quit_selected: QuitOption,
}

impl App {
    pub fn new(args: Args, config: BoardConfig, theme: Theme) -> Result<Self> {
        let board = new_board(&config, args.start_columns)?;
        let palette = theme.resources();
        let now = Instant::now();
        Ok(Self {
            args,
            config,
            theme,
            palette,
            board,
            screen: Screen::Playing,
            hud: Hud::default(),
            pending: TickInput::default(),
            last_tick: now,
            last_feed: now,
            paused_at: None,
            last_area: Rect::default(),
            game_over_effect: None,
            game_over_effect_process_time: None,
            quit_selected: QuitOption::Resume,
        })
    }

    fn reset_game(&mut self) -> Result<()> {
        self.board = new_board(&self.config, self.args.start_columns)?;
        let now = Instant::now();
        self.screen = Screen::Playing;
        self.hud = Hud::default();
        self.pending = TickInput::default();
        self.last_tick = now;
        self.last_feed = now;
        self.paused_at = None;
        self.game_over_effect = None;
        self.game_over_effect_process_time = None;
        Ok(())
    }

    fn move_cursor(&mut self, dx: i32, dy: i32) {
        let (x, y) = self.hud.cursor;
        let max_x = self.board.grid().width().saturating_sub(1) as i32;
        let max_y = self.board.grid().height().saturating_sub(1) as i32;
        self.hud.cursor = (
            (x as i32 + dx).clamp(0, max_x) as usize,
            (y as i32 + dy).clamp(0, max_y) as usize,
        );
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::CursorLeft => self.move_cursor(-1, 0),
            Action::CursorRight => self.move_cursor(1, 0),
            Action::CursorUp => self.move_cursor(0, -1),
            Action::CursorDown => self.move_cursor(0, 1),
            Action::Activate => {
                let (x, y) = self.hud.cursor;
                self.pending.activate = Some((x as i32, y as i32));
            }
            Action::Feed => {
                if self.pending.spawn.is_none() {
                    self.pending.spawn = Some(SpawnTrigger::Manual);
                }
            }
            Action::ShowCount => {
                self.hud.show_animators = !self.hud.show_animators;
                log::info!(
                    "animators in flight: {}",
                    self.board.animations().in_flight()
                );
            }
            Action::Restart | Action::Pause | Action::Quit | Action::None => {}
        }
    }

    /// Stop the feed clock. Idempotent, so pause and the quit menu can overlap.
    fn suspend_feed_timer(&mut self) {
        self.paused_at.get_or_insert_with(Instant::now);
    }

    /// Restart the feed clock, crediting the time it was stopped.
    fn resume_feed_timer(&mut self) {
        if let Some(since) = self.paused_at.take() {
            self.last_feed += since.elapsed();
        }
    }

    fn close_quit_menu(&mut self) {
        self.screen = Screen::Playing;
        if !self.hud.paused {
            self.resume_feed_timer();
        }
    }

    /// One board tick with whatever input arrived since the last one.
    /// Only the timer feed restarts the feed clock; a manual feed does not.
    fn tick_board(&mut self) {
        if self.last_feed.elapsed() >= Duration::from_millis(self.config.feed_period_ms) {
            self.last_feed = Instant::now();
            self.pending.spawn = Some(SpawnTrigger::Timer);
        }
        let input = std::mem::take(&mut self.pending);
        match self.board.tick(input) {
            Ok(report) => self.record(report),
            Err(err) => {
                log::error!("board tick failed: {err}");
                self.hud.failure = Some(err);
                self.screen = Screen::GameOver;
            }
        }
        if self.args.no_animation {
            self.board.finish_animations();
        }
    }

    fn record(&mut self, report: TickReport) {
        self.hud.discarded_total += report.discarded as u64;
        if report.spawned > 0 {
            self.hud.columns_fed += 1;
        }
        if report.discarded + report.fallen + report.condensed + report.spawned > 0 {
            self.hud.last_report = report;
        } else {
            self.hud.last_report.animations_in_flight = report.animations_in_flight;
            self.hud.last_report.status = report.status;
        }
        if report.status != GameStatus::Running {
            log::info!("game over: {:?}", report.status);
            self.screen = Screen::GameOver;
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
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let tick_interval = Duration::from_secs_f64(1.0 / self.args.frame_rate.max(1.0));
        loop {
            let now = Instant::now();
            let fed_ago = self
                .paused_at
                .unwrap_or(now)
                .saturating_duration_since(self.last_feed);
            self.hud.next_feed_in =
                Duration::from_millis(self.config.feed_period_ms).saturating_sub(fed_ago);
            terminal.draw(|f| {
                self.last_area = f.area();
                ui::draw(
                    f,
                    self.screen,
                    &self.board,
                    &self.theme,
                    &self.palette,
                    &self.hud,
                    &mut self.game_over_effect,
                    &mut self.game_over_effect_process_time,
                    now,
                    self.args.no_animation,
                    (self.screen == Screen::QuitMenu).then_some(self.quit_selected),
                );
            })?;

            let timeout = tick_interval.saturating_sub(self.last_tick.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if !self.handle_action(key_to_action(key))? {
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) if self.screen == Screen::Playing && !self.hud.paused => {
                            let rect = ui::board_rect(self.last_area, &self.board);
                            let grid = self.board.grid();
                            if let Some((x, y)) = mouse_to_cell(
                                mouse,
                                rect,
                                self.board.layout(),
                                grid.width(),
                                grid.height(),
                            ) {
                                self.hud.cursor = (x, y);
                                self.pending.activate = Some((x as i32, y as i32));
                            }
                        }
                        _ => {}
                    }
                }
            }

            if self.screen == Screen::Playing
                && !self.hud.paused
                && self.last_tick.elapsed() >= tick_interval
            {
                self.last_tick = Instant::now();
                self.tick_board();
            }
        }
    }

    /// Route an action by screen. Returns `false` when the app should exit.
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match self.screen {
            Screen::Playing => {
                if action == Action::Quit {
                    self.screen = Screen::QuitMenu;
                    self.quit_selected = QuitOption::Resume;
                    self.suspend_feed_timer();
                } else if action == Action::Pause {
                    self.hud.paused = !self.hud.paused;
                    if self.hud.paused {
                        self.suspend_feed_timer();
                    } else {
                        self.resume_feed_timer();
                    }
                } else if !self.hud.paused {
                    self.apply_action(action);
                }
            }
            Screen::QuitMenu => match action {
                Action::CursorDown | Action::CursorRight => {
                    self.quit_selected = match self.quit_selected {
                        QuitOption::Resume => QuitOption::Restart,
                        QuitOption::Restart => QuitOption::Exit,
                        QuitOption::Exit => QuitOption::Resume,
                    };
                }
                Action::CursorUp | Action::CursorLeft => {
                    self.quit_selected = match self.quit_selected {
                        QuitOption::Resume => QuitOption::Exit,
                        QuitOption::Restart => QuitOption::Resume,
                        QuitOption::Exit => QuitOption::Restart,
                    };
                }
                Action::Activate => match self.quit_selected {
                    QuitOption::Resume => self.close_quit_menu(),
                    QuitOption::Restart => self.reset_game()?,
                    QuitOption::Exit => return Ok(false),
                },
                Action::Pause | Action::Quit => self.close_quit_menu(),
                _ => {}
            },
            Screen::GameOver => match action {
                Action::Quit => return Ok(false),
                Action::Restart => self.reset_game()?,
                _ => {}
            },
        }
        Ok(true)
    }
}

/// Fresh board with `start_columns` columns already in place on the right.
fn new_board(config: &BoardConfig, start_columns: usize) -> Result<Board> {
    let mut board = Board::new(config.clone());
    board.populate(start_columns)?;
    Ok(board)
}
