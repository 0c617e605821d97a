//! Layout and drawing: board, sidebar, pause, quit menu, game over.

use crate::app::{QuitOption, Screen};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};
use tumbletiles::matching::connected_cells;
use tumbletiles::{Board, BoardError, BoardLayout, GameStatus, Point, Resources, TickReport};

/// Each tile is two terminal columns by one row so it reads roughly square.
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;

/// Board layout in terminal cells, relative to the board's inner rect.
pub const TERMINAL_LAYOUT: BoardLayout = BoardLayout {
    origin: Point::new(0.0, 0.0),
    tile_width: CELL_WIDTH as f32,
    tile_height: CELL_HEIGHT as f32,
};

const SIDEBAR_WIDTH: u16 = 26;
const SIDEBAR_HEIGHT: u16 = 20;

/// Fade of the board to background once the game is over.
const GAME_OVER_FADE_MS: u32 = 800;

const TILE_SYMBOL: &str = "██";
const GROUP_SYMBOL: &str = "▓▓";
const CURSOR_SYMBOL: &str = "[]";

/// Everything the sidebar and overlays show that is not board state.
#[derive(Debug, Clone, Default)]
pub struct Hud {
    pub cursor: (usize, usize),
    pub paused: bool,
    pub show_animators: bool,
    pub discarded_total: u64,
    pub columns_fed: u32,
    pub last_report: TickReport,
    pub next_feed_in: Duration,
    pub failure: Option<BoardError>,
}

/// Tile area of the board in terminal cells, saturating at `u16::MAX`.
fn board_cells(board: &Board) -> (u16, u16) {
    let cells = |tiles: usize, cell: u16| {
        u16::try_from(tiles)
            .unwrap_or(u16::MAX)
            .saturating_mul(cell)
    };
    (
        cells(board.grid().width(), CELL_WIDTH),
        cells(board.grid().height(), CELL_HEIGHT),
    )
}

/// Board outer size (border included) in terminal cells.
fn board_outer_size(board: &Board) -> (u16, u16) {
    let (w, h) = board_cells(board);
    (w.saturating_add(2), h.saturating_add(2))
}

/// Outer board rect and sidebar rect, centred in `area`.
fn split_area(area: Rect, board: &Board) -> (Rect, Rect) {
    let (bw, bh) = board_outer_size(board);
    let total_h = bh.max(SIDEBAR_HEIGHT);
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bw.saturating_add(SIDEBAR_WIDTH)),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let board_outer = Rect {
        height: bh.min(inner[0].height),
        ..inner[0]
    };
    (board_outer, inner[1])
}

/// Inner board rect (tiles only, no border) for the given frame area. Mouse
/// input is translated through this rect, so it must match `draw_board`.
pub fn board_rect(area: Rect, board: &Board) -> Rect {
    let (outer, _) = split_area(area, board);
    let inner = Block::default().borders(Borders::ALL).inner(outer);
    let (w, h) = board_cells(board);
    Rect {
        x: inner.x,
        y: inner.y,
        width: w.min(inner.width),
        height: h.min(inner.height),
    }
}

/// Draw current screen with optional pause overlay, quit menu or game-over fade.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    board: &Board,
    theme: &Theme,
    palette: &Resources<Color>,
    hud: &Hud,
    game_over_effect: &mut Option<Effect>,
    effect_process_time: &mut Option<Instant>,
    now: Instant,
    no_animation: bool,
    quit_selected: Option<QuitOption>,
) {
    let area = frame.area();
    let (board_area, sidebar_area) = split_area(area, board);
    draw_board(frame, board, theme, palette, hud, board_area, screen == Screen::Playing);
    draw_sidebar(frame, board, theme, palette, hud, sidebar_area);
    match screen {
        Screen::Playing => {
            if hud.paused {
                draw_pause_overlay(frame, theme, area);
            }
        }
        Screen::QuitMenu => {
            if let Some(opt) = quit_selected {
                draw_quit_menu(frame, theme, opt);
            }
        }
        Screen::GameOver => {
            if !no_animation {
                apply_game_over_effect(
                    frame,
                    board_rect(area, board),
                    theme,
                    game_over_effect,
                    effect_process_time,
                    now,
                );
            }
            draw_game_over(frame, board, theme, hud, area);
        }
    }
}

/// Create or advance the board fade (TachyonFX) shown behind the game-over popup.
fn apply_game_over_effect(
    frame: &mut Frame,
    board_rect: Rect,
    theme: &Theme,
    effect: &mut Option<Effect>,
    process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *process_time = Some(now);

    let effect = effect.get_or_insert_with(|| {
        fx::fade_to(theme.bg, theme.bg, (GAME_OVER_FADE_MS, Interpolation::Linear))
            .with_area(board_rect)
    });
    frame.render_effect(effect, board_rect, TfxDuration::from_millis(delta_ms));
}

fn draw_board(
    frame: &mut Frame,
    board: &Board,
    theme: &Theme,
    palette: &Resources<Color>,
    hud: &Hud,
    area: Rect,
    show_cursor: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Tumbletiles ", Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let (w, h) = board_cells(board);
    let rect = Rect {
        x: inner.x,
        y: inner.y,
        width: w.min(inner.width),
        height: h.min(inner.height),
    };
    let buf = frame.buffer_mut();
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            buf[(x, y)].set_symbol(" ").set_style(Style::default().bg(theme.bg));
        }
    }

    let (cx, cy) = hud.cursor;
    let group: HashSet<(usize, usize)> = if show_cursor {
        connected_cells(board.grid(), cx as i32, cy as i32)
            .into_iter()
            .collect()
    } else {
        HashSet::new()
    };

    // Tiles are drawn at their animated position, clipped to the board.
    for (x, y, tile) in board.grid().render_iter() {
        let Some((rx, ry)) = to_buffer(rect, tile.pos) else {
            continue;
        };
        let color = palette.get(tile.color).copied().unwrap_or(theme.main_fg);
        let symbol = if group.len() > 1 && group.contains(&(x, y)) {
            GROUP_SYMBOL
        } else {
            TILE_SYMBOL
        };
        buf.set_string(rx, ry, symbol, Style::default().fg(color).bg(theme.bg));
    }

    if show_cursor {
        let Some((rx, ry)) = to_buffer(rect, TERMINAL_LAYOUT.pos_at(cx as i32, cy as i32)) else {
            return;
        };
        let under = board
            .grid()
            .color_at(cx as i32, cy as i32)
            .and_then(|c| palette.get(c).copied())
            .unwrap_or(theme.bg);
        buf.set_string(
            rx,
            ry,
            CURSOR_SYMBOL,
            Style::default().fg(theme.title).bg(under).bold(),
        );
    }
}

/// Buffer cell for a tile's left half, if the whole tile fits inside `rect`.
fn to_buffer(rect: Rect, pos: Point) -> Option<(u16, u16)> {
    let (x, y) = (pos.x.round(), pos.y.round());
    if x < 0.0 || y < 0.0 {
        return None;
    }
    let (x, y) = (x as u16, y as u16);
    let fits = x.saturating_add(CELL_WIDTH) <= rect.width
        && y.saturating_add(CELL_HEIGHT) <= rect.height;
    fits.then_some((rect.x + x, rect.y + y))
}

fn sidebar_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
}

fn draw_sidebar(
    frame: &mut Frame,
    board: &Board,
    theme: &Theme,
    palette: &Resources<Color>,
    hud: &Hud,
    area: Rect,
) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Colours (border + title + strip)
            Constraint::Length(9), // Stats
            Constraint::Length(7), // Controls
        ])
        .split(area);

    let colours_block = sidebar_block(theme);
    let colours_inner = colours_block.inner(chunks[0]);
    colours_block.render(chunks[0], frame.buffer_mut());
    let colours_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(colours_inner);
    Paragraph::new(Line::from(Span::styled("Colours", title_style)))
        .render(colours_layout[0], frame.buffer_mut());
    draw_colour_strip(frame, board, palette, colours_layout[1]);

    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let report = &hud.last_report;
    let mut lines = vec![
        stat("Tiles: ", board.grid().occupied().to_string()),
        stat("Discarded: ", hud.discarded_total.to_string()),
        stat("Columns fed: ", hud.columns_fed.to_string()),
        stat(
            "Next feed: ",
            format!("{:.1}s", hud.next_feed_in.as_secs_f32()),
        ),
        stat("Cooldown: ", board.cooldown().to_string()),
        stat(
            "Last move: ",
            format!("-{} v{} >{}", report.discarded, report.fallen, report.condensed),
        ),
    ];
    if hud.show_animators {
        lines.push(stat(
            "Animators: ",
            format!(
                "{}/{}",
                board.animations().in_flight(),
                board.animations().capacity()
            ),
        ));
    }
    Paragraph::new(lines)
        .block(sidebar_block(theme).title(Span::styled(" Stats ", title_style)))
        .render(chunks[1], frame.buffer_mut());

    let help = vec![
        Line::from(Span::styled("Arrows/WASD  Move", fg_style)),
        Line::from(Span::styled("Enter/Click  Discard", fg_style)),
        Line::from(Span::styled("K  Feed   C  Animators", fg_style)),
        Line::from(Span::styled("P  Pause  Q  Quit", fg_style)),
    ];
    Paragraph::new(help)
        .block(sidebar_block(theme).title(Span::styled(" Keys ", title_style)))
        .render(chunks[2], frame.buffer_mut());
}

/// Row of the colours in play, one block per colour.
fn draw_colour_strip(frame: &mut Frame, board: &Board, palette: &Resources<Color>, area: Rect) {
    let colors = usize::from(board.config().colors).clamp(1, tumbletiles::TileColor::COUNT);
    let block_w = (area.width / colors as u16).max(1);
    for (i, color) in tumbletiles::TileColor::ALL.iter().take(colors).enumerate() {
        let Some(&c) = palette.get(*color) else {
            continue;
        };
        let r = Rect {
            x: area.x + (i as u16) * block_w,
            y: area.y,
            width: block_w,
            height: area.height.min(1),
        };
        Paragraph::new("█".repeat(block_w as usize))
            .style(Style::default().fg(c).bg(c))
            .render(r, frame.buffer_mut());
    }
}

/// Centred popup rect, clipped to `area`.
fn popup_rect(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn clear_rect(frame: &mut Frame, rect: Rect, bg: Color) {
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            frame.buffer_mut()[(x, y)]
                .set_symbol(" ")
                .set_style(Style::default().bg(bg));
        }
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = popup_rect(area, 28, 5);
    clear_rect(frame, popup, theme.bg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P: Resume    Q: Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, board: &Board, theme: &Theme, hud: &Hud, area: Rect) {
    let popup = popup_rect(area, 34, 10);
    clear_rect(frame, popup, theme.bg);
    let title = match board.status() {
        GameStatus::Failed => " Board halted ",
        _ => " Board full ",
    };
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            title,
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Discarded: {} ", hud.discarded_total),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Columns fed: {} ", hud.columns_fed),
            Style::default().fg(theme.main_fg),
        )),
    ];
    if let Some(err) = hud.failure {
        lines.push(Line::from(Span::styled(
            format!(" {err} "),
            Style::default().fg(theme.inactive_fg),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " R: Restart    Q: Quit ",
        Style::default().fg(theme.main_fg),
    )));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Game Over ", Style::default().fg(theme.title))),
        )
        .render(popup, frame.buffer_mut());
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = popup_rect(frame.area(), 24, 8);
    clear_rect(frame, quit_rect, theme.bg);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Quit? ");
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::Restart, " Restart "),
        (QuitOption::Exit, " Exit "),
    ];
    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default().fg(theme.bg).bg(theme.title).bold()
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.y + inner.height {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}
