//! Layout and drawing: board, chain links, status line, clear flash.

use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Margin, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use spotlink::Board;
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal columns between neighbouring spots.
const DOT_X_STEP: u16 = 4;
/// Terminal rows between neighbouring spots.
const DOT_Y_STEP: u16 = 2;

const DOT: &str = "●";
const DOT_CONNECTED: &str = "◉";
const LINK_H: &str = "─";
const LINK_V: &str = "│";

/// Length of the flash over cleared spots.
const CLEAR_FLASH_MS: u32 = 350;

/// Inner board size in terminal cells (no border).
fn board_inner_size(width: usize, height: usize) -> (u16, u16) {
    (
        DOT_X_STEP * width as u16 - 1,
        DOT_Y_STEP * height as u16 - 1,
    )
}

/// Bordered board rect, centred in `area` with one status row below it.
pub fn board_rect(area: Rect, width: usize, height: usize) -> Rect {
    let (iw, ih) = board_inner_size(width, height);
    let (bw, bh) = (iw + 2, ih + 2);
    let x = area.x + area.width.saturating_sub(bw) / 2;
    let y = area.y + area.height.saturating_sub(bh + 1) / 2;
    Rect {
        x,
        y,
        width: bw.min(area.width),
        height: bh.min(area.height),
    }
}

fn inner(outer: Rect) -> Rect {
    outer.inner(Margin {
        horizontal: 1,
        vertical: 1,
    })
}

/// Screen cell of the spot drawn at (column, row) in board space. `row` may be
/// fractional or above the board while a tile falls; None when it would be
/// drawn outside the board.
fn dot_cell(inner: Rect, height: usize, column: f32, row: f32) -> Option<(u16, u16)> {
    let sx = 1.0 + column * DOT_X_STEP as f32;
    let sy = ((height - 1) as f32 - row) * DOT_Y_STEP as f32;
    let (sx, sy) = (sx.round(), sy.round());
    if sx < 0.0 || sy < 0.0 {
        return None;
    }
    let (x, y) = (inner.x + sx as u16, inner.y + sy as u16);
    (x < inner.x + inner.width && y < inner.y + inner.height).then_some((x, y))
}

/// Board slot under a terminal cell, for mouse hit-testing. Each slot owns
/// a DOT_X_STEP x DOT_Y_STEP block of cells.
pub fn cell_at(
    area: Rect,
    width: usize,
    height: usize,
    column: u16,
    row: u16,
) -> Option<spotlink::Position> {
    let inner = inner(board_rect(area, width, height));
    if !inner.contains(Position::new(column, row)) {
        return None;
    }
    let x = ((column - inner.x) / DOT_X_STEP) as usize;
    let from_top = ((row - inner.y) / DOT_Y_STEP) as usize;
    if x >= width || from_top >= height {
        return None;
    }
    Some(spotlink::Position::new(x, height - 1 - from_top))
}

/// Draw the board and status line; when `flash` is non-empty, run the clear
/// flash over those slots.
pub fn draw(
    frame: &mut Frame,
    board: &Board,
    theme: &Theme,
    flash: &[spotlink::Position],
    clear_effect: &mut Option<Effect>,
    clear_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    frame.buffer_mut().set_style(area, Style::default().bg(theme.bg));

    let outer = board_rect(area, board.width(), board.height());
    draw_board(frame, board, theme, outer);

    let status_area = Rect {
        x: area.x,
        y: (outer.y + outer.height).min(area.bottom().saturating_sub(1)),
        width: area.width,
        height: 1,
    };
    draw_status(frame, board, theme, status_area);

    if !flash.is_empty() {
        apply_clear_effect(
            frame,
            board,
            inner(outer),
            flash,
            clear_effect,
            clear_process_time,
            now,
        );
    }
}

fn draw_board(frame: &mut Frame, board: &Board, theme: &Theme, outer: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Spotlink ", theme.title));
    let inner = block.inner(outer);
    block.render(outer, frame.buffer_mut());

    let height = board.height();
    let link_color = board
        .chain_kind()
        .map(|kind| theme.spot_color(kind))
        .unwrap_or(theme.main_fg);
    let buf = frame.buffer_mut();

    for pair in board.chain().windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (Some(from), Some(to)) = (
            dot_cell(inner, height, a.x as f32, a.y as f32),
            dot_cell(inner, height, b.x as f32, b.y as f32),
        ) else {
            continue;
        };
        let style = Style::default().fg(link_color).bg(theme.bg);
        if from.1 == to.1 {
            for x in from.0.min(to.0) + 1..from.0.max(to.0) {
                buf[(x, from.1)].set_symbol(LINK_H).set_style(style);
            }
        } else {
            for y in from.1.min(to.1) + 1..from.1.max(to.1) {
                buf[(from.0, y)].set_symbol(LINK_V).set_style(style);
            }
        }
    }

    for tile in board.tiles() {
        let (column, row) = tile.display_position();
        let Some((x, y)) = dot_cell(inner, height, column, row) else {
            continue;
        };
        let mut style = Style::default().fg(theme.spot_color(tile.kind())).bg(theme.bg);
        let symbol = if tile.is_connected() {
            style = style.add_modifier(Modifier::BOLD);
            DOT_CONNECTED
        } else {
            DOT
        };
        buf[(x, y)].set_symbol(symbol).set_style(style);
    }
}

fn draw_status(frame: &mut Frame, board: &Board, theme: &Theme, area: Rect) {
    let mut spans = vec![Span::styled(
        format!("Chain: {}", board.chain().len()),
        Style::default().fg(theme.main_fg),
    )];
    if board.is_square_closed() {
        spans.push(Span::styled(
            "  SQUARE!",
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled(
        "   drag to link · r new board · q quit",
        Style::default().fg(theme.inactive_fg),
    ));
    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .render(area, frame.buffer_mut());
}

/// Create or advance the flash over cleared slots (TachyonFX: cells fade in
/// from white to whatever is drawn there now).
fn apply_clear_effect(
    frame: &mut Frame,
    board: &Board,
    inner: Rect,
    flash: &[spotlink::Position],
    clear_effect: &mut Option<Effect>,
    clear_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = clear_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *clear_process_time = Some(now);

    if clear_effect.is_none() {
        let cells: HashSet<(u16, u16)> = flash
            .iter()
            .filter_map(|pos| dot_cell(inner, board.height(), pos.x as f32, pos.y as f32))
            .collect();
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            cells.contains(&(pos.x, pos.y))
        }));
        let effect = fx::fade_from(
            Color::White,
            Color::White,
            (CLEAR_FLASH_MS, Interpolation::QuadOut),
        )
        .with_filter(filter)
        .with_area(inner);
        *clear_effect = Some(effect);
    }

    if let Some(effect) = clear_effect {
        frame.render_effect(effect, inner, TfxDuration::from_millis(delta_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 24,
    };

    #[test]
    fn test_board_rect_centred() {
        let rect = board_rect(AREA, 6, 6);
        assert_eq!((rect.width, rect.height), (25, 13));
        assert_eq!(rect.x, (80 - 25) / 2);
        assert_eq!(rect.y, (24 - 14) / 2);
    }

    #[test]
    fn test_dot_cells_round_trip_through_hit_test() {
        let (w, h) = (6, 5);
        let inner = inner(board_rect(AREA, w, h));
        for x in 0..w {
            for y in 0..h {
                let (cx, cy) = dot_cell(inner, h, x as f32, y as f32).unwrap();
                assert_eq!(
                    cell_at(AREA, w, h, cx, cy),
                    Some(spotlink::Position::new(x, y))
                );
            }
        }
    }

    #[test]
    fn test_hit_test_outside_board() {
        let outer = board_rect(AREA, 4, 4);
        assert_eq!(cell_at(AREA, 4, 4, outer.x, outer.y), None);
        assert_eq!(cell_at(AREA, 4, 4, 0, 0), None);
        assert_eq!(cell_at(AREA, 4, 4, outer.right() + 3, outer.y + 2), None);
    }

    #[test]
    fn test_falling_dot_above_board_is_hidden() {
        let inner = inner(board_rect(AREA, 4, 4));
        assert_eq!(dot_cell(inner, 4, 0.0, 5.0), None);
        assert_eq!(dot_cell(inner, 4, 0.0, 3.0), Some((inner.x + 1, inner.y)));
        assert_eq!(dot_cell(inner, 4, 0.0, 2.5), Some((inner.x + 1, inner.y + 1)));
    }
}
