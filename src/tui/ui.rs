//! Stateless rendering of the terminal surface.

use super::surface::TerminalSurface;
use bughouse_core::{BoardId, Color, Piece, Square, View};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color as Tint, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Width of one drawn board: rank label plus eight two-cell squares plus borders.
const BOARD_WIDTH: u16 = 22;
/// Height of one drawn board with banks and borders.
const BOARD_HEIGHT: u16 = 14;

/// Draws the whole screen.
pub fn draw(frame: &mut Frame, surface: &TerminalSurface) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(8),    // Body
            Constraint::Length(3), // Status
            Constraint::Length(3), // Input
        ])
        .split(area);

    let title = match surface.assignment() {
        Some(role) => format!("Bughouse - {role}"),
        None => "Bughouse".to_string(),
    };
    let title = Paragraph::new(title)
        .style(Style::default().fg(Tint::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    match surface.view() {
        View::Lobby => draw_lobby(frame, chunks[1], surface),
        View::Game => draw_game(frame, chunks[1], surface),
    }

    let status = Paragraph::new(surface.status().as_str())
        .style(Style::default().fg(Tint::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[2]);

    draw_input(frame, chunks[3], surface);
}

fn draw_lobby(frame: &mut Frame, area: Rect, surface: &TerminalSurface) {
    let hint = if *surface.join_enabled() {
        "Type /join <room> and press Enter. Esc quits."
    } else {
        "Esc quits."
    };
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let lobby = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .block(Block::default().title("Lobby").borders(Borders::ALL));
    frame.render_widget(lobby, center_rect(columns[0], 50, 5));
    draw_chat(frame, columns[1], surface);
}

fn draw_game(frame: &mut Frame, area: Rect, surface: &TerminalSurface) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BOARD_WIDTH),
            Constraint::Length(1),
            Constraint::Length(BOARD_WIDTH),
            Constraint::Length(1),
            Constraint::Min(20),
        ])
        .split(area);

    draw_board(frame, columns[0], surface, BoardId::One);
    draw_board(frame, columns[2], surface, BoardId::Two);
    draw_chat(frame, columns[4], surface);
}

fn draw_board(frame: &mut Frame, area: Rect, surface: &TerminalSurface, board: BoardId) {
    let area = Rect {
        height: area.height.min(BOARD_HEIGHT),
        ..area
    };
    let active = surface.is_local_turn(board);
    let border_style = if active {
        Style::default().fg(Tint::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Tint::DarkGray)
    };
    let title = if active {
        format!("Board {board} - your move")
    } else {
        format!("Board {board}")
    };

    let mut lines = vec![bank_line(surface.bank(board, Color::Black))];
    for rank in (0..8u8).rev() {
        let mut spans = vec![Span::raw(format!("{} ", rank + 1))];
        for file in 0..8u8 {
            let Some(square) = Square::new(file, rank) else {
                continue;
            };
            spans.push(square_span(surface.piece_at(board, square), (file + rank) % 2 == 1));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from("  a b c d e f g h"));
    lines.push(bank_line(surface.bank(board, Color::White)));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(paragraph, area);
}

fn square_span(piece: Option<Piece>, light: bool) -> Span<'static> {
    let background = if light { Tint::Gray } else { Tint::DarkGray };
    let text = match piece {
        Some(piece) => format!("{} ", piece.glyph()),
        None => "  ".to_string(),
    };
    Span::styled(text, Style::default().bg(background).fg(Tint::Black))
}

fn bank_line(pieces: &[Piece]) -> Line<'static> {
    if pieces.is_empty() {
        return Line::from(Span::styled("  -", Style::default().fg(Tint::DarkGray)));
    }
    let glyphs: String = pieces.iter().map(|p| p.glyph()).collect();
    Line::from(format!("  {glyphs}"))
}

fn draw_chat(frame: &mut Frame, area: Rect, surface: &TerminalSurface) {
    let visible = area.height.saturating_sub(2) as usize;
    let chat = surface.chat();
    let start = chat.len().saturating_sub(visible);
    let lines: Vec<Line> = chat[start..]
        .iter()
        .map(|(sender, text)| {
            Line::from(vec![
                Span::styled(
                    format!("{sender}: "),
                    Style::default().fg(Tint::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw(text.clone()),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Chat").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_input(frame: &mut Frame, area: Rect, surface: &TerminalSurface) {
    let input = Paragraph::new(format!("> {}", surface.input())).block(
        Block::default()
            .title("/join /move /drop /quit, or chat")
            .borders(Borders::ALL),
    );
    frame.render_widget(input, area);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vert[1])[1]
}
