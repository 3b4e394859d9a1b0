use crate::styles;
use crate::transcript::TranscriptLine;
use anyhow::Result;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::Stdout;
use textwrap::wrap;

/// Everything the renderer needs, copied out of the actor so drawing
/// borrows nothing mutable.
pub struct ViewSnap {
    pub input: String,
    pub input_cursor: usize,
    pub lines: Vec<TranscriptLine>,
    pub scroll: usize,
    pub busy: u32,
    pub spinner: &'static str,
    pub panel_title: String,
    /// Revealed prefix of the active response.
    pub response: String,
    pub response_cursor: bool,
    pub placeholder: String,
    pub has_content: bool,
    pub loading: bool,
    pub status: String,
    pub progress: f64,
    pub error: Option<String>,
}

pub fn draw(term: &mut Terminal<CrosstermBackend<Stdout>>, snap: &ViewSnap) -> Result<()> {
    term.draw(|frame| {
        let area = frame.area();

        // The progress block only exists while a session is loading.
        let mut constraints = vec![
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(10),
        ];
        if snap.loading {
            constraints.push(Constraint::Length(4));
        }
        constraints.push(Constraint::Length(3));
        constraints.push(Constraint::Length(3));

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        draw_header(frame, layout[0], snap);
        draw_transcript(frame, layout[1], snap);
        draw_response(frame, layout[2], snap);

        let mut next = 3;
        if snap.loading {
            draw_progress(frame, layout[next], snap);
            next += 1;
        }
        draw_input(frame, layout[next], snap);
        draw_status_bar(frame, layout[next + 1], snap);
    })?;

    Ok(())
}

fn draw_header(frame: &mut Frame, area: Rect, snap: &ViewSnap) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " Mentor ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("· {} ", snap.panel_title), styles::dim()),
    ]))
    .wrap(Wrap { trim: true });
    frame.render_widget(header, area);
}

fn draw_transcript(frame: &mut Frame, area: Rect, snap: &ViewSnap) {
    let visible_h = area.height.saturating_sub(2) as usize;
    let content_width = area.width.saturating_sub(2) as usize;
    let wrapped = wrap_transcript(&snap.lines, content_width);
    let total = wrapped.len();
    let start = total.saturating_sub(visible_h + snap.scroll);
    let end = total.saturating_sub(snap.scroll.min(total));

    let items: Vec<ListItem> = wrapped[start..end]
        .iter()
        .map(|(text, style)| ListItem::new(Line::from(Span::styled(text.clone(), *style))))
        .collect();

    let body =
        List::new(items).block(Block::default().borders(Borders::ALL).title(" Transcript "));
    frame.render_widget(body, area);
}

fn draw_response(frame: &mut Frame, area: Rect, snap: &ViewSnap) {
    let visible_h = area.height.saturating_sub(2) as usize;
    let content_width = area.width.saturating_sub(2).max(1) as usize;

    let mut lines: Vec<Line> = Vec::new();
    if !snap.has_content {
        // Nothing arrived yet: placeholder, with a spinner while loading.
        let mut spans = Vec::new();
        if snap.loading {
            spans.push(Span::styled(
                format!("{} ", snap.spinner),
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::styled(
            snap.placeholder.clone(),
            styles::dim().add_modifier(Modifier::ITALIC),
        ));
        lines.push(Line::from(spans));
    } else {
        let wrapped = wrap(&snap.response, content_width);
        let tail_from = wrapped.len().saturating_sub(visible_h);
        for seg in &wrapped[tail_from..] {
            lines.push(Line::from(Span::styled(
                seg.clone().into_owned(),
                styles::coach_text(),
            )));
        }
        if snap.response_cursor {
            match lines.last_mut() {
                Some(last) => last.spans.push(Span::styled("▌", styles::coach_header())),
                None => lines.push(Line::from(Span::styled("▌", styles::coach_header()))),
            }
        }
    }
    if let Some(err) = &snap.error {
        lines.push(Line::from(Span::styled(
            format!("× {err}"),
            styles::error(),
        )));
    }

    let pane = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", snap.panel_title)),
    );
    frame.render_widget(pane, area);
}

/// Direct mapping of `{loading, status, progress}`: a status line with a
/// spinner, plus a proportional bar once there is any progress to show.
/// The caller skips this block entirely when not loading.
fn draw_progress(frame: &mut Frame, area: Rect, snap: &ViewSnap) {
    let block = Block::default().borders(Borders::ALL).title(" Progress ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let status_line = Line::from(vec![
        Span::styled(snap.spinner, Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(
            if snap.status.is_empty() {
                "Processing...".to_string()
            } else {
                snap.status.clone()
            },
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(status_line), rows[0]);

    if snap.progress > 0.0 {
        let ratio = (snap.progress / 100.0).clamp(0.0, 1.0);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::LightGreen))
            .ratio(ratio)
            .label(format!("{:.0}%", snap.progress));
        frame.render_widget(gauge, rows[1]);
    }
}

fn draw_input(frame: &mut Frame, area: Rect, snap: &ViewSnap) {
    let input_box = Paragraph::new(snap.input.clone())
        .block(Block::default().borders(Borders::ALL).title(" Input "));
    frame.render_widget(Clear, area);
    frame.render_widget(input_box, area);

    let caret_x = area.x + 1 + visual_caret_col(&snap.input, snap.input_cursor);
    let caret_y = area.y + 1;
    frame.set_cursor_position(Position {
        x: caret_x,
        y: caret_y,
    });
}

fn draw_status_bar(frame: &mut Frame, area: Rect, snap: &ViewSnap) {
    let working = snap.busy > 0 || snap.loading;
    let status_line = Line::from(vec![
        Span::raw(" "),
        Span::styled(snap.spinner, Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        if working {
            Span::styled("Working…", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("Idle", Style::default().fg(Color::Green))
        },
        Span::raw(format!(" • ops: {}", snap.busy)),
    ]);
    let status = Paragraph::new(status_line)
        .block(Block::default().borders(Borders::ALL).title(" Status "));
    frame.render_widget(status, area);
}

fn visual_caret_col(input: &str, cursor: usize) -> u16 {
    use unicode_width::UnicodeWidthStr;
    UnicodeWidthStr::width(&input[..cursor]) as u16
}

fn wrap_transcript(lines: &[TranscriptLine], width: usize) -> Vec<(String, Style)> {
    let effective_width = width.max(1);
    let mut out = Vec::new();

    for entry in lines {
        let style = entry.style;
        if entry.text.is_empty() {
            out.push((String::new(), style));
            continue;
        }

        for raw_line in entry.text.split('\n') {
            if raw_line.is_empty() {
                out.push((String::new(), style));
                continue;
            }

            let segments = wrap(raw_line, effective_width);
            if segments.is_empty() {
                out.push((String::new(), style));
            } else {
                out.extend(segments.into_iter().map(|seg| (seg.into_owned(), style)));
            }
        }
    }

    out
}
