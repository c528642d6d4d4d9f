use crate::tui::theme::*;
use flashgen_core::{char_len, ProposalViewEntry, ReviewSession, BACK_MAX, FRONT_MAX};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// In-progress edit of one proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    pub front: String,
    pub back: String,
    pub on_back: bool,
}

impl Editor {
    pub fn new(front: &str, back: &str) -> Self {
        Self { front: front.to_string(), back: back.to_string(), on_back: false }
    }

    pub fn field_mut(&mut self) -> &mut String {
        if self.on_back { &mut self.back } else { &mut self.front }
    }
}

pub enum Pane<'a> {
    Detail,
    SourceText,
    Editor(&'a Editor),
}

pub fn approved_counter(session: &ReviewSession) -> String {
    format!("{}/{} flashcards approved", session.accepted_count(), session.total_count())
}

pub fn draw_ui(f: &mut Frame, area: Rect, session: &ReviewSession, sel: usize, pane: Pane) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    draw_status(f, rows[0], session);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);
    draw_proposals(f, cols[0], session, sel);
    match pane {
        Pane::Detail => draw_detail(f, cols[1], session.proposals().get(sel)),
        Pane::SourceText => draw_source(f, cols[1], session.source_text()),
        Pane::Editor(ed) => draw_editor(f, cols[1], ed),
    }

    let enabled = |on: bool| if on { footer_style() } else { hint_style() };
    let foot = Paragraph::new(Line::from(vec![
        Span::raw(" t text  "),
        Span::raw(" g generate  "),
        Span::raw(" space accept  "),
        Span::raw(" e edit  "),
        Span::raw(" d remove  "),
        Span::raw(" s save approved  ").style(enabled(session.save_approved_enabled())),
        Span::raw(" S save all  ").style(enabled(session.save_all_enabled())),
        Span::raw(" r reset  "),
        Span::raw(" q quit "),
    ]))
    .style(footer_style());
    f.render_widget(foot, rows[2]);
}

fn draw_status(f: &mut Frame, area: Rect, session: &ReviewSession) {
    let len = char_len(session.source_text());
    let mut spans = vec![Span::raw(format!("Source text: {len} characters  "))];
    if let Some(err) = session.source_check().error {
        spans.push(Span::raw(err).style(hint_style()));
    }

    let state = if session.is_generating() {
        Span::raw("Generating flashcards...").style(title_style())
    } else if session.is_saving() {
        Span::raw("Saving...").style(title_style())
    } else if let Some(err) = session.error().or(session.save_error()) {
        Span::raw(err.to_string()).style(error_style())
    } else if session.save_success() {
        Span::raw("Flashcards saved.").style(ok_style())
    } else {
        Span::raw("")
    };

    let p = Paragraph::new(vec![Line::from(spans), Line::from(state)])
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(p, area);
}

fn entry_line(i: usize, e: &ProposalViewEntry, selected: bool) -> Line<'static> {
    let mark = if e.accepted { "[x]" } else { "[ ]" };
    let edited = if e.edited { "*" } else { " " };
    let invalid = char_len(&e.proposal.front) > FRONT_MAX || char_len(&e.proposal.back) > BACK_MAX;
    let flag = if invalid { "!" } else { " " };
    let line = Line::from(format!("{mark}{edited}{flag} {}. {}", i + 1, e.proposal.front));
    if selected {
        line.style(selected_style())
    } else if invalid {
        line.style(error_style())
    } else if !e.accepted {
        line.style(rejected_style())
    } else {
        line
    }
}

fn draw_proposals(f: &mut Frame, area: Rect, session: &ReviewSession, sel: usize) {
    let items: Vec<_> = session
        .proposals()
        .iter()
        .enumerate()
        .map(|(i, e)| ListItem::new(entry_line(i, e, i == sel)))
        .collect();

    let title = Span::raw(approved_counter(session)).style(title_style());
    let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(list, area);
}

fn draw_detail(f: &mut Frame, area: Rect, entry: Option<&ProposalViewEntry>) {
    let block = Block::default().title("Proposal").borders(Borders::ALL);
    let Some(e) = entry else {
        let p = Paragraph::new("Press t to enter source text, then g to generate proposals.")
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(p, area);
        return;
    };

    let text = vec![
        field_header("Front", &e.proposal.front, FRONT_MAX),
        Line::from(e.proposal.front.clone()),
        Line::from(""),
        field_header("Back", &e.proposal.back, BACK_MAX),
        Line::from(e.proposal.back.clone()),
        Line::from(""),
        Line::from(format!("source: {}", e.proposal.source)).style(hint_style()),
    ];
    let p = Paragraph::new(text).wrap(Wrap { trim: false }).block(block);
    f.render_widget(p, area);
}

fn field_header(label: &str, value: &str, max: usize) -> Line<'static> {
    let n = char_len(value);
    let style = if n > max { error_style() } else { title_style() };
    Line::from(format!("{label} ({n}/{max})")).style(style)
}

fn draw_source(f: &mut Frame, area: Rect, text: &str) {
    let p = Paragraph::new(text.to_string())
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Source text (Esc done)").borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_editor(f: &mut Frame, area: Rect, ed: &Editor) {
    let (front_style, back_style) = if ed.on_back {
        (hint_style(), selected_style())
    } else {
        (selected_style(), hint_style())
    };
    let text = vec![
        field_header("Front", &ed.front, FRONT_MAX),
        Line::from(ed.front.clone()).style(front_style),
        Line::from(""),
        field_header("Back", &ed.back, BACK_MAX),
        Line::from(ed.back.clone()).style(back_style),
    ];
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Edit (Tab switch, Enter keep, Esc cancel)").borders(Borders::ALL));
    f.render_widget(p, area);
}
