use crate::tui::{inputs::{map_event, Action}, views::{self, Editor, Pane}};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use flashgen_core::{
    ClientError, Completion, Flashcard, FlashcardApi, GenerationCreateResponse, GenerationTicket,
    ReviewSession, SaveTicket,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Results coming back from background calls.
pub enum Msg {
    Generated(GenerationTicket, Result<GenerationCreateResponse, ClientError>),
    Saved(SaveTicket, Result<Vec<Flashcard>, ClientError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Text,
    Edit(Editor),
}

pub struct TuiApp {
    pub api: Arc<dyn FlashcardApi>,
    pub rt: Arc<Runtime>,
    session: ReviewSession,
    sel: usize,
    mode: Mode,
    tx: Sender<Msg>,
    rx: Receiver<Msg>,
}

impl TuiApp {
    pub fn new(api: Arc<dyn FlashcardApi>, rt: Arc<Runtime>, source_text: String) -> Self {
        let (tx, rx) = channel();
        Self {
            api,
            rt,
            session: ReviewSession::with_source_text(source_text),
            sel: 0,
            mode: Mode::Browse,
            tx,
            rx,
        }
    }

    pub fn session(&self) -> &ReviewSession {
        &self.session
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Edit(_))
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.mainloop(&mut terminal);

        disable_raw_mode().ok();
        let mut out: Stdout = std::io::stdout();
        execute!(out, DisableBracketedPaste, LeaveAlternateScreen).ok();
        terminal.show_cursor().ok();

        res
    }

    fn mainloop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
        loop {
            self.drain_results();

            terminal.draw(|f| {
                let pane = match &self.mode {
                    Mode::Browse => Pane::Detail,
                    Mode::Text => Pane::SourceText,
                    Mode::Edit(ed) => Pane::Editor(ed),
                };
                views::draw_ui(f, f.size(), &self.session, self.sel, pane);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                let typing = self.mode != Mode::Browse;
                let action = map_event(event::read()?, typing);
                if !self.handle(action) {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Applies finished calls. Stale ones are dropped by the session.
    pub fn drain_results(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                Msg::Generated(ticket, res) => {
                    if self.session.complete_generation(&ticket, res) == Completion::Applied {
                        self.sel = 0;
                        // an open editor points into the replaced list
                        if matches!(self.mode, Mode::Edit(_)) {
                            self.mode = Mode::Browse;
                        }
                    }
                }
                Msg::Saved(ticket, res) => {
                    self.session.complete_save(&ticket, res);
                }
            }
        }
    }

    /// Returns `false` when the user asked to quit.
    pub fn handle(&mut self, action: Action) -> bool {
        match std::mem::replace(&mut self.mode, Mode::Browse) {
            Mode::Browse => return self.browse(action),
            Mode::Text => self.text(action),
            Mode::Edit(ed) => self.edit(ed, action),
        }
        true
    }

    fn browse(&mut self, action: Action) -> bool {
        let total = self.session.total_count();
        match action {
            Action::Quit => return false,
            Action::Up => self.sel = self.sel.saturating_sub(1),
            Action::Down => {
                if self.sel + 1 < total {
                    self.sel += 1;
                }
            }
            Action::Generate => self.start_generation(),
            Action::ToggleAccept => self.session.toggle_accept(self.sel),
            Action::Edit => {
                if let Some(e) = self.session.proposals().get(self.sel) {
                    self.mode = Mode::Edit(Editor::new(&e.proposal.front, &e.proposal.back));
                }
            }
            Action::Remove => {
                self.session.remove(self.sel);
                self.sel = self.sel.min(self.session.total_count().saturating_sub(1));
            }
            Action::SaveApproved if self.session.save_approved_enabled() => self.start_save(true),
            Action::SaveAll if self.session.save_all_enabled() => self.start_save(false),
            Action::Reset => {
                self.session.reset();
                self.sel = 0;
            }
            Action::EditText => self.mode = Mode::Text,
            _ => {}
        }
        true
    }

    fn text(&mut self, action: Action) {
        let mut text = self.session.source_text().to_string();
        match action {
            Action::Cancel | Action::Confirm => return,
            Action::Char(c) => text.push(c),
            Action::Paste(s) => text.push_str(&s),
            Action::Backspace => {
                text.pop();
            }
            _ => {}
        }
        self.session.set_source_text(text);
        self.mode = Mode::Text;
    }

    fn edit(&mut self, mut ed: Editor, action: Action) {
        match action {
            Action::Cancel => return,
            Action::Confirm | Action::Char('\n') => {
                self.session.edit(self.sel, ed.front, ed.back);
                return;
            }
            Action::NextField => ed.on_back = !ed.on_back,
            Action::Char(c) => ed.field_mut().push(c),
            Action::Paste(s) => ed.field_mut().push_str(&s),
            Action::Backspace => {
                ed.field_mut().pop();
            }
            _ => {}
        }
        self.mode = Mode::Edit(ed);
    }

    fn start_generation(&mut self) {
        let Ok(ticket) = self.session.begin_generation() else {
            // rejection text is already on the session
            return;
        };
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.rt.spawn(async move {
            let res = api.create_generation(&ticket.command).await;
            tx.send(Msg::Generated(ticket, res)).ok();
        });
    }

    fn start_save(&mut self, only_accepted: bool) {
        let Ok(ticket) = self.session.begin_save(only_accepted) else {
            return;
        };
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.rt.spawn(async move {
            let res = api.save_flashcards(&ticket.command).await;
            tx.send(Msg::Saved(ticket, res)).ok();
        });
    }
}
