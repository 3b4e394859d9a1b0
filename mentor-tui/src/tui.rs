use crate::{
    catalog::{self, Panel},
    command::{parse_command, Command},
    styles,
    transcript::TranscriptLine,
    transport::SearchTransport,
    view::{self, ViewSnap},
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use crossterm::{
    event::{Event as CtEvent, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mentor_actors::{
    actor::{Actor, Addr, Context},
    search::SearchActor,
    store::StoreActor,
    system::ShutdownHandle,
    SavedSession, StoreMsg,
};
use mentor_llm::traits::extract_bullets;
use mentor_stream::{
    Reveal, SessionEvent, SessionMsg, SessionSignal, StreamController, StreamOptions, Transport,
};
use ratatui::{backend::CrosstermBackend, style::Style, Terminal};
use std::{
    io::{self, Stdout},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SESSION_LIST_LIMIT: usize = 10;
const STREAM_MAILBOX: usize = 64;

/// Presentation pacing, straight from `ui:` in the config file.
#[derive(Clone, Copy, Debug)]
pub struct UiTuning {
    /// Interval per revealed character.
    pub reveal: Duration,
    /// Redraw/advance tick.
    pub tick: Duration,
}

impl Default for UiTuning {
    fn default() -> Self {
        Self {
            reveal: Duration::from_millis(50),
            tick: Duration::from_millis(80),
        }
    }
}

pub enum TuiMsg {
    InputEvent(CtEvent),
    Tick,
    Submit(String),
    /// Transport event for the active (or a stale) streaming session.
    Stream(SessionMsg),
    Saved(Uuid),
    SessionsListed(Vec<SavedSession>),
    SessionLoaded(SavedSession),
    OpError(String),
    ScrollUp,
    ScrollDown,
    Shutdown,
}

pub struct TuiActor {
    active: Option<&'static Panel>,
    /// Panel ids switched off in the config file.
    disabled: Vec<String>,

    // deps
    transport: Arc<dyn Transport>,
    search_transport: Arc<dyn Transport>,
    store: Addr<StoreActor>,

    // terminal
    term: Terminal<CrosstermBackend<Stdout>>,
    tick_rate: Duration,
    last_tick: Instant,
    /// Timestamp of the previous tick, for reveal advancement.
    last_frame: Instant,

    // ui state
    input: String,
    input_cursor: usize,
    lines: Vec<TranscriptLine>, // transcript buffer
    scroll: usize,              // from bottom
    dirty: bool,

    // busy/spinner (store and list ops; streaming tracks itself)
    busy: u32,
    spin_idx: usize,

    // streaming presentation
    controller: StreamController,
    reveal: Reveal,
    /// What the user typed to start the current session (kept for /save).
    current_input: String,

    // shutdown coordination
    shutdown: ShutdownHandle,
}

impl TuiActor {
    pub fn new(
        transport: Arc<dyn Transport>,
        search: Addr<SearchActor>,
        store: Addr<StoreActor>,
        shutdown: ShutdownHandle,
        tuning: UiTuning,
        disabled_panels: Vec<String>,
    ) -> Result<Self> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;
        term.clear()?;

        Ok(Self {
            active: None,
            disabled: disabled_panels,
            transport,
            search_transport: Arc::new(SearchTransport::new(search)),
            store,
            term,
            tick_rate: tuning.tick,
            last_tick: Instant::now(),
            last_frame: Instant::now(),
            input: String::new(),
            input_cursor: 0,
            lines: vec![TranscriptLine::new(
                "Pick a panel with '/panel <id>' ('/panels' lists them), then type your input."
                    .into(),
                styles::system(),
            )],
            scroll: 0,
            dirty: true,
            busy: 0,
            spin_idx: 0,
            controller: StreamController::new(),
            reveal: Reveal::new(tuning.reveal),
            current_input: String::new(),
            shutdown,
        })
    }

    fn cursor_left(&mut self) {
        if self.input_cursor == 0 {
            return;
        }
        self.input_cursor -= 1;
        while self.input_cursor > 0 && !self.input.is_char_boundary(self.input_cursor) {
            self.input_cursor -= 1;
        }
    }

    fn cursor_right(&mut self) {
        if self.input_cursor >= self.input.len() {
            return;
        }
        self.input_cursor += 1;
        while self.input_cursor < self.input.len()
            && !self.input.is_char_boundary(self.input_cursor)
        {
            self.input_cursor += 1;
        }
    }

    fn insert_char(&mut self, ch: char) {
        self.input.insert(self.input_cursor, ch);
        self.input_cursor += ch.len_utf8();
    }

    fn backspace(&mut self) {
        if self.input_cursor == 0 {
            return;
        }
        let mut prev = self.input_cursor.saturating_sub(1);
        while prev > 0 && !self.input.is_char_boundary(prev) {
            prev -= 1;
        }
        self.input.drain(prev..self.input_cursor);
        self.input_cursor = prev;
    }

    fn delete(&mut self) {
        if self.input_cursor >= self.input.len() {
            return;
        }
        let start = self.input_cursor;
        let mut end = start + 1;
        while end < self.input.len() && !self.input.is_char_boundary(end) {
            end += 1;
        }
        self.input.drain(start..end);
    }

    fn push<S: Into<String>>(&mut self, s: S) {
        self.push_styled(s, Style::default());
    }

    fn push_styled<S: Into<String>>(&mut self, s: S, style: Style) {
        self.lines.push(TranscriptLine::new(s.into(), style));
        self.dirty = true;
    }

    fn push_blank(&mut self) {
        self.push(String::new());
    }

    fn spinner(&self) -> &'static str {
        if self.busy > 0 || self.controller.is_loading() {
            BRAILLE_FRAMES[self.spin_idx % BRAILLE_FRAMES.len()]
        } else {
            " "
        }
    }

    fn set_busy(&mut self, on: bool) {
        if on {
            self.busy = self.busy.saturating_add(1)
        } else {
            self.busy = self.busy.saturating_sub(1)
        }
        self.dirty = true;
    }

    fn step_spinner(&mut self) {
        if self.busy > 0 || self.controller.is_loading() {
            self.spin_idx = (self.spin_idx + 1) % BRAILLE_FRAMES.len();
            self.dirty = true;
        }
    }

    fn draw(&mut self) -> Result<()> {
        let state = self.controller.state();
        let snap = ViewSnap {
            input: self.input.clone(),
            input_cursor: self.input_cursor,
            lines: self.lines.clone(),
            scroll: self.scroll,
            busy: self.busy,
            spinner: self.spinner(),
            panel_title: self
                .active
                .map(|p| p.title.to_string())
                .unwrap_or_else(|| "No panel selected".into()),
            response: self.reveal.visible().to_string(),
            response_cursor: self.reveal.cursor_visible(state.loading),
            placeholder: match self.active {
                Some(p) => format!("Waiting for response... ({})", p.hint),
                None => "Pick a panel with '/panel <id>'.".into(),
            },
            has_content: state.has_content(),
            loading: state.loading,
            status: state.status.clone(),
            progress: state.progress,
            error: state.error.clone(),
        };

        view::draw(&mut self.term, &snap)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<TuiMsg> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), KeyModifiers::CONTROL) => return Some(TuiMsg::Shutdown),
            (KeyCode::PageUp, _) => {
                self.scroll = self.scroll.saturating_add(5);
                self.dirty = true;
            }
            (KeyCode::PageDown, _) => {
                self.scroll = self.scroll.saturating_sub(5);
                self.dirty = true;
            }
            (KeyCode::Up, _) => {
                self.scroll = self.scroll.saturating_add(1);
                self.dirty = true;
            }
            (KeyCode::Down, _) => {
                self.scroll = self.scroll.saturating_sub(1);
                self.dirty = true;
            }
            (KeyCode::Enter, _) => {
                let line = std::mem::take(&mut self.input);
                self.input_cursor = 0;
                self.dirty = true;
                return Some(TuiMsg::Submit(line));
            }
            (KeyCode::Left, _) => {
                self.cursor_left();
                self.dirty = true;
            }
            (KeyCode::Right, _) => {
                self.cursor_right();
                self.dirty = true;
            }
            (KeyCode::Home, _) => {
                self.input_cursor = 0;
                self.dirty = true;
            }
            (KeyCode::End, _) => {
                self.input_cursor = self.input.len();
                self.dirty = true;
            }
            (KeyCode::Backspace, _) => {
                self.backspace();
                self.dirty = true;
            }
            (KeyCode::Delete, _) => {
                self.delete();
                self.dirty = true;
            }
            (KeyCode::Esc, _) => {
                self.input.clear();
                self.input_cursor = 0;
                self.dirty = true;
            }
            (KeyCode::Char(ch), _) => {
                self.insert_char(ch);
                self.dirty = true;
            }
            _ => {}
        }
        None
    }

    /// Kick off a streaming session for `panel` and forward its transport
    /// events into our own mailbox.
    fn start_session(&mut self, panel: &'static Panel, input: &str, me: Addr<TuiActor>) {
        let transport = if panel.uses_search {
            self.search_transport.clone()
        } else {
            self.transport.clone()
        };
        let options = StreamOptions {
            status_messages: panel.status_messages_vec(),
            show_progress: true,
            system_prompt: None,
        };

        self.current_input = input.to_string();
        let prompt = panel.build_prompt(input);

        let (tx, mut rx) = mpsc::channel(STREAM_MAILBOX);
        let generation = self.controller.start(transport, prompt, options, tx);
        tracing::info!(panel = panel.id, generation, "session.start");

        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if me.send(TuiMsg::Stream(msg)).await.is_err() {
                    break;
                }
            }
        });
    }

    fn route_submit(&mut self, line: String, me: Addr<TuiActor>) {
        let s = line.trim().to_string();

        if s.starts_with('/') {
            let cmd = parse_command(&s);
            self.handle_command(cmd, me);
            return;
        }

        let Some(panel) = self.active else {
            if !s.is_empty() {
                self.push_styled(
                    "× No panel selected. Use '/panel <id>' first, or '/panels'.",
                    styles::error(),
                );
            }
            return;
        };

        if s.is_empty() && panel.needs_input {
            self.push_styled(format!("× This panel needs input: {}", panel.hint), styles::dim());
            return;
        }

        if !s.is_empty() {
            self.push_styled("→ [You]", styles::user_header());
            for line in s.lines() {
                self.push_styled(format!("  {line}"), styles::user_text());
            }
            self.push_blank();
        }

        self.start_session(panel, &s, me);
    }

    fn handle_command(&mut self, cmd: Command, me: Addr<TuiActor>) {
        match cmd {
            Command::Quit => {
                let _ = me.try_send(TuiMsg::Shutdown);
            }
            Command::Help => {
                self.push_styled("Commands:", styles::label());
                self.push_styled("  /panel <id>     switch content panel", styles::value());
                self.push_styled("  /panel          show the active panel", styles::value());
                self.push_styled("  /panel -        deselect and clear", styles::value());
                self.push_styled("  /panels         list available panels", styles::value());
                self.push_styled("  /clear          reset the active session", styles::value());
                self.push_styled("  /save           keep the completed response", styles::value());
                self.push_styled("  /sessions [id]  list saved sessions", styles::value());
                self.push_styled("  /load <uuid>    replay a saved session", styles::value());
                self.push_styled("  /search <query> ask the web-search proxy", styles::value());
                self.push_styled("  /quit           exit", styles::value());
                self.push_blank();
            }
            Command::Panels => {
                self.push_styled("Panels:", styles::label());
                for panel in catalog::catalog() {
                    if self.disabled.iter().any(|d| d == panel.id) {
                        self.push_styled(
                            format!("  {:<16} {} (disabled)", panel.id, panel.title),
                            styles::dim(),
                        );
                    } else {
                        self.push_styled(
                            format!("  {:<16} {}", panel.id, panel.title),
                            styles::value(),
                        );
                    }
                }
                self.push_blank();
            }
            Command::Panel(None) => {
                if let Some(panel) = self.active {
                    self.push_styled("Active panel:", styles::label());
                    self.push_styled(format!("  {}: {}", panel.id, panel.hint), styles::value());
                } else {
                    self.push_styled("No active panel. Use '/panel <id>'.", styles::dim());
                }
                self.push_blank();
            }
            Command::Panel(Some(id)) => {
                if id.is_empty() {
                    self.active = None;
                    self.controller.clear();
                    self.push_styled("✓ Deselected panel and cleared the session.", styles::system());
                    self.push_blank();
                    return;
                }
                if self.disabled.iter().any(|d| *d == id) {
                    self.push_styled(format!("× Panel disabled in config: {id}"), styles::error());
                    self.push_blank();
                    return;
                }
                match catalog::find(&id) {
                    Some(panel) => {
                        self.active = Some(panel);
                        self.controller.clear();
                        self.push_styled(format!("→ [{}]", panel.title), styles::user_header());
                        self.push_styled(format!("  {}", panel.hint), styles::dim());
                        self.push_blank();
                    }
                    None => {
                        self.push_styled(format!("× Unknown panel: {id}"), styles::error());
                        self.push_styled("Try '/panels'.", styles::dim());
                        self.push_blank();
                    }
                }
            }
            Command::Clear => {
                self.controller.clear();
                self.push_styled("✓ Cleared the active session.", styles::system());
                self.push_blank();
            }
            Command::Save => self.save_current(me),
            Command::Sessions(panel) => self.list_sessions(panel, me),
            Command::Load(id) => self.load_session(id, me),
            Command::Search(query) => {
                if self.disabled.iter().any(|d| d == "web-search") {
                    self.push_styled("× The web-search panel is disabled in config.", styles::error());
                    self.push_blank();
                    return;
                }
                // Shortcut: run the search panel without switching first.
                let panel = catalog::find("web-search").expect("web-search panel exists");
                self.active = Some(panel);
                self.push_styled("→ [You]", styles::user_header());
                self.push_styled(format!("  {query}"), styles::user_text());
                self.push_blank();
                self.start_session(panel, &query, me);
            }
            Command::Unknown(s) => {
                self.push_styled(format!("× Unknown command: {s}"), styles::error());
                self.push_styled("Try '/help'.", styles::dim());
                self.push_blank();
            }
        }
    }

    fn save_current(&mut self, me: Addr<TuiActor>) {
        let Some(panel) = self.active else {
            self.push_styled("× Nothing to save: no panel selected.", styles::error());
            return;
        };
        let state = self.controller.state();
        if !state.is_complete() {
            self.push_styled(
                "× Nothing to save yet: wait for a completed response.",
                styles::error(),
            );
            return;
        }

        let record = SavedSession {
            id: Uuid::new_v4(),
            panel: panel.id.to_string(),
            input: self.current_input.clone(),
            content: state.content.clone(),
            saved_at: Utc::now(),
        };
        let record_id = record.id;

        self.set_busy(true);
        let store = self.store.clone();
        tokio::spawn(async move {
            let (tx, rx) = oneshot::channel();
            let outcome = match store.send(StoreMsg::SaveSession { record, reply: tx }).await {
                Ok(_) => match rx.await {
                    Ok(Ok(())) => TuiMsg::Saved(record_id),
                    Ok(Err(e)) => TuiMsg::OpError(format!("save: {e}")),
                    Err(_) => TuiMsg::OpError("store reply dropped".into()),
                },
                Err(_) => TuiMsg::OpError("store mailbox dropped".into()),
            };
            let _ = me.send(outcome).await;
        });
    }

    fn list_sessions(&mut self, panel: Option<String>, me: Addr<TuiActor>) {
        self.set_busy(true);
        let store = self.store.clone();
        tokio::spawn(async move {
            let (tx, rx) = oneshot::channel();
            let outcome = match store
                .send(StoreMsg::ListSessions {
                    panel,
                    limit: SESSION_LIST_LIMIT,
                    reply: tx,
                })
                .await
            {
                Ok(_) => match rx.await {
                    Ok(Ok(records)) => TuiMsg::SessionsListed(records),
                    Ok(Err(e)) => TuiMsg::OpError(format!("sessions: {e}")),
                    Err(_) => TuiMsg::OpError("store reply dropped".into()),
                },
                Err(_) => TuiMsg::OpError("store mailbox dropped".into()),
            };
            let _ = me.send(outcome).await;
        });
    }

    fn load_session(&mut self, id: String, me: Addr<TuiActor>) {
        let id = match Uuid::parse_str(id.trim()) {
            Ok(id) => id,
            Err(_) => {
                self.push_styled(format!("× Not a session id: {id}"), styles::error());
                self.push_styled("Ids come from '/sessions'.", styles::dim());
                return;
            }
        };

        self.set_busy(true);
        let store = self.store.clone();
        tokio::spawn(async move {
            let (tx, rx) = oneshot::channel();
            let outcome = match store.send(StoreMsg::GetSession { id, reply: tx }).await {
                Ok(_) => match rx.await {
                    Ok(Ok(record)) => TuiMsg::SessionLoaded(record),
                    Ok(Err(e)) => TuiMsg::OpError(format!("load: {e}")),
                    Err(_) => TuiMsg::OpError("store reply dropped".into()),
                },
                Err(_) => TuiMsg::OpError("store mailbox dropped".into()),
            };
            let _ = me.send(outcome).await;
        });
    }

    /// Replay a saved record through the normal session machinery so the
    /// reveal animation and completion state behave as if it had just
    /// streamed in.
    fn replay_saved(&mut self, record: SavedSession) {
        if let Some(panel) = catalog::find(&record.panel) {
            self.active = Some(panel);
        }
        self.current_input = record.input.clone();

        let generation = self.controller.begin(&StreamOptions::default());
        self.controller.apply(SessionMsg {
            generation,
            event: SessionEvent::Chunk(record.content),
        });
        self.controller.apply(SessionMsg {
            generation,
            event: SessionEvent::Completed,
        });

        self.push_styled(
            format!(
                "✓ Loaded session {} ({}, saved {})",
                record.id,
                record.panel,
                record.saved_at.format("%Y-%m-%d %H:%M")
            ),
            styles::system(),
        );
        self.push_blank();
    }

    fn render_completion(&mut self) {
        let state = self.controller.state();
        let title = self
            .active
            .map(|p| p.title)
            .unwrap_or("Response");
        let chars = state.content.chars().count();
        let bullets: Vec<String> = extract_bullets(&state.content)
            .into_iter()
            .take(5)
            .collect();

        self.push_styled(format!("← [{title}]"), styles::coach_header());
        self.push_styled(
            format!("  response complete ({chars} chars); '/save' to keep it"),
            styles::coach_text(),
        );
        if !bullets.is_empty() {
            self.push_styled("  Next steps:", styles::label());
            for item in bullets {
                self.push_styled(format!("    • {item}"), styles::value());
            }
        }
        self.push_blank();
    }
}

#[async_trait]
impl Actor for TuiActor {
    type Msg = TuiMsg;

    async fn handle(&mut self, msg: Self::Msg, ctx: &mut Context<Self>) -> Result<()> {
        match msg {
            TuiMsg::InputEvent(ev) => {
                if let CtEvent::Key(k) = ev
                    && let Some(next) = self.handle_key(k)
                {
                    let _ = ctx.addr().try_send(next);
                }
            }
            TuiMsg::Submit(line) => self.route_submit(line, ctx.addr()),
            TuiMsg::Stream(msg) => {
                match self.controller.apply(msg) {
                    Some(SessionSignal::Progress { step, label }) => {
                        tracing::debug!(step, %label, "session.progress");
                    }
                    Some(SessionSignal::Completed) => self.render_completion(),
                    Some(SessionSignal::Failed(e)) => {
                        self.push_styled(format!("× Error: {e}"), styles::error());
                        self.push_styled(
                            "  Resubmit to retry, or '/clear' to reset.",
                            styles::dim(),
                        );
                        self.push_blank();
                    }
                    None => {}
                }
                self.dirty = true;
            }
            TuiMsg::Saved(id) => {
                self.push_styled(format!("✓ Saved as {id}"), styles::system());
                self.push_blank();
                self.set_busy(false);
            }
            TuiMsg::SessionsListed(records) => {
                if records.is_empty() {
                    self.push_styled("No saved sessions.", styles::dim());
                } else {
                    self.push_styled("Saved sessions:", styles::label());
                    for r in &records {
                        self.push_styled(
                            format!(
                                "  {}  {:<16} {}",
                                r.id,
                                r.panel,
                                r.saved_at.format("%Y-%m-%d %H:%M")
                            ),
                            styles::value(),
                        );
                    }
                    self.push_styled("  '/load <uuid>' replays one.", styles::dim());
                }
                self.push_blank();
                self.set_busy(false);
            }
            TuiMsg::SessionLoaded(record) => {
                self.replay_saved(record);
                self.set_busy(false);
            }
            TuiMsg::OpError(e) => {
                self.push_styled(format!("× Error: {e}"), styles::error());
                self.push_blank();
                self.set_busy(false);
            }
            TuiMsg::Tick => {
                let now = Instant::now();
                let elapsed = now.duration_since(self.last_frame);
                self.last_frame = now;

                self.reveal.observe(&self.controller.state().content);
                if self.reveal.advance(elapsed) {
                    self.dirty = true;
                }
                self.step_spinner();

                if self.dirty || self.last_tick.elapsed() >= self.tick_rate {
                    self.draw()?;
                    self.last_tick = now;
                    self.dirty = false;
                }
            }
            TuiMsg::ScrollUp => {
                self.scroll = self.scroll.saturating_add(1);
                self.dirty = true;
            }
            TuiMsg::ScrollDown => {
                self.scroll = self.scroll.saturating_sub(1);
                self.dirty = true;
            }
            TuiMsg::Shutdown => {
                disable_raw_mode().ok();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                self.shutdown.signal();
                ctx.stop();
            }
        }

        Ok(())
    }
}
