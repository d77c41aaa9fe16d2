use crate::catalog::{self, ModelCatalogs};
use crate::client::{ApiClient, Credentials};
use crate::commands::{self, Command};
use crate::controller::SessionController;
use crate::error::ChatError;
use crate::media::{self, ImageUpload};
use crate::session::{
    AssistantKind, CatalogKind, ContentPart, Message, Mode, ParameterUpdate, Session,
};
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, size};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use ratatui::{Frame, Terminal, TerminalOptions, Viewport};
use std::io;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

type TuiTerminal = Terminal<CrosstermBackend<io::Stdout>>;
type UiResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
type Controller = SessionController<ApiClient>;

const INPUT_HEIGHT: u16 = 7;

// Restores terminal settings even if the loop exits early.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Self {
        Self
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = io::stdout().flush();
    }
}

#[derive(Debug, Clone)]
enum ChatMessage {
    User(Vec<String>),
    Assistant(String),
    GeneratedImage(String),
    Info(String),
    Error(String),
}

#[derive(Debug, Clone)]
struct LineSpec {
    text: String,
    style: Style,
}

impl LineSpec {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

impl ChatMessage {
    fn from_turn(message: &Message) -> Self {
        match message {
            Message::User { parts } => ChatMessage::User(parts.iter().map(describe_part).collect()),
            Message::Assistant { kind, value } => match kind {
                AssistantKind::Text => ChatMessage::Assistant(value.clone()),
                AssistantKind::GeneratedImage => ChatMessage::GeneratedImage(value.clone()),
            },
        }
    }

    fn line_specs(&self) -> Vec<LineSpec> {
        match self {
            ChatMessage::User(parts) => {
                let header_style = Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD);
                let body_style = Style::default().fg(Color::Blue);
                let mut lines = vec![LineSpec::new("You:", header_style)];
                for line in parts.iter().flat_map(|part| part.lines()) {
                    lines.push(LineSpec::new(format!("  {}", line), body_style));
                }
                lines
            }
            ChatMessage::Assistant(msg) => {
                let header_style = Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD);
                let body_style = Style::default().fg(Color::Yellow);
                let mut lines = vec![LineSpec::new("Assistant:", header_style)];
                for line in msg.lines() {
                    lines.push(LineSpec::new(format!("  {}", line), body_style));
                }
                lines
            }
            ChatMessage::GeneratedImage(url) => {
                let header_style = Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD);
                vec![
                    LineSpec::new("Assistant (image):", header_style),
                    LineSpec::new(format!("  {}", url), Style::default().fg(Color::Magenta)),
                    LineSpec::new(
                        "  Ctrl+O opens the latest image",
                        Style::default().fg(Color::DarkGray),
                    ),
                ]
            }
            ChatMessage::Info(msg) => msg
                .lines()
                .map(|line| {
                    LineSpec::new(
                        format!("ℹ {}", line),
                        Style::default()
                            .fg(Color::Gray)
                            .add_modifier(Modifier::ITALIC),
                    )
                })
                .collect(),
            ChatMessage::Error(msg) => vec![LineSpec::new(
                format!("✗ {}", msg),
                Style::default().fg(Color::Red),
            )],
        }
    }

    fn to_text(&self) -> Text<'static> {
        let lines = self
            .line_specs()
            .into_iter()
            .map(|spec| Line::from(Span::styled(spec.text, spec.style)))
            .collect::<Vec<_>>();
        Text::from(lines)
    }

    fn rendered_height(&self, width: u16) -> u16 {
        let width = width.max(1) as usize;
        let mut total = 0usize;
        for spec in self.line_specs() {
            let len = spec.text.chars().count().max(1);
            total += len.div_ceil(width);
        }
        total as u16
    }
}

fn describe_part(part: &ContentPart) -> String {
    match part {
        ContentPart::Text(text) => text.clone(),
        ContentPart::Image {
            mime_type,
            base64_payload,
            detail,
        } => match media::decode_payload(base64_payload) {
            Ok(bytes) => format!(
                "[attached image: {}, {} bytes, {} detail]",
                mime_type,
                bytes.len(),
                detail.as_str()
            ),
            Err(_) => "[attached image: unreadable payload]".to_string(),
        },
    }
}

enum Outcome {
    Sent(Result<(), ChatError>),
    Fetched(Result<ModelCatalogs, ChatError>),
}

enum UiEvent {
    SessionChanged(Session),
    Finished {
        controller: Box<Controller>,
        outcome: Outcome,
    },
}

struct InputBuffer {
    lines: Vec<String>,
    cursor_x: usize,
    cursor_y: usize,
}

impl InputBuffer {
    fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    fn clear(&mut self) {
        self.lines = vec![String::new()];
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    fn line_chars(&self, y: usize) -> usize {
        self.lines[y].chars().count()
    }

    // cursor_x counts chars; String APIs want byte offsets.
    fn byte_offset(line: &str, x: usize) -> usize {
        line.char_indices().nth(x).map_or(line.len(), |(idx, _)| idx)
    }

    fn insert_char(&mut self, c: char) {
        let line = &mut self.lines[self.cursor_y];
        let at = Self::byte_offset(line, self.cursor_x);
        line.insert(at, c);
        self.cursor_x += 1;
    }

    fn delete_char(&mut self) {
        if self.cursor_x > 0 {
            let line = &mut self.lines[self.cursor_y];
            let at = Self::byte_offset(line, self.cursor_x - 1);
            line.remove(at);
            self.cursor_x -= 1;
        } else if self.cursor_y > 0 {
            let removed = self.lines.remove(self.cursor_y);
            self.cursor_y -= 1;
            self.cursor_x = self.line_chars(self.cursor_y);
            self.lines[self.cursor_y].push_str(&removed);
        }
    }

    fn new_line(&mut self) {
        let line = &self.lines[self.cursor_y];
        let at = Self::byte_offset(line, self.cursor_x);
        let remaining = line[at..].to_string();
        self.lines[self.cursor_y].truncate(at);
        self.lines.insert(self.cursor_y + 1, remaining);
        self.cursor_y += 1;
        self.cursor_x = 0;
    }

    fn move_left(&mut self) {
        if self.cursor_x > 0 {
            self.cursor_x -= 1;
        } else if self.cursor_y > 0 {
            self.cursor_y -= 1;
            self.cursor_x = self.line_chars(self.cursor_y);
        }
    }

    fn move_right(&mut self) {
        if self.cursor_x < self.line_chars(self.cursor_y) {
            self.cursor_x += 1;
        } else if self.cursor_y < self.lines.len() - 1 {
            self.cursor_y += 1;
            self.cursor_x = 0;
        }
    }

    fn move_up(&mut self) {
        if self.cursor_y > 0 {
            self.cursor_y -= 1;
            self.cursor_x = self.cursor_x.min(self.line_chars(self.cursor_y));
        }
    }

    fn move_down(&mut self) {
        if self.cursor_y < self.lines.len() - 1 {
            self.cursor_y += 1;
            self.cursor_x = self.cursor_x.min(self.line_chars(self.cursor_y));
        }
    }

    fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }

    fn render(&self) -> Text<'static> {
        if self.is_empty() {
            return Text::from(Span::styled(
                "Type a message or /help ...",
                Style::default().fg(Color::DarkGray),
            ));
        }
        Text::from(
            self.lines
                .iter()
                .map(|l| Line::from(l.clone()))
                .collect::<Vec<_>>(),
        )
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

pub struct App {
    // Taken by the worker task while a request is in flight.
    controller: Option<Controller>,
    snapshot: Session,
    rendered_turns: usize,
    input_counter: u64,
    input: InputBuffer,
    attachments: Vec<ImageUpload>,
    should_quit: bool,
    sender: mpsc::Sender<UiEvent>,
    receiver: mpsc::Receiver<UiEvent>,
}

/// Queues a snapshot for the draw loop. A full or closed channel drops it;
/// the next `Finished` event resyncs the transcript.
fn publish(sender: &mpsc::Sender<UiEvent>, session: &Session) -> bool {
    match sender.try_send(UiEvent::SessionChanged(session.clone())) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(error = %err, turns = session.turns().len(), "session snapshot dropped");
            false
        }
    }
}

impl App {
    pub fn new(mut controller: Controller) -> Self {
        let (sender, receiver) = mpsc::channel(100);

        let observer = sender.clone();
        controller.subscribe(move |session| {
            publish(&observer, session);
        });

        Self {
            snapshot: controller.session().clone(),
            input_counter: controller.session().input_counter(),
            controller: Some(controller),
            rendered_turns: 0,
            input: InputBuffer::new(),
            attachments: Vec::new(),
            should_quit: false,
            sender,
            receiver,
        }
    }

    fn is_loading(&self) -> bool {
        self.controller.is_none()
    }

    fn status_line(&self) -> String {
        let session = &self.snapshot;
        let params = session.parameters();
        let model = match session.mode() {
            Mode::TextVision => session
                .selected_model(CatalogKind::TextVision)
                .unwrap_or("default")
                .to_string(),
            Mode::ImageGen => session
                .selected_model(CatalogKind::ImageGen)
                .unwrap_or("none")
                .to_string(),
        };
        let mut status = format!(
            "{} | model: {} | temp {:.1} | max {} | detail {}",
            session.mode().label(),
            model,
            params.temperature,
            params.max_tokens,
            params.image_detail.as_str()
        );
        if !self.attachments.is_empty() {
            status.push_str(&format!(" | {} attached", self.attachments.len()));
        }
        if !session.system_prompt().is_empty() {
            status.push_str(" | system set");
        }
        status
    }

    fn draw(&mut self, f: &mut Frame) {
        let area = f.area();
        let [status_area, input_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(area);

        let title = if self.is_loading() {
            " Enter send · Ctrl+T mode · Ctrl+L clear · Esc quit [Waiting...] "
        } else {
            " Enter send · Ctrl+T mode · Ctrl+L clear · Esc quit "
        };

        f.render_widget(
            Paragraph::new(Span::styled(
                self.status_line(),
                Style::default().fg(Color::DarkGray),
            )),
            status_area,
        );

        let input_paragraph = Paragraph::new(self.input.render())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(input_paragraph, input_area);

        let cursor_x = (self.input.cursor_x + 1) as u16;
        let cursor_y = self.input.cursor_y as u16;
        let x = (input_area.x + cursor_x).min(input_area.x + input_area.width - 2);
        let y = (input_area.y + 1 + cursor_y).min(input_area.y + input_area.height - 2);
        f.set_cursor_position((x, y));
    }

    fn append_message(&mut self, terminal: &mut TuiTerminal, message: ChatMessage) -> UiResult<()> {
        let width = terminal.size()?.width;
        let height = message.rendered_height(width).saturating_add(1);
        let mut text = message.to_text();
        text.extend(Text::raw("\n"));
        // Insert above the inline viewport so the log stays in scrollback.
        terminal.insert_before(height, |buf| {
            let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });
            paragraph.render(buf.area, buf);
        })?;
        Ok(())
    }

    fn info(&mut self, terminal: &mut TuiTerminal, msg: impl Into<String>) -> UiResult<()> {
        self.append_message(terminal, ChatMessage::Info(msg.into()))
    }

    fn error(&mut self, terminal: &mut TuiTerminal, err: &ChatError) -> UiResult<()> {
        tracing::debug!(error = ?err, "action failed");
        self.append_message(terminal, ChatMessage::Error(err.to_string()))
    }

    /// Prints turns the terminal has not shown yet.
    fn sync_transcript(&mut self, terminal: &mut TuiTerminal, session: Session) -> UiResult<()> {
        if session.turns().len() < self.rendered_turns {
            self.info(terminal, "── conversation cleared ──")?;
            self.rendered_turns = 0;
        }
        let fresh: Vec<ChatMessage> = session.turns()[self.rendered_turns..]
            .iter()
            .map(ChatMessage::from_turn)
            .collect();
        self.rendered_turns = session.turns().len();
        for message in fresh {
            self.append_message(terminal, message)?;
        }

        // A bumped counter means the turn went through; drop the old input.
        if session.input_counter() != self.input_counter {
            self.input_counter = session.input_counter();
            self.input.clear();
            self.attachments.clear();
        }
        self.snapshot = session;
        Ok(())
    }

    fn handle_events(&mut self, terminal: &mut TuiTerminal) -> UiResult<bool> {
        while let Ok(event) = self.receiver.try_recv() {
            match event {
                UiEvent::SessionChanged(session) => {
                    self.sync_transcript(terminal, session)?;
                }
                UiEvent::Finished {
                    controller,
                    outcome,
                } => {
                    let session = controller.session().clone();
                    self.controller = Some(*controller);
                    self.sync_transcript(terminal, session)?;
                    match outcome {
                        Outcome::Sent(Ok(())) => {}
                        Outcome::Sent(Err(err)) | Outcome::Fetched(Err(err)) => {
                            self.error(terminal, &err)?
                        }
                        Outcome::Fetched(Ok(catalogs)) => self.show_catalogs(terminal, &catalogs)?,
                    }
                }
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return self.handle_key(terminal, key);
            }
        }

        Ok(true)
    }

    fn handle_key(&mut self, terminal: &mut TuiTerminal, key: KeyEvent) -> UiResult<bool> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                return Ok(false);
            }
            KeyCode::Esc => {
                self.should_quit = true;
                return Ok(false);
            }
            KeyCode::Char('t') if ctrl => {
                if let Some(controller) = self.controller.as_mut() {
                    controller.toggle_mode();
                }
            }
            KeyCode::Char('l') if ctrl => {
                if let Some(controller) = self.controller.as_mut() {
                    controller.clear();
                }
            }
            KeyCode::Char('o') if ctrl => self.open_latest_image(terminal)?,
            KeyCode::Enter => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.input.new_line();
                } else if self.is_loading() {
                    self.info(terminal, "Still waiting for the previous request.")?;
                } else {
                    self.submit(terminal)?;
                }
            }
            KeyCode::Char(c) => self.input.insert_char(c),
            KeyCode::Backspace => self.input.delete_char(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Up => self.input.move_up(),
            KeyCode::Down => self.input.move_down(),
            KeyCode::Home => self.input.cursor_x = 0,
            KeyCode::End => self.input.cursor_x = self.input.line_chars(self.input.cursor_y),
            _ => {}
        }
        Ok(true)
    }

    fn submit(&mut self, terminal: &mut TuiTerminal) -> UiResult<()> {
        let text = self.input.text();
        match commands::parse(&text) {
            Some(Ok(command)) => {
                self.input.clear();
                self.run_command(terminal, command)
            }
            Some(Err(usage)) => self.append_message(terminal, ChatMessage::Error(usage)),
            None => {
                self.spawn_send(text);
                Ok(())
            }
        }
    }

    fn run_command(&mut self, terminal: &mut TuiTerminal, command: Command) -> UiResult<()> {
        let Some(controller) = self.controller.as_mut() else {
            return Ok(());
        };
        match command {
            Command::SetBaseUrl(base_url) => {
                let api_key = controller.credentials().api_key.clone();
                controller.set_credentials(Credentials::new(base_url, api_key));
                self.info(terminal, "Base URL updated.")
            }
            Command::SetApiKey(api_key) => {
                let base_url = controller.credentials().base_url.clone();
                controller.set_credentials(Credentials::new(base_url, api_key));
                self.info(terminal, "Key updated.")
            }
            Command::FetchModels => {
                self.spawn_fetch();
                Ok(())
            }
            Command::SelectModel { catalog, choice } => {
                let known = match catalog {
                    CatalogKind::TextVision => &self.snapshot.catalogs().text_vision,
                    CatalogKind::ImageGen => &self.snapshot.catalogs().image_gen,
                };
                let id = catalog::resolve_choice(known, &choice);
                controller.select_model(catalog, id.clone());
                self.info(terminal, format!("Using {}.", id))
            }
            Command::SetSystemPrompt(text) => {
                controller.set_system_prompt(text);
                self.info(terminal, "System message updated.")
            }
            Command::SetMode(mode) => {
                controller.set_mode(mode);
                Ok(())
            }
            Command::SetTemperature(temperature) => {
                controller.set_parameters(ParameterUpdate {
                    temperature: Some(temperature),
                    ..ParameterUpdate::default()
                });
                Ok(())
            }
            Command::SetMaxTokens(max_tokens) => {
                controller.set_parameters(ParameterUpdate {
                    max_tokens: Some(max_tokens),
                    ..ParameterUpdate::default()
                });
                Ok(())
            }
            Command::SetImageDetail(detail) => {
                controller.set_parameters(ParameterUpdate {
                    image_detail: Some(detail),
                    ..ParameterUpdate::default()
                });
                Ok(())
            }
            Command::Attach(paths) => {
                for path in paths {
                    self.attach(terminal, &path)?;
                }
                Ok(())
            }
            Command::Detach => {
                self.attachments.clear();
                self.info(terminal, "Attachments removed.")
            }
            Command::Clear => {
                controller.clear();
                Ok(())
            }
            Command::Help => self.info(terminal, commands::help_lines().join("\n")),
        }
    }

    fn attach(&mut self, terminal: &mut TuiTerminal, path: &Path) -> UiResult<()> {
        match std::fs::read(path) {
            Ok(bytes) => {
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let note = format!("Attached {} ({} bytes).", filename, bytes.len());
                self.attachments.push(ImageUpload::new(filename, bytes));
                self.info(terminal, note)
            }
            Err(err) => self.append_message(
                terminal,
                ChatMessage::Error(format!("Cannot read {}: {}", path.display(), err)),
            ),
        }
    }

    fn show_catalogs(&mut self, terminal: &mut TuiTerminal, catalogs: &ModelCatalogs) -> UiResult<()> {
        if catalogs.is_empty() {
            return self.info(terminal, "The provider listed no known chat or image models.");
        }
        let list = |ids: &[String]| {
            if ids.is_empty() {
                "  (none)".to_string()
            } else {
                ids.iter()
                    .enumerate()
                    .map(|(i, id)| format!("  {}) {}", i + 1, id))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        };
        self.info(
            terminal,
            format!(
                "Text/vision models (/model):\n{}\nImage generation models (/image-model):\n{}",
                list(&catalogs.text_vision),
                list(&catalogs.image_gen)
            ),
        )
    }

    fn open_latest_image(&mut self, terminal: &mut TuiTerminal) -> UiResult<()> {
        let Some(url) = self.snapshot.latest_generated_image().map(str::to_string) else {
            return self.info(terminal, "No generated image yet.");
        };
        if let Err(err) = open::that(&url) {
            self.append_message(terminal, ChatMessage::Error(format!("Cannot open {}: {}", url, err)))?;
        }
        Ok(())
    }

    fn spawn_send(&mut self, text: String) {
        let Some(mut controller) = self.controller.take() else {
            return;
        };
        let images = self.attachments.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let outcome = controller.send(Some(text.as_str()), &images).await;
            let _ = sender
                .send(UiEvent::Finished {
                    controller: Box::new(controller),
                    outcome: Outcome::Sent(outcome),
                })
                .await;
        });
    }

    fn spawn_fetch(&mut self) {
        let Some(mut controller) = self.controller.take() else {
            return;
        };
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let Credentials { base_url, api_key } = controller.credentials().clone();
            let outcome = controller.fetch_models(&base_url, &api_key).await;
            let _ = sender
                .send(UiEvent::Finished {
                    controller: Box::new(controller),
                    outcome: Outcome::Fetched(outcome),
                })
                .await;
        });
    }
}

pub fn run_tui(controller: Controller) -> UiResult<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    let (_, rows) = size()?;
    if rows > 0 {
        // Push existing screen content into scrollback without clearing it.
        for _ in 0..rows {
            writeln!(stdout)?;
        }
        stdout.flush()?;
    }
    execute!(stdout, MoveTo(0, 0))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(INPUT_HEIGHT),
        },
    )?;

    let mut app = App::new(controller);

    let _guard = TerminalGuard::new();

    app.info(&mut terminal, "KeyChat. /help lists commands; /models fetches the catalog.")?;
    terminal.draw(|f| app.draw(f))?;

    while !app.should_quit {
        if !app.handle_events(&mut terminal)? {
            break;
        }

        terminal.draw(|f| app.draw(f))?;

        std::thread::sleep(Duration::from_millis(10));
    }

    disable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ImageDetail;

    #[test]
    fn publish_drops_snapshots_when_the_queue_is_full() {
        let (sender, mut receiver) = mpsc::channel(1);
        let session = Session::default();

        assert!(publish(&sender, &session));
        assert!(!publish(&sender, &session));

        assert!(matches!(receiver.try_recv(), Ok(UiEvent::SessionChanged(_))));
        assert!(receiver.try_recv().is_err());

        drop(receiver);
        assert!(!publish(&sender, &session));
    }

    #[test]
    fn input_buffer_shift_enter_inserts_new_line() {
        let mut buffer = InputBuffer::new();
        for ch in "hello".chars() {
            buffer.insert_char(ch);
        }
        buffer.new_line();
        for ch in "world".chars() {
            buffer.insert_char(ch);
        }

        assert_eq!(buffer.text(), "hello\nworld");
        assert_eq!(buffer.lines.len(), 2);
        assert_eq!(buffer.cursor_y, 1);
    }

    #[test]
    fn input_buffer_edits_multibyte_text() {
        let mut buffer = InputBuffer::new();
        for ch in "héllo".chars() {
            buffer.insert_char(ch);
        }
        buffer.move_left();
        buffer.move_left();
        buffer.delete_char();
        assert_eq!(buffer.text(), "hélo");
        buffer.new_line();
        assert_eq!(buffer.text(), "hé\nlo");
    }

    #[test]
    fn user_turn_shows_text_and_decoded_image_size() {
        let message = Message::User {
            parts: vec![
                ContentPart::Text("look".to_string()),
                ContentPart::Image {
                    mime_type: "image/png",
                    base64_payload: media::encode_payload(&[0u8; 10]),
                    detail: ImageDetail::Low,
                },
            ],
        };
        let ChatMessage::User(lines) = ChatMessage::from_turn(&message) else {
            panic!("expected user bubble");
        };
        assert_eq!(lines[0], "look");
        assert_eq!(lines[1], "[attached image: image/png, 10 bytes, low detail]");
    }

    #[test]
    fn generated_image_turn_renders_url() {
        let message = Message::generated_image("https://img.example/a.png");
        match ChatMessage::from_turn(&message) {
            ChatMessage::GeneratedImage(url) => assert_eq!(url, "https://img.example/a.png"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
