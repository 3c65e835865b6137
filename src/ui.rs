use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::{io, time::Duration};
use textwrap::wrap;
use tui_input::Input;

use parley::dialog::AddMembersDialog;
use parley::forms::{masked, Edit, LoginField, RegisterField};
use parley::models::{ChatSummary, Contact, Message};
use parley::state::{Action, AppState, ChatFocus, Effect, Provider, Screen, Tab};

use crate::utils;

// Export types needed by main module
pub use ratatui::Terminal;
pub use ratatui::backend::CrosstermBackend;

const ACCENT: Color = Color::Magenta;
const FOCUS: Color = Color::Yellow;

/// What the main loop should do after a key press.
#[derive(Debug, PartialEq)]
pub enum UiEvent {
    Continue,
    Quit,
    Effect(Effect),
}

enum Command {
    Quit,
    Apply(Action),
}

pub struct ChatUI {
    state: AppState,
}

impl ChatUI {
    pub fn new(state: AppState) -> Self {
        ChatUI { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Shows a one-line message in the status area until the next key press.
    pub fn set_notice(&mut self, text: String) {
        self.state.notice = Some(text);
    }

    /// Waits briefly for a key press and handles it.
    pub fn handle_input(&mut self) -> Result<UiEvent> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key));
                }
            }
        }
        Ok(UiEvent::Continue)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> UiEvent {
        match self.command_for_key(key) {
            Some(Command::Quit) => UiEvent::Quit,
            Some(Command::Apply(action)) => match self.state.apply(action) {
                Effect::None => UiEvent::Continue,
                effect => UiEvent::Effect(effect),
            },
            None => UiEvent::Continue,
        }
    }

    fn command_for_key(&self, key: KeyEvent) -> Option<Command> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return Some(Command::Quit);
        }
        if self.state.help_visible {
            return Some(Command::Apply(Action::DismissHelp));
        }
        if key.code == KeyCode::F(1) {
            return Some(Command::Apply(Action::ShowHelp));
        }
        if let Some(dialog) = &self.state.dialog {
            return dialog_key(key, dialog).map(Command::Apply);
        }

        match self.state.screen {
            Screen::Login => self.login_key(key, ctrl),
            Screen::Register => register_key(key, ctrl).map(Command::Apply),
            Screen::Main => self.main_key(key, ctrl),
        }
    }

    fn login_key(&self, key: KeyEvent, ctrl: bool) -> Option<Command> {
        let action = match key.code {
            KeyCode::Esc => return Some(Command::Quit),
            KeyCode::Enter => Action::Submit,
            KeyCode::Tab | KeyCode::Down => Action::FocusNext,
            KeyCode::BackTab | KeyCode::Up => Action::FocusPrev,
            KeyCode::Char('p') if ctrl => Action::ToggleShowPassword,
            KeyCode::Char('r') if ctrl => Action::GoToRegister,
            KeyCode::Char('f') if ctrl => Action::ForgotPassword,
            KeyCode::Char('g') if ctrl => Action::ExternalSignIn(Provider::GitHub),
            KeyCode::Char('o') if ctrl => Action::ExternalSignIn(Provider::Google),
            _ if self.state.login.focus == LoginField::RememberMe && key.code == KeyCode::Char(' ') => {
                Action::ToggleRememberMe
            }
            _ => Action::Edit(edit_for_key(key)?),
        };
        Some(Command::Apply(action))
    }

    fn main_key(&self, key: KeyEvent, ctrl: bool) -> Option<Command> {
        let action = match key.code {
            KeyCode::Esc => return Some(Command::Quit),
            KeyCode::F(2) => Action::SwitchTab(Tab::Chats),
            KeyCode::F(3) => Action::SwitchTab(Tab::Contacts),
            KeyCode::F(4) => Action::SwitchTab(Tab::Settings),
            KeyCode::Char('a') if ctrl => Action::OpenAddMembers,
            KeyCode::Char('l') if ctrl => Action::Logout,
            KeyCode::Tab => Action::FocusNext,
            KeyCode::BackTab => Action::FocusPrev,
            KeyCode::Up => Action::MoveCursor(-1),
            KeyCode::Down => Action::MoveCursor(1),
            KeyCode::Enter => {
                if self.state.tab == Tab::Chats && self.state.chat_focus == ChatFocus::Composer {
                    Action::SendMessage { time: utils::time_label(Local::now()) }
                } else {
                    return None;
                }
            }
            _ => Action::Edit(edit_for_key(key)?),
        };
        Some(Command::Apply(action))
    }

    pub fn draw<B: Backend>(&self, frame: &mut Frame<B>) {
        let size = frame.size();

        match self.state.screen {
            Screen::Login => draw_login(frame, &self.state, size),
            Screen::Register => draw_register(frame, &self.state, size),
            Screen::Main => draw_main(frame, &self.state, size),
        }

        if let Some(dialog) = &self.state.dialog {
            draw_add_members_dialog(frame, dialog, size);
        }

        if self.state.help_visible {
            draw_help_dialog(frame, size);
        }
    }
}

fn register_key(key: KeyEvent, ctrl: bool) -> Option<Action> {
    let action = match key.code {
        KeyCode::Esc => Action::GoToLogin,
        KeyCode::Enter => Action::Submit,
        KeyCode::Tab | KeyCode::Down => Action::FocusNext,
        KeyCode::BackTab | KeyCode::Up => Action::FocusPrev,
        KeyCode::Char('p') if ctrl => Action::ToggleShowPassword,
        KeyCode::Char('l') if ctrl => Action::GoToLogin,
        KeyCode::Char('g') if ctrl => Action::ExternalSignIn(Provider::GitHub),
        KeyCode::Char('o') if ctrl => Action::ExternalSignIn(Provider::Google),
        _ => Action::Edit(edit_for_key(key)?),
    };
    Some(action)
}

fn dialog_key(key: KeyEvent, dialog: &AddMembersDialog) -> Option<Action> {
    let on_chips = dialog.chip_cursor().is_some();
    let action = match key.code {
        KeyCode::Esc => Action::CancelMembers,
        KeyCode::Enter => Action::ConfirmMembers,
        KeyCode::Tab => Action::ToggleMemberUnderCursor,
        KeyCode::BackTab => Action::FocusChips,
        KeyCode::Up => Action::MoveCursor(-1),
        KeyCode::Down => Action::MoveCursor(1),
        KeyCode::Left if on_chips => Action::MoveChipCursor(-1),
        KeyCode::Right if on_chips => Action::MoveChipCursor(1),
        // Backspace on an empty search box, or Delete on a focused chip,
        // drops a chip.
        KeyCode::Delete | KeyCode::Backspace if on_chips => Action::ToggleMember(dialog.chip_to_remove()?),
        KeyCode::Backspace if dialog.query().is_empty() => Action::ToggleMember(dialog.chip_to_remove()?),
        KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::ClearMembers,
        _ => Action::Edit(edit_for_key(key)?),
    };
    Some(action)
}

fn edit_for_key(key: KeyEvent) -> Option<Edit> {
    let edit = match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            Edit::Insert(c)
        }
        KeyCode::Backspace => Edit::Backspace,
        KeyCode::Delete => Edit::Delete,
        KeyCode::Left => Edit::Left,
        KeyCode::Right => Edit::Right,
        KeyCode::Home => Edit::Home,
        KeyCode::End => Edit::End,
        _ => {
            debug!("UI: unhandled key {:?}", key);
            return None;
        }
    };
    Some(edit)
}

fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(FOCUS)
    } else {
        Style::default()
    }
}

/// A bordered single-line text field. `shown` is what gets displayed, which
/// differs from the input value for masked passwords.
fn draw_field<B: Backend>(f: &mut Frame<B>, area: Rect, title: &str, input: &Input, shown: String, focused: bool) {
    let field = Paragraph::new(shown).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(border_style(focused)),
    );
    f.render_widget(field, area);

    if focused {
        f.set_cursor(area.x + input.cursor() as u16 + 1, area.y + 1);
    }
}

fn notice_line(notice: &Option<String>) -> Line<'static> {
    match notice {
        Some(text) => Line::from(Span::styled(text.clone(), Style::default().fg(Color::Red))),
        None => Line::from(""),
    }
}

fn draw_login<B: Backend>(f: &mut Frame<B>, state: &AppState, area: Rect) {
    let form = &state.login;
    let card = centered(62, 20, area);

    f.render_widget(Clear, card);
    f.render_widget(
        Block::default()
            .title(" Sign in ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
        card,
    );

    let inner = card.inner(&Margin { vertical: 1, horizontal: 2 });
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),  // Greeting
            Constraint::Length(3),  // Email
            Constraint::Length(3),  // Password
            Constraint::Length(2),  // Remember me
            Constraint::Length(4),  // Shortcuts
            Constraint::Length(1),  // Banner
            Constraint::Length(1),  // Notice
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new("Welcome back! Sign in to your account").style(Style::default().add_modifier(Modifier::BOLD)),
        chunks[0],
    );

    draw_field(f, chunks[1], "Email", &form.email, form.email.value().to_string(), form.focus == LoginField::Email);
    draw_field(
        f,
        chunks[2],
        "Password",
        &form.password,
        masked(form.password.value(), form.show_password),
        form.focus == LoginField::Password,
    );

    let checkbox = if form.remember_me { "[x]" } else { "[ ]" };
    let checkbox_style = if form.focus == LoginField::RememberMe {
        Style::default().fg(FOCUS).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    f.render_widget(
        Paragraph::new(Span::styled(format!("{} Remember me", checkbox), checkbox_style)),
        chunks[3],
    );

    let hints = vec![
        Line::from("Enter sign in | Tab next field | Ctrl+P show password"),
        Line::from("Ctrl+F forgot password | Ctrl+R create account"),
        Line::from("Ctrl+G sign in with GitHub | Ctrl+O sign in with Google"),
    ];
    f.render_widget(Paragraph::new(hints).style(Style::default().fg(Color::Gray)), chunks[4]);

    f.render_widget(
        Paragraph::new("🛡 Secure connection with E2E encryption").style(Style::default().fg(Color::Green)),
        chunks[5],
    );
    f.render_widget(Paragraph::new(notice_line(&state.notice)), chunks[6]);
}

fn draw_register<B: Backend>(f: &mut Frame<B>, state: &AppState, area: Rect) {
    let form = &state.register;
    let card = centered(62, 24, area);

    f.render_widget(Clear, card);
    f.render_widget(
        Block::default()
            .title(" Create account ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
        card,
    );

    let inner = card.inner(&Margin { vertical: 1, horizontal: 2 });
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),  // Greeting
            Constraint::Length(3),  // Name
            Constraint::Length(3),  // Email
            Constraint::Length(3),  // Password
            Constraint::Length(3),  // Confirm password
            Constraint::Length(1),  // Banner
            Constraint::Length(3),  // Shortcuts
            Constraint::Length(1),  // Notice
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new("Join the secure messenger").style(Style::default().add_modifier(Modifier::BOLD)),
        chunks[0],
    );

    draw_field(f, chunks[1], "Your name", &form.name, form.name.value().to_string(), form.focus == RegisterField::Name);
    draw_field(f, chunks[2], "Email", &form.email, form.email.value().to_string(), form.focus == RegisterField::Email);
    draw_field(
        f,
        chunks[3],
        "Password",
        &form.password,
        masked(form.password.value(), form.show_password),
        form.focus == RegisterField::Password,
    );
    draw_field(
        f,
        chunks[4],
        "Confirm password",
        &form.confirm_password,
        masked(form.confirm_password.value(), form.show_password),
        form.focus == RegisterField::ConfirmPassword,
    );

    f.render_widget(
        Paragraph::new("🛡 All data is protected by end-to-end encryption").style(Style::default().fg(Color::Green)),
        chunks[5],
    );

    let hints = vec![
        Line::from("Enter create account | Tab next field | Ctrl+P show password"),
        Line::from("Ctrl+G GitHub | Ctrl+O Google | Ctrl+L or Esc back to sign in"),
    ];
    f.render_widget(Paragraph::new(hints).style(Style::default().fg(Color::Gray)), chunks[6]);
    f.render_widget(Paragraph::new(notice_line(&state.notice)), chunks[7]);
}

fn draw_main<B: Backend>(f: &mut Frame<B>, state: &AppState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),     // Panes
            Constraint::Length(1),  // Status line
        ])
        .split(area);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16),      // Navigation rail
            Constraint::Percentage(35),  // List pane
            Constraint::Min(20),         // Chat window
        ])
        .split(rows[0]);

    draw_rail(f, state.tab, panes[0]);
    match state.tab {
        Tab::Chats => draw_chat_list(f, state, panes[1]),
        Tab::Contacts => draw_contact_list(f, state, panes[1]),
        Tab::Settings => draw_settings(f, state, panes[1]),
    }
    draw_chat_window(f, state, panes[2]);

    let status = match &state.notice {
        Some(text) => Line::from(Span::styled(text.clone(), Style::default().fg(FOCUS))),
        None => Line::from(Span::styled(
            "Esc quit | Tab switch field | ↑/↓ select | Ctrl+A add members | Ctrl+L log out | F1 help",
            Style::default().fg(Color::Gray),
        )),
    };
    f.render_widget(Paragraph::new(status), rows[1]);
}

fn draw_rail<B: Backend>(f: &mut Frame<B>, active: Tab, area: Rect) {
    let tabs = [(Tab::Chats, "F2 Chats"), (Tab::Contacts, "F3 Contacts"), (Tab::Settings, "F4 Settings")];

    let mut items = vec![
        ListItem::new(Span::styled(" M", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))),
        ListItem::new(""),
    ];
    items.extend(tabs.iter().map(|(tab, label)| {
        let style = if *tab == active {
            Style::default().bg(ACCENT).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        ListItem::new(Span::styled(format!(" {}", label), style))
    }));
    items.push(ListItem::new(""));
    items.push(ListItem::new(Span::styled(" ^L Log out", Style::default().fg(Color::Gray))));

    f.render_widget(List::new(items).block(Block::default().borders(Borders::ALL)), area);
}

fn presence_dot(online: bool) -> Span<'static> {
    if online {
        Span::styled("● ", Style::default().fg(Color::Green))
    } else {
        Span::styled("○ ", Style::default().fg(Color::DarkGray))
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

fn list_title(label: &str, shown: usize, total: usize, query: &str) -> String {
    if query.is_empty() {
        format!("{} ({})", label, total)
    } else {
        format!("{} ({}/{})", label, shown, total)
    }
}

fn draw_chat_list<B: Backend>(f: &mut Frame<B>, state: &AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let searching = state.chat_focus == ChatFocus::Search;
    draw_field(
        f,
        chunks[0],
        "Search messages",
        &state.chat_search,
        state.chat_search.value().to_string(),
        searching,
    );

    let chats = state.visible_chats();
    let title = list_title("Chats", chats.len(), parley::directory::chats().len(), state.chat_search.value());
    let block = Block::default().title(title).borders(Borders::ALL);

    if chats.is_empty() {
        f.render_widget(Paragraph::new("No chats found").block(block), chunks[1]);
        return;
    }

    let width = chunks[1].width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = chats.iter().map(|chat| chat_item(chat, width)).collect();

    let mut list_state = ListState::default();
    list_state.select(chats.iter().position(|c| c.id == state.active_chat));

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, chunks[1], &mut list_state);
}

fn chat_item(chat: &ChatSummary, width: usize) -> ListItem<'static> {
    let mut first = vec![presence_dot(chat.online), Span::styled(chat.name.clone(), Style::default().add_modifier(Modifier::BOLD))];
    if chat.encrypted {
        first.push(Span::styled(" 🔒", Style::default().fg(Color::Green)));
    }
    first.push(Span::styled(format!("  {}", chat.time), Style::default().fg(Color::Gray)));

    let mut second = vec![Span::raw(format!("  {}", truncate(&chat.last_message, width.saturating_sub(8))))];
    if chat.unread > 0 {
        second.push(Span::styled(format!(" ({})", chat.unread), Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)));
    }

    ListItem::new(vec![Line::from(first), Line::from(second)])
}

fn contact_line(contact: &Contact) -> Vec<Span<'static>> {
    vec![
        presence_dot(contact.online),
        Span::styled(format!("{:<3}", contact.avatar), Style::default().fg(ACCENT)),
        Span::raw(contact.name.clone()),
        Span::styled(format!("  {}", contact.handle), Style::default().fg(Color::Gray)),
    ]
}

fn draw_contact_list<B: Backend>(f: &mut Frame<B>, state: &AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    draw_field(
        f,
        chunks[0],
        "Search contacts",
        &state.contact_search,
        state.contact_search.value().to_string(),
        true,
    );

    let contacts = state.visible_contacts();
    let title = list_title("Contacts", contacts.len(), parley::directory::contacts().len(), state.contact_search.value());
    let block = Block::default().title(title).borders(Borders::ALL);

    if contacts.is_empty() {
        f.render_widget(Paragraph::new("No contacts found").block(block), chunks[1]);
        return;
    }

    let items: Vec<ListItem> = contacts
        .iter()
        .map(|c| ListItem::new(Line::from(contact_line(c))))
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(state.contact_cursor));

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, chunks[1], &mut list_state);
}

fn draw_settings<B: Backend>(f: &mut Frame<B>, state: &AppState, area: Rect) {
    let shown = |path: &Option<std::path::PathBuf>| {
        path.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    };

    let label = Style::default().fg(FOCUS);
    let lines = vec![
        Line::from(Span::styled("Settings file", label)),
        Line::from(shown(&state.paths.settings)),
        Line::from(""),
        Line::from(Span::styled("Log file", label)),
        Line::from(shown(&state.paths.log)),
        Line::from(""),
        Line::from(Span::styled("Remembered email", label)),
        Line::from(state.settings.remembered_email.clone().unwrap_or_else(|| "(none)".to_string())),
        Line::from(""),
        Line::from(Span::styled(
            "Lock and shield marks are decorative. Messages are not encrypted.",
            Style::default().fg(Color::Gray),
        )),
    ];

    let panel = Paragraph::new(lines)
        .block(Block::default().title("Settings").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(panel, area);
}

fn draw_chat_window<B: Backend>(f: &mut Frame<B>, state: &AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),  // Header
            Constraint::Min(3),     // Messages
            Constraint::Length(3),  // Composer
        ])
        .split(area);

    let chat = state.active_chat();
    let mut presence = if chat.online {
        vec![Span::styled("● online", Style::default().fg(Color::Green))]
    } else {
        vec![Span::styled("seen recently", Style::default().fg(Color::Gray))]
    };
    if chat.encrypted {
        presence.push(Span::raw(" • "));
        presence.push(Span::styled("🛡 encrypted", Style::default().fg(Color::Green)));
    }
    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(format!("{} ", chat.avatar), Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Span::styled(chat.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(presence),
    ])
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(ACCENT)));
    f.render_widget(header, chunks[0]);

    let messages: Vec<&Message> = state.thread().collect();
    draw_messages(f, &messages, &chat.name, chunks[1]);

    let composing = state.tab == Tab::Chats && state.chat_focus == ChatFocus::Composer;
    draw_field(f, chunks[2], "Message", &state.composer, state.composer.value().to_string(), composing);
}

fn draw_messages<B: Backend>(f: &mut Frame<B>, messages: &[&Message], peer: &str, area: Rect) {
    let wrap_width = area.width.saturating_sub(2).max(1) as usize; // Account for borders

    let lines: Vec<ListItem> = messages
        .iter()
        .flat_map(|m| {
            let (prefix, ticks, style) = if m.is_mine() {
                ("You".to_string(), format!(" {}", m.status.ticks()), Style::default().fg(ACCENT))
            } else {
                (peer.to_string(), String::new(), Style::default())
            };
            let full_content = format!("[{}] {}: {}{}", m.time, prefix, m.text, ticks);

            let wrapped_lines: Vec<String> = wrap(&full_content, wrap_width)
                .into_iter()
                .map(|l| l.into_owned())
                .collect();

            wrapped_lines.into_iter().map(move |line| ListItem::new(line).style(style))
        })
        .collect();

    // Keep the newest message in view.
    let mut list_state = ListState::default();
    if !lines.is_empty() {
        list_state.select(Some(lines.len() - 1));
    }

    let list = List::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Messages"))
        .highlight_style(Style::default());
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_add_members_dialog<B: Backend>(f: &mut Frame<B>, dialog: &AddMembersDialog, area: Rect) {
    let popup_area = centered(70, 26, area);

    f.render_widget(Clear, popup_area);
    f.render_widget(
        Block::default()
            .title("Add members")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
        popup_area,
    );

    let inner_area = popup_area.inner(&Margin { vertical: 1, horizontal: 2 });
    let selection = dialog.selection();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                                            // Description
            Constraint::Length(3),                                            // Search
            Constraint::Length(if selection.is_empty() { 0 } else { 4 }),     // Selected chips
            Constraint::Min(3),                                               // Contacts
            Constraint::Length(1),                                            // Actions
        ])
        .split(inner_area);

    let description = match &dialog.group_name {
        Some(group) => format!("Add members to the group \"{}\"", group),
        None => "Select contacts to add".to_string(),
    };
    f.render_widget(Paragraph::new(description).style(Style::default().fg(Color::Gray)), chunks[0]);

    draw_field(f, chunks[1], "Search contacts", &dialog.search, dialog.query().to_string(), true);

    if !selection.is_empty() {
        let focused = dialog.focused_chip();
        let mut chips = Vec::new();
        for contact in selection.contacts() {
            // Chips of contacts hidden by the search are dimmed.
            let style = if focused == Some(contact.id) {
                Style::default().fg(Color::Black).bg(FOCUS).add_modifier(Modifier::BOLD)
            } else if dialog.is_visible(contact) {
                Style::default().fg(Color::White).bg(ACCENT)
            } else {
                Style::default().fg(Color::Gray).bg(Color::DarkGray)
            };
            chips.push(Span::styled(format!("[{} {} ×]", contact.avatar, contact.name), style));
            chips.push(Span::raw(" "));
        }
        let selected = Paragraph::new(vec![
            Line::from(vec![
                Span::styled(format!("Selected: {}", selection.len()), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled("  (Shift+Tab chips, Del remove, Ctrl+X clear)", Style::default().fg(Color::Gray)),
            ]),
            Line::from(chips),
        ])
        .wrap(Wrap { trim: true });
        f.render_widget(selected, chunks[2]);
    }

    let visible: Vec<&Contact> = dialog.visible().collect();
    let block = Block::default().borders(Borders::ALL);
    if visible.is_empty() {
        f.render_widget(Paragraph::new("No contacts found").block(block), chunks[3]);
    } else {
        let items: Vec<ListItem> = visible
            .iter()
            .map(|c| {
                let mark = if selection.contains(c.id) {
                    Span::styled("(✓) ", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
                } else {
                    Span::raw("( ) ")
                };
                let mut spans = vec![mark];
                spans.extend(contact_line(c));
                ListItem::new(Line::from(spans))
            })
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(dialog.cursor()));
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray));
        f.render_stateful_widget(list, chunks[3], &mut list_state);
    }

    let confirm_style = if dialog.can_confirm() {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let actions = Line::from(vec![
        Span::styled("Esc cancel", Style::default().fg(Color::Gray)),
        Span::raw("   "),
        Span::styled("Tab select", Style::default().fg(Color::Gray)),
        Span::raw("   "),
        Span::styled(format!("Enter add ({})", selection.len()), confirm_style),
    ]);
    f.render_widget(Paragraph::new(actions), chunks[4]);
}

fn draw_help_dialog<B: Backend>(f: &mut Frame<B>, area: Rect) {
    let popup_area = centered(72, 31, area);

    let popup_block = Block::default()
        .title("Keyboard Shortcuts")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    f.render_widget(Clear, popup_area);
    f.render_widget(popup_block, popup_area);

    let inner_area = popup_area.inner(&Margin { vertical: 1, horizontal: 2 });

    let shortcuts = [
        ("General", ""),
        ("Ctrl+C", "Quit application"),
        ("F1", "Show this help"),
        ("", ""),
        ("Sign in / Create account", ""),
        ("Tab", "Next field (Shift+Tab previous)"),
        ("Enter", "Submit the form"),
        ("Ctrl+P", "Show or hide the password"),
        ("Space", "Toggle \"remember me\" when focused"),
        ("Ctrl+R", "Create an account"),
        ("", ""),
        ("Chats", ""),
        ("F2/F3/F4", "Chats, contacts, settings"),
        ("↑/↓", "Select chat or contact"),
        ("Tab", "Switch between search and message"),
        ("Enter", "Send message"),
        ("Ctrl+A", "Add members to the open chat"),
        ("Ctrl+L", "Log out"),
        ("", ""),
        ("Add members", ""),
        ("Tab", "Select or unselect the highlighted contact"),
        ("Shift+Tab", "Move between search and selected chips"),
        ("←/→ Del", "Pick a chip and remove it"),
        ("Backspace", "Remove the last chip when search is empty"),
        ("Ctrl+X", "Clear the selection"),
        ("Enter", "Add the selected contacts"),
        ("", ""),
        ("Press any key to close this dialog", ""),
    ];

    let items: Vec<ListItem> = shortcuts
        .iter()
        .map(|(key, desc)| {
            if desc.is_empty() {
                if key.is_empty() {
                    ListItem::new("")
                } else {
                    ListItem::new(Text::styled(
                        key.to_string(),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ))
                }
            } else {
                let formatted_key = format!("{:<10}", key);
                let line = Line::from(vec![
                    Span::styled(formatted_key, Style::default().fg(Color::Green)),
                    Span::raw(desc.to_string()),
                ]);
                ListItem::new(line)
            }
        })
        .collect();

    f.render_widget(List::new(items), inner_area);
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley::settings::Settings;
    use parley::state::Paths;
    use ratatui::backend::TestBackend;

    fn press(ui: &mut ChatUI, code: KeyCode) -> UiEvent {
        ui.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(ui: &mut ChatUI, c: char) -> UiEvent {
        ui.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_text(ui: &mut ChatUI, text: &str) {
        for c in text.chars() {
            press(ui, KeyCode::Char(c));
        }
    }

    fn render(ui: &ChatUI) -> String {
        let backend = TestBackend::new(140, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui.draw(f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|cell| cell.symbol.as_str()).collect()
    }

    fn signed_in() -> ChatUI {
        let mut ui = ChatUI::new(AppState::new(Settings::default(), None, Paths::default()));
        type_text(&mut ui, "me@example.com");
        press(&mut ui, KeyCode::Tab);
        type_text(&mut ui, "secret");
        let event = press(&mut ui, KeyCode::Enter);
        assert_eq!(
            event,
            UiEvent::Effect(Effect::SignedIn { email: "me@example.com".to_string(), settings_changed: false })
        );
        ui
    }

    #[test]
    fn test_login_screen_masks_password() {
        let mut ui = ChatUI::new(AppState::new(Settings::default(), Some("me@example.com"), Paths::default()));
        type_text(&mut ui, "secret");
        let screen = render(&ui);
        assert!(screen.contains("Sign in"));
        assert!(screen.contains("me@example.com"));
        assert!(screen.contains("••••••"));
        assert!(!screen.contains("secret"));

        ctrl(&mut ui, 'p');
        assert!(render(&ui).contains("secret"));
    }

    #[test]
    fn test_main_view_shows_active_chat() {
        let ui = signed_in();
        let screen = render(&ui);
        assert!(screen.contains("Анна Петрова"));
        assert!(screen.contains("Команда проекта"));
        assert!(screen.contains("Привет! Как дела?"));
        assert!(screen.contains("online"));
    }

    #[test]
    fn test_arrow_keys_switch_chat() {
        let mut ui = signed_in();
        press(&mut ui, KeyCode::Down);
        assert_eq!(ui.state().active_chat, 2);
        assert!(render(&ui).contains("seen recently"));
    }

    #[test]
    fn test_enter_sends_from_composer() {
        let mut ui = signed_in();
        type_text(&mut ui, "Увидимся");
        assert_eq!(press(&mut ui, KeyCode::Enter), UiEvent::Effect(Effect::MessageQueued { chat_id: 1 }));
        assert!(render(&ui).contains("You: Увидимся"));
    }

    #[test]
    fn test_add_members_dialog_keys() {
        let mut ui = signed_in();
        ctrl(&mut ui, 'a');
        assert!(render(&ui).contains("Enter add (0)"));

        // Nothing selected yet, so Enter keeps the dialog open.
        assert_eq!(press(&mut ui, KeyCode::Enter), UiEvent::Continue);
        assert!(ui.state().dialog.is_some());

        type_text(&mut ui, "анна");
        press(&mut ui, KeyCode::Tab);
        let screen = render(&ui);
        assert!(screen.contains("Selected: 1"));
        assert!(screen.contains("Enter add (1)"));

        assert_eq!(
            press(&mut ui, KeyCode::Enter),
            UiEvent::Effect(Effect::MembersAdded { group: Some("Анна Петрова".to_string()), ids: vec![1] })
        );
        assert!(ui.state().dialog.is_none());
    }

    #[test]
    fn test_remove_chip_hidden_by_search() {
        let mut ui = signed_in();
        ctrl(&mut ui, 'a');
        type_text(&mut ui, "ольга");
        press(&mut ui, KeyCode::Tab);
        for _ in 0.."ольга".chars().count() {
            press(&mut ui, KeyCode::Backspace);
        }
        type_text(&mut ui, "@sergey");
        press(&mut ui, KeyCode::Tab);

        let selected = |ui: &ChatUI| ui.state().dialog.as_ref().unwrap().selection().ids().to_vec();
        assert_eq!(selected(&ui), vec![7, 8]);

        // Ольга is filtered out, but her chip can still be focused and dropped.
        press(&mut ui, KeyCode::BackTab);
        press(&mut ui, KeyCode::Left);
        press(&mut ui, KeyCode::Delete);
        assert_eq!(selected(&ui), vec![8]);
        assert_eq!(ui.state().dialog.as_ref().unwrap().query(), "@sergey");
        assert!(render(&ui).contains("Selected: 1"));
    }

    #[test]
    fn test_backspace_on_empty_search_drops_last_chip() {
        let mut ui = signed_in();
        ctrl(&mut ui, 'a');
        press(&mut ui, KeyCode::Tab);
        press(&mut ui, KeyCode::Down);
        press(&mut ui, KeyCode::Tab);
        assert_eq!(ui.state().dialog.as_ref().unwrap().selection().ids(), &[1, 2]);

        press(&mut ui, KeyCode::Backspace);
        assert_eq!(ui.state().dialog.as_ref().unwrap().selection().ids(), &[1]);

        // With text in the box, Backspace edits the search instead.
        type_text(&mut ui, "ab");
        press(&mut ui, KeyCode::Backspace);
        let dialog = ui.state().dialog.as_ref().unwrap();
        assert_eq!(dialog.query(), "a");
        assert_eq!(dialog.selection().ids(), &[1]);
    }

    #[test]
    fn test_dialog_without_matches() {
        let mut ui = signed_in();
        ctrl(&mut ui, 'a');
        type_text(&mut ui, "nobody");
        assert!(render(&ui).contains("No contacts found"));
        press(&mut ui, KeyCode::Esc);
        assert!(ui.state().dialog.is_none());
    }

    #[test]
    fn test_help_overlay() {
        let mut ui = signed_in();
        press(&mut ui, KeyCode::F(1));
        assert!(render(&ui).contains("Keyboard Shortcuts"));
        // Esc closes the overlay instead of quitting.
        assert_eq!(press(&mut ui, KeyCode::Esc), UiEvent::Continue);
        assert!(!ui.state().help_visible);
        assert_eq!(press(&mut ui, KeyCode::Esc), UiEvent::Quit);
    }

    #[test]
    fn test_settings_tab() {
        let mut ui = signed_in();
        press(&mut ui, KeyCode::F(4));
        let screen = render(&ui);
        assert!(screen.contains("Remembered email"));
        assert!(screen.contains("decorative"));
    }

    #[test]
    fn test_logout_returns_to_login() {
        let mut ui = signed_in();
        assert_eq!(ctrl(&mut ui, 'l'), UiEvent::Effect(Effect::SignedOut));
        assert_eq!(ui.state().screen, Screen::Login);
        assert!(render(&ui).contains("Sign in"));
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let mut ui = ChatUI::new(AppState::new(Settings::default(), None, Paths::default()));
        assert_eq!(ctrl(&mut ui, 'c'), UiEvent::Quit);
    }
}
