//! Application state and the single place where it changes.
//!
//! The UI turns key presses into [`Action`]s and hands them to
//! [`AppState::apply`]. Everything that needs the outside world (saving
//! settings, logging) is reported back as an [`Effect`].

use std::collections::HashMap;
use std::path::PathBuf;

use log::{debug, info};
use tui_input::Input;

use crate::dialog::AddMembersDialog;
use crate::directory;
use crate::filter;
use crate::forms::{Edit, LoginField, LoginForm, RegisterForm};
use crate::models::{Author, ChatSummary, Contact, DeliveryStatus, Message};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Chats,
    Contacts,
    Settings,
}

/// Which text field of the chats tab receives typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatFocus {
    Search,
    Composer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GitHub,
    Google,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Edit(Edit),
    FocusNext,
    FocusPrev,
    /// Submits the login or registration form, or confirms the dialog.
    Submit,
    ToggleShowPassword,
    ToggleRememberMe,
    GoToRegister,
    GoToLogin,
    ForgotPassword,
    ExternalSignIn(Provider),
    SwitchTab(Tab),
    SelectChat(u32),
    MoveCursor(isize),
    /// Sends the composer text; `time` is the label shown next to it.
    SendMessage { time: String },
    OpenAddMembers,
    ToggleMember(u32),
    ToggleMemberUnderCursor,
    /// Moves focus between the dialog's search box and its chips row.
    FocusChips,
    MoveChipCursor(isize),
    ClearMembers,
    ConfirmMembers,
    CancelMembers,
    ShowHelp,
    DismissHelp,
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    SignedIn { email: String, settings_changed: bool },
    Registered { email: String },
    SignedOut,
    MembersAdded { group: Option<String>, ids: Vec<u32> },
    MessageQueued { chat_id: u32 },
}

/// Files the session uses, shown on the settings tab.
#[derive(Debug, Clone, Default)]
pub struct Paths {
    pub settings: Option<PathBuf>,
    pub log: Option<PathBuf>,
}

/// Builds the login form. An explicit prefill wins over the remembered
/// email. The remember-me box starts ticked when the email shown is the
/// remembered one.
fn login_form(settings: &Settings, prefill: Option<&str>) -> LoginForm {
    let email = prefill.or(settings.remembered_email.as_deref());
    let mut form = LoginForm::new(email);
    form.remember_me = email.is_some() && email == settings.remembered_email.as_deref();
    form
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub login: LoginForm,
    pub register: RegisterForm,
    pub tab: Tab,
    pub chat_focus: ChatFocus,
    pub active_chat: u32,
    pub chat_search: Input,
    pub contact_search: Input,
    pub contact_cursor: usize,
    pub composer: Input,
    pub dialog: Option<AddMembersDialog>,
    pub help_visible: bool,
    pub notice: Option<String>,
    pub settings: Settings,
    pub paths: Paths,
    prefill_email: Option<String>,  // From the command line or environment
    outbox: HashMap<u32, Vec<Message>>,  // Session-only messages per chat
}

impl AppState {
    /// Starts on the login screen. `email` pre-fills the login form ahead of
    /// the remembered email, and again after every logout.
    pub fn new(settings: Settings, email: Option<&str>, paths: Paths) -> Self {
        AppState {
            screen: Screen::Login,
            login: login_form(&settings, email),
            register: RegisterForm::default(),
            tab: Tab::Chats,
            chat_focus: ChatFocus::Composer,
            active_chat: directory::default_chat().id,
            chat_search: Input::default(),
            contact_search: Input::default(),
            contact_cursor: 0,
            composer: Input::default(),
            dialog: None,
            help_visible: false,
            notice: None,
            settings,
            paths,
            prefill_email: email.map(str::to_string),
            outbox: HashMap::new(),
        }
    }

    pub fn active_chat(&self) -> &'static ChatSummary {
        directory::chat(self.active_chat).unwrap_or_else(directory::default_chat)
    }

    /// Chats matching the chat search box.
    pub fn visible_chats(&self) -> Vec<&'static ChatSummary> {
        filter::filter(directory::chats(), self.chat_search.value()).collect()
    }

    /// Contacts matching the contacts tab search box.
    pub fn visible_contacts(&self) -> Vec<&'static Contact> {
        filter::filter(directory::contacts(), self.contact_search.value()).collect()
    }

    /// Messages of the active chat: the built-in log followed by whatever
    /// was sent during this session.
    pub fn thread(&self) -> impl Iterator<Item = &Message> {
        let seed: &[Message] = directory::message_log(self.active_chat);
        seed.iter()
            .chain(self.outbox.get(&self.active_chat).into_iter().flatten())
    }

    pub fn apply(&mut self, action: Action) -> Effect {
        debug!("Applying {:?} on {:?}", action, self.screen);
        self.notice = None;

        match action {
            Action::ShowHelp => self.help_visible = true,
            Action::DismissHelp => self.help_visible = false,
            Action::Edit(edit) => self.edit(edit),
            Action::FocusNext => self.move_focus(true),
            Action::FocusPrev => self.move_focus(false),
            Action::Submit => return self.submit(),
            Action::ToggleShowPassword => match self.screen {
                Screen::Login => self.login.show_password = !self.login.show_password,
                Screen::Register => self.register.show_password = !self.register.show_password,
                Screen::Main => {}
            },
            Action::ToggleRememberMe => {
                if self.screen == Screen::Login {
                    self.login.remember_me = !self.login.remember_me;
                }
            }
            Action::GoToRegister => {
                if self.screen == Screen::Login {
                    self.register = RegisterForm::default();
                    self.screen = Screen::Register;
                }
            }
            Action::GoToLogin => {
                if self.screen == Screen::Register {
                    self.login = login_form(&self.settings, self.prefill_email.as_deref());
                    self.screen = Screen::Login;
                }
            }
            Action::ForgotPassword => {
                self.notice = Some("Password recovery is not available".to_string());
            }
            Action::ExternalSignIn(provider) => {
                let name = match provider {
                    Provider::GitHub => "GitHub",
                    Provider::Google => "Google",
                };
                self.notice = Some(format!("Sign-in with {} is not available", name));
            }
            Action::SwitchTab(tab) => {
                if self.screen == Screen::Main && self.dialog.is_none() {
                    self.tab = tab;
                }
            }
            Action::SelectChat(id) => self.select_chat(id),
            Action::MoveCursor(delta) => self.move_cursor(delta),
            Action::SendMessage { time } => return self.send_message(time),
            Action::OpenAddMembers => {
                if self.screen == Screen::Main && self.dialog.is_none() {
                    let group = self.active_chat().name.as_str();
                    self.dialog = Some(AddMembersDialog::new(Some(group)));
                }
            }
            Action::ToggleMember(id) => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.toggle(id);
                }
            }
            Action::ToggleMemberUnderCursor => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.toggle_under_cursor();
                }
            }
            Action::FocusChips => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.toggle_chip_focus();
                }
            }
            Action::MoveChipCursor(delta) => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.move_chip_cursor(delta);
                }
            }
            Action::ClearMembers => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.clear_selection();
                }
            }
            Action::ConfirmMembers => return self.confirm_members(),
            Action::CancelMembers => {
                if let Some(mut dialog) = self.dialog.take() {
                    dialog.reset();
                }
            }
            Action::Logout => return self.logout(),
        }
        Effect::None
    }

    fn edit(&mut self, edit: Edit) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.edit_search(edit);
            return;
        }
        match self.screen {
            Screen::Login => match self.login.focused_input_mut() {
                Some(input) => edit.apply(input),
                None => {
                    if edit == Edit::Insert(' ') {
                        self.login.remember_me = !self.login.remember_me;
                    }
                }
            },
            Screen::Register => edit.apply(self.register.focused_input_mut()),
            Screen::Main => match (self.tab, self.chat_focus) {
                (Tab::Chats, ChatFocus::Search) => edit.apply(&mut self.chat_search),
                (Tab::Chats, ChatFocus::Composer) => edit.apply(&mut self.composer),
                (Tab::Contacts, _) => {
                    edit.apply(&mut self.contact_search);
                    self.contact_cursor = 0;
                }
                (Tab::Settings, _) => {}
            },
        }
    }

    fn move_focus(&mut self, forward: bool) {
        match self.screen {
            Screen::Login if forward => self.login.focus_next(),
            Screen::Login => self.login.focus_prev(),
            Screen::Register if forward => self.register.focus_next(),
            Screen::Register => self.register.focus_prev(),
            Screen::Main => {
                if self.tab == Tab::Chats && self.dialog.is_none() {
                    self.chat_focus = match self.chat_focus {
                        ChatFocus::Search => ChatFocus::Composer,
                        ChatFocus::Composer => ChatFocus::Search,
                    };
                }
            }
        }
    }

    fn submit(&mut self) -> Effect {
        match self.screen {
            Screen::Login => self.submit_login(),
            Screen::Register => self.submit_register(),
            Screen::Main => self.confirm_members(),
        }
    }

    fn submit_login(&mut self) -> Effect {
        if self.login.focus == LoginField::RememberMe {
            self.login.remember_me = !self.login.remember_me;
            return Effect::None;
        }
        if let Some(field) = self.login.missing_field() {
            self.notice = Some(format!("{} is required", field));
            return Effect::None;
        }

        let email = self.login.email.value().to_string();
        let remembered = self.login.remember_me.then(|| email.clone());
        let settings_changed = remembered != self.settings.remembered_email;
        self.settings.remembered_email = remembered;

        self.login.password.reset();
        self.enter_main();
        info!("Signed in as {}", email);
        Effect::SignedIn { email, settings_changed }
    }

    fn submit_register(&mut self) -> Effect {
        if let Some(field) = self.register.missing_field() {
            self.notice = Some(format!("{} is required", field));
            return Effect::None;
        }
        let email = self.register.email.value().to_string();
        self.register = RegisterForm::default();
        self.enter_main();
        info!("Registered {}", email);
        Effect::Registered { email }
    }

    fn enter_main(&mut self) {
        self.screen = Screen::Main;
        self.tab = Tab::Chats;
        self.chat_focus = ChatFocus::Composer;
    }

    fn select_chat(&mut self, id: u32) {
        if directory::chat(id).is_some() {
            self.active_chat = id;
        } else {
            debug!("Ignoring selection of unknown chat {}", id);
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.move_cursor(delta);
            return;
        }
        if self.screen != Screen::Main {
            return;
        }
        match self.tab {
            Tab::Chats => {
                let visible = self.visible_chats();
                if visible.is_empty() {
                    return;
                }
                let next = match visible.iter().position(|c| c.id == self.active_chat) {
                    Some(pos) => (pos as isize + delta).clamp(0, visible.len() as isize - 1) as usize,
                    None => 0,
                };
                self.active_chat = visible[next].id;
            }
            Tab::Contacts => {
                let len = self.visible_contacts().len();
                if len == 0 {
                    self.contact_cursor = 0;
                } else {
                    let next = self.contact_cursor as isize + delta;
                    self.contact_cursor = next.clamp(0, len as isize - 1) as usize;
                }
            }
            Tab::Settings => {}
        }
    }

    fn send_message(&mut self, time: String) -> Effect {
        let text = self.composer.value().trim().to_string();
        if self.screen != Screen::Main || text.is_empty() {
            return Effect::None;
        }
        let chat_id = self.active_chat;
        let id = (self.thread().count() + 1) as u32;
        self.outbox.entry(chat_id).or_default().push(Message {
            id,
            text,
            time,
            author: Author::Me,
            status: DeliveryStatus::Sent,
        });
        self.composer.reset();
        Effect::MessageQueued { chat_id }
    }

    fn confirm_members(&mut self) -> Effect {
        let Some(dialog) = self.dialog.as_mut() else {
            return Effect::None;
        };
        match dialog.confirm() {
            Some(ids) => {
                let group = dialog.group_name.clone();
                self.dialog = None;
                Effect::MembersAdded { group, ids }
            }
            None => Effect::None,
        }
    }

    fn logout(&mut self) -> Effect {
        if self.screen != Screen::Main {
            return Effect::None;
        }
        let settings = std::mem::take(&mut self.settings);
        let paths = std::mem::take(&mut self.paths);
        let prefill = self.prefill_email.take();
        *self = AppState::new(settings, prefill.as_deref(), paths);
        info!("Signed out");
        Effect::SignedOut
    }
}
