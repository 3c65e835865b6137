//! Login and registration forms.
//!
//! Neither form talks to a backend: submitting succeeds as soon as every
//! field holds some text.

use tui_input::{Input, InputRequest};

/// A single editing step applied to the focused text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

impl Edit {
    pub fn apply(self, input: &mut Input) {
        let request = match self {
            Edit::Insert(c) => InputRequest::InsertChar(c),
            Edit::Backspace => InputRequest::DeletePrevChar,
            Edit::Delete => InputRequest::DeleteNextChar,
            Edit::Left => InputRequest::GoToPrevChar,
            Edit::Right => InputRequest::GoToNextChar,
            Edit::Home => InputRequest::GoToStart,
            Edit::End => InputRequest::GoToEnd,
        };
        input.handle(request);
    }
}

/// Masks a password for display unless `show` is set.
pub fn masked(value: &str, show: bool) -> String {
    if show {
        value.to_string()
    } else {
        "•".repeat(value.chars().count())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
    RememberMe,
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: Input,
    pub password: Input,
    pub show_password: bool,
    pub remember_me: bool,
    pub focus: LoginField,
}

impl LoginForm {
    /// A blank form, optionally with the email pre-filled. Focus starts on
    /// the first empty field.
    pub fn new(email: Option<&str>) -> Self {
        let (email, focus) = match email {
            Some(e) if !e.is_empty() => (Input::new(e.to_string()), LoginField::Password),
            _ => (Input::default(), LoginField::Email),
        };
        LoginForm {
            email,
            password: Input::default(),
            show_password: false,
            remember_me: false,
            focus,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::RememberMe,
            LoginField::RememberMe => LoginField::Email,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::RememberMe,
            LoginField::Password => LoginField::Email,
            LoginField::RememberMe => LoginField::Password,
        };
    }

    pub fn focused_input_mut(&mut self) -> Option<&mut Input> {
        match self.focus {
            LoginField::Email => Some(&mut self.email),
            LoginField::Password => Some(&mut self.password),
            LoginField::RememberMe => None,
        }
    }

    /// Label of the first empty field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.email.value().is_empty() {
            Some("Email")
        } else if self.password.value().is_empty() {
            Some("Password")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterField {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: Input,
    pub email: Input,
    pub password: Input,
    pub confirm_password: Input,
    pub show_password: bool,
    pub focus: RegisterField,
}

impl Default for RegisterForm {
    fn default() -> Self {
        RegisterForm {
            name: Input::default(),
            email: Input::default(),
            password: Input::default(),
            confirm_password: Input::default(),
            show_password: false,
            focus: RegisterField::Name,
        }
    }
}

impl RegisterForm {
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            RegisterField::Name => RegisterField::Email,
            RegisterField::Email => RegisterField::Password,
            RegisterField::Password => RegisterField::ConfirmPassword,
            RegisterField::ConfirmPassword => RegisterField::Name,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            RegisterField::Name => RegisterField::ConfirmPassword,
            RegisterField::Email => RegisterField::Name,
            RegisterField::Password => RegisterField::Email,
            RegisterField::ConfirmPassword => RegisterField::Password,
        };
    }

    pub fn focused_input_mut(&mut self) -> &mut Input {
        match self.focus {
            RegisterField::Name => &mut self.name,
            RegisterField::Email => &mut self.email,
            RegisterField::Password => &mut self.password,
            RegisterField::ConfirmPassword => &mut self.confirm_password,
        }
    }

    /// Label of the first empty field, if any. Passwords are not compared.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("Name", &self.name),
            ("Email", &self.email),
            ("Password", &self.password),
            ("Confirm password", &self.confirm_password),
        ]
        .into_iter()
        .find(|(_, input)| input.value().is_empty())
        .map(|(label, _)| label)
    }
}
