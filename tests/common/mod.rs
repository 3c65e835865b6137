// Common test utilities for integration tests
// This module contains shared code for all integration tests
#![allow(dead_code)]

// Standard library imports
use std::sync::Once;

// External crate imports
use log::{info, LevelFilter};

// Import the crate functionality
use parley::forms::Edit;
use parley::settings::Settings;
use parley::state::{Action, AppState, Effect, Paths, Screen};

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

/// Types `text` into whatever field currently has focus.
pub fn type_text(state: &mut AppState, text: &str) {
    for c in text.chars() {
        state.apply(Action::Edit(Edit::Insert(c)));
    }
}

/// A fresh state with no saved settings, still on the sign-in screen.
pub fn fresh_state() -> AppState {
    AppState::new(Settings::default(), None, Paths::default())
}

/// Signs in as `email` and returns the resulting state on the main view.
pub fn signed_in_as(email: &str) -> AppState {
    let mut state = fresh_state();
    type_text(&mut state, email);
    state.apply(Action::FocusNext);
    type_text(&mut state, "password");

    let effect = state.apply(Action::Submit);
    assert!(matches!(effect, Effect::SignedIn { .. }), "unexpected effect {:?}", effect);
    assert_eq!(state.screen, Screen::Main);
    info!("Signed in as {} for test", email);
    state
}

pub fn signed_in_state() -> AppState {
    signed_in_as("tester@example.com")
}
