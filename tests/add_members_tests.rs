// Add-members dialog tests
// These drive the dialog through AppState the same way the terminal UI does

// Import common test utilities
mod common;
use common::{setup_logging, signed_in_state, type_text};

// External crate imports
use log::info;

// Import the crate functionality
use parley::selection::Selection;
use parley::state::{Action, Effect, Tab};

#[test]
fn test_search_and_pick_anna() {
    setup_logging();
    let mut state = signed_in_state();
    state.apply(Action::OpenAddMembers);

    type_text(&mut state, "АННА");
    let dialog = state.dialog.as_ref().unwrap();
    let names: Vec<&str> = dialog.visible().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Анна Петрова"]);

    state.apply(Action::ToggleMemberUnderCursor);
    let effect = state.apply(Action::ConfirmMembers);
    info!("Confirm produced {:?}", effect);
    assert_eq!(
        effect,
        Effect::MembersAdded { group: Some("Анна Петрова".to_string()), ids: vec![1] }
    );
}

#[test]
fn test_double_toggle_restores_selection() {
    setup_logging();
    let mut state = signed_in_state();
    state.apply(Action::OpenAddMembers);
    state.apply(Action::ToggleMember(5));
    let before: Selection = state.dialog.as_ref().unwrap().selection().clone();

    state.apply(Action::ToggleMember(3));
    state.apply(Action::ToggleMember(3));
    assert_eq!(state.dialog.as_ref().unwrap().selection(), &before);
}

#[test]
fn test_confirm_with_nothing_selected_changes_nothing() {
    setup_logging();
    let mut state = signed_in_state();
    state.apply(Action::OpenAddMembers);
    type_text(&mut state, "ми");
    state.apply(Action::MoveCursor(1));
    let before = state.dialog.clone().unwrap();

    assert!(!before.can_confirm());
    assert_eq!(state.apply(Action::ConfirmMembers), Effect::None);

    let after = state.dialog.as_ref().expect("dialog stays open");
    assert_eq!(after.query(), before.query());
    assert_eq!(after.cursor(), before.cursor());
    assert_eq!(after.selection(), before.selection());
}

#[test]
fn test_confirm_availability_follows_selection() {
    setup_logging();
    let mut state = signed_in_state();
    state.apply(Action::OpenAddMembers);

    let can_confirm = |state: &parley::AppState| state.dialog.as_ref().unwrap().can_confirm();
    assert!(!can_confirm(&state));
    state.apply(Action::ToggleMember(2));
    assert!(can_confirm(&state));
    state.apply(Action::ToggleMember(8));
    state.apply(Action::ClearMembers);
    assert!(!can_confirm(&state));
}

#[test]
fn test_selection_survives_search_changes() {
    setup_logging();
    let mut state = signed_in_state();
    state.apply(Action::OpenAddMembers);

    type_text(&mut state, "ольга");
    state.apply(Action::ToggleMemberUnderCursor);
    for _ in 0.."ольга".chars().count() {
        state.apply(Action::Edit(parley::forms::Edit::Backspace));
    }
    type_text(&mut state, "@sergey");
    state.apply(Action::ToggleMemberUnderCursor);

    let dialog = state.dialog.as_ref().unwrap();
    let names: Vec<&str> = dialog.selection().contacts().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Ольга Морозова", "Сергей Волков"]);
}

#[test]
fn test_cancel_then_reopen_starts_empty() {
    setup_logging();
    let mut state = signed_in_state();
    state.apply(Action::OpenAddMembers);
    type_text(&mut state, "елена");
    state.apply(Action::ToggleMemberUnderCursor);
    state.apply(Action::CancelMembers);
    assert!(state.dialog.is_none());

    state.apply(Action::OpenAddMembers);
    let dialog = state.dialog.as_ref().unwrap();
    assert!(dialog.selection().is_empty());
    assert_eq!(dialog.query(), "");
    assert_eq!(dialog.visible().count(), 8);
}

#[test]
fn test_dialog_takes_the_keyboard() {
    setup_logging();
    let mut state = signed_in_state();
    state.apply(Action::OpenAddMembers);

    type_text(&mut state, "x");
    state.apply(Action::SwitchTab(Tab::Contacts));
    assert_eq!(state.tab, Tab::Chats);
    assert_eq!(state.composer.value(), "");
    assert_eq!(state.dialog.as_ref().unwrap().query(), "x");
}
