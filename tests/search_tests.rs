// Search tests over the built-in directories

mod common;
use common::setup_logging;

use parley::directory;
use parley::filter::{filter, matches};
use parley::models::Contact;

fn is_subsequence(part: &[&Contact], whole: &[Contact]) -> bool {
    let mut rest = whole.iter();
    part.iter().all(|p| rest.any(|w| w.id == p.id))
}

#[test]
fn test_filter_results_keep_directory_order() {
    setup_logging();
    let contacts = directory::contacts();
    for query in ["", "а", "ОВ", "@", "_s", "ель", "Иван", "zzz", " "] {
        let found: Vec<&Contact> = filter(contacts, query).collect();
        assert!(is_subsequence(&found, contacts), "order broken for {:?}", query);
        assert!(found.iter().all(|c| matches(*c, query)));
    }
}

#[test]
fn test_empty_query_is_identity() {
    setup_logging();
    let all: Vec<u32> = filter(directory::contacts(), "").map(|c| c.id).collect();
    assert_eq!(all, vec![1, 2, 3, 4, 5, 6, 7, 8]);

    let chats: Vec<u32> = filter(directory::chats(), "").map(|c| c.id).collect();
    assert_eq!(chats, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_handle_search_ignores_case() {
    setup_logging();
    let names: Vec<&str> = filter(directory::contacts(), "@MARIA")
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Мария Смирнова"]);
}

#[test]
fn test_chat_search_uses_preview() {
    setup_logging();
    let names: Vec<&str> = filter(directory::chats(), "суббот")
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Друзья"]);
}
