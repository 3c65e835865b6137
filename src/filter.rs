//! Case-insensitive substring search over the directories.

use crate::models::{ChatSummary, Contact};

/// Something that can be matched by the search boxes.
pub trait Searchable {
    /// The strings a query is matched against.
    fn search_keys(&self) -> [&str; 2];
}

impl Searchable for Contact {
    fn search_keys(&self) -> [&str; 2] {
        [&self.name, &self.handle]
    }
}

// Chats have no handle; the chat search box also looks at the preview.
impl Searchable for ChatSummary {
    fn search_keys(&self) -> [&str; 2] {
        [&self.name, &self.last_message]
    }
}

/// Returns `true` if any key of `item` contains `query`, ignoring case.
/// An empty query matches everything.
pub fn matches<T: Searchable + ?Sized>(item: &T, query: &str) -> bool {
    let needle = query.to_lowercase();
    contains_lowercase(item, &needle)
}

fn contains_lowercase<T: Searchable + ?Sized>(item: &T, needle: &str) -> bool {
    needle.is_empty()
        || item
            .search_keys()
            .iter()
            .any(|key| key.to_lowercase().contains(needle))
}

/// Lazily yields the entries of `items` matching `query`, in their original order.
pub fn filter<'a, T: Searchable>(items: &'a [T], query: &str) -> impl Iterator<Item = &'a T> + 'a {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(move |item| contains_lowercase(*item, &needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory;

    fn names<'a>(it: impl Iterator<Item = &'a Contact>) -> Vec<&'a str> {
        it.map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let all: Vec<&Contact> = directory::contacts().iter().collect();
        let filtered: Vec<&Contact> = filter(directory::contacts(), "").collect();
        assert_eq!(filtered, all);
    }

    #[test]
    fn test_cyrillic_query_ignores_case() {
        let found = names(filter(directory::contacts(), "анна"));
        assert_eq!(found, vec!["Анна Петрова"]);

        let found = names(filter(directory::contacts(), "АННА"));
        assert_eq!(found, vec!["Анна Петрова"]);
    }

    #[test]
    fn test_query_matches_handle() {
        let found = names(filter(directory::contacts(), "@ALEX"));
        assert_eq!(found, vec!["Александр Козлов"]);
    }

    #[test]
    fn test_result_preserves_order() {
        // "ов" occurs in several surnames.
        let found: Vec<u32> = filter(directory::contacts(), "ов").map(|c| c.id).collect();
        assert!(found.len() > 1);
        assert!(found.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_no_match_yields_nothing() {
        assert_eq!(filter(directory::contacts(), "zzz").count(), 0);
    }

    #[test]
    fn test_chat_search_looks_at_preview() {
        let found: Vec<u32> = filter(directory::chats(), "субботу").map(|c| c.id).collect();
        assert_eq!(found, vec![5]);

        let found: Vec<u32> = filter(directory::chats(), "команда").map(|c| c.id).collect();
        assert_eq!(found, vec![2]);
    }

    #[test]
    fn test_matches_single_item() {
        let anna = directory::contact(1).unwrap();
        assert!(matches(anna, "петров"));
        assert!(matches(anna, ""));
        assert!(!matches(anna, "волков"));
    }
}
