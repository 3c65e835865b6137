//! Built-in sample data: the contact directory, the chat directory and the
//! message log of every chat.
//!
//! Everything here is created once and never mutated. Messages typed during
//! a session live in the session outbox (see [`crate::state`]), not here.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::models::{Author, ChatSummary, Contact, DeliveryStatus, Message};

static CONTACTS: Lazy<Vec<Contact>> = Lazy::new(|| {
    [
        (1, "Анна Петрова", "AP", "@anna_p", true),
        (2, "Михаил Иванов", "МИ", "@mikhail_i", false),
        (3, "Мария Смирнова", "МС", "@maria_s", true),
        (4, "Александр Козлов", "АК", "@alex_k", false),
        (5, "Елена Новикова", "ЕН", "@elena_n", true),
        (6, "Дмитрий Соколов", "ДС", "@dmitry_s", false),
        (7, "Ольга Морозова", "ОМ", "@olga_m", true),
        (8, "Сергей Волков", "СВ", "@sergey_v", false),
    ]
    .into_iter()
    .map(|(id, name, avatar, handle, online)| Contact {
        id,
        name: name.to_string(),
        avatar: avatar.to_string(),
        handle: handle.to_string(),
        online,
    })
    .collect()
});

static CHATS: Lazy<Vec<ChatSummary>> = Lazy::new(|| {
    [
        (1, "Анна Петрова", "AP", "Привет! Как дела? Давно не виделись", "14:32", 3, true),
        (2, "Команда проекта", "КП", "Отличная работа! Продолжаем в том же духе", "12:15", 0, false),
        (3, "Михаил Иванов", "МИ", "Отправил файлы по проекту", "вчера", 1, false),
        (4, "Мария Смирнова", "МС", "Созвонимся завтра?", "вчера", 0, true),
        (5, "Друзья", "Д", "Кто идет на встречу в субботу?", "2 дня", 5, false),
    ]
    .into_iter()
    .map(|(id, name, avatar, last_message, time, unread, online)| ChatSummary {
        id,
        name: name.to_string(),
        avatar: avatar.to_string(),
        last_message: last_message.to_string(),
        time: time.to_string(),
        unread,
        online,
        encrypted: true,
    })
    .collect()
});

// Chat 1 has a full sample conversation. The other chats only know their
// last message, so their log is that single message.
static MESSAGE_LOGS: Lazy<HashMap<u32, Vec<Message>>> = Lazy::new(|| {
    let mut logs: HashMap<u32, Vec<Message>> = CHATS
        .iter()
        .map(|chat| {
            let only = Message {
                id: 1,
                text: chat.last_message.clone(),
                time: chat.time.clone(),
                author: Author::Peer,
                status: DeliveryStatus::Read,
            };
            (chat.id, vec![only])
        })
        .collect();

    let conversation = [
        ("Привет! Как дела?", "14:28", Author::Peer, DeliveryStatus::Read),
        ("Давно не виделись, как проекты?", "14:29", Author::Peer, DeliveryStatus::Read),
        ("Привет! Все отлично, работаю над новым проектом", "14:30", Author::Me, DeliveryStatus::Read),
        ("Очень интересно, расскажешь подробнее?", "14:31", Author::Peer, DeliveryStatus::Read),
        (
            "Конечно! Это мессенджер с современным дизайном и шифрованием",
            "14:32",
            Author::Me,
            DeliveryStatus::Delivered,
        ),
    ];
    let messages = conversation
        .into_iter()
        .zip(1..)
        .map(|((text, time, author, status), id)| Message {
            id,
            text: text.to_string(),
            time: time.to_string(),
            author,
            status,
        })
        .collect();
    logs.insert(1, messages);

    logs
});

pub fn contacts() -> &'static [Contact] {
    &CONTACTS
}

pub fn chats() -> &'static [ChatSummary] {
    &CHATS
}

pub fn contact(id: u32) -> Option<&'static Contact> {
    CONTACTS.iter().find(|c| c.id == id)
}

pub fn chat(id: u32) -> Option<&'static ChatSummary> {
    CHATS.iter().find(|c| c.id == id)
}

/// The chat opened on start-up.
pub fn default_chat() -> &'static ChatSummary {
    &CHATS[0]
}

/// Messages of a chat in chronological order. Unknown chats have none.
pub fn message_log(chat_id: u32) -> &'static [Message] {
    MESSAGE_LOGS
        .get(&chat_id)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identities_are_unique() {
        let contact_ids: HashSet<u32> = contacts().iter().map(|c| c.id).collect();
        assert_eq!(contact_ids.len(), contacts().len());
        assert_eq!(contacts().len(), 8);

        let chat_ids: HashSet<u32> = chats().iter().map(|c| c.id).collect();
        assert_eq!(chat_ids.len(), chats().len());
        assert_eq!(chats().len(), 5);
    }

    #[test]
    fn test_every_chat_has_a_log() {
        for chat in chats() {
            let log = message_log(chat.id);
            assert!(!log.is_empty(), "chat {} has no messages", chat.id);
            let last = log.last().unwrap();
            assert_eq!(last.time, chat.time, "chat {} log ends at a different time", chat.id);
        }
    }

    #[test]
    fn test_first_chat_has_full_conversation() {
        let log = message_log(1);
        assert_eq!(log.len(), 5);
        assert_eq!(log[0].text, "Привет! Как дела?");
        assert!(log[2].is_mine());
        assert_eq!(log[4].status, DeliveryStatus::Delivered);

        let ids: Vec<u32> = log.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_lookups() {
        assert_eq!(contact(3).map(|c| c.handle.as_str()), Some("@maria_s"));
        assert!(contact(42).is_none());
        assert_eq!(chat(5).map(|c| c.unread), Some(5));
        assert_eq!(default_chat().id, 1);
        assert!(message_log(42).is_empty());
    }
}
