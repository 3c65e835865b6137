/// A person who can be added to a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: u32,
    pub name: String,
    pub avatar: String,  // Display initials
    pub handle: String,  // e.g. "@anna_p"
    pub online: bool,
}

/// A conversation summary shown in the chat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub id: u32,
    pub name: String,
    pub avatar: String,
    pub last_message: String,
    pub time: String,    // Display label ("14:32", "вчера"), not a timestamp
    pub unread: u32,
    pub online: bool,
    pub encrypted: bool, // Cosmetic only, no cryptography behind it
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u32,
    pub text: String,
    pub time: String,
    pub author: Author,
    pub status: DeliveryStatus,
}

impl Message {
    pub fn is_mine(&self) -> bool {
        self.author == Author::Me
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Author {
    Me,
    Peer,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
}

impl DeliveryStatus {
    /// Tick marks shown next to own messages.
    pub fn ticks(self) -> &'static str {
        match self {
            DeliveryStatus::Sent | DeliveryStatus::Delivered => "✓",
            DeliveryStatus::Read => "✓✓",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_read_messages_get_double_ticks() {
        assert_eq!(DeliveryStatus::Sent.ticks(), "✓");
        assert_eq!(DeliveryStatus::Delivered.ticks(), "✓");
        assert_eq!(DeliveryStatus::Read.ticks(), "✓✓");
    }

    #[test]
    fn test_message_author() {
        let msg = Message {
            id: 1,
            text: "Hello".to_string(),
            time: "12:00".to_string(),
            author: Author::Me,
            status: DeliveryStatus::Sent,
        };
        assert!(msg.is_mine());

        let reply = Message { author: Author::Peer, ..msg };
        assert!(!reply.is_mine());
    }
}
