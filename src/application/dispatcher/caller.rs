//! Who issued a command.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ChatId;
use crate::domain::session::Rider;

/// The identity behind a command, resolved by the outer shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Caller {
    /// The timer firing the daily runs.
    System,
    /// A chat user acting inside a chat.
    Member {
        chat_id: ChatId,
        rider: Rider,
        #[serde(default)]
        is_chat_admin: bool,
    },
}

impl Caller {
    pub fn member(chat_id: ChatId, rider: Rider) -> Self {
        Caller::Member {
            chat_id,
            rider,
            is_chat_admin: false,
        }
    }

    pub fn admin(chat_id: ChatId, rider: Rider) -> Self {
        Caller::Member {
            chat_id,
            rider,
            is_chat_admin: true,
        }
    }

    /// The chat the command was issued in; `None` for the timer.
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            Caller::System => None,
            Caller::Member { chat_id, .. } => Some(*chat_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::RiderId;

    #[test]
    fn member_callers_carry_their_chat() {
        let rider = Rider::new(RiderId::new(1), "A");
        assert_eq!(Caller::member(ChatId::new(-4), rider).chat_id(), Some(ChatId::new(-4)));
        assert_eq!(Caller::System.chat_id(), None);
    }

    #[test]
    fn admin_flag_defaults_to_false() {
        let caller: Caller = serde_json::from_str(
            r#"{"kind":"member","chat_id":-4,"rider":{"id":1,"display_name":"A"}}"#,
        )
        .unwrap();
        assert!(matches!(caller, Caller::Member { is_chat_admin: false, .. }));
    }
}
