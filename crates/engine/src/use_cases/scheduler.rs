//! Delivery of queued companion lines.

use std::sync::Arc;

use minefriend_domain::SPEECH_COOLDOWN_TICKS;

use crate::infrastructure::ports::{ChatLine, ChatPort, CompanionPort};
use crate::use_cases::session::DialogueSession;

/// Drains a session's message queue once per tick.
pub struct MessageScheduler {
    chat: Arc<dyn ChatPort>,
    companions: Arc<dyn CompanionPort>,
}

impl MessageScheduler {
    pub fn new(chat: Arc<dyn ChatPort>, companions: Arc<dyn CompanionPort>) -> Self {
        Self { chat, companions }
    }

    /// Broadcast every line whose delay ran out, in queue order.
    ///
    /// Returns how many lines went out.
    pub fn drain(&self, session: &mut DialogueSession) -> usize {
        let due = session.queue.tick();
        if due.is_empty() {
            return 0;
        }
        let companion = session.resolve_companion(self.companions.as_ref());
        for message in &due {
            let line = ChatLine::from_companion(session.companion_name(), message.text(), message.style());
            self.chat.broadcast(&line);
        }
        if let Some(companion) = companion {
            self.companions
                .set_speech_cooldown(companion, SPEECH_COOLDOWN_TICKS);
        }
        tracing::debug!(player_id = %session.player, lines = due.len(), "Delivered companion lines");
        due.len()
    }
}
