//! Off-thread model requests and the hand-off back to the tick thread.

use std::sync::Arc;

use dashmap::DashMap;
use minefriend_domain::{Phase, PlayerId, SessionId};
use tokio::sync::mpsc::UnboundedSender;

use crate::use_cases::dialogue::DialogueGateway;

use super::events::Inbound;

/// One model exchange, owned by the task that performs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRequest {
    pub player: PlayerId,
    pub session: SessionId,
    pub persona: String,
    pub player_name: String,
    pub message: String,
    pub phase: Phase,
}

/// Spawns one task per request. Tasks carry only values and a sender.
///
/// Requests for the same player are not deduplicated; overlapping ones are
/// counted and logged.
pub struct ReplyDispatcher {
    gateway: DialogueGateway,
    sender: UnboundedSender<Inbound>,
    in_flight: Arc<DashMap<PlayerId, usize>>,
}

impl ReplyDispatcher {
    pub fn new(gateway: DialogueGateway, sender: UnboundedSender<Inbound>) -> Self {
        Self {
            gateway,
            sender,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Requests for `player` that have not completed yet.
    pub fn in_flight(&self, player: PlayerId) -> usize {
        self.in_flight.get(&player).map(|count| *count).unwrap_or(0)
    }

    pub fn dispatch(&self, request: ReplyRequest) {
        let outstanding = {
            let mut count = self.in_flight.entry(request.player).or_insert(0);
            *count += 1;
            *count
        };
        if outstanding > 1 {
            tracing::warn!(
                player_id = %request.player,
                outstanding,
                "Overlapping completion requests for one player"
            );
        }

        let gateway = self.gateway.clone();
        let sender = self.sender.clone();
        let in_flight = self.in_flight.clone();
        tokio::spawn(async move {
            let reply = gateway
                .request_reply_as(
                    &request.persona,
                    &request.message,
                    &request.player_name,
                    request.phase,
                )
                .await;
            release(&in_flight, request.player);

            let completion = Inbound::Completion {
                player: request.player,
                session: request.session,
                reply,
            };
            if sender.send(completion).is_err() {
                tracing::debug!(player_id = %request.player, "Engine stopped, dropping reply");
            }
        });
    }
}

fn release(in_flight: &DashMap<PlayerId, usize>, player: PlayerId) {
    if let Some(mut count) = in_flight.get_mut(&player) {
        *count = count.saturating_sub(1);
    }
    in_flight.remove_if(&player, |_, count| *count == 0);
}
