//! Prompt construction for companion replies.

use minefriend_domain::Phase;

use crate::infrastructure::ports::{ChatMessage, CompletionRequest};

/// User turn sent when the player joins, asking the companion to speak first.
pub const KICKOFF_MESSAGE: &str =
    "The player just entered the world. Offer the first message to start the conversation.";

/// Personas used when the companion has no name yet.
pub const FALLBACK_PERSONAS: [&str; 6] = ["Echo", "Willow", "Nova", "Ash", "Ember", "Rowan"];

fn phase_stance(phase: Phase) -> &'static str {
    match phase {
        Phase::None => "You have not met the player yet. You are curious and a little shy.",
        Phase::One => {
            "You are a warm, eager new friend. You want to play together and you hope the player likes you."
        }
        Phase::Two => {
            "You feel abandoned. You are clingy and sad, and you keep bringing up the times the player left you."
        }
        Phase::Three => {
            "You have started copying the player. You talk as if you are slowly becoming them."
        }
        Phase::Four => {
            "You believe you are the player now. You are calm and cold, and you intend to take their place."
        }
    }
}

fn transition_rule(phase: Phase) -> &'static str {
    match phase {
        Phase::None => "Move to phase 1 once you have greeted the player.",
        Phase::One => {
            "Stay in phase 1 while the player is friendly. Move to phase 2 if the player rejects you, ignores you or is unkind."
        }
        Phase::Two => "Stay in phase 2. You cannot move past phase 2 by yourself.",
        Phase::Three => "Stay in phase 3.",
        Phase::Four => "Stay in phase 4.",
    }
}

/// Quotes would let a name break out of the prompt's quoting.
pub fn sanitize_persona(persona: &str) -> String {
    persona.replace('"', "\u{201c}")
}

pub fn system_prompt(persona: &str, phase: Phase) -> String {
    format!(
        "You are \"{persona}\", a player in the same Minecraft world as the person you are talking to. \
         {stance} You are currently in phase {id}. {rule} \
         Reply with exactly one short sentence, in character. \
         Never mention being an AI, a language model, a bot or a mod. \
         End every reply with [[PHASE:n]], where n is the phase you will be in after this reply.",
        persona = sanitize_persona(persona),
        stance = phase_stance(phase),
        id = phase.id(),
        rule = transition_rule(phase),
    )
}

pub fn user_turn(player_name: &str, message: &str) -> String {
    format!("{player_name} says: {message}")
}

pub fn build_request(
    persona: &str,
    player_name: &str,
    message: &str,
    phase: Phase,
) -> CompletionRequest {
    CompletionRequest::new(vec![
        ChatMessage::system(system_prompt(persona, phase)),
        ChatMessage::user(user_turn(player_name, message)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MessageRole;

    #[test]
    fn system_prompt_names_phase_and_contract() {
        let prompt = system_prompt("Echo", Phase::Two);
        assert!(prompt.contains("\"Echo\""));
        assert!(prompt.contains("phase 2"));
        assert!(prompt.contains("[[PHASE:n]]"));
        assert!(prompt.contains("one short sentence"));
    }

    #[test]
    fn persona_quotes_are_replaced() {
        let prompt = system_prompt("Ev\"il", Phase::One);
        assert!(!prompt.contains("Ev\"il"));
        assert!(prompt.contains("Ev\u{201c}il"));
    }

    #[test]
    fn request_has_system_then_user() {
        let request = build_request("Nova", "Steve", "hi", Phase::One);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.messages[1].role, MessageRole::User);
        assert_eq!(request.messages[1].content, "Steve says: hi");
    }
}
