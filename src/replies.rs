use crate::persona::Persona;
use crate::random::RandomSource;

/// Chance that a keyword reply gets a trailing emoji.
pub const EMOJI_PROBABILITY: f64 = 0.5;

/// Pick a reply for free-form text.
///
/// Keyword replies carry an emoji half of the time; fallback replies always do.
pub fn select_reply(persona: &Persona, text: &str, rng: &mut dyn RandomSource) -> String {
    let normalized = text.trim().to_lowercase();

    match persona.match_rule(&normalized) {
        Some(rule) => {
            let reply = rng.pick(&rule.replies).to_string();
            if rng.chance(EMOJI_PROBABILITY) {
                decorate(reply, persona, rng)
            } else {
                reply
            }
        }
        None => {
            let reply = rng.pick(&persona.default_replies).to_string();
            decorate(reply, persona, rng)
        }
    }
}

/// Caption for a photo reply, always decorated.
pub fn photo_caption(persona: &Persona, rng: &mut dyn RandomSource) -> String {
    let caption = rng.pick(&persona.photo_captions).to_string();
    decorate(caption, persona, rng)
}

fn decorate(mut text: String, persona: &Persona, rng: &mut dyn RandomSource) -> String {
    text.push(' ');
    text.push_str(rng.pick(&persona.emojis));
    text
}
