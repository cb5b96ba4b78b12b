use crate::domain::model::Persona;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

pub const OBJECTION_REPLIES: [&str; 5] = [
    "I’m not interested.",
    "Send me an email with details.",
    "We don’t have budget for that.",
    "We already use another vendor.",
    "This isn't a priority for us right now.",
];

pub const ACKNOWLEDGEMENTS: [&str; 3] = [
    "Okay, tell me more.",
    "How much is it?",
    "What makes you different?",
];

/// Rule-based prospect used when no language model answers in time.
pub struct HeuristicResponder {
    rng: Mutex<StdRng>,
}

impl HeuristicResponder {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn reply(&self, persona: &Persona) -> String {
        let likelihood = persona.profile().objection_likelihood;
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let pool: &[&str] = if rng.gen::<f64>() < likelihood {
            &OBJECTION_REPLIES
        } else {
            &ACKNOWLEDGEMENTS
        };

        pool.choose(&mut *rng)
            .copied()
            .unwrap_or(ACKNOWLEDGEMENTS[0])
            .to_string()
    }
}

impl Default for HeuristicResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_comes_from_known_pools() {
        let responder = HeuristicResponder::with_seed(7);
        for _ in 0..50 {
            let reply = responder.reply(&Persona::Skeptical);
            assert!(
                OBJECTION_REPLIES.contains(&reply.as_str())
                    || ACKNOWLEDGEMENTS.contains(&reply.as_str()),
                "unexpected reply: {reply}"
            );
        }
    }

    #[test]
    fn test_same_seed_gives_same_replies() {
        let a = HeuristicResponder::with_seed(42);
        let b = HeuristicResponder::with_seed(42);
        for _ in 0..10 {
            assert_eq!(a.reply(&Persona::Rushed), b.reply(&Persona::Rushed));
        }
    }

    #[test]
    fn test_objection_rate_follows_persona() {
        let responder = HeuristicResponder::with_seed(1);
        let objections = |persona: &Persona| {
            (0..2000)
                .filter(|_| OBJECTION_REPLIES.contains(&responder.reply(persona).as_str()))
                .count()
        };

        let annoyed = objections(&Persona::Annoyed);
        let friendly = objections(&Persona::Friendly);
        // 0.7 vs 0.25 likelihood
        assert!(annoyed > 1200, "annoyed objected {annoyed} times");
        assert!(friendly < 700, "friendly objected {friendly} times");
    }
}
