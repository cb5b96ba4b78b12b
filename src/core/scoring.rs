//! Conversation scoring heuristics.
//!
//! - `confidence_score`: rep verbosity plus action-oriented language
//! - `objection_score`: share of prospect objections the rep answered with value talk
//! - `outcome_rating`: weighted blend of the two plus a scenario keyword bonus
//!
//! All scores are clamped to 0..=100.

use crate::domain::model::{Conversation, Scenario, ScoreReport, Scores};

pub const ACTION_WORDS: [&str; 8] = [
    "schedule",
    "book",
    "demo",
    "try",
    "purchase",
    "sign",
    "agree",
    "next step",
];

pub const OBJECTIONS: [&str; 7] = [
    "i'm not interested",
    "send me an email",
    "we don't have budget",
    "we already use another vendor",
    "not a priority",
    "no budget",
    "send info",
];

pub const REMEDY_WORDS: [&str; 8] = [
    "price",
    "discount",
    "roi",
    "benefit",
    "save",
    "cost",
    "timeline",
    "implementation",
];

pub const TIP_ACTION: &str =
    "Use more action-oriented phrases (e.g., 'Can we schedule a demo', 'Let's book 30 minutes').";
pub const TIP_OBJECTIONS: &str =
    "Practice handling objections: acknowledge, probe, and present a concise value response (price/ROI).";
pub const TIP_EXPAND: &str = "Try to expand your responses with clear next steps and benefits.";

fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['’', '‘'], "'")
}

pub fn score_conversation(conversation: &Conversation, scenario: &Scenario) -> ScoreReport {
    let rep_text = conversation
        .rep_turns()
        .map(|t| normalize(&t.text))
        .collect::<Vec<_>>()
        .join(" ");
    let ai_text = conversation
        .ai_turns()
        .map(|t| normalize(&t.text))
        .collect::<Vec<_>>()
        .join(" ");
    let rep_words = rep_text.split_whitespace().count() as u64;

    let action_count = ACTION_WORDS.iter().filter(|w| rep_text.contains(*w)).count() as u64;
    let confidence_score = (20 + rep_words * 2 + action_count * 10).min(100) as u32;

    let objection_count: usize = OBJECTIONS.iter().map(|o| ai_text.matches(o).count()).sum();
    let handled_count = conversation
        .rep_turns()
        .filter(|t| {
            let text = normalize(&t.text);
            REMEDY_WORDS.iter().any(|r| text.contains(r))
        })
        .count();
    let objection_score = if objection_count == 0 {
        100
    } else {
        ((100 * handled_count) / objection_count).min(100) as u32
    };

    let keyword = scenario.keyword();
    let scenario_match = u32::from(!keyword.is_empty() && rep_text.contains(&keyword));

    let outcome = f64::from(confidence_score) * 0.5
        + f64::from(objection_score) * 0.4
        + f64::from(scenario_match) * 10.0;
    let outcome_rating = (outcome.floor() as u32).min(100);

    let mut tips = Vec::new();
    if confidence_score < 40 {
        tips.push(TIP_ACTION.to_string());
    }
    if objection_score < 60 {
        tips.push(TIP_OBJECTIONS.to_string());
    }
    if rep_words < 10 {
        tips.push(TIP_EXPAND.to_string());
    }

    ScoreReport {
        scores: Scores {
            confidence_score,
            objection_score,
            outcome_rating,
        },
        tips,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(turns: &[(&str, &str)]) -> Conversation {
        let mut c = Conversation::new();
        for (speaker, text) in turns {
            match *speaker {
                "rep" => c.push_rep(*text),
                _ => c.push_ai(*text),
            }
        }
        c
    }

    #[test]
    fn test_empty_conversation() {
        let report = score_conversation(&Conversation::new(), &Scenario::ColdCall);
        assert_eq!(
            report.scores,
            Scores {
                confidence_score: 20,
                objection_score: 100,
                outcome_rating: 50,
            }
        );
        assert_eq!(report.tips, vec![TIP_ACTION.to_string(), TIP_EXPAND.to_string()]);
    }

    #[test]
    fn test_confidence_counts_words_and_distinct_action_words() {
        // 8 words, action words: schedule, demo (book absent)
        let c = conversation(&[("rep", "Can we schedule a demo for next week?")]);
        let report = score_conversation(&c, &Scenario::DemoCall);
        assert_eq!(report.scores.confidence_score, 20 + 8 * 2 + 2 * 10);
    }

    #[test]
    fn test_confidence_is_capped() {
        let long = "word ".repeat(60);
        let c = conversation(&[("rep", long.as_str())]);
        assert_eq!(
            score_conversation(&c, &Scenario::ColdCall).scores.confidence_score,
            100
        );
    }

    #[test]
    fn test_unhandled_objection_scores_zero() {
        let c = conversation(&[
            ("rep", "Hello, this is Sam from Acme."),
            ("ai", "I’m not interested."),
            ("rep", "Okay, bye then."),
        ]);
        let report = score_conversation(&c, &Scenario::ColdCall);
        assert_eq!(report.scores.objection_score, 0);
        assert!(report.tips.contains(&TIP_OBJECTIONS.to_string()));
    }

    #[test]
    fn test_typographic_apostrophes_match_objections() {
        let c = conversation(&[
            ("ai", "We don’t have budget for that."),
            ("rep", "Understood, our ROI pays back within a quarter."),
        ]);
        let report = score_conversation(&c, &Scenario::PricingNegotiationCall);
        assert_eq!(report.scores.objection_score, 100);
    }

    #[test]
    fn test_objection_score_is_partial_and_capped() {
        let partial = conversation(&[
            ("ai", "Send me an email. We already use another vendor."),
            ("rep", "The price is lower than what you pay today."),
        ]);
        assert_eq!(
            score_conversation(&partial, &Scenario::ColdCall)
                .scores
                .objection_score,
            50
        );

        let over = conversation(&[
            ("ai", "No budget."),
            ("rep", "We offer a discount."),
            ("rep", "And the implementation takes a week."),
        ]);
        assert_eq!(
            score_conversation(&over, &Scenario::ColdCall)
                .scores
                .objection_score,
            100
        );
    }

    #[test]
    fn test_scenario_keyword_bonus() {
        let text = "This is a quick renewal check in about your plan";
        let c = conversation(&[("rep", text)]);

        let renewal = score_conversation(&c, &Scenario::RenewalCall).scores;
        let cold = score_conversation(&c, &Scenario::ColdCall).scores;

        // 10 words -> confidence 40, no objections -> 100
        assert_eq!(renewal.confidence_score, 40);
        assert_eq!(cold.outcome_rating, 60);
        assert_eq!(renewal.outcome_rating, 70);
    }

    #[test]
    fn test_outcome_rating_is_capped() {
        let long = format!("renewal {}", "schedule ".repeat(60));
        let c = conversation(&[("rep", long.as_str())]);
        let report = score_conversation(&c, &Scenario::RenewalCall);
        assert_eq!(report.scores.outcome_rating, 100);
        assert!(report.tips.is_empty());
    }
}
