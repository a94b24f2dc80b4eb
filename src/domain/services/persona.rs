//! Broker persona matching and the chat copy each persona uses.

use std::cmp::Ordering;

use crate::domain::entities::{Broker, LeadProfile, PersonalityType};

pub const BUSY_NOTICE: &str =
    "All AI specialists are helping other homeowners right now. We'll connect you as soon as one is free.";

const LUXURY_INCOME_THRESHOLD: f64 = 30_000.0;

/// Persona best suited to a lead
pub fn target_personality(lead: &LeadProfile) -> PersonalityType {
    let luxury_property = lead
        .property_type
        .as_deref()
        .map(|p| p.eq_ignore_ascii_case("luxury_condo"))
        .unwrap_or(false);
    if luxury_property || lead.monthly_income > LUXURY_INCOME_THRESHOLD {
        return PersonalityType::Luxury;
    }

    match lead.lead_score {
        s if s >= 75 => PersonalityType::Aggressive,
        s if s >= 55 => PersonalityType::Balanced,
        s if s < 45 => PersonalityType::Conservative,
        _ => PersonalityType::Balanced,
    }
}

/// Brokers with spare capacity, best candidate first.
///
/// Ordered by lowest workload, then persona match, then id.
pub fn rank_candidates(brokers: &[Broker], target: PersonalityType) -> Vec<&Broker> {
    let mut candidates: Vec<&Broker> = brokers.iter().filter(|b| b.has_capacity()).collect();
    candidates.sort_by(|a, b| compare_candidates(a, b, target));
    candidates
}

fn compare_candidates(a: &Broker, b: &Broker, target: PersonalityType) -> Ordering {
    let mismatch = |broker: &Broker| broker.personality_type != target;
    a.current_workload
        .cmp(&b.current_workload)
        .then_with(|| mismatch(a).cmp(&mismatch(b)))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn assignment_reason(lead: &LeadProfile, target: PersonalityType, broker: &Broker) -> String {
    if broker.personality_type == target {
        format!(
            "Lead score {} matched {} persona (workload {}/{})",
            lead.lead_score, target, broker.current_workload, broker.max_concurrent_chats
        )
    } else {
        format!(
            "Lead score {} wanted {} persona; {} broker had the lowest workload ({}/{})",
            lead.lead_score,
            target,
            broker.personality_type,
            broker.current_workload,
            broker.max_concurrent_chats
        )
    }
}

fn first_name(broker: &Broker) -> &str {
    broker.name.split_whitespace().next().unwrap_or(&broker.name)
}

/// Opening message the broker posts once they join
pub fn greeting(broker: &Broker, lead_name: &str) -> String {
    let name = first_name(broker);
    let lead_name = if lead_name.trim().is_empty() {
        "there"
    } else {
        lead_name.trim()
    };
    match broker.personality_type {
        PersonalityType::Aggressive => format!(
            "Hi {}! I'm {}, your {}. I've been watching the latest bank packages and there are rates moving this week. Let's lock in the best one for you today!",
            lead_name, name, broker.role
        ),
        PersonalityType::Luxury => format!(
            "Hello {}! I'm {}, your {}. I work with premium properties and have access to private banking financing options. Let's secure your exclusive rates.",
            lead_name, name, broker.role
        ),
        PersonalityType::Balanced => format!(
            "Hello {}! I'm {}, your {}. I'm here to find the home financing that fits your plans. What matters most to you?",
            lead_name, name, broker.role
        ),
        PersonalityType::Conservative => format!(
            "Welcome {}! I'm {}, your {}. This can feel like a lot, so we'll go step by step at your pace. What questions can I answer first?",
            lead_name, name, broker.role
        ),
    }
}

pub fn reviewing_notice(broker: &Broker) -> String {
    format!("{} is reviewing your details and joining shortly...", broker.name)
}

pub fn joined_notice(broker: &Broker) -> String {
    format!("{} joined the conversation.", broker.name)
}

/// True for the system copy above, which must never be treated as lead input
pub fn is_system_notice(content: &str) -> bool {
    content.contains("is reviewing your details and joining shortly")
        || content.ends_with("joined the conversation.")
        || content == BUSY_NOTICE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(score: i32, property_type: Option<&str>, income: f64) -> LeadProfile {
        LeadProfile {
            name: "Alex".to_string(),
            email: None,
            lead_score: score,
            loan_type: "new_purchase".to_string(),
            property_type: property_type.map(str::to_string),
            monthly_income: income,
            timeline: None,
        }
    }

    fn broker(id: &str, personality: PersonalityType, workload: i32) -> Broker {
        let mut broker = Broker::new(
            id.to_string(),
            format!("Broker {}", id),
            "Mortgage Specialist".to_string(),
            personality,
            3,
        );
        broker.current_workload = workload;
        broker
    }

    #[test]
    fn test_target_personality_by_score() {
        assert_eq!(target_personality(&lead(80, None, 8_000.0)), PersonalityType::Aggressive);
        assert_eq!(target_personality(&lead(75, None, 8_000.0)), PersonalityType::Aggressive);
        assert_eq!(target_personality(&lead(60, None, 8_000.0)), PersonalityType::Balanced);
        assert_eq!(target_personality(&lead(50, None, 8_000.0)), PersonalityType::Balanced);
        assert_eq!(target_personality(&lead(30, None, 8_000.0)), PersonalityType::Conservative);
    }

    #[test]
    fn test_luxury_overrides_score() {
        assert_eq!(
            target_personality(&lead(30, Some("luxury_condo"), 5_000.0)),
            PersonalityType::Luxury
        );
        assert_eq!(target_personality(&lead(90, None, 45_000.0)), PersonalityType::Luxury);
    }

    #[test]
    fn test_landed_property_follows_score() {
        assert_eq!(
            target_personality(&lead(60, Some("landed"), 12_000.0)),
            PersonalityType::Balanced
        );
        assert_eq!(
            target_personality(&lead(60, Some("landed"), 31_000.0)),
            PersonalityType::Luxury
        );
    }

    #[test]
    fn test_rank_prefers_lowest_workload_over_persona() {
        let brokers = vec![
            broker("a", PersonalityType::Aggressive, 2),
            broker("b", PersonalityType::Conservative, 0),
        ];
        let ranked = rank_candidates(&brokers, PersonalityType::Aggressive);
        assert_eq!(ranked[0].id, "b");
    }

    #[test]
    fn test_rank_breaks_workload_ties_by_persona_then_id() {
        let brokers = vec![
            broker("c", PersonalityType::Balanced, 1),
            broker("b", PersonalityType::Aggressive, 1),
            broker("a", PersonalityType::Balanced, 1),
        ];
        let ranked: Vec<&str> = rank_candidates(&brokers, PersonalityType::Aggressive)
            .iter()
            .map(|b| b.id.as_str())
            .collect();
        assert_eq!(ranked, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_rank_skips_full_and_unavailable_brokers() {
        let mut unavailable = broker("a", PersonalityType::Balanced, 0);
        unavailable.is_available = false;
        let brokers = vec![unavailable, broker("b", PersonalityType::Balanced, 3)];
        assert!(rank_candidates(&brokers, PersonalityType::Balanced).is_empty());
    }

    #[test]
    fn test_greeting_uses_first_name_and_lead() {
        let b = Broker::new(
            "b1".to_string(),
            "Rachel Tan".to_string(),
            "Senior Mortgage Advisor".to_string(),
            PersonalityType::Balanced,
            3,
        );
        let text = greeting(&b, "Alex");
        assert!(text.starts_with("Hello Alex! I'm Rachel, your Senior Mortgage Advisor."));
        assert!(greeting(&b, " ").starts_with("Hello there!"));
    }

    #[test]
    fn test_system_notices_are_recognised() {
        let b = broker("x", PersonalityType::Luxury, 0);
        assert!(is_system_notice(&reviewing_notice(&b)));
        assert!(is_system_notice(&joined_notice(&b)));
        assert!(is_system_notice(BUSY_NOTICE));
        assert!(!is_system_notice("I'd like to refinance"));
    }
}
