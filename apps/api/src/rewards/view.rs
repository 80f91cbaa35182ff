use serde::Serialize;

use crate::dates::{long_date, parse_datetime_input};
use crate::models::rewards::{Achievement, Rewards};

pub const DEFAULT_ACHIEVEMENT_ICON: &str = "🏆";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureItem {
    pub key: String,
    pub label: String,
    pub unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementCard {
    pub key: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub earned_on: String,
}

#[derive(Debug, Serialize)]
pub struct RewardsView {
    pub token_balance: i32,
    pub lifetime_tokens: i32,
    pub unlocked_features: Vec<FeatureItem>,
    pub achievements: Vec<AchievementCard>,
}

/// `early_access` → `Early Access`. Every underscore becomes one space, so
/// doubled underscores keep a doubled space.
pub fn feature_label(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn achievement_card(key: &str, a: &Achievement) -> AchievementCard {
    let earned_on = parse_datetime_input(&a.date_earned)
        .map(|dt| long_date(&dt))
        .unwrap_or_else(|| a.date_earned.clone());

    AchievementCard {
        key: key.to_string(),
        name: a.name.clone(),
        description: a.description.clone(),
        icon: a
            .icon
            .clone()
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ACHIEVEMENT_ICON.to_string()),
        earned_on,
    }
}

impl RewardsView {
    /// A user without a rewards row sees zero balances and no entries.
    pub fn build(rewards: Option<&Rewards>) -> Self {
        let Some(r) = rewards else {
            return RewardsView {
                token_balance: 0,
                lifetime_tokens: 0,
                unlocked_features: Vec::new(),
                achievements: Vec::new(),
            };
        };

        RewardsView {
            token_balance: r.token_balance,
            lifetime_tokens: r.lifetime_tokens,
            unlocked_features: r
                .unlocked_features
                .iter()
                .map(|(key, unlocked)| FeatureItem {
                    key: key.to_string(),
                    label: feature_label(key),
                    unlocked: *unlocked,
                })
                .collect(),
            achievements: r
                .achievements
                .iter()
                .map(|(key, a)| achievement_card(key, a))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ordered_map::OrderedMap;
    use chrono::Utc;
    use uuid::Uuid;

    fn rewards(achievements: OrderedMap<Achievement>, features: OrderedMap<bool>) -> Rewards {
        let now = Utc::now();
        Rewards {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_balance: 40,
            lifetime_tokens: 120,
            achievements,
            unlocked_features: features,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_feature_label() {
        assert_eq!(feature_label("early_access"), "Early Access");
        assert_eq!(feature_label("video_capsules_hd"), "Video Capsules Hd");
        assert_eq!(feature_label("themes"), "Themes");
        assert_eq!(feature_label("a__b"), "A  B");
        assert_eq!(feature_label("_lead"), " Lead");
    }

    #[test]
    fn test_empty_achievements_render_no_cards() {
        let view = RewardsView::build(Some(&rewards(OrderedMap::new(), OrderedMap::new())));
        assert!(view.achievements.is_empty());
        assert!(view.unlocked_features.is_empty());
        assert_eq!(view.token_balance, 40);
    }

    #[test]
    fn test_missing_row_is_zeroed() {
        let view = RewardsView::build(None);
        assert_eq!(view.token_balance, 0);
        assert_eq!(view.lifetime_tokens, 0);
        assert!(view.achievements.is_empty());
    }

    #[test]
    fn test_entries_keep_map_order() {
        let features: OrderedMap<bool> =
            serde_json::from_str(r#"{"themes": true, "early_access": false, "audio": true}"#)
                .unwrap();
        let view = RewardsView::build(Some(&rewards(OrderedMap::new(), features)));
        let keys: Vec<&str> = view.unlocked_features.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["themes", "early_access", "audio"]);
        assert!(!view.unlocked_features[1].unlocked);
    }

    #[test]
    fn test_achievement_card_defaults() {
        let mut achievements = OrderedMap::new();
        achievements.insert(
            "first_capsule",
            Achievement {
                name: "First Capsule".to_string(),
                description: "Created your first capsule".to_string(),
                date_earned: "2024-05-01T10:00:00Z".to_string(),
                icon: None,
            },
        );
        achievements.insert(
            "legacy",
            Achievement {
                name: "Legacy".to_string(),
                description: String::new(),
                date_earned: "sometime".to_string(),
                icon: Some("https://cdn.example.com/legacy.svg".to_string()),
            },
        );

        let view = RewardsView::build(Some(&rewards(achievements, OrderedMap::new())));
        assert_eq!(view.achievements[0].icon, DEFAULT_ACHIEVEMENT_ICON);
        assert_eq!(view.achievements[0].earned_on, "May 1st, 2024");
        assert_eq!(view.achievements[1].icon, "https://cdn.example.com/legacy.svg");
        assert_eq!(view.achievements[1].earned_on, "sometime");
    }
}
