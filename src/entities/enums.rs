//! Enumerazioni - Enumerated types stored inside documents
//!
//! The serialized labels are part of the stored data contract and must not
//! change: existing documents use exactly these strings.

use serde::{Deserialize, Serialize};

// ********************* ENUMERAZIONI UTILI **********************//

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

impl InviteStatus {
    /// Pending can move to an RSVP, an RSVP can move to either RSVP,
    /// nothing moves back to Pending.
    pub fn can_transition_to(self, next: InviteStatus) -> bool {
        !matches!(next, InviteStatus::Pending)
    }

    pub fn is_rsvp(self) -> bool {
        !matches!(self, InviteStatus::Pending)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Lunch,
    Dinner,
    Breakfast,
    Drinks,
    #[serde(rename = "Hang Out")]
    HangOut,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteNotificationType {
    RsvpChanged,
    RestaurantSuggestionUpdate,
    SuggestedRestaurantAcceptedBySender,
    SuggestedRestaurantAcceptedByRecipient,
}

impl InviteNotificationType {
    pub fn default_message(self) -> &'static str {
        match self {
            InviteNotificationType::RsvpChanged => "RSVP status updated.",
            InviteNotificationType::RestaurantSuggestionUpdate => "Suggested restaurant updated.",
            InviteNotificationType::SuggestedRestaurantAcceptedBySender
            | InviteNotificationType::SuggestedRestaurantAcceptedByRecipient => {
                "Restaurant suggestion accepted."
            }
        }
    }
}

/// Dietary restrictions a user can declare on the profile and snapshot into invites
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DietaryOption {
    // intolerances
    #[serde(rename = "Dairy Intolerance")]
    DairyIntolerance,
    #[serde(rename = "Fructose Intolerance")]
    FructoseIntolerance,
    #[serde(rename = "Lactose Intolerance")]
    LactoseIntolerance,
    #[serde(rename = "Gluten Intolerance")]
    GlutenIntolerance,
    // allergies
    #[serde(rename = "Peanut Allergy")]
    PeanutAllergy,
    #[serde(rename = "Tree Nut Allergy")]
    TreeNutAllergy,
    #[serde(rename = "Shellfish Allergy")]
    ShellfishAllergy,
    #[serde(rename = "Soy Allergy")]
    SoyAllergy,
    #[serde(rename = "Egg Allergy")]
    EggAllergy,
    #[serde(rename = "Fish Allergy")]
    FishAllergy,
    #[serde(rename = "Wheat Allergy")]
    WheatAllergy,
    #[serde(rename = "Corn Allergy")]
    CornAllergy,
    #[serde(rename = "Sesame Allergy")]
    SesameAllergy,
    #[serde(rename = "Lupin Allergy")]
    LupinAllergy,
    #[serde(rename = "Mustard Allergy")]
    MustardAllergy,
    // medical conditions
    #[serde(rename = "Celiac Disease")]
    CeliacDisease,
    Diabetes,
    #[serde(rename = "High Blood Pressure")]
    HighBloodPressure,
    #[serde(rename = "High Cholesterol")]
    HighCholesterol,
    // preferences
    Vegetarian,
    Vegan,
    Pescatarian,
    Keto,
    Paleo,
    Halal,
    Kosher,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stored_labels_are_preserved() {
        assert_eq!(serde_json::to_value(EventType::HangOut).unwrap(), json!("Hang Out"));
        assert_eq!(
            serde_json::to_value(InviteNotificationType::SuggestedRestaurantAcceptedByRecipient)
                .unwrap(),
            json!("SUGGESTED_RESTAURANT_ACCEPTED_BY_RECIPIENT")
        );
        assert_eq!(
            serde_json::to_value(InviteNotificationType::RsvpChanged).unwrap(),
            json!("RSVP_CHANGED")
        );
        assert_eq!(
            serde_json::from_value::<DietaryOption>(json!("Tree Nut Allergy")).unwrap(),
            DietaryOption::TreeNutAllergy
        );
    }

    #[test]
    fn test_pending_is_never_reentered() {
        for from in [InviteStatus::Pending, InviteStatus::Accepted, InviteStatus::Declined] {
            assert!(!from.can_transition_to(InviteStatus::Pending));
            assert!(from.can_transition_to(InviteStatus::Accepted));
            assert!(from.can_transition_to(InviteStatus::Declined));
        }
    }
}
