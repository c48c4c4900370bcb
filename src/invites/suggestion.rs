//! Suggestion engine - Ranked restaurant list for an accepted invite
//!
//! Ranking: an optional pinned restaurant first, then restaurants both parties
//! favorited, then the rest. Order inside the mutual and non-mutual groups is
//! random.

use crate::entities::RestaurantId;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Mutex;

/// Builds the suggestion list from both parties' favorites.
///
/// The result holds every id of the union exactly once, mutual favorites
/// before the others. `initial` always ends up first, even when neither party
/// has it among their favorites.
pub fn suggest_restaurants<R: Rng + ?Sized>(
    sender_favorites: &[RestaurantId],
    recipient_favorites: &[RestaurantId],
    initial: Option<&str>,
    rng: &mut R,
) -> Vec<RestaurantId> {
    let sender: HashSet<&str> = sender_favorites.iter().map(String::as_str).collect();
    let recipient: HashSet<&str> = recipient_favorites.iter().map(String::as_str).collect();

    let mut seen: HashSet<&RestaurantId> = HashSet::new();
    let (mut mutual, mut others): (Vec<RestaurantId>, Vec<RestaurantId>) = sender_favorites
        .iter()
        .chain(recipient_favorites)
        .filter(|id| seen.insert(*id))
        .cloned()
        .partition(|id| sender.contains(id.as_str()) && recipient.contains(id.as_str()));

    mutual.shuffle(rng);
    others.shuffle(rng);

    let mut ranked = mutual;
    ranked.append(&mut others);

    if let Some(pin) = initial {
        ranked.retain(|id| id != pin);
        ranked.insert(0, pin.to_string());
    }
    ranked
}

/// Shared entry point to [`suggest_restaurants`] owning its random source
pub struct SuggestionEngine {
    rng: Mutex<StdRng>,
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic engine, same seed gives the same shuffles
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn suggest(
        &self,
        sender_favorites: &[RestaurantId],
        recipient_favorites: &[RestaurantId],
        initial: Option<&str>,
    ) -> Vec<RestaurantId> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        suggest_restaurants(sender_favorites, recipient_favorites, initial, &mut *rng)
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<RestaurantId> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn sorted(mut values: Vec<RestaurantId>) -> Vec<RestaurantId> {
        values.sort();
        values
    }

    #[test]
    fn test_mutual_favorites_come_first() {
        let sender = ids(&["A", "B", "C"]);
        let recipient = ids(&["B", "C", "D"]);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let ranked = suggest_restaurants(&sender, &recipient, None, &mut rng);

            assert_eq!(ranked.len(), 4);
            assert_eq!(sorted(ranked[..2].to_vec()), ids(&["B", "C"]));
            assert_eq!(sorted(ranked[2..].to_vec()), ids(&["A", "D"]));
        }
    }

    #[test]
    fn test_pin_goes_first_and_list_stays_complete() {
        let sender = ids(&["A", "B", "C"]);
        let recipient = ids(&["B", "C", "D"]);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let ranked = suggest_restaurants(&sender, &recipient, Some("A"), &mut rng);

            assert_eq!(ranked[0], "A");
            assert_eq!(sorted(ranked.clone()), ids(&["A", "B", "C", "D"]));
            assert_eq!(sorted(ranked[1..3].to_vec()), ids(&["B", "C"]));
            assert_eq!(ranked[3], "D");
        }
    }

    #[test]
    fn test_pin_outside_favorites_is_prepended() {
        let mut rng = StdRng::seed_from_u64(7);
        let ranked = suggest_restaurants(&ids(&["A"]), &ids(&["B"]), Some("Z"), &mut rng);
        assert_eq!(ranked[0], "Z");
        assert_eq!(sorted(ranked), ids(&["A", "B", "Z"]));
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let mut rng = StdRng::seed_from_u64(1);
        let ranked = suggest_restaurants(&ids(&["A", "A", "B"]), &ids(&["B", "B"]), None, &mut rng);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], "B");
        assert_eq!(ranked[1], "A");
    }

    #[test]
    fn test_empty_favorites_give_empty_list() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(suggest_restaurants(&[], &[], None, &mut rng).is_empty());
    }

    #[test]
    fn test_seeded_engines_agree() {
        let sender = ids(&["A", "B", "C", "D", "E"]);
        let recipient = ids(&["F", "G", "H"]);
        let first = SuggestionEngine::seeded(42).suggest(&sender, &recipient, None);
        let second = SuggestionEngine::seeded(42).suggest(&sender, &recipient, None);
        assert_eq!(first, second);
    }
}
