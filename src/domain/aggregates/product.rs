//! Product rating fold
//!
//! Ratings are upserted by the (product, user) identity pair and the
//! stored average is always recomputed from the full current set.

use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct Rating {
    pub posted_by: Uuid,
    pub star: i16,
    pub review: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RatingOutcome { Created, Updated }

/// Overwrites the entry posted by the same user in place, or appends a new
/// one. There is never more than one entry per user.
pub fn upsert_rating(ratings: &mut Vec<Rating>, entry: Rating) -> RatingOutcome {
    match ratings.iter_mut().find(|r| r.posted_by == entry.posted_by) {
        Some(existing) => {
            existing.star = entry.star;
            existing.review = entry.review;
            RatingOutcome::Updated
        }
        None => {
            ratings.push(entry);
            RatingOutcome::Created
        }
    }
}

/// Arithmetic mean of all star values, rounded to 2 dp. An empty set is
/// zero, never a division fault.
pub fn average_rating(ratings: &[Rating]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = ratings.iter().map(|r| Decimal::from(r.star)).sum();
    (sum / Decimal::from(ratings.len())).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(user: Uuid, star: i16) -> Rating {
        Rating { posted_by: user, star, review: None }
    }

    #[test]
    fn test_same_user_updates_in_place() {
        let user = Uuid::new_v4();
        let mut ratings = vec![];
        assert_eq!(upsert_rating(&mut ratings, rating(user, 3)), RatingOutcome::Created);
        assert_eq!(upsert_rating(&mut ratings, rating(user, 5)), RatingOutcome::Updated);
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].star, 5);
        assert_eq!(average_rating(&ratings), Decimal::new(500, 2));
    }

    #[test]
    fn test_different_users_append() {
        let mut ratings = vec![];
        upsert_rating(&mut ratings, rating(Uuid::new_v4(), 5));
        upsert_rating(&mut ratings, rating(Uuid::new_v4(), 4));
        assert_eq!(ratings.len(), 2);
        assert_eq!(average_rating(&ratings), Decimal::new(450, 2));
    }

    #[test]
    fn test_average_rounds_to_two_places() {
        let mut ratings = vec![];
        upsert_rating(&mut ratings, rating(Uuid::new_v4(), 5));
        upsert_rating(&mut ratings, rating(Uuid::new_v4(), 4));
        upsert_rating(&mut ratings, rating(Uuid::new_v4(), 4));
        // (5 + 4 + 4) / 3 = 4.333...
        assert_eq!(average_rating(&ratings), Decimal::new(433, 2));
    }

    #[test]
    fn test_empty_set_is_zero() {
        assert_eq!(average_rating(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_upsert_replaces_review_text() {
        let user = Uuid::new_v4();
        let mut ratings = vec![Rating { posted_by: user, star: 2, review: Some("meh".into()) }];
        upsert_rating(&mut ratings, Rating { posted_by: user, star: 4, review: Some("better now".into()) });
        assert_eq!(ratings[0].review.as_deref(), Some("better now"));
    }
}
