//! Reaction toggling for blog likes and dislikes.
//!
//! A reaction is a set-membership flip. Likes and dislikes are mutually
//! exclusive: adding one removes the other first, so no state ever has
//! both set for the same user.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction { Like, Dislike }

impl Reaction {
    pub fn opposite(self) -> Reaction {
        match self {
            Reaction::Like => Reaction::Dislike,
            Reaction::Dislike => Reaction::Like,
        }
    }
}

/// Current membership of a user in both sets, read before the write.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReactionState {
    pub liked: bool,
    pub disliked: bool,
}

/// Writes to perform: removals first, then the optional insert.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReactionChange {
    pub add: Option<Reaction>,
    pub remove: Vec<Reaction>,
}

pub fn toggle(state: ReactionState, reaction: Reaction) -> ReactionChange {
    let (already, opposite_set) = match reaction {
        Reaction::Like => (state.liked, state.disliked),
        Reaction::Dislike => (state.disliked, state.liked),
    };
    let mut change = ReactionChange::default();
    if opposite_set {
        change.remove.push(reaction.opposite());
    }
    if already {
        change.remove.push(reaction);
    } else {
        change.add = Some(reaction);
    }
    change
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resulting_state(mut state: ReactionState, change: &ReactionChange) -> ReactionState {
        for removed in &change.remove {
            match removed {
                Reaction::Like => state.liked = false,
                Reaction::Dislike => state.disliked = false,
            }
        }
        match change.add {
            Some(Reaction::Like) => state.liked = true,
            Some(Reaction::Dislike) => state.disliked = true,
            None => {}
        }
        state
    }

    #[test]
    fn test_like_from_clean_state_adds_like() {
        let change = toggle(ReactionState::default(), Reaction::Like);
        assert_eq!(change.add, Some(Reaction::Like));
        assert!(change.remove.is_empty());
    }

    #[test]
    fn test_like_when_already_liked_removes_like() {
        let state = ReactionState { liked: true, disliked: false };
        let change = toggle(state, Reaction::Like);
        assert_eq!(change.add, None);
        assert_eq!(change.remove, vec![Reaction::Like]);
    }

    #[test]
    fn test_like_when_disliked_swaps_sets() {
        let state = ReactionState { liked: false, disliked: true };
        let change = toggle(state, Reaction::Like);
        assert_eq!(change.add, Some(Reaction::Like));
        assert_eq!(change.remove, vec![Reaction::Dislike]);
        let after = resulting_state(state, &change);
        assert!(after.liked && !after.disliked);
    }

    #[test]
    fn test_dislike_when_liked_swaps_sets() {
        let state = ReactionState { liked: true, disliked: false };
        let change = toggle(state, Reaction::Dislike);
        let after = resulting_state(state, &change);
        assert!(!after.liked && after.disliked);
    }

    #[test]
    fn test_never_both_set_after_any_toggle() {
        for liked in [false, true] {
            for disliked in [false, true] {
                for reaction in [Reaction::Like, Reaction::Dislike] {
                    let state = ReactionState { liked, disliked };
                    let after = resulting_state(state, &toggle(state, reaction));
                    assert!(!(after.liked && after.disliked), "both set from {state:?} on {reaction:?}");
                }
            }
        }
    }
}
