//! Seeded role assignment for a fresh roster.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::roles::Role;
use crate::errors::domain::{DomainError, ValidationKind};

/// Deterministic role map for a roster of `count` participants: one
/// werewolf per four participants (at least one), one seer, one bodyguard,
/// villagers for the rest, shuffled with a seeded generator so the same
/// seed always yields the same assignment.
pub fn assign_roles(count: usize, seed: u64) -> Result<Vec<Role>, DomainError> {
    if count < 4 {
        return Err(DomainError::validation(
            ValidationKind::Other("ROSTER_TOO_SMALL".into()),
            format!("a session needs at least 4 participants, got {count}"),
        ));
    }

    let werewolves = (count / 4).max(1);
    let mut roles = vec![Role::Werewolf; werewolves];
    roles.push(Role::Seer);
    roles.push(Role::Bodyguard);
    while roles.len() < count {
        roles.push(Role::Villager);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    roles.shuffle(&mut rng);
    Ok(roles)
}
