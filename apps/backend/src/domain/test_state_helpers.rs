use crate::domain::roles::{Participant, Role};
use crate::domain::state::{ParticipantId, Phase, SessionState};

pub struct MakeSessionArgs {
    pub phase: Phase,
    pub day: u8,
    pub round: u8,
}

impl Default for MakeSessionArgs {
    fn default() -> Self {
        Self {
            phase: Phase::DayDiscussion,
            day: 1,
            round: 1,
        }
    }
}

/// Session with the given roles, ids in roster order, everyone alive,
/// turn order equal to roster order.
pub fn make_session(roles: &[Role], args: MakeSessionArgs) -> SessionState {
    let participants = roles
        .iter()
        .enumerate()
        .map(|(id, role)| Participant {
            id: id as ParticipantId,
            name: format!("p{id}"),
            is_human: false,
            alive: true,
            role: *role,
            persona: None,
        })
        .collect();
    let mut state = SessionState::new(77, participants);
    state.turn_order = (0..roles.len() as ParticipantId).collect();
    state.phase = args.phase;
    state.day = args.day;
    state.round = args.round;
    state
}

/// Standard five-seat roster: werewolf at 0, seer at 1, bodyguard at 2,
/// villagers at 3 and 4.
pub fn five_seat_roles() -> Vec<Role> {
    vec![
        Role::Werewolf,
        Role::Seer,
        Role::Bodyguard,
        Role::Villager,
        Role::Villager,
    ]
}
