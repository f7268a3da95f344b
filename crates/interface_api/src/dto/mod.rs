//! Request DTOs
//!
//! Responses serialize the domain aggregates directly; the incoming side
//! gets its own types so payload validation happens before anything
//! reaches a state machine.

pub mod invoices;
pub mod settlement;

use serde::Deserialize;

use core_kernel::{Actor, ActorRole};

/// The principal a caller acts as
///
/// Authentication middleware is the web shell's concern, not this
/// engine's; callers pass the already-resolved identity along.
#[derive(Debug, Clone, Deserialize)]
pub struct ActorDto {
    pub id: String,
    pub name: String,
    pub role: ActorRole,
}

impl From<ActorDto> for Actor {
    fn from(dto: ActorDto) -> Self {
        Actor::new(dto.id, dto.name, dto.role)
    }
}

/// Resolves an optional actor to the engine identity
pub fn actor_or_system(actor: Option<ActorDto>) -> Actor {
    actor.map(Actor::from).unwrap_or_else(Actor::system)
}
