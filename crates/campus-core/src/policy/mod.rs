//! Room access policy
//!
//! The single place that decides what a user may do in a room. Evaluation is
//! a pure function over facts the caller has already resolved (room type,
//! creator, participant row) so that no check ever queries the relation it
//! gates - the membership lookup happens once, elsewhere, before evaluation.

mod room_policy;

pub use room_policy::AccessFacts;
