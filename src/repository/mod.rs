//! Repositories - the sole mutators of persisted entity state.
//!
//! The contract is split into small capability traits, the way callers use
//! them; [`Repository`] is anything that has all of them. Every mutation
//! returns the event describing it, built from the written state.

mod capabilities;
mod keyed;

pub use capabilities::{
    CreateOrUpdate, DeleteByKey, GetByKey, ListAll, RequestParse, Repository, Upserted,
};
pub use keyed::KeyedRepository;
