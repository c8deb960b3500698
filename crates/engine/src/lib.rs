//! Game driver built on the core engine.
//!
//! [`Session`] sequences spawning, movement, gravity, locking, scoring and
//! the row clear animation one frame at a time. Rendering, audio and input
//! mapping stay with the caller: it feeds [`Action`]s, calls
//! [`Session::tick`] once per frame and reads a [`SessionSnapshot`].

pub mod session;

pub use session::{Action, Phase, Session, SessionSnapshot};
