//! Control protocol between the procveil front end and the hidden-pid registry.
//!
//! The wire format is the plain-text command language of the control channel:
//! a write carries one command (`add <pid>`, `del <pid>`, `addwp <pid>`), and a
//! read returns the current roster as `pid: <decimal>` lines, once per open
//! session.

pub mod command;
pub mod render;
pub mod session;

pub use command::{parse_command, ControlCommand, ProtocolError};
pub use render::render_roster;
pub use session::RosterSession;

/// Process identifier as carried by the control protocol.
pub type Pid = i32;
