//! Parsing of control-channel write commands.

use thiserror::Error;

use crate::Pid;

/// One operation requested over the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Hide a pid.
    Add(Pid),
    /// Unhide a pid (idempotent).
    Del(Pid),
    /// Hide a pid and its parent.
    AddWithParent(Pid),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unknown operation: {0:?}")]
    UnknownOperation(String),

    #[error("invalid pid operand: {0:?}")]
    InvalidPid(String),
}

/// Parse one control command.
///
/// The command word and the decimal pid operand are separated by whitespace;
/// a trailing newline is tolerated. `addwp` must be matched before `add`
/// (shared prefix). Anything else is an [`ProtocolError::UnknownOperation`]
/// and must not reach the registry.
pub fn parse_command(input: &str) -> Result<ControlCommand, ProtocolError> {
    let line = input.trim_end_matches(['\n', '\r']);

    // Longest keyword first: "add" is a prefix of "addwp".
    let (op, rest): (fn(Pid) -> ControlCommand, &str) = if let Some(r) = line.strip_prefix("addwp")
    {
        (ControlCommand::AddWithParent, r)
    } else if let Some(r) = line.strip_prefix("add") {
        (ControlCommand::Add, r)
    } else if let Some(r) = line.strip_prefix("del") {
        (ControlCommand::Del, r)
    } else {
        return Err(ProtocolError::UnknownOperation(line.to_string()));
    };

    // The keyword must be followed by whitespace, not glued to the operand.
    if !rest.starts_with(|c: char| c.is_ascii_whitespace()) {
        return Err(ProtocolError::UnknownOperation(line.to_string()));
    }

    let operand = rest.trim();
    operand
        .parse::<Pid>()
        .map(op)
        .map_err(|_| ProtocolError::InvalidPid(operand.to_string()))
}
