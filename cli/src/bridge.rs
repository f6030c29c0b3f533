//! Bridge from protocol commands to registry operations.

use procveil_policy::{PolicyError, ProcessTable, Registry};
use procveil_protocol::ControlCommand;

/// Apply one parsed control command.
pub fn apply(
    registry: &Registry,
    table: &dyn ProcessTable,
    command: ControlCommand,
) -> Result<(), PolicyError> {
    match command {
        ControlCommand::Add(pid) => registry.add(pid),
        ControlCommand::Del(pid) => {
            registry.delete(pid);
            Ok(())
        }
        ControlCommand::AddWithParent(pid) => registry.add_with_parent(pid, table),
    }
}
