use {
    crate::{AssemblerError, Statement},
    log::debug,
    std::collections::HashSet,
};

/// Fail if two statements share a non-empty sid. Unnamed statements may repeat freely.
pub(crate) fn check_duplicate_sids(statements: &[Statement]) -> Result<(), AssemblerError> {
    let mut seen = HashSet::with_capacity(statements.len());

    for statement in statements.iter().filter(|s| s.has_sid()) {
        if !seen.insert(statement.sid()) {
            debug!("Duplicate sid {:?} in assembled statements", statement.sid());
            return Err(AssemblerError::DuplicateSid(statement.sid().to_string()));
        }
    }

    Ok(())
}
