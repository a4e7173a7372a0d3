//! Access policy engine for STASH.
//!
//! Pure decision logic: given an actor, a file record, and an operation,
//! produce ALLOW or DENY. No state, no side effects; every decision is
//! explainable from its three inputs alone.

use crate::catalog::{FileRecord, Visibility};

/// The identity performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// No verified identity.
    Anonymous,
    /// A verified username.
    User(String),
}

impl Actor {
    /// Construct an actor from an optional username.
    pub fn from_username(username: Option<&str>) -> Self {
        match username {
            Some(name) => Actor::User(name.to_string()),
            None => Actor::Anonymous,
        }
    }

    /// The username, if authenticated.
    pub fn username(&self) -> Option<&str> {
        match self {
            Actor::Anonymous => None,
            Actor::User(name) => Some(name),
        }
    }
}

/// An operation on a file, for policy purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Read the file's bytes or metadata.
    Read,
    /// Destroy the file (record and blob).
    Delete,
    /// Grant read access to a third party.
    Share,
    /// Flip the file between public and private.
    ToggleVisibility,
}

/// A policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The operation may proceed.
    Allow,
    /// The operation is denied.
    Deny,
}

impl Decision {
    /// True if the decision is Allow.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decide whether `actor` may perform `operation` on the file described by
/// `record`.
///
/// - `Read`: public files are readable by anyone; private files only by the
///   owner and explicitly shared users.
/// - `Delete`, `Share`, `ToggleVisibility`: owner only, never anonymous.
pub fn decide(actor: &Actor, record: &FileRecord, operation: FileOperation) -> Decision {
    match operation {
        FileOperation::Read => {
            if record.visibility == Visibility::Public {
                return Decision::Allow;
            }
            match actor.username() {
                Some(name) if name == record.owner => Decision::Allow,
                Some(name) if record.shared_with.iter().any(|g| g == name) => Decision::Allow,
                _ => Decision::Deny,
            }
        }
        FileOperation::Delete | FileOperation::Share | FileOperation::ToggleVisibility => {
            match actor.username() {
                Some(name) if name == record.owner => Decision::Allow,
                _ => Decision::Deny,
            }
        }
    }
}
