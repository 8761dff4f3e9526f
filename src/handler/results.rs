//! Result type for Set transaction phases.

/// Outcome of a TestSet or CommitSet phase.
///
/// The variants map to the SNMPv2 error status codes AgentX reuses in
/// Response PDUs (RFC 2741 §6.2.16, RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetResult {
    /// Operation succeeded.
    NoError,
    /// Unspecific failure.
    GenErr,
    /// Access denied for this request.
    NoAccess,
    /// Value has the wrong type for this OID.
    WrongType,
    /// Value has the wrong length for this OID.
    WrongLength,
    /// Value encoding is incorrect.
    WrongEncoding,
    /// Value is not semantically valid for this OID.
    WrongValue,
    /// Row creation is not supported here.
    NoCreation,
    /// Value is inconsistent with other values in the same transaction.
    InconsistentValue,
    /// A required resource is unavailable.
    ResourceUnavailable,
    /// Applying the change failed.
    CommitFailed,
    /// Rolling the change back failed.
    UndoFailed,
    /// Object is not writable.
    NotWritable,
    /// Row name is inconsistent with existing data.
    InconsistentName,
}

impl SetResult {
    /// Check if this result indicates success.
    pub fn is_ok(&self) -> bool {
        matches!(self, SetResult::NoError)
    }

    /// The Response error status code for this result.
    pub fn code(&self) -> u16 {
        match self {
            Self::NoError => 0,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
        }
    }
}

impl std::fmt::Display for SetResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_rfc_table() {
        assert_eq!(SetResult::NoError.code(), 0);
        assert_eq!(SetResult::GenErr.code(), 5);
        assert_eq!(SetResult::ResourceUnavailable.code(), 13);
        assert_eq!(SetResult::NotWritable.code(), 17);
        assert_eq!(SetResult::InconsistentName.code(), 18);
    }

    #[test]
    fn test_is_ok() {
        assert!(SetResult::NoError.is_ok());
        assert!(!SetResult::NotWritable.is_ok());
        assert!(!SetResult::WrongType.is_ok());
    }
}
