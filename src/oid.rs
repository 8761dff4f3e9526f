//! Object identifier type.
//!
//! AgentX compresses OIDs under `1.3.6.1` on the wire; in memory an [`Oid`]
//! always holds the fully expanded arc sequence, so ordering and prefix
//! tests never have to reason about the compressed form.

use std::str::FromStr;

use crate::error::{Error, OidErrorKind, Result};

/// Maximum number of sub-identifiers in an OID (RFC 2741 §5.1).
pub const MAX_OID_LEN: usize = 128;

/// The arcs implied by a non-zero wire prefix byte `p`: `1.3.6.1.<p>`.
pub(crate) const INTERNET_PREFIX: [u32; 4] = [1, 3, 6, 1];

/// An SNMP object identifier.
///
/// Comparison is lexicographic on the expanded arc sequence, which is the
/// ordering GETNEXT resolution depends on: `1.3.6.1.2` < `1.3.6.1.2.1` <
/// `1.3.6.1.3`.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid {
    arcs: Vec<u32>,
}

impl Oid {
    /// Create an OID from a slice of arcs.
    pub fn from_arcs(arcs: &[u32]) -> Self {
        Self {
            arcs: arcs.to_vec(),
        }
    }

    /// The empty (null) OID, used e.g. as the Open PDU id when the
    /// subagent does not identify itself.
    pub fn null() -> Self {
        Self::default()
    }

    /// The arcs of this OID.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// True if the OID has no arcs.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// True if this OID starts with `prefix`'s arc sequence.
    pub fn has_prefix(&self, prefix: &Oid) -> bool {
        self.arcs.len() >= prefix.arcs.len() && self.arcs[..prefix.arcs.len()] == prefix.arcs[..]
    }

    /// Append an arc, returning a new OID. Handy for building instance
    /// identifiers off a registered subtree.
    pub fn child(&self, arc: u32) -> Self {
        let mut arcs = Vec::with_capacity(self.arcs.len() + 1);
        arcs.extend_from_slice(&self.arcs);
        arcs.push(arc);
        Self { arcs }
    }

    /// Split into the wire form: a prefix byte (0 if uncompressed) and the
    /// arcs that follow it. Compression applies when the OID starts with
    /// `1.3.6.1.p` and `p` fits a non-zero byte.
    pub(crate) fn wire_parts(&self) -> (u8, &[u32]) {
        if self.arcs.len() >= 5
            && self.arcs[..4] == INTERNET_PREFIX
            && self.arcs[4] >= 1
            && self.arcs[4] <= 255
        {
            (self.arcs[4] as u8, &self.arcs[5..])
        } else {
            (0, &self.arcs)
        }
    }
}

impl FromStr for Oid {
    type Err = Error;

    /// Parse a dotted decimal OID, with or without a leading dot.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs = Vec::new();
        for part in trimmed.split('.') {
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }
        if arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid_with_input(
                OidErrorKind::TooManyArcs { count: arcs.len() },
                s,
            ));
        }
        Ok(Self { arcs })
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if first {
                write!(f, "{}", arc)?;
                first = false;
            } else {
                write!(f, ".{}", arc)?;
            }
        }
        Ok(())
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_arcs(arcs)
    }
}

/// Construct an [`Oid`] from literal arcs.
///
/// ```rust
/// use async_agentx::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),+ $(,)?) => {
        $crate::oid::Oid::from_arcs(&[$($arc),+])
    };
}
