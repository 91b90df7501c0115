use thiserror::Error;

/// Error surface for the mesh's public API.
///
/// `NotBootstrapped` is deliberately absent: per the mesh lifecycle, queries
/// on an empty mesh return empty/`None` results rather than failing, and
/// vertices offered before bootstrap succeeds are queued for retry instead
/// of rejected. `NumericDegeneracy` is also absent as a `Result` variant —
/// it is a non-fatal diagnostic recorded on the mesh (see
/// `Mesh::degeneracy_count`), never an abort.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TinError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    #[error("refinement did not converge after {iterations} iterations")]
    NotConverged { iterations: u32 },
}

pub type TinResult<T> = Result<T, TinError>;
