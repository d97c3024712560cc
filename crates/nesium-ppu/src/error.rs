use thiserror::Error;

use crate::variant::ChipVariant;

/// Errors raised at the edges of the core (construction and save states).
///
/// Emulation itself never fails: malformed register traffic or data is
/// wrapped into range and logged instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Raw variant id does not name a known 2C0x revision.
    #[error("unsupported 2C0x variant id: {0}")]
    UnsupportedVariant(u8),

    /// A snapshot taken from one revision was loaded into another.
    #[error("save state was taken on {found}, this chip is {expected}")]
    VariantMismatch {
        expected: ChipVariant,
        found: ChipVariant,
    },

    /// A snapshot is internally inconsistent.
    #[error("corrupt save state: {0}")]
    CorruptState(&'static str),

    /// A snapshot could not be encoded or decoded.
    #[cfg(feature = "savestate-postcard")]
    #[error("save state codec error: {0}")]
    Savestate(#[from] postcard::Error),
}
