/// Prevents the format traits from being implemented outside of this crate
/// ([`C-SEALED`]).
///
/// [`C-SEALED`]: <https://rust-lang.github.io/api-guidelines/future-proofing.html>
pub trait Sealed {}
