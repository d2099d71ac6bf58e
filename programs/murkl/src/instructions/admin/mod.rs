//! Admin instructions

pub mod pause;
pub mod unpause;
pub mod update_authority;

pub use pause::*;
pub use unpause::*;
pub use update_authority::*;
