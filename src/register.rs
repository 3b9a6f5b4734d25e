//! The eleven registers an instruction can name. `RFP` is the read-only frame pointer; the
//! rest are general purpose.

use strum_macros::{Display as StrumDisplay, EnumIter};
use num_enum::{TryFromPrimitive, IntoPrimitive};

#[derive(
  StrumDisplay, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,     Eq,               PartialEq,     Debug, Hash
)]
#[repr(u8)]
pub enum Register {
  /// Return value of calls and of the program
  #[strum(serialize = "r0")]  R0 = 0,
  // Arguments to calls //
  #[strum(serialize = "r1")]  R1,
  #[strum(serialize = "r2")]  R2,
  #[strum(serialize = "r3")]  R3,
  #[strum(serialize = "r4")]  R4,
  #[strum(serialize = "r5")]  R5,
  // Callee saved //
  #[strum(serialize = "r6")]  R6,
  #[strum(serialize = "r7")]  R7,
  #[strum(serialize = "r8")]  R8,
  #[strum(serialize = "r9")]  R9,
  /// Frame pointer
  #[strum(serialize = "rfp")] RFP,
}

impl Register {
  /// A call whose source register is `FIRST_ARG` targets another function of the same
  /// program rather than a helper.
  pub const FIRST_ARG: Register = Register::R1;

  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }
}

impl Default for Register {
  fn default() -> Register {
    Register::R0
  }
}
