/*!
  The opcode byte and its fields.

  Every opcode carries its class in the low three bits. The remaining five bits are read
  one of two ways depending on the class:

  ```text
      load / store                 ALU / branch
      msb          lsb             msb          lsb
      +----+---+-----+             +------+-+-----+
      |mode|sz | cls |             |  op  |s| cls |
      +----+---+-----+             +------+-+-----+
       7..5 4..3 2..0               7..4  3  2..0
  ```

  A field accessor asked about an opcode of the other family answers with that field's
  `Invalid` variant instead of a misread value. Every field enum is `#[repr(u8)]` and its
  discriminant is the field's bits in place, so a class and its family's fields OR back
  together into the original byte.
*/

use std::convert::TryFrom;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::IntoStaticStr;

/// Raw value of every `Invalid` field variant, and of `OpCode::INVALID`.
pub const INVALID_BITS: u8 = 0xff;

pub const CLASS_MASK : OpCode = OpCode(0x07);
pub const SIZE_MASK  : OpCode = OpCode(0x18);
pub const MODE_MASK  : OpCode = OpCode(0xe0);
pub const SOURCE_MASK: OpCode = OpCode(0x08);
pub const ALU_MASK   : OpCode = OpCode(0xf0);
pub const BRANCH_MASK: OpCode = ALU_MASK;

/// Which of the two bit layouts a class uses for the upper five bits.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub(crate) enum Encoding {
  LoadOrStore,
  BranchOrAlu,
}

/// Class of operation, bits `2..0`.
#[derive(
  TryFromPrimitive, IntoPrimitive,
  Clone,            Copy,          Eq, PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum Class {
  /// Load from an immediate, the packet, or memory into a register
  Ld    = 0x00,
  /// Load from memory through a register
  LdX   = 0x01,
  /// Store an immediate
  St    = 0x02,
  /// Store a register
  StX   = 0x03,
  /// 32 bit arithmetic
  ALU   = 0x04,
  Jmp   = 0x05,
  Ret   = 0x06,
  /// 64 bit arithmetic. Shares its value with the classic `misc` class.
  ALU64 = 0x07,
}

impl Class {
  /// The classic BPF name for class `0x07`.
  pub const MISC: Class = Class::ALU64;

  pub(crate) fn encoding(self) -> Encoding {
    match self {
      Class::Ld | Class::LdX | Class::St | Class::StX => Encoding::LoadOrStore,
      Class::ALU | Class::ALU64 | Class::Jmp | Class::Ret => Encoding::BranchOrAlu,
    }
  }

  pub fn is_load_or_store(self) -> bool {
    self.encoding() == Encoding::LoadOrStore
  }

  pub fn is_branch_or_alu(self) -> bool {
    self.encoding() == Encoding::BranchOrAlu
  }

  pub fn raw(self) -> u8 {
    self.into()
  }
}

/// Width of a load or store, bits `4..3`.
#[derive(
  IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,         Copy,             Eq, PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum Size {
  /// 32 bits
  W       = 0x00,
  /// 16 bits
  H       = 0x08,
  /// 8 bits
  B       = 0x10,
  /// 64 bits
  DW      = 0x18,
  Invalid = 0xff,
}

impl Size {
  pub fn raw(self) -> u8 {
    self.into()
  }
}

/// Addressing mode of a load or store, bits `7..5`.
#[derive(
  IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,         Copy,             Eq, PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum Mode {
  /// The operand is the immediate itself. With `Size::DW` this is a wide load.
  Imm       = 0x00,
  /// Packet data at a constant offset
  Abs       = 0x20,
  /// Packet data at a register plus a constant
  Ind       = 0x40,
  /// Memory at a register plus the instruction offset
  Mem       = 0x60,
  /// Legacy packet length load
  Len       = 0x80,
  /// Legacy IP header length load
  Msh       = 0xa0,
  /// Atomic add to memory
  XAdd      = 0xc0,
  /// The one mode bit pattern with no assigned meaning.
  Undefined = 0xe0,
  Invalid   = 0xff,
}

impl Mode {
  pub fn raw(self) -> u8 {
    self.into()
  }
}

/// Where the second operand of an ALU or branch operation comes from, bit `3`.
#[derive(
  IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,         Copy,             Eq, PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum Source {
  /// The instruction's constant
  Imm     = 0x00,
  /// The instruction's source register
  Reg     = 0x08,
  Invalid = 0xff,
}

impl Source {
  /// Byte order conversion to little endian, for `ALUOp::End`.
  ///
  /// This has the same bits as `BIG_ENDIAN`, so a decoded `End` opcode cannot tell the two
  /// apart. The ISA tables this crate reproduces define them that way.
  pub const LITTLE_ENDIAN: Source = Source::Imm;
  /// Byte order conversion to big endian, for `ALUOp::End`. See `LITTLE_ENDIAN`.
  pub const BIG_ENDIAN: Source = Source::Imm;

  pub fn raw(self) -> u8 {
    self.into()
  }
}

/// Arithmetic operation of the `ALU` and `ALU64` classes, bits `7..4`.
#[derive(
  IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,         Copy,             Eq, PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum ALUOp {
  Add       = 0x00,
  Sub       = 0x10,
  Mul       = 0x20,
  Div       = 0x30,
  Or        = 0x40,
  And       = 0x50,
  LSh       = 0x60,
  RSh       = 0x70,
  Neg       = 0x80,
  Mod       = 0x90,
  XOr       = 0xa0,
  Mov       = 0xb0,
  /// Sign extending right shift
  ArSh      = 0xc0,
  /// Byte order conversion. The constant holds the width in bits.
  End       = 0xd0,
  ReservedE = 0xe0,
  ReservedF = 0xf0,
  Invalid   = 0xff,
}

impl ALUOp {
  pub fn raw(self) -> u8 {
    self.into()
  }
}

/// Control flow operation of the `Jmp` and `Ret` classes, bits `7..4`.
#[derive(
  IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,         Copy,             Eq, PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum BranchOp {
  /// Unconditional
  Ja        = 0x00,
  JEq       = 0x10,
  JGT       = 0x20,
  JGE       = 0x30,
  /// Jump if `dst & operand` is non zero
  JSET      = 0x40,
  JNE       = 0x50,
  JSGT      = 0x60,
  JSGE      = 0x70,
  /// Call a helper, or another function of the same program when the source register
  /// is `Register::FIRST_ARG`.
  Call      = 0x80,
  Exit      = 0x90,
  ReservedA = 0xa0,
  ReservedB = 0xb0,
  ReservedC = 0xc0,
  ReservedD = 0xd0,
  ReservedE = 0xe0,
  ReservedF = 0xf0,
  Invalid   = 0xff,
}

impl BranchOp {
  pub fn raw(self) -> u8 {
    self.into()
  }
}

/**
  A packed opcode byte. Its fields are decoded on demand, so any byte is a legal `OpCode`
  and no accessor can fail. Use `covered_by` to check a constructed byte against a mask.
*/
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Default)]
pub struct OpCode(pub u8);

impl OpCode {
  /// Returned by the `with_*` setters when a field does not belong to the opcode's class.
  pub const INVALID: OpCode = OpCode(INVALID_BITS);

  pub fn raw(self) -> u8 {
    self.0
  }

  pub fn class(self) -> Class {
    match self.0 & CLASS_MASK.0 {
      0x00 => Class::Ld,
      0x01 => Class::LdX,
      0x02 => Class::St,
      0x03 => Class::StX,
      0x04 => Class::ALU,
      0x05 => Class::Jmp,
      0x06 => Class::Ret,
      _    => Class::ALU64,
    }
  }

  pub fn mode(self) -> Mode {
    if !self.has_encoding(Encoding::LoadOrStore, "mode") {
      return Mode::Invalid;
    }
    Mode::try_from(self.0 & MODE_MASK.0).unwrap_or(Mode::Invalid)
  }

  pub fn size(self) -> Size {
    if !self.has_encoding(Encoding::LoadOrStore, "size") {
      return Size::Invalid;
    }
    Size::try_from(self.0 & SIZE_MASK.0).unwrap_or(Size::Invalid)
  }

  pub fn source(self) -> Source {
    if !self.has_encoding(Encoding::BranchOrAlu, "source") {
      return Source::Invalid;
    }
    Source::try_from(self.0 & SOURCE_MASK.0).unwrap_or(Source::Invalid)
  }

  pub fn alu_op(self) -> ALUOp {
    if !self.has_encoding(Encoding::BranchOrAlu, "ALU op") {
      return ALUOp::Invalid;
    }
    ALUOp::try_from(self.0 & ALU_MASK.0).unwrap_or(ALUOp::Invalid)
  }

  pub fn branch_op(self) -> BranchOp {
    if !self.has_encoding(Encoding::BranchOrAlu, "branch op") {
      return BranchOp::Invalid;
    }
    BranchOp::try_from(self.0 & BRANCH_MASK.0).unwrap_or(BranchOp::Invalid)
  }

  /// True if every bit set in `self` is also set in `mask`.
  pub fn covered_by(self, mask: OpCode) -> bool {
    self.0 & !mask.0 == 0
  }

  // region Setters

  pub fn with_mode(self, mode: Mode) -> OpCode {
    self.with_field(Encoding::LoadOrStore, MODE_MASK, mode.raw())
  }

  pub fn with_size(self, size: Size) -> OpCode {
    self.with_field(Encoding::LoadOrStore, SIZE_MASK, size.raw())
  }

  pub fn with_source(self, source: Source) -> OpCode {
    self.with_field(Encoding::BranchOrAlu, SOURCE_MASK, source.raw())
  }

  pub fn with_alu_op(self, op: ALUOp) -> OpCode {
    self.with_field(Encoding::BranchOrAlu, ALU_MASK, op.raw())
  }

  pub fn with_branch_op(self, op: BranchOp) -> OpCode {
    self.with_field(Encoding::BranchOrAlu, BRANCH_MASK, op.raw())
  }

  /**
    Replaces the bits under `mask` with `bits`. Gives `OpCode::INVALID` if `self` is already
    invalid, if its class does not use `encoding`, or if `bits` spill outside `mask`. The
    last check is what rejects an `Invalid` field, since `0xff` is wider than every mask.
  */
  fn with_field(self, encoding: Encoding, mask: OpCode, bits: u8) -> OpCode {
    if self == OpCode::INVALID
      || self.class().encoding() != encoding
      || !OpCode(bits).covered_by(mask)
    {
      #[cfg(feature = "trace_decoding")]
      eprintln!("rejected field {:#04x} (mask {:#04x}) for opcode {:#04x}", bits, mask.0, self.0);
      return OpCode::INVALID;
    }
    OpCode((self.0 & !mask.0) | bits)
  }

  // endregion

  fn has_encoding(self, encoding: Encoding, _field: &str) -> bool {
    let matches = self.class().encoding() == encoding;
    #[cfg(feature = "trace_decoding")]
    {
      if !matches {
        eprintln!("{} requested on {:?} opcode {:#04x}", _field, self.class(), self.0);
      }
    }
    matches
  }
}

impl From<u8> for OpCode {
  fn from(byte: u8) -> OpCode {
    OpCode(byte)
  }
}

impl From<OpCode> for u8 {
  fn from(op: OpCode) -> u8 {
    op.0
  }
}

impl From<Class> for OpCode {
  fn from(class: Class) -> OpCode {
    OpCode(class.raw())
  }
}
