use string_cache::DefaultAtom;

use crate::register::Register;
use super::opcode::{Class, Mode, OpCode, Size};

/**
  Holds the unencoded components of a single instruction.

  `reference` and `symbol` never reach the encoded opcode or operands. A linker matches
  each `reference` against the `symbol` of another instruction of the same program and
  rewrites the offset or constant from the slot distance between the two. Names are
  interned, so clones are cheap.
*/
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct Instruction {
  pub opcode   : OpCode,
  pub dst      : Register,
  pub src      : Register,
  /// Memory displacement or jump distance, in slots for jumps.
  pub offset   : i16,
  /// Immediate. For a wide load, the low word here is the first slot's immediate and the
  /// high word goes into the immediate of the following slot.
  pub constant : i64,
  /// The symbol this jump or call targets before linking
  pub reference: Option<DefaultAtom>,
  /// The label of this instruction's own position
  pub symbol   : Option<DefaultAtom>,
}

impl Instruction {
  pub fn new(opcode: OpCode) -> Instruction {
    Instruction{ opcode, ..Instruction::default() }
  }

  // region Builders
  // Each builder leaves `self` untouched and returns the modified copy.

  pub fn with_dst(&self, dst: Register) -> Instruction {
    Instruction{ dst, ..self.clone() }
  }

  pub fn with_src(&self, src: Register) -> Instruction {
    Instruction{ src, ..self.clone() }
  }

  pub fn with_offset(&self, offset: i16) -> Instruction {
    Instruction{ offset, ..self.clone() }
  }

  pub fn with_constant(&self, constant: i64) -> Instruction {
    Instruction{ constant, ..self.clone() }
  }

  /// Makes this instruction refer to `symbol`.
  pub fn reference(&self, symbol: &str) -> Instruction {
    Instruction{ reference: Some(DefaultAtom::from(symbol)), ..self.clone() }
  }

  /// Labels this instruction's position as `name`.
  pub fn symbol(&self, name: &str) -> Instruction {
    Instruction{ symbol: Some(DefaultAtom::from(name)), ..self.clone() }
  }

  // endregion

  /// A 64 bit immediate load, which occupies two slots.
  pub fn is_wide_load(&self) -> bool {
    self.opcode.class() == Class::Ld
      && self.opcode.mode() == Mode::Imm
      && self.opcode.size() == Size::DW
  }

  /**
    The number of encoded slots the instruction takes. Offsets between instructions are
    measured in slots, so anything computing a jump distance must sum this over the
    instructions in between rather than count them.
  */
  pub fn encoded_length(&self) -> usize {
    match self.is_wide_load() {
      true  => 2,
      false => 1
    }
  }
}
