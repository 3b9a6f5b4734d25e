/*!

  The instruction set is the kernel's extended BPF. Every instruction is one 64 bit slot
  (opcode, a register byte, a 16 bit offset, a 32 bit immediate) except the 64 bit immediate
  load, which spills its high word into a second slot. The components of an instruction are
  kept unencoded here:

    OpCode:     8 bits, decoded field by field by `opcode`
    Registers:  4 bits each, see `crate::register`
    Offset:    16 bits, signed
    Constant:  64 bits, signed

  The opcode byte is the only packed part. Its upper five bits mean different things for
  loads and stores than for arithmetic and jumps, so each field accessor first checks the
  class and answers with a sentinel when the field does not exist for it. Nothing in this
  module returns an error: any byte is an opcode, and any instruction can be printed.

  Symbolic references and symbols ride along on the instruction for a later linking pass
  and have no effect on the encoding.

*/

mod display;
mod instruction;
pub mod opcode;

pub use instruction::Instruction;
pub use opcode::{ALUOp, BranchOp, Class, Mode, OpCode, Size, Source};
