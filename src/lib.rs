/*!
  A symbolic model of extended BPF instructions.

  Programs are built as sequences of `Instruction` values whose opcodes are assembled from
  typed fields (class, addressing mode, size, source, operator) and whose jump and call
  targets may be left symbolic. Any instruction can be taken apart again field by field
  and printed as a line of diagnostic text. Turning the sequence into wire bytes and
  resolving the symbols is left to the consumer.

  Setting the `trace_decoding` feature prints a line to stderr whenever a field is asked of
  an opcode that does not have it, or a setter refuses a field.
*/

#[macro_use] extern crate lazy_static;
#[macro_use] extern crate prettytable;

pub mod bytecode;
pub mod func;
pub mod listing;
pub mod register;

pub use bytecode::{ALUOp, BranchOp, Class, Instruction, Mode, OpCode, Size, Source};
pub use func::{Func, FuncId};
pub use listing::Listing;
pub use register::Register;
