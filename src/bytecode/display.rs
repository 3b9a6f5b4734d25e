/*!
  Diagnostic text for instructions.

  An instruction prints as a mnemonic followed by the operand fragments its class, mode,
  and operator call for, always in the order `dst`, `src`, `off`, `imm`:

  ```text
    LdImmDW dst: r1 imm: 3
    StXW dst: rfp src: r0 off: -4 imm: 0
    AddImm dst: r2 imm: -4
    JEqImm dst: r0 off: 2 imm: 0
    Call map_lookup_elem
    Exit
  ```

  Whether a fragment appears depends only on the opcode, never on the operand's value. The
  text is for logs and test fixtures and is not meant to be parsed back.
*/

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::func::FuncId;
use crate::register::Register;
use super::instruction::Instruction;
use super::opcode::{ALUOp, BranchOp, Class, Mode, Source};

lazy_static! {
  // Only load and store mnemonics start with the class.
  static ref CLASS_LABELS: HashMap<Class, &'static str> = {
    let mut labels = HashMap::new();
    labels.insert(Class::Ld,    "Ld");
    labels.insert(Class::LdX,   "LdX");
    labels.insert(Class::St,    "St");
    labels.insert(Class::StX,   "StX");
    labels
  };
}

/// The pieces of an instruction's text. A `None` operand is left out.
#[derive(Default)]
struct Fragments {
  mnemonic: String,
  dst     : Option<Register>,
  src     : Option<Register>,
  offset  : Option<i16>,
  imm     : Option<i64>,
}

impl Display for Fragments {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.mnemonic)?;
    if let Some(dst) = self.dst {
      write!(f, " dst: {}", dst)?;
    }
    if let Some(src) = self.src {
      write!(f, " src: {}", src)?;
    }
    if let Some(offset) = self.offset {
      write!(f, " off: {}", offset)?;
    }
    if let Some(imm) = self.imm {
      write!(f, " imm: {}", imm)?;
    }
    Ok(())
  }
}

fn mode_label(mode: Mode) -> &'static str {
  match mode {
    Mode::Mem | Mode::Undefined | Mode::Invalid => "",
    other => other.into()
  }
}

fn alu_label(op: ALUOp) -> &'static str {
  match op {
    // Little and big endian conversions decode identically, so neither is named.
    ALUOp::End => "",
    ALUOp::ReservedE | ALUOp::ReservedF | ALUOp::Invalid => "",
    other => other.into()
  }
}

fn branch_label(op: BranchOp) -> &'static str {
  match op {
    BranchOp::ReservedA | BranchOp::ReservedB | BranchOp::ReservedC
    | BranchOp::ReservedD | BranchOp::ReservedE | BranchOp::ReservedF
    | BranchOp::Invalid => "",
    other => other.into()
  }
}

fn source_suffix(source: Source) -> &'static str {
  match source {
    Source::Imm     => "Imm",
    Source::Reg     => "Src",
    Source::Invalid => ""
  }
}

impl Instruction {
  fn load_store_fragments(&self) -> Fragments {
    let op    = self.opcode;
    let class = CLASS_LABELS.get(&op.class()).copied().unwrap_or_default();
    let mode  = op.mode();
    let mnemonic = format!("{}{}{}", class, mode_label(mode), <&str>::from(op.size()));

    let (dst, src, offset, imm) =
      match mode {
        Mode::Imm => (Some(self.dst), None,           None,              Some(self.constant)),
        Mode::Abs => (None,           None,           None,              Some(self.constant)),
        Mode::Ind => (Some(self.dst), Some(self.src), None,              Some(self.constant)),
        Mode::Mem => (Some(self.dst), Some(self.src), Some(self.offset), Some(self.constant)),
        // Only the final rendering of atomic add is kept, as `{class}XAdd{size}`.
        Mode::XAdd => (Some(self.dst), Some(self.src), None, None),
        Mode::Len | Mode::Msh | Mode::Undefined | Mode::Invalid => (None, None, None, None),
      };

    Fragments{ mnemonic, dst, src, offset, imm }
  }

  fn alu_fragments(&self) -> Fragments {
    let op = self.opcode;
    let alu_op = op.alu_op();

    if alu_op == ALUOp::End {
      // The constant is the conversion width. There is no second operand.
      return Fragments{
        mnemonic: source_suffix(op.source()).to_string(),
        dst     : Some(self.dst),
        imm     : Some(self.constant),
        ..Fragments::default()
      };
    }

    let width = match op.class() {
      Class::ALU => "32",
      _          => ""
    };
    let mut fragments = Fragments{
      mnemonic: format!("{}{}{}", alu_label(alu_op), width, source_suffix(op.source())),
      dst     : Some(self.dst),
      ..Fragments::default()
    };
    match op.source() {
      Source::Imm => fragments.imm = Some(self.constant),
      Source::Reg | Source::Invalid => fragments.src = Some(self.src),
    }
    fragments
  }

  fn branch_fragments(&self) -> Fragments {
    let op = self.opcode;

    match op.branch_op() {
      BranchOp::Call => {
        let mnemonic =
          if self.src == Register::FIRST_ARG {
            // Call to another function of this program
            format!("Call {}", self.constant)
          } else {
            format!("Call {}", FuncId(self.constant))
          };
        Fragments{ mnemonic, ..Fragments::default() }
      }

      BranchOp::Exit => Fragments{ mnemonic: "Exit".to_string(), ..Fragments::default() },

      branch_op => {
        let mut fragments = Fragments{
          mnemonic: format!("{}{}", branch_label(branch_op), source_suffix(op.source())),
          dst     : Some(self.dst),
          offset  : Some(self.offset),
          ..Fragments::default()
        };
        match op.source() {
          Source::Imm => fragments.imm = Some(self.constant),
          Source::Reg | Source::Invalid => fragments.src = Some(self.src),
        }
        fragments
      }
    }
  }

  fn fragments(&self) -> Fragments {
    match self.opcode.class() {
      Class::Ld | Class::LdX | Class::St | Class::StX => self.load_store_fragments(),
      Class::ALU | Class::ALU64 => self.alu_fragments(),
      Class::Jmp | Class::Ret => self.branch_fragments(),
    }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.fragments())
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::opcode::{OpCode, Size};

  fn load_store(class: Class, mode: Mode, size: Size) -> Instruction {
    Instruction::new(OpCode::from(class).with_mode(mode).with_size(size))
  }

  fn alu(class: Class, op: ALUOp, source: Source) -> Instruction {
    Instruction::new(OpCode::from(class).with_alu_op(op).with_source(source))
  }

  fn branch(op: BranchOp, source: Source) -> Instruction {
    Instruction::new(OpCode::from(Class::Jmp).with_branch_op(op).with_source(source))
  }

  /// Every field set to something that would show if printed.
  fn populate(ins: Instruction) -> Instruction {
    ins.with_dst(Register::R3)
       .with_src(Register::R4)
       .with_offset(-8)
       .with_constant(99)
  }

  #[test]
  fn add_immediate_64(){
    let ins = alu(Class::ALU64, ALUOp::Add, Source::Imm)
      .with_dst(Register::R0)
      .with_constant(5);
    assert_eq!(ins.to_string(), "AddImm dst: r0 imm: 5");
  }

  #[test]
  fn add_immediate_hides_source(){
    let ins = populate(alu(Class::ALU64, ALUOp::Add, Source::Imm));
    assert!(!ins.to_string().contains("src:"));
  }

  #[test]
  fn alu32_width_marker(){
    let ins = alu(Class::ALU, ALUOp::Mov, Source::Reg)
      .with_dst(Register::R2)
      .with_src(Register::RFP);
    assert_eq!(ins.to_string(), "Mov32Src dst: r2 src: rfp");
  }

  #[test]
  fn operator_labels(){
    let ins = alu(Class::ALU64, ALUOp::ArSh, Source::Imm).with_constant(3);
    assert_eq!(ins.to_string(), "ArShImm dst: r0 imm: 3");
    let ins = alu(Class::ALU64, ALUOp::XOr, Source::Reg);
    assert_eq!(ins.to_string(), "XOrSrc dst: r0 src: r0");
  }

  #[test]
  fn endian_conversion(){
    let ins = populate(alu(Class::ALU, ALUOp::End, Source::BIG_ENDIAN)).with_constant(16);
    assert_eq!(ins.to_string(), "Imm dst: r3 imm: 16");

    let ins = populate(alu(Class::ALU, ALUOp::End, Source::Reg)).with_constant(32);
    assert_eq!(ins.to_string(), "Src dst: r3 imm: 32");
  }

  #[test]
  fn bpf_to_bpf_call(){
    let ins = branch(BranchOp::Call, Source::Imm)
      .with_src(Register::FIRST_ARG)
      .with_constant(7);
    assert_eq!(ins.to_string(), "Call 7");
  }

  #[test]
  fn helper_call(){
    let ins = branch(BranchOp::Call, Source::Imm)
      .with_src(Register::R0)
      .with_constant(7);
    assert_eq!(ins.to_string(), "Call get_prandom_u32");

    let direct = ins.with_src(Register::R1);
    assert_ne!(ins.to_string(), direct.to_string());
  }

  #[test]
  fn helper_call_unknown_id(){
    let ins = branch(BranchOp::Call, Source::Imm).with_constant(1000);
    assert_eq!(ins.to_string(), "Call Func(1000)");
  }

  #[test]
  fn call_hides_fragments(){
    let ins = populate(branch(BranchOp::Call, Source::Reg)).with_constant(1);
    assert_eq!(ins.to_string(), "Call map_lookup_elem");
  }

  #[test]
  fn exit_hides_fragments(){
    let ins = populate(branch(BranchOp::Exit, Source::Imm));
    assert_eq!(ins.to_string(), "Exit");
    let ins = populate(branch(BranchOp::Exit, Source::Reg));
    assert_eq!(ins.to_string(), "Exit");
  }

  #[test]
  fn conditional_jumps(){
    let ins = branch(BranchOp::JEq, Source::Imm)
      .with_dst(Register::R0)
      .with_offset(2);
    assert_eq!(ins.to_string(), "JEqImm dst: r0 off: 2 imm: 0");

    let ins = branch(BranchOp::JSGT, Source::Reg)
      .with_dst(Register::R1)
      .with_src(Register::R2)
      .with_offset(-3);
    assert_eq!(ins.to_string(), "JSGTSrc dst: r1 src: r2 off: -3");
  }

  #[test]
  fn return_class_uses_branch_rules(){
    let ins = Instruction::new(OpCode::from(Class::Ret).with_branch_op(BranchOp::Exit));
    assert_eq!(ins.to_string(), "Exit");
    let ins = Instruction::new(OpCode::from(Class::Ret).with_branch_op(BranchOp::Ja));
    assert_eq!(ins.to_string(), "JaImm dst: r0 off: 0 imm: 0");
  }

  #[test]
  fn wide_immediate_load(){
    let ins = load_store(Class::Ld, Mode::Imm, Size::DW)
      .with_dst(Register::R1)
      .with_constant(3);
    assert_eq!(ins.to_string(), "LdImmDW dst: r1 imm: 3");
  }

  #[test]
  fn absolute_load_hides_dst_and_offset(){
    let ins = populate(load_store(Class::Ld, Mode::Abs, Size::B)).with_constant(23);
    assert_eq!(ins.to_string(), "LdAbsB imm: 23");
  }

  #[test]
  fn indirect_load(){
    let ins = populate(load_store(Class::Ld, Mode::Ind, Size::H));
    assert_eq!(ins.to_string(), "LdIndH dst: r3 src: r4 imm: 99");

    let ins = load_store(Class::Ld, Mode::Ind, Size::W)
      .with_dst(Register::R3)
      .with_src(Register::R4)
      .with_constant(14);
    assert_eq!(ins.to_string(), "LdIndW dst: r3 src: r4 imm: 14");
  }

  #[test]
  fn class_labels_cover_loads_and_stores(){
    for byte in 0..=255u8 {
      let class = OpCode(byte).class();
      assert_eq!(CLASS_LABELS.contains_key(&class), class.is_load_or_store());
    }
  }

  #[test]
  fn source_suffixes(){
    assert_eq!(source_suffix(Source::Imm), "Imm");
    assert_eq!(source_suffix(Source::Reg), "Src");
    assert_eq!(source_suffix(Source::Invalid), "");
  }

  #[test]
  fn memory_store(){
    let ins = load_store(Class::StX, Mode::Mem, Size::W)
      .with_dst(Register::RFP)
      .with_src(Register::R0)
      .with_offset(-4);
    assert_eq!(ins.to_string(), "StXW dst: rfp src: r0 off: -4 imm: 0");
  }

  #[test]
  fn legacy_packet_modes(){
    let ins = populate(load_store(Class::Ld, Mode::Len, Size::W));
    assert_eq!(ins.to_string(), "LdLenW");
    let ins = populate(load_store(Class::LdX, Mode::Msh, Size::B));
    assert_eq!(ins.to_string(), "LdXMshB");
  }

  #[test]
  fn atomic_add(){
    let ins = populate(load_store(Class::StX, Mode::XAdd, Size::DW));
    assert_eq!(ins.to_string(), "StXXAddDW dst: r3 src: r4");
  }

  #[test]
  fn zero_immediate_still_printed(){
    let ins = load_store(Class::St, Mode::Imm, Size::W);
    assert_eq!(ins.to_string(), "StImmW dst: r0 imm: 0");
  }

  #[test]
  fn metadata_not_printed(){
    let plain = branch(BranchOp::Ja, Source::Imm).with_offset(1);
    let tagged = plain.reference("out").symbol("here");
    assert_eq!(plain.to_string(), tagged.to_string());
  }

  #[test]
  fn deterministic(){
    for byte in 0..=255u8 {
      let ins = populate(Instruction::new(OpCode(byte)));
      assert_eq!(ins.to_string(), ins.to_string());
      assert!(!ins.to_string().contains('\n'));
    }
  }
}
