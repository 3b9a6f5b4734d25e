//! A program listing: one row per instruction with its slot, its symbol, its text, and
//! the symbol it refers to.

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::bytecode::Instruction;

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

pub struct Listing<'a> {
  instructions: &'a [Instruction]
}

impl<'a> Listing<'a> {
  pub fn new(instructions: &'a [Instruction]) -> Listing<'a> {
    Listing{ instructions }
  }

  /**
    Pairs each instruction with the slot it starts at. Slots count encoded length, so the
    instruction after a wide load is two slots further on.
  */
  pub fn slots(&self) -> impl Iterator<Item = (usize, &'a Instruction)> + 'a {
    let instructions: &'a [Instruction] = self.instructions;
    instructions
        .iter()
        .scan(0usize, |slot, instruction| {
          let start = *slot;
          *slot += instruction.encoded_length();
          Some((start, instruction))
        })
  }

  /// Total slots taken by the program.
  pub fn len(&self) -> usize {
    self.instructions.iter().map(Instruction::encoded_length).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.instructions.is_empty()
  }

  fn make_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Slot", ub->"Symbol", ub->"Instruction", ub->"Reference"]);

    for (slot, instruction) in self.slots() {
      table.add_row(
        row![
          r->slot,
          l->instruction.symbol.as_deref().unwrap_or(""),
          l->instruction,
          l->instruction.reference.as_deref().unwrap_or("")
        ]
      );
    }
    table
  }
}

impl<'a> Display for Listing<'a> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.make_table())
  }
}
