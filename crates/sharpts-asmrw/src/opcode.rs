//! Byte-level opcode table for the fixed instruction set, spec.md §6.
//!
//! This mirrors `sharpts-emit::ir::Instruction` conceptually but is the
//! on-disk encoding the rewriter patches directly — one opcode byte,
//! followed by an operand whose shape depends on the opcode. Every
//! token-bearing opcode carries its operand as a 4-byte little-endian
//! metadata token; `Switch` is the one variable-length exception, a 4-byte
//! target count followed by that many 4-byte branch offsets.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    None,
    I4,
    I8,
    /// A metadata token, patched by the rewriter.
    Token,
    /// Label/offset operand: rewritten only if code moves, never remapped
    /// against metadata.
    BranchTarget,
    /// `Switch`'s length-prefixed branch target table.
    SwitchTable,
}

macro_rules! opcodes {
    ($($byte:literal => $name:ident : $shape:expr),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Opcode {
            $($name),+
        }

        impl Opcode {
            pub fn from_byte(b: u8) -> Option<Self> {
                match b {
                    $($byte => Some(Self::$name),)+
                    _ => None,
                }
            }

            pub fn byte(self) -> u8 {
                match self {
                    $(Self::$name => $byte),+
                }
            }

            pub fn operand_shape(self) -> OperandShape {
                match self {
                    $(Self::$name => $shape),+
                }
            }
        }
    };
}

opcodes! {
    0x00 => Nop: OperandShape::None,
    0x01 => Dup: OperandShape::None,
    0x02 => Pop: OperandShape::None,
    0x03 => LdcI4: OperandShape::I4,
    0x04 => LdcR8: OperandShape::I8,
    0x05 => LdStr: OperandShape::Token,
    0x06 => LdNull: OperandShape::None,
    0x07 => Add: OperandShape::None,
    0x08 => Sub: OperandShape::None,
    0x09 => Mul: OperandShape::None,
    0x0A => Div: OperandShape::None,
    0x0B => Rem: OperandShape::None,
    0x0C => Neg: OperandShape::None,
    0x0D => Ceq: OperandShape::None,
    0x0E => Cgt: OperandShape::None,
    0x0F => Clt: OperandShape::None,
    0x10 => BrTrue: OperandShape::BranchTarget,
    0x11 => BrFalse: OperandShape::BranchTarget,
    0x12 => Br: OperandShape::BranchTarget,
    0x13 => Ret: OperandShape::None,
    0x14 => Throw: OperandShape::None,
    0x15 => Rethrow: OperandShape::None,
    0x16 => Leave: OperandShape::BranchTarget,
    0x17 => EndFinally: OperandShape::None,
    0x18 => Switch: OperandShape::SwitchTable,
    0x19 => LdLoc: OperandShape::I4,
    0x1A => StLoc: OperandShape::I4,
    0x1B => LdArg: OperandShape::I4,
    0x1C => StArg: OperandShape::I4,
    0x1D => LdLocA: OperandShape::I4,
    0x1E => Call: OperandShape::Token,
    0x1F => CallVirt: OperandShape::Token,
    0x20 => NewObj: OperandShape::Token,
    0x21 => LdFtn: OperandShape::Token,
    0x22 => LdVirtFtn: OperandShape::Token,
    0x23 => CallI: OperandShape::Token,
    0x24 => Jmp: OperandShape::Token,
    0x25 => LdFld: OperandShape::Token,
    0x26 => StFld: OperandShape::Token,
    0x27 => LdFldA: OperandShape::Token,
    0x28 => LdSFld: OperandShape::Token,
    0x29 => StSFld: OperandShape::Token,
    0x2A => LdSFldA: OperandShape::Token,
    0x2B => CastClass: OperandShape::Token,
    0x2C => IsInst: OperandShape::Token,
    0x2D => NewArr: OperandShape::Token,
    0x2E => Box: OperandShape::Token,
    0x2F => Unbox: OperandShape::Token,
    0x30 => UnboxAny: OperandShape::Token,
    0x31 => InitObj: OperandShape::Token,
    0x32 => LdObj: OperandShape::Token,
    0x33 => StObj: OperandShape::Token,
    0x34 => CpObj: OperandShape::Token,
    0x35 => SizeOf: OperandShape::Token,
    0x36 => MkRefAny: OperandShape::Token,
    0x37 => RefAnyVal: OperandShape::Token,
    0x38 => LdElemA: OperandShape::Token,
    0x39 => Constrained: OperandShape::Token,
    0x3A => LdToken: OperandShape::Token,
    0x3B => CallRuntime: OperandShape::Token,
    0x3C => BoxDouble: OperandShape::None,
    0x3D => BoxBool: OperandShape::None,
    0x3E => UnboxDouble: OperandShape::None,
    0x3F => UnboxBool: OperandShape::None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_token_opcode_round_trips_through_its_byte() {
        for b in 0x00u8..=0x3F {
            if let Some(op) = Opcode::from_byte(b) {
                assert_eq!(op.byte(), b);
            }
        }
    }

    #[test]
    fn call_carries_a_token_operand() {
        assert_eq!(Opcode::Call.operand_shape(), OperandShape::Token);
    }

    #[test]
    fn switch_uses_the_length_prefixed_table_shape() {
        assert_eq!(Opcode::Switch.operand_shape(), OperandShape::SwitchTable);
    }

    #[test]
    fn unassigned_byte_is_not_an_opcode() {
        assert!(Opcode::from_byte(0xFF).is_none());
    }
}
