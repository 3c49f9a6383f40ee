use crate::types::Type;
use std::fmt;

/// A decoded Bril program. Functions keep their declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub functions: Vec<Function>,
}

impl Program {
    pub fn new(functions: Vec<Function>) -> Self {
        Self { functions }
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub instrs: Vec<Code>,
}

impl Function {
    pub fn new(name: impl Into<String>, instrs: Vec<Code>) -> Self {
        Self {
            name: name.into(),
            instrs,
        }
    }
}

/// One entry of a function body: either a label starting a new block or an instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Code {
    Label { label: String },
    Instruction(Instruction),
}

impl Code {
    pub fn label(label: impl Into<String>) -> Self {
        Code::Label {
            label: label.into(),
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            Code::Label { label } => Some(label),
            Code::Instruction(_) => None,
        }
    }
}

impl From<Instruction> for Code {
    fn from(inst: Instruction) -> Self {
        Code::Instruction(inst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Bool(bool),
}

impl Literal {
    pub fn ty(&self) -> Type {
        match self {
            Literal::Int(_) => Type::Int,
            Literal::Bool(_) => Type::Bool,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(value) => write!(f, "{}", value),
            Literal::Bool(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Lt,
    Gt,
    And,
    Or,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 9] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Eq,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::And,
        BinaryOp::Or,
    ];

    pub fn from_name(name: &str) -> Option<BinaryOp> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Eq => "eq",
            BinaryOp::Lt => "lt",
            BinaryOp::Gt => "gt",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    /// Width both operands are read at.
    pub fn operand_type(self) -> Type {
        match self {
            BinaryOp::And | BinaryOp::Or => Type::Bool,
            _ => Type::Int,
        }
    }

    /// Natural width of the result, used when the destination is new.
    pub fn result_type(self) -> Type {
        match self {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => Type::Int,
            _ => Type::Bool,
        }
    }
}

/// A Bril instruction, decoded once at the input boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Const {
        dest: String,
        ty: Type,
        value: Literal,
    },
    Binary {
        op: BinaryOp,
        dest: String,
        lhs: String,
        rhs: String,
    },
    Not {
        dest: String,
        arg: String,
    },
    Id {
        dest: String,
        arg: String,
    },
    Jump {
        target: String,
    },
    Branch {
        cond: String,
        then_label: String,
        else_label: String,
    },
    Return,
    Print {
        arg: String,
    },
    Nop,
}

impl Instruction {
    pub fn opcode(&self) -> &'static str {
        match self {
            Instruction::Const { .. } => "const",
            Instruction::Binary { op, .. } => op.name(),
            Instruction::Not { .. } => "not",
            Instruction::Id { .. } => "id",
            Instruction::Jump { .. } => "jmp",
            Instruction::Branch { .. } => "br",
            Instruction::Return => "ret",
            Instruction::Print { .. } => "print",
            Instruction::Nop => "nop",
        }
    }

    pub fn dest(&self) -> Option<&str> {
        match self {
            Instruction::Const { dest, .. }
            | Instruction::Binary { dest, .. }
            | Instruction::Not { dest, .. }
            | Instruction::Id { dest, .. } => Some(dest),
            _ => None,
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Jump { .. } | Instruction::Branch { .. } | Instruction::Return
        )
    }

    /// Block names this instruction transfers control to.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Instruction::Jump { target } => vec![target],
            Instruction::Branch {
                then_label,
                else_label,
                ..
            } => vec![then_label, else_label],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Const { dest, ty, value } => {
                write!(f, "{}: {} = const {}", dest, ty, value)
            }
            Instruction::Binary { op, dest, lhs, rhs } => {
                write!(f, "{} = {} {} {}", dest, op.name(), lhs, rhs)
            }
            Instruction::Not { dest, arg } => write!(f, "{} = not {}", dest, arg),
            Instruction::Id { dest, arg } => write!(f, "{} = id {}", dest, arg),
            Instruction::Jump { target } => write!(f, "jmp .{}", target),
            Instruction::Branch {
                cond,
                then_label,
                else_label,
            } => write!(f, "br {} .{} .{}", cond, then_label, else_label),
            Instruction::Return => write!(f, "ret"),
            Instruction::Print { arg } => write!(f, "print {}", arg),
            Instruction::Nop => write!(f, "nop"),
        }
    }
}
