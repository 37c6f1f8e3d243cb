use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct BlockId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct CommandId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct VariableId(pub u32);

macro_rules! impl_index {
    ($($ty:ident),*) => {$(
        impl $ty {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    )*};
}

impl_index!(BlockId, CommandId, VariableId);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    String,
    Number,
    Bool,
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VarKind::String => "string",
            VarKind::Number => "number",
            VarKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Literal {
    String(String),
    Number(f64),
    Bool(bool),
}

impl Literal {
    pub fn kind(&self) -> VarKind {
        match self {
            Literal::String(_) => VarKind::String,
            Literal::Number(_) => VarKind::Number,
            Literal::Bool(_) => VarKind::Bool,
        }
    }

    pub fn default_for(kind: VarKind) -> Self {
        match kind {
            VarKind::String => Literal::String(String::new()),
            VarKind::Number => Literal::Number(0.0),
            VarKind::Bool => Literal::Bool(false),
        }
    }

    /// Converts to `kind`, or `None` when the value has no sensible
    /// representation there (e.g. `"abc"` as a number).
    pub fn coerce(&self, kind: VarKind) -> Option<Literal> {
        match (self, kind) {
            (lit, k) if lit.kind() == k => Some(lit.clone()),
            (Literal::Number(n), VarKind::String) => Some(Literal::String(n.to_string())),
            (Literal::Bool(b), VarKind::String) => Some(Literal::String(b.to_string())),
            (Literal::String(s), VarKind::Number) => s.trim().parse().ok().map(Literal::Number),
            (Literal::Bool(b), VarKind::Number) => Some(Literal::Number(if *b { 1.0 } else { 0.0 })),
            (Literal::String(s), VarKind::Bool) => s.trim().parse().ok().map(Literal::Bool),
            (Literal::Number(n), VarKind::Bool) => Some(Literal::Bool(*n != 0.0)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum SetOperator {
    Assign,
    Add,
    Subtract,
    Divide,
    Multiply,
}

impl SetOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "EqualToOrAssign" => Some(SetOperator::Assign),
            "AddAssign" => Some(SetOperator::Add),
            "MinusAssign" => Some(SetOperator::Subtract),
            "DivideAssign" => Some(SetOperator::Divide),
            "MultiplyAssign" => Some(SetOperator::Multiply),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum CompareOperator {
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,
    Equals,
    NotEquals,
}

impl CompareOperator {
    pub fn from_function(name: &str) -> Option<Self> {
        match name {
            "LessThan" => Some(CompareOperator::LessThan),
            "LessThanOrEqualTo" => Some(CompareOperator::LessThanOrEquals),
            "GreaterThan" => Some(CompareOperator::GreaterThan),
            "GreaterThanOrEqualTo" => Some(CompareOperator::GreaterThanOrEquals),
            "EqualTo" => Some(CompareOperator::Equals),
            "NotEqualTo" => Some(CompareOperator::NotEquals),
            _ => None,
        }
    }
}

/// Typed comparison attached to `If`/`ElseIf`. The literal always has the
/// variable's kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Condition {
    pub operator: CompareOperator,
    pub variable: VariableId,
    pub value: Literal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Command {
    Say {
        text: String,
    },
    Menu {
        text: String,
        target: BlockId,
    },
    Call {
        target: BlockId,
    },
    SetVariable {
        operator: SetOperator,
        variable: VariableId,
        value: Literal,
    },
    If(Condition),
    ElseIf(Condition),
    Else,
    End,
    Wait {
        seconds: u32,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Block {
    pub name: String,
    pub commands: Vec<CommandId>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum VariableScope {
    Public,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Variable {
    pub key: String,
    pub kind: VarKind,
    pub scope: VariableScope,
    pub value: Literal,
}

#[derive(Debug, Serialize, Clone)]
pub struct FlowchartOutput {
    pub name: String,
    pub blocks: Vec<BlockOutput>,
    pub variables: Vec<Variable>,
}

/// A block with its commands inlined; `target`/`variable` ids index into
/// the sibling `blocks`/`variables` arrays.
#[derive(Debug, Serialize, Clone)]
pub struct BlockOutput {
    pub name: String,
    pub commands: Vec<Command>,
}
