//! Host object model the compiler writes into.
//!
//! The compiler never owns blocks, commands or variables. It asks the host
//! to allocate them and to place commands in order. `Flowchart` is the
//! in-memory host used by the bindings and tests; an engine integration
//! implements the same traits over its own objects.

use crate::types::{
    Block, BlockId, BlockOutput, Command, CommandId, FlowchartOutput, Literal, VarKind,
    Variable, VariableId, VariableScope,
};

pub trait BlockFactory {
    fn create_block(&mut self, name: &str) -> BlockId;
}

pub trait CommandSink {
    fn create_command(&mut self, command: Command) -> CommandId;
    fn append_command(&mut self, block: BlockId, command: CommandId);
}

pub trait VariableStore {
    fn create_variable(&mut self, name: &str, kind: VarKind) -> VariableId;
    fn set_value(&mut self, variable: VariableId, value: Literal);
}

pub trait Host: BlockFactory + CommandSink + VariableStore {}

impl<T: BlockFactory + CommandSink + VariableStore> Host for T {}

#[derive(Debug, Default, Clone)]
pub struct Flowchart {
    pub name: String,
    blocks: Vec<Block>,
    commands: Vec<Command>,
    variables: Vec<Variable>,
}

impl Flowchart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// First block with this name. Names are unique when every block was
    /// created through the compiler's registry.
    pub fn block_named(&self, name: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .position(|b| b.name == name)
            .map(|idx| BlockId(idx as u32))
    }

    pub fn command(&self, id: CommandId) -> Option<&Command> {
        self.commands.get(id.index())
    }

    pub fn commands_of(&self, id: BlockId) -> Vec<&Command> {
        self.block(id)
            .map(|b| b.commands.iter().filter_map(|c| self.command(*c)).collect())
            .unwrap_or_default()
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable_named(&self, key: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.key == key)
    }

    pub fn to_output(&self) -> FlowchartOutput {
        let blocks = self
            .blocks
            .iter()
            .map(|b| BlockOutput {
                name: b.name.clone(),
                commands: b
                    .commands
                    .iter()
                    .filter_map(|c| self.command(*c).cloned())
                    .collect(),
            })
            .collect();

        FlowchartOutput {
            name: self.name.clone(),
            blocks,
            variables: self.variables.clone(),
        }
    }
}

impl BlockFactory for Flowchart {
    fn create_block(&mut self, name: &str) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block {
            name: name.to_string(),
            commands: Vec::new(),
        });
        id
    }
}

impl CommandSink for Flowchart {
    fn create_command(&mut self, command: Command) -> CommandId {
        let id = CommandId(self.commands.len() as u32);
        self.commands.push(command);
        id
    }

    fn append_command(&mut self, block: BlockId, command: CommandId) {
        if let Some(b) = self.blocks.get_mut(block.index()) {
            b.commands.push(command);
        }
    }
}

impl VariableStore for Flowchart {
    fn create_variable(&mut self, name: &str, kind: VarKind) -> VariableId {
        let id = VariableId(self.variables.len() as u32);
        self.variables.push(Variable {
            key: name.to_string(),
            kind,
            scope: VariableScope::Public,
            value: Literal::default_for(kind),
        });
        id
    }

    fn set_value(&mut self, variable: VariableId, value: Literal) {
        if let Some(v) = self.variables.get_mut(variable.index()) {
            v.value = value;
        }
    }
}
