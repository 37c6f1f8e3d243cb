use crate::error::CompileError;
use crate::host::{BlockFactory, VariableStore};
use crate::types::{BlockId, Literal, VarKind, VariableId};
use std::collections::HashMap;
use tracing::debug;

/// Name -> block table for one compile session. Node names and option
/// labels share this namespace.
#[derive(Debug, Default)]
pub struct BlockRegistry {
    blocks: HashMap<String, BlockId>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<BlockId> {
        self.blocks.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns the block registered under `name`, asking the host for a new
    /// empty one the first time the name is seen.
    pub fn get_or_create<H: BlockFactory + ?Sized>(&mut self, host: &mut H, name: &str) -> BlockId {
        if let Some(id) = self.get(name) {
            return id;
        }
        let id = host.create_block(name);
        debug!(block = name, "created block");
        self.blocks.insert(name.to_string(), id);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableEntry {
    pub id: VariableId,
    pub kind: VarKind,
}

/// Typed variable table. The first reference fixes a variable's kind.
#[derive(Debug, Default)]
pub struct VariableRegistry {
    vars: HashMap<String, VariableEntry>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<VariableEntry> {
        self.vars.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Looks up `name`, creating it with `kind` and the kind's zero value
    /// when absent. An existing variable keeps its original kind.
    pub fn resolve_or_create<H: VariableStore + ?Sized>(
        &mut self,
        host: &mut H,
        name: &str,
        kind: VarKind,
    ) -> VariableEntry {
        if let Some(entry) = self.get(name) {
            return entry;
        }
        let id = host.create_variable(name, kind);
        host.set_value(id, Literal::default_for(kind));
        debug!(variable = name, %kind, "created variable");
        let entry = VariableEntry { id, kind };
        self.vars.insert(name.to_string(), entry);
        entry
    }

    /// Resolves `name` for use with `literal`, returning the literal to
    /// store. A kind that disagrees with an existing variable is either
    /// coerced or rejected; the variable is never re-typed. Nothing is
    /// created when this fails.
    pub fn bind<H: VariableStore + ?Sized>(
        &mut self,
        host: &mut H,
        name: &str,
        literal: Literal,
        coerce: bool,
    ) -> Result<(VariableEntry, Literal), CompileError> {
        let literal = conform(name, self.get(name).map(|e| e.kind), literal, coerce)?;
        let entry = self.resolve_or_create(host, name, literal.kind());
        Ok((entry, literal))
    }
}

/// Checks `literal` against the kind `name` is declared with (if any),
/// coercing when allowed. Touches no registry or host state.
pub fn conform(
    name: &str,
    declared: Option<VarKind>,
    literal: Literal,
    coerce: bool,
) -> Result<Literal, CompileError> {
    let Some(declared) = declared else {
        return Ok(literal);
    };
    if declared == literal.kind() {
        return Ok(literal);
    }

    let converted = if coerce { literal.coerce(declared) } else { None };
    converted.ok_or_else(|| CompileError::KindMismatch {
        name: name.to_string(),
        declared,
        found: literal.kind(),
    })
}
