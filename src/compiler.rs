use crate::ast::{Document, Node, Statement, Value};
use crate::directive::{parse_directive, Directive};
use crate::error::{CompileError, Diagnostic};
use crate::host::Host;
use crate::registry::{BlockRegistry, VariableRegistry};
use crate::types::{BlockId, Command, CommandId, Literal, SetOperator};
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KindMismatch {
    /// Report a diagnostic and skip the statement.
    #[default]
    Reject,
    /// Convert the literal to the variable's existing kind when possible.
    Coerce,
}

#[derive(Clone, Debug)]
pub struct CompileOptions {
    pub entry_node: String,
    pub kind_mismatch: KindMismatch,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            entry_node: "Start".to_string(),
            kind_mismatch: KindMismatch::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompileReport {
    pub entry: BlockId,
    pub diagnostics: Vec<Diagnostic>,
}

/// One compile session over a host. Holds the block and variable
/// registries, so compiling through the same state never duplicates a
/// block or a variable.
pub struct CompilerState<'h, H: Host + ?Sized> {
    pub(crate) host: &'h mut H,
    pub(crate) options: CompileOptions,
    pub(crate) blocks: BlockRegistry,
    pub(crate) variables: VariableRegistry,
    compiled: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
    current_node: String,
}

impl<'h, H: Host + ?Sized> CompilerState<'h, H> {
    pub fn new(host: &'h mut H) -> Self {
        Self::with_options(host, CompileOptions::default())
    }

    pub fn with_options(host: &'h mut H, options: CompileOptions) -> Self {
        Self {
            host,
            options,
            blocks: BlockRegistry::new(),
            variables: VariableRegistry::new(),
            compiled: HashSet::new(),
            diagnostics: Vec::new(),
            current_node: String::new(),
        }
    }

    /// Compiles the entry node, then every other node in document order.
    pub fn compile(mut self, doc: &Document) -> Result<CompileReport, CompileError> {
        let entry_name = self.options.entry_node.clone();
        let entry_node = doc
            .nodes
            .get(&entry_name)
            .ok_or_else(|| CompileError::MissingEntryNode(entry_name.clone()))?;
        let entry = self.compile_node(entry_node)?;

        for (name, node) in &doc.nodes {
            if *name != entry_name {
                self.compile_node(node)?;
            }
        }

        debug!(
            document = %doc.name,
            blocks = self.blocks.len(),
            variables = self.variables.len(),
            diagnostics = self.diagnostics.len(),
            "compiled document"
        );

        Ok(CompileReport {
            entry,
            diagnostics: self.diagnostics,
        })
    }

    /// Returns the node's block, lowering its statements the first time the
    /// node is seen. A block created earlier by a forward `Call` is filled
    /// in place.
    pub fn compile_node(&mut self, node: &Node) -> Result<BlockId, CompileError> {
        let block = self.blocks.get_or_create(&mut *self.host, &node.name);
        if !self.compiled.insert(node.name.clone()) {
            return Ok(block);
        }

        debug!(node = %node.name, statements = node.statements.len(), "compiling node");
        self.current_node = node.name.clone();
        self.lower_statements(&node.statements, block)?;
        Ok(block)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Shared entry point for node, clause and option bodies.
    pub(crate) fn lower_statements(
        &mut self,
        statements: &[Statement],
        block: BlockId,
    ) -> Result<(), CompileError> {
        for statement in statements {
            let result = self.lower_statement(statement, block);
            self.recover(result)?;
        }
        Ok(())
    }

    fn lower_statement(&mut self, statement: &Statement, block: BlockId) -> Result<(), CompileError> {
        match statement {
            Statement::Line { text } => {
                self.emit(block, Command::Say { text: text.clone() });
                Ok(())
            }
            Statement::Option { destination } => {
                self.lower_call(destination, block);
                Ok(())
            }
            Statement::Custom { command } => self.lower_directive(command, block),
            Statement::ShortcutOptions { options } => self.lower_option_group(options, block),
            Statement::If { clauses } => self.lower_conditional(clauses, block),
            Statement::Assignment {
                operation,
                variable,
                value,
            } => self.lower_assignment(operation, variable, value, block),
            Statement::Unsupported => Ok(()),
        }
    }

    /// Swallows non-fatal errors into diagnostics.
    fn recover(&mut self, result: Result<(), CompileError>) -> Result<(), CompileError> {
        match result {
            Err(err) if !err.is_fatal() => {
                warn!(node = %self.current_node, error = %err, "skipping statement");
                self.diagnostics.push(Diagnostic {
                    node: self.current_node.clone(),
                    message: err.to_string(),
                });
                Ok(())
            }
            other => other,
        }
    }

    pub(crate) fn emit(&mut self, block: BlockId, command: Command) -> CommandId {
        let id = self.host.create_command(command);
        self.host.append_command(block, id);
        id
    }

    pub(crate) fn coerce_kinds(&self) -> bool {
        self.options.kind_mismatch == KindMismatch::Coerce
    }

    fn lower_call(&mut self, destination: &str, block: BlockId) {
        let target = self.blocks.get_or_create(&mut *self.host, destination);
        self.emit(block, Command::Call { target });
    }

    fn lower_directive(&mut self, raw: &str, block: BlockId) -> Result<(), CompileError> {
        match parse_directive(raw)? {
            Some(Directive::Wait { seconds }) => {
                self.emit(block, Command::Wait { seconds });
            }
            None => debug!(directive = raw, "ignoring directive"),
        }
        Ok(())
    }

    fn lower_assignment(
        &mut self,
        operation: &str,
        variable: &str,
        value: &Value,
        block: BlockId,
    ) -> Result<(), CompileError> {
        let operator = SetOperator::from_token(operation)
            .ok_or_else(|| CompileError::UnknownOperator(operation.to_string()))?;
        let literal = literal_of(value)?;
        let coerce = self.coerce_kinds();
        let (entry, value) = self
            .variables
            .bind(&mut *self.host, variable, literal, coerce)?;

        self.emit(
            block,
            Command::SetVariable {
                operator,
                variable: entry.id,
                value,
            },
        );
        Ok(())
    }
}

pub(crate) fn literal_of(value: &Value) -> Result<Literal, CompileError> {
    match value {
        Value::String(s) => Ok(Literal::String(s.clone())),
        Value::Number(n) => Ok(Literal::Number(*n)),
        Value::Bool(b) => Ok(Literal::Bool(*b)),
        other => Err(CompileError::UnknownValueKind(other.kind_name().to_string())),
    }
}
