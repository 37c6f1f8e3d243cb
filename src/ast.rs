use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub name: String,
    #[serde(deserialize_with = "nodes_by_key")]
    pub nodes: IndexMap<String, Node>,
}

/// A node is known by its map key; any inner `name` is overwritten.
fn nodes_by_key<'de, D: Deserializer<'de>>(de: D) -> Result<IndexMap<String, Node>, D::Error> {
    let mut nodes = IndexMap::<String, Node>::deserialize(de)?;
    for (key, node) in nodes.iter_mut() {
        node.name.clone_from(key);
    }
    Ok(nodes)
}

impl Document {
    pub fn from_nodes(name: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            nodes: nodes.into_iter().map(|n| (n.name.clone(), n)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

impl Node {
    pub fn new(name: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self {
            name: name.into(),
            statements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    Line {
        text: String,
    },
    Option {
        destination: String,
    },
    Custom {
        command: String,
    },
    ShortcutOptions {
        options: Vec<ShortcutOption>,
    },
    If {
        clauses: Vec<Clause>,
    },
    Assignment {
        operation: String, // parser token name, e.g. "AddAssign"
        variable: String,
        value: Value,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShortcutOption {
    pub label: String,
    #[serde(default)]
    pub body: Vec<Statement>,
}

/// One branch of an `if`. No condition means `else`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Clause {
    #[serde(default)]
    pub condition: Option<Comparison>,
    #[serde(default)]
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comparison {
    pub function: String, // "LessThan", "EqualTo", ...
    pub variable: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    Variable(String),
    Null,
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Variable(_) => "variable",
            Value::Null => "null",
        }
    }
}

impl Statement {
    pub fn line(text: impl Into<String>) -> Self {
        Statement::Line { text: text.into() }
    }

    pub fn option(destination: impl Into<String>) -> Self {
        Statement::Option {
            destination: destination.into(),
        }
    }

    pub fn custom(command: impl Into<String>) -> Self {
        Statement::Custom {
            command: command.into(),
        }
    }

    pub fn assign(operation: &str, variable: impl Into<String>, value: Value) -> Self {
        Statement::Assignment {
            operation: operation.to_string(),
            variable: variable.into(),
            value,
        }
    }
}
