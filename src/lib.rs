#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
use pyo3::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod ast;
pub mod compiler;
mod control_flow;
pub mod directive;
pub mod error;
pub mod host;
pub mod registry;
pub mod types;

pub use ast::{Clause, Comparison, Document, Node, ShortcutOption, Statement, Value};
pub use compiler::{CompileOptions, CompileReport, CompilerState, KindMismatch};
pub use error::{CompileError, Diagnostic, JsonError};
pub use host::{BlockFactory, CommandSink, Flowchart, Host, VariableStore};
pub use types::{BlockId, Command, FlowchartOutput, Literal, VarKind};

use serde::Serialize;

#[derive(Debug, Serialize, Clone)]
pub struct CompileOutput {
    pub entry: BlockId,
    pub flowchart: FlowchartOutput,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiles `doc` into a fresh in-memory flowchart named after it.
pub fn compile_document(
    doc: &Document,
    options: CompileOptions,
) -> Result<CompileOutput, CompileError> {
    let mut chart = Flowchart::new(doc.name.clone());
    let report = CompilerState::with_options(&mut chart, options).compile(doc)?;

    Ok(CompileOutput {
        entry: report.entry,
        flowchart: chart.to_output(),
        diagnostics: report.diagnostics,
    })
}

pub fn compile_json(text: &str, options: CompileOptions) -> Result<String, JsonError> {
    let doc: Document = serde_json::from_str(text)?;
    let output = compile_document(&doc, options)?;
    Ok(serde_json::to_string_pretty(&output)?)
}

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
#[pyfunction]
#[pyo3(signature = (text, entry_node = None, coerce_kinds = false))]
fn compile_text(text: String, entry_node: Option<String>, coerce_kinds: bool) -> PyResult<String> {
    compile_json(&text, binding_options(entry_node, coerce_kinds))
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn compile_text_wasm(text: &str) -> Result<String, JsValue> {
    compile_json(text, CompileOptions::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn compile_text_with_options_wasm(
    text: &str,
    entry_node: Option<String>,
    coerce_kinds: bool,
) -> Result<String, JsValue> {
    compile_json(text, binding_options(entry_node, coerce_kinds))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(any(feature = "python", target_arch = "wasm32"))]
fn binding_options(entry_node: Option<String>, coerce_kinds: bool) -> CompileOptions {
    let mut options = CompileOptions::default();
    if let Some(entry) = entry_node {
        options.entry_node = entry;
    }
    if coerce_kinds {
        options.kind_mismatch = KindMismatch::Coerce;
    }
    options
}

#[cfg(all(feature = "python", not(target_arch = "wasm32")))]
#[pymodule]
fn yarnflow_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compile_text, m)?)?;
    Ok(())
}
