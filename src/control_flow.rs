//! Lowering of `if` chains and shortcut-option groups into flat commands.
//!
//! Clause bodies stay inline in the current block, bracketed by
//! `If`/`ElseIf`/`Else` markers and a single closing `End`. Each shortcut
//! option becomes a `Menu` pointing at a block named after its label.

use crate::ast::{Clause, Comparison, ShortcutOption};
use crate::compiler::{literal_of, CompilerState};
use crate::error::CompileError;
use crate::host::Host;
use crate::registry::conform;
use crate::types::{BlockId, Command, CompareOperator, Condition, Literal, VarKind};
use std::collections::HashMap;

impl<'h, H: Host + ?Sized> CompilerState<'h, H> {
    pub(crate) fn lower_conditional(
        &mut self,
        clauses: &[Clause],
        block: BlockId,
    ) -> Result<(), CompileError> {
        // Check every clause before touching the host; a bad clause drops
        // the whole statement without leaving variables or markers behind.
        let mut pending: HashMap<&str, VarKind> = HashMap::new();
        let mut checked = Vec::with_capacity(clauses.len());
        for clause in clauses {
            let check = match &clause.condition {
                Some(cmp) => Some(self.check_condition(cmp, &mut pending)?),
                None => None,
            };
            checked.push(check);
        }

        for (index, (clause, check)) in clauses.iter().zip(checked).enumerate() {
            let condition = check.map(|(operator, name, value)| {
                let entry = self
                    .variables
                    .resolve_or_create(&mut *self.host, name, value.kind());
                Condition {
                    operator,
                    variable: entry.id,
                    value,
                }
            });
            let marker = match (index, condition) {
                (_, None) => Command::Else,
                (0, Some(cond)) => Command::If(cond),
                (_, Some(cond)) => Command::ElseIf(cond),
            };
            self.emit(block, marker);
            self.lower_statements(&clause.body, block)?;
        }

        self.emit(block, Command::End);
        Ok(())
    }

    /// Resolves operator and literal for one comparison. `pending` holds the
    /// kinds earlier clauses of the same statement will create.
    fn check_condition<'c>(
        &self,
        cmp: &'c Comparison,
        pending: &mut HashMap<&'c str, VarKind>,
    ) -> Result<(CompareOperator, &'c str, Literal), CompileError> {
        let operator = CompareOperator::from_function(&cmp.function)
            .ok_or_else(|| CompileError::UnknownComparisonFunction(cmp.function.clone()))?;
        let literal = literal_of(&cmp.value)?;
        let name = cmp.variable.as_str();
        let declared = self
            .variables
            .get(name)
            .map(|e| e.kind)
            .or_else(|| pending.get(name).copied());
        let value = conform(name, declared, literal, self.coerce_kinds())?;
        pending.entry(name).or_insert(value.kind());
        Ok((operator, name, value))
    }

    pub(crate) fn lower_option_group(
        &mut self,
        options: &[ShortcutOption],
        block: BlockId,
    ) -> Result<(), CompileError> {
        for option in options {
            let target = self.blocks.get_or_create(&mut *self.host, &option.label);
            self.emit(
                block,
                Command::Menu {
                    text: option.label.clone(),
                    target,
                },
            );
            self.lower_statements(&option.body, target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Clause, Comparison, Document, Node, ShortcutOption, Statement, Value};
    use crate::compiler::{CompileOptions, CompileReport, CompilerState, KindMismatch};
    use crate::host::Flowchart;
    use crate::types::{Command, CompareOperator, Condition, Literal, VarKind, VariableId};

    fn compile(nodes: Vec<Node>) -> (Flowchart, CompileReport) {
        let doc = Document::from_nodes("test", nodes);
        let mut chart = Flowchart::new("test");
        let report = CompilerState::new(&mut chart).compile(&doc).unwrap();
        (chart, report)
    }

    fn when(function: &str, variable: &str, value: Value, body: Vec<Statement>) -> Clause {
        Clause {
            condition: Some(Comparison {
                function: function.to_string(),
                variable: variable.to_string(),
                value,
            }),
            body,
        }
    }

    fn otherwise(body: Vec<Statement>) -> Clause {
        Clause {
            condition: None,
            body,
        }
    }

    fn option(label: &str, body: Vec<Statement>) -> ShortcutOption {
        ShortcutOption {
            label: label.to_string(),
            body,
        }
    }

    fn say(text: &str) -> Command {
        Command::Say { text: text.into() }
    }

    #[test]
    fn if_elseif_else_shape() {
        let clauses = vec![
            when("LessThan", "gold", Value::Number(10.0), vec![Statement::line("poor")]),
            when("LessThan", "gold", Value::Number(100.0), vec![Statement::line("fine")]),
            otherwise(vec![Statement::line("rich")]),
        ];
        let (chart, report) = compile(vec![Node::new(
            "Start",
            vec![Statement::If { clauses }, Statement::line("after")],
        )]);

        let gold = VariableId(0);
        assert_eq!(
            chart.commands_of(report.entry),
            vec![
                &Command::If(Condition {
                    operator: CompareOperator::LessThan,
                    variable: gold,
                    value: Literal::Number(10.0),
                }),
                &say("poor"),
                &Command::ElseIf(Condition {
                    operator: CompareOperator::LessThan,
                    variable: gold,
                    value: Literal::Number(100.0),
                }),
                &say("fine"),
                &Command::Else,
                &say("rich"),
                &Command::End,
                &say("after"),
            ]
        );
        assert_eq!(chart.block_count(), 1);
    }

    #[test]
    fn single_clause_still_gets_end() {
        let (chart, report) = compile(vec![Node::new(
            "Start",
            vec![Statement::If {
                clauses: vec![when("EqualTo", "met", Value::Bool(true), vec![])],
            }],
        )]);

        let commands = chart.commands_of(report.entry);
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], Command::If(_)));
        assert_eq!(commands[1], &Command::End);
    }

    #[test]
    fn else_at_first_position_degenerates() {
        let (chart, report) = compile(vec![Node::new(
            "Start",
            vec![Statement::If {
                clauses: vec![otherwise(vec![Statement::line("always")])],
            }],
        )]);

        assert_eq!(
            chart.commands_of(report.entry),
            vec![&Command::Else, &say("always"), &Command::End]
        );
    }

    #[test]
    fn every_comparison_function_maps() {
        let functions = [
            ("LessThan", CompareOperator::LessThan),
            ("LessThanOrEqualTo", CompareOperator::LessThanOrEquals),
            ("GreaterThan", CompareOperator::GreaterThan),
            ("GreaterThanOrEqualTo", CompareOperator::GreaterThanOrEquals),
            ("EqualTo", CompareOperator::Equals),
            ("NotEqualTo", CompareOperator::NotEquals),
        ];
        let clauses = functions
            .iter()
            .map(|(f, _)| when(f, "n", Value::Number(1.0), vec![]))
            .collect();
        let (chart, report) = compile(vec![Node::new("Start", vec![Statement::If { clauses }])]);

        let commands = chart.commands_of(report.entry);
        assert_eq!(commands.len(), functions.len() + 1);
        for (cmd, (_, expected)) in commands.iter().zip(functions.iter()) {
            match cmd {
                Command::If(cond) | Command::ElseIf(cond) => assert_eq!(cond.operator, *expected),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn comparison_creates_typed_variable() {
        let (chart, _) = compile(vec![Node::new(
            "Start",
            vec![Statement::If {
                clauses: vec![when("EqualTo", "name", Value::String("Ann".into()), vec![])],
            }],
        )]);

        let var = chart.variable_named("name").unwrap();
        assert_eq!(var.kind, VarKind::String);
        assert_eq!(var.value, Literal::String(String::new()));
    }

    #[test]
    fn comparison_reuses_assigned_variable() {
        let (chart, report) = compile(vec![Node::new(
            "Start",
            vec![
                Statement::assign("EqualToOrAssign", "met", Value::Bool(true)),
                Statement::If {
                    clauses: vec![when("EqualTo", "met", Value::Bool(true), vec![])],
                },
            ],
        )]);

        assert_eq!(chart.variables().len(), 1);
        assert_eq!(
            chart.commands_of(report.entry)[1],
            &Command::If(Condition {
                operator: CompareOperator::Equals,
                variable: VariableId(0),
                value: Literal::Bool(true),
            })
        );
    }

    #[test]
    fn bad_clause_drops_whole_conditional() {
        let clauses = vec![
            when("EqualTo", "a", Value::Number(1.0), vec![Statement::line("one")]),
            when("Between", "b", Value::Number(2.0), vec![Statement::line("two")]),
        ];
        let (chart, report) = compile(vec![Node::new(
            "Start",
            vec![Statement::If { clauses }, Statement::line("next")],
        )]);

        assert_eq!(chart.commands_of(report.entry), vec![&say("next")]);
        assert!(chart.variables().is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(
            report.diagnostics[0].message,
            "unknown comparison function: Between"
        );
    }

    #[test]
    fn clauses_disagreeing_on_kind_drop_conditional() {
        let clauses = vec![
            when("EqualTo", "mood", Value::Number(1.0), vec![]),
            when("EqualTo", "mood", Value::String("happy".into()), vec![]),
        ];
        let (chart, report) = compile(vec![Node::new("Start", vec![Statement::If { clauses }])]);

        assert!(chart.commands_of(report.entry).is_empty());
        assert!(chart.variables().is_empty());
        assert_eq!(
            report.diagnostics[0].message,
            "variable `mood` is number, got a string value"
        );
    }

    fn string_then_number_check() -> Vec<Node> {
        vec![Node::new(
            "Start",
            vec![
                Statement::assign("EqualToOrAssign", "x", Value::String("a".into())),
                Statement::If {
                    clauses: vec![when("EqualTo", "x", Value::Number(1.0), vec![])],
                },
            ],
        )]
    }

    #[test]
    fn comparison_kind_mismatch_is_rejected() {
        let (chart, report) = compile(string_then_number_check());

        let commands = chart.commands_of(report.entry);
        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], Command::SetVariable { .. }));
        assert_eq!(chart.variables().len(), 1);
        assert_eq!(chart.variable_named("x").unwrap().kind, VarKind::String);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(
            report.diagnostics[0].message,
            "variable `x` is string, got a number value"
        );
    }

    #[test]
    fn comparison_kind_mismatch_is_coerced() {
        let doc = Document::from_nodes("test", string_then_number_check());
        let mut chart = Flowchart::new("test");
        let options = CompileOptions {
            kind_mismatch: KindMismatch::Coerce,
            ..CompileOptions::default()
        };
        let report = CompilerState::with_options(&mut chart, options)
            .compile(&doc)
            .unwrap();

        assert!(report.diagnostics.is_empty());
        assert_eq!(chart.variables().len(), 1);
        assert_eq!(
            chart.commands_of(report.entry)[1..],
            [
                &Command::If(Condition {
                    operator: CompareOperator::Equals,
                    variable: VariableId(0),
                    value: Literal::String("1".into()),
                }),
                &Command::End,
            ]
        );
    }

    #[test]
    fn error_inside_clause_body_keeps_structure() {
        let clauses = vec![when(
            "EqualTo",
            "a",
            Value::Number(1.0),
            vec![
                Statement::assign("PowAssign", "a", Value::Number(2.0)),
                Statement::line("still here"),
            ],
        )];
        let (chart, report) = compile(vec![Node::new("Start", vec![Statement::If { clauses }])]);

        let commands = chart.commands_of(report.entry);
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[1], &say("still here"));
        assert_eq!(commands[2], &Command::End);
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[test]
    fn option_group_fans_out() {
        let options = vec![
            option("Yes", vec![Statement::line("great")]),
            option("No", vec![Statement::line("too bad"), Statement::option("Start")]),
        ];
        let (chart, report) = compile(vec![Node::new(
            "Start",
            vec![Statement::ShortcutOptions { options }],
        )]);

        let yes = chart.block_named("Yes").unwrap();
        let no = chart.block_named("No").unwrap();
        assert_ne!(yes, no);
        assert_eq!(
            chart.commands_of(report.entry),
            vec![
                &Command::Menu { text: "Yes".into(), target: yes },
                &Command::Menu { text: "No".into(), target: no },
            ]
        );
        assert_eq!(chart.commands_of(yes), vec![&say("great")]);
        assert_eq!(
            chart.commands_of(no),
            vec![&say("too bad"), &Command::Call { target: report.entry }]
        );
        assert_eq!(chart.block_count(), 3);
    }

    #[test]
    fn nested_conditional_in_option_body() {
        let options = vec![option(
            "Pay",
            vec![Statement::If {
                clauses: vec![
                    when("GreaterThanOrEqualTo", "gold", Value::Number(5.0), vec![
                        Statement::assign("MinusAssign", "gold", Value::Number(5.0)),
                    ]),
                    otherwise(vec![Statement::line("not enough")]),
                ],
            }],
        )];
        let (chart, _) = compile(vec![Node::new(
            "Start",
            vec![Statement::ShortcutOptions { options }],
        )]);

        let pay = chart.block_named("Pay").unwrap();
        let commands = chart.commands_of(pay);
        assert_eq!(commands.len(), 5);
        assert!(matches!(commands[0], Command::If(_)));
        assert!(matches!(commands[1], Command::SetVariable { .. }));
        assert_eq!(commands[2], &Command::Else);
        assert_eq!(commands[4], &Command::End);
    }

    #[test]
    fn option_label_shares_namespace_with_nodes() {
        // An option labelled like a node targets that node's block; the
        // node body is appended after the option body.
        let (chart, report) = compile(vec![
            Node::new(
                "Start",
                vec![Statement::ShortcutOptions {
                    options: vec![option("Shop", vec![Statement::line("from option")])],
                }],
            ),
            Node::new("Shop", vec![Statement::line("from node")]),
        ]);

        let shop = chart.block_named("Shop").unwrap();
        assert_eq!(chart.block_count(), 2);
        assert_eq!(
            chart.commands_of(report.entry),
            vec![&Command::Menu { text: "Shop".into(), target: shop }]
        );
        assert_eq!(chart.commands_of(shop), vec![&say("from option"), &say("from node")]);
    }

    #[test]
    fn repeated_labels_reuse_block() {
        let (chart, _) = compile(vec![Node::new(
            "Start",
            vec![
                Statement::ShortcutOptions {
                    options: vec![option("Back", vec![Statement::line("first")])],
                },
                Statement::ShortcutOptions {
                    options: vec![option("Back", vec![Statement::line("second")])],
                },
            ],
        )]);

        let back = chart.block_named("Back").unwrap();
        assert_eq!(chart.block_count(), 2);
        assert_eq!(chart.commands_of(back), vec![&say("first"), &say("second")]);
    }
}
