//! Custom `<<...>>` directives. Only `wait <N>s` is understood.

use crate::error::CompileError;
use winnow::ascii::digit1;
use winnow::combinator::{opt, terminated};
use winnow::error::ModalResult;
use winnow::Parser;

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Wait { seconds: u32 },
}

/// Tokenizes `raw` on whitespace. Unknown directives yield `Ok(None)`.
pub fn parse_directive(raw: &str) -> Result<Option<Directive>, CompileError> {
    let mut tokens = raw.split_whitespace();
    match tokens.next() {
        Some("wait") => {
            let arg = tokens.next().ok_or_else(|| CompileError::Format {
                directive: raw.to_string(),
                reason: "missing duration".to_string(),
            })?;
            let seconds = seconds.parse(arg).map_err(|_| CompileError::Format {
                directive: raw.to_string(),
                reason: format!("`{}` is not a whole number of seconds", arg),
            })?;
            Ok(Some(Directive::Wait { seconds }))
        }
        _ => Ok(None),
    }
}

fn seconds(input: &mut &str) -> ModalResult<u32> {
    terminated(digit1, opt('s'))
        .try_map(str::parse::<u32>)
        .parse_next(input)
}
