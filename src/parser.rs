//! Instruction parsing.
//!
//! A line is parsed in two steps: [`crate::command::read_command`] recognizes
//! the leading command, then a small state machine consumes the operands the
//! command expects. The result is either a fully validated [`Instruction`] or
//! exactly one [`ParseError`]; nothing is executed while parsing.

use crate::command::{self, CommandDescriptor, CommandKind};
use crate::lexer::{is_separator, Cursor};
use crate::matrix::CELLS;
use crate::registry::Registry;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::trace;

/// Everything that can be wrong with an instruction line.
///
/// The `Display` text is what the user sees after `Error: `.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A matrix operand does not name a registered matrix.
    #[error("Undefined matrix name")]
    UndefinedMatrixName,
    /// The first token is not a known command.
    #[error("Undefined command name")]
    UndefinedCommandName,
    /// A `read_mat` value contains something other than digits, `.` or `-`.
    #[error("Argument is not a real number")]
    ArgumentNotRealNumber,
    /// The `mul_scalar` factor contains something other than digits, `.` or `-`.
    #[error("Argument is not a scalar")]
    ArgumentNotScalar,
    /// The instruction is complete but the line goes on.
    #[error("Extraneous text after end of command")]
    ExtraneousTextAfterCommand,
    /// The line ends before every required operand was given.
    #[error("Missing argument")]
    MissingArgument,
    /// A comma directly after the command name.
    #[error("Illegal comma")]
    IllegalComma,
    /// Two operands without a comma between them.
    #[error("Missing comma")]
    MissingComma,
    /// Two commas with nothing but whitespace between them.
    #[error("Multiple consecutive commas")]
    MultipleConsecutiveCommas,
}

impl ParseError {
    /// The upper-case tag of the error, e.g. `MISSING_COMMA`.
    pub fn code(self) -> &'static str {
        match self {
            ParseError::UndefinedMatrixName => "UNDEFINED_MATRIX_NAME",
            ParseError::UndefinedCommandName => "UNDEFINED_COMMAND_NAME",
            ParseError::ArgumentNotRealNumber => "ARGUMENT_NOT_REAL_NUMBER",
            ParseError::ArgumentNotScalar => "ARGUMENT_NOT_SCALAR",
            ParseError::ExtraneousTextAfterCommand => "EXTRANEOUS_TEXT_AFTER_COMMAND",
            ParseError::MissingArgument => "MISSING_ARGUMENT",
            ParseError::IllegalComma => "ILLEGAL_COMMA",
            ParseError::MissingComma => "MISSING_COMMA",
            ParseError::MultipleConsecutiveCommas => "MULTIPLE_CONSECUTIVE_COMMAS",
        }
    }
}

/// A validated instruction, ready to be executed.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub command: CommandKind,
    /// Matrix names in the order they appeared. Every one is registered.
    pub operands: Vec<String>,
    /// The factor of a `mul_scalar` instruction.
    pub scalar: Option<f64>,
    /// The row-major cells of a `read_mat` instruction, zero past the last given value.
    pub elements: Option<[f64; CELLS]>,
}

impl Instruction {
    fn bare(command: CommandKind) -> Self {
        Instruction {
            command,
            operands: Vec::new(),
            scalar: None,
            elements: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParsingState {
    ReadingMatrixName,
    AwaitingArgument,
    ReadingScalar,
}

enum Step {
    Continue,
    Complete,
}

struct InstructionFSM<'r> {
    cursor: Cursor,
    state: ParsingState,
    command: &'static CommandDescriptor,
    registry: &'r Registry,
    operands: Vec<String>,
    scalar: f64,
    values_read: usize,
    elements: [f64; CELLS],
}

impl<'r> InstructionFSM<'r> {
    fn new(cursor: Cursor, command: &'static CommandDescriptor, registry: &'r Registry) -> Self {
        InstructionFSM {
            cursor,
            state: ParsingState::ReadingMatrixName,
            command,
            registry,
            operands: Vec::with_capacity(command.arity),
            scalar: 0.0,
            values_read: 0,
            elements: [0.0; CELLS],
        }
    }

    /// Drive the machine until a handler completes the instruction or the line runs out.
    fn run(mut self) -> Result<Instruction, ParseError> {
        while !self.cursor.at_end() {
            trace!(state = ?self.state, rest = %self.cursor.rest(), "parser step");
            let step = match self.state {
                ParsingState::ReadingMatrixName => self.handle_matrix_name()?,
                ParsingState::AwaitingArgument => self.handle_awaiting_argument()?,
                ParsingState::ReadingScalar => self.handle_scalar()?,
            };
            if let Step::Complete = step {
                return Ok(self.finish());
            }
        }
        Err(ParseError::MissingArgument)
    }

    fn handle_matrix_name(&mut self) -> Result<Step, ParseError> {
        let name = self.cursor.read_token();
        self.cursor.skip_whitespace();

        if !self.registry.contains(&name) {
            return Err(ParseError::UndefinedMatrixName);
        }
        self.operands.push(name);

        if !self.command.kind.takes_values() && self.operands.len() == self.command.arity {
            return self.expect_end_of_line();
        }
        self.state = ParsingState::AwaitingArgument;
        Ok(Step::Continue)
    }

    fn handle_awaiting_argument(&mut self) -> Result<Step, ParseError> {
        self.cursor.skip_whitespace();

        match self.cursor.peek_char() {
            Some(',') => {
                self.cursor.read_char();
                self.cursor.skip_whitespace();
                match self.cursor.peek_char() {
                    Some(',') => Err(ParseError::MultipleConsecutiveCommas),
                    None if self.operands.len() < self.command.arity => {
                        Err(ParseError::MissingArgument)
                    }
                    None if self.values_read > 0 => Err(ParseError::ExtraneousTextAfterCommand),
                    None => Err(ParseError::MissingArgument),
                    Some(_) => {
                        self.state = match self.command.kind {
                            CommandKind::ReadMat => ParsingState::ReadingScalar,
                            CommandKind::MulScalar if self.values_read == 0 => {
                                ParsingState::ReadingScalar
                            }
                            _ => ParsingState::ReadingMatrixName,
                        };
                        Ok(Step::Continue)
                    }
                }
            }
            None if self.command.kind.takes_values() => Ok(Step::Complete),
            None => Err(ParseError::MissingArgument),
            Some(_) => Err(ParseError::MissingComma),
        }
    }

    fn handle_scalar(&mut self) -> Result<Step, ParseError> {
        let mut token = String::new();
        while let Some(ch) = self.cursor.peek_char().filter(|c| !is_separator(*c)) {
            if !(ch.is_ascii_digit() || ch == '.' || ch == '-') {
                return Err(self.not_a_number());
            }
            token.push(ch);
            self.cursor.read_char();
        }

        let value = leading_number(&token);
        self.values_read += 1;
        self.state = ParsingState::AwaitingArgument;

        if self.command.kind.takes_values() {
            if let Some(cell) = self.elements.get_mut(self.values_read - 1) {
                *cell = value;
            }
        } else {
            self.scalar = value;
            // The destination matrix still has to follow.
            if self.cursor.at_end() {
                return Err(ParseError::MissingArgument);
            }
        }

        if self.cursor.at_end() {
            return Ok(Step::Complete);
        }
        Ok(Step::Continue)
    }

    fn expect_end_of_line(&self) -> Result<Step, ParseError> {
        if self.cursor.at_end() {
            Ok(Step::Complete)
        } else {
            trace!(rest = %self.cursor.rest(), "text after complete instruction");
            Err(ParseError::ExtraneousTextAfterCommand)
        }
    }

    fn not_a_number(&self) -> ParseError {
        match self.command.kind {
            CommandKind::ReadMat => ParseError::ArgumentNotRealNumber,
            _ => ParseError::ArgumentNotScalar,
        }
    }

    fn finish(self) -> Instruction {
        let kind = self.command.kind;
        Instruction {
            command: kind,
            operands: self.operands,
            scalar: (kind == CommandKind::MulScalar).then_some(self.scalar),
            elements: kind.takes_values().then_some(self.elements),
        }
    }
}

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:[0-9]+\.?[0-9]*|\.[0-9]+)").expect("leading number pattern is valid")
});

/// Convert the longest numeric prefix of `token`; no prefix at all reads as zero.
///
/// `"1.2.3"` is `1.2`, `"3-4"` is `3` and `"-"` is `0`.
fn leading_number(token: &str) -> f64 {
    LEADING_NUMBER
        .find(token)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

/// Parse one instruction line against the matrices known to `registry`.
///
/// The line must not be blank; callers skip those before parsing.
pub fn parse_instruction(line: &str, registry: &Registry) -> Result<Instruction, ParseError> {
    let mut cursor = Cursor::new(line);
    let command = command::read_command(&mut cursor)?;

    if command.kind == CommandKind::Stop {
        return if cursor.at_end() {
            Ok(Instruction::bare(CommandKind::Stop))
        } else {
            Err(ParseError::ExtraneousTextAfterCommand)
        };
    }

    InstructionFSM::new(cursor, command, registry).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Instruction, ParseError> {
        parse_instruction(line, &Registry::default())
    }

    fn err(line: &str) -> ParseError {
        match parse(line) {
            Ok(instr) => panic!("expected {:?} to fail, got {:?}", line, instr),
            Err(e) => e,
        }
    }

    fn names(instr: &Instruction) -> Vec<&str> {
        instr.operands.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_stop() {
        assert_eq!(parse("stop").unwrap().command, CommandKind::Stop);
        assert_eq!(parse("  stop \t").unwrap().operands.len(), 0);
        assert_eq!(err("stop now"), ParseError::ExtraneousTextAfterCommand);
        assert_eq!(err("stop,"), ParseError::IllegalComma);
    }

    #[test]
    fn test_three_operand_commands() {
        for (line, kind) in [
            ("add_mat MAT_A, MAT_B, MAT_C", CommandKind::AddMat),
            ("sub_mat MAT_A ,MAT_B ,MAT_C", CommandKind::SubMat),
            ("mul_mat\tMAT_D,MAT_E,MAT_F  ", CommandKind::MulMat),
        ] {
            let instr = parse(line).unwrap();
            assert_eq!(instr.command, kind);
            assert_eq!(instr.operands.len(), 3);
            assert_eq!(instr.scalar, None);
            assert_eq!(instr.elements, None);
        }
        let instr = parse("mul_mat MAT_A, MAT_A, MAT_A").unwrap();
        assert_eq!(names(&instr), ["MAT_A", "MAT_A", "MAT_A"]);
    }

    #[test]
    fn test_print_and_transpose() {
        let instr = parse("print_mat MAT_B").unwrap();
        assert_eq!(instr.command, CommandKind::PrintMat);
        assert_eq!(names(&instr), ["MAT_B"]);

        let instr = parse("trans_mat MAT_A,MAT_A").unwrap();
        assert_eq!(instr.command, CommandKind::TransMat);
        assert_eq!(names(&instr), ["MAT_A", "MAT_A"]);
    }

    #[test]
    fn test_mul_scalar() {
        let instr = parse("mul_scalar MAT_A, -2.5, MAT_B").unwrap();
        assert_eq!(instr.command, CommandKind::MulScalar);
        assert_eq!(names(&instr), ["MAT_A", "MAT_B"]);
        assert_eq!(instr.scalar, Some(-2.5));

        assert_eq!(err("mul_scalar MAT_A, 2"), ParseError::MissingArgument);
        assert_eq!(err("mul_scalar MAT_A, 2  "), ParseError::MissingArgument);
        assert_eq!(err("mul_scalar MAT_A, 2,"), ParseError::MissingArgument);
        assert_eq!(err("mul_scalar MAT_A, x, MAT_B"), ParseError::ArgumentNotScalar);
        assert_eq!(err("mul_scalar MAT_A, MAT_B, 2"), ParseError::ArgumentNotScalar);
        assert_eq!(err("mul_scalar MAT_A, 2, 3"), ParseError::UndefinedMatrixName);
        assert_eq!(
            err("mul_scalar MAT_A, 2, MAT_B, MAT_C"),
            ParseError::ExtraneousTextAfterCommand
        );
    }

    #[test]
    fn test_read_mat_values() {
        let instr = parse("read_mat MAT_A, 1, 2, 3").unwrap();
        assert_eq!(instr.command, CommandKind::ReadMat);
        assert_eq!(names(&instr), ["MAT_A"]);
        let cells = instr.elements.unwrap();
        assert_eq!(&cells[..4], &[1.0, 2.0, 3.0, 0.0]);
        assert!(cells[3..].iter().all(|v| *v == 0.0));

        let instr = parse("read_mat MAT_A,-1.5,.5,2.   ").unwrap();
        assert_eq!(&instr.elements.unwrap()[..3], &[-1.5, 0.5, 2.0]);
    }

    #[test]
    fn test_read_mat_ignores_excess_values() {
        let values: Vec<String> = (1..=20).map(|i| i.to_string()).collect();
        let line = format!("read_mat MAT_C, {}", values.join(", "));
        let cells = parse(&line).unwrap().elements.unwrap();
        let expected: Vec<f64> = (1..=CELLS).map(|i| i as f64).collect();
        assert_eq!(cells.to_vec(), expected);
    }

    #[test]
    fn test_read_mat_errors() {
        assert_eq!(err("read_mat MAT_A"), ParseError::MissingArgument);
        assert_eq!(err("read_mat MAT_A,"), ParseError::MissingArgument);
        assert_eq!(err("read_mat MAT_A, 1,"), ParseError::ExtraneousTextAfterCommand);
        assert_eq!(err("read_mat MAT_A, 1, x"), ParseError::ArgumentNotRealNumber);
        assert_eq!(err("read_mat MAT_A, 1a"), ParseError::ArgumentNotRealNumber);
        assert_eq!(err("read_mat MAT_A 1"), ParseError::MissingComma);
        assert_eq!(err("read_mat MAT_A, 1 2"), ParseError::MissingComma);
        assert_eq!(err("read_mat MAT_A, 1,, 2"), ParseError::MultipleConsecutiveCommas);
        assert_eq!(err("read_mat MAT_Z, 1"), ParseError::UndefinedMatrixName);
    }

    #[test]
    fn test_lenient_number_conversion() {
        let scalar = |text: &str| {
            parse(&format!("mul_scalar MAT_A, {}, MAT_B", text))
                .unwrap()
                .scalar
                .unwrap()
        };
        assert_eq!(scalar("1.2.3"), 1.2);
        assert_eq!(scalar("3-4"), 3.0);
        assert_eq!(scalar("-"), 0.0);
        assert_eq!(scalar("--5"), 0.0);
        assert_eq!(scalar("."), 0.0);
        assert_eq!(scalar("-0.25"), -0.25);
        assert_eq!(scalar("7."), 7.0);
    }

    #[test]
    fn test_reference_malformed_lines() {
        assert_eq!(err("addmat X"), ParseError::UndefinedCommandName);
        assert_eq!(err("add_mat MAT_A, MAT_B"), ParseError::MissingArgument);
        assert_eq!(err("add_mat MAT_A,, MAT_B, MAT_C"), ParseError::MultipleConsecutiveCommas);
        assert_eq!(err("print_mat MAT_Z"), ParseError::UndefinedMatrixName);
        assert_eq!(err("stop now"), ParseError::ExtraneousTextAfterCommand);
        assert_eq!(err("trans_mat MAT_A MAT_B"), ParseError::MissingComma);
    }

    #[test]
    fn test_operand_count_errors() {
        assert_eq!(err("print_mat"), ParseError::MissingArgument);
        assert_eq!(err("print_mat   "), ParseError::MissingArgument);
        assert_eq!(err("print_mat MAT_A MAT_B"), ParseError::ExtraneousTextAfterCommand);
        assert_eq!(err("print_mat MAT_A,"), ParseError::ExtraneousTextAfterCommand);
        assert_eq!(err("add_mat MAT_A, MAT_B,"), ParseError::MissingArgument);
        assert_eq!(err("add_mat MAT_A, MAT_B,   "), ParseError::MissingArgument);
        assert_eq!(
            err("add_mat MAT_A, MAT_B, MAT_C, MAT_D"),
            ParseError::ExtraneousTextAfterCommand
        );
        assert_eq!(err("trans_mat MAT_A"), ParseError::MissingArgument);
        assert_eq!(err("print_mat ,MAT_A"), ParseError::IllegalComma);
        assert_eq!(err("mat_print MAT_A"), ParseError::UndefinedCommandName);
        assert_eq!(err("add_mat MAT_A, mat_b, MAT_C"), ParseError::UndefinedMatrixName);
    }

    #[test]
    fn test_custom_registry_names() {
        let reg = Registry::new(["LEFT", "RIGHT"]).unwrap();
        let instr = parse_instruction("add_mat LEFT, RIGHT, LEFT", &reg).unwrap();
        assert_eq!(names(&instr), ["LEFT", "RIGHT", "LEFT"]);
        assert_eq!(
            parse_instruction("print_mat MAT_A", &reg),
            Err(ParseError::UndefinedMatrixName)
        );
    }

    #[test]
    fn test_error_names_and_codes() {
        assert_eq!(ParseError::MissingComma.to_string(), "Missing comma");
        assert_eq!(ParseError::MissingComma.code(), "MISSING_COMMA");
        assert_eq!(
            ParseError::ExtraneousTextAfterCommand.to_string(),
            "Extraneous text after end of command"
        );
        assert_eq!(ParseError::ArgumentNotScalar.code(), "ARGUMENT_NOT_SCALAR");
    }
}
