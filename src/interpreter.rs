use crate::command::CommandKind;
use crate::io_adapters::{EditorLines, LineSource};
use crate::lexer::is_space;
use crate::matrix;
use crate::parser::{self, Instruction, ParseError};
use crate::registry::{Registry, Slot};
use anyhow::{Context, Result, anyhow};
use std::io::Write;
use tracing::{debug, info, trace};

/// Prompt shown before every instruction.
pub const DEFAULT_PROMPT: &str = ">> ";

/// Session settings that do not affect the meaning of instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub prompt: String,
    /// Write every line read back to the output, prefixed by the prompt.
    ///
    /// Useful when input is redirected from a file and a readable transcript is wanted.
    pub echo: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            echo: false,
        }
    }
}

/// What the session loop should do after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// A `stop` instruction was executed.
    Stopped,
    /// The input ran out before any `stop`.
    EndOfInput,
}

/// The matrix calculator: a registry of matrices plus the loop that parses and
/// executes instructions against it.
///
/// Example
/// ```
/// use matrix_calc::{Flow, Interpreter};
/// let mut calc = Interpreter::default();
/// let mut out: Vec<u8> = Vec::new();
/// calc.process_line("read_mat MAT_A, 1, 2, 3, 4", &mut out).unwrap();
/// calc.process_line("print_mat MAT_A", &mut out).unwrap();
/// let text = String::from_utf8(out).unwrap();
/// assert!(text.starts_with("    1.00     2.00     3.00     4.00"));
/// assert_eq!(calc.process_line("stop", &mut Vec::<u8>::new()).unwrap(), Flow::Stop);
/// ```
pub struct Interpreter {
    registry: Registry,
    options: SessionOptions,
}

impl Interpreter {
    pub fn new(registry: Registry, options: SessionOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Parse a line against this interpreter's matrices without executing it.
    pub fn parse(&self, line: &str) -> Result<Instruction, ParseError> {
        parser::parse_instruction(line, &self.registry)
    }

    /// Execute a parsed instruction.
    ///
    /// Printing goes to `out`. Operand names are resolved again here, so an
    /// instruction built by hand with unknown names is rejected rather than executed.
    pub fn execute(&mut self, instruction: &Instruction, out: &mut dyn Write) -> Result<Flow> {
        let kind = instruction.command;
        let slots = instruction
            .operands
            .iter()
            .map(|name| self.registry.resolve(name))
            .collect::<Result<Vec<Slot>, _>>()?;
        debug!(command = kind.name(), operands = ?instruction.operands, "executing instruction");

        match kind {
            CommandKind::Stop => return Ok(Flow::Stop),
            CommandKind::ReadMat => {
                let [dest] = operand_slots::<1>(kind, &slots)?;
                let values = instruction
                    .elements
                    .context("read_mat instruction without values")?;
                self.registry.load(dest, &values);
            }
            CommandKind::PrintMat => {
                let [source] = operand_slots::<1>(kind, &slots)?;
                write!(out, "{}", self.registry.matrix(source)).context("failed to print matrix")?;
            }
            CommandKind::AddMat => {
                let [lhs, rhs, dest] = operand_slots::<3>(kind, &slots)?;
                let sum = *self.registry.matrix(lhs) + *self.registry.matrix(rhs);
                self.registry.store(dest, sum);
            }
            CommandKind::SubMat => {
                let [lhs, rhs, dest] = operand_slots::<3>(kind, &slots)?;
                let difference = *self.registry.matrix(lhs) - *self.registry.matrix(rhs);
                self.registry.store(dest, difference);
            }
            CommandKind::MulMat => {
                let [lhs, rhs, dest] = operand_slots::<3>(kind, &slots)?;
                self.multiply(lhs, rhs, dest)?;
            }
            CommandKind::MulScalar => {
                let [source, dest] = operand_slots::<2>(kind, &slots)?;
                let scalar = instruction
                    .scalar
                    .context("mul_scalar instruction without a scalar")?;
                let scaled = *self.registry.matrix(source) * scalar;
                self.registry.store(dest, scaled);
            }
            CommandKind::TransMat => {
                let [source, dest] = operand_slots::<2>(kind, &slots)?;
                self.transpose(source, dest)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn multiply(&mut self, lhs: Slot, rhs: Slot, dest: Slot) -> Result<()> {
        match (lhs == dest, rhs == dest) {
            (false, false) => {
                trace!("multiplying into a distinct destination");
                let (lhs, rhs, out) = self
                    .registry
                    .operands_and_dest(lhs, rhs, dest)
                    .context("destination overlaps an operand")?;
                matrix::multiply(lhs, rhs, out);
            }
            (true, false) => {
                debug!("destination is the left operand, multiplying in place");
                let (rhs, target) = self
                    .registry
                    .source_and_dest(rhs, dest)
                    .context("right operand overlaps the destination")?;
                matrix::multiply_in_place(target, rhs);
            }
            (false, true) => {
                debug!("destination is the right operand, multiplying in place");
                let (lhs, target) = self
                    .registry
                    .source_and_dest(lhs, dest)
                    .context("left operand overlaps the destination")?;
                matrix::premultiply_in_place(lhs, target);
            }
            (true, true) => {
                debug!("squaring in place");
                matrix::square_in_place(self.registry.matrix_mut(dest));
            }
        }
        Ok(())
    }

    fn transpose(&mut self, source: Slot, dest: Slot) -> Result<()> {
        if source == dest {
            debug!("transposing in place");
            matrix::transpose_in_place(self.registry.matrix_mut(dest));
            return Ok(());
        }
        let (original, transposed) = self
            .registry
            .source_and_dest(source, dest)
            .context("source overlaps the destination")?;
        matrix::transpose(original, transposed);
        Ok(())
    }

    /// Parse and execute one line.
    ///
    /// Blank lines are ignored. A parse error is reported to `out` as
    /// `Error: <reason>` and the session continues; the registry is left untouched.
    pub fn process_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow> {
        if line.chars().all(is_space) {
            return Ok(Flow::Continue);
        }
        match self.parse(line) {
            Ok(instruction) => self.execute(&instruction, out),
            Err(err) => {
                debug!(code = err.code(), line, "rejected instruction");
                writeln!(out, "Error: {}", err).context("failed to report a parse error")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Read, parse and execute lines until `stop` or the end of input.
    ///
    /// The prompt is the line source's business on a terminal; here it only
    /// appears as the prefix of echoed lines.
    pub fn run(&mut self, lines: &mut dyn LineSource, out: &mut dyn Write) -> Result<SessionEnd> {
        while let Some(line) = lines.next_line()? {
            if self.options.echo {
                writeln!(out, "{}{}", self.options.prompt, line)?;
            }
            if self.process_line(&line, out)? == Flow::Stop {
                info!("stop instruction received");
                out.flush()?;
                return Ok(SessionEnd::Stopped);
            }
        }
        writeln!(out, "Error: Unexpected End Of File. No 'stop' command found.")?;
        out.flush()?;
        info!("input ended without a stop instruction");
        Ok(SessionEnd::EndOfInput)
    }

    /// Interactive session on the terminal, with line editing and history.
    pub fn repl(&mut self) -> Result<SessionEnd> {
        let mut lines = EditorLines::new(self.options.prompt.clone())?;
        self.run(&mut lines, &mut std::io::stdout())
    }
}

impl Default for Interpreter {
    /// The six zeroed matrices `MAT_A` to `MAT_F` and default session options.
    fn default() -> Self {
        Self::new(Registry::default(), SessionOptions::default())
    }
}

fn operand_slots<const N: usize>(kind: CommandKind, slots: &[Slot]) -> Result<[Slot; N]> {
    <[Slot; N]>::try_from(slots).map_err(|_| {
        anyhow!(
            "{} expects {} matrix operands, got {}",
            kind.name(),
            N,
            slots.len()
        )
    })
}
