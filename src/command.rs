use crate::lexer::Cursor;
use crate::parser::ParseError;

/// Every instruction the calculator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// End the session.
    Stop,
    /// Fill a matrix from a comma separated list of numbers.
    ReadMat,
    /// Print a matrix.
    PrintMat,
    /// `dest = lhs + rhs`.
    AddMat,
    /// `dest = lhs - rhs`.
    SubMat,
    /// `dest = lhs × rhs`.
    MulMat,
    /// `dest = source × scalar`.
    MulScalar,
    /// `dest = sourceᵀ`.
    TransMat,
}

/// Static description of a command: its spelling, how many matrix names it
/// takes and the help text shown in the intro.
#[derive(Debug)]
pub struct CommandDescriptor {
    pub kind: CommandKind,
    pub name: &'static str,
    /// Number of matrix-name operands.
    pub arity: usize,
    pub syntax: &'static str,
    pub description: &'static str,
}

/// The command table, in the order it is shown to the user.
pub static COMMANDS: [CommandDescriptor; 8] = [
    CommandDescriptor {
        kind: CommandKind::Stop,
        name: "stop",
        arity: 0,
        syntax: "Syntax: stop",
        description: "Description: Exit the application.",
    },
    CommandDescriptor {
        kind: CommandKind::ReadMat,
        name: "read_mat",
        arity: 1,
        syntax: "Syntax: read_mat <matrix_name>, <arg1>, <arg2>, ...",
        description: "Description: Read a matrix and store its values.",
    },
    CommandDescriptor {
        kind: CommandKind::PrintMat,
        name: "print_mat",
        arity: 1,
        syntax: "Syntax: print_mat <matrix_name>",
        description: "Description: Print the contents of a matrix.",
    },
    CommandDescriptor {
        kind: CommandKind::AddMat,
        name: "add_mat",
        arity: 3,
        syntax: "Syntax: add_mat <matrix1_name>, <matrix2_name>, <result_matrix_name>",
        description: "Description: Add two matrices.",
    },
    CommandDescriptor {
        kind: CommandKind::SubMat,
        name: "sub_mat",
        arity: 3,
        syntax: "Syntax: sub_mat <matrix1_name>, <matrix2_name>, <result_matrix_name>",
        description: "Description: Subtract one matrix from another.",
    },
    CommandDescriptor {
        kind: CommandKind::MulMat,
        name: "mul_mat",
        arity: 3,
        syntax: "Syntax: mul_mat <matrix1_name>, <matrix2_name>, <result_matrix_name>",
        description: "Description: Multiply two matrices.",
    },
    CommandDescriptor {
        kind: CommandKind::MulScalar,
        name: "mul_scalar",
        arity: 2,
        syntax: "Syntax: mul_scalar <matrix_name>, <scalar>, <result_matrix_name>",
        description: "Description: Multiply a matrix by a scalar value.",
    },
    CommandDescriptor {
        kind: CommandKind::TransMat,
        name: "trans_mat",
        arity: 2,
        syntax: "Syntax: trans_mat <matrix_name>, <result_matrix_name>",
        description: "Description: Transpose a matrix.",
    },
];

impl CommandKind {
    pub fn descriptor(self) -> &'static CommandDescriptor {
        let index = match self {
            CommandKind::Stop => 0,
            CommandKind::ReadMat => 1,
            CommandKind::PrintMat => 2,
            CommandKind::AddMat => 3,
            CommandKind::SubMat => 4,
            CommandKind::MulMat => 5,
            CommandKind::MulScalar => 6,
            CommandKind::TransMat => 7,
        };
        &COMMANDS[index]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn arity(self) -> usize {
        self.descriptor().arity
    }

    /// Does the command take a list of numbers after its matrix names?
    pub fn takes_values(self) -> bool {
        self == CommandKind::ReadMat
    }
}

/// Find a command by its exact, case-sensitive name.
pub fn lookup(name: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS.iter().find(|d| d.name == name)
}

/// Read the leading command token of a line.
///
/// On success the cursor sits past the command and any whitespace after it.
/// A command immediately followed by a comma is an [`ParseError::IllegalComma`].
pub(crate) fn read_command(cursor: &mut Cursor) -> Result<&'static CommandDescriptor, ParseError> {
    cursor.skip_whitespace();
    let token = cursor.read_token();
    let descriptor = lookup(&token).ok_or(ParseError::UndefinedCommandName)?;

    cursor.skip_whitespace();
    if cursor.peek_char() == Some(',') {
        return Err(ParseError::IllegalComma);
    }
    Ok(descriptor)
}
