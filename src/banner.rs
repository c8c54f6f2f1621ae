use crate::command::COMMANDS;
use crate::registry::Registry;
use std::io::{self, Write};

/// Print the welcome text: the matrix names and every command with its syntax.
pub fn write_intro(out: &mut dyn Write, registry: &Registry) -> io::Result<()> {
    writeln!(out, "Welcome to Matrix Calculator Application")?;
    writeln!(out, "=======================================\n")?;
    writeln!(out, "This application allows you to perform various matrix operations.\n")?;

    writeln!(out, "Below are the available matrix Names:")?;
    for profile in registry.profiles() {
        write!(out, "{}: {}\t", profile.slot().index() + 1, profile.name())?;
    }
    writeln!(out, "\n")?;

    writeln!(out, "Available Commands:")?;
    writeln!(out, "-------------------")?;
    for command in &COMMANDS {
        writeln!(out, "\n[{}]", command.name)?;
        writeln!(out, "{}", command.syntax)?;
        writeln!(out, "{}", command.description)?;
    }
    writeln!(out, "\n=======================================")?;
    writeln!(out, "Please enter your instructions:")
}

/// Print the goodbye text shown after a clean `stop`.
pub fn write_outro(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "\nThank you for using the Matrix Calculator Application!")?;
    writeln!(out, "If you have any feedback or suggestions, please let us know.")?;
    writeln!(out, "Goodbye and have a great day!\n")
}
