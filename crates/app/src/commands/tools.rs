//! `tavern code ...` and `tavern roll`

use std::io::Write;

use tavern_core::room_code::{self, RoomCode};
use tavern_core::{DiceExpr, Result, RoomKind};

use crate::cli::CodeCommand;
use crate::state::rng;

pub fn code(command: CodeCommand, out: &mut dyn Write) -> Result<()> {
    match command {
        CodeCommand::Parse { code } => match RoomCode::parse(code.trim()) {
            Some(parsed) => {
                writeln!(out, "{} is a {} code", parsed, parsed.kind())?;
                writeln!(out, "Formatted: {}", parsed.formatted())?;
            }
            None => writeln!(out, "'{}' is not a valid room code", code.trim())?,
        },
        CodeCommand::Generate { kind, seed } => {
            let code = room_code::generate(RoomKind::from(kind), &mut rng(seed));
            writeln!(out, "{}", code)?;
        }
    }
    Ok(())
}

pub fn roll(notation: &str, seed: Option<u64>, out: &mut dyn Write) -> Result<()> {
    let expr = DiceExpr::parse(notation)?;
    let roll = expr.roll(&mut rng(seed));

    let dice: Vec<String> = roll.rolls.iter().map(|r| r.to_string()).collect();
    write!(out, "{}: [{}]", expr, dice.join(", "))?;
    if expr.modifier != 0 {
        write!(out, " {:+}", expr.modifier)?;
    }
    writeln!(out, " = {}", roll.total)?;
    Ok(())
}
