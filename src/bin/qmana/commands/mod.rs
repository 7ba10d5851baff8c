mod check;
mod run;

use check::run_check;
use run::run_procedure;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Run(args) => run_procedure(args, ctx),
        Command::Check(args) => run_check(args, ctx),
    }
}
