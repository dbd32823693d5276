//! `stratus plan`: Show which components a configuration realizes.

use clap::Args;
use serde_json::json;
use stratus_compose::result::Slot;
use stratus_compose::root::CompositionRoot;

use super::StackArgs;
use crate::output;

/// Arguments for the `plan` subcommand.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Print the plan as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `plan` command.
///
/// Runs a composition pass and prints each component in instantiation
/// order, with its identifiers or the reason it was omitted.
///
/// # Errors
///
/// Returns an error if the configuration cannot be resolved or
/// composition fails.
pub fn execute(stack: &StackArgs, args: PlanArgs) -> anyhow::Result<()> {
    let bundle = stack.bundle()?;
    let root = CompositionRoot::new(stack.settings());
    let result = root.compose(&bundle)?;
    let stack_name = &root.settings().stack_name;

    if args.json {
        let plan = json!({
            "stack": stack_name,
            "order": result.order(),
            "slots": result.slots(),
            "diagnostics": result.diagnostics(),
            "resources": result.manifest().len(),
        });
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("{}", output::heading(&format!("Composition Plan for: {stack_name}")));
    println!();

    for kind in result.order() {
        let Some(slot) = result.slot(*kind) else {
            continue;
        };
        println!("  {} {kind}", output::slot_marker(slot));
        match slot {
            Slot::Realized { identifiers } => {
                for line in output::identifier_lines(identifiers) {
                    println!("      {line}");
                }
            }
            Slot::Absent { reason } => println!("      omitted: {reason}"),
        }
    }

    let realized = result.slots().values().filter(|s| s.is_realized()).count();
    println!();
    println!(
        "  {realized} of {} component(s) realized, {} resource(s) declared.",
        result.order().len(),
        result.manifest().len()
    );

    if !result.diagnostics().is_empty() {
        println!();
        println!("  Diagnostics:");
        for diagnostic in result.diagnostics() {
            println!("    {diagnostic}");
        }
    }

    Ok(())
}
