//! Package operations: install, remove, commit, history import

use tracing::{debug, info};

use crate::error::ImsResult;
use crate::executor::CommandRunner;
use crate::import::{AptHistoryEntry, HistoryAction};
use crate::resolver::{resolve, Operation, ResolvedCommand};
use crate::types::{Event, InstallState, PackageRecord};

use super::{CommitOutcome, Ims, InstallOutcome, RemoveOutcome};

/// Package manager ID that apt history entries are recorded under
const APT_MANAGER: &str = "apt";

/// Run `command`'s argv; only a zero exit status counts as success
fn execute<R: CommandRunner>(ims: &Ims<'_, R>, command: &ResolvedCommand) -> ImsResult<()> {
    let argv = command.argv();
    ims.runner.run(&argv)?.into_result(&argv)?;
    Ok(())
}

/// Install a package and record it
///
/// Nothing is logged unless the package manager exits successfully.
pub fn install<R: CommandRunner>(
    ims: &mut Ims<'_, R>,
    spec: &str,
    commit_immediately: bool,
) -> ImsResult<InstallOutcome> {
    let command = resolve(ims.config, spec, Operation::Install)?;
    execute(ims, &command)?;

    let state = if commit_immediately {
        InstallState::Committed
    } else {
        InstallState::Uncommitted
    };
    let event = Event::install(&command, state);

    if commit_immediately {
        ims.log.append_committed(event);
        ims.log.save_committed()?;
    } else {
        ims.log.append_uncommitted(event);
        ims.log.save_uncommitted()?;
    }

    info!(package = %command.key(), %state, "Recorded install");
    Ok(InstallOutcome { command, state })
}

/// Remove a package and record it
///
/// A pending install of the same package is cancelled; the removal itself is
/// always appended to the committed log.
pub fn remove<R: CommandRunner>(ims: &mut Ims<'_, R>, spec: &str) -> ImsResult<RemoveOutcome> {
    let command = resolve(ims.config, spec, Operation::Uninstall)?;
    execute(ims, &command)?;

    let key = command.key();
    let cancelled_pending = ims
        .log
        .remove_uncommitted_matching(|event| event.is_install_of(&key))
        .is_some();
    if cancelled_pending {
        ims.log.save_uncommitted()?;
        debug!(package = %key, "Dropped pending install");
    }

    ims.log.append_committed(Event::remove(&command));
    ims.log.save_committed()?;

    info!(package = %key, cancelled_pending, "Recorded remove");
    Ok(RemoveOutcome {
        command,
        cancelled_pending,
    })
}

/// Promote every pending install to the committed log
pub fn commit<R: CommandRunner>(ims: &mut Ims<'_, R>) -> ImsResult<CommitOutcome> {
    if ims.log.uncommitted().is_empty() {
        return Ok(CommitOutcome::NothingToCommit);
    }

    let pending = ims.log.take_uncommitted();
    let count = pending.len();

    for mut event in pending {
        if let Event::Install(record) = &mut event {
            record.state = InstallState::Committed;
        }
        ims.log.append_committed(event);
    }
    ims.log.append_committed(Event::commit(count));

    ims.log.save_committed()?;
    ims.log.save_uncommitted()?;

    info!(count, "Committed pending installs");
    Ok(CommitOutcome::Committed(count))
}

/// Record apt history entries as committed events without running anything
///
/// Entries already present in the committed log (same action, package and
/// date) are skipped, so importing the same file twice is harmless. Events
/// recorded by `install`/`remove` carry their own timestamps and never
/// match an apt entry.
///
/// Imported events are appended after the existing committed log, so a tag
/// recorded before the import does not include them.
/// Returns the number of events added.
pub fn import_apt_history<R: CommandRunner>(
    ims: &mut Ims<'_, R>,
    entries: &[AptHistoryEntry],
) -> ImsResult<usize> {
    let mut added = 0;

    for entry in entries {
        let spec = format!("{}:{}", APT_MANAGER, entry.package);
        let operation = match entry.action {
            HistoryAction::Install => Operation::Install,
            HistoryAction::Remove => Operation::Uninstall,
        };
        let command = resolve(ims.config, &spec, operation)?;

        let record = PackageRecord {
            package_name: command.package.clone(),
            package_manager_name: command.manager.clone(),
            package_manager_command: command.argv(),
            date: entry.date.clone(),
            state: InstallState::Committed,
        };
        let event = match entry.action {
            HistoryAction::Install => Event::Install(record),
            HistoryAction::Remove => Event::Remove(record),
        };

        let duplicate = ims.log.committed().iter().any(|existing| {
            existing.action() == event.action()
                && existing.date() == event.date()
                && existing.package().map(|p| p.key()) == event.package().map(|p| p.key())
        });
        if duplicate {
            continue;
        }

        ims.log.append_committed(event);
        added += 1;
    }

    if added > 0 {
        ims.log.save_committed()?;
    }

    info!(added, total = entries.len(), "Imported apt history");
    Ok(added)
}
