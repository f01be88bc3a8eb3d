//! Tag operations

use tracing::info;

use crate::error::ImsResult;
use crate::executor::CommandRunner;
use crate::types::Event;

use super::{Ims, TagOutcome};

/// Append a tag to the committed log; tag names are unique
pub fn add_tag<R: CommandRunner>(ims: &mut Ims<'_, R>, tag_name: &str) -> ImsResult<TagOutcome> {
    if ims.log.committed().iter().any(|e| e.is_tag_named(tag_name)) {
        return Ok(TagOutcome::AlreadyExists);
    }

    ims.log.append_committed(Event::tag(tag_name));
    ims.log.save_committed()?;

    info!(tag = tag_name, "Added tag");
    Ok(TagOutcome::Added)
}

/// Remove the first tag with this name from the committed log
pub fn remove_tag<R: CommandRunner>(ims: &mut Ims<'_, R>, tag_name: &str) -> ImsResult<TagOutcome> {
    if ims
        .log
        .remove_committed_matching(|e| e.is_tag_named(tag_name))
        .is_none()
    {
        return Ok(TagOutcome::NotFound);
    }

    ims.log.save_committed()?;

    info!(tag = tag_name, "Removed tag");
    Ok(TagOutcome::Removed)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::Config;
    use crate::event_store::{EventLog, EventStoreConfig};
    use crate::executor::SystemRunner;
    use crate::types::Action;

    fn tag_count(log: &EventLog, name: &str) -> usize {
        log.committed().iter().filter(|e| e.is_tag_named(name)).count()
    }

    #[test]
    fn test_duplicate_tag_is_rejected() {
        let config = Config::default();
        let dir = TempDir::new().unwrap();
        let log = EventLog::load(EventStoreConfig::new(dir.path())).unwrap();
        let mut ims = Ims::with_log(&config, log, SystemRunner);

        assert_eq!(ims.add_tag("v1").unwrap(), TagOutcome::Added);
        assert_eq!(ims.add_tag("v1").unwrap(), TagOutcome::AlreadyExists);

        assert_eq!(tag_count(&ims.log, "v1"), 1);
        let reloaded = EventLog::load(EventStoreConfig::new(dir.path())).unwrap();
        assert_eq!(tag_count(&reloaded, "v1"), 1);
    }

    #[test]
    fn test_remove_tag() {
        let config = Config::default();
        let dir = TempDir::new().unwrap();
        let log = EventLog::load(EventStoreConfig::new(dir.path())).unwrap();
        let mut ims = Ims::with_log(&config, log, SystemRunner);
        ims.add_tag("v1").unwrap();
        ims.add_tag("v2").unwrap();

        assert_eq!(ims.remove_tag("v1").unwrap(), TagOutcome::Removed);
        assert_eq!(ims.remove_tag("v1").unwrap(), TagOutcome::NotFound);

        let committed = ims.log.committed();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].action(), Action::Tag);
        assert!(committed[0].is_tag_named("v2"));
    }

    #[test]
    fn test_tag_can_be_reused_after_removal() {
        let config = Config::default();
        let dir = TempDir::new().unwrap();
        let log = EventLog::load(EventStoreConfig::new(dir.path())).unwrap();
        let mut ims = Ims::with_log(&config, log, SystemRunner);

        ims.add_tag("release").unwrap();
        ims.remove_tag("release").unwrap();

        assert_eq!(ims.add_tag("release").unwrap(), TagOutcome::Added);
    }
}
