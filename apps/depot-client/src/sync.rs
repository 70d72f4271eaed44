//! Polling synchronization of the uploaded-files listing.
//!
//! On a fixed timer, and only while a bearer credential is held, the
//! controller fetches the listing and republishes it only when it differs
//! from the last published set by full equality. Fetch failures
//! are logged and skipped; the next tick tries again.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::types::RemoteFile;

/// Listing change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// The remote set changed; replace the rendered list wholesale.
    Replaced(Vec<RemoteFile>),
}

/// Compare a freshly fetched set against the last published one and produce
/// a replace event only on change.
fn apply(last: &mut Option<Vec<RemoteFile>>, fresh: Vec<RemoteFile>) -> Option<ListEvent> {
    if last.as_ref() == Some(&fresh) {
        return None;
    }
    *last = Some(fresh.clone());
    Some(ListEvent::Replaced(fresh))
}

/// Run the polling loop until the event receiver is dropped.
pub fn spawn_list_sync(
    api: ApiClient,
    interval: Duration,
    events: mpsc::UnboundedSender<ListEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last: Option<Vec<RemoteFile>> = None;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            // Not logged in yet: skip the network call entirely.
            if !api.session().is_authenticated() {
                continue;
            }

            match api.list_files().await {
                Ok(files) => {
                    if let Some(event) = apply(&mut last, files) {
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                }
                Err(err) => {
                    tracing::debug!(error = %err, "listing refresh failed");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> RemoteFile {
        RemoteFile {
            filename: name.to_string(),
            uploaded_by: "alice".to_string(),
            uploaded_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn first_fetch_always_publishes() {
        let mut last = None;
        let event = apply(&mut last, vec![file("a.txt")]);
        assert_eq!(event, Some(ListEvent::Replaced(vec![file("a.txt")])));
    }

    #[test]
    fn unchanged_set_publishes_nothing() {
        let mut last = Some(vec![file("a.txt")]);
        assert_eq!(apply(&mut last, vec![file("a.txt")]), None);
    }

    #[test]
    fn changed_set_publishes_exactly_one_replace() {
        let mut last = Some(vec![file("a.txt")]);
        let fresh = vec![file("a.txt"), file("b.txt")];
        assert_eq!(
            apply(&mut last, fresh.clone()),
            Some(ListEvent::Replaced(fresh.clone()))
        );
        // And it sticks: the same set again is quiet.
        assert_eq!(apply(&mut last, fresh), None);
    }

    #[test]
    fn equality_is_structural_not_just_length() {
        let mut last = Some(vec![file("a.txt")]);
        let renamed = vec![RemoteFile {
            uploaded_by: "bob".to_string(),
            ..file("a.txt")
        }];
        assert_eq!(
            apply(&mut last, renamed.clone()),
            Some(ListEvent::Replaced(renamed))
        );
    }
}
