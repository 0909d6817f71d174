// SPDX-License-Identifier: GPL-3.0-only

//! ModemManager client: presence tracking and the modem event stream.

use futures::StreamExt;
use futures::stream::Stream;
use futures::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::warn;
use zbus::Connection;
use zbus::zvariant::OwnedObjectPath;

use modem_types::{ModemInfo, ModemState};

use crate::error::WatchError;
use crate::presence::{Action, PresenceTracker};
use crate::proxy::{
    BusDaemonProxy, InterfacesAdded, InterfacesAddedStream, InterfacesRemoved,
    InterfacesRemovedStream, MODEM_INTERFACE, MODEM_MANAGER_SERVICE, ModemObjectManagerProxy,
    ModemProxy, NameOwnerChanged, NameOwnerChangedStream,
};

const UNKNOWN: &str = "unknown";

/// Events observed on the bus, in dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    ServiceAppeared,
    ServiceVanished,
    ModemAdded(ModemInfo),
    ModemRemoved { path: String },
}

pub struct WatchEventStream {
    receiver: mpsc::Receiver<WatchEvent>,
}

pub struct ModemManagerClient {
    connection: Connection,
}

impl ModemManagerClient {
    pub async fn new() -> Result<Self, WatchError> {
        let connection = Connection::system()
            .await
            .map_err(|e| WatchError::ConnectionFailed(e.to_string()))?;
        Ok(Self { connection })
    }

    /// Whether the ModemManager well-known name currently has an owner.
    pub async fn name_has_owner(&self) -> Result<bool, WatchError> {
        let bus = BusDaemonProxy::new(&self.connection).await?;
        Ok(bus.name_has_owner(MODEM_MANAGER_SERVICE).await?)
    }

    /// Object paths of all currently managed modems, sorted by modem index.
    pub async fn list_modem_paths(&self) -> Result<Vec<OwnedObjectPath>, WatchError> {
        let object_manager = ModemObjectManagerProxy::new(&self.connection).await?;
        managed_modem_paths(&object_manager).await
    }

    /// Best-effort snapshot of the modem at `path`.
    pub async fn modem_info(&self, path: &OwnedObjectPath) -> ModemInfo {
        modem_info(&self.connection, path).await
    }

    /// A signal-based event stream for service presence and modem add/remove.
    ///
    /// The current owner of the ModemManager name is evaluated once up front
    /// and fed through the presence tracker as a synthetic initial
    /// transition, so the stream always starts with an availability event.
    /// While the service is present the pump additionally holds
    /// `InterfacesAdded`/`InterfacesRemoved` subscriptions on the root object
    /// manager; they are dropped again when the name loses its owner.
    pub async fn watch(&self) -> Result<WatchEventStream, WatchError> {
        let (sender, receiver) = mpsc::channel(32);

        let bus = BusDaemonProxy::new(&self.connection).await?;
        let owner_changes = bus
            .receive_name_owner_changed_with_args(&[(0, MODEM_MANAGER_SERVICE)])
            .await?;
        let initial_present = bus.name_has_owner(MODEM_MANAGER_SERVICE).await?;

        tokio::spawn(run_pump(
            self.connection.clone(),
            owner_changes,
            initial_present,
            sender,
        ));

        Ok(WatchEventStream { receiver })
    }
}

impl Stream for WatchEventStream {
    type Item = WatchEvent;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Live add/remove signal subscriptions. Dropping this is the unsubscribe.
struct Subscription {
    added: InterfacesAddedStream,
    removed: InterfacesRemovedStream,
}

/// One decoded wakeup of the signal pump.
enum PumpSignal {
    Owner(bool),
    Added(OwnedObjectPath),
    Removed(OwnedObjectPath),
    /// Signal was not for us or failed to parse.
    Skip,
    /// A signal stream ended; the connection is gone.
    Ended,
}

async fn run_pump(
    connection: Connection,
    mut owner_changes: NameOwnerChangedStream,
    initial_present: bool,
    sender: mpsc::Sender<WatchEvent>,
) {
    let object_manager = match ModemObjectManagerProxy::new(&connection).await {
        Ok(proxy) => proxy,
        Err(e) => {
            warn!("Failed to create object manager proxy: {e}");
            return;
        }
    };

    let mut tracker = PresenceTracker::new();
    let mut subscription: Option<Subscription> = None;

    let actions = tracker.owner_changed(initial_present);
    if !apply_actions(&connection, &object_manager, &sender, &mut subscription, actions).await {
        return;
    }

    loop {
        let signal = match subscription.as_mut() {
            Some(streams) => {
                tokio::select! {
                    maybe = owner_changes.next() => owner_signal(maybe),
                    maybe = streams.added.next() => added_signal(maybe),
                    maybe = streams.removed.next() => removed_signal(maybe),
                }
            }
            None => owner_signal(owner_changes.next().await),
        };

        match signal {
            PumpSignal::Owner(present) => {
                let actions = tracker.owner_changed(present);
                if !apply_actions(&connection, &object_manager, &sender, &mut subscription, actions)
                    .await
                {
                    break;
                }
            }
            PumpSignal::Added(path) => {
                let modem = modem_info(&connection, &path).await;
                if sender.send(WatchEvent::ModemAdded(modem)).await.is_err() {
                    warn!("Watch event receiver dropped");
                    break;
                }
            }
            PumpSignal::Removed(path) => {
                let event = WatchEvent::ModemRemoved {
                    path: path.to_string(),
                };
                if sender.send(event).await.is_err() {
                    warn!("Watch event receiver dropped");
                    break;
                }
            }
            PumpSignal::Skip => {}
            PumpSignal::Ended => break,
        }
    }
}

fn owner_signal(maybe: Option<NameOwnerChanged>) -> PumpSignal {
    let Some(signal) = maybe else {
        return PumpSignal::Ended;
    };

    match signal.args() {
        Ok(args) => PumpSignal::Owner(!args.new_owner.is_empty()),
        Err(e) => {
            warn!("Failed to parse NameOwnerChanged signal args: {e}");
            PumpSignal::Skip
        }
    }
}

fn added_signal(maybe: Option<InterfacesAdded>) -> PumpSignal {
    let Some(signal) = maybe else {
        return PumpSignal::Ended;
    };

    match signal.args() {
        Ok(args) => {
            if args.interfaces_and_properties.contains_key(MODEM_INTERFACE) {
                PumpSignal::Added(args.object_path)
            } else {
                PumpSignal::Skip
            }
        }
        Err(e) => {
            warn!("Failed to parse InterfacesAdded signal args: {e}");
            PumpSignal::Skip
        }
    }
}

fn removed_signal(maybe: Option<InterfacesRemoved>) -> PumpSignal {
    let Some(signal) = maybe else {
        return PumpSignal::Ended;
    };

    match signal.args() {
        Ok(args) => {
            if args.interfaces.iter().any(|i| i == MODEM_INTERFACE) {
                PumpSignal::Removed(args.object_path)
            } else {
                PumpSignal::Skip
            }
        }
        Err(e) => {
            warn!("Failed to parse InterfacesRemoved signal args: {e}");
            PumpSignal::Skip
        }
    }
}

/// Interprets presence-transition actions. Returns false when the receiver
/// is gone and the pump should stop.
async fn apply_actions(
    connection: &Connection,
    object_manager: &ModemObjectManagerProxy<'_>,
    sender: &mpsc::Sender<WatchEvent>,
    subscription: &mut Option<Subscription>,
    actions: Vec<Action>,
) -> bool {
    for action in actions {
        match action {
            Action::AnnounceAvailable => {
                if sender.send(WatchEvent::ServiceAppeared).await.is_err() {
                    warn!("Watch event receiver dropped");
                    return false;
                }
            }
            Action::AnnounceUnavailable => {
                if sender.send(WatchEvent::ServiceVanished).await.is_err() {
                    warn!("Watch event receiver dropped");
                    return false;
                }
            }
            Action::Subscribe => match subscribe(object_manager).await {
                Ok(streams) => *subscription = Some(streams),
                Err(e) => warn!("Failed to subscribe to modem signals: {e}"),
            },
            Action::Unsubscribe => {
                *subscription = None;
            }
            Action::EnumerateExisting => match managed_modem_paths(object_manager).await {
                Ok(paths) => {
                    for path in paths {
                        let modem = modem_info(connection, &path).await;
                        if sender.send(WatchEvent::ModemAdded(modem)).await.is_err() {
                            warn!("Watch event receiver dropped");
                            return false;
                        }
                    }
                }
                Err(e) => warn!("Failed to enumerate existing modems: {e}"),
            },
        }
    }
    true
}

async fn subscribe(
    object_manager: &ModemObjectManagerProxy<'_>,
) -> Result<Subscription, WatchError> {
    let added = object_manager.receive_interfaces_added().await?;
    let removed = object_manager.receive_interfaces_removed().await?;
    Ok(Subscription { added, removed })
}

async fn managed_modem_paths(
    object_manager: &ModemObjectManagerProxy<'_>,
) -> Result<Vec<OwnedObjectPath>, WatchError> {
    let managed = object_manager.get_managed_objects().await?;
    let mut paths: Vec<OwnedObjectPath> = managed
        .into_iter()
        .filter(|(_, interfaces)| interfaces.contains_key(MODEM_INTERFACE))
        .map(|(path, _)| path)
        .collect();
    sort_by_modem_index(&mut paths);
    Ok(paths)
}

/// Orders paths by numeric modem index; non-numeric tails sort last,
/// lexicographically.
fn sort_by_modem_index(paths: &mut [OwnedObjectPath]) {
    paths.sort_by_key(|path| {
        let tail = modem_types::modem_index(path.as_str());
        (tail.parse::<u64>().unwrap_or(u64::MAX), path.to_string())
    });
}

async fn modem_info(connection: &Connection, path: &OwnedObjectPath) -> ModemInfo {
    match query_modem(connection, path).await {
        Ok(modem) => modem,
        Err(e) => {
            warn!("Failed to query modem at {path}: {e}");
            ModemInfo {
                path: path.to_string(),
                manufacturer: UNKNOWN.to_string(),
                model: UNKNOWN.to_string(),
                equipment_id: UNKNOWN.to_string(),
                state: ModemState::Unknown,
            }
        }
    }
}

/// Reads the modem's queryable attributes. Individual property failures
/// degrade to placeholders so an added event is never dropped.
async fn query_modem(
    connection: &Connection,
    path: &OwnedObjectPath,
) -> zbus::Result<ModemInfo> {
    let proxy = ModemProxy::builder(connection)
        .path(path.clone())?
        .build()
        .await?;

    Ok(ModemInfo {
        path: path.to_string(),
        manufacturer: proxy
            .manufacturer()
            .await
            .unwrap_or_else(|_| UNKNOWN.to_string()),
        model: proxy.model().await.unwrap_or_else(|_| UNKNOWN.to_string()),
        equipment_id: proxy
            .equipment_identifier()
            .await
            .unwrap_or_else(|_| UNKNOWN.to_string()),
        state: proxy
            .state()
            .await
            .map(ModemState::from_raw)
            .unwrap_or(ModemState::Unknown),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> OwnedObjectPath {
        OwnedObjectPath::try_from(s).unwrap()
    }

    #[test]
    fn modem_paths_sort_numerically_not_lexicographically() {
        let mut paths = vec![
            path("/org/freedesktop/ModemManager1/Modem/10"),
            path("/org/freedesktop/ModemManager1/Modem/2"),
            path("/org/freedesktop/ModemManager1/Modem/1"),
        ];
        sort_by_modem_index(&mut paths);
        let tails: Vec<&str> = paths
            .iter()
            .map(|p| modem_types::modem_index(p.as_str()))
            .collect();
        assert_eq!(tails, vec!["1", "2", "10"]);
    }

    #[test]
    fn non_numeric_tails_sort_last() {
        let mut paths = vec![
            path("/org/freedesktop/ModemManager1/Modem/odd"),
            path("/org/freedesktop/ModemManager1/Modem/0"),
        ];
        sort_by_modem_index(&mut paths);
        assert_eq!(modem_types::modem_index(paths[0].as_str()), "0");
        assert_eq!(modem_types::modem_index(paths[1].as_str()), "odd");
    }
}
