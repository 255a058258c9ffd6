//! Setup routine — one switch adapter per switch-type device client.

use std::sync::Arc;
use std::time::Duration;

use cozyhub_domain::device::DeviceKind;

use crate::ports::{Clock, DeviceClient};
use crate::services::switch_adapter::SwitchAdapter;

/// Build adapters for every client whose type code marks it as a switch.
///
/// Clients of any other kind are skipped. Each new adapter performs its
/// initial refresh before being returned, so the host starts from the
/// device's actual state when it is reachable.
#[tracing::instrument(skip(clients, clock))]
pub async fn setup_switches<C, K, I>(
    clients: I,
    clock: K,
    update_interval: Duration,
) -> Vec<SwitchAdapter<C, K>>
where
    C: DeviceClient,
    K: Clock + Clone,
    I: IntoIterator<Item = Arc<C>>,
{
    let mut adapters = Vec::new();

    for client in clients {
        let identity = client.identity();
        match identity.kind() {
            DeviceKind::Switch => {
                let mut adapter = SwitchAdapter::with_interval(client, clock.clone(), update_interval);
                adapter.refresh().await;
                adapters.push(adapter);
            }
            kind => {
                tracing::debug!(
                    device = %identity.id,
                    type_code = %identity.type_code,
                    ?kind,
                    "skipping non-switch device"
                );
            }
        }
    }

    tracing::info!(count = adapters.len(), "switch setup complete");
    adapters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::SwitchEntity;
    use crate::test_support::{FakeClient, ManualClock, QueryReply};
    use serde_json::json;

    #[tokio::test]
    async fn should_create_adapter_per_switch_client() {
        let clients = vec![
            Arc::new(FakeClient::switch("plug-0001")),
            Arc::new(FakeClient::with_type("bulb-0002", "01")),
            Arc::new(FakeClient::switch("plug-0003")),
        ];

        let adapters = setup_switches(clients, ManualClock::default(), Duration::from_secs(30)).await;

        let ids: Vec<&str> = adapters.iter().map(|a| a.unique_id().as_str()).collect();
        assert_eq!(ids, vec!["plug-0001", "plug-0003"]);
    }

    #[tokio::test]
    async fn should_return_empty_when_no_switch_clients() {
        let clients = vec![Arc::new(FakeClient::with_type("bulb-0002", "01"))];
        let adapters = setup_switches(clients, ManualClock::default(), Duration::from_secs(30)).await;
        assert!(adapters.is_empty());
    }

    #[tokio::test]
    async fn should_refresh_each_adapter_once_during_setup() {
        let client = Arc::new(FakeClient::switch("plug-0001"));
        client.push_state(json!({"1": 255}));

        let adapters = setup_switches(
            vec![Arc::clone(&client)],
            ManualClock::default(),
            Duration::from_secs(30),
        )
        .await;

        assert_eq!(client.query_count(), 1);
        let snapshot = adapters[0].snapshot();
        assert!(snapshot.is_on);
        assert!(snapshot.available);
    }

    #[tokio::test]
    async fn should_keep_unreachable_switch_as_unavailable() {
        let client = Arc::new(FakeClient::switch("plug-0001"));
        client.push_query(QueryReply::Fault);

        let adapters = setup_switches(
            vec![Arc::clone(&client)],
            ManualClock::default(),
            Duration::from_secs(30),
        )
        .await;

        assert_eq!(adapters.len(), 1);
        assert!(!adapters[0].is_available());
    }
}
