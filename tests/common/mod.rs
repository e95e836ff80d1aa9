//! Shared utilities for integration testing.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;

use haproxy_autoscale::cloud::{AutoscalingApi, AutoscalingInstance, Instance, LifecycleState};
use haproxy_autoscale::{AutoscaleError, AutoscaleResult};

/// Start a mock admin socket that answers every connection with `response`
/// and closes. Returns the commands it received.
pub fn start_mock_admin_socket(path: &Path, response: &'static str) -> Arc<Mutex<Vec<String>>> {
    let listener = UnixListener::bind(path).unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let log = log.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 1024];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        log.lock().unwrap().push(String::from_utf8_lossy(&buf[..n]).into_owned());
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    received
}

/// A recorded `set_instance_unhealthy` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCall {
    pub region: String,
    pub instance_id: String,
    pub respect_grace_period: bool,
}

/// In-memory autoscaling provider.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeAutoscaling {
    pub members: Vec<AutoscalingInstance>,
    pub addresses: Vec<Instance>,
    pub fail_health_for: Option<String>,
    pub health_calls: Mutex<Vec<HealthCall>>,
    pub describe_calls: Mutex<usize>,
}

#[allow(dead_code)]
impl FakeAutoscaling {
    pub fn with_instance(mut self, id: &str, group: &str, ip: Option<&str>) -> Self {
        self.members.push(AutoscalingInstance {
            instance_id: id.to_string(),
            group_name: group.to_string(),
            lifecycle_state: LifecycleState::InService,
        });
        self.addresses.push(Instance {
            instance_id: id.to_string(),
            private_ip: ip.map(str::to_string),
        });
        self
    }

    pub fn marked(&self) -> Vec<String> {
        self.health_calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.instance_id.clone())
            .collect()
    }
}

#[async_trait]
impl AutoscalingApi for FakeAutoscaling {
    async fn describe_autoscaling_instances(&self, _region: &str) -> AutoscaleResult<Vec<AutoscalingInstance>> {
        *self.describe_calls.lock().unwrap() += 1;
        Ok(self.members.clone())
    }

    async fn private_addresses(&self, _region: &str, instance_ids: &[String]) -> AutoscaleResult<Vec<Instance>> {
        Ok(self
            .addresses
            .iter()
            .filter(|i| instance_ids.contains(&i.instance_id))
            .cloned()
            .collect())
    }

    async fn set_instance_unhealthy(
        &self,
        region: &str,
        instance_id: &str,
        respect_grace_period: bool,
    ) -> AutoscaleResult<()> {
        if self.fail_health_for.as_deref() == Some(instance_id) {
            return Err(AutoscaleError::CloudApi(format!("throttled on {instance_id}")));
        }
        self.health_calls.lock().unwrap().push(HealthCall {
            region: region.to_string(),
            instance_id: instance_id.to_string(),
            respect_grace_period,
        });
        Ok(())
    }
}
