use super::dispatcher::RequestDispatcher;
use crate::iam::IamControlPlane;
use std::sync::Arc;
use std::time::SystemTime;
use uuid::Uuid;

/// Shared state behind the HTTP surface
#[derive(Clone)]
pub struct ProxyService {
    pub server_instance_id: Uuid,
    pub started_at: SystemTime,
    pub dispatcher: RequestDispatcher,
}

impl ProxyService {
    pub fn new(iam: Arc<dyn IamControlPlane>) -> Self {
        Self {
            server_instance_id: Uuid::new_v4(),
            started_at: SystemTime::now(),
            dispatcher: RequestDispatcher::new(iam),
        }
    }
}
