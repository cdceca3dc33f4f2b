use std::ops::Deref;

use crate::application::context::ServiceContext;

/// Router state: the assembled services, cheap to clone per request.
#[derive(Clone)]
pub struct ApiState {
    pub services: ServiceContext,
}

impl ApiState {
    pub fn new(services: ServiceContext) -> Self {
        Self { services }
    }
}

impl Deref for ApiState {
    type Target = ServiceContext;

    fn deref(&self) -> &Self::Target {
        &self.services
    }
}
