/// Identity of whoever drives the current operation.
///
/// One instance per operation (request, job, unit of work). The
/// coordinator only reads it; `actor` is copied into every entry built
/// while it is in scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorContext {
    pub actor: Option<String>,
    pub actor_id: Option<String>,
    pub correlation_id: Option<String>,
}

impl ActorContext {
    /// Context with no identity set. Entries built under it carry no actor.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_actor_id(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}
