use photopress_catalog::Repository;
use photopress_rendition::Policy;
use photopress_storage::{BackendHandle, LocationMap};

/// Everything a run needs, shared by reference across candidates.
///
/// Dry runs are decided by the catalog [`Repository`]: a dry-run repository
/// never writes, and the pipeline never uploads or renders on its behalf.
pub struct Context {
    pub(crate) backend: BackendHandle,
    pub(crate) catalog: Repository,
    pub(crate) locations: LocationMap,
    pub(crate) policy: Policy,
}

impl Context {
    pub fn new(backend: BackendHandle, catalog: Repository, locations: LocationMap) -> Self {
        Self { backend, catalog, locations, policy: Policy::default() }
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.catalog.is_dry_run()
    }
}
