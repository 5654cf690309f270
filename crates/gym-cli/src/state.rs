//! JSON state file
//!
//! The whole engine state is loaded into the in-memory repositories at
//! startup and written back after the command ran. A run holds an exclusive
//! lock on `<state>.lock` from load to exit, so concurrent runs apply one
//! after the other instead of overwriting each other.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use fs2::FileExt;
use gym_membership::infrastructure::{
    CounterSnapshot, InMemoryBenefitRepository, InMemoryMembershipRepository,
    InMemoryPlanRepository, LoggingEventPublisher, OrganizationCounters,
};
use gym_membership::ports::outbound::{BenefitRepository, PlanRepository};
use gym_membership::{
    BenefitCatalog, EnrollmentService, LifecycleEngine, MembershipPlan, MembershipRecord,
    MembershipService, RedemptionService,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateFile {
    pub plans: Vec<MembershipPlan>,
    pub benefits: BenefitCatalog,
    pub records: Vec<MembershipRecord>,
    pub counters: CounterSnapshot,
}

impl StateFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no state file yet");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Write to a sibling temp file, then rename over the target
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))
    }
}

/// Sibling lock file of a state file
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Take the exclusive lock, waiting for any other run to finish.
/// Released when the returned file is closed.
fn lock_state(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let lock_path = lock_path(path);
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .with_context(|| format!("opening {}", lock_path.display()))?;

    if file.try_lock_exclusive().is_err() {
        info!(path = %path.display(), "state file in use, waiting");
        file.lock_exclusive()
            .with_context(|| format!("locking {}", lock_path.display()))?;
    }
    debug!(path = %lock_path.display(), "state lock acquired");
    Ok(file)
}

/// Repositories and services wired over one loaded state file
pub struct Workspace {
    pub plans: Arc<InMemoryPlanRepository>,
    pub benefits: Arc<InMemoryBenefitRepository>,
    pub records: Arc<InMemoryMembershipRepository>,
    pub counters: Arc<OrganizationCounters>,
    pub enrollment: EnrollmentService,
    pub membership: MembershipService,
    pub redemption: RedemptionService,
    _lock: Option<File>,
}

impl Workspace {
    /// Lock the state file and load it. The lock is held until the
    /// workspace is dropped, so persist before dropping.
    pub fn open(path: &Path, config: &Config) -> anyhow::Result<Self> {
        let lock = lock_state(path)?;
        let mut ws = Self::from_state(StateFile::load(path)?, config);
        ws._lock = Some(lock);
        Ok(ws)
    }

    /// Workspace over an in-memory state, without any file lock
    pub fn from_state(state: StateFile, config: &Config) -> Self {
        let plans = Arc::new(InMemoryPlanRepository::with_plans(state.plans));
        let benefits = Arc::new(InMemoryBenefitRepository::with_catalog(state.benefits));
        let records = Arc::new(InMemoryMembershipRepository::with_records(state.records));
        let counters = Arc::new(OrganizationCounters::from_snapshot(state.counters));
        let events = Arc::new(LoggingEventPublisher);
        let engine = LifecycleEngine::new(config.engine.clone());

        Self {
            enrollment: EnrollmentService::new(
                plans.clone(),
                benefits.clone(),
                records.clone(),
                counters.clone(),
                events.clone(),
                engine.clone(),
            ),
            membership: MembershipService::new(records.clone(), events.clone(), engine),
            redemption: RedemptionService::new(plans.clone(), benefits.clone(), records.clone(), events),
            plans,
            benefits,
            records,
            counters,
            _lock: None,
        }
    }

    pub async fn snapshot(&self) -> anyhow::Result<StateFile> {
        Ok(StateFile {
            plans: self.plans.list().await?,
            benefits: self.benefits.catalog().await?,
            records: self.records.snapshot(),
            counters: self.counters.snapshot(),
        })
    }

    pub async fn persist(&self, path: &Path) -> anyhow::Result<()> {
        self.snapshot().await?.save(path)
    }
}
