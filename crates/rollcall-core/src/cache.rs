//! Query-result cache in front of any [`AttendanceStore`].
//!
//! Reads are keyed by what was asked for (entity kind plus filter). Writes go
//! straight to the inner store and, once they succeed, drop every cached
//! entry they could have made stale.
//!
//! Each scope carries a generation counter that invalidation bumps. A read
//! notes the generation before it reaches the inner store and only caches its
//! result if the generation is unchanged, so a fetch that raced a write never
//! lands in the cache. Entries also expire after [`CacheConfig::ttl_secs`],
//! and the map never holds more than [`CacheConfig::max_entries`].

use std::{
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
  time::{Duration, Instant},
};

use dashmap::DashMap;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::{
  attendance::{AttendanceBatch, AttendanceFilter, AttendanceRecord, AttendanceRow},
  store::AttendanceStore,
  student::{Student, StudentOrder, ValidStudent},
  subject::{NewSubject, Subject},
};

// ─── Keys and scopes ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
  Students(StudentOrder),
  Subjects,
  Attendance(AttendanceFilter),
}

/// A family of cache entries to drop together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
  Students,
  Subjects,
  Attendance,
  All,
}

impl CacheScope {
  fn covers(self, key: &CacheKey) -> bool {
    matches!(
      (self, key),
      (Self::All, _)
        | (Self::Students, CacheKey::Students(_))
        | (Self::Subjects, CacheKey::Subjects)
        | (Self::Attendance, CacheKey::Attendance(_))
    )
  }
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// Expiry and size bounds for a [`CachedStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Seconds an entry may be served after it was fetched. `0` disables
  /// caching of results altogether.
  pub ttl_secs:    u64,
  /// Upper bound on cached entries; the oldest is evicted to make room.
  pub max_entries: usize,
}

impl Default for CacheConfig {
  fn default() -> Self { Self { ttl_secs: 60, max_entries: 1024 } }
}

impl CacheConfig {
  fn ttl(&self) -> Duration { Duration::from_secs(self.ttl_secs) }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Cached {
  Students(Vec<Student>),
  Subjects(Vec<Subject>),
  Attendance(Vec<AttendanceRow>),
}

#[derive(Debug)]
struct Entry {
  value:      Cached,
  fetched_at: Instant,
}

#[derive(Debug, Default)]
struct Generations {
  students:   AtomicU64,
  subjects:   AtomicU64,
  attendance: AtomicU64,
}

impl Generations {
  fn slot(&self, key: &CacheKey) -> &AtomicU64 {
    match key {
      CacheKey::Students(_) => &self.students,
      CacheKey::Subjects => &self.subjects,
      CacheKey::Attendance(_) => &self.attendance,
    }
  }

  fn current(&self, key: &CacheKey) -> u64 { self.slot(key).load(Ordering::SeqCst) }

  fn bump(&self, scope: CacheScope) {
    let slots: &[&AtomicU64] = match scope {
      CacheScope::Students => &[&self.students],
      CacheScope::Subjects => &[&self.subjects],
      CacheScope::Attendance => &[&self.attendance],
      CacheScope::All => &[&self.students, &self.subjects, &self.attendance],
    };
    for slot in slots {
      slot.fetch_add(1, Ordering::SeqCst);
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Caching decorator. Cloning is cheap and clones share one cache.
#[derive(Clone)]
pub struct CachedStore<S> {
  inner:       S,
  config:      CacheConfig,
  cache:       Arc<DashMap<CacheKey, Entry>>,
  generations: Arc<Generations>,
}

impl<S: AttendanceStore> CachedStore<S> {
  pub fn new(inner: S) -> Self { Self::with_config(inner, CacheConfig::default()) }

  pub fn with_config(inner: S, config: CacheConfig) -> Self {
    Self {
      inner,
      config,
      cache: Arc::new(DashMap::new()),
      generations: Arc::new(Generations::default()),
    }
  }

  pub fn inner(&self) -> &S { &self.inner }

  /// Drop every cached entry within `scope`. Reads already in flight for
  /// that scope will not cache what they fetched.
  pub fn invalidate(&self, scope: CacheScope) {
    // Bump first: a reader holding a shard lock either sees the new
    // generation or inserts before `retain` takes that shard.
    self.generations.bump(scope);
    self.cache.retain(|key, _| !scope.covers(key));
    debug!(?scope, "cache invalidated");
  }

  pub fn len(&self) -> usize { self.cache.len() }

  pub fn is_empty(&self) -> bool { self.cache.is_empty() }

  fn lookup(&self, key: &CacheKey) -> Option<Cached> {
    let ttl = self.config.ttl();
    {
      let entry = self.cache.get(key)?;
      if entry.fetched_at.elapsed() < ttl {
        debug!(?key, "cache hit");
        return Some(entry.value.clone());
      }
    }
    self.cache.remove_if(key, |_, e| e.fetched_at.elapsed() >= ttl);
    None
  }

  /// Cache `value` under `key` unless its scope was invalidated since `seen`
  /// was read.
  fn store(&self, key: CacheKey, value: Cached, seen: u64) {
    if self.config.ttl_secs == 0 || self.config.max_entries == 0 {
      return;
    }
    if self.cache.len() >= self.config.max_entries && !self.cache.contains_key(&key) {
      self.evict();
    }

    let slot = self.cache.entry(key);
    if self.generations.current(slot.key()) != seen {
      debug!(key = ?slot.key(), "discarding result fetched before invalidation");
      return;
    }
    slot.insert(Entry { value, fetched_at: Instant::now() });
  }

  /// Drop expired entries, then the oldest ones until there is room.
  fn evict(&self) {
    let ttl = self.config.ttl();
    self.cache.retain(|_, e| e.fetched_at.elapsed() < ttl);

    while self.cache.len() >= self.config.max_entries {
      let oldest = self
        .cache
        .iter()
        .min_by_key(|e| e.fetched_at)
        .map(|e| e.key().clone());
      match oldest {
        Some(key) => {
          self.cache.remove(&key);
          debug!(?key, "cache entry evicted");
        }
        None => break,
      }
    }
  }
}

impl<S: AttendanceStore> AttendanceStore for CachedStore<S> {
  type Error = S::Error;

  async fn list_students(&self, order: StudentOrder) -> Result<Vec<Student>, S::Error> {
    let key = CacheKey::Students(order);
    if let Some(Cached::Students(students)) = self.lookup(&key) {
      return Ok(students);
    }
    let seen = self.generations.current(&key);
    let students = self.inner.list_students(order).await?;
    self.store(key, Cached::Students(students.clone()), seen);
    Ok(students)
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<Student>, S::Error> {
    self.inner.get_student(id).await
  }

  async fn register_student(&self, input: ValidStudent) -> Result<Student, S::Error> {
    let student = self.inner.register_student(input).await?;
    self.invalidate(CacheScope::Students);
    Ok(student)
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>, S::Error> {
    let key = CacheKey::Subjects;
    if let Some(Cached::Subjects(subjects)) = self.lookup(&key) {
      return Ok(subjects);
    }
    let seen = self.generations.current(&key);
    let subjects = self.inner.list_subjects().await?;
    self.store(key, Cached::Subjects(subjects.clone()), seen);
    Ok(subjects)
  }

  async fn add_subject(&self, input: NewSubject) -> Result<Subject, S::Error> {
    let subject = self.inner.add_subject(input).await?;
    self.invalidate(CacheScope::Subjects);
    Ok(subject)
  }

  async fn list_attendance(
    &self,
    filter: &AttendanceFilter,
  ) -> Result<Vec<AttendanceRow>, S::Error> {
    let key = CacheKey::Attendance(filter.clone());
    if let Some(Cached::Attendance(rows)) = self.lookup(&key) {
      return Ok(rows);
    }
    let seen = self.generations.current(&key);
    let rows = self.inner.list_attendance(filter).await?;
    self.store(key, Cached::Attendance(rows.clone()), seen);
    Ok(rows)
  }

  async fn replace_attendance(
    &self,
    batch: AttendanceBatch,
  ) -> Result<Vec<AttendanceRecord>, S::Error> {
    let written = self.inner.replace_attendance(batch).await?;
    self.invalidate(CacheScope::Attendance);
    Ok(written)
  }
}
