//! In-memory directory for tests and offline use.
//!
//! Entries are matched by exact filter string: each entry carries the list
//! of filters it answers to. Group membership is the one derived relation.
//! A group answers the "groups of member" filter for each DN in its `member`
//! attribute, and a member answers the "members of group" filter for every
//! group listing it. Writes to `member` therefore show up in later lookups.
//!
//! Each test builds its own [`FixtureDirectory`]; there is no shared state.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::capability::DirectoryCapability;
use crate::entry::{Attribute, Entry};
use crate::error::{DirectoryError, DirectoryResult};
use crate::filter::render_escaped;
use crate::search::{PagingState, SearchPage, SearchSpec};

/// Default filter selecting the groups that list a member DN.
pub const DEFAULT_GROUPS_OF_MEMBER: &str = "(&(objectClass=group)(member={}))";

/// Default filter selecting the members of a group DN.
pub const DEFAULT_MEMBERS_OF_GROUP: &str = "(&(objectCategory=person)(memberOf={}))";

/// Bind DN accepted by [`FixtureDirectory::company`].
pub const FIXTURE_BIND_DN: &str = "validUser";

/// Password accepted by [`FixtureDirectory::company`].
pub const FIXTURE_BIND_PASSWORD: &str = "validPass";

const MEMBER_ATTRIBUTE: &str = "member";

/// How a fixture entry misbehaves when a search or write touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Behaves normally.
    #[default]
    None,
    /// Fails with a protocol error every time.
    Protocol,
    /// Fails with a connection error the first time only.
    TransientOnce,
    /// Fails with a connection error every time.
    Transient,
}

/// Counts of calls received by the fixture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// Bind calls, successful or not.
    pub binds: usize,
    /// Unbind calls.
    pub unbinds: usize,
    /// Search calls, one per page.
    pub searches: usize,
    /// Add calls.
    pub adds: usize,
    /// Modify calls.
    pub modifies: usize,
    /// ModifyDN calls.
    pub modify_dns: usize,
}

impl CallCounts {
    /// Total number of calls of any kind.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.binds + self.unbinds + self.searches + self.adds + self.modifies + self.modify_dns
    }

    /// Number of write calls.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.adds + self.modifies + self.modify_dns
    }
}

/// A modify call accepted by the fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedModify {
    /// Target DN.
    pub dn: String,
    /// Replacements as sent.
    pub replacements: Vec<Attribute>,
}

#[derive(Debug, Clone)]
struct FixtureEntry {
    entry: Entry,
    filters: Vec<String>,
    failure: FailureMode,
    failed_once: bool,
}

impl FixtureEntry {
    /// Applies the failure mode, consuming a one-shot failure.
    fn trip(&mut self) -> DirectoryResult<()> {
        match self.failure {
            FailureMode::None => Ok(()),
            FailureMode::Protocol => Err(DirectoryError::protocol(
                1,
                format!("operations error on {}", self.entry.dn),
            )),
            FailureMode::TransientOnce if !self.failed_once => {
                self.failed_once = true;
                Err(DirectoryError::connection("connection reset by fixture"))
            }
            FailureMode::TransientOnce => Ok(()),
            FailureMode::Transient => Err(DirectoryError::connection("fixture server down")),
        }
    }

    fn is_listed_in(&self, group: &Entry) -> bool {
        group
            .values(MEMBER_ATTRIBUTE)
            .iter()
            .any(|m| m.eq_ignore_ascii_case(&self.entry.dn))
    }
}

#[derive(Debug, Default)]
struct FixtureState {
    entries: Vec<FixtureEntry>,
    bound: bool,
    unreachable: bool,
    calls: CallCounts,
    modifications: Vec<RecordedModify>,
}

/// Directory backed by an owned, in-memory entry table.
#[derive(Debug)]
pub struct FixtureDirectory {
    bind_dn: String,
    bind_password: String,
    groups_of_member: String,
    members_of_group: String,
    endless_paging: bool,
    state: Mutex<FixtureState>,
}

impl Default for FixtureDirectory {
    fn default() -> Self {
        Self::new(FIXTURE_BIND_DN, FIXTURE_BIND_PASSWORD)
    }
}

impl FixtureDirectory {
    /// Creates an empty directory accepting one bind account.
    pub fn new(bind_dn: impl Into<String>, bind_password: impl Into<String>) -> Self {
        Self {
            bind_dn: bind_dn.into(),
            bind_password: bind_password.into(),
            groups_of_member: DEFAULT_GROUPS_OF_MEMBER.to_string(),
            members_of_group: DEFAULT_MEMBERS_OF_GROUP.to_string(),
            endless_paging: false,
            state: Mutex::new(FixtureState::default()),
        }
    }

    /// Overrides the relation filter templates.
    #[must_use]
    pub fn with_relation_templates(
        mut self,
        groups_of_member: impl Into<String>,
        members_of_group: impl Into<String>,
    ) -> Self {
        self.groups_of_member = groups_of_member.into();
        self.members_of_group = members_of_group.into();
        self
    }

    /// Adds an entry answering to the given filters.
    #[must_use]
    pub fn with_entry<I, S>(self, entry: Entry, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_failing_entry(entry, filters, FailureMode::None)
    }

    /// Adds an entry with a failure mode.
    #[must_use]
    pub fn with_failing_entry<I, S>(self, entry: Entry, filters: I, failure: FailureMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.lock().entries.push(FixtureEntry {
            entry,
            filters: filters.into_iter().map(Into::into).collect(),
            failure,
            failed_once: false,
        });
        self
    }

    /// Makes paged searches always return a non-empty cookie.
    ///
    /// Simulates a misbehaving server that never finishes a paged search.
    #[must_use]
    pub const fn with_endless_paging(mut self) -> Self {
        self.endless_paging = true;
        self
    }

    /// Returns the calls received so far.
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.state.lock().calls
    }

    /// Returns the modify calls accepted so far.
    #[must_use]
    pub fn modifications(&self) -> Vec<RecordedModify> {
        self.state.lock().modifications.clone()
    }

    /// Returns a snapshot of an entry by DN.
    #[must_use]
    pub fn entry(&self, dn: &str) -> Option<Entry> {
        self.state
            .lock()
            .entries
            .iter()
            .find(|e| e.entry.dn.eq_ignore_ascii_case(dn))
            .map(|e| e.entry.clone())
    }

    /// Makes every later bind fail with a connection error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    /// Returns true while a session is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.state.lock().bound
    }

    /// Builds the sample company directory used throughout the tests.
    ///
    /// Users `user1`, `user2`, `userToAdd`; groups `group1` (member `user1`)
    /// and `group2` (member `user2`). `entryForErr` fails every lookup,
    /// `userToReconnect` drops the connection once, `userUnreachable` always
    /// drops it, and `notUniq` names two different entries.
    #[must_use]
    pub fn company() -> Self {
        Self::default()
            .with_entry(person("user1"), listed_person_filters("user1"))
            .with_entry(person("user2"), listed_person_filters("user2"))
            .with_entry(person("userToAdd"), listed_person_filters("userToAdd"))
            .with_entry(
                group("group1", &["user1"]),
                listed_group_filters("group1"),
            )
            .with_entry(
                group("group2", &["user2"]),
                listed_group_filters("group2"),
            )
            .with_entry(
                group("groupWithErrMember", &["entryForErr"]),
                group_filters("groupWithErrMember"),
            )
            .with_failing_entry(
                person("entryForErr"),
                person_filters("entryForErr")
                    .into_iter()
                    .chain(group_filters("entryForErr")),
                FailureMode::Protocol,
            )
            .with_failing_entry(
                person("userToReconnect"),
                person_filters("userToReconnect"),
                FailureMode::TransientOnce,
            )
            .with_failing_entry(
                person("userUnreachable"),
                person_filters("userUnreachable"),
                FailureMode::Transient,
            )
            .with_entry(
                Entry::new(
                    company_dn("notUniq1"),
                    vec![Attribute::single("sAMAccountName", "notUniq")],
                ),
                duplicate_filters("notUniq1"),
            )
            .with_entry(
                Entry::new(
                    company_dn("notUniq2"),
                    vec![Attribute::single("sAMAccountName", "notUniq")],
                ),
                duplicate_filters("notUniq2"),
            )
    }

    fn matches(&self, candidate: &FixtureEntry, filter: &str, all: &[FixtureEntry]) -> bool {
        if candidate.filters.iter().any(|f| f == filter) {
            return true;
        }

        let is_group_of_member = candidate
            .entry
            .values(MEMBER_ATTRIBUTE)
            .iter()
            .any(|m| render_escaped(&self.groups_of_member, m) == filter);
        if is_group_of_member {
            return true;
        }

        all.iter()
            .filter(|g| candidate.is_listed_in(&g.entry))
            .any(|g| render_escaped(&self.members_of_group, &g.entry.dn) == filter)
    }

    fn ensure_bound(state: &FixtureState) -> DirectoryResult<()> {
        if state.bound {
            Ok(())
        } else {
            Err(DirectoryError::NotBound)
        }
    }

    fn find_mut<'a>(
        entries: &'a mut [FixtureEntry],
        dn: &str,
    ) -> DirectoryResult<&'a mut FixtureEntry> {
        entries
            .iter_mut()
            .find(|e| e.entry.dn.eq_ignore_ascii_case(dn))
            .ok_or_else(|| DirectoryError::protocol(32, format!("no such object: {dn}")))
    }
}

#[async_trait]
impl DirectoryCapability for FixtureDirectory {
    async fn bind(&self, dn: &str, password: &str) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.calls.binds += 1;
        if state.unreachable {
            state.bound = false;
            return Err(DirectoryError::connection("fixture server unreachable"));
        }
        if dn != self.bind_dn || password != self.bind_password {
            state.bound = false;
            return Err(DirectoryError::InvalidCredentials(dn.to_string()));
        }
        state.bound = true;
        Ok(())
    }

    async fn search(
        &self,
        spec: &SearchSpec,
        paging: Option<&PagingState>,
    ) -> DirectoryResult<SearchPage> {
        let mut state = self.state.lock();
        state.calls.searches += 1;
        Self::ensure_bound(&state)?;

        let matched: Vec<usize> = state
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| self.matches(e, &spec.filter, &state.entries))
            .map(|(i, _)| i)
            .collect();

        let mut found = Vec::with_capacity(matched.len());
        for i in matched {
            let fixture = &mut state.entries[i];
            fixture.trip()?;
            found.push(project(&fixture.entry, &spec.attributes));
        }

        let Some(paging) = paging.filter(|p| p.page_size > 0) else {
            return Ok(SearchPage::unpaged(found));
        };

        let offset = decode_cookie(&paging.cookie).min(found.len());
        let end = offset
            .saturating_add(paging.page_size as usize)
            .min(found.len());
        let page: Vec<Entry> = found[offset..end].to_vec();

        let cookie = if self.endless_paging {
            encode_cookie(offset)
        } else if end < found.len() {
            encode_cookie(end)
        } else {
            Vec::new()
        };

        Ok(SearchPage {
            entries: page,
            paging: Some(PagingState {
                page_size: paging.page_size,
                cookie,
            }),
        })
    }

    async fn add(&self, dn: &str, attributes: &[Attribute]) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.calls.adds += 1;
        Self::ensure_bound(&state)?;

        if state.entries.iter().any(|e| e.entry.dn.eq_ignore_ascii_case(dn)) {
            return Err(DirectoryError::protocol(68, format!("entry already exists: {dn}")));
        }
        if attributes.is_empty() {
            return Err(DirectoryError::protocol(65, "object class violation: no attributes"));
        }

        state.entries.push(FixtureEntry {
            entry: Entry::new(dn, attributes.to_vec()),
            filters: Vec::new(),
            failure: FailureMode::None,
            failed_once: false,
        });
        Ok(())
    }

    async fn modify(&self, dn: &str, replacements: &[Attribute]) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.calls.modifies += 1;
        Self::ensure_bound(&state)?;

        let fixture = Self::find_mut(&mut state.entries, dn)?;
        fixture.trip()?;

        for replacement in replacements {
            let attributes = &mut fixture.entry.attributes;
            let existing = attributes
                .iter()
                .position(|a| a.name.eq_ignore_ascii_case(&replacement.name));
            match (existing, replacement.values.is_empty()) {
                (Some(i), true) => {
                    attributes.remove(i);
                }
                (Some(i), false) => attributes[i].values.clone_from(&replacement.values),
                (None, true) => {}
                (None, false) => attributes.push(replacement.clone()),
            }
        }

        state.modifications.push(RecordedModify {
            dn: dn.to_string(),
            replacements: replacements.to_vec(),
        });
        Ok(())
    }

    async fn modify_dn(
        &self,
        dn: &str,
        new_rdn: &str,
        _delete_old_rdn: bool,
    ) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.calls.modify_dns += 1;
        Self::ensure_bound(&state)?;

        let new_dn = match dn.split_once(',') {
            Some((_, parent)) => format!("{new_rdn},{parent}"),
            None => new_rdn.to_string(),
        };
        if state.entries.iter().any(|e| e.entry.dn.eq_ignore_ascii_case(&new_dn)) {
            return Err(DirectoryError::protocol(68, format!("entry already exists: {new_dn}")));
        }

        let fixture = Self::find_mut(&mut state.entries, dn)?;
        fixture.trip()?;
        fixture.entry.dn.clone_from(&new_dn);

        // Keep group membership pointing at the renamed entry.
        for other in &mut state.entries {
            for attribute in &mut other.entry.attributes {
                if attribute.name.eq_ignore_ascii_case(MEMBER_ATTRIBUTE) {
                    for value in &mut attribute.values {
                        if value.eq_ignore_ascii_case(dn) {
                            value.clone_from(&new_dn);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn unbind(&self) -> DirectoryResult<()> {
        let mut state = self.state.lock();
        state.calls.unbinds += 1;
        state.bound = false;
        Ok(())
    }
}

/// Returns `OU=<name>,DC=company,DC=com`.
#[must_use]
pub fn company_dn(name: &str) -> String {
    format!("OU={name},DC=company,DC=com")
}

/// Filters a sample person answers to: by id and by DN.
#[must_use]
pub fn person_filters(id: &str) -> Vec<String> {
    vec![
        format!("(&(objectClass=person)(sAMAccountName={id}))"),
        format!("(&(objectClass=person)(distinguishedName={}))", company_dn(id)),
    ]
}

/// Filters a sample group answers to: by id and by DN.
#[must_use]
pub fn group_filters(id: &str) -> Vec<String> {
    vec![
        format!("(&(objectClass=group)(sAMAccountName={id}))"),
        format!("(&(objectClass=group)(distinguishedName={}))", company_dn(id)),
    ]
}

/// Both `notUniq` entries answer the same id filter but keep their own DN.
fn duplicate_filters(name: &str) -> Vec<String> {
    let mut filters = person_filters(name);
    filters[0] = "(&(objectClass=person)(sAMAccountName=notUniq))".to_string();
    filters
}

fn listed_person_filters(id: &str) -> Vec<String> {
    let mut filters = person_filters(id);
    filters.push("(objectCategory=person)".to_string());
    if id == "user1" {
        filters.push("customFilterToSearchUser".to_string());
    }
    filters
}

fn listed_group_filters(id: &str) -> Vec<String> {
    let mut filters = group_filters(id);
    filters.push("(objectClass=group)".to_string());
    if id == "group1" {
        filters.push("customFilterToSearchGroup".to_string());
    }
    filters
}

fn person(id: &str) -> Entry {
    Entry::new(
        company_dn(id),
        vec![
            Attribute::single("sAMAccountName", id),
            Attribute::single("displayName", format!("{id} display")),
            Attribute::new("objectClass", ["top", "person", "user"]),
        ],
    )
}

fn group(id: &str, members: &[&str]) -> Entry {
    Entry::new(
        company_dn(id),
        vec![
            Attribute::single("sAMAccountName", id),
            Attribute::new("objectClass", ["top", "group"]),
            Attribute::new(MEMBER_ATTRIBUTE, members.iter().map(|m| company_dn(m))),
        ],
    )
}

/// Keeps only the requested attributes. An empty list or `*` keeps all.
fn project(entry: &Entry, requested: &[String]) -> Entry {
    if requested.is_empty() || requested.iter().any(|r| r == "*") {
        return entry.clone();
    }
    Entry::new(
        entry.dn.clone(),
        entry
            .attributes
            .iter()
            .filter(|a| requested.iter().any(|r| r.eq_ignore_ascii_case(&a.name)))
            .cloned()
            .collect(),
    )
}

fn encode_cookie(offset: usize) -> Vec<u8> {
    (offset as u64).to_be_bytes().to_vec()
}

fn decode_cookie(cookie: &[u8]) -> usize {
    <[u8; 8]>::try_from(cookie).map_or(0, |bytes| {
        usize::try_from(u64::from_be_bytes(bytes)).unwrap_or(usize::MAX)
    })
}
