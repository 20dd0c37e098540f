//! Paginated, inline-editable table controller.
//!
//! ## How it runs
//! Commands (`load_page`, `commit_edit`, `search`, ...) are plain `&mut self`
//! methods that return immediately. Any network IO they need is spawned and
//! reports back as an [`Event`] over a `flume` channel. Nothing in the
//! controller changes until the owner applies those events:
//!
//! - once per UI frame: `controller.sync();`
//! - in tests and one-shot tools: `controller.settle().await;`
//!
//! ## Relevance
//! Page loads and option loads each take a fresh [`TaskId`] from a
//! [`LatestOnly`] sequencer. A response is applied only if its id is still the
//! latest one issued on its channel; older responses are logged and dropped.
//!
//! ## Reconciliation
//! Update and create patch the local page with the entity the server returns
//! (create also recomputes the totals). Delete re-fetches the current page.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use flume::{Receiver, Sender};
use log::{debug, info, warn};
use roster_states::{DebounceOutcome, Debouncer, LatestOnly, TaskId, spawn};
use serde_json::Value;
use thiserror::Error;
use ustr::Ustr;

use super::{
    AuxiliaryOptionSet, EditPhase, EntityId, FieldError, Notification, OptionScope, OptionSource,
    Page, PageQuery, Resource, ResourceApi, RowEditSession, SelectOption,
};
use crate::auth::AuthSession;
use crate::config::BusinessConfig;
use crate::error::{ApiError, ApiResult};
use crate::export::{ExportFormat, ExportQuery};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("controller has been disposed")]
    Disposed,
    #[error("no row is being edited")]
    NoEditSession,
    #[error("a save is already in flight")]
    SaveInFlight,
    #[error("no row with id {0} on the current page")]
    UnknownEntity(EntityId),
    #[error("no delete confirmation is open for id {0}")]
    NoPendingDelete(EntityId),
    #[error("a create request is already in flight")]
    CreateInFlight,
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Display state of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Viewing,
    Editing,
    Saving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub id: EntityId,
    pub label: String,
    pub in_flight: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateForm<D> {
    pub draft: D,
    pub submitting: bool,
    pub error: Option<String>,
}

enum Event<T: Resource> {
    PageLoaded {
        task: TaskId,
        query: PageQuery,
        result: ApiResult<Page<T>>,
    },
    OptionsLoaded {
        task: TaskId,
        key: Ustr,
        current: Option<SelectOption>,
        result: ApiResult<Vec<SelectOption>>,
    },
    Committed {
        id: EntityId,
        result: ApiResult<T>,
    },
    Created {
        result: ApiResult<T>,
    },
    Deleted {
        id: EntityId,
        result: ApiResult<()>,
    },
    Debounce(DebounceOutcome),
}

pub struct ResourceController<T: Resource> {
    api: Arc<dyn ResourceApi<T>>,
    sources: Vec<(Ustr, Arc<dyn OptionSource>)>,
    auth: Option<AuthSession>,
    page_size: u32,

    page: Page<T>,
    query: PageQuery,
    search_input: String,
    loaded: bool,
    loading: bool,
    error: Option<String>,
    last_loaded: Option<DateTime<Utc>>,
    session: Option<RowEditSession<T>>,
    pending_delete: Option<DeleteConfirmation>,
    create_form: Option<CreateForm<T::Draft>>,
    options: HashMap<Ustr, AuxiliaryOptionSet>,
    notifications: Vec<Notification>,

    page_channel: Ustr,
    sequencer: LatestOnly,
    debouncer: Debouncer,
    events_tx: Sender<Event<T>>,
    events_rx: Receiver<Event<T>>,
    pending: usize,
    disposed: bool,
}

impl<T: Resource> ResourceController<T> {
    pub fn new(api: impl ResourceApi<T> + 'static, config: &BusinessConfig) -> Self {
        let (events_tx, events_rx) = flume::unbounded();
        let page_size = config.page_size.max(1);
        Self {
            api: Arc::new(api),
            sources: Vec::new(),
            auth: None,
            page_size,
            page: Page::empty(page_size),
            query: PageQuery::new("", 1, page_size),
            search_input: String::new(),
            loaded: false,
            loading: false,
            error: None,
            last_loaded: None,
            session: None,
            pending_delete: None,
            create_form: None,
            options: HashMap::new(),
            notifications: Vec::new(),
            page_channel: Ustr::from(&format!("{}.page", T::PATH)),
            sequencer: LatestOnly::new(),
            debouncer: Debouncer::new(
                Ustr::from(&format!("{}.search", T::PATH)),
                config.search_debounce,
            ),
            events_tx,
            events_rx,
            pending: 0,
            disposed: false,
        }
    }

    /// Registers the dropdown source for one foreign key.
    pub fn with_option_source(mut self, source: impl OptionSource + 'static) -> Self {
        let key = source.key();
        self.sources.retain(|(existing, _)| *existing != key);
        self.sources.push((key, Arc::new(source)));
        self.options.insert(key, AuxiliaryOptionSet::new(key));
        self
    }

    /// Session to invalidate when the server answers `401`.
    pub fn with_auth(mut self, auth: AuthSession) -> Self {
        self.auth = Some(auth);
        self
    }

    // ---- read side -------------------------------------------------------

    pub fn items(&self) -> &[T] {
        &self.page.items
    }

    pub fn page(&self) -> &Page<T> {
        &self.page
    }

    /// The committed query: what the table shows or is loading.
    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    /// The search box contents, which may not be committed yet.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Banner text from the last failed list load.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_loaded(&self) -> Option<DateTime<Utc>> {
        self.last_loaded
    }

    pub fn edit_session(&self) -> Option<&RowEditSession<T>> {
        self.session.as_ref()
    }

    pub fn row_state(&self, id: EntityId) -> RowState {
        match &self.session {
            Some(session) if session.entity_id() == id => match session.phase() {
                EditPhase::Editing => RowState::Editing,
                EditPhase::Saving => RowState::Saving,
            },
            _ => RowState::Viewing,
        }
    }

    pub fn pending_delete(&self) -> Option<&DeleteConfirmation> {
        self.pending_delete.as_ref()
    }

    pub fn create_form(&self) -> Option<&CreateForm<T::Draft>> {
        self.create_form.as_ref()
    }

    pub fn options(&self, key: &str) -> Option<&AuxiliaryOptionSet> {
        self.options.get(&Ustr::from(key))
    }

    /// Placeholder shown instead of the table body when there is nothing to list.
    pub fn empty_message(&self) -> Option<String> {
        let settled = self.loaded || self.error.is_some();
        (settled && !self.loading && self.page.items.is_empty())
            .then(|| format!("No {} to display", T::NOUN))
    }

    pub fn export_query(&self, format: ExportFormat) -> ExportQuery {
        ExportQuery::new(
            self.query.page,
            self.page_size,
            self.query.search.clone(),
            format,
        )
    }

    /// Drains the notifications raised since the last call.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Number of spawned tasks whose result has not been applied yet.
    pub fn pending_tasks(&self) -> usize {
        self.pending
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ---- commands --------------------------------------------------------

    /// Requests `page` of the collection filtered by `search`.
    pub fn load_page(&mut self, search: &str, page: u32) -> Result<TaskId, ControllerError> {
        self.ensure_live()?;
        let query = PageQuery::new(search, page, self.page_size);
        let task = self.sequencer.issue(self.page_channel);
        info!(
            "Loading {} page {} (search={:?}, {task})",
            T::NOUN,
            query.page,
            query.search
        );

        self.query = query.clone();
        self.loading = true;

        let api = Arc::clone(&self.api);
        self.dispatch(async move {
            let result = api.list(&query).await;
            Event::PageLoaded {
                task,
                query,
                result,
            }
        });
        Ok(task)
    }

    /// Reloads the committed page and search.
    pub fn refresh(&mut self) -> Result<TaskId, ControllerError> {
        let search = self.query.search.clone();
        self.load_page(&search, self.query.page)
    }

    /// Moves to `target`; a no-op outside `[1, total_pages]`.
    pub fn change_page(&mut self, target: u32) -> Result<Option<TaskId>, ControllerError> {
        self.ensure_live()?;
        if !self.page.contains_page(target) {
            debug!(
                "Ignoring page {target} of {} ({} pages)",
                T::NOUN,
                self.page.total_pages
            );
            return Ok(None);
        }
        let search = self.query.search.clone();
        self.load_page(&search, target).map(Some)
    }

    /// Records a keystroke in the search box and restarts the quiet period.
    pub fn search(&mut self, term: &str) -> Result<TaskId, ControllerError> {
        self.ensure_live()?;
        self.search_input = term.to_owned();

        let events = self.events_tx.clone();
        self.pending += 1;
        Ok(self.debouncer.schedule(move |outcome| {
            let _ = events.send(Event::Debounce(outcome));
        }))
    }

    /// Commits the search box immediately, skipping the quiet period.
    pub fn submit_search(&mut self) -> Result<TaskId, ControllerError> {
        self.ensure_live()?;
        self.debouncer.cancel();
        self.commit_search()
    }

    fn commit_search(&mut self) -> Result<TaskId, ControllerError> {
        let term = self.search_input.trim().to_owned();
        self.load_page(&term, 1)
    }

    /// Opens the inline editor on row `id`, closing any other open editor.
    pub fn begin_edit(&mut self, id: EntityId) -> Result<(), ControllerError> {
        self.ensure_live()?;
        let entity = self
            .find(id)
            .cloned()
            .ok_or(ControllerError::UnknownEntity(id))?;

        if let Some(previous) = self.session.take() {
            if previous.entity_id() == id {
                let phase = previous.phase();
                self.session = Some(previous);
                return match phase {
                    EditPhase::Editing => Ok(()),
                    EditPhase::Saving => Err(ControllerError::SaveInFlight),
                };
            }
            info!(
                "Discarding edit of {} {} to edit {id}",
                T::NAME,
                previous.entity_id()
            );
        }

        info!("Editing {} {}", T::NAME, entity.label());
        self.session = Some(RowEditSession::new(&entity));
        self.load_options(entity.option_scopes());
        Ok(())
    }

    /// Writes one field of the working copy. No network.
    pub fn update_field(&mut self, field: &str, value: Value) -> Result<(), ControllerError> {
        let session = self.session.as_mut().ok_or(ControllerError::NoEditSession)?;
        if session.phase() == EditPhase::Saving {
            return Err(ControllerError::SaveInFlight);
        }
        session.update_field(field, value)?;
        Ok(())
    }

    /// Sends the changed fields of the open editor.
    ///
    /// With nothing changed the editor simply closes.
    pub fn commit_edit(&mut self) -> Result<(), ControllerError> {
        self.ensure_live()?;
        let session = self.session.as_mut().ok_or(ControllerError::NoEditSession)?;
        if session.phase() == EditPhase::Saving {
            return Err(ControllerError::SaveInFlight);
        }

        let id = session.entity_id();
        let changes = session.changed_fields();
        if changes.is_empty() {
            self.session = None;
            self.notifications
                .push(Notification::success(format!("{} updated", title(T::NAME))));
            return Ok(());
        }

        info!(
            "Saving {} {id}: {:?}",
            T::NAME,
            changes.keys().collect::<Vec<_>>()
        );
        session.mark_saving();

        let api = Arc::clone(&self.api);
        self.dispatch(async move {
            let result = api.update(id, &changes).await;
            Event::Committed { id, result }
        });
        Ok(())
    }

    /// Closes the editor and drops the working copy. Returns false if no
    /// editor was open.
    pub fn cancel_edit(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                info!("Cancelled edit of {} {}", T::NAME, session.entity_id());
                true
            }
            None => false,
        }
    }

    /// Opens the confirmation gate for deleting row `id`.
    pub fn request_delete(&mut self, id: EntityId) -> Result<(), ControllerError> {
        self.ensure_live()?;
        let label = self
            .find(id)
            .map(T::label)
            .ok_or(ControllerError::UnknownEntity(id))?;
        self.pending_delete = Some(DeleteConfirmation {
            id,
            label,
            in_flight: false,
        });
        Ok(())
    }

    pub fn cancel_delete(&mut self) -> bool {
        self.pending_delete.take().is_some()
    }

    /// Deletes row `id` after [`Self::request_delete`] opened the gate for it.
    pub fn confirm_delete(&mut self, id: EntityId) -> Result<(), ControllerError> {
        self.ensure_live()?;
        let confirmation = self
            .pending_delete
            .as_mut()
            .filter(|confirmation| confirmation.id == id && !confirmation.in_flight)
            .ok_or(ControllerError::NoPendingDelete(id))?;
        confirmation.in_flight = true;

        info!("Deleting {} {id}", T::NAME);
        let api = Arc::clone(&self.api);
        self.dispatch(async move {
            let result = api.delete(id).await;
            Event::Deleted { id, result }
        });
        Ok(())
    }

    /// Opens an empty creation form and loads every dropdown.
    ///
    /// The option sets are shared with the inline editor, so keys the open
    /// editor scopes stay scoped to its current values.
    pub fn open_create_form(&mut self) -> Result<(), ControllerError> {
        self.ensure_live()?;
        if self.create_form.is_none() {
            self.create_form = Some(CreateForm {
                draft: T::Draft::default(),
                submitting: false,
                error: None,
            });
        }
        let editing = self
            .session
            .as_ref()
            .map(|session| session.original_snapshot().option_scopes())
            .unwrap_or_default();
        let scopes: Vec<OptionScope> = self
            .sources
            .iter()
            .map(|(key, _)| {
                editing
                    .iter()
                    .find(|scope| scope.key == *key)
                    .cloned()
                    .unwrap_or(OptionScope {
                        key: *key,
                        field: "",
                        current: None,
                    })
            })
            .collect();
        self.load_options(scopes);
        Ok(())
    }

    /// Edits the draft of the open creation form. Returns false if none is open.
    pub fn update_draft(&mut self, edit: impl FnOnce(&mut T::Draft)) -> bool {
        match self.create_form.as_mut() {
            Some(form) if !form.submitting => {
                edit(&mut form.draft);
                true
            }
            _ => false,
        }
    }

    pub fn close_create_form(&mut self) -> bool {
        self.create_form.take().is_some()
    }

    /// Posts `draft`.
    pub fn create_entity(&mut self, draft: T::Draft) -> Result<(), ControllerError> {
        self.ensure_live()?;
        if let Some(form) = self.create_form.as_mut() {
            if form.submitting {
                return Err(ControllerError::CreateInFlight);
            }
            form.draft = draft.clone();
            form.submitting = true;
            form.error = None;
        }

        info!("Creating {}", T::NAME);
        let api = Arc::clone(&self.api);
        self.dispatch(async move {
            let result = api.create(&draft).await;
            Event::Created { result }
        });
        Ok(())
    }

    /// Posts the draft held by the open creation form.
    pub fn submit_create_form(&mut self) -> Result<(), ControllerError> {
        let draft = match &self.create_form {
            Some(form) if form.submitting => return Err(ControllerError::CreateInFlight),
            Some(form) => form.draft.clone(),
            None => T::Draft::default(),
        };
        self.create_entity(draft)
    }

    /// Stops the search timer and ignores every response still in flight.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        info!("Disposing {} controller", T::NOUN);
        self.disposed = true;
        self.debouncer.cancel();
        self.sequencer.invalidate(self.page_channel);
        self.loading = false;
    }

    // ---- event application -----------------------------------------------

    /// Applies every event that has already arrived. Returns how many.
    pub fn sync(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Waits for and applies events until no spawned work is outstanding,
    /// including work spawned while applying.
    pub async fn settle(&mut self) {
        while self.pending > 0 {
            match self.events_rx.recv_async().await {
                Ok(event) => {
                    self.pending -= 1;
                    self.apply(event);
                }
                Err(_) => break,
            }
        }
    }

    fn apply(&mut self, event: Event<T>) {
        if self.disposed {
            debug!("Dropping event for disposed {} controller", T::NOUN);
            return;
        }
        match event {
            Event::PageLoaded {
                task,
                query,
                result,
            } => self.apply_page(task, query, result),
            Event::OptionsLoaded {
                task,
                key,
                current,
                result,
            } => self.apply_options(task, key, current, result),
            Event::Committed { id, result } => self.apply_commit(id, result),
            Event::Created { result } => self.apply_create(result),
            Event::Deleted { id, result } => self.apply_delete(id, result),
            Event::Debounce(DebounceOutcome::Elapsed(id)) => {
                if self.debouncer.finish(id) {
                    let _ = self.commit_search();
                }
            }
            Event::Debounce(DebounceOutcome::Cancelled(_)) => {}
        }
    }

    fn apply_page(&mut self, task: TaskId, query: PageQuery, result: ApiResult<Page<T>>) {
        if !self.sequencer.is_current(task) {
            warn!("Dropping stale {} page {} ({task})", T::NOUN, query.page);
            return;
        }
        self.loading = false;

        match result {
            Ok(page) if page.total_pages > 0 && query.page > page.total_pages => {
                info!(
                    "{} page {} is past the last page {}, reloading",
                    T::NOUN,
                    query.page,
                    page.total_pages
                );
                let _ = self.load_page(&query.search, page.total_pages);
            }
            Ok(mut page) => {
                T::arrange(&mut page.items);
                info!(
                    "Loaded {} page {}/{} ({} rows)",
                    T::NOUN,
                    page.page,
                    page.total_pages,
                    page.items.len()
                );
                if let Some(session) = &self.session
                    && !page.items.iter().any(|item| item.id() == session.entity_id())
                {
                    info!(
                        "Edited {} {} left the page, closing editor",
                        T::NAME,
                        session.entity_id()
                    );
                    self.session = None;
                }
                self.page = page;
                self.loaded = true;
                self.error = None;
                self.last_loaded = Some(Utc::now());
            }
            Err(err) => {
                if self.handle_auth(&err) {
                    return;
                }
                warn!("Failed to load {}: {err}", T::NOUN);
                self.error = Some(err.user_message());
            }
        }
    }

    fn apply_options(
        &mut self,
        task: TaskId,
        key: Ustr,
        current: Option<SelectOption>,
        result: ApiResult<Vec<SelectOption>>,
    ) {
        if !self.sequencer.is_current(task) {
            warn!("Dropping stale {key} options ({task})");
            return;
        }
        let auth_failed = matches!(&result, Err(err) if self.handle_auth(err));

        let set = self
            .options
            .entry(key)
            .or_insert_with(|| AuxiliaryOptionSet::new(key));
        set.loading = false;
        match result {
            Ok(options) => {
                debug!("Loaded {} {key} options", options.len());
                set.options = options;
                set.error = None;
            }
            Err(err) => {
                warn!("Failed to load {key} options: {err}");
                set.options.clear();
                if !auth_failed {
                    set.error = Some(err.user_message());
                }
            }
        }
        set.pin(current.as_ref());
    }

    fn apply_commit(&mut self, id: EntityId, result: ApiResult<T>) {
        match result {
            Ok(entity) => {
                if let Some(row) = self.page.items.iter_mut().find(|row| row.id() == id) {
                    *row = entity;
                }
                if self
                    .session
                    .as_ref()
                    .is_some_and(|session| session.entity_id() == id)
                {
                    self.session = None;
                }
                self.notifications
                    .push(Notification::success(format!("{} updated", title(T::NAME))));
            }
            Err(err) => {
                let auth = self.handle_auth(&err);
                let message = err.user_message();
                if let Some(session) = self
                    .session
                    .as_mut()
                    .filter(|session| session.entity_id() == id)
                {
                    session.mark_failed(message.clone());
                }
                if !auth {
                    self.notifications.push(Notification::error(message));
                }
            }
        }
    }

    fn apply_create(&mut self, result: ApiResult<T>) {
        match result {
            Ok(entity) => {
                info!("Created {} {}", T::NAME, entity.label());
                self.page.items.push(entity);
                self.page.record_inserted(1);
                self.create_form = None;
                self.notifications
                    .push(Notification::success(format!("{} created", title(T::NAME))));
            }
            Err(err) => {
                let auth = self.handle_auth(&err);
                let message = err.user_message();
                if let Some(form) = self.create_form.as_mut() {
                    form.submitting = false;
                    form.error = Some(message.clone());
                }
                if !auth {
                    self.notifications.push(Notification::error(message));
                }
            }
        }
    }

    fn apply_delete(&mut self, id: EntityId, result: ApiResult<()>) {
        if self
            .pending_delete
            .as_ref()
            .is_some_and(|confirmation| confirmation.id == id)
        {
            self.pending_delete = None;
        }

        match result {
            Ok(()) => {
                if self
                    .session
                    .as_ref()
                    .is_some_and(|session| session.entity_id() == id)
                {
                    self.session = None;
                }
                self.notifications
                    .push(Notification::success(format!("{} deleted", title(T::NAME))));
                let _ = self.refresh();
            }
            Err(err) => {
                if !self.handle_auth(&err) {
                    self.notifications
                        .push(Notification::error(err.user_message()));
                }
            }
        }
    }

    // ---- plumbing ----------------------------------------------------------

    fn ensure_live(&self) -> Result<(), ControllerError> {
        if self.disposed {
            Err(ControllerError::Disposed)
        } else {
            Ok(())
        }
    }

    fn find(&self, id: EntityId) -> Option<&T> {
        self.page.items.iter().find(|item| item.id() == id)
    }

    /// Routes `401` to the auth session. Returns true if `err` was one.
    fn handle_auth(&self, err: &ApiError) -> bool {
        if !err.is_session_fatal() {
            return false;
        }
        if let Some(auth) = &self.auth {
            auth.expire();
        }
        true
    }

    fn load_options(&mut self, scopes: Vec<OptionScope>) {
        for scope in scopes {
            let Some(source) = self
                .sources
                .iter()
                .find(|(key, _)| *key == scope.key)
                .map(|(_, source)| Arc::clone(source))
            else {
                continue;
            };
            let key = scope.key;
            let include = scope.current_id();
            let task = self
                .sequencer
                .issue(Ustr::from(&format!("{}.options.{key}", T::PATH)));

            let set = self
                .options
                .entry(key)
                .or_insert_with(|| AuxiliaryOptionSet::new(key));
            set.loading = true;
            set.error = None;
            set.scope_id = include;

            debug!("Loading {key} options (include={include:?}, {task})");
            let current = scope.current;
            self.dispatch(async move {
                let result = source.load(include).await;
                Event::OptionsLoaded {
                    task,
                    key,
                    current,
                    result,
                }
            });
        }
    }

    fn dispatch<F>(&mut self, work: F)
    where
        F: Future<Output = Event<T>> + Send + 'static,
    {
        let events = self.events_tx.clone();
        self.pending += 1;
        spawn(async move {
            let event = work.await;
            // The controller may already be gone.
            let _ = events.send(event);
        });
    }
}

impl<T: Resource> Drop for ResourceController<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn title(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
