//! In-memory doubles for the repository and storage traits, plus fixtures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::models::{
    CreateReport, CreateReportUpdate, EmergencyLevel, Priority, Report, ReportContentChanges,
    ReportStatus, ReportSummary, ReportUpdate,
};
use crate::features::reports::repository::{ReportFilter, ReportRepository, ReportScope};
use crate::features::users::models::{CreateUserProfile, Role, UserProfile};
use crate::features::users::repository::ProfileRepository;
use crate::modules::storage::BlobStorage;

pub fn authenticated(id: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: id.to_string(),
        email: Some(format!("{}@example.com", id)),
        session_id: None,
    }
}

pub fn profile(id: &str, role: Role) -> UserProfile {
    let now = Utc::now();
    UserProfile {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        display_name: None,
        role,
        agency_id: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn agency_profile(id: &str, agency_id: Uuid) -> UserProfile {
    UserProfile {
        agency_id: Some(agency_id),
        ..profile(id, Role::Agency)
    }
}

/// A pending fire report owned by `user_id`
pub fn report(user_id: &str) -> Report {
    let now = Utc::now();
    Report {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        category_id: "fire".to_string(),
        title: None,
        description: "Smoke coming from the building".to_string(),
        priority: Priority::High,
        emergency_level: EmergencyLevel::Standard,
        latitude: None,
        longitude: None,
        image_url: None,
        status: ReportStatus::Pending,
        assigned_agency_ids: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

async fn inject_user(user: AuthenticatedUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Stand-in for the JWT middleware: every request is made as `user_id`
pub fn with_user(router: Router, user_id: &str) -> Router {
    let user = authenticated(user_id);
    router.layer(axum::middleware::from_fn(move |req: Request, next: Next| {
        inject_user(user.clone(), req, next)
    }))
}

// =============================================================================
// PROFILES
// =============================================================================

#[derive(Clone, Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<Mutex<HashMap<String, UserProfile>>>,
}

impl InMemoryProfileRepository {
    pub fn with_profiles(profiles: Vec<UserProfile>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.profiles.lock().unwrap();
            for p in profiles {
                map.insert(p.id.clone(), p);
            }
        }
        repo
    }

    pub fn get(&self, id: &str) -> Option<UserProfile> {
        self.profiles.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>> {
        Ok(self.get(id))
    }

    async fn create(&self, data: &CreateUserProfile) -> Result<UserProfile> {
        let mut map = self.profiles.lock().unwrap();
        if map.contains_key(&data.id) {
            return Err(AppError::Conflict("duplicate profile".to_string()));
        }
        let p = UserProfile {
            email: data.email.clone(),
            display_name: data.display_name.clone(),
            agency_id: data.agency_id,
            ..profile(&data.id, data.role)
        };
        map.insert(p.id.clone(), p.clone());
        Ok(p)
    }

    async fn update_display_name(
        &self,
        id: &str,
        display_name: Option<&str>,
    ) -> Result<UserProfile> {
        let mut map = self.profiles.lock().unwrap();
        let p = map
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        p.display_name = display_name.map(String::from);
        p.updated_at = Utc::now();
        Ok(p.clone())
    }

    async fn update_access(
        &self,
        id: &str,
        role: Role,
        agency_id: Option<Uuid>,
        is_active: bool,
    ) -> Result<UserProfile> {
        let mut map = self.profiles.lock().unwrap();
        let p = map
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        p.role = role;
        p.agency_id = agency_id;
        p.is_active = is_active;
        p.updated_at = Utc::now();
        Ok(p.clone())
    }

    async fn list(
        &self,
        role: Option<Role>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<UserProfile>, i64)> {
        let map = self.profiles.lock().unwrap();
        let mut items: Vec<UserProfile> = map
            .values()
            .filter(|p| role.map_or(true, |r| p.role == r))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        let total = items.len() as i64;
        let page = items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }
}

// =============================================================================
// REPORTS
// =============================================================================

#[derive(Clone, Default)]
pub struct InMemoryReportRepository {
    reports: Arc<Mutex<Vec<Report>>>,
    updates: Arc<Mutex<Vec<ReportUpdate>>>,
    fail_report_insert: Arc<AtomicBool>,
    fail_update_insert: Arc<AtomicBool>,
    unknown_categories: Arc<Mutex<Vec<String>>>,
}

impl InMemoryReportRepository {
    pub fn with_reports(reports: Vec<Report>) -> Self {
        let repo = Self::default();
        *repo.reports.lock().unwrap() = reports;
        repo
    }

    pub fn fail_report_inserts(&self) {
        self.fail_report_insert.store(true, Ordering::SeqCst);
    }

    /// Writes naming this category fail like a foreign key violation
    pub fn reject_category(&self, category_id: &str) {
        self.unknown_categories
            .lock()
            .unwrap()
            .push(category_id.to_string());
    }

    fn check_category(&self, category_id: &str) -> Result<()> {
        if self
            .unknown_categories
            .lock()
            .unwrap()
            .iter()
            .any(|c| c == category_id)
        {
            return Err(AppError::BadRequest(format!(
                "Unknown category '{}'",
                category_id
            )));
        }
        Ok(())
    }

    pub fn fail_update_inserts(&self) {
        self.fail_update_insert.store(true, Ordering::SeqCst);
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<ReportUpdate> {
        self.updates.lock().unwrap().clone()
    }

    fn push_update(&self, data: &CreateReportUpdate) -> ReportUpdate {
        let update = ReportUpdate {
            id: Uuid::new_v4(),
            report_id: data.report_id,
            user_id: data.user_id.clone(),
            status: data.status,
            notes: data.notes.clone(),
            created_at: Utc::now(),
        };
        self.updates.lock().unwrap().push(update.clone());
        update
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn insert_report(&self, data: &CreateReport) -> Result<Report> {
        if self.fail_report_insert.load(Ordering::SeqCst) {
            return Err(AppError::Internal("report insert failed".to_string()));
        }
        self.check_category(&data.category_id)?;
        let r = Report {
            user_id: data.user_id.clone(),
            category_id: data.category_id.clone(),
            title: data.title.clone(),
            description: data.description.clone(),
            priority: data.priority,
            emergency_level: data.emergency_level,
            latitude: data.latitude,
            longitude: data.longitude,
            image_url: data.image_url.clone(),
            ..report(&data.user_id)
        };
        self.reports.lock().unwrap().push(r.clone());
        Ok(r)
    }

    async fn insert_update(&self, data: &CreateReportUpdate) -> Result<ReportUpdate> {
        if self.fail_update_insert.load(Ordering::SeqCst) {
            return Err(AppError::Internal("update insert failed".to_string()));
        }
        Ok(self.push_update(data))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        Ok(self.reports().into_iter().find(|r| r.id == id))
    }

    async fn list(
        &self,
        filter: &ReportFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Report>, i64)> {
        let mut items: Vec<Report> = self
            .reports()
            .into_iter()
            .filter(|r| filter.scope.includes(r))
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = items.len() as i64;
        let page = items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn apply_transition(
        &self,
        expected: ReportStatus,
        update: &CreateReportUpdate,
    ) -> Result<Option<Report>> {
        let moved = {
            let mut reports = self.reports.lock().unwrap();
            match reports
                .iter_mut()
                .find(|r| r.id == update.report_id && r.status == expected)
            {
                Some(r) => {
                    r.status = update.status;
                    r.updated_at = Utc::now();
                    Some(r.clone())
                }
                None => None,
            }
        };
        if moved.is_some() {
            self.push_update(update);
        }
        Ok(moved)
    }

    async fn update_content(
        &self,
        id: Uuid,
        changes: &ReportContentChanges,
    ) -> Result<Option<Report>> {
        if let Some(category_id) = &changes.category_id {
            self.check_category(category_id)?;
        }
        let mut reports = self.reports.lock().unwrap();
        let Some(r) = reports
            .iter_mut()
            .find(|r| r.id == id && r.status == ReportStatus::Pending)
        else {
            return Ok(None);
        };
        if let Some(v) = &changes.category_id {
            r.category_id = v.clone();
        }
        if let Some(v) = &changes.title {
            r.title = v.clone();
        }
        if let Some(v) = &changes.description {
            r.description = v.clone();
        }
        if let Some(v) = changes.priority {
            r.priority = v;
        }
        if let Some(v) = changes.emergency_level {
            r.emergency_level = v;
        }
        if let Some((lat, lng)) = changes.location {
            r.latitude = Some(lat);
            r.longitude = Some(lng);
        }
        r.updated_at = Utc::now();
        Ok(Some(r.clone()))
    }

    async fn set_agencies(&self, id: Uuid, agency_ids: &[Uuid]) -> Result<Report> {
        let mut reports = self.reports.lock().unwrap();
        let r = reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        r.assigned_agency_ids = agency_ids.to_vec();
        Ok(r.clone())
    }

    async fn list_updates(&self, report_id: Uuid) -> Result<Vec<ReportUpdate>> {
        Ok(self
            .updates()
            .into_iter()
            .filter(|u| u.report_id == report_id)
            .collect())
    }

    async fn summarize(&self, scope: &ReportScope) -> Result<ReportSummary> {
        let mut summary = ReportSummary::default();
        for r in self.reports().iter().filter(|r| scope.includes(r)) {
            summary.total += 1;
            *summary
                .by_status
                .entry(r.status.as_str().to_string())
                .or_default() += 1;
            *summary
                .by_priority
                .entry(r.priority.as_str().to_string())
                .or_default() += 1;
            *summary
                .by_emergency_level
                .entry(r.emergency_level.as_str().to_string())
                .or_default() += 1;
            *summary.by_category.entry(r.category_id.clone()).or_default() += 1;
        }
        Ok(summary)
    }
}

// =============================================================================
// BLOB STORAGE
// =============================================================================

#[derive(Clone, Default)]
pub struct InMemoryBlobStorage {
    objects: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
    fail_uploads: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
}

impl InMemoryBlobStorage {
    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, content_type)| content_type.clone())
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn upload_public(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> std::result::Result<String, AppError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::Storage("bucket unreachable".to_string()));
        }
        let key = format!("public/{}", path);
        self.objects
            .lock()
            .unwrap()
            .insert(key.clone(), (data, content_type.to_string()));
        Ok(key)
    }

    fn public_url(&self, key: &str) -> String {
        format!("http://storage.test/uerra-uploads/{}", key)
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), AppError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("delete failed".to_string()));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}
