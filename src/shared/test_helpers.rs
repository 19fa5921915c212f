//! In-memory stand-ins for the storage seams, plus auth fixtures for
//! handler tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::{DateTime, Duration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use sqlx::types::Json;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::RevokedTokenStore;
use crate::features::authorities::models::{Authority, Department};
use crate::features::authorities::services::{AuthorityFilter, AuthorityRepository};
use crate::features::dispatch::services::Classifier;
use crate::features::reports::models::{
    AssignReport, CreateReport, DispatchResult, Report, ReportCounts, ReportStatus,
};
use crate::features::reports::services::ReportRepository;
use crate::features::users::models::{CreateUser, User, UserRole};
use crate::features::users::services::EMAIL_TAKEN_MESSAGE;
use crate::features::users::UserRepository;
use crate::modules::storage::ObjectStorage;
use crate::shared::constants::{POINTS_PER_REPORT, ROLE_AUTHORITY, ROLE_CITIZEN};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

// =============================================================================
// AUTH FIXTURES
// =============================================================================

fn authenticated(role: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::new_v4(),
        email: SafeEmail().fake(),
        name: Some(Name().fake()),
        roles: vec![role.to_string()],
        token_id: Uuid::new_v4(),
        token_expires_at: Utc::now() + Duration::hours(1),
    }
}

pub fn create_authority_user() -> AuthenticatedUser {
    authenticated(ROLE_AUTHORITY)
}

pub fn create_citizen_user() -> AuthenticatedUser {
    authenticated(ROLE_CITIZEN)
}

async fn inject_authority_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_authority_user());
    next.run(request).await
}

async fn inject_citizen_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_citizen_user());
    next.run(request).await
}

pub fn with_authority_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_authority_middleware))
}

pub fn with_citizen_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_citizen_middleware))
}

// =============================================================================
// USERS
// =============================================================================

/// Citizen account with no reports yet
pub fn sample_user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        full_name: None,
        phone: None,
        role: UserRole::Citizen,
        total_reports: 0,
        points: 0,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, data: &CreateUser) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == data.email) {
            return Err(AppError::Conflict(EMAIL_TAKEN_MESSAGE.to_string()));
        }

        let mut user = sample_user(&data.email);
        user.password_hash = data.password_hash.clone();
        user.full_name = data.full_name.clone();
        user.phone = data.phone.clone();
        user.role = data.role;
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn top_by_points(&self, limit: i64) -> Result<Vec<User>> {
        let mut users = self.users.lock().unwrap().clone();
        users.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        users.truncate(limit.max(0) as usize);
        Ok(users)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.user_count() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryRevokedTokenStore {
    revoked: Mutex<HashSet<Uuid>>,
}

#[async_trait]
impl RevokedTokenStore for InMemoryRevokedTokenStore {
    async fn revoke(&self, token_id: Uuid, _expires_at: DateTime<Utc>) -> Result<()> {
        self.revoked.lock().unwrap().insert(token_id);
        Ok(())
    }

    async fn is_revoked(&self, token_id: Uuid) -> Result<bool> {
        Ok(self.revoked.lock().unwrap().contains(&token_id))
    }
}

// =============================================================================
// AUTHORITIES
// =============================================================================

pub fn sample_authority(
    name: &str,
    department: Department,
    active: bool,
    lat: f64,
    lng: f64,
) -> Authority {
    Authority {
        id: Uuid::new_v4(),
        name: name.to_string(),
        department,
        active,
        lat,
        lng,
        phone: Some(PhoneNumber().fake()),
        created_at: Utc::now(),
    }
}

/// Keeps insertion order, standing in for the stable directory order
#[derive(Default)]
pub struct InMemoryAuthorityRepository {
    authorities: Mutex<Vec<Authority>>,
}

impl InMemoryAuthorityRepository {
    pub fn insert(&self, authority: Authority) {
        self.authorities.lock().unwrap().push(authority);
    }
}

#[async_trait]
impl AuthorityRepository for InMemoryAuthorityRepository {
    async fn list(&self, filter: AuthorityFilter) -> Result<Vec<Authority>> {
        let authorities = self.authorities.lock().unwrap();
        Ok(authorities
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }
}

// =============================================================================
// REPORTS
// =============================================================================

#[derive(Default)]
pub struct InMemoryReportRepository {
    reports: Mutex<Vec<Report>>,
    stale_reads: Mutex<HashMap<Uuid, Report>>,
    points: Mutex<HashMap<Uuid, i32>>,
    dispatch_writes: AtomicUsize,
}

impl InMemoryReportRepository {
    pub fn get(&self, id: Uuid) -> Option<Report> {
        let reports = self.reports.lock().unwrap();
        reports.iter().find(|r| r.id == id).cloned()
    }

    /// Points credited to a reporter through `create`
    pub fn credited_points(&self, user_id: Uuid) -> i32 {
        self.points
            .lock()
            .unwrap()
            .get(&user_id)
            .copied()
            .unwrap_or(0)
    }

    /// Successful `apply_dispatch` calls
    pub fn dispatch_writes(&self) -> usize {
        self.dispatch_writes.load(Ordering::SeqCst)
    }

    /// Answer the next `find_by_id` for this report with an old snapshot
    pub fn serve_stale_once(&self, snapshot: Report) {
        self.stale_reads.lock().unwrap().insert(snapshot.id, snapshot);
    }

    /// Clear the awaiting flag as a competing dispatch would
    pub fn clear_flag(&self, id: Uuid) {
        self.update(id, |r| r.ai_pending = false);
    }

    fn update(&self, id: Uuid, apply: impl FnOnce(&mut Report)) -> Option<Report> {
        let mut reports = self.reports.lock().unwrap();
        let report = reports.iter_mut().find(|r| r.id == id)?;
        apply(report);
        report.updated_at = Utc::now();
        Some(report.clone())
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn create(&self, data: &CreateReport) -> Result<Report> {
        let now = Utc::now();
        let report = Report {
            id: Uuid::now_v7(),
            user_id: data.user_id,
            reporter_name: data.reporter_name.clone(),
            reporter_email: data.reporter_email.clone(),
            incident_type: data.incident_type.clone(),
            description: data.description.clone(),
            latitude: data.latitude,
            longitude: data.longitude,
            photo_url: data.photo_url.clone(),
            status: ReportStatus::Pending,
            authority_id: None,
            authority_name: None,
            authority_contact: None,
            evidence_photo_url: None,
            ai_pending: true,
            ai_dispatch: None,
            notified_authority_id: None,
            notification_mocked: false,
            created_at: now,
            updated_at: now,
        };

        self.reports.lock().unwrap().push(report.clone());
        *self.points.lock().unwrap().entry(data.user_id).or_insert(0) += POINTS_PER_REPORT;
        Ok(report)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        if let Some(snapshot) = self.stale_reads.lock().unwrap().remove(&id) {
            return Ok(Some(snapshot));
        }
        Ok(self.get(id))
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Report>> {
        let reports = self.reports.lock().unwrap();
        Ok(reports
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Report>> {
        let reports = self.reports.lock().unwrap();
        Ok(reports.iter().rev().cloned().collect())
    }

    async fn list_awaiting_dispatch(&self, limit: i64) -> Result<Vec<Uuid>> {
        let reports = self.reports.lock().unwrap();
        Ok(reports
            .iter()
            .filter(|r| r.ai_pending)
            .take(limit.max(0) as usize)
            .map(|r| r.id)
            .collect())
    }

    async fn set_status(&self, id: Uuid, status: ReportStatus) -> Result<Option<Report>> {
        if self.get(id).is_some_and(|r| r.status > status) {
            return Ok(None);
        }
        Ok(self.update(id, |r| r.status = status))
    }

    async fn assign(&self, id: Uuid, data: &AssignReport) -> Result<Option<Report>> {
        Ok(self.update(id, |r| {
            r.status = ReportStatus::Investigating;
            r.authority_id = Some(data.authority_id);
            r.authority_name = Some(data.authority_name.clone());
            r.authority_contact = data.authority_contact.clone();
        }))
    }

    async fn resolve(&self, id: Uuid, evidence_photo_url: Option<&str>) -> Result<Option<Report>> {
        Ok(self.update(id, |r| {
            r.status = ReportStatus::Resolved;
            r.evidence_photo_url = evidence_photo_url.map(str::to_owned);
        }))
    }

    async fn apply_dispatch(&self, id: Uuid, result: &DispatchResult) -> Result<bool> {
        let still_pending = self.get(id).is_some_and(|r| r.ai_pending);
        if !still_pending {
            return Ok(false);
        }

        self.update(id, |r| {
            r.ai_pending = false;
            r.ai_dispatch = Some(Json(result.classification.clone()));
            r.notified_authority_id = Some(result.notified_authority_id);
            r.notification_mocked = true;
        });
        self.dispatch_writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn counts(&self, since: DateTime<Utc>) -> Result<ReportCounts> {
        let reports = self.reports.lock().unwrap();
        let with_status =
            |s: ReportStatus| reports.iter().filter(|r| r.status == s).count() as i64;

        Ok(ReportCounts {
            total: reports.len() as i64,
            pending: with_status(ReportStatus::Pending),
            investigating: with_status(ReportStatus::Investigating),
            resolved: with_status(ReportStatus::Resolved),
            created_since: reports.iter().filter(|r| r.created_at >= since).count() as i64,
        })
    }
}

// =============================================================================
// STORAGE
// =============================================================================

#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn put_public(&self, path: &str, data: Vec<u8>, _content_type: &str) -> Result<String> {
        self.objects.lock().unwrap().insert(path.to_string(), data);
        Ok(format!("http://storage.test/uploads/public/{}", path))
    }
}

// =============================================================================
// CLASSIFIER
// =============================================================================

enum StubReply {
    Answer(String),
    Fail(String),
}

/// Classifier with a scripted reply
pub struct StubClassifier {
    reply: Mutex<StubReply>,
    calls: AtomicUsize,
    on_call: Mutex<Option<(Arc<InMemoryReportRepository>, Uuid)>>,
}

impl StubClassifier {
    pub fn answering(text: &str) -> Self {
        Self {
            reply: Mutex::new(StubReply::Answer(text.to_string())),
            calls: AtomicUsize::new(0),
            on_call: Mutex::new(None),
        }
    }

    pub fn answer(&self, text: &str) {
        *self.reply.lock().unwrap() = StubReply::Answer(text.to_string());
    }

    pub fn fail_with(&self, message: &str) {
        *self.reply.lock().unwrap() = StubReply::Fail(message.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Clear the report's awaiting flag during the next call
    pub fn clear_flag_on_call(&self, reports: Arc<InMemoryReportRepository>, report_id: Uuid) {
        *self.on_call.lock().unwrap() = Some((reports, report_id));
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some((reports, id)) = self.on_call.lock().unwrap().take() {
            reports.clear_flag(id);
        }

        match &*self.reply.lock().unwrap() {
            StubReply::Answer(text) => Ok(text.clone()),
            StubReply::Fail(message) => Err(AppError::ExternalServiceError(message.clone())),
        }
    }
}
