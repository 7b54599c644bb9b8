use crate::database::admin::AdminRepository;
use crate::database::faq::FaqRepository;
use crate::database::review::ReviewRepository;
use crate::database::session::SessionRepository;
use crate::error::app_error::AppError;
use crate::models::admin::AdminCredentials;
use crate::models::faq::{Faq, FaqRequest, FaqUpdateRequest};
use crate::models::review::{Review, ReviewRequest};
use crate::models::session::Session;
use crate::service::session::{Clock, SessionCookies};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rocket::http::Cookie;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct Tables {
    admins: Vec<AdminCredentials>,
    sessions: HashMap<String, Session>,
    reviews: Vec<Review>,
    faqs: Vec<Faq>,
    next_admin_id: i32,
    next_review_id: i32,
    next_faq_id: i32,
}

/// In-memory stand-in for [`crate::database::postgres_repository::PostgresRepository`].
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
    fail_next: AtomicBool,
    delete_before_password_update: AtomicBool,
}

impl InMemoryRepository {
    pub fn insert_admin(&self, username: &str, password_hash: &str) -> AdminCredentials {
        let mut tables = self.tables.lock().unwrap();
        tables.next_admin_id += 1;
        let admin = AdminCredentials {
            id: tables.next_admin_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.admins.push(admin.clone());
        admin
    }

    pub fn session_count(&self) -> usize {
        self.tables.lock().unwrap().sessions.len()
    }

    /// Deletes the target admin just before the next password-hash write,
    /// as a concurrent removal would.
    pub fn delete_admin_before_next_password_update(&self) {
        self.delete_before_password_update.store(true, Ordering::SeqCst);
    }

    fn insert_review(&self, request: &ReviewRequest, approved: bool) -> Result<Review, AppError> {
        self.check_available()?;
        let mut tables = self.tables.lock().unwrap();
        tables.next_review_id += 1;
        let review = Review {
            id: tables.next_review_id,
            name: request.name.clone(),
            email: request.email.clone(),
            rating: request.rating,
            review: request.review.clone(),
            approved,
            created_at: Utc::now(),
        };
        tables.reviews.push(review.clone());
        Ok(review)
    }

    /// Makes the next repository call fail as if the database were unreachable.
    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::internal("simulated storage failure"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AdminRepository for InMemoryRepository {
    async fn count_admins(&self) -> Result<i64, AppError> {
        self.check_available()?;
        Ok(self.tables.lock().unwrap().admins.len() as i64)
    }

    async fn create_admin_if_none(&self, username: &str, password_hash: &str) -> Result<Option<AdminCredentials>, AppError> {
        self.check_available()?;
        if !self.tables.lock().unwrap().admins.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.insert_admin(username, password_hash)))
    }

    async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminCredentials>, AppError> {
        self.check_available()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.admins.iter().find(|admin| admin.username == username).cloned())
    }

    async fn get_admin_by_id(&self, id: i32) -> Result<Option<AdminCredentials>, AppError> {
        self.check_available()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.admins.iter().find(|admin| admin.id == id).cloned())
    }

    async fn update_admin_username(&self, id: i32, username: &str) -> Result<bool, AppError> {
        self.check_available()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.admins.iter().any(|admin| admin.username == username && admin.id != id) {
            return Ok(false);
        }
        match tables.admins.iter_mut().find(|admin| admin.id == id) {
            Some(admin) => {
                admin.username = username.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_admin_password_hash(&self, id: i32, password_hash: &str) -> Result<bool, AppError> {
        self.check_available()?;
        let mut tables = self.tables.lock().unwrap();
        if self.delete_before_password_update.swap(false, Ordering::SeqCst) {
            tables.admins.retain(|admin| admin.id != id);
        }
        match tables.admins.iter_mut().find(|admin| admin.id == id) {
            Some(admin) => {
                admin.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait::async_trait]
impl SessionRepository for InMemoryRepository {
    async fn create_session(&self, session_id: &str, user_id: i32, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        self.check_available()?;
        let session = Session {
            id: session_id.to_string(),
            user_id,
            expires_at,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().sessions.insert(session_id.to_string(), session);
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, AppError> {
        self.check_available()?;
        Ok(self.tables.lock().unwrap().sessions.get(session_id).cloned())
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool, AppError> {
        self.check_available()?;
        Ok(self.tables.lock().unwrap().sessions.remove(session_id).is_some())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        self.check_available()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.sessions.len();
        tables.sessions.retain(|_, session| session.expires_at >= now);
        Ok((before - tables.sessions.len()) as u64)
    }
}

#[async_trait::async_trait]
impl ReviewRepository for InMemoryRepository {
    async fn list_approved_reviews(&self) -> Result<Vec<Review>, AppError> {
        Ok(self.list_reviews().await?.into_iter().filter(|review| review.approved).collect())
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, AppError> {
        self.check_available()?;
        let mut reviews = self.tables.lock().unwrap().reviews.clone();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reviews)
    }

    async fn count_reviews(&self) -> Result<i64, AppError> {
        self.check_available()?;
        Ok(self.tables.lock().unwrap().reviews.len() as i64)
    }

    async fn create_review(&self, request: &ReviewRequest) -> Result<Review, AppError> {
        self.insert_review(request, false)
    }

    async fn create_approved_review(&self, request: &ReviewRequest) -> Result<Review, AppError> {
        self.insert_review(request, true)
    }

    async fn approve_review(&self, id: i32) -> Result<bool, AppError> {
        self.check_available()?;
        let mut tables = self.tables.lock().unwrap();
        match tables.reviews.iter_mut().find(|review| review.id == id) {
            Some(review) => {
                review.approved = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_review(&self, id: i32) -> Result<bool, AppError> {
        self.check_available()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.reviews.len();
        tables.reviews.retain(|review| review.id != id);
        Ok(tables.reviews.len() < before)
    }
}

#[async_trait::async_trait]
impl FaqRepository for InMemoryRepository {
    async fn list_faqs(&self, locale: Option<&str>) -> Result<Vec<Faq>, AppError> {
        self.check_available()?;
        let mut faqs: Vec<Faq> = self
            .tables
            .lock()
            .unwrap()
            .faqs
            .iter()
            .filter(|faq| locale.is_none_or(|locale| faq.locale == locale))
            .cloned()
            .collect();
        faqs.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        Ok(faqs)
    }

    async fn get_faq_by_id(&self, id: i32) -> Result<Option<Faq>, AppError> {
        self.check_available()?;
        Ok(self.tables.lock().unwrap().faqs.iter().find(|faq| faq.id == id).cloned())
    }

    async fn create_faq(&self, request: &FaqRequest) -> Result<Faq, AppError> {
        self.check_available()?;
        let mut tables = self.tables.lock().unwrap();
        tables.next_faq_id += 1;
        let now = Utc::now();
        let faq = Faq {
            id: tables.next_faq_id,
            question: request.question.clone(),
            answer: request.answer.clone(),
            locale: request.locale().to_string(),
            sort_order: request.sort_order(),
            created_at: now,
            updated_at: now,
        };
        tables.faqs.push(faq.clone());
        Ok(faq)
    }

    async fn update_faq(&self, id: i32, request: &FaqUpdateRequest) -> Result<Option<Faq>, AppError> {
        self.check_available()?;
        let mut tables = self.tables.lock().unwrap();
        let Some(faq) = tables.faqs.iter_mut().find(|faq| faq.id == id) else {
            return Ok(None);
        };
        if let Some(question) = &request.question {
            faq.question = question.clone();
        }
        if let Some(answer) = &request.answer {
            faq.answer = answer.clone();
        }
        if let Some(locale) = &request.locale {
            faq.locale = locale.clone();
        }
        if let Some(sort_order) = request.sort_order {
            faq.sort_order = sort_order;
        }
        faq.updated_at = Utc::now();
        Ok(Some(faq.clone()))
    }

    async fn delete_faq(&self, id: i32) -> Result<bool, AppError> {
        self.check_available()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.faqs.len();
        tables.faqs.retain(|faq| faq.id != id);
        Ok(tables.faqs.len() < before)
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        let start = Utc.timestamp_millis_opt(1_750_000_000_250).unwrap();
        Self { now: Mutex::new(start) }
    }
}

impl ManualClock {
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Cookie jar for driving the session lifecycle without an HTTP request.
#[derive(Default)]
pub struct MemoryCookies {
    cookies: Mutex<HashMap<String, Cookie<'static>>>,
    cleared: Mutex<Vec<String>>,
}

impl MemoryCookies {
    pub fn with_value(name: &str, value: &str) -> Self {
        let jar = Self::default();
        jar.cookies
            .lock()
            .unwrap()
            .insert(name.to_string(), Cookie::new(name.to_string(), value.to_string()));
        jar
    }

    pub fn get(&self, name: &str) -> Option<Cookie<'static>> {
        self.cookies.lock().unwrap().get(name).cloned()
    }

    pub fn cleared(&self) -> Vec<String> {
        self.cleared.lock().unwrap().clone()
    }
}

impl SessionCookies for MemoryCookies {
    fn session_cookie(&self, name: &str) -> Option<String> {
        self.get(name).map(|cookie| cookie.value().to_string())
    }

    fn set_session_cookie(&self, cookie: Cookie<'static>) {
        self.cookies.lock().unwrap().insert(cookie.name().to_string(), cookie);
    }

    fn clear_session_cookie(&self, name: &str) {
        self.cookies.lock().unwrap().remove(name);
        self.cleared.lock().unwrap().push(name.to_string());
    }
}
