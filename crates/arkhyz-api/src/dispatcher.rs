use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, info, warn};

use arkhyz_db::LeadStore;
use arkhyz_types::RecordKind;
use arkhyz_types::api::{BookingForm, InvestmentForm, ReviewForm, Submission};
use arkhyz_types::models::{
    BookingUpdate, InvestmentUpdate, NewBooking, NewInvestment, NewReview, ReviewUpdate,
};
use arkhyz_types::validate::{
    normalize_phone, validate_date_range, validate_email, validate_name, validate_phone,
    validate_review_text,
};

use crate::dedup::{Admission, SubmissionGuard};
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Run the field validators before touching the store. When off, any
    /// well-formed payload is stored as sent.
    pub strict_validation: bool,
    /// How long an idempotency key is remembered. Zero disables de-duplication.
    pub dedup_window: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            strict_validation: true,
            dedup_window: Duration::from_secs(600),
        }
    }
}

/// Routes tagged submissions and admin operations to the store and shapes
/// their outcomes. Cheap to clone; all clones share one store and one guard.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    store: Arc<dyn LeadStore>,
    guard: SubmissionGuard,
    strict_validation: bool,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn LeadStore>, options: DispatchOptions) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                store,
                guard: SubmissionGuard::new(options.dedup_window),
                strict_validation: options.strict_validation,
            }),
        }
    }

    pub fn store(&self) -> &Arc<dyn LeadStore> {
        &self.inner.store
    }

    /// Store one form submission and return its new id.
    pub async fn submit(&self, payload: Value, idempotency_key: Option<String>) -> Result<i64, ApiError> {
        let submission = parse_submission(payload)?;
        let kind = submission.kind();

        if self.inner.strict_validation {
            check(submission_problems(&submission))?;
        }

        let key = idempotency_key.filter(|k| !k.is_empty() && self.inner.guard.is_enabled());
        if let Some(key) = &key {
            match self.inner.guard.begin(kind, key) {
                Admission::Proceed => {}
                Admission::Replay(id) => {
                    info!("Duplicate {} submission (key {}), returning id {}", kind, key, id);
                    return Ok(id);
                }
                Admission::InFlight => {
                    warn!("Duplicate {} submission (key {}) while the first is in flight", kind, key);
                    return Err(ApiError::Conflict("Submission is already being processed".into()));
                }
            }
        }

        // Storing and recording the outcome run on their own task so a
        // dropped request (client gone mid-insert) still settles the key.
        let dispatcher = self.clone();
        tokio::spawn(async move {
            let result = dispatcher.insert(submission).await;

            if let Some(key) = &key {
                match &result {
                    Ok(id) => dispatcher.inner.guard.complete(kind, key, *id),
                    Err(_) => dispatcher.inner.guard.release(kind, key),
                }
            }

            match &result {
                Ok(id) => info!("{} saved with id {}", kind, id),
                Err(e) => error!("Failed to save {}: {}", kind, e),
            }
            result
        })
        .await
        .map_err(|e| ApiError::storage("Failed to save data", e))?
    }

    async fn insert(&self, submission: Submission) -> Result<i64, ApiError> {
        let timestamp_now = || Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        self.blocking(move |store| match submission {
            Submission::Booking(form) => store.insert_booking(&NewBooking {
                booking_type: form.booking_type,
                name: form.name,
                phone: normalize_phone(&form.phone),
                email: form.email,
                check_in: form.check_in,
                check_out: form.check_out,
                bathhouse: form.bathhouse,
                message: form.message,
                timestamp: form.timestamp.unwrap_or_else(timestamp_now),
            }),
            Submission::Review(form) => store.insert_review(&NewReview {
                name: form.name,
                email: form.email,
                text: form.text,
                timestamp: form.timestamp.unwrap_or_else(timestamp_now),
            }),
            Submission::Investment(form) => store.insert_investment(&NewInvestment {
                name: form.name,
                phone: normalize_phone(&form.phone),
                timestamp: form.timestamp.unwrap_or_else(timestamp_now),
            }),
        })
        .await
        .map_err(|e| ApiError::storage("Failed to save data", e))
    }

    /// All rows of one kind, newest first, as JSON objects.
    pub async fn list(&self, kind: RecordKind) -> Result<Vec<Value>, ApiError> {
        let rows = self
            .blocking(move |store| {
                let rows = match kind {
                    RecordKind::Booking => serde_json::to_value(store.list_bookings()?)?,
                    RecordKind::Review => serde_json::to_value(store.list_reviews()?)?,
                    RecordKind::Investment => serde_json::to_value(store.list_investments()?)?,
                };
                Ok(rows)
            })
            .await
            .map_err(|e| {
                error!("Failed to list {}: {}", kind.collection(), e);
                ApiError::storage("Failed to load data", e)
            })?;

        match rows {
            Value::Array(items) => Ok(items),
            _ => Ok(Vec::new()),
        }
    }

    /// Replace the editable fields of one row. Identity and both timestamps
    /// are never touched.
    pub async fn update(&self, kind: RecordKind, id: i64, payload: Value) -> Result<(), ApiError> {
        let strict = self.inner.strict_validation;

        let found = match kind {
            RecordKind::Booking => {
                let mut fields: BookingUpdate = parse_fields(kind, payload)?;
                if strict {
                    check(booking_update_problems(&fields))?;
                }
                fields.phone = normalize_phone(&fields.phone);
                self.blocking(move |store| store.update_booking(id, &fields)).await
            }
            RecordKind::Review => {
                let fields: ReviewUpdate = parse_fields(kind, payload)?;
                if strict {
                    check(review_problems(&fields.name, &fields.email, &fields.text))?;
                }
                self.blocking(move |store| store.update_review(id, &fields)).await
            }
            RecordKind::Investment => {
                let mut fields: InvestmentUpdate = parse_fields(kind, payload)?;
                if strict {
                    check(investment_problems(&fields.name, &fields.phone))?;
                }
                fields.phone = normalize_phone(&fields.phone);
                self.blocking(move |store| store.update_investment(id, &fields)).await
            }
        }
        .map_err(|e| {
            error!("Failed to update {} {}: {}", kind.collection(), id, e);
            ApiError::storage("Failed to update data", e)
        })?;

        if !found {
            return Err(ApiError::NotFound(format!("{} {} not found", kind, id)));
        }
        info!("{} {} updated", kind, id);
        Ok(())
    }

    pub async fn delete(&self, kind: RecordKind, id: i64) -> Result<(), ApiError> {
        let found = self
            .blocking(move |store| store.delete(kind, id))
            .await
            .map_err(|e| {
                error!("Failed to delete {} {}: {}", kind.collection(), id, e);
                ApiError::storage("Failed to delete data", e)
            })?;

        if !found {
            return Err(ApiError::NotFound(format!("{} {} not found", kind, id)));
        }
        info!("{} {} deleted", kind, id);
        Ok(())
    }

    /// Run blocking store work off the async runtime.
    async fn blocking<F, T>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&dyn LeadStore) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.inner.store.clone();
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?
    }
}

/// Read the `type` discriminator first so unknown kinds are reported by name,
/// then decode the kind-specific fields.
fn parse_submission(payload: Value) -> Result<Submission, ApiError> {
    let kind = match payload.get("type") {
        Some(Value::String(tag)) => RecordKind::from_form_type(tag).ok_or_else(|| {
            warn!("Unknown form type: {}", tag);
            ApiError::BadRequest(format!("Unknown form type: {tag}"))
        })?,
        Some(other) => return Err(ApiError::BadRequest(format!("Unknown form type: {other}"))),
        None => return Err(ApiError::BadRequest("Missing form type".into())),
    };

    serde_json::from_value(payload)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {kind} submission: {e}")))
}

fn parse_fields<T: DeserializeOwned>(kind: RecordKind, payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(payload)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {kind} fields: {e}")))
}

fn check(problems: Vec<String>) -> Result<(), ApiError> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationFailed(problems))
    }
}

fn submission_problems(submission: &Submission) -> Vec<String> {
    match submission {
        Submission::Booking(BookingForm { name, phone, email, check_in, check_out, .. }) => {
            booking_problems(name, phone, email, check_in.as_deref(), check_out.as_deref())
        }
        Submission::Review(ReviewForm { name, email, text, .. }) => review_problems(name, email, text),
        Submission::Investment(InvestmentForm { name, phone, .. }) => investment_problems(name, phone),
    }
}

fn booking_update_problems(fields: &BookingUpdate) -> Vec<String> {
    booking_problems(
        &fields.name,
        &fields.phone,
        &fields.email,
        fields.check_in.as_deref(),
        fields.check_out.as_deref(),
    )
}

fn booking_problems(
    name: &str,
    phone: &str,
    email: &str,
    check_in: Option<&str>,
    check_out: Option<&str>,
) -> Vec<String> {
    let mut problems = Vec::new();
    name_problem(name, &mut problems);
    phone_problem(phone, &mut problems);
    email_problem(email, &mut problems);

    // Dates are optional here; when both are given they must form a range.
    let given = |d: Option<&str>| d.is_some_and(|s| !s.trim().is_empty());
    if given(check_in) && given(check_out) && !validate_date_range(check_in, check_out) {
        problems.push("Check-out date must be later than check-in date".to_string());
    }
    problems
}

fn review_problems(name: &str, email: &str, text: &str) -> Vec<String> {
    let mut problems = Vec::new();
    name_problem(name, &mut problems);
    email_problem(email, &mut problems);
    if !validate_review_text(text) {
        problems.push("Review text must be at least 10 characters".to_string());
    }
    problems
}

fn investment_problems(name: &str, phone: &str) -> Vec<String> {
    let mut problems = Vec::new();
    name_problem(name, &mut problems);
    phone_problem(phone, &mut problems);
    problems
}

fn name_problem(name: &str, problems: &mut Vec<String>) {
    if !validate_name(name) {
        problems.push("Name must be at least 2 characters and contain only letters".to_string());
    }
}

fn phone_problem(phone: &str, problems: &mut Vec<String>) {
    if !validate_phone(phone) {
        problems.push("Invalid phone number".to_string());
    }
}

fn email_problem(email: &str, problems: &mut Vec<String>) {
    if !validate_email(email) {
        problems.push("Invalid email address".to_string());
    }
}
