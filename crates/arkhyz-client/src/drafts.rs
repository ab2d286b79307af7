use chrono::{SecondsFormat, Utc};

use arkhyz_types::api::{BookingForm, InvestmentForm, ReviewForm, Submission};
use arkhyz_types::validate::{
    normalize_phone, validate_date_range, validate_email, validate_name, validate_phone,
    validate_review_text,
};

/// Raw values of the booking modal, as typed.
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    /// Label of the house or offer the modal was opened for.
    pub booking_type: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub check_in: String,
    pub check_out: String,
    pub bathhouse: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewDraft {
    pub name: String,
    pub email: String,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct InvestmentDraft {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub enum Draft {
    Booking(BookingDraft),
    Review(ReviewDraft),
    Investment(InvestmentDraft),
}

impl Draft {
    /// Check every field and build the payload, or return all problems in
    /// form order.
    pub fn validate(&self) -> Result<Submission, Vec<String>> {
        match self {
            Draft::Booking(d) => d.validate(),
            Draft::Review(d) => d.validate(),
            Draft::Investment(d) => d.validate(),
        }
    }

    /// Toast text shown once the server has stored the submission.
    pub fn success_message(&self) -> String {
        match self {
            Draft::Booking(d) => {
                let mut details = d.booking_type.trim().to_string();
                if d.bathhouse {
                    details.push_str(" + bathhouse");
                }
                format!("Thank you for your booking request {details}! We will contact you shortly.")
            }
            Draft::Review(_) => {
                "Thank you for your review! It will be published after moderation.".to_string()
            }
            Draft::Investment(_) => {
                "Thank you! Our investment manager will contact you shortly.".to_string()
            }
        }
    }

    /// Whether the form lives in a modal that closes on success.
    pub fn in_modal(&self) -> bool {
        matches!(self, Draft::Booking(_))
    }
}

impl BookingDraft {
    pub fn validate(&self) -> Result<Submission, Vec<String>> {
        let name = self.name.trim();
        let phone = self.phone.trim();
        let email = self.email.trim();
        let check_in = self.check_in.trim();
        let check_out = self.check_out.trim();

        let mut errors = Vec::new();
        check_name(name, &mut errors);
        check_phone(phone, &mut errors);
        check_email(email, &mut errors);
        if check_in.is_empty() {
            errors.push("Check-in date is required".to_string());
        }
        if check_out.is_empty() {
            errors.push("Check-out date is required".to_string());
        }
        if !check_in.is_empty()
            && !check_out.is_empty()
            && !validate_date_range(Some(check_in), Some(check_out))
        {
            errors.push("Check-out date must be later than check-in date".to_string());
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let booking_type = self.booking_type.trim();
        Ok(Submission::Booking(BookingForm {
            booking_type: (!booking_type.is_empty()).then(|| booking_type.to_string()),
            name: name.to_string(),
            phone: normalize_phone(phone),
            email: email.to_string(),
            check_in: Some(check_in.to_string()),
            check_out: Some(check_out.to_string()),
            bathhouse: self.bathhouse,
            message: self.message.trim().to_string(),
            timestamp: Some(now_iso()),
        }))
    }
}

impl ReviewDraft {
    pub fn validate(&self) -> Result<Submission, Vec<String>> {
        let name = self.name.trim();
        let email = self.email.trim();
        let text = self.text.trim();

        let mut errors = Vec::new();
        check_name(name, &mut errors);
        check_email(email, &mut errors);
        if text.is_empty() {
            errors.push("Review text is required".to_string());
        } else if !validate_review_text(text) {
            errors.push("Review text must be at least 10 characters".to_string());
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Submission::Review(ReviewForm {
            name: name.to_string(),
            email: email.to_string(),
            text: text.to_string(),
            timestamp: Some(now_iso()),
        }))
    }
}

impl InvestmentDraft {
    pub fn validate(&self) -> Result<Submission, Vec<String>> {
        let name = self.name.trim();
        let phone = self.phone.trim();

        let mut errors = Vec::new();
        check_name(name, &mut errors);
        check_phone(phone, &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Submission::Investment(InvestmentForm {
            name: name.to_string(),
            phone: normalize_phone(phone),
            timestamp: Some(now_iso()),
        }))
    }
}

fn check_name(name: &str, errors: &mut Vec<String>) {
    if name.is_empty() {
        errors.push("Name is required".to_string());
    } else if !validate_name(name) {
        errors.push("Name must be at least 2 characters and contain only letters".to_string());
    }
}

fn check_phone(phone: &str, errors: &mut Vec<String>) {
    if phone.is_empty() {
        errors.push("Phone is required".to_string());
    } else if !validate_phone(phone) {
        errors.push(
            "Enter a valid phone number (for example +7 999 123-45-67 or 8 999 123-45-67)"
                .to_string(),
        );
    }
}

fn check_email(email: &str, errors: &mut Vec<String>) {
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !validate_email(email) {
        errors.push("Enter a valid email address".to_string());
    }
}

/// Same shape as a browser's `Date.toISOString()`.
fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
