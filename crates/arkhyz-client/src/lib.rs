//! Client side of the lead-capture forms: draft validation, submission over
//! HTTP and the per-form submit state machine that drives UI feedback.

pub mod drafts;
pub mod flow;
pub mod http;

pub use drafts::{BookingDraft, Draft, InvestmentDraft, ReviewDraft};
pub use flow::{Feedback, FeedbackLevel, FormFlow, FormState};
pub use http::{ClientError, LeadClient};
