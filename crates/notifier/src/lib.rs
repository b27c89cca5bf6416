//! Outbound SMS delivery.
//!
//! [`SmsSender`] is the seam the dispatcher sends through. [`TwilioSmsSender`]
//! talks to the telephony REST API; [`UnconfiguredSmsSender`] stands in when
//! credentials are missing so that every attempt fails visibly instead of
//! silently dropping messages.

pub mod sms;
pub mod twilio;

pub use sms::{SmsError, SmsMessage, SmsReceipt, SmsSender, UnconfiguredSmsSender};
pub use twilio::{TwilioOptions, TwilioSmsSender};
