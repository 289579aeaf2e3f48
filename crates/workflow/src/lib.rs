//! `bureau-workflow` — the pending-change approval workflow.
//!
//! Mutations on agents and clients are a two-phase protocol against the
//! external API: submit the intended change, receive a pending-change id
//! ("OTP sent"), then confirm with the operator-entered 6-digit code. This
//! crate owns the client-side half of that protocol: local validation, the
//! per-mutation phase machine, and the uniform outcome type. The API owns
//! the pending records, OTP issuance and matching, and all business rules.

pub mod change;
pub mod coordinator;
pub mod op;
pub mod otp;
pub mod outcome;
pub mod payload;

pub use change::{ChangeAction, ChangeStatus, PendingChange, UpdateSubType};
pub use coordinator::{
    ChangeFlow, ChangeTransport, ConfirmRequest, EntityRef, Phase, SubmitRequest, TransportError,
};
pub use op::{EntityKind, OperationKind};
pub use otp::OtpCode;
pub use outcome::{ChangeOutcome, FieldErrors};
pub use payload::{ProfileFields, ServiceSelection, ServiceTier, SubmitPayload};
