pub mod conversation;
pub mod doctor;
pub mod slot;
pub mod values;

pub use conversation::{ChatMessage, ConversationState, MessageKind, Route, RoutingDecision};
pub use doctor::{DoctorName, Specialization};
pub use slot::AppointmentSlot;
pub use values::{DesiredDate, DesiredDateTime, IdentificationNumber};
