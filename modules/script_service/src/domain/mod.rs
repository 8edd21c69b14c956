//! Domain layer - batch engine and services

pub mod appliers;
pub mod changeset;
pub mod coercion;
pub mod events;
pub mod post_process;
pub mod repository;
pub mod service;
pub mod working_set;

pub use changeset::ChangeSet;
pub use events::{EventPublisher, NoOpEventPublisher, ScriptEvent};
pub use repository::ScriptRepository;
pub use service::Service;
pub use working_set::{WorkingElement, WorkingSet};
