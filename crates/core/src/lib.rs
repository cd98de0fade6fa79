//! Shared domain primitives for `tabsplit`.
//!
//! Integer money, typed identifiers and the aggregate/entity/value-object
//! vocabulary. No infrastructure concerns.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ExpenseId, GroupId, MemberId, SettlementId};
pub use money::Money;
pub use value_object::ValueObject;
