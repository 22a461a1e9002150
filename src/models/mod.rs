//! Data models for Checky.

mod chat;
mod contract;
mod job;

pub use chat::{ChatRole, ChatTurn};
pub use contract::{AnalysisReport, Article, ArticleId, Contract, RiskCounts, RiskLevel, Sentence};
pub use job::{Job, JobStatus};
