//! Template Parser Module
//!
//! Services the traverse engine calls while building the AST: path resolution,
//! attribute and text processing, expression validation, translation policy and scope.

pub mod attributes;
pub mod expression_validator;
pub mod i18n;
pub mod resolvers;
pub mod scope;
pub mod text_processor;

pub use attributes::{AttributeProcessor, AttributeProcessorOptions, ProcessedAttributes};
pub use expression_validator::{check_bind_expression, check_event_expression, check_text_expression};
pub use i18n::{Description, TranslationPolicy};
pub use resolvers::Path;
pub use scope::{Scope, TranslationUnit};
pub use text_processor::{TextContentFlags, TextProcessor, TextProcessorOptions};
