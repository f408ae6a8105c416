//! Traverse Context
//!
//! Immutable record threaded through the recursive descent; every transition builds a new one.

use std::rc::Rc;

use super::literals::DataType;
use super::state::TraverseState;
use crate::diagnostics::DiagnosticMeta;
use crate::parse_util::SourcePosition;

#[derive(Debug, Clone)]
pub struct TraverseContext {
    pub state: TraverseState,
    pub file_name: Rc<str>,
    /// Physical path of the closest enclosing component
    pub component: Option<Rc<str>>,
    /// Set by a `type="…"` cast on the enclosing option
    pub explicit_data_type: Option<DataType>,
    pub translate_text: bool,
}

impl TraverseContext {
    pub fn new(file_name: &str, translate_text: bool) -> Self {
        TraverseContext {
            state: TraverseState::Markup,
            file_name: Rc::from(file_name),
            component: None,
            explicit_data_type: None,
            translate_text,
        }
    }

    pub fn with_state(&self, state: TraverseState) -> Self {
        TraverseContext {
            state,
            ..self.clone()
        }
    }

    pub fn with_component(&self, component: &str) -> Self {
        TraverseContext {
            component: Some(Rc::from(component)),
            ..self.clone()
        }
    }

    pub fn with_explicit_data_type(&self, data_type: Option<DataType>) -> Self {
        TraverseContext {
            explicit_data_type: data_type,
            ..self.clone()
        }
    }

    pub fn meta(&self, position: SourcePosition) -> DiagnosticMeta {
        DiagnosticMeta::new(&self.file_name, position)
    }
}
