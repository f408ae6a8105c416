//! Traverse States
//!
//! Explicit transition table of the traverse state machine. A state is entered when a tag
//! is processed, and its children then narrow it down one sibling at a time.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraverseState {
    Markup,
    ComponentWithUnknownContent,
    ComponentWithContent,
    ComponentWithOptions,
    ArrayDataType,
    BooleanDataType,
    FunctionDataType,
    NumberDataType,
    ObjectDataType,
    StringDataType,
    ValueDataType,
    ObjectPropertyWithUnknownContent,
    ObjectPropertyWithContent,
    ObjectPropertyWithDataType,
    ObjectPropertyWithContentTypeCastedToArray,
    ObjectPropertyWithContentTypeCastedToObject,
}

/// What a processed child turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    /// Markup, text or content directives
    Content,
    /// `ws:`-prefixed option tag
    Option,
    /// Data literal directive such as `ws:Array`
    DataType,
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChildKind::Content => "content",
            ChildKind::Option => "options",
            ChildKind::DataType => "data types",
        })
    }
}

/// Two kinds of children met under one parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub established: ChildKind,
    pub offending: ChildKind,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Forbidden to mix {} with {}",
            self.established, self.offending
        )
    }
}

impl TraverseState {
    /// Next state after a sibling of `kind` has been processed
    pub fn transition(self, kind: ChildKind) -> Result<TraverseState, TransitionError> {
        use ChildKind::*;
        use TraverseState::*;

        let mix = |established| {
            Err(TransitionError {
                established,
                offending: kind,
            })
        };

        match (self, kind) {
            (ComponentWithUnknownContent, Content) => Ok(ComponentWithContent),
            (ComponentWithUnknownContent, Option) => Ok(ComponentWithOptions),
            (ComponentWithContent, Content) => Ok(ComponentWithContent),
            (ComponentWithContent, _) => mix(Content),
            (ComponentWithOptions, Option) => Ok(ComponentWithOptions),
            (ComponentWithOptions, _) => mix(Option),

            (ObjectPropertyWithUnknownContent, Content) => Ok(ObjectPropertyWithContent),
            (ObjectPropertyWithUnknownContent, DataType) => Ok(ObjectPropertyWithDataType),
            (ObjectPropertyWithUnknownContent, Option) => {
                Ok(ObjectPropertyWithContentTypeCastedToObject)
            }
            (ObjectPropertyWithContent, Content) => Ok(ObjectPropertyWithContent),
            (ObjectPropertyWithContent, _) => mix(Content),
            (ObjectPropertyWithDataType, DataType) => Ok(ObjectPropertyWithContentTypeCastedToArray),
            (ObjectPropertyWithDataType, _) => mix(DataType),
            (ObjectPropertyWithContentTypeCastedToArray, DataType) => {
                Ok(ObjectPropertyWithContentTypeCastedToArray)
            }
            (ObjectPropertyWithContentTypeCastedToArray, _) => mix(DataType),
            (ObjectPropertyWithContentTypeCastedToObject, Option) => {
                Ok(ObjectPropertyWithContentTypeCastedToObject)
            }
            (ObjectPropertyWithContentTypeCastedToObject, _) => mix(Option),

            (state, _) => Ok(state),
        }
    }

    /// Leaf literal states accept text only
    pub fn is_text_data_type(&self) -> bool {
        matches!(
            self,
            TraverseState::BooleanDataType
                | TraverseState::FunctionDataType
                | TraverseState::NumberDataType
                | TraverseState::StringDataType
                | TraverseState::ValueDataType
        )
    }
}
